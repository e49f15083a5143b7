//! Range-request responses
//!
//! [`serve`] resolves a `Range` header against a [`StreamableResource`] and
//! streams the selected bytes straight from the object store. Errors raised
//! before the response is built become JSON error responses. Read failures
//! after that end the body stream and the connection is closed.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bridge_traits::storage::ObjectStore;
use futures::TryStreamExt;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::range::{parse_range, RangeSpec};
use crate::resource::StreamableResource;

/// Response header carrying the percent-encoded display name.
pub const TRACK_NAME_HEADER: &str = "x-track-name";

/// Serve `resource`, honouring an optional `Range` header.
///
/// - no header: 200 with the whole resource
/// - satisfiable header: 206 with `Content-Range`
/// - anything else: 416, or 404/500 for storage failures
#[instrument(skip(store, resource), fields(key = %resource.key, size = resource.size))]
pub async fn serve(
    store: &dyn ObjectStore,
    resource: &StreamableResource,
    range_header: Option<&str>,
) -> Response {
    match try_serve(store, resource, range_header).await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Stream request failed");
            e.into_response()
        }
    }
}

async fn try_serve(
    store: &dyn ObjectStore,
    resource: &StreamableResource,
    range_header: Option<&str>,
) -> Result<Response> {
    let (status, range) = match range_header {
        Some(raw) => (
            StatusCode::PARTIAL_CONTENT,
            Some(parse_range(raw, resource.size)?),
        ),
        None => (StatusCode::OK, RangeSpec::full(resource.size)),
    };

    let (body, content_length) = match range {
        Some(range) => {
            let key = resource.key.clone();
            let stream = store
                .get_range(&resource.key, range.start, range.end)
                .await?
                .inspect_err(move |e| warn!(key = %key, error = %e, "Aborting stream after read failure"));
            (Body::from_stream(stream), range.len())
        }
        None => (Body::empty(), 0),
    };

    debug!(status = status.as_u16(), ?range, "Streaming resource");

    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&resource.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    if let Ok(name) = HeaderValue::from_str(&urlencoding::encode(&resource.display_name)) {
        headers.insert(HeaderName::from_static(TRACK_NAME_HEADER), name);
    }
    if let (StatusCode::PARTIAL_CONTENT, Some(range)) = (status, range) {
        if let Ok(value) = HeaderValue::from_str(&range.content_range(resource.size)) {
            headers.insert(header::CONTENT_RANGE, value);
        }
    }

    Ok(response)
}
