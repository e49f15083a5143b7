//! HTTP mapping of core errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use core_library::LibraryError;
use core_service::CoreError;
use tracing::{error, warn};

/// Error returned by every handler.
///
/// Failures before response headers are sent become a status code plus a
/// JSON `{"error": "..."}` body.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::Stream(e) => e.status_code(),
            CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CoreError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            CoreError::Library(LibraryError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            CoreError::Audio(e) if e.is_codec_error() => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<CoreError>,
{
    fn from(e: E) -> Self {
        ApiError(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Request rejected");
        }

        // Stream errors carry their own headers (Content-Range on 416)
        if let CoreError::Stream(e) = self.0 {
            return e.into_response();
        }

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use core_audio::AudioError;
    use core_streaming::StreamError;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(CoreError, StatusCode)> = vec![
            (CoreError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (CoreError::InvalidUpload("x".into()), StatusCode::BAD_REQUEST),
            (
                LibraryError::invalid("name", "duplicate").into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                LibraryError::not_found("track", "t1").into(),
                StatusCode::NOT_FOUND,
            ),
            (
                CoreError::NotFound {
                    entity: "playlist",
                    id: "p1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                AudioError::Codec("bad frame".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AudioError::EncoderTimeout(Duration::from_secs(1)).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AudioError::Internal("join".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StreamError::Upstream { attempts: vec![] }.into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CoreError::InitializationFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            let shown = err.to_string();
            assert_eq!(ApiError(err).status(), expected, "{shown}");
        }
    }

    #[test]
    fn test_stream_errors_keep_their_headers() {
        let err: ApiError = StreamError::RangeNotSatisfiable {
            size: 42,
            reason: "start past end".into(),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */42"
        );
    }
}
