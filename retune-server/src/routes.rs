//! Route table and handlers

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use core_library::{Page, PageRequest, Playlist, Track};
use core_service::{CoreError, CoreService, UploadReceipt, UploadRequest};
use core_streaming::TRACK_NAME_HEADER;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::error::ApiError;
use crate::owner::Owner;

/// Header carrying the client's original file name on `/upload-audio`
pub const FILE_NAME_HEADER: &str = "x-file-name";

type ApiResult<T> = Result<T, ApiError>;

/// Build the application router.
///
/// `max_upload_bytes` bounds every request body.
pub fn router(core: CoreService, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stream/:track_id", get(stream_track))
        .route("/get-audio/:track_id", get(download_track))
        .route("/user-tracks/:page", get(list_tracks))
        .route("/user-playlists", get(list_playlists).post(create_playlist))
        .route(
            "/user-playlists/:playlist_id/tracks",
            get(playlist_tracks).post(add_playlist_track),
        )
        .route(
            "/user-playlists/:playlist_id/tracks/:track_id",
            delete(remove_playlist_track),
        )
        .route("/upload-audio", post(upload_audio))
        .route("/radio", get(radio))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(core)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn range_header(headers: &HeaderMap) -> Option<&str> {
    // A non-ASCII Range can never parse; keep it so it is answered with 416
    headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default())
}

#[instrument(skip(core, headers))]
async fn stream_track(
    State(core): State<CoreService>,
    owner: Owner,
    Path(track_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    Ok(core
        .stream_track(owner.as_str(), &track_id, range_header(&headers))
        .await?)
}

/// Same bytes as `/stream`, offered as a file download.
#[instrument(skip(core, headers))]
async fn download_track(
    State(core): State<CoreService>,
    owner: Owner,
    Path(track_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let mut response = core
        .stream_track(owner.as_str(), &track_id, range_header(&headers))
        .await?;

    if response.status().is_success() {
        // The track name header is already percent-encoded
        let encoded_name = response
            .headers()
            .get(TRACK_NAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("track")
            .to_string();
        let disposition = format!("attachment; filename*=UTF-8''{}", encoded_name);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct TracksQuery {
    page_size: Option<u32>,
}

async fn list_tracks(
    State(core): State<CoreService>,
    owner: Owner,
    Path(page): Path<u32>,
    Query(query): Query<TracksQuery>,
) -> ApiResult<Json<Page<Track>>> {
    let page_size = query
        .page_size
        .unwrap_or(PageRequest::default().page_size);
    let tracks = core
        .list_tracks(owner.as_str(), PageRequest::new(page, page_size))
        .await?;
    Ok(Json(tracks))
}

async fn list_playlists(
    State(core): State<CoreService>,
    owner: Owner,
) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(core.list_playlists(owner.as_str()).await?))
}

#[derive(Debug, Deserialize)]
struct CreatePlaylist {
    name: String,
}

async fn create_playlist(
    State(core): State<CoreService>,
    owner: Owner,
    Json(body): Json<CreatePlaylist>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    let playlist = core.create_playlist(owner.as_str(), &body.name).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

#[derive(Debug, Deserialize)]
struct AddTrack {
    track_id: String,
}

async fn add_playlist_track(
    State(core): State<CoreService>,
    owner: Owner,
    Path(playlist_id): Path<String>,
    Json(body): Json<AddTrack>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let position = core
        .add_track_to_playlist(owner.as_str(), &playlist_id, &body.track_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "playlist_id": playlist_id, "track_id": body.track_id, "position": position })),
    ))
}

async fn playlist_tracks(
    State(core): State<CoreService>,
    owner: Owner,
    Path(playlist_id): Path<String>,
) -> ApiResult<Json<Vec<Track>>> {
    Ok(Json(core.playlist_tracks(owner.as_str(), &playlist_id).await?))
}

async fn remove_playlist_track(
    State(core): State<CoreService>,
    owner: Owner,
    Path((playlist_id, track_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let removed = core
        .remove_track_from_playlist(owner.as_str(), &playlist_id, &track_id)
        .await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(CoreError::NotFound {
            entity: "playlist entry",
            id: track_id,
        }))
    }
}

#[instrument(skip(core, headers, body), fields(size = body.len()))]
async fn upload_audio(
    State(core): State<CoreService>,
    owner: Owner,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<UploadReceipt>)> {
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
        .ok_or_else(|| {
            ApiError(CoreError::InvalidUpload(format!(
                "missing {} header",
                FILE_NAME_HEADER
            )))
        })?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let receipt = core
        .upload(UploadRequest {
            owner_id: owner.0,
            file_name,
            content_type,
            data: body,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn radio(State(core): State<CoreService>) -> ApiResult<Response> {
    Ok(core.open_radio().await?.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_header_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(range_header(&headers), None);

        headers.insert(header::RANGE, HeaderValue::from_static("bytes=0-9"));
        assert_eq!(range_header(&headers), Some("bytes=0-9"));

        headers.insert(header::RANGE, HeaderValue::from_bytes(b"bytes=\xff").unwrap());
        assert_eq!(range_header(&headers), Some(""));
    }
}
