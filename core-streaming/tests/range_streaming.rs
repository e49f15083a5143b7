//! Range-request responses served from an in-memory store

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::http::{header, StatusCode};
use axum::response::Response;
use bridge_desktop::MemoryObjectStore;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::storage::{ByteStream, ObjectMetadata, ObjectStore};
use bytes::Bytes;
use core_streaming::{serve, StreamableResource, TRACK_NAME_HEADER};
use futures::stream;

const KEY: &str = "owner-1/processed/song.mp3";

fn payload() -> Vec<u8> {
    (0..1000u32).map(|i| (i * 7 % 251) as u8).collect()
}

async fn fixture() -> (MemoryObjectStore, StreamableResource) {
    let store = MemoryObjectStore::new();
    store
        .put(KEY, Bytes::from(payload()), "audio/mpeg")
        .await
        .unwrap();
    let resource = StreamableResource::from_store(&store, KEY, "Song Ä/B")
        .await
        .unwrap();
    (store, resource)
}

fn header_str<'a>(response: &'a Response, name: impl header::AsHeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap())
        .unwrap_or_default()
}

async fn body(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_no_range_streams_whole_resource() {
    let (store, resource) = fixture().await;
    let response = serve(&store, &resource, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "1000");
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "audio/mpeg");
    assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
    assert_eq!(header_str(&response, TRACK_NAME_HEADER), "Song%20%C3%84%2FB");
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(body(response).await, payload());
}

#[tokio::test]
async fn test_closed_range_is_partial_content() {
    let (store, resource) = fixture().await;
    let response = serve(&store, &resource, Some("bytes=200-499")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 200-499/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "300");
    assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
    assert_eq!(body(response).await, payload()[200..500]);
}

#[tokio::test]
async fn test_open_range_runs_to_end() {
    let (store, resource) = fixture().await;
    let response = serve(&store, &resource, Some("bytes=900-")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 900-999/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "100");
    assert_eq!(body(response).await, payload()[900..]);
}

#[tokio::test]
async fn test_end_past_resource_is_clamped() {
    let (store, resource) = fixture().await;
    let response = serve(&store, &resource, Some("bytes=950-4000")).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 950-999/1000");
    assert_eq!(body(response).await.len(), 50);
}

#[tokio::test]
async fn test_suffix_range() {
    let (store, resource) = fixture().await;
    let response = serve(&store, &resource, Some("bytes=-10")).await;

    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 990-999/1000");
    assert_eq!(body(response).await, payload()[990..]);
}

#[tokio::test]
async fn test_unsatisfiable_range_is_rejected() {
    let (store, resource) = fixture().await;

    for bad in ["bytes=1000-", "bytes=600-500", "bytes=x-1", "bytes=0-1,5-6"] {
        let response = serve(&store, &resource, Some(bad)).await;
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE, "{bad}");
        assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */1000");

        let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
        assert!(json["error"].as_str().unwrap().contains("1000"));
    }
}

#[tokio::test]
async fn test_empty_resource() {
    let store = MemoryObjectStore::new();
    let resource = StreamableResource::new("owner-1/processed/empty.mp3", 0, "audio/mpeg", "e");

    let response = serve(&store, &resource, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "0");
    assert!(body(response).await.is_empty());

    let response = serve(&store, &resource, Some("bytes=0-")).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
}

#[tokio::test]
async fn test_missing_object_is_not_found() {
    let store = MemoryObjectStore::new();
    let resource = StreamableResource::new("owner-1/processed/gone.mp3", 10, "audio/mpeg", "g");

    let response = serve(&store, &resource, Some("bytes=0-4")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json: serde_json::Value = serde_json::from_slice(&body(response).await).unwrap();
    assert!(json["error"].is_string());
}

/// Store whose reads fail, either up front or after the first chunk.
struct FlakyStore {
    fail_immediately: bool,
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn get(&self, _key: &str) -> BridgeResult<Bytes> {
        Err(BridgeError::OperationFailed("unavailable".into()))
    }

    async fn get_range(&self, _key: &str, _start: u64, _end: u64) -> BridgeResult<ByteStream> {
        if self.fail_immediately {
            return Err(BridgeError::OperationFailed("unavailable".into()));
        }
        Ok(Box::pin(stream::iter(vec![
            Ok(Bytes::from_static(b"first")),
            Err(std::io::Error::other("disk went away")),
        ])))
    }

    async fn head(&self, _key: &str) -> BridgeResult<ObjectMetadata> {
        Err(BridgeError::OperationFailed("unavailable".into()))
    }

    async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> BridgeResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_storage_failure_before_headers_is_server_error() {
    let store = FlakyStore {
        fail_immediately: true,
    };
    let resource = StreamableResource::new("k/a.mp3", 100, "audio/mpeg", "a");

    let response = serve(&store, &resource, None).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_storage_failure_mid_stream_aborts_body() {
    let store = FlakyStore {
        fail_immediately: false,
    };
    let resource = StreamableResource::new("k/a.mp3", 100, "audio/mpeg", "a");

    let response = serve(&store, &resource, Some("bytes=0-99")).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
}
