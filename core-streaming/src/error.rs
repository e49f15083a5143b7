use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Range not satisfiable for {size} byte resource: {reason}")]
    RangeNotSatisfiable { size: u64, reason: String },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[source] BridgeError),

    #[error("All upstream sources failed: {}", .attempts.join("; "))]
    Upstream { attempts: Vec<String> },
}

impl StreamError {
    pub(crate) fn unsatisfiable(size: u64, reason: impl Into<String>) -> Self {
        StreamError::RangeNotSatisfiable {
            size,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StreamError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            StreamError::NotFound(_) => StatusCode::NOT_FOUND,
            StreamError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            StreamError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<BridgeError> for StreamError {
    fn from(e: BridgeError) -> Self {
        if e.is_not_found() {
            StreamError::NotFound(e.to_string())
        } else {
            StreamError::Storage(e)
        }
    }
}

impl IntoResponse for StreamError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));

        let mut response = (status, body).into_response();
        if let StreamError::RangeNotSatisfiable { size, .. } = self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_errors_classify() {
        let missing: StreamError = BridgeError::NotFound("a/b".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let broken: StreamError = BridgeError::OperationFailed("disk".into()).into();
        assert_eq!(broken.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unsatisfiable_response_carries_size() {
        let response = StreamError::unsatisfiable(1000, "start beyond end").into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_upstream_lists_attempts() {
        let err = StreamError::Upstream {
            attempts: vec!["a: timed out".into(), "b: status 503".into()],
        };
        assert_eq!(
            err.to_string(),
            "All upstream sources failed: a: timed out; b: status 503"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
