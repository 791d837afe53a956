//! Service errors mapped onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use modelgate_store::StoreError;

/// Errors surfaced by the prediction service.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// No production bundle is deployed yet
    #[error("no production model available")]
    NoModel,

    /// The deployed bundle was fitted under a different schema version
    #[error("production bundle does not match the serving schema")]
    SchemaMismatch,

    /// The submitted record does not match the schema
    #[error("invalid record: {0}")]
    BadRequest(String),

    /// Registry failure while loading the bundle
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bundle decoding or scoring failure
    #[error("prediction failed: {0}")]
    Internal(String),
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NoModel => StatusCode::SERVICE_UNAVAILABLE,
            Self::SchemaMismatch | Self::Internal(_) | Self::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "prediction request failed");
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
