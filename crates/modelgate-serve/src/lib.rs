//! Minimal prediction service over the production model bundle.
//!
//! `POST /predict` accepts one record matching the dataset schema and
//! returns the predicted label; `GET /healthz` reports liveness. The
//! production bundle is loaded lazily from the registry on the first
//! prediction and cached for the life of the process.

mod error;
mod state;

pub use error::ServeError;
pub use state::{AppState, Prediction};

use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use modelgate_store::Record;
use std::sync::Arc;

/// Build the service router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<Record>,
) -> Result<Json<Prediction>, ServeError> {
    let prediction = state.predict(record).await?;
    Ok(Json(prediction))
}
