use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::core::domain::{ToggleEvent, ToggleRequest};
use crate::core::error::ToggleError;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/toggle", post(toggle_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ToggleEvent>, JsonRejection>,
) -> Response {
    let event = match payload {
        Ok(Json(event)) => event,
        Err(rejection) => {
            return ToggleError::validation(format!("Invalid event payload: {}", rejection.body_text())).into_response()
        }
    };
    let request = match ToggleRequest::from_event(event, &state.default_on) {
        Ok(r) => r,
        Err(e) => return e.into_response(),
    };

    match state.toggler.toggle(&request).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => e.into_response(),
    }
}

impl IntoResponse for ToggleError {
    fn into_response(self) -> Response {
        let status = match &self {
            ToggleError::Validation(_) => StatusCode::BAD_REQUEST,
            ToggleError::NotFound(_) => StatusCode::NOT_FOUND,
            ToggleError::Api(_) => StatusCode::BAD_GATEWAY,
        };
        warn!(event = "TOGGLE_REJECTED", status = status.as_u16(), error = %self, "Toggle request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
