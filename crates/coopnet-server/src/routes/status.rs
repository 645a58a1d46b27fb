//! Liveness and configuration summary.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_status))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "coopnet",
        "version": env!("CARGO_PKG_VERSION"),
        "monthlyRequestLimit": state.config.monthly_request_limit,
        "requestTimeoutMs": state.config.request_timeout_ms,
        "cutover": {
            "year": state.config.folder_naming.cutover_year,
            "month": state.config.folder_naming.cutover_month,
        },
    }))
}
