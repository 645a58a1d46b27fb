//! Chat webhook — the messaging channel posts inbound member messages here.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(webhook))
}

/// Inbound webhook payload.
#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    /// Recipient identifier on the messaging channel.
    pub from: String,
    pub message: String,
    #[serde(default)]
    pub secret: String,
}

/// Shared-secret check. Anything stronger is handled upstream of this
/// service.
pub fn authorized(request_secret: &str, expected: &str) -> bool {
    !expected.is_empty() && request_secret == expected
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WebhookRequest>,
) -> impl IntoResponse {
    if !authorized(&req.secret, &state.config.shared_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "invalid secret" })),
        );
    }

    let reply = state.handler.handle_message(&req.from, &req.message).await;

    (
        StatusCode::OK,
        Json(serde_json::to_value(&reply).unwrap_or_else(|_| serde_json::json!({}))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorized_requires_exact_match() {
        assert!(authorized("s3cret", "s3cret"));
        assert!(!authorized("wrong", "s3cret"));
        assert!(!authorized("", "s3cret"));
    }

    #[test]
    fn test_empty_expected_secret_rejects_everything() {
        assert!(!authorized("", ""));
        assert!(!authorized("anything", ""));
    }

    #[test]
    fn test_webhook_request_shape() {
        let req: WebhookRequest = serde_json::from_str(
            r#"{"from": "549351xxxx", "message": "quiero mi factura", "secret": "s3cret"}"#,
        )
        .unwrap();
        assert_eq!(req.from, "549351xxxx");
        assert_eq!(req.message, "quiero mi factura");
        assert_eq!(req.secret, "s3cret");
    }

    #[test]
    fn test_webhook_request_secret_defaults_empty() {
        let req: WebhookRequest =
            serde_json::from_str(r#"{"from": "x", "message": "hola"}"#).unwrap();
        assert_eq!(req.secret, "");
    }
}
