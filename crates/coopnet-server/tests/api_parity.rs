//! API parity tests — validates that webhook request/response shapes match
//! what the messaging-channel integration expects.
//!
//! These are shape tests over the JSON contract; the full message-routing
//! flow is exercised in coopnet-chat's handler tests.

/// The webhook accepts `{ from, message, secret }` with `secret` optional.
#[test]
fn test_webhook_request_shape() {
    let with_secret = serde_json::json!({
        "from": "549351xxxx",
        "message": "Quiero mi factura, cuenta 6370",
        "secret": "s3cret",
    });
    assert!(with_secret["from"].is_string());
    assert!(with_secret["message"].is_string());
    assert!(with_secret["secret"].is_string());
}

/// Delivered-invoice replies carry the file, category and delivery id.
#[test]
fn test_invoice_delivered_reply_shape() {
    let reply = serde_json::json!({
        "kind": "invoice_delivered",
        "text": "¡Listo! Te enviamos tu factura de servicios de agosto 2026.",
        "file_name": "0063700097-08-26.pdf",
        "doc_type": "servicios",
        "delivery_id": "wamid.ABC",
    });
    assert_eq!(reply["kind"], "invoice_delivered");
    assert!(reply["file_name"].is_string());
    assert!(reply["doc_type"].is_string());
    assert!(reply["delivery_id"].is_string());
}

/// Every non-delivery outcome is `{ kind, text }`.
#[test]
fn test_outcome_reply_shapes() {
    for kind in [
        "new_service_redirect",
        "invoice_not_found",
        "account_missing",
        "quota_reached",
        "assistant",
        "apology",
    ] {
        let reply = serde_json::json!({ "kind": kind, "text": "..." });
        assert!(reply["kind"].is_string());
        assert!(reply["text"].is_string());
    }
}

/// Status endpoint shape consumed by the uptime monitor.
#[test]
fn test_status_shape() {
    let status = serde_json::json!({
        "service": "coopnet",
        "version": "0.1.0",
        "monthlyRequestLimit": 5,
        "requestTimeoutMs": 10000,
        "cutover": { "year": 2023, "month": 9 },
    });
    assert!(status["service"].is_string());
    assert!(status["monthlyRequestLimit"].is_number());
    assert!(status["cutover"]["year"].is_number());
    assert!(status["cutover"]["month"].is_number());
}
