//! Best-effort conversation logging to the record store.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use coopnet_store::RecordStore;

pub const CONVERSATIONS_TABLE: &str = "conversations";

/// Same swallow semantics as the invoice ledger: a failed write never
/// affects the reply the member already got.
pub struct ConversationLog {
    store: Arc<dyn RecordStore>,
}

impl ConversationLog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn log(&self, recipient: &str, inbound: &str, outbound: &str) {
        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "recipient": recipient,
            "inbound": inbound,
            "outbound": outbound,
            "created_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        });
        if let Err(e) = self.store.insert(CONVERSATIONS_TABLE, row).await {
            warn!("conversation log write failed for {recipient}: {e}");
        }
    }
}
