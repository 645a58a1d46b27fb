//! Append-only ledger of delivered invoices.
//!
//! Best-effort telemetry: a failed write is logged and swallowed so it can
//! never break the delivery that triggered it. The chat layer reads the
//! monthly count back as its throttling signal; enforcement happens there.

use std::sync::Arc;

use chrono::{Datelike, SecondsFormat, Utc};
use serde_json::json;
use tracing::warn;

use coopnet_core::Result;
use coopnet_store::{Filter, RecordStore};

use crate::types::{AccountNumber, BillingPeriod};

pub const INVOICE_REQUESTS_TABLE: &str = "invoice_requests";

pub struct RequestLedger {
    store: Arc<dyn RecordStore>,
}

impl RequestLedger {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Book one successful lookup with a server-assigned timestamp.
    pub async fn record(
        &self,
        recipient: &str,
        account: &AccountNumber,
        file_name: &str,
        period: BillingPeriod,
    ) {
        let row = json!({
            "recipient": recipient,
            "account": account.as_str(),
            "file_name": file_name,
            "month": period.month_name(),
            "year": period.year,
            "requested_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        });
        if let Err(e) = self.store.insert(INVOICE_REQUESTS_TABLE, row).await {
            warn!("invoice ledger write failed for {recipient}: {e}");
        }
    }

    /// How many invoices this recipient received in the current calendar
    /// month.
    pub async fn count_this_month(&self, recipient: &str) -> Result<u64> {
        let now = Utc::now();
        let (start, end) = month_bounds(now.year(), now.month());
        let filter = Filter::new()
            .eq("recipient", recipient)
            .gte("requested_at", start)
            .lt("requested_at", end);
        self.store.count(INVOICE_REQUESTS_TABLE, &filter).await
    }
}

/// RFC 3339 bounds `[start of month, start of next month)`.
fn month_bounds(year: i32, month: u32) -> (String, String) {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    (
        format!("{year:04}-{month:02}-01T00:00:00Z"),
        format!("{next_year:04}-{next_month:02}-01T00:00:00Z"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use coopnet_store::MemoryStore;

    fn account(raw: &str) -> AccountNumber {
        AccountNumber::canonicalize(raw).unwrap()
    }

    fn period() -> BillingPeriod {
        BillingPeriod::new(8, 2026).unwrap()
    }

    #[tokio::test]
    async fn test_count_tracks_records_per_recipient() {
        let store = Arc::new(MemoryStore::new());
        let ledger = RequestLedger::new(store.clone());

        ledger
            .record("wa-111", &account("6370"), "0063700097.pdf", period())
            .await;
        ledger
            .record("wa-111", &account("6370"), "0063700097.pdf", period())
            .await;
        ledger
            .record("wa-222", &account("239"), "0002390097.pdf", period())
            .await;

        assert_eq!(ledger.count_this_month("wa-111").await.unwrap(), 2);
        assert_eq!(ledger.count_this_month("wa-222").await.unwrap(), 1);
        assert_eq!(ledger.count_this_month("wa-333").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_records_from_other_months_are_not_counted() {
        let store = Arc::new(MemoryStore::new());
        let ledger = RequestLedger::new(store.clone());

        // A row from a past month, inserted directly.
        store
            .insert(
                INVOICE_REQUESTS_TABLE,
                serde_json::json!({
                    "recipient": "wa-111",
                    "account": "6370",
                    "file_name": "0063700097.pdf",
                    "month": "enero",
                    "year": 2020,
                    "requested_at": "2020-01-15T10:00:00Z",
                }),
            )
            .await
            .unwrap();
        ledger
            .record("wa-111", &account("6370"), "0063700097.pdf", period())
            .await;

        assert_eq!(ledger.count_this_month("wa-111").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes(true);
        let ledger = RequestLedger::new(store.clone());

        // Must not panic or surface an error.
        ledger
            .record("wa-111", &account("6370"), "0063700097.pdf", period())
            .await;
        assert!(store.rows(INVOICE_REQUESTS_TABLE).is_empty());
    }

    #[test]
    fn test_month_bounds_wrap_december() {
        let (start, end) = month_bounds(2026, 12);
        assert_eq!(start, "2026-12-01T00:00:00Z");
        assert_eq!(end, "2027-01-01T00:00:00Z");
    }
}
