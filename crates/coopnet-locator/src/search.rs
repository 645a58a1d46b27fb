//! Document search engine with prior-month fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use coopnet_core::{Error, Result};
use coopnet_drive::{BlobHierarchy, PDF_MIME};

use crate::decode::decode_account;
use crate::folder::FolderResolver;
use crate::types::{AccountNumber, BillingPeriod, DocumentType, LocatedDocument};

/// How many prior months an unpinned search may fall back through.
const FALLBACK_MONTHS: usize = 3;

/// What to look for. `month`/`year`/`doc_type` are whatever the intent
/// extractor recovered; anything unset widens the search.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub account: AccountNumber,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub doc_type: Option<DocumentType>,
}

/// Searches the document hierarchy for an invoice matching an account.
///
/// Each run owns its own candidate enumeration; the engine holds no state
/// between calls beyond the injected client.
pub struct DocumentSearch {
    drive: Arc<dyn BlobHierarchy>,
    resolver: FolderResolver,
    probe_timeout: Duration,
}

impl DocumentSearch {
    pub fn new(
        drive: Arc<dyn BlobHierarchy>,
        naming: coopnet_core::config::FolderNaming,
        probe_timeout: Duration,
    ) -> Self {
        let resolver = FolderResolver::new(drive.clone(), naming);
        Self {
            drive,
            resolver,
            probe_timeout,
        }
    }

    /// Search relative to today's date.
    pub async fn find_document(&self, query: &SearchQuery) -> Result<Option<LocatedDocument>> {
        self.find_document_at(query, Utc::now().date_naive()).await
    }

    /// Search with an explicit notion of "today" (tests pin this).
    ///
    /// A query with an explicit month is *pinned*: a miss for that period is
    /// the answer, never silently replaced by a neighboring month's invoice.
    /// Only month-less queries default to the current period and may fall
    /// back through the previous three months, nearest first.
    pub async fn find_document_at(
        &self,
        query: &SearchQuery,
        today: NaiveDate,
    ) -> Result<Option<LocatedDocument>> {
        let current = BillingPeriod::containing(today);
        let pinned = query.month.is_some();
        let month = query.month.unwrap_or(current.month);
        let year = query.year.unwrap_or(current.year);
        let target = BillingPeriod::new(month, year)
            .ok_or_else(|| Error::Config(format!("month out of range: {month}")))?;

        let mut period = target;
        for attempt in 0..=FALLBACK_MONTHS {
            if attempt > 0 {
                period = period.previous();
            }
            match self.probe_period(&query.account, period, query.doc_type).await {
                Ok(Some(found)) => {
                    debug!(
                        "account {} matched {} in {}",
                        query.account, found.handle.name, found.period
                    );
                    return Ok(Some(found));
                }
                Ok(None) => {}
                Err(Error::Timeout(ms)) if !pinned => {
                    warn!("candidate period {period} timed out after {ms}ms, moving on");
                }
                Err(e) => return Err(e),
            }
            if pinned {
                break;
            }
        }
        Ok(None)
    }

    /// Fetch the matched document's bytes.
    pub async fn download(&self, located: &LocatedDocument) -> Result<Vec<u8>> {
        self.bounded(self.drive.download(&located.handle)).await
    }

    /// Check one period: both invoice categories in fixed order, or just the
    /// requested one. First filename that decodes to the account wins;
    /// non-conforming filenames are skipped, not fatal.
    async fn probe_period(
        &self,
        account: &AccountNumber,
        period: BillingPeriod,
        requested: Option<DocumentType>,
    ) -> Result<Option<LocatedDocument>> {
        let candidates: &[DocumentType] = match requested {
            Some(DocumentType::Servicios) => &[DocumentType::Servicios],
            Some(DocumentType::Electricidad) => &[DocumentType::Electricidad],
            None => &DocumentType::ALL,
        };

        for &doc_type in candidates {
            let folder = match self.bounded(self.resolver.resolve(period, doc_type)).await? {
                Some(folder) => folder,
                None => continue,
            };
            let documents = self
                .bounded(self.drive.list_documents(&folder, PDF_MIME))
                .await?;
            for handle in documents {
                if decode_account(&handle.name).as_ref() == Some(account) {
                    return Ok(Some(LocatedDocument {
                        handle,
                        doc_type,
                        period,
                    }));
                }
            }
        }
        Ok(None)
    }

    async fn bounded<T>(&self, fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.probe_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.probe_timeout.as_millis() as u64)),
        }
    }
}
