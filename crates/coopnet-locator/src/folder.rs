//! Billing-period folder naming and resolution.

use std::sync::Arc;

use coopnet_core::config::FolderNaming;
use coopnet_core::Result;
use coopnet_drive::{BlobHierarchy, FolderHandle};

use crate::types::{BillingPeriod, DocumentType};

/// Compute the folder name for a period and invoice category.
///
/// Periods from the cutover onward use `{type}-{month}-{year}`; earlier
/// periods share one folder whose name comes from the configured template.
pub fn folder_name(
    naming: &FolderNaming,
    period: BillingPeriod,
    doc_type: DocumentType,
) -> String {
    if is_before_cutover(naming, period) {
        naming
            .shared_template
            .replace("{month}", period.month_name())
            .replace("{year}", &period.year.to_string())
    } else {
        format!(
            "{}-{}-{}",
            doc_type.as_str(),
            period.month_name(),
            period.year
        )
    }
}

fn is_before_cutover(naming: &FolderNaming, period: BillingPeriod) -> bool {
    (period.year, period.month) < (naming.cutover_year, naming.cutover_month)
}

/// Maps (period, type) to a folder handle in the document hierarchy.
///
/// Folders are looked up per call, never cached: uploads land at any time
/// and a stale handle is worse than one extra listing round-trip.
pub struct FolderResolver {
    drive: Arc<dyn BlobHierarchy>,
    naming: FolderNaming,
}

impl FolderResolver {
    pub fn new(drive: Arc<dyn BlobHierarchy>, naming: FolderNaming) -> Self {
        Self { drive, naming }
    }

    /// Exact-name lookup. `Ok(None)` is the expected miss for periods with
    /// no uploads yet.
    pub async fn resolve(
        &self,
        period: BillingPeriod,
        doc_type: DocumentType,
    ) -> Result<Option<FolderHandle>> {
        let name = folder_name(&self.naming, period, doc_type);
        self.drive.find_folder_by_exact_name(&name).await
    }
}
