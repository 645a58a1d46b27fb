//! Document hierarchy abstraction over the cooperative's hosted blob storage.
//!
//! Invoices live in per-period folders; the portal only needs three
//! operations against that hierarchy, so the seam is a small trait with the
//! Google Drive REST client as the production implementation.

pub mod google;
pub mod types;

use async_trait::async_trait;

use coopnet_core::Result;
pub use google::GoogleDrive;
pub use types::{DocumentHandle, FolderHandle};

/// PDF mime type used when enumerating invoice folders.
pub const PDF_MIME: &str = "application/pdf";

/// Read access to a folder-structured blob hierarchy.
#[async_trait]
pub trait BlobHierarchy: Send + Sync {
    /// Case-sensitive exact-name folder lookup, excluding trashed entries.
    /// A missing folder is the expected outcome, not an error.
    async fn find_folder_by_exact_name(&self, name: &str) -> Result<Option<FolderHandle>>;

    /// List documents inside a folder, restricted to the given mime type.
    async fn list_documents(
        &self,
        folder: &FolderHandle,
        mime_type: &str,
    ) -> Result<Vec<DocumentHandle>>;

    /// Fetch a document's raw bytes.
    async fn download(&self, document: &DocumentHandle) -> Result<Vec<u8>>;
}
