//! Record store abstraction over the cooperative's hosted relational API.
//!
//! Tables here hold complaints, applications, survey answers, conversations
//! and the invoice-request ledger. The portal only ever needs generic row
//! operations, so the seam is a small trait and the hosted backend is one
//! implementation of it.

pub mod memory;
pub mod postgrest;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use coopnet_core::Result;
pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use types::Filter;

/// Generic row operations against a named table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one row.
    async fn insert(&self, table: &str, record: Value) -> Result<()>;

    /// Fetch all rows matching the filter.
    async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>>;

    /// Count rows matching the filter without fetching them.
    async fn count(&self, table: &str, filter: &Filter) -> Result<u64>;

    /// Apply a partial update to matching rows. Returns rows touched.
    async fn update(&self, table: &str, filter: &Filter, patch: Value) -> Result<u64>;

    /// Delete matching rows. Returns rows removed.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64>;
}
