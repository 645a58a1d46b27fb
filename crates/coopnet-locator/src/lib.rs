//! Invoice document locator — the search core of the member portal.
//!
//! Given a member's free-text message, recover what they asked for
//! ([`intent`]), map billing periods to storage folders ([`folder`]), walk
//! the document hierarchy for a filename that decodes to their account
//! ([`decode`], [`search`]), and book successful lookups ([`ledger`]).

pub mod decode;
pub mod folder;
pub mod intent;
pub mod ledger;
pub mod search;
pub mod types;

pub use decode::decode_account;
pub use folder::FolderResolver;
pub use intent::{extract_intent, is_new_service_request, mentions_invoice, InvoiceIntent};
pub use ledger::RequestLedger;
pub use search::{DocumentSearch, SearchQuery};
pub use types::{AccountNumber, BillingPeriod, DocumentType, LocatedDocument};
