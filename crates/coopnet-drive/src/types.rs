//! Handle types returned by the document hierarchy.

use serde::{Deserialize, Serialize};

/// Opaque reference to a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderHandle {
    pub id: String,
    pub name: String,
}

/// Opaque reference to a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHandle {
    pub id: String,
    pub name: String,
}
