//! Domain types for billing accounts, periods and invoice categories.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use coopnet_drive::DocumentHandle;

/// Lowercase Spanish month names, January first. These are the exact strings
/// that appear in folder names, so the table is the single source of truth
/// for both directions of the mapping.
pub const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// A member's billing account number.
///
/// Canonical form is the base-10 digits without leading zeros, so the same
/// account compares equal whether it came out of a zero-padded filename
/// segment or a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Canonicalize a digit string. Returns `None` for anything that is not
    /// all ASCII digits or does not fit a `u32`.
    pub fn canonicalize(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u32 = raw.parse().ok()?;
        Some(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invoice category. Each category gets its own folder from the type-split
/// cutover onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Servicios,
    Electricidad,
}

impl DocumentType {
    /// Fixed search order: Servicios before Electricidad.
    pub const ALL: [DocumentType; 2] = [DocumentType::Servicios, DocumentType::Electricidad];

    /// Wire name used in folder names and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Servicios => "servicios",
            DocumentType::Electricidad => "electricidad",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (month, year) billing period. Month is always 1-12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub month: u32,
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    /// The calendar month containing `today`.
    pub fn containing(today: NaiveDate) -> Self {
        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// The immediately preceding calendar month.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    /// Lowercase Spanish name of the month.
    pub fn month_name(&self) -> &'static str {
        SPANISH_MONTHS[(self.month - 1) as usize]
    }

    /// Parse a Spanish month name (any case) back to 1-12.
    pub fn month_from_name(name: &str) -> Option<u32> {
        let lower = name.to_lowercase();
        SPANISH_MONTHS
            .iter()
            .position(|m| *m == lower)
            .map(|i| i as u32 + 1)
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// A successful search result: the document plus how it was classified.
#[derive(Debug, Clone, Serialize)]
pub struct LocatedDocument {
    pub handle: DocumentHandle,
    pub doc_type: DocumentType,
    pub period: BillingPeriod,
}
