//! Free-text request parsing using ordered regex patterns.
//!
//! Members write however they write; extraction is deliberately permissive.
//! Every field is independently optional and nothing here ever fails. An
//! unmatched field is simply left unset and the search widens accordingly.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{AccountNumber, DocumentType, SPANISH_MONTHS};

/// What was recovered from a message. All fields optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceIntent {
    pub account: Option<AccountNumber>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub doc_type: Option<DocumentType>,
}

// Account patterns, highest confidence first: a number next to a billing
// keyword beats a bare digit run, which could be anything (a phone number
// loses to the 3-6 digit shape anyway, but an address number would not).
static ACCOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bcuenta\s+(\d{3,6})\b").unwrap(),
        Regex::new(r"(?i)\bfactura\s+(\d{3,6})\b").unwrap(),
        Regex::new(r"(?i)\b(\d{3,6})\s+factura\b").unwrap(),
        Regex::new(r"(?i)\bn[úu]mero\s+(\d{3,6})\b").unwrap(),
    ]
});
static BARE_ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{3,6})\b").unwrap());

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

// Keyword presence decides the invoice category. Absence of both sets means
// the search checks both folders.
const SERVICIOS_KEYWORDS: &[&str] = &["servicio", "internet", "cable", "tv"];
const ELECTRICIDAD_KEYWORDS: &[&str] = &["electricidad", "luz", "energía", "energia"];

// Billing words that make a message an invoice request at all.
const INVOICE_KEYWORDS: &[&str] = &["factura", "recibo", "boleta"];

// "I want a new connection" phrasings. These must be tested BEFORE invoice
// extraction: "quiero internet" asks for an installation, "quiero mi factura
// de internet" asks for a bill, and only word order tells them apart.
static NEW_SERVICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)\bquiero\s+(?:internet|luz|electricidad|cable|tv|servicio)\b").unwrap(),
        Regex::new(r"(?i)\bnecesito\s+(?:internet|luz|electricidad|cable|tv|servicio)\b").unwrap(),
        Regex::new(r"(?i)\b(?:contratar|solicitar)\b.{0,40}\b(?:internet|luz|electricidad|cable|tv|servicio)\b")
            .unwrap(),
        Regex::new(r"(?i)\binstalaci[óo]n\b.{0,40}\b(?:internet|luz|electricidad|cable|tv|servicio)\b")
            .unwrap(),
        Regex::new(r"(?i)\bnuev[oa]\s+(?:conexi[óo]n|servicio|instalaci[óo]n)\b").unwrap(),
        Regex::new(r"(?i)\bconexi[óo]n\s+nueva\b").unwrap(),
    ]
});

/// First capture group of the first matching pattern.
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// True when the message is asking for a new connection or installation
/// rather than anything billing-related.
pub fn is_new_service_request(text: &str) -> bool {
    NEW_SERVICE_PATTERNS.iter().any(|re| re.is_match(text))
}

/// True when the message mentions a billing document at all.
pub fn mentions_invoice(text: &str) -> bool {
    let lower = text.to_lowercase();
    INVOICE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Extract whatever invoice-request fields the message carries.
pub fn extract_intent(text: &str) -> InvoiceIntent {
    let lower = text.to_lowercase();

    let account = first_capture(&ACCOUNT_PATTERNS, text)
        .or_else(|| {
            BARE_ACCOUNT_RE
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
        })
        .and_then(AccountNumber::canonicalize);

    let doc_type = if SERVICIOS_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(DocumentType::Servicios)
    } else if ELECTRICIDAD_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        Some(DocumentType::Electricidad)
    } else {
        None
    };

    // Earliest month name in the text wins.
    let month = SPANISH_MONTHS
        .iter()
        .enumerate()
        .filter_map(|(i, name)| lower.find(name).map(|pos| (pos, i as u32 + 1)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, month)| month);

    let year = YEAR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok());

    InvoiceIntent {
        account,
        month,
        year,
        doc_type,
    }
}
