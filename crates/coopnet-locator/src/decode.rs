//! Account extraction from invoice filenames.
//!
//! Uploaded invoices follow a naming convention the portal does not control:
//! a two-character prefix, then the account number as a 4-digit zero-padded
//! segment, then a per-document suffix, e.g. `0063700097-08-26.pdf` for
//! account 6370. The decode is positional; anything that does not fit the
//! shape is simply not an invoice we can match, never an error.

use crate::types::AccountNumber;

/// Byte range of the account segment inside the extension-stripped name.
const SEGMENT_START: usize = 2;
const SEGMENT_END: usize = 6;

/// Decode the account number encoded in `file_name`, or `None` when the
/// name does not follow the convention.
pub fn decode_account(file_name: &str) -> Option<AccountNumber> {
    let stem = strip_pdf_extension(file_name);
    let segment = stem.get(SEGMENT_START..SEGMENT_END)?;
    AccountNumber::canonicalize(segment)
}

/// Strip a trailing `.pdf` (any case). Other extensions are left alone; the
/// search layer already filters listings by mime type.
fn strip_pdf_extension(file_name: &str) -> &str {
    if let Some(idx) = file_name.len().checked_sub(4) {
        let ext_is_pdf = file_name
            .get(idx..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"));
        if ext_is_pdf {
            return &file_name[..idx];
        }
    }
    file_name
}
