//! # Document Numbering
//!
//! Human-readable business identifiers for purchase orders and sales.
//!
//! ```text
//! purchase:  <prefix><yy><mm>-<nnnnnn>          PO2610-048213
//! sale:      <prefix><yymmddHHMMSS>-<nnnnnn>    SALE261019143055-091744
//! ```
//!
//! The suffix is random. Collisions are not retried here; the store's
//! UNIQUE index rejects a duplicate number.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Default prefix for purchase order numbers.
pub const DEFAULT_PURCHASE_PREFIX: &str = "PO";

/// Default prefix for sale numbers.
pub const DEFAULT_SALE_PREFIX: &str = "SALE";

/// Six random decimal digits, zero-padded.
fn random_suffix() -> String {
    let n = Uuid::new_v4().as_u128() % 1_000_000;
    format!("{:06}", n)
}

/// Generates a purchase order number for `now`.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use rxledger_core::numbering::purchase_number;
///
/// let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
/// let number = purchase_number("PO", now);
/// assert!(number.starts_with("PO2610-"));
/// assert_eq!(number.len(), "PO2610-000000".len());
/// ```
pub fn purchase_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}-{}", prefix, now.format("%y%m"), random_suffix())
}

/// Generates a sale number for `now`.
pub fn sale_number(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}-{}", prefix, now.format("%y%m%d%H%M%S"), random_suffix())
}
