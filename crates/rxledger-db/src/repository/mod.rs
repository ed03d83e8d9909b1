//! # Repository Module
//!
//! Tenant/branch scoped repositories over the ledger tables.
//!
//! ## Scoping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every query carries the caller's scope as equality filters:           │
//! │                                                                         │
//! │    products, purchase_orders, sales, refunds                           │
//! │        WHERE tenant_id = ? AND branch_id = ? [AND id = ?]              │
//! │                                                                         │
//! │    suppliers, customers (tenant-wide reference data)                   │
//! │        WHERE tenant_id = ? [AND id = ?]                                │
//! │                                                                         │
//! │  A row outside the scope is indistinguishable from a missing row.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line-item tables are reached only through their parent document, whose
//! scope has already been checked.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products, search, atomic stock deltas
//! - [`party::SupplierRepository`] / [`party::CustomerRepository`] - Reference data
//! - [`purchase::PurchaseRepository`] - Purchase orders + line items
//! - [`sale::SaleRepository`] - Sales + line items
//! - [`refund::RefundRepository`] - Refunds

pub mod party;
pub mod product;
pub mod purchase;
pub mod refund;
pub mod sale;

/// Tenant + branch a query is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope<'a> {
    pub tenant_id: &'a str,
    pub branch_id: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(tenant_id: &'a str, branch_id: &'a str) -> Self {
        Scope {
            tenant_id,
            branch_id,
        }
    }
}

/// Escapes `%`, `_` and `\` so user input matches literally inside LIKE.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// =============================================================================
// Test Fixtures
// =============================================================================
