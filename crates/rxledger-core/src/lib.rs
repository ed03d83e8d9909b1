//! # rxledger-core: Pure Business Logic for the Transaction Engine
//!
//! Everything in this crate is deterministic and free of I/O. The database
//! layer (`rxledger-db`) and the orchestration layer (`rxledger-engine`) build
//! on top of it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rxledger Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 rxledger-engine (orchestration)                 │   │
//! │  │   PurchaseManager ── SalesManager ── StockReconciler            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ rxledger-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌──────────┐ ┌──────┐  │   │
//! │  │   │  types  │ │ totals  │ │ lifecycle │ │validation│ │access│  │   │
//! │  │   │ Purchase│ │ Money   │ │ PO status │ │  rules   │ │ menus│  │   │
//! │  │   │ Sale    │ │ Tax     │ │ machine   │ │          │ │routes│  │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └──────────┘ └──────┘  │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rxledger-db (Ledger Store)                      │   │
//! │  │        SQLite repositories scoped by tenant + branch            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (PurchaseOrder, Sale, Refund, Product, ...)
//! - [`money`] - Integer money and tax rates
//! - [`totals`] - Pricing & totals calculator
//! - [`lifecycle`] - Purchase order status machine
//! - [`validation`] - Input validation for new documents
//! - [`numbering`] - Purchase/sale number generation
//! - [`stats`] - Sales statistics aggregation
//! - [`access`] - Role menus and route authorization
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rxledger_core::totals::{purchase_totals, PURCHASE_TAX_RATE};
//! use rxledger_core::types::NewPurchaseLineItem;
//!
//! let items = vec![NewPurchaseLineItem::new("Amoxicillin 500mg", 10, 100)];
//! let totals = purchase_totals(&items, 0, PURCHASE_TAX_RATE);
//!
//! assert_eq!(totals.subtotal_cents, 1000);
//! assert_eq!(totals.tax_cents, 180);
//! assert_eq!(totals.total_cents, 1180);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod numbering;
pub mod stats;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items accepted on a single purchase order or sale.
///
/// Keeps a mistyped import from producing a document with thousands of rows.
pub const MAX_LINE_ITEMS: usize = 500;

/// Maximum quantity on a single line item.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Largest single amount accepted on input, in cents.
///
/// At this cap a full document of [`MAX_LINE_ITEMS`] lines at
/// [`MAX_LINE_QUANTITY`] still fits in an `i64` with tax on top.
pub const MAX_AMOUNT_CENTS: i64 = 10_000_000_000;
