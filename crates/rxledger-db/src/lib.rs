//! # rxledger-db: Ledger Store
//!
//! Persistence for purchase orders, sales, refunds and product stock,
//! on SQLite through sqlx.
//!
//! ```text
//! PurchaseManager / SalesManager / StockReconciler   (rxledger-engine)
//!                 │
//!                 ▼
//!   Database ── repositories ── embedded migrations
//!                 │
//!                 ▼
//!           SQLite file (WAL)
//! ```
//!
//! - [`pool`]: opening the store
//! - [`migrations`]: schema shipped inside the binary
//! - [`error`]: store failures
//! - [`repository`]: tenant and branch scoped reads and writes
//!

//! ## Usage
//!
//! ```rust,ignore
//! use rxledger_db::{Database, DbConfig, Scope};
//!
//! let db = Database::new(DbConfig::new("ledger.db")).await?;
//! let scope = Scope::new("tenant-1", "branch-1");
//! let hits = db.products().search(scope, "amox", 20).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::Scope;

pub use repository::party::{CustomerRepository, SupplierRepository};
pub use repository::product::ProductRepository;
pub use repository::purchase::{LineChange, PurchaseFilter, PurchaseRepository};
pub use repository::refund::RefundRepository;
pub use repository::sale::{SaleFilter, SaleRepository};
