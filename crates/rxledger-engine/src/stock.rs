//! # Stock Reconciliation
//!
//! Applies signed quantity deltas to product stock on behalf of purchase
//! receipts (`+`) and sales (`−`).
//!
//! ## Update Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  apply_delta(ctx, "P1", -3)                                             │
//! │                                                                         │
//! │    UPDATE products                                                      │
//! │       SET stock_quantity = stock_quantity + (-3)      ◄── one statement │
//! │     WHERE id = 'P1' AND tenant_id = ? AND branch_id = ?                 │
//! │    RETURNING stock_quantity                                             │
//! │                                                                         │
//! │  Two concurrent deltas on P1 both land: the increment happens inside    │
//! │  SQLite, never as read → compute → write in the engine.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no floor or ceiling: stock may go negative after an oversold
//! sale.

use serde::Serialize;
use tracing::{debug, warn};

use crate::context::IdentityContext;
use crate::error::ApiResult;
use rxledger_db::Database;

/// A product's stock before and after one delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockLevel {
    pub product_id: String,
    pub previous: i64,
    pub current: i64,
}

/// A delta that did not land.
#[derive(Debug, Clone, Serialize)]
pub struct StockFailure {
    pub product_id: String,
    pub delta: i64,
    pub reason: String,
}

/// Outcome of a batch of deltas.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StockReport {
    pub applied: Vec<StockLevel>,
    pub failed: Vec<StockFailure>,
}

impl StockReport {
    /// True when every delta in the batch landed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Product ids whose delta failed, in batch order.
    pub fn failed_products(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.product_id.as_str()).collect()
    }
}

/// Applies stock deltas within the caller's tenant and branch.
#[derive(Debug, Clone)]
pub struct StockReconciler {
    db: Database,
}

impl StockReconciler {
    pub fn new(db: Database) -> Self {
        StockReconciler { db }
    }

    /// Adds `delta` to a product's stock.
    ///
    /// ## Returns
    /// * `Ok(StockLevel)` - levels around the update
    /// * `Err(NOT_FOUND)` - no such product in the caller's branch
    pub async fn apply_delta(
        &self,
        ctx: &IdentityContext,
        product_id: &str,
        delta: i64,
    ) -> ApiResult<StockLevel> {
        ctx.validate()?;

        let current = self
            .db
            .products()
            .adjust_stock(ctx.scope(), product_id, delta)
            .await?;

        debug!(product_id = %product_id, delta, current, "Stock adjusted");

        Ok(StockLevel {
            product_id: product_id.to_string(),
            previous: current - delta,
            current,
        })
    }

    /// Applies each delta in order; a failure is recorded and the batch
    /// carries on.
    pub async fn apply_batch(&self, ctx: &IdentityContext, deltas: &[(String, i64)]) -> StockReport {
        let mut report = StockReport::default();

        for (product_id, delta) in deltas {
            match self.apply_delta(ctx, product_id, *delta).await {
                Ok(level) => report.applied.push(level),
                Err(e) => {
                    warn!(
                        product_id = %product_id,
                        delta = *delta,
                        error = %e,
                        "Stock update failed"
                    );
                    report.failed.push(StockFailure {
                        product_id: product_id.clone(),
                        delta: *delta,
                        reason: e.message,
                    });
                }
            }
        }

        report
    }
}
