//! # rxledger-engine: Order & Inventory Transaction Engine
//!
//! Multi-step document operations for a multi-tenant pharmacy back-office:
//! purchase orders, sales, refunds and the stock counters they move.
//!
//! ## Module Organization
//! ```text
//! rxledger_engine/
//! ├── lib.rs        ◄─── You are here (Engine handle)
//! ├── context.rs    ◄─── IdentityContext (tenant, branch, user)
//! ├── purchases.rs  ◄─── Purchase order lifecycle
//! ├── sales.rs      ◄─── Sales, refunds, statistics
//! ├── stock.rs      ◄─── Atomic stock deltas
//! ├── config.rs     ◄─── TOML + env configuration
//! ├── telemetry.rs  ◄─── tracing-subscriber setup
//! └── error.rs      ◄─── ApiError / ApiResponse
//! ```
//!
//! ## Startup
//! ```rust,no_run
//! use rxledger_engine::{config::EngineConfig, telemetry, Engine, IdentityContext};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EngineConfig::load(None)?;
//! telemetry::init_tracing(&config.logging.filter);
//!
//! let engine = Engine::connect(&config).await?;
//! let ctx = IdentityContext::new("tenant-a", "branch-1", "user-7");
//! let stats = engine.sales().get_stats(&ctx).await?;
//! println!("net revenue: {}", stats.net_revenue_cents);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod purchases;
pub mod sales;
pub mod stock;
pub mod telemetry;

pub use context::IdentityContext;
pub use error::{ApiError, ApiResponse, ApiResult, ErrorCode};
pub use purchases::{PurchaseManager, PurchaseOutcome, PurchaseQuery};
pub use sales::{SaleQuery, SalesManager};
pub use stock::{StockFailure, StockLevel, StockReconciler, StockReport};

use tracing::info;

use config::{DocumentSettings, EngineConfig};
use rxledger_db::Database;

/// Entry point holding the store and the three services.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Database,
    purchases: PurchaseManager,
    sales: SalesManager,
    stock: StockReconciler,
}

impl Engine {
    /// Opens the configured database (running migrations) and builds the
    /// services.
    pub async fn connect(config: &EngineConfig) -> ApiResult<Self> {
        info!(path = ?config.database.path, "Opening ledger store");
        let db = Database::new(config.to_db_config()).await?;
        Ok(Engine::new(db, config.documents.clone()))
    }

    pub fn new(db: Database, settings: DocumentSettings) -> Self {
        let stock = StockReconciler::new(db.clone());
        Engine {
            purchases: PurchaseManager::new(db.clone(), stock.clone(), settings.clone()),
            sales: SalesManager::new(db.clone(), stock.clone(), settings),
            stock,
            db,
        }
    }

    pub fn purchases(&self) -> &PurchaseManager {
        &self.purchases
    }

    pub fn sales(&self) -> &SalesManager {
        &self.sales
    }

    pub fn stock(&self) -> &StockReconciler {
        &self.stock
    }

    /// Direct store access, for reference data the engine doesn't manage.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================


// =============================================================================
// End-to-end Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, BRANCH, TENANT};
    use rxledger_core::access::has_access;
    use rxledger_core::totals::{purchase_totals, PURCHASE_TAX_RATE};
    use rxledger_core::{
        NewPurchaseLineItem, NewPurchaseOrder, NewRefund, NewSale, NewSaleLineItem,
        PaymentMethod, PurchaseOrderPatch, ReceivedItem, SalePaymentStatus,
    };

    async fn engine() -> (Engine, String, String) {
        let db = testing::db().await;
        let supplier = testing::supplier(&db, TENANT, "Kibo Wholesale Chemists").await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 20).await;
        (Engine::new(db, DocumentSettings::default()), supplier, p1)
    }

    fn po(supplier: &str, items: Vec<NewPurchaseLineItem>, discount: i64) -> NewPurchaseOrder {
        NewPurchaseOrder {
            supplier_id: supplier.to_string(),
            items,
            discount_cents: Some(discount),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stored_totals_match_recompute_after_create_and_update() {
        let (engine, supplier, _) = engine().await;
        let ctx = testing::ctx();

        for (items, discount) in [
            (vec![NewPurchaseLineItem::new("A", 1, 1000)], 0),
            (vec![NewPurchaseLineItem::new("A", 1, 999)], 0),
            (
                vec![
                    NewPurchaseLineItem::new("A", 3, 333),
                    NewPurchaseLineItem::new("B", 12, 7),
                ],
                50,
            ),
        ] {
            let created = engine
                .purchases()
                .create(&ctx, po(&supplier, items, discount))
                .await
                .unwrap();
            let stored = engine.purchases().get(&ctx, &created.order.id).await.unwrap();
            let recomputed = purchase_totals(&stored.items, discount, PURCHASE_TAX_RATE);
            assert_eq!(recomputed.total_cents, stored.order.total_amount_cents);
            assert_eq!(recomputed.tax_cents, stored.order.tax_cents);

            let replacement = vec![NewPurchaseLineItem::new("C", 5, 41)];
            engine
                .purchases()
                .update(
                    &ctx,
                    &created.order.id,
                    PurchaseOrderPatch {
                        items: Some(replacement),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            let stored = engine.purchases().get(&ctx, &created.order.id).await.unwrap();
            let recomputed = purchase_totals(&stored.items, discount, PURCHASE_TAX_RATE);
            assert_eq!(recomputed.total_cents, stored.order.total_amount_cents);
        }
    }

    #[tokio::test]
    async fn test_tax_examples_and_discount_clamp() {
        let (engine, supplier, _) = engine().await;
        let ctx = testing::ctx();

        let t = engine
            .purchases()
            .create(&ctx, po(&supplier, vec![NewPurchaseLineItem::new("A", 1, 1000)], 0))
            .await
            .unwrap();
        assert_eq!(t.order.tax_cents, 180);

        let t = engine
            .purchases()
            .create(&ctx, po(&supplier, vec![NewPurchaseLineItem::new("A", 1, 999)], 0))
            .await
            .unwrap();
        assert_eq!(t.order.tax_cents, 180);

        let t = engine
            .purchases()
            .create(&ctx, po(&supplier, vec![NewPurchaseLineItem::new("A", 1, 1000)], 1180))
            .await
            .unwrap();
        assert_eq!(t.order.total_amount_cents, 0);
    }

    #[tokio::test]
    async fn test_document_round_trip_moves_stock() {
        let (engine, supplier, p1) = engine().await;
        let ctx = testing::ctx();
        let db = engine.database().clone();

        // receive 5 of P1
        let order = engine
            .purchases()
            .create(
                &ctx,
                po(
                    &supplier,
                    vec![NewPurchaseLineItem::new("Amoxicillin", 5, 300).with_product(&p1)],
                    0,
                ),
            )
            .await
            .unwrap();
        engine
            .purchases()
            .mark_received(&ctx, &order.order.id, &[ReceivedItem::for_product(&p1, 5)])
            .await
            .unwrap();
        assert_eq!(testing::stock_of(&db, &p1).await, 25);

        // sell 3 of P1
        let sale = engine
            .sales()
            .create_sale(
                &ctx,
                NewSale {
                    customer_id: None,
                    items: vec![NewSaleLineItem::new(&p1, 3, 450)],
                    payment_method: PaymentMethod::MobileMoney,
                    discount_amount_cents: None,
                    tax_amount_cents: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(testing::stock_of(&db, &p1).await, 22);

        // refund: status flips, stock stays
        engine
            .sales()
            .create_refund(
                &ctx,
                NewRefund {
                    sale_id: sale.sale.id.clone(),
                    refund_amount_cents: sale.sale.final_amount_cents,
                    refund_reason: "Customer returned unopened".to_string(),
                    refund_method: PaymentMethod::MobileMoney,
                },
            )
            .await
            .unwrap();
        let stored = engine.sales().get_sale(&ctx, &sale.sale.id).await.unwrap();
        assert_eq!(stored.sale.payment_status, SalePaymentStatus::Refunded);
        assert_eq!(testing::stock_of(&db, &p1).await, 22);

        // delete the order: no items left, no stock reversal
        engine.purchases().delete(&ctx, &order.order.id).await.unwrap();
        assert!(db.purchases().items(&order.order.id).await.unwrap().is_empty());
        assert_eq!(testing::stock_of(&db, &p1).await, 22);
    }

    #[tokio::test]
    async fn test_missing_context_fails_every_operation() {
        let (engine, _, p1) = engine().await;
        let blank = IdentityContext::new("", BRANCH, "user-1");

        let err = engine.stock().apply_delta(&blank, &p1, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingContext);
        let err = engine.sales().get_stats(&blank).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingContext);
        let err = engine
            .purchases()
            .list(&blank, &PurchaseQuery::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingContext);
        assert_eq!(testing::stock_of(engine.database(), &p1).await, 20);
    }

    #[tokio::test]
    async fn test_connect_with_config() {
        let mut config = EngineConfig::default();
        config.database.path = ":memory:".into();
        config.database.max_connections = 1;
        config.documents.purchase_prefix = "LPO".to_string();

        let engine = Engine::connect(&config).await.unwrap();
        assert!(engine.database().health_check().await);

        let ctx = testing::ctx();
        let supplier = testing::supplier(engine.database(), TENANT, "MedSupply Ltd").await;
        let created = engine
            .purchases()
            .create(&ctx, po(&supplier, vec![NewPurchaseLineItem::new("A", 1, 100)], 0))
            .await
            .unwrap();
        assert!(created.order.purchase_number.starts_with("LPO"));
    }

    #[test]
    fn test_navigation_examples() {
        assert!(has_access("/branch/sales/pos", "cashier"));
        assert!(!has_access("/tenant/users", "cashier"));
    }
}
