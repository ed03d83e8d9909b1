//! # Sales & Refunds
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_sale                                                            │
//! │    1. validate items, check customer (walk-in when absent)              │
//! │    2. totals: Σ lines − discount + tax (caller-supplied), floor 0       │
//! │    3. sale + items in one transaction (completed / completed)           │
//! │    4. −quantity per item, each independently                            │
//! │         └─ any failure ──► PARTIAL_WRITE (sale stays persisted)         │
//! │                                                                         │
//! │  create_refund                                                          │
//! │    1. sale must exist in scope                                          │
//! │    2. refund row (completed)                                            │
//! │    3. sale.payment_status = refunded                                    │
//! │         └─ failure ──► PARTIAL_WRITE (refund stays persisted)           │
//! │    stock is never touched by a refund                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::DocumentSettings;
use crate::context::IdentityContext;
use crate::error::{ApiError, ApiResult};
use crate::stock::StockReconciler;
use rxledger_core::numbering::sale_number;
use rxledger_core::stats::{self, SalesStats};
use rxledger_core::totals::sale_totals;
use rxledger_core::validation::{validate_new_refund, validate_new_sale};
use rxledger_core::{
    NewRefund, NewSale, Refund, RefundStatus, Sale, SaleDetail, SaleLineItem, SalePaymentStatus,
    SaleStatus,
};
use rxledger_db::{Database, SaleFilter};

/// Listing options for [`SalesManager::list_sales`].
#[derive(Debug, Clone)]
pub struct SaleQuery {
    /// Substring of the sale number or notes.
    pub search: Option<String>,
    pub customer_id: Option<String>,
    pub payment_status: Option<SalePaymentStatus>,
    pub newest_first: bool,
    /// Falls back to `documents.default_list_limit`.
    pub limit: Option<u32>,
}

impl Default for SaleQuery {
    fn default() -> Self {
        SaleQuery {
            search: None,
            customer_id: None,
            payment_status: None,
            newest_first: true,
            limit: None,
        }
    }
}

/// Orchestrates sales, refunds and sales statistics.
#[derive(Debug, Clone)]
pub struct SalesManager {
    db: Database,
    stock: StockReconciler,
    settings: DocumentSettings,
}

impl SalesManager {
    pub fn new(db: Database, stock: StockReconciler, settings: DocumentSettings) -> Self {
        SalesManager { db, stock, settings }
    }

    /// Records a completed sale and takes its quantities out of stock.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - no items, bad quantity/price/discount/tax
    /// * `NOT_FOUND` - customer not in the caller's tenant
    /// * `PARTIAL_WRITE` - sale saved, but some stock decrements failed
    pub async fn create_sale(&self, ctx: &IdentityContext, input: NewSale) -> ApiResult<SaleDetail> {
        ctx.validate()?;
        validate_new_sale(&input)?;

        if let Some(customer_id) = &input.customer_id {
            if self.db.customers().get(&ctx.tenant_id, customer_id).await?.is_none() {
                return Err(ApiError::not_found("Customer", customer_id));
            }
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let totals = sale_totals(
            &input.items,
            input.discount_amount_cents.unwrap_or(0),
            input.tax_amount_cents.unwrap_or(0),
        );

        let sale = Sale {
            id: id.clone(),
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            customer_id: input.customer_id,
            sale_number: sale_number(&self.settings.sale_prefix, now),
            sale_date: now,
            total_amount_cents: totals.total_amount_cents,
            tax_amount_cents: totals.tax_amount_cents,
            discount_amount_cents: totals.discount_amount_cents,
            final_amount_cents: totals.final_amount_cents,
            payment_method: input.payment_method,
            payment_status: SalePaymentStatus::Completed,
            status: SaleStatus::Completed,
            notes: input.notes,
            created_by: ctx.user_id.clone(),
            created_at: now,
            updated_at: now,
        };

        let items: Vec<SaleLineItem> = input
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| SaleLineItem {
                id: Uuid::new_v4().to_string(),
                sale_id: id.clone(),
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                total_price_cents: item.line_total().cents(),
                discount_cents: item.discount_cents,
                position: position as i64,
            })
            .collect();

        self.db.sales().create(&sale, &items).await?;

        let deltas: Vec<(String, i64)> = items
            .iter()
            .map(|item| (item.product_id.clone(), -item.quantity))
            .collect();
        let report = self.stock.apply_batch(ctx, &deltas).await;

        if !report.is_complete() {
            let failed = report.failed_products().join(", ");
            error!(
                sale_id = %sale.id,
                number = %sale.sale_number,
                failed = %failed,
                "Sale saved with stock updates missing"
            );
            return Err(ApiError::partial_write(format!(
                "Sale {} ({}) was saved but stock was not updated for: {}",
                sale.sale_number, sale.id, failed
            )));
        }

        info!(
            id = %sale.id,
            number = %sale.sale_number,
            total = sale.final_amount_cents,
            items = items.len(),
            "Sale created"
        );

        Ok(SaleDetail { sale, items })
    }

    /// Records a refund and flags the sale `refunded`. Stock is unchanged.
    ///
    /// The amount is not checked against the sale; an amount above the
    /// sale's final amount is only logged.
    ///
    /// ## Errors
    /// * `NOT_FOUND` - sale not in the caller's branch
    /// * `PARTIAL_WRITE` - refund saved, sale status not updated
    pub async fn create_refund(&self, ctx: &IdentityContext, input: NewRefund) -> ApiResult<Refund> {
        ctx.validate()?;
        validate_new_refund(&input)?;

        let sale = self
            .db
            .sales()
            .get(ctx.scope(), &input.sale_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Sale", &input.sale_id))?;

        if input.refund_amount_cents > sale.final_amount_cents {
            warn!(
                sale_id = %sale.id,
                refund = input.refund_amount_cents,
                final_amount = sale.final_amount_cents,
                "Refund exceeds sale amount"
            );
        }

        let refund = Refund {
            id: Uuid::new_v4().to_string(),
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            sale_id: sale.id.clone(),
            refund_amount_cents: input.refund_amount_cents,
            refund_reason: input.refund_reason,
            refund_method: input.refund_method,
            status: RefundStatus::Completed,
            created_by: ctx.user_id.clone(),
            created_at: Utc::now(),
        };

        self.db.refunds().insert(&refund).await?;

        if let Err(e) = self
            .db
            .sales()
            .set_payment_status(ctx.scope(), &sale.id, SalePaymentStatus::Refunded)
            .await
        {
            error!(sale_id = %sale.id, refund_id = %refund.id, error = %e, "Refund saved, sale not flagged");
            return Err(ApiError::partial_write(format!(
                "Refund {} was saved but sale {} was not marked refunded",
                refund.id, sale.id
            )));
        }

        info!(
            id = %refund.id,
            sale_id = %sale.id,
            amount = refund.refund_amount_cents,
            "Refund created"
        );

        Ok(refund)
    }

    /// Dashboard figures for the caller's branch.
    pub async fn get_stats(&self, ctx: &IdentityContext) -> ApiResult<SalesStats> {
        ctx.validate()?;
        let sales = self.db.sales().all(ctx.scope()).await?;
        let refunds = self.db.refunds().list(ctx.scope(), None).await?;
        Ok(stats::compute(&sales, &refunds, Utc::now()))
    }

    pub async fn get_sale(&self, ctx: &IdentityContext, id: &str) -> ApiResult<SaleDetail> {
        ctx.validate()?;
        let sale = self
            .db
            .sales()
            .get(ctx.scope(), id)
            .await?
            .ok_or_else(|| ApiError::not_found("Sale", id))?;
        let items = self.db.sales().items(&sale.id).await?;
        Ok(SaleDetail { sale, items })
    }

    pub async fn list_sales(&self, ctx: &IdentityContext, query: &SaleQuery) -> ApiResult<Vec<Sale>> {
        ctx.validate()?;

        let filter = SaleFilter {
            search: query.search.clone(),
            customer_id: query.customer_id.clone(),
            payment_status: query.payment_status,
            newest_first: query.newest_first,
            limit: query.limit.unwrap_or(self.settings.default_list_limit),
        };

        Ok(self.db.sales().list(ctx.scope(), &filter).await?)
    }

    /// Refunds in the caller's branch, newest first, optionally for one sale.
    pub async fn list_refunds(
        &self,
        ctx: &IdentityContext,
        sale_id: Option<&str>,
    ) -> ApiResult<Vec<Refund>> {
        ctx.validate()?;
        Ok(self.db.refunds().list(ctx.scope(), sale_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{self, BRANCH, TENANT};
    use rxledger_core::{NewSaleLineItem, PaymentMethod};

    async fn manager() -> (Database, SalesManager) {
        let db = testing::db().await;
        let manager = SalesManager::new(
            db.clone(),
            StockReconciler::new(db.clone()),
            DocumentSettings::default(),
        );
        (db, manager)
    }

    fn sale_of(items: Vec<NewSaleLineItem>) -> NewSale {
        NewSale {
            customer_id: None,
            items,
            payment_method: PaymentMethod::Cash,
            discount_amount_cents: None,
            tax_amount_cents: None,
            notes: None,
        }
    }

    fn refund_of(sale_id: &str, amount: i64) -> NewRefund {
        NewRefund {
            sale_id: sale_id.to_string(),
            refund_amount_cents: amount,
            refund_reason: "Wrong strength dispensed".to_string(),
            refund_method: PaymentMethod::Cash,
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_stores_totals() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();

        let mut input = sale_of(vec![NewSaleLineItem::new(&p1, 3, 500)]);
        input.discount_amount_cents = Some(100);
        input.tax_amount_cents = Some(45);
        let detail = sales.create_sale(&ctx, input).await.unwrap();

        assert_eq!(testing::stock_of(&db, &p1).await, 7);
        assert_eq!(detail.sale.total_amount_cents, 1500);
        assert_eq!(detail.sale.final_amount_cents, 1500 - 100 + 45);
        assert_eq!(detail.sale.payment_status, SalePaymentStatus::Completed);
        assert_eq!(detail.sale.status, SaleStatus::Completed);
        assert!(detail.sale.sale_number.starts_with("SALE"));

        let stored = sales.get_sale(&ctx, &detail.sale.id).await.unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].total_price_cents, 1500);
    }

    #[tokio::test]
    async fn test_sale_may_oversell() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 1).await;
        sales
            .create_sale(&testing::ctx(), sale_of(vec![NewSaleLineItem::new(&p1, 4, 100)]))
            .await
            .unwrap();
        assert_eq!(testing::stock_of(&db, &p1).await, -3);
    }

    #[tokio::test]
    async fn test_final_amount_clamps_at_zero() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 5).await;
        let mut input = sale_of(vec![NewSaleLineItem::new(&p1, 1, 100)]);
        input.discount_amount_cents = Some(1000);
        let detail = sales.create_sale(&testing::ctx(), input).await.unwrap();
        assert_eq!(detail.sale.final_amount_cents, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_partial_write() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();

        let err = sales
            .create_sale(
                &ctx,
                sale_of(vec![
                    NewSaleLineItem::new("ghost", 1, 100),
                    NewSaleLineItem::new(&p1, 2, 100),
                ]),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PartialWrite);
        assert!(err.message.contains("ghost"));
        // later items still applied, sale persisted
        assert_eq!(testing::stock_of(&db, &p1).await, 8);
        let listed = sales.list_sales(&ctx, &SaleQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_sale_validation_and_customer_checks() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();

        let err = sales.create_sale(&ctx, sale_of(vec![])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 0, 100)]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut input = sale_of(vec![NewSaleLineItem::new(&p1, 1, 100)]);
        input.customer_id = Some("ghost".to_string());
        let err = sales.create_sale(&ctx, input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let customer = testing::customer(&db, TENANT, "Amina Njeri").await;
        let mut input = sale_of(vec![NewSaleLineItem::new(&p1, 1, 100)]);
        input.customer_id = Some(customer.clone());
        let detail = sales.create_sale(&ctx, input).await.unwrap();
        assert_eq!(detail.sale.customer_id, Some(customer));

        // only the accepted sale touched stock
        assert_eq!(testing::stock_of(&db, &p1).await, 9);
    }

    #[tokio::test]
    async fn test_refund_flags_sale_and_leaves_stock() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();
        let detail = sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 3, 500)]))
            .await
            .unwrap();

        let refund = sales.create_refund(&ctx, refund_of(&detail.sale.id, 500)).await.unwrap();
        assert_eq!(refund.status, RefundStatus::Completed);
        assert_eq!(refund.created_by, "user-1");

        let stored = sales.get_sale(&ctx, &detail.sale.id).await.unwrap();
        assert_eq!(stored.sale.payment_status, SalePaymentStatus::Refunded);
        assert_eq!(testing::stock_of(&db, &p1).await, 7);

        let refunds = sales.list_refunds(&ctx, Some(&detail.sale.id)).await.unwrap();
        assert_eq!(refunds.len(), 1);
    }

    #[tokio::test]
    async fn test_refund_amount_is_not_capped() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();
        let detail = sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 1, 100)]))
            .await
            .unwrap();

        let refund = sales.create_refund(&ctx, refund_of(&detail.sale.id, 5000)).await.unwrap();
        assert_eq!(refund.refund_amount_cents, 5000);
    }

    #[tokio::test]
    async fn test_refund_for_missing_or_foreign_sale() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 10).await;
        let ctx = testing::ctx();

        let err = sales.create_refund(&ctx, refund_of("ghost", 100)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let detail = sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 1, 100)]))
            .await
            .unwrap();
        let other_tenant = IdentityContext::new("tenant-b", BRANCH, "user-9");
        let err = sales
            .create_refund(&other_tenant, refund_of(&detail.sale.id, 100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(sales.list_refunds(&ctx, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_net_out_refunds() {
        let (db, sales) = manager().await;
        let p1 = testing::product(&db, TENANT, BRANCH, "P1", 100).await;
        let ctx = testing::ctx();

        let empty = sales.get_stats(&ctx).await.unwrap();
        assert_eq!(empty, SalesStats::default());

        let first = sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 2, 1000)]))
            .await
            .unwrap();
        sales
            .create_sale(&ctx, sale_of(vec![NewSaleLineItem::new(&p1, 1, 1000)]))
            .await
            .unwrap();
        sales.create_refund(&ctx, refund_of(&first.sale.id, 500)).await.unwrap();

        let stats = sales.get_stats(&ctx).await.unwrap();
        assert_eq!(stats.total_sales, 2);
        assert_eq!(stats.total_revenue_cents, 3000);
        assert_eq!(stats.today_sales, 2);
        assert_eq!(stats.month_revenue_cents, 3000);
        assert_eq!(stats.refund_amount_cents, 500);
        assert_eq!(stats.net_revenue_cents, 2500);
        assert_eq!(stats.average_order_value_cents, 1500);

        let other = IdentityContext::new(TENANT, "branch-2", "user-2");
        assert_eq!(sales.get_stats(&other).await.unwrap().total_sales, 0);
    }
}
