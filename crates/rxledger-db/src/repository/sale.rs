//! # Sale Repository
//!
//! Sales and sale line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CREATE                                                             │
//! │     └── create(sale, items) → one transaction, status = completed      │
//! │                                                                         │
//! │  2. (engine) stock deltas, one atomic UPDATE per line                  │
//! │                                                                         │
//! │  3. (OPTIONAL) REFUND                                                  │
//! │     └── set_payment_status(Refunded), the only post-create write       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{like_pattern, Scope};
use crate::error::{DbError, DbResult};
use rxledger_core::{Sale, SaleLineItem, SalePaymentStatus};

const SALE_COLUMNS: &str = "id, tenant_id, branch_id, customer_id, sale_number, sale_date, \
     total_amount_cents, tax_amount_cents, discount_amount_cents, final_amount_cents, \
     payment_method, payment_status, status, notes, created_by, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price_cents, \
     total_price_cents, discount_cents, position";

/// Filters for [`SaleRepository::list`].
#[derive(Debug, Clone)]
pub struct SaleFilter {
    /// Substring of `sale_number` or `notes`.
    pub search: Option<String>,
    pub customer_id: Option<String>,
    pub payment_status: Option<SalePaymentStatus>,
    pub newest_first: bool,
    pub limit: u32,
}

impl Default for SaleFilter {
    fn default() -> Self {
        SaleFilter {
            search: None,
            customer_id: None,
            payment_status: None,
            newest_first: true,
            limit: 50,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Writes a sale and its items in one transaction.
    pub async fn create(&self, sale: &Sale, items: &[SaleLineItem]) -> DbResult<()> {
        debug!(id = %sale.id, sale_number = %sale.sale_number, items = items.len(), "Inserting sale");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, tenant_id, branch_id, customer_id, sale_number, sale_date,
                total_amount_cents, tax_amount_cents, discount_amount_cents, final_amount_cents,
                payment_method, payment_status, status, notes,
                created_by, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14,
                ?15, ?16, ?17
            )
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.tenant_id)
        .bind(&sale.branch_id)
        .bind(&sale.customer_id)
        .bind(&sale.sale_number)
        .bind(sale.sale_date)
        .bind(sale.total_amount_cents)
        .bind(sale.tax_amount_cents)
        .bind(sale.discount_amount_cents)
        .bind(sale.final_amount_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(sale.status)
        .bind(&sale.notes)
        .bind(&sale.created_by)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity,
                    unit_price_cents, total_price_cents, discount_cents, position
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.total_price_cents)
            .bind(item.discount_cents)
            .bind(item.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    pub async fn get(&self, scope: Scope<'_>, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE id = ?1 AND tenant_id = ?2 AND branch_id = ?3",
            SALE_COLUMNS
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Items of a sale in submitted order.
    pub async fn items(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let sql = format!(
            "SELECT {} FROM sale_items WHERE sale_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, SaleLineItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    pub async fn list(&self, scope: Scope<'_>, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(?filter, "Listing sales");

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM sales WHERE tenant_id = ", SALE_COLUMNS));
        qb.push_bind(scope.tenant_id);
        qb.push(" AND branch_id = ").push_bind(scope.branch_id);

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            qb.push(" AND (sale_number LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR notes LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(customer_id) = &filter.customer_id {
            qb.push(" AND customer_id = ").push_bind(customer_id.clone());
        }
        if let Some(status) = filter.payment_status {
            qb.push(" AND payment_status = ").push_bind(status);
        }

        qb.push(if filter.newest_first {
            " ORDER BY sale_date DESC, sale_number DESC"
        } else {
            " ORDER BY sale_date ASC, sale_number ASC"
        });
        qb.push(" LIMIT ").push_bind(i64::from(filter.limit));

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;
        Ok(sales)
    }

    /// Every sale in the scope, for statistics.
    pub async fn all(&self, scope: Scope<'_>) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales WHERE tenant_id = ?1 AND branch_id = ?2 ORDER BY sale_date",
            SALE_COLUMNS
        );

        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Sets a sale's payment status.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such sale in the scope
    pub async fn set_payment_status(
        &self,
        scope: Scope<'_>,
        id: &str,
        status: SalePaymentStatus,
    ) -> DbResult<()> {
        debug!(id = %id, status = %status.as_str(), "Updating sale payment status");

        let result = sqlx::query(
            r#"
            UPDATE sales SET payment_status = ?1, updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4 AND branch_id = ?5
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .bind(scope.tenant_id)
        .bind(scope.branch_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        Ok(())
    }
}
