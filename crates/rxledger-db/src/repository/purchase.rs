//! # Purchase Order Repository
//!
//! Purchase order headers and their line items.
//!
//! ## Transactions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create()   BEGIN ─ INSERT order ─ INSERT items ─────────────── COMMIT │
//! │  save()     BEGIN ─ UPDATE order ─ [DELETE+INSERT | UPDATE] items ─ COMMIT │
//! │  delete()   BEGIN ─ DELETE items ─ DELETE order ─────────────── COMMIT │
//! │                                                                         │
//! │  Any failure drops the transaction, which rolls back: an order never   │
//! │  exists without its items, and items never outlive their order.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is not touched here; the engine applies deltas after commit.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::{like_pattern, Scope};
use crate::error::{DbError, DbResult};
use rxledger_core::{PurchaseLineItem, PurchaseOrder, PurchaseStatus};

const ORDER_COLUMNS: &str = "id, tenant_id, branch_id, supplier_id, purchase_number, purchase_date, \
     expected_delivery_date, delivery_date, subtotal_cents, tax_cents, discount_cents, \
     total_amount_cents, payment_method, payment_status, status, notes, created_by, \
     received_by, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, purchase_id, product_id, product_name, quantity, unit_cost_cents, \
     total_cost_cents, received_quantity, expiry_date, batch_number, position";

/// What happens to the line items when a header is saved.
#[derive(Debug, Clone, Copy)]
pub enum LineChange<'a> {
    /// Items untouched.
    Keep,
    /// Every existing item is deleted and these are inserted.
    Replace(&'a [PurchaseLineItem]),
    /// `(line_item_id, received_quantity)` pairs written onto existing items.
    Receive(&'a [(String, i64)]),
}

/// Filters for [`PurchaseRepository::list`].
#[derive(Debug, Clone)]
pub struct PurchaseFilter {
    /// Substring of `purchase_number` or `notes`.
    pub search: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub supplier_id: Option<String>,
    pub newest_first: bool,
    pub limit: u32,
}

impl Default for PurchaseFilter {
    fn default() -> Self {
        PurchaseFilter {
            search: None,
            status: None,
            supplier_id: None,
            newest_first: true,
            limit: 50,
        }
    }
}

/// Repository for purchase orders.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Writes an order and its items as one unit.
    pub async fn create(&self, order: &PurchaseOrder, items: &[PurchaseLineItem]) -> DbResult<()> {
        debug!(
            id = %order.id,
            purchase_number = %order.purchase_number,
            items = items.len(),
            "Inserting purchase order"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;
        insert_order(&mut *tx, order).await?;
        insert_items(&mut *tx, items).await?;
        tx.commit().await.map_err(DbError::transaction)?;

        Ok(())
    }

    pub async fn get(&self, scope: Scope<'_>, id: &str) -> DbResult<Option<PurchaseOrder>> {
        let sql = format!(
            "SELECT {} FROM purchase_orders WHERE id = ?1 AND tenant_id = ?2 AND branch_id = ?3",
            ORDER_COLUMNS
        );

        let order = sqlx::query_as::<_, PurchaseOrder>(&sql)
            .bind(id)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Items of an order in submitted order. Callers check the order's
    /// scope first.
    pub async fn items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseLineItem>> {
        let sql = format!(
            "SELECT {} FROM purchase_items WHERE purchase_id = ?1 ORDER BY position",
            ITEM_COLUMNS
        );

        let items = sqlx::query_as::<_, PurchaseLineItem>(&sql)
            .bind(purchase_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists orders in the scope, by purchase date.
    pub async fn list(&self, scope: Scope<'_>, filter: &PurchaseFilter) -> DbResult<Vec<PurchaseOrder>> {
        debug!(?filter, "Listing purchase orders");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM purchase_orders WHERE tenant_id = ",
            ORDER_COLUMNS
        ));
        qb.push_bind(scope.tenant_id);
        qb.push(" AND branch_id = ").push_bind(scope.branch_id);

        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = like_pattern(term);
            qb.push(" AND (purchase_number LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR notes LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(supplier_id) = &filter.supplier_id {
            qb.push(" AND supplier_id = ").push_bind(supplier_id.clone());
        }

        qb.push(if filter.newest_first {
            " ORDER BY purchase_date DESC, purchase_number DESC"
        } else {
            " ORDER BY purchase_date ASC, purchase_number ASC"
        });
        qb.push(" LIMIT ").push_bind(i64::from(filter.limit));

        let orders = qb
            .build_query_as::<PurchaseOrder>()
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Persists every mutable header field and applies `change` to the
    /// items, in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the order is not in its own scope
    pub async fn save(&self, order: &PurchaseOrder, change: LineChange<'_>) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, ?change, "Saving purchase order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let result = sqlx::query(
            r#"
            UPDATE purchase_orders SET
                supplier_id = ?1,
                expected_delivery_date = ?2,
                delivery_date = ?3,
                subtotal_cents = ?4,
                tax_cents = ?5,
                discount_cents = ?6,
                total_amount_cents = ?7,
                payment_method = ?8,
                payment_status = ?9,
                status = ?10,
                notes = ?11,
                received_by = ?12,
                updated_at = ?13
            WHERE id = ?14 AND tenant_id = ?15 AND branch_id = ?16
            "#,
        )
        .bind(&order.supplier_id)
        .bind(order.expected_delivery_date)
        .bind(order.delivery_date)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.total_amount_cents)
        .bind(order.payment_method)
        .bind(order.payment_status)
        .bind(order.status)
        .bind(&order.notes)
        .bind(&order.received_by)
        .bind(order.updated_at)
        .bind(&order.id)
        .bind(&order.tenant_id)
        .bind(&order.branch_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase order", &order.id));
        }

        match change {
            LineChange::Keep => {}
            LineChange::Replace(items) => {
                sqlx::query("DELETE FROM purchase_items WHERE purchase_id = ?1")
                    .bind(&order.id)
                    .execute(&mut *tx)
                    .await?;
                insert_items(&mut *tx, items).await?;
            }
            LineChange::Receive(received) => {
                for (line_id, quantity) in received {
                    sqlx::query(
                        "UPDATE purchase_items SET received_quantity = ?1 WHERE id = ?2 AND purchase_id = ?3",
                    )
                    .bind(*quantity)
                    .bind(line_id)
                    .bind(&order.id)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }

    /// Deletes an order's items, then the order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such order in the scope (nothing deleted)
    pub async fn delete(&self, scope: Scope<'_>, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting purchase order");

        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        sqlx::query(
            r#"
            DELETE FROM purchase_items
            WHERE purchase_id = ?1
              AND EXISTS (
                  SELECT 1 FROM purchase_orders
                  WHERE id = ?1 AND tenant_id = ?2 AND branch_id = ?3
              )
            "#,
        )
        .bind(id)
        .bind(scope.tenant_id)
        .bind(scope.branch_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM purchase_orders WHERE id = ?1 AND tenant_id = ?2 AND branch_id = ?3",
        )
        .bind(id)
        .bind(scope.tenant_id)
        .bind(scope.branch_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase order", id));
        }

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(())
    }
}

async fn insert_order(conn: &mut SqliteConnection, order: &PurchaseOrder) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO purchase_orders (
            id, tenant_id, branch_id, supplier_id, purchase_number, purchase_date,
            expected_delivery_date, delivery_date,
            subtotal_cents, tax_cents, discount_cents, total_amount_cents,
            payment_method, payment_status, status, notes,
            created_by, received_by, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20
        )
        "#,
    )
    .bind(&order.id)
    .bind(&order.tenant_id)
    .bind(&order.branch_id)
    .bind(&order.supplier_id)
    .bind(&order.purchase_number)
    .bind(order.purchase_date)
    .bind(order.expected_delivery_date)
    .bind(order.delivery_date)
    .bind(order.subtotal_cents)
    .bind(order.tax_cents)
    .bind(order.discount_cents)
    .bind(order.total_amount_cents)
    .bind(order.payment_method)
    .bind(order.payment_status)
    .bind(order.status)
    .bind(&order.notes)
    .bind(&order.created_by)
    .bind(&order.received_by)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_items(conn: &mut SqliteConnection, items: &[PurchaseLineItem]) -> DbResult<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO purchase_items (
                id, purchase_id, product_id, product_name,
                quantity, unit_cost_cents, total_cost_cents, received_quantity,
                expiry_date, batch_number, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&item.id)
        .bind(&item.purchase_id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_cost_cents)
        .bind(item.total_cost_cents)
        .bind(item.received_quantity)
        .bind(item.expiry_date)
        .bind(&item.batch_number)
        .bind(item.position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
