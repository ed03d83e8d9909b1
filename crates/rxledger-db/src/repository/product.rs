//! # Product Repository
//!
//! Products and their on-hand stock counter.
//!
//! ## Stock Deltas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ Read, compute, write back (lost update under concurrency)      │
//! │     SELECT stock_quantity ...  → 7                                 │
//! │     UPDATE products SET stock_quantity = 4                         │
//! │                                                                     │
//! │  ✅ One atomic statement                                           │
//! │     UPDATE products SET stock_quantity = stock_quantity - 3        │
//! │     ... RETURNING stock_quantity                                   │
//! │                                                                     │
//! │  Receipt +5 and sale -3 racing on the same row always net +2.      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{like_pattern, Scope};
use crate::error::{DbError, DbResult};
use rxledger_core::Product;

const PRODUCT_COLUMNS: &str = "id, tenant_id, branch_id, sku, name, unit_price_cents, \
                               stock_quantity, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists in the branch
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, branch_id = %product.branch_id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, branch_id, sku, name,
                unit_price_cents, stock_quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.branch_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.unit_price_cents)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by id within the scope.
    pub async fn get(&self, scope: Scope<'_>, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND tenant_id = ?2 AND branch_id = ?3",
            PRODUCT_COLUMNS
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Substring search over SKU and name, ordered by name.
    ///
    /// An empty query lists the branch's products.
    pub async fn search(&self, scope: Scope<'_>, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching products");

        let sql = format!(
            r#"
            SELECT {} FROM products
            WHERE tenant_id = ?1 AND branch_id = ?2
              AND (sku LIKE ?3 ESCAPE '\' OR name LIKE ?3 ESCAPE '\')
            ORDER BY name
            LIMIT ?4
            "#,
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .bind(like_pattern(query))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Adds a signed delta to a product's stock in one statement.
    ///
    /// ## Returns
    /// * `Ok(new_quantity)` - the counter after the update
    /// * `Err(DbError::NotFound)` - no such product in the scope
    pub async fn adjust_stock(&self, scope: Scope<'_>, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let current: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3 AND tenant_id = ?4 AND branch_id = ?5
            RETURNING stock_quantity
            "#,
        )
        .bind(delta)
        .bind(Utc::now())
        .bind(id)
        .bind(scope.tenant_id)
        .bind(scope.branch_id)
        .fetch_optional(&self.pool)
        .await?;

        current.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Counts products in a tenant (for diagnostics and the seed tool).
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{self, BRANCH, TENANT};
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get_is_scoped() {
        let db = fixtures::db().await;
        let p = fixtures::product(TENANT, BRANCH, "AMX-500", 10);
        db.products().insert(&p).await.unwrap();

        let found = db.products().get(Scope::new(TENANT, BRANCH), &p.id).await.unwrap();
        assert_eq!(found.unwrap().stock_quantity, 10);

        let other_branch = db.products().get(Scope::new(TENANT, "branch-2"), &p.id).await.unwrap();
        assert!(other_branch.is_none());
        let other_tenant = db.products().get(Scope::new("tenant-b", BRANCH), &p.id).await.unwrap();
        assert!(other_tenant.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_in_branch() {
        let db = fixtures::db().await;
        db.products().insert(&fixtures::product(TENANT, BRANCH, "DUP", 0)).await.unwrap();
        let err = db
            .products()
            .insert(&fixtures::product(TENANT, BRANCH, "DUP", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // same SKU in another branch is fine
        db.products().insert(&fixtures::product(TENANT, "branch-2", "DUP", 0)).await.unwrap();
    }

    #[tokio::test]
    async fn test_adjust_stock_returns_new_level() {
        let db = fixtures::db().await;
        let scope = Scope::new(TENANT, BRANCH);
        let p = fixtures::product(TENANT, BRANCH, "PCM-1", 4);
        db.products().insert(&p).await.unwrap();

        assert_eq!(db.products().adjust_stock(scope, &p.id, 5).await.unwrap(), 9);
        assert_eq!(db.products().adjust_stock(scope, &p.id, -12).await.unwrap(), -3);
    }

    #[tokio::test]
    async fn test_adjust_stock_outside_scope_is_not_found() {
        let db = fixtures::db().await;
        let p = fixtures::product(TENANT, BRANCH, "PCM-1", 4);
        db.products().insert(&p).await.unwrap();

        let err = db
            .products()
            .adjust_stock(Scope::new("tenant-b", BRANCH), &p.id, 1)
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let unchanged = db.products().get(Scope::new(TENANT, BRANCH), &p.id).await.unwrap().unwrap();
        assert_eq!(unchanged.stock_quantity, 4);
    }

    #[tokio::test]
    async fn test_search_matches_sku_and_name() {
        let db = fixtures::db().await;
        let scope = Scope::new(TENANT, BRANCH);
        let mut a = fixtures::product(TENANT, BRANCH, "AMX-250", 1);
        a.name = "Amoxicillin 250mg".to_string();
        let mut b = fixtures::product(TENANT, BRANCH, "IBU-200", 1);
        b.name = "Ibuprofen 200mg".to_string();
        db.products().insert(&a).await.unwrap();
        db.products().insert(&b).await.unwrap();

        let hits = db.products().search(scope, "amoxi", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = db.products().search(scope, "ibu-", 10).await.unwrap();
        assert_eq!(hits[0].sku, "IBU-200");
        assert_eq!(db.products().search(scope, "", 10).await.unwrap().len(), 2);
        assert_eq!(db.products().count(TENANT).await.unwrap(), 2);
    }
}
