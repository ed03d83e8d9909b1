//! # Supplier & Customer Repositories
//!
//! Tenant-wide reference data. The engine only reads these to check that a
//! referenced supplier or customer is visible to the caller; the seed tool
//! and tests insert them.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rxledger_core::{Customer, Supplier};

/// Repository for suppliers.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (id, tenant_id, name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.tenant_id)
        .bind(&supplier.name)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, tenant_id, name, phone, email, created_at
            FROM suppliers
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Lists a tenant's suppliers by name.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, tenant_id, name, phone, email, created_at
            FROM suppliers
            WHERE tenant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}

/// Repository for customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, tenant_id, name, phone, email, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, name, phone, email, created_at
            FROM customers
            WHERE id = ?1 AND tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, tenant_id, name, phone, email, created_at
            FROM customers
            WHERE tenant_id = ?1
            ORDER BY name
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{self, TENANT};

    #[tokio::test]
    async fn test_suppliers_are_tenant_scoped() {
        let db = fixtures::db().await;
        let s = fixtures::supplier(TENANT, "MedSupply Ltd");
        db.suppliers().insert(&s).await.unwrap();

        assert!(db.suppliers().get(TENANT, &s.id).await.unwrap().is_some());
        assert!(db.suppliers().get("tenant-b", &s.id).await.unwrap().is_none());
        assert_eq!(db.suppliers().list(TENANT).await.unwrap().len(), 1);
        assert!(db.suppliers().list("tenant-b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customers_listed_by_name() {
        let db = fixtures::db().await;
        db.customers().insert(&fixtures::customer(TENANT, "Zawadi")).await.unwrap();
        db.customers().insert(&fixtures::customer(TENANT, "Amina")).await.unwrap();

        let names: Vec<String> = db
            .customers()
            .list(TENANT)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Amina", "Zawadi"]);
    }
}
