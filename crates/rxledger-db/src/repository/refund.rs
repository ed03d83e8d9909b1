//! # Refund Repository
//!
//! Refund rows reference a sale in the same scope. Refunds never touch
//! stock or the sale row; the engine flips the sale's payment status
//! separately.

use sqlx::SqlitePool;
use tracing::debug;

use super::Scope;
use crate::error::DbResult;
use rxledger_core::Refund;

const REFUND_COLUMNS: &str = "id, tenant_id, branch_id, sale_id, refund_amount_cents, refund_reason, \
     refund_method, status, created_by, created_at";

/// Repository for refunds.
#[derive(Debug, Clone)]
pub struct RefundRepository {
    pool: SqlitePool,
}

impl RefundRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RefundRepository { pool }
    }

    pub async fn insert(&self, refund: &Refund) -> DbResult<()> {
        debug!(
            id = %refund.id,
            sale_id = %refund.sale_id,
            amount = refund.refund_amount_cents,
            "Inserting refund"
        );

        sqlx::query(
            r#"
            INSERT INTO refunds (
                id, tenant_id, branch_id, sale_id, refund_amount_cents,
                refund_reason, refund_method, status, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&refund.id)
        .bind(&refund.tenant_id)
        .bind(&refund.branch_id)
        .bind(&refund.sale_id)
        .bind(refund.refund_amount_cents)
        .bind(&refund.refund_reason)
        .bind(refund.refund_method)
        .bind(refund.status)
        .bind(&refund.created_by)
        .bind(refund.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Refunds in the scope, newest first, optionally for one sale.
    pub async fn list(&self, scope: Scope<'_>, sale_id: Option<&str>) -> DbResult<Vec<Refund>> {
        let sql = format!(
            r#"
            SELECT {} FROM refunds
            WHERE tenant_id = ?1 AND branch_id = ?2
              AND (?3 IS NULL OR sale_id = ?3)
            ORDER BY created_at DESC
            "#,
            REFUND_COLUMNS
        );

        let refunds = sqlx::query_as::<_, Refund>(&sql)
            .bind(scope.tenant_id)
            .bind(scope.branch_id)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(refunds)
    }
}
