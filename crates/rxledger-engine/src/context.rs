//! # Identity Context
//!
//! Who is acting, and where. Passed explicitly to every engine operation;
//! the engine never reads identity from ambient state.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use rxledger_db::Scope;

/// Caller identity for a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub tenant_id: String,
    pub branch_id: String,
    pub user_id: String,
}

impl IdentityContext {
    pub fn new(
        tenant_id: impl Into<String>,
        branch_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        IdentityContext {
            tenant_id: tenant_id.into(),
            branch_id: branch_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Fails with `MISSING_CONTEXT` when any field is blank.
    ///
    /// Every manager operation calls this before touching the store.
    pub fn validate(&self) -> ApiResult<()> {
        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("branch_id", &self.branch_id),
            ("user_id", &self.user_id),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::missing_context(field));
            }
        }
        Ok(())
    }

    /// The tenant + branch filter for store calls.
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(&self.tenant_id, &self.branch_id)
    }
}
