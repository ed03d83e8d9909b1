//! # Purchase Order Lifecycle
//!
//! Creates, edits, receives and deletes purchase orders.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Purchase Order Lifecycle                            │
//! │                                                                         │
//! │   create ──► pending ──► ordered ──► received ──► returned              │
//! │                 │           │           ▲                                │
//! │                 │           └─► cancelled                                │
//! │                 ├─────────────► cancelled                                │
//! │                 └───────────────────────┘  (direct receipt)             │
//! │                                                                         │
//! │   Moving into `received` (update or mark_received):                     │
//! │     1. header + line receipt quantities saved in one transaction        │
//! │     2. +quantity per product line via StockReconciler                   │
//! │        (failures logged and reported, never rolled back)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DocumentSettings;
use crate::context::IdentityContext;
use crate::error::{ApiError, ApiResult};
use crate::stock::{StockReconciler, StockReport};
use rxledger_core::lifecycle::{check_transition, ensure_editable, Transition};
use rxledger_core::numbering::purchase_number;
use rxledger_core::totals::{purchase_totals, Totals, PURCHASE_TAX_RATE};
use rxledger_core::validation::{
    validate_new_purchase, validate_purchase_patch, validate_received_items,
};
use rxledger_core::{
    CoreError, NewPurchaseLineItem, NewPurchaseOrder, PurchaseLineItem, PurchaseOrder,
    PurchaseOrderDetail, PurchaseOrderPatch, PurchasePaymentStatus, PurchaseStatus, ReceivedItem,
};
use rxledger_db::{Database, LineChange, PurchaseFilter};

/// Listing options for [`PurchaseManager::list`].
#[derive(Debug, Clone)]
pub struct PurchaseQuery {
    /// Substring of the purchase number or notes.
    pub search: Option<String>,
    pub status: Option<PurchaseStatus>,
    pub supplier_id: Option<String>,
    pub newest_first: bool,
    /// Falls back to `documents.default_list_limit`.
    pub limit: Option<u32>,
}

impl Default for PurchaseQuery {
    fn default() -> Self {
        PurchaseQuery {
            search: None,
            status: None,
            supplier_id: None,
            newest_first: true,
            limit: None,
        }
    }
}

/// A saved purchase order plus the stock deltas it triggered.
///
/// `stock` is empty unless the operation moved the order into `received`.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseOutcome {
    pub detail: PurchaseOrderDetail,
    pub stock: StockReport,
}

/// Orchestrates purchase order operations.
#[derive(Debug, Clone)]
pub struct PurchaseManager {
    db: Database,
    stock: StockReconciler,
    settings: DocumentSettings,
}

impl PurchaseManager {
    pub fn new(db: Database, stock: StockReconciler, settings: DocumentSettings) -> Self {
        PurchaseManager { db, stock, settings }
    }

    /// Creates a `pending` purchase order with its line items.
    ///
    /// ## Errors
    /// * `VALIDATION_ERROR` - missing supplier, no items, bad quantity/cost/discount
    /// * `NOT_FOUND` - supplier not in the caller's tenant
    /// * `PERSISTENCE_ERROR` - store failure (including a number collision)
    pub async fn create(
        &self,
        ctx: &IdentityContext,
        input: NewPurchaseOrder,
    ) -> ApiResult<PurchaseOrderDetail> {
        ctx.validate()?;
        validate_new_purchase(&input)?;
        self.ensure_supplier(ctx, &input.supplier_id).await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let discount = input.discount_cents.unwrap_or(0);
        let totals = purchase_totals(&input.items, discount, PURCHASE_TAX_RATE);
        let items = build_lines(&id, &input.items);

        let mut order = PurchaseOrder {
            id,
            tenant_id: ctx.tenant_id.clone(),
            branch_id: ctx.branch_id.clone(),
            supplier_id: input.supplier_id,
            purchase_number: purchase_number(&self.settings.purchase_prefix, now),
            purchase_date: now,
            expected_delivery_date: input.expected_delivery_date,
            delivery_date: None,
            subtotal_cents: 0,
            tax_cents: 0,
            discount_cents: 0,
            total_amount_cents: 0,
            payment_method: input.payment_method,
            payment_status: PurchasePaymentStatus::Pending,
            status: PurchaseStatus::Pending,
            notes: input.notes,
            created_by: ctx.user_id.clone(),
            received_by: None,
            created_at: now,
            updated_at: now,
        };
        apply_totals(&mut order, &totals);

        self.db.purchases().create(&order, &items).await?;

        info!(
            id = %order.id,
            number = %order.purchase_number,
            total = order.total_amount_cents,
            items = items.len(),
            "Purchase order created"
        );

        Ok(PurchaseOrderDetail { order, items })
    }

    /// Applies a partial update.
    ///
    /// Supplying `items` replaces every line and recomputes totals with the
    /// new (or stored) discount. A new discount alone recomputes totals over
    /// the stored lines. A status change must be legal; moving into
    /// `received` marks every line fully received and adds stock.
    ///
    /// ## Errors
    /// * `NOT_FOUND` - order (or new supplier) not in scope
    /// * `INVALID_TRANSITION` - order is cancelled, or the status move is illegal
    pub async fn update(
        &self,
        ctx: &IdentityContext,
        id: &str,
        patch: PurchaseOrderPatch,
    ) -> ApiResult<PurchaseOutcome> {
        ctx.validate()?;
        validate_purchase_patch(&patch)?;

        let mut order = self.load(ctx, id).await?;
        ensure_editable(&order.id, order.status)?;

        let transition = match patch.status {
            Some(to) => check_transition(&order.id, order.status, to)?,
            None => Transition::Unchanged,
        };

        if let Some(supplier_id) = patch.supplier_id {
            if supplier_id != order.supplier_id {
                self.ensure_supplier(ctx, &supplier_id).await?;
                order.supplier_id = supplier_id;
            }
        }
        let discount_changed = patch
            .discount_cents
            .is_some_and(|discount| discount != order.discount_cents);
        if let Some(discount) = patch.discount_cents {
            order.discount_cents = discount;
        }
        if patch.payment_method.is_some() {
            order.payment_method = patch.payment_method;
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        if patch.notes.is_some() {
            order.notes = patch.notes;
        }
        if patch.expected_delivery_date.is_some() {
            order.expected_delivery_date = patch.expected_delivery_date;
        }

        let replaced = patch.items.is_some();
        let mut items = match patch.items {
            Some(new_items) => {
                let lines = build_lines(&order.id, &new_items);
                let totals = purchase_totals(&lines, order.discount_cents, PURCHASE_TAX_RATE);
                apply_totals(&mut order, &totals);
                lines
            }
            None => {
                let stored = self.db.purchases().items(&order.id).await?;
                if discount_changed {
                    let totals = purchase_totals(&stored, order.discount_cents, PURCHASE_TAX_RATE);
                    apply_totals(&mut order, &totals);
                }
                stored
            }
        };

        let receives = transition.receives_stock();
        if receives {
            for item in items.iter_mut() {
                item.received_quantity = item.quantity;
            }
        }
        if let Transition::Move { to, .. } = transition {
            order.status = to;
        }
        order.updated_at = Utc::now();

        let receipts: Vec<(String, i64)> = items
            .iter()
            .map(|item| (item.id.clone(), item.received_quantity))
            .collect();
        let change = if replaced {
            LineChange::Replace(&items)
        } else if receives {
            LineChange::Receive(&receipts)
        } else {
            LineChange::Keep
        };
        self.db.purchases().save(&order, change).await?;

        let stock = if receives {
            let deltas: Vec<(String, i64)> = items
                .iter()
                .filter_map(|item| item.product_id.clone().map(|pid| (pid, item.quantity)))
                .collect();
            self.stock.apply_batch(ctx, &deltas).await
        } else {
            StockReport::default()
        };

        info!(
            id = %order.id,
            status = %order.status,
            items_replaced = replaced,
            stock_failures = stock.failed.len(),
            "Purchase order updated"
        );

        Ok(PurchaseOutcome {
            detail: PurchaseOrderDetail { order, items },
            stock,
        })
    }

    /// Deletes an order and its line items. Stock is not reversed.
    pub async fn delete(&self, ctx: &IdentityContext, id: &str) -> ApiResult<()> {
        ctx.validate()?;
        self.db.purchases().delete(ctx.scope(), id).await?;
        info!(id = %id, "Purchase order deleted");
        Ok(())
    }

    /// Records a goods-received note and moves the order to `received`.
    ///
    /// Each entry is matched to a line by `line_item_id`, else to the first
    /// line with its `product_id` not yet matched by an earlier entry. Stamps today's delivery date and the receiving user,
    /// then adds `received_quantity` to stock for each entry with a product.
    ///
    /// ## Errors
    /// * `INVALID_TRANSITION` - order is already received, cancelled or returned
    pub async fn mark_received(
        &self,
        ctx: &IdentityContext,
        id: &str,
        received: &[ReceivedItem],
    ) -> ApiResult<PurchaseOutcome> {
        ctx.validate()?;
        validate_received_items(received)?;

        let mut order = self.load(ctx, id).await?;
        let transition = check_transition(&order.id, order.status, PurchaseStatus::Received)?;
        if !transition.receives_stock() {
            return Err(CoreError::InvalidTransition {
                id: order.id.clone(),
                from: order.status.to_string(),
                to: PurchaseStatus::Received.to_string(),
            }
            .into());
        }

        let mut items = self.db.purchases().items(&order.id).await?;
        let mut receipts: Vec<(String, i64)> = Vec::new();
        let mut deltas: Vec<(String, i64)> = Vec::new();

        // lines already claimed by a product-matched entry in this note
        let mut claimed: HashSet<String> = HashSet::new();

        for entry in received {
            let line = items.iter_mut().find(|line| match &entry.line_item_id {
                Some(line_id) => &line.id == line_id,
                None => {
                    line.product_id.is_some()
                        && line.product_id == entry.product_id
                        && !claimed.contains(&line.id)
                }
            });

            let product_id = match line {
                Some(line) => {
                    if entry.line_item_id.is_none() {
                        claimed.insert(line.id.clone());
                    }
                    line.received_quantity = entry.received_quantity;
                    receipts.push((line.id.clone(), entry.received_quantity));
                    entry.product_id.clone().or_else(|| line.product_id.clone())
                }
                None => {
                    warn!(
                        purchase_id = %order.id,
                        line_item_id = ?entry.line_item_id,
                        product_id = ?entry.product_id,
                        "Received entry matches no line"
                    );
                    entry.product_id.clone()
                }
            };

            if let Some(product_id) = product_id {
                if entry.received_quantity > 0 {
                    deltas.push((product_id, entry.received_quantity));
                }
            }
        }

        let now = Utc::now();
        order.status = PurchaseStatus::Received;
        order.delivery_date = Some(now.date_naive());
        order.received_by = Some(ctx.user_id.clone());
        order.updated_at = now;

        self.db
            .purchases()
            .save(&order, LineChange::Receive(&receipts))
            .await?;

        debug!(purchase_id = %order.id, deltas = deltas.len(), "Applying received stock");
        let stock = self.stock.apply_batch(ctx, &deltas).await;

        info!(
            id = %order.id,
            lines = receipts.len(),
            stock_applied = stock.applied.len(),
            stock_failures = stock.failed.len(),
            "Purchase order received"
        );

        Ok(PurchaseOutcome {
            detail: PurchaseOrderDetail { order, items },
            stock,
        })
    }

    /// Fetches an order with its line items.
    pub async fn get(&self, ctx: &IdentityContext, id: &str) -> ApiResult<PurchaseOrderDetail> {
        ctx.validate()?;
        let order = self.load(ctx, id).await?;
        let items = self.db.purchases().items(&order.id).await?;
        Ok(PurchaseOrderDetail { order, items })
    }

    /// Lists order headers in the caller's branch.
    pub async fn list(
        &self,
        ctx: &IdentityContext,
        query: &PurchaseQuery,
    ) -> ApiResult<Vec<PurchaseOrder>> {
        ctx.validate()?;

        let filter = PurchaseFilter {
            search: query.search.clone(),
            status: query.status,
            supplier_id: query.supplier_id.clone(),
            newest_first: query.newest_first,
            limit: query.limit.unwrap_or(self.settings.default_list_limit),
        };

        Ok(self.db.purchases().list(ctx.scope(), &filter).await?)
    }

    async fn load(&self, ctx: &IdentityContext, id: &str) -> ApiResult<PurchaseOrder> {
        self.db
            .purchases()
            .get(ctx.scope(), id)
            .await?
            .ok_or_else(|| ApiError::not_found("Purchase order", id))
    }

    async fn ensure_supplier(&self, ctx: &IdentityContext, supplier_id: &str) -> ApiResult<()> {
        match self.db.suppliers().get(&ctx.tenant_id, supplier_id).await? {
            Some(_) => Ok(()),
            None => Err(ApiError::not_found("Supplier", supplier_id)),
        }
    }
}

/// Turns submitted lines into stored lines, keeping their order.
fn build_lines(purchase_id: &str, items: &[NewPurchaseLineItem]) -> Vec<PurchaseLineItem> {
    items
        .iter()
        .enumerate()
        .map(|(position, item)| PurchaseLineItem {
            id: Uuid::new_v4().to_string(),
            purchase_id: purchase_id.to_string(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_cost_cents: item.unit_cost_cents,
            total_cost_cents: item.line_total().cents(),
            received_quantity: 0,
            expiry_date: item.expiry_date,
            batch_number: item.batch_number.clone(),
            position: position as i64,
        })
        .collect()
}

fn apply_totals(order: &mut PurchaseOrder, totals: &Totals) {
    order.subtotal_cents = totals.subtotal_cents;
    order.tax_cents = totals.tax_cents;
    order.discount_cents = totals.discount_cents;
    order.total_amount_cents = totals.total_cents;
}
