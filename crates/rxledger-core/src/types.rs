//! # Domain Types
//!
//! Core domain types used throughout rxledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PurchaseOrder   │   │      Sale       │   │     Refund      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │ purchase_number │   │  sale_number    │   │  sale_id (FK)   │       │
//! │  │ status          │   │  payment_status │   │  refund_amount  │       │
//! │  │ totals          │   │  final_amount   │   │  status         │       │
//! │  └───────┬─────────┘   └───────┬─────────┘   └─────────────────┘       │
//! │          │ owns                │ owns                                   │
//! │  ┌───────▼─────────┐   ┌───────▼─────────┐   ┌─────────────────┐       │
//! │  │PurchaseLineItem │   │  SaleLineItem   │   │    Product      │       │
//! │  │ product_id?     │   │  product_id     │   │ stock_quantity  │◄──────│
//! │  │ received_qty    │   │  quantity       │   │ (shared counter)│ stock │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘ deltas│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every persisted row carries `tenant_id`; branch-level documents and
//! products also carry `branch_id`. Amounts are integer cents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Status Enums
// =============================================================================

/// Lifecycle status of a purchase order.
///
/// Transitions are governed by [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Drafted, not yet sent to the supplier.
    #[default]
    Pending,
    /// Sent to the supplier.
    Ordered,
    /// Goods arrived and were added to stock.
    Received,
    /// Abandoned before receipt.
    Cancelled,
    /// Received goods sent back to the supplier.
    Returned,
}

impl PurchaseStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Ordered => "ordered",
            PurchaseStatus::Received => "received",
            PurchaseStatus::Cancelled => "cancelled",
            PurchaseStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PurchaseStatus {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PurchaseStatus::Pending),
            "ordered" => Ok(PurchaseStatus::Ordered),
            "received" => Ok(PurchaseStatus::Received),
            "cancelled" | "canceled" => Ok(PurchaseStatus::Cancelled),
            "returned" => Ok(PurchaseStatus::Returned),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown purchase status '{}'", other),
            }),
        }
    }
}

/// Payment status of a purchase order (what we owe the supplier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchasePaymentStatus {
    #[default]
    Pending,
    Partial,
    Completed,
    Cancelled,
}

/// Lifecycle status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
    Pending,
    Cancelled,
}

/// Payment status of a sale.
///
/// The only transition the engine performs after creation is
/// `* → Refunded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SalePaymentStatus {
    Pending,
    #[default]
    Completed,
    Failed,
    Refunded,
}

impl SalePaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SalePaymentStatus::Pending => "pending",
            SalePaymentStatus::Completed => "completed",
            SalePaymentStatus::Failed => "failed",
            SalePaymentStatus::Refunded => "refunded",
        }
    }
}

/// Status of a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    #[default]
    Completed,
    Cancelled,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    MobileMoney,
    /// Supplier or customer account credit.
    Credit,
}

impl std::str::FromStr for PaymentMethod {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit_card" | "debit" => Ok(PaymentMethod::Card),
            "bank_transfer" | "bank" | "transfer" => Ok(PaymentMethod::BankTransfer),
            "mobile_money" | "mobile" => Ok(PaymentMethod::MobileMoney),
            "credit" | "account" => Ok(PaymentMethod::Credit),
            other => Err(crate::error::ValidationError::InvalidFormat {
                field: "payment_method".to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Reference Data
// =============================================================================

/// A product stocked at a branch.
///
/// `stock_quantity` is only ever changed through signed deltas applied by
/// the stock reconciliation service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub tenant_id: String,
    pub branch_id: String,
    pub sku: String,
    pub name: String,
    /// Default selling price in cents.
    pub unit_price_cents: i64,
    /// On-hand quantity. May be negative after an oversold sale.
    pub stock_quantity: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// A supplier. Tenant-wide, shared by all branches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A customer. Tenant-wide, shared by all branches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase Order
// =============================================================================

/// A procurement document from a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub tenant_id: String,
    pub branch_id: String,
    pub supplier_id: String,
    /// Human-readable business identifier, e.g. `PO2610-048213`.
    pub purchase_number: String,
    #[ts(as = "String")]
    pub purchase_date: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_amount_cents: i64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PurchasePaymentStatus,
    pub status: PurchaseStatus,
    pub notes: Option<String>,
    pub created_by: String,
    pub received_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A line on a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseLineItem {
    pub id: String,
    pub purchase_id: String,
    /// Lines without a product are free-text and never touch stock.
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    /// Always `quantity × unit_cost_cents`.
    pub total_cost_cents: i64,
    pub received_quantity: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    /// Zero-based position in the submitted item list.
    pub position: i64,
}

/// A purchase order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderDetail {
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseLineItem>,
}

// =============================================================================
// Sale
// =============================================================================

/// A point-of-sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub tenant_id: String,
    pub branch_id: String,
    /// `None` for walk-in customers.
    pub customer_id: Option<String>,
    pub sale_number: String,
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    /// Σ line totals, before tax and discount.
    pub total_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub discount_amount_cents: i64,
    /// `total − discount + tax`, never negative.
    pub final_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: SalePaymentStatus,
    pub status: SaleStatus,
    pub notes: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn final_amount(&self) -> Money {
        Money::from_cents(self.final_amount_cents)
    }
}

/// A line on a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleLineItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// Always `quantity × unit_price_cents`.
    pub total_price_cents: i64,
    pub discount_cents: i64,
    pub position: i64,
}

/// A sale together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    pub items: Vec<SaleLineItem>,
}

// =============================================================================
// Refund
// =============================================================================

/// A payment reversal against a prior sale. Never reverses stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Refund {
    pub id: String,
    pub tenant_id: String,
    pub branch_id: String,
    pub sale_id: String,
    pub refund_amount_cents: i64,
    pub refund_reason: String,
    pub refund_method: PaymentMethod,
    pub status: RefundStatus,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Document Inputs
// =============================================================================

/// A purchase line as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseLineItem {
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
}

impl NewPurchaseLineItem {
    /// Creates a free-text line (no linked product).
    pub fn new(product_name: impl Into<String>, quantity: i64, unit_cost_cents: i64) -> Self {
        NewPurchaseLineItem {
            product_id: None,
            product_name: product_name.into(),
            quantity,
            unit_cost_cents,
            expiry_date: None,
            batch_number: None,
        }
    }

    /// Links the line to a stocked product.
    pub fn with_product(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    pub fn with_batch(mut self, batch_number: impl Into<String>, expiry: Option<NaiveDate>) -> Self {
        self.batch_number = Some(batch_number.into());
        self.expiry_date = expiry;
        self
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_cost_cents).multiply_quantity(self.quantity)
    }
}

/// Payload for creating a purchase order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseOrder {
    pub supplier_id: String,
    pub items: Vec<NewPurchaseLineItem>,
    pub discount_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
}

/// Partial update of a purchase order. `None` leaves a field unchanged.
///
/// Supplying `items` replaces every line item and recomputes totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseOrderPatch {
    pub supplier_id: Option<String>,
    pub items: Option<Vec<NewPurchaseLineItem>>,
    pub discount_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PurchasePaymentStatus>,
    pub status: Option<PurchaseStatus>,
    pub notes: Option<String>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
}

/// One entry of a goods-received note.
///
/// Matched to a line by `line_item_id` when given, else by `product_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceivedItem {
    pub line_item_id: Option<String>,
    pub product_id: Option<String>,
    pub received_quantity: i64,
}

impl ReceivedItem {
    pub fn for_product(product_id: impl Into<String>, received_quantity: i64) -> Self {
        ReceivedItem {
            line_item_id: None,
            product_id: Some(product_id.into()),
            received_quantity,
        }
    }
}

/// A sale line as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleLineItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
}

impl NewSaleLineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64, unit_price_cents: i64) -> Self {
        NewSaleLineItem {
            product_id: product_id.into(),
            quantity,
            unit_price_cents,
            discount_cents: 0,
        }
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

/// Payload for creating a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub customer_id: Option<String>,
    pub items: Vec<NewSaleLineItem>,
    pub payment_method: PaymentMethod,
    pub discount_amount_cents: Option<i64>,
    pub tax_amount_cents: Option<i64>,
    pub notes: Option<String>,
}

/// Payload for creating a refund.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewRefund {
    pub sale_id: String,
    pub refund_amount_cents: i64,
    pub refund_reason: String,
    pub refund_method: PaymentMethod,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_status_round_trips_through_text() {
        for status in [
            PurchaseStatus::Pending,
            PurchaseStatus::Ordered,
            PurchaseStatus::Received,
            PurchaseStatus::Cancelled,
            PurchaseStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<PurchaseStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<PurchaseStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
        let json = serde_json::to_string(&SalePaymentStatus::Refunded).unwrap();
        assert_eq!(json, "\"refunded\"");
    }

    #[test]
    fn test_payment_method_aliases() {
        assert_eq!("Cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("mobile".parse::<PaymentMethod>().unwrap(), PaymentMethod::MobileMoney);
        assert!("barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_line_totals() {
        let line = NewPurchaseLineItem::new("Paracetamol 500mg", 12, 250).with_product("p-1");
        assert_eq!(line.line_total().cents(), 3000);
        assert_eq!(line.product_id.as_deref(), Some("p-1"));

        let sale_line = NewSaleLineItem::new("p-1", 3, 400);
        assert_eq!(sale_line.line_total().cents(), 1200);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PurchaseStatus::default(), PurchaseStatus::Pending);
        assert_eq!(PurchasePaymentStatus::default(), PurchasePaymentStatus::Pending);
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
    }
}
