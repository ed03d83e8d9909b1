//! # Pricing & Totals Calculator
//!
//! Pure functions that turn a list of line items into document totals.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PURCHASE ORDERS (tax derived)        SALES (tax supplied)             │
//! │                                                                         │
//! │  subtotal = Σ qty × unit_cost         total = Σ qty × unit_price       │
//! │  tax      = round(subtotal × 18%)     final = total − discount + tax   │
//! │  total    = max(0, sub + tax − disc)  final = max(0, final)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same function runs at creation and on every edit that replaces the
//! item set, so stored totals always equal a recomputation from stored items.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, TaxRate};
use crate::types::{NewPurchaseLineItem, NewSaleLineItem, PurchaseLineItem};

/// Tax rate applied to purchase orders (18%).
pub const PURCHASE_TAX_RATE: TaxRate = TaxRate::from_bps(1800);

/// Anything with a quantity and a unit amount.
pub trait Priced {
    fn quantity(&self) -> i64;
    fn unit_amount(&self) -> Money;

    fn line_amount(&self) -> Money {
        self.unit_amount().multiply_quantity(self.quantity())
    }
}

impl Priced for NewPurchaseLineItem {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_amount(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }
}

impl Priced for PurchaseLineItem {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_amount(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }
}

impl Priced for NewSaleLineItem {
    fn quantity(&self) -> i64 {
        self.quantity
    }

    fn unit_amount(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Totals of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// Totals of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTotals {
    pub total_amount_cents: i64,
    pub discount_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub final_amount_cents: i64,
}

/// Sum of `quantity × unit amount` over the items, in order.
pub fn subtotal<T: Priced>(items: &[T]) -> Money {
    items.iter().map(|item| item.line_amount()).sum()
}

/// Computes purchase order totals.
///
/// ## Example
/// ```rust
/// use rxledger_core::totals::{purchase_totals, PURCHASE_TAX_RATE};
/// use rxledger_core::types::NewPurchaseLineItem;
///
/// let items = vec![NewPurchaseLineItem::new("Gauze", 1, 100)];
/// // discount larger than subtotal + tax clamps to zero
/// let totals = purchase_totals(&items, 500, PURCHASE_TAX_RATE);
/// assert_eq!(totals.total_cents, 0);
/// ```
pub fn purchase_totals<T: Priced>(items: &[T], discount_cents: i64, rate: TaxRate) -> Totals {
    let subtotal = subtotal(items);
    let tax = subtotal.calculate_tax(rate);
    let discount = Money::from_cents(discount_cents);
    let total = (subtotal + tax - discount).clamp_non_negative();

    Totals {
        subtotal_cents: subtotal.cents(),
        tax_cents: tax.cents(),
        discount_cents: discount.cents(),
        total_cents: total.cents(),
    }
}

/// Computes sale totals from caller-supplied tax and discount.
pub fn sale_totals(items: &[NewSaleLineItem], discount_cents: i64, tax_cents: i64) -> SaleTotals {
    let total = subtotal(items);
    let discount = Money::from_cents(discount_cents);
    let tax = Money::from_cents(tax_cents);
    let final_amount = (total - discount + tax).clamp_non_negative();

    SaleTotals {
        total_amount_cents: total.cents(),
        discount_amount_cents: discount.cents(),
        tax_amount_cents: tax.cents(),
        final_amount_cents: final_amount.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
