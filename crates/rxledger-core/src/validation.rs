//! # Validation Module
//!
//! Input validation for documents entering the engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms (outside this workspace)                            │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine operation                                             │
//! │  └── THIS MODULE: every rule checked before the first write            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE document numbers                                           │
//! │  └── Foreign keys (line items → documents)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rxledger_core::validation::validate_quantity;
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{
    NewPurchaseLineItem, NewPurchaseOrder, NewRefund, NewSale, NewSaleLineItem,
    PurchaseOrderPatch, ReceivedItem,
};
use crate::{MAX_AMOUNT_CENTS, MAX_LINE_ITEMS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NOTES_LEN: usize = 1000;
const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates that a string field is present and not blank.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount that may be zero but never negative.
pub fn validate_non_negative(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::negative(field));
    }
    validate_amount_cap(field, 0, cents)
}

/// Validates an amount that must be strictly positive.
pub fn validate_positive(field: &str, cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::must_be_positive(field));
    }
    validate_amount_cap(field, 1, cents)
}

/// Rejects amounts above [`MAX_AMOUNT_CENTS`] so totals stay within `i64`.
fn validate_amount_cap(field: &str, min: i64, cents: i64) -> ValidationResult<()> {
    if cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max: MAX_AMOUNT_CENTS,
        });
    }
    Ok(())
}

/// Validates a free-text field length.
pub fn validate_max_len(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(notes) => validate_max_len("notes", notes, MAX_NOTES_LEN),
        None => Ok(()),
    }
}

fn validate_item_count(len: usize) -> ValidationResult<()> {
    if len == 0 {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if len > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// Validates the line items of a purchase order.
///
/// ## Rules
/// - At least one line
/// - `quantity > 0`, `unit_cost > 0`
/// - `product_name` present
pub fn validate_purchase_items(items: &[NewPurchaseLineItem]) -> ValidationResult<()> {
    validate_item_count(items.len())?;

    for item in items {
        validate_required("product_name", &item.product_name)?;
        validate_max_len("product_name", &item.product_name, MAX_NAME_LEN)?;
        validate_quantity(item.quantity)?;
        validate_positive("unit_cost", item.unit_cost_cents)?;
        if let Some(product_id) = &item.product_id {
            validate_required("product_id", product_id)?;
        }
    }

    Ok(())
}

/// Validates a new purchase order before anything is written.
pub fn validate_new_purchase(order: &NewPurchaseOrder) -> ValidationResult<()> {
    validate_required("supplier_id", &order.supplier_id)?;
    validate_purchase_items(&order.items)?;
    if let Some(discount) = order.discount_cents {
        validate_non_negative("discount", discount)?;
    }
    validate_notes(order.notes.as_deref())
}

/// Validates the fields present on a purchase order patch.
pub fn validate_purchase_patch(patch: &PurchaseOrderPatch) -> ValidationResult<()> {
    if let Some(supplier_id) = &patch.supplier_id {
        validate_required("supplier_id", supplier_id)?;
    }
    if let Some(items) = &patch.items {
        validate_purchase_items(items)?;
    }
    if let Some(discount) = patch.discount_cents {
        validate_non_negative("discount", discount)?;
    }
    validate_notes(patch.notes.as_deref())
}

/// Validates a goods-received note.
///
/// Every entry must point at a line (by line id or product id) and carry a
/// non-negative quantity.
pub fn validate_received_items(items: &[ReceivedItem]) -> ValidationResult<()> {
    for item in items {
        validate_non_negative("received_quantity", item.received_quantity)?;
        if item.received_quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "received_quantity".to_string(),
                min: 0,
                max: MAX_LINE_QUANTITY,
            });
        }
        let has_line = item.line_item_id.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_product = item.product_id.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !has_line && !has_product {
            return Err(ValidationError::required("line_item_id or product_id"));
        }
    }
    Ok(())
}

// =============================================================================
// Sales & Refunds
// =============================================================================

/// Validates the line items of a sale.
pub fn validate_sale_items(items: &[NewSaleLineItem]) -> ValidationResult<()> {
    validate_item_count(items.len())?;

    for item in items {
        validate_required("product_id", &item.product_id)?;
        validate_quantity(item.quantity)?;
        validate_non_negative("unit_price", item.unit_price_cents)?;
        validate_non_negative("item discount", item.discount_cents)?;
    }

    Ok(())
}

/// Validates a new sale before anything is written.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if let Some(customer_id) = &sale.customer_id {
        validate_required("customer_id", customer_id)?;
    }
    validate_sale_items(&sale.items)?;
    if let Some(discount) = sale.discount_amount_cents {
        validate_non_negative("discount_amount", discount)?;
    }
    if let Some(tax) = sale.tax_amount_cents {
        validate_non_negative("tax_amount", tax)?;
    }
    validate_notes(sale.notes.as_deref())
}

/// Validates a new refund.
///
/// The amount is only checked for sign; it is not compared with the sale.
pub fn validate_new_refund(refund: &NewRefund) -> ValidationResult<()> {
    validate_required("sale_id", &refund.sale_id)?;
    validate_non_negative("refund_amount", refund.refund_amount_cents)?;
    validate_required("refund_reason", &refund.refund_reason)?;
    validate_max_len("refund_reason", &refund.refund_reason, MAX_NOTES_LEN)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn purchase(items: Vec<NewPurchaseLineItem>) -> NewPurchaseOrder {
        NewPurchaseOrder {
            supplier_id: "sup-1".to_string(),
            items,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_amounts_are_capped() {
        assert!(validate_positive("unit_cost", MAX_AMOUNT_CENTS).is_ok());
        assert!(matches!(
            validate_positive("unit_cost", MAX_AMOUNT_CENTS + 1).unwrap_err(),
            ValidationError::OutOfRange { ref field, .. } if field == "unit_cost"
        ));
        assert!(validate_non_negative("discount", i64::MAX).is_err());

        let huge = purchase(vec![NewPurchaseLineItem::new("Insulin", 2, i64::MAX / 2 + 1)]);
        assert!(validate_new_purchase(&huge).is_err());
        let sale = vec![NewSaleLineItem::new("p1", 2, i64::MAX / 2 + 1)];
        assert!(validate_sale_items(&sale).is_err());
    }

    #[test]
    fn test_new_purchase_requires_supplier() {
        let mut order = purchase(vec![NewPurchaseLineItem::new("Saline", 1, 100)]);
        assert!(validate_new_purchase(&order).is_ok());

        order.supplier_id = "  ".to_string();
        let err = validate_new_purchase(&order).unwrap_err();
        assert!(matches!(err, ValidationError::Required { ref field } if field == "supplier_id"));
    }

    #[test]
    fn test_new_purchase_rejects_bad_lines() {
        assert!(matches!(
            validate_new_purchase(&purchase(vec![])).unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(validate_new_purchase(&purchase(vec![NewPurchaseLineItem::new("x", 0, 100)])).is_err());
        assert!(validate_new_purchase(&purchase(vec![NewPurchaseLineItem::new("x", 1, 0)])).is_err());
        assert!(validate_new_purchase(&purchase(vec![NewPurchaseLineItem::new("", 1, 10)])).is_err());
    }

    #[test]
    fn test_new_purchase_rejects_negative_discount() {
        let mut order = purchase(vec![NewPurchaseLineItem::new("Saline", 1, 100)]);
        order.discount_cents = Some(-1);
        assert!(validate_new_purchase(&order).is_err());
        order.discount_cents = Some(0);
        assert!(validate_new_purchase(&order).is_ok());
    }

    #[test]
    fn test_patch_only_checks_present_fields() {
        assert!(validate_purchase_patch(&PurchaseOrderPatch::default()).is_ok());
        let patch = PurchaseOrderPatch {
            items: Some(vec![]),
            ..Default::default()
        };
        assert!(validate_purchase_patch(&patch).is_err());
    }

    #[test]
    fn test_received_items() {
        assert!(validate_received_items(&[ReceivedItem::for_product("p1", 5)]).is_ok());
        assert!(validate_received_items(&[ReceivedItem::for_product("p1", 0)]).is_ok());
        assert!(validate_received_items(&[ReceivedItem::for_product("p1", -1)]).is_err());
        let orphan = ReceivedItem {
            line_item_id: None,
            product_id: None,
            received_quantity: 1,
        };
        assert!(validate_received_items(&[orphan]).is_err());
    }

    #[test]
    fn test_new_sale() {
        let sale = NewSale {
            customer_id: None,
            items: vec![NewSaleLineItem::new("p1", 2, 0)],
            payment_method: PaymentMethod::Cash,
            discount_amount_cents: None,
            tax_amount_cents: Some(0),
            notes: None,
        };
        assert!(validate_new_sale(&sale).is_ok());

        let mut bad = sale.clone();
        bad.tax_amount_cents = Some(-5);
        assert!(validate_new_sale(&bad).is_err());

        let mut bad = sale.clone();
        bad.items[0].product_id.clear();
        assert!(validate_new_sale(&bad).is_err());

        let mut bad = sale;
        bad.items.clear();
        assert!(validate_new_sale(&bad).is_err());
    }

    #[test]
    fn test_new_refund() {
        let refund = NewRefund {
            sale_id: "s1".to_string(),
            refund_amount_cents: 0,
            refund_reason: "Damaged packaging".to_string(),
            refund_method: PaymentMethod::Cash,
        };
        assert!(validate_new_refund(&refund).is_ok());

        let mut bad = refund.clone();
        bad.refund_amount_cents = -1;
        assert!(validate_new_refund(&bad).is_err());

        let mut bad = refund;
        bad.refund_reason = String::new();
        assert!(validate_new_refund(&bad).is_err());
    }
}
