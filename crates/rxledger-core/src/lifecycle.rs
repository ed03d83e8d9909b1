//! # Purchase Order Lifecycle
//!
//! The status machine every purchase order moves through.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   pending ───► ordered ───► received ───► returned                      │
//! │      │  \         │            ▲                                        │
//! │      │   \────────┼────────────┘  (direct receipt)                      │
//! │      ▼            ▼                                                     │
//! │   cancelled ◄─────┘                                                     │
//! │                                                                         │
//! │   cancelled / returned are terminal                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock is increased on exactly one edge: any transition *into*
//! `received`. Re-asserting the current status is not a transition.

use crate::error::{CoreError, CoreResult};
use crate::types::PurchaseStatus;

/// Outcome of checking a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one; nothing to do.
    Unchanged,
    /// A legal move to a new status.
    Move {
        from: PurchaseStatus,
        to: PurchaseStatus,
    },
}

impl Transition {
    /// True when this transition should add the order's goods to stock.
    pub fn receives_stock(&self) -> bool {
        matches!(
            self,
            Transition::Move {
                to: PurchaseStatus::Received,
                ..
            }
        )
    }
}

/// Returns true if `from → to` is an edge of the lifecycle graph.
pub fn can_transition(from: PurchaseStatus, to: PurchaseStatus) -> bool {
    use PurchaseStatus::*;

    matches!(
        (from, to),
        (Pending, Ordered)
            | (Pending, Received)
            | (Ordered, Received)
            | (Pending, Cancelled)
            | (Ordered, Cancelled)
            | (Received, Returned)
    )
}

/// Returns true once an order can no longer change status.
pub fn is_terminal(status: PurchaseStatus) -> bool {
    matches!(status, PurchaseStatus::Cancelled | PurchaseStatus::Returned)
}

/// Cancelled orders are frozen; every other status accepts field edits.
pub fn is_editable(status: PurchaseStatus) -> bool {
    status != PurchaseStatus::Cancelled
}

/// Checks a requested status change for order `id`.
///
/// ## Example
/// ```rust
/// use rxledger_core::lifecycle::{check_transition, Transition};
/// use rxledger_core::types::PurchaseStatus;
///
/// let t = check_transition("po-1", PurchaseStatus::Ordered, PurchaseStatus::Received).unwrap();
/// assert!(t.receives_stock());
///
/// let same = check_transition("po-1", PurchaseStatus::Received, PurchaseStatus::Received).unwrap();
/// assert_eq!(same, Transition::Unchanged);
///
/// assert!(check_transition("po-1", PurchaseStatus::Cancelled, PurchaseStatus::Ordered).is_err());
/// ```
pub fn check_transition(
    id: &str,
    from: PurchaseStatus,
    to: PurchaseStatus,
) -> CoreResult<Transition> {
    if from == to {
        return Ok(Transition::Unchanged);
    }

    if !can_transition(from, to) {
        return Err(CoreError::InvalidTransition {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    Ok(Transition::Move { from, to })
}

/// Checks that order `id` may be edited at all.
pub fn ensure_editable(id: &str, status: PurchaseStatus) -> CoreResult<()> {
    if is_editable(status) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            id: id.to_string(),
            from: status.to_string(),
            to: "edited".to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use PurchaseStatus::*;

    const ALL: [PurchaseStatus; 5] = [Pending, Ordered, Received, Cancelled, Returned];

    #[test]
    fn test_main_path() {
        assert!(can_transition(Pending, Ordered));
        assert!(can_transition(Ordered, Received));
        assert!(can_transition(Received, Returned));
    }

    #[test]
    fn test_side_transitions() {
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Ordered, Cancelled));
        assert!(!can_transition(Received, Cancelled));
        assert!(!can_transition(Ordered, Pending));
        assert!(!can_transition(Pending, Returned));
    }

    #[test]
    fn test_no_way_out_of_terminal_states() {
        for from in [Cancelled, Returned] {
            assert!(is_terminal(from));
            for to in ALL {
                assert!(!can_transition(from, to), "{} -> {} must be rejected", from, to);
            }
        }
    }

    #[test]
    fn test_only_moves_into_received_touch_stock() {
        for from in ALL {
            for to in ALL {
                if let Ok(t) = check_transition("po", from, to) {
                    assert_eq!(t.receives_stock(), to == Received && from != Received);
                }
            }
        }
    }

    #[test]
    fn test_cancelled_orders_are_frozen() {
        assert!(ensure_editable("po", Pending).is_ok());
        assert!(ensure_editable("po", Received).is_ok());
        assert!(ensure_editable("po", Returned).is_ok());
        let err = ensure_editable("po", Cancelled).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }
}
