//! # Sales Statistics
//!
//! Pure aggregation over a branch's sales and refunds. The caller passes
//! `now` so "today" and "this month" are deterministic under test.
//! Both windows are evaluated in UTC.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Refund, RefundStatus, Sale, SaleStatus};

/// Dashboard figures for one branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesStats {
    pub total_sales: i64,
    pub total_revenue_cents: i64,
    pub today_sales: i64,
    pub today_revenue_cents: i64,
    pub month_sales: i64,
    pub month_revenue_cents: i64,
    /// Sum of completed refunds.
    pub refund_amount_cents: i64,
    pub net_revenue_cents: i64,
    /// `total_revenue / total_sales`, truncated; 0 with no sales.
    pub average_order_value_cents: i64,
}

/// Aggregates sales and refunds into [`SalesStats`].
///
/// Cancelled sales are excluded from counts and revenue. Revenue is the
/// sale's `final_amount`.
pub fn compute(sales: &[Sale], refunds: &[Refund], now: DateTime<Utc>) -> SalesStats {
    let today = now.date_naive();
    let mut stats = SalesStats::default();

    for sale in sales.iter().filter(|s| s.status != SaleStatus::Cancelled) {
        let amount = sale.final_amount_cents;
        stats.total_sales += 1;
        stats.total_revenue_cents += amount;

        let day = sale.sale_date.date_naive();
        if day == today {
            stats.today_sales += 1;
            stats.today_revenue_cents += amount;
        }
        if day.year() == today.year() && day.month() == today.month() {
            stats.month_sales += 1;
            stats.month_revenue_cents += amount;
        }
    }

    stats.refund_amount_cents = refunds
        .iter()
        .filter(|r| r.status == RefundStatus::Completed)
        .map(|r| r.refund_amount_cents)
        .sum();

    stats.net_revenue_cents = stats.total_revenue_cents - stats.refund_amount_cents;
    if stats.total_sales > 0 {
        stats.average_order_value_cents = stats.total_revenue_cents / stats.total_sales;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SalePaymentStatus};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn sale(final_amount: i64, at: DateTime<Utc>, status: SaleStatus) -> Sale {
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: "t".to_string(),
            branch_id: "b".to_string(),
            customer_id: None,
            sale_number: "SALE".to_string(),
            sale_date: at,
            total_amount_cents: final_amount,
            tax_amount_cents: 0,
            discount_amount_cents: 0,
            final_amount_cents: final_amount,
            payment_method: PaymentMethod::Cash,
            payment_status: SalePaymentStatus::Completed,
            status,
            notes: None,
            created_by: "u".to_string(),
            created_at: at,
            updated_at: at,
        }
    }

    fn refund(amount: i64, status: RefundStatus) -> Refund {
        Refund {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: "t".to_string(),
            branch_id: "b".to_string(),
            sale_id: "s".to_string(),
            refund_amount_cents: amount,
            refund_reason: "r".to_string(),
            refund_method: PaymentMethod::Cash,
            status,
            created_by: "u".to_string(),
            created_at: now(),
        }
    }

    #[test]
    fn test_empty_is_all_zero() {
        assert_eq!(compute(&[], &[], now()), SalesStats::default());
    }

    #[test]
    fn test_windows() {
        let sales = vec![
            sale(1000, now(), SaleStatus::Completed),
            sale(500, now() - Duration::days(3), SaleStatus::Completed),
            sale(300, now() - Duration::days(40), SaleStatus::Completed),
        ];
        let stats = compute(&sales, &[], now());
        assert_eq!(stats.total_sales, 3);
        assert_eq!(stats.total_revenue_cents, 1800);
        assert_eq!((stats.today_sales, stats.today_revenue_cents), (1, 1000));
        assert_eq!((stats.month_sales, stats.month_revenue_cents), (2, 1500));
        assert_eq!(stats.average_order_value_cents, 600);
    }

    #[test]
    fn test_cancelled_sales_and_pending_refunds_are_ignored() {
        let sales = vec![
            sale(1000, now(), SaleStatus::Completed),
            sale(9999, now(), SaleStatus::Cancelled),
        ];
        let refunds = vec![
            refund(200, RefundStatus::Completed),
            refund(700, RefundStatus::Pending),
        ];
        let stats = compute(&sales, &refunds, now());
        assert_eq!(stats.total_sales, 1);
        assert_eq!(stats.refund_amount_cents, 200);
        assert_eq!(stats.net_revenue_cents, 800);
    }
}
