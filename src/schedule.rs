use tracing::warn;

use crate::decimal::Money;
use crate::purchase::InstallmentPurchase;
use crate::types::{MonthKey, MonthOverview, MonthlyDue, ScheduleStatus};

/// hard cap on the projection walk, 30 years of months
///
/// the analytic bound below is tighter for well-formed records; the cap exists
/// so corrupt installment counts still terminate fast
pub const MAX_PROJECTION_MONTHS: usize = 360;

/// project whether a purchase carries a due installment in the target month
///
/// pure and re-entrant: walks the calendar forward from the purchase's start
/// month, counting months that were not explicitly delayed against
/// `total_installments`. a delayed month never advances that count, so every
/// delay pushes the schedule's real end one month later without changing the
/// installment total.
pub fn project(purchase: &InstallmentPurchase, target: MonthKey) -> ScheduleStatus {
    let start = purchase.start_month();
    if target < start {
        return ScheduleStatus::default();
    }

    // each non-delayed month consumes one installment, so a useful walk never
    // exceeds total + delayed + 1 steps
    let budget = (purchase.total_installments as usize)
        .saturating_add(purchase.delayed_months.len())
        .saturating_add(1)
        .min(MAX_PROJECTION_MONTHS);

    let mut pointer = start;
    let mut paid_count: u32 = 0;

    for _ in 0..budget {
        if pointer == target {
            return ScheduleStatus {
                is_visible: paid_count < purchase.total_installments,
                is_delayed: purchase.delayed_months.contains(&pointer),
            };
        }

        if !purchase.delayed_months.contains(&pointer) {
            paid_count += 1;
            if paid_count >= purchase.total_installments {
                // schedule exhausted before the target month arrived
                return ScheduleStatus::default();
            }
        }

        pointer = pointer.next();
    }

    warn!(
        purchase_id = %purchase.id,
        target = %target,
        "projection budget exhausted, treating month as not visible"
    );
    ScheduleStatus::default()
}

/// materialize the installments visible in one calendar month
///
/// delayed purchases are listed for visibility but excluded from
/// `payable_total`: delayed means "not charged this month", not invisible.
pub fn month_installments(
    purchases: &[InstallmentPurchase],
    month: MonthKey,
) -> MonthOverview {
    let mut entries = Vec::new();
    let mut payable_total = Money::ZERO;

    for purchase in purchases {
        let status = project(purchase, month);
        if !status.is_visible {
            continue;
        }

        let due_amount = purchase.monthly_amount() + purchase.accumulated_interest;
        if !status.is_delayed {
            payable_total += due_amount;
        }

        entries.push(MonthlyDue {
            purchase_id: purchase.id,
            due_amount,
            is_delayed: status.is_delayed,
        });
    }

    MonthOverview {
        month,
        entries,
        payable_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn purchase(total: i64, installments: u32) -> InstallmentPurchase {
        InstallmentPurchase::new(
            "tv",
            Money::from_major(total),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            installments,
        )
        .unwrap()
    }

    fn month(year: i32, m: u32) -> MonthKey {
        MonthKey::new(year, m).unwrap()
    }

    #[test]
    fn test_start_month_is_visible() {
        // scenario: 1000 over 10 months starting 2024-01
        let p = purchase(1_000, 10);
        let status = project(&p, month(2024, 0));
        assert!(status.is_visible);
        assert!(!status.is_delayed);
        assert_eq!(p.monthly_amount(), Money::from_major(100));
    }

    #[test]
    fn test_month_before_start_is_not_visible() {
        let p = purchase(1_000, 10);
        assert_eq!(project(&p, month(2023, 11)), ScheduleStatus::default());
    }

    #[test]
    fn test_last_scheduled_month_visible_then_exhausted() {
        let p = purchase(1_000, 10);
        // 10th month of the schedule, oct 2024
        assert!(project(&p, month(2024, 9)).is_visible);
        // 11th month, schedule exhausted
        assert!(!project(&p, month(2024, 10)).is_visible);
    }

    #[test]
    fn test_delayed_month_is_visible_and_flagged() {
        let mut p = purchase(1_000, 10);
        p.delayed_months.insert(month(2024, 0));

        let status = project(&p, month(2024, 0));
        assert!(status.is_visible);
        assert!(status.is_delayed);
    }

    #[test]
    fn test_delay_extends_schedule_window() {
        // 3 installments starting jan with feb delayed: the schedule still
        // owes a due in april, the delay postponed the end
        let mut p = purchase(300, 3);
        p.delayed_months.insert(month(2024, 1));

        assert!(project(&p, month(2024, 0)).is_visible);
        assert!(project(&p, month(2024, 1)).is_delayed);
        assert!(project(&p, month(2024, 2)).is_visible);
        assert!(project(&p, month(2024, 3)).is_visible);
        assert!(!project(&p, month(2024, 4)).is_visible);
    }

    #[test]
    fn test_projection_is_deterministic_and_pure() {
        let mut p = purchase(300, 3);
        p.delayed_months.insert(month(2024, 1));
        let before = p.clone();

        let first = project(&p, month(2024, 3));
        let second = project(&p, month(2024, 3));
        assert_eq!(first, second);
        assert_eq!(p, before);
    }

    #[test]
    fn test_projection_spanning_year_boundary() {
        // 24 installments starting nov 2024 reach into 2026
        let p = InstallmentPurchase::new(
            "car",
            Money::from_major(24_000),
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            24,
        )
        .unwrap();

        assert!(project(&p, month(2025, 6)).is_visible);
        assert!(project(&p, month(2026, 9)).is_visible);
        assert!(!project(&p, month(2026, 10)).is_visible);
    }

    #[test]
    fn test_budget_exhaustion_yields_not_visible() {
        // corrupt record: installment count far past the 30-year cap
        let p = purchase(1_000, u32::MAX);
        let far = month(2100, 0);
        assert_eq!(project(&p, far), ScheduleStatus::default());
    }

    #[test]
    fn test_month_installments_includes_interest_in_due() {
        let mut p = purchase(1_000, 10);
        p.total_amount += Money::from_major(20);
        p.accumulated_interest = Money::from_major(20);

        let overview = month_installments(std::slice::from_ref(&p), month(2024, 0));
        assert_eq!(overview.entries.len(), 1);
        // 1020/10 + 20
        assert_eq!(overview.entries[0].due_amount, Money::from_major(122));
        assert_eq!(overview.payable_total, Money::from_major(122));
    }

    #[test]
    fn test_month_installments_excludes_delayed_from_total() {
        let active = purchase(1_000, 10);
        let mut delayed = purchase(500, 5);
        delayed.delayed_months.insert(month(2024, 0));
        let exhausted = {
            let mut p = purchase(200, 2);
            p.paid_installments = 2;
            p
        };

        let purchases = vec![active.clone(), delayed.clone(), exhausted];
        let overview = month_installments(&purchases, month(2024, 0));

        // the exhausted purchase is still within its calendar window, so it is
        // listed; only the delayed one drops out of the payable total
        assert_eq!(overview.entries.len(), 3);
        let delayed_entry = overview
            .entries
            .iter()
            .find(|e| e.purchase_id == delayed.id)
            .unwrap();
        assert!(delayed_entry.is_delayed);

        // 100 + 100, delayed's 100 excluded
        assert_eq!(overview.payable_total, Money::from_major(200));
    }

    #[test]
    fn test_payable_total_matches_non_delayed_sum() {
        let a = purchase(1_000, 10);
        let b = purchase(600, 6);
        let mut c = purchase(300, 3);
        c.delayed_months.insert(month(2024, 0));

        let overview = month_installments(&[a, b, c], month(2024, 0));
        let expected: Money = overview
            .entries
            .iter()
            .filter(|e| !e.is_delayed)
            .map(|e| e.due_amount)
            .sum();
        assert_eq!(overview.payable_total, expected);
    }
}
