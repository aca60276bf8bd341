//! Booking price arithmetic feeding receipt creation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Children are billed at half the adult rate.
fn child_rate() -> Decimal {
    Decimal::new(5, 1)
}

/// Billable days between two dates: absolute difference, minimum 1. A
/// same-day booking is billed as one day.
pub fn compute_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs().max(1)
}

/// `unit_price * days * adults + unit_price * 0.5 * days * children`.
/// No currency rounding here; rounding is a presentation concern.
pub fn compute_subtotal(unit_price: Decimal, days: i64, adults: u32, children: u32) -> Decimal {
    let days = Decimal::from(days);
    unit_price * days * Decimal::from(adults)
        + unit_price * child_rate() * days * Decimal::from(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_bills_one_day() {
        let day = date(2026, 5, 10);
        assert_eq!(compute_days(day, day), 1);
    }

    #[test]
    fn day_difference_is_absolute() {
        assert_eq!(compute_days(date(2026, 5, 10), date(2026, 5, 13)), 3);
        assert_eq!(compute_days(date(2026, 5, 13), date(2026, 5, 10)), 3);
    }

    #[test]
    fn children_pay_half() {
        // 100 * 2 * 2 + 100 * 0.5 * 2 * 1 = 500
        let subtotal = compute_subtotal(Decimal::from(100), 2, 2, 1);
        assert_eq!(subtotal, Decimal::from(500));
    }

    #[test]
    fn no_guests_no_charge() {
        assert_eq!(compute_subtotal(Decimal::from(100), 3, 0, 0), Decimal::ZERO);
    }

    #[test]
    fn three_day_stay_for_two_adults() {
        // 120 * 3 * 2 = 720
        let subtotal = compute_subtotal(Decimal::from(120), 3, 2, 0);
        assert_eq!(subtotal, Decimal::from(720));
    }
}
