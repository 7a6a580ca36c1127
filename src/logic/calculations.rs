use chrono::{Months, NaiveDate};

/// Mean Gregorian month length in days (365.25 / 12).
pub const AVG_DAYS_PER_MONTH: f64 = 30.4375;

/// Elapsed months between two dates as a fraction, never negative.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let days = (end - start).num_days().abs() as f64;
    days / AVG_DAYS_PER_MONTH
}

/// Advance a date by a fractional number of months: whole months on the
/// calendar, the remainder converted to days. `None` on overflow or for a
/// non-finite/negative offset.
pub fn add_months(date: NaiveDate, months: f64) -> Option<NaiveDate> {
    if !months.is_finite() || months < 0.0 || months > u32::MAX as f64 {
        return None;
    }
    let whole = months.trunc();
    let extra_days = ((months - whole) * AVG_DAYS_PER_MONTH).round() as u64;

    date.checked_add_months(Months::new(whole as u32))?
        .checked_add_days(chrono::Days::new(extra_days))
}

/// First day still inside a trailing window of `months` ending at `as_of`.
pub fn window_start(as_of: NaiveDate, months: u32) -> NaiveDate {
    as_of
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn months_between_is_symmetric() {
        let a = d(2024, 1, 1);
        let b = d(2024, 7, 1);
        assert!((months_between(a, b) - 5.98).abs() < 0.01);
        assert_eq!(months_between(a, b), months_between(b, a));
        assert_eq!(months_between(a, a), 0.0);
    }

    #[test]
    fn add_whole_months_follows_calendar() {
        assert_eq!(add_months(d(2024, 3, 15), 1.0), Some(d(2024, 4, 15)));
        assert_eq!(add_months(d(2024, 1, 31), 1.0), Some(d(2024, 2, 29)));
        assert_eq!(add_months(d(2024, 3, 15), 0.0), Some(d(2024, 3, 15)));
    }

    #[test]
    fn add_fractional_months_adds_days() {
        // half a month ~ 15 days
        assert_eq!(add_months(d(2024, 3, 1), 0.5), Some(d(2024, 3, 16)));
        assert_eq!(add_months(d(2024, 3, 1), 1.5), Some(d(2024, 4, 16)));
    }

    #[test]
    fn add_months_rejects_unbounded_offsets() {
        assert_eq!(add_months(d(2024, 3, 1), f64::INFINITY), None);
        assert_eq!(add_months(d(2024, 3, 1), -1.0), None);
        assert_eq!(add_months(d(2024, 3, 1), f64::NAN), None);
    }

    #[test]
    fn window_start_goes_back_calendar_months() {
        assert_eq!(window_start(d(2024, 8, 31), 6), d(2024, 2, 29));
        assert_eq!(window_start(d(2024, 8, 15), 0), d(2024, 8, 15));
    }
}
