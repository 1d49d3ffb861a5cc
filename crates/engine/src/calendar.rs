//! Per-source trading calendar resolution.
//!
//! Every data source gets its own [`TradingCalendar`]; the equity and
//! benchmark calendars are resolved independently and never assumed to
//! agree on a date.

use factorbt_primitives::Date;

/// A sorted, deduplicated set of trading days for one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradingCalendar {
    days: Vec<Date>,
}

impl TradingCalendar {
    /// Build a calendar from a source's trading days.
    #[must_use]
    pub fn new(mut days: Vec<Date>) -> Self {
        days.sort_unstable();
        days.dedup();
        Self { days }
    }

    /// Whether the calendar has no trading days.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of trading days.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.days.len()
    }

    /// All trading days, ascending.
    #[must_use]
    pub fn days(&self) -> &[Date] {
        &self.days
    }

    /// Whether `date` is a trading day.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.days.binary_search(&date).is_ok()
    }

    /// Resolve a nominal date to the nearest trading day: forward first,
    /// then backward, each within `max_offset_days` calendar days.
    #[must_use]
    pub fn resolve(&self, nominal: Date, max_offset_days: u32) -> Option<Date> {
        let offset = i64::from(max_offset_days);
        let idx = self.days.partition_point(|d| *d < nominal);
        if let Some(&d) = self.days.get(idx) {
            if (d - nominal).num_days() <= offset {
                return Some(d);
            }
        }
        if idx > 0 {
            let d = self.days[idx - 1];
            if (nominal - d).num_days() <= offset {
                return Some(d);
            }
        }
        None
    }

    /// Number of trading days in `[start, end)`.
    #[must_use]
    pub fn count_in(&self, start: Date, end: Date) -> usize {
        let lo = self.days.partition_point(|d| *d < start);
        let hi = self.days.partition_point(|d| *d < end);
        hi.saturating_sub(lo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn weekday_calendar() -> TradingCalendar {
        // Mon 2024-01-01 .. Fri 2024-01-26, weekdays only
        let days = (1..=26)
            .filter_map(|d| {
                let date = ymd(2024, 1, d);
                use chrono::Datelike;
                (date.weekday().number_from_monday() <= 5).then_some(date)
            })
            .collect();
        TradingCalendar::new(days)
    }

    #[test]
    fn resolve_exact_hit() {
        let cal = weekday_calendar();
        assert_eq!(cal.resolve(ymd(2024, 1, 3), 5), Some(ymd(2024, 1, 3)));
    }

    #[test]
    fn resolve_prefers_forward() {
        let cal = weekday_calendar();
        // Saturday resolves forward to Monday, not back to Friday
        assert_eq!(cal.resolve(ymd(2024, 1, 6), 5), Some(ymd(2024, 1, 8)));
    }

    #[test]
    fn resolve_falls_back_backward() {
        let cal = weekday_calendar();
        // Past the end of the calendar: only backward match exists
        assert_eq!(cal.resolve(ymd(2024, 1, 28), 5), Some(ymd(2024, 1, 26)));
    }

    #[test]
    fn resolve_bounded_window() {
        let cal = weekday_calendar();
        assert_eq!(cal.resolve(ymd(2024, 3, 1), 5), None);
    }

    #[test]
    fn count_in_half_open() {
        let cal = weekday_calendar();
        // Week of Jan 8: Mon..Fri
        assert_eq!(cal.count_in(ymd(2024, 1, 8), ymd(2024, 1, 13)), 5);
        assert_eq!(cal.count_in(ymd(2024, 1, 8), ymd(2024, 1, 8)), 0);
    }

    #[test]
    fn new_sorts_and_dedups() {
        let cal =
            TradingCalendar::new(vec![ymd(2024, 1, 3), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert_eq!(cal.len(), 2);
        assert_eq!(cal.days(), &[ymd(2024, 1, 2), ymd(2024, 1, 3)]);
    }
}
