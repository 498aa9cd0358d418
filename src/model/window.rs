use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Half-open instant interval `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl DateWindow {
    pub fn new(from: NaiveDateTime, to: NaiveDateTime) -> Self {
        Self { from, to }
    }

    /// Inclusive calendar-date range: `[from 00:00, to + 1 day 00:00)`.
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Self {
        let from = from.and_time(chrono::NaiveTime::MIN);
        let to = to.and_time(chrono::NaiveTime::MIN) + Duration::days(1);
        Self { from, to }
    }

    /// Open-ended window covering the last `lookback` before `now`.
    pub fn trailing(now: NaiveDateTime, lookback: Duration) -> Self {
        Self {
            from: now - lookback,
            to: NaiveDateTime::MAX,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.from < self.to
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        t >= self.from && t < self.to
    }
}

/// Operator-chosen calendar range. Missing ends default to the last week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub const DEFAULT_SPAN_DAYS: i64 = 7;

    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn resolve(&self, today: NaiveDate) -> DateWindow {
        let from = self
            .from
            .unwrap_or(today - Duration::days(Self::DEFAULT_SPAN_DAYS));
        let to = self.to.unwrap_or(today);
        DateWindow::from_dates(from, to)
    }

    /// Move `from` by `days`, filling a missing end with its default first.
    pub fn shift_from(&self, days: i64, today: NaiveDate) -> Self {
        let (from, to) = self.pinned(today);
        Self::new(Some(from + Duration::days(days)), Some(to))
    }

    /// Move `to` by `days`, filling a missing end with its default first.
    pub fn shift_to(&self, days: i64, today: NaiveDate) -> Self {
        let (from, to) = self.pinned(today);
        Self::new(Some(from), Some(to + Duration::days(days)))
    }

    fn pinned(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            self.from
                .unwrap_or(today - Duration::days(Self::DEFAULT_SPAN_DAYS)),
            self.to.unwrap_or(today),
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d"))?,
            None => write!(f, "last {}d", Self::DEFAULT_SPAN_DAYS)?,
        }
        match self.to {
            Some(d) => write!(f, "..{}", d.format("%Y-%m-%d")),
            None => write!(f, "..today"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_defaults_to_last_week() {
        let w = DateRange::default().resolve(day(10));
        assert_eq!(w, DateWindow::from_dates(day(3), day(10)));
        let w = DateRange::new(Some(day(1)), None).resolve(day(10));
        assert_eq!(w, DateWindow::from_dates(day(1), day(10)));
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn from_dates_includes_whole_end_day() {
        let w = DateWindow::from_dates(day(1), day(3));
        assert!(w.is_valid());
        assert!(w.contains(day(1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(w.contains(day(3).and_hms_opt(23, 59, 59).unwrap()));
        assert!(!w.contains(day(4).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn shifting_pins_missing_ends_first() {
        let r = DateRange::default().shift_from(-1, day(10));
        assert_eq!(r, DateRange::new(Some(day(2)), Some(day(10))));
        let r = r.shift_to(-3, day(10));
        assert_eq!(r, DateRange::new(Some(day(2)), Some(day(7))));
        assert_eq!(r.to_string(), "2024-05-02..2024-05-07");
        assert_eq!(DateRange::default().to_string(), "last 7d..today");
    }

    #[test]
    fn same_day_range_is_valid() {
        assert!(DateWindow::from_dates(day(2), day(2)).is_valid());
    }

    #[test]
    fn reversed_dates_are_invalid() {
        assert!(!DateWindow::from_dates(day(5), day(3)).is_valid());
        // from one day past to: to + 1 day == from, still empty
        assert!(!DateWindow::from_dates(day(4), day(3)).is_valid());
    }

    #[test]
    fn trailing_window_has_no_upper_bound() {
        let now = day(10).and_hms_opt(12, 0, 0).unwrap();
        let w = DateWindow::trailing(now, Duration::days(7));
        assert!(w.contains(day(3).and_hms_opt(12, 0, 0).unwrap()));
        assert!(!w.contains(day(3).and_hms_opt(11, 59, 59).unwrap()));
        assert!(w.contains(day(20).and_hms_opt(0, 0, 0).unwrap()));
    }
}
