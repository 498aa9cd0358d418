use chrono::NaiveDateTime;

use crate::model::candle::Candle;
use crate::model::interval::Interval;
use crate::model::window::DateWindow;

/// Candles ascending by timestamp, one per timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    candles: Vec<Candle>,
}

/// Result of applying the operator's date window to a series.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSelection {
    pub series: PriceSeries,
    /// Window actually applied: the requested one, or the trailing fallback.
    pub applied: DateWindow,
    /// Set when the requested window was unusable and the trailing default was used.
    pub fallback: bool,
}

impl PriceSeries {
    /// Sort ascending and dedupe by timestamp; for duplicates the later record wins.
    /// Candles that violate the OHLC shape are dropped.
    pub fn from_candles(mut candles: Vec<Candle>) -> Self {
        let before = candles.len();
        candles.retain(Candle::is_valid);
        let dropped = before - candles.len();
        if dropped > 0 {
            tracing::warn!(dropped, "Dropped candles with invalid OHLC values");
        }

        // Stable sort keeps arrival order among equal timestamps.
        candles.sort_by_key(|c| c.date);
        let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match out.last_mut() {
                Some(last) if last.date == candle.date => *last = candle,
                _ => out.push(candle),
            }
        }
        Self { candles: out }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// The most recent `n` candles, still ascending.
    pub fn tail(&self, n: usize) -> &[Candle] {
        let start = self.candles.len().saturating_sub(n);
        &self.candles[start..]
    }

    pub fn filter(&self, window: &DateWindow) -> Self {
        Self {
            candles: self
                .candles
                .iter()
                .filter(|c| window.contains(c.date))
                .cloned()
                .collect(),
        }
    }

    /// Apply the operator window. An inverted window (`from >= to`) is replaced by
    /// the interval's trailing lookback anchored at `now`.
    pub fn select(
        &self,
        window: DateWindow,
        interval: Interval,
        now: NaiveDateTime,
    ) -> WindowSelection {
        if window.is_valid() {
            return WindowSelection {
                series: self.filter(&window),
                applied: window,
                fallback: false,
            };
        }
        let trailing = DateWindow::trailing(now, interval.fallback_lookback());
        tracing::warn!(
            from = %window.from,
            to = %window.to,
            interval = %interval,
            "'from' must be earlier than 'to', using trailing window"
        );
        WindowSelection {
            series: self.filter(&trailing),
            applied: trailing,
            fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn candle(d: u32, h: u32, close: f64) -> Candle {
        Candle::new(at(d, h), close, close + 1.0, close - 1.0, close)
    }

    #[test]
    fn sorts_and_dedupes_keeping_latest_record() {
        let series = PriceSeries::from_candles(vec![
            candle(2, 0, 20.0),
            candle(1, 0, 10.0),
            candle(2, 0, 21.0),
        ]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.candles()[0].date, at(1, 0));
        assert!((series.last().unwrap().close - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn drops_invalid_candles() {
        let mut bad = candle(1, 1, 10.0);
        bad.high = 5.0;
        let series = PriceSeries::from_candles(vec![bad, candle(1, 2, 11.0)]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn tail_clamps_to_length() {
        let series = PriceSeries::from_candles((1..=5).map(|d| candle(d, 0, 10.0)).collect());
        assert_eq!(series.tail(3).len(), 3);
        assert_eq!(series.tail(3)[0].date, at(3, 0));
        assert_eq!(series.tail(50).len(), 5);
    }
}
