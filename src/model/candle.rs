use chrono::NaiveDateTime;
use serde::Serialize;

/// One OHLC record as delivered by the market data API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_date<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

impl Candle {
    pub fn new(date: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// Positive finite prices with `low <= open/close <= high`.
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        self.low <= body_low && body_high <= self.high
    }
}
