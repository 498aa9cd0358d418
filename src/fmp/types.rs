use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

use crate::error::FetchError;
use crate::model::candle::{Candle, DATE_FORMAT};

/// Accept JSON numbers and numeric strings; the API has served both.
pub fn string_or_number_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;
    match v {
        Value::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("invalid number")),
        _ => Err(serde::de::Error::custom("invalid numeric value")),
    }
}

/// One record of `GET /api/v3/historical-chart/{interval}/{symbol}`.
#[derive(Debug, Deserialize)]
pub struct FmpChartRecord {
    pub date: String,
    #[serde(deserialize_with = "string_or_number_to_f64")]
    pub open: f64,
    #[serde(deserialize_with = "string_or_number_to_f64")]
    pub high: f64,
    #[serde(deserialize_with = "string_or_number_to_f64")]
    pub low: f64,
    #[serde(deserialize_with = "string_or_number_to_f64")]
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Timestamps come as `YYYY-MM-DD HH:MM:SS`; daily bars sometimes drop the time.
pub fn parse_fmp_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

impl FmpChartRecord {
    pub fn into_candle(self) -> Result<Candle, FetchError> {
        let date = parse_fmp_date(&self.date)
            .ok_or_else(|| FetchError::Malformed(format!("unparseable date '{}'", self.date)))?;
        Ok(Candle::new(date, self.open, self.high, self.low, self.close))
    }
}

/// Decode a historical-chart payload. A non-list or empty list is "no data";
/// a list containing records without the OHLC shape is malformed.
pub fn decode_historical_chart(root: Value) -> Result<Vec<Candle>, FetchError> {
    let items = match root {
        Value::Array(items) if !items.is_empty() => items,
        _ => return Err(FetchError::NoData),
    };
    let records: Vec<FmpChartRecord> = serde_json::from_value(Value::Array(items))
        .map_err(|e| FetchError::Malformed(e.to_string()))?;
    records.into_iter().map(FmpChartRecord::into_candle).collect()
}
