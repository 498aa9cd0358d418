use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::error::FetchError;
use crate::model::candle::Candle;
use crate::model::interval::Interval;

use super::types::decode_historical_chart;

pub struct FmpRestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FmpRestClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn historical_chart_url(&self, symbol: &str, interval: Interval) -> String {
        format!(
            "{}/api/v3/historical-chart/{}/{}",
            self.base_url,
            interval.as_api_str(),
            symbol
        )
    }

    /// Fetch the candle list for `(symbol, interval)`. Records come back in
    /// whatever order the API returns them; the series loader sorts.
    pub async fn get_historical_chart(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, FetchError> {
        let url = self.historical_chart_url(symbol, interval);
        tracing::debug!(symbol, interval = %interval, "Requesting historical chart");

        let resp = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(symbol, status = status.as_u16(), "Historical chart request rejected");
            return Err(FetchError::Status(status.as_u16()));
        }

        let root: Value = resp
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;
        let candles = decode_historical_chart(root)?;
        tracing::info!(symbol, interval = %interval, count = candles.len(), "Fetched historical chart");
        Ok(candles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_interval_and_symbol_path_segments() {
        let client =
            FmpRestClient::new("https://example.test/", "k", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.historical_chart_url("BTCUSD", Interval::Hour4),
            "https://example.test/api/v3/historical-chart/4hour/BTCUSD"
        );
    }
}
