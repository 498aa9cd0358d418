use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Deserializer};

/// Candle granularity supported by the historical-chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    Min5,
    Min15,
    Min30,
    #[default]
    Hour1,
    Hour4,
    Day1,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Hour1,
        Interval::Hour4,
        Interval::Day1,
    ];

    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::Min5 => "5min",
            Self::Min15 => "15min",
            Self::Min30 => "30min",
            Self::Hour1 => "1hour",
            Self::Hour4 => "4hour",
            Self::Day1 => "1day",
        }
    }

    pub fn is_sub_daily(self) -> bool {
        !matches!(self, Self::Day1)
    }

    /// Trailing lookback used when the operator's date window is unusable.
    pub fn fallback_lookback(self) -> Duration {
        if self.is_sub_daily() {
            Duration::days(7)
        } else {
            Duration::days(10)
        }
    }

    /// Next interval in UI order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|iv| *iv == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval '{0}': expected one of 5min/15min/30min/1hour/4hour/1day")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|iv| iv.as_api_str() == normalized)
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Interval {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
