use std::fmt;

use chrono::NaiveDateTime;

use crate::levels::LevelSet;

pub const DEFAULT_THRESHOLD_RATIO: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Support,
    Resistance,
}

impl LevelKind {
    /// Lowercase tag used in file names and message bodies.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Resistance => "resistance",
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Support => write!(f, "Support"),
            Self::Resistance => write!(f, "Resistance"),
        }
    }
}

/// Relative distance (fraction of the latest close) within which price counts as near a level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityThreshold {
    ratio: f64,
}

impl Default for ProximityThreshold {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_RATIO)
    }
}

impl ProximityThreshold {
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Absolute price distance for `close`. Never negative.
    pub fn absolute(&self, close: f64) -> f64 {
        (self.ratio * close).abs()
    }

    pub fn is_near(&self, close: f64, level: f64) -> bool {
        (close - level).abs() <= self.absolute(close)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProximityEvent {
    pub kind: LevelKind,
    pub price: f64,
    pub support: f64,
    pub resistance: f64,
    pub symbol: String,
    pub timestamp: NaiveDateTime,
}

impl ProximityEvent {
    /// The level the price is near.
    pub fn level(&self) -> f64 {
        match self.kind {
            LevelKind::Support => self.support,
            LevelKind::Resistance => self.resistance,
        }
    }
}

/// Check the latest close against support and resistance. Both checks are
/// independent, so a flat market yields two events (support first).
pub fn evaluate(
    symbol: &str,
    levels: &LevelSet,
    threshold: ProximityThreshold,
    timestamp: NaiveDateTime,
) -> Vec<ProximityEvent> {
    let close = levels.last_close;
    let mut events = Vec::with_capacity(2);
    for (kind, level) in [
        (LevelKind::Support, levels.support),
        (LevelKind::Resistance, levels.resistance),
    ] {
        if threshold.is_near(close, level) {
            tracing::info!(
                symbol,
                kind = %kind,
                price = close,
                level,
                threshold = threshold.absolute(close),
                "Price near level"
            );
            events.push(ProximityEvent {
                kind,
                price: close,
                support: levels.support,
                resistance: levels.resistance,
                symbol: symbol.to_string(),
                timestamp,
            });
        }
    }
    events
}
