use crate::model::series::PriceSeries;

/// Retracement ratios, ordered resistance -> support.
pub const FIB_RATIOS: [f64; 4] = [0.0, 0.382, 0.618, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

impl FibLevel {
    pub fn label(&self) -> String {
        format!("Fib {}", format_ratio(self.ratio))
    }
}

fn format_ratio(ratio: f64) -> String {
    if ratio.fract() == 0.0 {
        format!("{:.1}", ratio)
    } else {
        format!("{}", ratio)
    }
}

/// Price levels derived from one filtered series.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    pub support: f64,
    pub resistance: f64,
    pub fibonacci: [FibLevel; 4],
    pub pivot: f64,
    pub last_close: f64,
}

impl LevelSet {
    /// Support is the lowest low, resistance the highest high. A flat series
    /// (`resistance == support`) collapses every Fibonacci level onto support.
    ///
    /// Returns `None` for an empty series.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let last_close = series.last()?.close;
        let (support, resistance) = series.candles().iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), c| (lo.min(c.low), hi.max(c.high)),
        );

        let diff = resistance - support;
        let fibonacci = FIB_RATIOS.map(|ratio| FibLevel {
            ratio,
            price: resistance - ratio * diff,
        });
        let pivot = (support + resistance + last_close) / 3.0;

        Some(Self {
            support,
            resistance,
            fibonacci,
            pivot,
            last_close,
        })
    }

    pub fn range(&self) -> f64 {
        self.resistance - self.support
    }

    pub fn fib(&self, ratio: f64) -> Option<f64> {
        self.fibonacci
            .iter()
            .find(|f| (f.ratio - ratio).abs() < 1e-12)
            .map(|f| f.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_labels() {
        let labels: Vec<String> = FIB_RATIOS
            .iter()
            .map(|&ratio| FibLevel { ratio, price: 0.0 }.label())
            .collect();
        assert_eq!(labels, vec!["Fib 0.0", "Fib 0.382", "Fib 0.618", "Fib 1.0"]);
    }
}
