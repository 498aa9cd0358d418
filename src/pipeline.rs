//! One refresh cycle: window selection, level computation, proximity check and alert fan-out.
//!
//! The fetch happens before this module is entered so that the async HTTP
//! layer stays out of the synchronous analysis path.

use chrono::NaiveDateTime;

use crate::alert::{AlertContext, AlertDispatcher, ChartOverlays, DispatchReport, NotifySettings};
use crate::config::Config;
use crate::error::FetchError;
use crate::levels::LevelSet;
use crate::model::candle::Candle;
use crate::model::interval::Interval;
use crate::model::series::PriceSeries;
use crate::model::window::{DateRange, DateWindow};
use crate::proximity::{self, ProximityEvent, ProximityThreshold};

/// Operator selections for a cycle. Built fresh from the UI state every time.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRequest {
    pub symbol: String,
    pub interval: Interval,
    pub range: DateRange,
    pub threshold: ProximityThreshold,
    pub overlays: ChartOverlays,
    pub notify: NotifySettings,
}

impl CycleRequest {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            symbol: config.market.symbol.trim().to_ascii_uppercase(),
            interval: config.market.interval,
            range: config.window.date_range()?,
            threshold: ProximityThreshold::new(config.alert.threshold_ratio),
            overlays: ChartOverlays {
                fibonacci: config.ui.show_fibonacci,
                pivot: config.ui.show_pivot,
            },
            notify: NotifySettings {
                enabled: config.notify.enabled,
                credentials: crate::alert::MailCredentials::new(
                    &config.notify.recipient,
                    &config.notify.sender,
                    &config.notify.password,
                ),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// The API answered with an empty or non-list payload.
    EmptyPayload,
    /// Candles were returned but none fall inside the selected window.
    EmptyWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub series: PriceSeries,
    pub levels: LevelSet,
    pub events: Vec<ProximityEvent>,
    pub dispatches: Vec<DispatchReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    FetchFailed(String),
    NoData(NoDataReason),
    Evaluated(Box<Analysis>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub symbol: String,
    pub interval: Interval,
    pub window: Option<DateWindow>,
    pub window_fallback: bool,
    pub outcome: CycleOutcome,
    pub completed_at: NaiveDateTime,
}

impl CycleReport {
    pub fn analysis(&self) -> Option<&Analysis> {
        match &self.outcome {
            CycleOutcome::Evaluated(a) => Some(a),
            _ => None,
        }
    }

    /// Operator-facing one-liner for the outcome.
    pub fn summary(&self) -> String {
        match &self.outcome {
            CycleOutcome::FetchFailed(e) => {
                format!("Failed to retrieve data for {}: {}", self.symbol, e)
            }
            CycleOutcome::NoData(NoDataReason::EmptyPayload) => {
                format!("No data returned for {} ({})", self.symbol, self.interval)
            }
            CycleOutcome::NoData(NoDataReason::EmptyWindow) => {
                format!("No data for {} in the selected date range", self.symbol)
            }
            CycleOutcome::Evaluated(a) => format!(
                "{} {}: support {:.2} resistance {:.2} close {:.2} ({} candles, {} alerts)",
                self.symbol,
                self.interval,
                a.levels.support,
                a.levels.resistance,
                a.levels.last_close,
                a.series.len(),
                a.events.len()
            ),
        }
    }
}

/// Run everything after the fetch. Never panics on bad input: fetch errors and
/// empty data become outcomes, and dispatch failures are captured per task.
pub fn run_cycle(
    request: &CycleRequest,
    fetched: Result<Vec<Candle>, FetchError>,
    dispatcher: &AlertDispatcher,
    now: NaiveDateTime,
) -> CycleReport {
    let mut report = CycleReport {
        symbol: request.symbol.clone(),
        interval: request.interval,
        window: None,
        window_fallback: false,
        outcome: CycleOutcome::NoData(NoDataReason::EmptyPayload),
        completed_at: now,
    };

    let candles = match fetched {
        Ok(candles) if candles.is_empty() => {
            tracing::warn!(symbol = %request.symbol, "No data returned");
            return report;
        }
        Ok(candles) => candles,
        Err(e) if e.is_no_data() => {
            tracing::warn!(symbol = %request.symbol, "No data returned");
            return report;
        }
        Err(e) => {
            tracing::error!(symbol = %request.symbol, error = %e, "Failed to fetch data");
            report.outcome = CycleOutcome::FetchFailed(e.to_string());
            return report;
        }
    };

    let full = PriceSeries::from_candles(candles);
    let requested = request.range.resolve(now.date());
    let selection = full.select(requested, request.interval, now);
    report.window = Some(selection.applied);
    report.window_fallback = selection.fallback;

    let series = selection.series;
    let levels = match LevelSet::compute(&series) {
        Some(levels) => levels,
        None => {
            tracing::warn!(
                symbol = %request.symbol,
                fetched = full.len(),
                "No candles inside the selected window"
            );
            report.outcome = CycleOutcome::NoData(NoDataReason::EmptyWindow);
            return report;
        }
    };

    let events = proximity::evaluate(&request.symbol, &levels, request.threshold, now);
    let ctx = AlertContext {
        series: &series,
        levels: &levels,
        overlays: request.overlays,
    };
    let dispatches = events
        .iter()
        .map(|event| dispatcher.dispatch(event, &ctx, &request.notify))
        .collect();

    report.outcome = CycleOutcome::Evaluated(Box::new(Analysis {
        series,
        levels,
        events,
        dispatches,
    }));
    tracing::info!(summary = %report.summary(), "Cycle complete");
    report
}
