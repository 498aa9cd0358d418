//! Side effects fired for each proximity event.
//!
//! Every collaborator sits behind its own trait and runs in isolation: a
//! failure is recorded in the [`DispatchReport`] and logged, and the remaining
//! tasks still run.

pub mod chart;
pub mod event_log;
pub mod notify;
pub mod snapshot;

use std::fmt;
use std::path::PathBuf;

use crate::error::AppError;
use crate::levels::LevelSet;
use crate::model::series::PriceSeries;
use crate::proximity::{LevelKind, ProximityEvent};

pub use chart::PngChartRenderer;
pub use event_log::CsvEventLog;
pub use notify::{MailCredentials, Notification, SmtpNotifier};
pub use snapshot::CsvSnapshotWriter;

/// Which optional overlays to draw on charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOverlays {
    pub fibonacci: bool,
    pub pivot: bool,
}

impl Default for ChartOverlays {
    fn default() -> Self {
        Self {
            fibonacci: true,
            pivot: true,
        }
    }
}

/// Everything a side effect may need about the cycle that fired the event.
#[derive(Debug, Clone, Copy)]
pub struct AlertContext<'a> {
    pub series: &'a PriceSeries,
    pub levels: &'a LevelSet,
    pub overlays: ChartOverlays,
}

/// Operator notification settings for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifySettings {
    pub enabled: bool,
    pub credentials: MailCredentials,
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, symbol: &str, kind: LevelKind, ctx: &AlertContext<'_>)
        -> Result<PathBuf, AppError>;
}

pub trait EventLog: Send + Sync {
    fn append(&self, event: &ProximityEvent) -> Result<(), AppError>;
}

pub trait SnapshotWriter: Send + Sync {
    fn write(&self, symbol: &str, series: &PriceSeries) -> Result<PathBuf, AppError>;
}

pub trait Notifier: Send + Sync {
    fn send(&self, message: &Notification, credentials: &MailCredentials) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Done,
    Skipped(String),
    Failed(String),
}

impl TaskOutcome {
    fn from_result<T>(task: &'static str, symbol: &str, result: Result<T, AppError>) -> Self {
        match result {
            Ok(_) => Self::Done,
            Err(e) => {
                tracing::error!(task, symbol, error = %e, "Alert task failed");
                Self::Failed(e.to_string())
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "ok"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Failed(msg) => write!(f, "failed ({})", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub event: ProximityEvent,
    pub chart: TaskOutcome,
    pub log: TaskOutcome,
    pub snapshot: TaskOutcome,
    pub notification: TaskOutcome,
}

impl DispatchReport {
    /// `(task, message)` for every failed task.
    pub fn failures(&self) -> Vec<(&'static str, &str)> {
        [
            ("chart", &self.chart),
            ("log", &self.log),
            ("snapshot", &self.snapshot),
            ("notification", &self.notification),
        ]
        .into_iter()
        .filter_map(|(task, outcome)| match outcome {
            TaskOutcome::Failed(msg) => Some((task, msg.as_str())),
            _ => None,
        })
        .collect()
    }
}

pub struct AlertDispatcher {
    chart: Box<dyn ChartRenderer>,
    log: Box<dyn EventLog>,
    snapshot: Box<dyn SnapshotWriter>,
    notifier: Box<dyn Notifier>,
}

impl AlertDispatcher {
    pub fn new(
        chart: Box<dyn ChartRenderer>,
        log: Box<dyn EventLog>,
        snapshot: Box<dyn SnapshotWriter>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            chart,
            log,
            snapshot,
            notifier,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        let out = &config.alert.output_dir;
        Self::new(
            Box::new(PngChartRenderer::new(
                out,
                config.alert.chart_width,
                config.alert.chart_height,
            )),
            Box::new(CsvEventLog::new(out.join(event_log::EVENT_LOG_FILE))),
            Box::new(CsvSnapshotWriter::new(out, config.alert.snapshot_len)),
            Box::new(SmtpNotifier::new(
                &config.notify.smtp_host,
                config.notify.smtp_port,
            )),
        )
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn dispatch(
        &self,
        event: &ProximityEvent,
        ctx: &AlertContext<'_>,
        notify: &NotifySettings,
    ) -> DispatchReport {
        let symbol = event.symbol.as_str();

        let chart = TaskOutcome::from_result(
            "chart",
            symbol,
            self.chart.render(symbol, event.kind, ctx),
        );
        let log = TaskOutcome::from_result("log", symbol, self.log.append(event));
        let snapshot = TaskOutcome::from_result(
            "snapshot",
            symbol,
            self.snapshot.write(symbol, ctx.series),
        );

        let notification = if !notify.enabled {
            TaskOutcome::Skipped("notifications disabled".to_string())
        } else if !notify.credentials.is_complete() {
            tracing::warn!(symbol, "Notifications enabled but credentials are incomplete");
            TaskOutcome::Skipped("missing recipient, sender or password".to_string())
        } else {
            let message = Notification::for_event(event);
            TaskOutcome::from_result(
                "notification",
                symbol,
                self.notifier.send(&message, &notify.credentials),
            )
        };

        tracing::info!(
            symbol,
            kind = %event.kind,
            chart = %chart,
            log = %log,
            snapshot = %snapshot,
            notification = %notification,
            "Alert dispatched"
        );

        DispatchReport {
            event: event.clone(),
            chart,
            log,
            snapshot,
            notification,
        }
    }
}
