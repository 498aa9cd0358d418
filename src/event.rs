use crate::model::interval::Interval;
use crate::pipeline::CycleReport;

#[derive(Debug, Clone)]
pub enum AppEvent {
    CycleStarted {
        symbol: String,
        interval: Interval,
    },
    CycleCompleted(Box<CycleReport>),
    NotificationResult {
        subject: String,
        result: Result<(), String>,
    },
    Error(String),
}
