use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::AppError;
use crate::model::candle::DATE_FORMAT;
use crate::proximity::ProximityEvent;

use super::EventLog;

pub const EVENT_LOG_FILE: &str = "event_log.csv";
pub const EVENT_LOG_HEADER: [&str; 6] = [
    "Timestamp",
    "Symbol",
    "Event",
    "Price",
    "Support",
    "Resistance",
];

/// Append-only CSV log of fired events.
pub struct CsvEventLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn event_row(event: &ProximityEvent) -> [String; 6] {
    [
        event.timestamp.format(DATE_FORMAT).to_string(),
        event.symbol.clone(),
        event.kind.to_string(),
        format!("{:.2}", event.price),
        format!("{:.2}", event.support),
        format!("{:.2}", event.resistance),
    ]
}

impl EventLog for CsvEventLog {
    fn append(&self, event: &ProximityEvent) -> Result<(), AppError> {
        // Rows from overlapping cycles must not interleave.
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer.write_record(EVENT_LOG_HEADER)?;
        }
        writer.write_record(event_row(event))?;
        writer.flush()?;
        Ok(())
    }
}
