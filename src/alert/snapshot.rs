use std::path::PathBuf;

use crate::error::AppError;
use crate::model::series::PriceSeries;

use super::SnapshotWriter;

/// Writes the tail of the series to `{dir}/{SYMBOL}_snapshot.csv`, replacing any previous file.
pub struct CsvSnapshotWriter {
    dir: PathBuf,
    tail_len: usize,
}

impl CsvSnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, tail_len: usize) -> Self {
        Self {
            dir: dir.into(),
            tail_len,
        }
    }

    pub fn snapshot_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_snapshot.csv", symbol))
    }
}

impl SnapshotWriter for CsvSnapshotWriter {
    fn write(&self, symbol: &str, series: &PriceSeries) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.snapshot_path(symbol);
        let mut writer = csv::Writer::from_path(&path)?;
        for candle in series.tail(self.tail_len) {
            writer.serialize(candle)?;
        }
        writer.flush()?;
        Ok(path)
    }
}
