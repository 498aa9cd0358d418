use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("symbol catalog error: {0}")]
    Catalog(String),

    #[error("chart render error: {0}")]
    Chart(String),

    #[error("notification error: {0}")]
    Notify(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure modes of a single market data request. None of them are retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data API returned status {0}")]
    Status(u16),

    #[error("no data returned")]
    NoData,

    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// `NoData` is reported separately from transport/status failures.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}
