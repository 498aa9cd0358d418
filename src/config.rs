use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::interval::Interval;
use crate::model::window::DateRange;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Refresh periods offered by the dashboard, in seconds.
pub const REFRESH_CHOICES_SECS: [u64; 5] = [15, 30, 60, 120, 300];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub market: MarketConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub rest_base_url: String,
    pub symbol: String,
    pub symbols_path: PathBuf,
    #[serde(default)]
    pub interval: Interval,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(skip)]
    pub api_key: String,
}

fn default_http_timeout_secs() -> u64 {
    10
}

/// Optional `YYYY-MM-DD` bounds of the analysed window.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowConfig {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub threshold_ratio: f64,
    pub output_dir: PathBuf,
    pub snapshot_len: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: crate::proximity::DEFAULT_THRESHOLD_RATIO,
            output_dir: PathBuf::from("output"),
            snapshot_len: 20,
            chart_width: 1200,
            chart_height: 800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    #[serde(skip)]
    pub recipient: String,
    #[serde(skip)]
    pub sender: String,
    #[serde(skip)]
    pub password: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            recipient: String::new(),
            sender: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub refresh_secs: u64,
    pub tick_rate_ms: u64,
    pub show_fibonacci: bool,
    pub show_pivot: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_secs: 60,
            tick_rate_ms: 200,
            show_fibonacci: true,
            show_pivot: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse an operator date (`YYYY-MM-DD`).
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

pub fn validate_refresh_secs(secs: u64) -> Result<u64> {
    if !REFRESH_CHOICES_SECS.contains(&secs) {
        bail!(
            "invalid refresh interval {}s: expected one of {:?}",
            secs,
            REFRESH_CHOICES_SECS
        );
    }
    Ok(secs)
}

/// Next refresh period after `secs`, wrapping around.
pub fn next_refresh_secs(secs: u64) -> u64 {
    let idx = REFRESH_CHOICES_SECS
        .iter()
        .position(|s| *s == secs)
        .map(|i| i + 1)
        .unwrap_or(0);
    REFRESH_CHOICES_SECS[idx % REFRESH_CHOICES_SECS.len()]
}

impl WindowConfig {
    pub fn date_range(&self) -> Result<DateRange> {
        let from = self.from.as_deref().map(parse_date).transpose()?;
        let to = self.to.as_deref().map(parse_date).transpose()?;
        Ok(DateRange::new(from, to))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config = Self::parse(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        config.market.api_key = std::env::var("FMP_API_KEY")
            .context("FMP_API_KEY not set in .env or environment")?;
        config.notify.recipient = std::env::var("ALERT_EMAIL_TO").unwrap_or_default();
        config.notify.sender = std::env::var("ALERT_EMAIL_FROM").unwrap_or_default();
        config.notify.password = std::env::var("ALERT_EMAIL_PASSWORD").unwrap_or_default();

        Ok(config)
    }

    /// Parse and validate TOML without touching the environment.
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("invalid config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.market.symbol.trim().is_empty() {
            bail!("market.symbol must not be empty");
        }
        validate_refresh_secs(self.ui.refresh_secs).context("ui.refresh_secs is invalid")?;
        if !self.alert.threshold_ratio.is_finite() {
            bail!("alert.threshold_ratio must be a finite number");
        }
        if self.alert.snapshot_len == 0 {
            bail!("alert.snapshot_len must be > 0");
        }
        self.window
            .date_range()
            .context("window bounds are invalid")?;
        Ok(())
    }
}
