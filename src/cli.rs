use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{parse_date, validate_refresh_secs, Config, DEFAULT_CONFIG_PATH};
use crate::model::interval::Interval;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Initial symbol, overrides market.symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Candle interval (5min, 15min, 30min, 1hour, 4hour, 1day)
    #[arg(long)]
    pub interval: Option<Interval>,

    /// First day of the analysed window (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day of the analysed window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Auto-refresh period in seconds (15, 30, 60, 120 or 300)
    #[arg(long)]
    pub refresh_secs: Option<u64>,

    /// Start with email notifications enabled
    #[arg(long, default_value_t = false)]
    pub notify: bool,
}

impl Cli {
    /// Overlay command-line values on a loaded config and revalidate.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(symbol) = &self.symbol {
            config.market.symbol = symbol.trim().to_ascii_uppercase();
        }
        if let Some(interval) = self.interval {
            config.market.interval = interval;
        }
        if let Some(from) = &self.from {
            parse_date(from).context("--from")?;
            config.window.from = Some(from.clone());
        }
        if let Some(to) = &self.to {
            parse_date(to).context("--to")?;
            config.window.to = Some(to.clone());
        }
        if let Some(secs) = self.refresh_secs {
            config.ui.refresh_secs = validate_refresh_secs(secs).context("--refresh-secs")?;
        }
        if self.notify {
            config.notify.enabled = true;
        }
        config.validate()
    }
}
