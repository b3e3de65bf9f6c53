use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tone_core::{CountryCode, DayRange, MonthBucket, MonthRange, ScaleMode, ToneConfig};

/// Flags shared by every command; each one overrides its `GT_*` variable
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
  /// Comma-separated source country codes, e.g. NZ,US,UK
  #[arg(long, global = true, value_delimiter = ',')]
  countries: Option<Vec<CountryCode>>,

  /// First month (YYYY-MM)
  #[arg(long, global = true)]
  start: Option<MonthBucket>,

  /// Last month, inclusive (YYYY-MM)
  #[arg(long, global = true)]
  end: Option<MonthBucket>,

  /// Directory of cached tone charts
  #[arg(long, global = true)]
  cache_dir: Option<PathBuf>,

  /// Directory for charts and snapshots
  #[arg(long, global = true)]
  output_dir: Option<PathBuf>,

  /// Country the others are compared against
  #[arg(long, global = true)]
  reference: Option<CountryCode>,

  /// Query whole months instead of days 01-28
  #[arg(long, global = true)]
  full_month: bool,

  /// Map averages in (1.5, 2] to 4 instead of 1
  #[arg(long, global = true)]
  continuous_scale: bool,

  /// Number of concurrent downloads
  #[arg(long, global = true)]
  concurrency: Option<usize>,
}

impl ConfigArgs {
  /// Environment configuration with these flags applied on top
  pub fn load(&self) -> Result<ToneConfig> {
    let config =
      ToneConfig::env_layer().context("Failed to load configuration from environment")?;
    self.apply(config)
  }

  pub fn apply(&self, mut config: ToneConfig) -> Result<ToneConfig> {
    if let Some(countries) = &self.countries {
      config.countries = countries.clone();
    }
    if self.start.is_some() || self.end.is_some() {
      let start = self.start.unwrap_or(config.months.start());
      let end = self.end.unwrap_or(config.months.end());
      config.months = MonthRange::new(start, end).context("Invalid month range")?;
    }
    if let Some(dir) = &self.cache_dir {
      config.cache_dir = dir.clone();
    }
    if let Some(dir) = &self.output_dir {
      config.output_dir = dir.clone();
    }
    if let Some(reference) = &self.reference {
      config.reference_country = reference.clone();
    }
    if self.full_month {
      config.day_range = DayRange::FullMonth;
    }
    if self.continuous_scale {
      config.scale_mode = ScaleMode::Continuous;
    }
    if let Some(n) = self.concurrency {
      config.max_concurrent_requests = n;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
  }
}
