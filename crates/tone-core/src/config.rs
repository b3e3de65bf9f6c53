//! Configuration management for the tone analysis

use crate::error::{Error, Result};
use crate::types::{CountryCode, DayRange, FetchUnit, MonthBucket, MonthRange, ScaleMode};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Everything a run needs: which data to fetch, where to keep it and how to
/// score it
#[derive(Debug, Clone)]
pub struct ToneConfig {
  /// Source countries, in output order
  pub countries: Vec<CountryCode>,

  /// Month buckets to fetch and reduce
  pub months: MonthRange,

  /// Keyword filter placed before `sourcecountry:<CODE>` in every query
  pub keyword_filter: String,

  /// Directory holding `<COUNTRY>_<YYYYMM>_tones.csv` files
  pub cache_dir: PathBuf,

  /// Directory receiving charts and snapshots
  pub output_dir: PathBuf,

  /// Country every tone vector is compared against
  pub reference_country: CountryCode,

  /// Day span of each monthly query
  pub day_range: DayRange,

  /// Thresholds of the 1-5 scale
  pub scale_mode: ScaleMode,

  /// Size of the download worker pool
  pub max_concurrent_requests: usize,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Maximum retries for failed requests
  pub max_retries: u32,

  /// API rate limit (requests per minute)
  pub rate_limit: u32,

  /// Base URL for the GDELT DOC API
  pub base_url: String,
}

impl Default for ToneConfig {
  fn default() -> Self {
    let countries =
      crate::DEFAULT_COUNTRIES.iter().map(|c| CountryCode::from_static(c)).collect();
    let months =
      MonthRange::from_buckets(MonthBucket::from_static(2019, 3), MonthBucket::from_static(2022, 4));
    let reference_country = CountryCode::from_static(crate::DEFAULT_REFERENCE_COUNTRY);

    Self {
      countries,
      months,
      keyword_filter: crate::DEFAULT_KEYWORD_FILTER.to_string(),
      cache_dir: PathBuf::from("./data/tones"),
      output_dir: PathBuf::from("."),
      reference_country,
      day_range: DayRange::default(),
      scale_mode: ScaleMode::default(),
      max_concurrent_requests: 4,
      timeout_secs: 60,
      max_retries: 3,
      rate_limit: crate::DEFAULT_RATE_LIMIT,
      base_url: crate::GDELT_DOC_BASE_URL.to_string(),
    }
  }
}

impl ToneConfig {
  /// Load configuration from environment variables, falling back to the
  /// historical analysis for anything unset
  pub fn from_env() -> Result<Self> {
    let config = Self::env_layer()?;
    config.validate()?;
    Ok(config)
  }

  /// Defaults with the `GT_*` overrides applied, not yet validated
  pub fn env_layer() -> Result<Self> {
    dotenv().ok();

    let mut config = Self::default();

    if let Ok(countries) = env::var("GT_COUNTRIES") {
      config.countries = parse_country_list(&countries)?;
    }

    let start = match env::var("GT_START_MONTH") {
      Ok(s) => s.parse()?,
      Err(_) => config.months.start(),
    };
    let end = match env::var("GT_END_MONTH") {
      Ok(s) => s.parse()?,
      Err(_) => config.months.end(),
    };
    config.months = MonthRange::new(start, end)?;

    if let Ok(filter) = env::var("GT_KEYWORD_FILTER") {
      config.keyword_filter = filter;
    }
    if let Ok(dir) = env::var("GT_CACHE_DIR") {
      config.cache_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = env::var("GT_OUTPUT_DIR") {
      config.output_dir = PathBuf::from(dir);
    }
    if let Ok(reference) = env::var("GT_REFERENCE_COUNTRY") {
      config.reference_country = reference.parse()?;
    }
    if let Ok(range) = env::var("GT_DAY_RANGE") {
      config.day_range = range.parse()?;
    }
    if let Ok(mode) = env::var("GT_SCALE_MODE") {
      config.scale_mode = mode.parse()?;
    }

    config.max_concurrent_requests =
      parse_var("GT_MAX_CONCURRENT", config.max_concurrent_requests)?;
    config.timeout_secs = parse_var("GT_TIMEOUT_SECS", config.timeout_secs)?;
    config.max_retries = parse_var("GT_MAX_RETRIES", config.max_retries)?;
    config.rate_limit = parse_var("GT_RATE_LIMIT", config.rate_limit)?;

    if let Ok(base_url) = env::var("GT_BASE_URL") {
      config.base_url = base_url;
    }

    Ok(config)
  }

  /// Reject configurations no stage could run with
  pub fn validate(&self) -> Result<()> {
    if self.countries.is_empty() {
      return Err(Error::Config("country list is empty".to_string()));
    }
    if !self.countries.contains(&self.reference_country) {
      return Err(Error::Config(format!(
        "reference country {} is not in the country list",
        self.reference_country
      )));
    }
    if self.max_concurrent_requests == 0 {
      return Err(Error::Config("max_concurrent_requests must be at least 1".to_string()));
    }
    if self.keyword_filter.trim().is_empty() {
      return Err(Error::Config("keyword filter is empty".to_string()));
    }
    url::Url::parse(&self.base_url)
      .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", self.base_url, e)))?;
    Ok(())
  }

  /// Every (country, month) unit, country-major in configuration order
  pub fn fetch_units(&self) -> Vec<FetchUnit> {
    self
      .countries
      .iter()
      .flat_map(|country| self.months.iter().map(move |m| FetchUnit::new(country.clone(), m)))
      .collect()
  }

  /// Cache path of a unit
  pub fn cache_path(&self, unit: &FetchUnit) -> PathBuf {
    self.cache_dir.join(unit.file_name())
  }
}

/// Parse a comma separated country list such as `NZ,US,UK`
pub fn parse_country_list(list: &str) -> Result<Vec<CountryCode>> {
  list.split(',').filter(|s| !s.trim().is_empty()).map(CountryCode::from_str).collect()
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
  match env::var(name) {
    Ok(value) => value.trim().parse().map_err(|_| Error::Config(format!("Invalid {}", name))),
    Err(_) => Ok(default),
  }
}
