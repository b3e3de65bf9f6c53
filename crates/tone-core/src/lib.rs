//! # tone-core
//!
//! Shared building blocks for the GDELT tone analysis: the domain types
//! (countries, month buckets, fetch units, tone records), the runtime
//! configuration and the base error type used by the HTTP layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::ToneConfig;
pub use error::{Error, Result};
pub use types::{
  CountryCode, DayRange, FetchUnit, MonthBucket, MonthRange, ScaleMode, ToneRecord,
};

/// Base URL of the GDELT DOC 2.0 API
pub const GDELT_DOC_BASE_URL: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// Keyword filter prepended to every `sourcecountry:` query
pub const DEFAULT_KEYWORD_FILTER: &str = "\"health\" -mental";

/// Source countries of the historical analysis (GDELT FIPS codes)
pub const DEFAULT_COUNTRIES: [&str; 6] = ["NZ", "US", "UK", "CH", "RS", "SF"];

/// First month bucket of the historical analysis
pub const DEFAULT_START_MONTH: &str = "2019-03";

/// Last month bucket of the historical analysis (inclusive)
pub const DEFAULT_END_MONTH: &str = "2022-04";

/// Country every other country is compared against
pub const DEFAULT_REFERENCE_COUNTRY: &str = "NZ";

/// GDELT asks for at most one request every five seconds
pub const DEFAULT_RATE_LIMIT: u32 = 12; // requests per minute

/// Suffix shared by every cached tone file
pub const TONE_FILE_SUFFIX: &str = "_tones.csv";
