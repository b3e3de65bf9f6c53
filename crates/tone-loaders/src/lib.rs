//! # tone-loaders
//!
//! Data loading for the GDELT tone analysis:
//! - Concurrent, rate-limited download of monthly tone charts
//! - A file cache keyed by country and month
//! - Completeness checks before any reduction starts
//! - Parsing of tone chart CSV files into records

pub mod batch_processor;
pub mod cache;
pub mod csv_processor;
pub mod error;
pub mod loader;
pub mod tone_fetcher;

// Re-export commonly used types
pub use batch_processor::{BatchConfig, BatchProcessor, BatchResult};
pub use cache::ToneFileCache;
pub use csv_processor::CsvProcessor;
pub use error::{LoaderError, LoaderResult};
pub use loader::{DataLoader, LoaderConfig, LoaderContext};
pub use tone_fetcher::{FetchOutcome, FetchReport, ToneFetcher, UnitReport};
