//! # tone-client
//!
//! A small client for the GDELT DOC 2.0 API, limited to what the tone
//! analysis needs: monthly `tonechart` queries per source country, returned
//! as raw CSV text.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tone_client::GdeltClient;
//! use tone_core::{FetchUnit, ToneConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ToneConfig::from_env()?;
//!     let client = GdeltClient::new(&config)?;
//!
//!     let unit = config.fetch_units().remove(0);
//!     let csv = client.tone_chart(&unit).await?;
//!     println!("{} bytes for {}", csv.len(), unit);
//!     Ok(())
//! }
//! ```
//!
//! ## Rate Limiting
//!
//! GDELT asks callers to stay under one request every five seconds. The
//! client waits on a `governor` quota (`ToneConfig::rate_limit` requests per
//! minute) before every attempt, retries included.
//!
//! ## Error Handling
//!
//! All methods return `Result<T, tone_core::Error>`.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod query;
pub mod transport;

pub use client::GdeltClient;
pub use query::ToneQuery;
pub use tone_core::{Error, Result, ToneConfig};
