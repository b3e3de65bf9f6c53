//! # tone-analysis
//!
//! Turns cached tone charts into comparable numbers:
//! - count-weighted average tone per country and month
//! - the 1-5 tone scale and per-country tone vectors
//! - cosine similarity against a reference country
//! - versioned JSON snapshots of a reduction
//! - the sentiment progression chart (SVG and PDF)

pub mod chart;
pub mod error;
pub mod reducer;
pub mod scale;
pub mod similarity;
pub mod snapshot;

pub use chart::{ChartFiles, SentimentChart};
pub use error::{AnalysisError, AnalysisResult};
pub use reducer::{ToneReducer, ToneSeries, weighted_average};
pub use scale::{ToneVector, tone_on_scale};
pub use similarity::{
  SimilarityScore, cosine_similarity, reference_similarities, similarity_to_reference,
};
pub use snapshot::{SNAPSHOT_FILE_NAME, ToneSnapshot};
