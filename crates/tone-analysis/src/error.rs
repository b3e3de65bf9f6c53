use thiserror::Error;
use tone_loaders::LoaderError;

#[derive(Error, Debug)]
pub enum AnalysisError {
  /// Dataset has no articles to average
  #[error("Data quality error: {0}")]
  DataQuality(String),

  /// Vector with zero magnitude; cosine similarity is undefined
  #[error("Degenerate vector: {0}")]
  DegenerateVector(String),

  #[error("Vector length mismatch: {left} vs {right}")]
  LengthMismatch { left: usize, right: usize },

  #[error("Empty vector")]
  EmptyVector,

  #[error("Unknown country {0}")]
  UnknownCountry(String),

  #[error("Snapshot error: {0}")]
  Snapshot(String),

  #[error("Chart error: {0}")]
  Chart(String),

  #[error("IO error: {0}")]
  Io(String),

  #[error(transparent)]
  Loader(#[from] LoaderError),
}

impl From<std::io::Error> for AnalysisError {
  fn from(err: std::io::Error) -> Self {
    AnalysisError::Io(err.to_string())
  }
}

impl From<serde_json::Error> for AnalysisError {
  fn from(err: serde_json::Error) -> Self {
    AnalysisError::Snapshot(err.to_string())
  }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
