use thiserror::Error;

/// The main error type for tone-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Country code that is not two ASCII letters
  #[error("Invalid country code: {0}")]
  InvalidCountry(String),

  /// Month bucket that cannot be parsed or is out of range
  #[error("Invalid month: {0}")]
  InvalidMonth(String),

  /// API rate limit exceeded
  #[error("Rate limit exceeded: {0}")]
  RateLimit(String),

  /// Invalid response from API
  #[error("Invalid API response: {0}")]
  InvalidResponse(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// Error message returned by GDELT
  #[error("API error: {0}")]
  Api(String),
}

/// Result type alias for tone-* crates
pub type Result<T> = std::result::Result<T, Error>;
