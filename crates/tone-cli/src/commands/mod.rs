use anyhow::{Context, Result};
use std::path::Path;
use tone_analysis::{ToneReducer, ToneSnapshot};
use tone_core::ToneConfig;
use tone_loaders::ToneFileCache;
use tracing::info;

pub mod fetch;
pub mod plot;
pub mod reduce;
pub mod run;
pub mod similarity;

/// Reduce every cached file of the configured units
///
/// Fails with the list of missing files when the cache is incomplete.
pub async fn reduce_from_cache(config: &ToneConfig) -> Result<ToneSnapshot> {
  let cache = ToneFileCache::new(&config.cache_dir);
  cache
    .ensure_complete(&config.fetch_units())
    .await
    .context("Tone cache is incomplete; run `gt fetch` first")?;

  let countries = config.countries.clone();
  let months = config.months;
  let series =
    tokio::task::spawn_blocking(move || ToneReducer::new().reduce_cache(&cache, &countries, &months))
      .await
      .context("Reducer task failed")?
      .context("Failed to reduce tone charts")?;

  Ok(ToneSnapshot::from_series(config.months.start(), config.scale_mode, &series))
}

/// Series from a snapshot file when given, otherwise from the cache
///
/// A snapshot is cut down to the configured countries and months, and
/// rescaled when it was recorded under another scale mode.
pub async fn load_or_reduce(snapshot: Option<&Path>, config: &ToneConfig) -> Result<ToneSnapshot> {
  let Some(path) = snapshot else {
    return reduce_from_cache(config).await;
  };

  let snapshot = ToneSnapshot::load(path)
    .with_context(|| format!("Failed to load snapshot {}", path.display()))?
    .select(&config.countries, &config.months)
    .with_context(|| format!("Snapshot {} does not fit the configured analysis", path.display()))?;
  if snapshot.scale_mode == config.scale_mode {
    return Ok(snapshot);
  }

  info!("Rescaling snapshot from {} to {} scale", snapshot.scale_mode, config.scale_mode);
  Ok(ToneSnapshot::from_series(snapshot.start_month, config.scale_mode, &snapshot.tone_series()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;
  use tone_core::{CountryCode, MonthBucket, MonthRange, ScaleMode};

  fn historical_snapshot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/historical_snapshot.json")
  }

  fn countries(codes: &[&str]) -> Vec<CountryCode> {
    codes.iter().map(|c| CountryCode::new(c).unwrap()).collect()
  }

  #[tokio::test]
  async fn test_snapshot_follows_configured_countries() {
    let config = ToneConfig { countries: countries(&["US", "NZ"]), ..ToneConfig::default() };

    let snapshot = load_or_reduce(Some(&historical_snapshot()), &config).await.unwrap();

    let codes: Vec<&str> = snapshot.series.iter().map(|s| s.country.as_str()).collect();
    assert_eq!(codes, vec!["US", "NZ"]);
    assert_eq!(snapshot.months(), 38);
  }

  #[tokio::test]
  async fn test_snapshot_follows_configured_months() {
    let months =
      MonthRange::new(MonthBucket::new(2020, 1).unwrap(), MonthBucket::new(2020, 12).unwrap()).unwrap();
    let config = ToneConfig { months, ..ToneConfig::default() };

    let snapshot = load_or_reduce(Some(&historical_snapshot()), &config).await.unwrap();

    assert_eq!(snapshot.start_month, months.start());
    assert_eq!(snapshot.months(), 12);
  }

  #[tokio::test]
  async fn test_snapshot_rejects_uncovered_configuration() {
    let config = ToneConfig { countries: countries(&["NZ", "FR"]), ..ToneConfig::default() };
    assert!(load_or_reduce(Some(&historical_snapshot()), &config).await.is_err());

    let months =
      MonthRange::new(MonthBucket::new(2022, 1).unwrap(), MonthBucket::new(2022, 6).unwrap()).unwrap();
    let config = ToneConfig { months, ..ToneConfig::default() };
    assert!(load_or_reduce(Some(&historical_snapshot()), &config).await.is_err());
  }

  #[tokio::test]
  async fn test_snapshot_rescaled_to_configured_mode() {
    let config = ToneConfig { scale_mode: ScaleMode::Continuous, ..ToneConfig::default() };

    let snapshot = load_or_reduce(Some(&historical_snapshot()), &config).await.unwrap();

    assert_eq!(snapshot.scale_mode, ScaleMode::Continuous);
    assert!(snapshot.validate().is_ok());
  }
}
