/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Tone chart fetcher
//!
//! Downloads one tone chart per (country, month) unit into the file cache.
//! Units whose file already exists are skipped without a request. Units run
//! on a bounded worker pool; a failed unit never stops the others, and
//! failures can be retried in later backfill passes.

use async_trait::async_trait;
use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
  BatchConfig, BatchProcessor, DataLoader, LoaderContext, LoaderError, LoaderResult,
  ToneFileCache,
};
use tone_client::GdeltClient;
use tone_core::FetchUnit;

/// What happened to one unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// Fetched and written to the cache
  Downloaded { bytes: usize },
  /// Cache file already present, no request made
  Cached,
  /// Request or write failed; no cache file exists
  Failed { reason: String },
}

impl FetchOutcome {
  pub fn is_failed(&self) -> bool {
    matches!(self, FetchOutcome::Failed { .. })
  }
}

#[derive(Debug, Clone)]
pub struct UnitReport {
  pub unit: FetchUnit,
  pub path: PathBuf,
  pub outcome: FetchOutcome,
}

/// Per-unit outcomes of a fetch run, in input order
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
  pub units: Vec<UnitReport>,
  /// Number of passes made, including the first
  pub passes: u32,
}

impl FetchReport {
  pub fn downloaded_count(&self) -> usize {
    self.units.iter().filter(|u| matches!(u.outcome, FetchOutcome::Downloaded { .. })).count()
  }

  pub fn cached_count(&self) -> usize {
    self.units.iter().filter(|u| u.outcome == FetchOutcome::Cached).count()
  }

  pub fn failed_count(&self) -> usize {
    self.failed().count()
  }

  pub fn failed(&self) -> impl Iterator<Item = &UnitReport> {
    self.units.iter().filter(|u| u.outcome.is_failed())
  }

  pub fn is_complete(&self) -> bool {
    self.failed_count() == 0
  }

  /// Error listing the missing cache files when any unit failed
  pub fn ensure_complete(&self) -> LoaderResult<()> {
    if self.is_complete() {
      Ok(())
    } else {
      Err(LoaderError::IncompleteData {
        missing: self.failed().map(|u| u.unit.file_name()).collect(),
      })
    }
  }
}

impl fmt::Display for FetchReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} units: {} downloaded, {} cached, {} failed",
      self.units.len(),
      self.downloaded_count(),
      self.cached_count(),
      self.failed_count()
    )
  }
}

/// Fetches tone charts into the cache; pool size comes from the loader
/// context
#[derive(Debug, Default, Clone, Copy)]
pub struct ToneFetcher;

impl ToneFetcher {
  pub fn new() -> Self {
    Self
  }

  fn worker_pool(context: &LoaderContext) -> BatchProcessor {
    BatchProcessor::new(BatchConfig {
      max_concurrent: context.config.max_concurrent_requests,
      continue_on_error: true,
    })
  }

  /// Cache check, then download and store
  async fn fetch_unit(
    client: Arc<GdeltClient>,
    cache: Arc<ToneFileCache>,
    unit: FetchUnit,
  ) -> LoaderResult<FetchOutcome> {
    if cache.contains(&unit).await? {
      debug!("{} already cached, skipping", unit);
      return Ok(FetchOutcome::Cached);
    }

    match client.query_url(&unit) {
      Ok(url) => info!("Fetching {}: {}", unit, url),
      Err(e) => warn!("Could not render URL for {}: {}", unit, e),
    }

    let body = client.tone_chart(&unit).await?;
    cache.store(&unit, &body).await?;
    Ok(FetchOutcome::Downloaded { bytes: body.len() })
  }

  /// One pass over `units`; outcomes in the same order
  async fn run_pass(
    pool: &BatchProcessor,
    context: &LoaderContext,
    units: Vec<FetchUnit>,
    progress: Option<ProgressBar>,
  ) -> LoaderResult<Vec<FetchOutcome>> {
    let client = context.client.clone();
    let cache = context.cache.clone();

    let result = pool
      .process(units, move |unit: FetchUnit| -> BoxFuture<'static, LoaderResult<FetchOutcome>> {
        let client = client.clone();
        let cache = cache.clone();
        let progress = progress.clone();
        Box::pin(async move {
          let label = unit.to_string();
          let outcome = Self::fetch_unit(client, cache, unit).await;
          if let Some(pb) = &progress {
            pb.set_message(label);
            pb.inc(1);
          }
          outcome
        })
      })
      .await?;

    Ok(
      result
        .outcomes
        .into_iter()
        .map(|o| o.unwrap_or_else(|e| FetchOutcome::Failed { reason: e.to_string() }))
        .collect(),
    )
  }
}

#[async_trait]
impl DataLoader for ToneFetcher {
  type Input = Vec<FetchUnit>;
  type Output = FetchReport;

  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output> {
    self.validate_input(&input).await?;
    info!("{}: starting fetch of {} units", self.name(), input.len());

    let removed = context.cache.clean_partials().await?;
    if removed > 0 {
      warn!("Removed {} partial cache file(s) from an interrupted run", removed);
    }

    let progress = if context.config.show_progress {
      let pb = ProgressBar::new(input.len() as u64);
      if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}")
      {
        pb.set_style(style.progress_chars("##-"));
      }
      Some(pb)
    } else {
      None
    };

    let pool = Self::worker_pool(context);
    debug!("{}: {} concurrent downloads", self.name(), pool.max_concurrent());

    let outcomes = Self::run_pass(&pool, context, input.clone(), progress.clone()).await?;
    let mut report = FetchReport {
      units: input
        .into_iter()
        .zip(outcomes)
        .map(|(unit, outcome)| UnitReport { path: context.cache.path_for(&unit), unit, outcome })
        .collect(),
      passes: 1,
    };

    for pass in 1..=context.config.backfill_passes {
      let pending: Vec<usize> =
        report.units.iter().enumerate().filter(|(_, u)| u.outcome.is_failed()).map(|(i, _)| i).collect();
      if pending.is_empty() {
        break;
      }

      info!("Backfill pass {}: retrying {} failed unit(s)", pass, pending.len());
      if context.config.backfill_delay_ms > 0 {
        tokio::time::sleep(tokio::time::Duration::from_millis(context.config.backfill_delay_ms))
          .await;
      }

      if let Some(pb) = &progress {
        pb.inc_length(pending.len() as u64);
      }

      let retry_units = pending.iter().map(|&i| report.units[i].unit.clone()).collect();
      let outcomes = Self::run_pass(&pool, context, retry_units, progress.clone()).await?;
      for (i, outcome) in pending.into_iter().zip(outcomes) {
        report.units[i].outcome = outcome;
      }
      report.passes += 1;
    }

    if let Some(pb) = progress {
      pb.finish_with_message("done");
    }

    for failed in report.failed() {
      if let FetchOutcome::Failed { reason } = &failed.outcome {
        warn!("Failed to fetch {}: {}", failed.unit, reason);
      }
    }
    info!("Tone fetch complete: {}", report);

    Ok(report)
  }

  async fn validate_input(&self, input: &Self::Input) -> LoaderResult<()> {
    if input.is_empty() {
      return Err(LoaderError::InvalidData("No fetch units given".to_string()));
    }
    Ok(())
  }

  fn name(&self) -> &'static str {
    "ToneFetcher"
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::LoaderConfig;
  use tempfile::TempDir;
  use tone_client::transport::Transport;
  use tone_core::{CountryCode, MonthBucket, ToneConfig};
  use wiremock::matchers::{method, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  const CHART: &str = "Label,Count,TopArts\n5,2,\n-2,3,\n";

  fn unit(country: &str, year: i32, month: u32) -> FetchUnit {
    FetchUnit::new(CountryCode::new(country).unwrap(), MonthBucket::new(year, month).unwrap())
  }

  fn context(server: &MockServer, dir: &TempDir, backfill_passes: u32) -> LoaderContext {
    let config = ToneConfig {
      base_url: server.uri(),
      cache_dir: dir.path().to_path_buf(),
      max_retries: 0,
      rate_limit: 6000,
      ..ToneConfig::default()
    };
    let transport = Transport::new(&config).unwrap();
    let client = Arc::new(GdeltClient::with_transport(&config, transport));
    let loader_config = LoaderConfig {
      max_concurrent_requests: 2,
      backfill_passes,
      backfill_delay_ms: 0,
      show_progress: false,
    };
    LoaderContext::new(client, loader_config, Arc::new(ToneFileCache::new(dir.path())))
  }

  #[tokio::test]
  async fn test_worker_pool_follows_loader_config() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut ctx = context(&server, &dir, 0);
    assert_eq!(ToneFetcher::worker_pool(&ctx).max_concurrent(), 2);

    ctx.config.max_concurrent_requests = 7;
    assert_eq!(ToneFetcher::worker_pool(&ctx).max_concurrent(), 7);
  }

  #[tokio::test]
  async fn test_fetch_downloads_and_caches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
      .expect(2)
      .mount(&server)
      .await;

    let dir = TempDir::new().unwrap();
    let ctx = context(&server, &dir, 0);
    let units = vec![unit("NZ", 2019, 3), unit("US", 2019, 3)];

    let report = ToneFetcher::new().load(&ctx, units).await.unwrap();

    assert_eq!(report.downloaded_count(), 2);
    assert!(report.is_complete());
    assert_eq!(report.units[0].path, dir.path().join("NZ_201903_tones.csv"));
    assert_eq!(std::fs::read_to_string(&report.units[1].path).unwrap(), CHART);
  }

  #[tokio::test]
  async fn test_existing_cache_file_is_never_downloaded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
      .expect(0)
      .mount(&server)
      .await;

    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("NZ_201903_tones.csv"), "Label,Count\n1,1\n").unwrap();
    let ctx = context(&server, &dir, 1);

    let report = ToneFetcher::new().load(&ctx, vec![unit("NZ", 2019, 3)]).await.unwrap();

    assert_eq!(report.units[0].outcome, FetchOutcome::Cached);
    assert_eq!(
      std::fs::read_to_string(dir.path().join("NZ_201903_tones.csv")).unwrap(),
      "Label,Count\n1,1\n"
    );
  }

  #[tokio::test]
  async fn test_failed_unit_does_not_stop_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(query_param("query", "\"health\" -mental sourcecountry:US"))
      .respond_with(ResponseTemplate::new(200).set_body_string("Invalid query syntax"))
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .and(query_param("query", "\"health\" -mental sourcecountry:NZ"))
      .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
      .mount(&server)
      .await;

    let dir = TempDir::new().unwrap();
    let ctx = context(&server, &dir, 0);
    let units = vec![unit("US", 2019, 3), unit("NZ", 2019, 3), unit("NZ", 2019, 4)];

    let report = ToneFetcher::new().load(&ctx, units).await.unwrap();

    assert_eq!(report.downloaded_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(report.units[0].outcome.is_failed());
    assert!(!dir.path().join("US_201903_tones.csv").exists());

    match report.ensure_complete() {
      Err(LoaderError::IncompleteData { missing }) => {
        assert_eq!(missing, vec!["US_201903_tones.csv".to_string()])
      }
      other => panic!("expected IncompleteData, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_backfill_pass_recovers_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(500))
      .up_to_n_times(1)
      .mount(&server)
      .await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string(CHART))
      .mount(&server)
      .await;

    let dir = TempDir::new().unwrap();
    let ctx = context(&server, &dir, 1);

    let report = ToneFetcher::new().load(&ctx, vec![unit("UK", 2021, 6)]).await.unwrap();

    assert_eq!(report.passes, 2);
    assert!(report.is_complete());
    assert!(dir.path().join("UK_202106_tones.csv").exists());
  }

  #[tokio::test]
  async fn test_empty_input_rejected() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let ctx = context(&server, &dir, 0);

    let err = ToneFetcher::new().load(&ctx, vec![]).await.unwrap_err();
    assert!(matches!(err, LoaderError::InvalidData(_)));
  }

  #[test]
  fn test_report_summary() {
    let report = FetchReport {
      units: vec![
        UnitReport {
          unit: unit("NZ", 2019, 3),
          path: PathBuf::from("NZ_201903_tones.csv"),
          outcome: FetchOutcome::Downloaded { bytes: 10 },
        },
        UnitReport {
          unit: unit("NZ", 2019, 4),
          path: PathBuf::from("NZ_201904_tones.csv"),
          outcome: FetchOutcome::Cached,
        },
      ],
      passes: 1,
    };
    assert_eq!(report.to_string(), "2 units: 1 downloaded, 1 cached, 0 failed");
    assert!(report.ensure_complete().is_ok());
  }
}
