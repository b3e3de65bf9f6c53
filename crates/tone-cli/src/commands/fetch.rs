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

use anyhow::{Context, Result};
use clap::Args;
use tone_client::GdeltClient;
use tone_core::ToneConfig;
use tone_loaders::{DataLoader, FetchOutcome, FetchReport, LoaderContext, ToneFetcher, ToneFileCache};
use tracing::info;

#[derive(Args, Clone, Debug)]
pub struct FetchArgs {
  /// Extra passes over units that failed
  #[arg(long, default_value = "1")]
  backfill_passes: u32,

  /// Seconds to wait before each backfill pass
  #[arg(long, default_value = "5")]
  backfill_delay_secs: u64,

  /// Hide the progress bar
  #[arg(long)]
  no_progress: bool,

  /// Print the query URL of every missing unit without downloading
  #[arg(long)]
  dry_run: bool,
}

impl Default for FetchArgs {
  fn default() -> Self {
    Self { backfill_passes: 1, backfill_delay_secs: 5, no_progress: false, dry_run: false }
  }
}

pub async fn execute(args: FetchArgs, config: &ToneConfig) -> Result<()> {
  if args.dry_run {
    return dry_run(config).await;
  }

  let report = fetch_all(&args, config).await?;
  report.ensure_complete().context("Some tone charts could not be downloaded")?;
  Ok(())
}

/// Download every missing unit and print the summary
pub async fn fetch_all(args: &FetchArgs, config: &ToneConfig) -> Result<FetchReport> {
  let units = config.fetch_units();
  info!(
    "Fetching {} countries x {} months into {}",
    config.countries.len(),
    config.months.len(),
    config.cache_dir.display()
  );

  let mut context =
    LoaderContext::from_tone_config(config).context("Failed to create loader context")?;
  context.config.backfill_passes = args.backfill_passes;
  context.config.backfill_delay_ms = args.backfill_delay_secs * 1000;
  context.config.show_progress = !args.no_progress;

  let fetcher = ToneFetcher::new();
  let report = fetcher.load(&context, units).await.context("Tone fetch failed")?;

  print_report(&report);
  Ok(report)
}

fn print_report(report: &FetchReport) {
  println!("{}", report);
  for failed in report.failed() {
    if let FetchOutcome::Failed { reason } = &failed.outcome {
      println!("  failed {}: {}", failed.unit, reason);
    }
  }
}

async fn dry_run(config: &ToneConfig) -> Result<()> {
  let client = GdeltClient::new(config).context("Failed to create GDELT client")?;
  let cache = ToneFileCache::new(&config.cache_dir);
  let missing = cache.missing_units(&config.fetch_units()).await?;

  for unit in &missing {
    println!("{}", client.query_url(unit)?);
  }
  println!("{} of {} units missing", missing.len(), config.fetch_units().len());
  Ok(())
}
