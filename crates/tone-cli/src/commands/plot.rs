use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tone_analysis::{SentimentChart, ToneSnapshot};
use tone_core::ToneConfig;

use super::load_or_reduce;

#[derive(Args, Clone, Debug, Default)]
pub struct PlotArgs {
  /// Plot this snapshot instead of reducing the cache
  #[arg(long)]
  snapshot: Option<PathBuf>,
}

pub async fn execute(args: PlotArgs, config: &ToneConfig) -> Result<()> {
  let snapshot = load_or_reduce(args.snapshot.as_deref(), config).await?;
  write_chart(&snapshot, config)
}

pub fn write_chart(snapshot: &ToneSnapshot, config: &ToneConfig) -> Result<()> {
  let chart = SentimentChart::new(snapshot.start_month);
  let files = chart
    .write(&snapshot.tone_series(), &config.output_dir)
    .context("Failed to write sentiment chart")?;
  println!("Chart written to {} and {}", files.svg.display(), files.pdf.display());
  Ok(())
}
