use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tone_analysis::{ToneSnapshot, reference_similarities};
use tone_core::ToneConfig;

use super::load_or_reduce;

#[derive(Args, Clone, Debug, Default)]
pub struct SimilarityArgs {
  /// Read tone vectors from this snapshot instead of the cache
  #[arg(long)]
  snapshot: Option<PathBuf>,
}

pub async fn execute(args: SimilarityArgs, config: &ToneConfig) -> Result<()> {
  let snapshot = load_or_reduce(args.snapshot.as_deref(), config).await?;
  print_similarities(&snapshot, config)
}

pub fn print_similarities(snapshot: &ToneSnapshot, config: &ToneConfig) -> Result<()> {
  let scores = reference_similarities(&config.reference_country, &snapshot.vectors())
    .context("Failed to compute similarities")?;
  for score in scores {
    println!("{}", score);
  }
  Ok(())
}
