use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tone_analysis::{SNAPSHOT_FILE_NAME, ToneSnapshot};
use tone_core::ToneConfig;

use super::reduce_from_cache;

#[derive(Args, Clone, Debug, Default)]
pub struct ReduceArgs {
  /// Where to write the snapshot (default: <output-dir>/tone_snapshot.json)
  #[arg(long)]
  snapshot_out: Option<PathBuf>,
}

pub async fn execute(args: ReduceArgs, config: &ToneConfig) -> Result<ToneSnapshot> {
  let snapshot = reduce_from_cache(config).await?;
  print_vectors(&snapshot);

  let path = args.snapshot_out.unwrap_or_else(|| config.output_dir.join(SNAPSHOT_FILE_NAME));
  snapshot.save(&path)?;
  println!("Snapshot written to {}", path.display());

  Ok(snapshot)
}

fn print_vectors(snapshot: &ToneSnapshot) {
  for vector in snapshot.vectors() {
    println!("{} tone vector: {:?}", vector.country, vector.values);
  }
}
