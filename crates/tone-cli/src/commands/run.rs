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
use tone_core::ToneConfig;
use tracing::info;

use super::{fetch, plot, reduce, similarity};

#[derive(Args, Clone, Debug, Default)]
pub struct RunArgs {
  #[command(flatten)]
  fetch: fetch::FetchArgs,

  #[command(flatten)]
  reduce: reduce::ReduceArgs,
}

/// fetch, reduce, similarity, plot
pub async fn execute(args: RunArgs, config: &ToneConfig) -> Result<()> {
  let report = fetch::fetch_all(&args.fetch, config).await?;
  report.ensure_complete().context("Some tone charts could not be downloaded")?;

  let snapshot = reduce::execute(args.reduce, config).await?;
  similarity::print_similarities(&snapshot, config)?;
  plot::write_chart(&snapshot, config)?;

  info!("Run complete");
  Ok(())
}
