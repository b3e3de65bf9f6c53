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

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod commands;
use commands::{
  fetch::FetchArgs, plot::PlotArgs, reduce::ReduceArgs, run::RunArgs, similarity::SimilarityArgs,
};

mod config;
use config::ConfigArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "gt")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  #[command(flatten)]
  config: ConfigArgs,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Download missing monthly tone charts into the cache
  Fetch(FetchArgs),

  /// Reduce cached charts to tone vectors and write a snapshot
  Reduce(ReduceArgs),

  /// Print cosine similarity of every country to the reference country
  Similarity(SimilarityArgs),

  /// Write the sentiment progression chart as SVG and PDF
  Plot(PlotArgs),

  /// Fetch, reduce, compare and plot in one go
  Run(RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging; results go to stdout, logs to stderr
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).with_writer(std::io::stderr).init();

  // Load configuration
  let config = cli.config.load()?;

  // Execute command
  match cli.command {
    Commands::Fetch(args) => commands::fetch::execute(args, &config).await?,
    Commands::Reduce(args) => {
      commands::reduce::execute(args, &config).await?;
    }
    Commands::Similarity(args) => commands::similarity::execute(args, &config).await?,
    Commands::Plot(args) => commands::plot::execute(args, &config).await?,
    Commands::Run(args) => commands::run::execute(args, &config).await?,
  }

  Ok(())
}
