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

//! Base traits and types for data loaders

use crate::{LoaderResult, ToneFileCache};
use async_trait::async_trait;
use std::sync::Arc;
use tone_client::GdeltClient;
use tone_core::ToneConfig;

/// Configuration for data loaders
#[derive(Debug, Clone)]
pub struct LoaderConfig {
  /// Maximum concurrent requests (worker pool size)
  pub max_concurrent_requests: usize,

  /// Extra passes over units that failed in the previous pass
  pub backfill_passes: u32,

  /// Delay before each backfill pass in milliseconds
  pub backfill_delay_ms: u64,

  /// Enable progress tracking
  pub show_progress: bool,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self { max_concurrent_requests: 4, backfill_passes: 1, backfill_delay_ms: 5000, show_progress: true }
  }
}

impl LoaderConfig {
  /// Loader settings derived from the run configuration
  pub fn from_tone_config(config: &ToneConfig) -> Self {
    Self { max_concurrent_requests: config.max_concurrent_requests, ..Self::default() }
  }
}

/// Shared context for all loaders
pub struct LoaderContext {
  pub client: Arc<GdeltClient>,
  pub config: LoaderConfig,
  pub cache: Arc<ToneFileCache>,
}

impl LoaderContext {
  pub fn new(client: Arc<GdeltClient>, config: LoaderConfig, cache: Arc<ToneFileCache>) -> Self {
    Self { client, config, cache }
  }

  /// Build client, cache and loader settings from one run configuration
  pub fn from_tone_config(config: &ToneConfig) -> LoaderResult<Self> {
    let client = Arc::new(GdeltClient::new(config)?);
    let cache = Arc::new(ToneFileCache::new(&config.cache_dir));
    Ok(Self::new(client, LoaderConfig::from_tone_config(config), cache))
  }
}

/// Base trait for all data loaders
#[async_trait]
pub trait DataLoader: Send + Sync {
  /// The type of data this loader processes
  type Input;

  /// The result type after loading
  type Output;

  /// Load data from the given input
  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output>;

  /// Validate input before loading
  async fn validate_input(&self, _input: &Self::Input) -> LoaderResult<()> {
    Ok(())
  }

  /// Get loader name for logging/tracking
  fn name(&self) -> &'static str;
}
