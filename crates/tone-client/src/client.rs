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

//! Rate-limited GDELT client

use crate::query::ToneQuery;
use crate::transport::Transport;
use std::sync::Arc;
use tone_core::{DayRange, FetchUnit, Result, ToneConfig};
use tracing::debug;

/// Main GDELT DOC API client
///
/// Cheap to clone; clones share the transport and the rate limiter, so a
/// worker pool can hand one clone to every task.
///
/// # Examples
///
/// ```ignore
/// use tone_client::GdeltClient;
/// use tone_core::ToneConfig;
///
/// let config = ToneConfig::default();
/// let client = GdeltClient::new(&config)?;
/// for unit in config.fetch_units() {
///     let csv = client.tone_chart(&unit).await?;
/// }
/// ```
#[derive(Clone)]
pub struct GdeltClient {
  transport: Arc<Transport>,
  keyword_filter: String,
  day_range: DayRange,
}

impl GdeltClient {
  /// Create a new client
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: &ToneConfig) -> Result<Self> {
    let transport = Transport::new(config)?;
    Ok(Self::with_transport(config, transport))
  }

  /// Create a client around an already configured transport
  pub fn with_transport(config: &ToneConfig, transport: Transport) -> Self {
    Self {
      transport: Arc::new(transport),
      keyword_filter: config.keyword_filter.clone(),
      day_range: config.day_range,
    }
  }

  /// The query for `unit` under this client's filter and day range
  pub fn query_for<'a>(&'a self, unit: &'a FetchUnit) -> ToneQuery<'a> {
    ToneQuery::new(unit, &self.keyword_filter, self.day_range)
  }

  /// Full request URL for `unit`
  pub fn query_url(&self, unit: &FetchUnit) -> Result<String> {
    self.transport.build_url(&self.query_for(unit).params())
  }

  /// Download the tone chart CSV for one country and month
  pub async fn tone_chart(&self, unit: &FetchUnit) -> Result<String> {
    debug!("Requesting tone chart for {}", unit);
    self.transport.get_text(&self.query_for(unit).params()).await
  }
}

impl std::fmt::Debug for GdeltClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GdeltClient")
      .field("transport", &self.transport)
      .field("keyword_filter", &self.keyword_filter)
      .field("day_range", &self.day_range)
      .finish()
  }
}
