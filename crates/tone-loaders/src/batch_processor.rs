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

//! Bounded worker pool for independent units of work
//!
//! Items run concurrently, at most `max_concurrent` at a time, and finish in
//! any order. Results are put back in input order so callers can zip them
//! with their inputs.

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::{LoaderError, LoaderResult};

#[derive(Debug, Clone)]
pub struct BatchConfig {
  /// Worker pool size
  pub max_concurrent: usize,

  /// When false, any failed item fails the whole batch
  pub continue_on_error: bool,
}

impl Default for BatchConfig {
  fn default() -> Self {
    Self { max_concurrent: 4, continue_on_error: true }
  }
}

/// Per-item results, indexed like the input
#[derive(Debug)]
pub struct BatchResult<T> {
  pub outcomes: Vec<LoaderResult<T>>,
}

impl<T> BatchResult<T> {
  pub fn success_count(&self) -> usize {
    self.outcomes.iter().filter(|o| o.is_ok()).count()
  }

  pub fn failure_count(&self) -> usize {
    self.outcomes.len() - self.success_count()
  }

  /// Input indexes of failed items with their errors
  pub fn failures(&self) -> impl Iterator<Item = (usize, &LoaderError)> {
    self.outcomes.iter().enumerate().filter_map(|(i, o)| o.as_ref().err().map(|e| (i, e)))
  }
}

#[derive(Debug, Clone)]
pub struct BatchProcessor {
  config: BatchConfig,
  permits: Arc<Semaphore>,
}

impl BatchProcessor {
  pub fn new(config: BatchConfig) -> Self {
    let permits = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
    Self { config, permits }
  }

  pub fn max_concurrent(&self) -> usize {
    self.config.max_concurrent.max(1)
  }

  /// Run `processor` over every item on the pool
  pub async fn process<T, F, O>(&self, items: Vec<T>, processor: F) -> LoaderResult<BatchResult<O>>
  where
    T: Send + 'static,
    F: Fn(T) -> BoxFuture<'static, LoaderResult<O>> + Send + Sync + Clone + 'static,
    O: Send + 'static,
  {
    let count = items.len();
    debug!("Running {} items on {} workers", count, self.max_concurrent());

    let permits = self.permits.clone();
    let finished: Vec<(usize, LoaderResult<O>)> = stream::iter(items.into_iter().enumerate())
      .map(move |(idx, item)| {
        let processor = processor.clone();
        let permits = permits.clone();
        async move {
          let outcome = match permits.acquire_owned().await {
            Ok(_permit) => processor(item).await,
            Err(_) => Err(LoaderError::BatchProcessingError("worker pool closed".to_string())),
          };
          (idx, outcome)
        }
      })
      .buffer_unordered(self.max_concurrent())
      .collect()
      .await;

    let mut slots: Vec<Option<LoaderResult<O>>> = (0..count).map(|_| None).collect();
    for (idx, outcome) in finished {
      slots[idx] = Some(outcome);
    }
    let outcomes: Vec<LoaderResult<O>> = slots
      .into_iter()
      .map(|slot| {
        slot.unwrap_or_else(|| Err(LoaderError::BatchProcessingError("item never ran".to_string())))
      })
      .collect();
    let result = BatchResult { outcomes };

    for (idx, err) in result.failures() {
      warn!("Item {} failed: {}", idx, err);
    }
    if !self.config.continue_on_error {
      if let Some((idx, _)) = result.failures().next() {
        return Err(LoaderError::BatchProcessingError(format!("item {} failed", idx)));
      }
    }

    debug!("Batch done: {} ok, {} failed", result.success_count(), result.failure_count());
    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  fn pool(max_concurrent: usize, continue_on_error: bool) -> BatchProcessor {
    BatchProcessor::new(BatchConfig { max_concurrent, continue_on_error })
  }

  #[tokio::test]
  async fn test_empty_input() {
    let result = pool(4, true).process(Vec::<u32>::new(), |x| Box::pin(async move { Ok(x) })).await.unwrap();
    assert!(result.outcomes.is_empty());
    assert_eq!(result.failure_count(), 0);
  }

  #[tokio::test]
  async fn test_results_follow_input_order() {
    let items = vec![40u64, 5, 30, 10, 20];
    let result = pool(5, true)
      .process(items, |ms| {
        Box::pin(async move {
          tokio::time::sleep(Duration::from_millis(ms)).await;
          Ok(ms / 5)
        })
      })
      .await
      .unwrap();

    let values: Vec<u64> = result.outcomes.into_iter().map(|o| o.unwrap()).collect();
    assert_eq!(values, vec![8, 1, 6, 2, 4]);
  }

  #[tokio::test]
  async fn test_failure_is_isolated() {
    let result = pool(2, true)
      .process(vec!["NZ", "??", "US"], |code| {
        Box::pin(async move {
          if code == "??" { Err(LoaderError::InvalidData(code.to_string())) } else { Ok(code.len()) }
        })
      })
      .await
      .unwrap();

    assert_eq!(result.success_count(), 2);
    let failures: Vec<usize> = result.failures().map(|(i, _)| i).collect();
    assert_eq!(failures, vec![1]);
  }

  #[tokio::test]
  async fn test_stop_on_error() {
    let err = pool(2, false)
      .process(vec![1, 2, 3], |x| {
        Box::pin(async move {
          if x == 2 { Err(LoaderError::NetworkError("reset".to_string())) } else { Ok(x) }
        })
      })
      .await
      .unwrap_err();

    assert!(matches!(err, LoaderError::BatchProcessingError(msg) if msg.contains("item 1")));
  }

  #[tokio::test]
  async fn test_never_exceeds_pool_size() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let result = pool(3, true)
      .process((0..20).collect::<Vec<u32>>(), {
        let in_flight = in_flight.clone();
        let peak = peak.clone();
        move |_| {
          let in_flight = in_flight.clone();
          let peak = peak.clone();
          Box::pin(async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
          })
        }
      })
      .await
      .unwrap();

    assert_eq!(result.success_count(), 20);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 2);
  }
}
