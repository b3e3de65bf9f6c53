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

//! Count-weighted tone averages
//!
//! Every tone chart row says `count` articles scored `label`. The tone of a
//! dataset is `Σ(label·count) / Σcount`, computed as a map-reduce over the
//! rows. Reduction of a whole cache fans out over (country, month) files.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::scale::ToneVector;
use tone_core::{CountryCode, FetchUnit, MonthBucket, MonthRange, ScaleMode, ToneRecord};
use tone_loaders::{CsvProcessor, ToneFileCache};

/// Weighted average label of one dataset
///
/// # Errors
///
/// [`AnalysisError::DataQuality`] when the dataset holds no articles
/// (no rows, or every count is zero).
pub fn weighted_average(records: &[ToneRecord]) -> AnalysisResult<f64> {
  let (total, weighted) = records
    .par_iter()
    .map(|r| (u128::from(r.count), i128::from(r.label) * i128::from(r.count)))
    .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

  if total == 0 {
    return Err(AnalysisError::DataQuality(format!(
      "total article count is zero across {} row(s)",
      records.len()
    )));
  }

  Ok(weighted as f64 / total as f64)
}

/// Raw monthly averages of one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSeries {
  pub country: CountryCode,
  pub averages: Vec<f64>,
}

impl ToneSeries {
  pub fn new(country: CountryCode, averages: Vec<f64>) -> Self {
    Self { country, averages }
  }

  pub fn to_vector(&self, mode: ScaleMode) -> ToneVector {
    ToneVector::from_averages(self.country.clone(), &self.averages, mode)
  }
}

/// Reduces cached tone charts into per-country series
#[derive(Debug, Default, Clone)]
pub struct ToneReducer {
  csv: CsvProcessor,
}

impl ToneReducer {
  pub fn new() -> Self {
    Self { csv: CsvProcessor::new() }
  }

  /// Average of a single cache file
  pub fn reduce_file(&self, path: &Path) -> AnalysisResult<f64> {
    let records = self.csv.parse_tone_file(path)?;
    weighted_average(&records).map_err(|e| match e {
      AnalysisError::DataQuality(msg) => {
        AnalysisError::DataQuality(format!("{}: {}", path.display(), msg))
      }
      other => other,
    })
  }

  /// One series per country over `months`, in the order given
  ///
  /// Every file must already be cached; run the completeness check first.
  pub fn reduce_cache(
    &self,
    cache: &ToneFileCache,
    countries: &[CountryCode],
    months: &MonthRange,
  ) -> AnalysisResult<Vec<ToneSeries>> {
    let buckets: Vec<MonthBucket> = months.iter().collect();
    info!("Reducing {} countries over {} months", countries.len(), buckets.len());

    countries
      .par_iter()
      .map(|country| {
        let averages = buckets
          .par_iter()
          .map(|&month| {
            let path = cache.path_for(&FetchUnit::new(country.clone(), month));
            self.reduce_file(&path)
          })
          .collect::<AnalysisResult<Vec<f64>>>()?;
        debug!("Reduced {} months for {}", averages.len(), country);
        Ok(ToneSeries::new(country.clone(), averages))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scale::tone_on_scale;
  use tempfile::TempDir;

  #[test]
  fn test_weighted_average_example() {
    let records = vec![ToneRecord::new(5, 2), ToneRecord::new(-2, 3)];
    let avg = weighted_average(&records).unwrap();
    assert!((avg - 0.8).abs() < 1e-12);
    assert_eq!(tone_on_scale(avg, ScaleMode::Historical), 4);
  }

  #[test]
  fn test_weighted_average_is_order_independent() {
    let mut records: Vec<ToneRecord> =
      (-10..=10).map(|label| ToneRecord::new(label, (label.unsigned_abs() * 7 + 3) % 11)).collect();
    let forward = weighted_average(&records).unwrap();
    records.reverse();
    assert_eq!(forward, weighted_average(&records).unwrap());
  }

  #[test]
  fn test_weighted_average_empty_dataset() {
    assert!(matches!(weighted_average(&[]), Err(AnalysisError::DataQuality(_))));
  }

  #[test]
  fn test_weighted_average_zero_counts() {
    let records = vec![ToneRecord::new(3, 0), ToneRecord::new(-1, 0)];
    assert!(matches!(weighted_average(&records), Err(AnalysisError::DataQuality(_))));
  }

  #[test]
  fn test_reduce_cache_orders_by_country_then_month() {
    let dir = TempDir::new().unwrap();
    let cache = ToneFileCache::new(dir.path());
    let write = |name: &str, body: &str| std::fs::write(dir.path().join(name), body).unwrap();

    write("NZ_201903_tones.csv", "Label,Count\n5,2\n-2,3\n");
    write("NZ_201904_tones.csv", "Label,Count\n-3,1\n");
    write("US_201903_tones.csv", "Label,Count,TopArts\n2,4,\n");
    write("US_201904_tones.csv", "\u{feff}Label,Count\n0,9\n");

    let countries = vec![CountryCode::new("NZ").unwrap(), CountryCode::new("US").unwrap()];
    let months =
      MonthRange::new(MonthBucket::new(2019, 3).unwrap(), MonthBucket::new(2019, 4).unwrap()).unwrap();

    let series = ToneReducer::new().reduce_cache(&cache, &countries, &months).unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].country.as_str(), "NZ");
    assert!((series[0].averages[0] - 0.8).abs() < 1e-12);
    assert_eq!(series[0].averages[1], -3.0);
    assert_eq!(series[1].averages, vec![2.0, 0.0]);
    assert_eq!(series[0].to_vector(ScaleMode::Historical).values, vec![4, 1]);
    assert_eq!(series[1].to_vector(ScaleMode::Historical).values, vec![1, 3]);
    assert_eq!(series[1].to_vector(ScaleMode::Continuous).values, vec![4, 3]);
  }

  #[test]
  fn test_reduce_cache_empty_file_is_data_quality_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("RS_202001_tones.csv"), "").unwrap();

    let cache = ToneFileCache::new(dir.path());
    let month = MonthBucket::new(2020, 1).unwrap();
    let err = ToneReducer::new()
      .reduce_cache(&cache, &[CountryCode::new("RS").unwrap()], &MonthRange::new(month, month).unwrap())
      .unwrap_err();

    match err {
      AnalysisError::DataQuality(msg) => assert!(msg.contains("RS_202001_tones.csv")),
      other => panic!("expected DataQuality, got {:?}", other),
    }
  }

  #[test]
  fn test_reduce_cache_missing_file() {
    let dir = TempDir::new().unwrap();
    let cache = ToneFileCache::new(dir.path());
    let month = MonthBucket::new(2020, 1).unwrap();
    let err = ToneReducer::new()
      .reduce_cache(&cache, &[CountryCode::new("CH").unwrap()], &MonthRange::new(month, month).unwrap())
      .unwrap_err();
    assert!(matches!(err, AnalysisError::Loader(_)));
  }
}
