//! Versioned JSON snapshot of a reduction
//!
//! The plot and similarity stages can run from a snapshot instead of the
//! cache. A snapshot stores raw averages and their scale values side by
//! side; on load the scale values must agree with the averages under the
//! stored scale mode.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{AnalysisError, AnalysisResult};
use crate::reducer::ToneSeries;
use crate::scale::ToneVector;
use tone_core::{CountryCode, MonthBucket, MonthRange, ScaleMode};

pub const SNAPSHOT_VERSION: u32 = 1;
pub const SNAPSHOT_FILE_NAME: &str = "tone_snapshot.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSeries {
  pub country: CountryCode,
  pub averages: Vec<f64>,
  pub scale: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneSnapshot {
  pub version: u32,
  pub start_month: MonthBucket,
  pub scale_mode: ScaleMode,
  pub series: Vec<SnapshotSeries>,
}

impl ToneSnapshot {
  pub fn from_series(start_month: MonthBucket, scale_mode: ScaleMode, series: &[ToneSeries]) -> Self {
    let series = series
      .iter()
      .map(|s| SnapshotSeries {
        country: s.country.clone(),
        averages: s.averages.clone(),
        scale: s.to_vector(scale_mode).values,
      })
      .collect();
    Self { version: SNAPSHOT_VERSION, start_month, scale_mode, series }
  }

  pub fn from_json(json: &str) -> AnalysisResult<Self> {
    let snapshot: Self = serde_json::from_str(json)?;
    snapshot.validate()?;
    Ok(snapshot)
  }

  pub fn to_json(&self) -> AnalysisResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn load(path: &Path) -> AnalysisResult<Self> {
    let json = std::fs::read_to_string(path)
      .map_err(|e| AnalysisError::Io(format!("{}: {}", path.display(), e)))?;
    let snapshot = Self::from_json(&json).map_err(|e| match e {
      AnalysisError::Snapshot(msg) => AnalysisError::Snapshot(format!("{}: {}", path.display(), msg)),
      other => other,
    })?;
    info!("Loaded snapshot with {} series from {}", snapshot.series.len(), path.display());
    Ok(snapshot)
  }

  pub fn save(&self, path: &Path) -> AnalysisResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, self.to_json()?)?;
    info!("Wrote snapshot to {}", path.display());
    Ok(())
  }

  /// Reject unknown versions, ragged series and scale values that disagree
  /// with their averages
  pub fn validate(&self) -> AnalysisResult<()> {
    if self.version != SNAPSHOT_VERSION {
      return Err(AnalysisError::Snapshot(format!(
        "unsupported snapshot version {} (expected {})",
        self.version, SNAPSHOT_VERSION
      )));
    }

    let months = self.months();
    for s in &self.series {
      if s.averages.len() != months || s.scale.len() != months {
        return Err(AnalysisError::Snapshot(format!(
          "series {} has {} averages and {} scale values, expected {}",
          s.country,
          s.averages.len(),
          s.scale.len(),
          months
        )));
      }
      let expected = ToneVector::from_averages(s.country.clone(), &s.averages, self.scale_mode);
      if expected.values != s.scale {
        return Err(AnalysisError::Snapshot(format!(
          "scale values of {} do not match its averages under {} scale",
          s.country, self.scale_mode
        )));
      }
    }
    Ok(())
  }

  /// Month buckets per series
  pub fn months(&self) -> usize {
    self.series.first().map_or(0, |s| s.averages.len())
  }

  /// Restrict to `countries`, in that order, and to the months of `range`
  ///
  /// Fails with [`AnalysisError::UnknownCountry`] when a country has no
  /// series, and with [`AnalysisError::Snapshot`] when `range` is not
  /// covered by the snapshot's months.
  pub fn select(&self, countries: &[CountryCode], range: &MonthRange) -> AnalysisResult<Self> {
    let offset = std::iter::successors(Some(self.start_month), |m| Some(m.next()))
      .take(self.months())
      .position(|m| m == range.start())
      .filter(|offset| offset + range.len() <= self.months())
      .ok_or_else(|| {
        AnalysisError::Snapshot(format!(
          "snapshot covers {} month(s) from {}, not {} to {}",
          self.months(),
          self.start_month,
          range.start(),
          range.end()
        ))
      })?;
    let window = offset..offset + range.len();

    let series = countries
      .iter()
      .map(|country| {
        let s = self
          .series
          .iter()
          .find(|s| &s.country == country)
          .ok_or_else(|| AnalysisError::UnknownCountry(country.to_string()))?;
        match (s.averages.get(window.clone()), s.scale.get(window.clone())) {
          (Some(averages), Some(scale)) => Ok(SnapshotSeries {
            country: s.country.clone(),
            averages: averages.to_vec(),
            scale: scale.to_vec(),
          }),
          _ => Err(AnalysisError::Snapshot(format!("series {} is shorter than the snapshot", s.country))),
        }
      })
      .collect::<AnalysisResult<Vec<_>>>()?;

    Ok(Self { version: self.version, start_month: range.start(), scale_mode: self.scale_mode, series })
  }

  pub fn tone_series(&self) -> Vec<ToneSeries> {
    self.series.iter().map(|s| ToneSeries::new(s.country.clone(), s.averages.clone())).collect()
  }

  pub fn vectors(&self) -> Vec<ToneVector> {
    self.series.iter().map(|s| ToneVector { country: s.country.clone(), values: s.scale.clone() }).collect()
  }
}
