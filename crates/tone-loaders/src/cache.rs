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

//! File cache of downloaded tone charts
//!
//! One file per (country, month) under a single directory. Presence of the
//! file is the only cache key: an existing file is never fetched again, and
//! files are only ever created by renaming a fully written temp file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::{LoaderError, LoaderResult};
use tone_core::FetchUnit;

const PARTIAL_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct ToneFileCache {
  dir: PathBuf,
}

impl ToneFileCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn path_for(&self, unit: &FetchUnit) -> PathBuf {
    self.dir.join(unit.file_name())
  }

  /// True when the unit's file exists
  pub async fn contains(&self, unit: &FetchUnit) -> LoaderResult<bool> {
    Ok(fs::try_exists(self.path_for(unit)).await?)
  }

  /// Write `body` as the unit's cache file
  pub async fn store(&self, unit: &FetchUnit, body: &str) -> LoaderResult<PathBuf> {
    fs::create_dir_all(&self.dir).await?;

    let path = self.path_for(unit);
    let partial = self.dir.join(format!("{}{}", unit.file_name(), PARTIAL_SUFFIX));

    let written = match fs::write(&partial, body).await {
      Ok(()) => fs::rename(&partial, &path).await,
      Err(e) => Err(e),
    };
    if let Err(e) = written {
      let _ = fs::remove_file(&partial).await;
      return Err(e.into());
    }

    debug!("Cached {} ({} bytes) at {}", unit, body.len(), path.display());
    Ok(path)
  }

  /// Units with no cache file, in the order given
  pub async fn missing_units(&self, units: &[FetchUnit]) -> LoaderResult<Vec<FetchUnit>> {
    let mut missing = Vec::new();
    for unit in units {
      if !self.contains(unit).await? {
        missing.push(unit.clone());
      }
    }
    Ok(missing)
  }

  /// Fail with the list of missing file names unless every unit is cached
  pub async fn ensure_complete(&self, units: &[FetchUnit]) -> LoaderResult<()> {
    let missing = self.missing_units(units).await?;
    if missing.is_empty() {
      Ok(())
    } else {
      Err(LoaderError::IncompleteData { missing: missing.iter().map(FetchUnit::file_name).collect() })
    }
  }

  /// Remove leftover temp files from interrupted writes
  pub async fn clean_partials(&self) -> LoaderResult<usize> {
    if !fs::try_exists(&self.dir).await? {
      return Ok(0);
    }

    let mut removed = 0;
    let mut entries = fs::read_dir(&self.dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      if entry.file_name().to_string_lossy().ends_with(PARTIAL_SUFFIX) {
        fs::remove_file(entry.path()).await?;
        removed += 1;
      }
    }

    if removed > 0 {
      debug!("Removed {} partial file(s) from {}", removed, self.dir.display());
    }
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;
  use tone_core::{CountryCode, MonthBucket};

  fn unit(country: &str, year: i32, month: u32) -> FetchUnit {
    FetchUnit::new(CountryCode::new(country).unwrap(), MonthBucket::new(year, month).unwrap())
  }

  #[tokio::test]
  async fn test_store_then_contains() {
    let tmp = TempDir::new().unwrap();
    let cache = ToneFileCache::new(tmp.path().join("tones"));
    let nz = unit("NZ", 2019, 3);

    assert!(!cache.contains(&nz).await.unwrap());

    let path = cache.store(&nz, "Label,Count\n1,2\n").await.unwrap();
    assert_eq!(path, tmp.path().join("tones").join("NZ_201903_tones.csv"));
    assert!(cache.contains(&nz).await.unwrap());
    assert_eq!(std::fs::read_to_string(path).unwrap(), "Label,Count\n1,2\n");
  }

  #[tokio::test]
  async fn test_store_leaves_no_partial_file() {
    let tmp = TempDir::new().unwrap();
    let cache = ToneFileCache::new(tmp.path());
    cache.store(&unit("US", 2020, 1), "").await.unwrap();

    let names: Vec<String> = std::fs::read_dir(tmp.path())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["US_202001_tones.csv".to_string()]);
  }

  #[tokio::test]
  async fn test_failed_store_removes_partial_file() {
    let dir = TempDir::new().unwrap();
    let cache = ToneFileCache::new(dir.path());
    let unit = FetchUnit::new(CountryCode::new("CH").unwrap(), MonthBucket::new(2020, 7).unwrap());

    // A non-empty directory in place of the cache file makes the rename fail
    let blocker = cache.path_for(&unit);
    std::fs::create_dir(&blocker).unwrap();
    std::fs::write(blocker.join("keep"), "x").unwrap();

    assert!(cache.store(&unit, "Label,Count\n1,1\n").await.is_err());

    let names: Vec<String> = std::fs::read_dir(dir.path())
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["CH_202007_tones.csv".to_string()]);
  }

  #[tokio::test]
  async fn test_ensure_complete_lists_missing_files() {
    let tmp = TempDir::new().unwrap();
    let cache = ToneFileCache::new(tmp.path());
    let units = vec![unit("NZ", 2019, 3), unit("NZ", 2019, 4), unit("US", 2019, 3)];

    cache.store(&units[1], "").await.unwrap();

    match cache.ensure_complete(&units).await {
      Err(LoaderError::IncompleteData { missing }) => {
        assert_eq!(missing, vec!["NZ_201903_tones.csv", "US_201903_tones.csv"]);
      }
      other => panic!("expected IncompleteData, got {:?}", other),
    }

    cache.store(&units[0], "").await.unwrap();
    cache.store(&units[2], "").await.unwrap();
    assert!(cache.ensure_complete(&units).await.is_ok());
  }

  #[tokio::test]
  async fn test_clean_partials() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("NZ_201903_tones.csv.part"), "half").unwrap();
    std::fs::write(tmp.path().join("NZ_201904_tones.csv"), "").unwrap();

    let cache = ToneFileCache::new(tmp.path());
    assert_eq!(cache.clean_partials().await.unwrap(), 1);
    assert!(tmp.path().join("NZ_201904_tones.csv").exists());
  }

  #[tokio::test]
  async fn test_clean_partials_missing_dir() {
    let tmp = TempDir::new().unwrap();
    let cache = ToneFileCache::new(tmp.path().join("absent"));
    assert_eq!(cache.clean_partials().await.unwrap(), 0);
  }
}
