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

//! Domain types shared by the fetcher, the reducer and the CLI

use crate::error::{Error, Result};
use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A GDELT source-country code (FIPS 10-4, two uppercase letters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
  pub fn new(code: &str) -> Result<Self> {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(Error::InvalidCountry(code.to_string()));
    }
    Ok(Self(code.to_ascii_uppercase()))
  }

  /// Build from a compile-time constant that is already a valid code
  pub(crate) fn from_static(code: &'static str) -> Self {
    Self(code.to_ascii_uppercase())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CountryCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for CountryCode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::new(s)
  }
}

impl TryFrom<String> for CountryCode {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    Self::new(&value)
  }
}

impl From<CountryCode> for String {
  fn from(code: CountryCode) -> Self {
    code.0
  }
}

/// One calendar month, the time bucket of the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthBucket {
  year: i32,
  month: u32,
}

impl MonthBucket {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) || !(1000..=9999).contains(&year) {
      return Err(Error::InvalidMonth(format!("{}-{}", year, month)));
    }
    Ok(Self { year, month })
  }

  pub(crate) const fn from_static(year: i32, month: u32) -> Self {
    Self { year, month }
  }

  pub fn year(&self) -> i32 {
    self.year
  }

  pub fn month(&self) -> u32 {
    self.month
  }

  /// `YYYYMM`, the form used in cache file names and query timestamps
  pub fn yyyymm(&self) -> String {
    format!("{:04}{:02}", self.year, self.month)
  }

  pub fn next(&self) -> Self {
    if self.month == 12 {
      Self { year: self.year + 1, month: 1 }
    } else {
      Self { year: self.year, month: self.month + 1 }
    }
  }

  /// Number of days in this month
  pub fn last_day(&self) -> u32 {
    let next = self.next();
    NaiveDate::from_ymd_opt(next.year, next.month, 1)
      .and_then(|d| d.pred_opt())
      .map(|d| d.day())
      .unwrap_or(28)
  }

  /// English month name, e.g. "March"
  pub fn month_name(&self) -> &'static str {
    u8::try_from(self.month).ok().and_then(|m| Month::try_from(m).ok()).map_or("", |m| m.name())
  }
}

impl fmt::Display for MonthBucket {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for MonthBucket {
  type Err = Error;

  /// Accepts `YYYY-MM` and `YYYYMM`
  fn from_str(s: &str) -> Result<Self> {
    let s = s.trim();
    let (year, month) = match s.split_once('-') {
      Some((y, m)) => (y, m),
      None if s.len() == 6 && s.is_char_boundary(4) => s.split_at(4),
      None => return Err(Error::InvalidMonth(s.to_string())),
    };
    let year = year.parse().map_err(|_| Error::InvalidMonth(s.to_string()))?;
    let month = month.parse().map_err(|_| Error::InvalidMonth(s.to_string()))?;
    Self::new(year, month)
  }
}

impl TryFrom<String> for MonthBucket {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> {
    value.parse()
  }
}

impl From<MonthBucket> for String {
  fn from(month: MonthBucket) -> Self {
    month.to_string()
  }
}

/// Inclusive range of month buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
  start: MonthBucket,
  end: MonthBucket,
}

impl MonthRange {
  pub fn new(start: MonthBucket, end: MonthBucket) -> Result<Self> {
    if end < start {
      return Err(Error::Config(format!("month range ends ({}) before it starts ({})", end, start)));
    }
    Ok(Self { start, end })
  }

  pub(crate) const fn from_buckets(start: MonthBucket, end: MonthBucket) -> Self {
    Self { start, end }
  }

  pub fn start(&self) -> MonthBucket {
    self.start
  }

  pub fn end(&self) -> MonthBucket {
    self.end
  }

  pub fn len(&self) -> usize {
    let months = (self.end.year - self.start.year) * 12 + self.end.month as i32
      - self.start.month as i32;
    months as usize + 1
  }

  pub fn is_empty(&self) -> bool {
    false
  }

  pub fn contains(&self, month: MonthBucket) -> bool {
    self.start <= month && month <= self.end
  }

  pub fn iter(&self) -> impl Iterator<Item = MonthBucket> {
    let end = self.end;
    std::iter::successors(Some(self.start), move |m| if *m < end { Some(m.next()) } else { None })
  }
}

/// How much of each month a query covers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayRange {
  /// Days 01-28 of every month, matching the historical data set
  #[default]
  Truncated,
  /// Day 01 to the real last day of the month
  FullMonth,
}

impl DayRange {
  pub fn end_day(&self, month: MonthBucket) -> u32 {
    match self {
      DayRange::Truncated => 28,
      DayRange::FullMonth => month.last_day(),
    }
  }
}

impl fmt::Display for DayRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DayRange::Truncated => write!(f, "truncated"),
      DayRange::FullMonth => write!(f, "full-month"),
    }
  }
}

impl FromStr for DayRange {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "truncated" => Ok(DayRange::Truncated),
      "full-month" | "full_month" | "full" => Ok(DayRange::FullMonth),
      other => Err(Error::Config(format!("unknown day range: {}", other))),
    }
  }
}

/// Thresholds used to map an average tone onto the 1-5 scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
  /// Historical thresholds: averages in (1.5, 2] fall through to 1
  #[default]
  Historical,
  /// Gap closed: averages in (0.5, 2] map to 4
  Continuous,
}

impl fmt::Display for ScaleMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ScaleMode::Historical => write!(f, "historical"),
      ScaleMode::Continuous => write!(f, "continuous"),
    }
  }
}

impl FromStr for ScaleMode {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "historical" => Ok(ScaleMode::Historical),
      "continuous" => Ok(ScaleMode::Continuous),
      other => Err(Error::Config(format!("unknown scale mode: {}", other))),
    }
  }
}

/// A single (country, month) download, also the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchUnit {
  pub country: CountryCode,
  pub month: MonthBucket,
}

impl FetchUnit {
  pub fn new(country: CountryCode, month: MonthBucket) -> Self {
    Self { country, month }
  }

  /// `<COUNTRY>_<YYYYMM>_tones.csv`
  pub fn file_name(&self) -> String {
    format!("{}_{}{}", self.country, self.month.yyyymm(), crate::TONE_FILE_SUFFIX)
  }
}

impl fmt::Display for FetchUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.country, self.month)
  }
}

/// One row of a GDELT tonechart: `count` articles scored at `label`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneRecord {
  #[serde(rename = "Label")]
  pub label: i64,
  #[serde(rename = "Count")]
  pub count: u64,
}

impl ToneRecord {
  pub fn new(label: i64, count: u64) -> Self {
    Self { label, count }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_country_code_normalizes_case() {
    let code = CountryCode::new("nz").unwrap();
    assert_eq!(code.as_str(), "NZ");
  }

  #[test]
  fn test_country_code_rejects_bad_input() {
    assert!(CountryCode::new("").is_err());
    assert!(CountryCode::new("USA").is_err());
    assert!(CountryCode::new("N1").is_err());
  }

  #[test]
  fn test_month_bucket_parse_both_forms() {
    let a: MonthBucket = "2019-03".parse().unwrap();
    let b: MonthBucket = "201903".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.yyyymm(), "201903");
    assert_eq!(a.to_string(), "2019-03");
    assert!("2019-13".parse::<MonthBucket>().is_err());
    assert!("march".parse::<MonthBucket>().is_err());
  }

  #[test]
  fn test_month_bucket_next_wraps_year() {
    let dec = MonthBucket::new(2019, 12).unwrap();
    assert_eq!(dec.next(), MonthBucket::new(2020, 1).unwrap());
  }

  #[test]
  fn test_month_bucket_last_day() {
    assert_eq!(MonthBucket::new(2020, 2).unwrap().last_day(), 29);
    assert_eq!(MonthBucket::new(2021, 2).unwrap().last_day(), 28);
    assert_eq!(MonthBucket::new(2019, 12).unwrap().last_day(), 31);
    assert_eq!(MonthBucket::new(2019, 4).unwrap().last_day(), 30);
  }

  #[test]
  fn test_month_name() {
    assert_eq!(MonthBucket::new(2019, 3).unwrap().month_name(), "March");
  }

  #[test]
  fn test_historical_range_has_38_buckets() {
    let range = MonthRange::new("2019-03".parse().unwrap(), "2022-04".parse().unwrap()).unwrap();
    assert_eq!(range.len(), 38);
    let months: Vec<_> = range.iter().collect();
    assert_eq!(months.len(), 38);
    assert_eq!(months[0].to_string(), "2019-03");
    assert_eq!(months[10].to_string(), "2020-01");
    assert_eq!(months[37].to_string(), "2022-04");
  }

  #[test]
  fn test_single_month_range() {
    let m = MonthBucket::new(2020, 5).unwrap();
    let range = MonthRange::new(m, m).unwrap();
    assert_eq!(range.len(), 1);
    assert_eq!(range.iter().count(), 1);
  }

  #[test]
  fn test_inverted_range_rejected() {
    let a = MonthBucket::new(2020, 5).unwrap();
    let b = MonthBucket::new(2020, 4).unwrap();
    assert!(MonthRange::new(a, b).is_err());
  }

  #[test]
  fn test_day_range_end_day() {
    let feb = MonthBucket::new(2020, 2).unwrap();
    assert_eq!(DayRange::Truncated.end_day(feb), 28);
    assert_eq!(DayRange::FullMonth.end_day(feb), 29);
  }

  #[test]
  fn test_fetch_unit_file_name() {
    let unit = FetchUnit::new(CountryCode::new("NZ").unwrap(), MonthBucket::new(2019, 3).unwrap());
    assert_eq!(unit.file_name(), "NZ_201903_tones.csv");
    let unit = FetchUnit::new(CountryCode::new("sf").unwrap(), MonthBucket::new(2021, 11).unwrap());
    assert_eq!(unit.file_name(), "SF_202111_tones.csv");
  }

  #[test]
  fn test_modes_parse() {
    assert_eq!("full-month".parse::<DayRange>().unwrap(), DayRange::FullMonth);
    assert_eq!("Continuous".parse::<ScaleMode>().unwrap(), ScaleMode::Continuous);
    assert!("fuzzy".parse::<ScaleMode>().is_err());
  }

  #[test]
  fn test_month_bucket_serde_as_string() {
    let m = MonthBucket::new(2019, 3).unwrap();
    let json = serde_json::to_string(&m).unwrap();
    assert_eq!(json, "\"2019-03\"");
    let back: MonthBucket = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m);
  }
}
