//! Query parameters for the GDELT `tonechart` mode

use tone_core::{DayRange, FetchUnit};

/// Query for the tone histogram of one country over one month
#[derive(Debug, Clone)]
pub struct ToneQuery<'a> {
  /// Country and month being queried
  pub unit: &'a FetchUnit,
  /// Keyword filter placed before `sourcecountry:`
  pub keyword_filter: &'a str,
  /// Day span within the month
  pub day_range: DayRange,
}

impl<'a> ToneQuery<'a> {
  /// Create a query for `unit`
  pub fn new(unit: &'a FetchUnit, keyword_filter: &'a str, day_range: DayRange) -> Self {
    Self { unit, keyword_filter, day_range }
  }

  /// `YYYYMMDDHHMMSS` of the first second of the window
  pub fn start_datetime(&self) -> String {
    format!("{}01000000", self.unit.month.yyyymm())
  }

  /// `YYYYMMDDHHMMSS` of the last second of the window
  pub fn end_datetime(&self) -> String {
    format!("{}{:02}235959", self.unit.month.yyyymm(), self.day_range.end_day(self.unit.month))
  }

  /// The `query` parameter before URL encoding
  pub fn search_terms(&self) -> String {
    format!("{} sourcecountry:{}", self.keyword_filter.trim(), self.unit.country)
  }

  /// Query string pairs in the order GDELT documents them
  pub fn params(&self) -> Vec<(&'static str, String)> {
    vec![
      ("format", "csv".to_string()),
      ("startdatetime", self.start_datetime()),
      ("enddatetime", self.end_datetime()),
      ("query", self.search_terms()),
      ("mode", "tonechart".to_string()),
    ]
  }
}
