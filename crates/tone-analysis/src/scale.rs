//! The 1-5 tone scale

use serde::{Deserialize, Serialize};
use tone_core::{CountryCode, ScaleMode};

/// Lowest and highest scale values
pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 5;

/// Map a weighted average tone onto the 1-5 scale.
///
/// | average            | Historical | Continuous |
/// |--------------------|-----------:|-----------:|
/// | `> 2`              | 5          | 5          |
/// | `(1.5, 2]`         | 1          | 4          |
/// | `(0.5, 1.5]`       | 4          | 4          |
/// | `(-0.5, 0.5]`      | 3          | 3          |
/// | `(-1.5, -0.5]`     | 2          | 2          |
/// | `<= -1.5` or NaN   | 1          | 1          |
pub fn tone_on_scale(average: f64, mode: ScaleMode) -> u8 {
  let upper_four = match mode {
    ScaleMode::Historical => 1.5,
    ScaleMode::Continuous => 2.0,
  };

  if average > 2.0 {
    5
  } else if average > 0.5 && average <= upper_four {
    4
  } else if average > -0.5 && average <= 0.5 {
    3
  } else if average > -1.5 && average <= -0.5 {
    2
  } else {
    1
  }
}

/// Scale values of one country, one per month bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneVector {
  pub country: CountryCode,
  pub values: Vec<u8>,
}

impl ToneVector {
  pub fn from_averages(country: CountryCode, averages: &[f64], mode: ScaleMode) -> Self {
    Self { country, values: averages.iter().map(|&a| tone_on_scale(a, mode)).collect() }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn as_f64(&self) -> Vec<f64> {
    self.values.iter().map(|&v| f64::from(v)).collect()
  }

  /// True when every value lies in 1..=5
  pub fn is_valid(&self) -> bool {
    self.values.iter().all(|v| (SCALE_MIN..=SCALE_MAX).contains(v))
  }
}
