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

//! Cosine similarity of tone vectors

use std::fmt;

use crate::error::{AnalysisError, AnalysisResult};
use crate::scale::ToneVector;
use tone_core::CountryCode;

/// `u·v / (‖u‖·‖v‖)`, clamped to [-1, 1]
///
/// # Errors
///
/// - [`AnalysisError::EmptyVector`] if either input is empty
/// - [`AnalysisError::LengthMismatch`] if the lengths differ
/// - [`AnalysisError::DegenerateVector`] if either input has zero magnitude
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> AnalysisResult<f64> {
  if u.is_empty() || v.is_empty() {
    return Err(AnalysisError::EmptyVector);
  }
  if u.len() != v.len() {
    return Err(AnalysisError::LengthMismatch { left: u.len(), right: v.len() });
  }

  let (dot, norm_u, norm_v) = u
    .iter()
    .zip(v)
    .fold((0.0f64, 0.0f64, 0.0f64), |(dot, nu, nv), (&x, &y)| (dot + x * y, nu + x * x, nv + y * y));

  let denom = norm_u.sqrt() * norm_v.sqrt();
  if denom == 0.0 || !denom.is_finite() {
    let which = if norm_u == 0.0 { "left" } else { "right" };
    return Err(AnalysisError::DegenerateVector(format!(
      "{} operand has zero or non-finite magnitude",
      which
    )));
  }

  Ok((dot / denom).clamp(-1.0, 1.0))
}

/// Similarity of one country to the reference country
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityScore {
  pub reference: CountryCode,
  pub country: CountryCode,
  pub score: f64,
}

impl fmt::Display for SimilarityScore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} similarity to {}: {:.5}", self.reference, self.country, self.score)
  }
}

/// One score per candidate, in candidate order
pub fn similarity_to_reference(
  reference: &ToneVector,
  candidates: &[ToneVector],
) -> AnalysisResult<Vec<SimilarityScore>> {
  let reference_values = reference.as_f64();
  candidates
    .iter()
    .map(|candidate| {
      let score = cosine_similarity(&reference_values, &candidate.as_f64()).map_err(|e| match e {
        AnalysisError::DegenerateVector(msg) => {
          AnalysisError::DegenerateVector(format!("{} vs {}: {}", reference.country, candidate.country, msg))
        }
        other => other,
      })?;
      Ok(SimilarityScore {
        reference: reference.country.clone(),
        country: candidate.country.clone(),
        score,
      })
    })
    .collect()
}

/// Look up `reference` among `vectors` and score every vector against it
pub fn reference_similarities(
  reference: &CountryCode,
  vectors: &[ToneVector],
) -> AnalysisResult<Vec<SimilarityScore>> {
  let reference_vector = vectors
    .iter()
    .find(|v| &v.country == reference)
    .ok_or_else(|| AnalysisError::UnknownCountry(reference.to_string()))?;
  similarity_to_reference(reference_vector, vectors)
}
