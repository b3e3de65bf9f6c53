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

//! Sentiment progression chart
//!
//! One line per country over month offsets from the first bucket, drawn
//! with the plotters SVG backend. The PDF is converted from that same SVG.

use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use svg2pdf::usvg::fontdb::{Database, Family};
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::reducer::ToneSeries;
use tone_core::MonthBucket;

pub const CHART_FILE_STEM: &str = "SentimentProgression";

const FONT: &str = "monospace";

/// Line colours by series index; cycles past the end
pub const PALETTE: [RGBColor; 6] = [
  RGBColor(0, 0, 0),
  RGBColor(0, 0, 255),
  RGBColor(0, 128, 0),
  RGBColor(255, 0, 0),
  RGBColor(128, 0, 128),
  RGBColor(255, 165, 0),
];

pub fn series_color(index: usize) -> RGBColor {
  PALETTE[index % PALETTE.len()]
}

fn chart_err<E: Display>(err: E) -> AnalysisError {
  AnalysisError::Chart(err.to_string())
}

/// Paths of the written chart files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFiles {
  pub svg: PathBuf,
  pub pdf: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SentimentChart {
  pub title: String,
  pub x_desc: String,
  pub y_desc: String,
  pub size: (u32, u32),
}

impl SentimentChart {
  pub fn new(start_month: MonthBucket) -> Self {
    Self {
      title: "Sentiment Progression".to_string(),
      x_desc: format!("Months from {} {}", start_month.month_name(), start_month.year()),
      y_desc: "Average Sentiment".to_string(),
      size: (1200, 800),
    }
  }

  /// Render `series` as an SVG document
  pub fn render_svg(&self, series: &[ToneSeries]) -> AnalysisResult<String> {
    if series.is_empty() {
      return Err(AnalysisError::Chart("no series to plot".to_string()));
    }

    let months = series.iter().map(|s| s.averages.len()).max().unwrap_or(0);
    let x_max = months.saturating_sub(1).max(1) as f64;
    let (y_min, y_max) = value_range(series);

    let mut svg = String::new();
    {
      let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
      root.fill(&WHITE).map_err(chart_err)?;

      let mut chart = ChartBuilder::on(&root)
        .caption(&self.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(chart_err)?;

      chart
        .configure_mesh()
        .x_desc(self.x_desc.as_str())
        .y_desc(self.y_desc.as_str())
        .label_style((FONT, 14))
        .axis_desc_style((FONT, 18))
        .draw()
        .map_err(chart_err)?;

      for (idx, s) in series.iter().enumerate() {
        let color = series_color(idx);
        let points: Vec<(f64, f64)> = s
          .averages
          .iter()
          .enumerate()
          .filter(|(_, v)| v.is_finite())
          .map(|(i, &v)| (i as f64, v))
          .collect();

        chart
          .draw_series(LineSeries::new(points, color.stroke_width(2)))
          .map_err(chart_err)?
          .label(s.country.as_str())
          .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
      }

      chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 14))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

      root.present().map_err(chart_err)?;
    }

    Ok(svg)
  }

  /// Write `<stem>.svg` and `<stem>.pdf` into `dir`
  pub fn write(&self, series: &[ToneSeries], dir: &Path) -> AnalysisResult<ChartFiles> {
    std::fs::create_dir_all(dir)?;

    let svg = self.render_svg(series)?;
    let files = ChartFiles {
      svg: dir.join(format!("{}.svg", CHART_FILE_STEM)),
      pdf: dir.join(format!("{}.pdf", CHART_FILE_STEM)),
    };

    std::fs::write(&files.svg, &svg)?;
    info!("Wrote chart to {}", files.svg.display());

    std::fs::write(&files.pdf, svg_to_pdf(&svg)?)?;
    info!("Wrote chart to {}", files.pdf.display());

    Ok(files)
  }
}

/// System fonts, with the generic `monospace` family bound to an installed
/// face
///
/// fontdb resolves `monospace` to "Courier New" unless told otherwise, and
/// usvg drops text it cannot resolve. Falls back to the sans-serif family,
/// or failing that to the first installed face.
fn font_database() -> Database {
  let mut db = Database::new();
  db.load_system_fonts();

  let family = db
    .faces()
    .find(|face| face.monospaced)
    .and_then(|face| face.families.first())
    .map(|(name, _)| name.clone())
    .or_else(|| {
      let sans = db.family_name(&Family::SansSerif).to_string();
      db.faces().any(|face| face.families.iter().any(|(name, _)| *name == sans)).then_some(sans)
    })
    .or_else(|| db.faces().next().and_then(|face| face.families.first()).map(|(name, _)| name.clone()));

  match family {
    Some(family) => {
      debug!("Using font family {} for monospace text", family);
      db.set_monospace_family(family);
    }
    None => warn!("No system fonts found; chart text will be missing from the PDF"),
  }
  db
}

/// Convert an SVG document to a single-page PDF
pub fn svg_to_pdf(svg: &str) -> AnalysisResult<Vec<u8>> {
  let mut options = svg2pdf::usvg::Options::default();
  *options.fontdb_mut() = font_database();

  let tree = svg2pdf::usvg::Tree::from_str(svg, &options)
    .map_err(|e| AnalysisError::Chart(format!("invalid SVG: {}", e)))?;

  svg2pdf::to_pdf(&tree, svg2pdf::ConversionOptions::default(), svg2pdf::PageOptions::default())
    .map_err(|e| AnalysisError::Chart(format!("PDF conversion failed: {:?}", e)))
}

/// Y-axis bounds covering every finite value, padded by half a tone point
fn value_range(series: &[ToneSeries]) -> (f64, f64) {
  let (min, max) = series
    .iter()
    .flat_map(|s| s.averages.iter().copied())
    .filter(|v| v.is_finite())
    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

  if min > max {
    (-1.0, 1.0)
  } else {
    (min - 0.5, max + 0.5)
  }
}
