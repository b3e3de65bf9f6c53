//! CSV processor for cached GDELT tone charts
//!
//! A tone chart has a `Label` column (integer tone bin) and a `Count`
//! column (articles in that bin). Other columns are ignored. The API
//! sometimes prefixes a UTF-8 byte order mark and pads fields with
//! whitespace; both are tolerated. An empty file yields no records.

use csv::{ReaderBuilder, Trim};
use std::path::Path;
use tone_core::ToneRecord;

use crate::{LoaderError, LoaderResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvProcessor;

impl CsvProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Parse a cached tone chart file
    pub fn parse_tone_file<P: AsRef<Path>>(&self, path: P) -> LoaderResult<Vec<ToneRecord>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::IoError(format!("{}: {}", path.display(), e)))?;
        self.parse_tone_str(&content)
            .map_err(|e| match e {
                LoaderError::CsvError(msg) => LoaderError::CsvError(format!("{}: {}", path.display(), msg)),
                other => other,
            })
    }

    /// Parse tone chart content
    pub fn parse_tone_str(&self, content: &str) -> LoaderResult<Vec<ToneRecord>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?;
        for required in ["Label", "Count"] {
            if !headers.iter().any(|h| h == required) {
                return Err(LoaderError::CsvError(format!("missing '{}' column", required)));
            }
        }

        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: ToneRecord = result?;
            records.push(record);
        }

        Ok(records)
    }
}
