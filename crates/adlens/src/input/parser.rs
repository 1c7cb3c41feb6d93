//! Delimited-text loader with delimiter detection.
//!
//! The loader is purely syntactic: it decodes bytes, splits on a delimiter,
//! normalizes headers, and attempts numeric coercion. Coercion failures are
//! recorded as per-row anomalies rather than raised, so the validator can
//! report them with row context. Semantic checks live in
//! [`crate::validation`].

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;

use super::table::{CampaignTable, SourceMetadata};
use super::transform;
use crate::error::{AdlensError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
        }
    }
}

/// Raw string grid, before format detection and coercion.
#[derive(Debug, Clone)]
pub(crate) struct RawTable {
    pub(crate) headers: Vec<String>,
    pub(crate) records: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of a named column.
    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell content at (row, column name), if both exist.
    pub(crate) fn cell<'a>(&'a self, row: &'a [String], name: &str) -> Option<&'a str> {
        self.column_index(name).and_then(|i| row.get(i)).map(|s| s.as_str())
    }
}

/// Parses campaign exports into typed tables.
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Parse a file from disk.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<CampaignTable> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| AdlensError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.parse_bytes(&bytes)
    }

    /// Parse raw bytes into a typed campaign table.
    ///
    /// Fails only on syntactic problems: undecodable or empty input, a
    /// missing header row, or inconsistent column counts across rows. Zero
    /// data rows after a valid header is not a parse error; the validator
    /// rejects it.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<CampaignTable> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(AdlensError::EmptyData("input is empty".to_string()));
        }

        let text = decode(bytes);

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&text)?,
        };

        let raw = self.parse_text(&text, delimiter)?;
        let column_count = raw.headers.len();
        let outcome = transform::detect_and_transform(raw);

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        let source = SourceMetadata {
            hash,
            size_bytes: bytes.len(),
            format,
            row_count: outcome.rows.len(),
            column_count,
            loaded_at: Utc::now(),
        };

        info!(
            rows = source.row_count,
            columns = source.column_count,
            format = %source.format,
            input_format = outcome.format.as_str(),
            anomalies = outcome.anomalies.len(),
            "input loaded"
        );

        Ok(CampaignTable {
            headers: outcome.headers,
            rows: outcome.rows,
            anomalies: outcome.anomalies,
            format: outcome.format,
            source,
        })
    }

    /// Parse decoded text into a raw string grid.
    fn parse_text(&self, text: &str, delimiter: u8) -> Result<RawTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(false)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_header)
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(AdlensError::EmptyData("no header row found".to_string()));
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(|s| s.to_string()).collect());
        }

        Ok(RawTable { headers, records })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode input bytes, falling back to Latin-1 when not valid UTF-8.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Normalize a header: trim, lowercase, spaces to underscores.
fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Parse a cell as an integer, accepting integral floats ("50.0").
pub(crate) fn coerce_int(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

/// Parse a cell as a float.
pub(crate) fn coerce_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(text: &str) -> Result<u8> {
    let lines: Vec<&str> = text
        .lines()
        .take(10)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AdlensError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent count across lines beats a raw occurrence count.
        // Tab gets a slight bonus as it is rare inside actual values.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + usize::from(delim == b'\t') * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
