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


//! Typed readers for the screener CSV exports
//!
//! Every file is read whole, decoded as UTF-8 with a Latin-1 fallback (the
//! portfolio exports are not UTF-8), checked for its required headers and then
//! deserialized row by row. A row that cannot be read is counted as malformed
//! and skipped; a missing header fails the whole file.

use csv::{Reader, ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};
use vs_core::types::{normalize_company_name, SourceRecord};

use crate::{LoaderError, LoaderResult};

pub const SYMBOL_COLUMN: &str = "Symbol";
pub const NAME_COLUMN: &str = "Name";
pub const PE_COLUMN: &str = "P / E";
pub const EPS_COLUMN: &str = "EPS";
pub const PB_COLUMN: &str = "Price / Book Ratio";
pub const PIOTROSKI_COLUMN: &str = "Piotroski F-Score";

/// Headers a P/E snapshot must carry
pub const PE_COLUMNS: &[&str] = &[SYMBOL_COLUMN, NAME_COLUMN, PE_COLUMN, EPS_COLUMN];
/// Headers a P/B snapshot must carry
pub const PB_COLUMNS: &[&str] = &[SYMBOL_COLUMN, PB_COLUMN];
/// Headers every exclusion source and portfolio export must carry
pub const SOURCE_COLUMNS: &[&str] = &[SYMBOL_COLUMN, NAME_COLUMN];

/// One row of the P/E snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeRow {
  pub symbol: String,
  pub name: String,
  pub pe: Option<f64>,
  pub eps: Option<f64>,
}

/// One row of the P/B snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PbRow {
  pub symbol: String,
  pub pb: Option<f64>,
  pub piotroski: Option<f64>,
}

/// The usable rows of one exclusion source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceFile {
  pub records: Vec<SourceRecord>,
  pub malformed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CsvProcessor;

impl CsvProcessor {
  pub fn new() -> Self {
    Self
  }

  /// Fail with `SchemaMismatch` unless every `required` header is present.
  pub fn check_schema<P: AsRef<Path>>(&self, path: P, required: &[&str]) -> LoaderResult<()> {
    self.open(path.as_ref(), required).map(|_| ())
  }

  /// Parse a P/E snapshot (`PE.csv` or `portfolio_fund.csv`)
  pub fn read_pe_snapshot<P: AsRef<Path>>(&self, path: P) -> LoaderResult<Vec<PeRow>> {
    let path = path.as_ref();
    let reader = self.open(path, PE_COLUMNS)?;
    let (raw, malformed) = rows::<RawPeRecord>(reader, path);

    let mut snapshot = Vec::with_capacity(raw.len());
    let mut skipped = malformed;
    for record in raw {
      let symbol = record.symbol.trim();
      if symbol.is_empty() {
        skipped += 1;
        continue;
      }
      snapshot.push(PeRow {
        symbol: symbol.to_string(),
        name: normalize_company_name(&record.name),
        pe: parse_number(&record.pe),
        eps: parse_number(&record.eps),
      });
    }

    log_skipped(path, skipped);
    warn_duplicates(path, snapshot.iter().map(|row| row.symbol.as_str()));
    Ok(snapshot)
  }

  /// Parse a P/B snapshot (`PB.csv` or `portfolio_fin.csv`)
  pub fn read_pb_snapshot<P: AsRef<Path>>(&self, path: P) -> LoaderResult<Vec<PbRow>> {
    let path = path.as_ref();
    let reader = self.open(path, PB_COLUMNS)?;
    let (raw, malformed) = rows::<RawPbRecord>(reader, path);

    let mut snapshot = Vec::with_capacity(raw.len());
    let mut skipped = malformed;
    for record in raw {
      let symbol = record.symbol.trim();
      if symbol.is_empty() {
        skipped += 1;
        continue;
      }
      snapshot.push(PbRow {
        symbol: symbol.to_string(),
        pb: parse_number(&record.pb),
        piotroski: record.piotroski.as_deref().and_then(parse_number),
      });
    }

    log_skipped(path, skipped);
    warn_duplicates(path, snapshot.iter().map(|row| row.symbol.as_str()));
    Ok(snapshot)
  }

  /// Parse an exclusion source or portfolio export into (symbol, company) pairs
  pub fn read_source_records<P: AsRef<Path>>(&self, path: P) -> LoaderResult<SourceFile> {
    let path = path.as_ref();
    let reader = self.open(path, SOURCE_COLUMNS)?;
    let (raw, mut malformed) = rows::<RawSourceRecord>(reader, path);

    let mut records = Vec::with_capacity(raw.len());
    for record in raw {
      match SourceRecord::new(&record.symbol, &record.name) {
        Some(record) => records.push(record),
        None => malformed += 1,
      }
    }

    log_skipped(path, malformed);
    Ok(SourceFile { records, malformed })
  }

  /// Only the non-empty `Symbol` cells of a file
  pub fn read_symbols<P: AsRef<Path>>(&self, path: P) -> LoaderResult<HashSet<String>> {
    let path = path.as_ref();
    let mut reader = self.open(path, &[SYMBOL_COLUMN])?;
    let index = reader.headers()?.iter().position(|h| h == SYMBOL_COLUMN).unwrap_or(0);

    let mut symbols = HashSet::new();
    for result in reader.records() {
      let Ok(record) = result else { continue };
      if let Some(symbol) = record.get(index).filter(|s| !s.is_empty()) {
        symbols.insert(symbol.to_string());
      }
    }

    Ok(symbols)
  }

  fn open(&self, path: &Path, required: &[&str]) -> LoaderResult<Reader<Cursor<Vec<u8>>>> {
    if !path.is_file() {
      return Err(LoaderError::SourceNotFound(path.display().to_string()));
    }

    let text = decode(std::fs::read(path)?);
    let mut reader = ReaderBuilder::new()
      .trim(Trim::All)
      .flexible(true)
      .from_reader(Cursor::new(text.into_bytes()));

    let headers = reader.headers()?;
    if let Some(column) = required.iter().find(|column| !headers.iter().any(|h| h == **column)) {
      return Err(LoaderError::SchemaMismatch {
        file: path.display().to_string(),
        column: column.to_string(),
      });
    }

    Ok(reader)
  }
}

/// Lenient numeric cell: blanks, dashes and `N/A` are missing values,
/// thousands separators and a trailing percent sign are ignored.
pub fn parse_number(raw: &str) -> Option<f64> {
  let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
  let cleaned = cleaned.trim_end_matches('%').trim();
  if cleaned.is_empty()
    || cleaned.chars().all(|c| c == '-')
    || cleaned.eq_ignore_ascii_case("n/a")
    || cleaned.eq_ignore_ascii_case("na")
  {
    return None;
  }
  cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn decode(bytes: Vec<u8>) -> String {
  let mut text = match String::from_utf8(bytes) {
    Ok(text) => text,
    // Latin-1 maps every byte to the code point of the same value
    Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
  };
  if text.starts_with('\u{feff}') {
    text.drain(..'\u{feff}'.len_utf8());
  }
  text
}

fn rows<T: DeserializeOwned>(mut reader: Reader<Cursor<Vec<u8>>>, path: &Path) -> (Vec<T>, usize) {
  let mut parsed = Vec::new();
  let mut malformed = 0;
  for (line, result) in reader.deserialize::<T>().enumerate() {
    match result {
      Ok(record) => parsed.push(record),
      Err(err) => {
        debug!("{}: skipping row {}: {}", path.display(), line + 2, err);
        malformed += 1;
      }
    }
  }
  (parsed, malformed)
}

fn log_skipped(path: &Path, skipped: usize) {
  if skipped > 0 {
    debug!("{}: skipped {} malformed rows", path.display(), skipped);
  }
}

fn warn_duplicates<'a>(path: &Path, symbols: impl Iterator<Item = &'a str>) {
  let mut seen = HashSet::new();
  let duplicates: Vec<&str> = symbols.filter(|symbol| !seen.insert(*symbol)).collect();
  if !duplicates.is_empty() {
    warn!("{}: {} duplicate symbols, e.g. {}", path.display(), duplicates.len(), duplicates[0]);
  }
}

#[derive(Debug, Deserialize)]
struct RawPeRecord {
  #[serde(rename = "Symbol")]
  symbol: String,

  #[serde(rename = "Name")]
  name: String,

  #[serde(rename = "P / E")]
  pe: String,

  #[serde(rename = "EPS")]
  eps: String,
}

#[derive(Debug, Deserialize)]
struct RawPbRecord {
  #[serde(rename = "Symbol")]
  symbol: String,

  #[serde(rename = "Price / Book Ratio")]
  pb: String,

  #[serde(rename = "Piotroski F-Score", default)]
  piotroski: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSourceRecord {
  #[serde(rename = "Symbol")]
  symbol: String,

  #[serde(rename = "Name")]
  name: String,
}
