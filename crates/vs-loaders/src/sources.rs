//! Where each input file lives
//!
//! Market snapshots and portfolio exports are downloaded into one directory,
//! the curated exclusion sources are kept in another.

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::warn;
use vs_core::Config;

use crate::{LoaderError, LoaderResult};

pub const PE_FILE: &str = "PE.csv";
pub const PB_FILE: &str = "PB.csv";
pub const DISQUALIFIED_FILE: &str = "disqualified.csv";
pub const QUARTERLY_LOSS_FILE: &str = "with_quartal_loss.csv";

const DIVIDEND_FILE_PATTERN: &str = r"^(\d{4})_first_dividend\.csv$";

/// The two views a portfolio is exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortfolioView {
  /// Fundamentals: carries `P / E` and `EPS`
  Fund,
  /// Financials: carries `Price / Book Ratio`
  Fin,
}

impl PortfolioView {
  pub fn as_str(&self) -> &'static str {
    match self {
      PortfolioView::Fund => "fund",
      PortfolioView::Fin => "fin",
    }
  }

  pub fn file_name(&self) -> String {
    format!("portfolio_{}.csv", self.as_str())
  }
}

impl fmt::Display for PortfolioView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A `<year>_first_dividend.csv` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DividendFile {
  pub year: i32,
  pub path: PathBuf,
}

/// Every `<year>_first_dividend.csv` in `dir`, oldest year first.
///
/// A missing directory yields no files.
pub fn dividend_files(dir: &Path) -> LoaderResult<Vec<DividendFile>> {
  if !dir.is_dir() {
    warn!("Import directory {} does not exist", dir.display());
    return Ok(Vec::new());
  }

  let pattern = Regex::new(DIVIDEND_FILE_PATTERN)
    .map_err(|e| LoaderError::ConfigurationError(format!("Invalid file pattern: {}", e)))?;

  let mut files = Vec::new();
  for entry in std::fs::read_dir(dir)? {
    let entry = entry?;
    let file_name = entry.file_name();
    let Some(name) = file_name.to_str() else { continue };
    let Some(year) = pattern
      .captures(name)
      .and_then(|captures| captures.get(1))
      .and_then(|year| year.as_str().parse::<i32>().ok())
    else {
      continue;
    };
    if entry.path().is_file() {
      files.push(DividendFile { year, path: entry.path() });
    }
  }

  files.sort_by_key(|file| file.year);
  Ok(files)
}

/// `portfolio_<view>.csv` inside `dir`
pub fn portfolio_file(dir: &Path, view: PortfolioView) -> PathBuf {
  dir.join(view.file_name())
}

/// The two input directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
  pub downloads_dir: PathBuf,
  pub import_dir: PathBuf,
}

impl SourceLayout {
  pub fn new(downloads_dir: impl Into<PathBuf>, import_dir: impl Into<PathBuf>) -> Self {
    Self { downloads_dir: downloads_dir.into(), import_dir: import_dir.into() }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(&config.downloads_dir, &config.import_dir)
  }

  pub fn pe_file(&self) -> PathBuf {
    self.downloads_dir.join(PE_FILE)
  }

  pub fn pb_file(&self) -> PathBuf {
    self.downloads_dir.join(PB_FILE)
  }

  pub fn portfolio_file(&self, view: PortfolioView) -> PathBuf {
    portfolio_file(&self.downloads_dir, view)
  }

  pub fn disqualified_file(&self) -> PathBuf {
    self.import_dir.join(DISQUALIFIED_FILE)
  }

  pub fn quarterly_loss_file(&self) -> PathBuf {
    self.import_dir.join(QUARTERLY_LOSS_FILE)
  }

  pub fn dividend_files(&self) -> LoaderResult<Vec<DividendFile>> {
    dividend_files(&self.import_dir)
  }
}
