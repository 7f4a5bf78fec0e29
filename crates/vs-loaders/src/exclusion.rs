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


//! Which listings and company names are barred from screening

use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};
use vs_core::types::normalize_company_name;
use vs_database_postgres::CompanyRegistry;

use crate::csv_processor::CsvProcessor;
use crate::sources::{PortfolioView, SourceLayout};
use crate::LoaderResult;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSet {
  pub symbols: HashSet<String>,
  pub names: HashSet<String>,
}

impl ExclusionSet {
  pub fn excludes_symbol(&self, symbol: &str) -> bool {
    self.symbols.contains(symbol)
  }

  /// Registry names are whitespace-collapsed, so `name` is compared the same way
  pub fn excludes_name(&self, name: &str) -> bool {
    self.names.contains(&normalize_company_name(name))
  }

  pub fn is_empty(&self) -> bool {
    self.symbols.is_empty() && self.names.is_empty()
  }

  pub fn sorted_symbols(&self) -> Vec<&str> {
    let mut symbols: Vec<&str> = self.symbols.iter().map(String::as_str).collect();
    symbols.sort_unstable();
    symbols
  }

  pub fn sorted_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

/// Resolves exclusions from the registry as of one instant
#[derive(Debug, Clone, Copy)]
pub struct ExclusionResolver {
  at: NaiveDateTime,
}

impl ExclusionResolver {
  pub fn new(at: NaiveDateTime) -> Self {
    Self { at }
  }

  pub fn now() -> Self {
    Self::new(Utc::now().naive_utc())
  }

  pub fn at(&self) -> NaiveDateTime {
    self.at
  }

  /// Registry exclusions plus the symbols of the current portfolio export.
  ///
  /// A listing is excluded when its company is disqualified, deferred past
  /// `at`, held in the portfolio, or its market is closed past `at`.
  pub fn resolve(
    &self,
    registry: &mut dyn CompanyRegistry,
    portfolio_symbols: &HashSet<String>,
  ) -> LoaderResult<ExclusionSet> {
    let mut symbols = registry.excluded_symbols(self.at)?;
    let from_registry = symbols.len();
    symbols.extend(portfolio_symbols.iter().cloned());
    let names = registry.excluded_company_names(self.at)?;

    debug!(
      "{} symbols excluded by the registry, {} after adding the portfolio, {} names",
      from_registry,
      symbols.len(),
      names.len()
    );
    Ok(ExclusionSet { symbols, names })
  }
}

/// Symbols of the downloaded portfolio export; empty if there is none
pub fn portfolio_symbols(layout: &SourceLayout) -> LoaderResult<HashSet<String>> {
  let path = layout.portfolio_file(PortfolioView::Fin);
  if !path.is_file() {
    info!("{} not found, no portfolio exclusions", path.display());
    return Ok(HashSet::new());
  }
  CsvProcessor::new().read_symbols(&path)
}

/// Exclusions read straight from the source files, without the registry
pub struct FileExclusions;

impl FileExclusions {
  /// First-dividend files this many years back are still honoured
  pub const LOOKBACK_YEARS: i32 = 10;

  /// Symbols from `disqualified.csv`, the portfolio export and the
  /// first-dividend files of the years before `current_year`.
  /// Company names are not collected.
  pub fn collect(layout: &SourceLayout, current_year: i32) -> LoaderResult<ExclusionSet> {
    let processor = CsvProcessor::new();
    let mut symbols = portfolio_symbols(layout)?;

    let disqualified = layout.disqualified_file();
    if disqualified.is_file() {
      symbols.extend(processor.read_symbols(&disqualified)?);
    } else {
      info!("{} not found", disqualified.display());
    }

    let window = (current_year - Self::LOOKBACK_YEARS)..current_year;
    for file in layout.dividend_files()?.into_iter().filter(|f| window.contains(&f.year)) {
      symbols.extend(processor.read_symbols(&file.path)?);
    }

    info!("{} symbols excluded by source files", symbols.len());
    Ok(ExclusionSet { symbols, names: HashSet::new() })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;
  use tempfile::TempDir;
  use vs_core::test_utils::instant;
  use vs_core::types::{CompanyUpdate, SourceRecord};
  use vs_database_postgres::MemoryRegistry;

  fn layout(dir: &TempDir) -> SourceLayout {
    SourceLayout::new(dir.path(), dir.path())
  }

  fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
  }

  fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn test_resolve_unions_registry_and_portfolio() {
    let mut registry = MemoryRegistry::new();
    let record = SourceRecord::new("DQ", "Disqualified Inc").unwrap();
    registry.register(&record, "US", &CompanyUpdate::disqualified("unknown")).unwrap();
    let record = SourceRecord::new("FREE", "Free Co").unwrap();
    registry.register(&record, "US", &CompanyUpdate::none()).unwrap();

    let resolver = ExclusionResolver::new(instant(2025, 6, 1));
    let exclusions = resolver.resolve(&mut registry, &set(&["HELD"])).unwrap();

    assert_eq!(exclusions.symbols, set(&["DQ", "HELD"]));
    assert_eq!(exclusions.names, set(&["Disqualified Inc"]));
    assert!(!exclusions.excludes_symbol("FREE"));
  }

  #[test]
  fn test_resolve_respects_deferral_horizon() {
    let mut registry = MemoryRegistry::new();
    let record = SourceRecord::new("DEF", "Deferred Inc").unwrap();
    registry
      .register(&record, "US", &CompanyUpdate::deferred(instant(2025, 1, 1), "UNKNOWN"))
      .unwrap();

    let before = ExclusionResolver::new(instant(2024, 12, 31));
    assert!(before.resolve(&mut registry, &HashSet::new()).unwrap().excludes_symbol("DEF"));

    let on_horizon = ExclusionResolver::new(instant(2025, 1, 1));
    assert!(on_horizon.resolve(&mut registry, &HashSet::new()).unwrap().is_empty());
  }

  #[test]
  fn test_excludes_name_collapses_whitespace() {
    let exclusions = ExclusionSet { symbols: HashSet::new(), names: set(&["Acme Holdings"]) };
    assert!(exclusions.excludes_name("Acme  Holdings"));
    assert!(exclusions.excludes_name(" Acme\tHoldings "));
    assert!(!exclusions.excludes_name("Acme Holdings AG"));
  }

  #[test]
  fn test_portfolio_symbols_from_export() {
    let dir = TempDir::new().unwrap();
    assert!(portfolio_symbols(&layout(&dir)).unwrap().is_empty());

    write(dir.path(), "portfolio_fin.csv", "Symbol,Name,Price / Book Ratio\nAAA,Alpha,1.1\n");
    assert_eq!(portfolio_symbols(&layout(&dir)).unwrap(), set(&["AAA"]));
  }

  #[test]
  fn test_file_exclusions_window() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "disqualified.csv", "Symbol,Name\nDQ,Disqualified\n");
    write(dir.path(), "portfolio_fin.csv", "Symbol,Name\nHELD,Held\n");
    write(dir.path(), "2014_first_dividend.csv", "Symbol,Name\nOLD,Old Payer\n");
    write(dir.path(), "2015_first_dividend.csv", "Symbol,Name\nMID,Mid Payer\n");
    write(dir.path(), "2025_first_dividend.csv", "Symbol,Name\nNEW,New Payer\n");

    let exclusions = FileExclusions::collect(&layout(&dir), 2025).unwrap();

    assert_eq!(exclusions.symbols, set(&["DQ", "HELD", "MID"]));
    assert!(exclusions.names.is_empty());
    assert_eq!(exclusions.sorted_symbols(), vec!["DQ", "HELD", "MID"]);
  }
}
