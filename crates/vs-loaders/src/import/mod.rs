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


//! Batch reconciliation of the exclusion sources into the company registry
//!
//! Passes run in a fixed order: first dividend, disqualified, quarterly loss,
//! portfolio. Every source is schema-checked before the first write, so a bad
//! header never leaves a half-applied import behind. Atomicity across passes
//! is the caller's transaction.

mod disqualified;
mod dividend;
mod portfolio;
mod quarterly_loss;

pub use disqualified::DisqualifiedPass;
pub use dividend::DividendPass;
pub use portfolio::PortfolioPass;
pub use quarterly_loss::QuarterlyLossPass;

use std::path::Path;
use tracing::info;
use vs_database_postgres::CompanyRegistry;

use crate::csv_processor::{CsvProcessor, SourceFile, SOURCE_COLUMNS};
use crate::loader::{ImportConfig, ImportContext, ImportPass};
use crate::sources::{PortfolioView, SourceLayout};
use crate::{ImportReport, LoaderResult};

pub struct ExclusionImporter {
  config: ImportConfig,
  passes: Vec<Box<dyn ImportPass>>,
}

impl ExclusionImporter {
  /// An importer without passes
  pub fn new(config: ImportConfig) -> Self {
    Self { config, passes: Vec::new() }
  }

  /// The four standard passes over the files in `layout`
  pub fn standard(config: ImportConfig, layout: &SourceLayout) -> LoaderResult<Self> {
    Ok(
      Self::new(config)
        .with_pass(DividendPass::new(layout.dividend_files()?))
        .with_pass(DisqualifiedPass::new(layout.disqualified_file()))
        .with_pass(QuarterlyLossPass::new(layout.quarterly_loss_file()))
        .with_pass(PortfolioPass::new(layout.portfolio_file(PortfolioView::Fin))),
    )
  }

  pub fn with_pass(mut self, pass: impl ImportPass + 'static) -> Self {
    self.passes.push(Box::new(pass));
    self
  }

  pub fn pass_names(&self) -> Vec<&'static str> {
    self.passes.iter().map(|pass| pass.name()).collect()
  }

  /// Run every pass against `registry`.
  ///
  /// Stops at the first error; whatever the earlier passes wrote is only
  /// discarded if the caller runs this inside a transaction.
  pub fn run(&self, registry: &mut dyn CompanyRegistry) -> LoaderResult<ImportReport> {
    for pass in &self.passes {
      pass.validate()?;
    }

    let mut report = ImportReport::start();
    let mut context = ImportContext::new(registry, self.config.clone());

    for pass in &self.passes {
      info!("Running {} pass", pass.name());
      let stats = pass.apply(&mut context)?;
      report.record(stats);
    }

    report.complete(context.registry.summary()?);
    info!(
      "Import finished: {} companies, {} listings",
      report.summary.companies, report.summary.listings
    );
    Ok(report)
  }
}

/// Schema-check an optional source if it exists
fn validate_optional_source(path: &Path) -> LoaderResult<()> {
  if path.is_file() {
    CsvProcessor::new().check_schema(path, SOURCE_COLUMNS)?;
  }
  Ok(())
}

/// Read an optional source; `None` with a notice if it is absent
fn read_optional_source(path: &Path, pass: &str) -> LoaderResult<Option<SourceFile>> {
  if !path.is_file() {
    info!("{} not found, skipping {} pass", path.display(), pass);
    return Ok(None);
  }
  CsvProcessor::new().read_source_records(path).map(Some)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::LoaderError;
  use chrono::NaiveDateTime;
  use pretty_assertions::assert_eq;
  use std::collections::HashSet;
  use tempfile::TempDir;
  use vs_core::test_utils::instant;
  use vs_core::types::{CompanyFlags, CompanyUpdate};
  use vs_database_postgres::{
    ListingInfo, MemoryRegistry, RegistrySummary, RepositoryError, RepositoryResult,
  };

  struct Fixture {
    _dir: TempDir,
    layout: SourceLayout,
  }

  impl Fixture {
    fn new() -> Self {
      let dir = TempDir::new().unwrap();
      let layout = SourceLayout::new(dir.path().join("downloads"), dir.path().join("db"));
      std::fs::create_dir_all(&layout.downloads_dir).unwrap();
      std::fs::create_dir_all(&layout.import_dir).unwrap();
      Self { _dir: dir, layout }
    }

    fn import_file(self, name: &str, contents: &str) -> Self {
      std::fs::write(self.layout.import_dir.join(name), contents).unwrap();
      self
    }

    fn download(self, name: &str, contents: &str) -> Self {
      std::fs::write(self.layout.downloads_dir.join(name), contents).unwrap();
      self
    }

    fn importer(&self) -> ExclusionImporter {
      let config = ImportConfig { show_progress: false, ..ImportConfig::default() };
      ExclusionImporter::standard(config, &self.layout).unwrap()
    }
  }

  fn flags(registry: &mut MemoryRegistry, name: &str) -> CompanyFlags {
    registry.find_company(name).unwrap().unwrap()
  }

  #[test]
  fn test_standard_pass_order() {
    let fixture = Fixture::new();
    assert_eq!(
      fixture.importer().pass_names(),
      vec!["first_dividend", "disqualified", "quarterly_loss", "portfolio"]
    );
  }

  #[test]
  fn test_first_dividend_defers_until_next_year() {
    let fixture = Fixture::new()
      .import_file("2021_first_dividend.csv", "Symbol,Name\nAAA,Alpha\nBBB.DE,Beta AG\n")
      .import_file("2019_first_dividend.csv", "Symbol,Name\nAAA.F,Alpha\n");
    let mut registry = MemoryRegistry::new();

    let report = fixture.importer().run(&mut registry).unwrap();

    // 2019 is applied first, so Alpha keeps the earlier horizon
    let alpha = flags(&mut registry, "Alpha");
    assert_eq!(alpha.dont_consider_until, Some(instant(2020, 1, 1)));
    assert_eq!(alpha.dont_consider_reason.as_deref(), Some("UNKNOWN"));
    assert_eq!(flags(&mut registry, "Beta AG").dont_consider_until, Some(instant(2022, 1, 1)));

    // the repeated name still gets its listing
    assert_eq!(registry.find_listing("AAA").unwrap().unwrap().market, "US");
    assert_eq!(registry.find_listing("AAA.F").unwrap().unwrap().market, "F");
    assert_eq!(registry.find_listing("BBB.DE").unwrap().unwrap().market, "DE");

    let stats = report.pass(DividendPass::NAME).unwrap();
    assert_eq!((stats.files, stats.loaded, stats.skipped), (2, 2, 1));
  }

  #[test]
  fn test_dividend_import_is_idempotent() {
    let fixture = Fixture::new()
      .import_file("2020_first_dividend.csv", "Symbol,Name\nAAA,Alpha\nBBB,Beta\n")
      .import_file("disqualified.csv", "Symbol,Name\nCCC,Gamma\n");
    let importer = fixture.importer();
    let mut registry = MemoryRegistry::new();

    let first = importer.run(&mut registry).unwrap();
    let alpha = flags(&mut registry, "Alpha");
    let second = importer.run(&mut registry).unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(flags(&mut registry, "Alpha"), alpha);
    assert_eq!(second.summary.listings, 3);
  }

  #[test]
  fn test_deferred_company_is_not_disqualified() {
    let fixture = Fixture::new()
      .import_file("2020_first_dividend.csv", "Symbol,Name\nAAA,Alpha\n")
      .import_file("disqualified.csv", "Symbol,Name\nAAA.L,Alpha\nCCC,Gamma\n");
    let mut registry = MemoryRegistry::new();

    let report = fixture.importer().run(&mut registry).unwrap();

    assert!(!flags(&mut registry, "Alpha").is_disqualified);
    let gamma = flags(&mut registry, "Gamma");
    assert!(gamma.is_disqualified);
    assert_eq!(gamma.disqualified_reason.as_deref(), Some("unknown"));
    assert!(registry.find_listing("AAA.L").unwrap().is_some());

    let stats = report.pass(DisqualifiedPass::NAME).unwrap();
    assert_eq!((stats.loaded, stats.skipped), (1, 1));
  }

  #[test]
  fn test_first_recorded_values_take_precedence() {
    let fixture = Fixture::new()
      .import_file("2020_first_dividend.csv", "Symbol,Name\nAAA,Alpha\n")
      .import_file("disqualified.csv", "Symbol,Name\nCCC,Gamma\n");
    let mut registry = MemoryRegistry::new();
    registry.upsert_company("Gamma", &CompanyUpdate::disqualified("accounting fraud")).unwrap();
    registry
      .upsert_company("Alpha", &CompanyUpdate::deferred(instant(2018, 1, 1), "manual"))
      .unwrap();

    fixture.importer().run(&mut registry).unwrap();

    let gamma = flags(&mut registry, "Gamma");
    assert_eq!(gamma.disqualified_reason.as_deref(), Some("accounting fraud"));
    let alpha = flags(&mut registry, "Alpha");
    assert_eq!(alpha.dont_consider_until, Some(instant(2018, 1, 1)));
    assert_eq!(alpha.dont_consider_reason.as_deref(), Some("manual"));
  }

  #[test]
  fn test_quarterly_loss_overwrites_per_row() {
    let fixture =
      Fixture::new().import_file("with_quartal_loss.csv", "Symbol,Name\nAAA,Alpha\n");
    let mut registry = MemoryRegistry::new();
    registry.upsert_company("Alpha", &CompanyUpdate::quarter_loss(false)).unwrap();
    registry.upsert_company("Beta", &CompanyUpdate::quarter_loss(true)).unwrap();
    registry.upsert_company("Gamma", &CompanyUpdate::none()).unwrap();

    fixture.importer().run(&mut registry).unwrap();

    assert!(flags(&mut registry, "Alpha").had_quarter_loss);
    // absent from the file: untouched either way
    assert!(flags(&mut registry, "Beta").had_quarter_loss);
    assert!(!flags(&mut registry, "Gamma").had_quarter_loss);
    assert_eq!(registry.quarterly_loss_symbols().unwrap(), HashSet::from(["AAA".to_string()]));
  }

  #[test]
  fn test_missing_optional_files_are_reported() {
    let fixture = Fixture::new();
    let mut registry = MemoryRegistry::new();

    let report = fixture.importer().run(&mut registry).unwrap();

    assert!(report.passes.iter().all(|stats| stats.missing));
    assert_eq!(report.summary, RegistrySummary::default());
  }

  #[test]
  fn test_malformed_rows_are_skipped() {
    let fixture = Fixture::new()
      .import_file("disqualified.csv", "Symbol,Name\n,Nameless\nBBB,\nCCC,Gamma\n");
    let mut registry = MemoryRegistry::new();

    let report = fixture.importer().run(&mut registry).unwrap();

    let stats = report.pass(DisqualifiedPass::NAME).unwrap();
    assert_eq!((stats.loaded, stats.malformed), (1, 2));
    assert_eq!(report.summary.companies, 1);
  }

  #[test]
  fn test_schema_mismatch_fails_before_any_write() {
    let fixture = Fixture::new()
      .import_file("2020_first_dividend.csv", "Symbol,Name\nAAA,Alpha\n")
      .import_file("with_quartal_loss.csv", "Ticker,Name\nBBB,Beta\n");
    let mut registry = MemoryRegistry::new();

    let err = fixture.importer().run(&mut registry).unwrap_err();

    match err {
      LoaderError::SchemaMismatch { file, column } => {
        assert!(file.ends_with("with_quartal_loss.csv"));
        assert_eq!(column, "Symbol");
      }
      other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(registry.summary().unwrap().companies, 0);
  }

  #[test]
  fn test_portfolio_tracks_current_holdings() {
    let fixture = Fixture::new().download("portfolio_fin.csv", "Symbol,Name\nAAA,Alpha\nBBB,Beta\n");
    let mut registry = MemoryRegistry::new();
    let sold = registry.upsert_company("Sold Co", &CompanyUpdate::none()).unwrap();
    registry.add_portfolio_member(sold).unwrap();

    let report = fixture.importer().run(&mut registry).unwrap();

    assert_eq!(report.summary.portfolio_members, 2);
    assert_eq!(report.pass(PortfolioPass::NAME).unwrap().loaded, 2);

    let excluded = registry.excluded_symbols(instant(2025, 1, 1)).unwrap();
    assert_eq!(excluded, HashSet::from(["AAA".to_string(), "BBB".to_string()]));
  }

  /// Delegates to a `MemoryRegistry` but refuses one listing symbol
  struct FailingRegistry<'a> {
    inner: &'a mut MemoryRegistry,
    fail_on: &'static str,
  }

  impl CompanyRegistry for FailingRegistry<'_> {
    fn upsert_company(&mut self, name: &str, update: &CompanyUpdate) -> RepositoryResult<i32> {
      self.inner.upsert_company(name, update)
    }

    fn ensure_market(&mut self, abbreviation: &str) -> RepositoryResult<i32> {
      self.inner.ensure_market(abbreviation)
    }

    fn ensure_listing(
      &mut self,
      symbol: &str,
      company_id: i32,
      market_id: i32,
    ) -> RepositoryResult<bool> {
      if symbol == self.fail_on {
        return Err(RepositoryError::QueryError("connection reset".to_string()));
      }
      self.inner.ensure_listing(symbol, company_id, market_id)
    }

    fn add_portfolio_member(&mut self, company_id: i32) -> RepositoryResult<bool> {
      self.inner.add_portfolio_member(company_id)
    }

    fn retain_portfolio_members(&mut self, keep: &[i32]) -> RepositoryResult<usize> {
      self.inner.retain_portfolio_members(keep)
    }

    fn set_market_not_tradeable_until(
      &mut self,
      abbreviation: &str,
      until: Option<NaiveDateTime>,
    ) -> RepositoryResult<()> {
      self.inner.set_market_not_tradeable_until(abbreviation, until)
    }

    fn find_company(&mut self, name: &str) -> RepositoryResult<Option<CompanyFlags>> {
      self.inner.find_company(name)
    }

    fn find_listing(&mut self, symbol: &str) -> RepositoryResult<Option<ListingInfo>> {
      self.inner.find_listing(symbol)
    }

    fn excluded_symbols(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
      self.inner.excluded_symbols(at)
    }

    fn excluded_company_names(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
      self.inner.excluded_company_names(at)
    }

    fn quarterly_loss_symbols(&mut self) -> RepositoryResult<HashSet<String>> {
      self.inner.quarterly_loss_symbols()
    }

    fn summary(&mut self) -> RepositoryResult<RegistrySummary> {
      self.inner.summary()
    }
  }

  #[test]
  fn test_registry_failure_rolls_back_whole_import() {
    let fixture = Fixture::new()
      .import_file("2020_first_dividend.csv", "Symbol,Name\nAAA,Alpha\n")
      .import_file("with_quartal_loss.csv", "Symbol,Name\nBOOM,Exploding Co\n");
    let importer = fixture.importer();
    let mut registry = MemoryRegistry::new();

    let result = registry.transaction(|inner| {
      let mut failing = FailingRegistry { inner, fail_on: "BOOM" };
      importer.run(&mut failing)
    });

    assert!(matches!(result, Err(LoaderError::DatabaseError(_))));
    assert_eq!(registry.summary().unwrap(), RegistrySummary::default());
    assert!(registry.find_company("Alpha").unwrap().is_none());
  }
}
