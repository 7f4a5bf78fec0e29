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


//! Base trait and shared state for the import passes

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use vs_core::types::{CompanyUpdate, SourceRecord};
use vs_core::{Config, DEFAULT_MARKET};
use vs_database_postgres::CompanyRegistry;

use crate::{LoaderResult, PassStats};

/// Configuration for an import run
#[derive(Debug, Clone)]
pub struct ImportConfig {
  /// Market assigned to symbols without an exchange suffix
  pub default_market: String,

  /// Enable progress bars
  pub show_progress: bool,
}

impl Default for ImportConfig {
  fn default() -> Self {
    Self { default_market: DEFAULT_MARKET.to_string(), show_progress: true }
  }
}

impl ImportConfig {
  pub fn from_config(config: &Config) -> Self {
    Self { default_market: config.default_market.clone(), ..Self::default() }
  }
}

/// State shared by the passes of one import
pub struct ImportContext<'r> {
  pub registry: &'r mut dyn CompanyRegistry,
  pub config: ImportConfig,
  /// Companies the dividend pass deferred during this run
  pub deferred_names: HashSet<String>,
}

impl<'r> ImportContext<'r> {
  pub fn new(registry: &'r mut dyn CompanyRegistry, config: ImportConfig) -> Self {
    Self { registry, config, deferred_names: HashSet::new() }
  }

  /// Guarantee company, market and listing for `record` and apply `update`
  pub fn register(&mut self, record: &SourceRecord, update: &CompanyUpdate) -> LoaderResult<i32> {
    Ok(self.registry.register(record, &self.config.default_market, update)?)
  }

  /// A progress bar over `len` rows, hidden when progress is disabled
  pub fn progress_bar(&self, len: usize, label: &str) -> ProgressBar {
    if !self.config.show_progress {
      return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
      .template("{spinner:.green} {prefix} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
      pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_prefix(label.to_string());
    pb
  }
}

/// One step of the exclusion import
pub trait ImportPass: Send + Sync {
  /// Pass name for logging and the import report
  fn name(&self) -> &'static str;

  /// Check inputs before any pass writes to the registry
  fn validate(&self) -> LoaderResult<()> {
    Ok(())
  }

  /// Apply this pass's rows to the registry
  fn apply(&self, context: &mut ImportContext<'_>) -> LoaderResult<PassStats>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use vs_database_postgres::MemoryRegistry;

  #[test]
  fn test_import_config_default() {
    let config = ImportConfig::default();
    assert_eq!(config.default_market, "US");
    assert!(config.show_progress);
  }

  #[test]
  fn test_import_config_from_config() {
    let core = Config::from_lookup(|key| (key == "VS_DEFAULT_MARKET").then(|| "DE".to_string()))
      .unwrap();
    let config = ImportConfig::from_config(&core);
    assert_eq!(config.default_market, "DE");
  }

  #[test]
  fn test_context_register_uses_default_market() {
    let mut registry = MemoryRegistry::new();
    let config = ImportConfig { show_progress: false, ..ImportConfig::default() };
    let mut context = ImportContext::new(&mut registry, config);

    let record = SourceRecord::new("ACME", "Acme Corp").unwrap();
    context.register(&record, &CompanyUpdate::none()).unwrap();
    assert!(context.progress_bar(10, "test").is_hidden());

    let listing = registry.find_listing("ACME").unwrap().unwrap();
    assert_eq!(listing.market, "US");
  }
}
