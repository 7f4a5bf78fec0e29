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


//! What an import did, pass by pass

use chrono::{DateTime, Utc};
use serde::Serialize;
use vs_database_postgres::RegistrySummary;

/// Counters for one import pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
  pub name: String,
  /// Source files read
  pub files: usize,
  /// Rows that applied their update
  pub loaded: usize,
  /// Rows whose update was skipped; their listing is still guaranteed
  pub skipped: usize,
  /// Rows without a symbol or name
  pub malformed: usize,
  /// The optional source file was absent
  pub missing: bool,
}

impl PassStats {
  pub fn new(name: &str) -> Self {
    Self { name: name.to_string(), ..Self::default() }
  }

  pub fn missing(name: &str) -> Self {
    Self { missing: true, ..Self::new(name) }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
  pub started_at: DateTime<Utc>,
  pub finished_at: Option<DateTime<Utc>>,
  pub passes: Vec<PassStats>,
  /// Registry counts after the last pass
  pub summary: RegistrySummary,
}

impl ImportReport {
  pub fn start() -> Self {
    Self {
      started_at: Utc::now(),
      finished_at: None,
      passes: Vec::new(),
      summary: RegistrySummary::default(),
    }
  }

  pub fn record(&mut self, stats: PassStats) {
    self.passes.push(stats);
  }

  pub fn complete(&mut self, summary: RegistrySummary) {
    self.summary = summary;
    self.finished_at = Some(Utc::now());
  }

  pub fn pass(&self, name: &str) -> Option<&PassStats> {
    self.passes.iter().find(|stats| stats.name == name)
  }

  pub fn total_loaded(&self) -> usize {
    self.passes.iter().map(|stats| stats.loaded).sum()
  }
}
