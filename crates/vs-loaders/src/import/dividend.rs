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


//! First-dividend pass: companies that only recently started paying a
//! dividend are deferred until the start of the following year.

use tracing::{debug, info};
use vs_core::types::{deferral_horizon, CompanyUpdate, DEFERRAL_REASON};

use crate::csv_processor::{CsvProcessor, SOURCE_COLUMNS};
use crate::loader::{ImportContext, ImportPass};
use crate::sources::DividendFile;
use crate::{LoaderResult, PassStats};

pub struct DividendPass {
  files: Vec<DividendFile>,
}

impl DividendPass {
  pub const NAME: &'static str = "first_dividend";

  /// `files` are applied in the given order; callers pass them oldest first
  pub fn new(files: Vec<DividendFile>) -> Self {
    Self { files }
  }
}

impl ImportPass for DividendPass {
  fn name(&self) -> &'static str {
    Self::NAME
  }

  fn validate(&self) -> LoaderResult<()> {
    let processor = CsvProcessor::new();
    for file in &self.files {
      processor.check_schema(&file.path, SOURCE_COLUMNS)?;
    }
    Ok(())
  }

  fn apply(&self, context: &mut ImportContext<'_>) -> LoaderResult<PassStats> {
    if self.files.is_empty() {
      info!("No first-dividend files found, nothing to defer");
      return Ok(PassStats::missing(Self::NAME));
    }

    let processor = CsvProcessor::new();
    let mut stats = PassStats::new(Self::NAME);

    for file in &self.files {
      let horizon = deferral_horizon(file.year)?;
      let source = processor.read_source_records(&file.path)?;
      info!(
        "Processing {} ({} rows), deferring until {}",
        file.path.display(),
        source.records.len(),
        horizon.date()
      );

      stats.files += 1;
      stats.malformed += source.malformed;
      let update = CompanyUpdate::deferred(horizon, DEFERRAL_REASON);
      let pb = context.progress_bar(source.records.len(), &file.year.to_string());

      for record in &source.records {
        if context.deferred_names.contains(&record.company_name) {
          // an earlier year already deferred this company
          context.register(record, &CompanyUpdate::none())?;
          debug!("{} already deferred in this run", record.company_name);
          stats.skipped += 1;
        } else {
          context.register(record, &update)?;
          context.deferred_names.insert(record.company_name.clone());
          stats.loaded += 1;
        }
        pb.inc(1);
      }

      pb.finish_and_clear();
    }

    info!("Deferred {} companies from {} files", stats.loaded, stats.files);
    Ok(stats)
  }
}
