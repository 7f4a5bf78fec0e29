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


//! Quarterly-loss pass: flags companies that reported a losing quarter

use std::path::PathBuf;
use tracing::info;
use vs_core::types::CompanyUpdate;

use super::{read_optional_source, validate_optional_source};
use crate::loader::{ImportContext, ImportPass};
use crate::{LoaderResult, PassStats};

pub struct QuarterlyLossPass {
  path: PathBuf,
}

impl QuarterlyLossPass {
  pub const NAME: &'static str = "quarterly_loss";

  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl ImportPass for QuarterlyLossPass {
  fn name(&self) -> &'static str {
    Self::NAME
  }

  fn validate(&self) -> LoaderResult<()> {
    validate_optional_source(&self.path)
  }

  fn apply(&self, context: &mut ImportContext<'_>) -> LoaderResult<PassStats> {
    let Some(source) = read_optional_source(&self.path, Self::NAME)? else {
      return Ok(PassStats::missing(Self::NAME));
    };

    let mut stats =
      PassStats { files: 1, malformed: source.malformed, ..PassStats::new(Self::NAME) };
    let update = CompanyUpdate::quarter_loss(true);
    let pb = context.progress_bar(source.records.len(), Self::NAME);

    // Companies absent from the file keep whatever flag they had
    for record in &source.records {
      context.register(record, &update)?;
      stats.loaded += 1;
      pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Flagged {} companies with a quarterly loss", stats.loaded);
    Ok(stats)
  }
}
