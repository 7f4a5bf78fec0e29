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


pub mod exclusions;
pub mod import;
pub mod market;
pub mod migrate;
pub mod portfolio;
pub mod screen;
pub mod stats;

use anyhow::{Context, Result};
use vs_core::Config;
use vs_database_postgres::DatabaseContext;

/// Connect to the registry named by `DATABASE_URL`
pub fn connect(config: &Config) -> Result<DatabaseContext> {
  let url = config.database_url()?;
  DatabaseContext::new(url).context("Failed to connect to database")
}

/// Fixed-width cell for an optional ratio
pub fn format_ratio(value: Option<f64>) -> String {
  match value {
    Some(v) => format!("{:>10.2}", v),
    None => format!("{:>10}", "-"),
  }
}

/// Cut `text` to `width` characters
pub fn truncate(text: &str, width: usize) -> String {
  if text.chars().count() <= width {
    return text.to_string();
  }
  let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
  cut.push('…');
  cut
}
