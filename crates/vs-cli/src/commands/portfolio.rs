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


use anyhow::Result;
use clap::Args;
use vs_core::Config;
use vs_loaders::screening::ScreenRow;
use vs_loaders::{PortfolioReview, ReviewThresholds, SourceLayout};

use super::{format_ratio, truncate};

#[derive(Args, Debug)]
pub struct PortfolioArgs {
  /// P/E above which a holding counts as expensive
  #[arg(long, default_value = "10.0")]
  pub pe_threshold: f64,

  /// P/B above which a holding counts as expensive
  #[arg(long, default_value = "1.0")]
  pub pb_threshold: f64,

  /// Print the review as JSON
  #[arg(long)]
  pub json: bool,
}

pub fn execute(args: PortfolioArgs, config: Config) -> Result<()> {
  let layout = SourceLayout::from_config(&config);
  let thresholds = ReviewThresholds { pe: args.pe_threshold, pb: args.pb_threshold };
  let review = PortfolioReview::load(&layout, thresholds)?;

  if args.json {
    println!("{}", serde_json::to_string_pretty(&review)?);
    return Ok(());
  }

  println!("💼 Portfolio Review ({} holdings)", review.holdings);
  println!("================================");

  if review.negative_eps.is_empty() {
    println!("\n✅ No holdings with negative EPS");
  } else {
    println!("\n⚠️  Negative EPS ({}):", review.negative_eps.len());
    print_rows(&review.negative_eps);
  }

  if review.expensive.is_empty() {
    println!("\n✅ No holdings above P/E {} or P/B {}", thresholds.pe, thresholds.pb);
  } else {
    println!(
      "\n💸 Above P/E {} or P/B {} ({}):",
      thresholds.pe,
      thresholds.pb,
      review.expensive.len()
    );
    print_rows(&review.expensive);
  }

  Ok(())
}

fn print_rows(rows: &[ScreenRow]) {
  for row in rows {
    println!(
      "  {:<12} {:<32} {} {} {} {}",
      row.symbol,
      truncate(&row.name, 32),
      format_ratio(row.pe),
      format_ratio(row.pb),
      format_ratio(row.eps),
      format_ratio(row.pe_pb)
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn config_for(dir: &TempDir) -> Config {
    let downloads = dir.path().to_string_lossy().to_string();
    Config::from_lookup(|key| (key == "VS_DOWNLOADS_DIR").then(|| downloads.clone())).unwrap()
  }

  fn args() -> PortfolioArgs {
    PortfolioArgs { pe_threshold: 10.0, pb_threshold: 1.0, json: false }
  }

  #[test]
  fn test_portfolio_review_from_exports() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("portfolio_fund.csv"), "Symbol,Name,P / E,EPS\nA,Alpha,12,-1\n")
      .unwrap();
    std::fs::write(dir.path().join("portfolio_fin.csv"), "Symbol,Name,Price / Book Ratio\nA,Alpha,2\n")
      .unwrap();

    assert!(execute(args(), config_for(&dir)).is_ok());
  }

  #[test]
  fn test_portfolio_review_requires_exports() {
    let dir = TempDir::new().unwrap();
    let err = execute(args(), config_for(&dir)).unwrap_err();
    assert!(err.to_string().contains("portfolio_fund.csv"));
  }
}
