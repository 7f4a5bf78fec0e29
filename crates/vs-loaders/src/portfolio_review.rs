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


//! Review of the current holdings against the screen's valuation measures

use serde::Serialize;

use crate::csv_processor::{CsvProcessor, PbRow, PeRow};
use crate::screening::{compare_scores, merge_snapshots, ScreenRow};
use crate::sources::{PortfolioView, SourceLayout};
use crate::LoaderResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewThresholds {
  pub pe: f64,
  pub pb: f64,
}

impl Default for ReviewThresholds {
  fn default() -> Self {
    Self { pe: 10.0, pb: 1.0 }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioReview {
  /// Holdings reporting negative earnings, in export order
  pub negative_eps: Vec<ScreenRow>,
  /// Holdings above either threshold, most expensive first
  pub expensive: Vec<ScreenRow>,
  pub holdings: usize,
}

impl PortfolioReview {
  pub fn build(fund_rows: &[PeRow], fin_rows: &[PbRow], thresholds: ReviewThresholds) -> Self {
    let merged = merge_snapshots(fund_rows, fin_rows);

    let negative_eps =
      merged.iter().filter(|row| row.eps.is_some_and(|eps| eps < 0.0)).cloned().collect();

    let mut expensive: Vec<ScreenRow> = merged
      .iter()
      .filter(|row| {
        row.pe.is_some_and(|pe| pe > thresholds.pe) || row.pb.is_some_and(|pb| pb > thresholds.pb)
      })
      .cloned()
      .collect();
    // descending, unscored rows still last
    expensive.sort_by(|a, b| match (a.pe_pb, b.pe_pb) {
      (Some(_), Some(_)) => compare_scores(b.pe_pb, a.pe_pb),
      _ => compare_scores(a.pe_pb, b.pe_pb),
    });

    Self { negative_eps, expensive, holdings: merged.len() }
  }

  /// Read both portfolio exports from the downloads directory
  pub fn load(layout: &SourceLayout, thresholds: ReviewThresholds) -> LoaderResult<Self> {
    let processor = CsvProcessor::new();
    let fund = processor.read_pe_snapshot(layout.portfolio_file(PortfolioView::Fund))?;
    let fin = processor.read_pb_snapshot(layout.portfolio_file(PortfolioView::Fin))?;
    Ok(Self::build(&fund, &fin, thresholds))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn fund(symbol: &str, pe: Option<f64>, eps: Option<f64>) -> PeRow {
    PeRow { symbol: symbol.to_string(), name: format!("{symbol} Corp"), pe, eps }
  }

  fn fin(symbol: &str, pb: Option<f64>) -> PbRow {
    PbRow { symbol: symbol.to_string(), pb, piotroski: None }
  }

  #[test]
  fn test_review_flags_losses_and_expensive_holdings() {
    let fund_rows = vec![
      fund("CHEAP", Some(5.0), Some(2.0)),
      fund("HIGHPE", Some(20.0), Some(1.0)),
      fund("HIGHPB", Some(8.0), Some(1.0)),
      fund("LOSS", None, Some(-0.5)),
    ];
    let fin_rows = vec![
      fin("CHEAP", Some(0.5)),
      fin("HIGHPE", Some(0.9)),
      fin("HIGHPB", Some(3.0)),
      fin("LOSS", Some(2.0)),
    ];

    let review = PortfolioReview::build(&fund_rows, &fin_rows, ReviewThresholds::default());

    let losses: Vec<&str> = review.negative_eps.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(losses, vec!["LOSS"]);

    // HIGHPB scores 24, HIGHPE 18, LOSS has no score
    let expensive: Vec<&str> = review.expensive.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(expensive, vec!["HIGHPB", "HIGHPE", "LOSS"]);
    assert_eq!(review.holdings, 4);
  }

  #[test]
  fn test_review_thresholds_are_configurable() {
    let fund_rows = vec![fund("A", Some(12.0), Some(1.0))];
    let fin_rows = vec![fin("A", Some(0.5))];

    let lenient = ReviewThresholds { pe: 15.0, pb: 1.0 };
    assert!(PortfolioReview::build(&fund_rows, &fin_rows, lenient).expensive.is_empty());
    let strict = PortfolioReview::build(&fund_rows, &fin_rows, ReviewThresholds::default());
    assert_eq!(strict.expensive.len(), 1);
  }

  #[test]
  fn test_review_load_from_exports() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("portfolio_fund.csv"), "Symbol,Name,P / E,EPS\nA,Alpha,25,-1\n").unwrap();
    std::fs::write(dir.path().join("portfolio_fin.csv"), "Symbol,Name,Price / Book Ratio\nA,Alpha,2\n").unwrap();
    let layout = SourceLayout::new(dir.path(), dir.path());

    let review = PortfolioReview::load(&layout, ReviewThresholds::default()).unwrap();
    assert_eq!(review.negative_eps.len(), 1);
    assert_eq!(review.expensive[0].pe_pb, Some(50.0));
  }
}
