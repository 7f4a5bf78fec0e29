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


//! The P/E × P/B value screen

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::csv_processor::{CsvProcessor, PbRow, PeRow};
use crate::exclusion::ExclusionSet;
use crate::sources::SourceLayout;
use crate::LoaderResult;

/// Whether rows are also removed by excluded company name.
///
/// Names are matched exactly, so a name shared by two unrelated companies
/// removes both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameExclusion {
  #[default]
  Enabled,
  Disabled,
}

impl NameExclusion {
  pub fn from_flag(enabled: bool) -> Self {
    if enabled {
      NameExclusion::Enabled
    } else {
      NameExclusion::Disabled
    }
  }
}

/// A P/E row joined with one matching P/B row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenRow {
  pub symbol: String,
  pub name: String,
  pub pe: Option<f64>,
  pub eps: Option<f64>,
  pub pb: Option<f64>,
  pub piotroski: Option<f64>,
  /// `pe * pb`; missing if either side is
  pub pe_pb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
  #[serde(flatten)]
  pub row: ScreenRow,
  pub had_quarter_loss: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScreenResult {
  pub rows: Vec<RankedRow>,
  /// Rows that survived the exclusions
  pub total: usize,
}

impl ScreenResult {
  /// At most the `n` best rows
  pub fn top(&self, n: usize) -> &[RankedRow] {
    &self.rows[..n.min(self.rows.len())]
  }
}

/// Inner join on symbol, in P/E order. A P/E row pairs with every P/B row of
/// the same symbol.
pub fn merge_snapshots(pe_rows: &[PeRow], pb_rows: &[PbRow]) -> Vec<ScreenRow> {
  let mut by_symbol: HashMap<&str, Vec<&PbRow>> = HashMap::new();
  for row in pb_rows {
    by_symbol.entry(row.symbol.as_str()).or_default().push(row);
  }

  let mut merged = Vec::new();
  for pe in pe_rows {
    let Some(matches) = by_symbol.get(pe.symbol.as_str()) else { continue };
    for pb in matches {
      merged.push(ScreenRow {
        symbol: pe.symbol.clone(),
        name: pe.name.clone(),
        pe: pe.pe,
        eps: pe.eps,
        pb: pb.pb,
        piotroski: pb.piotroski,
        pe_pb: pe.pe.zip(pb.pb).map(|(pe, pb)| pe * pb),
      });
    }
  }
  merged
}

/// Ascending with missing scores last
pub fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.total_cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Read `PE.csv` and `PB.csv`; both are required
pub fn load_snapshots(layout: &SourceLayout) -> LoaderResult<(Vec<PeRow>, Vec<PbRow>)> {
  let processor = CsvProcessor::new();
  let pe_rows = processor.read_pe_snapshot(layout.pe_file())?;
  let pb_rows = processor.read_pb_snapshot(layout.pb_file())?;
  info!("Loaded {} P/E rows and {} P/B rows", pe_rows.len(), pb_rows.len());
  Ok((pe_rows, pb_rows))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScreeningPipeline {
  name_exclusion: NameExclusion,
}

impl ScreeningPipeline {
  pub fn new(name_exclusion: NameExclusion) -> Self {
    Self { name_exclusion }
  }

  /// Join, score, filter, annotate and rank.
  ///
  /// Rows without a quarterly loss come first, then by ascending `pe_pb`;
  /// ties keep their P/E file order.
  pub fn run(
    &self,
    pe_rows: &[PeRow],
    pb_rows: &[PbRow],
    exclusions: &ExclusionSet,
    loss_symbols: &HashSet<String>,
  ) -> ScreenResult {
    let merged = merge_snapshots(pe_rows, pb_rows);
    let joined = merged.len();

    let mut rows: Vec<RankedRow> = merged
      .into_iter()
      .filter(|row| !exclusions.excludes_symbol(&row.symbol))
      .filter(|row| {
        self.name_exclusion == NameExclusion::Disabled || !exclusions.excludes_name(&row.name)
      })
      .map(|row| RankedRow { had_quarter_loss: loss_symbols.contains(&row.symbol), row })
      .collect();

    rows.sort_by(|a, b| {
      a.had_quarter_loss
        .cmp(&b.had_quarter_loss)
        .then_with(|| compare_scores(a.row.pe_pb, b.row.pe_pb))
    });

    info!("{} joined rows, {} after exclusions", joined, rows.len());
    let total = rows.len();
    ScreenResult { rows, total }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use vs_core::test_utils::{assert_approx_eq, DEFAULT_TOLERANCE};

  fn pe(symbol: &str, name: &str, pe: Option<f64>) -> PeRow {
    PeRow { symbol: symbol.to_string(), name: name.to_string(), pe, eps: Some(1.0) }
  }

  fn pb(symbol: &str, pb: Option<f64>) -> PbRow {
    PbRow { symbol: symbol.to_string(), pb, piotroski: None }
  }

  fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
  }

  fn symbols(result: &ScreenResult) -> Vec<&str> {
    result.rows.iter().map(|r| r.row.symbol.as_str()).collect()
  }

  #[test]
  fn test_inner_join_keeps_common_symbols() {
    let pe_rows = vec![pe("A", "Alpha", Some(5.0)), pe("B", "Beta", Some(6.0))];
    let pb_rows = vec![pb("B", Some(0.5)), pb("C", Some(0.7))];

    let merged = merge_snapshots(&pe_rows, &pb_rows);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].symbol, "B");
    assert_approx_eq(merged[0].pe_pb.unwrap(), 3.0, DEFAULT_TOLERANCE);
  }

  #[test]
  fn test_join_pairs_every_duplicate() {
    let pe_rows = vec![pe("A", "Alpha", Some(2.0))];
    let pb_rows = vec![pb("A", Some(1.0)), pb("A", Some(3.0))];

    let merged = merge_snapshots(&pe_rows, &pb_rows);
    let scores: Vec<Option<f64>> = merged.iter().map(|r| r.pe_pb).collect();
    assert_eq!(scores, vec![Some(2.0), Some(6.0)]);
  }

  #[test]
  fn test_missing_value_has_no_score() {
    let merged = merge_snapshots(&[pe("A", "Alpha", None)], &[pb("A", Some(1.0))]);
    assert_eq!(merged[0].pe_pb, None);
  }

  #[test]
  fn test_screen_ranks_raw_product() {
    // a negative P/E gives a negative score and ranks first
    let pe_rows = vec![pe("A", "Alpha", Some(10.0)), pe("B", "Beta", Some(-5.0))];
    let pb_rows = vec![pb("A", Some(2.0)), pb("B", Some(3.0))];

    let result = ScreeningPipeline::default().run(
      &pe_rows,
      &pb_rows,
      &ExclusionSet::default(),
      &HashSet::new(),
    );

    assert_eq!(symbols(&result), vec!["B", "A"]);
    let scores: Vec<Option<f64>> = result.rows.iter().map(|r| r.row.pe_pb).collect();
    assert_eq!(scores, vec![Some(-15.0), Some(20.0)]);
    assert_eq!(result.total, 2);
  }

  #[test]
  fn test_quarterly_loss_ranks_last() {
    let pe_rows = vec![
      pe("LOSS", "Loser", Some(1.0)),
      pe("MID", "Middle", Some(5.0)),
      pe("NONE", "Unscored", None),
    ];
    let pb_rows = vec![pb("LOSS", Some(0.1)), pb("MID", Some(1.0)), pb("NONE", Some(1.0))];

    let losses = set(&["LOSS"]);
    let result =
      ScreeningPipeline::default().run(&pe_rows, &pb_rows, &ExclusionSet::default(), &losses);

    assert_eq!(symbols(&result), vec!["MID", "NONE", "LOSS"]);
    assert!(result.rows[2].had_quarter_loss);
  }

  #[test]
  fn test_sort_is_stable_for_equal_scores() {
    let pe_rows = vec![
      pe("Z", "Zulu", Some(2.0)),
      pe("A", "Alpha", Some(1.0)),
      pe("M", "Mike", Some(2.0)),
    ];
    let pb_rows = vec![pb("A", Some(4.0)), pb("M", Some(1.0)), pb("Z", Some(1.0))];

    let none = ExclusionSet::default();
    let result = ScreeningPipeline::default().run(&pe_rows, &pb_rows, &none, &HashSet::new());

    assert_eq!(symbols(&result), vec!["Z", "M", "A"]);
  }

  #[test]
  fn test_exclusions_by_symbol_and_name() {
    let pe_rows = vec![
      pe("A", "Alpha", Some(1.0)),
      pe("A2.DE", "Alpha", Some(1.0)),
      pe("B", "Beta", Some(1.0)),
      pe("C", "Gamma", Some(1.0)),
    ];
    let pb_rows: Vec<PbRow> =
      ["A", "A2.DE", "B", "C"].iter().map(|symbol| pb(symbol, Some(1.0))).collect();
    let exclusions = ExclusionSet { symbols: set(&["A", "B"]), names: set(&["Alpha"]) };

    let enabled = ScreeningPipeline::new(NameExclusion::Enabled).run(
      &pe_rows,
      &pb_rows,
      &exclusions,
      &HashSet::new(),
    );
    assert_eq!(symbols(&enabled), vec!["C"]);

    let disabled = ScreeningPipeline::new(NameExclusion::Disabled).run(
      &pe_rows,
      &pb_rows,
      &exclusions,
      &HashSet::new(),
    );
    assert_eq!(symbols(&disabled), vec!["A2.DE", "C"]);
  }

  #[test]
  fn test_top_caps_display() {
    let pe_rows: Vec<PeRow> = (0..5).map(|i| pe(&format!("S{i}"), "Co", Some(i as f64))).collect();
    let pb_rows: Vec<PbRow> = (0..5).map(|i| pb(&format!("S{i}"), Some(1.0))).collect();

    let pipeline = ScreeningPipeline::new(NameExclusion::Disabled);
    let result = pipeline.run(&pe_rows, &pb_rows, &ExclusionSet::default(), &HashSet::new());

    assert_eq!(result.top(3).len(), 3);
    assert_eq!(result.top(10).len(), 5);
    assert_eq!(result.total, 5);
  }

  #[test]
  fn test_compare_scores_missing_last() {
    assert_eq!(compare_scores(Some(1.0), None), Ordering::Less);
    assert_eq!(compare_scores(None, Some(-1.0)), Ordering::Greater);
    assert_eq!(compare_scores(Some(-2.0), Some(1.0)), Ordering::Less);
  }

  #[test]
  fn test_load_snapshots_requires_both_files() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("PE.csv"), "Symbol,Name,P / E,EPS\nA,Alpha,1,1\n").unwrap();
    let layout = SourceLayout::new(dir.path(), dir.path());

    let err = load_snapshots(&layout).unwrap_err();
    assert!(matches!(err, crate::LoaderError::SourceNotFound(path) if path.ends_with("PB.csv")));
  }
}
