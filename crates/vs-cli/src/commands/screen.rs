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
use chrono::{Datelike, Utc};
use clap::Args;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;
use vs_core::Config;
use vs_database_postgres::{CompanyRegistry, PgRegistry};
use vs_loaders::exclusion::portfolio_symbols;
use vs_loaders::screening::load_snapshots;
use vs_loaders::{
  ExclusionResolver, ExclusionSet, FileExclusions, LoaderError, NameExclusion, RankedRow,
  ScreeningPipeline, SourceLayout,
};

use super::{format_ratio, truncate};

#[derive(Args, Debug)]
pub struct ScreenArgs {
  /// Number of ranked rows to print (defaults to VS_DISPLAY_LIMIT)
  #[arg(short, long)]
  pub limit: Option<usize>,

  /// Only exclude by symbol, never by company name
  #[arg(long)]
  pub no_name_exclusion: bool,

  /// Read exclusions from the source files instead of the registry
  #[arg(long)]
  pub offline: bool,

  /// Print the ranked rows as JSON
  #[arg(long)]
  pub json: bool,
}

#[derive(Serialize)]
struct ScreenOutput<'a> {
  total: usize,
  shown: usize,
  rows: &'a [RankedRow],
}

pub async fn execute(args: ScreenArgs, config: Config) -> Result<()> {
  let layout = SourceLayout::from_config(&config);
  let (pe_rows, pb_rows) = load_snapshots(&layout)?;

  let (exclusions, loss_symbols) = if args.offline {
    info!("Offline mode - exclusions from source files only");
    (FileExclusions::collect(&layout, Utc::now().year())?, HashSet::new())
  } else {
    registry_exclusions(&config, &layout).await?
  };

  let name_exclusion = NameExclusion::from_flag(config.name_exclusion && !args.no_name_exclusion);
  let result =
    ScreeningPipeline::new(name_exclusion).run(&pe_rows, &pb_rows, &exclusions, &loss_symbols);
  let shown = result.top(args.limit.unwrap_or(config.display_limit));

  if args.json {
    let output = ScreenOutput { total: result.total, shown: shown.len(), rows: shown };
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("📈 Value Screen ({} of {} candidates)", shown.len(), result.total);
  println!("=========================================");
  println!(
    "{:<4} {:<12} {:<32} {:>10} {:>10} {:>10} {:>5}",
    "#", "Symbol", "Name", "P/E", "P/B", "P/E*P/B", "Loss"
  );
  for (rank, ranked) in shown.iter().enumerate() {
    let row = &ranked.row;
    println!(
      "{:<4} {:<12} {:<32} {} {} {} {:>5}",
      rank + 1,
      row.symbol,
      truncate(&row.name, 32),
      format_ratio(row.pe),
      format_ratio(row.pb),
      format_ratio(row.pe_pb),
      if ranked.had_quarter_loss { "yes" } else { "" }
    );
  }

  Ok(())
}

async fn registry_exclusions(
  config: &Config,
  layout: &SourceLayout,
) -> Result<(ExclusionSet, HashSet<String>)> {
  let portfolio = portfolio_symbols(layout)?;
  let db = super::connect(config)?;

  let resolved = db
    .run(move |ctx| -> Result<_, LoaderError> {
      let mut conn = ctx.get_connection()?;
      let mut registry = PgRegistry::new(&mut conn);
      let exclusions = ExclusionResolver::now().resolve(&mut registry, &portfolio)?;
      let loss_symbols = registry.quarterly_loss_symbols()?;
      Ok((exclusions, loss_symbols))
    })
    .await?;

  Ok(resolved)
}
