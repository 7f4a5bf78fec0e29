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
use std::path::PathBuf;
use tracing::{error, info};
use vs_core::Config;
use vs_database_postgres::{MemoryRegistry, PgRegistry, RegistrySummary};
use vs_loaders::{ExclusionImporter, ImportConfig, ImportReport, LoaderError, SourceLayout};

#[derive(Args, Debug)]
pub struct ImportArgs {
  /// Directory with the first-dividend, disqualified and quarterly-loss files
  #[arg(long)]
  pub import_dir: Option<PathBuf>,

  /// Directory with the portfolio exports
  #[arg(long)]
  pub downloads_dir: Option<PathBuf>,

  /// Run against an empty in-memory registry, leaving the database untouched
  #[arg(short, long)]
  pub dry_run: bool,

  /// Hide progress bars
  #[arg(long)]
  pub no_progress: bool,

  /// Print the report as JSON
  #[arg(long)]
  pub json: bool,
}

pub async fn execute(args: ImportArgs, config: Config) -> Result<()> {
  let layout = SourceLayout::new(
    args.downloads_dir.unwrap_or_else(|| config.downloads_dir.clone()),
    args.import_dir.unwrap_or_else(|| config.import_dir.clone()),
  );

  let import_config =
    ImportConfig { show_progress: !args.no_progress, ..ImportConfig::from_config(&config) };
  let importer = ExclusionImporter::standard(import_config, &layout)?;

  if args.dry_run {
    info!("Dry run mode - no database updates will be performed");
    let mut registry = MemoryRegistry::new();
    let report = importer.run(&mut registry)?;
    return print_report(&report, args.json, true);
  }

  let db = super::connect(&config)?;
  let result = db
    .run(move |ctx| {
      ctx.transaction(|conn| -> Result<ImportReport, LoaderError> {
        let mut registry = PgRegistry::new(conn);
        importer.run(&mut registry)
      })
    })
    .await;

  match result {
    Ok(report) => print_report(&report, args.json, false),
    Err(e) => {
      error!("Import failed: {}", e);
      println!("❌ Import failed, all changes rolled back: {}", e);
      Err(e.into())
    }
  }
}

fn print_report(report: &ImportReport, json: bool, dry_run: bool) -> Result<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(report)?);
    return Ok(());
  }

  if dry_run {
    println!("📊 Import Report (dry run)");
  } else {
    println!("📊 Import Report");
  }
  println!("================");
  println!(
    "{:<16} {:>6} {:>8} {:>8} {:>10}",
    "Pass", "Files", "Loaded", "Skipped", "Malformed"
  );
  for stats in &report.passes {
    if stats.missing {
      println!("{:<16} {:>6}", stats.name, "missing");
      continue;
    }
    println!(
      "{:<16} {:>6} {:>8} {:>8} {:>10}",
      stats.name, stats.files, stats.loaded, stats.skipped, stats.malformed
    );
  }

  println!();
  print_summary(&report.summary);
  Ok(())
}

/// Registry counts, shared with `vs stats`
pub fn print_summary(summary: &RegistrySummary) {
  println!("📋 Registry Summary");
  println!("===================");
  println!("Companies:            {}", summary.companies);
  println!("Markets:              {}", summary.markets);
  println!("Listings:             {}", summary.listings);
  println!("Disqualified:         {}", summary.disqualified);
  println!("Deferred:             {}", summary.deferred);
  println!("With quarterly loss:  {}", summary.quarterly_loss);
  println!("Portfolio members:    {}", summary.portfolio_members);
}
