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
use vs_core::Config;
use vs_database_postgres::PgRegistry;
use vs_loaders::exclusion::portfolio_symbols;
use vs_loaders::{ExclusionResolver, ExclusionSet, FileExclusions, LoaderError, SourceLayout};

#[derive(Args, Debug)]
pub struct ExclusionsArgs {
  /// Also list excluded company names
  #[arg(long)]
  pub names: bool,

  /// Read exclusions from the source files instead of the registry
  #[arg(long)]
  pub offline: bool,

  /// Print the exclusion set as JSON
  #[arg(long)]
  pub json: bool,
}

pub async fn execute(args: ExclusionsArgs, config: Config) -> Result<()> {
  let layout = SourceLayout::from_config(&config);

  let exclusions = if args.offline {
    FileExclusions::collect(&layout, Utc::now().year())?
  } else {
    let portfolio = portfolio_symbols(&layout)?;
    super::connect(&config)?
      .run(move |ctx| -> Result<ExclusionSet, LoaderError> {
        let mut conn = ctx.get_connection()?;
        ExclusionResolver::now().resolve(&mut PgRegistry::new(&mut conn), &portfolio)
      })
      .await?
  };

  if args.json {
    println!("{}", serde_json::to_string_pretty(&exclusions)?);
    return Ok(());
  }

  println!("🚫 Excluded Symbols ({})", exclusions.symbols.len());
  println!("=====================");
  for symbol in exclusions.sorted_symbols() {
    println!("  {}", symbol);
  }

  if args.names {
    println!("\n🚫 Excluded Companies ({})", exclusions.names.len());
    println!("=======================");
    for name in exclusions.sorted_names() {
      println!("  {}", name);
    }
  }

  Ok(())
}
