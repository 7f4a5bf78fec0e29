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
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use vs_core::Config;

mod commands;
use commands::{
  exclusions::ExclusionsArgs, import::ImportArgs, market::MarketArgs, portfolio::PortfolioArgs,
  screen::ScreenArgs,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "vs")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Reconcile the exclusion sources into the company registry
  Import(ImportArgs),
  /// Rank the P/E and P/B snapshots by combined score
  Screen(ScreenArgs),
  /// Review the current holdings
  Portfolio(PortfolioArgs),
  /// Show what screening currently excludes
  Exclusions(ExclusionsArgs),
  /// Show registry counts
  Stats,
  /// Mark a market as not tradeable until a date
  Market(MarketArgs),
  /// Apply pending database migrations
  Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging
  let log_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt().with_env_filter(log_level).init();

  // Load configuration
  let config = Config::from_env()?;

  // Execute command
  match cli.command {
    Commands::Import(args) => commands::import::execute(args, config).await?,
    Commands::Screen(args) => commands::screen::execute(args, config).await?,
    Commands::Portfolio(args) => commands::portfolio::execute(args, config)?,
    Commands::Exclusions(args) => commands::exclusions::execute(args, config).await?,
    Commands::Stats => commands::stats::execute(config).await?,
    Commands::Market(args) => commands::market::execute(args, config).await?,
    Commands::Migrate => commands::migrate::execute(config).await?,
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_screen_flags() {
    let argv = ["vs", "screen", "--limit", "10", "--no-name-exclusion", "--json"];
    let cli = Cli::try_parse_from(argv).unwrap();
    match cli.command {
      Commands::Screen(args) => {
        assert_eq!(args.limit, Some(10));
        assert!(args.no_name_exclusion);
        assert!(args.json);
        assert!(!args.offline);
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn test_parse_global_verbose() {
    let cli = Cli::try_parse_from(["vs", "stats", "-v"]).unwrap();
    assert!(cli.verbose);
  }

  #[test]
  fn test_market_requires_until_or_clear() {
    assert!(Cli::try_parse_from(["vs", "market", "XX"]).is_err());
    assert!(Cli::try_parse_from(["vs", "market", "XX", "--until", "2026-01-01"]).is_ok());
    assert!(Cli::try_parse_from(["vs", "market", "XX", "--clear"]).is_ok());
  }
}
