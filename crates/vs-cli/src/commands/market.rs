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
use chrono::NaiveDate;
use clap::Args;
use tracing::info;
use vs_core::Config;
use vs_database_postgres::{CompanyRegistry, PgRegistry, RepositoryError};

#[derive(Args, Debug)]
pub struct MarketArgs {
  /// Market abbreviation, as used in listing symbol suffixes
  pub abbreviation: String,

  /// Exclude the market's listings until this date (YYYY-MM-DD)
  #[arg(long, required_unless_present = "clear")]
  pub until: Option<NaiveDate>,

  /// Make the market tradeable again
  #[arg(long, conflicts_with = "until")]
  pub clear: bool,
}

pub async fn execute(args: MarketArgs, config: Config) -> Result<()> {
  let abbreviation = args.abbreviation.trim().to_uppercase();
  let until = args.until.and_then(|date| date.and_hms_opt(0, 0, 0));

  let market = abbreviation.clone();
  super::connect(&config)?
    .run(move |ctx| -> Result<(), RepositoryError> {
      let mut conn = ctx.get_connection()?;
      PgRegistry::new(&mut conn).set_market_not_tradeable_until(&market, until)
    })
    .await?;

  match until {
    Some(until) => {
      info!("Market {} not tradeable until {}", abbreviation, until);
      println!("✅ {} listings excluded until {}", abbreviation, until.date());
    }
    None => println!("✅ {} is tradeable again", abbreviation),
  }
  Ok(())
}
