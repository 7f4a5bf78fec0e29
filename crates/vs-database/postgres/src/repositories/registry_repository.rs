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


//! Postgres implementation of the company registry

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Text, Timestamp};
use log::debug;
use std::collections::HashSet;
use vs_core::types::{CompanyFlags, CompanyUpdate};

use crate::models::{
  Company, Listing, Market, NewCompany, NewListing, NewMarket, NewPortfolioMember, UpdateCompany,
};
use crate::repository::{CompanyRegistry, ListingInfo, RegistrySummary, RepositoryResult};
use crate::schema::{companies, portfolio_members, stock_listings, stock_markets};

/// Registry bound to one connection, usually one inside an open transaction
pub struct PgRegistry<'c> {
  conn: &'c mut PgConnection,
}

impl<'c> PgRegistry<'c> {
  pub fn new(conn: &'c mut PgConnection) -> Self {
    Self { conn }
  }
}

#[derive(QueryableByName)]
struct SymbolRow {
  #[diesel(sql_type = Text)]
  symbol: String,
}

impl CompanyRegistry for PgRegistry<'_> {
  fn upsert_company(
    &mut self,
    company_name: &str,
    update: &CompanyUpdate,
  ) -> RepositoryResult<i32> {
    let existing = companies::table
      .filter(companies::company_name.eq(company_name))
      .select(Company::as_select())
      .first(&mut *self.conn)
      .optional()?;

    match existing {
      Some(company) => {
        let mut flags = company.flags();
        if flags.apply(update) {
          let now = Utc::now().naive_utc();
          diesel::update(companies::table.find(company.id))
            .set(&UpdateCompany::new(&flags, now))
            .execute(&mut *self.conn)?;
          debug!("Updated company {} ({})", company_name, company.id);
        }
        Ok(company.id)
      }
      None => {
        let mut flags = CompanyFlags::default();
        flags.apply(update);
        let id = diesel::insert_into(companies::table)
          .values(&NewCompany::new(company_name, &flags))
          .returning(companies::id)
          .get_result::<i32>(&mut *self.conn)?;
        debug!("Created company {} ({})", company_name, id);
        Ok(id)
      }
    }
  }

  fn ensure_market(&mut self, abbreviation: &str) -> RepositoryResult<i32> {
    diesel::insert_into(stock_markets::table)
      .values(&NewMarket { abbreviation, name: abbreviation })
      .on_conflict(stock_markets::abbreviation)
      .do_nothing()
      .execute(&mut *self.conn)?;

    let id = stock_markets::table
      .filter(stock_markets::abbreviation.eq(abbreviation))
      .select(stock_markets::id)
      .first::<i32>(&mut *self.conn)?;
    Ok(id)
  }

  fn ensure_listing(
    &mut self,
    symbol: &str,
    company_id: i32,
    market_id: i32,
  ) -> RepositoryResult<bool> {
    let inserted = diesel::insert_into(stock_listings::table)
      .values(&NewListing { symbol, company_id, market_id })
      .on_conflict(stock_listings::symbol)
      .do_nothing()
      .execute(&mut *self.conn)?;
    Ok(inserted > 0)
  }

  fn add_portfolio_member(&mut self, company_id: i32) -> RepositoryResult<bool> {
    let inserted = diesel::insert_into(portfolio_members::table)
      .values(&NewPortfolioMember { company_id, added_at: Utc::now().naive_utc() })
      .on_conflict(portfolio_members::company_id)
      .do_nothing()
      .execute(&mut *self.conn)?;
    Ok(inserted > 0)
  }

  fn retain_portfolio_members(&mut self, keep: &[i32]) -> RepositoryResult<usize> {
    let removed = diesel::delete(
      portfolio_members::table.filter(portfolio_members::company_id.ne_all(keep)),
    )
    .execute(&mut *self.conn)?;
    Ok(removed)
  }

  fn set_market_not_tradeable_until(
    &mut self,
    abbreviation: &str,
    until: Option<NaiveDateTime>,
  ) -> RepositoryResult<()> {
    let id = self.ensure_market(abbreviation)?;
    diesel::update(stock_markets::table.find(id))
      .set(stock_markets::not_tradeable_until.eq(until))
      .execute(&mut *self.conn)?;
    Ok(())
  }

  fn find_company(&mut self, company_name: &str) -> RepositoryResult<Option<CompanyFlags>> {
    let company = companies::table
      .filter(companies::company_name.eq(company_name))
      .select(Company::as_select())
      .first(&mut *self.conn)
      .optional()?;
    Ok(company.map(|c| c.flags()))
  }

  fn find_listing(&mut self, symbol: &str) -> RepositoryResult<Option<ListingInfo>> {
    let row = stock_listings::table
      .inner_join(companies::table)
      .inner_join(stock_markets::table)
      .filter(stock_listings::symbol.eq(symbol))
      .select((Listing::as_select(), companies::company_name, Market::as_select()))
      .first::<(Listing, String, Market)>(&mut *self.conn)
      .optional()?;
    Ok(row.map(|(listing, company_name, market)| ListingInfo {
      symbol: listing.symbol,
      company_name,
      market: market.abbreviation,
    }))
  }

  fn excluded_symbols(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
    let rows: Vec<SymbolRow> = sql_query(
      "SELECT sl.symbol
       FROM stock_listings sl
       JOIN companies c ON sl.company_id = c.id
       JOIN stock_markets sm ON sl.market_id = sm.id
       LEFT JOIN portfolio_members pm ON pm.company_id = c.id
       WHERE c.is_disqualified = TRUE
          OR c.dont_consider_until > $1
          OR sm.not_tradeable_until > $1
          OR pm.company_id IS NOT NULL",
    )
    .bind::<Timestamp, _>(at)
    .load(&mut *self.conn)?;

    Ok(rows.into_iter().map(|row| row.symbol).collect())
  }

  fn excluded_company_names(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
    let names = companies::table
      .filter(companies::is_disqualified.eq(true).or(companies::dont_consider_until.gt(at)))
      .select(companies::company_name)
      .load::<String>(&mut *self.conn)?;
    Ok(names.into_iter().collect())
  }

  fn quarterly_loss_symbols(&mut self) -> RepositoryResult<HashSet<String>> {
    let symbols = stock_listings::table
      .inner_join(companies::table)
      .filter(companies::had_quarter_loss.eq(true))
      .select(stock_listings::symbol)
      .load::<String>(&mut *self.conn)?;
    Ok(symbols.into_iter().collect())
  }

  fn summary(&mut self) -> RepositoryResult<RegistrySummary> {
    let now = Utc::now().naive_utc();
    let conn = &mut *self.conn;

    Ok(RegistrySummary {
      companies: companies::table.count().get_result(conn)?,
      markets: stock_markets::table.count().get_result(conn)?,
      listings: stock_listings::table.count().get_result(conn)?,
      disqualified: companies::table
        .filter(companies::is_disqualified.eq(true))
        .count()
        .get_result(conn)?,
      quarterly_loss: companies::table
        .filter(companies::had_quarter_loss.eq(true))
        .count()
        .get_result(conn)?,
      deferred: companies::table
        .filter(companies::dont_consider_until.gt(now))
        .count()
        .get_result(conn)?,
      portfolio_members: portfolio_members::table.count().get_result(conn)?,
    })
  }
}
