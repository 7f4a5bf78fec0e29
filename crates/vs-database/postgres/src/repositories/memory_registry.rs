//! In-process registry
//!
//! Backs dry runs and tests. Mirrors the Postgres semantics: unique company
//! names, unique market abbreviations, insert-if-absent listings and
//! idempotent portfolio membership.

use chrono::{NaiveDateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use vs_core::types::{CompanyFlags, CompanyUpdate};

use crate::repository::{
  CompanyRegistry, ListingInfo, RegistrySummary, RepositoryError, RepositoryResult,
};

#[derive(Debug, Clone)]
struct MemoryCompany {
  name: String,
  flags: CompanyFlags,
}

#[derive(Debug, Clone)]
struct MemoryMarket {
  abbreviation: String,
  not_tradeable_until: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy)]
struct MemoryListing {
  company_id: i32,
  market_id: i32,
}

/// Ids are 1-based positions, as a SERIAL column would hand them out
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
  companies: Vec<MemoryCompany>,
  company_ids: HashMap<String, i32>,
  markets: Vec<MemoryMarket>,
  market_ids: HashMap<String, i32>,
  listings: BTreeMap<String, MemoryListing>,
  portfolio: BTreeSet<i32>,
}

impl MemoryRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Run `f` against this registry; on error every change it made is discarded.
  pub fn transaction<R, E, F>(&mut self, f: F) -> Result<R, E>
  where
    F: FnOnce(&mut Self) -> Result<R, E>,
  {
    let snapshot = self.clone();
    let result = f(self);
    if result.is_err() {
      *self = snapshot;
    }
    result
  }

  fn company(&self, id: i32) -> RepositoryResult<&MemoryCompany> {
    usize::try_from(id - 1)
      .ok()
      .and_then(|idx| self.companies.get(idx))
      .ok_or_else(|| RepositoryError::ConstraintViolation(format!("no company with id {}", id)))
  }

  fn market(&self, id: i32) -> RepositoryResult<&MemoryMarket> {
    usize::try_from(id - 1)
      .ok()
      .and_then(|idx| self.markets.get(idx))
      .ok_or_else(|| RepositoryError::ConstraintViolation(format!("no market with id {}", id)))
  }

  fn listing_symbols_where<P>(&self, predicate: P) -> RepositoryResult<HashSet<String>>
  where
    P: Fn(&MemoryCompany, &MemoryMarket, i32) -> bool,
  {
    let mut symbols = HashSet::new();
    for (symbol, listing) in &self.listings {
      let company = self.company(listing.company_id)?;
      let market = self.market(listing.market_id)?;
      if predicate(company, market, listing.company_id) {
        symbols.insert(symbol.clone());
      }
    }
    Ok(symbols)
  }
}

impl CompanyRegistry for MemoryRegistry {
  fn upsert_company(
    &mut self,
    company_name: &str,
    update: &CompanyUpdate,
  ) -> RepositoryResult<i32> {
    if let Some(&id) = self.company_ids.get(company_name) {
      let idx = (id - 1) as usize;
      self.companies[idx].flags.apply(update);
      return Ok(id);
    }

    let mut flags = CompanyFlags::default();
    flags.apply(update);
    self.companies.push(MemoryCompany { name: company_name.to_string(), flags });
    let id = self.companies.len() as i32;
    self.company_ids.insert(company_name.to_string(), id);
    Ok(id)
  }

  fn ensure_market(&mut self, abbreviation: &str) -> RepositoryResult<i32> {
    if let Some(&id) = self.market_ids.get(abbreviation) {
      return Ok(id);
    }
    self
      .markets
      .push(MemoryMarket { abbreviation: abbreviation.to_string(), not_tradeable_until: None });
    let id = self.markets.len() as i32;
    self.market_ids.insert(abbreviation.to_string(), id);
    Ok(id)
  }

  fn ensure_listing(
    &mut self,
    symbol: &str,
    company_id: i32,
    market_id: i32,
  ) -> RepositoryResult<bool> {
    self.company(company_id)?;
    self.market(market_id)?;
    if self.listings.contains_key(symbol) {
      return Ok(false);
    }
    self.listings.insert(symbol.to_string(), MemoryListing { company_id, market_id });
    Ok(true)
  }

  fn add_portfolio_member(&mut self, company_id: i32) -> RepositoryResult<bool> {
    self.company(company_id)?;
    Ok(self.portfolio.insert(company_id))
  }

  fn retain_portfolio_members(&mut self, keep: &[i32]) -> RepositoryResult<usize> {
    let before = self.portfolio.len();
    self.portfolio.retain(|id| keep.contains(id));
    Ok(before - self.portfolio.len())
  }

  fn set_market_not_tradeable_until(
    &mut self,
    abbreviation: &str,
    until: Option<NaiveDateTime>,
  ) -> RepositoryResult<()> {
    let id = self.ensure_market(abbreviation)?;
    self.markets[(id - 1) as usize].not_tradeable_until = until;
    Ok(())
  }

  fn find_company(&mut self, company_name: &str) -> RepositoryResult<Option<CompanyFlags>> {
    Ok(
      self
        .company_ids
        .get(company_name)
        .map(|&id| self.companies[(id - 1) as usize].flags.clone()),
    )
  }

  fn find_listing(&mut self, symbol: &str) -> RepositoryResult<Option<ListingInfo>> {
    let Some(listing) = self.listings.get(symbol).copied() else {
      return Ok(None);
    };
    Ok(Some(ListingInfo {
      symbol: symbol.to_string(),
      company_name: self.company(listing.company_id)?.name.clone(),
      market: self.market(listing.market_id)?.abbreviation.clone(),
    }))
  }

  fn excluded_symbols(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
    let portfolio = &self.portfolio;
    self.listing_symbols_where(|company, market, company_id| {
      company.flags.is_excluded_at(at)
        || market.not_tradeable_until.is_some_and(|until| until > at)
        || portfolio.contains(&company_id)
    })
  }

  fn excluded_company_names(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>> {
    Ok(
      self
        .companies
        .iter()
        .filter(|company| company.flags.is_excluded_at(at))
        .map(|company| company.name.clone())
        .collect(),
    )
  }

  fn quarterly_loss_symbols(&mut self) -> RepositoryResult<HashSet<String>> {
    self.listing_symbols_where(|company, _, _| company.flags.had_quarter_loss)
  }

  fn summary(&mut self) -> RepositoryResult<RegistrySummary> {
    let now = Utc::now().naive_utc();
    let count = |pred: &dyn Fn(&CompanyFlags) -> bool| {
      self.companies.iter().filter(|company| pred(&company.flags)).count() as i64
    };

    Ok(RegistrySummary {
      companies: self.companies.len() as i64,
      markets: self.markets.len() as i64,
      listings: self.listings.len() as i64,
      disqualified: count(&|flags| flags.is_disqualified),
      quarterly_loss: count(&|flags| flags.had_quarter_loss),
      deferred: count(&|flags| flags.is_deferred_at(now)),
      portfolio_members: self.portfolio.len() as i64,
    })
  }
}
