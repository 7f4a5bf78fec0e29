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


//! Database repository abstraction layer
//!
//! The company registry is consumed through the [`CompanyRegistry`] trait so
//! the import and screening code never hold a hidden global connection.
//! [`DatabaseContext`] owns the connection pool and the transaction boundary.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::Error as DieselError;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use vs_core::types::{CompanyFlags, CompanyUpdate, SourceRecord};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

const MAX_POOL_SIZE: u32 = 4;
const MIN_POOL_IDLE: u32 = 1;
/// Connection timeout in seconds - pool will fail instead of retrying forever
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Database repository errors
#[derive(Error, Debug)]
pub enum RepositoryError {
  #[error("Connection pool error: {0}")]
  PoolError(String),

  #[error("Database query error: {0}")]
  QueryError(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Constraint violation: {0}")]
  ConstraintViolation(String),

  #[error("Transaction error: {0}")]
  TransactionError(String),

  #[error("Migration error: {0}")]
  MigrationError(String),
}

impl From<DieselError> for RepositoryError {
  fn from(err: DieselError) -> Self {
    match err {
      DieselError::NotFound => RepositoryError::NotFound("Record not found".to_string()),
      DieselError::DatabaseError(kind, info) => match kind {
        diesel::result::DatabaseErrorKind::UniqueViolation => {
          RepositoryError::ConstraintViolation(info.message().to_string())
        }
        diesel::result::DatabaseErrorKind::ForeignKeyViolation => {
          RepositoryError::ConstraintViolation(info.message().to_string())
        }
        _ => RepositoryError::QueryError(info.message().to_string()),
      },
      _ => RepositoryError::QueryError(err.to_string()),
    }
  }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
  fn from(err: diesel::r2d2::PoolError) -> Self {
    RepositoryError::PoolError(err.to_string())
  }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Row counts describing the registry after an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
  pub companies: i64,
  pub markets: i64,
  pub listings: i64,
  pub disqualified: i64,
  pub quarterly_loss: i64,
  pub deferred: i64,
  pub portfolio_members: i64,
}

/// A listing resolved to its company and market
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingInfo {
  pub symbol: String,
  pub company_name: String,
  pub market: String,
}

/// Repository for company, market, listing and portfolio state.
///
/// Implementations are handed out for the duration of one unit of work; the
/// caller owns the transaction boundary.
pub trait CompanyRegistry {
  /// Create the company if absent, then merge `update` into its flags using
  /// the per-field merge policies. Returns the company id.
  fn upsert_company(&mut self, company_name: &str, update: &CompanyUpdate)
    -> RepositoryResult<i32>;

  /// Create the market if absent. Returns the market id.
  fn ensure_market(&mut self, abbreviation: &str) -> RepositoryResult<i32>;

  /// Insert-if-absent. An existing symbol keeps its original company and
  /// market. Returns true if the listing was created.
  fn ensure_listing(&mut self, symbol: &str, company_id: i32, market_id: i32)
    -> RepositoryResult<bool>;

  /// Idempotent. Returns true if the membership was created.
  fn add_portfolio_member(&mut self, company_id: i32) -> RepositoryResult<bool>;

  /// Drop memberships of companies not in `keep`. Returns the number removed.
  fn retain_portfolio_members(&mut self, keep: &[i32]) -> RepositoryResult<usize>;

  /// Set or clear the horizon during which a market's listings are excluded.
  fn set_market_not_tradeable_until(
    &mut self,
    abbreviation: &str,
    until: Option<NaiveDateTime>,
  ) -> RepositoryResult<()>;

  fn find_company(&mut self, company_name: &str) -> RepositoryResult<Option<CompanyFlags>>;

  fn find_listing(&mut self, symbol: &str) -> RepositoryResult<Option<ListingInfo>>;

  /// Symbols whose company is disqualified, deferred past `at`, held in the
  /// portfolio, or whose market is not tradeable past `at`.
  fn excluded_symbols(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>>;

  /// Names of companies disqualified or deferred past `at`.
  fn excluded_company_names(&mut self, at: NaiveDateTime) -> RepositoryResult<HashSet<String>>;

  fn quarterly_loss_symbols(&mut self) -> RepositoryResult<HashSet<String>>;

  fn summary(&mut self) -> RepositoryResult<RegistrySummary>;

  /// Guarantee company, market and listing for one source row and apply
  /// `update` to the company. Returns the company id.
  fn register(
    &mut self,
    record: &SourceRecord,
    default_market: &str,
    update: &CompanyUpdate,
  ) -> RepositoryResult<i32> {
    let company_id = self.upsert_company(&record.company_name, update)?;
    let market_id = self.ensure_market(record.market(default_market))?;
    self.ensure_listing(&record.symbol, company_id, market_id)?;
    Ok(company_id)
  }
}

/// Database context that provides access to the connection pool
#[derive(Clone)]
pub struct DatabaseContext {
  pool: Arc<DbPool>,
}

impl DatabaseContext {
  /// Create a new database context with connection pooling
  ///
  /// Fails fast if the database is unavailable by testing the connection at startup.
  pub fn new(database_url: &str) -> RepositoryResult<Self> {
    Self::with_pool_config(database_url, MAX_POOL_SIZE, MIN_POOL_IDLE)
  }

  /// Create with custom pool configuration
  pub fn with_pool_config(
    database_url: &str,
    max_size: u32,
    min_idle: u32,
  ) -> RepositoryResult<Self> {
    // Test connection BEFORE creating the pool to fail fast without background retry noise
    PgConnection::establish(database_url).map_err(|e| {
      RepositoryError::PoolError(format!("Failed to connect to database: {}", e))
    })?;

    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = Pool::builder()
      .max_size(max_size)
      .min_idle(Some(min_idle))
      .connection_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
      .build(manager)
      .map_err(|e| RepositoryError::PoolError(e.to_string()))?;

    Ok(Self { pool: Arc::new(pool) })
  }

  /// Get a connection from the pool
  pub fn get_connection(&self) -> RepositoryResult<DbConnection> {
    self.pool.get().map_err(|e| RepositoryError::PoolError(e.to_string()))
  }

  /// Execute operations within a transaction. Any error rolls back everything
  /// `f` wrote and is returned unchanged.
  pub fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
  where
    F: FnOnce(&mut PgConnection) -> Result<R, E>,
    E: From<DieselError> + From<RepositoryError>,
  {
    let mut conn = self.get_connection()?;
    conn.transaction(|conn| f(&mut **conn))
  }

  /// Execute a blocking database operation off the async runtime
  pub async fn run<F, R, E>(&self, f: F) -> Result<R, E>
  where
    F: FnOnce(&DatabaseContext) -> Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: From<RepositoryError> + Send + 'static,
  {
    let context = self.clone();
    tokio::task::spawn_blocking(move || f(&context))
      .await
      .map_err(|e| E::from(RepositoryError::QueryError(format!("Task join error: {}", e))))?
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::repositories::MemoryRegistry;

  #[test]
  fn test_repository_error_conversion() {
    let err = RepositoryError::from(DieselError::NotFound);
    assert!(matches!(err, RepositoryError::NotFound(_)));

    let err = RepositoryError::from(DieselError::RollbackTransaction);
    assert!(matches!(err, RepositoryError::QueryError(_)));
  }

  #[test]
  fn test_repository_error_display() {
    let err = RepositoryError::MigrationError("bad sql".to_string());
    assert_eq!(err.to_string(), "Migration error: bad sql");
  }

  #[test]
  fn test_register_creates_company_market_and_listing() {
    let mut registry = MemoryRegistry::new();
    let record = SourceRecord::new("TAPARIA.BO", "Taparia Tools").unwrap();

    let id = registry.register(&record, "US", &CompanyUpdate::none()).unwrap();

    let listing = registry.find_listing("TAPARIA.BO").unwrap().unwrap();
    assert_eq!(listing.company_name, "Taparia Tools");
    assert_eq!(listing.market, "BO");
    assert_eq!(registry.upsert_company("Taparia Tools", &CompanyUpdate::none()).unwrap(), id);
  }

  #[test]
  #[ignore = "requires DATABASE_URL pointing at a reachable Postgres"]
  fn test_database_context_creation() {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    assert!(DatabaseContext::new(&url).is_ok());
  }
}
