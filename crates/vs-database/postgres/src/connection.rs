use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

use crate::repository::{RepositoryError, RepositoryResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Establish a database connection
pub fn establish_connection(database_url: &str) -> Result<PgConnection, diesel::ConnectionError> {
  PgConnection::establish(database_url)
}

/// Apply pending embedded migrations, returning the versions that ran
pub fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<Vec<String>> {
  let applied = conn
    .run_pending_migrations(MIGRATIONS)
    .map_err(|e| RepositoryError::MigrationError(e.to_string()))?;

  let versions: Vec<String> = applied.iter().map(|v| v.to_string()).collect();
  info!("Applied {} migration(s)", versions.len());
  Ok(versions)
}
