//! Configuration management for the screening workflow

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main configuration struct shared by the CLI commands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Postgres connection string; only required by commands touching the registry
  pub database_url: Option<String>,

  /// Directory holding PE.csv, PB.csv and the portfolio exports
  pub downloads_dir: PathBuf,

  /// Directory holding the curated exclusion sources
  pub import_dir: PathBuf,

  /// Market code for symbols without an exchange suffix
  pub default_market: String,

  /// Number of ranked rows printed by `screen`
  pub display_limit: usize,

  /// Whether screening also removes rows by excluded company name
  pub name_exclusion: bool,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Build configuration from an arbitrary key lookup.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

    let downloads_dir = lookup("VS_DOWNLOADS_DIR")
      .unwrap_or_else(|| crate::DEFAULT_DOWNLOADS_DIR.to_string())
      .into();

    let import_dir =
      lookup("VS_IMPORT_DIR").unwrap_or_else(|| crate::DEFAULT_IMPORT_DIR.to_string()).into();

    let default_market = lookup("VS_DEFAULT_MARKET")
      .map(|m| m.trim().to_uppercase())
      .filter(|m| !m.is_empty())
      .unwrap_or_else(|| crate::DEFAULT_MARKET.to_string());

    let display_limit = match lookup("VS_DISPLAY_LIMIT") {
      Some(raw) => raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid VS_DISPLAY_LIMIT: {}", raw)))?,
      None => crate::DEFAULT_DISPLAY_LIMIT,
    };

    let name_exclusion = match lookup("VS_NAME_EXCLUSION") {
      Some(raw) => parse_flag(&raw)
        .ok_or_else(|| Error::Config(format!("Invalid VS_NAME_EXCLUSION: {}", raw)))?,
      None => true,
    };

    Ok(Config {
      database_url,
      downloads_dir,
      import_dir,
      default_market,
      display_limit,
      name_exclusion,
    })
  }

  /// The database URL, or a configuration error naming the missing variable
  pub fn database_url(&self) -> Result<&str> {
    self
      .database_url
      .as_deref()
      .ok_or_else(|| Error::Config("DATABASE_URL environment variable not set".to_string()))
  }
}

fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}
