//! # vs-core
//!
//! Core types shared by the valuescreen crates: configuration, the error
//! taxonomy, company/market/listing state and the per-field merge policies
//! that decide precedence between exclusion sources.

pub mod config;
pub mod error;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use error::{Error, Result};

/// Market code used for symbols without an exchange suffix.
pub const DEFAULT_MARKET: &str = "US";

/// Default number of ranked rows shown by a screening run.
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

/// Default location of the downloaded snapshot and portfolio exports.
pub const DEFAULT_DOWNLOADS_DIR: &str = "./downloads";

/// Default location of the curated exclusion source files.
pub const DEFAULT_IMPORT_DIR: &str = "./db";
