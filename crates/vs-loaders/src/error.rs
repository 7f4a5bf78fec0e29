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


use thiserror::Error;
use vs_database_postgres::RepositoryError;

#[derive(Error, Debug, Clone)]
pub enum LoaderError {
  #[error("Source file not found: {0}")]
  SourceNotFound(String),

  #[error("Schema mismatch in {file}: missing column '{column}'")]
  SchemaMismatch { file: String, column: String },

  #[error("CSV parsing error: {0}")]
  CsvError(String),

  #[error("IO error: {0}")]
  IoError(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Invalid data: {0}")]
  InvalidData(String),

  #[error("Configuration error: {0}")]
  ConfigurationError(String),
}

// Implement conversions manually
impl From<csv::Error> for LoaderError {
  fn from(err: csv::Error) -> Self {
    LoaderError::CsvError(err.to_string())
  }
}

impl From<std::io::Error> for LoaderError {
  fn from(err: std::io::Error) -> Self {
    LoaderError::IoError(err.to_string())
  }
}

impl From<vs_core::Error> for LoaderError {
  fn from(err: vs_core::Error) -> Self {
    match err {
      vs_core::Error::Config(_) | vs_core::Error::EnvVar(_) => {
        LoaderError::ConfigurationError(err.to_string())
      }
      _ => LoaderError::InvalidData(err.to_string()),
    }
  }
}

impl From<RepositoryError> for LoaderError {
  fn from(err: RepositoryError) -> Self {
    LoaderError::DatabaseError(err.to_string())
  }
}

// needed so an import can run inside DatabaseContext::transaction
impl From<diesel::result::Error> for LoaderError {
  fn from(err: diesel::result::Error) -> Self {
    LoaderError::DatabaseError(err.to_string())
  }
}

pub type LoaderResult<T> = Result<T, LoaderError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_loader_error_display_source_not_found() {
    let err = LoaderError::SourceNotFound("downloads/PE.csv".to_string());
    assert_eq!(err.to_string(), "Source file not found: downloads/PE.csv");
  }

  #[test]
  fn test_loader_error_display_schema_mismatch() {
    let err =
      LoaderError::SchemaMismatch { file: "PB.csv".to_string(), column: "Symbol".to_string() };
    assert_eq!(err.to_string(), "Schema mismatch in PB.csv: missing column 'Symbol'");
  }

  #[test]
  fn test_loader_error_display_database_error() {
    let err = LoaderError::DatabaseError("connection refused".to_string());
    assert_eq!(err.to_string(), "Database error: connection refused");
  }

  #[test]
  fn test_loader_error_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = LoaderError::from(io_err);
    assert!(matches!(err, LoaderError::IoError(_)));
    assert!(err.to_string().contains("file missing"));
  }

  #[test]
  fn test_loader_error_from_core_error() {
    let err = LoaderError::from(vs_core::Error::Config("bad limit".to_string()));
    assert!(matches!(err, LoaderError::ConfigurationError(_)));

    let err = LoaderError::from(vs_core::Error::InvalidDate("year 999999".to_string()));
    assert!(matches!(err, LoaderError::InvalidData(_)));
  }

  #[test]
  fn test_loader_error_from_repository_error() {
    let err = LoaderError::from(RepositoryError::ConstraintViolation("fk".to_string()));
    assert!(matches!(err, LoaderError::DatabaseError(_)));
    assert!(err.to_string().contains("fk"));
  }

  #[test]
  fn test_loader_error_clone() {
    let err = LoaderError::CsvError("bad quote".to_string());
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
  }
}
