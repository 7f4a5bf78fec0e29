//! Listing symbols and the company names they reconcile against

use serde::{Deserialize, Serialize};

/// Exchange abbreviation carried in a listing symbol's suffix.
///
/// `TAPARIA.BO` yields `BO`. Symbols without a dot, or ending in one, carry
/// no suffix.
pub fn market_suffix(symbol: &str) -> Option<&str> {
  symbol.rsplit_once('.').map(|(_, suffix)| suffix).filter(|suffix| !suffix.is_empty())
}

/// Company names are the reconciliation key across listings.
pub fn normalize_company_name(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One (symbol, company) pair read from an exclusion source or portfolio export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRecord {
  pub symbol: String,
  pub company_name: String,
}

impl SourceRecord {
  /// Returns `None` for malformed rows, i.e. a blank symbol or name.
  pub fn new(symbol: &str, name: &str) -> Option<Self> {
    let symbol = symbol.trim();
    let company_name = normalize_company_name(name);
    if symbol.is_empty() || company_name.is_empty() {
      return None;
    }
    Some(Self { symbol: symbol.to_string(), company_name })
  }

  /// Market abbreviation for this listing, falling back to `default_market`.
  pub fn market<'a>(&'a self, default_market: &'a str) -> &'a str {
    market_suffix(&self.symbol).unwrap_or(default_market)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_market_suffix() {
    assert_eq!(market_suffix("TAPARIA.BO"), Some("BO"));
    assert_eq!(market_suffix("BRK.B.US"), Some("US"));
    assert_eq!(market_suffix("AAPL"), None);
    assert_eq!(market_suffix("ODD."), None);
  }

  #[test]
  fn test_normalize_company_name() {
    assert_eq!(normalize_company_name("  Acme   Holdings Ltd "), "Acme Holdings Ltd");
  }

  #[test]
  fn test_source_record_rejects_blank_fields() {
    assert!(SourceRecord::new("", "Acme").is_none());
    assert!(SourceRecord::new("ACME", "   ").is_none());
  }

  #[test]
  fn test_source_record_market_default() {
    let listed = SourceRecord::new("VOW3.DE", "Volkswagen AG").unwrap();
    let domestic = SourceRecord::new(" ACME ", "Acme").unwrap();
    assert_eq!(listed.market("US"), "DE");
    assert_eq!(domestic.symbol, "ACME");
    assert_eq!(domestic.market("US"), "US");
  }
}
