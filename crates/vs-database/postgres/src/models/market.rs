use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::{stock_listings, stock_markets};

/// Database model for stock_markets table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = stock_markets)]
pub struct Market {
  pub id: i32,
  pub abbreviation: String,
  pub name: String,
  pub not_tradeable_until: Option<NaiveDateTime>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stock_markets)]
pub struct NewMarket<'a> {
  pub abbreviation: &'a str,
  /// The abbreviation doubles as display name until one is curated
  pub name: &'a str,
}

/// A tradeable listing. Never updated after insertion.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = stock_listings)]
pub struct Listing {
  pub id: i32,
  pub symbol: String,
  pub company_id: i32,
  pub market_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = stock_listings)]
pub struct NewListing<'a> {
  pub symbol: &'a str,
  pub company_id: i32,
  pub market_id: i32,
}
