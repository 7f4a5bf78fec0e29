use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::schema::portfolio_members;

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = portfolio_members)]
pub struct NewPortfolioMember {
  pub company_id: i32,
  pub added_at: NaiveDateTime,
}
