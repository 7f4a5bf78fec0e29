use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use vs_core::types::CompanyFlags;

use crate::schema::companies;

/// Database model for the companies table
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = companies)]
pub struct Company {
  pub id: i32,
  pub company_name: String,
  pub is_disqualified: bool,
  pub disqualified_reason: Option<String>,
  pub dont_consider_until: Option<NaiveDateTime>,
  pub dont_consider_reason: Option<String>,
  pub had_quarter_loss: bool,
  pub c_time: NaiveDateTime,
  pub m_time: NaiveDateTime,
}

impl Company {
  pub fn flags(&self) -> CompanyFlags {
    CompanyFlags {
      is_disqualified: self.is_disqualified,
      disqualified_reason: self.disqualified_reason.clone(),
      dont_consider_until: self.dont_consider_until,
      dont_consider_reason: self.dont_consider_reason.clone(),
      had_quarter_loss: self.had_quarter_loss,
    }
  }
}

/// New company for database insertion
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = companies)]
pub struct NewCompany<'a> {
  pub company_name: &'a str,
  pub is_disqualified: bool,
  pub disqualified_reason: Option<&'a str>,
  pub dont_consider_until: Option<NaiveDateTime>,
  pub dont_consider_reason: Option<&'a str>,
  pub had_quarter_loss: bool,
}

impl<'a> NewCompany<'a> {
  pub fn new(company_name: &'a str, flags: &'a CompanyFlags) -> Self {
    Self {
      company_name,
      is_disqualified: flags.is_disqualified,
      disqualified_reason: flags.disqualified_reason.as_deref(),
      dont_consider_until: flags.dont_consider_until,
      dont_consider_reason: flags.dont_consider_reason.as_deref(),
      had_quarter_loss: flags.had_quarter_loss,
    }
  }
}

/// Updateable fields for companies; the full merged flag set is written back
#[derive(AsChangeset, Debug)]
#[diesel(table_name = companies)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateCompany<'a> {
  pub is_disqualified: bool,
  pub disqualified_reason: Option<&'a str>,
  pub dont_consider_until: Option<NaiveDateTime>,
  pub dont_consider_reason: Option<&'a str>,
  pub had_quarter_loss: bool,
  pub m_time: NaiveDateTime,
}

impl<'a> UpdateCompany<'a> {
  pub fn new(flags: &'a CompanyFlags, m_time: NaiveDateTime) -> Self {
    Self {
      is_disqualified: flags.is_disqualified,
      disqualified_reason: flags.disqualified_reason.as_deref(),
      dont_consider_until: flags.dont_consider_until,
      dont_consider_reason: flags.dont_consider_reason.as_deref(),
      had_quarter_loss: flags.had_quarter_loss,
      m_time,
    }
  }
}
