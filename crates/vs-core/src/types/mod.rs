pub mod company;
pub mod deferral;
pub mod policy;
pub mod symbol;

pub use company::{CompanyFlags, CompanyUpdate};
pub use deferral::{deferral_horizon, DEFERRAL_REASON, DISQUALIFIED_REASON};
pub use policy::MergePolicy;
pub use symbol::{market_suffix, normalize_company_name, SourceRecord};
