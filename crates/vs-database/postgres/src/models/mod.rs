pub mod company;
pub mod market;
pub mod portfolio;

// Re-export commonly used types
pub use company::{Company, NewCompany, UpdateCompany};
pub use market::{Listing, Market, NewListing, NewMarket};
pub use portfolio::NewPortfolioMember;
