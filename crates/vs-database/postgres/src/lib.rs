pub mod connection;
pub mod models;
pub mod repositories;
pub mod repository;
pub mod schema;

// Re-export commonly used items
pub use connection::{establish_connection, run_migrations};
pub use repositories::{MemoryRegistry, PgRegistry};
pub use repository::{
  CompanyRegistry, DatabaseContext, ListingInfo, RegistrySummary, RepositoryError,
  RepositoryResult,
};
