pub mod memory_registry;
pub mod registry_repository;

pub use memory_registry::MemoryRegistry;
pub use registry_repository::PgRegistry;
