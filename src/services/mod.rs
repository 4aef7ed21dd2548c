// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod reasoning;
pub mod store;

pub use cache::EnrichmentCache;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use reasoning::{ReasoningClient, ReasoningError, ReasoningProvider, ReasoningService};
pub use store::{ListingStore, StoreError};
