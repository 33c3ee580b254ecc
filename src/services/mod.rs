// Service exports
pub mod cache;
pub mod discovery;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod subscriptions;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use discovery::DiscoveryService;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{DiscoveryStore, StoreError, StoreResult, SubscriptionStore};
pub use subscriptions::SubscriptionService;
