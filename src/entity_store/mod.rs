mod memory_store;
mod models;
mod schema;
mod store;
mod trait_def;

pub use memory_store::InMemoryEntityStore;
pub use models::*;
pub use schema::{listing_query, table_for, ListingQuery};
pub use store::SqliteEntityStore;
pub use trait_def::{EntityStore, StoreError};
