//! Listing records, location identity, and the key-value store they live in.

pub mod domain;
pub mod keys;
pub mod memory;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use domain::{Coordinate, Listing, ListingKey, Location, LocationId};
pub use keys::{KeySpace, ScoreKind};
pub use memory::InMemoryListingStore;
pub use repository::{ListingRepository, ListingScores};
pub use sqlite::SqliteListingStore;
pub use store::{ListingStore, StoreError};
