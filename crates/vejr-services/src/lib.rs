//! Local persistence for Vejr.

pub mod kv;
pub mod saved_cities;

pub use kv::{KeyValueStore, MemoryKvStore, SqliteKvStore, StorageError, StorageResult};
pub use saved_cities::{AddOutcome, SavedCityStore, SAVED_CITIES_KEY};
