//! The user's list of saved cities.
//!
//! The list is stored as a JSON array of strings under a single key. Names
//! are trimmed, then compared case-sensitively; insertion order is kept.

use parking_lot::Mutex;

use crate::kv::{KeyValueStore, StorageError, StorageResult};

/// Storage key holding the saved-city list.
pub const SAVED_CITIES_KEY: &str = "savedCities";

/// Result of [`SavedCityStore::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// `false` when the city was already saved and nothing was written
    pub added: bool,
}

/// Deduplicated, ordered list of saved city names.
///
/// Every add/remove is a read-modify-write of one key; the store lock is held
/// for the whole sequence so overlapping calls cannot lose each other's
/// updates.
pub struct SavedCityStore<S: KeyValueStore> {
    store: Mutex<S>,
}

impl<S: KeyValueStore> SavedCityStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Saved cities in insertion order. A never-written key is an empty list.
    pub fn list(&self) -> StorageResult<Vec<String>> {
        let store = self.store.lock();
        read_list(&*store)
    }

    pub fn contains(&self, city: &str) -> StorageResult<bool> {
        let city = normalize_name(city);
        Ok(self.list()?.iter().any(|c| c == city))
    }

    /// Append `city` unless it is already saved.
    ///
    /// An empty name is rejected.
    pub fn add(&self, city: &str) -> StorageResult<AddOutcome> {
        let city = normalize_name(city);
        if city.is_empty() {
            return Err(StorageError::validation("City name cannot be empty"));
        }

        let store = self.store.lock();
        let mut cities = read_list(&*store)?;
        if cities.iter().any(|c| c == city) {
            tracing::debug!("City already saved: {}", city);
            return Ok(AddOutcome { added: false });
        }

        cities.push(city.to_string());
        write_list(&*store, &cities)?;
        tracing::info!("Saved city {} ({} total)", city, cities.len());
        Ok(AddOutcome { added: true })
    }

    /// Remove every entry equal to `city`. Removing an unknown city is not an
    /// error; the list is written back either way.
    pub fn remove(&self, city: &str) -> StorageResult<()> {
        let city = normalize_name(city);
        let store = self.store.lock();
        let mut cities = read_list(&*store)?;
        let before = cities.len();
        cities.retain(|c| c != city);
        write_list(&*store, &cities)?;

        if cities.len() < before {
            tracing::info!("Removed saved city {}", city);
        }
        Ok(())
    }
}

/// Names are stored and matched without surrounding whitespace.
fn normalize_name(city: &str) -> &str {
    city.trim()
}

fn read_list<S: KeyValueStore + ?Sized>(store: &S) -> StorageResult<Vec<String>> {
    match store.get(SAVED_CITIES_KEY)? {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            key: SAVED_CITIES_KEY.to_string(),
            message: e.to_string(),
        }),
    }
}

fn write_list<S: KeyValueStore + ?Sized>(store: &S, cities: &[String]) -> StorageResult<()> {
    let raw = serde_json::to_string(cities).map_err(|e| StorageError::backend(e.to_string()))?;
    store.set(SAVED_CITIES_KEY, &raw)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::kv::{MemoryKvStore, SqliteKvStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn store() -> SavedCityStore<MemoryKvStore> {
        SavedCityStore::new(MemoryKvStore::new())
    }

    /// Counts writes and can be told to fail them.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryKvStore,
        writes: AtomicUsize,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes {
                return Err(StorageError::backend("disk full"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_empty_on_first_use() {
        assert!(store().list().unwrap().is_empty());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let store = store();
        store.add("Oslo").unwrap();
        store.add("Bergen").unwrap();
        store.add("Aarhus").unwrap();

        assert_eq!(store.list().unwrap(), vec!["Oslo", "Bergen", "Aarhus"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let store = store();
        assert!(store.add("Oslo").unwrap().added);
        assert!(!store.add("Oslo").unwrap().added);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_add_does_not_write() {
        let store = SavedCityStore::new(FlakyStore::default());
        store.add("Oslo").unwrap();
        store.add("Oslo").unwrap();

        assert_eq!(store.store.lock().writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let store = store();
        store.add("Oslo").unwrap();
        assert!(store.add("oslo").unwrap().added);
        assert!(store.contains("Oslo").unwrap());
        assert!(!store.contains("OSLO").unwrap());
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let store = store();
        assert!(matches!(store.add(""), Err(StorageError::Validation(_))));
        assert!(matches!(store.add("   "), Err(StorageError::Validation(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_add_trims_whitespace() {
        let store = store();
        store.add("  Oslo ").unwrap();
        assert!(!store.add("Oslo").unwrap().added);
        assert_eq!(store.list().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn test_remove() {
        let store = store();
        store.add("Oslo").unwrap();
        store.add("Bergen").unwrap();
        store.add("Aarhus").unwrap();
        store.remove("Bergen").unwrap();

        assert_eq!(store.list().unwrap(), vec!["Oslo", "Aarhus"]);
    }

    #[test]
    fn test_untrimmed_names_match_saved_entry() {
        let store = store();
        store.add(" Oslo ").unwrap();

        assert!(store.contains("Oslo").unwrap());
        assert!(store.contains("  Oslo\t").unwrap());

        store.remove(" Oslo ").unwrap();
        assert!(store.list().unwrap().is_empty());
        assert!(!store.contains("Oslo").unwrap());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let store = store();
        store.add("Oslo").unwrap();
        store.remove("Paris").unwrap();
        assert_eq!(store.list().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn test_remove_writes_unconditionally() {
        let store = SavedCityStore::new(FlakyStore::default());
        store.remove("Paris").unwrap();
        assert_eq!(store.store.lock().writes.load(Ordering::SeqCst), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_readd_goes_to_the_end() {
        let store = store();
        store.add("Oslo").unwrap();
        store.add("Bergen").unwrap();
        store.remove("Oslo").unwrap();
        store.add("Oslo").unwrap();

        assert_eq!(store.list().unwrap(), vec!["Bergen", "Oslo"]);
    }

    #[test]
    fn test_mixed_sequence_has_no_duplicates() {
        let store = store();
        let ops = [
            ("add", "Oslo"),
            ("add", "Bergen"),
            ("add", "Oslo"),
            ("remove", "Bergen"),
            ("add", "Tromsø"),
            ("add", "Bergen"),
            ("add", "Tromsø"),
            ("remove", "Paris"),
        ];
        for (op, city) in ops {
            match op {
                "add" => {
                    store.add(city).unwrap();
                }
                _ => store.remove(city).unwrap(),
            }
        }

        assert_eq!(store.list().unwrap(), vec!["Oslo", "Tromsø", "Bergen"]);
    }

    #[test]
    fn test_failed_write_leaves_list_untouched() {
        let store = SavedCityStore::new(FlakyStore::default());
        store.add("Oslo").unwrap();
        store.store.lock().fail_writes = true;

        assert!(matches!(store.add("Bergen"), Err(StorageError::Backend(_))));
        assert!(matches!(store.remove("Oslo"), Err(StorageError::Backend(_))));
        assert_eq!(store.list().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn test_corrupt_value() {
        let kv = MemoryKvStore::new();
        kv.set(SAVED_CITIES_KEY, "{not json").unwrap();
        let store = SavedCityStore::new(kv);

        assert!(matches!(store.list(), Err(StorageError::Corrupt { .. })));
        assert!(store.add("Oslo").is_err());
    }

    #[test]
    fn test_stored_format_is_json_array() {
        let store = SavedCityStore::new(SqliteKvStore::in_memory().unwrap());
        store.add("Oslo").unwrap();
        store.add("København").unwrap();

        let raw = store.store.lock().get(SAVED_CITIES_KEY).unwrap().unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, vec!["Oslo", "København"]);
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        store.add(&format!("City {}-{}", i, j)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let cities = store.list().unwrap();
        assert_eq!(cities.len(), 80);
    }
}
