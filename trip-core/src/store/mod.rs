//! Local persistence of cached entities.
//!
//! A `Store<T>` keeps an id → entity mapping as one JSON object under a
//! single storage key. When the backend can't be used, reads fall back to an
//! empty mapping, writes are dropped, and the store reports itself degraded.

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{TripError, TripResult};

pub struct Store<T> {
    key: String,
    storage: Arc<dyn Storage>,
    degraded: AtomicBool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Store<T> {
    pub fn new(key: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Store {
            key: key.into(),
            storage,
            degraded: AtomicBool::new(false),
            _entity: PhantomData,
        }
    }

    /// Whether the last access had to fall back because storage was unusable.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Read the backend now; false (and degraded) if it can't be used.
    pub fn is_readable(&self) -> bool {
        match self.read() {
            Ok(_) => {
                self.degraded.store(false, Ordering::SeqCst);
                true
            }
            Err(e) => {
                self.mark_degraded(&e);
                false
            }
        }
    }

    pub fn get_items(&self) -> BTreeMap<String, T> {
        match self.read() {
            Ok(items) => {
                self.degraded.store(false, Ordering::SeqCst);
                items
            }
            Err(e) => {
                self.mark_degraded(&e);
                BTreeMap::new()
            }
        }
    }

    pub fn get_item(&self, id: &str) -> Option<T> {
        self.get_items().remove(id)
    }

    /// Replace the whole mapping.
    pub fn set_items(&self, items: BTreeMap<String, T>) {
        self.write(&items);
    }

    pub fn set_item(&self, id: &str, item: T) {
        let Some(mut items) = self.read_for_update() else {
            return;
        };
        items.insert(id.to_string(), item);
        self.write(&items);
    }

    pub fn remove_item(&self, id: &str) {
        let Some(mut items) = self.read_for_update() else {
            return;
        };
        if items.remove(id).is_some() {
            self.write(&items);
        }
    }

    fn read(&self) -> TripResult<BTreeMap<String, T>> {
        match self.storage.get_item(&self.key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                TripError::StorageUnavailable(format!("Unreadable data under '{}': {e}", self.key))
            }),
            None => Ok(BTreeMap::new()),
        }
    }

    // A failed read must not turn into an overwrite with a partial mapping.
    fn read_for_update(&self) -> Option<BTreeMap<String, T>> {
        match self.read() {
            Ok(items) => Some(items),
            Err(e) => {
                self.mark_degraded(&e);
                None
            }
        }
    }

    fn write(&self, items: &BTreeMap<String, T>) {
        let result = serde_json::to_string(items)
            .map_err(TripError::from)
            .and_then(|raw| self.storage.set_item(&self.key, &raw));

        match result {
            Ok(()) => {
                tracing::debug!(key = %self.key, count = items.len(), "store written");
                self.degraded.store(false, Ordering::SeqCst);
            }
            Err(e) => self.mark_degraded(&e),
        }
    }

    fn mark_degraded(&self, error: &TripError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            tracing::warn!(key = %self.key, %error, "local store degraded");
        }
    }
}
