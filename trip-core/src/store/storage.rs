//! Key/value storage backends for the local store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{TripError, TripResult};

/// String key/value storage, shaped like browser `localStorage`.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> TripResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> TripResult<()>;
}

/// Stores each key as `<dir>/<key>.json`.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> TripResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TripError::StorageUnavailable(format!(
                "Could not read {}: {e}",
                path.display()
            ))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> TripResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            TripError::StorageUnavailable(format!(
                "Could not create {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{key}.json.tmp"));

        std::fs::write(&temp, value)
            .and_then(|_| std::fs::rename(&temp, &path))
            .map_err(|e| {
                TripError::StorageUnavailable(format!("Could not write {}: {e}", path.display()))
            })
    }
}

/// In-memory storage. Can be made unavailable to exercise degraded mode.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> TripResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TripError::StorageUnavailable("memory storage disabled".into()));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> TripResult<Option<String>> {
        self.check_available()?;
        let items = self
            .items
            .lock()
            .map_err(|_| TripError::StorageUnavailable("memory storage poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> TripResult<()> {
        self.check_available()?;
        let mut items = self
            .items
            .lock()
            .map_err(|_| TripError::StorageUnavailable("memory storage poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
