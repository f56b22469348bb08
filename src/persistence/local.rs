//! Browser LocalStorage backend (WASM only)

use super::store::{Storage, StorageError};

pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Open `window.localStorage`, `None` if blocked or missing
    pub fn open() -> Option<Self> {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        log::info!("Using LocalStorage for progress");
        Some(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }
}
