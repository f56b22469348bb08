//! Typed store over a raw string backend

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Backend failures. Never propagated past [`Store`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend refused the read
    #[error("read failed for key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// The backend refused the write (quota, private mode, ...)
    #[error("write failed for key '{key}': {reason}")]
    Write { key: String, reason: String },
}

/// Raw string key/value backend
pub trait Storage {
    /// Read the stored text for `key`, `Ok(None)` if absent
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// JSON store with default-on-miss reads and swallowed write failures.
///
/// Each key is written independently; there is no transaction spanning keys.
pub struct Store {
    backend: Box<dyn Storage>,
}

impl Store {
    pub fn new(backend: impl Storage + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Read `key`, returning `default` when it is absent, unreadable or malformed
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.read(key) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Ignoring malformed value for '{}': {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::warn!("{}", e);
                default
            }
        }
    }

    /// Serialize and write `value` under `key`. Failures are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize '{}': {}", key, e);
                return;
            }
        };
        match self.backend.write(key, &json) {
            Ok(()) => log::debug!("Stored '{}' ({} bytes)", key, json.len()),
            Err(e) => log::warn!("{}", e),
        }
    }
}
