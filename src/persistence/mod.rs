//! Key/value persistence with silent-failure semantics
//!
//! Features:
//! - JSON values addressed by fixed string keys
//! - Default-on-miss reads (absent, unreadable or malformed all fall back)
//! - Fire-and-forget writes (failures are logged, never surfaced)
//! - Swappable backends: in-memory map, browser LocalStorage

pub mod memory;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod local;

pub use memory::MemoryStorage;
pub use store::{Storage, StorageError, Store};

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Persisted record keys
pub mod keys {
    pub const QUALITY: &str = "quality";
    pub const XP: &str = "xp";
    pub const BADGES: &str = "badges";
    pub const MISSIONS: &str = "missions";
}
