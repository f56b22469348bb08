//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (monotonic timestamps to clamped steps)
//! - Scoped registration of listeners and external sessions
//! - Browser event listener guards (wasm32 only)

pub mod clock;
pub mod scope;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use clock::FrameClock;
pub use scope::{Registrations, Release};
