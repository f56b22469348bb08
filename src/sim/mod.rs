//! Station simulations
//!
//! All lab logic lives here. This module must stay pure and deterministic:
//! - Time only advances through `step(dt)`
//! - Seeded RNG only
//! - Stable iteration order (arena slot order)
//! - No rendering or platform dependencies beyond producing `DrawItem`s

pub mod arena;
pub mod circuit;
pub mod collider;
pub mod effects;
mod error;
pub mod lab;
pub mod mixing;
pub mod pendulum;
pub mod projectile;

pub use arena::{BodyArena, BodyHandle, KinematicBody};
pub use circuit::CircuitStation;
pub use collider::FallingBodies;
pub use effects::{Bubble, Effects, Overlay, OverlayKind, ParticleBurst};
pub use error::StationError;
pub use lab::{ActionReport, Lab};
pub use mixing::MixingStation;
pub use pendulum::Pendulum;
pub use projectile::ProjectileLauncher;
