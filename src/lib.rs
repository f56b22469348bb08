//! VR Lab - An immersive 3D science laboratory
//!
//! Core modules:
//! - `sim`: Station simulations (pendulum, projectiles, falling bodies, mixing, circuit)
//! - `session`: Render/simulation loop lifecycle and command dispatch
//! - `scene`: Static lab environment (room, benches, panels, teleport markers)
//! - `interaction`: Viewpoint, pointer teleport and input bindings
//! - `progress`: XP, badges and mission state machine
//! - `persistence`: Key/value storage with silent-failure semantics
//! - `classify`: Optional image classification capability
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Frame clock and scoped resource registration
//! - `tuning`: Data-driven station balance

pub mod classify;
pub mod interaction;
pub mod persistence;
pub mod platform;
pub mod progress;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use progress::{MissionId, ProgressTracker};
pub use session::{Command, Session};
pub use settings::QualityTier;
pub use tuning::Tuning;

use glam::Vec3;

/// Lab configuration constants
pub mod consts {
    /// Ceiling for a single frame's simulation step (frame hitch guard)
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// Step used for the very first frame, before a previous timestamp exists
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;

    /// Standard gravity (m/s²)
    pub const GRAVITY: f32 = 9.81;

    /// Viewpoint height after teleporting (standing eye level)
    pub const EYE_HEIGHT: f32 = 1.6;
    /// Distance the viewpoint stands back from a teleport marker
    pub const TELEPORT_STEP_BACK: f32 = 1.2;
    /// Teleport marker disc radius
    pub const MARKER_RADIUS: f32 = 0.4;
    /// Marker discs sit just above the floor to avoid z-fighting
    pub const MARKER_HEIGHT: f32 = 0.01;

    /// Camera defaults
    pub const CAMERA_FOV_DEG: f32 = 70.0;
    pub const CAMERA_NEAR: f32 = 0.01;
    pub const CAMERA_FAR: f32 = 100.0;

    /// How long informational overlays stay up (seconds)
    pub const OVERLAY_LIFETIME: f64 = 5.0;
    /// How long reaction bubbles stay up (seconds)
    pub const BURST_LIFETIME: f64 = 3.0;

    /// Room background colour
    pub const BACKGROUND: u32 = 0x0b1020;
}

/// Convert a `0xRRGGBB` colour to linear-ish RGBA floats
#[inline]
pub fn hex_rgba(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Project a point onto the floor plane (y = 0)
#[inline]
pub fn floor_point(p: Vec3) -> Vec3 {
    Vec3::new(p.x, 0.0, p.z)
}
