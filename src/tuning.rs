//! Data-driven station balance
//!
//! Every field has a default, so a tuning file only needs the values it changes.

use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;

/// Upper bound for a tuned gravity (m/s²)
const MAX_GRAVITY: f32 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Gravitational acceleration shared by all stations (m/s²)
    pub gravity: f32,

    // === Pendulum ===
    pub pendulum_length: f32,
    /// Release angle (radians)
    pub pendulum_start_angle: f32,

    // === Projectiles ===
    /// Launch velocity (m/s) in launcher space
    pub muzzle_velocity: [f32; 3],
    /// Fraction of vertical speed kept per bounce
    pub projectile_restitution: f32,

    // === Falling bodies ===
    pub body_restitution: f32,
    /// Horizontal spawn jitter around the drop zone centre (full width)
    pub drop_jitter: f32,

    /// Live bodies kept per station before the oldest is recycled
    pub max_bodies_per_station: usize,

    // === Rewards ===
    pub mix_xp: u32,
    pub circuit_xp: u32,
    pub classify_xp: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,

            pendulum_length: 1.2,
            pendulum_start_angle: 0.5,

            muzzle_velocity: [3.0, 1.2, 0.0],
            projectile_restitution: 0.6,

            body_restitution: 0.4,
            drop_jitter: 0.8,

            max_bodies_per_station: 32,

            mix_xp: 50,
            circuit_xp: 70,
            classify_xp: 60,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document. Only a JSON object is accepted.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("tuning must be a JSON object"));
        }
        let tuning: Tuning = serde_json::from_value(value)?;
        Ok(tuning.sanitized())
    }

    /// Clamp values that would break the simulations
    pub fn sanitized(mut self) -> Self {
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            log::warn!("Ignoring gravity {}, using {}", self.gravity, GRAVITY);
            self.gravity = GRAVITY;
        }
        self.gravity = self.gravity.clamp(0.1, MAX_GRAVITY);
        self.projectile_restitution = self.projectile_restitution.clamp(0.0, 0.99);
        self.body_restitution = self.body_restitution.clamp(0.0, 0.99);
        self.pendulum_length = self.pendulum_length.max(0.05);
        self.max_bodies_per_station = self.max_bodies_per_station.max(1);
        self.drop_jitter = self.drop_jitter.abs();
        self
    }
}
