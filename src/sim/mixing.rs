//! Liquid mixing station
//!
//! Two beakers react into a single colour once the safety gate is engaged.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::StationError;
use super::effects::Bubble;
use crate::scene::{DrawItem, Material, Shape, Transform};
use crate::settings::QualityTier;

pub const LIQUID_A_COLOR: u32 = 0x3b82f6;
pub const LIQUID_B_COLOR: u32 = 0x10b981;
/// Both liquids after the reaction
pub const REACTED_COLOR: u32 = 0xf43f5e;

pub const BADGE: &str = "Chemistry Novice";
pub const REACTION_TEXT: &str = "Reaction: HCl + NaOH -> NaCl + H2O\nApplication: Neutralization";
/// Where the reaction description floats
pub const OVERLAY_POS: Vec3 = Vec3::new(0.0, 1.8, -1.6);

/// Liquid column geometry: (centre, fill height)
const LIQUIDS: [(Vec3, f32); 2] = [
    (Vec3::new(0.0, 0.9, -2.0), 0.16),
    (Vec3::new(0.3, 0.91, -2.0), 0.08),
];

#[derive(Debug, Clone)]
pub struct MixingStation {
    colors: [u32; 2],
    reactions: u32,
    rng: Pcg32,
}

impl MixingStation {
    pub fn new(seed: u64) -> Self {
        Self {
            colors: [LIQUID_A_COLOR, LIQUID_B_COLOR],
            reactions: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn colors(&self) -> [u32; 2] {
        self.colors
    }

    pub fn reactions(&self) -> u32 {
        self.reactions
    }

    /// Run the reaction. Rejected (and nothing changes) unless `gate_on`.
    /// Returns the bubbles for the reaction burst.
    pub fn mix(&mut self, gate_on: bool, quality: QualityTier) -> Result<Vec<Bubble>, StationError> {
        if !gate_on {
            return Err(StationError::SafetyGateOff);
        }

        let bubbles = (0..quality.burst_particles())
            .map(|_| {
                let radius = self.rng.random::<f32>() * 0.02 + 0.01;
                let pos = Vec3::new(
                    0.15 + (self.rng.random::<f32>() - 0.5) * 0.2,
                    0.9 + self.rng.random::<f32>() * 0.15,
                    -2.0,
                );
                Bubble { pos, radius }
            })
            .collect();

        self.colors = [REACTED_COLOR; 2];
        self.reactions += 1;
        Ok(bubbles)
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        for ((centre, height), color) in LIQUIDS.iter().zip(self.colors) {
            out.push(DrawItem::new(
                Shape::Cylinder {
                    radius_top: 0.11,
                    radius_bottom: 0.13,
                    height: *height,
                },
                Transform::at(*centre),
                Material::translucent(color, 0.6),
            ));
        }
    }
}
