//! Circuit completion station
//!
//! Battery -> resistor -> bulb. Building always succeeds and lights the bulb.

use glam::Vec3;

use crate::scene::{DrawItem, Material, Shape, Transform};

pub const BULB_POS: Vec3 = Vec3::new(3.2, 1.08, -2.0);
pub const BULB_RADIUS: f32 = 0.06;
const BULB_COLOR: u32 = 0xfbbf24;
const BULB_GLOW: u32 = 0xf59e0b;

pub const BADGE: &str = "Circuit Fixer";
pub const SUCCESS_TEXT: &str = "Circuit Complete! Current flowing.";
pub const OVERLAY_POS: Vec3 = Vec3::new(3.0, 1.7, -1.6);

#[derive(Debug, Clone, Default)]
pub struct CircuitStation {
    lit: bool,
}

impl CircuitStation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Close the circuit. Returns true if the bulb was dark before.
    pub fn build(&mut self) -> bool {
        let was_dark = !self.lit;
        self.lit = true;
        was_dark
    }

    pub fn bulb_material(&self) -> Material {
        if self.lit {
            Material::glowing(BULB_COLOR, BULB_GLOW)
        } else {
            Material::solid(BULB_COLOR)
        }
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        out.push(DrawItem::new(
            Shape::Sphere {
                radius: BULB_RADIUS,
            },
            Transform::at(BULB_POS),
            self.bulb_material(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_lights_bulb() {
        let mut c = CircuitStation::new();
        assert_eq!(c.bulb_material().emissive, 0x000000);
        assert!(c.build());
        assert!(c.is_lit());
        assert_eq!(c.bulb_material().emissive, BULB_GLOW);
        assert!(!c.build());
        assert!(c.is_lit());
    }
}
