//! Simple pendulum station
//!
//! Undamped: the swing persists indefinitely. Semi-implicit Euler keeps the
//! energy bounded instead of drifting upward.

use glam::{Quat, Vec3};

use crate::scene::{DrawItem, Material, Shape, Transform};
use crate::tuning::Tuning;

/// Pivot point above the physics bench
pub const PIVOT: Vec3 = Vec3::new(-3.0, 2.2, -2.0);
pub const BOB_RADIUS: f32 = 0.15;
const ROD_RADIUS: f32 = 0.02;

#[derive(Debug, Clone, PartialEq)]
pub struct Pendulum {
    /// Angle from vertical (radians, positive = counter-clockwise about +Z)
    pub theta: f32,
    /// Angular velocity (rad/s)
    pub omega: f32,
    pub length: f32,
    pub gravity: f32,
}

impl Pendulum {
    pub fn new(length: f32, gravity: f32, theta: f32) -> Self {
        Self {
            theta,
            omega: 0.0,
            length,
            gravity,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(
            tuning.pendulum_length,
            tuning.gravity,
            tuning.pendulum_start_angle,
        )
    }

    /// `α = -(g/L)·sin(θ)`
    #[inline]
    pub fn angular_acceleration(&self) -> f32 {
        -(self.gravity / self.length) * self.theta.sin()
    }

    pub fn step(&mut self, dt: f32) {
        let alpha = self.angular_acceleration();
        self.omega += alpha * dt;
        self.theta += self.omega * dt;
    }

    /// Mechanical energy per unit mass
    pub fn energy(&self) -> f32 {
        let kinetic = 0.5 * self.length * self.length * self.omega * self.omega;
        let potential = self.gravity * self.length * (1.0 - self.theta.cos());
        kinetic + potential
    }

    pub fn pivot_rotation(&self) -> Quat {
        Quat::from_rotation_z(self.theta)
    }

    pub fn bob_position(&self) -> Vec3 {
        PIVOT + self.pivot_rotation() * Vec3::new(0.0, -self.length, 0.0)
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        let rotation = self.pivot_rotation();
        let rod_centre = PIVOT + rotation * Vec3::new(0.0, -self.length / 2.0, 0.0);
        out.push(DrawItem::new(
            Shape::Cylinder {
                radius_top: ROD_RADIUS,
                radius_bottom: ROD_RADIUS,
                height: self.length,
            },
            Transform::at(rod_centre).with_rotation(rotation),
            Material::solid(0x64748b),
        ));
        out.push(DrawItem::new(
            Shape::Sphere { radius: BOB_RADIUS },
            Transform::at(self.bob_position()),
            Material::solid(0x60a5fa),
        ));
    }
}
