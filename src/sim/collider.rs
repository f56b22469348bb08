//! Falling-body collision station
//!
//! Cubes dropped over a fixed zone fall under gravity and settle on the
//! floor. Restitution is lower than the projectiles' so they read as heavier.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::arena::{BodyArena, BodyHandle, KinematicBody};
use crate::scene::{DrawItem, Material, Shape, Transform};
use crate::tuning::Tuning;

/// Drop zone centre, above the collision ground pad
pub const DROP_ZONE: Vec3 = Vec3::new(-3.0, 1.4, -0.8);
pub const CUBE_SIZE: f32 = 0.15;
/// Cube centre height when resting on the floor
pub const REST_HEIGHT: f32 = CUBE_SIZE / 2.0;

#[derive(Debug, Clone)]
pub struct FallingBodies {
    bodies: BodyArena,
    rng: Pcg32,
    jitter: f32,
    gravity: f32,
    restitution: f32,
}

impl FallingBodies {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            bodies: BodyArena::new(tuning.max_bodies_per_station),
            rng: Pcg32::seed_from_u64(seed),
            jitter: tuning.drop_jitter,
            gravity: tuning.gravity,
            restitution: tuning.body_restitution,
        }
    }

    /// Drop a cube at rest from a random offset above the zone
    pub fn spawn(&mut self) -> BodyHandle {
        let dx = (self.rng.random::<f32>() - 0.5) * self.jitter;
        let dz = (self.rng.random::<f32>() - 0.5) * self.jitter;
        let pos = DROP_ZONE + Vec3::new(dx, 0.0, dz);
        let (handle, evicted) = self.bodies.insert(KinematicBody::new(pos, Vec3::ZERO));
        if evicted.is_some() {
            log::debug!("Body cap reached, recycled oldest cube");
        }
        handle
    }

    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut() {
            body.integrate(self.gravity, dt);
            body.bounce(REST_HEIGHT, REST_HEIGHT, self.restitution);
        }
    }

    pub fn bodies(&self) -> &BodyArena {
        &self.bodies
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        for body in self.bodies.iter() {
            out.push(DrawItem::new(
                Shape::Cuboid {
                    size: Vec3::splat(CUBE_SIZE),
                },
                Transform::at(body.pos),
                Material::solid(0x34d399),
            ));
        }
    }
}
