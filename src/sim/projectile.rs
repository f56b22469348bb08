//! Projectile launcher station
//!
//! Each shot is a kinematic body under gravity that bounces on the floor,
//! losing vertical speed on every contact.

use glam::Vec3;

use super::arena::{BodyArena, BodyHandle, KinematicBody};
use crate::scene::{DrawItem, Material, Shape, Transform};
use crate::tuning::Tuning;

/// Launcher base on the physics bench
pub const LAUNCHER: Vec3 = Vec3::new(-3.0, 0.9, -1.6);
/// Barrel sits 0.2 above the base, lying along +X
pub const BARREL_CENTER: Vec3 = Vec3::new(-3.0, 1.1, -1.6);
/// Muzzle end of the 0.6 m barrel
pub const BARREL_TIP: Vec3 = Vec3::new(-2.7, 1.1, -1.6);

pub const PROJECTILE_RADIUS: f32 = 0.04;
/// Height a projectile is reset to after touching the floor
pub const GROUND_EPSILON: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct ProjectileLauncher {
    bodies: BodyArena,
    muzzle_velocity: Vec3,
    gravity: f32,
    restitution: f32,
    shots: u64,
}

impl ProjectileLauncher {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            bodies: BodyArena::new(tuning.max_bodies_per_station),
            muzzle_velocity: Vec3::from_array(tuning.muzzle_velocity),
            gravity: tuning.gravity,
            restitution: tuning.projectile_restitution,
            shots: 0,
        }
    }

    /// Spawn a projectile at the barrel tip
    pub fn fire(&mut self) -> BodyHandle {
        let (handle, evicted) = self
            .bodies
            .insert(KinematicBody::new(BARREL_TIP, self.muzzle_velocity));
        self.shots += 1;
        if evicted.is_some() {
            log::debug!("Projectile cap reached, recycled oldest shot");
        }
        handle
    }

    pub fn step(&mut self, dt: f32) {
        for body in self.bodies.iter_mut() {
            body.integrate(self.gravity, dt);
            body.bounce(0.0, GROUND_EPSILON, self.restitution);
        }
    }

    pub fn bodies(&self) -> &BodyArena {
        &self.bodies
    }

    pub fn shots(&self) -> u64 {
        self.shots
    }

    pub fn draw(&self, out: &mut Vec<DrawItem>) {
        for body in self.bodies.iter() {
            out.push(DrawItem::new(
                Shape::Sphere {
                    radius: PROJECTILE_RADIUS,
                },
                Transform::at(body.pos),
                Material::solid(0x22d3ee),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    #[test]
    fn test_fire_spawns_at_barrel_tip() {
        let mut launcher = ProjectileLauncher::new(&Tuning::default());
        let h = launcher.fire();
        let body = launcher.bodies().get(h).unwrap();
        assert_eq!(body.pos, BARREL_TIP);
        assert_eq!(body.vel, Vec3::new(3.0, 1.2, 0.0));
    }

    #[test]
    fn test_bounce_peaks_decay_and_never_go_below_ground() {
        let mut launcher = ProjectileLauncher::new(&Tuning::default());
        let h = launcher.fire();

        let mut peaks = Vec::new();
        let mut current_peak: Option<f32> = None;
        let mut last_bounces = 0;

        for _ in 0..2_000 {
            launcher.step(DT);
            let body = launcher.bodies().get(h).unwrap();
            assert!(body.pos.y >= 0.0);

            if body.bounces != last_bounces {
                if let Some(peak) = current_peak.take() {
                    peaks.push(peak);
                }
                last_bounces = body.bounces;
                current_peak = Some(body.pos.y);
            } else if let Some(peak) = current_peak.as_mut() {
                *peak = peak.max(body.pos.y);
            }
        }

        assert!(peaks.len() >= 4);
        for pair in peaks[..4].windows(2) {
            assert!(pair[1] < pair[0], "peaks must shrink: {:?}", peaks);
        }
    }

    #[test]
    fn test_restitution_scales_vertical_speed() {
        let mut launcher = ProjectileLauncher::new(&Tuning::default());
        let h = launcher.fire();
        let mut before = 0.0;
        for _ in 0..500 {
            let vy = launcher.bodies().get(h).unwrap().vel.y;
            launcher.step(DT);
            let body = launcher.bodies().get(h).unwrap();
            if body.bounces == 1 {
                before = vy - 9.81 * DT;
                let after = body.vel.y;
                assert!((after - (-before * 0.6)).abs() < 1e-4);
                break;
            }
        }
        assert!(before < 0.0);
    }

    #[test]
    fn test_shots_are_capped() {
        let tuning = Tuning {
            max_bodies_per_station: 5,
            ..Tuning::default()
        };
        let mut launcher = ProjectileLauncher::new(&tuning);
        for _ in 0..50 {
            launcher.fire();
        }
        assert_eq!(launcher.bodies().len(), 5);
        assert_eq!(launcher.shots(), 50);
    }
}
