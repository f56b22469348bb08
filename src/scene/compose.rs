//! Static lab layout
//!
//! Room, floor, three benches with signs, teleport markers and the fixed
//! props of each station. Built once when a session starts.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use super::{Material, Scene, Shape, StationId, TeleportMarker, Transform, panel};
use crate::consts::{MARKER_HEIGHT, MARKER_RADIUS};

/// Bench row depth (z of every bench centre)
pub const BENCH_Z: f32 = -2.0;
/// Benchtop surface height
pub const BENCH_TOP: f32 = 0.9;
/// z of the station signs and teleport markers
pub const STATION_FRONT_Z: f32 = -1.2;

/// Build the full static environment
pub fn compose() -> Scene {
    let mut scene = Scene::new();

    add_room(&mut scene);
    for station in StationId::ALL {
        add_bench(&mut scene, station.bench_x(), BENCH_Z);
    }
    add_signs(&mut scene);
    add_markers(&mut scene);
    add_physics_props(&mut scene);
    add_chemistry_props(&mut scene);
    add_circuit_props(&mut scene);

    log::info!(
        "Scene composed: {} entities, {} teleport markers",
        scene.entities.len(),
        scene.markers.len()
    );
    scene
}

fn add_room(scene: &mut Scene) {
    scene.add(
        "floor",
        Shape::Disc { radius: 20.0 },
        Transform::at(Vec3::ZERO),
        Material::solid(0x0f172a),
    );
    scene.add(
        "room",
        Shape::Cuboid {
            size: Vec3::new(16.0, 4.0, 16.0),
        },
        Transform::at(Vec3::new(0.0, 2.0, 0.0)),
        Material::solid(0x0b1220),
    );
}

fn add_bench(scene: &mut Scene, x: f32, z: f32) {
    scene.add(
        "bench_top",
        Shape::Cuboid {
            size: Vec3::new(2.2, 0.1, 1.0),
        },
        Transform::at(Vec3::new(x, BENCH_TOP, z)),
        Material::solid(0x1f2937),
    );
    for (lx, lz) in [(-1.0, 0.4), (1.0, 0.4), (-1.0, -0.4), (1.0, -0.4)] {
        scene.add(
            "bench_leg",
            Shape::Cylinder {
                radius_top: 0.05,
                radius_bottom: 0.05,
                height: 0.9,
            },
            Transform::at(Vec3::new(x + lx * 0.9, 0.45, z + lz)),
            Material::solid(0x334155),
        );
    }
}

fn add_signs(scene: &mut Scene) {
    let signs = [
        ("Physics Station", Vec3::new(-3.0, 1.6, STATION_FRONT_Z)),
        ("Chemistry Station", Vec3::new(0.0, 1.6, STATION_FRONT_Z)),
        ("AI Station", Vec3::new(3.0, 1.6, STATION_FRONT_Z)),
        (
            "Toggle Safety Goggles (G) before mixing",
            Vec3::new(0.0, 1.7, -1.4),
        ),
        (
            "Progress Terminal\nView your XP and badges here.",
            Vec3::new(1.2, 1.6, 1.2),
        ),
    ];
    for (text, position) in signs {
        let id = scene.next_entity_id();
        scene.entities.push(panel(id, "sign", text, position));
    }
}

fn add_markers(scene: &mut Scene) {
    for station in StationId::ALL {
        let position = Vec3::new(station.bench_x(), MARKER_HEIGHT, STATION_FRONT_Z);
        let entity = scene.add(
            "teleport_marker",
            Shape::Disc {
                radius: MARKER_RADIUS,
            },
            Transform::at(position),
            Material::translucent(0x38bdf8, 0.35),
        );
        scene.markers.push(TeleportMarker {
            station,
            entity,
            position,
            radius: MARKER_RADIUS,
        });
    }
}

fn add_physics_props(scene: &mut Scene) {
    // Barrel lies along +X
    scene.add(
        "launcher_barrel",
        Shape::Cylinder {
            radius_top: 0.05,
            radius_bottom: 0.05,
            height: 0.6,
        },
        Transform::at(crate::sim::projectile::BARREL_CENTER)
            .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
        Material::solid(0xf97316),
    );
    scene.add(
        "pendulum_mount",
        Shape::Cuboid {
            size: Vec3::new(0.3, 0.05, 0.05),
        },
        Transform::at(crate::sim::pendulum::PIVOT),
        Material::solid(0x64748b),
    );
    scene.add(
        "collision_ground",
        Shape::Quad {
            width: 2.0,
            height: 2.0,
        },
        Transform::at(Vec3::new(-3.0, 0.01, -0.8)).with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
        Material::solid(0x0a0f1f),
    );
}

fn add_chemistry_props(scene: &mut Scene) {
    for x in [0.0, 0.3] {
        scene.add(
            "beaker",
            Shape::Cylinder {
                radius_top: 0.12,
                radius_bottom: 0.14,
                height: 0.25,
            },
            Transform::at(Vec3::new(x, 0.95, BENCH_Z)),
            Material::translucent(0xffffff, 0.25),
        );
    }
}

fn add_circuit_props(scene: &mut Scene) {
    scene.add(
        "circuit_board",
        Shape::Cuboid {
            size: Vec3::new(0.8, 0.05, 0.5),
        },
        Transform::at(Vec3::new(3.0, 1.0, BENCH_Z)),
        Material::solid(0x111827),
    );
    scene.add(
        "battery",
        Shape::Cylinder {
            radius_top: 0.04,
            radius_bottom: 0.04,
            height: 0.12,
        },
        Transform::at(Vec3::new(2.8, 1.06, BENCH_Z)),
        Material::solid(0x93c5fd),
    );
    scene.add(
        "resistor",
        Shape::Cuboid {
            size: Vec3::new(0.1, 0.05, 0.04),
        },
        Transform::at(Vec3::new(3.0, 1.06, BENCH_Z)),
        Material::solid(0x14b8a6),
    );
    // Wire runs battery -> resistor -> bulb
    scene.add(
        "wire",
        Shape::Cylinder {
            radius_top: 0.006,
            radius_bottom: 0.006,
            height: 0.4,
        },
        Transform::at(Vec3::new(3.0, 1.04, BENCH_Z + 0.04))
            .with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
        Material::solid(0xb45309),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_markers_one_per_station() {
        let scene = compose();
        assert_eq!(scene.markers.len(), 3);
        for station in StationId::ALL {
            let marker = scene.marker(station).unwrap();
            assert_eq!(marker.position.x, station.bench_x());
            assert_eq!(marker.position.z, STATION_FRONT_Z);
            assert!(scene.get(marker.entity).is_some());
        }
    }

    #[test]
    fn test_benches_have_four_legs() {
        let scene = compose();
        let tops = scene.entities.iter().filter(|e| e.name == "bench_top").count();
        let legs = scene.entities.iter().filter(|e| e.name == "bench_leg").count();
        assert_eq!(tops, 3);
        assert_eq!(legs, 12);
    }

    #[test]
    fn test_station_signs() {
        let scene = compose();
        let labels: Vec<&str> = scene.labels().collect();
        assert!(labels.contains(&"Physics Station"));
        assert!(labels.contains(&"Chemistry Station"));
        assert!(labels.contains(&"AI Station"));
        assert!(labels.iter().any(|l| l.contains("Safety Goggles")));
    }

    #[test]
    fn test_entity_ids_unique() {
        let scene = compose();
        let mut ids: Vec<_> = scene.entities.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), scene.entities.len());
    }
}
