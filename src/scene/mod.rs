//! Scene entities and the static lab environment
//!
//! The composer builds the room once at session start. Stations produce
//! their own dynamic entities each frame from simulation state.

pub mod compose;

pub use compose::compose;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::hex_rgba;

/// Stable entity identifier within one scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Mesh primitive. Dimensions are in metres, centred on the local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Cuboid { size: Vec3 },
    /// Axis along local Y
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
    },
    Sphere { radius: f32 },
    /// Flat disc in the local XZ plane, facing +Y
    Disc { radius: f32 },
    /// Flat rectangle in the local XY plane, facing +Z
    Quad { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.translation)
    }
}

/// Surface appearance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Base colour, `0xRRGGBB`
    pub color: u32,
    pub opacity: f32,
    /// Self-illumination, `0xRRGGBB` (black = none)
    pub emissive: u32,
}

impl Material {
    pub const fn solid(color: u32) -> Self {
        Self {
            color,
            opacity: 1.0,
            emissive: 0x000000,
        }
    }

    pub const fn translucent(color: u32, opacity: f32) -> Self {
        Self {
            color,
            opacity,
            emissive: 0x000000,
        }
    }

    pub const fn glowing(color: u32, emissive: u32) -> Self {
        Self {
            color,
            opacity: 1.0,
            emissive,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    pub fn base_rgba(&self) -> [f32; 4] {
        hex_rgba(self.color, self.opacity)
    }

    pub fn emissive_rgb(&self) -> [f32; 3] {
        let [r, g, b, _] = hex_rgba(self.emissive, 1.0);
        [r, g, b]
    }
}

/// One mesh to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub shape: Shape,
    pub transform: Transform,
    pub material: Material,
}

impl DrawItem {
    pub fn new(shape: Shape, transform: Transform, material: Material) -> Self {
        Self {
            shape,
            transform,
            material,
        }
    }
}

/// A positioned, renderable object
#[derive(Debug, Clone, PartialEq)]
pub struct SceneEntity {
    pub id: EntityId,
    pub name: &'static str,
    pub shape: Shape,
    pub transform: Transform,
    pub material: Material,
    /// Panel caption (panels and overlays only)
    pub label: Option<String>,
}

impl SceneEntity {
    pub fn draw_item(&self) -> DrawItem {
        DrawItem::new(self.shape, self.transform, self.material)
    }
}

/// Thematic areas of the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationId {
    Physics,
    Chemistry,
    Ai,
}

impl StationId {
    pub const ALL: [StationId; 3] = [StationId::Physics, StationId::Chemistry, StationId::Ai];

    pub fn as_str(&self) -> &'static str {
        match self {
            StationId::Physics => "physics",
            StationId::Chemistry => "chemistry",
            StationId::Ai => "ai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == s)
    }

    /// Bench centre on the floor plane
    pub fn bench_x(&self) -> f32 {
        match self {
            StationId::Physics => -3.0,
            StationId::Chemistry => 0.0,
            StationId::Ai => 3.0,
        }
    }
}

/// Floor target that relocates the viewpoint to a station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportMarker {
    pub station: StationId,
    pub entity: EntityId,
    pub position: Vec3,
    pub radius: f32,
}

/// The static environment
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub entities: Vec<SceneEntity>,
    pub markers: Vec<TeleportMarker>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            markers: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn add(
        &mut self,
        name: &'static str,
        shape: Shape,
        transform: Transform,
        material: Material,
    ) -> EntityId {
        let id = self.next_entity_id();
        self.entities.push(SceneEntity {
            id,
            name,
            shape,
            transform,
            material,
            label: None,
        });
        id
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn marker(&self, station: StationId) -> Option<&TeleportMarker> {
        self.markers.iter().find(|m| m.station == station)
    }

    /// Every labelled panel caption
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().filter_map(|e| e.label.as_deref())
    }
}

/// Panel dimensions shared by station signs and overlays
pub const PANEL_WIDTH: f32 = 1.2;
pub const PANEL_HEIGHT: f32 = 0.6;
/// Point every panel turns to face (room centre at eye level)
pub const PANEL_FOCUS: Vec3 = Vec3::new(0.0, 1.6, 0.0);

/// Rotation turning local +Z toward `target` without roll
pub fn facing(from: Vec3, target: Vec3) -> Quat {
    let d = target - from;
    if d.length_squared() < 1e-8 {
        return Quat::IDENTITY;
    }
    let yaw = d.x.atan2(d.z);
    let pitch = d.y.atan2(Vec3::new(d.x, 0.0, d.z).length());
    Quat::from_rotation_y(yaw) * Quat::from_rotation_x(-pitch)
}

/// Translucent labelled panel facing the room centre
pub fn panel(id: EntityId, name: &'static str, text: &str, position: Vec3) -> SceneEntity {
    SceneEntity {
        id,
        name,
        shape: Shape::Quad {
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
        },
        transform: Transform::at(position).with_rotation(facing(position, PANEL_FOCUS)),
        material: Material::translucent(0x0ea5e9, 0.18),
        label: Some(text.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_points_local_z_at_target() {
        let from = Vec3::new(-3.0, 1.6, -1.2);
        let q = facing(from, PANEL_FOCUS);
        let forward = q * Vec3::Z;
        let expected = (PANEL_FOCUS - from).normalize();
        assert!((forward - expected).length() < 1e-5);
    }

    #[test]
    fn test_facing_with_elevation_has_no_roll() {
        let from = Vec3::new(0.0, 1.8, -1.6);
        let q = facing(from, PANEL_FOCUS);
        let forward = q * Vec3::Z;
        assert!((forward - (PANEL_FOCUS - from).normalize()).length() < 1e-5);
        // local X stays horizontal
        assert!((q * Vec3::X).y.abs() < 1e-5);
    }

    #[test]
    fn test_material_transparency() {
        assert!(Material::translucent(0x38bdf8, 0.35).is_transparent());
        assert!(!Material::solid(0x1f2937).is_transparent());
        assert_eq!(Material::glowing(0xfbbf24, 0xf59e0b).emissive_rgb()[2], 11.0 / 255.0);
    }
}
