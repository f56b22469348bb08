//! Per-frame geometry assembly
//!
//! Static scene geometry is tessellated once and cached. Each frame appends
//! the dynamic station items, then every translucent item sorted far to near,
//! so a single draw call renders the whole lab.

use glam::{Mat4, Vec3};

use super::shapes::push_item;
use super::vertex::Vertex;
use crate::consts::BACKGROUND;
use crate::hex_rgba;
use crate::scene::{DrawItem, Scene};
use crate::settings::QualityTier;

/// Everything the GPU needs for one frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub view_proj: Mat4,
    pub camera_pos: Vec3,
    pub clear: [f32; 4],
    pub vertices: Vec<Vertex>,
}

/// Where assembled frames go (the wgpu surface, or a test recorder)
pub trait FrameSink {
    fn present(&mut self, frame: &Frame);
    fn resize(&mut self, width: u32, height: u32);
    fn set_quality(&mut self, tier: QualityTier);
}

pub struct FrameBuilder {
    segments: u32,
    static_opaque: Vec<Vertex>,
    static_translucent: Vec<DrawItem>,
}

impl FrameBuilder {
    pub fn new(scene: &Scene, tier: QualityTier) -> Self {
        let mut builder = Self {
            segments: tier.mesh_segments(),
            static_opaque: Vec::new(),
            static_translucent: Vec::new(),
        };
        builder.cache(scene);
        builder
    }

    fn cache(&mut self, scene: &Scene) {
        self.static_opaque.clear();
        self.static_translucent.clear();
        for entity in &scene.entities {
            let item = entity.draw_item();
            if item.material.is_transparent() {
                self.static_translucent.push(item);
            } else {
                push_item(&mut self.static_opaque, &item, self.segments);
            }
        }
        log::debug!(
            "Cached {} static vertices ({} translucent items)",
            self.static_opaque.len(),
            self.static_translucent.len()
        );
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn static_vertex_count(&self) -> usize {
        self.static_opaque.len()
    }

    /// Re-tessellate the static scene if the tier changes mesh density
    pub fn set_quality(&mut self, scene: &Scene, tier: QualityTier) {
        if tier.mesh_segments() != self.segments {
            self.segments = tier.mesh_segments();
            self.cache(scene);
        }
    }

    pub fn build(&self, view_proj: Mat4, camera_pos: Vec3, dynamic: &[DrawItem]) -> Frame {
        let mut vertices = self.static_opaque.clone();
        let mut translucent: Vec<&DrawItem> = self.static_translucent.iter().collect();

        for item in dynamic {
            if item.material.is_transparent() {
                translucent.push(item);
            } else {
                push_item(&mut vertices, item, self.segments);
            }
        }

        let distance = |item: &DrawItem| item.transform.translation.distance_squared(camera_pos);
        translucent.sort_by(|a, b| distance(b).total_cmp(&distance(a)));
        for item in translucent {
            push_item(&mut vertices, item, self.segments);
        }

        Frame {
            view_proj,
            camera_pos,
            clear: hex_rgba(BACKGROUND, 1.0),
            vertices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Shape, Transform, compose};

    #[test]
    fn test_static_geometry_is_cached_once() {
        let scene = compose();
        let builder = FrameBuilder::new(&scene, QualityTier::Medium);
        let a = builder.build(Mat4::IDENTITY, Vec3::ZERO, &[]);
        let b = builder.build(Mat4::IDENTITY, Vec3::ZERO, &[]);
        assert_eq!(a.vertices.len(), b.vertices.len());
        assert!(builder.static_vertex_count() > 0);
        assert!(a.vertices.len() > builder.static_vertex_count());
    }

    #[test]
    fn test_translucent_drawn_last_far_to_near() {
        let scene = Scene::new();
        let builder = FrameBuilder::new(&scene, QualityTier::Low);
        let quad = Shape::Quad {
            width: 1.0,
            height: 1.0,
        };
        let near = DrawItem::new(quad, Transform::at(Vec3::new(0.0, 0.0, -1.0)), Material::translucent(0x00ff00, 0.5));
        let far = DrawItem::new(quad, Transform::at(Vec3::new(0.0, 0.0, -9.0)), Material::translucent(0x0000ff, 0.5));
        let solid = DrawItem::new(quad, Transform::at(Vec3::new(0.0, 0.0, -5.0)), Material::solid(0xff0000));

        let frame = builder.build(Mat4::IDENTITY, Vec3::ZERO, &[near, far, solid]);
        assert_eq!(frame.vertices.len(), 18);
        assert_eq!(frame.vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(frame.vertices[6].color, [0.0, 0.0, 1.0, 0.5]);
        assert_eq!(frame.vertices[12].color, [0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_quality_change_retessellates() {
        let scene = compose();
        let mut builder = FrameBuilder::new(&scene, QualityTier::Low);
        let low = builder.static_vertex_count();
        builder.set_quality(&scene, QualityTier::High);
        assert!(builder.static_vertex_count() > low);
        assert_eq!(builder.segments(), QualityTier::High.mesh_segments());
    }
}
