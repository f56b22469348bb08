//! Vertex and uniform types for 3D rendering

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// World-space vertex with flat material attributes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub emissive: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, color: [f32; 4], emissive: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            color,
            emissive,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const F3: wgpu::BufferAddress = std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress;
        const F4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: F3,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: F3 * 2,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: F3 * 2 + F4,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

// ============================================================================
// GPU DATA STRUCTURES (must match shader.wgsl)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4], // offset 0
    pub camera_pos: [f32; 4],     // offset 64
    pub light_dir: [f32; 4],      // offset 80, w unused
}

/// Key light shining down and toward -Z
pub const LIGHT_DIR: Vec3 = Vec3::new(-0.3, -1.0, -0.5);

impl Globals {
    pub fn new(view_proj: Mat4, camera_pos: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            light_dir: LIGHT_DIR.normalize().extend(0.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<Vertex>(), 52);
        assert_eq!(Vertex::desc().attributes[3].offset, 40);
        assert_eq!(std::mem::size_of::<Globals>(), 96);
    }
}
