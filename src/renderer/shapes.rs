//! Triangle tessellation for scene primitives
//!
//! Every shape is emitted as a triangle list in local space, then moved to
//! world space by the item's transform. Curved shapes use `segments` slices
//! around their axis.

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use super::vertex::Vertex;
use crate::scene::{DrawItem, Shape};

/// Local-space triangle corner
type Corner = (Vec3, Vec3);

fn tri(out: &mut Vec<Corner>, a: Corner, b: Corner, c: Corner) {
    out.extend([a, b, c]);
}

fn quad(out: &mut Vec<Corner>, corners: [Vec3; 4], normal: Vec3) {
    let [a, b, c, d] = corners;
    tri(out, (a, normal), (b, normal), (c, normal));
    tri(out, (a, normal), (c, normal), (d, normal));
}

fn cuboid(out: &mut Vec<Corner>, size: Vec3) {
    let h = size / 2.0;
    // (normal, u axis, v axis)
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    for (n, u, v) in faces {
        let c = n * h;
        let u = u * h;
        let v = v * h;
        quad(out, [c - u - v, c + u - v, c + u + v, c - u + v], n);
    }
}

/// Point on the unit circle in the XZ plane, counter-clockwise seen from +Y
fn ring(i: u32, segments: u32) -> Vec2 {
    let a = i as f32 / segments as f32 * TAU;
    Vec2::new(a.cos(), -a.sin())
}

fn disc(out: &mut Vec<Corner>, radius: f32, y: f32, normal: Vec3, segments: u32) {
    let centre = Vec3::new(0.0, y, 0.0);
    for i in 0..segments {
        let p0 = ring(i, segments) * radius;
        let p1 = ring(i + 1, segments) * radius;
        let a = Vec3::new(p0.x, y, p0.y);
        let b = Vec3::new(p1.x, y, p1.y);
        if normal.y >= 0.0 {
            tri(out, (centre, normal), (a, normal), (b, normal));
        } else {
            tri(out, (centre, normal), (b, normal), (a, normal));
        }
    }
}

fn cylinder(out: &mut Vec<Corner>, radius_top: f32, radius_bottom: f32, height: f32, segments: u32) {
    let half = height / 2.0;
    let slope = (radius_bottom - radius_top) / height.max(1e-6);
    for i in 0..segments {
        let r0 = ring(i, segments);
        let r1 = ring(i + 1, segments);
        let n0 = Vec3::new(r0.x, slope, r0.y).normalize();
        let n1 = Vec3::new(r1.x, slope, r1.y).normalize();
        let b0 = Vec3::new(r0.x * radius_bottom, -half, r0.y * radius_bottom);
        let b1 = Vec3::new(r1.x * radius_bottom, -half, r1.y * radius_bottom);
        let t0 = Vec3::new(r0.x * radius_top, half, r0.y * radius_top);
        let t1 = Vec3::new(r1.x * radius_top, half, r1.y * radius_top);
        tri(out, (b0, n0), (b1, n1), (t1, n1));
        tri(out, (b0, n0), (t1, n1), (t0, n0));
    }
    disc(out, radius_top, half, Vec3::Y, segments);
    disc(out, radius_bottom, -half, Vec3::NEG_Y, segments);
}

fn sphere(out: &mut Vec<Corner>, radius: f32, segments: u32) {
    let rings = (segments / 2).max(2);
    let point = |ring_i: u32, seg_i: u32| {
        let phi = ring_i as f32 / rings as f32 * PI;
        let r = ring(seg_i, segments);
        let n = Vec3::new(r.x * phi.sin(), phi.cos(), r.y * phi.sin());
        (n * radius, n)
    };
    for j in 0..rings {
        for i in 0..segments {
            let a = point(j, i);
            let b = point(j + 1, i);
            let c = point(j + 1, i + 1);
            let d = point(j, i + 1);
            tri(out, a, b, c);
            tri(out, a, c, d);
        }
    }
}

/// Local-space corners for a shape
pub fn local_triangles(shape: &Shape, segments: u32) -> Vec<Corner> {
    let segments = segments.max(3);
    let mut out = Vec::new();
    match *shape {
        Shape::Cuboid { size } => cuboid(&mut out, size),
        Shape::Cylinder {
            radius_top,
            radius_bottom,
            height,
        } => cylinder(&mut out, radius_top, radius_bottom, height, segments),
        Shape::Sphere { radius } => sphere(&mut out, radius, segments),
        Shape::Disc { radius } => disc(&mut out, radius, 0.0, Vec3::Y, segments),
        Shape::Quad { width, height } => {
            let (w, h) = (width / 2.0, height / 2.0);
            quad(
                &mut out,
                [
                    Vec3::new(-w, -h, 0.0),
                    Vec3::new(w, -h, 0.0),
                    Vec3::new(w, h, 0.0),
                    Vec3::new(-w, h, 0.0),
                ],
                Vec3::Z,
            );
        }
    }
    out
}

/// Append the world-space triangles of one draw item
pub fn push_item(out: &mut Vec<Vertex>, item: &DrawItem, segments: u32) {
    let matrix = item.transform.matrix();
    let rotation = item.transform.rotation;
    let color = item.material.base_rgba();
    let emissive = item.material.emissive_rgb();
    out.extend(
        local_triangles(&item.shape, segments)
            .into_iter()
            .map(|(p, n)| Vertex::new(matrix.transform_point3(p), rotation * n, color, emissive)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Transform};
    use glam::Quat;

    #[test]
    fn test_vertex_counts() {
        let cube = Shape::Cuboid { size: Vec3::ONE };
        assert_eq!(local_triangles(&cube, 16).len(), 36);
        let quad = Shape::Quad {
            width: 1.0,
            height: 1.0,
        };
        assert_eq!(local_triangles(&quad, 16).len(), 6);
        let disc = Shape::Disc { radius: 1.0 };
        assert_eq!(local_triangles(&disc, 16).len(), 48);
        let cyl = Shape::Cylinder {
            radius_top: 1.0,
            radius_bottom: 1.0,
            height: 1.0,
        };
        assert_eq!(local_triangles(&cyl, 10).len(), 10 * 12);
    }

    #[test]
    fn test_fewer_segments_fewer_triangles() {
        let sphere = Shape::Sphere { radius: 1.0 };
        assert!(local_triangles(&sphere, 10).len() < local_triangles(&sphere, 28).len());
    }

    #[test]
    fn test_normals_are_unit_and_point_outward() {
        let shapes = [
            Shape::Cuboid {
                size: Vec3::new(1.0, 2.0, 3.0),
            },
            Shape::Sphere { radius: 0.5 },
            Shape::Cylinder {
                radius_top: 0.5,
                radius_bottom: 0.5,
                height: 1.0,
            },
        ];
        for shape in shapes {
            for (p, n) in local_triangles(&shape, 12) {
                assert!((n.length() - 1.0).abs() < 1e-4);
                assert!(p.dot(n) >= -1e-4, "{:?}: {:?} {:?}", shape, p, n);
            }
        }
    }

    #[test]
    fn test_disc_winding_faces_up() {
        let tris = local_triangles(&Shape::Disc { radius: 1.0 }, 8);
        for t in tris.chunks(3) {
            let face = (t[1].0 - t[0].0).cross(t[2].0 - t[0].0);
            assert!(face.y > 0.0);
        }
    }

    #[test]
    fn test_push_item_applies_transform() {
        let item = DrawItem::new(
            Shape::Quad {
                width: 2.0,
                height: 2.0,
            },
            Transform::at(Vec3::new(0.0, 1.0, -2.0))
                .with_rotation(Quat::from_rotation_y(std::f32::consts::PI)),
            Material::glowing(0xff0000, 0x00ff00),
        );
        let mut out = Vec::new();
        push_item(&mut out, &item, 8);
        assert_eq!(out.len(), 6);
        for v in &out {
            assert!((v.position[2] + 2.0).abs() < 1e-5);
            assert!((v.normal[2] + 1.0).abs() < 1e-5);
            assert_eq!(v.color, [1.0, 0.0, 0.0, 1.0]);
            assert_eq!(v.emissive, [0.0, 1.0, 0.0]);
        }
    }
}
