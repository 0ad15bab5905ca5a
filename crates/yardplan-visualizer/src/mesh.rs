//! # Triangle meshes
//!
//! Indexed triangle meshes in world units (Z up) plus the procedural
//! primitives the scene is built from: boxes, cylinders, cones and
//! polygon extrusions. Polygon caps are triangulated with lyon.

use glam::{Mat4, Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{BuffersBuilder, FillOptions, FillTessellator, FillVertex, VertexBuffers};
use std::fs::File;
use std::path::Path as FsPath;

use yardplan_core::AssetError;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    /// Counter-clockwise seen from outside.
    pub triangles: Vec<[u32; 3]>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

/// Surface appearance of a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    /// Diffuse color (RGBA, 0..1)
    pub diffuse_color: [f32; 4],
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self {
            diffuse_color: [0.7, 0.7, 0.7, 1.0],
        }
    }
}

impl MeshMaterial {
    /// Opaque material from 8-bit RGB.
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        Self {
            diffuse_color: [
                rgb[0] as f32 / 255.0,
                rgb[1] as f32 / 255.0,
                rgb[2] as f32 / 255.0,
                1.0,
            ],
        }
    }

    pub fn rgb8(&self) -> [u8; 3] {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            c(self.diffuse_color[0]),
            c(self.diffuse_color[1]),
            c(self.diffuse_color[2]),
        ]
    }
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let mut mesh = Self {
            positions,
            triangles,
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::ZERO,
        };
        mesh.calculate_bounds();
        mesh
    }

    fn calculate_bounds(&mut self) {
        let Some(first) = self.positions.first() else {
            self.bounds_min = Vec3::ZERO;
            self.bounds_max = Vec3::ZERO;
            return;
        };
        let (min, max) = self
            .positions
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        self.bounds_min = min;
        self.bounds_max = max;
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn size(&self) -> Vec3 {
        self.bounds_max - self.bounds_min
    }

    /// Triangle corner positions.
    pub fn triangle_vertices(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangles.iter().map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    /// Appends another mesh.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
        self.calculate_bounds();
    }

    /// Returns a copy with `transform` applied to every vertex.
    pub fn transformed(&self, transform: &Mat4) -> Mesh {
        let positions = self
            .positions
            .iter()
            .map(|p| transform.transform_point3(*p))
            .collect();
        let mut triangles = self.triangles.clone();
        // Mirroring transforms flip the winding
        if transform.determinant() < 0.0 {
            for t in &mut triangles {
                t.swap(1, 2);
            }
        }
        Mesh::new(positions, triangles)
    }

    /// Scales non-uniformly so the bounds become `size`, centred on the
    /// origin in x/y and resting on z = 0.
    pub fn fit_to_box(&self, size: Vec3) -> Mesh {
        let extent = self.size();
        let axis_scale = |target: f32, current: f32| {
            if current > f32::EPSILON {
                target / current
            } else {
                1.0
            }
        };
        let scale = Vec3::new(
            axis_scale(size.x, extent.x),
            axis_scale(size.y, extent.y),
            axis_scale(size.z, extent.z),
        );
        let center = (self.bounds_min + self.bounds_max) * 0.5;
        let anchor = Vec3::new(center.x, center.y, self.bounds_min.z);
        let transform = Mat4::from_scale(scale) * Mat4::from_translation(-anchor);
        self.transformed(&transform)
    }

    /// Axis-aligned box between two corners.
    pub fn cuboid(min: Vec3, max: Vec3) -> Mesh {
        let p = [
            Vec3::new(min.x, min.y, min.z),
            Vec3::new(max.x, min.y, min.z),
            Vec3::new(max.x, max.y, min.z),
            Vec3::new(min.x, max.y, min.z),
            Vec3::new(min.x, min.y, max.z),
            Vec3::new(max.x, min.y, max.z),
            Vec3::new(max.x, max.y, max.z),
            Vec3::new(min.x, max.y, max.z),
        ];
        let triangles = vec![
            [0, 2, 1], [0, 3, 2], // bottom
            [4, 5, 6], [4, 6, 7], // top
            [0, 1, 5], [0, 5, 4], // -y
            [1, 2, 6], [1, 6, 5], // +x
            [2, 3, 7], [2, 7, 6], // +y
            [3, 0, 4], [3, 4, 7], // -x
        ];
        Mesh::new(p.to_vec(), triangles)
    }

    /// Box of the given size standing on z = 0, centred in x/y.
    pub fn footprint_box(width: f32, depth: f32, height: f32) -> Mesh {
        Mesh::cuboid(
            Vec3::new(-width / 2.0, -depth / 2.0, 0.0),
            Vec3::new(width / 2.0, depth / 2.0, height),
        )
    }

    /// Elliptical cylinder standing on `base_z`.
    pub fn cylinder(radius_x: f32, radius_y: f32, base_z: f32, height: f32, segments: u32) -> Mesh {
        let ring = ellipse_ring(radius_x, radius_y, segments);
        Mesh::prism(&ring, base_z, base_z + height)
    }

    /// Cone with an elliptical base at `base_z` and apex `height` above it.
    pub fn cone(radius_x: f32, radius_y: f32, base_z: f32, height: f32, segments: u32) -> Mesh {
        let ring = ellipse_ring(radius_x, radius_y, segments);
        let n = ring.len() as u32;
        let mut positions: Vec<Vec3> = ring.iter().map(|p| p.extend(base_z)).collect();
        positions.push(Vec3::new(0.0, 0.0, base_z + height));
        positions.push(Vec3::new(0.0, 0.0, base_z));
        let (apex, center) = (n, n + 1);
        let mut triangles = Vec::with_capacity(n as usize * 2);
        for i in 0..n {
            let j = (i + 1) % n;
            triangles.push([i, j, apex]);
            triangles.push([j, i, center]);
        }
        Mesh::new(positions, triangles)
    }

    /// Vertical extrusion of a simple polygon between `z0` and `z1`, with
    /// both caps. Accepts either winding.
    pub fn prism(outline: &[Vec2], z0: f32, z1: f32) -> Mesh {
        let ring = counter_clockwise(outline);
        let n = ring.len() as u32;
        if n < 3 {
            return Mesh::default();
        }
        let mut mesh = Mesh::walls(&ring, z0, z1);
        let cap = triangulate_polygon(&ring);
        let mut positions: Vec<Vec3> = ring.iter().map(|p| p.extend(z0)).collect();
        positions.extend(ring.iter().map(|p| p.extend(z1)));
        let mut triangles = Vec::with_capacity(cap.len() * 2);
        for t in &cap {
            triangles.push([t[0], t[2], t[1]]);
            triangles.push([t[0] + n, t[1] + n, t[2] + n]);
        }
        mesh.merge(&Mesh::new(positions, triangles));
        mesh
    }

    /// Side walls only, for a counter-clockwise ring.
    pub fn walls(ring: &[Vec2], z0: f32, z1: f32) -> Mesh {
        let n = ring.len() as u32;
        let mut positions = Vec::with_capacity(ring.len() * 2);
        for p in ring {
            positions.push(p.extend(z0));
            positions.push(p.extend(z1));
        }
        let mut triangles = Vec::with_capacity(ring.len() * 2);
        for i in 0..n {
            let j = (i + 1) % n;
            let (a0, a1, b0, b1) = (i * 2, i * 2 + 1, j * 2, j * 2 + 1);
            triangles.push([a0, b0, b1]);
            triangles.push([a0, b1, a1]);
        }
        Mesh::new(positions, triangles)
    }

    /// Horizontal polygon at height `z`, facing up.
    pub fn cap(outline: &[Vec2], z: f32) -> Mesh {
        let ring = counter_clockwise(outline);
        let triangles = triangulate_polygon(&ring);
        Mesh::new(ring.iter().map(|p| p.extend(z)).collect(), triangles)
    }

    /// Converts an indexed STL mesh, skipping faces with bad indices.
    pub fn from_stl(stl: &stl_io::IndexedMesh) -> Mesh {
        let positions: Vec<Vec3> = stl
            .vertices
            .iter()
            .map(|v| Vec3::new(v[0], v[1], v[2]))
            .collect();
        let count = positions.len();
        let triangles = stl
            .faces
            .iter()
            .filter(|f| f.vertices.iter().all(|i| *i < count))
            .map(|f| {
                [
                    f.vertices[0] as u32,
                    f.vertices[1] as u32,
                    f.vertices[2] as u32,
                ]
            })
            .collect();
        Mesh::new(positions, triangles)
    }
}

/// Unit normal of a triangle, zero for degenerate ones.
pub fn triangle_normal(tri: &[Vec3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero()
}

/// Twice the signed area of a 2D ring; positive when counter-clockwise.
pub fn signed_area2(ring: &[Vec2]) -> f32 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum()
}

fn counter_clockwise(outline: &[Vec2]) -> Vec<Vec2> {
    let mut ring = outline.to_vec();
    if signed_area2(&ring) < 0.0 {
        ring.reverse();
    }
    ring
}

fn ellipse_ring(radius_x: f32, radius_y: f32, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            Vec2::new(radius_x * a.cos(), radius_y * a.sin())
        })
        .collect()
}

/// Triangulates a simple polygon with lyon's fill tessellator. Returned
/// indices refer to `ring` and wind counter-clockwise. A fan is used if
/// tessellation fails.
pub fn triangulate_polygon(ring: &[Vec2]) -> Vec<[u32; 3]> {
    if ring.len() < 3 {
        return Vec::new();
    }
    let mut builder = Path::builder();
    builder.begin(point(ring[0].x, ring[0].y));
    for p in &ring[1..] {
        builder.line_to(point(p.x, p.y));
    }
    builder.end(true);
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::default(),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
            Vec2::new(v.position().x, v.position().y)
        }),
    );
    if let Err(err) = result {
        tracing::warn!("Polygon tessellation failed ({:?}), using a fan", err);
        return (1..ring.len() as u32 - 1).map(|i| [0, i, i + 1]).collect();
    }

    // Map tessellator vertices back onto the ring by position.
    let nearest = |v: Vec2| {
        ring.iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_squared(v).total_cmp(&b.distance_squared(v)))
            .map(|(i, _)| i as u32)
            .unwrap_or(0)
    };
    let remap: Vec<u32> = buffers.vertices.iter().map(|v| nearest(*v)).collect();

    buffers
        .indices
        .chunks_exact(3)
        .filter_map(|c| {
            let mut t = [
                remap[c[0] as usize],
                remap[c[1] as usize],
                remap[c[2] as usize],
            ];
            let (a, b, d) = (ring[t[0] as usize], ring[t[1] as usize], ring[t[2] as usize]);
            let area = (b - a).perp_dot(d - a);
            if area.abs() <= f32::EPSILON {
                return None;
            }
            if area < 0.0 {
                t.swap(1, 2);
            }
            Some(t)
        })
        .collect()
}

/// Loads an STL file (ASCII or binary).
pub fn load_stl(path: &FsPath) -> Result<Mesh, AssetError> {
    let display = path.display().to_string();
    let mut file = File::open(path).map_err(|source| AssetError::Io {
        path: display.clone(),
        source,
    })?;
    let stl = stl_io::read_stl(&mut file).map_err(|e| AssetError::Parse {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    let mesh = Mesh::from_stl(&stl);
    if mesh.is_empty() {
        return Err(AssetError::EmptyMesh { path: display });
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward_normals_ok(mesh: &Mesh) -> bool {
        let center = (mesh.bounds_min + mesh.bounds_max) * 0.5;
        mesh.triangle_vertices().all(|tri| {
            let n = triangle_normal(&tri);
            let mid = (tri[0] + tri[1] + tri[2]) / 3.0;
            n.dot(mid - center) > 0.0
        })
    }

    #[test]
    fn test_cuboid_faces_point_outward() {
        let mesh = Mesh::footprint_box(4.0, 2.0, 3.0);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(outward_normals_ok(&mesh));
        assert_eq!(mesh.bounds_min, Vec3::new(-2.0, -1.0, 0.0));
        assert_eq!(mesh.bounds_max, Vec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_prism_of_clockwise_square_is_closed_and_outward() {
        let square = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, -1.0),
        ];
        let mesh = Mesh::prism(&square, 0.0, 2.0);
        // 4 walls x 2 + 2 caps x 2
        assert_eq!(mesh.triangle_count(), 12);
        assert!(outward_normals_ok(&mesh));
    }

    #[test]
    fn test_triangulate_concave_polygon() {
        // L-shape, area 3
        let ring = [
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(0.0, 2.0),
        ];
        let tris = triangulate_polygon(&ring);
        let area: f32 = tris
            .iter()
            .map(|t| {
                let (a, b, c) = (ring[t[0] as usize], ring[t[1] as usize], ring[t[2] as usize]);
                (b - a).perp_dot(c - a) / 2.0
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_fit_to_box_scales_non_uniformly() {
        let mesh = Mesh::cuboid(Vec3::new(3.0, 3.0, 1.0), Vec3::new(5.0, 4.0, 2.0));
        let fitted = mesh.fit_to_box(Vec3::new(10.0, 10.0, 30.0));
        assert!((fitted.size() - Vec3::new(10.0, 10.0, 30.0)).length() < 1e-4);
        assert!(fitted.bounds_min.z.abs() < 1e-5);
        assert!((fitted.bounds_min.x + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_stl_is_io_error() {
        let err = load_stl(FsPath::new("/nonexistent/tree.stl")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
