//! Roof and wall geometry for the custom house.
//!
//! Outlines are in the house's local frame (world units, centred on the
//! outline centroid). Gabled and hipped roofs are built over the outline's
//! bounding rectangle with the ridge along the longer axis.

use glam::{Vec2, Vec3};

use crate::mesh::Mesh;
use yardplan_designer::RoofType;

/// Sides within this fraction of each other get a pyramid hip roof.
const SQUARE_TOLERANCE: f32 = 0.05;

/// Extruded walls plus the roof for `roof`.
pub fn house_mesh(outline: &[Vec2], wall_height: f32, roof: RoofType, rise: f32) -> (Mesh, Mesh) {
    let walls = Mesh::prism(outline, 0.0, wall_height);
    let roof = roof_mesh(outline, wall_height, roof, rise);
    (walls, roof)
}

pub fn roof_mesh(outline: &[Vec2], wall_height: f32, roof: RoofType, rise: f32) -> Mesh {
    match roof {
        RoofType::Flat => flat_roof(outline, wall_height),
        RoofType::Gabled => gabled_roof(outline, wall_height, rise),
        RoofType::Hipped => hipped_roof(outline, wall_height, rise),
    }
}

/// Thin slab following the outline exactly.
pub fn flat_roof(outline: &[Vec2], wall_height: f32) -> Mesh {
    let thickness = 0.5;
    Mesh::prism(outline, wall_height, wall_height + thickness)
}

fn outline_bounds(outline: &[Vec2]) -> (Vec2, Vec2) {
    outline.iter().fold(
        (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
        |(lo, hi), p| (lo.min(*p), hi.max(*p)),
    )
}

/// Swaps x/y so the ridge can always be built along x.
fn axis(p: Vec3, ridge_along_x: bool) -> Vec3 {
    if ridge_along_x {
        p
    } else {
        Vec3::new(p.y, p.x, p.z)
    }
}

fn oriented(positions: Vec<Vec3>, mut triangles: Vec<[u32; 3]>, ridge_along_x: bool) -> Mesh {
    if !ridge_along_x {
        // The x/y swap mirrors the mesh
        for t in &mut triangles {
            t.swap(1, 2);
        }
    }
    Mesh::new(positions, triangles)
}

/// Triangular prism with the ridge at `wall_height + rise`.
pub fn gabled_roof(outline: &[Vec2], wall_height: f32, rise: f32) -> Mesh {
    if outline.len() < 3 {
        return Mesh::default();
    }
    let (min, max) = outline_bounds(outline);
    let ridge_along_x = (max.x - min.x) >= (max.y - min.y);
    let (lo, hi) = if ridge_along_x {
        (min, max)
    } else {
        (Vec2::new(min.y, min.x), Vec2::new(max.y, max.x))
    };
    let mid = (lo.y + hi.y) / 2.0;
    let (z0, z1) = (wall_height, wall_height + rise);

    let positions: Vec<Vec3> = [
        Vec3::new(lo.x, lo.y, z0),
        Vec3::new(hi.x, lo.y, z0),
        Vec3::new(hi.x, hi.y, z0),
        Vec3::new(lo.x, hi.y, z0),
        Vec3::new(lo.x, mid, z1),
        Vec3::new(hi.x, mid, z1),
    ]
    .into_iter()
    .map(|p| axis(p, ridge_along_x))
    .collect();

    let triangles = vec![
        [0, 1, 5], [0, 5, 4], // south slope
        [2, 3, 4], [2, 4, 5], // north slope
        [0, 4, 3],            // west gable
        [1, 2, 5],            // east gable
        [0, 3, 2], [0, 2, 1], // soffit
    ];
    oriented(positions, triangles, ridge_along_x)
}

/// Four sloped faces meeting at an apex (near-square footprint) or along
/// a ridge shortened by the short side at both ends.
pub fn hipped_roof(outline: &[Vec2], wall_height: f32, rise: f32) -> Mesh {
    if outline.len() < 3 {
        return Mesh::default();
    }
    let (min, max) = outline_bounds(outline);
    let ridge_along_x = (max.x - min.x) >= (max.y - min.y);
    let (lo, hi) = if ridge_along_x {
        (min, max)
    } else {
        (Vec2::new(min.y, min.x), Vec2::new(max.y, max.x))
    };
    let long = hi.x - lo.x;
    let short = hi.y - lo.y;
    let mid = (lo + hi) / 2.0;
    let (z0, z1) = (wall_height, wall_height + rise);

    let base = [
        Vec3::new(lo.x, lo.y, z0),
        Vec3::new(hi.x, lo.y, z0),
        Vec3::new(hi.x, hi.y, z0),
        Vec3::new(lo.x, hi.y, z0),
    ];

    let (positions, triangles) = if long - short <= long * SQUARE_TOLERANCE {
        let mut positions = base.to_vec();
        positions.push(Vec3::new(mid.x, mid.y, z1));
        let triangles = vec![
            [0, 1, 4],
            [1, 2, 4],
            [2, 3, 4],
            [3, 0, 4],
            [0, 3, 2],
            [0, 2, 1],
        ];
        (positions, triangles)
    } else {
        let half_ridge = (long - short) / 2.0;
        let mut positions = base.to_vec();
        positions.push(Vec3::new(mid.x - half_ridge, mid.y, z1));
        positions.push(Vec3::new(mid.x + half_ridge, mid.y, z1));
        let triangles = vec![
            [0, 1, 5], [0, 5, 4], // south trapezoid
            [2, 3, 4], [2, 4, 5], // north trapezoid
            [3, 0, 4],            // west hip
            [1, 2, 5],            // east hip
            [0, 3, 2], [0, 2, 1], // soffit
        ];
        (positions, triangles)
    };

    let positions = positions
        .into_iter()
        .map(|p| axis(p, ridge_along_x))
        .collect();
    oriented(positions, triangles, ridge_along_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::triangle_normal;

    fn rect(w: f32, d: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-w / 2.0, -d / 2.0),
            Vec2::new(w / 2.0, -d / 2.0),
            Vec2::new(w / 2.0, d / 2.0),
            Vec2::new(-w / 2.0, d / 2.0),
        ]
    }

    fn slopes_face_up(mesh: &Mesh) -> bool {
        // Every non-horizontal face must point up; the soffit points down.
        mesh.triangle_vertices().all(|tri| {
            let n = triangle_normal(&tri);
            let flat = tri.iter().all(|p| (p.z - tri[0].z).abs() < 1e-5);
            if flat {
                n.z < 0.0
            } else {
                n.z >= -1e-5
            }
        })
    }

    #[test]
    fn test_gabled_apex_height() {
        for (w, d) in [(40.0, 20.0), (20.0, 40.0)] {
            let roof = gabled_roof(&rect(w, d), 10.0, 5.0);
            assert!((roof.bounds_max.z - 15.0).abs() < 1e-5);
            assert!((roof.bounds_min.z - 10.0).abs() < 1e-5);
            assert!(slopes_face_up(&roof));
        }
    }

    #[test]
    fn test_gabled_ridge_follows_long_axis() {
        let roof = gabled_roof(&rect(20.0, 40.0), 10.0, 5.0);
        let ridge: Vec<&Vec3> = roof.positions.iter().filter(|p| p.z > 14.9).collect();
        assert_eq!(ridge.len(), 2);
        assert!(ridge.iter().all(|p| p.x.abs() < 1e-5));
    }

    #[test]
    fn test_hipped_square_is_pyramid() {
        let roof = hipped_roof(&rect(30.0, 30.0), 12.0, 7.5);
        let apex: Vec<&Vec3> = roof.positions.iter().filter(|p| p.z > 19.0).collect();
        assert_eq!(apex.len(), 1);
        assert!((apex[0].z - 19.5).abs() < 1e-5);
        assert!(slopes_face_up(&roof));
    }

    #[test]
    fn test_hipped_ridge_length() {
        let roof = hipped_roof(&rect(50.0, 20.0), 10.0, 5.0);
        let ridge: Vec<&Vec3> = roof.positions.iter().filter(|p| p.z > 14.9).collect();
        assert_eq!(ridge.len(), 2);
        assert!((ridge[0].distance(*ridge[1]) - 30.0).abs() < 1e-4);
        assert!(slopes_face_up(&roof));
    }

    #[test]
    fn test_flat_roof_sits_on_walls() {
        let (walls, roof) = house_mesh(&rect(10.0, 10.0), 9.0, RoofType::Flat, 0.0);
        assert!((walls.bounds_max.z - 9.0).abs() < 1e-5);
        assert!((roof.bounds_min.z - 9.0).abs() < 1e-5);
    }
}
