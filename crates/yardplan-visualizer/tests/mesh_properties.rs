//! Numeric properties of mesh building and lighting.

use glam::{Vec2, Vec3};
use proptest::prelude::*;
use yardplan_designer::Season;
use yardplan_visualizer::lighting::{AMBIENT_INTENSITY, PEAK_INTENSITY};
use yardplan_visualizer::mesh::{signed_area2, triangulate_polygon};
use yardplan_visualizer::{Mesh, SiteLocation, SolarCalculator, SunLight};

/// Star-shaped ring: strictly increasing angles with varying radii.
fn star_ring(radii: &[f32]) -> Vec<Vec2> {
    let n = radii.len() as f32;
    radii
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let a = i as f32 / n * std::f32::consts::TAU;
            Vec2::new(r * a.cos(), r * a.sin())
        })
        .collect()
}

proptest! {
    #[test]
    fn fit_to_box_hits_target_size(
        min in (-50.0f32..50.0, -50.0f32..50.0, -10.0f32..10.0),
        extent in (0.5f32..40.0, 0.5f32..40.0, 0.5f32..40.0),
        target in (1.0f32..30.0, 1.0f32..30.0, 1.0f32..30.0),
    ) {
        let min = Vec3::new(min.0, min.1, min.2);
        let mesh = Mesh::cuboid(min, min + Vec3::new(extent.0, extent.1, extent.2));
        let target = Vec3::new(target.0, target.1, target.2);
        let fitted = mesh.fit_to_box(target);

        prop_assert!((fitted.size() - target).abs().max_element() < 1e-3);
        prop_assert!(fitted.bounds_min.z.abs() < 1e-3);
        let center = (fitted.bounds_min + fitted.bounds_max) * 0.5;
        prop_assert!(center.x.abs() < 1e-3 && center.y.abs() < 1e-3);
    }

    #[test]
    fn triangulation_covers_star_polygon(radii in prop::collection::vec(2.0f32..20.0, 3..12)) {
        let ring = star_ring(&radii);
        let triangles = triangulate_polygon(&ring);
        prop_assert!(!triangles.is_empty());

        let covered: f32 = triangles
            .iter()
            .map(|t| {
                let (a, b, c) = (ring[t[0] as usize], ring[t[1] as usize], ring[t[2] as usize]);
                (b - a).perp_dot(c - a) / 2.0
            })
            .sum();
        let area = signed_area2(&ring) / 2.0;
        prop_assert!((covered - area).abs() <= area * 1e-3);
    }

    #[test]
    fn sun_intensity_stays_in_range(
        season in prop::sample::select(Season::ALL.to_vec()),
        hour in 0.0f64..24.0,
        latitude in -66.0f64..66.0,
    ) {
        let site = SiteLocation { latitude, ..SiteLocation::default() };
        let sun = SunLight::compute(&SolarCalculator, &site, season, hour, 2024);
        prop_assert!((0.0..=PEAK_INTENSITY).contains(&sun.intensity));
        prop_assert!((sun.direction.length() - 1.0).abs() < 1e-4);
        let up = sun.shade(Vec3::Z);
        prop_assert!((AMBIENT_INTENSITY..=1.0).contains(&up));
    }
}
