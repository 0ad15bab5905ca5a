//! Flat-shaded software rendering of the 3D view into a tiny-skia pixmap.
//!
//! Triangles are back-face culled, sorted far to near and filled in that
//! order. Used for image export; interactive display is up to the host.

use glam::Vec4;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::camera::OrbitCamera;
use crate::lighting::SunLight;
use crate::mesh::triangle_normal;
use crate::scene::{NodeTag, Scene};
use yardplan_designer::SelectionTarget;

const SKY_DAY: [f32; 3] = [0.63, 0.78, 0.92];
const SKY_NIGHT: [f32; 3] = [0.08, 0.1, 0.2];
const SELECTION_TINT: [f32; 3] = [1.0, 0.85, 0.2];

struct ScreenTriangle {
    points: [(f32, f32); 3],
    depth: f32,
    color: [f32; 3],
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn to_color(rgb: [f32; 3]) -> Color {
    Color::from_rgba(
        rgb[0].clamp(0.0, 1.0),
        rgb[1].clamp(0.0, 1.0),
        rgb[2].clamp(0.0, 1.0),
        1.0,
    )
    .unwrap_or(Color::BLACK)
}

/// Sky colour for the light; also what empty pixels contain.
pub fn sky_color(light: &SunLight) -> [f32; 3] {
    let day = (light.intensity * 3.0).clamp(0.0, 1.0);
    lerp3(SKY_NIGHT, SKY_DAY, day)
}

fn is_selected(tag: Option<NodeTag>, selection: Option<SelectionTarget>) -> bool {
    matches!(
        (tag, selection),
        (Some(NodeTag::Element(a)), Some(SelectionTarget::Element(b))) if a == b
    ) || matches!(
        (tag, selection),
        (Some(NodeTag::CustomHouse), Some(SelectionTarget::CustomHouse))
    )
}

/// Renders `scene` as seen by `camera`. Returns `None` for a zero-sized
/// image.
pub fn render_scene(
    scene: &Scene,
    camera: &OrbitCamera,
    light: &SunLight,
    width: u32,
    height: u32,
) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(to_color(sky_color(light)));

    let mut camera = *camera;
    camera.update_aspect_ratio(width as f32, height as f32);
    let view_proj = camera.view_projection();
    let eye = camera.eye_position();
    let (w, h) = (width as f32, height as f32);

    let mut triangles = Vec::new();
    for instance in scene.mesh_instances() {
        let selected = is_selected(scene.owner_tag(instance.node), scene.selection());
        let base = instance.material.diffuse_color;
        let base = [base[0], base[1], base[2]];
        let base = if selected {
            lerp3(base, SELECTION_TINT, 0.45)
        } else {
            base
        };

        for tri in instance.mesh.triangle_vertices() {
            let world = tri.map(|p| instance.transform.transform_point3(p));
            let normal = triangle_normal(&world);
            let center = (world[0] + world[1] + world[2]) / 3.0;
            if normal.dot(eye - center) <= 0.0 {
                continue;
            }

            let clip = world.map(|p| view_proj * Vec4::new(p.x, p.y, p.z, 1.0));
            if clip.iter().any(|c| c.w <= camera.near) {
                continue;
            }
            let points = clip.map(|c| {
                let ndc = c.truncate() / c.w;
                ((ndc.x + 1.0) * 0.5 * w, (1.0 - ndc.y) * 0.5 * h)
            });

            let shade = light.shade(normal);
            let color = [
                base[0] * shade * light.color[0],
                base[1] * shade * light.color[1],
                base[2] * shade * light.color[2],
            ];
            triangles.push(ScreenTriangle {
                points,
                depth: eye.distance(center),
                color,
            });
        }
    }

    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));

    let mut paint = Paint::default();
    paint.anti_alias = false;
    for tri in &triangles {
        let mut pb = PathBuilder::new();
        pb.move_to(tri.points[0].0, tri.points[0].1);
        pb.line_to(tri.points[1].0, tri.points[1].1);
        pb.line_to(tri.points[2].0, tri.points[2].1);
        pb.close();
        let Some(path) = pb.finish() else { continue };
        paint.set_color(to_color(tri.color));
        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    tracing::debug!("Rendered {} triangles at {}x{}", triangles.len(), width, height);
    Some(pixmap)
}

/// Camera framing the whole lot from the south.
pub fn default_camera(scene: &Scene) -> OrbitCamera {
    let mut camera = OrbitCamera::default();
    let (w, d) = scene.lot_extent();
    let depth = yardplan_core::constants::WORLD_UNITS_PER_FOOT * w.max(d) as f32;
    camera.reset_north(depth.max(1.0));
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::SunPosition;
    use crate::scene::SceneAssets;
    use yardplan_designer::{DesignerState, ElementKind};

    fn pixel_rgb(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 3] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue()]
    }

    #[test]
    fn test_lot_fills_centre_of_default_view() {
        let mut state = DesignerState::new();
        state.add_element(ElementKind::Shed, None).unwrap();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);

        let light = SunLight::default();
        let camera = default_camera(&scene);
        let pixmap = render_scene(&scene, &camera, &light, 120, 80).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (120, 80));

        let sky = {
            let mut sky_only = Pixmap::new(1, 1).unwrap();
            sky_only.fill(to_color(sky_color(&light)));
            pixel_rgb(&sky_only, 0, 0)
        };
        assert_ne!(pixel_rgb(&pixmap, 60, 40), sky);
    }

    #[test]
    fn test_night_sky_is_darker() {
        let day = SunLight::default();
        let night = SunLight::from_position(SunPosition {
            altitude_deg: -20.0,
            azimuth_deg: 0.0,
        });
        let d = sky_color(&day);
        let n = sky_color(&night);
        assert!(n.iter().sum::<f32>() < d.iter().sum::<f32>());
    }

    #[test]
    fn test_zero_size_is_none() {
        let scene = Scene::new(SceneAssets::default());
        assert!(render_scene(&scene, &OrbitCamera::default(), &SunLight::default(), 0, 10).is_none());
    }
}
