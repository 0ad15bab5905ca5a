//! Ray-cast selection in the 3D view.

use glam::Vec3;

use crate::scene::{NodeId, NodeTag, Scene};
use yardplan_designer::SelectionTarget;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Möller–Trumbore intersection. Returns the distance along the ray for
/// hits in front of the origin; both triangle sides count.
pub fn intersect_triangle(ray: &Ray, tri: &[Vec3; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let edge1 = tri[1] - tri[0];
    let edge2 = tri[2] - tri[0];
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < EPSILON {
        return None;
    }
    let f = 1.0 / a;
    let s = ray.origin - tri[0];
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
    pub tag: Option<NodeTag>,
}

/// Nearest mesh hit along `ray`, with the owning tag resolved.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<PickHit> {
    let mut best: Option<(NodeId, f32)> = None;
    for instance in scene.mesh_instances() {
        for tri in instance.mesh.triangle_vertices() {
            let world = [
                instance.transform.transform_point3(tri[0]),
                instance.transform.transform_point3(tri[1]),
                instance.transform.transform_point3(tri[2]),
            ];
            if let Some(t) = intersect_triangle(ray, &world) {
                if best.is_none_or(|(_, d)| t < d) {
                    best = Some((instance.node, t));
                }
            }
        }
    }
    best.map(|(node, distance)| PickHit {
        node,
        distance,
        point: ray.at(distance),
        tag: scene.owner_tag(node),
    })
}

/// What a click in the 3D view should do to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickAction {
    Select(SelectionTarget),
    /// Ground or empty sky.
    Deselect,
}

pub fn pick_action(scene: &Scene, ray: &Ray) -> PickAction {
    match pick(scene, ray).and_then(|hit| hit.tag) {
        Some(NodeTag::Element(id)) => PickAction::Select(SelectionTarget::Element(id)),
        Some(NodeTag::CustomHouse) => PickAction::Select(SelectionTarget::CustomHouse),
        Some(NodeTag::Ground) | None => PickAction::Deselect,
    }
}

impl PickAction {
    pub fn target(&self) -> Option<SelectionTarget> {
        match self {
            Self::Select(target) => Some(*target),
            Self::Deselect => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneAssets;
    use yardplan_designer::{DesignQuery, DesignerState, ElementKind};

    #[test]
    fn test_triangle_hit_and_miss() {
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let down = Ray::new(Vec3::new(0.2, 0.2, 5.0), -Vec3::Z);
        assert!((intersect_triangle(&down, &tri).unwrap() - 5.0).abs() < 1e-5);
        let off = Ray::new(Vec3::new(0.8, 0.8, 5.0), -Vec3::Z);
        assert!(intersect_triangle(&off, &tri).is_none());
        let away = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::Z);
        assert!(intersect_triangle(&away, &tri).is_none());
    }

    #[test]
    fn test_pick_walks_to_element_then_ground() {
        let mut state = DesignerState::new();
        let id = state.add_element(ElementKind::Shed, None).unwrap();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);

        let top = scene.world_position(&state.element(id).unwrap().center());
        let ray = Ray::new(top + Vec3::Z * 100.0, -Vec3::Z);
        assert_eq!(
            pick_action(&scene, &ray),
            PickAction::Select(SelectionTarget::Element(id))
        );

        let beside = Ray::new(top + Vec3::new(30.0, 0.0, 100.0), -Vec3::Z);
        assert_eq!(pick_action(&scene, &beside), PickAction::Deselect);
        assert_eq!(
            pick(&scene, &beside).and_then(|h| h.tag),
            Some(NodeTag::Ground)
        );
    }
}
