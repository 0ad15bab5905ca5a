//! # Scene graph
//!
//! Arena of nodes mirroring the design: one group per element, one for the
//! custom house and one for the ground. Lot feet map to world units around
//! the lot centroid, x east, y north, z up.
//!
//! The scene keeps its own element → node index; elements never hold a
//! handle into the scene.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::mesh::{Mesh, MeshMaterial};
use crate::models::{CacheEntry, LoadOutcome, ModelCache, ModelKey, ModelLoader};
use crate::roof;
use yardplan_core::constants::WORLD_UNITS_PER_FOOT;
use yardplan_core::Point;
use yardplan_designer::model::parse_hex_color;
use yardplan_designer::{
    CustomHouse, DesignElement, DesignQuery, ElementData, LotConfiguration, PlantCatalog,
    RenderStrategy, Season, SelectionTarget,
};

pub type NodeId = usize;

/// Links a node back to what it represents in the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Element(u64),
    CustomHouse,
    Ground,
}

#[derive(Debug, Clone)]
pub enum NodeContent {
    Group,
    Mesh {
        mesh: Arc<Mesh>,
        material: MeshMaterial,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: Transform,
    pub content: NodeContent,
    pub tag: Option<NodeTag>,
}

impl SceneNode {
    fn group(tag: Option<NodeTag>) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::default(),
            content: NodeContent::Group,
            tag,
        }
    }

    fn mesh(mesh: Arc<Mesh>, material: MeshMaterial) -> Self {
        Self {
            content: NodeContent::Mesh { mesh, material },
            ..Self::group(None)
        }
    }
}

/// A mesh node with its world transform resolved.
#[derive(Debug, Clone)]
pub struct MeshInstance {
    pub node: NodeId,
    pub mesh: Arc<Mesh>,
    pub material: MeshMaterial,
    pub transform: Mat4,
}

/// Where models come from.
#[derive(Debug, Clone, Default)]
pub struct SceneAssets {
    pub model_dir: Option<PathBuf>,
    pub catalog: PlantCatalog,
}

/// What an element currently shows, so finished loads can find it.
#[derive(Debug, Clone)]
struct ElementVisual {
    model: Option<ModelKey>,
    size: Vec3,
    material: MeshMaterial,
    placeholder: bool,
}

const TRUNK_COLOR: [u8; 3] = [101, 67, 33];
const GROUND_COLOR: [u8; 3] = [110, 160, 80];
const SURROUND_COLOR: [u8; 3] = [150, 165, 130];
const DEFAULT_WALL: [u8; 3] = [220, 210, 190];
const DEFAULT_ROOF: [u8; 3] = [110, 70, 60];
const FENCE_POST_SPACING_FT: f32 = 8.0;

pub fn feet_to_world(feet: f64) -> f32 {
    feet as f32 * WORLD_UNITS_PER_FOOT
}

fn color_or(value: Option<&str>, fallback: [u8; 3]) -> [u8; 3] {
    value.and_then(parse_hex_color).unwrap_or(fallback)
}

pub struct Scene {
    nodes: Vec<Option<SceneNode>>,
    free: Vec<NodeId>,
    root: NodeId,
    element_nodes: HashMap<u64, NodeId>,
    visuals: HashMap<u64, ElementVisual>,
    house_node: Option<NodeId>,
    ground_node: Option<NodeId>,
    lot_centroid: Point,
    lot_extent: (f64, f64),
    season: Season,
    selection: Option<SelectionTarget>,
    dispose_count: usize,
    assets: SceneAssets,
    models: ModelCache,
    loader: Option<ModelLoader>,
}

impl Scene {
    pub fn new(assets: SceneAssets) -> Self {
        Self {
            nodes: vec![Some(SceneNode::group(None))],
            free: Vec::new(),
            root: 0,
            element_nodes: HashMap::new(),
            visuals: HashMap::new(),
            house_node: None,
            ground_node: None,
            lot_centroid: Point::default(),
            lot_extent: (0.0, 0.0),
            season: Season::default(),
            selection: None,
            dispose_count: 0,
            assets,
            models: ModelCache::new(),
            loader: None,
        }
    }

    /// Loads models in the background instead of on the calling thread.
    pub fn with_loader(mut self, loader: ModelLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn element_node(&self, id: u64) -> Option<NodeId> {
        self.element_nodes.get(&id).copied()
    }

    pub fn element_count(&self) -> usize {
        self.element_nodes.len()
    }

    pub fn house_node(&self) -> Option<NodeId> {
        self.house_node
    }

    pub fn ground_node(&self) -> Option<NodeId> {
        self.ground_node
    }

    /// Element subtrees removed so far.
    pub fn dispose_count(&self) -> usize {
        self.dispose_count
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn set_season(&mut self, season: Season) {
        self.season = season;
    }

    pub fn selection(&self) -> Option<SelectionTarget> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<SelectionTarget>) {
        self.selection = selection;
    }

    pub fn lot_extent(&self) -> (f64, f64) {
        self.lot_extent
    }

    /// Element still showing its placeholder geometry.
    pub fn is_placeholder(&self, id: u64) -> bool {
        self.visuals.get(&id).is_some_and(|v| v.placeholder)
    }

    /// Lot feet to world units (z = 0).
    pub fn world_position(&self, feet: &Point) -> Vec3 {
        Vec3::new(
            feet_to_world(feet.x - self.lot_centroid.x),
            -feet_to_world(feet.y - self.lot_centroid.y),
            0.0,
        )
    }

    /// Rotation for a clockwise-on-screen angle in degrees.
    fn world_rotation(degrees: f64) -> Quat {
        Quat::from_rotation_z(-(degrees as f32).to_radians())
    }

    fn alloc(&mut self, node: SceneNode) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    fn add_child(&mut self, parent: NodeId, node: SceneNode) -> NodeId {
        let id = self.alloc(node);
        self.attach(parent, id);
        id
    }

    fn add_mesh(&mut self, parent: NodeId, mesh: Mesh, material: MeshMaterial) -> NodeId {
        self.add_child(parent, SceneNode::mesh(Arc::new(mesh), material))
    }

    /// Detaches `id` from its parent and frees it with all descendants.
    fn free_subtree(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|n| n.parent);
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(current);
            }
        }
    }

    fn clear_children(&mut self, id: NodeId) {
        let children = self.node(id).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            self.free_subtree(child);
        }
    }

    /// World matrix of a node (parent chain applied).
    pub fn world_transform(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// First tag found walking from `id` towards the root.
    pub fn owner_tag(&self, id: NodeId) -> Option<NodeTag> {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            if node.tag.is_some() {
                return node.tag;
            }
            current = node.parent;
        }
        None
    }

    /// Every mesh node with its world transform.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root, Mat4::IDENTITY)];
        while let Some((id, parent_matrix)) = stack.pop() {
            let Some(node) = self.node(id) else { continue };
            let matrix = parent_matrix * node.transform.matrix();
            if let NodeContent::Mesh { mesh, material } = &node.content {
                out.push(MeshInstance {
                    node: id,
                    mesh: mesh.clone(),
                    material: *material,
                    transform: matrix,
                });
            }
            stack.extend(node.children.iter().map(|c| (*c, matrix)));
        }
        out
    }

    /// Drops every node and rebuilds from the design.
    pub fn rebuild(&mut self, query: &dyn DesignQuery) {
        let removed = self.element_nodes.len();
        self.clear_children(self.root);
        self.element_nodes.clear();
        self.visuals.clear();
        self.house_node = None;
        self.ground_node = None;
        self.dispose_count += removed;

        self.season = query.season();
        self.selection = query.selection();
        self.rebuild_ground(query.lot());
        for element in query.elements() {
            self.add_element(element);
        }
        self.set_custom_house(query.custom_house());
        tracing::debug!(
            "Scene rebuilt: {} elements, {} nodes",
            self.element_nodes.len(),
            self.node_count()
        );
    }

    /// Replaces the ground with the lot surface and a surrounding plane, and
    /// re-centres the world on the lot centroid.
    pub fn rebuild_ground(&mut self, lot: &LotConfiguration) {
        if let Some(old) = self.ground_node.take() {
            self.free_subtree(old);
        }
        self.lot_centroid = lot.centroid();
        self.lot_extent = lot.extent();

        let ring: Vec<Vec2> = lot
            .outline()
            .iter()
            .map(|p| self.world_position(p).truncate())
            .collect();
        let (w, d) = self.lot_extent;
        let surround = feet_to_world(w.max(d)) * 2.0;

        let ground = self.add_child(self.root, SceneNode::group(Some(NodeTag::Ground)));
        let lot_surface = Mesh::prism(&ring, -0.2, 0.0);
        self.add_mesh(ground, lot_surface, MeshMaterial::from_rgb(GROUND_COLOR));
        let plane = Mesh::cuboid(
            Vec3::new(-surround, -surround, -0.4),
            Vec3::new(surround, surround, -0.3),
        );
        self.add_mesh(ground, plane, MeshMaterial::from_rgb(SURROUND_COLOR));
        self.ground_node = Some(ground);
    }

    /// Adds the element's subtree, replacing an existing one with the same id.
    pub fn add_element(&mut self, element: &DesignElement) -> NodeId {
        if let Some(node) = self.element_node(element.id) {
            self.rebuild_element(node, element);
            return node;
        }
        let node = self.add_child(self.root, SceneNode::group(Some(NodeTag::Element(element.id))));
        self.element_nodes.insert(element.id, node);
        self.rebuild_element(node, element);
        node
    }

    /// Refreshes transform and geometry of an existing element.
    pub fn update_element(&mut self, element: &DesignElement) -> NodeId {
        self.add_element(element)
    }

    /// Removes the element's subtree. Returns false for unknown ids.
    pub fn remove_element(&mut self, id: u64) -> bool {
        let Some(node) = self.element_nodes.remove(&id) else {
            return false;
        };
        self.visuals.remove(&id);
        self.free_subtree(node);
        self.dispose_count += 1;
        true
    }

    fn rebuild_element(&mut self, node: NodeId, element: &DesignElement) {
        let mut translation = self.world_position(&element.center());
        translation.z = feet_to_world(element.position.z);
        if let Some(n) = self.node_mut(node) {
            n.transform = Transform {
                translation,
                rotation: Self::world_rotation(element.rotation),
                scale: Vec3::ONE,
            };
        }
        self.clear_children(node);

        let size = Vec3::new(
            feet_to_world(element.footprint.width),
            feet_to_world(element.footprint.depth),
            feet_to_world(element.footprint.height),
        );
        let material = MeshMaterial::from_rgb(self.element_color(element));
        let model = self.model_source(element);

        let mut visual = ElementVisual {
            model: model.as_ref().map(|(key, _)| key.clone()),
            size,
            material,
            placeholder: true,
        };

        if let Some((key, path)) = model {
            if let Some(mesh) = self.resolve_model(key, path) {
                self.add_mesh(node, mesh.fit_to_box(size), material);
                visual.placeholder = false;
                self.visuals.insert(element.id, visual);
                return;
            }
        }

        self.build_procedural(node, element, size, material);
        visual.placeholder = !matches!(
            element.descriptor().render,
            RenderStrategy::Box | RenderStrategy::Slab | RenderStrategy::Cylinder | RenderStrategy::Fence
        ) || matches!(element.data, ElementData::Model(_));
        self.visuals.insert(element.id, visual);
    }

    fn build_procedural(&mut self, node: NodeId, element: &DesignElement, size: Vec3, material: MeshMaterial) {
        let (w, d, h) = (size.x, size.y, size.z);
        match element.descriptor().render {
            RenderStrategy::Box => {
                self.add_mesh(node, Mesh::footprint_box(w, d, h), material);
            }
            RenderStrategy::Slab => {
                self.add_mesh(node, Mesh::footprint_box(w, d, h.max(0.05)), material);
            }
            RenderStrategy::Cylinder => {
                self.add_mesh(node, Mesh::cylinder(w / 2.0, d / 2.0, 0.0, h.max(0.05), 24), material);
            }
            RenderStrategy::Fence => {
                self.add_mesh(node, fence_mesh(w, d, h), material);
            }
            RenderStrategy::Plant => {
                let mut bush = Mesh::cylinder(w * 0.4, d * 0.4, 0.0, h * 0.5, 12);
                bush.merge(&Mesh::cone(w / 2.0, d / 2.0, h * 0.3, h * 0.7, 12));
                self.add_mesh(node, bush, material);
            }
            RenderStrategy::Tree => {
                let trunk_radius = (w * 0.05).max(0.3);
                self.add_mesh(
                    node,
                    Mesh::cylinder(trunk_radius, trunk_radius, 0.0, h * 0.4, 10),
                    MeshMaterial::from_rgb(TRUNK_COLOR),
                );
                self.add_mesh(node, Mesh::cone(w / 2.0, d / 2.0, h * 0.3, h * 0.7, 16), material);
            }
        }
    }

    fn element_color(&self, element: &DesignElement) -> [u8; 3] {
        let fallback = element.descriptor().color;
        match &element.data {
            ElementData::Plant(plant) => self
                .assets
                .catalog
                .get(&plant.species)
                .map(|s| s.foliage_color(self.season))
                .unwrap_or(fallback),
            ElementData::Structure(s) => color_or(s.wall_color.as_deref(), fallback),
            _ => fallback,
        }
    }

    /// Model to show for an element, if any.
    fn model_source(&self, element: &DesignElement) -> Option<(ModelKey, PathBuf)> {
        if let ElementData::Model(model) = &element.data {
            let path = PathBuf::from(&model.path);
            let path = match &self.assets.model_dir {
                Some(dir) if path.is_relative() => dir.join(path),
                _ => path,
            };
            return Some((ModelKey::File(path.clone()), path));
        }
        let species_id = element.species()?;
        let dir = self.assets.model_dir.as_ref()?;
        let species = self.assets.catalog.get(species_id)?;
        let path = species.model_path(dir, self.season)?;
        Some((
            ModelKey::Species {
                species: species_id.to_string(),
                season: self.season,
            },
            path,
        ))
    }

    /// Cached mesh for `key`, starting a load when it has never been asked
    /// for. Without a background loader the load happens right here.
    fn resolve_model(&mut self, key: ModelKey, path: PathBuf) -> Option<Arc<Mesh>> {
        match self.models.get(&key) {
            Some(CacheEntry::Ready(mesh)) => return Some(mesh.clone()),
            Some(CacheEntry::Pending) | Some(CacheEntry::Failed) => return None,
            None => {}
        }
        self.models.mark_pending(key.clone());
        match self.loader.as_mut() {
            Some(loader) => {
                loader.request(key, path);
                None
            }
            None => {
                let result = crate::mesh::load_stl(&path);
                self.store_outcome(LoadOutcome { key: key.clone(), path, result });
                self.models.ready(&key)
            }
        }
    }

    fn store_outcome(&mut self, outcome: LoadOutcome) -> Option<Arc<Mesh>> {
        match outcome.result {
            Ok(mesh) => {
                tracing::debug!(
                    "Loaded model {} ({} triangles)",
                    outcome.path.display(),
                    mesh.triangle_count()
                );
                let mesh = Arc::new(mesh);
                self.models.insert(outcome.key, mesh.clone());
                Some(mesh)
            }
            Err(err) => {
                tracing::warn!("{}; keeping placeholder", err);
                self.models.mark_failed(outcome.key);
                None
            }
        }
    }

    /// Attaches a finished load to every element still waiting for it.
    /// Returns how many elements were updated.
    pub fn apply_outcome(&mut self, outcome: LoadOutcome) -> usize {
        let key = outcome.key.clone();
        let Some(mesh) = self.store_outcome(outcome) else {
            return 0;
        };
        let waiting: Vec<u64> = self
            .visuals
            .iter()
            .filter(|(_, v)| v.placeholder && v.model.as_ref() == Some(&key))
            .map(|(id, _)| *id)
            .collect();
        if waiting.is_empty() {
            tracing::debug!("Model {:?} arrived with no element waiting for it", key);
            return 0;
        }
        for id in &waiting {
            let (Some(node), Some(visual)) = (self.element_node(*id), self.visuals.get(id).cloned())
            else {
                continue;
            };
            self.clear_children(node);
            self.add_mesh(node, mesh.fit_to_box(visual.size), visual.material);
            if let Some(v) = self.visuals.get_mut(id) {
                v.placeholder = false;
            }
        }
        waiting.len()
    }

    /// Drains finished background loads. Call once per frame.
    pub fn apply_model_loads(&mut self) -> usize {
        let mut outcomes = Vec::new();
        if let Some(loader) = self.loader.as_mut() {
            while let Some(outcome) = loader.try_next() {
                outcomes.push(outcome);
            }
        }
        outcomes.into_iter().map(|o| self.apply_outcome(o)).sum()
    }

    /// Per-frame tick.
    pub fn frame(&mut self) -> usize {
        self.apply_model_loads()
    }

    /// Waits for every outstanding background load and applies it.
    pub async fn finish_model_loads(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let outcome = match self.loader.as_mut() {
                Some(loader) => loader.next().await,
                None => None,
            };
            let Some(outcome) = outcome else { break };
            applied += self.apply_outcome(outcome);
        }
        applied
    }

    /// Replaces (or with `None`, removes) the custom house subtree.
    pub fn set_custom_house(&mut self, house: Option<&CustomHouse>) {
        if let Some(old) = self.house_node.take() {
            self.free_subtree(old);
        }
        let Some(house) = house else { return };

        let outline: Vec<Vec2> = house
            .outline
            .iter()
            .map(|p| Vec2::new(feet_to_world(p.x), -feet_to_world(p.y)))
            .collect();
        let (walls, roof) = roof::house_mesh(
            &outline,
            feet_to_world(house.wall_height),
            house.roof,
            feet_to_world(house.roof_rise()),
        );

        let mut group = SceneNode::group(Some(NodeTag::CustomHouse));
        group.transform.translation = self.world_position(&house.position);
        group.transform.rotation = Self::world_rotation(house.rotation);
        let node = self.add_child(self.root, group);
        self.add_mesh(
            node,
            walls,
            MeshMaterial::from_rgb(color_or(Some(&house.wall_color), DEFAULT_WALL)),
        );
        self.add_mesh(
            node,
            roof,
            MeshMaterial::from_rgb(color_or(Some(&house.roof_color), DEFAULT_ROOF)),
        );
        self.house_node = Some(node);
    }
}

/// Posts roughly every eight feet along the width with a panel between.
fn fence_mesh(width: f32, depth: f32, height: f32) -> Mesh {
    let spacing = FENCE_POST_SPACING_FT * WORLD_UNITS_PER_FOOT;
    let post = (depth.max(0.1) * 0.8).min(0.5 * WORLD_UNITS_PER_FOOT);
    let spans = (width / spacing).ceil().max(1.0) as u32;
    let mut mesh = Mesh::default();
    for i in 0..=spans {
        let x = -width / 2.0 + width * i as f32 / spans as f32;
        mesh.merge(&Mesh::cuboid(
            Vec3::new(x - post / 2.0, -post / 2.0, 0.0),
            Vec3::new(x + post / 2.0, post / 2.0, height),
        ));
    }
    let panel = (post * 0.3).max(0.05);
    mesh.merge(&Mesh::cuboid(
        Vec3::new(-width / 2.0, -panel / 2.0, height * 0.1),
        Vec3::new(width / 2.0, panel / 2.0, height * 0.9),
    ));
    mesh
}
