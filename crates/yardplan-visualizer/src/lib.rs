//! # YardPlan Visualizer
//!
//! The 3D side of the planner: a scene graph kept in step with the design
//! through [`SceneSync`], procedural meshes and roofs, background STL model
//! loading, an orbit camera, sun lighting, ray picking, a software raster
//! for image export and STL scene export.

pub mod camera;
pub mod export;
pub mod lighting;
pub mod mesh;
pub mod models;
pub mod picking;
pub mod raster;
pub mod roof;
pub mod scene;
pub mod sync;

pub use camera::OrbitCamera;
pub use export::{export_stl, StlFormat};
pub use lighting::{SiteLocation, SolarCalculator, SunLight, SunPosition, SunPositionProvider};
pub use mesh::{Mesh, MeshMaterial};
pub use models::{LoadOutcome, ModelCache, ModelKey, ModelLoader};
pub use picking::{pick, pick_action, PickAction, Ray};
pub use raster::{default_camera, render_scene};
pub use scene::{NodeId, NodeTag, Scene, SceneAssets};
pub use sync::{SceneSync, SyncOutcome};
