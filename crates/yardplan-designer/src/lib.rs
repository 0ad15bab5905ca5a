//! # YardPlan Designer
//!
//! Design model and 2D drafting view for the yard planner.
//!
//! ## Core Components
//!
//! - **Model**: placed elements, the per-kind descriptor registry, the custom
//!   house and the lot configuration
//! - **Catalog**: plant and tree species with mature sizes and seasonal models
//! - **DesignerState**: the single mutation point; every change queues a
//!   [`DesignerEvent`] for the views
//! - **Viewport / Interaction / Renderer**: pan and zoom, pointer handling and
//!   the tiny-skia canvas renderer
//! - **Serialization**: the versioned JSON save format
//!
//! ## Architecture
//!
//! ```text
//! UI intent ──> DesignerState ──> DesignerEvent queue ──> views
//!                    │
//!                    └── DesignQuery (read-only) ──> renderers
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use yardplan_designer::{DesignerState, ElementKind, DesignQuery};
//!
//! let mut state = DesignerState::new();
//! let id = state.add_element(ElementKind::Shed, None).unwrap();
//! state.rotate_element(id, 450.0, false).unwrap();
//! assert_eq!(state.element(id).unwrap().rotation, 90.0);
//! ```

pub mod catalog;
pub mod designer_state;
pub mod interaction;
pub mod model;
pub mod query;
pub mod renderer;
pub mod serialization;
pub mod store;
pub mod viewport;

pub use catalog::{PlantCatalog, PlantSpecies};
pub use designer_state::{
    AutoConfirm, CustomHouseProperties, DesignerEvent, DesignerState, DrawingState,
    DrawingTarget, SelectionTarget, UserPrompt, ViewMode,
};
pub use interaction::{hit_test, CanvasInteraction};
pub use model::{
    CustomHouse, DesignElement, ElementData, ElementKind, Footprint, LotConfiguration,
    PlantData, Position3, RenderStrategy, RoofType, Season,
};
pub use query::DesignQuery;
pub use renderer::{export_png, render_canvas, RenderOptions};
pub use serialization::DesignFile;
pub use store::ElementStore;
pub use viewport::Viewport;
