//! Designer state manager: the single mutation point for a design.
//!
//! This module is split into submodules by concern:
//! - `elements`: add, move, rotate and delete placed elements
//! - `selection`: single exclusive selection
//! - `drawing`: lot and custom house outline drawing
//! - `lot`: lot configuration changes
//! - `environment`: season, time of day and view mode
//! - `viewport`: zoom and pan controls
//! - `file_io`: save/load operations
//!
//! Every mutation queues [`DesignerEvent`]s. The owner drains them with
//! [`DesignerState::take_events`] and forwards them to the views.

mod drawing;
mod elements;
mod environment;
mod file_io;
mod lot;
mod selection;
mod viewport;

pub use elements::CustomHouseProperties;

use std::path::PathBuf;

use yardplan_core::Point;

use crate::catalog::PlantCatalog;
use crate::model::{CustomHouse, DesignElement, LotConfiguration, Season};
use crate::query::DesignQuery;
use crate::store::ElementStore;
use crate::viewport::Viewport;
use yardplan_core::constants::DEFAULT_TIME_OF_DAY;

/// Which view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    TwoD,
    ThreeD,
}

/// What the single selection points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTarget {
    Element(u64),
    CustomHouse,
}

/// What an in-progress outline will become.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingTarget {
    Lot,
    House,
}

/// Drawing-mode state machine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    Drawing {
        target: DrawingTarget,
        /// Accumulated vertices in lot feet, grid-snapped.
        points: Vec<Point>,
        /// Snapped cursor position, for the preview edge.
        hover: Option<Point>,
    },
}

impl DrawingState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Drawing { .. })
    }

    pub fn target(&self) -> Option<DrawingTarget> {
        match self {
            Self::Idle => None,
            Self::Drawing { target, .. } => Some(*target),
        }
    }

    pub fn points(&self) -> &[Point] {
        match self {
            Self::Idle => &[],
            Self::Drawing { points, .. } => points,
        }
    }

    pub fn hover(&self) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::Drawing { hover, .. } => *hover,
        }
    }
}

/// Change notifications for the views.
#[derive(Debug, Clone, PartialEq)]
pub enum DesignerEvent {
    ElementAdded(u64),
    ElementUpdated(u64),
    ElementRemoved(u64),
    CustomHouseSet,
    CustomHouseRemoved,
    LotChanged,
    SelectionChanged(Option<SelectionTarget>),
    LightingChanged,
    ViewModeChanged(ViewMode),
    /// Everything was replaced (load or new design).
    DesignReplaced,
    /// Only the 2D canvas needs repainting.
    Redraw2D,
}

/// Blocking user interaction: confirmation dialogs and alerts.
pub trait UserPrompt {
    /// Returns true when the user accepts.
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

/// Prompt that accepts every confirmation and logs alerts. Used by the
/// command-line front end.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl UserPrompt for AutoConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!("Auto-confirming: {}", message);
        true
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Designer state for UI integration
#[derive(Debug, Clone)]
pub struct DesignerState {
    pub(crate) store: ElementStore,
    pub(crate) custom_house: Option<CustomHouse>,
    pub(crate) lot: LotConfiguration,
    pub catalog: PlantCatalog,
    pub viewport: Viewport,
    pub(crate) view_mode: ViewMode,
    pub(crate) selection: Option<SelectionTarget>,
    pub(crate) season: Season,
    pub(crate) time_of_day: f64,
    pub(crate) drawing: DrawingState,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    pub design_name: String,
    events: Vec<DesignerEvent>,
}

impl DesignerState {
    /// Creates a new designer state with the default lot and built-in
    /// plant catalog.
    pub fn new() -> Self {
        Self::with_catalog(PlantCatalog::builtin())
    }

    pub fn with_catalog(catalog: PlantCatalog) -> Self {
        let mut state = Self {
            store: ElementStore::new(),
            custom_house: None,
            lot: LotConfiguration::default(),
            catalog,
            viewport: Viewport::default(),
            view_mode: ViewMode::default(),
            selection: None,
            season: Season::default(),
            time_of_day: DEFAULT_TIME_OF_DAY,
            drawing: DrawingState::Idle,
            current_file_path: None,
            is_modified: false,
            design_name: "Untitled".to_string(),
            events: Vec::new(),
        };
        state.frame_lot();
        state
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Drains queued change notifications.
    pub fn take_events(&mut self) -> Vec<DesignerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[DesignerEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: DesignerEvent) {
        tracing::trace!("Designer event: {:?}", event);
        self.events.push(event);
    }

    pub(crate) fn mark_modified(&mut self) {
        self.is_modified = true;
    }

    /// Re-anchors the viewport on the lot centroid and fits the lot.
    pub(crate) fn frame_lot(&mut self) {
        self.viewport.set_origin(self.lot.centroid());
        let (min_x, min_y, max_x, max_y) = self.lot.bounds();
        self.viewport.fit_to_view(min_x, min_y, max_x, max_y);
    }
}

impl Default for DesignerState {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignQuery for DesignerState {
    fn elements(&self) -> &[DesignElement] {
        self.store.as_slice()
    }

    fn element(&self, id: u64) -> Option<&DesignElement> {
        self.store.get(id)
    }

    fn custom_house(&self) -> Option<&CustomHouse> {
        self.custom_house.as_ref()
    }

    fn lot(&self) -> &LotConfiguration {
        &self.lot
    }

    fn selection(&self) -> Option<SelectionTarget> {
        self.selection
    }

    fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    fn season(&self) -> Season {
        self.season
    }

    fn time_of_day(&self) -> f64 {
        self.time_of_day
    }
}
