//! Application shell wiring the designer to both views.
//!
//! `PlannerApp` owns the coordination layer, the 3D scene and the sun. UI
//! front ends call intents on [`PlannerApp::designer_mut`] and then
//! [`PlannerApp::pump_events`] (or [`PlannerApp::frame`] once per animation
//! frame) so both views catch up.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Datelike;
use tiny_skia::Pixmap;

use yardplan_designer::{
    export_png, render_canvas, DesignQuery, DesignerEvent, DesignerState, PlantCatalog,
    RenderOptions, UserPrompt, ViewMode,
};
use yardplan_settings::{Config, SettingsManager};
use yardplan_visualizer::{
    default_camera, export_stl, pick_action, render_scene, ModelLoader, OrbitCamera, PickAction,
    Scene, SceneAssets, SceneSync, SiteLocation, SolarCalculator, StlFormat, SunLight,
    SyncOutcome,
};

/// Loads the catalog override, falling back to the built-in species.
fn load_catalog(config: &Config) -> PlantCatalog {
    let Some(path) = &config.assets.catalog_path else {
        return PlantCatalog::builtin();
    };
    match PlantCatalog::load_from_file(path) {
        Ok(catalog) => {
            tracing::info!("Loaded {} species from {}", catalog.len(), path.display());
            catalog
        }
        Err(e) => {
            tracing::warn!("Ignoring plant catalog {}: {:#}", path.display(), e);
            PlantCatalog::builtin()
        }
    }
}

pub struct PlannerApp {
    state: DesignerState,
    scene: Scene,
    camera: OrbitCamera,
    sun: SunLight,
    site: SiteLocation,
    year: i32,
    show_grid: bool,
    is_loading: bool,
    canvas_dirty: bool,
    settings: Option<SettingsManager>,
}

impl PlannerApp {
    /// Builds the app from settings. Models load in the background when a
    /// tokio runtime is available, otherwise synchronously.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let catalog = load_catalog(config);
        let mut state = DesignerState::with_catalog(catalog.clone());
        state
            .set_lot_rectangle(config.canvas.default_lot_width, config.canvas.default_lot_depth)
            .context("Invalid default lot size")?;
        state.set_canvas_size(config.canvas.width_px as f64, config.canvas.height_px as f64);
        state.fit_lot();
        state.is_modified = false;
        state.take_events();

        let assets = SceneAssets {
            model_dir: config.assets.model_dir.clone(),
            catalog,
        };
        let mut scene = Scene::new(assets);
        if let Some(loader) = ModelLoader::current() {
            scene = scene.with_loader(loader);
        }
        scene.rebuild(&state);

        let site = SiteLocation {
            latitude: config.site.latitude,
            longitude: config.site.longitude,
            utc_offset_hours: config.site.utc_offset_hours,
        };
        let mut app = Self {
            camera: default_camera(&scene),
            state,
            scene,
            sun: SunLight::default(),
            site,
            year: chrono::Utc::now().year(),
            show_grid: config.canvas.show_grid,
            is_loading: false,
            canvas_dirty: true,
            settings: None,
        };
        app.relight();
        Ok(app)
    }

    /// Like [`new`](Self::new), but successful loads and saves are recorded
    /// in the recent files list and written back through `settings`.
    pub fn with_settings(settings: SettingsManager) -> anyhow::Result<Self> {
        let mut app = Self::new(settings.config())?;
        app.settings = Some(settings);
        Ok(app)
    }

    /// Most recent first. Empty without a settings manager.
    pub fn recent_files(&self) -> &[PathBuf] {
        match &self.settings {
            Some(settings) => settings.config().recent_files.as_slice(),
            None => &[],
        }
    }

    fn record_recent_file(&mut self, path: &Path) {
        let Some(settings) = &mut self.settings else {
            return;
        };
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        settings.config_mut().add_recent_file(path);
        if let Err(e) = settings.save() {
            tracing::warn!("Failed to save recent files: {}", e);
        }
    }

    pub fn designer(&self) -> &DesignerState {
        &self.state
    }

    /// Mutable access for UI intents. Call [`pump_events`](Self::pump_events)
    /// afterwards.
    pub fn designer_mut(&mut self) -> &mut DesignerState {
        &mut self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    pub fn sun(&self) -> &SunLight {
        &self.sun
    }

    pub fn site(&self) -> &SiteLocation {
        &self.site
    }

    pub fn set_site(&mut self, site: SiteLocation) {
        self.site = site;
        self.relight();
    }

    /// Pins the calendar year used for sun positions.
    pub fn set_year(&mut self, year: i32) {
        self.year = year;
        self.relight();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// True once after any change that needs a 2D repaint.
    pub fn take_canvas_dirty(&mut self) -> bool {
        std::mem::take(&mut self.canvas_dirty)
    }

    fn relight(&mut self) {
        self.sun = SunLight::compute(
            &SolarCalculator,
            &self.site,
            self.state.season(),
            self.state.time_of_day(),
            self.year,
        );
    }

    /// Forwards queued designer events to the 3D scene and marks the canvas.
    pub fn pump_events(&mut self) -> SyncOutcome {
        let events = self.state.take_events();
        if events.is_empty() {
            return SyncOutcome::default();
        }
        self.canvas_dirty = true;

        let outcome = SceneSync::apply_all(&mut self.scene, &events, &self.state);
        if outcome.relight {
            self.relight();
        }
        let reframe = events
            .iter()
            .any(|e| matches!(e, DesignerEvent::DesignReplaced | DesignerEvent::LotChanged));
        if reframe {
            self.camera = default_camera(&self.scene);
        }
        tracing::trace!("Pumped {} events: {:?}", events.len(), outcome);
        outcome
    }

    /// Per-frame tick: forwards events and attaches finished model loads.
    pub fn frame(&mut self) -> usize {
        self.pump_events();
        self.scene.frame()
    }

    /// Waits for every in-flight model load and attaches the results.
    pub async fn settle(&mut self) -> usize {
        self.pump_events();
        self.scene.finish_model_loads().await
    }

    /// Replaces the design with `path`. Failures are reported through
    /// `prompt` and leave the current design untouched.
    pub fn load_design(&mut self, path: impl AsRef<Path>, prompt: &mut dyn UserPrompt) -> bool {
        let path = path.as_ref();
        if self.is_loading {
            tracing::warn!("Ignoring load of {} while another load runs", path.display());
            return false;
        }
        self.is_loading = true;
        let result = self.state.load_from_file(path);
        self.is_loading = false;

        match result {
            Ok(()) => {
                self.pump_events();
                self.record_recent_file(path);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {:#}", path.display(), e);
                prompt.alert(&format!("Could not open {}: {:#}", path.display(), e));
                false
            }
        }
    }

    pub fn save_design(&mut self, path: impl AsRef<Path>, prompt: &mut dyn UserPrompt) -> bool {
        let path = path.as_ref();
        match self.state.save_to_file(path) {
            Ok(()) => {
                self.record_recent_file(path);
                true
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {:#}", path.display(), e);
                prompt.alert(&format!("Could not save {}: {:#}", path.display(), e));
                false
            }
        }
    }

    pub fn new_design(&mut self) {
        self.state.new_design();
        self.pump_events();
    }

    /// Click in a `width` x `height` 3D viewport: selects what is under the
    /// cursor, the ground or sky deselects.
    pub fn click_3d(&mut self, x: f32, y: f32, width: f32, height: f32) -> PickAction {
        self.camera.update_aspect_ratio(width, height);
        let ray = self.camera.ray_from_pixel(x, y, width, height);
        let action = pick_action(&self.scene, &ray);
        if !self.state.select(action.target()) {
            tracing::debug!("Selection unchanged by 3D click");
        }
        self.pump_events();
        action
    }

    /// Renders whichever view is active at the given size.
    pub fn render_active_view(&self, width: u32, height: u32) -> Option<Pixmap> {
        match self.state.view_mode() {
            ViewMode::TwoD => {
                let mut viewport = self.state.viewport.clone();
                viewport.set_canvas_size(width as f64, height as f64);
                let options = RenderOptions {
                    show_grid: self.show_grid,
                    catalog: Some(&self.state.catalog),
                };
                render_canvas(&self.state, &viewport, &options)
            }
            ViewMode::ThreeD => render_scene(&self.scene, &self.camera, &self.sun, width, height),
        }
    }

    /// PNG of the active view.
    pub fn export_image(&self, path: impl AsRef<Path>, width: u32, height: u32) -> anyhow::Result<()> {
        let pixmap = self
            .render_active_view(width, height)
            .with_context(|| format!("Cannot render a {}x{} image", width, height))?;
        export_png(&pixmap, path)
    }

    /// STL of the 3D scene. Returns the triangle count.
    pub fn export_scene(&self, path: impl AsRef<Path>, format: StlFormat) -> anyhow::Result<usize> {
        export_stl(&self.scene, path, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yardplan_designer::{AutoConfirm, ElementKind, Season, SelectionTarget};

    #[derive(Default)]
    struct RecordingPrompt {
        alerts: Vec<String>,
    }

    impl UserPrompt for RecordingPrompt {
        fn confirm(&mut self, _message: &str) -> bool {
            true
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn app() -> PlannerApp {
        PlannerApp::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_added_element_reaches_scene() {
        let mut app = app();
        assert!(app.take_canvas_dirty());
        let id = app.designer_mut().add_element(ElementKind::Shed, None).unwrap();
        let outcome = app.pump_events();
        assert!(outcome.redraw);
        assert!(app.scene().element_node(id).is_some());
        assert!(app.take_canvas_dirty());
        assert!(!app.take_canvas_dirty());
    }

    #[test]
    fn test_delete_disposes_once() {
        let mut app = app();
        let id = app.designer_mut().add_element(ElementKind::Tree, None).unwrap();
        app.pump_events();
        app.designer_mut().delete_element(id, &mut AutoConfirm).unwrap();
        app.pump_events();
        assert!(app.scene().element_node(id).is_none());
        assert_eq!(app.scene().dispose_count(), 1);
    }

    #[test]
    fn test_season_change_relights() {
        let mut app = app();
        app.set_year(2024);
        app.designer_mut().set_time_of_day(12.0).unwrap();
        app.pump_events();
        let summer = app.sun().position.altitude_deg;

        app.designer_mut().set_season(Season::Winter);
        let outcome = app.pump_events();
        assert!(outcome.relight);
        assert_eq!(app.scene().season(), Season::Winter);
        assert!(app.sun().position.altitude_deg < summer);
    }

    #[test]
    fn test_bad_load_alerts_and_keeps_design() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut app = app();
        let id = app.designer_mut().add_element(ElementKind::Pond, None).unwrap();
        app.pump_events();

        let mut prompt = RecordingPrompt::default();
        assert!(!app.load_design(&path, &mut prompt));
        assert_eq!(prompt.alerts.len(), 1);
        assert!(!app.is_loading());
        assert!(app.designer().element(id).is_some());
        assert!(app.scene().element_node(id).is_some());
    }

    #[test]
    fn test_save_then_load_rebuilds_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yard.json");

        let mut app = app();
        app.designer_mut().add_element(ElementKind::Shed, None).unwrap();
        app.designer_mut().add_element(ElementKind::Tree, None).unwrap();
        app.pump_events();
        assert!(app.save_design(&path, &mut AutoConfirm));

        let mut other = self::app();
        assert!(other.load_design(&path, &mut AutoConfirm));
        assert_eq!(other.designer().elements().len(), 2);
        assert_eq!(other.scene().element_count(), 2);
    }

    #[test]
    fn test_load_and_save_update_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let first = dir.path().join("front.json");
        let second = dir.path().join("back.json");
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();

        let settings = SettingsManager::load(&config_path).unwrap();
        let mut app = PlannerApp::with_settings(settings).unwrap();
        assert!(app.recent_files().is_empty());

        assert!(app.save_design(&first, &mut AutoConfirm));
        assert!(app.save_design(&second, &mut AutoConfirm));
        assert!(app.load_design(&first, &mut AutoConfirm));
        assert!(!app.load_design(&broken, &mut RecordingPrompt::default()));

        let expected = vec![first.canonicalize().unwrap(), second.canonicalize().unwrap()];
        assert_eq!(app.recent_files(), expected.as_slice());

        let reloaded = SettingsManager::load(&config_path).unwrap();
        assert_eq!(reloaded.config().recent_files, expected);
    }

    #[test]
    fn test_without_settings_recent_files_stay_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        assert!(app.save_design(dir.path().join("yard.json"), &mut AutoConfirm));
        assert!(app.recent_files().is_empty());
    }

    #[test]
    fn test_click_selects_then_deselects() {
        let mut app = app();
        // New elements land at the lot centre, which the default camera
        // looks at.
        let id = app.designer_mut().add_element(ElementKind::Shed, None).unwrap();
        app.pump_events();

        let action = app.click_3d(200.0, 150.0, 400.0, 300.0);
        assert_eq!(action, PickAction::Select(SelectionTarget::Element(id)));
        assert_eq!(app.designer().selection(), Some(SelectionTarget::Element(id)));
        assert_eq!(app.scene().selection(), app.designer().selection());

        // The top corner looks past the lot
        assert_eq!(app.click_3d(0.0, 0.0, 400.0, 300.0), PickAction::Deselect);
        assert_eq!(app.designer().selection(), None);
        assert_eq!(app.scene().selection(), None);
    }

    #[test]
    fn test_export_active_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.designer_mut().add_element(ElementKind::Deck, None).unwrap();
        app.pump_events();

        let flat = dir.path().join("plan.png");
        app.export_image(&flat, 160, 120).unwrap();
        assert!(flat.exists());

        app.designer_mut().set_view_mode(ViewMode::ThreeD);
        app.pump_events();
        let pixmap = app.render_active_view(64, 48).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (64, 48));

        let stl = dir.path().join("yard.stl");
        assert!(app.export_scene(&stl, StlFormat::Binary).unwrap() > 0);
    }
}
