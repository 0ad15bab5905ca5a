//! # YardPlan
//!
//! A 2D/3D garden and yard layout planner.
//!
//! ## Architecture
//!
//! YardPlan is organized as a workspace with multiple crates:
//!
//! 1. **yardplan-core** - Errors, units, constants and planar geometry
//! 2. **yardplan-designer** - Element model, coordination layer, 2D canvas, save files
//! 3. **yardplan-visualizer** - 3D scene, lighting, picking, raster and STL export
//! 4. **yardplan-settings** - Persisted configuration
//! 5. **yardplan** - [`PlannerApp`] wiring the views together, and the CLI binary

pub mod app;

pub use app::PlannerApp;

pub use yardplan_core::{Error, Point, Result, ValidationError};
pub use yardplan_designer as designer;
pub use yardplan_settings::{Config, SettingsManager};
pub use yardplan_visualizer as visualizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr so command results on stdout stay clean
/// - RUST_LOG environment variable support, `info` otherwise
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
