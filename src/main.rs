use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use yardplan::designer::{AutoConfirm, DesignQuery, Season, ViewMode};
use yardplan::visualizer::StlFormat;
use yardplan::{init_logging, PlannerApp, Point, SettingsManager};
use yardplan_core::geometry::{signed_area, validate_polygon};
use yardplan_core::units::{format_feet_inches, parse_feet};

#[derive(Parser)]
#[command(name = "yardplan")]
#[command(version, about = "Garden and yard layout planner", long_about = None)]
struct Cli {
    /// Settings file (.toml or .json); defaults to the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty design
    New {
        output: PathBuf,
        /// Lot width, e.g. 60 or 60' 6"
        #[arg(long, value_parser = parse_feet)]
        width: Option<f64>,
        /// Lot depth, e.g. 40 or 40ft 3in
        #[arg(long, value_parser = parse_feet)]
        depth: Option<f64>,
    },
    /// Summarize a design file
    Info { file: PathBuf },
    /// Render a design to PNG
    Render {
        file: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value = "2d")]
        view: View,
        #[arg(long, default_value_t = 1200)]
        width: u32,
        #[arg(long, default_value_t = 800)]
        height: u32,
        /// Overrides the saved season
        #[arg(long)]
        season: Option<Season>,
        /// Overrides the saved time of day, hours
        #[arg(long)]
        time: Option<f64>,
    },
    /// Export the 3D scene as STL
    ExportScene {
        file: PathBuf,
        output: PathBuf,
        /// ascii or binary
        #[arg(long, default_value = "binary")]
        format: StlFormat,
    },
    /// Check a lot outline given as x,y pairs in feet
    ValidateLot {
        #[arg(required = true, num_args = 3.., allow_hyphen_values = true)]
        points: Vec<String>,
    },
}

fn load_settings(path: Option<&Path>) -> Result<SettingsManager> {
    match path {
        Some(path) => SettingsManager::load(path),
        None => SettingsManager::load_default(),
    }
    .context("Failed to load settings")
}

fn open_design(settings: &SettingsManager, file: &Path) -> Result<PlannerApp> {
    let mut app = PlannerApp::with_settings(settings.clone())?;
    if !app.load_design(file, &mut AutoConfirm) {
        bail!("Could not open {}", file.display());
    }
    Ok(app)
}

fn parse_point(text: &str) -> Result<Point> {
    let (x, y) = text
        .split_once(',')
        .with_context(|| format!("Expected x,y but got '{}'", text))?;
    let x = x.trim().parse::<f64>().with_context(|| format!("Bad x in '{}'", text))?;
    let y = y.trim().parse::<f64>().with_context(|| format!("Bad y in '{}'", text))?;
    Ok(Point::new(x, y))
}

fn print_info(app: &PlannerApp) {
    let state = app.designer();
    let (width, depth) = state.lot().extent();
    println!("Design:   {}", state.display_name());
    println!(
        "Lot:      {} x {} ({:.0} sq ft{})",
        format_feet_inches(width),
        format_feet_inches(depth),
        state.lot().area(),
        if state.lot().is_custom_shape() { ", custom outline" } else { "" }
    );
    println!("Season:   {} at {:.1}h", state.season(), state.time_of_day());
    match state.custom_house() {
        Some(house) => println!(
            "House:    {} corners, {} walls, {:?} roof",
            house.outline.len(),
            format_feet_inches(house.wall_height),
            house.roof
        ),
        None => println!("House:    none"),
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for element in state.elements() {
        *counts.entry(element.kind.to_string()).or_default() += 1;
    }
    println!("Elements: {}", state.elements().len());
    for (kind, count) in counts {
        println!("  {:<12} {}", kind, count);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::New { output, width, depth } => {
            let canvas = settings.config().canvas.clone();
            let mut app = PlannerApp::with_settings(settings)?;
            if width.is_some() || depth.is_some() {
                let width = width.unwrap_or(canvas.default_lot_width);
                let depth = depth.unwrap_or(canvas.default_lot_depth);
                app.designer_mut().set_lot_rectangle(width, depth)?;
            }
            if !app.save_design(&output, &mut AutoConfirm) {
                bail!("Could not write {}", output.display());
            }
            println!("Created {}", output.display());
        }
        Commands::Info { file } => {
            let app = open_design(&settings, &file)?;
            print_info(&app);
        }
        Commands::Render {
            file,
            output,
            view,
            width,
            height,
            season,
            time,
        } => {
            let mut app = open_design(&settings, &file)?;
            if let Some(season) = season {
                app.designer_mut().set_season(season);
            }
            if let Some(time) = time {
                app.designer_mut().set_time_of_day(time)?;
            }
            let mode = match view {
                View::TwoD => ViewMode::TwoD,
                View::ThreeD => ViewMode::ThreeD,
            };
            app.designer_mut().set_view_mode(mode);
            let attached = app.settle().await;
            tracing::debug!("Attached {} models before rendering", attached);
            app.export_image(&output, width, height)?;
            println!("Wrote {}", output.display());
        }
        Commands::ExportScene {
            file,
            output,
            format,
        } => {
            let mut app = open_design(&settings, &file)?;
            app.settle().await;
            let triangles = app.export_scene(&output, format)?;
            println!("Wrote {} triangles to {}", triangles, output.display());
        }
        Commands::ValidateLot { points } => {
            let points = points
                .iter()
                .map(|p| parse_point(p))
                .collect::<Result<Vec<_>>>()?;
            let outline = validate_polygon(&points)?;
            println!(
                "Valid lot: {} corners, {:.1} sq ft",
                outline.len(),
                signed_area(&outline).abs()
            );
            for p in &outline {
                println!("  {:.2},{:.2}", p.x, p.y);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_feet_and_inches() {
        let cli = Cli::try_parse_from([
            "yardplan", "new", "yard.json", "--width", "12' 6\"", "--depth", "40ft 3in",
        ])
        .unwrap();
        match cli.command {
            Commands::New { width, depth, .. } => {
                assert_eq!(width, Some(12.5));
                assert_eq!(depth, Some(40.25));
            }
            _ => panic!("expected new"),
        }
    }

    #[test]
    fn test_new_rejects_bad_length() {
        assert!(Cli::try_parse_from(["yardplan", "new", "yard.json", "--width", "wide"]).is_err());
    }

    #[test]
    fn test_parse_point() {
        let p = parse_point(" 3.5, -2 ").unwrap();
        assert_eq!((p.x, p.y), (3.5, -2.0));
        assert!(parse_point("3.5").is_err());
    }
}
