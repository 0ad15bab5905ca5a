//! 2D canvas renderer.
//!
//! Projects a [`DesignQuery`] onto a tiny-skia pixmap: grid, lot boundary,
//! custom house, elements, selection outline and the drawing preview. All
//! geometry is converted to pixels through the [`Viewport`], so the pixmap
//! is drawn with identity transforms.

use std::path::Path;

use anyhow::Context;
use image::{Rgba, RgbaImage};
use tiny_skia::{
    Color, FillRule, Paint, Path as SkPath, PathBuilder, Pixmap, Rect, Stroke, StrokeDash,
    Transform,
};

use yardplan_core::constants::{GRID_SIZE_FT, MAJOR_GRID_EVERY};
use yardplan_core::geometry;
use yardplan_core::Point;

use crate::catalog::PlantCatalog;
use crate::designer_state::SelectionTarget;
use crate::model::{parse_hex_color, DesignElement, ElementData, Outline2D};
use crate::query::DesignQuery;
use crate::viewport::Viewport;

/// Minor grid lines are skipped below this spacing in pixels.
const MIN_MINOR_GRID_PX: f64 = 4.0;
const VERTEX_SIZE: f32 = 6.0;

fn rgba(rgb: [u8; 3], alpha: u8) -> Color {
    Color::from_rgba8(rgb[0], rgb[1], rgb[2], alpha)
}
fn background_color() -> Color {
    Color::from_rgba8(236, 240, 230, 255)
}
fn lot_fill_color() -> Color {
    Color::from_rgba8(196, 222, 160, 255)
}
fn lot_edge_color() -> Color {
    Color::from_rgba8(70, 100, 50, 255)
}
fn minor_grid_color() -> Color {
    Color::from_rgba8(0, 0, 0, 20)
}
fn major_grid_color() -> Color {
    Color::from_rgba8(0, 0, 0, 55)
}
fn selection_color() -> Color {
    Color::from_rgba8(255, 200, 0, 255)
}
fn preview_color(valid: bool) -> [u8; 3] {
    if valid {
        [40, 170, 60]
    } else {
        [210, 50, 50]
    }
}

/// Optional rendering settings.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub show_grid: bool,
    /// Used for seasonal plant colours; descriptor colours otherwise.
    pub catalog: Option<&'a PlantCatalog>,
}

impl Default for RenderOptions<'_> {
    fn default() -> Self {
        Self {
            show_grid: true,
            catalog: None,
        }
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Default::default()
    }
}

/// Closed (or open) polygon path through `points`, converted to pixels.
fn polygon_path(viewport: &Viewport, points: &[Point], close: bool) -> Option<SkPath> {
    let mut pb = PathBuilder::new();
    for (i, p) in points.iter().enumerate() {
        let (x, y) = viewport.world_point_to_pixel(p);
        if i == 0 {
            pb.move_to(x as f32, y as f32);
        } else {
            pb.line_to(x as f32, y as f32);
        }
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn element_path(viewport: &Viewport, element: &DesignElement) -> Option<SkPath> {
    match element.descriptor().outline {
        Outline2D::Rectangle => polygon_path(viewport, &element.corners(), true),
        Outline2D::Ellipse => {
            let c = element.center();
            let (x0, y0) = viewport.world_to_pixel(
                c.x - element.footprint.width / 2.0,
                c.y - element.footprint.depth / 2.0,
            );
            let (x1, y1) = viewport.world_to_pixel(
                c.x + element.footprint.width / 2.0,
                c.y + element.footprint.depth / 2.0,
            );
            let rect = Rect::from_ltrb(x0 as f32, y0 as f32, x1 as f32, y1 as f32)?;
            PathBuilder::from_oval(rect)
        }
    }
}

fn element_color(element: &DesignElement, season: crate::model::Season, catalog: Option<&PlantCatalog>) -> [u8; 3] {
    match &element.data {
        ElementData::Plant(plant) => catalog
            .and_then(|c| c.get(&plant.species))
            .map(|s| s.foliage_color(season))
            .unwrap_or(element.descriptor().color),
        ElementData::Structure(s) => s
            .wall_color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or(element.descriptor().color),
        _ => element.descriptor().color,
    }
}

fn draw_grid(pixmap: &mut Pixmap, viewport: &Viewport) {
    let (w, h) = (pixmap.width() as f64, pixmap.height() as f64);
    let top_left = viewport.pixel_to_world(0.0, 0.0);
    let bottom_right = viewport.pixel_to_world(w, h);
    let minor_visible = viewport.scale() * GRID_SIZE_FT >= MIN_MINOR_GRID_PX;
    let step = if minor_visible {
        GRID_SIZE_FT
    } else {
        GRID_SIZE_FT * MAJOR_GRID_EVERY as f64
    };

    let mut minor = PathBuilder::new();
    let mut major = PathBuilder::new();
    let is_major = |v: f64| {
        let index = (v / GRID_SIZE_FT).round() as i64;
        index.rem_euclid(MAJOR_GRID_EVERY as i64) == 0
    };

    let mut x = (top_left.x / step).floor() * step;
    while x <= bottom_right.x {
        let (px, _) = viewport.world_to_pixel(x, 0.0);
        let pb = if is_major(x) { &mut major } else { &mut minor };
        pb.move_to(px as f32, 0.0);
        pb.line_to(px as f32, h as f32);
        x += step;
    }
    let mut y = (top_left.y / step).floor() * step;
    while y <= bottom_right.y {
        let (_, py) = viewport.world_to_pixel(0.0, y);
        let pb = if is_major(y) { &mut major } else { &mut minor };
        pb.move_to(0.0, py as f32);
        pb.line_to(w as f32, py as f32);
        y += step;
    }

    if let Some(path) = minor.finish() {
        pixmap.stroke_path(&path, &paint(minor_grid_color()), &stroke(1.0), Transform::identity(), None);
    }
    if let Some(path) = major.finish() {
        pixmap.stroke_path(&path, &paint(major_grid_color()), &stroke(1.0), Transform::identity(), None);
    }
}

fn draw_drawing_preview(pixmap: &mut Pixmap, query: &dyn DesignQuery, viewport: &Viewport) {
    let drawing = query.drawing();
    let points = drawing.points();
    let valid = points.len() >= 3 && geometry::is_valid_polygon(points);
    let color = preview_color(valid);
    let id = Transform::identity();

    if points.len() >= 3 {
        if let Some(path) = polygon_path(viewport, points, true) {
            pixmap.fill_path(&path, &paint(rgba(color, 60)), FillRule::EvenOdd, id, None);
        }
    }
    if points.len() >= 2 {
        if let Some(path) = polygon_path(viewport, points, false) {
            pixmap.stroke_path(&path, &paint(rgba(color, 255)), &stroke(2.0), id, None);
        }
    }
    for p in points {
        let (x, y) = viewport.world_point_to_pixel(p);
        let half = VERTEX_SIZE / 2.0;
        if let Some(rect) = Rect::from_xywh(x as f32 - half, y as f32 - half, VERTEX_SIZE, VERTEX_SIZE) {
            pixmap.fill_rect(rect, &paint(rgba(color, 255)), id, None);
        }
    }

    let Some(hover) = drawing.hover() else {
        return;
    };
    if let Some(last) = points.last() {
        let mut dashed = stroke(1.5);
        dashed.dash = StrokeDash::new(vec![6.0, 4.0], 0.0);
        if let Some(path) = polygon_path(viewport, &[*last, hover], false) {
            pixmap.stroke_path(&path, &paint(rgba(color, 200)), &dashed, id, None);
        }
    }
    let (hx, hy) = viewport.world_point_to_pixel(&hover);
    if let Some(path) = PathBuilder::from_circle(hx as f32, hy as f32, 4.0) {
        pixmap.stroke_path(&path, &paint(rgba(color, 255)), &stroke(1.5), id, None);
    }
}

/// Renders the design into a new pixmap the size of the viewport canvas.
///
/// Returns `None` only for a zero-sized canvas.
pub fn render_canvas(
    query: &dyn DesignQuery,
    viewport: &Viewport,
    options: &RenderOptions<'_>,
) -> Option<Pixmap> {
    let width = viewport.canvas_width().round().max(0.0) as u32;
    let height = viewport.canvas_height().round().max(0.0) as u32;
    let mut pixmap = Pixmap::new(width, height)?;
    pixmap.fill(background_color());
    let id = Transform::identity();

    let lot_path = polygon_path(viewport, &query.lot().outline(), true);
    if let Some(path) = &lot_path {
        pixmap.fill_path(path, &paint(lot_fill_color()), FillRule::EvenOdd, id, None);
    }
    if options.show_grid {
        draw_grid(&mut pixmap, viewport);
    }
    if let Some(path) = &lot_path {
        pixmap.stroke_path(path, &paint(lot_edge_color()), &stroke(2.0), id, None);
    }

    let selection = query.selection();

    if let Some(house) = query.custom_house() {
        if let Some(path) = polygon_path(viewport, &house.lot_outline(), true) {
            let fill = parse_hex_color(&house.wall_color).unwrap_or([217, 199, 167]);
            pixmap.fill_path(&path, &paint(rgba(fill, 255)), FillRule::EvenOdd, id, None);
            pixmap.stroke_path(&path, &paint(Color::from_rgba8(60, 45, 30, 255)), &stroke(1.5), id, None);
            if selection == Some(SelectionTarget::CustomHouse) {
                pixmap.stroke_path(&path, &paint(selection_color()), &stroke(3.0), id, None);
            }
        }
    }

    let season = query.season();
    for element in query.elements() {
        let Some(path) = element_path(viewport, element) else {
            tracing::trace!("Element {} too small to draw", element.id);
            continue;
        };
        let fill = element_color(element, season, options.catalog);
        let alpha = if element.kind.is_vegetation() { 210 } else { 255 };
        pixmap.fill_path(&path, &paint(rgba(fill, alpha)), FillRule::Winding, id, None);
        pixmap.stroke_path(&path, &paint(Color::from_rgba8(0, 0, 0, 90)), &stroke(1.0), id, None);
        if selection == Some(SelectionTarget::Element(element.id)) {
            pixmap.stroke_path(&path, &paint(selection_color()), &stroke(3.0), id, None);
        }
    }

    if query.drawing().is_active() {
        draw_drawing_preview(&mut pixmap, query, viewport);
    }

    Some(pixmap)
}

/// Converts a premultiplied pixmap into a straight-alpha image.
pub fn pixmap_to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}

/// Writes a pixmap as PNG.
pub fn export_png(pixmap: &Pixmap, path: impl AsRef<Path>) -> anyhow::Result<()> {
    pixmap_to_image(pixmap)
        .save_with_format(path.as_ref(), image::ImageFormat::Png)
        .with_context(|| format!("Failed to write PNG {}", path.as_ref().display()))?;
    tracing::info!("Exported PNG to {}", path.as_ref().display());
    Ok(())
}
