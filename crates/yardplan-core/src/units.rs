//! Unit conversion utilities
//!
//! Design data is stored in feet. The 2D view draws in pixels and the 3D
//! scene works in world units; both conversions go through here.
//! Also handles feet-and-inches parsing and formatting for display.

use crate::constants::{GRID_SIZE_FT, PIXELS_PER_FOOT, WORLD_UNITS_PER_FOOT};

/// Converts feet to screen pixels at the given zoom.
pub fn feet_to_pixels(feet: f64, zoom: f64) -> f64 {
    feet * PIXELS_PER_FOOT * zoom
}

/// Converts screen pixels to feet at the given zoom.
pub fn pixels_to_feet(pixels: f64, zoom: f64) -> f64 {
    pixels / (PIXELS_PER_FOOT * zoom)
}

/// Converts feet to 3D world units.
pub fn feet_to_world(feet: f64) -> f32 {
    feet as f32 * WORLD_UNITS_PER_FOOT
}

/// Converts 3D world units back to feet.
pub fn world_to_feet(world: f32) -> f64 {
    (world / WORLD_UNITS_PER_FOOT) as f64
}

/// Snaps a value in feet to the placement grid.
pub fn snap_to_grid(feet: f64) -> f64 {
    (feet / GRID_SIZE_FT).round() * GRID_SIZE_FT
}

/// Format a length in feet for display, e.g. `12' 6"`.
pub fn format_feet_inches(feet: f64) -> String {
    let sign = if feet < 0.0 { "-" } else { "" };
    let total_inches = (feet.abs() * 12.0).round() as i64;
    let ft = total_inches / 12;
    let inches = total_inches % 12;
    if inches == 0 {
        format!("{}{}'", sign, ft)
    } else {
        format!("{}{}' {}\"", sign, ft, inches)
    }
}

/// Parse a length string into feet.
///
/// Accepts plain decimals (`12.5`), feet and inches (`12' 6"`, `12ft 6in`)
/// and bare inches (`18"`).
pub fn parse_feet(input: &str) -> Result<f64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty length".to_string());
    }
    if let Ok(v) = input.parse::<f64>() {
        return Ok(v);
    }

    let normalized = input
        .replace("ft", "'")
        .replace("in", "\"")
        .replace(' ', "");

    let (feet_part, rest) = match normalized.split_once('\'') {
        Some((f, r)) => (Some(f), r),
        None => (None, normalized.as_str()),
    };

    let mut total = 0.0;
    if let Some(f) = feet_part {
        total += f
            .parse::<f64>()
            .map_err(|_| format!("Invalid feet value: {}", input))?;
    }
    let inch_str = rest.trim_end_matches('"');
    if !inch_str.is_empty() {
        let inches = inch_str
            .parse::<f64>()
            .map_err(|_| format!("Invalid inch value: {}", input))?;
        total += inches / 12.0;
    } else if feet_part.is_none() {
        return Err(format!("Invalid length: {}", input));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_round_trip() {
        let px = feet_to_pixels(12.5, 1.5);
        assert!((pixels_to_feet(px, 1.5) - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(3.4), 3.0);
        assert_eq!(snap_to_grid(3.6), 4.0);
        assert_eq!(snap_to_grid(-0.6), -1.0);
    }

    #[test]
    fn test_format_feet_inches() {
        assert_eq!(format_feet_inches(12.0), "12'");
        assert_eq!(format_feet_inches(12.5), "12' 6\"");
        assert_eq!(format_feet_inches(-1.25), "-1' 3\"");
    }

    #[test]
    fn test_parse_feet() {
        assert_eq!(parse_feet("12.5"), Ok(12.5));
        assert_eq!(parse_feet("12' 6\""), Ok(12.5));
        assert_eq!(parse_feet("3ft 6in"), Ok(3.5));
        assert_eq!(parse_feet("18\""), Ok(1.5));
        assert!(parse_feet("abc").is_err());
        assert!(parse_feet("").is_err());
    }
}
