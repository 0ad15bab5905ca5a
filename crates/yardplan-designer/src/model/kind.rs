//! Element kinds and the per-kind descriptor registry.
//!
//! Every place that needs to know something about an element type (default
//! footprint, whether it rotates, how the 2D and 3D views draw it) looks it
//! up here instead of matching on the kind itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::element::Footprint;

/// The fixed set of placeable element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    House,
    Garage,
    Shed,
    Deck,
    Patio,
    Path,
    Fence,
    RaisedBed,
    GardenBed,
    Lawn,
    Pond,
    Plant,
    Shrub,
    Tree,
}

impl ElementKind {
    pub const ALL: [ElementKind; 14] = [
        ElementKind::House,
        ElementKind::Garage,
        ElementKind::Shed,
        ElementKind::Deck,
        ElementKind::Patio,
        ElementKind::Path,
        ElementKind::Fence,
        ElementKind::RaisedBed,
        ElementKind::GardenBed,
        ElementKind::Lawn,
        ElementKind::Pond,
        ElementKind::Plant,
        ElementKind::Shrub,
        ElementKind::Tree,
    ];

    /// Tag used in save files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::House => "house",
            Self::Garage => "garage",
            Self::Shed => "shed",
            Self::Deck => "deck",
            Self::Patio => "patio",
            Self::Path => "path",
            Self::Fence => "fence",
            Self::RaisedBed => "raisedBed",
            Self::GardenBed => "gardenBed",
            Self::Lawn => "lawn",
            Self::Pond => "pond",
            Self::Plant => "plant",
            Self::Shrub => "shrub",
            Self::Tree => "tree",
        }
    }

    /// Registry entry for this kind.
    pub fn descriptor(&self) -> &'static ElementDescriptor {
        descriptor(*self)
    }

    /// True for kinds backed by the plant catalog.
    pub fn is_vegetation(&self) -> bool {
        matches!(self, Self::Plant | Self::Shrub | Self::Tree)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor().label)
    }
}

impl FromStr for ElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "");
        ElementKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().to_ascii_lowercase() == lowered)
            .ok_or_else(|| format!("Unknown element type: {}", s))
    }
}

/// How the 3D view builds geometry for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Solid box filling the footprint.
    Box,
    /// Thin box lying on the ground (patios, paths, lawns).
    Slab,
    /// Vertical cylinder inscribed in the footprint.
    Cylinder,
    /// Posts along the width joined by a thin panel.
    Fence,
    /// Catalog model by species and season, placeholder bush otherwise.
    Plant,
    /// Catalog model by species and season, trunk and canopy otherwise.
    Tree,
}

/// Outline drawn by the 2D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline2D {
    Rectangle,
    Ellipse,
}

/// Static description of an element kind.
#[derive(Debug, Clone, Copy)]
pub struct ElementDescriptor {
    pub kind: ElementKind,
    pub label: &'static str,
    pub footprint: Footprint,
    pub rotatable: bool,
    pub render: RenderStrategy,
    pub outline: Outline2D,
    /// RGB fill used by both views unless the element overrides it.
    pub color: [u8; 3],
}

const fn entry(
    kind: ElementKind,
    label: &'static str,
    size: (f64, f64, f64),
    rotatable: bool,
    render: RenderStrategy,
    outline: Outline2D,
    color: [u8; 3],
) -> ElementDescriptor {
    ElementDescriptor {
        kind,
        label,
        footprint: Footprint {
            width: size.0,
            depth: size.1,
            height: size.2,
        },
        rotatable,
        render,
        outline,
        color,
    }
}

use Outline2D::{Ellipse, Rectangle};
use RenderStrategy as R;

static REGISTRY: [ElementDescriptor; 14] = [
    entry(ElementKind::House, "House", (40.0, 30.0, 20.0), true, R::Box, Rectangle, [196, 164, 132]),
    entry(ElementKind::Garage, "Garage", (24.0, 24.0, 12.0), true, R::Box, Rectangle, [170, 150, 130]),
    entry(ElementKind::Shed, "Shed", (10.0, 8.0, 9.0), true, R::Box, Rectangle, [150, 111, 51]),
    entry(ElementKind::Deck, "Deck", (16.0, 12.0, 2.0), true, R::Box, Rectangle, [160, 120, 80]),
    entry(ElementKind::Patio, "Patio", (14.0, 14.0, 0.3), true, R::Slab, Rectangle, [190, 190, 180]),
    entry(ElementKind::Path, "Path", (3.0, 20.0, 0.2), true, R::Slab, Rectangle, [205, 195, 170]),
    entry(ElementKind::Fence, "Fence", (20.0, 0.5, 6.0), true, R::Fence, Rectangle, [120, 90, 60]),
    entry(ElementKind::RaisedBed, "Raised Bed", (8.0, 4.0, 1.5), true, R::Box, Rectangle, [139, 94, 60]),
    entry(ElementKind::GardenBed, "Garden Bed", (10.0, 5.0, 0.3), true, R::Slab, Rectangle, [101, 67, 33]),
    entry(ElementKind::Lawn, "Lawn", (30.0, 20.0, 0.1), true, R::Slab, Rectangle, [124, 185, 80]),
    entry(ElementKind::Pond, "Pond", (8.0, 6.0, 0.2), false, R::Cylinder, Ellipse, [70, 130, 180]),
    entry(ElementKind::Plant, "Plant", (2.0, 2.0, 2.0), false, R::Plant, Ellipse, [80, 160, 80]),
    entry(ElementKind::Shrub, "Shrub", (4.0, 4.0, 4.0), false, R::Plant, Ellipse, [60, 130, 60]),
    entry(ElementKind::Tree, "Tree", (20.0, 20.0, 30.0), false, R::Tree, Ellipse, [34, 110, 34]),
];

/// Looks up the descriptor for `kind`.
pub fn descriptor(kind: ElementKind) -> &'static ElementDescriptor {
    REGISTRY
        .iter()
        .find(|d| d.kind == kind)
        .unwrap_or(&REGISTRY[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_its_own_descriptor() {
        for kind in ElementKind::ALL {
            assert_eq!(descriptor(kind).kind, kind);
        }
    }

    #[test]
    fn test_from_str_accepts_save_tags() {
        for kind in ElementKind::ALL {
            assert_eq!(kind.as_str().parse::<ElementKind>(), Ok(kind));
        }
        assert_eq!("raised_bed".parse::<ElementKind>(), Ok(ElementKind::RaisedBed));
        assert!("gazebo".parse::<ElementKind>().is_err());
    }

    #[test]
    fn test_vegetation_does_not_rotate() {
        for kind in [ElementKind::Plant, ElementKind::Shrub, ElementKind::Tree] {
            assert!(!kind.descriptor().rotatable);
            assert!(kind.is_vegetation());
        }
        assert!(ElementKind::Shed.descriptor().rotatable);
    }
}
