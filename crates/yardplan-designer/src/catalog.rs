//! Plant and tree catalog.
//!
//! Supplies mature sizes for vegetation elements and the seasonal model file
//! used by the 3D view. A built-in table ships with the crate; a JSON file
//! with the same layout can replace it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::model::{ElementKind, PlantData, Season};

/// One species entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSpecies {
    pub id: String,
    pub common_name: String,
    #[serde(default)]
    pub is_tree: bool,
    /// Feet.
    pub mature_height: f64,
    /// Feet.
    pub canopy_diameter: f64,
    #[serde(default)]
    pub evergreen: bool,
    /// Model files are looked up as `<model_stem>_<season>.stl`.
    #[serde(default)]
    pub model_stem: Option<String>,
    /// Foliage colour per season, `#rrggbb`, in `Season::ALL` order.
    #[serde(default)]
    pub foliage: Option<[String; 4]>,
}

impl PlantSpecies {
    /// Element data for a freshly placed plant of this species.
    pub fn to_plant_data(&self) -> PlantData {
        PlantData {
            species: self.id.clone(),
            is_tree: self.is_tree,
            canopy_diameter: self.canopy_diameter,
            mature_height: self.mature_height,
        }
    }

    /// Seasonal model path below `model_dir`, if the species has models.
    pub fn model_path(&self, model_dir: &Path, season: Season) -> Option<PathBuf> {
        self.model_stem
            .as_ref()
            .map(|stem| model_dir.join(format!("{}_{}.stl", stem, season.as_str())))
    }

    /// Foliage colour for the season; deciduous trees are bare in winter.
    pub fn foliage_color(&self, season: Season) -> [u8; 3] {
        let idx = Season::ALL.iter().position(|s| *s == season).unwrap_or(1);
        if let Some(colors) = &self.foliage {
            if let Some(rgb) = crate::model::parse_hex_color(&colors[idx]) {
                return rgb;
            }
        }
        match (season, self.evergreen) {
            (_, true) => [34, 90, 50],
            (Season::Spring, false) => [120, 190, 90],
            (Season::Summer, false) => [50, 140, 50],
            (Season::Autumn, false) => [200, 110, 40],
            (Season::Winter, false) => [120, 100, 80],
        }
    }
}

/// Species lookup table.
#[derive(Debug, Clone)]
pub struct PlantCatalog {
    species: Vec<PlantSpecies>,
}

fn species(
    id: &str,
    name: &str,
    is_tree: bool,
    height: f64,
    canopy: f64,
    evergreen: bool,
    stem: Option<&str>,
) -> PlantSpecies {
    PlantSpecies {
        id: id.to_string(),
        common_name: name.to_string(),
        is_tree,
        mature_height: height,
        canopy_diameter: canopy,
        evergreen,
        model_stem: stem.map(str::to_string),
        foliage: None,
    }
}

impl PlantCatalog {
    /// Built-in species table.
    pub fn builtin() -> Self {
        Self {
            species: vec![
                species("red-maple", "Red Maple", true, 40.0, 30.0, false, Some("maple")),
                species("white-oak", "White Oak", true, 60.0, 50.0, false, Some("oak")),
                species("dogwood", "Flowering Dogwood", true, 20.0, 20.0, false, Some("dogwood")),
                species("blue-spruce", "Colorado Blue Spruce", true, 50.0, 15.0, true, Some("spruce")),
                species("apple", "Apple", true, 15.0, 15.0, false, Some("apple")),
                species("lilac", "Common Lilac", false, 10.0, 8.0, false, Some("lilac")),
                species("hydrangea", "Bigleaf Hydrangea", false, 5.0, 5.0, false, None),
                species("boxwood", "Boxwood", false, 3.0, 3.0, true, None),
                species("lavender", "English Lavender", false, 2.0, 2.0, true, None),
                species("tomato", "Tomato", false, 5.0, 2.0, false, None),
                species("hosta", "Hosta", false, 1.5, 2.5, false, None),
            ],
        }
    }

    /// Loads a catalog from a JSON array of species.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plant catalog {}", path.as_ref().display()))?;
        let species: Vec<PlantSpecies> =
            serde_json::from_str(&content).context("Failed to parse plant catalog")?;
        anyhow::ensure!(!species.is_empty(), "Plant catalog is empty");
        Ok(Self { species })
    }

    pub fn get(&self, id: &str) -> Option<&PlantSpecies> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantSpecies> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Species used when a vegetation element is added without data.
    pub fn default_for(&self, kind: ElementKind) -> Option<&PlantSpecies> {
        let preferred = match kind {
            ElementKind::Tree => "red-maple",
            ElementKind::Shrub => "boxwood",
            ElementKind::Plant => "lavender",
            _ => return None,
        };
        self.get(preferred).or_else(|| {
            let want_tree = kind == ElementKind::Tree;
            self.species.iter().find(|s| s.is_tree == want_tree)
        })
    }
}

impl Default for PlantCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
