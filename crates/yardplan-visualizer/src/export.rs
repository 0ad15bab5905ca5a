//! STL export of the whole scene with world transforms baked in.

use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::mesh::triangle_normal;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StlFormat {
    Ascii,
    #[default]
    Binary,
}

impl std::str::FromStr for StlFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "text" => Ok(Self::Ascii),
            "binary" | "bin" => Ok(Self::Binary),
            _ => Err(format!("Unknown STL format: {}", s)),
        }
    }
}

/// Every scene triangle in world coordinates.
pub fn scene_triangles(scene: &Scene) -> Vec<stl_io::Triangle> {
    scene
        .mesh_instances()
        .iter()
        .flat_map(|instance| {
            instance.mesh.triangle_vertices().map(move |tri| {
                let world = tri.map(|p| instance.transform.transform_point3(p));
                let n = triangle_normal(&world);
                stl_io::Triangle {
                    normal: stl_io::Normal::new([n.x, n.y, n.z]),
                    vertices: world.map(|p| stl_io::Vertex::new([p.x, p.y, p.z])),
                }
            })
        })
        .collect()
}

fn write_ascii<W: Write>(out: &mut W, triangles: &[stl_io::Triangle]) -> std::io::Result<()> {
    writeln!(out, "solid yardplan")?;
    for tri in triangles {
        let n = &tri.normal;
        writeln!(out, "  facet normal {} {} {}", n[0], n[1], n[2])?;
        writeln!(out, "    outer loop")?;
        for v in &tri.vertices {
            writeln!(out, "      vertex {} {} {}", v[0], v[1], v[2])?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid yardplan")?;
    Ok(())
}

/// Writes the scene to `path`. Returns the number of triangles written.
pub fn export_stl(scene: &Scene, path: impl AsRef<Path>, format: StlFormat) -> anyhow::Result<usize> {
    let path = path.as_ref();
    let triangles = scene_triangles(scene);
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    match format {
        StlFormat::Ascii => write_ascii(&mut out, &triangles),
        StlFormat::Binary => stl_io::write_stl(&mut out, triangles.iter()),
    }
    .with_context(|| format!("Failed to write {}", path.display()))?;
    out.flush()?;
    tracing::info!(
        "Exported {} triangles to {} ({:?})",
        triangles.len(),
        path.display(),
        format
    );
    Ok(triangles.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneAssets;
    use yardplan_designer::{DesignerState, ElementKind};

    fn sample_scene() -> Scene {
        let mut state = DesignerState::new();
        state.add_element(ElementKind::Shed, None).unwrap();
        let mut scene = Scene::new(SceneAssets::default());
        scene.rebuild(&state);
        scene
    }

    #[test]
    fn test_binary_export_reads_back() {
        let scene = sample_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yard.stl");
        let count = export_stl(&scene, &path, StlFormat::Binary).unwrap();
        let expected: usize = scene
            .mesh_instances()
            .iter()
            .map(|i| i.mesh.triangle_count())
            .sum();
        assert_eq!(count, expected);
        // surround plane and shed are boxes
        assert!(count > 24);

        let mut file = File::open(&path).unwrap();
        let mesh = stl_io::read_stl(&mut file).unwrap();
        assert_eq!(mesh.faces.len(), count);
    }

    #[test]
    fn test_ascii_export_reads_back() {
        let scene = sample_scene();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yard.stl");
        let count = export_stl(&scene, &path, StlFormat::Ascii).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("solid yardplan"));
        assert_eq!(text.matches("endfacet").count(), count);
    }
}
