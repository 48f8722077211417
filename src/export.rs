//! Wavefront OBJ export for assembled meshes.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

// ---------------------------------------------------------------------------
// OBJ Export
// ---------------------------------------------------------------------------

/// Convert a [`Mesh`] to OBJ text.
///
/// Vertex colors, when present, are appended to each `v` line as `r g b`.
/// Faces reference matching `vt` entries when the mesh has UVs.
pub fn mesh_to_obj(mesh: &Mesh, object_name: &str) -> String {
    let mut obj = String::new();
    let _ = writeln!(obj, "o {object_name}");

    match &mesh.colors {
        Some(colors) => {
            for (p, c) in mesh.positions.iter().zip(colors) {
                let _ = writeln!(obj, "v {} {} {} {} {} {}", p.x, p.y, p.z, c[0], c[1], c[2]);
            }
        }
        None => {
            for p in &mesh.positions {
                let _ = writeln!(obj, "v {} {} {}", p.x, p.y, p.z);
            }
        }
    }

    if let Some(uvs) = &mesh.uvs {
        for uv in uvs {
            let _ = writeln!(obj, "vt {} {}", uv.x, uv.y);
        }
    }

    let has_uvs = mesh.uvs.is_some();
    for face in &mesh.faces {
        let [a, b, c] = face.map(|i| i + 1);
        if has_uvs {
            let _ = writeln!(obj, "f {a}/{a} {b}/{b} {c}/{c}");
        } else {
            let _ = writeln!(obj, "f {a} {b} {c}");
        }
    }

    obj
}

/// Write `mesh` as an OBJ file, naming the object after the file stem.
///
/// An empty mesh is rejected with [`Error::EmptyMesh`] and nothing is written.
pub fn write_obj(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if mesh.is_empty() {
        return Err(Error::EmptyMesh);
    }
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("lsystem");

    let mut text = String::from("# generated by lsys-tree\n");
    text.push_str(&mesh_to_obj(mesh, name));
    std::fs::write(path, text)?;

    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "wrote OBJ"
    );
    Ok(())
}
