//! Mesh fragments and the assembled, exportable mesh.

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// RGBA vertex color, components in `0.0..=1.0`.
pub type Color = [f32; 4];

/// Neutral bark color used to pad fragments that carry no colors.
pub const BARK_COLOR: Color = [0.45, 0.32, 0.2, 1.0];

/// Color from 8-bit sRGB components.
pub const fn rgb8(r: u8, g: u8, b: u8) -> Color {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// One piece of geometry produced by a single builder call.
///
/// Faces are index triples into `positions` with counter-clockwise winding seen
/// from outside. `uvs` and `colors`, when present, have one entry per vertex.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshFragment {
    pub positions: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub uvs: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Color>>,
}

impl MeshFragment {
    pub fn new(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            uvs: None,
            colors: None,
        }
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        debug_assert_eq!(uvs.len(), self.positions.len());
        self.uvs = Some(uvs);
        self
    }

    /// Paints every vertex with `color`.
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors = Some(vec![color; self.positions.len()]);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Rotates about the local origin, then translates.
    pub fn transformed(mut self, rotation: Quat, translation: Vec3) -> Self {
        for p in &mut self.positions {
            *p = rotation * *p + translation;
        }
        self
    }

    /// Appends `other`, rebasing its indices. Both fragments keep parallel buffers.
    pub fn merge(&mut self, other: MeshFragment) {
        append_buffers(
            &mut self.positions,
            &mut self.faces,
            &mut self.uvs,
            &mut self.colors,
            other,
            BARK_COLOR,
        );
    }
}

/// The concatenation of every fragment of a tree; the only exported artifact.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    pub uvs: Option<Vec<Vec2>>,
    pub colors: Option<Vec<Color>>,
}

impl Mesh {
    /// A mesh with no vertices and no faces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Concatenates fragments in order, offsetting each fragment's indices by
    /// the number of vertices already collected.
    ///
    /// An empty input yields [`Mesh::empty`]. When only some fragments carry
    /// UVs or colors the others are padded with `Vec2::ZERO` and
    /// [`BARK_COLOR`].
    pub fn concatenate<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = MeshFragment>,
    {
        let mut mesh = Self::empty();
        for fragment in fragments {
            mesh.append(fragment);
        }
        mesh
    }

    pub fn append(&mut self, fragment: MeshFragment) {
        append_buffers(
            &mut self.positions,
            &mut self.faces,
            &mut self.uvs,
            &mut self.colors,
            fragment,
            BARK_COLOR,
        );
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }

    /// Checks that buffers are parallel, every index is in range, and no face
    /// repeats a vertex.
    pub fn validate(&self) -> bool {
        let n = self.positions.len();
        let parallel = self.uvs.as_ref().is_none_or(|uv| uv.len() == n)
            && self.colors.as_ref().is_none_or(|c| c.len() == n);
        parallel
            && self.faces.iter().all(|&[a, b, c]| {
                (a as usize) < n && (b as usize) < n && (c as usize) < n && a != b && b != c && a != c
            })
    }
}

fn append_buffers(
    positions: &mut Vec<Vec3>,
    faces: &mut Vec<[u32; 3]>,
    uvs: &mut Option<Vec<Vec2>>,
    colors: &mut Option<Vec<Color>>,
    other: MeshFragment,
    fill_color: Color,
) {
    let offset = positions.len();
    let added = other.positions.len();
    let base = offset as u32;

    match (uvs.as_mut(), other.uvs) {
        (Some(dst), Some(src)) => dst.extend(src),
        (Some(dst), None) => dst.resize(offset + added, Vec2::ZERO),
        (None, Some(src)) => {
            let mut dst = vec![Vec2::ZERO; offset];
            dst.extend(src);
            *uvs = Some(dst);
        }
        (None, None) => {}
    }

    match (colors.as_mut(), other.colors) {
        (Some(dst), Some(src)) => dst.extend(src),
        (Some(dst), None) => dst.resize(offset + added, fill_color),
        (None, Some(src)) => {
            let mut dst = vec![fill_color; offset];
            dst.extend(src);
            *colors = Some(dst);
        }
        (None, None) => {}
    }

    positions.extend(other.positions);
    faces.extend(
        other
            .faces
            .into_iter()
            .map(|[a, b, c]| [a + base, b + base, c + base]),
    );
}
