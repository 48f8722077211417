//! Solid-of-revolution builders: capped frusta for segments and veins, UV
//! spheres for berries.

use crate::mesh::MeshFragment;
use bevy_math::Dir3;
use glam::{Quat, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Fewest radial sections a frustum is built with.
pub const MIN_SECTIONS: u32 = 3;
/// Most radial sections a frustum is built with.
pub const MAX_SECTIONS: u32 = 256;

/// Shape of one capped, tapered cylinder in its local frame (+Z up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrustumSpec {
    pub sections: u32,
    pub bottom_radius: f32,
    pub top_radius: f32,
    /// Rotation applied to the top ring about its own center before placement.
    pub top_tilt: Quat,
}

impl FrustumSpec {
    /// `sections` is clamped to [`MIN_SECTIONS`]..=[`MAX_SECTIONS`].
    pub fn new(sections: u32, bottom_radius: f32, top_radius: f32) -> Self {
        Self {
            sections: sections.clamp(MIN_SECTIONS, MAX_SECTIONS),
            bottom_radius,
            top_radius,
            top_tilt: Quat::IDENTITY,
        }
    }

    pub fn with_top_tilt(mut self, tilt: Quat) -> Self {
        self.top_tilt = tilt;
        self
    }

    /// Builds the frustum from `start` along `direction` and returns it with the
    /// tip point `start + direction * length`.
    ///
    /// Layout: bottom ring `0..s`, top ring `s..2s`, bottom center `2s`, top
    /// center `2s + 1`. Each side quad is two triangles and each cap is a fan,
    /// for `4s` faces in total.
    pub fn build(&self, start: Vec3, direction: Dir3, length: f32) -> (MeshFragment, Vec3) {
        debug_assert!(length > 0.0, "frustum length must be positive");
        debug_assert!(self.bottom_radius >= 0.0 && self.top_radius >= 0.0);

        let s = self.sections;
        let n = s as usize;
        let mut positions = Vec::with_capacity(2 * n + 2);
        let mut uvs = Vec::with_capacity(2 * n + 2);

        for i in 0..s {
            let theta = i as f32 / s as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            positions.push(Vec3::new(cos * self.bottom_radius, sin * self.bottom_radius, 0.0));
            uvs.push(Vec2::new(i as f32 / s as f32, 0.0));
        }
        let top_center = Vec3::new(0.0, 0.0, length);
        for i in 0..s {
            let theta = i as f32 / s as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            let rim = Vec3::new(cos * self.top_radius, sin * self.top_radius, 0.0);
            positions.push(top_center + self.top_tilt * rim);
            uvs.push(Vec2::new(i as f32 / s as f32, 1.0));
        }
        let center_bottom = 2 * s;
        let center_top = 2 * s + 1;
        positions.push(Vec3::ZERO);
        positions.push(top_center);
        uvs.push(Vec2::new(0.5, 0.5));
        uvs.push(Vec2::new(0.5, 0.5));

        let mut faces = Vec::with_capacity(4 * n);
        for i in 0..s {
            let next = (i + 1) % s;
            faces.push([i, next, s + i]);
            faces.push([next, s + next, s + i]);
        }
        for i in 0..s {
            let next = (i + 1) % s;
            faces.push([center_bottom, next, i]);
            faces.push([center_top, s + i, s + next]);
        }

        let rotation = if direction.as_vec3().dot(Vec3::Z) > ALIGNED_DOT {
            Quat::IDENTITY
        } else {
            align_z_to(direction)
        };
        let tip = start + direction.as_vec3() * length;
        let fragment = MeshFragment::new(positions, faces)
            .with_uvs(uvs)
            .transformed(rotation, start);
        (fragment, tip)
    }
}

/// Builds a capped frustum at `start` along `direction`; see [`FrustumSpec::build`].
pub fn build_frustum(
    start: Vec3,
    direction: Dir3,
    length: f32,
    bottom_radius: f32,
    top_radius: f32,
    sections: u32,
) -> (MeshFragment, Vec3) {
    FrustumSpec::new(sections, bottom_radius, top_radius).build(start, direction, length)
}

/// A straight cylinder from `from` to `to`, or `None` when the points coincide.
pub fn cylinder_between(from: Vec3, to: Vec3, radius: f32, sections: u32) -> Option<MeshFragment> {
    let delta = to - from;
    let length = delta.length();
    let direction = Dir3::new(delta).ok()?;
    if length <= f32::EPSILON {
        return None;
    }
    let (fragment, _) = FrustumSpec::new(sections, radius, radius).build(from, direction, length);
    Some(fragment)
}

const ALIGNED_DOT: f32 = 0.9999;

/// Rotation taking local +Z onto `direction`.
///
/// Parallel input yields the identity; antiparallel input yields a half turn
/// about X so the arc never divides by a vanishing cross product.
pub fn align_z_to(direction: Dir3) -> Quat {
    let to = direction.as_vec3();
    let dot = Vec3::Z.dot(to);
    if dot > ALIGNED_DOT {
        Quat::IDENTITY
    } else if dot < -ALIGNED_DOT {
        Quat::from_axis_angle(Vec3::X, PI)
    } else {
        Quat::from_rotation_arc(Vec3::Z, to)
    }
}

/// A latitude/longitude sphere centered at `center`.
///
/// `rings >= 2` latitude bands and `segments >= 3` longitude slices give
/// `2 + (rings - 1) * segments` vertices and `2 * segments * (rings - 1)` faces.
pub fn sphere(center: Vec3, radius: f32, rings: u32, segments: u32) -> MeshFragment {
    let rings = rings.max(2);
    let segments = segments.max(3);

    let mut positions = vec![Vec3::new(0.0, 0.0, radius)];
    let mut uvs = vec![Vec2::new(0.5, 0.0)];
    for k in 1..rings {
        let phi = PI * k as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for j in 0..segments {
            let theta = TAU * j as f32 / segments as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            positions.push(Vec3::new(sin_phi * cos_t, sin_phi * sin_t, cos_phi) * radius);
            uvs.push(Vec2::new(
                j as f32 / segments as f32,
                k as f32 / rings as f32,
            ));
        }
    }
    let south = positions.len() as u32;
    positions.push(Vec3::new(0.0, 0.0, -radius));
    uvs.push(Vec2::new(0.5, 1.0));

    let ring_start = |k: u32| 1 + (k - 1) * segments;
    let mut faces = Vec::with_capacity((2 * segments * (rings - 1)) as usize);
    for j in 0..segments {
        let next = (j + 1) % segments;
        faces.push([0, ring_start(1) + j, ring_start(1) + next]);
    }
    for k in 1..rings - 1 {
        let upper = ring_start(k);
        let lower = ring_start(k + 1);
        for j in 0..segments {
            let next = (j + 1) % segments;
            faces.push([upper + j, lower + j, lower + next]);
            faces.push([upper + j, lower + next, upper + next]);
        }
    }
    let last = ring_start(rings - 1);
    for j in 0..segments {
        let next = (j + 1) % segments;
        faces.push([south, last + next, last + j]);
    }

    MeshFragment::new(positions, faces)
        .with_uvs(uvs)
        .transformed(Quat::IDENTITY, center)
}
