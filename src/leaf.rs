//! Leaf and berry synthesis.
//!
//! A leaf is a small L-System of its own: two mirrored fans of branches
//! grown in the XY plane, drawn as thin veins with a triangulated blade
//! stretched between the branch tips. Leaves are built in local space with
//! growth along +Y and placed by the interpreter.

use crate::digits::{DigitCursor, DigitStream};
use crate::error::Result;
use crate::frustum::{cylinder_between, sphere};
use crate::grammar::{Grammar, LSystemString};
use crate::mesh::{Color, MeshFragment, rgb8};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Forest green.
pub const LEAF_COLOR: Color = rgb8(34, 139, 34);
/// Berry red.
pub const BERRY_COLOR: Color = rgb8(255, 0, 0);

/// Configuration for leaf synthesis and placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeafConfig {
    /// Leaf skeleton grammar; `+`/`-` turn, `F` draws, `[`/`]` branch.
    pub grammar: Grammar,
    pub iterations: u32,
    /// Turn angle of the skeleton, in degrees.
    pub angle_deg: f32,
    /// Vein step as a fraction of the parent segment length.
    pub step_fraction: f32,
    pub vein_radius: f32,
    pub vein_sections: u32,
    pub color: Color,
    /// When set, each leaf symbol consumes one digit and a leaf is placed only
    /// if the digit is greater than this value.
    pub spawn_threshold: Option<u8>,
    /// When set, leaves are placed only where the branch is thinner than this.
    pub max_radius: Option<f32>,
}

impl Default for LeafConfig {
    fn default() -> Self {
        Self {
            grammar: Grammar::new("[A][B]")
                .rule('A', "[+A]C")
                .rule('B', "[-B]C")
                .rule('C', "FFFC"),
            iterations: 6,
            angle_deg: 16.0,
            step_fraction: 1.0 / 8.0,
            vein_radius: 0.01,
            vein_sections: 3,
            color: LEAF_COLOR,
            spawn_threshold: None,
            max_radius: None,
        }
    }
}

/// Configuration for berries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BerryConfig {
    pub radius: f32,
    pub rings: u32,
    pub segments: u32,
    pub color: Color,
}

impl Default for BerryConfig {
    fn default() -> Self {
        Self {
            radius: 0.5,
            rings: 8,
            segments: 12,
            color: BERRY_COLOR,
        }
    }
}

/// A colored sphere at `center`.
pub fn berry(config: &BerryConfig, center: Vec3) -> MeshFragment {
    sphere(center, config.radius, config.rings, config.segments).with_color(config.color)
}

/// Builds one leaf in local space, or `None` if the skeleton draws nothing.
///
/// `step` is the length of a single `F`.
pub fn synthesize_leaf(
    config: &LeafConfig,
    step: f32,
    stream: &DigitStream,
) -> Result<Option<MeshFragment>> {
    let mut cursor = DigitCursor::default();
    let skeleton = config
        .grammar
        .expand(config.iterations, stream, &mut cursor)?;
    Ok(leaf_from_skeleton(config, &skeleton, step))
}

struct Vein {
    from: Vec3,
    to: Vec3,
}

impl Vein {
    fn length(&self) -> f32 {
        self.from.distance(self.to)
    }
}

/// Interprets a leaf skeleton with a flat turtle rotating about +Z.
pub fn leaf_from_skeleton(
    config: &LeafConfig,
    skeleton: &LSystemString,
    step: f32,
) -> Option<MeshFragment> {
    let symbols: Vec<char> = skeleton.symbols().collect();
    let turn = config.angle_deg.to_radians();

    let mut position = Vec3::ZERO;
    let mut heading = Vec3::Y;
    let mut stack: Vec<(Vec3, Vec3)> = Vec::new();
    let mut veins: Vec<Vein> = Vec::new();
    let mut tips: Vec<Vec3> = Vec::new();

    let mut i = 0;
    while i < symbols.len() {
        match symbols[i] {
            'F' => {
                // A run of F draws one straight vein.
                let run = symbols[i..].iter().take_while(|&&c| c == 'F').count();
                let to = position + heading * step * run as f32;
                veins.push(Vein { from: position, to });
                position = to;
                i += run;
                continue;
            }
            '+' => heading = Quat::from_rotation_z(turn) * heading,
            '-' => heading = Quat::from_rotation_z(-turn) * heading,
            '[' => stack.push((position, heading)),
            ']' => {
                if i >= 2 && symbols[i - 1] == 'C' && symbols[i - 2] == 'F' {
                    tips.push(position);
                }
                if let Some((p, h)) = stack.pop() {
                    position = p;
                    heading = h;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let mut leaf: Option<MeshFragment> = None;
    let mut add = |fragment: MeshFragment| match leaf.as_mut() {
        Some(existing) => existing.merge(fragment),
        None => leaf = Some(fragment),
    };

    veins.sort_by(|a, b| a.length().total_cmp(&b.length()));
    if let Some(median) = veins.get(veins.len() / 2) {
        // The median vein is drawn a second time, doubled, as the midrib.
        if let Some(rib) = cylinder_between(
            median.from,
            median.to,
            config.vein_radius * 2.0,
            config.vein_sections,
        ) {
            add(rib);
        }
    }
    for vein in &veins {
        if let Some(cylinder) =
            cylinder_between(vein.from, vein.to, config.vein_radius, config.vein_sections)
        {
            add(cylinder);
        }
    }

    if let Some(blade) = blade(&tips) {
        add(blade);
    }

    leaf.map(|l| l.with_color(config.color))
}

/// Fan of triangles from the leaf origin over consecutive tips, facing +Z.
fn blade(tips: &[Vec3]) -> Option<MeshFragment> {
    const MIN_AREA: f32 = 1e-8;

    let mut positions = vec![Vec3::ZERO];
    positions.extend_from_slice(tips);
    let faces: Vec<[u32; 3]> = (0..tips.len().saturating_sub(1))
        .filter_map(|i| {
            let a = (i + 1) as u32;
            let b = (i + 2) as u32;
            let normal = (positions[b as usize] - positions[a as usize])
                .cross(positions[0] - positions[a as usize]);
            if normal.length() * 0.5 <= MIN_AREA {
                None
            } else if normal.z >= 0.0 {
                Some([a, b, 0])
            } else {
                Some([b, a, 0])
            }
        })
        .collect();

    if faces.is_empty() {
        return None;
    }
    Some(MeshFragment::new(positions, faces))
}
