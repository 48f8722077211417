//! Interpreter that walks an expanded L-System string and emits tree geometry.
//!
//! The entry point is [`TreeInterpreter`]. Configure it with a [`TurtleConfig`],
//! register symbol-to-operation mappings via [`TreeInterpreter::set_op`] or
//! [`TreeInterpreter::populate_standard_symbols`], then call
//! [`TreeInterpreter::interpret`] with an [`LSystemString`] and a starting [`Pose`].

use crate::digits::{DigitCursor, DigitStream};
use crate::error::{Error, Result};
use crate::frustum::{FrustumSpec, align_z_to};
use crate::grammar::{Grammar, LSystemString};
use crate::leaf::{BerryConfig, LeafConfig, berry, synthesize_leaf};
use crate::mesh::{Color, Mesh, MeshFragment};
use crate::turtle::{FrameAxis, Pose, TurtleOp};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Per-segment orientation noise drawn from the digit stream.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Jitter {
    /// Width of the angle range in degrees; offsets fall in `±variation / 2`.
    /// Zero disables jitter and consumes no digits.
    pub variation_deg: f32,
    /// Average each draw with the following pair of digits.
    pub smoothed: bool,
    /// Tilt the top ring of a segment by its jitter so the next segment meets it.
    pub tilt_top: bool,
}

impl Default for Jitter {
    fn default() -> Self {
        Self {
            variation_deg: 0.0,
            smoothed: false,
            tilt_top: false,
        }
    }
}

/// The nested sub-system grown at every leafy-branch symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchConfig {
    pub grammar: Grammar,
    pub iterations: u32,
    /// Branch segment length relative to the parent's.
    pub length_scale: f32,
    pub taper: f32,
    /// Fixed pitch of `+`/`-` inside the branch, in degrees.
    pub spread_deg: f32,
    pub jitter_variation_deg: f32,
    /// Digits reserved from the parent cursor per branch iteration.
    pub digits_per_iteration: usize,
    pub leaf: LeafConfig,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            grammar: Grammar::new("A").staged('A', "AF[J]", "AFF[+J][-J][^J][&J]"),
            iterations: 12,
            length_scale: 0.5,
            taper: 0.8,
            spread_deg: 60.0,
            jitter_variation_deg: 30.0,
            digits_per_iteration: 10,
            leaf: LeafConfig {
                spawn_threshold: Some(4),
                max_radius: Some(1.0),
                ..Default::default()
            },
        }
    }
}

/// Configuration for tree interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurtleConfig {
    /// Length of one segment.
    pub length: f32,
    /// Per-segment radius multiplier.
    pub taper: f32,
    /// Rotation angle (in radians) for Pitch/Yaw/Roll.
    pub angle: f32,
    /// Radial sections of each segment.
    pub sections: u32,
    /// Bottom radius of a segment relative to the current radius.
    pub bottom_flare: f32,
    /// Distance a segment's geometry starts behind the turtle. The turtle
    /// still advances by exactly `length`.
    pub segment_offset: f32,
    pub jitter: Jitter,
    /// Vertex color for segments; `None` leaves them uncolored.
    pub bark_color: Option<Color>,
    pub leaf: LeafConfig,
    pub berry: BerryConfig,
    pub branch: Option<BranchConfig>,
    /// Maximum stack depth for push/pop operations.
    pub max_stack_depth: usize,
    /// Maximum number of segments, nested branches included.
    pub max_segments: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            length: 1.0,
            taper: 1.0,
            angle: 15.0f32.to_radians(),
            sections: 16,
            bottom_flare: 1.0,
            segment_offset: 0.0,
            jitter: Jitter::default(),
            bark_color: None,
            leaf: LeafConfig::default(),
            berry: BerryConfig::default(),
            branch: None,
            max_stack_depth: 1024,
            max_segments: 250_000,
        }
    }
}

/// Result of one interpretation pass.
#[derive(Clone, Debug)]
pub struct Interpretation {
    /// Fragments in emission order.
    pub fragments: Vec<MeshFragment>,
    /// Pose after the last symbol.
    pub pose: Pose,
    pub segments: usize,
    pub leaves: usize,
    pub berries: usize,
    pub branches: usize,
}

impl Interpretation {
    pub fn into_mesh(self) -> Mesh {
        Mesh::concatenate(self.fragments)
    }
}

const SYMBOL_TABLE_SIZE: usize = 128;

/// Interprets L-System output to build tree geometry.
#[derive(Clone, Debug)]
pub struct TreeInterpreter {
    op_map: Vec<TurtleOp>,
    config: TurtleConfig,
}

impl TreeInterpreter {
    /// Creates a new interpreter with the given configuration and an empty symbol map.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            op_map: vec![TurtleOp::Ignore; SYMBOL_TABLE_SIZE],
            config,
        }
    }

    /// Replaces the entire symbol-to-operation map in one step (builder pattern).
    ///
    /// `map` is indexed by ASCII code. Codes outside the slice are
    /// [`TurtleOp::Ignore`].
    pub fn with_map(mut self, mut map: Vec<TurtleOp>) -> Self {
        map.resize(SYMBOL_TABLE_SIZE, TurtleOp::Ignore);
        self.op_map = map;
        self
    }

    /// Assigns a single [`TurtleOp`] to an ASCII symbol. Non-ASCII symbols are ignored.
    pub fn set_op(&mut self, symbol: char, op: TurtleOp) {
        if symbol.is_ascii() {
            self.op_map[symbol as usize] = op;
        }
    }

    /// Operation registered for `symbol`.
    pub fn op(&self, symbol: char) -> TurtleOp {
        if symbol.is_ascii() {
            self.op_map[symbol as usize]
        } else {
            TurtleOp::Ignore
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Registers the conventional symbol-to-operation mappings.
    pub fn populate_standard_symbols(&mut self) {
        let mappings = [
            // Geometry
            ('F', TurtleOp::Segment),
            ('f', TurtleOp::LeafyBranch),
            ('J', TurtleOp::Leaf),
            ('K', TurtleOp::Berry),
            // Spatial
            ('+', TurtleOp::Pitch(1.0)),
            ('-', TurtleOp::Pitch(-1.0)),
            ('&', TurtleOp::Yaw(1.0)),
            ('^', TurtleOp::Yaw(-1.0)),
            ('\\', TurtleOp::Roll(1.0)),
            ('/', TurtleOp::Roll(-1.0)),
            ('|', TurtleOp::TurnAround),
            // Flow
            ('[', TurtleOp::Push),
            (']', TurtleOp::Pop),
        ];

        for (sym, op) in mappings {
            self.set_op(sym, op);
        }
    }

    /// An interpreter with the standard symbols already registered.
    pub fn standard(config: TurtleConfig) -> Self {
        let mut interpreter = Self::new(config);
        interpreter.populate_standard_symbols();
        interpreter
    }

    /// Walks `lsystem` from `start`, reading jitter and gating digits at `cursor`.
    ///
    /// Symbols with no registered mapping are ignored. `]` on an empty stack
    /// is a no-op. Fails only when a resource limit is hit.
    pub fn interpret(
        &self,
        lsystem: &LSystemString,
        start: Pose,
        stream: &DigitStream,
        cursor: &mut DigitCursor,
    ) -> Result<Interpretation> {
        self.run(lsystem, start, stream, cursor, self.config.max_segments)
    }

    fn run(
        &self,
        lsystem: &LSystemString,
        start: Pose,
        stream: &DigitStream,
        cursor: &mut DigitCursor,
        segment_budget: usize,
    ) -> Result<Interpretation> {
        let cfg = &self.config;
        let mut out = Interpretation {
            fragments: Vec::new(),
            pose: start,
            segments: 0,
            leaves: 0,
            berries: 0,
            branches: 0,
        };
        let mut pose = start;
        let mut stack: Vec<Pose> = Vec::new();
        let mut leaf_template: Option<Option<MeshFragment>> = None;
        let mut branch: Option<(TreeInterpreter, LSystemString)> = None;

        for symbol in lsystem.symbols() {
            match self.op(symbol) {
                // --- GEOMETRY ---
                TurtleOp::Segment => {
                    if out.segments >= segment_budget {
                        return Err(Error::SegmentLimit {
                            limit: cfg.max_segments,
                        });
                    }
                    let fragment = self.segment(&mut pose, stream, cursor);
                    out.fragments.push(fragment);
                    out.segments += 1;
                }
                TurtleOp::Leaf => {
                    let leaf = &cfg.leaf;
                    if let Some(threshold) = leaf.spawn_threshold
                        && cursor.next(stream) <= threshold
                    {
                        continue;
                    }
                    if leaf.max_radius.is_some_and(|max| pose.radius >= max) {
                        continue;
                    }
                    if leaf_template.is_none() {
                        let step = cfg.length * leaf.step_fraction;
                        leaf_template = Some(synthesize_leaf(leaf, step, stream)?);
                    }
                    if let Some(Some(template)) = &leaf_template {
                        out.fragments
                            .push(template.clone().transformed(pose.basis(), pose.position));
                        out.leaves += 1;
                    }
                }
                TurtleOp::Berry => {
                    out.fragments.push(berry(&cfg.berry, pose.position));
                    out.berries += 1;
                }
                TurtleOp::LeafyBranch => {
                    let Some(branch_cfg) = &cfg.branch else {
                        continue;
                    };
                    if branch.is_none() {
                        let skeleton = branch_cfg.grammar.expand(
                            branch_cfg.iterations,
                            stream,
                            &mut DigitCursor::default(),
                        )?;
                        branch = Some((self.branch_interpreter(branch_cfg), skeleton));
                    }
                    if let Some((sub, skeleton)) = &branch {
                        let reserved =
                            branch_cfg.iterations as usize * branch_cfg.digits_per_iteration;
                        let mut slice = cursor.reserve(reserved);
                        let slice_start = slice.position();
                        let remaining = segment_budget - out.segments;
                        let grown = sub.run(skeleton, pose, stream, &mut slice, remaining)?;
                        debug_assert!(
                            slice.position().wrapping_sub(slice_start) <= reserved,
                            "leafy branch read {} digits past its reserved {reserved}",
                            slice.position().wrapping_sub(slice_start) - reserved,
                        );
                        debug!(
                            segments = grown.segments,
                            leaves = grown.leaves,
                            "grew leafy branch"
                        );
                        out.segments += grown.segments;
                        out.leaves += grown.leaves;
                        out.berries += grown.berries;
                        out.branches += 1;
                        out.fragments.extend(grown.fragments);
                    }
                }

                // --- SPATIAL ---
                TurtleOp::Pitch(s) => pose.pitch(cfg.angle * s),
                TurtleOp::Yaw(s) => pose.yaw(cfg.angle * s),
                TurtleOp::Roll(s) => pose.roll(cfg.angle * s),
                TurtleOp::Turn { axis, degrees } => pose.rotate_local(axis, degrees.to_radians()),
                TurtleOp::TurnAround => pose.turn_around(),

                // --- FLOW ---
                TurtleOp::Push => {
                    if stack.len() >= cfg.max_stack_depth {
                        return Err(Error::StackOverflow {
                            depth: stack.len() + 1,
                        });
                    }
                    stack.push(pose);
                }
                TurtleOp::Pop => {
                    if let Some(saved) = stack.pop() {
                        pose = saved;
                    }
                }
                TurtleOp::Ignore => {}
            }
        }

        out.pose = pose;
        Ok(out)
    }

    /// Emits one segment at `pose`, then advances and tapers it.
    fn segment(
        &self,
        pose: &mut Pose,
        stream: &DigitStream,
        cursor: &mut DigitCursor,
    ) -> MeshFragment {
        let cfg = &self.config;
        let bottom_radius = pose.radius * cfg.bottom_flare;
        let top_radius = pose.radius * cfg.taper;
        let heading = pose.heading();
        let jitter = self.draw_jitter(stream, cursor);

        let mut spec = FrustumSpec::new(cfg.sections, bottom_radius, top_radius);
        if cfg.jitter.tilt_top
            && let Some((axis, angle)) = jitter
        {
            // Express the world-space jitter in the frustum's local frame.
            let local_axis = align_z_to(heading).inverse() * axis;
            spec = spec.with_top_tilt(Quat::from_axis_angle(local_axis, angle));
        }

        let start = pose.position - pose.forward * cfg.segment_offset;
        let (mut fragment, tip) = spec.build(start, heading, cfg.length + cfg.segment_offset);
        if let Some(color) = cfg.bark_color {
            fragment = fragment.with_color(color);
        }

        pose.position = tip;
        pose.radius = top_radius;
        if let Some((axis, angle)) = jitter {
            pose.rotate_world(axis, angle);
        }
        fragment
    }

    /// Draws `(world axis, radians)` from two digits, or `None` when jitter is off.
    fn draw_jitter(&self, stream: &DigitStream, cursor: &mut DigitCursor) -> Option<(Vec3, f32)> {
        let jitter = self.config.jitter;
        if jitter.variation_deg <= 0.0 {
            return None;
        }
        let angle_of = |d: u8| d as f32 / 9.0 * jitter.variation_deg - jitter.variation_deg / 2.0;

        let angle_digit = cursor.next(stream);
        let axis_digit = cursor.next(stream);
        let mut angle = angle_of(angle_digit);
        let mut axis = principal_axis(axis_digit);

        if jitter.smoothed {
            let next_angle = angle_of(cursor.peek(stream, 0));
            let next_axis = principal_axis(cursor.peek(stream, 1));
            angle = (angle + next_angle) / 2.0;
            axis = (axis + next_axis).try_normalize().unwrap_or(axis);
        }
        Some((axis, angle.to_radians()))
    }

    fn branch_interpreter(&self, branch: &BranchConfig) -> TreeInterpreter {
        let cfg = &self.config;
        let mut sub = TreeInterpreter::standard(TurtleConfig {
            length: cfg.length * branch.length_scale,
            taper: branch.taper,
            angle: cfg.angle,
            sections: cfg.sections,
            bottom_flare: 1.0,
            segment_offset: 0.0,
            jitter: Jitter {
                variation_deg: branch.jitter_variation_deg,
                smoothed: false,
                tilt_top: false,
            },
            bark_color: cfg.bark_color,
            leaf: branch.leaf.clone(),
            berry: cfg.berry.clone(),
            branch: None,
            max_stack_depth: cfg.max_stack_depth,
            max_segments: cfg.max_segments,
        });
        sub.set_op(
            '+',
            TurtleOp::Turn {
                axis: FrameAxis::Right,
                degrees: branch.spread_deg,
            },
        );
        sub.set_op(
            '-',
            TurtleOp::Turn {
                axis: FrameAxis::Right,
                degrees: -branch.spread_deg,
            },
        );
        sub
    }
}

/// World X for digits 0–2, Y for 3–5, Z otherwise.
fn principal_axis(digit: u8) -> Vec3 {
    match digit {
        0..=2 => Vec3::X,
        3..=5 => Vec3::Y,
        _ => Vec3::Z,
    }
}
