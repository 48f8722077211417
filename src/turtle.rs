//! Turtle pose and the operations a symbol can map to.

use crate::error::{Error, Result};
use bevy_math::Dir3;
use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// One of the turtle's own frame axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameAxis {
    Forward,
    Up,
    Right,
}

/// The state of the drawing turtle.
///
/// `forward`, `up` and `right` stay mutually orthonormal with
/// `right = forward × up`. A pose is copied onto the stack by value at `[`
/// and restored wholesale at `]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Current world-space position of the pen.
    pub position: Vec3,
    /// Growth direction; segments extend along it.
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Radius the next segment starts with.
    pub radius: f32,
}

impl Pose {
    /// Creates a pose heading along `forward`.
    ///
    /// `up` is +Y made orthogonal to `forward` (or +X when `forward` is
    /// vertical along Y). Fails if `forward` is zero or not finite.
    pub fn new(position: Vec3, forward: Vec3, radius: f32) -> Result<Self> {
        let forward = Dir3::new(forward)
            .map_err(|e| Error::DegenerateGeometry(format!("initial direction: {e}")))?
            .as_vec3();
        let reference = if forward.dot(Vec3::Y).abs() > 0.999 {
            Vec3::X
        } else {
            Vec3::Y
        };
        let up = (reference - forward * reference.dot(forward)).normalize();
        let right = forward.cross(up).normalize();
        Ok(Self {
            position,
            forward,
            up,
            right,
            radius,
        })
    }

    /// Growth direction as a [`Dir3`].
    pub fn heading(&self) -> Dir3 {
        debug_assert!(
            self.forward.is_normalized(),
            "turtle frame lost its forward axis: {}",
            self.forward
        );
        Dir3::new(self.forward).unwrap_or(Dir3::Z)
    }

    pub fn axis(&self, axis: FrameAxis) -> Vec3 {
        match axis {
            FrameAxis::Forward => self.forward,
            FrameAxis::Up => self.up,
            FrameAxis::Right => self.right,
        }
    }

    /// Rotation mapping local X, Y, Z onto `right`, `forward`, `up`.
    pub fn basis(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.right, self.forward, self.up)).normalize()
    }

    /// Rotates the whole frame by `angle` radians about a world-space `axis`.
    pub fn rotate_world(&mut self, axis: Vec3, angle: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        let rot = Quat::from_axis_angle(axis, angle);
        self.forward = (rot * self.forward).normalize();
        self.up = (rot * self.up).normalize();
        self.right = (rot * self.right).normalize();
    }

    /// Rotates about one of the frame's own axes.
    pub fn rotate_local(&mut self, axis: FrameAxis, angle: f32) {
        self.rotate_world(self.axis(axis), angle);
    }

    /// Rotates about `right` (Pitch).
    pub fn pitch(&mut self, angle: f32) {
        self.rotate_local(FrameAxis::Right, angle);
    }

    /// Rotates about `up` (Yaw).
    pub fn yaw(&mut self, angle: f32) {
        self.rotate_local(FrameAxis::Up, angle);
    }

    /// Rotates about `forward` (Roll).
    pub fn roll(&mut self, angle: f32) {
        self.rotate_local(FrameAxis::Forward, angle);
    }

    /// Half turn about `up`.
    pub fn turn_around(&mut self) {
        self.yaw(PI);
    }
}

/// Operations that can be performed by the tree turtle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum TurtleOp {
    // --- Geometry ---
    /// Emit a tapered segment and advance to its tip (`F`).
    Segment,
    /// Grow a nested leafy branch sub-system from here (`f`).
    LeafyBranch,
    /// Place a leaf (`J`).
    Leaf,
    /// Place a berry (`K`).
    Berry,

    // --- Orientation ---
    /// Rotate about `right` by the configured angle times the factor (`+`/`-`).
    Pitch(f32),
    /// Rotate about `up` by the configured angle times the factor (`&`/`^`).
    Yaw(f32),
    /// Rotate about `forward` by the configured angle times the factor (`\`/`/`).
    Roll(f32),
    /// Rotate about a frame axis by a fixed angle in degrees.
    Turn { axis: FrameAxis, degrees: f32 },
    /// Turn 180 degrees about `up` (`|`).
    TurnAround,

    // --- Flow Control ---
    /// Save the pose onto the stack (`[`).
    Push,
    /// Restore the most recently pushed pose (`]`).
    Pop,
    /// Symbol has no turtle meaning.
    Ignore,
}
