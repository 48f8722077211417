//! Species presets and the end-to-end generation entry point.

use crate::digits::{DigitCursor, DigitStream};
use crate::error::Result;
use crate::grammar::{Grammar, LSystemString, survival_threshold_for};
use crate::interpreter::{BranchConfig, Jitter, TreeInterpreter, TurtleConfig};
use crate::leaf::{BerryConfig, LeafConfig};
use crate::mesh::Mesh;
use crate::params::{GenerationParams, Species};
use crate::turtle::Pose;
use glam::Vec3;
use tracing::{info, warn};

/// A grammar and interpreter configured for one parameter set.
#[derive(Clone, Debug)]
pub struct Generator {
    species: Species,
    grammar: Grammar,
    interpreter: TreeInterpreter,
    iterations: u32,
    seed: usize,
    initial_radius: f32,
}

/// Output of [`Generator::generate`].
#[derive(Clone, Debug)]
pub struct Generated {
    pub lsystem: LSystemString,
    pub mesh: Mesh,
    pub segments: usize,
    pub leaves: usize,
    pub berries: usize,
    pub branches: usize,
}

impl Generator {
    /// Builds the preset for `params.species`. Parameters are used as given;
    /// call [`GenerationParams::validate`] first.
    pub fn from_params(params: &GenerationParams) -> Self {
        let threshold = survival_threshold_for(params.branch_deletion_chance);
        let (grammar, config) = match params.species {
            Species::Tree => (tree_grammar(threshold), tree_config(params)),
            Species::BerryBush => (berry_bush_grammar(threshold), berry_bush_config(params)),
        };
        Self {
            species: params.species,
            grammar,
            interpreter: TreeInterpreter::standard(config),
            iterations: params.iterations,
            seed: params.seed.max(0) as usize,
            initial_radius: params.initial_radius,
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn interpreter(&self) -> &TreeInterpreter {
        &self.interpreter
    }

    /// Expands the grammar from the seed and interprets the result, growing
    /// upward along +Z from the origin.
    ///
    /// The interpreter reads its digits where the expansion stopped.
    pub fn generate(&self, stream: &DigitStream) -> Result<Generated> {
        let mut cursor = DigitCursor::new(self.seed);
        let lsystem = self.grammar.expand(self.iterations, stream, &mut cursor)?;
        let start = Pose::new(Vec3::ZERO, Vec3::Z, self.initial_radius)?;
        let pass = self.interpreter.interpret(&lsystem, start, stream, &mut cursor)?;

        let (segments, leaves, berries, branches) =
            (pass.segments, pass.leaves, pass.berries, pass.branches);
        let mesh = pass.into_mesh();

        info!(
            species = %self.species,
            seed = self.seed,
            symbols = lsystem.len(),
            segments,
            leaves,
            berries,
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "generated mesh"
        );
        if mesh.is_empty() {
            warn!(species = %self.species, seed = self.seed, "generation produced no geometry");
        }

        Ok(Generated {
            lsystem,
            mesh,
            segments,
            leaves,
            berries,
            branches,
        })
    }
}

/// Validates `params`, computes the digit stream, and grows the mesh.
///
/// An empty [`Mesh`] is a valid result; check [`Mesh::is_empty`] before export.
pub fn generate(params: &GenerationParams) -> Result<Mesh> {
    params.validate()?;
    let stream = DigitStream::pi(params.precision);
    Generator::from_params(params)
        .generate(&stream)
        .map(|g| g.mesh)
}

fn tree_grammar(survival_threshold: u8) -> Grammar {
    Grammar::new("S")
        .rule('S', "FFFFFL")
        .rule('L', "FFF[BCDEL]")
        .stochastic('B', "[+++FFFf[&&&FFFf]FFFf]")
        .stochastic('C', "[---FFFf[&&&FFFf]FFFf]")
        .stochastic('D', "[&&&FFFf[+++FFFf]FFFf]")
        .stochastic('E', "[^^^FFFf[---FFFf]FFFf]")
        .with_survival_threshold(survival_threshold)
}

fn tree_config(params: &GenerationParams) -> TurtleConfig {
    TurtleConfig {
        length: params.length,
        taper: params.taper,
        angle: params.angle_deg.to_radians(),
        sections: params.sections,
        jitter: Jitter {
            variation_deg: params.angle_variation,
            smoothed: true,
            tilt_top: true,
        },
        branch: Some(BranchConfig::default()),
        ..Default::default()
    }
}

fn berry_bush_grammar(survival_threshold: u8) -> Grammar {
    Grammar::new("S")
        .rule('S', "FFFA")
        .stochastic('A', "[&&J][B]////[&&J][B]////[&&J]B")
        .stochastic('B', "&FFFAK")
        .with_survival_threshold(survival_threshold)
}

fn berry_bush_config(params: &GenerationParams) -> TurtleConfig {
    TurtleConfig {
        length: params.length,
        taper: params.taper,
        angle: params.angle_deg.to_radians(),
        sections: params.sections,
        jitter: Jitter {
            variation_deg: params.angle_variation,
            ..Default::default()
        },
        leaf: LeafConfig {
            iterations: 4,
            ..Default::default()
        },
        berry: BerryConfig {
            radius: params.berry_radius,
            ..Default::default()
        },
        branch: None,
        ..Default::default()
    }
}
