//! Command-line front end: collects generation parameters, validates them,
//! grows the mesh, and writes it as OBJ.
//!
//! ```text
//! lsys-tree --species tree --seed 1234 --iterations 9
//! lsys-tree --species berry-bush --config bush.json --output bush.obj
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lsys_tree::{GenerationParams, Species, generate, write_obj};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Deterministic L-System tree and berry-bush generator.
#[derive(Parser, Debug)]
#[command(name = "lsys-tree")]
#[command(about = "Grow an L-System plant from the digits of pi and export it as OBJ")]
#[command(version)]
struct Cli {
    /// Plant to grow (`tree` or `berry-bush`)
    #[arg(long)]
    species: Option<Species>,

    /// JSON parameter file; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output OBJ path
    #[arg(long, short, default_value = "generated_lsystem.obj")]
    output: PathBuf,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Start position in the digits of pi
    #[arg(long)]
    seed: Option<i64>,

    #[arg(long)]
    iterations: Option<u32>,

    /// Segment length
    #[arg(long)]
    length: Option<f32>,

    #[arg(long)]
    initial_radius: Option<f32>,

    /// Per-segment radius multiplier
    #[arg(long)]
    taper: Option<f32>,

    /// Turn angle in degrees
    #[arg(long)]
    angle: Option<f32>,

    /// Jitter range in degrees
    #[arg(long)]
    angle_variation: Option<f32>,

    /// Radial sections per segment
    #[arg(long)]
    sections: Option<u32>,

    /// Probability of pruning each stochastic limb
    #[arg(long)]
    branch_deletion_chance: Option<f32>,

    #[arg(long)]
    berry_radius: Option<f32>,

    /// Number of pi digits to compute
    #[arg(long)]
    precision: Option<usize>,
}

impl Cli {
    /// Species defaults, then the config file, then individual flags.
    fn params(&self) -> lsys_tree::Result<GenerationParams> {
        let mut params = match (&self.config, self.species) {
            (Some(path), Some(species)) => GenerationParams::from_json_file_for(path, species)?,
            (Some(path), None) => GenerationParams::from_json_file(path)?,
            (None, species) => species.unwrap_or_default().defaults(),
        };

        macro_rules! apply {
            ($($field:ident <- $flag:ident),* $(,)?) => {
                $(if let Some(v) = self.$flag { params.$field = v; })*
            };
        }
        apply!(
            seed <- seed,
            iterations <- iterations,
            length <- length,
            initial_radius <- initial_radius,
            taper <- taper,
            angle_deg <- angle,
            angle_variation <- angle_variation,
            sections <- sections,
            branch_deletion_chance <- branch_deletion_chance,
            berry_radius <- berry_radius,
            precision <- precision,
        );
        Ok(params)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .compact()
        .init();

    let params = match cli.params().and_then(|p| p.validate().map(|()| p)) {
        Ok(params) => params,
        Err(e) => {
            error!(error = %e, "invalid parameters");
            return ExitCode::FAILURE;
        }
    };

    info!(
        species = %params.species,
        seed = params.seed,
        iterations = params.iterations,
        precision = params.precision,
        "growing"
    );

    let mesh = match generate(&params) {
        Ok(mesh) => mesh,
        Err(e) => {
            error!(error = %e, "generation failed");
            return ExitCode::FAILURE;
        }
    };

    if mesh.is_empty() {
        warn!(output = %cli.output.display(), "generated mesh is empty, nothing written");
        return ExitCode::SUCCESS;
    }

    match write_obj(&mesh, &cli.output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, output = %cli.output.display(), "export failed");
            ExitCode::FAILURE
        }
    }
}
