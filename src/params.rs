//! Generation parameters, per-species defaults, and range validation.

use crate::digits::{DEFAULT_PRECISION, MAX_PRECISION};
use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which preset grammar and interpreter to grow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Species {
    /// Tall trunk with stochastic limbs and leafy twigs.
    #[default]
    Tree,
    /// Low bush with leaves and berries.
    BerryBush,
}

impl Species {
    pub const ALL: &'static [Species] = &[Species::Tree, Species::BerryBush];

    pub fn name(&self) -> &'static str {
        match self {
            Species::Tree => "tree",
            Species::BerryBush => "berry-bush",
        }
    }

    /// Default parameters for this species.
    pub fn defaults(self) -> GenerationParams {
        match self {
            Species::Tree => GenerationParams {
                species: self,
                seed: 618,
                iterations: 9,
                length: 10.0,
                initial_radius: 8.0,
                taper: 0.9,
                angle_deg: 15.0,
                angle_variation: 20.0,
                sections: 32,
                branch_deletion_chance: 0.4,
                berry_radius: 0.5,
                precision: DEFAULT_PRECISION,
            },
            Species::BerryBush => GenerationParams {
                species: self,
                seed: 618,
                iterations: 10,
                length: 3.0,
                initial_radius: 0.2,
                taper: 1.0,
                angle_deg: 28.0,
                angle_variation: 0.0,
                sections: 16,
                branch_deletion_chance: 0.0,
                berry_radius: 0.5,
                precision: DEFAULT_PRECISION,
            },
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Species::ALL
            .iter()
            .copied()
            .find(|sp| sp.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown species `{s}` (expected `tree` or `berry-bush`)"))
    }
}

/// Inputs of one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub species: Species,
    /// Start position of the digit cursor; must be positive.
    pub seed: i64,
    pub iterations: u32,
    /// Segment length.
    pub length: f32,
    pub initial_radius: f32,
    pub taper: f32,
    pub angle_deg: f32,
    /// Width of the per-segment jitter range, in degrees.
    pub angle_variation: f32,
    pub sections: u32,
    /// Probability that a stochastic limb is pruned in a generation.
    pub branch_deletion_chance: f32,
    pub berry_radius: f32,
    /// Number of pi digits the run draws from, at most [`MAX_PRECISION`].
    pub precision: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Species::default().defaults()
    }
}

impl GenerationParams {
    /// Parses a JSON object. Missing fields take the defaults of the
    /// object's `species` (or of [`Species::Tree`] when absent).
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::merge_json(json, None)
    }

    /// Like [`from_json_str`](Self::from_json_str), but `species` replaces
    /// the object's own `species` field before defaults are filled in.
    pub fn from_json_str_for(json: &str, species: Species) -> Result<Self> {
        Self::merge_json(json, Some(species))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_file_for(path: impl AsRef<Path>, species: Species) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str_for(&text, species)
    }

    fn merge_json(json: &str, species: Option<Species>) -> Result<Self> {
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        let Some(fields) = overrides.as_object() else {
            return Err(Error::Json(serde_json::Error::custom(
                "parameter file must contain a JSON object",
            )));
        };
        let species = match (species, fields.get("species")) {
            (Some(species), _) => species,
            (None, Some(value)) => Species::deserialize(value)?,
            (None, None) => Species::default(),
        };

        let mut merged = serde_json::to_value(species.defaults())?;
        if let Some(base) = merged.as_object_mut() {
            for (key, value) in fields {
                base.insert(key.clone(), value.clone());
            }
            base.insert("species".to_owned(), serde_json::to_value(species)?);
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// Checks every field against the bounds of its species.
    ///
    /// Returns the first violation as [`Error::InvalidParameter`].
    pub fn validate(&self) -> Result<()> {
        check("seed", self.seed as f64, Interval::above(0.0))?;
        check(
            "precision",
            self.precision as f64,
            Interval::closed(1.0, MAX_PRECISION as f64),
        )?;

        match self.species {
            Species::Tree => {
                check("length", self.length, Interval::open(5.0, 15.0))?;
                check("initial_radius", self.initial_radius, Interval::open(5.0, 15.0))?;
                check("taper", self.taper, Interval::left_open(0.85, 1.0))?;
                check("sections", self.sections, Interval::open(8.0, 256.0))?;
                check("iterations", self.iterations, Interval::open(5.0, 12.0))?;
                check("angle_deg", self.angle_deg, Interval::closed(15.0, 30.0))?;
            }
            Species::BerryBush => {
                check("length", self.length, Interval::open(2.0, 5.0))?;
                check(
                    "initial_radius",
                    self.initial_radius,
                    Interval::right_open(0.01, 1.0),
                )?;
                check("taper", self.taper, Interval::left_open(0.0, 1.0))?;
                check("sections", self.sections, Interval::closed(3.0, 256.0))?;
                check("iterations", self.iterations, Interval::closed(5.0, 12.0))?;
                check("angle_deg", self.angle_deg, Interval::closed(0.0, 90.0))?;
                check("berry_radius", self.berry_radius, Interval::left_open(0.0, 1.0))?;
            }
        }

        check("angle_variation", self.angle_variation, Interval::closed(0.0, 30.0))?;
        check(
            "branch_deletion_chance",
            self.branch_deletion_chance,
            Interval::closed(0.0, 1.0),
        )?;
        Ok(())
    }
}

fn check(name: &'static str, value: impl Into<f64>, interval: Interval) -> Result<()> {
    let value = value.into();
    if interval.contains(value) {
        Ok(())
    } else {
        Err(Error::invalid(name, value, interval.to_string()))
    }
}

/// A range with independently open or closed ends.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Interval {
    lo: f64,
    hi: f64,
    lo_closed: bool,
    hi_closed: bool,
}

impl Interval {
    const fn open(lo: f64, hi: f64) -> Self {
        Self { lo, hi, lo_closed: false, hi_closed: false }
    }

    const fn closed(lo: f64, hi: f64) -> Self {
        Self { lo, hi, lo_closed: true, hi_closed: true }
    }

    /// `(lo, hi]`
    const fn left_open(lo: f64, hi: f64) -> Self {
        Self { lo, hi, lo_closed: false, hi_closed: true }
    }

    /// `[lo, hi)`
    const fn right_open(lo: f64, hi: f64) -> Self {
        Self { lo, hi, lo_closed: true, hi_closed: false }
    }

    const fn above(lo: f64) -> Self {
        Self::open(lo, f64::INFINITY)
    }

    fn contains(&self, v: f64) -> bool {
        let above_lo = if self.lo_closed { v >= self.lo } else { v > self.lo };
        let below_hi = if self.hi_closed { v <= self.hi } else { v < self.hi };
        above_lo && below_hi
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hi.is_infinite() {
            let op = if self.lo_closed { ">=" } else { ">" };
            return write!(f, "a value {op} {}", self.lo);
        }
        write!(
            f,
            "a value in {}{}, {}{}",
            if self.lo_closed { '[' } else { '(' },
            self.lo,
            self.hi,
            if self.hi_closed { ']' } else { ')' },
        )
    }
}
