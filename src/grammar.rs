//! Parallel string rewriting with digit-driven pruning.
//!
//! A [`Grammar`] rewrites every symbol of the current string at once, for a
//! fixed number of generations. Stochastic rules draw one digit per
//! occurrence from the [`DigitStream`]; an occurrence survives when the digit
//! reaches the grammar's survival threshold and is erased otherwise.

use crate::digits::{DigitCursor, DigitStream};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Upper bound on the length of any generation, unless overridden.
pub const DEFAULT_MAX_SYMBOLS: usize = 10_000_000;

/// Right-hand side of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Production {
    /// Always rewritten to the replacement.
    Always(String),
    /// Generation 1 uses `first`, every later generation uses `later`.
    Staged { first: String, later: String },
    /// Rewritten when a drawn digit reaches the survival threshold, erased otherwise.
    Stochastic(String),
}

/// Axiom plus rewrite rules keyed by symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    pub axiom: String,
    pub rules: HashMap<char, Production>,
    /// Stochastic occurrences survive when `digit >= survival_threshold`.
    /// `0` keeps everything, `10` prunes everything.
    pub survival_threshold: u8,
    /// A generation longer than this aborts the expansion.
    pub max_symbols: usize,
}

impl Grammar {
    pub fn new(axiom: impl Into<String>) -> Self {
        Self {
            axiom: axiom.into(),
            rules: HashMap::new(),
            survival_threshold: 0,
            max_symbols: DEFAULT_MAX_SYMBOLS,
        }
    }

    /// Adds an unconditional rule.
    pub fn rule(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.rules
            .insert(symbol, Production::Always(replacement.into()));
        self
    }

    /// Adds a rule whose replacement depends on the generation number.
    pub fn staged(
        mut self,
        symbol: char,
        first: impl Into<String>,
        later: impl Into<String>,
    ) -> Self {
        self.rules.insert(
            symbol,
            Production::Staged {
                first: first.into(),
                later: later.into(),
            },
        );
        self
    }

    /// Adds a rule that is pruned unless its drawn digit survives.
    pub fn stochastic(mut self, symbol: char, replacement: impl Into<String>) -> Self {
        self.rules
            .insert(symbol, Production::Stochastic(replacement.into()));
        self
    }

    pub fn with_survival_threshold(mut self, threshold: u8) -> Self {
        self.survival_threshold = threshold.min(10);
        self
    }

    pub fn with_max_symbols(mut self, max_symbols: usize) -> Self {
        self.max_symbols = max_symbols;
        self
    }

    /// Rewrites the axiom `iterations` times, drawing pruning digits at `cursor`.
    ///
    /// The cursor advances by one for every stochastic occurrence visited, so
    /// after the call it points at the first digit the expansion did not use.
    /// Zero iterations return the axiom unchanged.
    pub fn expand(
        &self,
        iterations: u32,
        stream: &DigitStream,
        cursor: &mut DigitCursor,
    ) -> Result<LSystemString> {
        let mut current = self.axiom.clone();
        if current.chars().count() > self.max_symbols {
            return Err(Error::ExpansionLimit {
                generation: 0,
                length: current.chars().count(),
                limit: self.max_symbols,
            });
        }

        for generation in 1..=iterations {
            let mut next = String::with_capacity(current.len() * 2);
            let mut length = 0usize;
            for symbol in current.chars() {
                let emitted: Option<&str> = match self.rules.get(&symbol) {
                    Some(Production::Always(rhs)) => Some(rhs.as_str()),
                    Some(Production::Staged { first, later }) => {
                        Some(if generation == 1 {
                            first.as_str()
                        } else {
                            later.as_str()
                        })
                    }
                    Some(Production::Stochastic(rhs)) => {
                        if cursor.next(stream) >= self.survival_threshold {
                            Some(rhs.as_str())
                        } else {
                            Some("")
                        }
                    }
                    None => None,
                };
                match emitted {
                    Some(rhs) => {
                        length += rhs.chars().count();
                        next.push_str(rhs);
                    }
                    None => {
                        length += 1;
                        next.push(symbol);
                    }
                }
                if length > self.max_symbols {
                    return Err(Error::ExpansionLimit {
                        generation,
                        length,
                        limit: self.max_symbols,
                    });
                }
            }
            debug!(generation, length, cursor = cursor.position(), "expanded generation");
            current = next;
        }

        Ok(LSystemString(current))
    }
}

/// Expands `grammar` with a fresh cursor starting at `seed`.
pub fn expand(
    grammar: &Grammar,
    iterations: u32,
    stream: &DigitStream,
    seed: usize,
) -> Result<LSystemString> {
    let mut cursor = DigitCursor::new(seed);
    grammar.expand(iterations, stream, &mut cursor)
}

/// Survival threshold giving each stochastic occurrence roughly a
/// `branch_deletion_chance` probability of being pruned.
///
/// Digits are uniform over `0..=9`, so threshold `t` prunes with probability
/// `t / 10`.
pub fn survival_threshold_for(branch_deletion_chance: f32) -> u8 {
    let p = if branch_deletion_chance.is_finite() {
        branch_deletion_chance.clamp(0.0, 1.0)
    } else {
        0.0
    };
    // Tolerance keeps e.g. 0.3 * 10 from ceiling to 4.
    (p * 10.0 - 1e-4).ceil().max(0.0) as u8
}

/// The fully expanded symbol string handed to the turtle.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LSystemString(String);

impl LSystemString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> std::str::Chars<'_> {
        self.0.chars()
    }

    /// Number of occurrences of `symbol`.
    pub fn count(&self, symbol: char) -> usize {
        self.0.chars().filter(|&c| c == symbol).count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for LSystemString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for LSystemString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for LSystemString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
