//! Error types for tree generation.

use thiserror::Error;

/// Result type for tree generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating, generating, or exporting a tree.
///
/// Empty geometry is not an error inside the pipeline: builders return `None`
/// and the assembler returns an empty [`Mesh`](crate::Mesh). Only
/// [`Error::EmptyMesh`] at export time reports it.
#[derive(Debug, Error)]
pub enum Error {
    /// A generation parameter is outside its documented range.
    #[error("invalid parameter `{name}` = {value}: expected {expected}")]
    InvalidParameter {
        /// Parameter name as it appears in the config file and CLI.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the accepted range.
        expected: String,
    },

    /// A direction or frame could not be normalized.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A rewrite generation grew past the configured symbol budget.
    #[error("expansion limit exceeded at generation {generation}: {length} symbols > {limit}")]
    ExpansionLimit {
        /// Generation (1-based) that overflowed.
        generation: u32,
        /// Length the string would have reached.
        length: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Interpretation emitted more segments than allowed.
    #[error("segment limit exceeded: more than {limit} segments")]
    SegmentLimit {
        /// Configured maximum.
        limit: usize,
    },

    /// Too many nested `[` without a matching `]`.
    #[error("turtle stack overflow: depth {depth} exceeds limit")]
    StackOverflow {
        /// Depth at which the push was rejected.
        depth: usize,
    },

    /// Export was asked to write a mesh with no geometry.
    #[error("mesh is empty, nothing to export")]
    EmptyMesh,

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed parameter file.
    #[error("invalid parameter file: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an `InvalidParameter` error.
    pub fn invalid(name: &'static str, value: impl Into<f64>, expected: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
            expected: expected.into(),
        }
    }
}
