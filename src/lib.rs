//! # lsys-tree
//!
//! Deterministic L-System trees and berry bushes.
//!
//! A [`Grammar`] is expanded into an [`LSystemString`], with stochastic
//! pruning driven by the digits of pi through a [`DigitCursor`]. A
//! [`TreeInterpreter`] then walks the string with a turtle [`Pose`], emitting
//! tapered frustum segments, leaves, and berries that are assembled into a
//! single [`Mesh`] ready for OBJ export.
//!
//! ```no_run
//! use lsys_tree::{Species, generate, write_obj};
//!
//! let params = Species::BerryBush.defaults();
//! let mesh = generate(&params)?;
//! if !mesh.is_empty() {
//!     write_obj(&mesh, "bush.obj")?;
//! }
//! # Ok::<(), lsys_tree::Error>(())
//! ```

pub mod digits;
pub mod error;
pub mod export;
pub mod frustum;
pub mod generate;
pub mod grammar;
pub mod interpreter;
pub mod leaf;
pub mod mesh;
pub mod params;
pub mod turtle;

pub use digits::*;
pub use error::{Error, Result};
pub use export::*;
pub use frustum::*;
pub use generate::*;
pub use grammar::*;
pub use interpreter::*;
pub use leaf::*;
pub use mesh::*;
pub use params::*;
pub use turtle::*;
