//! # vaspout
//!
//! Lazy typed access to hierarchical simulation output stores.
//!
//! A store is a binary file of nested named groups holding multi-dimensional
//! arrays and scalars. This crate maps its fixed path schema onto typed
//! records (structure, band, density of states, ...) without copying array
//! contents until a caller asks for them.
//!
//! ## Modules
//!
//! - [`util`] - Element types, shapes, errors
//! - [`store`] - Low-level store format (reader and writer)
//! - [`raw`] - Container handle, lazy arrays, records and variant dictionaries
//!
//! ## Example
//!
//! ```ignore
//! use vaspout::raw::File;
//!
//! let file = File::open("calculation/")?;
//! if let Some(structure) = file.structure()?.primary() {
//!     let positions = structure.positions.read()?;
//!     println!("{} ions", positions.shape().outer());
//! }
//! ```

pub mod util;
pub mod store;
pub mod raw;

// Re-export commonly used types
pub use util::{Dimensions, Error, PlainOldDataType, Result};
pub use store::Element;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Dimensions, Error, PlainOldDataType, Result};
    pub use crate::raw::*;
}
