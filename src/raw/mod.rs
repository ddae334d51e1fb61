//! Typed, lazily bound records read from an output store.
//!
//! - [`File`] - the container handle (open, close, probes, binding)
//! - [`LazyArray`] / [`ArrayData`] - deferred datasets and their contents
//! - [`RawData`] / [`Kind`] - one read capability per record kind
//! - [`DataDict`] / [`Variant`] - the variants returned by every read
//!
//! ## Example
//!
//! ```ignore
//! use vaspout::raw::{File, Variant};
//!
//! let file = File::open("vaspout.h5")?;
//! let dos = file.dos()?;
//! println!("written by {}", dos.version());
//! if let Some(dos) = dos.primary() {
//!     let energies = dos.energies.read()?;
//! }
//! ```

mod file;
mod lazy;
mod records;
mod data_dict;
mod kind;
mod schema;

pub use file::{Entry, EntryKind, File, OpenOptions, Scalar};
pub use lazy::{ArrayData, LazyArray};
pub use records::*;
pub use data_dict::{DataDict, Variant};
pub use kind::{Kind, RawData, DEFAULT_VARIANT, KPOINTS_VARIANTS};
