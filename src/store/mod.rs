//! Low-level hierarchical store format.
//!
//! The store is an Ogawa-style file of groups and length-prefixed data
//! blocks, with a name table in every group so that children can be
//! addressed by `/`-separated paths.
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Magic: "VOUT5"   |  5 bytes
//! +------------------+
//! | Frozen flag      |  1 byte (0x00 or 0xFF)
//! +------------------+
//! | Version          |  2 bytes (u16 LE)
//! +------------------+
//! | Root Group Pos   |  8 bytes (u64 LE)
//! +------------------+
//! | ... Data ...     |
//! +------------------+
//! ```

mod format;
mod reader;
mod named;
mod dataset;
mod compression;
pub mod writer;

pub use format::*;
pub use reader::*;
pub use named::*;
pub use dataset::*;
pub use compression::{compress, decompress, uncompressed_size};
pub use writer::{OArchive, ODataset, OGroup, ONode};
