//! Utility types shared by the store and the record layer.
//!
//! - [`PlainOldDataType`] - Element types of stored datasets
//! - [`Dimensions`] - Dataset shapes
//! - [`Error`] / [`Result`] - Error handling

mod pod;
mod error;
mod dimensions;

pub use pod::*;
pub use error::*;
pub use dimensions::*;
