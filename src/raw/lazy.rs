//! Lazily bound arrays and their materialized form.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Weak;

use tracing::trace;

use super::file::Shared;
use crate::store::{DatasetHeader, Element, IData};
use crate::util::{Dimensions, Error, PlainOldDataType, Result};

/// Reference to a dataset that has not been read yet.
///
/// Holds the dataset's descriptor (shape and element type) and a weak
/// reference to the owning [`File`](super::File). [`LazyArray::read`] fails
/// with the closed-file error once that file was closed or dropped.
pub struct LazyArray<T> {
    store: Weak<Shared>,
    path: String,
    pos: u64,
    header: DatasetHeader,
    _element: PhantomData<fn() -> T>,
}

impl<T: Element> LazyArray<T> {
    pub(crate) fn new(store: Weak<Shared>, path: &str, pos: u64, header: DatasetHeader) -> Self {
        Self {
            store,
            path: path.to_string(),
            pos,
            header,
            _element: PhantomData,
        }
    }

    /// Store path this array was bound from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn shape(&self) -> &Dimensions {
        &self.header.dims
    }

    /// Outer length (size of the first dimension).
    pub fn len(&self) -> usize {
        self.header.dims.outer()
    }

    pub fn is_empty(&self) -> bool {
        self.header.dims.num_points() == 0
    }

    /// Element type as stored, before conversion to `T`.
    pub fn element_type(&self) -> PlainOldDataType {
        self.header.pod
    }

    pub fn is_compressed(&self) -> bool {
        self.header.is_compressed()
    }

    /// True while the owning file is open.
    pub fn is_valid(&self) -> bool {
        self.store.upgrade().is_some_and(|s| s.is_open())
    }

    /// Read the dataset body into memory.
    pub fn read(&self) -> Result<ArrayData<T>> {
        let store = self.store.upgrade().ok_or_else(Error::closed)?;
        store.with_streams(|streams| {
            trace!(path = %self.path, shape = %self.header.dims, "materialize");
            let data = IData::new(streams, self.pos)?;
            let body = self.header.read_body(&data)?;
            let values = T::decode(self.header.pod, &body, self.header.dims.num_points())?;
            Ok(ArrayData::new(self.header.dims.clone(), values))
        })
    }
}

impl<T> Clone for LazyArray<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            path: self.path.clone(),
            pos: self.pos,
            header: self.header.clone(),
            _element: PhantomData,
        }
    }
}

/// Two references are equal when they point at the same dataset of the
/// same open file.
impl<T> PartialEq for LazyArray<T> {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.store, &other.store)
            && self.pos == other.pos
            && self.path == other.path
            && self.header == other.header
    }
}

impl<T> fmt::Debug for LazyArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyArray")
            .field("path", &self.path)
            .field("element_type", &self.header.pod)
            .field("shape", &self.header.dims)
            .finish()
    }
}

/// Materialized dataset contents, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayData<T> {
    shape: Dimensions,
    values: Vec<T>,
}

impl<T> ArrayData<T> {
    pub fn new(shape: Dimensions, values: Vec<T>) -> Self {
        Self { shape, values }
    }

    pub fn shape(&self) -> &Dimensions {
        &self.shape
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<T> {
        self.values
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at a multi-index.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.shape.flat_index(index).and_then(|i| self.values.get(i))
    }

    /// The `i`-th slice along the outer dimension, flattened.
    pub fn outer(&self, i: usize) -> Option<&[T]> {
        if self.shape.is_scalar() || i >= self.shape.outer() {
            return None;
        }
        let stride = self.shape.stride();
        self.values.get(i * stride..(i + 1) * stride)
    }
}
