//! The container handle: owns the open store and mediates every path lookup.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::lazy::LazyArray;
use crate::store::{resolve, DatasetHeader, Element, IChild, IData, INamedGroup, IStreams};
use crate::util::{Dimensions, Error, PlainOldDataType, Result};

/// State shared between a [`File`] and the lazy arrays bound from it.
///
/// `None` once the file was closed; arrays hold a weak reference and check
/// this before touching the store.
pub(crate) struct Shared {
    path: PathBuf,
    streams: RwLock<Option<IStreams>>,
}

impl Shared {
    /// Run `f` against the open streams, or fail with the closed-file error.
    pub(crate) fn with_streams<R>(&self, f: impl FnOnce(&IStreams) -> Result<R>) -> Result<R> {
        let guard = self.streams.read();
        let streams = guard.as_ref().ok_or_else(Error::closed)?;
        f(streams)
    }

    pub(crate) fn is_open(&self) -> bool {
        self.streams.read().is_some()
    }
}

/// Options for opening a store.
#[derive(Clone, Copy, Debug)]
pub struct OpenOptions {
    use_mmap: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { use_mmap: true }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memory-map the file (default) or read through a buffered handle.
    pub fn mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Open `locator` with these options.
    pub fn open(self, locator: impl AsRef<Path>) -> Result<File> {
        File::open_with(locator, self)
    }
}

/// A single decoded scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric value as a float; integers are converted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// What a group entry is.
#[derive(Clone, Debug, PartialEq)]
pub enum EntryKind {
    Group { children: usize },
    Dataset {
        element_type: PlainOldDataType,
        shape: Dimensions,
        compressed: bool,
    },
}

/// One child of a group, as listed by [`File::children`].
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntryKind::Group { .. })
    }
}

/// Read-only handle on a hierarchical output store.
///
/// The store must be in the `VOUT5` container format written by
/// [`OArchive`](crate::store::OArchive). It is not HDF5: an HDF5
/// `vaspout.h5` fails to open with [`Error::InvalidMagic`] as the cause.
/// Only the default file name is shared with HDF5 output.
///
/// Records returned by the read operations bind their arrays lazily; those
/// arrays can only be materialized while this handle is open. Dropping the
/// handle closes it, so a scope owning the `File` releases the store on
/// every exit path.
///
/// ```ignore
/// let file = File::open("run/")?;            // opens run/vaspout.h5
/// let band = file.band()?;
/// if let Some(band) = band.get(Variant::KpointsOpt) {
///     let eigenvalues = band.eigenvalues.read()?;
/// }
/// ```
pub struct File {
    shared: Arc<Shared>,
}

impl File {
    /// File name looked for when the locator is a directory. The file must
    /// hold a `VOUT5` store.
    pub const DEFAULT_FILENAME: &'static str = "vaspout.h5";

    /// Open a store read-only. A directory locator is resolved to
    /// [`File::DEFAULT_FILENAME`] inside it.
    pub fn open(locator: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(locator, OpenOptions::default())
    }

    pub fn open_with(locator: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = Self::actual_filename(locator.as_ref());
        let streams = IStreams::open_opts(&path, options.use_mmap)
            .map_err(|e| Error::open_failed(&path, e))?;
        debug!(
            path = %path.display(),
            format_version = streams.version(),
            size = streams.size(),
            "opened store"
        );
        Ok(Self::from_streams(streams, path))
    }

    /// Take ownership of a store that is already open.
    pub fn from_streams(streams: IStreams, path: impl Into<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                path: path.into(),
                streams: RwLock::new(Some(streams)),
            }),
        }
    }

    fn actual_filename(locator: &Path) -> PathBuf {
        if locator.is_dir() {
            locator.join(Self::DEFAULT_FILENAME)
        } else {
            locator.to_path_buf()
        }
    }

    /// Path of the opened store file.
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Release the store. Calling it again has no effect; every later data
    /// access, including through previously bound arrays, fails.
    pub fn close(&self) {
        if self.shared.streams.write().take().is_some() {
            debug!(path = %self.shared.path.display(), "closed store");
        }
    }

    pub fn is_closed(&self) -> bool {
        !self.shared.is_open()
    }

    /// Fail with the closed-file error once the handle was closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::closed());
        }
        Ok(())
    }

    /// Existence probe. Never fails: a closed or unreadable store reports
    /// every path as missing.
    pub fn path_exists(&self, path: &str) -> bool {
        let found = self
            .shared
            .with_streams(|s| Ok(resolve(s.root()?, path)?.is_some()))
            .unwrap_or_else(|e| {
                trace!(path, error = %e, "probe failed");
                false
            });
        trace!(path, found, "probe");
        found
    }

    /// Bind the dataset at `path` without reading its body.
    pub fn bind_array<T: Element>(&self, path: &str) -> Result<LazyArray<T>> {
        let (pos, header) = self.shared.with_streams(|s| {
            let data = dataset_at(s, path)?;
            Ok((data.pos(), DatasetHeader::read(&data)?))
        })?;
        Ok(LazyArray::new(Arc::downgrade(&self.shared), path, pos, header))
    }

    /// Bind `path` if it exists, otherwise `None`.
    pub fn bind_optional<T: Element>(&self, path: &str) -> Result<Option<LazyArray<T>>> {
        self.ensure_open()?;
        if self.path_exists(path) {
            self.bind_array(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a single-element dataset and decode it to its native type.
    pub fn read_scalar(&self, path: &str) -> Result<Scalar> {
        self.shared.with_streams(|s| {
            let data = dataset_at(s, path)?;
            let header = DatasetHeader::read(&data)?;
            if header.dims.num_points() != 1 {
                return Err(Error::TypeMismatch {
                    expected: "scalar".to_string(),
                    actual: format!("{} array", header.dims),
                });
            }
            let body = header.read_body(&data)?;
            let pod = header.pod;
            let scalar = if pod.is_string() {
                Scalar::Text(first(String::decode(pod, &body, 1)?)?)
            } else if pod.is_float() {
                Scalar::Float(first(f64::decode(pod, &body, 1)?)?)
            } else {
                Scalar::Int(first(i64::decode(pod, &body, 1)?)?)
            };
            Ok(scalar)
        })
    }

    pub fn read_f64(&self, path: &str) -> Result<f64> {
        let scalar = self.read_scalar(path)?;
        scalar.as_f64().ok_or_else(|| scalar_mismatch("number", &scalar))
    }

    pub fn read_i64(&self, path: &str) -> Result<i64> {
        let scalar = self.read_scalar(path)?;
        scalar.as_i64().ok_or_else(|| scalar_mismatch("integer", &scalar))
    }

    pub fn read_string(&self, path: &str) -> Result<String> {
        match self.read_scalar(path)? {
            Scalar::Text(s) => Ok(s),
            other => Err(scalar_mismatch("string", &other)),
        }
    }

    /// List the entries of the group at `path` ("" for the root).
    pub fn children(&self, path: &str) -> Result<Vec<Entry>> {
        self.shared.with_streams(|s| {
            let group = match resolve(s.root()?, path)? {
                Some(IChild::Group(g)) => g,
                Some(IChild::Data(_)) => {
                    return Err(Error::TypeMismatch {
                        expected: "group".to_string(),
                        actual: "dataset".to_string(),
                    })
                }
                None => return Err(Error::PathNotFound(path.to_string())),
            };
            let named = INamedGroup::new(group)?;
            let mut entries = Vec::with_capacity(named.len());
            for entry in named.entries() {
                let (name, child) = entry?;
                let kind = match child {
                    IChild::Group(g) => EntryKind::Group {
                        children: INamedGroup::new(g)?.len(),
                    },
                    IChild::Data(d) => {
                        let header = DatasetHeader::read(&d)?;
                        EntryKind::Dataset {
                            element_type: header.pod,
                            compressed: header.is_compressed(),
                            shape: header.dims,
                        }
                    }
                };
                entries.push(Entry { name: name.to_string(), kind });
            }
            Ok(entries)
        })
    }
}

impl Drop for File {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("path", &self.shared.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn dataset_at<'a>(streams: &'a IStreams, path: &str) -> Result<IData<'a>> {
    match resolve(streams.root()?, path)? {
        Some(IChild::Data(d)) => Ok(d),
        Some(IChild::Group(_)) => Err(Error::TypeMismatch {
            expected: "dataset".to_string(),
            actual: "group".to_string(),
        }),
        None => Err(Error::PathNotFound(path.to_string())),
    }
}

fn first<T>(values: Vec<T>) -> Result<T> {
    values
        .into_iter()
        .next()
        .ok_or_else(|| Error::invalid("scalar dataset without a value"))
}

fn scalar_mismatch(expected: &str, actual: &Scalar) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
