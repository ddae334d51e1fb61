//! Store writer.
//!
//! Builds a named tree in memory ([`OGroup`] / [`ODataset`]) and writes it
//! bottom-up, so every child is on disk before the group that points at it.
//! The header is frozen last; a crash mid-write leaves a file readers flag
//! as unfinished.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::compression;
use super::dataset::DatasetHeader;
use super::format::*;
use crate::util::{Dimensions, Error, PlainOldDataType, Result, StorePod};

/// Output stream for writing store data.
pub struct OStream {
    writer: BufWriter<File>,
    pos: u64,
}

impl OStream {
    /// Create a new output stream for the given file path.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::with_capacity(2 * 1024 * 1024, file),
            pos: 0,
        })
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Write bytes and advance position.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.writer.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    /// Write a u64 value (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(value)?;
        self.pos += 8;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.writer.write_u16::<LittleEndian>(value)?;
        self.pos += 2;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.pos += 1;
        Ok(())
    }

    /// Seek to a position and return the current position.
    pub fn seek(&mut self, pos: u64) -> Result<u64> {
        self.writer.flush()?;
        let new_pos = self.writer.seek(SeekFrom::Start(pos))?;
        self.pos = new_pos;
        Ok(new_pos)
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// A dataset ready to be written: descriptor plus encoded body.
#[derive(Clone, Debug)]
pub struct ODataset {
    header: DatasetHeader,
    body: Vec<u8>,
}

impl ODataset {
    /// Numeric array with the given shape. `values` is row-major.
    pub fn new<T: StorePod>(dims: impl Into<Dimensions>, values: &[T]) -> Result<Self> {
        let dims = dims.into();
        if dims.num_points() != values.len() {
            return Err(Error::WriteFailed(format!(
                "shape {} needs {} values, got {}",
                dims,
                dims.num_points(),
                values.len()
            )));
        }
        Ok(Self {
            header: DatasetHeader { pod: T::POD_TYPE, flags: 0, dims },
            body: bytemuck::cast_slice::<T, u8>(values).to_vec(),
        })
    }

    /// One-dimensional numeric array.
    pub fn from_slice<T: StorePod>(values: &[T]) -> Self {
        Self {
            header: DatasetHeader {
                pod: T::POD_TYPE,
                flags: 0,
                dims: Dimensions::d1(values.len()),
            },
            body: bytemuck::cast_slice::<T, u8>(values).to_vec(),
        }
    }

    /// Rank-0 numeric value.
    pub fn scalar<T: StorePod>(value: T) -> Self {
        Self {
            header: DatasetHeader {
                pod: T::POD_TYPE,
                flags: 0,
                dims: Dimensions::scalar(),
            },
            body: bytemuck::bytes_of(&value).to_vec(),
        }
    }

    /// String array with the given shape.
    pub fn strings<S: AsRef<str>>(dims: impl Into<Dimensions>, values: &[S]) -> Result<Self> {
        let dims = dims.into();
        if dims.num_points() != values.len() {
            return Err(Error::WriteFailed(format!(
                "shape {} needs {} strings, got {}",
                dims,
                dims.num_points(),
                values.len()
            )));
        }
        let mut body = Vec::new();
        for value in values {
            let value = value.as_ref();
            if value.contains('\0') {
                return Err(Error::WriteFailed(format!("string {:?} contains NUL", value)));
            }
            body.extend_from_slice(value.as_bytes());
            body.push(0);
        }
        Ok(Self {
            header: DatasetHeader { pod: PlainOldDataType::String, flags: 0, dims },
            body,
        })
    }

    /// Rank-0 string value.
    pub fn text(value: &str) -> Result<Self> {
        let mut dataset = Self::strings(Dimensions::d1(1), &[value])?;
        dataset.header.dims = Dimensions::scalar();
        Ok(dataset)
    }

    /// Compress the body with zlib at `level` (1-9).
    pub fn compressed(mut self, level: u32) -> Result<Self> {
        if !self.header.is_compressed() {
            self.body = compression::compress(&self.body, level)?;
            self.header.flags |= FLAG_COMPRESSED;
        }
        Ok(self)
    }

    pub fn header(&self) -> &DatasetHeader {
        &self.header
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = self.header.encode();
        out.extend_from_slice(&self.body);
        out
    }
}

/// A node of the in-memory tree.
#[derive(Clone, Debug)]
pub enum ONode {
    Group(OGroup),
    Dataset(ODataset),
}

/// Named group of the in-memory tree. Children keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct OGroup {
    children: Vec<(String, ONode)>,
}

impl OGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert a dataset at `path`, creating missing parent groups.
    /// An existing dataset at the same path is replaced.
    pub fn insert(&mut self, path: &str, dataset: ODataset) -> Result<()> {
        let (parent, name) = split_parent(path)?;
        let group = self.insert_group(parent)?;
        match group.children.iter_mut().find(|(n, _)| n == name) {
            Some((_, ONode::Group(_))) => {
                Err(Error::WriteFailed(format!("{} is a group", path)))
            }
            Some((_, node)) => {
                *node = ONode::Dataset(dataset);
                Ok(())
            }
            None => {
                group.children.push((name.to_string(), ONode::Dataset(dataset)));
                Ok(())
            }
        }
    }

    /// Get or create the group at `path` (and its parents).
    pub fn insert_group(&mut self, path: &str) -> Result<&mut OGroup> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.child_group_mut(segment)?;
        }
        Ok(current)
    }

    /// Remove the node at `path`, if present.
    pub fn remove(&mut self, path: &str) -> Option<ONode> {
        let (parent, name) = split_parent(path).ok()?;
        let mut current = self;
        for segment in parent.split('/').filter(|s| !s.is_empty()) {
            current = match current.children.iter_mut().find(|(n, _)| n == segment) {
                Some((_, ONode::Group(g))) => g,
                _ => return None,
            };
        }
        let index = current.children.iter().position(|(n, _)| n == name)?;
        Some(current.children.remove(index).1)
    }

    fn child_group_mut(&mut self, name: &str) -> Result<&mut OGroup> {
        if name.contains('\0') {
            return Err(Error::WriteFailed(format!("name {:?} contains NUL", name)));
        }
        let index = match self.children.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                self.children.push((name.to_string(), ONode::Group(OGroup::new())));
                self.children.len() - 1
            }
        };
        match &mut self.children[index].1 {
            ONode::Group(g) => Ok(g),
            ONode::Dataset(_) => Err(Error::WriteFailed(format!("{} is a dataset", name))),
        }
    }
}

fn split_parent(path: &str) -> Result<(&str, &str)> {
    let path = path.trim_matches('/');
    let (parent, name) = match path.rfind('/') {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => ("", path),
    };
    if name.is_empty() || name.contains('\0') {
        return Err(Error::WriteFailed(format!("invalid dataset path {:?}", path)));
    }
    Ok((parent, name))
}

/// Store file writer.
pub struct OArchive {
    stream: OStream,
}

impl OArchive {
    /// Create a new store file, writing an unfrozen header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut stream = OStream::create(path)?;
        stream.write_bytes(STORE_MAGIC)?;
        stream.write_u8(NOT_FROZEN_FLAG)?;
        stream.write_u16(CURRENT_VERSION)?;
        stream.write_u64(0)?; // root position placeholder
        Ok(Self { stream })
    }

    /// Write the tree rooted at `root` and freeze the file.
    pub fn write(mut self, root: &OGroup) -> Result<()> {
        let root_pos = self.write_group(root)?;

        self.stream.seek(ROOT_POS_OFFSET as u64)?;
        self.stream.write_u64(root_pos)?;
        self.stream.seek(FROZEN_OFFSET as u64)?;
        self.stream.write_u8(FROZEN_FLAG)?;
        self.stream.flush()
    }

    fn write_group(&mut self, group: &OGroup) -> Result<u64> {
        let mut offsets = Vec::with_capacity(group.children.len() + 1);

        let mut table = Vec::new();
        for (name, _) in &group.children {
            table.extend_from_slice(name.as_bytes());
            table.push(0);
        }
        offsets.push(make_data_offset(self.write_data(&table)?));

        for (_, node) in &group.children {
            let offset = match node {
                ONode::Group(g) => make_group_offset(self.write_group(g)?),
                ONode::Dataset(d) => make_data_offset(self.write_data(&d.encode())?),
            };
            offsets.push(offset);
        }

        let pos = self.stream.pos();
        self.stream.write_u64(offsets.len() as u64)?;
        for offset in offsets {
            self.stream.write_u64(offset)?;
        }
        Ok(pos)
    }

    fn write_data(&mut self, bytes: &[u8]) -> Result<u64> {
        if bytes.is_empty() {
            return Ok(0);
        }
        let pos = self.stream.pos();
        self.stream.write_u64(bytes.len() as u64)?;
        self.stream.write_bytes(bytes)?;
        Ok(pos)
    }
}
