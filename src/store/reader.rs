//! Store reader: byte streams and positional group/data navigation.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use memmap2::Mmap;
use parking_lot::Mutex;

use super::format::*;
use crate::util::{Error, Result};

/// Input streams for reading store data.
/// Supports both memory-mapped and buffered I/O modes.
pub struct IStreams {
    inner: StreamsInner,
    version: u16,
    frozen: bool,
    size: u64,
}

enum StreamsInner {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Buffered file access (fallback)
    File(Mutex<File>),
}

impl IStreams {
    /// Open a file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(path, true)
    }

    /// Open a file with optional memory mapping.
    pub fn open_opts(path: impl AsRef<Path>, use_mmap: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        let inner = if use_mmap {
            // Safety: the file is opened read-only and never written through this map
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            StreamsInner::Mmap(mmap)
        } else {
            StreamsInner::File(Mutex::new(file))
        };

        let (version, frozen) = match &inner {
            StreamsInner::Mmap(mmap) => Self::parse_header(mmap)?,
            StreamsInner::File(file) => {
                let mut f = file.lock();
                let mut header = [0u8; HEADER_SIZE];
                f.seek(SeekFrom::Start(0))?;
                f.read_exact(&mut header)?;
                Self::parse_header(&header)?
            }
        };

        if !frozen {
            tracing::warn!("{} was not finalized by its writer", path.display());
        }

        Ok(Self { inner, version, frozen, size })
    }

    /// Parse and validate the store header.
    fn parse_header(data: &[u8]) -> Result<(u16, bool)> {
        if data.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }
        if &data[0..5] != STORE_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let frozen = data[FROZEN_OFFSET] == FROZEN_FLAG;
        let version = LittleEndian::read_u16(&data[VERSION_OFFSET..VERSION_OFFSET + 2]);
        Ok((version, frozen))
    }

    /// Check if the archive is frozen (finalized).
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Get the format version.
    #[inline]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// Get the total file size.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get the root group position from the header.
    pub fn root_pos(&self) -> Result<u64> {
        self.read_u64(ROOT_POS_OFFSET as u64)
    }

    /// Root group of the store.
    pub fn root(&self) -> Result<IGroup<'_>> {
        IGroup::new(self, self.root_pos()?)
    }

    fn check_range(&self, pos: u64, len: usize) -> Result<()> {
        match pos.checked_add(len as u64) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::UnexpectedEof(pos.saturating_add(len as u64))),
        }
    }

    /// Read bytes at a specific position.
    pub fn read_bytes(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        self.check_range(pos, len)?;
        let mut buf = vec![0u8; len];
        self.read_into(pos, &mut buf)?;
        Ok(buf)
    }

    /// Read bytes into an existing buffer.
    pub fn read_into(&self, pos: u64, buf: &mut [u8]) -> Result<()> {
        self.check_range(pos, buf.len())?;
        match &self.inner {
            StreamsInner::Mmap(mmap) => {
                buf.copy_from_slice(&mmap[pos as usize..(pos as usize + buf.len())]);
                Ok(())
            }
            StreamsInner::File(file) => {
                let mut f = file.lock();
                f.seek(SeekFrom::Start(pos))?;
                f.read_exact(buf)?;
                Ok(())
            }
        }
    }

    /// Read a u64 value at the given position.
    pub fn read_u64(&self, pos: u64) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_into(pos, &mut buf)?;
        Ok(LittleEndian::read_u64(&buf))
    }
}

/// A group in the store hierarchy.
/// Groups contain children which can be either data or other groups.
#[derive(Clone, Copy)]
pub struct IGroup<'a> {
    streams: &'a IStreams,
    pos: u64,
    num_children: u64,
}

impl<'a> IGroup<'a> {
    /// Create a new group reader at the given position.
    pub fn new(streams: &'a IStreams, pos: u64) -> Result<Self> {
        let num_children = if pos == 0 { 0 } else { streams.read_u64(pos)? };
        // Each child needs an 8-byte offset, so a count past the file size is corrupt
        if num_children > streams.size() / 8 {
            return Err(Error::invalid(format!(
                "group at {} claims {} children",
                pos, num_children
            )));
        }
        Ok(Self { streams, pos, num_children })
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    #[inline]
    pub fn num_children(&self) -> u64 {
        self.num_children
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_children == 0
    }

    /// Get the raw offset for a child (with group/data flag).
    pub fn child_offset(&self, index: u64) -> Result<u64> {
        if index >= self.num_children {
            return Err(Error::ChildOutOfBounds {
                index: index as usize,
                count: self.num_children as usize,
            });
        }
        self.streams.read_u64(self.pos + 8 + index * 8)
    }

    /// Get a child group.
    pub fn group(&self, index: u64) -> Result<IGroup<'a>> {
        let offset = self.child_offset(index)?;
        if !is_group_offset(offset) {
            return Err(Error::TypeMismatch {
                expected: "group".to_string(),
                actual: "data".to_string(),
            });
        }
        IGroup::new(self.streams, extract_offset(offset))
    }

    /// Get child data.
    pub fn data(&self, index: u64) -> Result<IData<'a>> {
        let offset = self.child_offset(index)?;
        if !is_data_offset(offset) {
            return Err(Error::TypeMismatch {
                expected: "data".to_string(),
                actual: "group".to_string(),
            });
        }
        IData::new(self.streams, extract_offset(offset))
    }

    /// Get a child, whichever kind it is.
    pub fn child(&self, index: u64) -> Result<IChild<'a>> {
        let offset = self.child_offset(index)?;
        let pos = extract_offset(offset);
        if is_group_offset(offset) {
            Ok(IChild::Group(IGroup::new(self.streams, pos)?))
        } else {
            Ok(IChild::Data(IData::new(self.streams, pos)?))
        }
    }
}

/// A child in the store hierarchy - either a Group or Data.
#[derive(Clone, Copy)]
pub enum IChild<'a> {
    Group(IGroup<'a>),
    Data(IData<'a>),
}

impl<'a> IChild<'a> {
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    pub fn as_group(&self) -> Option<&IGroup<'a>> {
        match self {
            Self::Group(g) => Some(g),
            Self::Data(_) => None,
        }
    }

    pub fn as_data(&self) -> Option<&IData<'a>> {
        match self {
            Self::Data(d) => Some(d),
            Self::Group(_) => None,
        }
    }
}

/// Length-prefixed data block in the store hierarchy.
#[derive(Clone, Copy)]
pub struct IData<'a> {
    streams: &'a IStreams,
    pos: u64,
    size: u64,
}

impl<'a> IData<'a> {
    /// Create a new data reader at the given position.
    pub fn new(streams: &'a IStreams, pos: u64) -> Result<Self> {
        let size = if pos == 0 { 0 } else { streams.read_u64(pos)? };
        Ok(Self { streams, pos, size })
    }

    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Get the size of the data in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Get the position of the actual data bytes (after size field).
    #[inline]
    pub fn data_pos(&self) -> u64 {
        if self.pos == 0 {
            0
        } else {
            self.pos + 8
        }
    }

    /// Read all data as bytes.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        self.read_range(0, self.size as usize)
    }

    /// Read `len` bytes starting `offset` bytes into the block.
    pub fn read_range(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        let end = offset.checked_add(len as u64).ok_or_else(|| Error::UnexpectedEof(u64::MAX))?;
        if end > self.size {
            return Err(Error::UnexpectedEof(self.data_pos().saturating_add(end)));
        }
        self.streams.read_bytes(self.data_pos() + offset, len)
    }
}
