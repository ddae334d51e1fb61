//! Store format constants and offset helpers.

/// Magic bytes at the start of a store file.
pub const STORE_MAGIC: &[u8; 5] = b"VOUT5";

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the frozen flag in the header.
pub const FROZEN_OFFSET: usize = 5;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 6;

/// Offset of the root group position in the header.
pub const ROOT_POS_OFFSET: usize = 8;

/// Current store format version.
pub const CURRENT_VERSION: u16 = 1;

/// Frozen flag value once the writer has finished.
pub const FROZEN_FLAG: u8 = 0xFF;

/// Frozen flag value while the file is still being written.
pub const NOT_FROZEN_FLAG: u8 = 0x00;

/// Bit marking a child offset as data (set) or group (clear).
pub const TYPE_FLAG_MASK: u64 = 1 << 63;

/// Mask to extract the actual offset from a child pointer.
pub const OFFSET_MASK: u64 = !(1 << 63);

/// Index of the name table inside a named group.
pub const NAME_TABLE_INDEX: u64 = 0;

/// Size of the fixed part of a dataset descriptor.
pub const DESCRIPTOR_SIZE: usize = 8;

/// Dataset flag: body is zlib-compressed.
pub const FLAG_COMPRESSED: u8 = 0x01;

#[inline]
pub const fn is_group_offset(offset: u64) -> bool {
    (offset & TYPE_FLAG_MASK) == 0
}

#[inline]
pub const fn is_data_offset(offset: u64) -> bool {
    (offset & TYPE_FLAG_MASK) != 0
}

/// Extract the actual position from a child offset.
#[inline]
pub const fn extract_offset(offset: u64) -> u64 {
    offset & OFFSET_MASK
}

#[inline]
pub const fn make_group_offset(pos: u64) -> u64 {
    pos & OFFSET_MASK
}

#[inline]
pub const fn make_data_offset(pos: u64) -> u64 {
    pos | TYPE_FLAG_MASK
}

/// Check if an offset is the "empty" marker for groups or data.
#[inline]
pub const fn is_empty_offset(offset: u64) -> bool {
    extract_offset(offset) == 0
}
