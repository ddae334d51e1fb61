//! zlib compression of dataset bodies.
//!
//! Compressed bodies carry an 8-byte little-endian uncompressed size in
//! front of the zlib stream. Whether a body is compressed is recorded in
//! the dataset flags, not guessed from the bytes.

use std::io::{Read, Write};

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::util::{Error, Result};

/// Compress a body with the given level (1-9).
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.clamp(1, 9)));
    encoder.write_all(data)?;
    let compressed = encoder.finish()?;

    let mut result = Vec::with_capacity(8 + compressed.len());
    result.extend_from_slice(&(data.len() as u64).to_le_bytes());
    result.extend_from_slice(&compressed);
    Ok(result)
}

/// Uncompressed size recorded in front of a compressed body.
pub fn uncompressed_size(data: &[u8]) -> Result<u64> {
    if data.len() < 8 {
        return Err(Error::invalid("compressed body shorter than its size prefix"));
    }
    Ok(LittleEndian::read_u64(&data[..8]))
}

/// Decompress a body produced by [`compress`].
///
/// The size prefix is untrusted: output is bounded by it, and the buffer
/// grows with the actual stream instead of being reserved up front.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let uncompressed_size = uncompressed_size(data)?;
    let compressed = &data[8..];

    // zlib cannot expand by more than about 1032:1
    let reserve = compressed.len().saturating_mul(1032);
    let capacity = usize::try_from(uncompressed_size).map_or(reserve, |size| size.min(reserve));

    let mut decoder = ZlibDecoder::new(compressed).take(uncompressed_size.saturating_add(1));
    let mut decompressed = Vec::with_capacity(capacity);
    decoder.read_to_end(&mut decompressed)?;

    if decompressed.len() as u64 != uncompressed_size {
        return Err(Error::invalid(format!(
            "decompressed {} bytes, expected {}",
            decompressed.len(),
            uncompressed_size
        )));
    }
    Ok(decompressed)
}
