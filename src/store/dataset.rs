//! Dataset descriptors and element decoding.
//!
//! ```text
//! +------+-------+------+----------+----------------+--------+
//! | pod  | flags | rank | reserved | dims (u64 LE)  | body   |
//! | u8   | u8    | u8   | 5 bytes  | rank x 8 bytes | ...    |
//! +------+-------+------+----------+----------------+--------+
//! ```

use byteorder::{ByteOrder, LittleEndian};
use half::f16;

use super::compression;
use super::format::{DESCRIPTOR_SIZE, FLAG_COMPRESSED};
use super::named::split_strings;
use super::reader::IData;
use crate::util::{Dimensions, Error, PlainOldDataType, Result};

/// Decoded descriptor of a dataset block. Reading it does not touch the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetHeader {
    pub pod: PlainOldDataType,
    pub flags: u8,
    pub dims: Dimensions,
}

impl DatasetHeader {
    /// Read the descriptor at the start of a data block.
    pub fn read(data: &IData<'_>) -> Result<Self> {
        let fixed = data.read_range(0, DESCRIPTOR_SIZE)?;
        let pod = PlainOldDataType::from_u8(fixed[0]);
        if pod == PlainOldDataType::Unknown {
            return Err(Error::invalid(format!(
                "dataset at {} has unknown element type {}",
                data.pos(),
                fixed[0]
            )));
        }
        let rank = fixed[2] as usize;
        let raw_dims = data.read_range(DESCRIPTOR_SIZE as u64, rank * 8)?;
        let dims = raw_dims
            .chunks_exact(8)
            .map(|c| {
                usize::try_from(LittleEndian::read_u64(c))
                    .map_err(|_| Error::invalid(format!("dataset at {} has a dimension beyond usize", data.pos())))
            })
            .collect::<Result<Vec<_>>>()?;
        let header = Self {
            pod,
            flags: fixed[1],
            dims: dims.into(),
        };
        header.check_extent(data)?;
        Ok(header)
    }

    /// Reject shapes whose element count or byte size overflows, or that
    /// cannot fit in the stored body.
    fn check_extent(&self, data: &IData<'_>) -> Result<()> {
        let points = self.dims.checked_num_points().ok_or_else(|| {
            Error::invalid(format!("dataset at {} has shape {} overflowing usize", data.pos(), self.dims))
        })?;
        let body_len = data.size().saturating_sub(self.len() as u64);
        let needed = if self.pod.is_string() {
            // at least the terminating NUL per string
            Some(points)
        } else {
            points.checked_mul(self.pod.num_bytes())
        };
        let needed = needed.ok_or_else(|| {
            Error::invalid(format!("dataset at {} has shape {} overflowing its byte size", data.pos(), self.dims))
        })?;
        // compressed bodies are checked against their size prefix on read
        if !self.is_compressed() && needed as u64 > body_len {
            return Err(Error::invalid(format!(
                "dataset at {} with shape {} needs {} bytes, block holds {}",
                data.pos(),
                self.dims,
                needed,
                body_len
            )));
        }
        Ok(())
    }

    /// Uncompressed body length of a numeric dataset, `None` for strings.
    fn expected_body_len(&self) -> Option<usize> {
        if self.pod.is_string() {
            return None;
        }
        self.dims.checked_num_points()?.checked_mul(self.pod.num_bytes())
    }

    /// Encode the descriptor, the inverse of [`DatasetHeader::read`].
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![0u8; DESCRIPTOR_SIZE + self.dims.rank() * 8];
        out[0] = self.pod as u8;
        out[1] = self.flags;
        out[2] = self.dims.rank() as u8;
        for (i, &d) in self.dims.sizes().iter().enumerate() {
            let at = DESCRIPTOR_SIZE + i * 8;
            LittleEndian::write_u64(&mut out[at..at + 8], d as u64);
        }
        out
    }

    /// Byte length of the encoded descriptor, i.e. where the body starts.
    #[inline]
    pub fn len(&self) -> usize {
        DESCRIPTOR_SIZE + self.dims.rank() * 8
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    /// Read and, if needed, decompress the body.
    pub fn read_body(&self, data: &IData<'_>) -> Result<Vec<u8>> {
        let start = self.len() as u64;
        let raw = data.read_range(start, (data.size() - start.min(data.size())) as usize)?;
        if !self.is_compressed() {
            return Ok(raw);
        }
        if let Some(expected) = self.expected_body_len() {
            let declared = compression::uncompressed_size(&raw)?;
            if declared != expected as u64 {
                return Err(Error::invalid(format!(
                    "compressed body declares {} bytes, shape {} of {} needs {}",
                    declared, self.dims, self.pod, expected
                )));
            }
        }
        compression::decompress(&raw)
    }
}

/// In-memory element type a dataset body can be decoded into.
pub trait Element: Sized + Clone {
    /// Name used in type mismatch errors.
    const EXPECTED: &'static str;

    /// Decode `count` elements stored as `pod`.
    fn decode(pod: PlainOldDataType, body: &[u8], count: usize) -> Result<Vec<Self>>;
}

fn mismatch(expected: &str, pod: PlainOldDataType) -> Error {
    Error::TypeMismatch {
        expected: expected.to_string(),
        actual: pod.name().to_string(),
    }
}

fn check_body_len(pod: PlainOldDataType, body: &[u8], count: usize) -> Result<()> {
    let expected = count
        .checked_mul(pod.num_bytes())
        .ok_or_else(|| Error::invalid(format!("{} elements of {} overflow usize", count, pod)))?;
    if body.len() != expected {
        return Err(Error::invalid(format!(
            "{} elements of {} need {} bytes, body has {}",
            count,
            pod,
            expected,
            body.len()
        )));
    }
    Ok(())
}

macro_rules! impl_float_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn decode(pod: PlainOldDataType, body: &[u8], count: usize) -> Result<Vec<Self>> {
                    use PlainOldDataType as P;
                    if !pod.is_numeric() {
                        return Err(mismatch(Self::EXPECTED, pod));
                    }
                    check_body_len(pod, body, count)?;
                    let values = match pod {
                        P::Float16 => body
                            .chunks_exact(2)
                            .map(|c| f16::from_bits(LittleEndian::read_u16(c)).to_f64() as $t)
                            .collect(),
                        P::Float32 => body.chunks_exact(4).map(|c| LittleEndian::read_f32(c) as $t).collect(),
                        P::Float64 => body.chunks_exact(8).map(|c| LittleEndian::read_f64(c) as $t).collect(),
                        _ => widen_integers(pod, body)?.into_iter().map(|v| v as $t).collect(),
                    };
                    Ok(values)
                }
            }
        )*
    };
}

macro_rules! impl_integer_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                const EXPECTED: &'static str = stringify!($t);

                fn decode(pod: PlainOldDataType, body: &[u8], count: usize) -> Result<Vec<Self>> {
                    if !(pod.is_integer() || pod == PlainOldDataType::Boolean) {
                        return Err(mismatch(Self::EXPECTED, pod));
                    }
                    check_body_len(pod, body, count)?;
                    widen_integers(pod, body)?
                        .into_iter()
                        .map(|v| {
                            <$t>::try_from(v).map_err(|_| Error::TypeMismatch {
                                expected: Self::EXPECTED.to_string(),
                                actual: format!("{} value {}", pod, v),
                            })
                        })
                        .collect()
                }
            }
        )*
    };
}

/// Decode an integer or boolean body without loss.
fn widen_integers(pod: PlainOldDataType, body: &[u8]) -> Result<Vec<i128>> {
    use PlainOldDataType as P;
    let values = match pod {
        P::Boolean => body.iter().map(|&v| (v != 0) as i128).collect(),
        P::Uint8 => body.iter().map(|&v| v as i128).collect(),
        P::Int8 => body.iter().map(|&v| v as i8 as i128).collect(),
        P::Uint16 => body.chunks_exact(2).map(|c| LittleEndian::read_u16(c) as i128).collect(),
        P::Int16 => body.chunks_exact(2).map(|c| LittleEndian::read_i16(c) as i128).collect(),
        P::Uint32 => body.chunks_exact(4).map(|c| LittleEndian::read_u32(c) as i128).collect(),
        P::Int32 => body.chunks_exact(4).map(|c| LittleEndian::read_i32(c) as i128).collect(),
        P::Uint64 => body.chunks_exact(8).map(|c| LittleEndian::read_u64(c) as i128).collect(),
        P::Int64 => body.chunks_exact(8).map(|c| LittleEndian::read_i64(c) as i128).collect(),
        other => return Err(mismatch("integer", other)),
    };
    Ok(values)
}

impl_float_element!(f64, f32);
impl_integer_element!(i64, i32, u64, u32, u8);

impl Element for String {
    const EXPECTED: &'static str = "string";

    fn decode(pod: PlainOldDataType, body: &[u8], count: usize) -> Result<Vec<Self>> {
        if !pod.is_string() {
            return Err(mismatch(Self::EXPECTED, pod));
        }
        let strings = split_strings(body)?;
        if strings.len() != count {
            return Err(Error::invalid(format!(
                "expected {} strings, body has {}",
                count,
                strings.len()
            )));
        }
        Ok(strings)
    }
}
