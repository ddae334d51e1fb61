//! Plain Old Data types - element types a dataset can hold.

use bytemuck::{Pod, Zeroable};
use half::f16;
use std::fmt;

/// Element type of a stored dataset.
///
/// The discriminant is the byte written into the dataset descriptor, so the
/// values must never be renumbered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PlainOldDataType {
    /// Boolean (stored as u8: 0 = false, non-zero = true)
    Boolean = 0,
    Uint8 = 1,
    Int8 = 2,
    Uint16 = 3,
    Int16 = 4,
    Uint32 = 5,
    Int32 = 6,
    Uint64 = 7,
    Int64 = 8,
    /// 16-bit floating point (IEEE 754 half precision)
    Float16 = 9,
    Float32 = 10,
    Float64 = 11,
    /// NUL-terminated UTF-8 strings
    String = 12,
    /// Unknown/invalid type
    #[default]
    Unknown = 127,
}

impl PlainOldDataType {
    /// Size in bytes of one stored element. Strings have no fixed size.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Boolean | Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 => 8,
            Self::String | Self::Unknown => 0,
        }
    }

    /// Short type name used in listings.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Uint8 => "u8",
            Self::Int8 => "i8",
            Self::Uint16 => "u16",
            Self::Int16 => "i16",
            Self::Uint32 => "u32",
            Self::Int32 => "i32",
            Self::Uint64 => "u64",
            Self::Int64 => "i64",
            Self::Float16 => "f16",
            Self::Float32 => "f32",
            Self::Float64 => "f64",
            Self::String => "string",
            Self::Unknown => "unknown",
        }
    }

    /// Convert from the descriptor byte.
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Boolean,
            1 => Self::Uint8,
            2 => Self::Int8,
            3 => Self::Uint16,
            4 => Self::Int16,
            5 => Self::Uint32,
            6 => Self::Int32,
            7 => Self::Uint64,
            8 => Self::Int64,
            9 => Self::Float16,
            10 => Self::Float32,
            11 => Self::Float64,
            12 => Self::String,
            _ => Self::Unknown,
        }
    }

    /// Returns true if this is a numeric type (bool, int or float).
    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::String | Self::Unknown)
    }

    /// Returns true if this is an integer type.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Uint8
                | Self::Int8
                | Self::Uint16
                | Self::Int16
                | Self::Uint32
                | Self::Int32
                | Self::Uint64
                | Self::Int64
        )
    }

    /// Returns true if this is a floating point type.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    #[inline]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for PlainOldDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// === POD Trait for writing typed slices ===

/// Fixed-size types that can be written into a dataset body as raw bytes.
pub trait StorePod: Pod + Zeroable + Copy + Default {
    /// The corresponding PlainOldDataType enum value.
    const POD_TYPE: PlainOldDataType;
}

macro_rules! impl_store_pod {
    ($($t:ty => $pod:ident),* $(,)?) => {
        $(
            impl StorePod for $t {
                const POD_TYPE: PlainOldDataType = PlainOldDataType::$pod;
            }
        )*
    };
}

impl_store_pod! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
}

/// Boolean type with guaranteed 1-byte storage.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Bool(u8);

impl Bool {
    pub const TRUE: Self = Self(1);
    pub const FALSE: Self = Self(0);

    #[inline]
    pub const fn new(v: bool) -> Self {
        Self(v as u8)
    }

    #[inline]
    pub const fn get(self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for Bool {
    #[inline]
    fn from(v: bool) -> Self {
        Self::new(v)
    }
}

impl fmt::Debug for Bool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl StorePod for Bool {
    const POD_TYPE: PlainOldDataType = PlainOldDataType::Boolean;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_sizes() {
        assert_eq!(PlainOldDataType::Boolean.num_bytes(), 1);
        assert_eq!(PlainOldDataType::Int32.num_bytes(), 4);
        assert_eq!(PlainOldDataType::Float64.num_bytes(), 8);
        assert_eq!(PlainOldDataType::Float16.num_bytes(), 2);
        assert_eq!(PlainOldDataType::String.num_bytes(), 0);
    }

    #[test]
    fn test_descriptor_byte() {
        for i in 0..=12u8 {
            let pod = PlainOldDataType::from_u8(i);
            assert_ne!(pod, PlainOldDataType::Unknown);
            assert_eq!(pod as u8, i);
        }
        assert_eq!(PlainOldDataType::from_u8(13), PlainOldDataType::Unknown);
    }

    #[test]
    fn test_classification() {
        assert!(PlainOldDataType::Int64.is_integer());
        assert!(PlainOldDataType::Float16.is_float());
        assert!(PlainOldDataType::Boolean.is_numeric());
        assert!(!PlainOldDataType::String.is_numeric());
        assert_eq!(<f64 as StorePod>::POD_TYPE, PlainOldDataType::Float64);
    }

    #[test]
    fn test_bool_type() {
        assert!(Bool::new(true).get());
        assert!(!Bool::from(false).get());
        assert_eq!(std::mem::size_of::<Bool>(), 1);
    }
}
