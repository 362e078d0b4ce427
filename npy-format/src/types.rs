//! Element type registry

use std::fmt;

use crate::error::{NpyError, Result};

/// Element types supported in array buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ElementType {
    /// One-byte boolean
    Bool = 0,
    /// Signed 8-bit integer
    Int8 = 1,
    /// Signed 16-bit integer
    Int16 = 2,
    /// Signed 32-bit integer
    Int32 = 3,
    /// Signed 64-bit integer
    Int64 = 4,
    /// Unsigned 8-bit integer
    Uint8 = 5,
    /// Unsigned 16-bit integer
    Uint16 = 6,
    /// Unsigned 32-bit integer
    Uint32 = 7,
    /// Unsigned 64-bit integer
    Uint64 = 8,
    /// IEEE 754 single precision
    Float32 = 9,
    /// IEEE 754 double precision
    Float64 = 10,
}

impl ElementType {
    /// Every registered element type, ordered by discriminant.
    pub const ALL: [ElementType; 11] = [
        ElementType::Bool,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Uint8,
        ElementType::Uint16,
        ElementType::Uint32,
        ElementType::Uint64,
        ElementType::Float32,
        ElementType::Float64,
    ];

    /// On-disk dtype token written into the header dictionary.
    pub fn token(self) -> &'static str {
        match self {
            ElementType::Bool => "|b1",
            ElementType::Int8 => "|i1",
            ElementType::Int16 => "<i2",
            ElementType::Int32 => "<i4",
            ElementType::Int64 => "<i8",
            ElementType::Uint8 => "|u1",
            ElementType::Uint16 => "<u2",
            ElementType::Uint32 => "<u4",
            ElementType::Uint64 => "<u8",
            ElementType::Float32 => "<f4",
            ElementType::Float64 => "<f8",
        }
    }

    /// Width of one element in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementType::Bool | ElementType::Int8 | ElementType::Uint8 => 1,
            ElementType::Int16 | ElementType::Uint16 => 2,
            ElementType::Int32 | ElementType::Uint32 | ElementType::Float32 => 4,
            ElementType::Int64 | ElementType::Uint64 | ElementType::Float64 => 8,
        }
    }

    /// Logical lowercase name (`"float64"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Uint8 => "uint8",
            ElementType::Uint16 => "uint16",
            ElementType::Uint32 => "uint32",
            ElementType::Uint64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
        }
    }

    /// Resolve a dtype token, ignoring its byte-order marker.
    ///
    /// Returns `None` for tokens outside the registry, including known kinds
    /// with a width the registry does not record (`<i3`).
    pub fn from_token(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        match chars.next()? {
            '<' | '>' | '|' | '=' => {}
            _ => return None,
        }
        let code = chars.as_str();
        Self::ALL
            .into_iter()
            .find(|dtype| &dtype.token()[1..] == code)
    }

    /// Resolve a dtype token or fail with [`NpyError::UnsupportedDtype`].
    pub fn parse_token(token: &str) -> Result<Self> {
        Self::from_token(token).ok_or_else(|| NpyError::UnsupportedDtype(token.to_string()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
