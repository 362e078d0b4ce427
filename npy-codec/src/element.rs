//! Fixed-width element types and their little-endian buffers

use std::fmt;
use std::mem::size_of;

use npy_format::ElementType;

use crate::any::AnyArray;
use crate::array::Array;

/// A primitive that can live in an array buffer.
///
/// Implemented for `bool`, the 8/16/32/64-bit integers and `f32`/`f64`; each
/// implementation is tied to exactly one [`ElementType`].
pub trait Element: Copy + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Registry entry describing this type on disk.
    const DTYPE: ElementType;

    /// Decode a little-endian buffer whose length is a multiple of the width.
    fn decode_le(bytes: &[u8]) -> Vec<Self>;

    /// Append the little-endian encoding of `values` to `out`.
    fn encode_le(values: &[Self], out: &mut Vec<u8>);

    /// Wrap a typed array in the matching [`AnyArray`] variant.
    fn into_any(array: Array<Self>) -> AnyArray;

    /// Borrow the typed array if `any` holds this element type.
    fn from_any(any: &AnyArray) -> Option<&Array<Self>>;

    /// Take the typed array back out, returning `any` unchanged on mismatch.
    fn try_from_any(any: AnyArray) -> Result<Array<Self>, AnyArray>;
}

macro_rules! impl_any_conversions {
    ($variant:ident) => {
        fn into_any(array: Array<Self>) -> AnyArray {
            AnyArray::$variant(array)
        }

        fn from_any(any: &AnyArray) -> Option<&Array<Self>> {
            match any {
                AnyArray::$variant(array) => Some(array),
                _ => None,
            }
        }

        fn try_from_any(any: AnyArray) -> Result<Array<Self>, AnyArray> {
            match any {
                AnyArray::$variant(array) => Ok(array),
                other => Err(other),
            }
        }
    };
}

macro_rules! impl_numeric_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DTYPE: ElementType = ElementType::$variant;

            fn decode_le(bytes: &[u8]) -> Vec<Self> {
                bytes
                    .chunks_exact(size_of::<$ty>())
                    .map(|chunk| {
                        let mut raw = [0u8; size_of::<$ty>()];
                        raw.copy_from_slice(chunk);
                        <$ty>::from_le_bytes(raw)
                    })
                    .collect()
            }

            fn encode_le(values: &[Self], out: &mut Vec<u8>) {
                out.reserve(values.len() * size_of::<$ty>());
                for value in values {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }

            impl_any_conversions!($variant);
        }
    };
}

impl_numeric_element!(i8, Int8);
impl_numeric_element!(i16, Int16);
impl_numeric_element!(i32, Int32);
impl_numeric_element!(i64, Int64);
impl_numeric_element!(u8, Uint8);
impl_numeric_element!(u16, Uint16);
impl_numeric_element!(u32, Uint32);
impl_numeric_element!(u64, Uint64);
impl_numeric_element!(f32, Float32);
impl_numeric_element!(f64, Float64);

impl Element for bool {
    const DTYPE: ElementType = ElementType::Bool;

    // Any nonzero byte reads as true.
    fn decode_le(bytes: &[u8]) -> Vec<Self> {
        bytes.iter().map(|&b| b != 0).collect()
    }

    fn encode_le(values: &[Self], out: &mut Vec<u8>) {
        out.extend(values.iter().map(|&v| v as u8));
    }

    impl_any_conversions!(Bool);
}
