//! Type-erased arrays and the per-dtype codec table

use std::io::{Read, Write};

use npy_format::{ArrayHeader, ElementType, Layout, Limits, NpyError, Result};

use crate::array::Array;
use crate::element::Element;
use crate::read::{read_array, read_array_with_header};
use crate::write::write_array;

/// An array whose element type is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyArray {
    /// `|b1`
    Bool(Array<bool>),
    /// `|i1`
    Int8(Array<i8>),
    /// `<i2`
    Int16(Array<i16>),
    /// `<i4`
    Int32(Array<i32>),
    /// `<i8`
    Int64(Array<i64>),
    /// `|u1`
    Uint8(Array<u8>),
    /// `<u2`
    Uint16(Array<u16>),
    /// `<u4`
    Uint32(Array<u32>),
    /// `<u8`
    Uint64(Array<u64>),
    /// `<f4`
    Float32(Array<f32>),
    /// `<f8`
    Float64(Array<f64>),
}

macro_rules! dispatch {
    ($any:expr, $array:ident => $body:expr) => {
        match $any {
            AnyArray::Bool($array) => $body,
            AnyArray::Int8($array) => $body,
            AnyArray::Int16($array) => $body,
            AnyArray::Int32($array) => $body,
            AnyArray::Int64($array) => $body,
            AnyArray::Uint8($array) => $body,
            AnyArray::Uint16($array) => $body,
            AnyArray::Uint32($array) => $body,
            AnyArray::Uint64($array) => $body,
            AnyArray::Float32($array) => $body,
            AnyArray::Float64($array) => $body,
        }
    };
}

/// Generic operation applied to whichever typed array an [`AnyArray`] holds.
pub trait ArrayVisitor {
    /// Result of the visit
    type Output;

    /// Called with the concrete array.
    fn visit<T: Element>(self, array: &Array<T>) -> Self::Output;
}

impl AnyArray {
    /// Element type of the wrapped array.
    pub fn dtype(&self) -> ElementType {
        dispatch!(self, array => array.dtype())
    }

    /// Logical dimensions.
    pub fn shape(&self) -> &[usize] {
        dispatch!(self, array => &array.shape)
    }

    /// Memory order of the buffer.
    pub fn layout(&self) -> Layout {
        dispatch!(self, array => array.layout)
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        dispatch!(self, array => array.len())
    }

    /// True when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header dictionary describing the wrapped array.
    pub fn header(&self) -> ArrayHeader {
        dispatch!(self, array => array.header())
    }

    /// Borrow the typed array, or `None` when `T` is not the stored type.
    pub fn get<T: Element>(&self) -> Option<&Array<T>> {
        T::from_any(self)
    }

    /// Take the typed array, returning `self` unchanged on mismatch.
    pub fn into_array<T: Element>(self) -> std::result::Result<Array<T>, Self> {
        T::try_from_any(self)
    }

    /// Apply a generic visitor to the wrapped array.
    pub fn visit<V: ArrayVisitor>(&self, visitor: V) -> V::Output {
        dispatch!(self, array => visitor.visit(array))
    }

    /// Check that the buffer length equals the product of the shape.
    pub fn validate(&self) -> Result<()> {
        dispatch!(self, array => array.validate())
    }

    /// Write the wrapped array as one `.npy` stream.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        dispatch!(self, array => write_array(writer, array))
    }
}

/// Typed read and write entry points for one element type.
pub struct MemberCodec {
    /// Element type served by this entry
    pub dtype: ElementType,
    /// Read one complete stream, envelope included.
    pub read: fn(&mut dyn Read, &Limits) -> Result<AnyArray>,
    /// Read the element buffer that follows an already decoded header.
    pub read_body: fn(&mut dyn Read, ArrayHeader, &Limits) -> Result<AnyArray>,
    /// Write an array of this entry's element type.
    pub write: fn(&mut dyn Write, &AnyArray) -> Result<()>,
}

fn read_member<T: Element>(reader: &mut dyn Read, limits: &Limits) -> Result<AnyArray> {
    read_array::<T, _>(reader, limits).map(T::into_any)
}

fn read_member_body<T: Element>(
    reader: &mut dyn Read,
    header: ArrayHeader,
    limits: &Limits,
) -> Result<AnyArray> {
    read_array_with_header::<T, _>(reader, header, limits).map(T::into_any)
}

fn write_member<T: Element>(writer: &mut dyn Write, any: &AnyArray) -> Result<()> {
    let array = T::from_any(any).ok_or(NpyError::DtypeMismatch {
        expected: T::DTYPE,
        found: any.dtype(),
    })?;
    write_array(writer, array)
}

macro_rules! member_codec {
    ($ty:ty) => {
        MemberCodec {
            dtype: <$ty as Element>::DTYPE,
            read: read_member::<$ty>,
            read_body: read_member_body::<$ty>,
            write: write_member::<$ty>,
        }
    };
}

// Indexed by `ElementType as usize`.
static CODECS: [MemberCodec; 11] = [
    member_codec!(bool),
    member_codec!(i8),
    member_codec!(i16),
    member_codec!(i32),
    member_codec!(i64),
    member_codec!(u8),
    member_codec!(u16),
    member_codec!(u32),
    member_codec!(u64),
    member_codec!(f32),
    member_codec!(f64),
];

/// Codec table entry for `dtype`.
pub fn codec_for(dtype: ElementType) -> &'static MemberCodec {
    &CODECS[dtype as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::write::encode_array;

    #[test]
    fn test_codec_table_aligned_with_registry() {
        for dtype in ElementType::ALL {
            assert_eq!(codec_for(dtype).dtype, dtype);
        }
    }

    #[test]
    fn test_table_read_produces_matching_variant() {
        let bytes = encode_array(&Array::new(vec![1u16, 2, 3, 4], vec![2, 2])).unwrap();
        let mut reader = bytes.as_slice();
        let header = crate::read::peek_header(&mut reader, &Limits::default()).unwrap();
        let codec = codec_for(header.dtype);

        let any = (codec.read_body)(&mut reader, header, &Limits::default()).unwrap();
        assert_eq!(any.dtype(), ElementType::Uint16);
        assert_eq!(any.get::<u16>().unwrap().data, vec![1, 2, 3, 4]);
        assert!(reader.is_empty());

        let full = (codec.read)(&mut bytes.as_slice(), &Limits::default()).unwrap();
        assert_eq!(full, any);
    }

    #[test]
    fn test_table_read_checks_dtype() {
        let bytes = encode_array(&Array::from_vec(vec![1u32])).unwrap();
        let err = (codec_for(ElementType::Int32).read)(&mut bytes.as_slice(), &Limits::default())
            .unwrap_err();
        assert!(matches!(err, NpyError::DtypeMismatch { .. }));
    }

    #[test]
    fn test_validate_dispatch() {
        let ok = AnyArray::from(Array::new(vec![1u64, 2], vec![2]));
        assert!(ok.validate().is_ok());
        let bad = AnyArray::from(Array::new(vec![1u64, 2], vec![3]));
        assert!(matches!(bad.validate(), Err(NpyError::Validation(_))));
    }

    #[test]
    fn test_table_write_rejects_wrong_variant() {
        let any = AnyArray::from(Array::from_vec(vec![1.5f32]));
        let mut out = Vec::new();
        match (codec_for(ElementType::Float64).write)(&mut out, &any) {
            Err(NpyError::DtypeMismatch { expected, found }) => {
                assert_eq!(expected, ElementType::Float64);
                assert_eq!(found, ElementType::Float32);
            }
            other => panic!("expected DtypeMismatch, got {other:?}"),
        }
        assert!(out.is_empty());

        (codec_for(ElementType::Float32).write)(&mut out, &any).unwrap();
        assert_eq!(out, encode_array(any.get::<f32>().unwrap()).unwrap());
    }

    #[test]
    fn test_accessors() {
        let any: AnyArray =
            Array::with_layout(vec![1i8, 2, 3, 4, 5, 6], vec![3, 2], Layout::ColumnMajor).into();
        assert_eq!(any.dtype(), ElementType::Int8);
        assert_eq!(any.shape(), &[3, 2]);
        assert_eq!(any.layout(), Layout::ColumnMajor);
        assert_eq!(any.len(), 6);
        assert!(!any.is_empty());
        assert!(any.get::<u8>().is_none());
        assert!(any.clone().into_array::<u8>().is_err());
        assert_eq!(any.into_array::<i8>().unwrap().data, vec![1, 2, 3, 4, 5, 6]);
    }

    struct ElementCount;

    impl ArrayVisitor for ElementCount {
        type Output = (ElementType, usize);

        fn visit<T: Element>(self, array: &Array<T>) -> Self::Output {
            (T::DTYPE, array.data.len())
        }
    }

    #[test]
    fn test_visitor_sees_concrete_type() {
        let any = AnyArray::from(Array::from_vec(vec![true, false]));
        assert_eq!(any.visit(ElementCount), (ElementType::Bool, 2));
    }
}
