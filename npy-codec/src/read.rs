//! Single-array stream decoder
//!
//! Decoding runs in two named stages: [`peek_header`] consumes the envelope
//! and header block, then [`read_array_with_header`] consumes the element
//! buffer. [`read_array`] runs both back to back.

use std::io::Read;

use npy_format::constants::{MAGIC, PREAMBLE_LEN_V2};
use npy_format::{ArrayHeader, Limits, NpyError, Preamble, Result};

use crate::any::{codec_for, AnyArray};
use crate::array::Array;
use crate::element::Element;

/// Read the envelope and header block, leaving the reader at the first
/// element byte.
pub fn peek_header<R: Read + ?Sized>(reader: &mut R, limits: &Limits) -> Result<ArrayHeader> {
    let mut prefix = [0u8; PREAMBLE_LEN_V2];

    // Magic first so foreign input fails before anything else is consumed.
    reader.read_exact(&mut prefix[..MAGIC.len()])?;
    if prefix[..MAGIC.len()] != MAGIC {
        let mut magic = [0u8; 6];
        magic.copy_from_slice(&prefix[..MAGIC.len()]);
        return Err(NpyError::InvalidMagic(magic));
    }

    let version_end = MAGIC.len() + 2;
    reader.read_exact(&mut prefix[MAGIC.len()..version_end])?;
    let width = Preamble::length_field_width(prefix[MAGIC.len()], prefix[MAGIC.len() + 1])?;

    let preamble_end = version_end + width;
    reader.read_exact(&mut prefix[version_end..preamble_end])?;
    let (preamble, consumed) = Preamble::decode(&prefix[..preamble_end])?;
    debug_assert_eq!(consumed, preamble_end);
    preamble.check_limits(limits)?;

    let mut header_bytes = vec![0u8; preamble.header_len];
    reader.read_exact(&mut header_bytes)?;
    let text = std::str::from_utf8(&header_bytes)
        .map_err(|_| NpyError::MalformedHeader("header is not valid UTF-8".to_string()))?;

    ArrayHeader::parse(text)
}

/// Read the element buffer described by an already decoded header.
///
/// Fails with [`NpyError::DtypeMismatch`] when `T` is not the header's dtype.
pub fn read_array_with_header<T: Element, R: Read + ?Sized>(
    reader: &mut R,
    header: ArrayHeader,
    limits: &Limits,
) -> Result<Array<T>> {
    if header.dtype != T::DTYPE {
        return Err(NpyError::DtypeMismatch {
            expected: T::DTYPE,
            found: header.dtype,
        });
    }

    let data_len = header.data_len()?;
    if data_len as u64 > limits.max_data_bytes {
        return Err(NpyError::LimitExceeded(format!(
            "array buffer of {} bytes exceeds limit {}",
            data_len, limits.max_data_bytes
        )));
    }

    let mut buffer = vec![0u8; data_len];
    reader.read_exact(&mut buffer)?;

    Ok(Array {
        data: T::decode_le(&buffer),
        shape: header.shape,
        layout: header.layout,
    })
}

/// Read one complete `.npy` stream as an array of `T`.
pub fn read_array<T: Element, R: Read + ?Sized>(reader: &mut R, limits: &Limits) -> Result<Array<T>> {
    let header = peek_header(reader, limits)?;
    read_array_with_header(reader, header, limits)
}

/// Read one complete `.npy` stream whose element type is resolved from its
/// header.
pub fn read_any<R: Read>(reader: &mut R, limits: &Limits) -> Result<AnyArray> {
    let header = peek_header(reader, limits)?;
    (codec_for(header.dtype).read_body)(reader, header, limits)
}

/// Decode an in-memory `.npy` stream with default limits.
pub fn decode_array<T: Element>(mut bytes: &[u8]) -> Result<Array<T>> {
    read_array(&mut bytes, &Limits::default())
}
