//! Single-array stream encoder

use std::io::Write;

use npy_format::{Preamble, Result};

use crate::array::Array;
use crate::element::Element;

/// Write `array` as one version 1.0 `.npy` stream.
///
/// The array is validated before any byte reaches `writer`. Elements are
/// written in stored order regardless of layout.
pub fn write_array<T: Element, W: Write + ?Sized>(writer: &mut W, array: &Array<T>) -> Result<()> {
    array.validate()?;

    let header = array.header().to_padded_text();
    let preamble = Preamble::v1(header.len())?.encode()?;

    let mut data = Vec::with_capacity(array.data.len() * T::DTYPE.width());
    T::encode_le(&array.data, &mut data);

    writer.write_all(&preamble)?;
    writer.write_all(header.as_bytes())?;
    writer.write_all(&data)?;
    Ok(())
}

/// Encode `array` into an in-memory `.npy` stream.
pub fn encode_array<T: Element>(array: &Array<T>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_array(&mut out, array)?;
    Ok(out)
}
