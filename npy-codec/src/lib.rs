//! NPY Codec - Array stream encoder/decoder
//!
//! This crate turns typed in-memory arrays into `.npy` streams and back:
//!
//! - [`Element`] ties each primitive to its registry entry and LE buffer codec
//! - [`Array`] is the typed in-memory array
//! - [`read_array`] / [`write_array`] handle one complete stream
//! - [`AnyArray`] erases the element type behind a tagged union, with a
//!   static [`codec_for`] table for dtype-driven dispatch

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod any;
pub mod array;
pub mod element;
pub mod read;
pub mod write;

// Re-export commonly used types
pub use npy_format::{ArrayHeader, ElementType, Layout, Limits, NpyError, Result};

// Re-export our own types
pub use any::{codec_for, AnyArray, ArrayVisitor, MemberCodec};
pub use array::Array;
pub use element::Element;
pub use read::{decode_array, peek_header, read_any, read_array, read_array_with_header};
pub use write::{encode_array, write_array};
