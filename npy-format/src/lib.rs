//! NPY Format - Core primitives for the NumPy array interchange format
//!
//! This crate provides the fundamental encoding/decoding utilities for `.npy`
//! streams with no I/O dependencies. It includes:
//!
//! - Magic numbers and constants
//! - The element type registry (dtype tokens and widths)
//! - Header dictionary encoding/decoding
//! - Envelope (magic, version, header length) encoding/decoding
//! - Error types
//! - Decode limits

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod header;
pub mod limits;
pub mod types;

// Re-export commonly used types
pub use error::{NpyError, Result};
pub use header::{element_count, ArrayHeader, Layout, Preamble};
pub use limits::Limits;
pub use types::ElementType;
