//! Constants and magic numbers for the NPY format

/// Array stream magic bytes: `\x93NUMPY`
pub const MAGIC: [u8; 6] = [0x93, b'N', b'U', b'M', b'P', b'Y'];

/// Major version written by this implementation.
pub const VERSION_MAJOR: u8 = 1;
/// Minor version written by this implementation.
pub const VERSION_MINOR: u8 = 0;

/// Major version using a 2-byte header length.
pub const VERSION_1: u8 = 1;
/// Major version using a 4-byte header length (read only).
pub const VERSION_2: u8 = 2;

/// Magic + version + 2-byte header length of a version 1 envelope.
pub const PREAMBLE_LEN_V1: usize = MAGIC.len() + 2 + 2;
/// Magic + version + 4-byte header length of a version 2 envelope.
pub const PREAMBLE_LEN_V2: usize = MAGIC.len() + 2 + 4;

/// Total preamble + header length is padded to a multiple of this.
pub const HEADER_ALIGNMENT: usize = 16;

/// Extension of a single-array stream.
pub const NPY_EXTENSION: &str = ".npy";
/// Extension of a multi-array archive.
pub const NPZ_EXTENSION: &str = ".npz";

/// Header dictionary key holding the dtype token.
pub const KEY_DESCR: &str = "descr";
/// Header dictionary key holding the layout flag.
pub const KEY_FORTRAN_ORDER: &str = "fortran_order";
/// Header dictionary key holding the shape tuple.
pub const KEY_SHAPE: &str = "shape";
