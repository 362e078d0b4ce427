//! Envelope and header dictionary structures

use std::io;
use std::sync::OnceLock;

use regex::Regex;
use smallvec::SmallVec;

use crate::constants::{
    HEADER_ALIGNMENT, KEY_DESCR, KEY_FORTRAN_ORDER, KEY_SHAPE, MAGIC, PREAMBLE_LEN_V1,
    PREAMBLE_LEN_V2, VERSION_1, VERSION_2, VERSION_MAJOR, VERSION_MINOR,
};
use crate::error::{NpyError, Result};
use crate::limits::Limits;
use crate::types::ElementType;

/// Memory order of the flat element buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layout {
    /// C order: the last dimension varies fastest.
    #[default]
    RowMajor,
    /// Fortran order: the first dimension varies fastest.
    ColumnMajor,
}

impl Layout {
    /// Layout described by a `fortran_order` flag.
    pub fn from_fortran_order(fortran_order: bool) -> Self {
        if fortran_order {
            Layout::ColumnMajor
        } else {
            Layout::RowMajor
        }
    }

    /// Value of the header's `fortran_order` flag.
    pub fn is_fortran_order(self) -> bool {
        matches!(self, Layout::ColumnMajor)
    }
}

/// Number of elements described by `shape`, or `None` on overflow.
///
/// An empty shape describes a scalar and holds one element.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// Decoded header dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayHeader {
    /// Logical dimensions
    pub shape: Vec<usize>,
    /// Element type
    pub dtype: ElementType,
    /// Memory order of the buffer
    pub layout: Layout,
}

impl ArrayHeader {
    /// Create a header.
    pub fn new(dtype: ElementType, shape: Vec<usize>, layout: Layout) -> Self {
        Self {
            shape,
            dtype,
            layout,
        }
    }

    /// Number of elements in the buffer that follows the header.
    pub fn element_count(&self) -> Result<usize> {
        element_count(&self.shape).ok_or_else(|| {
            NpyError::LimitExceeded(format!("element count of shape {:?} overflows", self.shape))
        })
    }

    /// Size of the raw element buffer in bytes.
    pub fn data_len(&self) -> Result<usize> {
        self.element_count()?
            .checked_mul(self.dtype.width())
            .ok_or_else(|| {
                NpyError::LimitExceeded(format!("buffer size of shape {:?} overflows", self.shape))
            })
    }

    /// Render the dictionary literal without padding.
    pub fn to_text(&self) -> String {
        let shape = match self.shape.as_slice() {
            [] => "()".to_string(),
            [dim] => format!("({},)", dim),
            dims => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                format!("({})", parts.join(", "))
            }
        };
        let fortran_order = if self.layout.is_fortran_order() {
            "True"
        } else {
            "False"
        };

        format!(
            "{{'{}': '{}', '{}': {}, '{}': {}, }}",
            KEY_DESCR,
            self.dtype.token(),
            KEY_FORTRAN_ORDER,
            fortran_order,
            KEY_SHAPE,
            shape
        )
    }

    /// Render the dictionary padded with spaces and a trailing newline so the
    /// version 1 preamble plus header is a multiple of 16 bytes.
    pub fn to_padded_text(&self) -> String {
        let mut text = self.to_text();
        let unpadded = PREAMBLE_LEN_V1 + text.len() + 1;
        let spaces = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
        text.reserve(spaces + 1);
        text.extend(std::iter::repeat(' ').take(spaces));
        text.push('\n');
        text
    }

    /// Parse a header block.
    pub fn parse(text: &str) -> Result<Self> {
        let dict = patterns()
            .dict
            .find(text)
            .ok_or_else(|| NpyError::MalformedHeader("no dictionary literal".to_string()))?
            .as_str();

        let shape_text = patterns()
            .shape
            .captures(dict)
            .and_then(|c| c.get(1))
            .ok_or(NpyError::MissingField(KEY_SHAPE))?
            .as_str();
        let shape = parse_shape(shape_text)?;

        let token = patterns()
            .descr
            .captures(dict)
            .and_then(|c| c.get(1))
            .ok_or(NpyError::MissingField(KEY_DESCR))?
            .as_str();
        let dtype = ElementType::parse_token(token)?;

        let fortran_order = patterns()
            .fortran_order
            .captures(dict)
            .and_then(|c| c.get(1))
            .ok_or(NpyError::MissingField(KEY_FORTRAN_ORDER))?
            .as_str()
            == "True";

        Ok(Self {
            shape,
            dtype,
            layout: Layout::from_fortran_order(fortran_order),
        })
    }
}

fn parse_shape(text: &str) -> Result<Vec<usize>> {
    text.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| NpyError::InvalidShape(part.to_string()))
        })
        .collect()
}

struct HeaderPatterns {
    dict: Regex,
    shape: Regex,
    descr: Regex,
    fortran_order: Regex,
}

fn patterns() -> &'static HeaderPatterns {
    static PATTERNS: OnceLock<HeaderPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| HeaderPatterns {
        dict: Regex::new(r"\{.*\}").expect("valid dictionary pattern"),
        shape: Regex::new(r"'shape':\s*\(([\d,\s]*)\)").expect("valid shape pattern"),
        descr: Regex::new(r"'descr':\s*'([^']*)'").expect("valid descr pattern"),
        fortran_order: Regex::new(r"'fortran_order':\s*(True|False)")
            .expect("valid fortran_order pattern"),
    })
}

/// Fixed-format prefix of an array stream: magic, version, header length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    /// Major format version
    pub major: u8,
    /// Minor format version
    pub minor: u8,
    /// Length of the header block that follows
    pub header_len: usize,
}

impl Preamble {
    /// Version 1.0 preamble for a padded header of `header_len` bytes.
    pub fn v1(header_len: usize) -> Result<Self> {
        if header_len > u16::MAX as usize {
            return Err(NpyError::Validation(format!(
                "header length {} does not fit a version 1 envelope",
                header_len
            )));
        }
        Ok(Self {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            header_len,
        })
    }

    /// Width of the header length field for a given major version.
    pub fn length_field_width(major: u8, minor: u8) -> Result<usize> {
        match major {
            VERSION_1 => Ok(2),
            VERSION_2 => Ok(4),
            _ => Err(NpyError::UnsupportedVersion { major, minor }),
        }
    }

    /// Encode preamble to bytes
    pub fn encode(&self) -> Result<SmallVec<[u8; PREAMBLE_LEN_V2]>> {
        let mut result = SmallVec::new();

        result.extend_from_slice(&MAGIC);
        result.push(self.major);
        result.push(self.minor);

        match Self::length_field_width(self.major, self.minor)? {
            2 => {
                let len = u16::try_from(self.header_len).map_err(|_| {
                    NpyError::Validation(format!(
                        "header length {} does not fit a 2-byte field",
                        self.header_len
                    ))
                })?;
                result.extend_from_slice(&len.to_le_bytes());
            }
            _ => {
                let len = u32::try_from(self.header_len).map_err(|_| {
                    NpyError::Validation(format!(
                        "header length {} does not fit a 4-byte field",
                        self.header_len
                    ))
                })?;
                result.extend_from_slice(&len.to_le_bytes());
            }
        }

        Ok(result)
    }

    /// Decode preamble from bytes, returning it with the bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < MAGIC.len() {
            return Err(unexpected_eof());
        }

        let mut magic = [0u8; 6];
        magic.copy_from_slice(&bytes[..MAGIC.len()]);
        if magic != MAGIC {
            return Err(NpyError::InvalidMagic(magic));
        }
        let mut pos = MAGIC.len();

        if bytes.len() < pos + 2 {
            return Err(unexpected_eof());
        }
        let major = bytes[pos];
        let minor = bytes[pos + 1];
        pos += 2;

        let width = Self::length_field_width(major, minor)?;
        if bytes.len() < pos + width {
            return Err(unexpected_eof());
        }
        let header_len = match width {
            2 => u16::from_le_bytes([bytes[pos], bytes[pos + 1]]) as usize,
            _ => u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
                as usize,
        };
        pos += width;

        Ok((
            Self {
                major,
                minor,
                header_len,
            },
            pos,
        ))
    }

    /// Reject header lengths beyond the configured limit.
    pub fn check_limits(&self, limits: &Limits) -> Result<()> {
        let max = limits.effective_max_header_len();
        if self.header_len > max {
            return Err(NpyError::LimitExceeded(format!(
                "header length {} exceeds limit {}",
                self.header_len, max
            )));
        }
        Ok(())
    }
}

fn unexpected_eof() -> NpyError {
    NpyError::Io(io::Error::from(io::ErrorKind::UnexpectedEof))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(dtype: ElementType, shape: &[usize], layout: Layout) -> ArrayHeader {
        ArrayHeader::new(dtype, shape.to_vec(), layout)
    }

    #[test]
    fn test_text_one_dimension_has_trailing_comma() {
        let text = header(ElementType::Float64, &[5], Layout::RowMajor).to_text();
        assert_eq!(
            text,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (5,), }"
        );
    }

    #[test]
    fn test_text_two_dimensions() {
        let text = header(ElementType::Int32, &[2, 3], Layout::ColumnMajor).to_text();
        assert_eq!(
            text,
            "{'descr': '<i4', 'fortran_order': True, 'shape': (2, 3), }"
        );
    }

    #[test]
    fn test_text_scalar_shape() {
        let text = header(ElementType::Bool, &[], Layout::RowMajor).to_text();
        assert_eq!(text, "{'descr': '|b1', 'fortran_order': False, 'shape': (), }");
    }

    #[test]
    fn test_padding_alignment() {
        for shape in [vec![], vec![0], vec![5], vec![2, 3], vec![10, 20, 30, 40]] {
            let padded = header(ElementType::Uint16, &shape, Layout::RowMajor).to_padded_text();
            assert_eq!((PREAMBLE_LEN_V1 + padded.len()) % HEADER_ALIGNMENT, 0);
            assert!(padded.ends_with('\n'));
            assert!(!padded[..padded.len() - 1].ends_with('\n'));
            assert!(padded.trim_end_matches('\n').ends_with(|c: char| c == '}' || c == ' '));
        }
    }

    #[test]
    fn test_parse_numpy_header() {
        let parsed = ArrayHeader::parse(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (3, 4), }          \n",
        )
        .unwrap();
        assert_eq!(parsed, header(ElementType::Float64, &[3, 4], Layout::RowMajor));
    }

    #[test]
    fn test_parse_key_order_and_spacing_independent() {
        let parsed =
            ArrayHeader::parse("{'shape':(7,),'fortran_order':True,'descr':'>u4'}\n").unwrap();
        assert_eq!(parsed, header(ElementType::Uint32, &[7], Layout::ColumnMajor));
    }

    #[test]
    fn test_parse_empty_shape() {
        let parsed =
            ArrayHeader::parse("{'descr': '<i8', 'fortran_order': False, 'shape': (), }").unwrap();
        assert!(parsed.shape.is_empty());
        assert_eq!(parsed.element_count().unwrap(), 1);
    }

    #[test]
    fn test_parse_missing_dictionary() {
        match ArrayHeader::parse("'descr': '<f8'") {
            Err(NpyError::MalformedHeader(_)) => {}
            other => panic!("expected MalformedHeader, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_fields() {
        let cases = [
            ("{'descr': '<f8', 'fortran_order': False, }", KEY_SHAPE),
            ("{'fortran_order': False, 'shape': (1,), }", KEY_DESCR),
            ("{'descr': '<f8', 'shape': (1,), }", KEY_FORTRAN_ORDER),
            (
                "{'descr': '<f8', 'fortran_order': maybe, 'shape': (1,), }",
                KEY_FORTRAN_ORDER,
            ),
        ];

        for (text, field) in cases {
            match ArrayHeader::parse(text) {
                Err(NpyError::MissingField(name)) => assert_eq!(name, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_unsupported_dtype() {
        match ArrayHeader::parse("{'descr': '|O', 'fortran_order': False, 'shape': (1,), }") {
            Err(NpyError::UnsupportedDtype(token)) => assert_eq!(token, "|O"),
            other => panic!("expected UnsupportedDtype, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_shape_overflow() {
        let text = "{'descr': '<f8', 'fortran_order': False, 'shape': (99999999999999999999999,), }";
        assert!(matches!(
            ArrayHeader::parse(text),
            Err(NpyError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_element_count() {
        assert_eq!(element_count(&[]), Some(1));
        assert_eq!(element_count(&[0]), Some(0));
        assert_eq!(element_count(&[2, 3, 4]), Some(24));
        assert_eq!(element_count(&[usize::MAX, 2]), None);

        let huge = header(ElementType::Float64, &[usize::MAX / 4], Layout::RowMajor);
        assert!(matches!(huge.data_len(), Err(NpyError::LimitExceeded(_))));
    }

    #[test]
    fn test_preamble_roundtrip() {
        let preamble = Preamble::v1(118).unwrap();
        let encoded = preamble.encode().unwrap();
        assert_eq!(encoded.len(), PREAMBLE_LEN_V1);
        assert_eq!(&encoded[..6], &MAGIC);
        assert_eq!(encoded[6], 1);
        assert_eq!(encoded[7], 0);
        assert_eq!(&encoded[8..10], &118u16.to_le_bytes());

        let (decoded, consumed) = Preamble::decode(&encoded).unwrap();
        assert_eq!(decoded, preamble);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_preamble_v2_length_field() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[2, 0]);
        bytes.extend_from_slice(&70_000u32.to_le_bytes());

        let (decoded, consumed) = Preamble::decode(&bytes).unwrap();
        assert_eq!(decoded.major, 2);
        assert_eq!(decoded.header_len, 70_000);
        assert_eq!(consumed, PREAMBLE_LEN_V2);
    }

    #[test]
    fn test_preamble_invalid_magic() {
        let bytes = b"This is not a valid NPY file";
        match Preamble::decode(bytes) {
            Err(NpyError::InvalidMagic(magic)) => assert_eq!(&magic, b"This i"),
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_preamble_unsupported_version() {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[3, 0, 0, 0, 0, 0]);
        match Preamble::decode(&bytes) {
            Err(NpyError::UnsupportedVersion { major, minor }) => {
                assert_eq!((major, minor), (3, 0));
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_preamble_truncated() {
        let bytes = [0x93, b'N', b'U', b'M', b'P', b'Y', 1, 0, 0x10];
        match Preamble::decode(&bytes) {
            Err(NpyError::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[test]
    fn test_preamble_v1_rejects_oversized_header() {
        assert!(matches!(
            Preamble::v1(u16::MAX as usize + 1),
            Err(NpyError::Validation(_))
        ));
    }

    #[test]
    fn test_preamble_limits() {
        let limits = Limits {
            max_header_len: 128,
            ..Limits::default()
        };
        assert!(Preamble::v1(128).unwrap().check_limits(&limits).is_ok());
        assert!(matches!(
            Preamble::v1(129).unwrap().check_limits(&limits),
            Err(NpyError::LimitExceeded(_))
        ));
    }
}
