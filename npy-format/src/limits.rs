//! Decode limits

/// Limits guarding allocations driven by untrusted headers
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum header block length in bytes (default: 64 KiB, hard: 16 MiB)
    pub max_header_len: usize,
    /// Maximum raw element buffer per array (default: 4 GiB)
    pub max_data_bytes: u64,
}

impl Limits {
    /// Upper bound accepted for `max_header_len`.
    pub const HARD_MAX_HEADER_LEN: usize = 16 * 1024 * 1024;

    /// Header limit clamped to the hard cap.
    pub fn effective_max_header_len(&self) -> usize {
        self.max_header_len.min(Self::HARD_MAX_HEADER_LEN)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_header_len: 64 * 1024,
            max_data_bytes: 4 * 1024 * 1024 * 1024,
        }
    }
}
