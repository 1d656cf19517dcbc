use thiserror::Error;

/// Errors returned while decoding an NFLOG message
///
/// All variants except [`DecodeError::Unsupported`] describe a malformed
/// attribute stream. Decoding stops at the first one; whatever was written to
/// the record before that point must not be relied on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported input: {len} bytes is too short to hold an NFLOG message")]
    Unsupported { len: usize },

    #[error("truncated attribute stream: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("invalid attribute length {length} at offset {offset}")]
    InvalidLength { offset: usize, length: usize },

    #[error("attribute {attr} value too short: expected at least {expected} bytes, got {actual}")]
    ShortValue {
        attr: u16,
        expected: usize,
        actual: usize,
    },

    #[error("invalid nested length: declared {declared} bytes, {available} available")]
    InvalidNestedLength { declared: usize, available: usize },

    #[error("timestamp out of range: {seconds}s + {micros}us")]
    InvalidTimestamp { seconds: i64, micros: i64 },
}

impl DecodeError {
    /// True for every error caused by a malformed attribute stream
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
