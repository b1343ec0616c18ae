use thiserror::Error;

/// Errors that can occur while encoding or decoding wire payloads
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Reader ran out of bytes mid-value
    #[error("buffer exhausted: needed {needed} more byte(s), {remaining} remaining")]
    BufferExhausted { needed: usize, remaining: usize },

    /// An unrecognized discriminant byte was read
    #[error("invalid {context} tag: {tag}")]
    InvalidTag { context: &'static str, tag: u8 },

    /// A string payload was not valid UTF-8
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,

    /// A declared length prefix points past the end of the buffer
    #[error("declared length {length} exceeds remaining buffer ({remaining} byte(s))")]
    LengthOverrun { length: usize, remaining: usize },
}
