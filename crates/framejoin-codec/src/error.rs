use std::io;

use thiserror::Error;

/// Result type local to framejoin-codec.
pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("truncated {context}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("frame length {len} exceeds max {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("unknown field tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    #[error("{0} trailing bytes after last field")]
    TrailingBytes(usize),

    #[error("row has {0} fields; at most 65535 are encodable")]
    TooManyFields(usize),

    #[error("field of {0} bytes is too large to encode")]
    FieldTooLarge(usize),

    #[error("stream read failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported json value: {0}")]
    JsonShape(&'static str),

    #[error("line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: Box<CodecError>,
    },
}
