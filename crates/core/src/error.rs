use thiserror::Error;

/// Errors raised while decoding a wire value. Mirrors the distinction the wire
/// format contract makes: an unknown enum tag or a truncated buffer must fail
/// loudly rather than silently default or truncate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of buffer: needed {needed} more byte(s), had {available}")]
    UnexpectedEof { needed: usize, available: usize },
    #[error("invalid op_code: {0}")]
    InvalidOpCode(i32),
    #[error("invalid status_code: {0}")]
    InvalidStatusCode(i32),
    #[error("invalid semantics mode: {0}")]
    InvalidSemanticsMode(i32),
    #[error("invalid currency: {0:?}")]
    InvalidCurrency(String),
    #[error("payload text is not valid utf-8")]
    InvalidUtf8,
    #[error("trailing bytes after decoding a fixed-length value")]
    TrailingBytes,
    #[error("response text of {0} bytes does not fit in the payload region")]
    PayloadTooLong(usize),
}
