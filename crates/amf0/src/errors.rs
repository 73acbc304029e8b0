use std::io;

use super::define::Amf0Marker;

/// Errors that can occur when decoding AMF0 data.
///
/// Unknown markers are not represented here: they decode to
/// [`Amf0Value::Unsupported`](super::Amf0Value::Unsupported) instead of
/// failing.
#[derive(Debug, thiserror::Error)]
pub enum Amf0ReadError {
    /// A string parse error occurred.
    #[error("string parse error: {0}")]
    StringParseError(#[from] std::str::Utf8Error),
    /// An IO error occurred.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A wrong type was encountered. Created when using
    /// `Amf0Decoder::decode_with_type` and the next value is not the expected
    /// type. `got` is the raw marker byte, which may not map to any known
    /// marker at all.
    #[error("wrong type: expected {expected:?}, got marker {got}")]
    WrongType {
        /// The marker the caller asked for.
        expected: Amf0Marker,
        /// The marker byte found on the wire.
        got: u8,
    },
}

/// Errors that can occur when encoding AMF0 data.
#[derive(Debug, thiserror::Error)]
pub enum Amf0WriteError {
    /// A normal string was too long.
    #[error("normal string too long")]
    NormalStringTooLong,
    /// An IO error occurred.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// The value has no encoded form, such as
    /// [`Amf0Value::Unsupported`](super::Amf0Value::Unsupported).
    #[error("unsupported type: marker {0}")]
    UnsupportedType(u8),
}
