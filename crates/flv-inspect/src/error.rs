use thiserror::Error;

/// Errors that can stop a parse before any tags are produced.
///
/// Only the fixed file header is strict. Once it has been accepted, tag
/// reading is best-effort and ends silently instead of failing; see
/// [`FlvTagStream`](crate::FlvTagStream).
#[derive(Error, Debug)]
pub enum FlvError {
    /// The input ended before a full 9 byte header could be read.
    #[error("Input too small for an FLV header: {len} bytes")]
    TooSmall { len: usize },
    /// The first three bytes were not the ASCII signature `FLV`.
    #[error("Invalid FLV signature: {found:02X?}")]
    InvalidSignature { found: [u8; 3] },
    /// I/O error while reading the header.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
