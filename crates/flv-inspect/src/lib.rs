//! Read-only inspection of FLV containers.
//!
//! Feed [`FlvFile::demux`] a complete file as a [`bytes::Bytes`] buffer and
//! get back the header, every tag in file order, and the merged `onMetaData`
//! metadata. Only the 9 byte header is validated strictly: everything behind
//! it decodes permissively, so damaged or unusual files still yield whatever
//! structure they do contain.
//!
//! # Examples
//!
//! ```rust
//! use bytes::Bytes;
//! use flv_inspect::FlvFile;
//!
//! # fn test() -> Result<(), flv_inspect::FlvError> {
//! let data = Bytes::from_static(&[
//!     b'F', b'L', b'V', 0x01, 0x05, 0x00, 0x00, 0x00, 0x09, // header
//!     0x00, 0x00, 0x00, 0x00, // PreviousTagSize0
//! ]);
//!
//! let file = FlvFile::demux(data)?;
//!
//! assert!(file.header.has_audio);
//! assert!(file.header.has_video);
//! assert!(file.tags.is_empty());
//! # Ok(())
//! # }
//! # test().expect("demux failed");
//! ```
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(unsafe_code)]

pub mod audio;
mod cursor;
pub mod error;
pub mod file;
pub mod header;
pub mod script;
pub mod stream;
pub mod tag;
pub mod video;

pub use crate::error::FlvError;
pub use crate::file::FlvFile;
pub use crate::header::FlvHeader;
pub use crate::stream::FlvTagStream;
pub use crate::tag::{FlvTag, FlvTagData, FlvTagType};
