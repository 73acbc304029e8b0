use std::fmt::Display;
use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;

use crate::cursor::BytesCursorExt;
use crate::error::FlvError;

/// Size of the fixed FLV file header in bytes.
pub const FLV_HEADER_SIZE: usize = 9;

// 'FLV' read as a big-endian 24-bit value.
const FLV_SIGNATURE: u32 = 0x464C56;

// Struct representing the FLV header, 9 bytes in total
#[derive(Debug, Clone, PartialEq)]
pub struct FlvHeader {
    // The signature of the FLV file, 3 bytes, always 'FLV'
    pub signature: u32,
    // The version of the FLV file format, 1 byte, usually 0x01
    pub version: u8,
    // Whether the file declares audio data (flag bit 2)
    pub has_audio: bool,
    // Whether the file declares video data (flag bit 0)
    pub has_video: bool,
    // Where the tag stream starts, 4 bytes. Normally 9 but honored as given.
    pub data_offset: u32,
}

impl Display for FlvHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FLV version {} (audio: {}, video: {}, data offset: {})",
            self.version, self.has_audio, self.has_video, self.data_offset
        )
    }
}

impl FlvHeader {
    /// Parses the FLV header from the start of the byte stream.
    ///
    /// The reader is left right behind the 9 header bytes. `data_offset` is
    /// not validated against the standard value of 9; callers seek to it
    /// themselves before walking tags.
    ///
    /// The reader needs to be a [`std::io::Cursor`] with a [`Bytes`] buffer
    /// because we take advantage of zero-copy reading.
    pub fn parse(reader: &mut io::Cursor<Bytes>) -> Result<Self, FlvError> {
        let len = reader.remaining_len();
        if len < FLV_HEADER_SIZE {
            return Err(FlvError::TooSmall { len });
        }

        // Signature is a 3-byte string 'FLV'
        let signature = reader.read_u24::<BigEndian>()?;
        if signature != FLV_SIGNATURE {
            return Err(FlvError::InvalidSignature {
                found: [
                    (signature >> 16) as u8,
                    (signature >> 8) as u8,
                    signature as u8,
                ],
            });
        }

        // Version is a 1-byte value
        let version = reader.read_u8()?;
        // Flags is a 1-byte value
        let flags = reader.read_u8()?;
        let has_audio = flags & 0b00000100 != 0;
        let has_video = flags & 0b00000001 != 0;

        // Data offset is a 4-byte value
        let data_offset = reader.read_u32::<BigEndian>()?;

        Ok(FlvHeader {
            signature,
            version,
            has_audio,
            has_video,
            data_offset,
        })
    }
}
