use std::fmt;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;

use crate::audio::AudioSummary;
use crate::cursor::BytesCursorExt;
use crate::script::ScriptData;
use crate::video::VideoSummary;

// Excerpt cap for tag types nothing here knows how to decode.
const UNKNOWN_EXCERPT_CAP: usize = 25;

/// One FLV tag: the 11 byte tag header plus the classified payload.
///
/// Tags have different types and thus different payload structures; the
/// [`FlvTagData`] enum accommodates this. Encrypted files use tag types
/// outside the known three, which land in [`FlvTagData::Unknown`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlvTag {
    /// Byte position of the tag header in the source buffer
    pub offset: u64,
    pub tag_type: FlvTagType,
    /// Payload size in bytes, as declared by the tag header
    pub data_size: u32,
    /// A timestamp in milliseconds
    pub timestamp_ms: u32,
    /// A stream id, 0 in every known file
    pub stream_id: u32,
    pub data: FlvTagData,
}

impl FlvTag {
    /// Demux one FLV tag from the given reader.
    ///
    /// The reader is left right after the payload, in front of the trailing
    /// PreviousTagSize field. Fails when the buffer cannot hold the declared
    /// payload.
    ///
    /// The reader needs to be a [`std::io::Cursor`] with a [`Bytes`] buffer
    /// because we take advantage of zero-copy reading.
    pub fn demux(reader: &mut std::io::Cursor<Bytes>) -> std::io::Result<Self> {
        let offset = reader.position();

        let tag_type = FlvTagType::from(reader.read_u8()?);

        let data_size = reader.read_u24::<BigEndian>()?;
        // The timestamp is 24 bits plus an extension byte that forms bits
        // 24-31 of a 32 bit number.
        let timestamp_ms = reader.read_u24::<BigEndian>()? | ((reader.read_u8()? as u32) << 24);

        // The stream id according to the spec is ALWAYS 0.
        let stream_id = reader.read_u24::<BigEndian>()?;

        let data = reader.extract_bytes(data_size as usize)?;
        let data = FlvTagData::demux(tag_type, &mut std::io::Cursor::new(data));

        Ok(FlvTag {
            offset,
            tag_type,
            data_size,
            timestamp_ms,
            stream_id,
            data,
        })
    }
}

impl fmt::Display for FlvTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] 0x{:08X}, {} ms, {} bytes: {}",
            self.tag_type, self.offset, self.timestamp_ms, self.data_size, self.data
        )
    }
}

/// FLV tag type byte.
///
/// The three assigned types are Audio (8), Video (9) and ScriptData (18);
/// everything else is carried as [`FlvTagType::Unknown`].
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum FlvTagType {
    Audio = 8,
    Video = 9,
    ScriptData = 18,
    Unknown(u8),
}

impl From<u8> for FlvTagType {
    fn from(value: u8) -> Self {
        match value {
            8 => FlvTagType::Audio,
            9 => FlvTagType::Video,
            18 => FlvTagType::ScriptData,
            _ => FlvTagType::Unknown(value),
        }
    }
}

impl fmt::Display for FlvTagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlvTagType::Audio => write!(f, "Audio"),
            FlvTagType::Video => write!(f, "Video"),
            FlvTagType::ScriptData => write!(f, "Script Data"),
            FlvTagType::Unknown(value) => write!(f, "Unknown ({})", value),
        }
    }
}

/// The classified payload of an FLV tag.
#[derive(Debug, Clone, PartialEq)]
pub enum FlvTagData {
    /// Audio summary when the tag type is Audio (8)
    Audio(AudioSummary),
    /// Video summary when the tag type is Video (9)
    Video(VideoSummary),
    /// Script data when the tag type is ScriptData (18)
    Script(ScriptData),
    /// Any tag type nothing here knows how to decode, kept as a capped
    /// excerpt of the payload. Also used for empty audio/video payloads.
    Unknown { excerpt: Bytes },
}

impl FlvTagData {
    /// Classify a tag payload.
    ///
    /// Never fails: payloads that cannot be decoded are kept as excerpts.
    ///
    /// The reader needs to be a [`std::io::Cursor`] with a [`Bytes`] buffer
    /// because we take advantage of zero-copy reading.
    pub fn demux(tag_type: FlvTagType, reader: &mut std::io::Cursor<Bytes>) -> Self {
        match tag_type {
            FlvTagType::Audio => match AudioSummary::demux(reader) {
                Ok(audio) => FlvTagData::Audio(audio),
                // An empty payload has no flags byte to decode
                Err(_) => FlvTagData::Unknown {
                    excerpt: Bytes::new(),
                },
            },
            FlvTagType::Video => match VideoSummary::demux(reader) {
                Ok(video) => FlvTagData::Video(video),
                Err(_) => FlvTagData::Unknown {
                    excerpt: Bytes::new(),
                },
            },
            FlvTagType::ScriptData => FlvTagData::Script(ScriptData::demux(reader)),
            FlvTagType::Unknown(_) => FlvTagData::Unknown {
                excerpt: reader.extract_capped(UNKNOWN_EXCERPT_CAP),
            },
        }
    }
}

impl fmt::Display for FlvTagData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlvTagData::Audio(audio) => write!(f, "{}", audio),
            FlvTagData::Video(video) => write!(f, "{}", video),
            FlvTagData::Script(script_data) => write!(f, "{}", script_data),
            FlvTagData::Unknown { excerpt } if excerpt.is_empty() => write!(f, "no data"),
            FlvTagData::Unknown { excerpt } => write!(f, "data: {}", hex::encode(excerpt)),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::io::Cursor;

    use byteorder::{BigEndian, WriteBytesExt};
    use bytes::Bytes;

    use crate::audio::{AacPacket, AudioBody};
    use crate::script::ScriptData;
    use crate::tag::{FlvTag, FlvTagData, FlvTagType};
    use crate::video::{AvcPacket, VideoBody};

    fn build_tag(tag_type: u8, timestamp: u32, payload: &[u8]) -> Bytes {
        let mut buffer = vec![];
        buffer.write_u8(tag_type).unwrap();
        buffer.write_u24::<BigEndian>(payload.len() as u32).unwrap();
        buffer.write_u24::<BigEndian>(timestamp & 0x00FF_FFFF).unwrap();
        buffer.write_u8((timestamp >> 24) as u8).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.extend_from_slice(payload);
        Bytes::from(buffer)
    }

    #[test]
    fn test_demux_audio_tag() {
        let mut reader = Cursor::new(build_tag(8, 40, &[0xAF, 0x00, 0x12, 0x10]));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.offset, 0);
        assert_eq!(tag.tag_type, FlvTagType::Audio);
        assert_eq!(tag.data_size, 4);
        assert_eq!(tag.timestamp_ms, 40);
        assert_eq!(tag.stream_id, 0);
        match tag.data {
            FlvTagData::Audio(audio) => {
                assert_eq!(audio.body, AudioBody::Aac(AacPacket::SequenceHeader));
            }
            other => panic!("expected audio data, got {:?}", other),
        }
        // Cursor sits on the trailing PreviousTagSize position
        assert_eq!(reader.position(), 15);
    }

    #[test]
    fn test_demux_video_tag() {
        let mut reader = Cursor::new(build_tag(9, 0, &[0x17, 0x01, 0x00, 0x00, 0x00, 0x99]));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.tag_type, FlvTagType::Video);
        match tag.data {
            FlvTagData::Video(video) => {
                assert_eq!(
                    video.body,
                    VideoBody::Avc(AvcPacket::Nalu {
                        composition_time: 0,
                        excerpt: Bytes::from_static(&[0x99]),
                    })
                );
            }
            other => panic!("expected video data, got {:?}", other),
        }
    }

    #[test]
    fn test_demux_script_tag() {
        let mut payload = vec![
            0x02, 0x00, 0x0A, b'o', b'n', b'M', b'e', b't', b'a', b'D', b'a', b't', b'a',
        ];
        // Empty object: terminator only
        payload.extend_from_slice(&[0x03, 0x00, 0x00, 0x09]);

        let mut reader = Cursor::new(build_tag(18, 0, &payload));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.tag_type, FlvTagType::ScriptData);
        assert!(matches!(
            tag.data,
            FlvTagData::Script(ScriptData::OnMetaData(_))
        ));
    }

    #[test]
    fn test_timestamp_extension_byte() {
        // 24 low bits all set plus extension 0x7F
        let mut buffer = vec![];
        buffer.write_u8(8).unwrap();
        buffer.write_u24::<BigEndian>(1).unwrap();
        buffer.write_u24::<BigEndian>(0xFF_FFFF).unwrap();
        buffer.write_u8(0x7F).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.push(0xAF);

        let mut reader = Cursor::new(Bytes::from(buffer));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.timestamp_ms, 0x7FFF_FFFF);
    }

    #[test]
    fn test_demux_unknown_tag_type() {
        let payload: Vec<u8> = (0..40).collect();
        let mut reader = Cursor::new(build_tag(0x0A, 0, &payload));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.tag_type, FlvTagType::Unknown(10));
        match tag.data {
            FlvTagData::Unknown { excerpt } => {
                assert_eq!(excerpt.len(), 25);
                assert_eq!(excerpt[24], 24);
            }
            other => panic!("expected unknown data, got {:?}", other),
        }
    }

    #[test]
    fn test_demux_empty_audio_payload() {
        let mut reader = Cursor::new(build_tag(8, 0, &[]));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(tag.data_size, 0);
        assert_eq!(
            tag.data,
            FlvTagData::Unknown {
                excerpt: Bytes::new(),
            }
        );
    }

    #[test]
    fn test_demux_truncated_payload() {
        // Declares 10 payload bytes but only carries 2
        let mut buffer = vec![];
        buffer.write_u8(8).unwrap();
        buffer.write_u24::<BigEndian>(10).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.write_u8(0).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.extend_from_slice(&[0xAF, 0x00]);

        let mut reader = Cursor::new(Bytes::from(buffer));
        assert!(FlvTag::demux(&mut reader).is_err());
    }

    #[test]
    fn test_tag_type_from_byte() {
        let cases = [
            (8u8, FlvTagType::Audio, "Audio"),
            (9, FlvTagType::Video, "Video"),
            (18, FlvTagType::ScriptData, "Script Data"),
            (0, FlvTagType::Unknown(0), "Unknown (0)"),
            (20, FlvTagType::Unknown(20), "Unknown (20)"),
        ];

        for (value, expected, display) in cases {
            assert_eq!(FlvTagType::from(value), expected);
            assert_eq!(expected.to_string(), display);
        }
    }

    #[test]
    fn test_display() {
        let mut reader = Cursor::new(build_tag(8, 40, &[0xAF, 0x00]));
        let tag = FlvTag::demux(&mut reader).unwrap();

        assert_eq!(
            tag.to_string(),
            "[Audio] 0x00000000, 40 ms, 2 bytes: AAC, 44 kHz, 16-bit, Stereo, Sequence Header"
        );
    }
}
