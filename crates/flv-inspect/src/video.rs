use std::fmt;
use std::io;

use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;

use crate::cursor::BytesCursorExt;

// AVC excerpts start at payload offset 5 and stop at offset 25.
const AVC_EXCERPT_CAP: usize = 20;
// Everything else: excerpts start at offset 1 and stop at offset 20.
const BODY_EXCERPT_CAP: usize = 19;

/// Frame type, bits 7-4 of the flags byte.
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum VideoFrameType {
    KeyFrame = 1,
    InterFrame = 2,
    DisposableInterFrame = 3,
    GeneratedKeyFrame = 4,
    VideoInfoFrame = 5,
    Unknown(u8),
}

impl From<u8> for VideoFrameType {
    fn from(value: u8) -> Self {
        match value {
            1 => VideoFrameType::KeyFrame,
            2 => VideoFrameType::InterFrame,
            3 => VideoFrameType::DisposableInterFrame,
            4 => VideoFrameType::GeneratedKeyFrame,
            5 => VideoFrameType::VideoInfoFrame,
            _ => VideoFrameType::Unknown(value),
        }
    }
}

impl fmt::Display for VideoFrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoFrameType::KeyFrame => write!(f, "Key frame"),
            VideoFrameType::InterFrame => write!(f, "Inter frame"),
            VideoFrameType::DisposableInterFrame => write!(f, "Disposable inter frame"),
            VideoFrameType::GeneratedKeyFrame => write!(f, "Generated key frame"),
            VideoFrameType::VideoInfoFrame => write!(f, "Video info/command frame"),
            VideoFrameType::Unknown(value) => write!(f, "Unknown ({})", value),
        }
    }
}

/// Codec id, bits 3-0 of the flags byte.
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum VideoCodec {
    Reserved = 0,
    Jpeg = 1,
    SorensonH263 = 2,
    ScreenVideo = 3,
    On2Vp6 = 4,
    On2Vp6Alpha = 5,
    ScreenVideo2 = 6,
    Avc = 7,
    Unknown(u8),
}

impl From<u8> for VideoCodec {
    fn from(value: u8) -> Self {
        match value {
            0 => VideoCodec::Reserved,
            1 => VideoCodec::Jpeg,
            2 => VideoCodec::SorensonH263,
            3 => VideoCodec::ScreenVideo,
            4 => VideoCodec::On2Vp6,
            5 => VideoCodec::On2Vp6Alpha,
            6 => VideoCodec::ScreenVideo2,
            7 => VideoCodec::Avc,
            _ => VideoCodec::Unknown(value),
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoCodec::Reserved => write!(f, "Reserved"),
            VideoCodec::Jpeg => write!(f, "JPEG (currently unused)"),
            VideoCodec::SorensonH263 => write!(f, "Sorenson H.263"),
            VideoCodec::ScreenVideo => write!(f, "Screen video"),
            VideoCodec::On2Vp6 => write!(f, "On2 VP6"),
            VideoCodec::On2Vp6Alpha => write!(f, "On2 VP6 with alpha"),
            VideoCodec::ScreenVideo2 => write!(f, "Screen video v2"),
            VideoCodec::Avc => write!(f, "AVC (H.264)"),
            VideoCodec::Unknown(value) => write!(f, "Unknown ({})", value),
        }
    }
}

/// What a video tag carries, split out of the flags byte and the AVC
/// sub-header where one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSummary {
    // bits 7-4
    pub frame_type: VideoFrameType,
    // bits 3-0
    pub codec: VideoCodec,
    pub body: VideoBody,
}

/// The body behind the flags byte.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoBody {
    /// AVC carries a packet type byte and a composition time offset.
    Avc(AvcPacket),
    /// Any other codec, or an AVC payload too short for its sub-header.
    Other { excerpt: Bytes },
}

/// An AVC body, split on the packet type byte.
///
/// The composition time is the signed offset between decode and display
/// order; `0xFFFFFF` on the wire is -1 ms.
#[derive(Debug, Clone, PartialEq)]
pub enum AvcPacket {
    /// Packet type 0, the AVCDecoderConfigurationRecord.
    SequenceHeader { composition_time: i32 },
    /// Packet type 1, one or more NAL units.
    Nalu {
        composition_time: i32,
        excerpt: Bytes,
    },
    /// Packet type 2, the end-of-sequence marker.
    EndOfSequence {
        composition_time: i32,
        excerpt: Bytes,
    },
    /// Any other packet type.
    Unknown {
        packet_type: u8,
        composition_time: i32,
        excerpt: Bytes,
    },
}

impl VideoSummary {
    /// Splits the flags byte and classifies the body behind it.
    ///
    /// Fails only when the payload is completely empty.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let byte = reader.read_u8()?;

        // Extract bits 7-4 for frame type
        const FRAME_TYPE_MASK: u8 = 0b11110000;
        const FRAME_TYPE_SHIFT: u8 = 4;
        let frame_type = VideoFrameType::from((byte & FRAME_TYPE_MASK) >> FRAME_TYPE_SHIFT);
        // Extract bits 3-0 for codec id
        const CODEC_MASK: u8 = 0b00001111;
        let codec = VideoCodec::from(byte & CODEC_MASK);

        let body = VideoBody::demux(codec, reader);

        Ok(VideoSummary {
            frame_type,
            codec,
            body,
        })
    }
}

impl VideoBody {
    fn demux(codec: VideoCodec, reader: &mut io::Cursor<Bytes>) -> Self {
        // Packet type byte plus the 3-byte composition time.
        const AVC_SUB_HEADER_SIZE: usize = 4;

        if codec == VideoCodec::Avc && reader.remaining_len() >= AVC_SUB_HEADER_SIZE {
            if let Ok(packet) = AvcPacket::demux(reader) {
                return VideoBody::Avc(packet);
            }
        }

        // Short AVC payloads land here too, keeping whatever bytes exist.
        VideoBody::Other {
            excerpt: reader.extract_capped(BODY_EXCERPT_CAP),
        }
    }
}

impl AvcPacket {
    fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let packet_type = reader.read_u8()?;
        let composition_time = reader.read_i24::<BigEndian>()?;

        Ok(match packet_type {
            0 => AvcPacket::SequenceHeader { composition_time },
            1 => AvcPacket::Nalu {
                composition_time,
                excerpt: reader.extract_capped(AVC_EXCERPT_CAP),
            },
            2 => AvcPacket::EndOfSequence {
                composition_time,
                excerpt: reader.extract_capped(AVC_EXCERPT_CAP),
            },
            _ => AvcPacket::Unknown {
                packet_type,
                composition_time,
                excerpt: reader.extract_capped(AVC_EXCERPT_CAP),
            },
        })
    }
}

fn write_excerpt(f: &mut fmt::Formatter<'_>, excerpt: &Bytes) -> fmt::Result {
    if excerpt.is_empty() {
        Ok(())
    } else {
        write!(f, ", data: {}", hex::encode(excerpt))
    }
}

impl fmt::Display for VideoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.frame_type, self.codec)?;
        match &self.body {
            VideoBody::Avc(packet) => write!(f, ", {}", packet),
            VideoBody::Other { excerpt } => write_excerpt(f, excerpt),
        }
    }
}

impl fmt::Display for AvcPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvcPacket::SequenceHeader { composition_time } => {
                write!(f, "Seq. header, CTS: {} ms", composition_time)
            }
            AvcPacket::Nalu {
                composition_time,
                excerpt,
            } => {
                write!(f, "NALU, CTS: {} ms", composition_time)?;
                write_excerpt(f, excerpt)
            }
            AvcPacket::EndOfSequence {
                composition_time,
                excerpt,
            } => {
                write!(f, "End of seq., CTS: {} ms", composition_time)?;
                write_excerpt(f, excerpt)
            }
            AvcPacket::Unknown {
                packet_type,
                composition_time,
                excerpt,
            } => {
                write!(f, "Unknown ({}), CTS: {} ms", packet_type, composition_time)?;
                write_excerpt(f, excerpt)
            }
        }
    }
}
