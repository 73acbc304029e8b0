use std::fmt;
use std::io;

use byteorder::ReadBytesExt;
use bytes::Bytes;

use crate::cursor::BytesCursorExt;

// Raw AAC excerpts start at payload offset 2 and stop at offset 20.
const AAC_EXCERPT_CAP: usize = 18;
// Other formats: excerpts start at offset 1 and stop at offset 20.
const BODY_EXCERPT_CAP: usize = 19;

/// Sound format, bits 7-4 of the flags byte.
///
/// The table comes straight out of the FLV file format spec; 12 and 13 have
/// never been assigned and fall through to [`SoundFormat::Unknown`].
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum SoundFormat {
    Lpcm = 0,
    Adpcm = 1,
    Mp3 = 2,
    LpcmLe = 3,
    Nellymoser16khz = 4,
    Nellymoser8khz = 5,
    Nellymoser = 6,
    G711ALaw = 7,
    G711MuLaw = 8,
    Reserved = 9,
    Aac = 10,
    Speex = 11,
    Mp38khz = 14,
    DeviceSpecific = 15,
    Unknown(u8),
}

impl From<u8> for SoundFormat {
    fn from(value: u8) -> Self {
        match value {
            0 => SoundFormat::Lpcm,
            1 => SoundFormat::Adpcm,
            2 => SoundFormat::Mp3,
            3 => SoundFormat::LpcmLe,
            4 => SoundFormat::Nellymoser16khz,
            5 => SoundFormat::Nellymoser8khz,
            6 => SoundFormat::Nellymoser,
            7 => SoundFormat::G711ALaw,
            8 => SoundFormat::G711MuLaw,
            9 => SoundFormat::Reserved,
            10 => SoundFormat::Aac,
            11 => SoundFormat::Speex,
            14 => SoundFormat::Mp38khz,
            15 => SoundFormat::DeviceSpecific,
            _ => SoundFormat::Unknown(value),
        }
    }
}

impl fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundFormat::Lpcm => write!(f, "LPCM"),
            SoundFormat::Adpcm => write!(f, "ADPCM"),
            SoundFormat::Mp3 => write!(f, "MP3"),
            SoundFormat::LpcmLe => write!(f, "LPCM LE"),
            SoundFormat::Nellymoser16khz => write!(f, "Nellymoser 16kHz"),
            SoundFormat::Nellymoser8khz => write!(f, "Nellymoser 8kHz"),
            SoundFormat::Nellymoser => write!(f, "Nellymoser"),
            SoundFormat::G711ALaw => write!(f, "G.711 A-law"),
            SoundFormat::G711MuLaw => write!(f, "G.711 mu-law"),
            SoundFormat::Reserved => write!(f, "reserved"),
            SoundFormat::Aac => write!(f, "AAC"),
            SoundFormat::Speex => write!(f, "Speex"),
            SoundFormat::Mp38khz => write!(f, "MP3 8kHz"),
            SoundFormat::DeviceSpecific => write!(f, "Device-specific"),
            SoundFormat::Unknown(value) => write!(f, "Unknown ({})", value),
        }
    }
}

/// Sample rate, bits 3-2 of the flags byte.
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum SoundRate {
    Hz5512 = 0,
    Hz11025 = 1,
    Hz22050 = 2,
    Hz44100 = 3,
}

impl From<u8> for SoundRate {
    fn from(value: u8) -> Self {
        // Two bits, the match is total over them.
        match value & 0b11 {
            0 => SoundRate::Hz5512,
            1 => SoundRate::Hz11025,
            2 => SoundRate::Hz22050,
            _ => SoundRate::Hz44100,
        }
    }
}

impl fmt::Display for SoundRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundRate::Hz5512 => write!(f, "5.5 kHz"),
            SoundRate::Hz11025 => write!(f, "11 kHz"),
            SoundRate::Hz22050 => write!(f, "22 kHz"),
            SoundRate::Hz44100 => write!(f, "44 kHz"),
        }
    }
}

/// Sample size, bit 1 of the flags byte.
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum SoundSize {
    Bits8 = 0,
    Bits16 = 1,
}

impl From<u8> for SoundSize {
    fn from(value: u8) -> Self {
        match value & 0b1 {
            0 => SoundSize::Bits8,
            _ => SoundSize::Bits16,
        }
    }
}

impl fmt::Display for SoundSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundSize::Bits8 => write!(f, "8-bit"),
            SoundSize::Bits16 => write!(f, "16-bit"),
        }
    }
}

/// Channel layout, bit 0 of the flags byte.
#[repr(u8)]
#[derive(Debug, Clone, PartialEq, Copy)]
pub enum SoundType {
    Mono = 0,
    Stereo = 1,
}

impl From<u8> for SoundType {
    fn from(value: u8) -> Self {
        match value & 0b1 {
            0 => SoundType::Mono,
            _ => SoundType::Stereo,
        }
    }
}

impl fmt::Display for SoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundType::Mono => write!(f, "Mono"),
            SoundType::Stereo => write!(f, "Stereo"),
        }
    }
}

/// What an audio tag carries, split out of the flags byte and the first
/// bytes of the body.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSummary {
    pub sound_format: SoundFormat,
    // bits 3-2
    pub sound_rate: SoundRate,
    // bit 1
    pub sound_size: SoundSize,
    // bit 0
    pub sound_type: SoundType,
    pub body: AudioBody,
}

/// The body behind the flags byte.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioBody {
    /// AAC carries a packet type byte before the data.
    Aac(AacPacket),
    /// Every other format: a short excerpt of the data, possibly empty.
    Other { excerpt: Bytes },
}

/// An AAC body, split on the packet type byte FLV puts before the data.
#[derive(Debug, Clone, PartialEq)]
pub enum AacPacket {
    /// Packet type 0, the AudioSpecificConfig.
    SequenceHeader,
    /// Any other packet type: raw AAC frame data.
    Raw { excerpt: Bytes },
}

impl AudioSummary {
    /// Splits the flags byte and classifies the body behind it.
    ///
    /// Fails only when the payload is completely empty; everything past the
    /// flags byte is optional and simply stays undecoded when missing.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> io::Result<Self> {
        let byte = reader.read_u8()?;

        // Extract bits 7-4 for sound format
        const SOUND_FORMAT_MASK: u8 = 0b11110000;
        const SOUND_FORMAT_SHIFT: u8 = 4;
        let sound_format = SoundFormat::from((byte & SOUND_FORMAT_MASK) >> SOUND_FORMAT_SHIFT);
        // Extract bits 3-2 for sound rate
        const SOUND_RATE_MASK: u8 = 0b00001100;
        const SOUND_RATE_SHIFT: u8 = 2;
        let sound_rate = SoundRate::from((byte & SOUND_RATE_MASK) >> SOUND_RATE_SHIFT);
        // Extract bit 1 for sound size
        const SOUND_SIZE_MASK: u8 = 0b00000010;
        const SOUND_SIZE_SHIFT: u8 = 1;
        let sound_size = SoundSize::from((byte & SOUND_SIZE_MASK) >> SOUND_SIZE_SHIFT);
        // Extract bit 0 for sound type
        const SOUND_TYPE_MASK: u8 = 0b00000001;
        let sound_type = SoundType::from(byte & SOUND_TYPE_MASK);

        let body = AudioBody::demux(sound_format, reader);

        Ok(AudioSummary {
            sound_format,
            sound_rate,
            sound_size,
            sound_type,
            body,
        })
    }
}

impl AudioBody {
    fn demux(sound_format: SoundFormat, reader: &mut io::Cursor<Bytes>) -> Self {
        match sound_format {
            SoundFormat::Aac => match reader.read_u8() {
                Ok(packet_type) => AudioBody::Aac(AacPacket::demux(packet_type, reader)),
                // Flags byte only: the format is known but the packet is not.
                Err(_) => AudioBody::Other {
                    excerpt: Bytes::new(),
                },
            },
            _ => AudioBody::Other {
                excerpt: reader.extract_capped(BODY_EXCERPT_CAP),
            },
        }
    }
}

impl AacPacket {
    fn demux(packet_type: u8, reader: &mut io::Cursor<Bytes>) -> Self {
        match packet_type {
            0 => AacPacket::SequenceHeader,
            _ => AacPacket::Raw {
                excerpt: reader.extract_capped(AAC_EXCERPT_CAP),
            },
        }
    }
}

impl fmt::Display for AudioSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.sound_format, self.sound_rate, self.sound_size, self.sound_type
        )?;
        match &self.body {
            AudioBody::Aac(packet) => write!(f, ", {}", packet),
            AudioBody::Other { excerpt } if excerpt.is_empty() => Ok(()),
            AudioBody::Other { excerpt } => write!(f, ", data: {}", hex::encode(excerpt)),
        }
    }
}

impl fmt::Display for AacPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AacPacket::SequenceHeader => write!(f, "Sequence Header"),
            AacPacket::Raw { excerpt } if excerpt.is_empty() => write!(f, "Raw"),
            AacPacket::Raw { excerpt } => write!(f, "Raw, data: {}", hex::encode(excerpt)),
        }
    }
}
