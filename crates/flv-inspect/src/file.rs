use std::fmt;
use std::io;

use amf0::Amf0Value;
use bytes::Bytes;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::script::ScriptData;
use crate::stream::FlvTagStream;
use crate::tag::{FlvTag, FlvTagData};

/// A fully decoded FLV container: header, tags in file order, and the
/// merged `onMetaData` metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvFile {
    pub header: FlvHeader,
    pub tags: Vec<FlvTag>,
    /// Merged `onMetaData` pairs. Later tags overwrite earlier values for
    /// the same key; keys keep their first-insertion order.
    pub metadata: Vec<(String, Amf0Value<'static>)>,
}

impl FlvFile {
    /// Demux a whole FLV file from an in-memory buffer.
    ///
    /// Only the 9 byte header can fail; the tag walk behind it is
    /// best-effort and stops at the first structural break. Demuxing the
    /// same buffer twice yields the same value.
    pub fn demux(data: Bytes) -> Result<Self, FlvError> {
        let mut reader = io::Cursor::new(data);
        let header = FlvHeader::parse(&mut reader)?;

        let stream = FlvTagStream::new(reader.into_inner(), header.data_offset as u64);
        let tags: Vec<FlvTag> = stream.collect();

        let metadata = merge_metadata(&tags);

        Ok(FlvFile {
            header,
            tags,
            metadata,
        })
    }
}

/// Folds every `onMetaData` tag in file order into one key/value list.
///
/// Only `Object` and `EcmaArray` values contribute pairs; other shapes are
/// skipped. A later value for an existing key overwrites it in place, so
/// the key order is decided by first insertion.
fn merge_metadata(tags: &[FlvTag]) -> Vec<(String, Amf0Value<'static>)> {
    let mut metadata: Vec<(String, Amf0Value<'static>)> = Vec::new();

    for tag in tags {
        if let FlvTagData::Script(ScriptData::OnMetaData(value)) = &tag.data {
            let properties = match value {
                Amf0Value::Object(properties) => properties.as_ref(),
                Amf0Value::EcmaArray { properties, .. } => properties.as_ref(),
                _ => continue,
            };

            for (key, value) in properties {
                match metadata.iter_mut().find(|(k, _)| k == key.as_ref()) {
                    Some(entry) => entry.1 = value.clone(),
                    None => metadata.push((key.to_string(), value.clone())),
                }
            }
        }
    }

    metadata
}

impl fmt::Display for FlvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for tag in &self.tags {
            writeln!(f, "{}", tag)?;
        }
        if !self.metadata.is_empty() {
            writeln!(f, "Metadata:")?;
            for (key, value) in &self.metadata {
                writeln!(f, "  {}: {}", key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::borrow::Cow;

    use amf0::{Amf0Encoder, Amf0Value};
    use byteorder::{BigEndian, WriteBytesExt};
    use bytes::Bytes;

    use crate::error::FlvError;
    use crate::file::FlvFile;
    use crate::script::ScriptData;
    use crate::tag::{FlvTagData, FlvTagType};
    use crate::video::{AvcPacket, VideoBody, VideoCodec, VideoFrameType};

    fn file_head(flags: u8, data_offset: u32) -> Vec<u8> {
        let mut buffer = vec![];
        buffer.extend_from_slice(b"FLV");
        buffer.push(0x01);
        buffer.push(flags);
        buffer.write_u32::<BigEndian>(data_offset).unwrap();
        // PreviousTagSize0
        buffer.write_u32::<BigEndian>(0).unwrap();
        buffer
    }

    fn write_tag(buffer: &mut Vec<u8>, tag_type: u8, timestamp: u32, payload: &[u8]) {
        buffer.write_u8(tag_type).unwrap();
        buffer.write_u24::<BigEndian>(payload.len() as u32).unwrap();
        buffer.write_u24::<BigEndian>(timestamp & 0x00FF_FFFF).unwrap();
        buffer.write_u8((timestamp >> 24) as u8).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.extend_from_slice(payload);
        buffer.write_u32::<BigEndian>(11 + payload.len() as u32).unwrap();
    }

    fn on_metadata_payload(properties: &[(Cow<'_, str>, Amf0Value<'_>)]) -> Vec<u8> {
        let mut payload = Vec::new();
        Amf0Encoder::encode_string(&mut payload, "onMetaData").unwrap();
        Amf0Encoder::encode_ecma_array(&mut payload, properties.len() as u32, properties).unwrap();
        payload
    }

    #[test]
    fn test_demux_full_file() {
        let mut buffer = file_head(0b00000101, 9);

        let script = on_metadata_payload(&[
            (Cow::Borrowed("duration"), Amf0Value::Number(12.5)),
            (Cow::Borrowed("framerate"), Amf0Value::Number(30.0)),
        ]);
        write_tag(&mut buffer, 18, 0, &script);
        write_tag(&mut buffer, 9, 0, &[0x17, 0x01, 0x00, 0x00, 0x00, 0x65]);
        write_tag(&mut buffer, 8, 23, &[0xAF, 0x01, 0x21]);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        assert_eq!(file.header.version, 1);
        assert!(file.header.has_audio);
        assert!(file.header.has_video);

        assert_eq!(file.tags.len(), 3);
        assert_eq!(file.tags[0].tag_type, FlvTagType::ScriptData);
        assert_eq!(file.tags[1].tag_type, FlvTagType::Video);
        assert_eq!(file.tags[2].tag_type, FlvTagType::Audio);
        assert_eq!(file.tags[2].timestamp_ms, 23);

        match &file.tags[1].data {
            FlvTagData::Video(video) => {
                assert_eq!(video.frame_type, VideoFrameType::KeyFrame);
                assert_eq!(video.codec, VideoCodec::Avc);
                assert!(matches!(
                    video.body,
                    VideoBody::Avc(AvcPacket::Nalu {
                        composition_time: 0,
                        ..
                    })
                ));
            }
            other => panic!("expected video data, got {:?}", other),
        }

        assert_eq!(
            file.metadata,
            vec![
                ("duration".to_string(), Amf0Value::Number(12.5)),
                ("framerate".to_string(), Amf0Value::Number(30.0)),
            ]
        );
    }

    #[test]
    fn test_demux_too_small() {
        let cases: [&[u8]; 3] = [b"", b"FLV", b"FLV\x01\x05"];

        for buffer in cases {
            match FlvFile::demux(Bytes::copy_from_slice(buffer)) {
                Err(FlvError::TooSmall { len }) => assert_eq!(len, buffer.len()),
                other => panic!("expected TooSmall, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_demux_invalid_signature() {
        let mut buffer = b"MP4".to_vec();
        buffer.extend_from_slice(&[0x01, 0x05, 0x00, 0x00, 0x00, 0x09]);

        match FlvFile::demux(Bytes::from(buffer)) {
            Err(FlvError::InvalidSignature { found }) => assert_eq!(&found, b"MP4"),
            other => panic!("expected InvalidSignature, got {:?}", other),
        }
    }

    #[test]
    fn test_demux_is_deterministic() {
        let mut buffer = file_head(0b00000101, 9);
        let script =
            on_metadata_payload(&[(Cow::Borrowed("duration"), Amf0Value::Number(7.25))]);
        write_tag(&mut buffer, 18, 0, &script);
        write_tag(&mut buffer, 8, 0, &[0xAF, 0x00, 0x12, 0x10]);

        let data = Bytes::from(buffer);
        let first = FlvFile::demux(data.clone()).unwrap();
        let second = FlvFile::demux(data).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_metadata_last_write_wins() {
        let mut buffer = file_head(0b00000100, 9);

        let first = on_metadata_payload(&[
            (Cow::Borrowed("duration"), Amf0Value::Number(1.0)),
            (Cow::Borrowed("width"), Amf0Value::Number(640.0)),
        ]);
        let second = on_metadata_payload(&[
            (Cow::Borrowed("duration"), Amf0Value::Number(2.0)),
            (Cow::Borrowed("height"), Amf0Value::Number(480.0)),
        ]);
        write_tag(&mut buffer, 18, 0, &first);
        write_tag(&mut buffer, 18, 0, &second);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        // duration keeps its slot but takes the later value
        assert_eq!(
            file.metadata,
            vec![
                ("duration".to_string(), Amf0Value::Number(2.0)),
                ("width".to_string(), Amf0Value::Number(640.0)),
                ("height".to_string(), Amf0Value::Number(480.0)),
            ]
        );
    }

    #[test]
    fn test_metadata_skips_non_map_shapes() {
        let mut buffer = file_head(0b00000100, 9);

        let mut payload = Vec::new();
        Amf0Encoder::encode_string(&mut payload, "onMetaData").unwrap();
        Amf0Encoder::encode_number(&mut payload, 42.0).unwrap();
        write_tag(&mut buffer, 18, 0, &payload);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        assert_eq!(file.tags.len(), 1);
        assert!(file.metadata.is_empty());
    }

    #[test]
    fn test_truncated_last_tag_is_dropped() {
        let mut buffer = file_head(0b00000101, 9);
        write_tag(&mut buffer, 8, 0, &[0xAF, 0x00, 0x12, 0x10]);
        // Declares 50 payload bytes, delivers 2
        buffer.write_u8(9).unwrap();
        buffer.write_u24::<BigEndian>(50).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.write_u8(0).unwrap();
        buffer.write_u24::<BigEndian>(0).unwrap();
        buffer.extend_from_slice(&[0x17, 0x01]);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        assert_eq!(file.tags.len(), 1);
        assert_eq!(file.tags[0].tag_type, FlvTagType::Audio);
    }

    #[test]
    fn test_invalid_script_tag_does_not_stop_the_walk() {
        let mut buffer = file_head(0b00000101, 9);
        // Garbage AMF0: a String marker with a length but no bytes
        write_tag(&mut buffer, 18, 0, &[0x02, 0x00, 0x10]);
        write_tag(&mut buffer, 8, 0, &[0x2F, 0x55]);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        assert_eq!(file.tags.len(), 2);
        assert!(matches!(
            file.tags[0].data,
            FlvTagData::Script(ScriptData::Invalid { .. })
        ));
        assert_eq!(file.tags[1].tag_type, FlvTagType::Audio);
        assert!(file.metadata.is_empty());
    }

    #[test]
    fn test_nonstandard_data_offset_is_honored() {
        // Four extra bytes between the header and PreviousTagSize0
        let mut buffer = vec![];
        buffer.extend_from_slice(b"FLV");
        buffer.push(0x01);
        buffer.push(0b00000101);
        buffer.write_u32::<BigEndian>(13).unwrap();
        buffer.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        buffer.write_u32::<BigEndian>(0).unwrap();
        write_tag(&mut buffer, 8, 0, &[0xAF, 0x00]);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();

        assert_eq!(file.header.data_offset, 13);
        assert_eq!(file.tags.len(), 1);
        assert_eq!(file.tags[0].offset, 17);
    }

    #[test]
    fn test_display() {
        let mut buffer = file_head(0b00000101, 9);
        let script = on_metadata_payload(&[(Cow::Borrowed("duration"), Amf0Value::Number(1.5))]);
        write_tag(&mut buffer, 18, 0, &script);
        write_tag(&mut buffer, 8, 0, &[0xAF, 0x00]);

        let file = FlvFile::demux(Bytes::from(buffer)).unwrap();
        let rendered = file.to_string();

        assert!(rendered.starts_with("FLV version 1 (audio: true, video: true, data offset: 9)\n"));
        assert!(rendered.contains("[Script Data] 0x0000000D"));
        assert!(rendered.contains("[Audio]"));
        assert!(rendered.contains("Metadata:\n  duration: 1.5\n"));
    }
}
