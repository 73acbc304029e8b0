use std::borrow::Cow;
use std::fmt;
use std::io;

use amf0::{Amf0Decoder, Amf0Marker, Amf0ReadError, Amf0Value};
use bytes::Bytes;
use tracing::warn;

use crate::cursor::BytesCursorExt;

/// The script tag event name that carries container metadata.
pub const ON_METADATA: &str = "onMetaData";

/// A classified script tag payload.
///
/// Script tags hold exactly two AMF0 values: the event name (a string) and
/// the event value. Decode failures are caught at the tag boundary and
/// recorded as [`ScriptData::Invalid`]; they never abort the tag walk.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptData {
    /// The `onMetaData` event.
    OnMetaData(Amf0Value<'static>),
    /// Any other event, kept as its name and value.
    Other {
        name: String,
        value: Amf0Value<'static>,
    },
    /// The payload did not decode as a name plus a value.
    Invalid { error: String },
}

impl ScriptData {
    /// Decodes the name/value pair out of a script tag payload.
    pub fn demux(reader: &mut io::Cursor<Bytes>) -> Self {
        let data = reader.extract_remaining();
        let mut decoder = Amf0Decoder::new(&data);

        match Self::decode_pair(&mut decoder) {
            Ok((name, value)) => {
                let value = value.to_owned();
                if name == ON_METADATA {
                    ScriptData::OnMetaData(value)
                } else {
                    ScriptData::Other {
                        name: name.into_owned(),
                        value,
                    }
                }
            }
            Err(error) => {
                warn!(error = %error, "Script tag payload did not decode");
                ScriptData::Invalid {
                    error: error.to_string(),
                }
            }
        }
    }

    fn decode_pair<'a>(
        decoder: &mut Amf0Decoder<'a>,
    ) -> Result<(Cow<'a, str>, Amf0Value<'a>), Amf0ReadError> {
        let name = match decoder.decode_with_type(Amf0Marker::String)? {
            Amf0Value::String(name) => name,
            value => {
                return Err(Amf0ReadError::WrongType {
                    expected: Amf0Marker::String,
                    got: value.marker(),
                });
            }
        };
        let value = decoder.decode()?;

        Ok((name, value))
    }
}

impl fmt::Display for ScriptData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptData::OnMetaData(value) => write!(f, "onMetaData: {}", value),
            ScriptData::Other { name, value } => write!(f, "{}: {}", name, value),
            ScriptData::Invalid { error } => write!(f, "Parse Error: {}", error),
        }
    }
}
