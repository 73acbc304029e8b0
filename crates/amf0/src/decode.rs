use std::borrow::Cow;
use std::io::{self, Cursor, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::{Amf0Marker, Amf0ReadError, Amf0Value};

/// An AMF0 Decoder.
///
/// This decoder takes a reference to a byte slice and reads the AMF0 data from
/// it. All returned objects are references to the original byte slice. Making
/// it very cheap to use.
///
/// Script payloads found in the wild are frequently damaged, so the decoder
/// leans permissive: markers without a typed representation decode to
/// [`Amf0Value::Unsupported`], and a truncated Object or ECMA array yields the
/// pairs read so far instead of an error.
pub struct Amf0Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Amf0Decoder<'a> {
    /// Create a new AMF0 decoder.
    pub const fn new(buff: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buff),
        }
    }

    /// Check if the decoder has reached the end of the AMF0 data.
    pub const fn is_empty(&self) -> bool {
        self.cursor.get_ref().len() == self.cursor.position() as usize
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Amf0ReadError> {
        let pos = self.cursor.position() as usize;
        let buff = *self.cursor.get_ref();

        let end = pos
            .checked_add(len)
            .filter(|&end| end <= buff.len())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "not enough bytes"))?;

        self.cursor.set_position(end as u64);
        Ok(&buff[pos..end])
    }

    /// Read the next encoded value from the decoder.
    pub fn decode(&mut self) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let marker = self.cursor.read_u8()?;

        match Amf0Marker::from_u8(marker) {
            Some(Amf0Marker::Number) => Ok(Amf0Value::Number(self.read_number()?)),
            Some(Amf0Marker::Boolean) => Ok(Amf0Value::Boolean(self.read_bool()?)),
            Some(Amf0Marker::String) => Ok(Amf0Value::String(self.read_string()?)),
            Some(Amf0Marker::Object) => Ok(Amf0Value::Object(self.read_properties().into())),
            Some(Amf0Marker::EcmaArray) => {
                let count = self.cursor.read_u32::<BigEndian>()?;
                Ok(Amf0Value::EcmaArray {
                    count,
                    properties: self.read_properties().into(),
                })
            }
            Some(Amf0Marker::StrictArray) => {
                Ok(Amf0Value::StrictArray(self.read_strict_array()?.into()))
            }
            // Everything else is surfaced as-is. Only the marker byte is
            // consumed; the payload (if the marker has one) is left for the
            // caller to interpret.
            _ => Ok(Amf0Value::Unsupported(marker)),
        }
    }

    /// Read the next encoded value from the decoder and check if it matches the
    /// specified marker.
    pub fn decode_with_type(
        &mut self,
        specified_marker: Amf0Marker,
    ) -> Result<Amf0Value<'a>, Amf0ReadError> {
        let marker = self.cursor.read_u8()?;
        self.cursor.seek(SeekFrom::Current(-1))?; // seek back to the original position

        if marker != specified_marker as u8 {
            return Err(Amf0ReadError::WrongType {
                expected: specified_marker,
                got: marker,
            });
        }

        self.decode()
    }

    fn read_number(&mut self) -> Result<f64, Amf0ReadError> {
        Ok(self.cursor.read_f64::<BigEndian>()?)
    }

    fn read_bool(&mut self) -> Result<bool, Amf0ReadError> {
        Ok(self.cursor.read_u8()? > 0)
    }

    fn read_string(&mut self) -> Result<Cow<'a, str>, Amf0ReadError> {
        let l = self.cursor.read_u16::<BigEndian>()?;
        let bytes = self.read_bytes(l as usize)?;

        Ok(Cow::Borrowed(std::str::from_utf8(bytes)?))
    }

    /// Read Object-style key/value pairs.
    ///
    /// An empty key ends the list; the byte after it is consumed as the
    /// object-end marker whatever its value, and a missing terminator at the
    /// end of the buffer ends the list too. A pair that fails to decode ends
    /// the list with the pairs read so far.
    fn read_properties(&mut self) -> Vec<(Cow<'a, str>, Amf0Value<'a>)> {
        let mut properties = Vec::new();

        loop {
            let key = match self.read_string() {
                Ok(key) => key,
                Err(_) => break,
            };

            if key.is_empty() {
                self.cursor.read_u8().ok(); // terminator marker, normally 0x09
                break;
            }

            match self.decode() {
                Ok(value) => properties.push((key, value)),
                Err(_) => break,
            }
        }

        properties
    }

    fn read_strict_array(&mut self) -> Result<Vec<Amf0Value<'a>>, Amf0ReadError> {
        let len = self.cursor.read_u32::<BigEndian>()?;

        let mut values = Vec::with_capacity((len as usize).min(64));

        for _ in 0..len {
            let val = self.decode()?;
            values.push(val);
        }

        Ok(values)
    }
}

impl<'a> Iterator for Amf0Decoder<'a> {
    type Item = Result<Amf0Value<'a>, Amf0ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }

        Some(self.decode())
    }
}
