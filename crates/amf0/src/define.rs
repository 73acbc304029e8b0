use std::borrow::Cow;
use std::fmt;

use num_derive::FromPrimitive;

/// AMF0 marker types.
/// Defined in amf0_spec_121207.pdf section 2.1
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// movieclip-marker
    ///
    /// reserved, not supported
    MovieClipMarker = 0x04,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// reference-marker
    Reference = 0x07,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
    /// date-marker
    Date = 0x0b,
    /// long-string-marker
    LongString = 0x0c,
    /// unsupported-marker
    Unsupported = 0x0d,
    /// recordset-marker
    ///
    /// reserved, not supported
    Recordset = 0x0e,
    /// xml-document-marker
    XmlDocument = 0x0f,
    /// typed-object-marker
    TypedObject = 0x10,
    /// avmplus-object-marker
    ///
    /// AMF3 marker
    AVMPlusObject = 0x11,
}

/// AMF0 value types.
///
/// Only the value kinds that actually occur in FLV script data get a typed
/// representation. Every other marker decodes to [`Amf0Value::Unsupported`]
/// carrying the raw marker byte, so an exotic payload still round-trips
/// through inspection without failing the decode.
#[derive(PartialEq, Clone, Debug)]
pub enum Amf0Value<'a> {
    /// Number Type defined section 2.2
    Number(f64),
    /// Boolean Type defined section 2.3
    Boolean(bool),
    /// String Type defined section 2.4
    String(Cow<'a, str>),
    /// Object Type defined section 2.5
    Object(Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>),
    /// EcmaArray Type defined section 2.10
    ///
    /// `count` is the element count the wire declared. It is kept for
    /// display only; the properties list is what was actually decoded.
    EcmaArray {
        /// Declared element count.
        count: u32,
        /// Decoded key/value pairs, in wire order.
        properties: Cow<'a, [(Cow<'a, str>, Amf0Value<'a>)]>,
    },
    /// StrictArray Type defined section 2.12
    StrictArray(Cow<'a, [Amf0Value<'a>]>),
    /// Any marker without a typed representation here (null, undefined,
    /// date, ...). Holds the marker byte as read.
    Unsupported(u8),
}

impl Amf0Value<'_> {
    /// Get the marker byte the value is encoded with.
    pub fn marker(&self) -> u8 {
        match self {
            Self::Number(_) => Amf0Marker::Number as u8,
            Self::Boolean(_) => Amf0Marker::Boolean as u8,
            Self::String(_) => Amf0Marker::String as u8,
            Self::Object(_) => Amf0Marker::Object as u8,
            Self::EcmaArray { .. } => Amf0Marker::EcmaArray as u8,
            Self::StrictArray(_) => Amf0Marker::StrictArray as u8,
            Self::Unsupported(marker) => *marker,
        }
    }

    /// Get the owned value.
    pub fn to_owned(&self) -> Amf0Value<'static> {
        match self {
            Self::String(s) => Amf0Value::String(Cow::Owned(s.to_string())),
            Self::Object(o) => Amf0Value::Object(
                o.iter()
                    .map(|(k, v)| (Cow::Owned(k.to_string()), v.to_owned()))
                    .collect(),
            ),
            Self::EcmaArray { count, properties } => Amf0Value::EcmaArray {
                count: *count,
                properties: properties
                    .iter()
                    .map(|(k, v)| (Cow::Owned(k.to_string()), v.to_owned()))
                    .collect(),
            },
            Self::StrictArray(a) => {
                Amf0Value::StrictArray(a.iter().map(|v| v.to_owned()).collect())
            }
            Self::Number(n) => Amf0Value::Number(*n),
            Self::Boolean(b) => Amf0Value::Boolean(*b),
            Self::Unsupported(marker) => Amf0Value::Unsupported(*marker),
        }
    }
}

fn write_properties(
    f: &mut fmt::Formatter<'_>,
    properties: &[(Cow<'_, str>, Amf0Value<'_>)],
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "\"{key}\": {value}")?;
    }
    write!(f, "}}")
}

impl fmt::Display for Amf0Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Object(properties) => write_properties(f, properties),
            Self::EcmaArray { count, properties } => {
                write!(f, "EcmaArray({count}) ")?;
                write_properties(f, properties)
            }
            Self::StrictArray(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Self::Unsupported(marker) => write!(f, "Unsupported AMF Type: {marker}"),
        }
    }
}
