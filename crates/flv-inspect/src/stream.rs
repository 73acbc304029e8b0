use std::io;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::cursor::BytesCursorExt;
use crate::tag::FlvTag;

/// Size of the fixed part of a tag header in bytes.
pub const TAG_HEADER_SIZE: usize = 11;
/// Size of the PreviousTagSize field between tags.
pub const PREV_TAG_SIZE_FIELD_SIZE: usize = 4;

/// A lazy walk over the tag stream of an FLV buffer.
///
/// Yields tags in file order until the buffer runs out. Truncation is a
/// termination signal, not an error: a tag whose declared payload overruns
/// the buffer ends the walk with a warning, while a tag missing only its
/// trailing PreviousTagSize field is still yielded. PreviousTagSize values
/// are never validated.
///
/// The iterator is fused: once `None` is returned it stays `None`.
pub struct FlvTagStream {
    reader: io::Cursor<Bytes>,
    done: bool,
}

impl FlvTagStream {
    /// Starts a walk over `data` with tags beginning at `data_offset`.
    ///
    /// The first PreviousTagSize field sits right at `data_offset` and is
    /// skipped unconditionally; the offset itself is honored as given, even
    /// when it is not the standard 9.
    pub fn new(data: Bytes, data_offset: u64) -> Self {
        let mut reader = io::Cursor::new(data);
        reader.set_position(data_offset + PREV_TAG_SIZE_FIELD_SIZE as u64);

        FlvTagStream {
            reader,
            done: false,
        }
    }
}

impl Iterator for FlvTagStream {
    type Item = FlvTag;

    fn next(&mut self) -> Option<FlvTag> {
        if self.done {
            return None;
        }

        // Less than a tag header left: the stream is simply over.
        if self.reader.remaining_len() < TAG_HEADER_SIZE {
            self.done = true;
            debug!(position = self.reader.position(), "Tag stream ended");
            return None;
        }

        let offset = self.reader.position();
        match FlvTag::demux(&mut self.reader) {
            Ok(tag) => {
                // Skip the trailing PreviousTagSize field without looking at
                // it; when it is missing the next call ends the walk.
                let position = self.reader.position() + PREV_TAG_SIZE_FIELD_SIZE as u64;
                let end = self.reader.get_ref().len() as u64;
                self.reader.set_position(position.min(end));

                Some(tag)
            }
            Err(_) => {
                // The declared payload overruns the buffer.
                self.done = true;
                warn!(offset, "Incomplete tag found, stopping the walk");
                None
            }
        }
    }
}
