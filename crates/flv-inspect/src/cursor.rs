use std::io;

use bytes::Bytes;

/// Zero-copy reads out of an [`io::Cursor<Bytes>`].
///
/// All of these slice the underlying [`Bytes`] instead of copying, so they
/// are O(1) and the returned buffers share storage with the input.
pub trait BytesCursorExt {
    /// Extracts everything between the cursor position and the end of the
    /// buffer, leaving the cursor at the end.
    fn extract_remaining(&mut self) -> Bytes;

    /// Extracts exactly `size` bytes, advancing the cursor.
    ///
    /// Returns an error if fewer than `size` bytes remain.
    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes>;

    /// Extracts at most `cap` bytes, advancing the cursor.
    ///
    /// Shorter inputs yield whatever is left, down to an empty buffer.
    fn extract_capped(&mut self, cap: usize) -> Bytes;

    /// Number of unread bytes left in the buffer.
    fn remaining_len(&self) -> usize;
}

impl BytesCursorExt for io::Cursor<Bytes> {
    fn extract_remaining(&mut self) -> Bytes {
        // Cannot fail: the size is clamped to what is actually left.
        self.extract_bytes(self.remaining_len()).unwrap_or_default()
    }

    fn extract_bytes(&mut self, size: usize) -> io::Result<Bytes> {
        if size > self.remaining_len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "not enough bytes",
            ));
        }

        if size == 0 {
            return Ok(Bytes::new());
        }

        let position = self.position() as usize;
        let slice = self.get_ref().slice(position..position + size);
        self.set_position((position + size) as u64);

        Ok(slice)
    }

    fn extract_capped(&mut self, cap: usize) -> Bytes {
        let size = cap.min(self.remaining_len());
        self.extract_bytes(size).unwrap_or_default()
    }

    fn remaining_len(&self) -> usize {
        self.get_ref().len().saturating_sub(self.position() as usize)
    }
}
