//! Fixed-capacity byte buffer with a write cursor.

use bytes::BytesMut;

use crate::error::ErrorCode;

/// Capacity of every per-worker buffer: 10 MiB.
pub const BUFFER_CAPACITY: usize = 10 * 1024 * 1024;

/// A byte container whose capacity never changes after construction.
///
/// The storage is allocated once and reused in place: [`clear`](Self::clear)
/// only rewinds the cursor. Writes that would move the cursor past the
/// capacity are rejected and leave the buffer untouched.
pub struct BoundedBuffer {
    storage: BytesMut,
    offset: usize,
}

impl BoundedBuffer {
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: BytesMut::zeroed(capacity),
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Current cursor position, i.e. the number of valid bytes.
    pub fn len(&self) -> usize {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.offset
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.offset]
    }

    pub fn clear(&mut self) {
        self.offset = 0;
    }

    /// Appends `data` at the cursor and advances it by `data.len()`.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, ErrorCode> {
        if data.len() > self.remaining() {
            return Err(ErrorCode::InternalServerError);
        }
        let end = self.offset + data.len();
        self.storage[self.offset..end].copy_from_slice(data);
        self.offset = end;
        Ok(data.len())
    }

    /// Replaces already written bytes starting at `at`; the cursor stays put.
    pub fn overwrite(&mut self, at: usize, data: &[u8]) -> Result<(), ErrorCode> {
        let end = at
            .checked_add(data.len())
            .ok_or(ErrorCode::InternalServerError)?;
        if end > self.offset {
            return Err(ErrorCode::InternalServerError);
        }
        self.storage[at..end].copy_from_slice(data);
        Ok(())
    }

    /// Marks `n` bytes written through [`unfilled_mut`](Self::unfilled_mut)
    /// as valid.
    pub fn advance(&mut self, n: usize) -> Result<(), ErrorCode> {
        if n > self.remaining() {
            return Err(ErrorCode::InternalServerError);
        }
        self.offset += n;
        Ok(())
    }

    /// The free region after the cursor, for reading socket data into.
    pub fn unfilled_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.offset..]
    }
}

impl Default for BoundedBuffer {
    fn default() -> Self {
        Self::new()
    }
}
