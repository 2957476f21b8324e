use std::sync::atomic::{AtomicI64, Ordering};

use crate::status::{DracoError, Status};

static NEXT_OWNED_BUFFER_ID: AtomicI64 = AtomicI64::new(1);

/// Identifies a particular version of a particular buffer.
///
/// `buffer_update_count` is bumped on every `update` or `resize`, so a
/// descriptor captured earlier no longer matches once the contents have been
/// replaced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataBufferDescriptor {
    pub buffer_id: i64,
    pub buffer_update_count: i64,
}

#[derive(Debug, Default, Clone)]
pub struct DataBuffer {
    data: Vec<u8>,
    descriptor: DataBufferDescriptor,
}

impl DataBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with a process-wide unique id. These ids are
    /// negative so they never match a buffer registered in a [`BufferArena`].
    pub fn with_owned_id() -> Self {
        let mut buffer = Self::new();
        buffer.descriptor.buffer_id = -NEXT_OWNED_BUFFER_ID.fetch_add(1, Ordering::Relaxed);
        buffer
    }

    /// Replaces the whole buffer with `data`.
    pub fn update(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
        self.descriptor.buffer_update_count += 1;
    }

    /// Writes `data` at `offset`, growing the buffer when needed.
    pub fn update_at(&mut self, data: &[u8], offset: usize) {
        let end = offset + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(data);
        self.descriptor.buffer_update_count += 1;
    }

    pub fn resize(&mut self, new_size: usize) {
        self.data.resize(new_size, 0);
        self.descriptor.buffer_update_count += 1;
    }

    /// Copies `out_data.len()` bytes starting at `byte_pos`.
    pub fn read(&self, byte_pos: usize, out_data: &mut [u8]) -> Status {
        let end = self.checked_end(byte_pos, out_data.len())?;
        out_data.copy_from_slice(&self.data[byte_pos..end]);
        Ok(())
    }

    /// Unchecked counterpart of [`DataBuffer::read`].
    ///
    /// # Safety
    ///
    /// `byte_pos + out_data.len()` must not exceed [`DataBuffer::data_size`].
    pub unsafe fn read_unchecked(&self, byte_pos: usize, out_data: &mut [u8]) {
        std::ptr::copy_nonoverlapping(self.data.as_ptr().add(byte_pos), out_data.as_mut_ptr(), out_data.len());
    }

    /// Writes `in_data` at `byte_pos`. Unlike `update_at` this never grows the
    /// buffer and does not change the update count.
    pub fn write(&mut self, byte_pos: usize, in_data: &[u8]) -> Status {
        let end = self.checked_end(byte_pos, in_data.len())?;
        self.data[byte_pos..end].copy_from_slice(in_data);
        Ok(())
    }

    /// Unchecked counterpart of [`DataBuffer::write`].
    ///
    /// # Safety
    ///
    /// `byte_pos + in_data.len()` must not exceed [`DataBuffer::data_size`].
    pub unsafe fn write_unchecked(&mut self, byte_pos: usize, in_data: &[u8]) {
        std::ptr::copy_nonoverlapping(in_data.as_ptr(), self.data.as_mut_ptr().add(byte_pos), in_data.len());
    }

    /// Copies `size` bytes from `src_buf` into this buffer, growing it if the
    /// destination range ends past the current size.
    pub fn copy(&mut self, dst_offset: usize, src_buf: &DataBuffer, src_offset: usize, size: usize) -> Status {
        let src_end = src_buf.checked_end(src_offset, size)?;
        if dst_offset + size > self.data.len() {
            self.data.resize(dst_offset + size, 0);
        }
        self.data[dst_offset..dst_offset + size].copy_from_slice(&src_buf.data[src_offset..src_end]);
        Ok(())
    }

    fn checked_end(&self, byte_pos: usize, len: usize) -> Result<usize, DracoError> {
        match byte_pos.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(end),
            _ => Err(DracoError::BufferError(format!(
                "Access of {} bytes at {} exceeds data buffer size {}",
                len,
                byte_pos,
                self.data.len()
            ))),
        }
    }

    pub fn set_update_count(&mut self, count: i64) {
        self.descriptor.buffer_update_count = count;
    }

    pub fn update_count(&self) -> i64 {
        self.descriptor.buffer_update_count
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn buffer_id(&self) -> i64 {
        self.descriptor.buffer_id
    }

    pub fn set_buffer_id(&mut self, buffer_id: i64) {
        self.descriptor.buffer_id = buffer_id;
    }

    pub fn descriptor(&self) -> DataBufferDescriptor {
        self.descriptor
    }
}

/// Stable handle of a buffer stored in a [`BufferArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u32);

impl BufferHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owns buffers that are shared by several attribute views, e.g. one
/// interleaved vertex buffer described by multiple `GeometryAttribute`s.
///
/// Every inserted buffer gets `buffer_id = handle + 1`; id 0 is left for
/// buffers that are not registered anywhere.
#[derive(Debug, Default)]
pub struct BufferArena {
    buffers: Vec<DataBuffer>,
}

impl BufferArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mut buffer: DataBuffer) -> BufferHandle {
        let handle = BufferHandle(self.buffers.len() as u32);
        buffer.set_buffer_id(handle.0 as i64 + 1);
        self.buffers.push(buffer);
        handle
    }

    pub fn get(&self, handle: BufferHandle) -> Option<&DataBuffer> {
        self.buffers.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: BufferHandle) -> Option<&mut DataBuffer> {
        self.buffers.get_mut(handle.index())
    }

    /// Finds the buffer a descriptor was taken from.
    pub fn find(&self, descriptor: &DataBufferDescriptor) -> Option<BufferHandle> {
        if descriptor.buffer_id <= 0 {
            return None;
        }
        let index = (descriptor.buffer_id - 1) as usize;
        if index < self.buffers.len() {
            Some(BufferHandle(index as u32))
        } else {
            None
        }
    }

    /// Returns true when the buffer referenced by `descriptor` has been updated
    /// (or removed) since the descriptor was captured.
    pub fn is_stale(&self, descriptor: &DataBufferDescriptor) -> bool {
        match self.find(descriptor).and_then(|handle| self.get(handle)) {
            Some(buffer) => buffer.update_count() != descriptor.buffer_update_count,
            None => true,
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}
