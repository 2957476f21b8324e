// Copyright 2022 The Draco Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use byteorder::{ByteOrder, LittleEndian};

use crate::status::{DracoError, Status};

/// Output buffer for Draco serialization.
/// Supports both byte-aligned and bit-level encoding; all multi-byte values
/// are written little-endian.
#[derive(Debug, Clone, Default)]
pub struct EncoderBuffer {
    /// Main buffer data
    buffer: Vec<u8>,

    /// Bit encoder state (active when encoding bits)
    bit_encoder: Option<BitEncoder>,

    /// Number of bytes reserved for bit encoding
    bit_encoder_reserved_bytes: usize,
}

/// Bit encoder for variable-length bit sequences
#[derive(Debug, Clone)]
pub struct BitEncoder {
    /// Current bit position within the reserved range
    bit_offset: usize,

    /// Starting byte position for bit encoding
    start_byte_offset: usize,
}

impl EncoderBuffer {
    /// Create a new empty encoder buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Clear all data from the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.bit_encoder = None;
        self.bit_encoder_reserved_bytes = 0;
    }

    /// Get the current buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer size
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.buffer
    }

    /// Check if bit encoder is currently active
    pub fn bit_encoder_active(&self) -> bool {
        self.bit_encoder.is_some()
    }

    /// Start encoding a bit sequence of at most `required_bits` bits.
    ///
    /// The sequence is not prefixed with its size; a reader has to know how
    /// many bits to consume.
    pub fn start_bit_encoding(&mut self, required_bits: usize) -> Status {
        if self.bit_encoder_active() {
            return Err(DracoError::BufferError("Bit encoder already active".into()));
        }

        let required_bytes = required_bits.div_ceil(8);
        let start_pos = self.buffer.len();
        self.buffer.resize(start_pos + required_bytes, 0);

        self.bit_encoder = Some(BitEncoder {
            bit_offset: 0,
            start_byte_offset: start_pos,
        });
        self.bit_encoder_reserved_bytes = required_bytes;
        Ok(())
    }

    /// End bit encoding and drop the unused part of the reserved range.
    pub fn end_bit_encoding(&mut self) {
        if let Some(encoder) = &self.bit_encoder {
            let actual_bytes = encoder.bit_offset.div_ceil(8);
            self.buffer.truncate(encoder.start_byte_offset + actual_bytes);
        }
        self.bit_encoder = None;
        self.bit_encoder_reserved_bytes = 0;
    }

    /// Encode the `nbits` least significant bits of `value`, LSB first.
    pub fn encode_least_significant_bits32(&mut self, nbits: u32, value: u32) -> Status {
        if nbits > 32 {
            return Err(DracoError::BufferError("Cannot encode more than 32 bits".into()));
        }
        let reserved_bits = self.bit_encoder_reserved_bytes * 8;
        let encoder = self
            .bit_encoder
            .as_mut()
            .ok_or_else(|| DracoError::BufferError("Bit encoder not active".into()))?;
        if encoder.bit_offset + nbits as usize > reserved_bits {
            return Err(DracoError::BufferError("Bit sequence exceeds reserved space".into()));
        }
        let start = encoder.start_byte_offset;
        let end = start + self.bit_encoder_reserved_bytes;
        encoder.put_bits(value, nbits, &mut self.buffer[start..end]);
        Ok(())
    }

    fn check_byte_aligned(&self) -> Status {
        if self.bit_encoder_active() {
            return Err(DracoError::BufferError(
                "Cannot encode byte-aligned data during bit encoding".into(),
            ));
        }
        Ok(())
    }

    /// Encode raw bytes (byte-aligned)
    pub fn encode_data(&mut self, data: &[u8]) -> Status {
        self.check_byte_aligned()?;
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    pub fn encode_u8(&mut self, value: u8) -> Status {
        self.encode_data(&[value])
    }

    pub fn encode_i8(&mut self, value: i8) -> Status {
        self.encode_u8(value as u8)
    }

    pub fn encode_u16(&mut self, value: u16) -> Status {
        let mut bytes = [0u8; 2];
        LittleEndian::write_u16(&mut bytes, value);
        self.encode_data(&bytes)
    }

    pub fn encode_u32(&mut self, value: u32) -> Status {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.encode_data(&bytes)
    }

    pub fn encode_i32(&mut self, value: i32) -> Status {
        let mut bytes = [0u8; 4];
        LittleEndian::write_i32(&mut bytes, value);
        self.encode_data(&bytes)
    }

    pub fn encode_f32(&mut self, value: f32) -> Status {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.encode_data(&bytes)
    }

    /// Encode an unsigned LEB128 varint (7 bits per byte, continuation bit set
    /// on all but the last byte).
    pub fn encode_varint(&mut self, mut value: u64) -> Status {
        self.check_byte_aligned()?;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return Ok(());
            }
            self.buffer.push(byte | 0x80);
        }
    }
}

impl BitEncoder {
    /// Write up to 32 bits to the buffer
    pub fn put_bits(&mut self, data: u32, nbits: u32, buffer: &mut [u8]) {
        debug_assert!(nbits <= 32, "Cannot write more than 32 bits");

        for bit in 0..nbits {
            self.put_bit((data >> bit) & 1, buffer);
        }
    }

    /// Get the current bit offset
    pub fn bit_offset(&self) -> usize {
        self.bit_offset
    }

    fn put_bit(&mut self, value: u32, buffer: &mut [u8]) {
        let byte_offset = self.bit_offset / 8;
        let bit_shift = (self.bit_offset % 8) as u8;

        // Clear the target bit and set it to the new value
        buffer[byte_offset] &= !(1 << bit_shift);
        buffer[byte_offset] |= (value as u8) << bit_shift;

        self.bit_offset += 1;
    }
}
