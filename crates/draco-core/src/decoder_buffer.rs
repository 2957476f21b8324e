use byteorder::{ByteOrder, LittleEndian};

use crate::status::DracoError;

/// Input buffer for reading compressed Draco data.
///
/// `DecoderBuffer` provides sequential byte and bit-level access to compressed data.
/// A failed read never advances the position.
///
/// # Example
///
/// ```
/// use draco_core::decoder_buffer::DecoderBuffer;
///
/// let data = &[0x44, 0x52, 0x41, 0x43, 0x4F]; // "DRACO" header
/// let mut buffer = DecoderBuffer::new(data);
///
/// assert_eq!(buffer.decode_u8().unwrap(), 0x44);
/// assert_eq!(buffer.remaining_size(), 4);
/// ```
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    bit_decoder_active: bool,
    bit_start_pos: usize,
    current_bit_offset: usize,
}

impl<'a> DecoderBuffer<'a> {
    /// Creates a new `DecoderBuffer` from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_decoder_active: false,
            bit_start_pos: 0,
            current_bit_offset: 0,
        }
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Sets the read position.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` if:
    /// - Bit decoding is currently active
    /// - Position is beyond the buffer length
    pub fn set_position(&mut self, pos: usize) -> Result<(), DracoError> {
        if self.bit_decoder_active {
            return Err(DracoError::BufferError(
                "Cannot set position while bit decoding is active".into(),
            ));
        }
        if pos > self.data.len() {
            return Err(DracoError::BufferError(format!(
                "Position {} exceeds buffer length {}",
                pos,
                self.data.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes remaining in the buffer.
    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Starts bit-level decoding mode at the current position.
    ///
    /// The bit sequence carries no size prefix; [`DecoderBuffer::end_bit_decoding`]
    /// skips exactly the bytes touched by the decoded bits.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` if bit decoding is already active.
    pub fn start_bit_decoding(&mut self) -> Result<(), DracoError> {
        if self.bit_decoder_active {
            return Err(DracoError::BufferError("Bit decoding already active".into()));
        }
        self.bit_start_pos = self.pos;
        self.bit_decoder_active = true;
        self.current_bit_offset = 0;
        Ok(())
    }

    /// Ends bit-level decoding mode and advances the byte position past the
    /// decoded bits (rounded up to whole bytes).
    pub fn end_bit_decoding(&mut self) {
        if !self.bit_decoder_active {
            return;
        }
        self.bit_decoder_active = false;
        self.pos = self.bit_start_pos + self.current_bit_offset.div_ceil(8);
    }

    /// Decodes `nbits` least significant bits as a u32.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` if bit decoding is not active or end of stream.
    pub fn decode_least_significant_bits32(&mut self, nbits: u32) -> Result<u32, DracoError> {
        if !self.bit_decoder_active {
            return Err(DracoError::BufferError("Bit decoding not active".into()));
        }
        if nbits > 32 {
            return Err(DracoError::BufferError("Cannot decode more than 32 bits".into()));
        }
        let end_bit = self.current_bit_offset + nbits as usize;
        if self.bit_start_pos + end_bit.div_ceil(8) > self.data.len() {
            return Err(DracoError::BufferError("Unexpected end of bit stream".into()));
        }
        let mut value = 0u32;
        for i in 0..nbits {
            let bit_pos = self.current_bit_offset;
            let byte = self.data[self.bit_start_pos + bit_pos / 8];
            value |= (((byte >> (bit_pos % 8)) & 1) as u32) << i;
            self.current_bit_offset += 1;
        }
        Ok(value)
    }

    fn take(&mut self, size: usize) -> Result<&'a [u8], DracoError> {
        if self.bit_decoder_active {
            return Err(DracoError::BufferError(
                "Cannot decode bytes while bit decoding is active".into(),
            ));
        }
        if size > self.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "Unexpected end of buffer: need {} bytes, have {}",
                size,
                self.remaining_size()
            )));
        }
        let slice = &self.data[self.pos..self.pos + size];
        self.pos += size;
        Ok(slice)
    }

    /// Decodes a single byte.
    pub fn decode_u8(&mut self) -> Result<u8, DracoError> {
        Ok(self.take(1)?[0])
    }

    pub fn decode_i8(&mut self) -> Result<i8, DracoError> {
        Ok(self.decode_u8()? as i8)
    }

    /// Decodes a little-endian u16.
    pub fn decode_u16(&mut self) -> Result<u16, DracoError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    /// Decodes a little-endian u32.
    pub fn decode_u32(&mut self) -> Result<u32, DracoError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Decodes a little-endian i32.
    pub fn decode_i32(&mut self) -> Result<i32, DracoError> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    /// Decodes a little-endian f32.
    pub fn decode_f32(&mut self) -> Result<f32, DracoError> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    /// Decodes bytes into the provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` if not enough bytes remaining.
    pub fn decode_bytes(&mut self, out: &mut [u8]) -> Result<(), DracoError> {
        let src = self.take(out.len())?;
        out.copy_from_slice(src);
        Ok(())
    }

    /// Decodes and returns a slice of the specified size.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` if not enough bytes remaining.
    pub fn decode_slice(&mut self, size: usize) -> Result<&'a [u8], DracoError> {
        self.take(size)
    }

    /// Decodes an unsigned LEB128 varint.
    ///
    /// # Errors
    ///
    /// Returns `DracoError::BufferError` on truncated input or when the value
    /// does not fit in 64 bits. The position is left unchanged on error.
    pub fn decode_varint(&mut self) -> Result<u64, DracoError> {
        let start = self.pos;
        let result = self.decode_varint_inner();
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    fn decode_varint_inner(&mut self) -> Result<u64, DracoError> {
        let mut val = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.decode_u8()?;
            if shift >= 64 || (shift == 63 && (b & 0x7F) > 1) {
                return Err(DracoError::BufferError("Varint exceeds 64 bits".into()));
            }
            val |= ((b & 0x7F) as u64) << shift;
            if (b & 0x80) == 0 {
                return Ok(val);
            }
            shift += 7;
        }
    }

    /// Decodes a varint that must fit in a u32.
    pub fn decode_varint_u32(&mut self) -> Result<u32, DracoError> {
        let start = self.pos;
        let value = self.decode_varint()?;
        u32::try_from(value).map_err(|_| {
            self.pos = start;
            DracoError::BufferError(format!("Varint {} exceeds 32 bits", value))
        })
    }

    /// Returns a slice of the remaining data without advancing.
    pub fn remaining_data(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }

    /// Advances the position by `n` bytes without reading.
    pub fn advance(&mut self, n: usize) -> Result<(), DracoError> {
        self.take(n).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_decoding() {
        let data = [0x78, 0x56, 0x34, 0x12, 0xCD, 0xAB, 0xFE];
        let mut buffer = DecoderBuffer::new(&data);
        assert_eq!(buffer.decode_u32().unwrap(), 0x12345678);
        assert_eq!(buffer.decode_u16().unwrap(), 0xABCD);
        assert_eq!(buffer.decode_i8().unwrap(), -2);
        assert!(buffer.decode_u8().is_err());
    }

    #[test]
    fn test_failed_read_keeps_position() {
        let data = [1, 2, 3];
        let mut buffer = DecoderBuffer::new(&data);
        buffer.decode_u8().unwrap();
        assert!(buffer.decode_u32().is_err());
        assert_eq!(buffer.position(), 1);
        assert!(buffer.advance(3).is_err());
        assert_eq!(buffer.decode_u16().unwrap(), 0x0302);
    }

    #[test]
    fn test_varint_decoding() {
        let data = [0x00, 0x7F, 0x80, 0x01, 0xE0, 0xA7, 0x12];
        let mut buffer = DecoderBuffer::new(&data);
        assert_eq!(buffer.decode_varint().unwrap(), 0);
        assert_eq!(buffer.decode_varint().unwrap(), 127);
        assert_eq!(buffer.decode_varint().unwrap(), 128);
        assert_eq!(buffer.decode_varint().unwrap(), 300000);
        assert_eq!(buffer.remaining_size(), 0);
    }

    #[test]
    fn test_truncated_varint() {
        let data = [0x80, 0x80];
        let mut buffer = DecoderBuffer::new(&data);
        assert!(buffer.decode_varint().is_err());
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_overlong_varint() {
        let data = [0xFF; 11];
        let mut buffer = DecoderBuffer::new(&data);
        assert!(buffer.decode_varint().is_err());

        let data = [0xFF, 0xFF, 0xFF, 0xFF, 0x1F];
        let mut buffer = DecoderBuffer::new(&data);
        assert!(buffer.decode_varint_u32().is_err());
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_bit_decoding() {
        let data = [0b11001010, 0b11111111, 0x42];
        let mut buffer = DecoderBuffer::new(&data);
        buffer.start_bit_decoding().unwrap();
        assert!(buffer.decode_u8().is_err());
        assert_eq!(buffer.decode_least_significant_bits32(4).unwrap(), 0b1010);
        assert_eq!(buffer.decode_least_significant_bits32(4).unwrap(), 0b1100);
        assert_eq!(buffer.decode_least_significant_bits32(3).unwrap(), 0b111);
        buffer.end_bit_decoding();
        // 11 bits consumed, rounded up to two bytes.
        assert_eq!(buffer.decode_u8().unwrap(), 0x42);
    }
}
