use crate::status::{DracoError, Status};

pub const ANS_IO_BASE: u32 = 256;

/// Byte sink of an rANS encoder. Bytes are produced back to front; the state
/// is flushed with [`AnsCoder::write_end`].
#[derive(Debug)]
pub struct AnsCoder {
    pub buf: Vec<u8>,
    pub state: u32,
    pub l_base: u32,
}

impl Default for AnsCoder {
    fn default() -> Self {
        Self {
            buf: Vec::new(),
            state: 0,
            l_base: 0,
        }
    }
}

impl AnsCoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_init(&mut self, l_base: u32) {
        self.buf.clear();
        self.l_base = l_base;
        self.state = l_base;
    }

    /// Flushes the final state as a 1 to 4 byte tail. The two top bits of the
    /// last byte give the number of extra bytes.
    pub fn write_end(&mut self) -> Status {
        let state = self.state - self.l_base;
        if state < (1 << 6) {
            self.buf.push(state as u8);
        } else if state < (1 << 14) {
            self.buf.push((state & 0xFF) as u8);
            self.buf.push(((0x01 << 6) | ((state >> 8) & 0x3F)) as u8);
        } else if state < (1 << 22) {
            self.buf.push((state & 0xFF) as u8);
            self.buf.push(((state >> 8) & 0xFF) as u8);
            self.buf.push(((0x02 << 6) | ((state >> 16) & 0x3F)) as u8);
        } else if state < (1 << 30) {
            self.buf.push((state & 0xFF) as u8);
            self.buf.push(((state >> 8) & 0xFF) as u8);
            self.buf.push(((state >> 16) & 0xFF) as u8);
            self.buf.push(((0x03 << 6) | ((state >> 24) & 0x3F)) as u8);
        } else {
            return Err(DracoError::DracoError(format!(
                "rANS state is too large to be serialized: {}",
                state
            )));
        }
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.buf
    }
}

/// Reads an rANS stream from its end towards its start.
#[derive(Debug)]
pub struct AnsDecoder<'a> {
    pub buf: &'a [u8],
    pub buf_offset: usize,
    pub state: u32,
    pub l_base: u32,
}

impl<'a> AnsDecoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            buf_offset: 0,
            state: 0,
            l_base: 0,
        }
    }

    pub fn read_normalize(&mut self) {
        while self.state < self.l_base && self.buf_offset > 0 {
            self.buf_offset -= 1;
            self.state = (self.state * ANS_IO_BASE) | self.buf[self.buf_offset] as u32;
        }
    }

    fn pop_byte(&mut self) -> Result<u32, DracoError> {
        if self.buf_offset == 0 {
            return Err(DracoError::BufferError("Truncated rANS state".into()));
        }
        self.buf_offset -= 1;
        Ok(self.buf[self.buf_offset] as u32)
    }

    /// Restores the state written by [`AnsCoder::write_end`].
    pub fn read_init(&mut self, l_base: u32) -> Status {
        self.l_base = l_base;
        self.buf_offset = self.buf.len();
        let head = self.pop_byte()?;
        let num_extra_bytes = head >> 6;
        let mut state = head & 0x3F;
        for _ in 0..num_extra_bytes {
            state = (state << 8) | self.pop_byte()?;
        }
        self.state = state + l_base;
        if self.state >= l_base * ANS_IO_BASE {
            return Err(DracoError::BufferError(format!(
                "Invalid rANS state {} for base {}",
                self.state, l_base
            )));
        }
        Ok(())
    }
}
