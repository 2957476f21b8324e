use crate::ans::AnsDecoder;
use crate::decoder_buffer::DecoderBuffer;
use crate::rans_symbol_coding::RAnsSymbol;
use crate::status::{DracoError, Status};

pub struct RAnsSymbolDecoder<'a, const RANS_PRECISION_BITS: u32> {
    ans: AnsDecoder<'a>,
    probability_table: Vec<RAnsSymbol>,
    /// Maps every slot of the precision range to its symbol.
    lut: Vec<u32>,
    num_symbols: usize,
}

impl<'a, const RANS_PRECISION_BITS: u32> Default for RAnsSymbolDecoder<'a, RANS_PRECISION_BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, const RANS_PRECISION_BITS: u32> RAnsSymbolDecoder<'a, RANS_PRECISION_BITS> {
    const RANS_PRECISION: u32 = 1 << RANS_PRECISION_BITS;
    const L_RANS_BASE: u32 = Self::RANS_PRECISION * 4;

    pub fn new() -> Self {
        Self {
            ans: AnsDecoder::new(&[]),
            probability_table: Vec::new(),
            lut: Vec::new(),
            num_symbols: 0,
        }
    }

    pub fn num_symbols(&self) -> usize {
        self.num_symbols
    }

    /// Reads the probability table written by `RAnsSymbolEncoder::create`.
    /// An empty table is an error since no symbol could be decoded from it.
    pub fn create(&mut self, buffer: &mut DecoderBuffer<'a>) -> Status {
        let num_symbols = buffer.decode_varint()?;
        if num_symbols == 0 {
            return Err(DracoError::BufferError("Empty rANS table".into()));
        }
        if num_symbols > Self::RANS_PRECISION as u64 {
            return Err(DracoError::BufferError(format!("Too many rANS symbols: {}", num_symbols)));
        }
        let num_symbols = num_symbols as usize;
        self.num_symbols = num_symbols;
        self.probability_table = vec![RAnsSymbol::default(); num_symbols];

        let mut i = 0;
        while i < num_symbols {
            let token = buffer.decode_u8()?;
            let mode = token & 3;
            if mode == 3 {
                let offset = (token >> 2) as usize;
                if i + offset >= num_symbols {
                    return Err(DracoError::BufferError("Zero run exceeds the rANS table".into()));
                }
                // Entries are already zero.
                i += offset + 1;
                continue;
            }

            let mut prob = (token >> 2) as u32;
            for b in 0..mode as u32 {
                let extra = buffer.decode_u8()? as u32;
                prob |= extra << (8 * (b + 1) - 2);
            }
            self.probability_table[i].prob = prob;
            i += 1;
        }

        self.lut = vec![0; Self::RANS_PRECISION as usize];
        let mut cum_prob: u32 = 0;
        for (symbol, entry) in self.probability_table.iter_mut().enumerate() {
            entry.cum_prob = cum_prob;
            let end = cum_prob.saturating_add(entry.prob);
            if end > Self::RANS_PRECISION {
                return Err(DracoError::BufferError("rANS probabilities exceed the precision".into()));
            }
            for slot in &mut self.lut[cum_prob as usize..end as usize] {
                *slot = symbol as u32;
            }
            cum_prob = end;
        }
        if cum_prob != Self::RANS_PRECISION {
            return Err(DracoError::BufferError("rANS probabilities do not sum to the precision".into()));
        }
        Ok(())
    }

    /// Reads `varint size | bytes` and primes the decoder with that stream.
    pub fn start_decoding(&mut self, buffer: &mut DecoderBuffer<'a>) -> Status {
        let bytes_encoded = buffer.decode_varint()?;
        let bytes_encoded = usize::try_from(bytes_encoded)
            .map_err(|_| DracoError::BufferError("rANS stream size overflow".into()))?;
        let data = buffer.decode_slice(bytes_encoded)?;
        self.ans = AnsDecoder::new(data);
        self.ans.read_init(Self::L_RANS_BASE)
    }

    pub fn decode_symbol(&mut self) -> u32 {
        self.ans.read_normalize();
        let quo = self.ans.state / Self::RANS_PRECISION;
        let rem = self.ans.state % Self::RANS_PRECISION;
        let symbol = self.lut[rem as usize];
        let sym = self.probability_table[symbol as usize];
        self.ans.state = quo * sym.prob + rem - sym.cum_prob;
        symbol
    }
}
