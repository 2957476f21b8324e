use crate::ans::{AnsCoder, ANS_IO_BASE};
use crate::encoder_buffer::EncoderBuffer;
use crate::rans_symbol_coding::RAnsSymbol;
use crate::status::{DracoError, Status};

/// rANS coder over a fixed alphabet with `2^RANS_PRECISION_BITS` precision.
///
/// Usage: [`create`](Self::create) writes the probability table, then
/// [`start_encoding`](Self::start_encoding), [`encode_symbol`](Self::encode_symbol)
/// in reverse order and [`end_encoding`](Self::end_encoding).
pub struct RAnsSymbolEncoder<const RANS_PRECISION_BITS: u32> {
    ans: AnsCoder,
    probability_table: Vec<RAnsSymbol>,
    num_symbols: usize,
}

impl<const RANS_PRECISION_BITS: u32> Default for RAnsSymbolEncoder<RANS_PRECISION_BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const RANS_PRECISION_BITS: u32> RAnsSymbolEncoder<RANS_PRECISION_BITS> {
    const RANS_PRECISION: u32 = 1 << RANS_PRECISION_BITS;
    const L_RANS_BASE: u32 = Self::RANS_PRECISION * 4;

    pub fn new() -> Self {
        Self {
            ans: AnsCoder::new(),
            probability_table: Vec::new(),
            num_symbols: 0,
        }
    }

    /// Builds the probability table from symbol `frequencies` and writes it
    /// to `buffer`.
    pub fn create(&mut self, frequencies: &[u64], buffer: &mut EncoderBuffer) -> Status {
        let mut total_freq: u64 = 0;
        let mut max_valid_symbol = 0;
        for (i, &freq) in frequencies.iter().enumerate() {
            total_freq += freq;
            if freq > 0 {
                max_valid_symbol = i;
            }
        }
        if total_freq == 0 {
            return Err(DracoError::InvalidParameter("No symbols to encode".into()));
        }

        let num_symbols = max_valid_symbol + 1;
        self.num_symbols = num_symbols;
        self.probability_table = vec![RAnsSymbol::default(); num_symbols];

        let total_freq_d = total_freq as f64;
        let rans_precision_d = Self::RANS_PRECISION as f64;

        let mut total_rans_prob: u32 = 0;
        for (entry, &freq) in self.probability_table.iter_mut().zip(frequencies) {
            let prob = freq as f64 / total_freq_d;
            let mut rans_prob = (prob * rans_precision_d + 0.5) as u32;
            if rans_prob == 0 && freq > 0 {
                rans_prob = 1;
            }
            entry.prob = rans_prob;
            total_rans_prob += rans_prob;
        }

        if total_rans_prob != Self::RANS_PRECISION {
            self.fix_probabilities(total_rans_prob)?;
        }

        let mut cum_prob = 0;
        for entry in self.probability_table.iter_mut() {
            entry.cum_prob = cum_prob;
            cum_prob += entry.prob;
        }
        if cum_prob != Self::RANS_PRECISION {
            return Err(DracoError::DracoError("rANS probabilities do not sum to the precision".into()));
        }

        self.encode_table(buffer)
    }

    /// Makes the rounded probabilities sum up to exactly `RANS_PRECISION`.
    /// Missing mass goes to the most frequent symbol, excess mass is taken
    /// from the most frequent symbols first.
    fn fix_probabilities(&mut self, mut total_rans_prob: u32) -> Status {
        let num_symbols = self.num_symbols;
        let mut sorted: Vec<usize> = (0..num_symbols).collect();
        sorted.sort_by_key(|&i| self.probability_table[i].prob);
        let most_frequent = sorted[num_symbols - 1];

        if total_rans_prob < Self::RANS_PRECISION {
            self.probability_table[most_frequent].prob += Self::RANS_PRECISION - total_rans_prob;
            return Ok(());
        }

        let mut error = total_rans_prob - Self::RANS_PRECISION;
        while error > 0 {
            let act_rel_error_d = Self::RANS_PRECISION as f64 / total_rans_prob as f64;
            for j in (1..num_symbols).rev() {
                let symbol_id = sorted[j];
                let prob = self.probability_table[symbol_id].prob;
                if prob <= 1 {
                    if j == num_symbols - 1 {
                        return Err(DracoError::DracoError(
                            "Cannot fit the symbol probabilities into the rANS precision".into(),
                        ));
                    }
                    break;
                }
                let new_prob = (act_rel_error_d * prob as f64).floor() as u32;
                let fix = (prob - new_prob).max(1).min(prob - 1).min(error);
                self.probability_table[symbol_id].prob -= fix;
                total_rans_prob -= fix;
                error -= fix;
                if total_rans_prob == Self::RANS_PRECISION {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Each probability takes one to three bytes: the two low bits of the
    /// first byte give the number of extra bytes, or mark (value 3) a run of
    /// up to 64 zero probabilities.
    fn encode_table(&self, buffer: &mut EncoderBuffer) -> Status {
        buffer.encode_varint(self.num_symbols as u64)?;

        let mut i = 0;
        while i < self.num_symbols {
            let prob = self.probability_table[i].prob;
            if prob == 0 {
                let mut offset = 0;
                while offset < (1 << 6) - 1
                    && i + offset + 1 < self.num_symbols
                    && self.probability_table[i + offset + 1].prob == 0
                {
                    offset += 1;
                }
                buffer.encode_u8(((offset as u8) << 2) | 3)?;
                i += offset + 1;
                continue;
            }

            let num_extra_bytes: u32 = if prob >= (1 << 14) {
                2
            } else if prob >= (1 << 6) {
                1
            } else {
                0
            };
            if prob >= (1 << 22) {
                return Err(DracoError::DracoError(format!("Probability {} is too large", prob)));
            }
            buffer.encode_u8(((prob << 2) as u8) | num_extra_bytes as u8)?;
            for b in 0..num_extra_bytes {
                buffer.encode_u8((prob >> (8 * (b + 1) - 2)) as u8)?;
            }
            i += 1;
        }
        Ok(())
    }

    pub fn start_encoding(&mut self) {
        self.ans.write_init(Self::L_RANS_BASE);
    }

    /// Encodes one symbol. Symbols come out of the decoder in the reverse
    /// order of encoding.
    pub fn encode_symbol(&mut self, symbol: u32) -> Status {
        let sym = self
            .probability_table
            .get(symbol as usize)
            .copied()
            .filter(|sym| sym.prob > 0)
            .ok_or_else(|| DracoError::InvalidParameter(format!("Symbol {} is not in the table", symbol)))?;
        self.rans_write(sym);
        Ok(())
    }

    /// Flushes the coder and writes `varint size | bytes` to `buffer`.
    pub fn end_encoding(&mut self, buffer: &mut EncoderBuffer) -> Status {
        self.ans.write_end()?;
        let data = self.ans.data();
        buffer.encode_varint(data.len() as u64)?;
        buffer.encode_data(data)
    }

    fn rans_write(&mut self, sym: RAnsSymbol) {
        let p = sym.prob;
        while self.ans.state >= Self::L_RANS_BASE / Self::RANS_PRECISION * ANS_IO_BASE * p {
            self.ans.buf.push((self.ans.state % ANS_IO_BASE) as u8);
            self.ans.state /= ANS_IO_BASE;
        }
        self.ans.state = (self.ans.state / p) * Self::RANS_PRECISION + (self.ans.state % p) + sym.cum_prob;
    }
}
