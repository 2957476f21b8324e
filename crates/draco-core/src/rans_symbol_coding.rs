/// Largest bit length for which symbols may be coded directly with rANS.
pub const MAX_RAW_ENCODING_BIT_LENGTH: u32 = 18;

/// Precision of the rANS coder used for the bit-length tags of the tagged
/// scheme.
pub const TAGGED_RANS_PRECISION_BITS: u32 = 12;

#[derive(Debug, Clone, Copy, Default)]
pub struct RAnsSymbol {
    pub prob: u32,
    pub cum_prob: u32,
}

pub fn compute_rans_unclamped_precision(symbols_bit_length: u32) -> u32 {
    (3 * symbols_bit_length) / 2
}

pub fn compute_rans_precision_from_unique_symbols_bit_length(symbols_bit_length: u32) -> u32 {
    compute_rans_unclamped_precision(symbols_bit_length).clamp(12, 20)
}

/// Rough size of a serialized frequency table, zero runs included.
pub fn approximate_rans_frequency_table_bits(max_value: u32, num_unique_symbols: u32) -> u64 {
    let diff = max_value.saturating_sub(num_unique_symbols) as u64;
    let table_zero_frequency_bits = 8 * (num_unique_symbols as u64 + diff / 64);
    8 * num_unique_symbols as u64 + table_zero_frequency_bits
}

/// Shannon entropy of `symbols` in bits, together with the number of distinct
/// symbols. All symbols must be `<= max_value`.
pub fn compute_shannon_entropy(symbols: &[u32], max_value: u32) -> (u64, u32) {
    let mut frequencies = vec![0u64; max_value as usize + 1];
    for &symbol in symbols {
        frequencies[symbol as usize] += 1;
    }
    let total = symbols.len() as f64;
    let mut entropy_bits = 0.0;
    let mut num_unique_symbols = 0;
    for &freq in frequencies.iter().filter(|&&f| f > 0) {
        num_unique_symbols += 1;
        entropy_bits -= freq as f64 * (freq as f64 / total).log2();
    }
    (entropy_bits.ceil() as u64, num_unique_symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_is_clamped() {
        assert_eq!(compute_rans_precision_from_unique_symbols_bit_length(1), 12);
        assert_eq!(compute_rans_precision_from_unique_symbols_bit_length(10), 15);
        assert_eq!(compute_rans_precision_from_unique_symbols_bit_length(18), 20);
    }

    #[test]
    fn test_shannon_entropy() {
        assert_eq!(compute_shannon_entropy(&[3, 3, 3, 3], 3), (0, 1));
        // Two equally likely symbols cost one bit each.
        assert_eq!(compute_shannon_entropy(&[0, 1, 0, 1, 1, 0], 1), (6, 2));
    }
}
