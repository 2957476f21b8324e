/// Position of the most significant set bit. `n` must be non-zero.
pub fn most_significant_bit(n: u32) -> u32 {
    debug_assert!(n != 0);
    31 - n.leading_zeros()
}

/// Number of bits needed to store `n`; zero still takes one bit.
pub fn bit_length(n: u32) -> u32 {
    most_significant_bit(n.max(1)) + 1
}

/// Zig-zag maps a signed integer onto an unsigned symbol:
/// non-negative values go to even symbols, negative ones to odd symbols.
#[inline]
pub fn convert_signed_int_to_symbol(value: i32) -> u32 {
    let v = value as u32;
    if value >= 0 {
        v << 1
    } else {
        (!v << 1) | 1
    }
}

#[inline]
pub fn convert_symbol_to_signed_int(symbol: u32) -> i32 {
    let v = symbol >> 1;
    if symbol & 1 == 0 {
        v as i32
    } else {
        !v as i32
    }
}

pub fn convert_signed_ints_to_symbols(input: &[i32], output: &mut [u32]) {
    for (out, &value) in output.iter_mut().zip(input) {
        *out = convert_signed_int_to_symbol(value);
    }
}

pub fn convert_symbols_to_signed_ints(input: &[u32], output: &mut [i32]) {
    for (out, &symbol) in output.iter_mut().zip(input) {
        *out = convert_symbol_to_signed_int(symbol);
    }
}
