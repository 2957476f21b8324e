//! Entropy coding of unsigned symbols.
//!
//! Two schemes are available:
//! * TAGGED: the bit length of every tuple is rANS coded and the values are
//!   stored with exactly that many bits.
//! * RAW: the symbols themselves are rANS coded. Only used when the largest
//!   symbol fits in [`MAX_RAW_ENCODING_BIT_LENGTH`] bits.
//!
//! The scheme with the lower estimated cost is picked.

#[cfg(feature = "encoder")]
use log::trace;

use crate::bit_utils::bit_length;
#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::rans_symbol_coding::{
    approximate_rans_frequency_table_bits, compute_rans_precision_from_unique_symbols_bit_length,
    compute_shannon_entropy, MAX_RAW_ENCODING_BIT_LENGTH, TAGGED_RANS_PRECISION_BITS,
};
#[cfg(feature = "decoder")]
use crate::rans_symbol_decoder::RAnsSymbolDecoder;
#[cfg(feature = "encoder")]
use crate::rans_symbol_encoder::RAnsSymbolEncoder;
use crate::status::{DracoError, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCodingMethod {
    Tagged = 0,
    Raw = 1,
}

impl TryFrom<u8> for SymbolCodingMethod {
    type Error = ();
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SymbolCodingMethod::Tagged),
            1 => Ok(SymbolCodingMethod::Raw),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolEncodingOptions {
    /// 0 (fastest) to 10 (best). Shifts the rANS precision used by the raw scheme.
    pub compression_level: i32,
}

impl Default for SymbolEncodingOptions {
    fn default() -> Self {
        Self { compression_level: 7 }
    }
}

impl SymbolEncodingOptions {
    pub fn with_compression_level(compression_level: i32) -> Self {
        Self { compression_level }
    }
}

fn check_layout(num_values: usize, num_components: usize) -> Status {
    if num_components == 0 || num_values % num_components != 0 {
        return Err(DracoError::InvalidParameter(format!(
            "{} symbols do not form tuples of {} components",
            num_values, num_components
        )));
    }
    Ok(())
}

/// Bit length of the largest component of every tuple.
#[cfg(feature = "encoder")]
fn compute_bit_lengths(symbols: &[u32], num_components: usize) -> (Vec<u32>, u32) {
    let mut max_value = 0;
    let bit_lengths = symbols
        .chunks(num_components)
        .map(|tuple| {
            let max_component = tuple.iter().copied().max().unwrap_or(0);
            max_value = max_value.max(max_component);
            bit_length(max_component)
        })
        .collect();
    (bit_lengths, max_value)
}

#[cfg(feature = "encoder")]
fn compute_tagged_scheme_bits(bit_lengths: &[u32], num_components: usize) -> u64 {
    let value_bits: u64 = bit_lengths.iter().map(|&len| len as u64 * num_components as u64).sum();
    let (tag_bits, num_unique_tags) = compute_shannon_entropy(bit_lengths, 32);
    value_bits + tag_bits + approximate_rans_frequency_table_bits(32, num_unique_tags)
}

#[cfg(feature = "encoder")]
fn compute_raw_scheme_bits(symbols: &[u32], max_value: u32) -> u64 {
    let (data_bits, num_unique_symbols) = compute_shannon_entropy(symbols, max_value);
    data_bits + approximate_rans_frequency_table_bits(max_value, num_unique_symbols)
}

/// Encodes `symbols` (whole tuples of `num_components`) into `target_buffer`.
/// The decoder has to be told the number of values.
#[cfg(feature = "encoder")]
pub fn encode_symbols(
    symbols: &[u32],
    num_components: usize,
    options: &SymbolEncodingOptions,
    target_buffer: &mut EncoderBuffer,
) -> Status {
    check_layout(symbols.len(), num_components)?;
    if symbols.is_empty() {
        return Ok(());
    }

    let (bit_lengths, max_value) = compute_bit_lengths(symbols, num_components);
    let use_raw = bit_length(max_value) <= MAX_RAW_ENCODING_BIT_LENGTH && {
        // Avoid building the frequency table for symbols that can't be raw coded.
        let tagged_bits = compute_tagged_scheme_bits(&bit_lengths, num_components);
        let raw_bits = compute_raw_scheme_bits(symbols, max_value);
        trace!("Symbol coding estimate: tagged {} bits, raw {} bits", tagged_bits, raw_bits);
        raw_bits < tagged_bits
    };

    if use_raw {
        target_buffer.encode_u8(SymbolCodingMethod::Raw as u8)?;
        encode_raw_symbols(symbols, max_value, options, target_buffer)
    } else {
        target_buffer.encode_u8(SymbolCodingMethod::Tagged as u8)?;
        encode_tagged_symbols(symbols, num_components, &bit_lengths, target_buffer)
    }
}

#[cfg(feature = "encoder")]
fn encode_tagged_symbols(
    symbols: &[u32],
    num_components: usize,
    bit_lengths: &[u32],
    target_buffer: &mut EncoderBuffer,
) -> Status {
    let mut frequencies = vec![0u64; 33];
    for &len in bit_lengths {
        frequencies[len as usize] += 1;
    }

    let mut tag_encoder = RAnsSymbolEncoder::<TAGGED_RANS_PRECISION_BITS>::new();
    tag_encoder.create(&frequencies, target_buffer)?;

    // Values go to a separate bit stream that follows the tags.
    let total_bits: usize = bit_lengths.iter().map(|&len| len as usize * num_components).sum();
    let mut value_buffer = EncoderBuffer::new();
    value_buffer.start_bit_encoding(total_bits)?;
    for (tuple, &len) in symbols.chunks(num_components).zip(bit_lengths) {
        for &value in tuple {
            value_buffer.encode_least_significant_bits32(len, value)?;
        }
    }
    value_buffer.end_bit_encoding();

    tag_encoder.start_encoding();
    for &len in bit_lengths.iter().rev() {
        tag_encoder.encode_symbol(len)?;
    }
    tag_encoder.end_encoding(target_buffer)?;
    target_buffer.encode_data(value_buffer.data())
}

#[cfg(feature = "encoder")]
fn encode_raw_symbols(
    symbols: &[u32],
    max_value: u32,
    options: &SymbolEncodingOptions,
    target_buffer: &mut EncoderBuffer,
) -> Status {
    let mut frequencies = vec![0u64; max_value as usize + 1];
    for &symbol in symbols {
        frequencies[symbol as usize] += 1;
    }
    let num_unique_symbols = frequencies.iter().filter(|&&f| f > 0).count() as u32;

    let mut unique_symbols_bit_length = bit_length(num_unique_symbols) as i32;
    let level = options.compression_level;
    if level < 4 {
        unique_symbols_bit_length -= 2;
    } else if level < 6 {
        unique_symbols_bit_length -= 1;
    } else if level > 9 {
        unique_symbols_bit_length += 2;
    } else if level > 7 {
        unique_symbols_bit_length += 1;
    }
    let unique_symbols_bit_length = unique_symbols_bit_length.clamp(1, MAX_RAW_ENCODING_BIT_LENGTH as i32) as u32;
    target_buffer.encode_u8(unique_symbols_bit_length as u8)?;

    match compute_rans_precision_from_unique_symbols_bit_length(unique_symbols_bit_length) {
        12 => encode_raw_symbols_typed::<12>(symbols, &frequencies, target_buffer),
        13 => encode_raw_symbols_typed::<13>(symbols, &frequencies, target_buffer),
        14 => encode_raw_symbols_typed::<14>(symbols, &frequencies, target_buffer),
        15 => encode_raw_symbols_typed::<15>(symbols, &frequencies, target_buffer),
        16 => encode_raw_symbols_typed::<16>(symbols, &frequencies, target_buffer),
        17 => encode_raw_symbols_typed::<17>(symbols, &frequencies, target_buffer),
        18 => encode_raw_symbols_typed::<18>(symbols, &frequencies, target_buffer),
        19 => encode_raw_symbols_typed::<19>(symbols, &frequencies, target_buffer),
        20 => encode_raw_symbols_typed::<20>(symbols, &frequencies, target_buffer),
        precision => Err(DracoError::DracoError(format!("Unsupported rANS precision {}", precision))),
    }
}

#[cfg(feature = "encoder")]
fn encode_raw_symbols_typed<const PRECISION_BITS: u32>(
    symbols: &[u32],
    frequencies: &[u64],
    target_buffer: &mut EncoderBuffer,
) -> Status {
    let mut encoder = RAnsSymbolEncoder::<PRECISION_BITS>::new();
    encoder.create(frequencies, target_buffer)?;
    encoder.start_encoding();
    for &symbol in symbols.iter().rev() {
        encoder.encode_symbol(symbol)?;
    }
    encoder.end_encoding(target_buffer)
}

/// Decodes `num_values` symbols (tuples of `num_components`) into `out_symbols`.
#[cfg(feature = "decoder")]
pub fn decode_symbols<'a>(
    num_values: usize,
    num_components: usize,
    in_buffer: &mut DecoderBuffer<'a>,
    out_symbols: &mut [u32],
) -> Status {
    check_layout(num_values, num_components)?;
    if out_symbols.len() < num_values {
        return Err(DracoError::InvalidParameter("Symbol output is too small".into()));
    }
    if num_values == 0 {
        return Ok(());
    }

    if num_values > max_decodable_symbols(in_buffer) {
        return Err(DracoError::BufferError(format!(
            "{} symbols do not fit in the remaining {} bytes",
            num_values,
            in_buffer.remaining_size()
        )));
    }

    let scheme = in_buffer.decode_u8()?;
    match SymbolCodingMethod::try_from(scheme) {
        Ok(SymbolCodingMethod::Tagged) => {
            decode_tagged_symbols(num_values, num_components, in_buffer, &mut out_symbols[..num_values])
        }
        Ok(SymbolCodingMethod::Raw) => decode_raw_symbols(in_buffer, &mut out_symbols[..num_values]),
        Err(()) => Err(DracoError::BufferError(format!("Unknown symbol coding scheme {}", scheme))),
    }
}

/// Upper bound on the number of symbols `decode_symbols` can read from the
/// stream starting at the current position of `in_buffer`.
///
/// TAGGED streams spend at least one bit per symbol. A RAW table with a
/// single symbol codes it in zero bits, so RAW streams are not bounded.
/// Unknown schemes are not bounded here either; `decode_symbols` rejects them.
#[cfg(feature = "decoder")]
pub fn max_decodable_symbols(in_buffer: &DecoderBuffer<'_>) -> usize {
    let remaining = in_buffer.remaining_data();
    match remaining.first().map(|&scheme| SymbolCodingMethod::try_from(scheme)) {
        Some(Ok(SymbolCodingMethod::Tagged)) => remaining.len().saturating_mul(8),
        _ => usize::MAX,
    }
}

#[cfg(feature = "decoder")]
fn decode_tagged_symbols<'a>(
    num_values: usize,
    num_components: usize,
    in_buffer: &mut DecoderBuffer<'a>,
    out_symbols: &mut [u32],
) -> Status {
    let mut tag_decoder = RAnsSymbolDecoder::<'a, TAGGED_RANS_PRECISION_BITS>::new();
    tag_decoder.create(in_buffer)?;
    tag_decoder.start_decoding(in_buffer)?;

    in_buffer.start_bit_decoding()?;
    let result = decode_tagged_values(&mut tag_decoder, in_buffer, num_components, out_symbols);
    in_buffer.end_bit_decoding();
    result
}

#[cfg(feature = "decoder")]
fn decode_tagged_values<'a>(
    tag_decoder: &mut RAnsSymbolDecoder<'a, TAGGED_RANS_PRECISION_BITS>,
    in_buffer: &mut DecoderBuffer<'a>,
    num_components: usize,
    out_symbols: &mut [u32],
) -> Status {
    for tuple in out_symbols.chunks_mut(num_components) {
        let len = tag_decoder.decode_symbol();
        if len == 0 || len > 32 {
            return Err(DracoError::BufferError(format!("Invalid symbol bit length {}", len)));
        }
        for value in tuple.iter_mut() {
            *value = in_buffer.decode_least_significant_bits32(len)?;
        }
    }
    Ok(())
}

#[cfg(feature = "decoder")]
fn decode_raw_symbols<'a>(in_buffer: &mut DecoderBuffer<'a>, out_symbols: &mut [u32]) -> Status {
    let unique_symbols_bit_length = in_buffer.decode_u8()? as u32;
    if unique_symbols_bit_length == 0 || unique_symbols_bit_length > MAX_RAW_ENCODING_BIT_LENGTH {
        return Err(DracoError::BufferError(format!(
            "Invalid raw symbol bit length {}",
            unique_symbols_bit_length
        )));
    }

    match compute_rans_precision_from_unique_symbols_bit_length(unique_symbols_bit_length) {
        12 => decode_raw_symbols_typed::<12>(in_buffer, out_symbols),
        13 => decode_raw_symbols_typed::<13>(in_buffer, out_symbols),
        14 => decode_raw_symbols_typed::<14>(in_buffer, out_symbols),
        15 => decode_raw_symbols_typed::<15>(in_buffer, out_symbols),
        16 => decode_raw_symbols_typed::<16>(in_buffer, out_symbols),
        17 => decode_raw_symbols_typed::<17>(in_buffer, out_symbols),
        18 => decode_raw_symbols_typed::<18>(in_buffer, out_symbols),
        19 => decode_raw_symbols_typed::<19>(in_buffer, out_symbols),
        20 => decode_raw_symbols_typed::<20>(in_buffer, out_symbols),
        precision => Err(DracoError::BufferError(format!("Unsupported rANS precision {}", precision))),
    }
}

#[cfg(feature = "decoder")]
fn decode_raw_symbols_typed<'a, const PRECISION_BITS: u32>(
    in_buffer: &mut DecoderBuffer<'a>,
    out_symbols: &mut [u32],
) -> Status {
    let mut decoder = RAnsSymbolDecoder::<'a, PRECISION_BITS>::new();
    decoder.create(in_buffer)?;
    decoder.start_decoding(in_buffer)?;
    for symbol in out_symbols.iter_mut() {
        *symbol = decoder.decode_symbol();
    }
    Ok(())
}
