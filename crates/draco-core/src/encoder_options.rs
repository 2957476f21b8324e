use std::collections::HashMap;

pub const QUANTIZATION_BITS: &str = "quantization_bits";
pub const QUANTIZATION_ORIGIN: &str = "quantization_origin";
pub const QUANTIZATION_RANGE: &str = "quantization_range";
pub const PREDICTION_SCHEME: &str = "prediction_scheme";
pub const USE_BUILT_IN_ATTRIBUTE_COMPRESSION: &str = "use_built_in_attribute_compression";
pub const ENCODING_SPEED: &str = "encoding_speed";
pub const DECODING_SPEED: &str = "decoding_speed";

/// String-keyed encoder settings.
///
/// Integer options can be set globally or per attribute id; a per-attribute
/// lookup falls back to the global value. Float vectors (explicit
/// quantization origin and range) only exist per attribute.
#[derive(Debug, Clone, Default)]
pub struct EncoderOptions {
    global_options: HashMap<String, i32>,
    attribute_options: HashMap<i32, HashMap<String, i32>>,
    attribute_float_options: HashMap<i32, HashMap<String, Vec<f32>>>,
}

impl EncoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_encoding_speed(&self) -> i32 {
        self.get_global_int(ENCODING_SPEED, 5)
    }

    pub fn get_decoding_speed(&self) -> i32 {
        self.get_global_int(DECODING_SPEED, 5)
    }

    /// Speeds are in `0..=10`, 0 being the slowest and best compressing.
    pub fn set_speed(&mut self, encoding_speed: i32, decoding_speed: i32) {
        self.set_global_int(ENCODING_SPEED, encoding_speed);
        self.set_global_int(DECODING_SPEED, decoding_speed);
    }

    /// Compression effort derived from the encoding speed.
    pub fn compression_level(&self) -> i32 {
        10 - self.get_encoding_speed()
    }

    pub fn get_prediction_scheme(&self) -> i32 {
        self.get_global_int(PREDICTION_SCHEME, -1)
    }

    pub fn set_prediction_scheme(&mut self, value: i32) {
        self.set_global_int(PREDICTION_SCHEME, value);
    }

    pub fn set_global_int(&mut self, key: &str, value: i32) {
        self.global_options.insert(key.to_string(), value);
    }

    pub fn get_global_int(&self, key: &str, default_val: i32) -> i32 {
        *self.global_options.get(key).unwrap_or(&default_val)
    }

    pub fn set_attribute_int(&mut self, att_id: i32, key: &str, value: i32) {
        self.attribute_options
            .entry(att_id)
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn get_attribute_int(&self, att_id: i32, key: &str, default_val: i32) -> i32 {
        if let Some(val) = self.attribute_options.get(&att_id).and_then(|opts| opts.get(key)) {
            return *val;
        }
        self.get_global_int(key, default_val)
    }

    pub fn set_attribute_bool(&mut self, att_id: i32, key: &str, value: bool) {
        self.set_attribute_int(att_id, key, value as i32);
    }

    pub fn get_attribute_bool(&self, att_id: i32, key: &str, default_val: bool) -> bool {
        self.get_attribute_int(att_id, key, default_val as i32) != 0
    }

    pub fn set_attribute_float_vec(&mut self, att_id: i32, key: &str, value: &[f32]) {
        self.attribute_float_options
            .entry(att_id)
            .or_default()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn get_attribute_float_vec(&self, att_id: i32, key: &str) -> Option<&[f32]> {
        self.attribute_float_options
            .get(&att_id)
            .and_then(|opts| opts.get(key))
            .map(Vec::as_slice)
    }

    pub fn get_attribute_float(&self, att_id: i32, key: &str) -> Option<f32> {
        self.get_attribute_float_vec(att_id, key)
            .and_then(|values| values.first().copied())
    }

    /// True when `key` was set for `att_id` itself (global values don't count).
    pub fn is_attribute_option_set(&self, att_id: i32, key: &str) -> bool {
        self.attribute_options
            .get(&att_id)
            .map_or(false, |opts| opts.contains_key(key))
            || self
                .attribute_float_options
                .get(&att_id)
                .map_or(false, |opts| opts.contains_key(key))
    }

    pub fn set_attribute_quantization(&mut self, att_id: i32, quantization_bits: i32) {
        self.set_attribute_int(att_id, QUANTIZATION_BITS, quantization_bits);
    }

    /// Quantizes with a fixed grid instead of one computed from the values.
    pub fn set_attribute_explicit_quantization(&mut self, att_id: i32, quantization_bits: i32, origin: &[f32], range: f32) {
        self.set_attribute_int(att_id, QUANTIZATION_BITS, quantization_bits);
        self.set_attribute_float_vec(att_id, QUANTIZATION_ORIGIN, origin);
        self.set_attribute_float_vec(att_id, QUANTIZATION_RANGE, &[range]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_fallback() {
        let mut options = EncoderOptions::new();
        options.set_global_int(QUANTIZATION_BITS, 11);
        options.set_attribute_quantization(2, 14);
        assert_eq!(options.get_attribute_int(2, QUANTIZATION_BITS, -1), 14);
        assert_eq!(options.get_attribute_int(0, QUANTIZATION_BITS, -1), 11);
        assert!(options.is_attribute_option_set(2, QUANTIZATION_BITS));
        assert!(!options.is_attribute_option_set(0, QUANTIZATION_BITS));
        assert!(options.get_attribute_bool(0, USE_BUILT_IN_ATTRIBUTE_COMPRESSION, true));
    }

    #[test]
    fn test_explicit_quantization() {
        let mut options = EncoderOptions::new();
        options.set_attribute_explicit_quantization(1, 10, &[-1.0, 0.0, 2.0], 4.0);
        assert_eq!(options.get_attribute_float_vec(1, QUANTIZATION_ORIGIN), Some(&[-1.0, 0.0, 2.0][..]));
        assert_eq!(options.get_attribute_float(1, QUANTIZATION_RANGE), Some(4.0));
        assert!(options.is_attribute_option_set(1, QUANTIZATION_ORIGIN));
        assert_eq!(options.get_attribute_float(0, QUANTIZATION_RANGE), None);
    }

    #[test]
    fn test_speed() {
        let mut options = EncoderOptions::new();
        assert_eq!(options.compression_level(), 5);
        options.set_speed(10, 3);
        assert_eq!(options.compression_level(), 0);
        assert_eq!(options.get_decoding_speed(), 3);
    }
}
