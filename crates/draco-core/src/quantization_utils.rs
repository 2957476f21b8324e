//! Scalar float <-> integer quantization.
//!
//! Quantization maps `[0, range]` onto `[0, max_quantized_value]` with
//! round-half-up semantics: `floor(v * max / range + 0.5)`. Values outside of
//! the range are not clamped.

#[derive(Debug, Default, Clone, Copy)]
pub struct Quantizer {
    inverse_delta: f32,
}

impl Quantizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, range: f32, max_quantized_value: i32) {
        self.inverse_delta = max_quantized_value as f32 / range;
    }

    pub fn init_with_delta(&mut self, delta: f32) {
        self.inverse_delta = 1.0 / delta;
    }

    /// Float to int conversion saturates, so values far outside of the range
    /// clamp to `i32::MIN`/`i32::MAX` instead of wrapping.
    pub fn quantize_float(&self, val: f32) -> i32 {
        let val = val * self.inverse_delta;
        (val + 0.5).floor() as i32
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Dequantizer {
    delta: f32,
}

impl Dequantizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `max_quantized_value` is not positive.
    pub fn init(&mut self, range: f32, max_quantized_value: i32) -> bool {
        if max_quantized_value <= 0 {
            return false;
        }
        self.delta = range / max_quantized_value as f32;
        true
    }

    pub fn init_with_delta(&mut self, delta: f32) -> bool {
        self.delta = delta;
        true
    }

    pub fn dequantize_float(&self, val: i32) -> f32 {
        val as f32 * self.delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantizer_rounding() {
        let mut quantizer = Quantizer::new();
        quantizer.init(10.0, 255);
        assert_eq!(quantizer.quantize_float(0.0), 0);
        assert_eq!(quantizer.quantize_float(10.0), 255);
        assert_eq!(quantizer.quantize_float(-10.0), -255);
        assert_eq!(quantizer.quantize_float(4.999), 127);
        assert_eq!(quantizer.quantize_float(5.0), 128);
        assert_eq!(quantizer.quantize_float(-5.0), -127);
        assert_eq!(quantizer.quantize_float(-5.0001), -128);
    }

    #[test]
    fn test_quantizer_saturates() {
        let mut quantizer = Quantizer::new();
        quantizer.init(1.0, (1 << 30) - 1);
        assert_eq!(quantizer.quantize_float(1.0e10), i32::MAX);
        assert_eq!(quantizer.quantize_float(-1.0e10), i32::MIN);
    }

    #[test]
    fn test_quantizer_with_delta() {
        let mut quantizer = Quantizer::new();
        quantizer.init_with_delta(0.5);
        assert_eq!(quantizer.quantize_float(2.0), 4);
        assert_eq!(quantizer.quantize_float(2.2), 4);
        assert_eq!(quantizer.quantize_float(2.3), 5);
    }

    #[test]
    fn test_dequantizer_init() {
        let mut dequantizer = Dequantizer::new();
        assert!(!dequantizer.init(1.0, 0));
        assert!(!dequantizer.init(1.0, -4));
        assert!(dequantizer.init(10.0, 255));
        assert!((dequantizer.dequantize_float(255) - 10.0).abs() < 1e-5);
        assert!((dequantizer.dequantize_float(-255) + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_round_trip_within_half_delta() {
        let range = 10.0f32;
        let max = 255;
        let mut quantizer = Quantizer::new();
        quantizer.init(range, max);
        let mut dequantizer = Dequantizer::new();
        assert!(dequantizer.init(range, max));
        let half_delta = range / max as f32 / 2.0;
        let mut v = 0.0f32;
        while v <= range {
            let back = dequantizer.dequantize_float(quantizer.quantize_float(v));
            assert!((back - v).abs() <= half_delta + 1e-5, "{} -> {}", v, back);
            v += 0.0137;
        }
    }
}
