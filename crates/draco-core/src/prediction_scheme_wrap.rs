//! Wrap transform: predictions are clamped into the value range of the
//! attribute and corrections are wrapped into `[-max_dif / 2, max_dif / 2]`,
//! so they never need more bits than the range itself.

use crate::prediction_scheme::PredictionSchemeTransformType;
use crate::status::Status;

#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
#[cfg(feature = "decoder")]
use crate::prediction_scheme::PredictionSchemeDecodingTransform;
#[cfg(feature = "decoder")]
use crate::status::DracoError;

#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
#[cfg(feature = "encoder")]
use crate::prediction_scheme::PredictionSchemeEncodingTransform;

/// Returns true when the span of `values` can be handled by the wrap
/// transform, i.e. `max - min < i32::MAX`.
pub fn is_wrap_range_supported(values: &[i32]) -> bool {
    let min = values.iter().copied().min().unwrap_or(0) as i64;
    let max = values.iter().copied().max().unwrap_or(0) as i64;
    max - min < i32::MAX as i64
}

#[cfg(feature = "encoder")]
#[derive(Debug, Default, Clone)]
pub struct PredictionSchemeWrapEncodingTransform {
    num_components: usize,
    min_value: i32,
    max_value: i32,
    max_dif: i32,
    min_correction: i32,
    max_correction: i32,
}

#[cfg(feature = "encoder")]
impl PredictionSchemeWrapEncodingTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_value(&self) -> i32 {
        self.min_value
    }

    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    fn init_correction_bounds(&mut self) {
        let dif = self.max_value as i64 - self.min_value as i64;
        debug_assert!(dif < i32::MAX as i64);
        self.max_dif = (1 + dif) as i32;
        self.max_correction = self.max_dif / 2;
        self.min_correction = -self.max_correction;
        if (self.max_dif & 1) == 0 {
            self.max_correction -= 1;
        }
    }
}

#[cfg(feature = "encoder")]
impl PredictionSchemeEncodingTransform<i32, i32> for PredictionSchemeWrapEncodingTransform {
    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Wrap
    }

    fn init(&mut self, orig_data: &[i32], num_components: usize) {
        self.num_components = num_components;
        self.min_value = orig_data.iter().copied().min().unwrap_or(0);
        self.max_value = orig_data.iter().copied().max().unwrap_or(0);
        self.init_correction_bounds();
    }

    fn compute_correction(
        &self,
        original_vals: &[i32],
        predicted_vals: &[i32],
        out_corr_vals: &mut [i32],
    ) {
        for i in 0..self.num_components {
            let pred = predicted_vals[i].clamp(self.min_value, self.max_value);
            let mut corr_val = original_vals[i].wrapping_sub(pred);
            if corr_val < self.min_correction {
                corr_val = corr_val.wrapping_add(self.max_dif);
            } else if corr_val > self.max_correction {
                corr_val = corr_val.wrapping_sub(self.max_dif);
            }
            out_corr_vals[i] = corr_val;
        }
    }

    fn encode_transform_data(&self, buffer: &mut EncoderBuffer) -> Status {
        buffer.encode_i32(self.min_value)?;
        buffer.encode_i32(self.max_value)
    }
}

#[cfg(feature = "decoder")]
#[derive(Debug, Default, Clone)]
pub struct PredictionSchemeWrapDecodingTransform {
    num_components: usize,
    min_value: i32,
    max_value: i32,
    max_dif: i32,
}

#[cfg(feature = "decoder")]
impl PredictionSchemeWrapDecodingTransform {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "decoder")]
impl PredictionSchemeDecodingTransform<i32, i32> for PredictionSchemeWrapDecodingTransform {
    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Wrap
    }

    fn init(&mut self, num_components: usize) {
        self.num_components = num_components;
    }

    fn compute_original_value(
        &self,
        predicted_vals: &[i32],
        corr_vals: &[i32],
        out_original_vals: &mut [i32],
    ) {
        for i in 0..self.num_components {
            let pred = predicted_vals[i].clamp(self.min_value, self.max_value);
            let mut val = pred.wrapping_add(corr_vals[i]);
            if val > self.max_value {
                val = val.wrapping_sub(self.max_dif);
            } else if val < self.min_value {
                val = val.wrapping_add(self.max_dif);
            }
            out_original_vals[i] = val;
        }
    }

    fn decode_transform_data(&mut self, buffer: &mut DecoderBuffer) -> Status {
        let min_value = buffer.decode_i32()?;
        let max_value = buffer.decode_i32()?;
        let dif = max_value as i64 - min_value as i64;
        if dif < 0 || dif >= i32::MAX as i64 {
            return Err(DracoError::DracoError(format!(
                "Invalid wrap transform bounds [{}, {}]",
                min_value, max_value
            )));
        }
        self.min_value = min_value;
        self.max_value = max_value;
        self.max_dif = (1 + dif) as i32;
        Ok(())
    }
}
