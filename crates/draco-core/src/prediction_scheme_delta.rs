//! Difference prediction: every tuple is predicted by the previous one, the
//! first tuple by zero.

use std::marker::PhantomData;

use num_traits::{WrappingAdd, WrappingSub};

#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeMethod, PredictionSchemeTransformType};
#[cfg(feature = "decoder")]
use crate::prediction_scheme::{PredictionSchemeDecoder, PredictionSchemeDecodingTransform};
#[cfg(feature = "encoder")]
use crate::prediction_scheme::{PredictionSchemeEncoder, PredictionSchemeEncodingTransform};
use crate::status::{DracoError, Status};

/// Plain `original - predicted` corrections. Overflow wraps around, which the
/// decoder undoes with a wrapping add.
#[cfg(feature = "encoder")]
pub struct PredictionSchemeDeltaEncodingTransform<DataType> {
    num_components: usize,
    _marker: PhantomData<DataType>,
}

#[cfg(feature = "encoder")]
impl<DataType> Default for PredictionSchemeDeltaEncodingTransform<DataType> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "encoder")]
impl<DataType> PredictionSchemeDeltaEncodingTransform<DataType> {
    pub fn new() -> Self {
        Self {
            num_components: 0,
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "encoder")]
impl<DataType> PredictionSchemeEncodingTransform<DataType, DataType> for PredictionSchemeDeltaEncodingTransform<DataType>
where
    DataType: Copy + WrappingSub,
{
    fn init(&mut self, _orig_data: &[DataType], num_components: usize) {
        self.num_components = num_components;
    }

    fn compute_correction(
        &self,
        original_vals: &[DataType],
        predicted_vals: &[DataType],
        out_corr_vals: &mut [DataType],
    ) {
        for i in 0..self.num_components {
            out_corr_vals[i] = original_vals[i].wrapping_sub(&predicted_vals[i]);
        }
    }

    fn encode_transform_data(&self, _buffer: &mut EncoderBuffer) -> Status {
        Ok(())
    }

    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Delta
    }
}

#[cfg(feature = "decoder")]
pub struct PredictionSchemeDeltaDecodingTransform<DataType> {
    num_components: usize,
    _marker: PhantomData<DataType>,
}

#[cfg(feature = "decoder")]
impl<DataType> Default for PredictionSchemeDeltaDecodingTransform<DataType> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "decoder")]
impl<DataType> PredictionSchemeDeltaDecodingTransform<DataType> {
    pub fn new() -> Self {
        Self {
            num_components: 0,
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "decoder")]
impl<DataType> PredictionSchemeDecodingTransform<DataType, DataType> for PredictionSchemeDeltaDecodingTransform<DataType>
where
    DataType: Copy + WrappingAdd,
{
    fn init(&mut self, num_components: usize) {
        self.num_components = num_components;
    }

    fn compute_original_value(
        &self,
        predicted_vals: &[DataType],
        corr_vals: &[DataType],
        out_original_vals: &mut [DataType],
    ) {
        for i in 0..self.num_components {
            out_original_vals[i] = predicted_vals[i].wrapping_add(&corr_vals[i]);
        }
    }

    fn decode_transform_data(&mut self, _buffer: &mut DecoderBuffer) -> Status {
        Ok(())
    }

    fn get_type(&self) -> PredictionSchemeTransformType {
        PredictionSchemeTransformType::Delta
    }
}

fn check_tuple_layout(len: usize, out_len: usize, num_components: usize) -> Status {
    if num_components == 0 || len % num_components != 0 {
        return Err(DracoError::InvalidParameter(format!(
            "{} values do not form tuples of {} components",
            len, num_components
        )));
    }
    if out_len < len {
        return Err(DracoError::InvalidParameter("Prediction output is too small".into()));
    }
    Ok(())
}

#[cfg(feature = "encoder")]
pub struct PredictionSchemeDeltaEncoder<DataType, CorrType, Transform> {
    transform: Transform,
    _marker: PhantomData<(DataType, CorrType)>,
}

#[cfg(feature = "encoder")]
impl<DataType, CorrType, Transform> PredictionSchemeDeltaEncoder<DataType, CorrType, Transform>
where
    Transform: PredictionSchemeEncodingTransform<DataType, CorrType>,
{
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "encoder")]
impl<DataType, CorrType, Transform> PredictionScheme for PredictionSchemeDeltaEncoder<DataType, CorrType, Transform>
where
    Transform: PredictionSchemeEncodingTransform<DataType, CorrType>,
{
    fn get_prediction_method(&self) -> PredictionSchemeMethod {
        PredictionSchemeMethod::Difference
    }

    fn get_transform_type(&self) -> PredictionSchemeTransformType {
        self.transform.get_type()
    }

    fn are_corrections_positive(&self) -> bool {
        self.transform.are_corrections_positive()
    }
}

#[cfg(feature = "encoder")]
impl<DataType, CorrType, Transform> PredictionSchemeEncoder<DataType, CorrType>
    for PredictionSchemeDeltaEncoder<DataType, CorrType, Transform>
where
    DataType: Copy + Default,
    Transform: PredictionSchemeEncodingTransform<DataType, CorrType>,
{
    fn compute_correction_values(
        &mut self,
        in_data: &[DataType],
        out_corr: &mut [CorrType],
        num_components: usize,
    ) -> Status {
        check_tuple_layout(in_data.len(), out_corr.len(), num_components)?;
        self.transform.init(in_data, num_components);
        if in_data.is_empty() {
            return Ok(());
        }

        // D(i) - D(i - 1) for every tuple but the first.
        for i in (num_components..in_data.len()).step_by(num_components) {
            self.transform.compute_correction(
                &in_data[i..i + num_components],
                &in_data[i - num_components..i],
                &mut out_corr[i..i + num_components],
            );
        }

        let zero_vals = vec![DataType::default(); num_components];
        self.transform
            .compute_correction(&in_data[..num_components], &zero_vals, &mut out_corr[..num_components]);
        Ok(())
    }

    fn encode_prediction_data(&mut self, buffer: &mut EncoderBuffer) -> Status {
        self.transform.encode_transform_data(buffer)
    }
}

#[cfg(feature = "decoder")]
pub struct PredictionSchemeDeltaDecoder<DataType, CorrType, Transform> {
    transform: Transform,
    _marker: PhantomData<(DataType, CorrType)>,
}

#[cfg(feature = "decoder")]
impl<DataType, CorrType, Transform> PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            _marker: PhantomData,
        }
    }
}

#[cfg(feature = "decoder")]
impl<DataType, CorrType, Transform> PredictionScheme for PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    fn get_prediction_method(&self) -> PredictionSchemeMethod {
        PredictionSchemeMethod::Difference
    }

    fn get_transform_type(&self) -> PredictionSchemeTransformType {
        self.transform.get_type()
    }

    fn are_corrections_positive(&self) -> bool {
        self.transform.are_corrections_positive()
    }
}

#[cfg(feature = "decoder")]
impl<DataType, CorrType, Transform> PredictionSchemeDecoder<DataType, CorrType>
    for PredictionSchemeDeltaDecoder<DataType, CorrType, Transform>
where
    DataType: Copy + Default,
    Transform: PredictionSchemeDecodingTransform<DataType, CorrType>,
{
    fn compute_original_values(
        &mut self,
        in_corr: &[CorrType],
        out_data: &mut [DataType],
        num_components: usize,
    ) -> Status {
        check_tuple_layout(in_corr.len(), out_data.len(), num_components)?;
        self.transform.init(num_components);
        if in_corr.is_empty() {
            return Ok(());
        }

        let zero_vals = vec![DataType::default(); num_components];
        self.transform
            .compute_original_value(&zero_vals, &in_corr[..num_components], &mut out_data[..num_components]);

        // D(i) = D(i - 1) + correction, front to back.
        for i in (num_components..in_corr.len()).step_by(num_components) {
            let (decoded, rest) = out_data.split_at_mut(i);
            self.transform.compute_original_value(
                &decoded[i - num_components..],
                &in_corr[i..i + num_components],
                &mut rest[..num_components],
            );
        }
        Ok(())
    }

    fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer) -> Status {
        self.transform.decode_transform_data(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_corrections() {
        let values = [1i32, 10, 4, 12, 4, 12, -3, 0];
        let mut encoder = PredictionSchemeDeltaEncoder::new(PredictionSchemeDeltaEncodingTransform::<i32>::new());
        let mut corr = vec![0i32; values.len()];
        encoder.compute_correction_values(&values, &mut corr, 2).unwrap();
        assert_eq!(corr, vec![1, 10, 3, 2, 0, 0, -7, -12]);
        assert_eq!(encoder.get_transform_type(), PredictionSchemeTransformType::Delta);

        let mut decoder = PredictionSchemeDeltaDecoder::new(PredictionSchemeDeltaDecodingTransform::<i32>::new());
        let mut decoded = vec![0i32; values.len()];
        decoder.compute_original_values(&corr, &mut decoded, 2).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_delta_wraps_on_overflow() {
        let values = [i32::MIN, i32::MAX, i32::MIN];
        let mut encoder = PredictionSchemeDeltaEncoder::new(PredictionSchemeDeltaEncodingTransform::<i32>::new());
        let mut corr = vec![0i32; 3];
        encoder.compute_correction_values(&values, &mut corr, 1).unwrap();

        let mut decoder = PredictionSchemeDeltaDecoder::new(PredictionSchemeDeltaDecodingTransform::<i32>::new());
        let mut decoded = vec![0i32; 3];
        decoder.compute_original_values(&corr, &mut decoded, 1).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_rejects_partial_tuples() {
        let mut encoder = PredictionSchemeDeltaEncoder::new(PredictionSchemeDeltaEncodingTransform::<i32>::new());
        let mut corr = vec![0i32; 3];
        assert!(encoder.compute_correction_values(&[1, 2, 3], &mut corr, 2).is_err());
        assert!(encoder.compute_correction_values(&[1, 2, 3], &mut corr, 0).is_err());
        assert!(encoder.compute_correction_values(&[], &mut [], 3).is_ok());
    }
}
