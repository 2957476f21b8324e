#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::status::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSchemeMethod {
    None = -2,
    Undefined = -1,
    Difference = 0,
}

impl TryFrom<i8> for PredictionSchemeMethod {
    type Error = ();
    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -2 => Ok(PredictionSchemeMethod::None),
            0 => Ok(PredictionSchemeMethod::Difference),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionSchemeTransformType {
    None = -1,
    Delta = 0,
    Wrap = 1,
}

impl TryFrom<i8> for PredictionSchemeTransformType {
    type Error = ();
    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PredictionSchemeTransformType::Delta),
            1 => Ok(PredictionSchemeTransformType::Wrap),
            _ => Err(()),
        }
    }
}

pub trait PredictionScheme {
    fn get_prediction_method(&self) -> PredictionSchemeMethod;
    fn get_transform_type(&self) -> PredictionSchemeTransformType;

    /// Number of attributes the predictor reads besides the predicted one.
    fn get_num_parent_attributes(&self) -> usize {
        0
    }

    /// Returns true if the correction values are always non-negative, in
    /// which case they are coded without zig-zag mapping.
    fn are_corrections_positive(&self) -> bool {
        false
    }
}

#[cfg(feature = "encoder")]
pub trait PredictionSchemeEncodingTransform<DataType, CorrType> {
    fn init(&mut self, orig_data: &[DataType], num_components: usize);
    fn compute_correction(
        &self,
        original_vals: &[DataType],
        predicted_vals: &[DataType],
        out_corr_vals: &mut [CorrType],
    );
    fn encode_transform_data(&self, buffer: &mut EncoderBuffer) -> Status;
    fn get_type(&self) -> PredictionSchemeTransformType;

    fn are_corrections_positive(&self) -> bool {
        false
    }
}

#[cfg(feature = "decoder")]
pub trait PredictionSchemeDecodingTransform<DataType, CorrType> {
    fn init(&mut self, num_components: usize);
    fn compute_original_value(
        &self,
        predicted_vals: &[DataType],
        corr_vals: &[CorrType],
        out_original_vals: &mut [DataType],
    );
    fn decode_transform_data(&mut self, buffer: &mut DecoderBuffer) -> Status;
    fn get_type(&self) -> PredictionSchemeTransformType;

    fn are_corrections_positive(&self) -> bool {
        false
    }
}

#[cfg(feature = "encoder")]
pub trait PredictionSchemeEncoder<DataType, CorrType>: PredictionScheme {
    /// `in_data` holds whole tuples of `num_components` values.
    fn compute_correction_values(
        &mut self,
        in_data: &[DataType],
        out_corr: &mut [CorrType],
        num_components: usize,
    ) -> Status;

    fn encode_prediction_data(&mut self, buffer: &mut EncoderBuffer) -> Status;
}

#[cfg(feature = "decoder")]
pub trait PredictionSchemeDecoder<DataType, CorrType>: PredictionScheme {
    fn compute_original_values(
        &mut self,
        in_corr: &[CorrType],
        out_data: &mut [DataType],
        num_components: usize,
    ) -> Status;

    fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer) -> Status;
}
