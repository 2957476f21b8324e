use num_traits::NumCast;

use crate::attribute_transform::AttributeTransform;
use crate::bit_utils::convert_symbols_to_signed_ints;
use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::draco_types::{DataType, ValueType};
use crate::geometry_indices::AttributeValueIndex;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeDecoder, PredictionSchemeMethod, PredictionSchemeTransformType};
use crate::prediction_scheme_delta::{PredictionSchemeDeltaDecoder, PredictionSchemeDeltaDecodingTransform};
use crate::prediction_scheme_wrap::PredictionSchemeWrapDecodingTransform;
use crate::sequential_attribute_decoder::{SequentialAttributeDecoder, SequentialDecoder};
use crate::status::{DracoError, Status, StatusOr};
use crate::symbol_encoding::{decode_symbols, max_decodable_symbols};

fn create_prediction_scheme(
    method: PredictionSchemeMethod,
    transform_type: PredictionSchemeTransformType,
) -> StatusOr<Box<dyn PredictionSchemeDecoder<i32, i32>>> {
    if method != PredictionSchemeMethod::Difference {
        return Err(DracoError::UnsupportedFeature(format!("Prediction method {:?}", method)));
    }
    match transform_type {
        PredictionSchemeTransformType::Delta => Ok(Box::new(PredictionSchemeDeltaDecoder::new(
            PredictionSchemeDeltaDecodingTransform::<i32>::new(),
        ))),
        PredictionSchemeTransformType::Wrap => Ok(Box::new(PredictionSchemeDeltaDecoder::new(
            PredictionSchemeWrapDecodingTransform::new(),
        ))),
        PredictionSchemeTransformType::None => {
            Err(DracoError::UnsupportedFeature("Prediction without a transform".into()))
        }
    }
}

fn store_typed_values<T: ValueType>(attribute: &mut PointAttribute, values: &[i32]) -> Status {
    let num_components = attribute.num_components() as usize;
    let mut tuple = vec![T::default(); num_components];
    for (i, chunk) in values.chunks(num_components).enumerate() {
        for (dst, &src) in tuple.iter_mut().zip(chunk) {
            *dst = <T as NumCast>::from(src).ok_or_else(|| {
                DracoError::BufferError(format!("Decoded value {} does not fit {}", src, attribute.data_type()))
            })?;
        }
        attribute.set_typed_value(AttributeValueIndex(i as u32), &tuple)?;
    }
    Ok(())
}

/// Replaces the values of `attribute` with `values`, converted to the
/// attribute's integer data type.
pub fn store_values(attribute: &mut PointAttribute, values: &[i32]) -> Status {
    let num_components = attribute.num_components() as usize;
    if num_components == 0 || values.len() % num_components != 0 {
        return Err(DracoError::InvalidParameter("Values do not form whole tuples".into()));
    }
    attribute.reset(values.len() / num_components);
    match attribute.data_type() {
        DataType::Int8 => store_typed_values::<i8>(attribute, values),
        DataType::Uint8 => store_typed_values::<u8>(attribute, values),
        DataType::Int16 => store_typed_values::<i16>(attribute, values),
        DataType::Uint16 => store_typed_values::<u16>(attribute, values),
        DataType::Int32 => store_typed_values::<i32>(attribute, values),
        DataType::Uint32 => store_typed_values::<u32>(attribute, values),
        other => Err(DracoError::UnsupportedFeature(format!("Integer decoding into {}", other))),
    }
}

/// Decodes values written by `SequentialIntegerAttributeEncoder`.
#[derive(Debug, Clone, Default)]
pub struct SequentialIntegerAttributeDecoder {
    base: SequentialAttributeDecoder,
}

impl SequentialIntegerAttributeDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init_coding(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status {
        self.base.init(point_cloud, attribute_id)
    }

    pub fn base(&self) -> &SequentialAttributeDecoder {
        &self.base
    }

    /// Reads `num_points` tuples of `num_components` values.
    pub fn decode_values(
        &self,
        num_points: usize,
        num_components: usize,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> StatusOr<Vec<i32>> {
        let raw_method = in_buffer.decode_i8()?;
        let method = PredictionSchemeMethod::try_from(raw_method)
            .map_err(|_| DracoError::BufferError(format!("Invalid prediction method {}", raw_method)))?;
        let mut prediction_scheme = None;
        if method != PredictionSchemeMethod::None {
            let raw_transform = in_buffer.decode_i8()?;
            let transform_type = PredictionSchemeTransformType::try_from(raw_transform)
                .map_err(|_| DracoError::BufferError(format!("Invalid prediction transform {}", raw_transform)))?;
            prediction_scheme = Some(create_prediction_scheme(method, transform_type)?);
        }

        let num_values = num_points
            .checked_mul(num_components)
            .ok_or_else(|| DracoError::BufferError("Value count overflow".into()))?;
        let compressed = in_buffer.decode_u8()?;
        let symbols = if compressed > 0 {
            if num_values > max_decodable_symbols(in_buffer) {
                return Err(DracoError::BufferError(format!(
                    "{} symbols do not fit in the remaining {} bytes",
                    num_values,
                    in_buffer.remaining_size()
                )));
            }
            let mut symbols = vec![0u32; num_values];
            decode_symbols(num_values, num_components, in_buffer, &mut symbols)?;
            symbols
        } else {
            let num_bytes = in_buffer.decode_u8()? as usize;
            if num_bytes == 0 || num_bytes > 4 {
                return Err(DracoError::BufferError(format!("Invalid raw value size {}", num_bytes)));
            }
            if num_values.saturating_mul(num_bytes) > in_buffer.remaining_size() {
                return Err(DracoError::BufferError("Raw values exceed the buffer".into()));
            }
            let mut symbols = vec![0u32; num_values];
            for symbol in symbols.iter_mut() {
                let mut bytes = [0u8; 4];
                in_buffer.decode_bytes(&mut bytes[..num_bytes])?;
                *symbol = u32::from_le_bytes(bytes);
            }
            symbols
        };

        let mut values = vec![0i32; num_values];
        match prediction_scheme.as_mut() {
            Some(scheme) => {
                if num_values > 0 {
                    scheme.decode_prediction_data(in_buffer)?;
                }
                let corrections: Vec<i32> = if scheme.are_corrections_positive() {
                    symbols.iter().map(|&s| s as i32).collect()
                } else {
                    let mut corrections = vec![0i32; num_values];
                    convert_symbols_to_signed_ints(&symbols, &mut corrections);
                    corrections
                };
                scheme.compute_original_values(&corrections, &mut values, num_components)?;
            }
            None => convert_symbols_to_signed_ints(&symbols, &mut values),
        }
        Ok(values)
    }

    /// Decodes the portable form of an attribute that was encoded through
    /// `transform`.
    pub fn decode_transformed_values(
        &self,
        point_cloud: &PointCloud,
        transform: &AttributeTransform,
        num_points: usize,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> StatusOr<PointAttribute> {
        let attribute = self.base.attribute(point_cloud)?;
        let mut portable = transform.init_transformed_attribute(attribute, 0);
        let values = self.decode_values(num_points, portable.num_components() as usize, in_buffer)?;
        store_values(&mut portable, &values)?;
        Ok(portable)
    }

    /// Either reverts `transform` into the attribute or, when the options
    /// ask for it, keeps the portable values and attaches the transform
    /// parameters.
    pub fn restore_original_values(
        &self,
        point_cloud: &mut PointCloud,
        transform: &AttributeTransform,
        portable: &PointAttribute,
        options: &DecoderOptions,
    ) -> Status {
        let attribute = self.base.attribute_mut(point_cloud)?;
        if options.skip_attribute_transform() {
            attribute.copy_from(portable);
            return transform.transfer_to_attribute(attribute);
        }
        attribute.reset(portable.size());
        transform.inverse_transform_attribute(portable, attribute)
    }
}

impl SequentialDecoder for SequentialIntegerAttributeDecoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status {
        self.init_coding(point_cloud, attribute_id)?;
        let data_type = self.base.attribute(point_cloud)?.data_type();
        match data_type {
            DataType::Int8
            | DataType::Uint8
            | DataType::Int16
            | DataType::Uint16
            | DataType::Int32
            | DataType::Uint32 => Ok(()),
            _ => Err(DracoError::UnsupportedFeature(format!(
                "Integer decoding of {} attributes",
                data_type
            ))),
        }
    }

    fn attribute_id(&self) -> i32 {
        self.base.attribute_id()
    }

    fn decode_portable_attribute(
        &mut self,
        point_cloud: &mut PointCloud,
        num_points: usize,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status {
        let num_components = self.base.attribute(point_cloud)?.num_components() as usize;
        let values = self.decode_values(num_points, num_components, in_buffer)?;
        store_values(self.base.attribute_mut(point_cloud)?, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_attribute::GeometryAttributeType;

    fn point_cloud(data_type: DataType, num_components: u8) -> PointCloud {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Generic, num_components, data_type, false, 0);
        let mut pc = PointCloud::new();
        pc.add_attribute(att);
        pc
    }

    #[test]
    fn test_decodes_raw_values() {
        let mut pc = point_cloud(DataType::Int16, 1);
        let data = [0xFEu8, 0, 2, 2, 0, 1, 0, 0x58, 0x02];
        let mut decoder = SequentialIntegerAttributeDecoder::new();
        decoder.init(&pc, 0).unwrap();
        decoder
            .decode_portable_attribute(&mut pc, 3, &mut DecoderBuffer::new(&data))
            .unwrap();
        let att = pc.attribute(0).unwrap();
        let values: Vec<i16> = (0..3)
            .map(|i| att.get_value::<i16, 1>(AttributeValueIndex(i)).unwrap()[0])
            .collect();
        assert_eq!(values, vec![1, -1, 300]);
    }

    #[test]
    fn test_value_count_is_checked_before_allocation() {
        let decoder = SequentialIntegerAttributeDecoder::new();
        // Raw two byte values, four bytes of data.
        let raw = [0xFEu8, 0, 2, 1, 0, 2, 0];
        assert!(decoder.decode_values(1 << 40, 1, &mut DecoderBuffer::new(&raw)).is_err());
        // Tagged symbols spend at least one bit each.
        let tagged = [0xFEu8, 1, 0, 1, 1 << 2, 1, 0];
        assert!(decoder.decode_values(1 << 40, 1, &mut DecoderBuffer::new(&tagged)).is_err());
        assert!(decoder.decode_values(usize::MAX, 2, &mut DecoderBuffer::new(&raw)).is_err());
    }

    #[test]
    fn test_delta_prediction_without_compression() {
        // Difference + delta, raw one byte symbols: 4, +1, -1.
        let data = [0u8, 0, 0, 1, 8, 2, 1];
        let decoder = SequentialIntegerAttributeDecoder::new();
        let values = decoder.decode_values(3, 1, &mut DecoderBuffer::new(&data)).unwrap();
        assert_eq!(values, vec![4, 5, 4]);
    }

    #[test]
    fn test_out_of_range_value_is_rejected() {
        let mut pc = point_cloud(DataType::Uint8, 1);
        // -1 cannot be stored as uint8.
        let data = [0xFEu8, 0, 1, 1];
        let mut decoder = SequentialIntegerAttributeDecoder::new();
        decoder.init(&pc, 0).unwrap();
        assert!(decoder
            .decode_portable_attribute(&mut pc, 1, &mut DecoderBuffer::new(&data))
            .is_err());
    }

    #[test]
    fn test_rejects_malformed_headers() {
        let decoder = SequentialIntegerAttributeDecoder::new();
        // Unknown prediction method.
        assert!(decoder.decode_values(1, 1, &mut DecoderBuffer::new(&[5, 0, 0])).is_err());
        // Unknown transform.
        assert!(decoder.decode_values(1, 1, &mut DecoderBuffer::new(&[0, 7, 0])).is_err());
        // Raw values wider than four bytes.
        assert!(decoder
            .decode_values(1, 1, &mut DecoderBuffer::new(&[0xFE, 0, 5, 0, 0, 0, 0, 0]))
            .is_err());
        // Truncated raw values.
        assert!(decoder.decode_values(4, 1, &mut DecoderBuffer::new(&[0xFE, 0, 1, 1])).is_err());
    }

    #[test]
    fn test_float_attribute_is_rejected() {
        let pc = point_cloud(DataType::Float32, 3);
        assert!(SequentialIntegerAttributeDecoder::new().init(&pc, 0).is_err());
    }
}
