use crate::attribute_quantization_transform::AttributeQuantizationTransform;
use crate::attribute_transform::AttributeTransform;
use crate::compression_config::SequentialAttributeEncoderType;
use crate::draco_types::DataType;
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::{EncoderOptions, QUANTIZATION_BITS, QUANTIZATION_ORIGIN, QUANTIZATION_RANGE};
use crate::geometry_indices::PointIndex;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::sequential_attribute_encoder::SequentialEncoder;
use crate::sequential_integer_attribute_encoder::SequentialIntegerAttributeEncoder;
use crate::status::{DracoError, Status};

/// Quantizes float attributes onto a uniform grid and encodes the grid
/// coordinates with the integer coder.
pub struct SequentialQuantizationAttributeEncoder {
    base: SequentialIntegerAttributeEncoder,
    transform: AttributeTransform,
}

impl Default for SequentialQuantizationAttributeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialQuantizationAttributeEncoder {
    pub fn new() -> Self {
        Self {
            base: SequentialIntegerAttributeEncoder::new(),
            transform: AttributeTransform::None,
        }
    }

    fn explicit_grid(options: &EncoderOptions, attribute_id: i32, num_components: usize) -> Result<(Vec<f32>, f32), DracoError> {
        let origin = options
            .get_attribute_float_vec(attribute_id, QUANTIZATION_ORIGIN)
            .ok_or_else(|| DracoError::InvalidParameter("Missing quantization origin".into()))?;
        if origin.len() < num_components {
            return Err(DracoError::InvalidParameter(format!(
                "Quantization origin has {} values for {} components",
                origin.len(),
                num_components
            )));
        }
        let range = options
            .get_attribute_float(attribute_id, QUANTIZATION_RANGE)
            .ok_or_else(|| DracoError::InvalidParameter("Missing quantization range".into()))?;
        if !(range > 0.0 && range.is_finite()) {
            return Err(DracoError::InvalidParameter(format!("Invalid quantization range {}", range)));
        }
        Ok((origin[..num_components].to_vec(), range))
    }
}

impl SequentialEncoder for SequentialQuantizationAttributeEncoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> Status {
        self.base.init_coding(point_cloud, attribute_id, options)?;
        let attribute = self.base.attribute(point_cloud)?;
        if attribute.data_type() != DataType::Float32 {
            return Err(DracoError::UnsupportedFeature(format!(
                "Quantization of {} attributes",
                attribute.data_type()
            )));
        }

        let quantization_bits = options.get_attribute_int(attribute_id, QUANTIZATION_BITS, -1);
        let mut quantization = AttributeQuantizationTransform::new();
        if options.is_attribute_option_set(attribute_id, QUANTIZATION_ORIGIN)
            && options.is_attribute_option_set(attribute_id, QUANTIZATION_RANGE)
        {
            let (origin, range) = Self::explicit_grid(options, attribute_id, attribute.num_components() as usize)?;
            quantization.set_parameters(quantization_bits, &origin, range)?;
        } else {
            quantization.compute_parameters(attribute, quantization_bits)?;
        }
        log::debug!(
            "Attribute {}: {} bit quantization, range {}",
            attribute_id,
            quantization_bits,
            quantization.range()
        );
        self.transform = AttributeTransform::Quantization(quantization);
        Ok(())
    }

    fn attribute_id(&self) -> i32 {
        self.base.attribute_id()
    }

    fn get_unique_id(&self) -> SequentialAttributeEncoderType {
        SequentialAttributeEncoderType::Quantization
    }

    fn is_lossy_encoder(&self) -> bool {
        true
    }

    fn transform_attribute_to_portable_format(&mut self, point_cloud: &PointCloud, point_ids: &[PointIndex]) -> Status {
        self.base.prepare_transformed_values(point_cloud, point_ids, &self.transform)
    }

    fn encode_portable_attribute(
        &mut self,
        _point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        out_buffer: &mut EncoderBuffer,
    ) -> Status {
        self.base.encode_values(point_ids.len(), out_buffer)
    }

    fn encode_data_needed_by_portable_transform(&mut self, out_buffer: &mut EncoderBuffer) -> Status {
        self.transform.encode_parameters(out_buffer)
    }

    fn portable_attribute(&self) -> Option<&PointAttribute> {
        self.base.portable_attribute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder_buffer::DecoderBuffer;
    use crate::geometry_attribute::GeometryAttributeType;
    use crate::geometry_indices::AttributeValueIndex;

    fn positions() -> PointCloud {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Position, 3, DataType::Float32, false, 3);
        att.set_typed_value(AttributeValueIndex(0), &[0.0f32, 0.0, 0.0]).unwrap();
        att.set_typed_value(AttributeValueIndex(1), &[1.0f32, 0.5, 0.25]).unwrap();
        att.set_typed_value(AttributeValueIndex(2), &[2.0f32, 1.0, 0.5]).unwrap();
        let mut pc = PointCloud::new();
        pc.set_num_points(3);
        pc.add_attribute(att);
        pc
    }

    fn point_ids() -> Vec<PointIndex> {
        (0..3).map(PointIndex).collect()
    }

    #[test]
    fn test_portable_values_are_grid_coordinates() {
        let pc = positions();
        let mut options = EncoderOptions::new();
        options.set_attribute_quantization(0, 2);
        let mut encoder = SequentialQuantizationAttributeEncoder::new();
        encoder.init(&pc, 0, &options).unwrap();
        assert!(encoder.is_lossy_encoder());
        encoder.transform_attribute_to_portable_format(&pc, &point_ids()).unwrap();

        let portable = encoder.portable_attribute().unwrap();
        assert_eq!(portable.data_type(), DataType::Uint32);
        assert_eq!(portable.size(), 3);
        // Range 2 over 3 steps.
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(2)).unwrap(), [3, 2, 1]);
    }

    #[test]
    fn test_explicit_grid_parameters() {
        let pc = positions();
        let mut options = EncoderOptions::new();
        options.set_attribute_explicit_quantization(0, 8, &[-1.0, -1.0, -1.0], 4.0);
        let mut encoder = SequentialQuantizationAttributeEncoder::new();
        encoder.init(&pc, 0, &options).unwrap();

        let mut buffer = EncoderBuffer::new();
        encoder.encode_data_needed_by_portable_transform(&mut buffer).unwrap();
        let mut source = DecoderBuffer::new(buffer.data());
        for _ in 0..3 {
            assert_eq!(source.decode_f32().unwrap(), -1.0);
        }
        assert_eq!(source.decode_f32().unwrap(), 4.0);
        assert_eq!(source.decode_u8().unwrap(), 8);
    }

    #[test]
    fn test_requires_quantization_bits_and_floats() {
        let pc = positions();
        let mut encoder = SequentialQuantizationAttributeEncoder::new();
        assert!(encoder.init(&pc, 0, &EncoderOptions::new()).is_err());

        let mut options = EncoderOptions::new();
        options.set_attribute_explicit_quantization(0, 8, &[0.0], 1.0);
        assert!(encoder.init(&pc, 0, &options).is_err());

        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Generic, 1, DataType::Int16, false, 1);
        let mut ints = PointCloud::new();
        ints.add_attribute(att);
        let mut options = EncoderOptions::new();
        options.set_attribute_quantization(0, 8);
        assert!(encoder.init(&ints, 0, &options).is_err());
    }
}
