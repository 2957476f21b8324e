use crate::attribute_quantization_transform::AttributeQuantizationTransform;
use crate::attribute_transform::AttributeTransform;
use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::draco_types::DataType;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::sequential_attribute_decoder::SequentialDecoder;
use crate::sequential_integer_attribute_decoder::SequentialIntegerAttributeDecoder;
use crate::status::{DracoError, Status};

/// Decodes grid coordinates written by
/// `SequentialQuantizationAttributeEncoder` and dequantizes them.
#[derive(Debug, Clone)]
pub struct SequentialQuantizationAttributeDecoder {
    base: SequentialIntegerAttributeDecoder,
    transform: AttributeTransform,
    portable_attribute: Option<PointAttribute>,
}

impl Default for SequentialQuantizationAttributeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialQuantizationAttributeDecoder {
    pub fn new() -> Self {
        Self {
            base: SequentialIntegerAttributeDecoder::new(),
            transform: AttributeTransform::Quantization(AttributeQuantizationTransform::new()),
            portable_attribute: None,
        }
    }
}

impl SequentialDecoder for SequentialQuantizationAttributeDecoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status {
        self.base.init_coding(point_cloud, attribute_id)?;
        let data_type = self.base.base().attribute(point_cloud)?.data_type();
        if data_type != DataType::Float32 {
            return Err(DracoError::UnsupportedFeature(format!("Dequantization into {}", data_type)));
        }
        Ok(())
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
        let portable = self
            .base
            .decode_transformed_values(point_cloud, &self.transform, num_points, in_buffer)?;
        self.portable_attribute = Some(portable);
        Ok(())
    }

    fn decode_data_needed_by_portable_transform(
        &mut self,
        point_cloud: &PointCloud,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status {
        let attribute = self.base.base().attribute(point_cloud)?;
        self.transform.decode_parameters(attribute, in_buffer)
    }

    fn transform_attribute_to_original_format(&mut self, point_cloud: &mut PointCloud, options: &DecoderOptions) -> Status {
        let portable = self
            .portable_attribute
            .as_ref()
            .ok_or_else(|| DracoError::DracoError("Portable values were not decoded".into()))?;
        self.base.restore_original_values(point_cloud, &self.transform, portable, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder_buffer::EncoderBuffer;
    use crate::geometry_attribute::GeometryAttributeType;
    use crate::geometry_indices::AttributeValueIndex;

    fn point_cloud() -> PointCloud {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Position, 2, DataType::Float32, false, 0);
        let mut pc = PointCloud::new();
        pc.set_num_points(2);
        pc.add_attribute(att);
        pc
    }

    /// Grid values (0, 3) and (3, 0) without prediction, then the grid
    /// min = (1, 1), range = 3, 2 bits.
    fn stream() -> Vec<u8> {
        let mut buffer = EncoderBuffer::new();
        buffer.encode_data(&[0xFE, 0, 1, 0, 6, 6, 0]).unwrap();
        buffer.encode_f32(1.0).unwrap();
        buffer.encode_f32(1.0).unwrap();
        buffer.encode_f32(3.0).unwrap();
        buffer.encode_u8(2).unwrap();
        buffer.into_data()
    }

    fn decode(options: &DecoderOptions) -> PointCloud {
        let mut pc = point_cloud();
        let data = stream();
        let mut buffer = DecoderBuffer::new(&data);
        let mut decoder = SequentialQuantizationAttributeDecoder::new();
        decoder.init(&pc, 0).unwrap();
        decoder
            .decode_portable_attribute(&mut pc, 2, &mut buffer)
            .unwrap();
        decoder.decode_data_needed_by_portable_transform(&pc, &mut buffer).unwrap();
        decoder.transform_attribute_to_original_format(&mut pc, options).unwrap();
        assert_eq!(buffer.remaining_size(), 0);
        pc
    }

    #[test]
    fn test_dequantizes_values() {
        let pc = decode(&DecoderOptions::new());
        let att = pc.attribute(0).unwrap();
        assert_eq!(att.data_type(), DataType::Float32);
        assert_eq!(att.get_value::<f32, 2>(AttributeValueIndex(0)).unwrap(), [1.0, 4.0]);
        assert_eq!(att.get_value::<f32, 2>(AttributeValueIndex(1)).unwrap(), [4.0, 1.0]);
    }

    #[test]
    fn test_skip_transform_keeps_grid_values() {
        let mut options = DecoderOptions::new();
        options.set_skip_attribute_transform(true);
        let pc = decode(&options);
        let att = pc.attribute(0).unwrap();
        assert_eq!(att.data_type(), DataType::Uint32);
        assert_eq!(att.get_value::<u32, 2>(AttributeValueIndex(1)).unwrap(), [3, 0]);

        let transform = AttributeTransform::from_attribute(att).unwrap();
        match transform {
            AttributeTransform::Quantization(q) => {
                assert_eq!(q.quantization_bits(), 2);
                assert_eq!(q.min_values(), &[1.0, 1.0]);
                assert_eq!(q.range(), 3.0);
            }
            other => panic!("unexpected transform {:?}", other),
        }
    }
}
