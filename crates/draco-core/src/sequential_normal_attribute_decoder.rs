use crate::attribute_octahedron_transform::AttributeOctahedronTransform;
use crate::attribute_transform::AttributeTransform;
use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::draco_types::DataType;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::sequential_attribute_decoder::SequentialDecoder;
use crate::sequential_integer_attribute_decoder::SequentialIntegerAttributeDecoder;
use crate::status::{DracoError, Status};

/// Decodes octahedral coordinates back into unit vectors.
#[derive(Debug, Clone)]
pub struct SequentialNormalAttributeDecoder {
    base: SequentialIntegerAttributeDecoder,
    transform: AttributeTransform,
    portable_attribute: Option<PointAttribute>,
}

impl Default for SequentialNormalAttributeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialNormalAttributeDecoder {
    pub fn new() -> Self {
        Self {
            base: SequentialIntegerAttributeDecoder::new(),
            transform: AttributeTransform::Octahedron(AttributeOctahedronTransform::new()),
            portable_attribute: None,
        }
    }
}

impl SequentialDecoder for SequentialNormalAttributeDecoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status {
        self.base.init_coding(point_cloud, attribute_id)?;
        let attribute = self.base.base().attribute(point_cloud)?;
        if attribute.data_type() != DataType::Float32 || attribute.num_components() != 3 {
            return Err(DracoError::InvalidParameter(format!(
                "Normals must have 3 float32 components, attribute {} has {}",
                attribute_id,
                attribute.num_components()
            )));
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
    use crate::geometry_attribute::GeometryAttributeType;
    use crate::geometry_indices::AttributeValueIndex;

    fn point_cloud(num_components: u8) -> PointCloud {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Normal, num_components, DataType::Float32, false, 0);
        let mut pc = PointCloud::new();
        pc.set_num_points(1);
        pc.add_attribute(att);
        pc
    }

    #[test]
    fn test_decodes_octahedron_center() {
        let mut pc = point_cloud(3);
        // Raw (s, t) = (127, 127) with 8 bits, which is the +x direction.
        let data = [0xFEu8, 0, 1, 254, 254, 8];
        let mut buffer = DecoderBuffer::new(&data);
        let mut decoder = SequentialNormalAttributeDecoder::new();
        decoder.init(&pc, 0).unwrap();
        decoder.decode_portable_attribute(&mut pc, 1, &mut buffer).unwrap();
        decoder.decode_data_needed_by_portable_transform(&pc, &mut buffer).unwrap();
        decoder
            .transform_attribute_to_original_format(&mut pc, &DecoderOptions::new())
            .unwrap();

        let normal = pc.attribute(0).unwrap().get_value::<f32, 3>(AttributeValueIndex(0)).unwrap();
        let length = normal.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((length - 1.0).abs() < 1e-3);
        assert!(normal[0] > 0.99);
    }

    #[test]
    fn test_rejects_non_vector_attribute() {
        let pc = point_cloud(2);
        assert!(SequentialNormalAttributeDecoder::new().init(&pc, 0).is_err());
    }
}
