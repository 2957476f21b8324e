use crate::attribute_octahedron_transform::AttributeOctahedronTransform;
use crate::attribute_transform::AttributeTransform;
use crate::compression_config::SequentialAttributeEncoderType;
use crate::draco_types::DataType;
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::{EncoderOptions, QUANTIZATION_BITS};
use crate::geometry_indices::PointIndex;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::sequential_attribute_encoder::SequentialEncoder;
use crate::sequential_integer_attribute_encoder::SequentialIntegerAttributeEncoder;
use crate::status::{DracoError, Status};

/// Encodes normal vectors as quantized octahedral coordinates.
pub struct SequentialNormalAttributeEncoder {
    base: SequentialIntegerAttributeEncoder,
    transform: AttributeTransform,
}

impl Default for SequentialNormalAttributeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialNormalAttributeEncoder {
    pub fn new() -> Self {
        Self {
            base: SequentialIntegerAttributeEncoder::new(),
            transform: AttributeTransform::None,
        }
    }
}

impl SequentialEncoder for SequentialNormalAttributeEncoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> Status {
        self.base.init_coding(point_cloud, attribute_id, options)?;
        let attribute = self.base.attribute(point_cloud)?;
        if attribute.data_type() != DataType::Float32 || attribute.num_components() != 3 {
            return Err(DracoError::InvalidParameter(format!(
                "Normal encoding needs 3 float32 components, attribute {} has {} {}",
                attribute_id,
                attribute.num_components(),
                attribute.data_type()
            )));
        }

        let mut octahedron = AttributeOctahedronTransform::new();
        octahedron.set_parameters(options.get_attribute_int(attribute_id, QUANTIZATION_BITS, -1))?;
        self.transform = AttributeTransform::Octahedron(octahedron);
        Ok(())
    }

    fn attribute_id(&self) -> i32 {
        self.base.attribute_id()
    }

    fn get_unique_id(&self) -> SequentialAttributeEncoderType {
        SequentialAttributeEncoderType::Normals
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
