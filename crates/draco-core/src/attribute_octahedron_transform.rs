use crate::attribute_transform::AttributeTransformType;
use crate::attribute_transform_data::AttributeTransformData;
#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::normal_compression_utils::OctahedronToolBox;
use crate::point_attribute::PointAttribute;
use crate::status::{DracoError, Status};

/// Encodes 3-component float vectors as two octahedral coordinates.
///
/// Input vectors are not required to be normalized; the direction is all
/// that survives the transform.
#[derive(Debug, Clone)]
pub struct AttributeOctahedronTransform {
    quantization_bits: i32,
}

impl Default for AttributeOctahedronTransform {
    fn default() -> Self {
        Self { quantization_bits: -1 }
    }
}

impl AttributeOctahedronTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parameters(&mut self, quantization_bits: i32) -> Status {
        self.tool_box_for(quantization_bits)?;
        self.quantization_bits = quantization_bits;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.quantization_bits != -1
    }

    pub fn quantization_bits(&self) -> i32 {
        self.quantization_bits
    }

    fn tool_box_for(&self, quantization_bits: i32) -> Result<OctahedronToolBox, DracoError> {
        let mut tool_box = OctahedronToolBox::new();
        if !tool_box.set_quantization_bits(quantization_bits) {
            return Err(DracoError::InvalidParameter(format!(
                "Octahedron quantization bits {} outside of 2..=30",
                quantization_bits
            )));
        }
        Ok(tool_box)
    }

    pub fn init_from_attribute(&mut self, attribute: &PointAttribute) -> Status {
        let data = attribute
            .attribute_transform_data()
            .filter(|data| data.transform_type() == AttributeTransformType::OctahedronTransform)
            .ok_or_else(|| DracoError::DracoError("Attribute has no octahedron data".into()))?;
        let bits = data
            .get_parameter_value::<i32>(0)
            .ok_or_else(|| DracoError::BufferError("Truncated octahedron transform data".into()))?;
        self.set_parameters(bits)
    }

    pub fn copy_to_attribute_transform_data(&self, out_data: &mut AttributeTransformData) -> Status {
        out_data.set_transform_type(AttributeTransformType::OctahedronTransform);
        out_data.append_parameter_value(self.quantization_bits)
    }

    /// Writes `(s, t)` pairs for the vectors of `attribute` into `target`.
    /// An empty `point_ids` converts every stored value in value order.
    pub fn transform_attribute(&self, attribute: &PointAttribute, point_ids: &[PointIndex], target: &mut PointAttribute) -> Status {
        let tool_box = self.tool_box_for(self.quantization_bits)?;
        if attribute.data_type() != DataType::Float32 || attribute.num_components() != 3 {
            return Err(DracoError::InvalidParameter(
                "Octahedron transform needs a 3-component float32 attribute".into(),
            ));
        }
        let num_values = if point_ids.is_empty() { attribute.size() } else { point_ids.len() };
        if target.size() < num_values {
            return Err(DracoError::InvalidParameter("Portable attribute is too small".into()));
        }

        for i in 0..num_values {
            let value_index = if point_ids.is_empty() {
                AttributeValueIndex(i as u32)
            } else {
                attribute.mapped_index(point_ids[i])
            };
            let vector = attribute
                .get_value::<f32, 3>(value_index)
                .ok_or_else(|| DracoError::BufferError(format!("Attribute value {} out of bounds", value_index.0)))?;
            let (s, t) = tool_box.float_vector_to_quantized_octahedral_coords(&vector);
            target.set_typed_value(AttributeValueIndex(i as u32), &[s as u32, t as u32])?;
        }
        Ok(())
    }

    /// Converts the `(s, t)` pairs of `attribute` back into unit vectors.
    pub fn inverse_transform_attribute(&self, attribute: &PointAttribute, target: &mut PointAttribute) -> Status {
        if target.data_type() != DataType::Float32 || target.num_components() != 3 {
            return Err(DracoError::InvalidParameter(
                "Octahedron target must be a 3-component float32 attribute".into(),
            ));
        }
        let tool_box = self.tool_box_for(self.quantization_bits)?;
        for i in 0..target.size() {
            let index = AttributeValueIndex(i as u32);
            let [s, t] = attribute
                .get_value::<i32, 2>(index)
                .ok_or_else(|| DracoError::BufferError(format!("Portable value {} out of bounds", i)))?;
            let vector = tool_box.quantized_octahedral_coords_to_unit_vector(s, t);
            target.set_typed_value(index, &vector)?;
        }
        Ok(())
    }

    #[cfg(feature = "encoder")]
    pub fn encode_parameters(&self, encoder_buffer: &mut EncoderBuffer) -> Status {
        if !self.is_initialized() {
            return Err(DracoError::DracoError("Octahedron transform is not initialized".into()));
        }
        encoder_buffer.encode_u8(self.quantization_bits as u8)
    }

    #[cfg(feature = "decoder")]
    pub fn decode_parameters(&mut self, _attribute: &PointAttribute, decoder_buffer: &mut DecoderBuffer) -> Status {
        let bits = decoder_buffer.decode_u8()?;
        self.set_parameters(bits as i32)
    }

    pub fn transformed_data_type(&self, _attribute: &PointAttribute) -> DataType {
        DataType::Uint32
    }

    pub fn transformed_num_components(&self, _attribute: &PointAttribute) -> u8 {
        2
    }
}
