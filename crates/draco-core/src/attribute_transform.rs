use crate::attribute_octahedron_transform::AttributeOctahedronTransform;
use crate::attribute_quantization_transform::AttributeQuantizationTransform;
use crate::attribute_transform_data::AttributeTransformData;
#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::geometry_indices::PointIndex;
use crate::point_attribute::PointAttribute;
use crate::status::{DracoError, Status, StatusOr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeTransformType {
    InvalidTransform = -1,
    NoTransform = 0,
    QuantizationTransform = 1,
    OctahedronTransform = 2,
}

impl TryFrom<u8> for AttributeTransformType {
    type Error = ();
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AttributeTransformType::NoTransform),
            1 => Ok(AttributeTransformType::QuantizationTransform),
            2 => Ok(AttributeTransformType::OctahedronTransform),
            _ => Err(()),
        }
    }
}

/// Transform from an attribute's original values to its portable integer
/// representation.
#[derive(Debug, Clone, Default)]
pub enum AttributeTransform {
    #[default]
    None,
    Quantization(AttributeQuantizationTransform),
    Octahedron(AttributeOctahedronTransform),
}

impl AttributeTransform {
    /// Rebuilds the transform described by the transform data attached to
    /// `attribute`. Attributes without transform data get `None`.
    pub fn from_attribute(attribute: &PointAttribute) -> StatusOr<Self> {
        let transform_type = match attribute.attribute_transform_data() {
            Some(data) => data.transform_type(),
            None => return Ok(AttributeTransform::None),
        };
        let mut transform = match transform_type {
            AttributeTransformType::QuantizationTransform => {
                AttributeTransform::Quantization(AttributeQuantizationTransform::new())
            }
            AttributeTransformType::OctahedronTransform => {
                AttributeTransform::Octahedron(AttributeOctahedronTransform::new())
            }
            AttributeTransformType::NoTransform => return Ok(AttributeTransform::None),
            AttributeTransformType::InvalidTransform => {
                return Err(DracoError::DracoError("Invalid attribute transform type".into()))
            }
        };
        transform.init_from_attribute(attribute)?;
        Ok(transform)
    }

    pub fn transform_type(&self) -> AttributeTransformType {
        match self {
            AttributeTransform::None => AttributeTransformType::NoTransform,
            AttributeTransform::Quantization(_) => AttributeTransformType::QuantizationTransform,
            AttributeTransform::Octahedron(_) => AttributeTransformType::OctahedronTransform,
        }
    }

    pub fn init_from_attribute(&mut self, attribute: &PointAttribute) -> Status {
        match self {
            AttributeTransform::None => Ok(()),
            AttributeTransform::Quantization(t) => t.init_from_attribute(attribute),
            AttributeTransform::Octahedron(t) => t.init_from_attribute(attribute),
        }
    }

    pub fn copy_to_attribute_transform_data(&self, out_data: &mut AttributeTransformData) -> Status {
        match self {
            AttributeTransform::None => {
                out_data.set_transform_type(AttributeTransformType::NoTransform);
                Ok(())
            }
            AttributeTransform::Quantization(t) => t.copy_to_attribute_transform_data(out_data),
            AttributeTransform::Octahedron(t) => t.copy_to_attribute_transform_data(out_data),
        }
    }

    /// Attaches the parameters of this transform to `attribute`.
    pub fn transfer_to_attribute(&self, attribute: &mut PointAttribute) -> Status {
        let mut data = AttributeTransformData::new();
        self.copy_to_attribute_transform_data(&mut data)?;
        attribute.set_attribute_transform_data(data);
        Ok(())
    }

    /// Creates an empty attribute able to hold `num_entries` transformed
    /// values of `src`.
    pub fn init_transformed_attribute(&self, src: &PointAttribute, num_entries: usize) -> PointAttribute {
        let mut attribute = PointAttribute::new();
        attribute.init(
            src.attribute_type(),
            self.transformed_num_components(src),
            self.transformed_data_type(src),
            false,
            num_entries,
        );
        attribute.set_unique_id(src.unique_id());
        attribute
    }

    pub fn transform_attribute(&self, attribute: &PointAttribute, point_ids: &[PointIndex], target: &mut PointAttribute) -> Status {
        match self {
            AttributeTransform::None => Err(DracoError::DracoError("No transform to apply".into())),
            AttributeTransform::Quantization(t) => t.transform_attribute(attribute, point_ids, target),
            AttributeTransform::Octahedron(t) => t.transform_attribute(attribute, point_ids, target),
        }
    }

    pub fn inverse_transform_attribute(&self, attribute: &PointAttribute, target: &mut PointAttribute) -> Status {
        match self {
            AttributeTransform::None => Err(DracoError::DracoError("No transform to invert".into())),
            AttributeTransform::Quantization(t) => t.inverse_transform_attribute(attribute, target),
            AttributeTransform::Octahedron(t) => t.inverse_transform_attribute(attribute, target),
        }
    }

    #[cfg(feature = "encoder")]
    pub fn encode_parameters(&self, encoder_buffer: &mut EncoderBuffer) -> Status {
        match self {
            AttributeTransform::None => Ok(()),
            AttributeTransform::Quantization(t) => t.encode_parameters(encoder_buffer),
            AttributeTransform::Octahedron(t) => t.encode_parameters(encoder_buffer),
        }
    }

    #[cfg(feature = "decoder")]
    pub fn decode_parameters(&mut self, attribute: &PointAttribute, decoder_buffer: &mut DecoderBuffer) -> Status {
        match self {
            AttributeTransform::None => Ok(()),
            AttributeTransform::Quantization(t) => t.decode_parameters(attribute, decoder_buffer),
            AttributeTransform::Octahedron(t) => t.decode_parameters(attribute, decoder_buffer),
        }
    }

    pub fn transformed_data_type(&self, attribute: &PointAttribute) -> DataType {
        match self {
            AttributeTransform::None => attribute.data_type(),
            AttributeTransform::Quantization(t) => t.transformed_data_type(attribute),
            AttributeTransform::Octahedron(t) => t.transformed_data_type(attribute),
        }
    }

    pub fn transformed_num_components(&self, attribute: &PointAttribute) -> u8 {
        match self {
            AttributeTransform::None => attribute.num_components(),
            AttributeTransform::Quantization(t) => t.transformed_num_components(attribute),
            AttributeTransform::Octahedron(t) => t.transformed_num_components(attribute),
        }
    }
}
