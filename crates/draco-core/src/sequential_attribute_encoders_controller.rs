use log::debug;

use crate::attributes_encoder::{rearrange_by_dependencies, AttributesEncoder};
use crate::draco_types::DataType;
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::{EncoderOptions, QUANTIZATION_BITS};
use crate::geometry_attribute::GeometryAttributeType;
use crate::geometry_indices::PointIndex;
use crate::point_cloud::PointCloud;
use crate::points_sequencer::PointsSequencer;
use crate::sequential_attribute_encoder::{SequentialAttributeEncoder, SequentialEncoder};
use crate::sequential_integer_attribute_encoder::SequentialIntegerAttributeEncoder;
use crate::sequential_normal_attribute_encoder::SequentialNormalAttributeEncoder;
use crate::sequential_quantization_attribute_encoder::SequentialQuantizationAttributeEncoder;
use crate::status::{DracoError, Status};

/// Picks the sequential encoder for an attribute from its data type and the
/// `quantization_bits` option.
pub fn create_sequential_encoder(
    point_cloud: &PointCloud,
    attribute_id: i32,
    options: &EncoderOptions,
) -> Result<Box<dyn SequentialEncoder>, DracoError> {
    let attribute = point_cloud
        .attribute(attribute_id)
        .ok_or_else(|| DracoError::InvalidParameter(format!("Invalid attribute id {}", attribute_id)))?;
    let encoder: Box<dyn SequentialEncoder> = match attribute.data_type() {
        DataType::Int8
        | DataType::Uint8
        | DataType::Int16
        | DataType::Uint16
        | DataType::Int32
        | DataType::Uint32 => Box::new(SequentialIntegerAttributeEncoder::new()),
        DataType::Float32 if options.get_attribute_int(attribute_id, QUANTIZATION_BITS, -1) > 0 => {
            if attribute.attribute_type() == GeometryAttributeType::Normal {
                Box::new(SequentialNormalAttributeEncoder::new())
            } else {
                Box::new(SequentialQuantizationAttributeEncoder::new())
            }
        }
        _ => Box::new(SequentialAttributeEncoder::new()),
    };
    debug!(
        "Attribute {} ({:?}, {}): sequential encoder {:?}",
        attribute_id,
        attribute.attribute_type(),
        attribute.data_type(),
        encoder.get_unique_id()
    );
    Ok(encoder)
}

/// Encodes a group of attributes one after another in the point order
/// produced by a [`PointsSequencer`].
pub struct SequentialAttributeEncodersController<S: PointsSequencer> {
    base: AttributesEncoder,
    sequencer: S,
    sequential_encoders: Vec<Box<dyn SequentialEncoder>>,
    point_ids: Vec<PointIndex>,
}

impl<S: PointsSequencer> SequentialAttributeEncodersController<S> {
    pub fn new(sequencer: S, attribute_ids: Vec<i32>) -> Self {
        Self {
            base: AttributesEncoder::with_attribute_ids(attribute_ids),
            sequencer,
            sequential_encoders: Vec::new(),
            point_ids: Vec::new(),
        }
    }

    pub fn attribute_ids(&self) -> &[i32] {
        self.base.attribute_ids()
    }

    /// Creates and initializes one sequential encoder per attribute, then
    /// orders them so that parent attributes are encoded first.
    pub fn init(&mut self, point_cloud: &PointCloud, options: &EncoderOptions) -> Status {
        let mut encoders = Vec::with_capacity(self.base.num_attributes());
        for &att_id in self.base.attribute_ids() {
            let mut encoder = create_sequential_encoder(point_cloud, att_id, options)?;
            encoder.init(point_cloud, att_id, options)?;
            encoders.push(encoder);
        }

        let ids = self.base.attribute_ids().to_vec();
        let local_id = |att_id: i32| ids.iter().position(|&id| id == att_id);
        let mut parents = Vec::with_capacity(encoders.len());
        for encoder in &encoders {
            let mut local_parents = Vec::new();
            for parent in encoder.parent_attribute_ids() {
                local_parents.push(local_id(parent).ok_or_else(|| {
                    DracoError::InvalidParameter(format!(
                        "Parent attribute {} is not encoded with attribute {}",
                        parent,
                        encoder.attribute_id()
                    ))
                })?);
            }
            parents.push(local_parents);
        }
        let order = rearrange_by_dependencies(encoders.len(), |i| parents[i].clone())?;

        let mut slots: Vec<Option<Box<dyn SequentialEncoder>>> = encoders.into_iter().map(Some).collect();
        self.sequential_encoders = order.iter().filter_map(|&i| slots[i].take()).collect();
        self.base.set_attribute_ids(order.iter().map(|&i| ids[i]).collect());
        Ok(())
    }

    /// Attributes from other controllers that must be decoded before this
    /// one. Sequential encoders only depend on attributes of their own group.
    pub fn parent_attribute_ids(&self) -> Vec<i32> {
        self.sequential_encoders
            .iter()
            .flat_map(|encoder| encoder.parent_attribute_ids())
            .filter(|id| !self.base.attribute_ids().contains(id))
            .collect()
    }

    /// Descriptor table followed by one encoder id per attribute.
    pub fn encode_attributes_encoder_data(&self, point_cloud: &PointCloud, out_buffer: &mut EncoderBuffer) -> Status {
        if self.sequential_encoders.len() != self.base.num_attributes() {
            return Err(DracoError::DracoError("Attributes encoder is not initialized".into()));
        }
        self.base.encode_attributes_encoder_data(point_cloud, out_buffer)?;
        for encoder in &self.sequential_encoders {
            out_buffer.encode_u8(encoder.get_unique_id() as u8)?;
        }
        Ok(())
    }

    /// Portable values of every attribute, then the transform data of
    /// every attribute.
    pub fn encode_attributes(&mut self, point_cloud: &PointCloud, out_buffer: &mut EncoderBuffer) -> Status {
        self.point_ids = self.sequencer.generate_sequence()?;
        for encoder in self.sequential_encoders.iter_mut() {
            encoder.transform_attribute_to_portable_format(point_cloud, &self.point_ids)?;
        }
        for encoder in self.sequential_encoders.iter_mut() {
            encoder.encode_portable_attribute(point_cloud, &self.point_ids, out_buffer)?;
        }
        for encoder in self.sequential_encoders.iter_mut() {
            encoder.encode_data_needed_by_portable_transform(out_buffer)?;
        }
        Ok(())
    }

    pub fn sequential_encoders(&self) -> &[Box<dyn SequentialEncoder>] {
        &self.sequential_encoders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression_config::SequentialAttributeEncoderType;
    use crate::point_attribute::PointAttribute;
    use crate::points_sequencer::LinearSequencer;

    fn point_cloud() -> PointCloud {
        let mut pc = PointCloud::new();
        let specs = [
            (GeometryAttributeType::Position, DataType::Float32, 3),
            (GeometryAttributeType::Normal, DataType::Float32, 3),
            (GeometryAttributeType::Color, DataType::Uint8, 3),
            (GeometryAttributeType::Generic, DataType::Float64, 1),
        ];
        for (att_type, data_type, num_components) in specs {
            let mut att = PointAttribute::new();
            att.init(att_type, num_components, data_type, false, 0);
            pc.add_attribute(att);
        }
        pc
    }

    fn selected(pc: &PointCloud, options: &EncoderOptions) -> Vec<SequentialAttributeEncoderType> {
        (0..pc.num_attributes())
            .map(|i| create_sequential_encoder(pc, i, options).unwrap().get_unique_id())
            .collect()
    }

    #[test]
    fn test_encoder_selection() {
        let pc = point_cloud();
        assert_eq!(
            selected(&pc, &EncoderOptions::new()),
            vec![
                SequentialAttributeEncoderType::Generic,
                SequentialAttributeEncoderType::Generic,
                SequentialAttributeEncoderType::Integer,
                SequentialAttributeEncoderType::Generic,
            ]
        );

        let mut options = EncoderOptions::new();
        options.set_global_int(QUANTIZATION_BITS, 10);
        assert_eq!(
            selected(&pc, &options),
            vec![
                SequentialAttributeEncoderType::Quantization,
                SequentialAttributeEncoderType::Normals,
                SequentialAttributeEncoderType::Integer,
                SequentialAttributeEncoderType::Generic,
            ]
        );
        assert!(create_sequential_encoder(&pc, 7, &options).is_err());
    }

    #[test]
    fn test_encoder_ids_follow_descriptors() {
        let pc = point_cloud();
        let mut controller = SequentialAttributeEncodersController::new(LinearSequencer::new(0), vec![2, 3]);
        controller.init(&pc, &EncoderOptions::new()).unwrap();
        assert!(controller.parent_attribute_ids().is_empty());

        let mut buffer = EncoderBuffer::new();
        controller.encode_attributes_encoder_data(&pc, &mut buffer).unwrap();
        let data = buffer.data();
        assert_eq!(data[0], 2);
        assert_eq!(&data[data.len() - 2..], &[1, 0]);
    }
}
