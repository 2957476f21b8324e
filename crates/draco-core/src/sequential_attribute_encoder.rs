use crate::compression_config::SequentialAttributeEncoderType;
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::EncoderOptions;
use crate::geometry_indices::PointIndex;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::status::{DracoError, Status, StatusOr};

/// Encoder of a single attribute whose values are visited in the order given
/// by a points sequencer.
///
/// The controller drives every encoder through the same steps:
/// 1. `transform_attribute_to_portable_format`
/// 2. `encode_portable_attribute`
/// 3. `encode_data_needed_by_portable_transform`
///
/// Step 3 runs only after the values of all attributes have been written.
pub trait SequentialEncoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> Status;

    fn attribute_id(&self) -> i32;

    /// Identifier stored in the stream so that the decoder can create the
    /// matching sequential decoder.
    fn get_unique_id(&self) -> SequentialAttributeEncoderType;

    /// Lossy encoders decode into values that differ from the input ones.
    fn is_lossy_encoder(&self) -> bool {
        false
    }

    /// Ids of the attributes that must be encoded before this one.
    fn parent_attribute_ids(&self) -> Vec<i32> {
        Vec::new()
    }

    fn transform_attribute_to_portable_format(
        &mut self,
        _point_cloud: &PointCloud,
        _point_ids: &[PointIndex],
    ) -> Status {
        Ok(())
    }

    fn encode_portable_attribute(
        &mut self,
        point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        out_buffer: &mut EncoderBuffer,
    ) -> Status;

    fn encode_data_needed_by_portable_transform(&mut self, _out_buffer: &mut EncoderBuffer) -> Status {
        Ok(())
    }

    /// Attribute holding the values in the form the decoder will see them,
    /// if it differs from the input attribute.
    fn portable_attribute(&self) -> Option<&PointAttribute> {
        None
    }
}

/// Stores the raw bytes of every value in point order.
#[derive(Debug, Clone)]
pub struct SequentialAttributeEncoder {
    attribute_id: i32,
}

impl Default for SequentialAttributeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialAttributeEncoder {
    pub fn new() -> Self {
        Self { attribute_id: -1 }
    }

    pub fn attribute<'p>(&self, point_cloud: &'p PointCloud) -> StatusOr<&'p PointAttribute> {
        point_cloud
            .attribute(self.attribute_id)
            .ok_or_else(|| DracoError::InvalidParameter(format!("Invalid attribute id {}", self.attribute_id)))
    }
}

impl SequentialEncoder for SequentialAttributeEncoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, _options: &EncoderOptions) -> Status {
        self.attribute_id = attribute_id;
        self.attribute(point_cloud).map(|_| ())
    }

    fn attribute_id(&self) -> i32 {
        self.attribute_id
    }

    fn get_unique_id(&self) -> SequentialAttributeEncoderType {
        SequentialAttributeEncoderType::Generic
    }

    fn encode_portable_attribute(
        &mut self,
        point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        out_buffer: &mut EncoderBuffer,
    ) -> Status {
        let attribute = self.attribute(point_cloud)?;
        for &point_id in point_ids {
            let entry = attribute.mapped_index(point_id);
            let bytes = attribute.value_bytes(entry).ok_or_else(|| {
                DracoError::DracoError(format!("Point {} maps to missing value {}", point_id.0, entry.0))
            })?;
            out_buffer.encode_data(bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draco_types::DataType;
    use crate::geometry_attribute::GeometryAttributeType;
    use crate::geometry_indices::AttributeValueIndex;

    #[test]
    fn test_writes_mapped_values_in_point_order() {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Generic, 2, DataType::Int16, false, 2);
        att.set_typed_value(AttributeValueIndex(0), &[1i16, -1]).unwrap();
        att.set_typed_value(AttributeValueIndex(1), &[258i16, 3]).unwrap();
        att.set_explicit_mapping(3);
        att.set_point_map_entry(PointIndex(0), AttributeValueIndex(1));
        att.set_point_map_entry(PointIndex(1), AttributeValueIndex(0));
        att.set_point_map_entry(PointIndex(2), AttributeValueIndex(1));

        let mut pc = PointCloud::new();
        pc.set_num_points(3);
        let att_id = pc.add_attribute(att);

        let mut encoder = SequentialAttributeEncoder::new();
        encoder.init(&pc, att_id, &EncoderOptions::new()).unwrap();
        let point_ids: Vec<PointIndex> = (0..3).map(PointIndex).collect();
        let mut buffer = EncoderBuffer::new();
        encoder.encode_portable_attribute(&pc, &point_ids, &mut buffer).unwrap();
        assert_eq!(
            buffer.data(),
            &[2, 1, 3, 0, 1, 0, 0xFF, 0xFF, 2, 1, 3, 0]
        );
    }

    #[test]
    fn test_init_rejects_missing_attribute() {
        let pc = PointCloud::new();
        let mut encoder = SequentialAttributeEncoder::new();
        assert!(encoder.init(&pc, 0, &EncoderOptions::new()).is_err());
    }
}
