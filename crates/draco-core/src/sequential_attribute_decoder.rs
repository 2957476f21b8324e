use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::geometry_indices::AttributeValueIndex;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::status::{DracoError, Status, StatusOr};

/// Counterpart of `SequentialEncoder`. The controller runs, for every
/// attribute in stream order:
/// 1. `decode_portable_attribute`
/// 2. `decode_data_needed_by_portable_transform`
/// 3. `transform_attribute_to_original_format`
///
/// Each step runs for all attributes before the next one starts.
pub trait SequentialDecoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status;

    fn attribute_id(&self) -> i32;

    fn decode_portable_attribute(
        &mut self,
        point_cloud: &mut PointCloud,
        num_points: usize,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status;

    fn decode_data_needed_by_portable_transform(
        &mut self,
        _point_cloud: &PointCloud,
        _in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status {
        Ok(())
    }

    fn transform_attribute_to_original_format(
        &mut self,
        _point_cloud: &mut PointCloud,
        _options: &DecoderOptions,
    ) -> Status {
        Ok(())
    }
}

/// Reads raw value bytes in point order.
#[derive(Debug, Clone)]
pub struct SequentialAttributeDecoder {
    attribute_id: i32,
}

impl Default for SequentialAttributeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialAttributeDecoder {
    pub fn new() -> Self {
        Self { attribute_id: -1 }
    }

    pub fn attribute<'p>(&self, point_cloud: &'p PointCloud) -> StatusOr<&'p PointAttribute> {
        point_cloud
            .attribute(self.attribute_id)
            .ok_or_else(|| DracoError::InvalidParameter(format!("Invalid attribute id {}", self.attribute_id)))
    }

    pub fn attribute_mut<'p>(&self, point_cloud: &'p mut PointCloud) -> StatusOr<&'p mut PointAttribute> {
        point_cloud
            .attribute_mut(self.attribute_id)
            .ok_or_else(|| DracoError::InvalidParameter(format!("Invalid attribute id {}", self.attribute_id)))
    }
}

impl SequentialDecoder for SequentialAttributeDecoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32) -> Status {
        self.attribute_id = attribute_id;
        self.attribute(point_cloud).map(|_| ())
    }

    fn attribute_id(&self) -> i32 {
        self.attribute_id
    }

    fn decode_portable_attribute(
        &mut self,
        point_cloud: &mut PointCloud,
        num_points: usize,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status {
        let attribute = self.attribute_mut(point_cloud)?;
        let entry_size = attribute.entry_size();
        let num_values = num_points;
        let total_size = num_values
            .checked_mul(entry_size)
            .ok_or_else(|| DracoError::BufferError("Attribute size overflow".into()))?;
        if total_size > in_buffer.remaining_size() {
            return Err(DracoError::BufferError(format!(
                "Attribute needs {} bytes, {} left",
                total_size,
                in_buffer.remaining_size()
            )));
        }

        attribute.reset(num_values);
        for i in 0..num_values {
            let value = in_buffer.decode_slice(entry_size)?;
            attribute.set_attribute_value(AttributeValueIndex(i as u32), value)?;
        }
        Ok(())
    }
}
