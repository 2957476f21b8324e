use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
use crate::geometry_attribute::GeometryAttributeType;
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::status::{DracoError, Status};

/// Reads a descriptor table and creates the described (still empty)
/// attributes in the point cloud.
#[derive(Debug, Clone, Default)]
pub struct AttributesDecoder {
    point_attribute_ids: Vec<i32>,
    /// Point cloud attribute id to index in `point_attribute_ids`, -1 for
    /// attributes of other decoders.
    point_attribute_to_local_id_map: Vec<i32>,
}

impl AttributesDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute_ids(&self) -> &[i32] {
        &self.point_attribute_ids
    }

    pub fn num_attributes(&self) -> usize {
        self.point_attribute_ids.len()
    }

    pub fn get_attribute_id(&self, local_id: usize) -> Option<i32> {
        self.point_attribute_ids.get(local_id).copied()
    }

    pub fn get_local_id_for_point_attribute(&self, point_attribute_id: i32) -> Option<usize> {
        let id = usize::try_from(point_attribute_id).ok()?;
        match self.point_attribute_to_local_id_map.get(id) {
            Some(&local) if local >= 0 => Some(local as usize),
            _ => None,
        }
    }

    pub fn decode_attributes_decoder_data(&mut self, point_cloud: &mut PointCloud, in_buffer: &mut DecoderBuffer<'_>) -> Status {
        let num_attributes = in_buffer.decode_varint()?;
        if num_attributes == 0 {
            return Err(DracoError::BufferError("Attributes decoder without attributes".into()));
        }
        // Every descriptor takes at least five bytes.
        if num_attributes > (in_buffer.remaining_size() / 5) as u64 {
            return Err(DracoError::BufferError(format!(
                "{} attributes can't fit into {} bytes",
                num_attributes,
                in_buffer.remaining_size()
            )));
        }

        self.point_attribute_ids = Vec::with_capacity(num_attributes as usize);
        for _ in 0..num_attributes {
            let raw_type = in_buffer.decode_u8()?;
            let raw_data_type = in_buffer.decode_u8()?;
            let num_components = in_buffer.decode_u8()?;
            let normalized = in_buffer.decode_u8()? != 0;
            let unique_id = in_buffer.decode_varint_u32()?;

            let attribute_type = GeometryAttributeType::try_from(raw_type)
                .map_err(|_| DracoError::BufferError(format!("Invalid attribute type {}", raw_type)))?;
            let data_type = match DataType::try_from(raw_data_type) {
                Ok(DataType::Invalid) | Err(_) => {
                    return Err(DracoError::BufferError(format!("Invalid data type {}", raw_data_type)))
                }
                Ok(data_type) => data_type,
            };
            if num_components == 0 {
                return Err(DracoError::BufferError("Attribute without components".into()));
            }

            let mut attribute = PointAttribute::new();
            attribute.init(attribute_type, num_components, data_type, normalized, 0);
            let att_id = point_cloud.add_attribute(attribute);
            // The point cloud hands out its own ids.
            if let Some(att) = point_cloud.attribute_mut(att_id) {
                att.set_unique_id(unique_id);
            }
            self.point_attribute_ids.push(att_id);
        }

        let max_id = self.point_attribute_ids.iter().copied().max().unwrap_or(-1);
        self.point_attribute_to_local_id_map = vec![-1; (max_id + 1) as usize];
        for (local, &att_id) in self.point_attribute_ids.iter().enumerate() {
            self.point_attribute_to_local_id_map[att_id as usize] = local as i32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes_encoder::AttributesEncoder;
    use crate::encoder_buffer::EncoderBuffer;

    #[test]
    fn test_descriptor_round_trip() {
        let mut pc = PointCloud::new();
        let specs = [
            (GeometryAttributeType::Position, DataType::Float32, 3, false, 0u32),
            (GeometryAttributeType::Color, DataType::Uint8, 4, true, 127),
            (GeometryAttributeType::TexCoord, DataType::Int16, 2, false, 128),
            (GeometryAttributeType::Generic, DataType::Bool, 1, false, 300_000),
        ];
        for (att_type, data_type, num_components, normalized, unique_id) in specs {
            let mut att = PointAttribute::new();
            att.init(att_type, num_components, data_type, normalized, 0);
            let id = pc.add_attribute(att);
            pc.attribute_mut(id).unwrap().set_unique_id(unique_id);
        }
        let mut buffer = EncoderBuffer::new();
        AttributesEncoder::with_attribute_ids(vec![0, 1, 2, 3])
            .encode_attributes_encoder_data(&pc, &mut buffer)
            .unwrap();

        let mut decoded = PointCloud::new();
        let mut decoder = AttributesDecoder::new();
        decoder
            .decode_attributes_decoder_data(&mut decoded, &mut DecoderBuffer::new(buffer.data()))
            .unwrap();
        assert_eq!(decoder.num_attributes(), 4);
        for (i, (att_type, data_type, num_components, normalized, unique_id)) in specs.into_iter().enumerate() {
            let att = decoded.attribute(i as i32).unwrap();
            assert_eq!(att.attribute_type(), att_type);
            assert_eq!(att.data_type(), data_type);
            assert_eq!(att.num_components(), num_components);
            assert_eq!(att.normalized(), normalized);
            assert_eq!(att.unique_id(), unique_id);
            assert_eq!(decoder.get_local_id_for_point_attribute(i as i32), Some(i));
        }
        assert_eq!(decoder.get_local_id_for_point_attribute(9), None);
    }

    #[test]
    fn test_rejects_bad_attribute_counts() {
        let mut pc = PointCloud::new();
        // Zero attributes.
        assert!(AttributesDecoder::new()
            .decode_attributes_decoder_data(&mut pc, &mut DecoderBuffer::new(&[0]))
            .is_err());
        // 11 attributes announced with two bytes left.
        assert!(AttributesDecoder::new()
            .decode_attributes_decoder_data(&mut pc, &mut DecoderBuffer::new(&[11, 0, 0]))
            .is_err());
        assert_eq!(pc.num_attributes(), 0);
    }

    #[test]
    fn test_rejects_bad_descriptors() {
        let cases: [&[u8]; 4] = [
            &[1, 5, 9, 3, 0, 0],
            &[1, 0, 0, 3, 0, 0],
            &[1, 0, 12, 3, 0, 0],
            &[1, 0, 9, 0, 0, 0],
        ];
        for data in cases {
            let mut pc = PointCloud::new();
            assert!(AttributesDecoder::new()
                .decode_attributes_decoder_data(&mut pc, &mut DecoderBuffer::new(data))
                .is_err());
        }
    }
}
