use log::debug;

use crate::attributes_decoder::AttributesDecoder;
use crate::compression_config::SequentialAttributeEncoderType;
use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::point_cloud::PointCloud;
use crate::points_sequencer::PointsSequencer;
use crate::sequential_attribute_decoder::{SequentialAttributeDecoder, SequentialDecoder};
use crate::sequential_integer_attribute_decoder::SequentialIntegerAttributeDecoder;
use crate::sequential_normal_attribute_decoder::SequentialNormalAttributeDecoder;
use crate::sequential_quantization_attribute_decoder::SequentialQuantizationAttributeDecoder;
use crate::status::{DracoError, Status};

pub fn create_sequential_decoder(decoder_type: SequentialAttributeEncoderType) -> Box<dyn SequentialDecoder> {
    match decoder_type {
        SequentialAttributeEncoderType::Generic => Box::new(SequentialAttributeDecoder::new()),
        SequentialAttributeEncoderType::Integer => Box::new(SequentialIntegerAttributeDecoder::new()),
        SequentialAttributeEncoderType::Quantization => Box::new(SequentialQuantizationAttributeDecoder::new()),
        SequentialAttributeEncoderType::Normals => Box::new(SequentialNormalAttributeDecoder::new()),
    }
}

/// Decodes the attributes written by `SequentialAttributeEncodersController`.
pub struct SequentialAttributeDecodersController<S: PointsSequencer> {
    base: AttributesDecoder,
    sequencer: S,
    sequential_decoders: Vec<Box<dyn SequentialDecoder>>,
}

impl<S: PointsSequencer> SequentialAttributeDecodersController<S> {
    pub fn new(sequencer: S) -> Self {
        Self {
            base: AttributesDecoder::new(),
            sequencer,
            sequential_decoders: Vec::new(),
        }
    }

    pub fn attributes_decoder(&self) -> &AttributesDecoder {
        &self.base
    }

    pub fn attribute_ids(&self) -> &[i32] {
        self.base.attribute_ids()
    }

    /// Reads the descriptor table and the decoder id of every attribute.
    pub fn decode_attributes_decoder_data(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer<'_>,
    ) -> Status {
        self.base.decode_attributes_decoder_data(point_cloud, in_buffer)?;
        self.sequential_decoders = Vec::with_capacity(self.base.num_attributes());
        for &att_id in self.base.attribute_ids() {
            let raw_type = in_buffer.decode_u8()?;
            let decoder_type = SequentialAttributeEncoderType::try_from(raw_type)
                .map_err(|_| DracoError::BufferError(format!("Unknown sequential decoder {}", raw_type)))?;
            debug!("Attribute {}: sequential decoder {:?}", att_id, decoder_type);
            let mut decoder = create_sequential_decoder(decoder_type);
            decoder.init(point_cloud, att_id)?;
            self.sequential_decoders.push(decoder);
        }
        Ok(())
    }

    pub fn decode_attributes(
        &mut self,
        point_cloud: &mut PointCloud,
        in_buffer: &mut DecoderBuffer<'_>,
        options: &DecoderOptions,
    ) -> Status {
        let num_points = self.sequencer.num_points();
        for decoder in self.sequential_decoders.iter_mut() {
            decoder.decode_portable_attribute(point_cloud, num_points, in_buffer)?;
        }
        for decoder in self.sequential_decoders.iter_mut() {
            decoder.decode_data_needed_by_portable_transform(point_cloud, in_buffer)?;
        }
        for decoder in self.sequential_decoders.iter_mut() {
            decoder.transform_attribute_to_original_format(point_cloud, options)?;
        }
        for &att_id in self.base.attribute_ids() {
            let attribute = point_cloud
                .attribute_mut(att_id)
                .ok_or_else(|| DracoError::DracoError(format!("Decoded attribute {} disappeared", att_id)))?;
            self.sequencer.update_point_to_attribute_index_mapping(attribute)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_indices::{AttributeValueIndex, PointIndex};
    use crate::points_sequencer::LinearSequencer;

    #[test]
    fn test_decodes_generic_and_integer_attributes() {
        let data = [
            // Two descriptors: generic int16 scalar, generic uint8 scalar.
            2u8, 4, 3, 1, 0, 0, 4, 2, 1, 0, 1,
            // Generic and integer decoders.
            0, 1,
            // Raw int16 values.
            5, 0, 0xFB, 0xFF,
            // No prediction, raw one byte symbols 2 -> 1, 6 -> 3.
            0xFE, 0, 1, 2, 6,
        ];
        let mut pc = PointCloud::new();
        pc.set_num_points(2);
        let mut buffer = DecoderBuffer::new(&data);
        let mut controller = SequentialAttributeDecodersController::new(LinearSequencer::new(2));
        controller.decode_attributes_decoder_data(&mut pc, &mut buffer).unwrap();
        controller
            .decode_attributes(&mut pc, &mut buffer, &DecoderOptions::new())
            .unwrap();
        assert_eq!(buffer.remaining_size(), 0);

        let first = pc.attribute(0).unwrap();
        assert_eq!(first.get_value::<i16, 1>(first.mapped_index(PointIndex(1))).unwrap(), [-5]);
        let second = pc.attribute(1).unwrap();
        assert_eq!(second.unique_id(), 1);
        assert_eq!(second.get_value::<u8, 1>(AttributeValueIndex(1)).unwrap(), [3]);
        assert!(pc.is_well_formed());
    }

    #[test]
    fn test_unknown_decoder_type() {
        let data = [1u8, 4, 2, 1, 0, 0, 9];
        let mut pc = PointCloud::new();
        let mut controller = SequentialAttributeDecodersController::new(LinearSequencer::new(0));
        assert!(controller
            .decode_attributes_decoder_data(&mut pc, &mut DecoderBuffer::new(&data))
            .is_err());
    }
}
