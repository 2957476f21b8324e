use log::{debug, warn};

use crate::compression_config::{EncodedGeometryType, PointCloudEncodingMethod, METADATA_FLAG_MASK};
use crate::decoder_buffer::DecoderBuffer;
use crate::decoder_options::DecoderOptions;
use crate::point_cloud::PointCloud;
use crate::points_sequencer::LinearSequencer;
use crate::sequential_attribute_decoders_controller::SequentialAttributeDecodersController;
use crate::status::{DracoError, Status, StatusOr};
use crate::version::is_supported_version;

/// Fixed-size header in front of every encoded geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DracoHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub encoder_type: EncodedGeometryType,
    pub encoder_method: u8,
    pub flags: u16,
}

pub struct PointCloudDecoder {
    options: DecoderOptions,
    header: Option<DracoHeader>,
    attributes_decoders: Vec<SequentialAttributeDecodersController<LinearSequencer>>,
    /// Attribute id to index of the decoder that owns it.
    attribute_to_decoder_map: Vec<i32>,
}

impl Default for PointCloudDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudDecoder {
    pub fn new() -> Self {
        Self {
            options: DecoderOptions::new(),
            header: None,
            attributes_decoders: Vec::new(),
            attribute_to_decoder_map: Vec::new(),
        }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn header(&self) -> Option<&DracoHeader> {
        self.header.as_ref()
    }

    pub fn get_geometry_type(&self) -> EncodedGeometryType {
        EncodedGeometryType::PointCloud
    }

    /// Index of the attributes decoder that decoded `att_id`.
    pub fn get_attribute_decoder_id(&self, att_id: i32) -> Option<usize> {
        let index = usize::try_from(att_id).ok()?;
        match self.attribute_to_decoder_map.get(index) {
            Some(&decoder_id) if decoder_id >= 0 => Some(decoder_id as usize),
            _ => None,
        }
    }

    pub fn decode(&mut self, options: &DecoderOptions, in_buffer: &mut DecoderBuffer<'_>, out_pc: &mut PointCloud) -> Status {
        self.options = options.clone();
        self.attributes_decoders.clear();
        self.attribute_to_decoder_map.clear();
        let result = self.decode_point_cloud(in_buffer, out_pc);
        if let Err(err) = &result {
            warn!("Point cloud decoding failed at byte {}: {}", in_buffer.position(), err);
        }
        result
    }

    fn decode_point_cloud(&mut self, in_buffer: &mut DecoderBuffer<'_>, out_pc: &mut PointCloud) -> Status {
        let header = Self::decode_header(in_buffer)?;
        if !is_supported_version(header.version_major, header.version_minor) {
            return Err(DracoError::UnsupportedVersion(format!(
                "{}.{}",
                header.version_major, header.version_minor
            )));
        }
        if header.encoder_type != EncodedGeometryType::PointCloud {
            return Err(DracoError::UnsupportedFeature(format!(
                "Geometry type {:?}",
                header.encoder_type
            )));
        }
        if header.encoder_method != PointCloudEncodingMethod::PointCloudSequentialEncoding as u8 {
            return Err(DracoError::UnsupportedFeature(format!(
                "Point cloud encoding method {}",
                header.encoder_method
            )));
        }
        if header.flags & METADATA_FLAG_MASK != 0 {
            return Err(DracoError::UnsupportedFeature("Metadata".into()));
        }
        self.header = Some(header);

        let num_points = in_buffer.decode_i32()?;
        let num_points = usize::try_from(num_points)
            .map_err(|_| DracoError::BufferError(format!("Invalid number of points {}", num_points)))?;
        out_pc.set_num_points(num_points);

        let num_attributes_decoders = in_buffer.decode_u8()?;
        for _ in 0..num_attributes_decoders {
            self.attributes_decoders
                .push(SequentialAttributeDecodersController::new(LinearSequencer::new(num_points)));
        }
        for (decoder_id, decoder) in self.attributes_decoders.iter_mut().enumerate() {
            decoder.decode_attributes_decoder_data(out_pc, in_buffer)?;
            for &att_id in decoder.attribute_ids() {
                let index = att_id as usize;
                if self.attribute_to_decoder_map.len() <= index {
                    self.attribute_to_decoder_map.resize(index + 1, -1);
                }
                self.attribute_to_decoder_map[index] = decoder_id as i32;
            }
        }
        for decoder in self.attributes_decoders.iter_mut() {
            decoder.decode_attributes(out_pc, in_buffer, &self.options)?;
        }
        self.on_attributes_decoded(out_pc)
    }

    fn on_attributes_decoded(&self, out_pc: &PointCloud) -> Status {
        if !out_pc.is_well_formed() {
            return Err(DracoError::DracoError("Decoded attributes do not cover every point".into()));
        }
        debug!(
            "Decoded {} points with {} attributes",
            out_pc.num_points(),
            out_pc.num_attributes()
        );
        Ok(())
    }

    /// Parses the header without validating the version or geometry.
    pub fn decode_header(buffer: &mut DecoderBuffer<'_>) -> StatusOr<DracoHeader> {
        let mut magic = [0u8; 5];
        buffer.decode_bytes(&mut magic)?;
        if &magic != b"DRACO" {
            return Err(DracoError::BufferError("Not a Draco file".into()));
        }
        Ok(DracoHeader {
            version_major: buffer.decode_u8()?,
            version_minor: buffer.decode_u8()?,
            encoder_type: EncodedGeometryType::from(buffer.decode_u8()?),
            encoder_method: buffer.decode_u8()?,
            flags: buffer.decode_u16()?,
        })
    }
}
