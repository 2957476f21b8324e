use log::{debug, warn};

use crate::attributes_encoder::rearrange_by_dependencies;
use crate::compression_config::{EncodedGeometryType, PointCloudEncodingMethod};
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::EncoderOptions;
use crate::point_cloud::PointCloud;
use crate::points_sequencer::LinearSequencer;
use crate::sequential_attribute_encoders_controller::SequentialAttributeEncodersController;
use crate::status::{DracoError, Status};
use crate::version::{DRACO_POINT_CLOUD_BITSTREAM_VERSION_MAJOR, DRACO_POINT_CLOUD_BITSTREAM_VERSION_MINOR};

/// Encodes every attribute of a point cloud with the sequential attribute
/// coders.
///
/// ```text
/// "DRACO" | major | minor | geometry type | method | u16 flags
/// int32 num_points
/// u8 num_attributes_encoders
/// descriptor tables, then the attribute data of each encoder
/// ```
pub struct PointCloudEncoder {
    point_cloud: Option<PointCloud>,
    options: EncoderOptions,
    attributes_encoders: Vec<SequentialAttributeEncodersController<LinearSequencer>>,
    num_encoded_points: usize,
}

impl Default for PointCloudEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PointCloudEncoder {
    pub fn new() -> Self {
        Self {
            point_cloud: None,
            options: EncoderOptions::default(),
            attributes_encoders: Vec::new(),
            num_encoded_points: 0,
        }
    }

    pub fn point_cloud(&self) -> Option<&PointCloud> {
        self.point_cloud.as_ref()
    }

    pub fn set_point_cloud(&mut self, pc: PointCloud) {
        self.point_cloud = Some(pc);
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn get_geometry_type(&self) -> EncodedGeometryType {
        EncodedGeometryType::PointCloud
    }

    pub fn get_encoding_method(&self) -> PointCloudEncodingMethod {
        PointCloudEncodingMethod::PointCloudSequentialEncoding
    }

    pub fn num_encoded_points(&self) -> usize {
        self.num_encoded_points
    }

    /// Appends the encoded point cloud to `out_buffer`. Nothing is appended
    /// when encoding fails.
    pub fn encode(&mut self, options: &EncoderOptions, out_buffer: &mut EncoderBuffer) -> Status {
        self.options = options.clone();
        self.attributes_encoders.clear();
        self.num_encoded_points = 0;

        let mut buffer = EncoderBuffer::new();
        if let Err(err) = self.encode_point_cloud(&mut buffer) {
            warn!("Point cloud encoding failed: {}", err);
            self.attributes_encoders.clear();
            return Err(err);
        }
        out_buffer.encode_data(buffer.data())?;
        self.num_encoded_points = self.point_cloud.as_ref().map_or(0, |pc| pc.num_points());
        Ok(())
    }

    fn encode_point_cloud(&mut self, out_buffer: &mut EncoderBuffer) -> Status {
        let pc = self
            .point_cloud
            .as_ref()
            .ok_or_else(|| DracoError::DracoError("Point cloud not set".into()))?;
        if !pc.is_well_formed() {
            return Err(DracoError::InvalidParameter(
                "Attribute values are not mapped for every point".into(),
            ));
        }
        let num_points = i32::try_from(pc.num_points())
            .map_err(|_| DracoError::InvalidParameter(format!("Too many points: {}", pc.num_points())))?;

        self.encode_header(out_buffer)?;
        out_buffer.encode_i32(num_points)?;

        // All attributes share one sequential controller.
        if pc.num_attributes() > 0 {
            let attribute_ids: Vec<i32> = (0..pc.num_attributes()).collect();
            self.attributes_encoders.push(SequentialAttributeEncodersController::new(
                LinearSequencer::new(pc.num_points()),
                attribute_ids,
            ));
        }
        out_buffer.encode_u8(self.attributes_encoders.len() as u8)?;

        for encoder in self.attributes_encoders.iter_mut() {
            encoder.init(pc, &self.options)?;
        }
        Self::rearrange_attributes_encoders(&mut self.attributes_encoders)?;

        for encoder in &self.attributes_encoders {
            encoder.encode_attributes_encoder_data(pc, out_buffer)?;
        }
        for encoder in self.attributes_encoders.iter_mut() {
            encoder.encode_attributes(pc, out_buffer)?;
        }

        debug!(
            "Encoded {} points with {} attributes into {} bytes",
            pc.num_points(),
            pc.num_attributes(),
            out_buffer.size()
        );
        Ok(())
    }

    /// Puts encoders whose attributes are parents of other encoders'
    /// attributes first.
    fn rearrange_attributes_encoders(
        encoders: &mut Vec<SequentialAttributeEncodersController<LinearSequencer>>,
    ) -> Status {
        let parents: Vec<Vec<usize>> = encoders
            .iter()
            .map(|encoder| {
                encoder
                    .parent_attribute_ids()
                    .iter()
                    .filter_map(|id| encoders.iter().position(|e| e.attribute_ids().contains(id)))
                    .collect()
            })
            .collect();
        let order = rearrange_by_dependencies(encoders.len(), |i| parents[i].clone())?;

        let mut slots: Vec<Option<_>> = encoders.drain(..).map(Some).collect();
        *encoders = order.iter().filter_map(|&i| slots[i].take()).collect();
        Ok(())
    }

    fn encode_header(&self, buffer: &mut EncoderBuffer) -> Status {
        buffer.encode_data(b"DRACO")?;
        buffer.encode_u8(DRACO_POINT_CLOUD_BITSTREAM_VERSION_MAJOR)?;
        buffer.encode_u8(DRACO_POINT_CLOUD_BITSTREAM_VERSION_MINOR)?;
        buffer.encode_u8(self.get_geometry_type() as u8)?;
        buffer.encode_u8(self.get_encoding_method() as u8)?;
        // No metadata.
        buffer.encode_u16(0)
    }
}
