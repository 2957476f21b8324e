use log::debug;

use crate::attribute_transform::AttributeTransform;
use crate::bit_utils::{convert_signed_ints_to_symbols, most_significant_bit};
use crate::compression_config::SequentialAttributeEncoderType;
use crate::draco_types::DataType;
use crate::encoder_buffer::EncoderBuffer;
use crate::encoder_options::{EncoderOptions, PREDICTION_SCHEME, USE_BUILT_IN_ATTRIBUTE_COMPRESSION};
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::point_attribute::PointAttribute;
use crate::point_cloud::PointCloud;
use crate::prediction_scheme::{PredictionScheme, PredictionSchemeEncoder, PredictionSchemeMethod, PredictionSchemeTransformType};
use crate::prediction_scheme_delta::{PredictionSchemeDeltaEncoder, PredictionSchemeDeltaEncodingTransform};
use crate::prediction_scheme_wrap::{is_wrap_range_supported, PredictionSchemeWrapEncodingTransform};
use crate::sequential_attribute_encoder::{SequentialAttributeEncoder, SequentialEncoder};
use crate::status::{DracoError, Status};
use crate::symbol_encoding::{encode_symbols, SymbolEncodingOptions};

/// Maps the `prediction_scheme` option onto a method usable for point
/// clouds. -1 selects the default (difference) prediction.
pub fn prediction_method_from_option(value: i32) -> Result<PredictionSchemeMethod, DracoError> {
    match value {
        -2 => Ok(PredictionSchemeMethod::None),
        -1 | 0 => Ok(PredictionSchemeMethod::Difference),
        _ => Err(DracoError::UnsupportedFeature(format!(
            "Prediction scheme {} is not available for point clouds",
            value
        ))),
    }
}

/// Encodes integer attributes with difference prediction followed by
/// entropy coding of the corrections.
///
/// Values are first copied into an int32 portable attribute in point order.
/// Lossy encoders reuse the same coding on their own portable attribute.
pub struct SequentialIntegerAttributeEncoder {
    base: SequentialAttributeEncoder,
    portable_attribute: Option<PointAttribute>,
    prediction_method: PredictionSchemeMethod,
    use_built_in_compression: bool,
    compression_level: i32,
    prediction_scheme: Option<Box<dyn PredictionSchemeEncoder<i32, i32>>>,
}

impl Default for SequentialIntegerAttributeEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIntegerAttributeEncoder {
    pub fn new() -> Self {
        Self {
            base: SequentialAttributeEncoder::new(),
            portable_attribute: None,
            prediction_method: PredictionSchemeMethod::Difference,
            use_built_in_compression: true,
            compression_level: 5,
            prediction_scheme: None,
        }
    }

    /// Shared part of `init` that reads the coding options. Does not look at
    /// the attribute's data type.
    pub fn init_coding(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> Status {
        self.base.init(point_cloud, attribute_id, options)?;
        self.prediction_method =
            prediction_method_from_option(options.get_attribute_int(attribute_id, PREDICTION_SCHEME, -1))?;
        self.use_built_in_compression =
            options.get_attribute_bool(attribute_id, USE_BUILT_IN_ATTRIBUTE_COMPRESSION, true);
        self.compression_level = options.compression_level();
        Ok(())
    }

    pub fn attribute<'p>(&self, point_cloud: &'p PointCloud) -> Result<&'p PointAttribute, DracoError> {
        self.base.attribute(point_cloud)
    }

    /// Applies `transform` to the values of `point_ids` and keeps the result
    /// as the portable attribute.
    pub fn prepare_transformed_values(
        &mut self,
        point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        transform: &AttributeTransform,
    ) -> Status {
        let attribute = self.base.attribute(point_cloud)?;
        let mut portable = transform.init_transformed_attribute(attribute, point_ids.len());
        // An empty id list would select every stored value.
        if !point_ids.is_empty() {
            transform.transform_attribute(attribute, point_ids, &mut portable)?;
        }
        self.portable_attribute = Some(portable);
        Ok(())
    }

    pub fn prediction_method(&self) -> PredictionSchemeMethod {
        self.prediction_method
    }

    /// Copies the attribute values into an int32 attribute in point order.
    /// Fails on values that do not fit into int32.
    fn prepare_values(&mut self, point_cloud: &PointCloud, point_ids: &[PointIndex]) -> Status {
        let attribute = self.base.attribute(point_cloud)?;
        let num_components = attribute.num_components();
        let mut portable = PointAttribute::new();
        portable.init(
            attribute.attribute_type(),
            num_components,
            DataType::Int32,
            false,
            point_ids.len(),
        );
        portable.set_unique_id(attribute.unique_id());

        let mut value = vec![0i32; num_components as usize];
        for (i, &point_id) in point_ids.iter().enumerate() {
            let entry = attribute.mapped_index(point_id);
            if !attribute.convert_value(entry, &mut value) {
                return Err(DracoError::InvalidParameter(format!(
                    "Value {} of attribute {} can't be stored as int32",
                    entry.0,
                    self.base.attribute_id()
                )));
            }
            portable.set_typed_value(AttributeValueIndex(i as u32), &value)?;
        }
        self.portable_attribute = Some(portable);
        Ok(())
    }

    fn create_prediction_scheme(&self, values: &[i32]) -> Option<Box<dyn PredictionSchemeEncoder<i32, i32>>> {
        match self.prediction_method {
            PredictionSchemeMethod::Difference if is_wrap_range_supported(values) => Some(Box::new(
                PredictionSchemeDeltaEncoder::new(PredictionSchemeWrapEncodingTransform::new()),
            )),
            PredictionSchemeMethod::Difference => Some(Box::new(PredictionSchemeDeltaEncoder::new(
                PredictionSchemeDeltaEncodingTransform::<i32>::new(),
            ))),
            PredictionSchemeMethod::None | PredictionSchemeMethod::Undefined => None,
        }
    }

    /// Encodes the first `num_points` values of the portable attribute.
    pub fn encode_values(&mut self, num_points: usize, out_buffer: &mut EncoderBuffer) -> Status {
        let portable = self
            .portable_attribute
            .as_ref()
            .ok_or_else(|| DracoError::DracoError("Attribute was not transformed to portable format".into()))?;
        let num_components = portable.num_components() as usize;
        if num_components == 0 {
            return Err(DracoError::InvalidParameter("Attribute has no components".into()));
        }
        if portable.size() < num_points {
            return Err(DracoError::DracoError("Portable attribute is missing values".into()));
        }

        let num_values = num_points * num_components;
        let mut values = vec![0i32; num_values];
        for (i, tuple) in values.chunks_mut(num_components).enumerate() {
            if !portable.convert_value(AttributeValueIndex(i as u32), tuple) {
                return Err(DracoError::InvalidParameter(format!("Portable value {} exceeds int32", i)));
            }
        }

        self.prediction_scheme = self.create_prediction_scheme(&values);
        let method = self
            .prediction_scheme
            .as_ref()
            .map_or(PredictionSchemeMethod::None, |scheme| scheme.get_prediction_method());
        out_buffer.encode_i8(method as i8)?;

        let mut corrections = vec![0i32; num_values];
        let mut corrections_positive = false;
        if let Some(scheme) = self.prediction_scheme.as_mut() {
            let transform_type: PredictionSchemeTransformType = scheme.get_transform_type();
            out_buffer.encode_i8(transform_type as i8)?;
            scheme.compute_correction_values(&values, &mut corrections, num_components)?;
            corrections_positive = scheme.are_corrections_positive();
            debug!(
                "Attribute {}: {:?} prediction with {:?} transform",
                self.base.attribute_id(),
                method,
                transform_type
            );
        } else {
            corrections.copy_from_slice(&values);
        }

        let symbols: Vec<u32> = if corrections_positive {
            corrections.iter().map(|&c| c as u32).collect()
        } else {
            let mut symbols = vec![0u32; num_values];
            convert_signed_ints_to_symbols(&corrections, &mut symbols);
            symbols
        };

        if self.use_built_in_compression {
            out_buffer.encode_u8(1)?;
            let options = SymbolEncodingOptions::with_compression_level(self.compression_level);
            encode_symbols(&symbols, num_components, &options, out_buffer)?;
        } else {
            out_buffer.encode_u8(0)?;
            let masked_value = symbols.iter().fold(0u32, |acc, &s| acc | s);
            let value_msb_pos = if masked_value == 0 { 0 } else { most_significant_bit(masked_value) };
            let num_bytes = 1 + value_msb_pos as usize / 8;
            out_buffer.encode_u8(num_bytes as u8)?;
            for &symbol in &symbols {
                out_buffer.encode_data(&symbol.to_le_bytes()[..num_bytes])?;
            }
        }

        if num_values > 0 {
            if let Some(scheme) = self.prediction_scheme.as_mut() {
                scheme.encode_prediction_data(out_buffer)?;
            }
        }
        Ok(())
    }
}

impl SequentialEncoder for SequentialIntegerAttributeEncoder {
    fn init(&mut self, point_cloud: &PointCloud, attribute_id: i32, options: &EncoderOptions) -> Status {
        self.init_coding(point_cloud, attribute_id, options)?;
        let data_type = self.base.attribute(point_cloud)?.data_type();
        match data_type {
            DataType::Int8
            | DataType::Uint8
            | DataType::Int16
            | DataType::Uint16
            | DataType::Int32
            | DataType::Uint32 => Ok(()),
            _ => Err(DracoError::UnsupportedFeature(format!(
                "Integer encoding of {} attributes",
                data_type
            ))),
        }
    }

    fn attribute_id(&self) -> i32 {
        self.base.attribute_id()
    }

    fn get_unique_id(&self) -> SequentialAttributeEncoderType {
        SequentialAttributeEncoderType::Integer
    }

    fn transform_attribute_to_portable_format(&mut self, point_cloud: &PointCloud, point_ids: &[PointIndex]) -> Status {
        self.prepare_values(point_cloud, point_ids)
    }

    fn encode_portable_attribute(
        &mut self,
        _point_cloud: &PointCloud,
        point_ids: &[PointIndex],
        out_buffer: &mut EncoderBuffer,
    ) -> Status {
        self.encode_values(point_ids.len(), out_buffer)
    }

    fn portable_attribute(&self) -> Option<&PointAttribute> {
        self.portable_attribute.as_ref()
    }
}
