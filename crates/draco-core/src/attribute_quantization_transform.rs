use crate::attribute_transform::AttributeTransformType;
use crate::attribute_transform_data::AttributeTransformData;
#[cfg(feature = "decoder")]
use crate::decoder_buffer::DecoderBuffer;
use crate::draco_types::DataType;
#[cfg(feature = "encoder")]
use crate::encoder_buffer::EncoderBuffer;
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::point_attribute::PointAttribute;
use crate::quantization_utils::{Dequantizer, Quantizer};
use crate::status::{DracoError, Status};

/// Quantizes float attributes into unsigned integers of `quantization_bits`
/// bits. All components share a single range so the quantization grid is
/// uniform.
#[derive(Debug, Clone)]
pub struct AttributeQuantizationTransform {
    quantization_bits: i32,
    min_values: Vec<f32>,
    range: f32,
}

impl Default for AttributeQuantizationTransform {
    fn default() -> Self {
        Self {
            quantization_bits: -1,
            min_values: Vec::new(),
            range: 0.0,
        }
    }
}

fn check_quantization_bits(quantization_bits: i32) -> Status {
    if !(1..=30).contains(&quantization_bits) {
        return Err(DracoError::InvalidParameter(format!(
            "Quantization bits {} outside of 1..=30",
            quantization_bits
        )));
    }
    Ok(())
}

impl AttributeQuantizationTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parameters(&mut self, quantization_bits: i32, min_values: &[f32], range: f32) -> Status {
        check_quantization_bits(quantization_bits)?;
        self.quantization_bits = quantization_bits;
        self.min_values = min_values.to_vec();
        self.range = range;
        Ok(())
    }

    /// Computes the per-component minima and the shared range of all values
    /// of `attribute`.
    pub fn compute_parameters(&mut self, attribute: &PointAttribute, quantization_bits: i32) -> Status {
        check_quantization_bits(quantization_bits)?;
        if attribute.data_type() != DataType::Float32 {
            return Err(DracoError::UnsupportedFeature(format!(
                "Quantization of {} attributes",
                attribute.data_type()
            )));
        }
        let num_components = attribute.num_components() as usize;
        self.quantization_bits = quantization_bits;
        self.min_values = vec![0.0; num_components];
        self.range = 1.0;
        if attribute.size() == 0 {
            return Ok(());
        }

        let mut max_values = vec![0.0f32; num_components];
        for i in 0..attribute.size() {
            let value = attribute
                .get_value_vec::<f32>(AttributeValueIndex(i as u32))
                .ok_or_else(|| DracoError::BufferError(format!("Attribute value {} out of bounds", i)))?;
            if value.iter().any(|v| !v.is_finite()) {
                return Err(DracoError::InvalidParameter(format!(
                    "Attribute value {} is NaN or infinite",
                    i
                )));
            }
            for (c, &v) in value.iter().enumerate() {
                if i == 0 || v < self.min_values[c] {
                    self.min_values[c] = v;
                }
                if i == 0 || v > max_values[c] {
                    max_values[c] = v;
                }
            }
        }

        let mut range = 0.0f32;
        for (max, min) in max_values.iter().zip(self.min_values.iter()) {
            let dif = max - min;
            if dif > range {
                range = dif;
            }
        }
        if !range.is_finite() {
            return Err(DracoError::InvalidParameter("Quantization range is infinite".into()));
        }
        if range == 0.0 {
            log::debug!("Degenerate quantization range for attribute {}", attribute.unique_id());
            range = 1.0;
        }
        self.range = range;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.quantization_bits != -1
    }

    pub fn quantization_bits(&self) -> i32 {
        self.quantization_bits
    }

    pub fn min_values(&self) -> &[f32] {
        &self.min_values
    }

    pub fn min_value(&self, axis: usize) -> f32 {
        self.min_values[axis]
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    fn max_quantized_value(&self) -> i32 {
        (1 << self.quantization_bits) - 1
    }

    /// Reads parameters stored by [`Self::copy_to_attribute_transform_data`].
    pub fn init_from_attribute(&mut self, attribute: &PointAttribute) -> Status {
        let data = attribute
            .attribute_transform_data()
            .filter(|data| data.transform_type() == AttributeTransformType::QuantizationTransform)
            .ok_or_else(|| DracoError::DracoError("Attribute has no quantization data".into()))?;
        let truncated = || DracoError::BufferError("Truncated quantization transform data".into());

        let bits = data.get_parameter_value::<i32>(0).ok_or_else(truncated)?;
        check_quantization_bits(bits)?;
        let num_components = attribute.num_components() as usize;
        let mut min_values = Vec::with_capacity(num_components);
        for c in 0..num_components {
            min_values.push(data.get_parameter_value::<f32>(4 + 4 * c).ok_or_else(truncated)?);
        }
        let range = data.get_parameter_value::<f32>(4 + 4 * num_components).ok_or_else(truncated)?;

        self.quantization_bits = bits;
        self.min_values = min_values;
        self.range = range;
        Ok(())
    }

    pub fn copy_to_attribute_transform_data(&self, out_data: &mut AttributeTransformData) -> Status {
        out_data.set_transform_type(AttributeTransformType::QuantizationTransform);
        out_data.append_parameter_value(self.quantization_bits)?;
        for &val in &self.min_values {
            out_data.append_parameter_value(val)?;
        }
        out_data.append_parameter_value(self.range)
    }

    /// Writes quantized values of `attribute` into `target`, which must have
    /// been created with [`crate::attribute_transform::AttributeTransform::init_transformed_attribute`].
    ///
    /// An empty `point_ids` quantizes every stored value in value order.
    pub fn transform_attribute(&self, attribute: &PointAttribute, point_ids: &[PointIndex], target: &mut PointAttribute) -> Status {
        check_quantization_bits(self.quantization_bits)?;
        let num_values = if point_ids.is_empty() { attribute.size() } else { point_ids.len() };
        if target.size() < num_values {
            return Err(DracoError::InvalidParameter("Portable attribute is too small".into()));
        }
        let num_components = attribute.num_components() as usize;
        if self.min_values.len() != num_components {
            return Err(DracoError::InvalidParameter("Quantization parameters do not match the attribute".into()));
        }

        let mut quantizer = Quantizer::new();
        quantizer.init(self.range, self.max_quantized_value());
        let mut portable = vec![0u32; num_components];
        for i in 0..num_values {
            let value_index = if point_ids.is_empty() {
                AttributeValueIndex(i as u32)
            } else {
                attribute.mapped_index(point_ids[i])
            };
            let value = attribute
                .get_value_vec::<f32>(value_index)
                .ok_or_else(|| DracoError::BufferError(format!("Attribute value {} out of bounds", value_index.0)))?;
            for (c, v) in value.iter().enumerate() {
                portable[c] = quantizer.quantize_float(v - self.min_values[c]) as u32;
            }
            target.set_typed_value(AttributeValueIndex(i as u32), &portable)?;
        }
        Ok(())
    }

    /// Dequantizes every value of `attribute` into the float32 `target`.
    pub fn inverse_transform_attribute(&self, attribute: &PointAttribute, target: &mut PointAttribute) -> Status {
        if target.data_type() != DataType::Float32 {
            return Err(DracoError::InvalidParameter("Dequantization target must be float32".into()));
        }
        check_quantization_bits(self.quantization_bits)?;
        let num_components = target.num_components() as usize;
        if self.min_values.len() != num_components || attribute.num_components() as usize != num_components {
            return Err(DracoError::InvalidParameter("Quantization parameters do not match the attribute".into()));
        }

        let mut dequantizer = Dequantizer::new();
        if !dequantizer.init(self.range, self.max_quantized_value()) {
            return Err(DracoError::InvalidParameter("Invalid dequantization parameters".into()));
        }
        let mut original = vec![0.0f32; num_components];
        for i in 0..target.size() {
            let index = AttributeValueIndex(i as u32);
            let quantized = attribute
                .get_value_vec::<i32>(index)
                .ok_or_else(|| DracoError::BufferError(format!("Portable value {} out of bounds", i)))?;
            for (c, &q) in quantized.iter().enumerate() {
                original[c] = dequantizer.dequantize_float(q) + self.min_values[c];
            }
            target.set_typed_value(index, &original)?;
        }
        Ok(())
    }

    #[cfg(feature = "encoder")]
    pub fn encode_parameters(&self, encoder_buffer: &mut EncoderBuffer) -> Status {
        if !self.is_initialized() {
            return Err(DracoError::DracoError("Quantization transform is not initialized".into()));
        }
        for &val in &self.min_values {
            encoder_buffer.encode_f32(val)?;
        }
        encoder_buffer.encode_f32(self.range)?;
        encoder_buffer.encode_u8(self.quantization_bits as u8)
    }

    #[cfg(feature = "decoder")]
    pub fn decode_parameters(&mut self, attribute: &PointAttribute, decoder_buffer: &mut DecoderBuffer) -> Status {
        let num_components = attribute.num_components() as usize;
        let mut min_values = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            min_values.push(decoder_buffer.decode_f32()?);
        }
        let range = decoder_buffer.decode_f32()?;
        let bits = decoder_buffer.decode_u8()? as i32;
        check_quantization_bits(bits)?;
        self.quantization_bits = bits;
        self.min_values = min_values;
        self.range = range;
        Ok(())
    }

    pub fn transformed_data_type(&self, _attribute: &PointAttribute) -> DataType {
        DataType::Uint32
    }

    pub fn transformed_num_components(&self, attribute: &PointAttribute) -> u8 {
        attribute.num_components()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_attribute::GeometryAttributeType;

    fn position_attribute(values: &[[f32; 3]]) -> PointAttribute {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Position, 3, DataType::Float32, false, values.len());
        for (i, v) in values.iter().enumerate() {
            att.set_typed_value(AttributeValueIndex(i as u32), v).unwrap();
        }
        att
    }

    #[test]
    fn test_compute_parameters() {
        let att = position_attribute(&[[-1.0, 0.0, 2.0], [3.0, 1.0, 2.5], [0.0, 0.5, 2.0]]);
        let mut transform = AttributeQuantizationTransform::new();
        transform.compute_parameters(&att, 12).unwrap();
        assert_eq!(transform.min_values(), &[-1.0, 0.0, 2.0]);
        assert_eq!(transform.range(), 4.0);
        assert_eq!(transform.quantization_bits(), 12);
    }

    #[test]
    fn test_compute_parameters_rejects_bad_input() {
        let att = position_attribute(&[[0.0, 0.0, 0.0]]);
        let mut transform = AttributeQuantizationTransform::new();
        assert!(transform.compute_parameters(&att, 0).is_err());
        assert!(transform.compute_parameters(&att, 31).is_err());

        let att = position_attribute(&[[0.0, f32::NAN, 0.0]]);
        assert!(transform.compute_parameters(&att, 10).is_err());
        let att = position_attribute(&[[f32::MAX, 0.0, 0.0], [-f32::MAX, 0.0, 0.0]]);
        assert!(transform.compute_parameters(&att, 10).is_err());

        let mut ints = PointAttribute::new();
        ints.init(GeometryAttributeType::Generic, 1, DataType::Int32, false, 1);
        assert!(matches!(
            transform.compute_parameters(&ints, 10),
            Err(DracoError::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn test_degenerate_and_empty_ranges() {
        let mut transform = AttributeQuantizationTransform::new();
        let att = position_attribute(&[[5.0, 5.0, 5.0], [5.0, 5.0, 5.0]]);
        transform.compute_parameters(&att, 8).unwrap();
        assert_eq!(transform.range(), 1.0);
        assert_eq!(transform.min_values(), &[5.0, 5.0, 5.0]);

        let empty = position_attribute(&[]);
        transform.compute_parameters(&empty, 8).unwrap();
        assert_eq!(transform.range(), 1.0);
        assert_eq!(transform.min_values(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_data_layout() {
        let mut transform = AttributeQuantizationTransform::new();
        transform.set_parameters(12, &[-1.0, 0.0, 2.0], 4.0).unwrap();
        let mut data = AttributeTransformData::new();
        transform.copy_to_attribute_transform_data(&mut data).unwrap();
        assert_eq!(data.transform_type(), AttributeTransformType::QuantizationTransform);
        assert_eq!(data.data_size(), 4 + 3 * 4 + 4);
        assert_eq!(data.get_parameter_value::<i32>(0), Some(12));
        assert_eq!(data.get_parameter_value::<f32>(16), Some(4.0));

        let mut att = position_attribute(&[]);
        att.set_attribute_transform_data(data);
        let mut restored = AttributeQuantizationTransform::new();
        restored.init_from_attribute(&att).unwrap();
        assert_eq!(restored.quantization_bits(), 12);
        assert_eq!(restored.min_values(), &[-1.0, 0.0, 2.0]);
        assert_eq!(restored.range(), 4.0);
    }

    #[test]
    fn test_quantize_and_restore() {
        let values = [[-1.0f32, 0.0, 2.0], [3.0, 1.0, 2.5], [0.25, 0.5, 2.0]];
        let att = position_attribute(&values);
        let mut transform = AttributeQuantizationTransform::new();
        transform.compute_parameters(&att, 10).unwrap();

        let mut portable = PointAttribute::new();
        portable.init(GeometryAttributeType::Position, 3, DataType::Uint32, false, values.len());
        transform.transform_attribute(&att, &[], &mut portable).unwrap();
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(0)), Some([0, 0, 0]));
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(1)), Some([1023, 256, 128]));

        let mut restored = position_attribute(&[[0.0; 3]; 3]);
        transform.inverse_transform_attribute(&portable, &mut restored).unwrap();
        let half_delta = transform.range() / 1023.0 / 2.0;
        for (i, value) in values.iter().enumerate() {
            let back = restored.get_value::<f32, 3>(AttributeValueIndex(i as u32)).unwrap();
            for c in 0..3 {
                assert!((back[c] - value[c]).abs() <= half_delta + 1e-6);
            }
        }
    }

    #[test]
    fn test_transform_follows_point_ids() {
        let mut att = position_attribute(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        att.set_explicit_mapping(3);
        att.set_point_map_entry(PointIndex(0), AttributeValueIndex(1));
        att.set_point_map_entry(PointIndex(1), AttributeValueIndex(0));
        att.set_point_map_entry(PointIndex(2), AttributeValueIndex(1));
        let mut transform = AttributeQuantizationTransform::new();
        transform.compute_parameters(&att, 4).unwrap();

        let mut portable = PointAttribute::new();
        portable.init(GeometryAttributeType::Position, 3, DataType::Uint32, false, 3);
        let point_ids = [PointIndex(0), PointIndex(1), PointIndex(2)];
        transform.transform_attribute(&att, &point_ids, &mut portable).unwrap();
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(0)), Some([15, 15, 15]));
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(1)), Some([0, 0, 0]));
        assert_eq!(portable.get_value::<u32, 3>(AttributeValueIndex(2)), Some([15, 15, 15]));
    }

    #[test]
    fn test_parameter_wire_format() {
        let mut transform = AttributeQuantizationTransform::new();
        transform.set_parameters(12, &[-1.0, 0.0, 2.0], 4.0).unwrap();
        let mut buffer = EncoderBuffer::new();
        transform.encode_parameters(&mut buffer).unwrap();
        assert_eq!(buffer.size(), 3 * 4 + 4 + 1);
        assert_eq!(buffer.data()[16], 12);

        let att = position_attribute(&[]);
        let mut decoded = AttributeQuantizationTransform::new();
        let mut decoder_buffer = DecoderBuffer::new(buffer.data());
        decoded.decode_parameters(&att, &mut decoder_buffer).unwrap();
        assert_eq!(decoded.min_values(), &[-1.0, 0.0, 2.0]);
        assert_eq!(decoded.range().to_bits(), 4.0f32.to_bits());
        assert_eq!(decoded.quantization_bits(), 12);

        let mut bad = buffer.data().to_vec();
        bad[16] = 31;
        let mut decoder_buffer = DecoderBuffer::new(&bad);
        assert!(decoded.decode_parameters(&att, &mut decoder_buffer).is_err());
    }
}
