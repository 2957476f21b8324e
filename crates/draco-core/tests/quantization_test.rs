use draco_core::attribute_octahedron_transform::AttributeOctahedronTransform;
use draco_core::attribute_quantization_transform::AttributeQuantizationTransform;
use draco_core::attribute_transform::{AttributeTransform, AttributeTransformType};
use draco_core::attribute_transform_data::AttributeTransformData;
use draco_core::draco_types::DataType;
use draco_core::geometry_attribute::GeometryAttributeType;
use draco_core::geometry_indices::AttributeValueIndex;
use draco_core::point_attribute::PointAttribute;
use draco_core::quantization_utils::{Dequantizer, Quantizer};
use proptest::prelude::*;

fn float_attribute(values: &[[f32; 3]]) -> PointAttribute {
    let mut att = PointAttribute::new();
    att.init(GeometryAttributeType::Position, 3, DataType::Float32, false, values.len());
    for (i, value) in values.iter().enumerate() {
        att.set_typed_value(AttributeValueIndex(i as u32), value).unwrap();
    }
    att
}

fn quantize_and_restore(transform: &AttributeTransform, att: &PointAttribute) -> PointAttribute {
    let mut portable = transform.init_transformed_attribute(att, att.size());
    transform.transform_attribute(att, &[], &mut portable).unwrap();
    let mut restored = PointAttribute::new();
    restored.init(att.attribute_type(), att.num_components(), DataType::Float32, false, att.size());
    transform.inverse_transform_attribute(&portable, &mut restored).unwrap();
    restored
}

#[test]
fn test_quantizer_rounding() {
    let mut quantizer = Quantizer::new();
    quantizer.init(10.0, 255);
    let cases = [
        (0.0f32, 0),
        (10.0, 255),
        (-10.0, -255),
        (4.999, 127),
        (5.0, 128),
        (-5.0, -127),
        (-5.0001, -128),
    ];
    for (value, expected) in cases {
        assert_eq!(quantizer.quantize_float(value), expected, "quantize({})", value);
    }
}

#[test]
fn test_dequantizer_rejects_non_positive_max() {
    let mut dequantizer = Dequantizer::new();
    assert!(!dequantizer.init(1.0, 0));
    assert!(!dequantizer.init(1.0, -4));
    assert!(dequantizer.init(10.0, 255));
    assert_eq!(dequantizer.dequantize_float(0), 0.0);
}

#[test]
fn test_parameters_survive_transform_data() {
    let mut transform = AttributeQuantizationTransform::new();
    transform.set_parameters(12, &[-1.0, 0.0, 2.0], 4.0).unwrap();
    let mut data = AttributeTransformData::new();
    transform.copy_to_attribute_transform_data(&mut data).unwrap();
    assert_eq!(data.transform_type(), AttributeTransformType::QuantizationTransform);

    let mut att = float_attribute(&[[0.0; 3]]);
    att.set_attribute_transform_data(data);
    let restored = match AttributeTransform::from_attribute(&att).unwrap() {
        AttributeTransform::Quantization(restored) => restored,
        other => panic!("unexpected transform {:?}", other.transform_type()),
    };
    assert_eq!(restored.quantization_bits(), 12);
    let min_bits: Vec<u32> = restored.min_values().iter().map(|v| v.to_bits()).collect();
    assert_eq!(min_bits, vec![(-1.0f32).to_bits(), 0.0f32.to_bits(), 2.0f32.to_bits()]);
    assert_eq!(restored.range().to_bits(), 4.0f32.to_bits());
}

#[test]
fn test_octahedron_bits_survive_transform_data() {
    let mut transform = AttributeOctahedronTransform::new();
    transform.set_parameters(9).unwrap();
    let mut att = float_attribute(&[[0.0, 0.0, 1.0]]);
    AttributeTransform::Octahedron(transform).transfer_to_attribute(&mut att).unwrap();
    match AttributeTransform::from_attribute(&att).unwrap() {
        AttributeTransform::Octahedron(restored) => assert_eq!(restored.quantization_bits(), 9),
        other => panic!("unexpected transform {:?}", other.transform_type()),
    }
}

#[test]
fn test_rejects_invalid_bounds() {
    let mut transform = AttributeQuantizationTransform::new();
    let att = float_attribute(&[[0.0, 1.0, 2.0], [f32::NAN, 0.0, 0.0]]);
    assert!(transform.compute_parameters(&att, 10).is_err());
    let att = float_attribute(&[[0.0, 1.0, 2.0], [f32::INFINITY, 0.0, 0.0]]);
    assert!(transform.compute_parameters(&att, 10).is_err());
    let att = float_attribute(&[[f32::MAX, 0.0, 0.0], [f32::MIN, 0.0, 0.0]]);
    assert!(transform.compute_parameters(&att, 10).is_err());
    let att = float_attribute(&[[0.0, 1.0, 2.0]]);
    assert!(transform.compute_parameters(&att, 0).is_err());
    assert!(transform.compute_parameters(&att, 31).is_err());
}

#[test]
fn test_constant_attribute_uses_unit_range() {
    let att = float_attribute(&[[3.0, -2.0, 7.5]; 5]);
    let mut transform = AttributeQuantizationTransform::new();
    transform.compute_parameters(&att, 8).unwrap();
    assert_eq!(transform.range(), 1.0);
    assert_eq!(transform.min_values(), &[3.0, -2.0, 7.5]);

    let restored = quantize_and_restore(&AttributeTransform::Quantization(transform), &att);
    for i in 0..5 {
        assert_eq!(
            restored.get_value::<f32, 3>(AttributeValueIndex(i)).unwrap(),
            [3.0, -2.0, 7.5]
        );
    }
}

proptest! {
    #[test]
    fn prop_quantization_error_is_bounded(
        values in prop::collection::vec(prop::array::uniform3(-1000.0f32..1000.0), 1..64),
        bits in 1i32..=20,
    ) {
        let att = float_attribute(&values);
        let mut transform = AttributeQuantizationTransform::new();
        transform.compute_parameters(&att, bits).unwrap();
        let delta = transform.range() / ((1u32 << bits) - 1) as f32;
        let tolerance = delta * 0.5 + 1e-3;

        let restored = quantize_and_restore(&AttributeTransform::Quantization(transform), &att);
        for (i, value) in values.iter().enumerate() {
            let decoded = restored.get_value::<f32, 3>(AttributeValueIndex(i as u32)).unwrap();
            for c in 0..3 {
                prop_assert!(
                    (decoded[c] - value[c]).abs() <= tolerance,
                    "value {} component {}: {} vs {} (tolerance {})",
                    i, c, decoded[c], value[c], tolerance
                );
            }
        }
    }

    #[test]
    fn prop_octahedron_round_trip_stays_close(
        directions in prop::collection::vec(prop::array::uniform3(-1.0f32..1.0), 1..32),
    ) {
        let normals: Vec<[f32; 3]> = directions
            .iter()
            .filter_map(|d| {
                let length = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
                (length > 0.1).then(|| [d[0] / length, d[1] / length, d[2] / length])
            })
            .collect();
        prop_assume!(!normals.is_empty());

        let att = float_attribute(&normals);
        let mut transform = AttributeOctahedronTransform::new();
        transform.set_parameters(12).unwrap();
        let restored = quantize_and_restore(&AttributeTransform::Octahedron(transform), &att);
        for (i, normal) in normals.iter().enumerate() {
            let decoded = restored.get_value::<f32, 3>(AttributeValueIndex(i as u32)).unwrap();
            let length = (decoded[0] * decoded[0] + decoded[1] * decoded[1] + decoded[2] * decoded[2]).sqrt();
            prop_assert!((length - 1.0).abs() < 1e-3);
            for c in 0..3 {
                prop_assert!((decoded[c] - normal[c]).abs() < 1e-2);
            }
        }
    }
}
