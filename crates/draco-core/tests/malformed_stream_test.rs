use draco_core::decoder_buffer::DecoderBuffer;
use draco_core::decoder_options::DecoderOptions;
use draco_core::point_cloud::PointCloud;
use draco_core::point_cloud_decoder::PointCloudDecoder;
use draco_core::status::StatusOr;

const GENERIC_DECODER: u8 = 0;
const INTEGER_DECODER: u8 = 1;
const INT32: u8 = 5;
const NO_PREDICTION: u8 = 0xFE;
const TAGGED: u8 = 0;
const RAW: u8 = 1;

/// Builds a stream with a single scalar generic attribute whose values are
/// encoded as `payload`.
fn single_attribute_stream(num_points: i32, decoder_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut data = b"DRACO".to_vec();
    data.extend_from_slice(&[2, 3, 0, 0, 0, 0]);
    data.extend_from_slice(&num_points.to_le_bytes());
    // One attributes decoder with one generic int32 scalar.
    data.extend_from_slice(&[1, 1, 4, INT32, 1, 0, 0]);
    data.push(decoder_id);
    data.extend_from_slice(payload);
    data
}

fn decode(data: &[u8]) -> StatusOr<PointCloud> {
    let mut pc = PointCloud::new();
    PointCloudDecoder::new().decode(&DecoderOptions::new(), &mut DecoderBuffer::new(data), &mut pc)?;
    Ok(pc)
}

/// Probability token with one extra byte.
fn prob_token(prob: u32) -> [u8; 2] {
    [(((prob & 0x3F) << 2) | 1) as u8, (prob >> 6) as u8]
}

#[test]
fn test_valid_stream_decodes() {
    // Uncompressed one byte symbols 4 and 1 are the values 2 and -1.
    let data = single_attribute_stream(2, INTEGER_DECODER, &[NO_PREDICTION, 0, 1, 4, 1]);
    let pc = decode(&data).unwrap();
    assert_eq!(pc.num_points(), 2);
    assert_eq!(pc.attribute(0).unwrap().size(), 2);
}

#[test]
fn test_empty_tagged_table_is_rejected() {
    let data = single_attribute_stream(1, INTEGER_DECODER, &[NO_PREDICTION, 1, TAGGED, 0, 1, 0]);
    assert!(decode(&data).is_err());
}

#[test]
fn test_empty_raw_table_is_rejected() {
    let data = single_attribute_stream(1, INTEGER_DECODER, &[NO_PREDICTION, 1, RAW, 5, 0, 1, 0]);
    assert!(decode(&data).is_err());
}

#[test]
fn test_zero_run_past_table_end_is_rejected() {
    let data = single_attribute_stream(3, INTEGER_DECODER, &[NO_PREDICTION, 1, RAW, 5, 3, (5 << 2) | 3, 1, 0]);
    assert!(decode(&data).is_err());
}

#[test]
fn test_probabilities_past_precision_are_rejected() {
    let mut payload = vec![NO_PREDICTION, 1, RAW, 5, 2];
    payload.extend_from_slice(&prob_token(4000));
    payload.extend_from_slice(&prob_token(200));
    payload.extend_from_slice(&[1, 0]);
    let data = single_attribute_stream(2, INTEGER_DECODER, &payload);
    assert!(decode(&data).is_err());

    // Short of the precision.
    let mut payload = vec![NO_PREDICTION, 1, RAW, 5, 2];
    payload.extend_from_slice(&prob_token(2000));
    payload.extend_from_slice(&prob_token(96));
    payload.extend_from_slice(&[1, 0]);
    let data = single_attribute_stream(2, INTEGER_DECODER, &payload);
    assert!(decode(&data).is_err());
}

#[test]
fn test_oversized_point_count_is_rejected() {
    for num_points in [100_000_000, i32::MAX] {
        let generic = single_attribute_stream(num_points, GENERIC_DECODER, &[1, 2, 3, 4]);
        assert!(decode(&generic).is_err());

        let uncompressed = single_attribute_stream(num_points, INTEGER_DECODER, &[NO_PREDICTION, 0, 1, 7, 7]);
        assert!(decode(&uncompressed).is_err());

        let tagged = single_attribute_stream(num_points, INTEGER_DECODER, &[NO_PREDICTION, 1, TAGGED, 1, 1 << 2, 1, 0]);
        assert!(decode(&tagged).is_err());
    }
}

#[test]
fn test_negative_point_count_is_rejected() {
    let data = single_attribute_stream(-1, GENERIC_DECODER, &[]);
    assert!(decode(&data).is_err());
}
