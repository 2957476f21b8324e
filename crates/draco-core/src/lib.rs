//! Draco Core Library
//!
//! Point attribute storage, lossy attribute transforms and the sequential
//! attribute codecs used to compress point clouds.

#![allow(clippy::needless_range_loop)]

// =============================================================================
// Core modules - always available
// =============================================================================

pub mod ans;
pub mod attribute_octahedron_transform;
pub mod attribute_quantization_transform;
pub mod attribute_transform;
pub mod attribute_transform_data;
pub mod bit_utils;
pub mod compression_config;
pub mod data_buffer;
pub mod draco_types;
pub mod geometry_attribute;
pub mod geometry_indices;
pub mod normal_compression_utils;
pub mod point_attribute;
pub mod point_cloud;
pub mod points_sequencer;
pub mod prediction_scheme;
pub mod prediction_scheme_delta;
pub mod prediction_scheme_wrap;
pub mod quantization_utils;
pub mod rans_symbol_coding;
pub mod status;
pub mod symbol_encoding;
pub mod version;

// =============================================================================
// Decoder-only modules
// =============================================================================

#[cfg(feature = "decoder")]
pub mod attributes_decoder;
#[cfg(feature = "decoder")]
pub mod decoder_buffer;
#[cfg(feature = "decoder")]
pub mod decoder_options;
#[cfg(feature = "decoder")]
pub mod point_cloud_decoder;
#[cfg(feature = "decoder")]
pub mod rans_symbol_decoder;
#[cfg(feature = "decoder")]
pub mod sequential_attribute_decoder;
#[cfg(feature = "decoder")]
pub mod sequential_attribute_decoders_controller;
#[cfg(feature = "decoder")]
pub mod sequential_integer_attribute_decoder;
#[cfg(feature = "decoder")]
pub mod sequential_normal_attribute_decoder;
#[cfg(feature = "decoder")]
pub mod sequential_quantization_attribute_decoder;

// =============================================================================
// Encoder-only modules
// =============================================================================

#[cfg(feature = "encoder")]
pub mod attributes_encoder;
#[cfg(feature = "encoder")]
pub mod encoder_buffer;
#[cfg(feature = "encoder")]
pub mod encoder_options;
#[cfg(feature = "encoder")]
pub mod point_cloud_encoder;
#[cfg(feature = "encoder")]
pub mod rans_symbol_encoder;
#[cfg(feature = "encoder")]
pub mod sequential_attribute_encoder;
#[cfg(feature = "encoder")]
pub mod sequential_attribute_encoders_controller;
#[cfg(feature = "encoder")]
pub mod sequential_integer_attribute_encoder;
#[cfg(feature = "encoder")]
pub mod sequential_normal_attribute_encoder;
#[cfg(feature = "encoder")]
pub mod sequential_quantization_attribute_encoder;

// =============================================================================
// Core re-exports - always available
// =============================================================================

pub use attribute_octahedron_transform::AttributeOctahedronTransform;
pub use attribute_quantization_transform::AttributeQuantizationTransform;
pub use attribute_transform::{AttributeTransform, AttributeTransformType};
pub use attribute_transform_data::AttributeTransformData;
pub use compression_config::{EncodedGeometryType, SequentialAttributeEncoderType};
pub use data_buffer::DataBuffer;
pub use draco_types::{DataType, ValueType};
pub use geometry_attribute::{GeometryAttribute, GeometryAttributeType};
pub use geometry_indices::{AttributeValueIndex, PointIndex};
pub use normal_compression_utils::OctahedronToolBox;
pub use point_attribute::PointAttribute;
pub use point_cloud::PointCloud;
pub use points_sequencer::{LinearSequencer, PointsSequencer};
pub use prediction_scheme::{PredictionSchemeMethod, PredictionSchemeTransformType};
pub use status::{DracoError, Status, StatusOr};

// =============================================================================
// Decoder re-exports
// =============================================================================

#[cfg(feature = "decoder")]
pub use decoder_buffer::DecoderBuffer;
#[cfg(feature = "decoder")]
pub use decoder_options::DecoderOptions;
#[cfg(feature = "decoder")]
pub use point_cloud_decoder::{DracoHeader, PointCloudDecoder};

// =============================================================================
// Encoder re-exports
// =============================================================================

#[cfg(feature = "encoder")]
pub use encoder_buffer::EncoderBuffer;
#[cfg(feature = "encoder")]
pub use encoder_options::EncoderOptions;
#[cfg(feature = "encoder")]
pub use point_cloud_encoder::PointCloudEncoder;
