#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedGeometryType {
    InvalidGeometryType = -1,
    PointCloud = 0,
    TriangularMesh = 1,
}

impl From<u8> for EncodedGeometryType {
    fn from(value: u8) -> Self {
        match value {
            0 => EncodedGeometryType::PointCloud,
            1 => EncodedGeometryType::TriangularMesh,
            _ => EncodedGeometryType::InvalidGeometryType,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointCloudEncodingMethod {
    PointCloudSequentialEncoding = 0,
    PointCloudKdTreeEncoding = 1,
}

/// Attributes encoder kinds written in front of each descriptor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeEncoderType {
    BasicAttributeEncoder = 0,
}

/// Per-attribute encoder ids of the sequential attributes controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequentialAttributeEncoderType {
    Generic = 0,
    Integer = 1,
    Quantization = 2,
    Normals = 3,
}

impl TryFrom<u8> for SequentialAttributeEncoderType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SequentialAttributeEncoderType::Generic),
            1 => Ok(SequentialAttributeEncoderType::Integer),
            2 => Ok(SequentialAttributeEncoderType::Quantization),
            3 => Ok(SequentialAttributeEncoderType::Normals),
            _ => Err(()),
        }
    }
}

/// Header flag announcing a metadata block after the header.
pub const METADATA_FLAG_MASK: u16 = 0x8000;
