/// Index into the (possibly deduplicated) value storage of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AttributeValueIndex(pub u32);

/// Index of a logical point of a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PointIndex(pub u32);

pub const INVALID_ATTRIBUTE_VALUE_INDEX: AttributeValueIndex = AttributeValueIndex(u32::MAX);
pub const INVALID_POINT_INDEX: PointIndex = PointIndex(u32::MAX);

impl AttributeValueIndex {
    pub fn value(self) -> usize {
        self.0 as usize
    }
}

impl PointIndex {
    pub fn value(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for AttributeValueIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<AttributeValueIndex> for u32 {
    fn from(v: AttributeValueIndex) -> Self {
        v.0
    }
}

impl From<usize> for AttributeValueIndex {
    fn from(v: usize) -> Self {
        Self(v as u32)
    }
}

impl From<AttributeValueIndex> for usize {
    fn from(v: AttributeValueIndex) -> Self {
        v.0 as usize
    }
}

impl From<u32> for PointIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl From<PointIndex> for u32 {
    fn from(v: PointIndex) -> Self {
        v.0
    }
}

impl From<usize> for PointIndex {
    fn from(v: usize) -> Self {
        Self(v as u32)
    }
}

impl From<PointIndex> for usize {
    fn from(v: PointIndex) -> Self {
        v.0 as usize
    }
}
