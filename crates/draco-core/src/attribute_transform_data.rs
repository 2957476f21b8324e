use crate::attribute_transform::AttributeTransformType;
use crate::data_buffer::DataBuffer;
use crate::status::Status;

/// Parameters of an attribute transform stored next to the attribute, so the
/// transform can be rebuilt (and inverted) later.
#[derive(Debug, Clone)]
pub struct AttributeTransformData {
    transform_type: AttributeTransformType,
    buffer: DataBuffer,
}

impl Default for AttributeTransformData {
    fn default() -> Self {
        Self {
            transform_type: AttributeTransformType::InvalidTransform,
            buffer: DataBuffer::new(),
        }
    }
}

impl AttributeTransformData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform_type(&self) -> AttributeTransformType {
        self.transform_type
    }

    pub fn set_transform_type(&mut self, transform_type: AttributeTransformType) {
        self.transform_type = transform_type;
    }

    /// Size of the parameter blob in bytes.
    pub fn data_size(&self) -> usize {
        self.buffer.data_size()
    }

    /// Reads a parameter at `byte_offset`, `None` when it lies past the end.
    pub fn get_parameter_value<T: bytemuck::Pod>(&self, byte_offset: usize) -> Option<T> {
        let mut val: T = bytemuck::Zeroable::zeroed();
        self.buffer.read(byte_offset, bytemuck::bytes_of_mut(&mut val)).ok()?;
        Some(val)
    }

    /// Writes a parameter at `byte_offset`, growing the blob when needed.
    pub fn set_parameter_value<T: bytemuck::Pod>(&mut self, byte_offset: usize, in_data: T) -> Status {
        let size = std::mem::size_of::<T>();
        if byte_offset + size > self.buffer.data_size() {
            self.buffer.resize(byte_offset + size);
        }
        self.buffer.write(byte_offset, bytemuck::bytes_of(&in_data))
    }

    pub fn append_parameter_value<T: bytemuck::Pod>(&mut self, in_data: T) -> Status {
        self.set_parameter_value(self.buffer.data_size(), in_data)
    }
}
