use crate::data_buffer::{DataBuffer, DataBufferDescriptor};
use crate::draco_types::{convert_component_value, DataType, ValueType};
use crate::geometry_indices::AttributeValueIndex;

/// Number of named attribute types (everything except `Invalid`).
pub const NAMED_ATTRIBUTES_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryAttributeType {
    Invalid = -1,
    Position = 0,
    Normal,
    Color,
    TexCoord,
    Generic,
}

impl GeometryAttributeType {
    /// Slot of the type in per-type tables, `None` for `Invalid`.
    pub fn named_index(self) -> Option<usize> {
        match self {
            GeometryAttributeType::Invalid => None,
            other => Some(other as i32 as usize),
        }
    }
}

impl TryFrom<u8> for GeometryAttributeType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GeometryAttributeType::Position),
            1 => Ok(GeometryAttributeType::Normal),
            2 => Ok(GeometryAttributeType::Color),
            3 => Ok(GeometryAttributeType::TexCoord),
            4 => Ok(GeometryAttributeType::Generic),
            _ => Err(()),
        }
    }
}

/// Typed, strided view into a [`DataBuffer`].
///
/// The view only remembers the descriptor of the buffer it was initialised
/// over; every accessor takes the buffer explicitly.
#[derive(Debug, Clone)]
pub struct GeometryAttribute {
    attribute_type: GeometryAttributeType,
    data_type: DataType,
    num_components: u8,
    normalized: bool,
    byte_stride: i64,
    byte_offset: i64,
    unique_id: u32,
    buffer_descriptor: DataBufferDescriptor,
}

impl Default for GeometryAttribute {
    fn default() -> Self {
        Self {
            attribute_type: GeometryAttributeType::Invalid,
            data_type: DataType::Invalid,
            num_components: 0,
            normalized: false,
            byte_stride: 0,
            byte_offset: 0,
            unique_id: 0,
            buffer_descriptor: DataBufferDescriptor::default(),
        }
    }
}

/// Equality compares the shape of the view and the buffer descriptor, never
/// the buffer contents or the unique id.
impl PartialEq for GeometryAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.attribute_type == other.attribute_type
            && self.buffer_descriptor == other.buffer_descriptor
            && self.num_components == other.num_components
            && self.data_type == other.data_type
            && self.normalized == other.normalized
            && self.byte_stride == other.byte_stride
            && self.byte_offset == other.byte_offset
    }
}

impl GeometryAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        attribute_type: GeometryAttributeType,
        buffer: Option<&DataBuffer>,
        num_components: u8,
        data_type: DataType,
        normalized: bool,
        byte_stride: i64,
        byte_offset: i64,
    ) {
        self.attribute_type = attribute_type;
        self.buffer_descriptor = buffer.map(DataBuffer::descriptor).unwrap_or_default();
        self.num_components = num_components;
        self.data_type = data_type;
        self.normalized = normalized;
        self.byte_stride = byte_stride;
        self.byte_offset = byte_offset;
    }

    /// Copies everything but the unique id from `src`.
    pub fn copy_from(&mut self, src: &GeometryAttribute) {
        let unique_id = self.unique_id;
        *self = src.clone();
        self.unique_id = unique_id;
    }

    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.attribute_type
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn num_components(&self) -> u8 {
        self.num_components
    }

    pub fn normalized(&self) -> bool {
        self.normalized
    }

    pub fn byte_stride(&self) -> i64 {
        self.byte_stride
    }

    pub fn byte_offset(&self) -> i64 {
        self.byte_offset
    }

    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    pub fn buffer_descriptor(&self) -> DataBufferDescriptor {
        self.buffer_descriptor
    }

    pub fn set_unique_id(&mut self, id: u32) {
        self.unique_id = id;
    }

    pub fn set_attribute_type(&mut self, attribute_type: GeometryAttributeType) {
        self.attribute_type = attribute_type;
    }

    pub fn set_data_type(&mut self, data_type: DataType) {
        self.data_type = data_type;
    }

    pub fn set_num_components(&mut self, num_components: u8) {
        self.num_components = num_components;
    }

    pub fn set_normalized(&mut self, normalized: bool) {
        self.normalized = normalized;
    }

    pub fn set_byte_stride(&mut self, byte_stride: i64) {
        self.byte_stride = byte_stride;
    }

    pub fn set_byte_offset(&mut self, byte_offset: i64) {
        self.byte_offset = byte_offset;
    }

    pub(crate) fn set_buffer_descriptor(&mut self, descriptor: DataBufferDescriptor) {
        self.buffer_descriptor = descriptor;
    }

    /// Size in bytes of one value tuple, ignoring the stride.
    pub fn entry_size(&self) -> usize {
        self.num_components as usize * self.data_type.byte_length()
    }

    /// Byte position of the value `att_index` inside the buffer.
    pub fn byte_pos(&self, att_index: AttributeValueIndex) -> usize {
        (self.byte_offset + self.byte_stride * att_index.0 as i64) as usize
    }

    /// Raw bytes of the value tuple at `att_index`, or `None` when the tuple
    /// does not lie inside `buffer`.
    pub fn value_bytes<'b>(&self, buffer: &'b DataBuffer, att_index: AttributeValueIndex) -> Option<&'b [u8]> {
        let start = self.byte_pos(att_index);
        buffer.data().get(start..start.checked_add(self.entry_size())?)
    }

    /// Unchecked counterpart of [`GeometryAttribute::value_bytes`].
    ///
    /// # Safety
    ///
    /// The whole tuple at `att_index` must lie inside `buffer`.
    pub unsafe fn value_bytes_unchecked<'b>(&self, buffer: &'b DataBuffer, att_index: AttributeValueIndex) -> &'b [u8] {
        let start = self.byte_pos(att_index);
        std::slice::from_raw_parts(buffer.data().as_ptr().add(start), self.entry_size())
    }

    /// Reads `N` raw components of type `T` without any conversion.
    pub fn get_value<T: ValueType, const N: usize>(&self, buffer: &DataBuffer, att_index: AttributeValueIndex) -> Option<[T; N]> {
        let size = std::mem::size_of::<T>();
        let start = self.byte_pos(att_index);
        let bytes = buffer.data().get(start..start.checked_add(size * N)?)?;
        let mut out = [T::default(); N];
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(size)) {
            *value = bytemuck::pod_read_unaligned(chunk);
        }
        Some(out)
    }

    /// Reads all components of the value at `att_index` as raw `T`s.
    pub fn get_value_vec<T: ValueType>(&self, buffer: &DataBuffer, att_index: AttributeValueIndex) -> Option<Vec<T>> {
        let size = std::mem::size_of::<T>();
        let start = self.byte_pos(att_index);
        let len = size * self.num_components as usize;
        let bytes = buffer.data().get(start..start.checked_add(len)?)?;
        Some(bytes.chunks_exact(size).map(bytemuck::pod_read_unaligned).collect())
    }

    /// Converts the value at `att_index` into `out`, honouring the normalized
    /// flag. Components beyond `num_components` are set to zero.
    ///
    /// Returns false when the value is out of bounds or a component cannot be
    /// represented in `T`.
    pub fn convert_value<T: ValueType>(&self, buffer: &DataBuffer, att_index: AttributeValueIndex, out: &mut [T]) -> bool {
        let converted = match self.data_type {
            DataType::Int8 => self.convert_typed_value::<i8, T>(buffer, att_index, out),
            DataType::Uint8 | DataType::Bool => self.convert_typed_value::<u8, T>(buffer, att_index, out),
            DataType::Int16 => self.convert_typed_value::<i16, T>(buffer, att_index, out),
            DataType::Uint16 => self.convert_typed_value::<u16, T>(buffer, att_index, out),
            DataType::Int32 => self.convert_typed_value::<i32, T>(buffer, att_index, out),
            DataType::Uint32 => self.convert_typed_value::<u32, T>(buffer, att_index, out),
            DataType::Int64 => self.convert_typed_value::<i64, T>(buffer, att_index, out),
            DataType::Uint64 => self.convert_typed_value::<u64, T>(buffer, att_index, out),
            DataType::Float32 => self.convert_typed_value::<f32, T>(buffer, att_index, out),
            DataType::Float64 => self.convert_typed_value::<f64, T>(buffer, att_index, out),
            DataType::Invalid => None,
        };
        converted.is_some()
    }

    /// Fixed-size wrapper around [`GeometryAttribute::convert_value`].
    pub fn convert_value_array<T: ValueType, const N: usize>(&self, buffer: &DataBuffer, att_index: AttributeValueIndex) -> Option<[T; N]> {
        let mut out = [T::default(); N];
        if self.convert_value(buffer, att_index, &mut out) {
            Some(out)
        } else {
            None
        }
    }

    fn convert_typed_value<S: ValueType, T: ValueType>(&self, buffer: &DataBuffer, att_index: AttributeValueIndex, out: &mut [T]) -> Option<()> {
        let size = std::mem::size_of::<S>();
        let num_converted = out.len().min(self.num_components as usize);
        let start = self.byte_pos(att_index);
        let bytes = buffer.data().get(start..start.checked_add(size * num_converted)?)?;
        for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(size)) {
            let src: S = bytemuck::pod_read_unaligned(chunk);
            *value = convert_component_value::<S, T>(src, self.normalized)?;
        }
        for value in out.iter_mut().skip(num_converted) {
            *value = T::zero();
        }
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_buffer(values: &[f32]) -> DataBuffer {
        let mut buffer = DataBuffer::new();
        buffer.update(bytemuck::cast_slice(values));
        buffer
    }

    #[test]
    fn test_equality_ignores_contents() {
        let buffer = float_buffer(&[1.0, 2.0, 3.0]);
        let mut a = GeometryAttribute::new();
        a.init(GeometryAttributeType::Position, Some(&buffer), 3, DataType::Float32, false, 12, 0);
        let mut b = a.clone();
        b.set_unique_id(7);
        assert_eq!(a, b);

        let other = float_buffer(&[4.0, 5.0, 6.0]);
        b.init(GeometryAttributeType::Position, Some(&other), 3, DataType::Float32, false, 12, 0);
        // Same id and update count, different contents.
        assert_eq!(a, b);

        b.set_byte_offset(4);
        assert_ne!(a, b);
        b.set_byte_offset(0);
        b.set_normalized(true);
        assert_ne!(a, b);
        b.set_normalized(false);
        b.set_attribute_type(GeometryAttributeType::Normal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_tracks_buffer_updates() {
        let mut buffer = float_buffer(&[1.0, 2.0, 3.0]);
        let mut a = GeometryAttribute::new();
        a.init(GeometryAttributeType::Generic, Some(&buffer), 3, DataType::Float32, false, 12, 0);
        buffer.resize(24);
        let mut b = GeometryAttribute::new();
        b.init(GeometryAttributeType::Generic, Some(&buffer), 3, DataType::Float32, false, 12, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_strided_access() {
        // Two interleaved values: position xyz followed by a padding float.
        let buffer = float_buffer(&[1.0, 2.0, 3.0, -1.0, 4.0, 5.0, 6.0, -1.0]);
        let mut att = GeometryAttribute::new();
        att.init(GeometryAttributeType::Position, Some(&buffer), 3, DataType::Float32, false, 16, 0);

        assert_eq!(att.get_value::<f32, 3>(&buffer, AttributeValueIndex(1)), Some([4.0, 5.0, 6.0]));
        assert_eq!(att.get_value_vec::<f32>(&buffer, AttributeValueIndex(0)), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(att.get_value::<f32, 3>(&buffer, AttributeValueIndex(2)), None);
        assert!(att.value_bytes(&buffer, AttributeValueIndex(2)).is_none());
        let bytes = unsafe { att.value_bytes_unchecked(&buffer, AttributeValueIndex(1)) };
        assert_eq!(bytes, att.value_bytes(&buffer, AttributeValueIndex(1)).unwrap());
    }

    #[test]
    fn test_convert_value() {
        let mut buffer = DataBuffer::new();
        buffer.update(&[0u8, 128, 255]);
        let mut att = GeometryAttribute::new();
        att.init(GeometryAttributeType::Color, Some(&buffer), 3, DataType::Uint8, true, 3, 0);

        let color: [f32; 4] = att.convert_value_array(&buffer, AttributeValueIndex(0)).unwrap();
        assert_eq!(color[0], 0.0);
        assert!((color[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color[2], 1.0);
        assert_eq!(color[3], 0.0);

        let mut narrow = [0i8; 3];
        assert!(!att.convert_value(&buffer, AttributeValueIndex(0), &mut narrow));

        let mut wide = [0i32; 2];
        assert!(att.convert_value(&buffer, AttributeValueIndex(0), &mut wide));
        assert_eq!(wide, [0, 128]);
    }

    #[test]
    fn test_attribute_type_from_u8() {
        assert_eq!(GeometryAttributeType::try_from(3), Ok(GeometryAttributeType::TexCoord));
        assert!(GeometryAttributeType::try_from(NAMED_ATTRIBUTES_COUNT as u8).is_err());
        assert_eq!(GeometryAttributeType::Generic.named_index(), Some(4));
        assert_eq!(GeometryAttributeType::Invalid.named_index(), None);
    }
}
