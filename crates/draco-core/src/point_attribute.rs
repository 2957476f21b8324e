use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::attribute_transform_data::AttributeTransformData;
use crate::data_buffer::{BufferArena, DataBuffer};
use crate::draco_types::{DataType, ValueType};
use crate::geometry_attribute::{GeometryAttribute, GeometryAttributeType};
use crate::geometry_indices::{AttributeValueIndex, PointIndex, INVALID_ATTRIBUTE_VALUE_INDEX};
use crate::status::{DracoError, Status, StatusOr};

/// Attribute that owns its value storage and maps points onto values.
///
/// With identity mapping point `i` reads value `i`. With explicit mapping
/// every point has an entry in `indices_map`, so several points can share a
/// single deduplicated value.
#[derive(Debug, Clone)]
pub struct PointAttribute {
    base: GeometryAttribute,
    buffer: DataBuffer,
    indices_map: Vec<AttributeValueIndex>,
    identity_mapping: bool,
    num_unique_entries: usize,
    attribute_transform_data: Option<AttributeTransformData>,
}

impl Default for PointAttribute {
    fn default() -> Self {
        Self {
            base: GeometryAttribute::default(),
            buffer: DataBuffer::with_owned_id(),
            indices_map: Vec::new(),
            identity_mapping: true,
            num_unique_entries: 0,
            attribute_transform_data: None,
        }
    }
}

impl PointAttribute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an attribute with the same shape as `view` but no values.
    pub fn from_geometry_attribute(view: &GeometryAttribute) -> Self {
        let mut attribute = Self::new();
        attribute.init(
            view.attribute_type(),
            view.num_components(),
            view.data_type(),
            view.normalized(),
            0,
        );
        attribute.set_unique_id(view.unique_id());
        attribute
    }

    /// Copies `num_values` values described by `view` out of the shared
    /// (possibly interleaved) arena buffer the view was initialized over.
    /// Fails when that buffer has been updated since.
    pub fn from_geometry_view(view: &GeometryAttribute, arena: &BufferArena, num_values: usize) -> StatusOr<Self> {
        let descriptor = view.buffer_descriptor();
        if arena.is_stale(&descriptor) {
            return Err(DracoError::BufferError(format!(
                "Buffer {} changed since the view was initialized",
                descriptor.buffer_id
            )));
        }
        let buffer = arena
            .find(&descriptor)
            .and_then(|handle| arena.get(handle))
            .ok_or_else(|| DracoError::BufferError(format!("Unknown buffer {}", descriptor.buffer_id)))?;

        let mut attribute = Self::from_geometry_attribute(view);
        attribute.reset(num_values);
        for i in 0..num_values {
            let index = AttributeValueIndex(i as u32);
            let bytes = view.value_bytes(buffer, index).ok_or_else(|| {
                DracoError::BufferError(format!("Value {} lies outside of the source buffer", i))
            })?;
            attribute.set_attribute_value(index, bytes)?;
        }
        Ok(attribute)
    }

    pub fn init(
        &mut self,
        attribute_type: GeometryAttributeType,
        num_components: u8,
        data_type: DataType,
        normalized: bool,
        num_attribute_values: usize,
    ) {
        let byte_stride = (num_components as usize * data_type.byte_length()) as i64;
        self.base.init(attribute_type, None, num_components, data_type, normalized, byte_stride, 0);
        self.reset(num_attribute_values);
        self.set_identity_mapping();
    }

    /// Reallocates the value storage for `num_attribute_values` zeroed
    /// entries. Mapping and transform data are left untouched.
    pub fn reset(&mut self, num_attribute_values: usize) {
        let entry_size = self.base.byte_stride() as usize;
        self.buffer.update(&vec![0u8; num_attribute_values * entry_size]);
        self.num_unique_entries = num_attribute_values;
        self.sync_buffer_descriptor();
    }

    /// Resizes the value storage, keeping the first `new_num_unique_entries`
    /// values intact.
    pub fn resize(&mut self, new_num_unique_entries: usize) {
        let entry_size = self.base.byte_stride() as usize;
        self.buffer.resize(new_num_unique_entries * entry_size);
        self.num_unique_entries = new_num_unique_entries;
        self.sync_buffer_descriptor();
    }

    /// Makes this attribute a deep copy of `src`. The unique id and buffer id
    /// of this attribute are kept.
    pub fn copy_from(&mut self, src: &PointAttribute) {
        self.base.copy_from(&src.base);
        self.buffer.update(src.buffer.data());
        self.indices_map = src.indices_map.clone();
        self.identity_mapping = src.identity_mapping;
        self.num_unique_entries = src.num_unique_entries;
        self.attribute_transform_data = src.attribute_transform_data.clone();
        self.sync_buffer_descriptor();
    }

    fn sync_buffer_descriptor(&mut self) {
        self.base.set_buffer_descriptor(self.buffer.descriptor());
    }

    pub fn geometry_attribute(&self) -> &GeometryAttribute {
        &self.base
    }

    pub fn mapped_index(&self, point_index: PointIndex) -> AttributeValueIndex {
        if self.identity_mapping {
            AttributeValueIndex(point_index.0)
        } else {
            self.indices_map
                .get(point_index.value())
                .copied()
                .unwrap_or(INVALID_ATTRIBUTE_VALUE_INDEX)
        }
    }

    /// Number of stored (unique) values.
    pub fn size(&self) -> usize {
        self.num_unique_entries
    }

    /// Number of explicit mapping entries; 0 with identity mapping.
    pub fn indices_map_size(&self) -> usize {
        if self.identity_mapping {
            0
        } else {
            self.indices_map.len()
        }
    }

    pub fn is_mapping_identity(&self) -> bool {
        self.identity_mapping
    }

    pub fn set_identity_mapping(&mut self) {
        self.identity_mapping = true;
        self.indices_map.clear();
    }

    /// Switches to explicit mapping with `num_points` entries. New entries
    /// are invalid until set.
    pub fn set_explicit_mapping(&mut self, num_points: usize) {
        self.identity_mapping = false;
        self.indices_map.resize(num_points, INVALID_ATTRIBUTE_VALUE_INDEX);
    }

    /// Sets the value of `point_index`. Ignored with identity mapping or for
    /// points outside of the explicit map.
    pub fn set_point_map_entry(&mut self, point_index: PointIndex, entry_index: AttributeValueIndex) {
        debug_assert!(!self.identity_mapping, "point map entry set on identity mapping");
        if self.identity_mapping {
            return;
        }
        if let Some(entry) = self.indices_map.get_mut(point_index.value()) {
            *entry = entry_index;
        }
    }

    pub fn buffer(&self) -> &DataBuffer {
        &self.buffer
    }

    /// Mutable access to the raw storage. Writes through this slice do not
    /// change the buffer descriptor.
    pub fn buffer_data_mut(&mut self) -> &mut [u8] {
        self.buffer.data_mut()
    }

    /// Writes one value tuple; `value` must be exactly one entry long.
    pub fn set_attribute_value(&mut self, index: AttributeValueIndex, value: &[u8]) -> Status {
        if value.len() != self.base.entry_size() {
            return Err(DracoError::InvalidParameter(format!(
                "Attribute value of {} bytes, expected {}",
                value.len(),
                self.base.entry_size()
            )));
        }
        let byte_pos = self.base.byte_pos(index);
        self.buffer.write(byte_pos, value)
    }

    /// Writes one value from typed components.
    pub fn set_typed_value<T: ValueType>(&mut self, index: AttributeValueIndex, value: &[T]) -> Status {
        self.set_attribute_value(index, bytemuck::cast_slice(value))
    }

    pub fn value_bytes(&self, index: AttributeValueIndex) -> Option<&[u8]> {
        self.base.value_bytes(&self.buffer, index)
    }

    pub fn get_value<T: ValueType, const N: usize>(&self, index: AttributeValueIndex) -> Option<[T; N]> {
        self.base.get_value(&self.buffer, index)
    }

    pub fn get_value_vec<T: ValueType>(&self, index: AttributeValueIndex) -> Option<Vec<T>> {
        self.base.get_value_vec(&self.buffer, index)
    }

    pub fn convert_value<T: ValueType>(&self, index: AttributeValueIndex, out: &mut [T]) -> bool {
        self.base.convert_value(&self.buffer, index, out)
    }

    pub fn convert_value_array<T: ValueType, const N: usize>(&self, index: AttributeValueIndex) -> Option<[T; N]> {
        self.base.convert_value_array(&self.buffer, index)
    }

    /// Merges values with identical bytes. Returns the number of unique
    /// values after deduplication.
    ///
    /// Values are compared bit for bit, so `0.0` and `-0.0` (or two NaNs with
    /// different payloads) stay separate entries.
    pub fn deduplicate_values(&mut self) -> StatusOr<usize> {
        match self.data_type() {
            DataType::Float32
            | DataType::Int8
            | DataType::Uint8
            | DataType::Bool
            | DataType::Int16
            | DataType::Uint16
            | DataType::Int32
            | DataType::Uint32 => {}
            other => {
                return Err(DracoError::UnsupportedFeature(format!(
                    "Deduplication of {} attribute values",
                    other
                )))
            }
        }

        let num_entries = self.num_unique_entries;
        let mut value_map: HashMap<Vec<u8>, AttributeValueIndex> = HashMap::with_capacity(num_entries);
        let mut value_to_value_map = Vec::with_capacity(num_entries);
        let mut unique_vals = 0u32;
        for i in 0..num_entries {
            let key = self
                .value_bytes(AttributeValueIndex(i as u32))
                .ok_or_else(|| DracoError::BufferError(format!("Attribute value {} out of bounds", i)))?
                .to_vec();
            match value_map.entry(key) {
                Entry::Occupied(entry) => value_to_value_map.push(*entry.get()),
                Entry::Vacant(entry) => {
                    let new_index = AttributeValueIndex(unique_vals);
                    if new_index.value() != i {
                        self.buffer.write(self.base.byte_pos(new_index), entry.key())?;
                    }
                    entry.insert(new_index);
                    value_to_value_map.push(new_index);
                    unique_vals += 1;
                }
            }
        }

        if unique_vals as usize == num_entries {
            return Ok(num_entries);
        }

        if self.identity_mapping {
            self.identity_mapping = false;
            self.indices_map = value_to_value_map;
        } else {
            for entry in self.indices_map.iter_mut() {
                if let Some(&mapped) = value_to_value_map.get(entry.value()) {
                    *entry = mapped;
                }
            }
        }
        self.resize(unique_vals as usize);
        log::debug!(
            "Deduplicated attribute {}: {} -> {} values",
            self.unique_id(),
            num_entries,
            unique_vals
        );
        Ok(unique_vals as usize)
    }

    pub fn set_attribute_transform_data(&mut self, data: AttributeTransformData) {
        self.attribute_transform_data = Some(data);
    }

    pub fn attribute_transform_data(&self) -> Option<&AttributeTransformData> {
        self.attribute_transform_data.as_ref()
    }

    pub fn clear_attribute_transform_data(&mut self) {
        self.attribute_transform_data = None;
    }

    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.base.attribute_type()
    }

    pub fn set_attribute_type(&mut self, attribute_type: GeometryAttributeType) {
        self.base.set_attribute_type(attribute_type);
    }

    pub fn unique_id(&self) -> u32 {
        self.base.unique_id()
    }

    pub fn set_unique_id(&mut self, id: u32) {
        self.base.set_unique_id(id);
    }

    pub fn data_type(&self) -> DataType {
        self.base.data_type()
    }

    pub fn normalized(&self) -> bool {
        self.base.normalized()
    }

    pub fn num_components(&self) -> u8 {
        self.base.num_components()
    }

    pub fn byte_stride(&self) -> i64 {
        self.base.byte_stride()
    }

    pub fn entry_size(&self) -> usize {
        self.base.entry_size()
    }
}
