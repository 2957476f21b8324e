use crate::geometry_attribute::{GeometryAttributeType, NAMED_ATTRIBUTES_COUNT};
use crate::geometry_indices::{AttributeValueIndex, PointIndex};
use crate::point_attribute::PointAttribute;
use crate::status::{DracoError, Status};

/// A set of points described by an arbitrary number of attributes.
#[derive(Debug, Default, Clone)]
pub struct PointCloud {
    attributes: Vec<PointAttribute>,
    num_points: usize,
    /// Ids of the attributes of every named type, in insertion order.
    named_attribute_index: [Vec<i32>; NAMED_ATTRIBUTES_COUNT],
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Adds an attribute and returns its id. The attribute's unique id is set
    /// to the same value.
    pub fn add_attribute(&mut self, mut attribute: PointAttribute) -> i32 {
        let id = self.attributes.len() as i32;
        attribute.set_unique_id(id as u32);
        if let Some(slot) = attribute.attribute_type().named_index() {
            self.named_attribute_index[slot].push(id);
        }
        self.attributes.push(attribute);
        id
    }

    /// Replaces the attribute `att_id`, keeping its id.
    pub fn set_attribute(&mut self, att_id: i32, mut attribute: PointAttribute) -> Status {
        let index = self.checked_index(att_id)?;
        let old_type = self.attributes[index].attribute_type();
        if let Some(slot) = old_type.named_index() {
            self.named_attribute_index[slot].retain(|&id| id != att_id);
        }
        attribute.set_unique_id(att_id as u32);
        if let Some(slot) = attribute.attribute_type().named_index() {
            let ids = &mut self.named_attribute_index[slot];
            ids.push(att_id);
            ids.sort_unstable();
        }
        self.attributes[index] = attribute;
        Ok(())
    }

    /// Removes an attribute. Ids of all following attributes shift down by one.
    pub fn delete_attribute(&mut self, att_id: i32) -> Status {
        let index = self.checked_index(att_id)?;
        self.attributes.remove(index);
        for ids in self.named_attribute_index.iter_mut() {
            ids.retain(|&id| id != att_id);
            for id in ids.iter_mut() {
                if *id > att_id {
                    *id -= 1;
                }
            }
        }
        Ok(())
    }

    fn checked_index(&self, att_id: i32) -> Result<usize, DracoError> {
        if att_id < 0 || att_id as usize >= self.attributes.len() {
            return Err(DracoError::InvalidParameter(format!("Invalid attribute id {}", att_id)));
        }
        Ok(att_id as usize)
    }

    pub fn num_attributes(&self) -> i32 {
        self.attributes.len() as i32
    }

    pub fn attribute(&self, att_id: i32) -> Option<&PointAttribute> {
        usize::try_from(att_id).ok().and_then(|i| self.attributes.get(i))
    }

    pub fn attribute_mut(&mut self, att_id: i32) -> Option<&mut PointAttribute> {
        usize::try_from(att_id).ok().and_then(move |i| self.attributes.get_mut(i))
    }

    pub fn attributes(&self) -> &[PointAttribute] {
        &self.attributes
    }

    pub fn num_named_attributes(&self, att_type: GeometryAttributeType) -> usize {
        att_type
            .named_index()
            .map_or(0, |slot| self.named_attribute_index[slot].len())
    }

    /// Id of the `i`-th attribute of `att_type`, or -1.
    pub fn named_attribute_id(&self, att_type: GeometryAttributeType, i: usize) -> i32 {
        att_type
            .named_index()
            .and_then(|slot| self.named_attribute_index[slot].get(i).copied())
            .unwrap_or(-1)
    }

    /// First attribute of `att_type`.
    pub fn named_attribute(&self, att_type: GeometryAttributeType) -> Option<&PointAttribute> {
        self.attribute(self.named_attribute_id(att_type, 0))
    }

    pub fn attribute_by_unique_id(&self, unique_id: u32) -> Option<&PointAttribute> {
        self.attributes.iter().find(|att| att.unique_id() == unique_id)
    }

    pub fn attribute_id_by_unique_id(&self, unique_id: u32) -> i32 {
        self.attributes
            .iter()
            .position(|att| att.unique_id() == unique_id)
            .map_or(-1, |i| i as i32)
    }

    /// Deduplicates the values of every attribute.
    pub fn deduplicate_attribute_values(&mut self) -> Status {
        for attribute in self.attributes.iter_mut() {
            attribute.deduplicate_values()?;
        }
        Ok(())
    }

    /// Checks that every point maps to a stored value of every attribute.
    pub fn is_well_formed(&self) -> bool {
        self.attributes.iter().all(|att| {
            if att.is_mapping_identity() {
                att.size() >= self.num_points
            } else {
                att.indices_map_size() >= self.num_points
                    && (0..self.num_points).all(|p| {
                        let index: AttributeValueIndex = att.mapped_index(PointIndex(p as u32));
                        index.value() < att.size()
                    })
            }
        })
    }
}
