use log::debug;

use crate::encoder_buffer::EncoderBuffer;
use crate::point_cloud::PointCloud;
use crate::status::{DracoError, Status, StatusOr};

/// Orders `num_nodes` nodes so that every node comes after all of its
/// parents. Nodes are placed in rounds: each round appends, in index order,
/// every remaining node whose parents were placed in earlier rounds.
pub fn rearrange_by_dependencies<F>(num_nodes: usize, mut parents: F) -> StatusOr<Vec<usize>>
where
    F: FnMut(usize) -> Vec<usize>,
{
    let parent_lists: Vec<Vec<usize>> = (0..num_nodes).map(&mut parents).collect();
    if let Some(bad) = parent_lists.iter().flatten().find(|&&p| p >= num_nodes) {
        return Err(DracoError::InvalidParameter(format!("Unknown parent node {}", bad)));
    }

    let mut processed = vec![false; num_nodes];
    let mut order = Vec::with_capacity(num_nodes);
    while order.len() < num_nodes {
        let ready: Vec<usize> = (0..num_nodes)
            .filter(|&node| !processed[node] && parent_lists[node].iter().all(|&p| processed[p]))
            .collect();
        if ready.is_empty() {
            return Err(DracoError::DracoError("Cycle in attribute dependencies".into()));
        }
        for node in ready {
            processed[node] = true;
            order.push(node);
        }
    }
    debug!("Dependency order: {:?}", order);
    Ok(order)
}

/// Set of point attributes that are encoded together and share one
/// descriptor table.
#[derive(Debug, Clone, Default)]
pub struct AttributesEncoder {
    point_attribute_ids: Vec<i32>,
}

impl AttributesEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute_ids(point_attribute_ids: Vec<i32>) -> Self {
        Self { point_attribute_ids }
    }

    pub fn add_attribute_id(&mut self, id: i32) {
        self.point_attribute_ids.push(id);
    }

    pub fn set_attribute_ids(&mut self, point_attribute_ids: Vec<i32>) {
        self.point_attribute_ids = point_attribute_ids;
    }

    pub fn attribute_ids(&self) -> &[i32] {
        &self.point_attribute_ids
    }

    pub fn num_attributes(&self) -> usize {
        self.point_attribute_ids.len()
    }

    /// Writes `varint count` followed by one descriptor per attribute.
    pub fn encode_attributes_encoder_data(&self, point_cloud: &PointCloud, out_buffer: &mut EncoderBuffer) -> Status {
        out_buffer.encode_varint(self.point_attribute_ids.len() as u64)?;
        for &att_id in &self.point_attribute_ids {
            let attribute = point_cloud
                .attribute(att_id)
                .ok_or_else(|| DracoError::InvalidParameter(format!("Invalid attribute id {}", att_id)))?;
            let attribute_type = attribute
                .attribute_type()
                .named_index()
                .ok_or_else(|| DracoError::InvalidParameter(format!("Attribute {} has no valid type", att_id)))?;
            if attribute.num_components() == 0 {
                return Err(DracoError::InvalidParameter(format!("Attribute {} has no components", att_id)));
            }
            out_buffer.encode_u8(attribute_type as u8)?;
            out_buffer.encode_u8(attribute.data_type() as u8)?;
            out_buffer.encode_u8(attribute.num_components())?;
            out_buffer.encode_u8(attribute.normalized() as u8)?;
            out_buffer.encode_varint(attribute.unique_id() as u64)?;
        }
        Ok(())
    }
}
