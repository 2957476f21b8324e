use crate::geometry_indices::PointIndex;
use crate::point_attribute::PointAttribute;
use crate::status::{Status, StatusOr};

/// Produces the order in which points are encoded and, on decode, installs
/// the matching point to value mapping on decoded attributes.
pub trait PointsSequencer {
    /// Number of points the sequence visits.
    fn num_points(&self) -> usize;

    fn generate_sequence(&mut self) -> StatusOr<Vec<PointIndex>>;

    fn update_point_to_attribute_index_mapping(&self, attribute: &mut PointAttribute) -> Status;
}

/// Visits points `0..num_points` in order. Decoded values are stored in the
/// same order, so attributes get identity mapping.
#[derive(Debug, Clone, Copy)]
pub struct LinearSequencer {
    num_points: usize,
}

impl LinearSequencer {
    pub fn new(num_points: usize) -> Self {
        Self { num_points }
    }
}

impl PointsSequencer for LinearSequencer {
    fn num_points(&self) -> usize {
        self.num_points
    }

    fn generate_sequence(&mut self) -> StatusOr<Vec<PointIndex>> {
        Ok((0..self.num_points).map(|i| PointIndex(i as u32)).collect())
    }

    fn update_point_to_attribute_index_mapping(&self, attribute: &mut PointAttribute) -> Status {
        attribute.set_identity_mapping();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draco_types::DataType;
    use crate::geometry_attribute::GeometryAttributeType;
    use crate::geometry_indices::AttributeValueIndex;

    #[test]
    fn test_linear_sequence() {
        let mut sequencer = LinearSequencer::new(3);
        assert_eq!(sequencer.num_points(), 3);
        assert_eq!(sequencer.generate_sequence().unwrap(), vec![PointIndex(0), PointIndex(1), PointIndex(2)]);
        assert!(LinearSequencer::new(0).generate_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_installs_identity_mapping() {
        let mut att = PointAttribute::new();
        att.init(GeometryAttributeType::Generic, 1, DataType::Uint8, false, 2);
        att.set_explicit_mapping(2);
        att.set_point_map_entry(PointIndex(0), AttributeValueIndex(1));

        LinearSequencer::new(2).update_point_to_attribute_index_mapping(&mut att).unwrap();
        assert!(att.is_mapping_identity());
        assert_eq!(att.mapped_index(PointIndex(0)), AttributeValueIndex(0));
    }
}
