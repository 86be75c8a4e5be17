use std::collections::HashMap;

use thiserror::Error;

use super::CompressedMesh;
use crate::core::attribute::{AttributeId, AttributeKind, ComponentDataType, PointAttribute};
use crate::core::shared::{AttributeValueIdx, PointIdx, VecPointIdx};

/// Assembles a [`CompressedMesh`] from faces and per-point attributes.
///
/// Points are created freely during assembly (the export path makes one per
/// triangle corner) and deduplicated in [`build`](Self::build): points whose
/// complete attribute-index tuples coincide collapse into one.
pub struct CompressedMeshBuilder {
    name: String,
    num_points: usize,
    faces: Vec<[PointIdx; 3]>,
    attributes: Vec<PointAttribute>,
}

impl CompressedMeshBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            num_points: 0,
            faces: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    /// Declares the number of points before attributes are added; every
    /// attribute's point map is sized against it.
    pub fn set_num_points(&mut self, num_points: usize) {
        self.num_points = num_points;
        for att in &mut self.attributes {
            att.resize_point_map(num_points);
        }
    }

    pub fn push_face(&mut self, face: [PointIdx; 3]) {
        self.faces.push(face);
    }

    /// Creates an attribute with `num_values` zero-filled values and an
    /// all-zero point map, and returns its id for later writes.
    pub fn add_attribute(
        &mut self,
        kind: AttributeKind,
        component_type: ComponentDataType,
        num_components: usize,
        num_values: usize,
    ) -> AttributeId {
        let id = AttributeId::new(self.attributes.len());
        let mut att = PointAttribute::new(id, kind, component_type, num_components);
        att.resize_values(num_values);
        att.resize_point_map(self.num_points);
        self.attributes.push(att);
        id
    }

    pub fn attribute_mut(&mut self, id: AttributeId) -> &mut PointAttribute {
        &mut self.attributes[usize::from(id)]
    }

    pub fn build(mut self) -> Result<CompressedMesh, Err> {
        self.check_validity()?;
        self.deduplicate_points();
        Ok(CompressedMesh {
            name: self.name,
            num_points: self.num_points,
            faces: self.faces,
            attributes: self.attributes,
        })
    }

    fn check_validity(&self) -> Result<(), Err> {
        for (i, face) in self.faces.iter().enumerate() {
            for &p in face {
                if usize::from(p) >= self.num_points {
                    return Err(Err::FacePointOutOfRange(i, p, self.num_points));
                }
            }
        }
        for att in &self.attributes {
            if att.num_mapped_points() != self.num_points {
                return Err(Err::PointMapSizeMismatch(
                    att.get_kind(),
                    att.num_mapped_points(),
                    self.num_points,
                ));
            }
            for p in 0..self.num_points {
                let val_idx = att.mapped_index(PointIdx::from(p));
                if usize::from(val_idx) >= att.num_values() {
                    return Err(Err::AttributeValueOutOfRange(
                        att.get_kind(),
                        PointIdx::from(p),
                        val_idx,
                        att.num_values(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Merges points whose value-index tuples agree across every attribute,
    /// remapping faces and point maps onto the surviving points.
    fn deduplicate_points(&mut self) {
        if self.num_points == 0 || self.attributes.is_empty() {
            return;
        }

        let mut seen: HashMap<Vec<AttributeValueIdx>, PointIdx> = HashMap::new();
        let mut point_remap: VecPointIdx<PointIdx> = Vec::with_capacity(self.num_points).into();
        let mut merged_maps: Vec<VecPointIdx<AttributeValueIdx>> =
            vec![VecPointIdx::new(); self.attributes.len()];
        let mut unique_count = 0;

        for p in 0..self.num_points {
            let point = PointIdx::from(p);
            let key: Vec<AttributeValueIdx> = self
                .attributes
                .iter()
                .map(|att| att.mapped_index(point))
                .collect();
            if let Some(&merged) = seen.get(&key) {
                point_remap.push(merged);
            } else {
                for (att_idx, &val_idx) in key.iter().enumerate() {
                    merged_maps[att_idx].push(val_idx);
                }
                let merged = PointIdx::from(unique_count);
                seen.insert(key, merged);
                point_remap.push(merged);
                unique_count += 1;
            }
        }

        if unique_count == self.num_points {
            return;
        }

        for face in &mut self.faces {
            for p in face.iter_mut() {
                *p = point_remap[*p];
            }
        }
        for (att, map) in self.attributes.iter_mut().zip(merged_maps) {
            att.set_point_map(map);
        }
        self.num_points = unique_count;
    }
}

impl Default for CompressedMeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone)]
pub enum Err {
    #[error("attribute {0:?} maps point {1:?} to value {2:?}, but only {3} values are stored")]
    AttributeValueOutOfRange(AttributeKind, PointIdx, AttributeValueIdx, usize),

    #[error("face {0} references point {1:?}, but the mesh has {2} points")]
    FacePointOutOfRange(usize, PointIdx, usize),

    #[error("attribute {0:?} has a point map of {1} entries for a mesh of {2} points")]
    PointMapSizeMismatch(AttributeKind, usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangle_builder() -> CompressedMeshBuilder {
        // Two triangles sharing an edge, one point per corner. Corners 2/3
        // and 0/5 carry identical attribute tuples and should merge.
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(6);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);
        builder.push_face([PointIdx::from(3), PointIdx::from(4), PointIdx::from(5)]);
        let pos_id = builder.add_attribute(AttributeKind::Position, ComponentDataType::F32, 3, 4);
        let map = [0, 1, 2, 2, 3, 0];
        for (p, &v) in map.iter().enumerate() {
            builder
                .attribute_mut(pos_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(v));
        }
        builder
    }

    #[test]
    fn test_point_deduplication() {
        let mesh = two_triangle_builder().build().expect("mesh should build");
        assert_eq!(mesh.num_points(), 4);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(
            mesh.get_faces()[0],
            [PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]
        );
        assert_eq!(
            mesh.get_faces()[1],
            [PointIdx::from(2), PointIdx::from(3), PointIdx::from(0)]
        );
    }

    #[test]
    fn test_differing_tuples_stay_apart() {
        // A second attribute disagrees where positions agree, so no points
        // may merge.
        let mut builder = two_triangle_builder();
        let flag_id = builder.add_attribute(AttributeKind::Generic, ComponentDataType::I32, 1, 6);
        for p in 0..6 {
            builder
                .attribute_mut(flag_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(p));
        }
        let mesh = builder.build().expect("mesh should build");
        assert_eq!(mesh.num_points(), 6);
    }

    #[test]
    fn test_rejects_unmapped_value() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);
        let id = builder.add_attribute(AttributeKind::Position, ComponentDataType::F32, 3, 2);
        builder
            .attribute_mut(id)
            .set_point_map_entry(PointIdx::from(2), AttributeValueIdx::from(5));
        assert!(matches!(
            builder.build(),
            Result::Err(Err::AttributeValueOutOfRange(..))
        ));
    }

    #[test]
    fn test_rejects_face_out_of_range() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(2);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);
        assert!(matches!(
            builder.build(),
            Result::Err(Err::FacePointOutOfRange(..))
        ));
    }
}
