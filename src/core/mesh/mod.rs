pub mod builder;
pub mod metadata;

use serde::Serialize;

use super::attribute::{AttributeId, AttributeKind, PointAttribute};
use super::shared::{FaceIdx, PointIdx};

/// An immutable triangulated mesh in the compressed representation: faces
/// over shared points, and per-point indexed attributes. Translations only
/// query it; mutation happens in [`builder::CompressedMeshBuilder`].
#[derive(Debug, Clone, Serialize)]
pub struct CompressedMesh {
    pub(crate) name: String,
    pub(crate) num_points: usize,
    pub(crate) faces: Vec<[PointIdx; 3]>,
    pub(crate) attributes: Vec<PointAttribute>,
}

impl CompressedMesh {
    #[inline]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    #[inline]
    pub fn face(&self, face: FaceIdx) -> [PointIdx; 3] {
        self.faces[usize::from(face)]
    }

    #[inline]
    pub fn get_faces(&self) -> &[[PointIdx; 3]] {
        &self.faces
    }

    #[inline]
    pub fn get_attributes(&self) -> &[PointAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&PointAttribute> {
        self.attributes.get(usize::from(id))
    }

    /// The first attribute of the given semantic kind.
    pub fn named_attribute(&self, kind: AttributeKind) -> Option<&PointAttribute> {
        self.attributes.iter().find(|att| att.get_kind() == kind)
    }

    /// The attribute whose metadata entry under `key` equals `value`.
    pub fn attribute_by_metadata_entry(&self, key: &str, value: &str) -> Option<&PointAttribute> {
        self.attributes
            .iter()
            .find(|att| att.get_metadata().entry_matches(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::builder::CompressedMeshBuilder;
    use super::*;
    use crate::core::attribute::descriptor::METADATA_NAME_KEY;
    use crate::core::attribute::ComponentDataType;
    use crate::core::shared::AttributeValueIdx;

    #[test]
    fn test_attribute_lookup() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);

        let pos_id = builder.add_attribute(AttributeKind::Position, ComponentDataType::F32, 3, 3);
        let flag_id = builder.add_attribute(AttributeKind::Generic, ComponentDataType::I32, 1, 2);
        for p in 0..3 {
            builder
                .attribute_mut(pos_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(p));
            builder
                .attribute_mut(flag_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(0));
        }
        builder
            .attribute_mut(flag_id)
            .metadata_mut()
            .add_entry(METADATA_NAME_KEY, "added_edges");

        let mesh = builder.build().expect("mesh should build");
        assert!(mesh.named_attribute(AttributeKind::Position).is_some());
        assert!(mesh.named_attribute(AttributeKind::Normal).is_none());
        let by_name = mesh
            .attribute_by_metadata_entry(METADATA_NAME_KEY, "added_edges")
            .expect("metadata lookup should resolve");
        assert_eq!(by_name.get_kind(), AttributeKind::Generic);
        assert!(mesh
            .attribute_by_metadata_entry(METADATA_NAME_KEY, "hole_faces")
            .is_none());
    }
}
