use crate::core::attribute::descriptor::{AttributeDescriptor, METADATA_NAME_KEY};
use crate::core::attribute::PointAttribute;
use crate::core::mesh::CompressedMesh;
use crate::core::shared::{FaceIdx, PointIdx};
use crate::scene::{Interpolation, PolygonMesh, Primvar, PrimvarValue};

/// Reads one attribute's values out of a compressed mesh and writes them
/// back to a scene mesh as attribute plus index pairs.
///
/// The underlying compressed attribute is resolved at construction; a mesh
/// that does not carry it leaves the wrapper empty, and every accessor
/// degrades accordingly.
pub struct ImportAttribute<'mesh, T: PrimvarValue> {
    descriptor: AttributeDescriptor,

    /// Borrowed handle to the compressed attribute; `None` when the mesh
    /// does not carry it.
    attribute: Option<&'mesh PointAttribute>,

    values: Vec<T>,
    indices: Vec<usize>,
}

impl<'mesh, T: PrimvarValue> ImportAttribute<'mesh, T> {
    pub fn new(descriptor: &AttributeDescriptor, mesh: &'mesh CompressedMesh) -> Self {
        let attribute = match descriptor.metadata_name() {
            Some(name) => mesh.attribute_by_metadata_entry(METADATA_NAME_KEY, name),
            None => mesh.named_attribute(descriptor.kind()),
        };
        Self {
            descriptor: descriptor.clone(),
            attribute,
            values: Vec::new(),
            indices: Vec::new(),
        }
    }

    #[inline]
    pub fn has_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    #[inline]
    pub fn attribute(&self) -> Option<&'mesh PointAttribute> {
        self.attribute
    }

    /// Copies every value in storage order. Used where storage order
    /// already is the desired output order.
    pub fn populate_values(&mut self) {
        let Some(attribute) = self.attribute else {
            return;
        };
        self.values = (0..attribute.num_values())
            .map(|i| attribute.get(i.into()))
            .collect();
    }

    /// Copies every value into the slot the order channel assigns to its
    /// point, walking faces and corners in traversal order. Each slot is
    /// written by its first visitor only, so the result does not depend on
    /// how the compressed mesh laid the values out internally.
    pub fn populate_values_with_order(
        &mut self,
        order: &ImportAttribute<i32>,
        num_faces: usize,
        mesh: &CompressedMesh,
    ) {
        let Some(attribute) = self.attribute else {
            return;
        };
        let num_values = attribute.num_values();
        self.values = vec![T::zeroed(); num_values];
        let mut populated = vec![false; num_values];
        for f in 0..num_faces {
            for point in mesh.face(FaceIdx::from(f)) {
                let slot = order.mapped_value(point) as usize;
                if !populated[slot] {
                    self.values[slot] = attribute.mapped_value(point);
                    populated[slot] = true;
                }
            }
        }
    }

    /// The value index the given point maps to, as a plain index into the
    /// value array. Zero when the attribute is absent; callers guard with
    /// [`has_attribute`](Self::has_attribute).
    #[inline]
    pub fn mapped_index(&self, point: PointIdx) -> usize {
        self.attribute
            .map(|att| usize::from(att.mapped_index(point)))
            .unwrap_or(0)
    }

    pub fn resize_indices(&mut self, size: usize) {
        if self.attribute.is_none() {
            return;
        }
        self.indices = vec![0; size];
    }

    pub fn set_index(&mut self, at: usize, value_index: usize) {
        self.indices[at] = value_index;
    }

    #[inline]
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn get_values(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn get_indices(&self) -> &[usize] {
        &self.indices
    }

    /// Writes the populated values back to the scene mesh: primvar
    /// descriptors become face-varying primvars with an index array,
    /// others land in the mesh's built-in arrays. No-op when nothing was
    /// populated.
    pub fn set_to_mesh(&self, mesh: &mut PolygonMesh) {
        if self.values.is_empty() {
            return;
        }
        if self.descriptor.is_primvar() {
            mesh.set_primvar(Primvar::indexed(
                self.descriptor.name(),
                Interpolation::FaceVarying,
                T::wrap(self.values.clone()),
                self.indices.clone(),
            ));
        } else {
            T::set_builtin_array(mesh, self.descriptor.name(), &self.values);
        }
    }
}

impl<'mesh> ImportAttribute<'mesh, i32> {
    /// The integer value stored for the given point. Zero when the
    /// attribute is absent, which reads as "not flagged" for the flag
    /// channels.
    #[inline]
    pub fn mapped_value(&self, point: PointIdx) -> i32 {
        self.attribute
            .map(|att| att.mapped_value(point))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::descriptor;
    use crate::core::attribute::{AttributeKind, ComponentDataType};
    use crate::core::mesh::builder::CompressedMeshBuilder;
    use crate::core::shared::AttributeValueIdx;
    use glam::Vec3;

    /// One triangle, three points, with positions stored in the given
    /// order and a position-order channel mapping them back to slots
    /// 0, 1, 2.
    fn triangle_with_storage_order(storage: [usize; 3]) -> CompressedMesh {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);

        let canonical = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let pos_id = builder.add_attribute(AttributeKind::Position, ComponentDataType::F32, 3, 3);
        for (slot, &at) in storage.iter().enumerate() {
            builder
                .attribute_mut(pos_id)
                .set_value(AttributeValueIdx::from(at), canonical[slot]);
        }
        for p in 0..3 {
            builder
                .attribute_mut(pos_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(storage[p]));
        }

        let order_id = builder.add_attribute(AttributeKind::Generic, ComponentDataType::I32, 1, 3);
        for v in 0..3 {
            builder
                .attribute_mut(order_id)
                .set_value(AttributeValueIdx::from(v), v as i32);
            builder
                .attribute_mut(order_id)
                .set_point_map_entry(PointIdx::from(v), AttributeValueIdx::from(v));
        }
        builder
            .attribute_mut(order_id)
            .metadata_mut()
            .add_entry(METADATA_NAME_KEY, "position_order");

        builder.build().expect("mesh should build")
    }

    #[test]
    fn test_absent_attribute_degrades() {
        let mesh = triangle_with_storage_order([0, 1, 2]);
        let mut normals = ImportAttribute::<Vec3>::new(&descriptor::NORMALS, &mesh);
        assert!(!normals.has_attribute());
        normals.populate_values();
        assert_eq!(normals.num_values(), 0);
        normals.resize_indices(3);
        assert_eq!(normals.get_indices().len(), 0);
        let mut scene = PolygonMesh::new("out");
        normals.set_to_mesh(&mut scene);
        assert!(scene.get_primvar("normals").is_none());
    }

    #[test]
    fn test_populate_values_with_order_is_storage_independent() {
        let reference = triangle_with_storage_order([0, 1, 2]);
        let permuted = triangle_with_storage_order([2, 0, 1]);

        let mut out = Vec::new();
        for mesh in [&reference, &permuted] {
            let order = ImportAttribute::<i32>::new(&descriptor::POSITION_ORDER, mesh);
            assert!(order.has_attribute());
            let mut positions = ImportAttribute::<Vec3>::new(&descriptor::POSITIONS, mesh);
            positions.populate_values_with_order(&order, mesh.num_faces(), mesh);
            out.push(positions.get_values().to_vec());
        }
        assert_eq!(out[0], out[1]);
        assert_eq!(out[0], vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
    }

    #[test]
    fn test_populate_values_follows_storage_order() {
        let mesh = triangle_with_storage_order([2, 0, 1]);
        let mut positions = ImportAttribute::<Vec3>::new(&descriptor::POSITIONS, &mesh);
        positions.populate_values();
        // Storage slot 0 holds the value of canonical position 1.
        assert_eq!(positions.get_values()[0], Vec3::X);
    }
}
