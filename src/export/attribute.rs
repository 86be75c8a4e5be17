use crate::core::attribute::descriptor::{AttributeDescriptor, METADATA_NAME_KEY};
use crate::core::attribute::AttributeId;
use crate::core::mesh::builder::CompressedMeshBuilder;
use crate::core::shared::{AttributeValueIdx, PointIdx};
use crate::scene::{Interpolation, PolygonMesh, PrimvarValue};

/// Reads one attribute's values and indices out of a scene mesh and writes
/// them into a compressed mesh under construction.
///
/// An attribute that is absent from the mesh leaves the wrapper empty;
/// every later call degrades to a no-op. Only the translator decides
/// whether an empty attribute is an error.
pub struct ExportAttribute<T: PrimvarValue> {
    descriptor: AttributeDescriptor,

    /// Handle to the created compressed attribute; `None` until
    /// [`set_to_mesh`](Self::set_to_mesh) delivers the values.
    attribute_id: Option<AttributeId>,

    /// True for vertex-interpolated primvars, whose indices live in
    /// position space rather than corner space.
    use_position_index: bool,

    values: Vec<T>,
    indices: Vec<usize>,
}

impl<T: PrimvarValue> ExportAttribute<T> {
    pub fn new(descriptor: &AttributeDescriptor) -> Self {
        Self {
            descriptor: descriptor.clone(),
            attribute_id: None,
            use_position_index: false,
            values: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Populates the wrapper from the scene mesh according to the
    /// descriptor. `num_positions` drives the implicit-index rule for
    /// vertex-interpolated primvars.
    pub fn get_from_mesh(&mut self, mesh: &PolygonMesh, num_positions: usize) {
        if self.descriptor.is_primvar() {
            let Some(primvar) = mesh.get_primvar(self.descriptor.name()) else {
                return;
            };
            // Primvars with constant interpolation are not translated to
            // the compressed mesh and remain on the scene mesh.
            if primvar.get_interpolation() == Interpolation::Constant {
                return;
            }
            // A value array of the wrong shape reads as absent.
            let Some(values) = T::extract(primvar.get_values()) else {
                return;
            };
            self.values = values.to_vec();
            if let Some(indices) = primvar.get_indices() {
                self.indices = indices.to_vec();
            }

            // Primvars with vertex interpolation may have implicit indices;
            // face-varying primvars may be laid out one value per corner.
            self.use_position_index = primvar.get_interpolation() == Interpolation::Vertex;
            if self.indices.is_empty() {
                if self.use_position_index && self.values.len() == num_positions {
                    self.indices = make_range(num_positions);
                } else if primvar.get_interpolation() == Interpolation::FaceVarying
                    && self.values.len() == mesh.num_face_vertices()
                {
                    self.indices = make_range(self.values.len());
                }
            }
        } else if let Some(values) = T::builtin_array(mesh, self.descriptor.name()) {
            self.values = values.to_vec();
        }
    }

    /// Creates the compressed attribute, writes every value at its value
    /// index, and names it through metadata when the descriptor carries a
    /// custom name. No-op when nothing was collected.
    pub fn set_to_mesh(&mut self, builder: &mut CompressedMeshBuilder) {
        // Optional attributes like normals may not be present.
        if self.values.is_empty() {
            return;
        }

        let id = builder.add_attribute(
            self.descriptor.kind(),
            self.descriptor.component_type(),
            self.descriptor.num_components(),
            self.values.len(),
        );
        let attribute = builder.attribute_mut(id);
        for (i, &value) in self.values.iter().enumerate() {
            attribute.set_value(AttributeValueIdx::from(i), value);
        }
        if let Some(metadata_name) = self.descriptor.metadata_name() {
            attribute
                .metadata_mut()
                .add_entry(METADATA_NAME_KEY, metadata_name);
        }
        self.attribute_id = Some(id);
    }

    /// Maps a compressed-mesh point directly to a value index.
    pub fn set_point_map_entry(
        &self,
        builder: &mut CompressedMeshBuilder,
        point: PointIdx,
        entry_index: usize,
    ) {
        if let Some(id) = self.attribute_id {
            builder
                .attribute_mut(id)
                .set_point_map_entry(point, AttributeValueIdx::from(entry_index));
        }
    }

    /// Maps a point through the wrapper's index array, selecting the
    /// position or the corner index by the primvar's interpolation. This is
    /// the vertex-vs-face-varying dispatch point.
    pub fn set_point_map_entry_indexed(
        &self,
        builder: &mut CompressedMeshBuilder,
        point: PointIdx,
        position_index: usize,
        corner_index: usize,
    ) {
        if self.attribute_id.is_some() {
            let index = if self.use_position_index {
                position_index
            } else {
                corner_index
            };
            self.set_point_map_entry(builder, point, self.indices[index]);
        }
    }

    #[inline]
    pub fn get_name(&self) -> &str {
        self.descriptor.name()
    }

    #[inline]
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn get_indices(&self) -> &[usize] {
        &self.indices
    }

    #[inline]
    pub fn uses_position_index(&self) -> bool {
        self.use_position_index
    }

    #[inline]
    pub fn has_attribute(&self) -> bool {
        self.attribute_id.is_some()
    }
}

impl ExportAttribute<i32> {
    /// Populates the values with an ascending sequence `0..size`. Used for
    /// the bookkeeping channels whose value is itself an index.
    pub fn get_from_range(&mut self, size: usize) {
        self.values = (0..size as i32).collect();
    }
}

fn make_range(size: usize) -> Vec<usize> {
    (0..size).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::descriptor;
    use glam::{Vec2, Vec3};

    use crate::scene::{Primvar, PrimvarValues};

    fn quad_mesh() -> PolygonMesh {
        let mut mesh = PolygonMesh::new("quad");
        mesh.set_topology(vec![4], vec![0, 1, 2, 3]);
        mesh.set_positions(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        mesh
    }

    #[test]
    fn test_get_from_range() {
        let mut order = ExportAttribute::<i32>::new(&descriptor::POSITION_ORDER);
        order.get_from_range(4);
        assert_eq!(order.num_values(), 4);
        assert_eq!(order.num_indices(), 0);
    }

    #[test]
    fn test_missing_primvar_reads_as_empty() {
        let mut normals = ExportAttribute::<Vec3>::new(&descriptor::NORMALS);
        normals.get_from_mesh(&quad_mesh(), 4);
        assert_eq!(normals.num_values(), 0);
        assert!(!normals.has_attribute());
    }

    #[test]
    fn test_constant_primvar_is_skipped() {
        let mut mesh = quad_mesh();
        mesh.set_primvar(Primvar::new(
            "st",
            Interpolation::Constant,
            PrimvarValues::Float2(vec![Vec2::ZERO]),
        ));
        let mut st = ExportAttribute::<Vec2>::new(&descriptor::TEXTURE_COORDINATES);
        st.get_from_mesh(&mesh, 4);
        assert_eq!(st.num_values(), 0);
    }

    #[test]
    fn test_vertex_primvar_synthesizes_indices() {
        let mut mesh = quad_mesh();
        mesh.set_primvar(Primvar::new(
            "st",
            Interpolation::Vertex,
            PrimvarValues::Float2(vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y]),
        ));
        let mut st = ExportAttribute::<Vec2>::new(&descriptor::TEXTURE_COORDINATES);
        st.get_from_mesh(&mesh, 4);
        assert!(st.uses_position_index());
        assert_eq!(st.get_indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_face_varying_primvar_synthesizes_corner_indices() {
        let mut mesh = quad_mesh();
        mesh.set_primvar(Primvar::new(
            "st",
            Interpolation::FaceVarying,
            PrimvarValues::Float2(vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y]),
        ));
        let mut st = ExportAttribute::<Vec2>::new(&descriptor::TEXTURE_COORDINATES);
        st.get_from_mesh(&mesh, 4);
        assert!(!st.uses_position_index());
        assert_eq!(st.num_indices(), 4);
    }

    #[test]
    fn test_point_map_delivery() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        let mut positions = ExportAttribute::<Vec3>::new(&descriptor::POSITIONS);
        positions.get_from_mesh(&quad_mesh(), 4);
        positions.set_to_mesh(&mut builder);
        assert!(positions.has_attribute());
        positions.set_point_map_entry(&mut builder, PointIdx::from(0), 0);
        positions.set_point_map_entry(&mut builder, PointIdx::from(1), 1);
        positions.set_point_map_entry(&mut builder, PointIdx::from(2), 3);

        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);
        let mesh = builder.build().expect("mesh should build");
        let att = mesh
            .named_attribute(crate::core::attribute::AttributeKind::Position)
            .expect("positions should exist");
        assert_eq!(att.num_values(), 4);
        assert_eq!(
            att.mapped_index(PointIdx::from(2)),
            AttributeValueIdx::from(3)
        );
    }
}
