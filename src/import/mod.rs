pub mod attribute;

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::debug;

use crate::core::attribute::descriptor;
use crate::core::corner_table::CornerTable;
use crate::core::mesh::CompressedMesh;
use crate::core::shared::{FaceIdx, PointIdx, VecFaceIdx};
use crate::scene::PolygonMesh;
use attribute::ImportAttribute;

/// Boundary edges of one polygon under reconstruction, keyed by the
/// position index the edge starts at and mapping to its start and end
/// points. The ordered map makes iteration deterministic.
type PolygonEdges = BTreeMap<usize, (PointIdx, PointIdx)>;

/// Reconstructs a general polygonal scene mesh from a compressed
/// triangulated mesh.
///
/// Triangles connected across edges flagged by the added-edges channel are
/// merged back into the original n-gons, hole polygons are re-flagged from
/// the hole-faces channel, and every per-corner attribute is re-indexed
/// against the reconstructed topology.
pub struct ImportTranslator<'mesh> {
    mesh: &'mesh CompressedMesh,

    positions: ImportAttribute<'mesh, Vec3>,
    texture_coordinates: ImportAttribute<'mesh, Vec2>,
    normals: ImportAttribute<'mesh, Vec3>,
    hole_faces: ImportAttribute<'mesh, i32>,
    added_edges: ImportAttribute<'mesh, i32>,
    position_order: ImportAttribute<'mesh, i32>,

    face_vertex_counts: Vec<usize>,
    face_vertex_indices: Vec<usize>,
    /// One point per reconstructed corner, driving primvar index
    /// assignment.
    face_vertex_points: Vec<PointIdx>,
    hole_indices: Vec<usize>,
}

impl<'mesh> ImportTranslator<'mesh> {
    /// Translates the compressed mesh and returns the scene mesh.
    pub fn translate(mesh: &CompressedMesh) -> Result<PolygonMesh, Err> {
        ImportTranslator::new(mesh).translate_impl()
    }

    fn new(mesh: &'mesh CompressedMesh) -> Self {
        Self {
            mesh,
            positions: ImportAttribute::new(&descriptor::POSITIONS, mesh),
            texture_coordinates: ImportAttribute::new(&descriptor::TEXTURE_COORDINATES, mesh),
            normals: ImportAttribute::new(&descriptor::NORMALS, mesh),
            hole_faces: ImportAttribute::new(&descriptor::HOLE_FACES, mesh),
            added_edges: ImportAttribute::new(&descriptor::ADDED_EDGES, mesh),
            position_order: ImportAttribute::new(&descriptor::POSITION_ORDER, mesh),
            face_vertex_counts: Vec::new(),
            face_vertex_indices: Vec::new(),
            face_vertex_points: Vec::new(),
            hole_indices: Vec::new(),
        }
    }

    fn translate_impl(mut self) -> Result<PolygonMesh, Err> {
        debug!(
            name = self.mesh.get_name(),
            num_faces = self.mesh.num_faces(),
            "importing compressed mesh"
        );
        self.check_data()?;
        self.populate_values_from_mesh();
        self.populate_indices_from_mesh()?;

        let mut out = PolygonMesh::new(self.mesh.get_name());
        out.set_topology(
            std::mem::take(&mut self.face_vertex_counts),
            std::mem::take(&mut self.face_vertex_indices),
        );
        out.set_hole_indices(std::mem::take(&mut self.hole_indices));
        self.set_attributes_to_mesh(&mut out);
        out.set_extent(self.compute_extent());
        debug!(
            num_polygons = out.num_faces(),
            num_holes = out.get_hole_indices().len(),
            "import complete"
        );
        Ok(out)
    }

    fn check_data(&self) -> Result<(), Err> {
        let Some(positions) = self.positions.attribute() else {
            return Err(Err::MissingPositions);
        };
        if self.mesh.num_faces() == 0 {
            return Err(Err::NoFaces);
        }
        // The order channel addresses position slots; reject values that
        // fall outside them before they are used anywhere.
        if self.position_order.has_attribute() {
            let num_positions = positions.num_values();
            for p in 0..self.mesh.num_points() {
                let value = self.position_order.mapped_value(PointIdx::from(p));
                if value < 0 || value as usize >= num_positions {
                    return Err(Err::PositionOrderOutOfRange {
                        value,
                        num_positions,
                    });
                }
            }
        }
        Ok(())
    }

    fn populate_values_from_mesh(&mut self) {
        if self.position_order.has_attribute() {
            self.positions.populate_values_with_order(
                &self.position_order,
                self.mesh.num_faces(),
                self.mesh,
            );
        } else {
            self.positions.populate_values();
        }
        self.texture_coordinates.populate_values();
        self.normals.populate_values();
    }

    /// The output slot of the position carried by the given point: the
    /// canonical slot when the order channel exists, storage order
    /// otherwise.
    #[inline]
    fn position_index(&self, point: PointIdx) -> usize {
        if self.position_order.has_attribute() {
            self.position_order.mapped_value(point) as usize
        } else {
            self.positions.mapped_index(point)
        }
    }

    /// Merges triangles back into polygons and rebuilds the face arrays.
    fn populate_indices_from_mesh(&mut self) -> Result<(), Err> {
        // check_data established that positions exist.
        let Some(positions) = self.positions.attribute() else {
            return Err(Err::MissingPositions);
        };
        let corner_table = CornerTable::new(self.mesh.get_faces(), positions);
        let num_faces = self.mesh.num_faces();
        let mut triangle_visited = VecFaceIdx::from(vec![false; num_faces]);
        let mut polygon_edges = PolygonEdges::new();

        for f in 0..num_faces {
            let face_index = FaceIdx::from(f);
            if triangle_visited[face_index] {
                continue;
            }
            polygon_edges.clear();
            self.find_original_face_edges(
                face_index,
                &corner_table,
                &mut triangle_visited,
                &mut polygon_edges,
            )?;
            if polygon_edges.is_empty() {
                return Err(Err::BoundaryLoopOpen { face: f });
            }

            let polygon = self.face_vertex_counts.len();
            self.face_vertex_counts.push(polygon_edges.len());

            // Stitch the boundary into one vertex loop. The walk is bounded
            // by the recorded edge count, so corrupt connectivity surfaces
            // as an error instead of spinning.
            let first_point = self.mesh.face(face_index)[0];
            let start = self.position_index(first_point);
            let mut position = start;
            for _ in 0..polygon_edges.len() {
                let &(start_point, end_point) = polygon_edges
                    .get(&position)
                    .ok_or(Err::BoundaryLoopOpen { face: f })?;
                self.face_vertex_indices.push(position);
                self.face_vertex_points.push(start_point);
                position = self.position_index(end_point);
            }
            if position != start {
                return Err(Err::BoundaryLoopOpen { face: f });
            }

            if self.hole_faces.has_attribute() && self.hole_faces.mapped_value(first_point) != 0 {
                self.hole_indices.push(polygon);
            }
        }
        Ok(())
    }

    /// Collects the boundary edges of the polygon containing `start_face`,
    /// crossing added edges into neighboring triangles and marking every
    /// reached triangle visited.
    fn find_original_face_edges(
        &self,
        start_face: FaceIdx,
        corner_table: &CornerTable,
        triangle_visited: &mut VecFaceIdx<bool>,
        polygon_edges: &mut PolygonEdges,
    ) -> Result<(), Err> {
        let mut pending = vec![start_face];
        while let Some(face_index) = pending.pop() {
            if triangle_visited[face_index] {
                continue;
            }
            triangle_visited[face_index] = true;
            let face = self.mesh.face(face_index);
            for c in 0..3 {
                let corner = CornerTable::corner(face_index, c);
                let opposite = corner_table.opposite(corner);
                // An edge is an added edge when it is flagged from both of
                // its sides.
                let added = opposite.map_or(false, |o| {
                    self.is_added_edge(face[c], corner_table.point(o))
                });
                match opposite {
                    Some(o) if added => {
                        pending.push(corner_table.face_containing(o));
                    }
                    _ => {
                        let from = face[(c + 1) % 3];
                        let to = face[(c + 2) % 3];
                        let key = self.position_index(from);
                        if polygon_edges.insert(key, (from, to)).is_some() {
                            return Err(Err::BoundaryEdgeConflict { position: key });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn is_added_edge(&self, near: PointIdx, far: PointIdx) -> bool {
        self.added_edges.has_attribute()
            && self.added_edges.mapped_value(near) != 0
            && self.added_edges.mapped_value(far) != 0
    }

    fn set_attributes_to_mesh(&mut self, out: &mut PolygonMesh) {
        let num_corners = self.face_vertex_points.len();
        self.texture_coordinates.resize_indices(num_corners);
        self.normals.resize_indices(num_corners);
        for (corner, &point) in self.face_vertex_points.iter().enumerate() {
            if self.texture_coordinates.has_attribute() {
                let index = self.texture_coordinates.mapped_index(point);
                self.texture_coordinates.set_index(corner, index);
            }
            if self.normals.has_attribute() {
                let index = self.normals.mapped_index(point);
                self.normals.set_index(corner, index);
            }
        }
        self.positions.set_to_mesh(out);
        self.texture_coordinates.set_to_mesh(out);
        self.normals.set_to_mesh(out);
    }

    fn compute_extent(&self) -> Option<[Vec3; 2]> {
        let positions = self.positions.get_values();
        let first = *positions.first()?;
        let extent = positions
            .iter()
            .fold([first, first], |[min, max], &p| [min.min(p), max.max(p)]);
        Some(extent)
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone)]
pub enum Err {
    #[error("two boundary edges start at position {position}; the polygon cannot be stitched")]
    BoundaryEdgeConflict { position: usize },

    #[error("the boundary of the polygon containing face {face} does not close into a loop")]
    BoundaryLoopOpen { face: usize },

    #[error("the compressed mesh has no position attribute")]
    MissingPositions,

    #[error("the compressed mesh has no faces")]
    NoFaces,

    #[error("position order value {value} is out of range for {num_positions} positions")]
    PositionOrderOutOfRange { value: i32, num_positions: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::{AttributeKind, ComponentDataType};
    use crate::core::mesh::builder::CompressedMeshBuilder;
    use crate::core::shared::AttributeValueIdx;

    /// A triangulated mesh carrying only positions: every face imports as
    /// a plain triangle.
    fn plain_triangles(faces: &[[usize; 3]], num_positions: usize) -> CompressedMesh {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(num_positions);
        for f in faces {
            builder.push_face([
                PointIdx::from(f[0]),
                PointIdx::from(f[1]),
                PointIdx::from(f[2]),
            ]);
        }
        let pos_id = builder.add_attribute(
            AttributeKind::Position,
            ComponentDataType::F32,
            3,
            num_positions,
        );
        for p in 0..num_positions {
            builder
                .attribute_mut(pos_id)
                .set_value(AttributeValueIdx::from(p), glam::Vec3::splat(p as f32));
            builder
                .attribute_mut(pos_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(p));
        }
        builder.build().expect("mesh should build")
    }

    #[test]
    fn test_triangles_reconstruct_as_triangles() {
        let mesh = plain_triangles(&[[0, 1, 2], [2, 1, 3]], 4);
        let scene = ImportTranslator::translate(&mesh).expect("import should succeed");
        assert_eq!(scene.get_face_vertex_counts(), &[3, 3]);
        assert_eq!(scene.get_face_vertex_indices(), &[0, 1, 2, 2, 1, 3]);
        assert!(scene.get_hole_indices().is_empty());
        assert_eq!(scene.get_positions().len(), 4);
    }

    #[test]
    fn test_extent_covers_positions() {
        let mesh = plain_triangles(&[[0, 1, 2]], 3);
        let scene = ImportTranslator::translate(&mesh).expect("import should succeed");
        let [min, max] = scene.get_extent().expect("extent should be set");
        assert_eq!(min, glam::Vec3::splat(0.0));
        assert_eq!(max, glam::Vec3::splat(2.0));
    }

    #[test]
    fn test_rejects_missing_positions() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        builder.push_face([PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)]);
        builder.add_attribute(AttributeKind::Generic, ComponentDataType::I32, 1, 3);
        let mesh = builder.build().expect("mesh should build");
        assert!(matches!(
            ImportTranslator::translate(&mesh),
            Result::Err(Err::MissingPositions)
        ));
    }

    #[test]
    fn test_rejects_empty_mesh() {
        let mut builder = CompressedMeshBuilder::new();
        builder.set_num_points(3);
        let pos_id =
            builder.add_attribute(AttributeKind::Position, ComponentDataType::F32, 3, 3);
        for p in 0..3 {
            builder
                .attribute_mut(pos_id)
                .set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(p));
        }
        let mesh = builder.build().expect("mesh should build");
        assert!(matches!(
            ImportTranslator::translate(&mesh),
            Result::Err(Err::NoFaces)
        ));
    }
}
