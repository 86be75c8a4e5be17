pub mod attribute;

use glam::{Vec2, Vec3};
use thiserror::Error;
use tracing::debug;

use crate::core::attribute::descriptor;
use crate::core::mesh::builder::{self, CompressedMeshBuilder};
use crate::core::mesh::CompressedMesh;
use crate::core::shared::{ConfigType, PointIdx};
use crate::scene::{PolygonMesh, PrimvarValue};
use attribute::ExportAttribute;

#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to carry the channels that let import reconstruct n-gons,
    /// holes, and the original position order. Without them the mesh
    /// imports as plain triangles.
    pub preserve_polygons: bool,
}

impl ConfigType for Config {
    fn default() -> Self {
        Self {
            preserve_polygons: true,
        }
    }
}

/// Translates a general polygonal scene mesh into the compressed
/// triangulated form.
///
/// Every n-gon is fan-triangulated; the diagonals this introduces are
/// flagged through the added-edges channel, hole faces through the
/// hole-faces channel, and the original position order through the
/// position-order channel, so that import can undo the flattening.
pub struct ExportTranslator<'mesh> {
    mesh: &'mesh PolygonMesh,
    config: Config,

    positions: ExportAttribute<Vec3>,
    texture_coordinates: ExportAttribute<Vec2>,
    normals: ExportAttribute<Vec3>,
    hole_faces: ExportAttribute<i32>,
    added_edges: ExportAttribute<i32>,
    position_order: ExportAttribute<i32>,
}

impl<'mesh> ExportTranslator<'mesh> {
    /// Translates the scene mesh and returns the compressed mesh.
    pub fn translate(mesh: &PolygonMesh) -> Result<CompressedMesh, Err> {
        Self::translate_with_config(mesh, ConfigType::default())
    }

    /// Translates the scene mesh with the given configuration.
    pub fn translate_with_config(mesh: &PolygonMesh, config: Config) -> Result<CompressedMesh, Err> {
        ExportTranslator::new(mesh, config).translate_impl()
    }

    fn new(mesh: &'mesh PolygonMesh, config: Config) -> Self {
        Self {
            mesh,
            config,
            positions: ExportAttribute::new(&descriptor::POSITIONS),
            texture_coordinates: ExportAttribute::new(&descriptor::TEXTURE_COORDINATES),
            normals: ExportAttribute::new(&descriptor::NORMALS),
            hole_faces: ExportAttribute::new(&descriptor::HOLE_FACES),
            added_edges: ExportAttribute::new(&descriptor::ADDED_EDGES),
            position_order: ExportAttribute::new(&descriptor::POSITION_ORDER),
        }
    }

    fn translate_impl(mut self) -> Result<CompressedMesh, Err> {
        debug!(
            name = self.mesh.get_name(),
            num_faces = self.mesh.num_faces(),
            "exporting scene mesh"
        );
        self.get_attributes_from_mesh();
        self.check_data()?;
        self.configure_helper_attributes();

        let num_triangles: usize = self
            .mesh
            .get_face_vertex_counts()
            .iter()
            .map(|&count| count - 2)
            .sum();
        let mut builder = CompressedMeshBuilder::new();
        builder.set_name(self.mesh.get_name());
        builder.set_num_points(3 * num_triangles);

        self.set_attributes_to_mesh(&mut builder);
        self.set_point_maps_to_mesh(&mut builder);

        let mesh = builder.build()?;
        debug!(
            num_triangles,
            num_points = mesh.num_points(),
            "export complete"
        );
        Ok(mesh)
    }

    fn get_attributes_from_mesh(&mut self) {
        let num_positions = self.mesh.get_positions().len();
        self.positions.get_from_mesh(self.mesh, num_positions);
        self.texture_coordinates.get_from_mesh(self.mesh, num_positions);
        self.normals.get_from_mesh(self.mesh, num_positions);
    }

    fn check_data(&self) -> Result<(), Err> {
        let num_positions = self.positions.num_values();
        if num_positions == 0 {
            return Err(Err::MissingPositions);
        }
        let counts = self.mesh.get_face_vertex_counts();
        if counts.is_empty() {
            return Err(Err::NoFaces);
        }
        for (face, &count) in counts.iter().enumerate() {
            if count < 3 {
                return Err(Err::FaceVertexCountTooSmall { face, count });
            }
        }
        let indices = self.mesh.get_face_vertex_indices();
        let expected: usize = counts.iter().sum();
        if indices.len() != expected {
            return Err(Err::IndexCountMismatch {
                expected,
                actual: indices.len(),
            });
        }
        for (corner, &index) in indices.iter().enumerate() {
            if index >= num_positions {
                return Err(Err::PositionIndexOutOfRange {
                    corner,
                    index,
                    num_positions,
                });
            }
        }
        for (hole, &face) in self.mesh.get_hole_indices().iter().enumerate() {
            if face >= counts.len() {
                return Err(Err::HoleIndexOutOfRange {
                    hole,
                    num_faces: counts.len(),
                });
            }
        }
        self.check_primvar_data(&self.texture_coordinates)?;
        self.check_primvar_data(&self.normals)?;
        Ok(())
    }

    fn check_primvar_data<T: PrimvarValue>(
        &self,
        attribute: &ExportAttribute<T>,
    ) -> Result<(), Err> {
        if attribute.num_values() == 0 {
            return Ok(());
        }
        let expected = if attribute.uses_position_index() {
            self.positions.num_values()
        } else {
            self.mesh.num_face_vertices()
        };
        if attribute.num_indices() != expected {
            return Err(Err::PrimvarIndexCountMismatch {
                primvar: attribute.get_name().to_owned(),
                expected,
                actual: attribute.num_indices(),
            });
        }
        for &index in attribute.get_indices() {
            if index >= attribute.num_values() {
                return Err(Err::PrimvarIndexOutOfRange {
                    primvar: attribute.get_name().to_owned(),
                    index,
                    num_values: attribute.num_values(),
                });
            }
        }
        Ok(())
    }

    fn configure_helper_attributes(&mut self) {
        if !self.config.preserve_polygons {
            return;
        }
        self.position_order.get_from_range(self.positions.num_values());
        let any_ngon = self
            .mesh
            .get_face_vertex_counts()
            .iter()
            .any(|&count| count > 3);
        if any_ngon {
            self.added_edges.get_from_range(2);
        }
        if !self.mesh.get_hole_indices().is_empty() {
            self.hole_faces.get_from_range(2);
        }
    }

    fn set_attributes_to_mesh(&mut self, builder: &mut CompressedMeshBuilder) {
        self.positions.set_to_mesh(builder);
        self.texture_coordinates.set_to_mesh(builder);
        self.normals.set_to_mesh(builder);
        self.hole_faces.set_to_mesh(builder);
        self.added_edges.set_to_mesh(builder);
        self.position_order.set_to_mesh(builder);
    }

    /// Triangulates every polygon and fills the per-point maps of all
    /// delivered attributes.
    fn set_point_maps_to_mesh(&self, builder: &mut CompressedMeshBuilder) {
        let counts = self.mesh.get_face_vertex_counts();
        let indices = self.mesh.get_face_vertex_indices();
        let mut is_hole = vec![false; counts.len()];
        for &face in self.mesh.get_hole_indices() {
            is_hole[face] = true;
        }

        let mut point = 0;
        let mut first_corner = 0;
        for (face, &count) in counts.iter().enumerate() {
            // Split quads and other n-gons into count - 2 triangles.
            let triangle_count = count - 2;
            for t in 0..triangle_count {
                let mut triangle = [PointIdx::from(0); 3];
                for c in 0..3 {
                    let corner = first_corner + Self::triangulate(t, c);
                    let position = indices[corner];
                    let p = PointIdx::from(point);
                    triangle[c] = p;
                    self.positions.set_point_map_entry(builder, p, position);
                    self.texture_coordinates
                        .set_point_map_entry_indexed(builder, p, position, corner);
                    self.normals
                        .set_point_map_entry_indexed(builder, p, position, corner);
                    self.hole_faces
                        .set_point_map_entry(builder, p, is_hole[face] as usize);
                    self.added_edges.set_point_map_entry(
                        builder,
                        p,
                        Self::is_new_edge(triangle_count, t, c) as usize,
                    );
                    self.position_order.set_point_map_entry(builder, p, position);
                    point += 1;
                }
                builder.push_face(triangle);
            }
            first_corner += count;
        }
    }

    /// Original corner of the polygon used by corner `c` of fan triangle
    /// `t`.
    #[inline]
    fn triangulate(t: usize, c: usize) -> usize {
        if c == 0 {
            0
        } else {
            t + c
        }
    }

    /// Whether the edge opposite corner `c` of fan triangle `t` is a
    /// diagonal introduced by triangulation. Corner 1 faces the diagonal
    /// shared with the next triangle, corner 2 the one shared with the
    /// previous.
    #[inline]
    fn is_new_edge(triangle_count: usize, t: usize, c: usize) -> bool {
        (c == 1 && t + 1 != triangle_count) || (c == 2 && t != 0)
    }
}

#[remain::sorted]
#[derive(Error, Debug, Clone)]
pub enum Err {
    #[error("failed to assemble the compressed mesh: {0}")]
    Builder(#[from] builder::Err),

    #[error("face {face} has {count} vertices, but a polygon needs at least 3")]
    FaceVertexCountTooSmall { face: usize, count: usize },

    #[error("hole entry {hole} is out of range for a mesh of {num_faces} faces")]
    HoleIndexOutOfRange { hole: usize, num_faces: usize },

    #[error("face vertex counts sum to {expected}, but {actual} indices are present")]
    IndexCountMismatch { expected: usize, actual: usize },

    #[error("the scene mesh has no position values")]
    MissingPositions,

    #[error("the scene mesh has no faces")]
    NoFaces,

    #[error("corner {corner} references position {index}, but only {num_positions} positions are present")]
    PositionIndexOutOfRange {
        corner: usize,
        index: usize,
        num_positions: usize,
    },

    #[error("primvar {primvar} carries {actual} indices where {expected} are required")]
    PrimvarIndexCountMismatch {
        primvar: String,
        expected: usize,
        actual: usize,
    },

    #[error("primvar {primvar} index {index} is out of range for {num_values} values")]
    PrimvarIndexOutOfRange {
        primvar: String,
        index: usize,
        num_values: usize,
    },
}
