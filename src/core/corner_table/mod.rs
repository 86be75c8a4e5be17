use std::collections::HashMap;

use crate::core::attribute::PointAttribute;
use crate::core::shared::{CornerIdx, FaceIdx, PointIdx, VecCornerIdx};

/// Corner adjacency over the triangulated faces of a compressed mesh.
///
/// Corners are numbered `3 * face + i`. Adjacency is resolved in position
/// space: two corners are opposite when their faces traverse the same pair
/// of position value indices in opposite directions. Resolving through the
/// position attribute's value map keeps point duplication (the same vertex
/// carried by several points) from hiding shared edges.
#[derive(Debug, Clone)]
pub struct CornerTable<'mesh> {
    faces: &'mesh [[PointIdx; 3]],
    opposite_corners: VecCornerIdx<Option<CornerIdx>>,
}

impl<'mesh> CornerTable<'mesh> {
    pub fn new(faces: &'mesh [[PointIdx; 3]], positions: &PointAttribute) -> Self {
        let num_corners = faces.len() * 3;
        let mut opposite_corners = VecCornerIdx::from(vec![None; num_corners]);

        // Each corner owns the directed edge opposite to it, following the
        // face winding. The corner across an edge owns the reverse
        // direction.
        let mut edge_to_corner: HashMap<(usize, usize), CornerIdx> =
            HashMap::with_capacity(num_corners);
        let vertex_of = |faces: &[[PointIdx; 3]], c: CornerIdx| {
            let c = usize::from(c);
            usize::from(positions.mapped_index(faces[c / 3][c % 3]))
        };
        for c in 0..num_corners {
            let corner = CornerIdx::from(c);
            let from = vertex_of(faces, Self::next(corner));
            let to = vertex_of(faces, Self::previous(corner));
            if from == to {
                continue; // degenerate edge
            }
            edge_to_corner.entry((from, to)).or_insert(corner);
        }
        for c in 0..num_corners {
            let corner = CornerIdx::from(c);
            let from = vertex_of(faces, Self::next(corner));
            let to = vertex_of(faces, Self::previous(corner));
            if from == to {
                continue;
            }
            opposite_corners[corner] = edge_to_corner.get(&(to, from)).copied();
        }

        Self {
            faces,
            opposite_corners,
        }
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn num_corners(&self) -> usize {
        self.faces.len() * 3
    }

    #[inline]
    pub fn corner(face: FaceIdx, local: usize) -> CornerIdx {
        CornerIdx::from(usize::from(face) * 3 + local)
    }

    #[inline]
    pub fn face_containing(&self, corner: CornerIdx) -> FaceIdx {
        FaceIdx::from(usize::from(corner) / 3)
    }

    /// The point sitting at the given corner.
    #[inline]
    pub fn point(&self, corner: CornerIdx) -> PointIdx {
        let corner = usize::from(corner);
        self.faces[corner / 3][corner % 3]
    }

    /// The corner across the edge opposite this corner, if the edge is
    /// interior.
    #[inline]
    pub fn opposite(&self, corner: CornerIdx) -> Option<CornerIdx> {
        self.opposite_corners[corner]
    }

    #[inline]
    pub fn next(corner: CornerIdx) -> CornerIdx {
        let corner = usize::from(corner);
        CornerIdx::from(if corner % 3 == 2 { corner - 2 } else { corner + 1 })
    }

    #[inline]
    pub fn previous(corner: CornerIdx) -> CornerIdx {
        let corner = usize::from(corner);
        CornerIdx::from(if corner % 3 == 0 { corner + 2 } else { corner - 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attribute::{AttributeId, AttributeKind, ComponentDataType};
    use crate::core::shared::AttributeValueIdx;

    fn identity_positions(num_points: usize) -> PointAttribute {
        let mut att = PointAttribute::new(
            AttributeId::new(0),
            AttributeKind::Position,
            ComponentDataType::F32,
            3,
        );
        att.resize_values(num_points);
        att.resize_point_map(num_points);
        for p in 0..num_points {
            att.set_point_map_entry(PointIdx::from(p), AttributeValueIdx::from(p));
        }
        att
    }

    #[test]
    fn test_next_previous() {
        assert_eq!(CornerTable::next(CornerIdx::from(0)), CornerIdx::from(1));
        assert_eq!(CornerTable::next(CornerIdx::from(2)), CornerIdx::from(0));
        assert_eq!(CornerTable::next(CornerIdx::from(5)), CornerIdx::from(3));
        assert_eq!(CornerTable::previous(CornerIdx::from(0)), CornerIdx::from(2));
        assert_eq!(CornerTable::previous(CornerIdx::from(4)), CornerIdx::from(3));
    }

    #[test]
    fn test_two_triangles_share_one_edge() {
        let faces = vec![
            [PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)],
            [PointIdx::from(0), PointIdx::from(2), PointIdx::from(3)],
        ];
        let positions = identity_positions(4);
        let table = CornerTable::new(&faces, &positions);

        assert_eq!(table.num_faces(), 2);
        assert_eq!(table.num_corners(), 6);
        // The shared edge (1, 2)/(2, 0 of face 1) pairs corner 1 of face 0
        // with corner 5 of face 1; every other edge is boundary.
        assert_eq!(table.opposite(CornerIdx::from(1)), Some(CornerIdx::from(5)));
        assert_eq!(table.opposite(CornerIdx::from(5)), Some(CornerIdx::from(1)));
        for c in [0, 2, 3, 4] {
            assert_eq!(table.opposite(CornerIdx::from(c)), None);
        }
    }

    #[test]
    fn test_adjacency_survives_point_duplication() {
        // Face 1 uses its own points for the shared vertices; only the
        // position map ties them back together.
        let faces = vec![
            [PointIdx::from(0), PointIdx::from(1), PointIdx::from(2)],
            [PointIdx::from(3), PointIdx::from(4), PointIdx::from(5)],
        ];
        let mut positions = identity_positions(6);
        positions.set_point_map_entry(PointIdx::from(3), AttributeValueIdx::from(0));
        positions.set_point_map_entry(PointIdx::from(4), AttributeValueIdx::from(2));
        positions.set_point_map_entry(PointIdx::from(5), AttributeValueIdx::from(3));
        let table = CornerTable::new(&faces, &positions);
        assert_eq!(table.opposite(CornerIdx::from(1)), Some(CornerIdx::from(5)));
        assert_eq!(table.opposite(CornerIdx::from(5)), Some(CornerIdx::from(1)));
    }
}
