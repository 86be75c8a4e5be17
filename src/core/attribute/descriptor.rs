use lazy_static::lazy_static;
use serde::Serialize;

use super::{AttributeKind, ComponentDataType};

/// Fixed metadata key under which a compressed attribute carries the name it
/// had on the scene mesh. Both directions of the codec must agree on this
/// key, otherwise name-based re-identification breaks on import.
pub const METADATA_NAME_KEY: &str = "name";

/// Declarative description of one semantic attribute the codec translates:
/// where it lives on the scene mesh, how to locate it in the compressed
/// mesh, and the component layout of its values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    kind: AttributeKind,
    name: String,
    is_primvar: bool,
    component_type: ComponentDataType,
    num_components: usize,
    metadata_name: Option<String>,
}

impl AttributeDescriptor {
    fn new(
        kind: AttributeKind,
        name: &str,
        is_primvar: bool,
        component_type: ComponentDataType,
        num_components: usize,
        metadata_name: Option<&str>,
    ) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            is_primvar,
            component_type,
            num_components,
            metadata_name: metadata_name.map(str::to_owned),
        }
    }

    /// Derives a descriptor for an additional attribute of the same kind,
    /// told apart by a custom metadata name (e.g. a second UV set).
    pub fn with_metadata_name(&self, name: &str) -> Self {
        let mut out = self.clone();
        out.name = name.to_owned();
        out.metadata_name = Some(name.to_owned());
        out
    }

    #[inline]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Name of the attribute or primvar on the scene mesh.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_primvar(&self) -> bool {
        self.is_primvar
    }

    #[inline]
    pub fn component_type(&self) -> ComponentDataType {
        self.component_type
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// When present, the compressed attribute is located through the
    /// [`METADATA_NAME_KEY`] metadata entry instead of its semantic kind.
    #[inline]
    pub fn metadata_name(&self) -> Option<&str> {
        self.metadata_name.as_deref()
    }
}

lazy_static! {
    /// Vertex positions, the one attribute every mesh must carry.
    pub static ref POSITIONS: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::Position,
        "points",
        false,
        ComponentDataType::F32,
        3,
        None,
    );

    pub static ref TEXTURE_COORDINATES: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::TextureCoordinate,
        "st",
        true,
        ComponentDataType::F32,
        2,
        None,
    );

    pub static ref NORMALS: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::Normal,
        "normals",
        true,
        ComponentDataType::F32,
        3,
        None,
    );

    /// Per-polygon hole flag, carried point-wise through the compressed form.
    pub static ref HOLE_FACES: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::Generic,
        "hole_faces",
        false,
        ComponentDataType::I32,
        1,
        Some("hole_faces"),
    );

    /// Marks corners opposite the edges that triangulation introduced.
    pub static ref ADDED_EDGES: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::Generic,
        "added_edges",
        false,
        ComponentDataType::I32,
        1,
        Some("added_edges"),
    );

    /// Canonical output slot of every position, so that re-encoding the same
    /// logical mesh stays reproducible regardless of storage order.
    pub static ref POSITION_ORDER: AttributeDescriptor = AttributeDescriptor::new(
        AttributeKind::Generic,
        "position_order",
        false,
        ComponentDataType::I32,
        1,
        Some("position_order"),
    );
}
