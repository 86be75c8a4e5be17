pub mod descriptor;

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::buffer::AttributeBuffer;
use super::mesh::metadata::Metadata;
use super::shared::{AttributeValueIdx, PointIdx, VecPointIdx};

/// Represents one attribute of a compressed mesh: a value buffer plus an
/// explicit map from every point of the mesh to the value it carries. The
/// struct has no static type information; the component type and count are
/// tracked dynamically in the buffer, and typed access goes through
/// [`AttributeValue`].
#[derive(Debug, Clone, Serialize)]
pub struct PointAttribute {
    /// attribute id
    id: AttributeId,

    /// semantic kind used for lookup
    kind: AttributeKind,

    /// attribute value buffer
    buffer: AttributeBuffer,

    /// point to value index map, one entry per point of the mesh
    point_map: VecPointIdx<AttributeValueIdx>,

    /// per-attribute metadata entries
    metadata: Metadata,
}

impl PointAttribute {
    pub(crate) fn new(
        id: AttributeId,
        kind: AttributeKind,
        component_type: ComponentDataType,
        num_components: usize,
    ) -> Self {
        Self {
            id,
            kind,
            buffer: AttributeBuffer::new(component_type, num_components),
            point_map: VecPointIdx::new(),
            metadata: Metadata::new(),
        }
    }

    #[inline]
    pub fn get_id(&self) -> AttributeId {
        self.id
    }

    #[inline]
    pub fn get_kind(&self) -> AttributeKind {
        self.kind
    }

    #[inline]
    pub fn get_metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[inline]
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// The number of unique values stored for this attribute.
    #[inline]
    pub fn num_values(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn num_mapped_points(&self) -> usize {
        self.point_map.len()
    }

    #[inline]
    pub fn get_component_type(&self) -> ComponentDataType {
        self.buffer.get_component_type()
    }

    #[inline]
    pub fn get_num_components(&self) -> usize {
        self.buffer.get_num_components()
    }

    pub fn get<Data: AttributeValue>(&self, val_idx: AttributeValueIdx) -> Data {
        self.buffer.get(val_idx)
    }

    /// The value index the given point maps to.
    #[inline]
    pub fn mapped_index(&self, point: PointIdx) -> AttributeValueIdx {
        self.point_map[point]
    }

    /// The value the given point maps to.
    #[inline]
    pub fn mapped_value<Data: AttributeValue>(&self, point: PointIdx) -> Data {
        self.get(self.mapped_index(point))
    }

    pub(crate) fn resize_values(&mut self, num_values: usize) {
        self.buffer.resize(num_values);
    }

    pub fn set_value<Data: AttributeValue>(&mut self, val_idx: AttributeValueIdx, value: Data) {
        self.buffer.set(val_idx, value);
    }

    pub(crate) fn resize_point_map(&mut self, num_points: usize) {
        self.point_map.resize(num_points, AttributeValueIdx::from(0));
    }

    pub fn set_point_map_entry(&mut self, point: PointIdx, val_idx: AttributeValueIdx) {
        self.point_map[point] = val_idx;
    }

    pub(crate) fn set_point_map(&mut self, point_map: VecPointIdx<AttributeValueIdx>) {
        self.point_map = point_map;
    }
}

/// Identifies an attribute within one compressed mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AttributeId(usize);

impl AttributeId {
    pub(crate) fn new(id: usize) -> Self {
        Self(id)
    }
}

impl From<AttributeId> for usize {
    #[inline]
    fn from(id: AttributeId) -> usize {
        id.0
    }
}

/// Semantic kind of an attribute, used to locate it in a compressed mesh.
/// Attributes that share a kind are told apart by a metadata entry instead
/// (see [`descriptor::METADATA_NAME_KEY`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeKind {
    Position,
    Normal,
    TextureCoordinate,
    Generic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentDataType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    #[default]
    F32,
    F64,
}

impl ComponentDataType {
    /// returns the size of the data type in bytes e.g. 4 for F32
    #[inline]
    pub fn size(self) -> usize {
        match self {
            ComponentDataType::I8 => 1,
            ComponentDataType::U8 => 1,
            ComponentDataType::I16 => 2,
            ComponentDataType::U16 => 2,
            ComponentDataType::I32 => 4,
            ComponentDataType::U32 => 4,
            ComponentDataType::I64 => 8,
            ComponentDataType::U64 => 8,
            ComponentDataType::F32 => 4,
            ComponentDataType::F64 => 8,
        }
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, ComponentDataType::F32 | ComponentDataType::F64)
    }
}

/// Capability contract for values that can live in an attribute buffer: a
/// fixed component layout plus plain-old-data bytes. This is the write/read
/// dispatch point between "N floats" and "one integer" value shapes.
pub trait AttributeValue: bytemuck::Pod {
    const COMPONENT_TYPE: ComponentDataType;
    const NUM_COMPONENTS: usize;
}

impl AttributeValue for Vec3 {
    const COMPONENT_TYPE: ComponentDataType = ComponentDataType::F32;
    const NUM_COMPONENTS: usize = 3;
}

impl AttributeValue for Vec2 {
    const COMPONENT_TYPE: ComponentDataType = ComponentDataType::F32;
    const NUM_COMPONENTS: usize = 2;
}

impl AttributeValue for i32 {
    const COMPONENT_TYPE: ComponentDataType = ComponentDataType::I32;
    const NUM_COMPONENTS: usize = 1;
}
