//! The scene-description side of the codec: a general polygonal mesh with
//! n-gon faces, hole flags, and named primvars carrying their own
//! interpolation domain and optional index arrays. This is the boundary the
//! translators read from and write to; the host object model itself stays
//! outside the crate.

use glam::{Vec2, Vec3};
use indexmap::IndexMap;

use crate::core::attribute::{AttributeValue, ComponentDataType};

/// How the values of a primvar attach to the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// One value for the whole mesh.
    Constant,
    /// One value per face.
    Uniform,
    /// One value per position.
    Vertex,
    /// One value per face-vertex corner.
    FaceVarying,
}

pub type Float2Array = Vec<Vec2>;
pub type Float3Array = Vec<Vec3>;
pub type IntArray = Vec<i32>;

/// Typed value array of a primvar.
#[enum_dispatch::enum_dispatch(ValueArray)]
#[derive(Debug, Clone, PartialEq)]
pub enum PrimvarValues {
    Float2(Float2Array),
    Float3(Float3Array),
    Int(IntArray),
}

#[enum_dispatch::enum_dispatch]
pub trait ValueArray {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn component_type(&self) -> ComponentDataType;
    fn num_components(&self) -> usize;
}

macro_rules! value_array_impl {
    ($($t:ty, $component_type:expr, $num_components:expr);*) => {
        $(
            impl ValueArray for $t {
                fn len(&self) -> usize {
                    Vec::len(self)
                }

                fn is_empty(&self) -> bool {
                    Vec::is_empty(self)
                }

                fn component_type(&self) -> ComponentDataType {
                    $component_type
                }

                fn num_components(&self) -> usize {
                    $num_components
                }
            }
        )*
    };
}

value_array_impl! {
    Float2Array, ComponentDataType::F32, 2;
    Float3Array, ComponentDataType::F32, 3;
    IntArray, ComponentDataType::I32, 1
}

/// Ties an [`AttributeValue`] type to the scene boundary: which
/// [`PrimvarValues`] variant carries it and which built-in mesh array (if
/// any) stores it outside the primvar namespace.
pub trait PrimvarValue: AttributeValue {
    fn extract(values: &PrimvarValues) -> Option<&[Self]>;
    fn wrap(values: Vec<Self>) -> PrimvarValues;

    /// Built-in (non-primvar) arrays of the scene mesh, looked up by name.
    fn builtin_array<'a>(_mesh: &'a PolygonMesh, _name: &str) -> Option<&'a [Self]> {
        None
    }

    /// Writes values back to the built-in array of the given name, when one
    /// exists for this value type.
    fn set_builtin_array(_mesh: &mut PolygonMesh, _name: &str, _values: &[Self]) {}
}

impl PrimvarValue for Vec2 {
    fn extract(values: &PrimvarValues) -> Option<&[Self]> {
        match values {
            PrimvarValues::Float2(v) => Some(v),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> PrimvarValues {
        PrimvarValues::Float2(values)
    }
}

impl PrimvarValue for Vec3 {
    fn extract(values: &PrimvarValues) -> Option<&[Self]> {
        match values {
            PrimvarValues::Float3(v) => Some(v),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> PrimvarValues {
        PrimvarValues::Float3(values)
    }

    fn builtin_array<'a>(mesh: &'a PolygonMesh, name: &str) -> Option<&'a [Self]> {
        (name == "points").then(|| mesh.get_positions())
    }

    fn set_builtin_array(mesh: &mut PolygonMesh, name: &str, values: &[Self]) {
        if name == "points" {
            mesh.set_positions(values.to_vec());
        }
    }
}

impl PrimvarValue for i32 {
    fn extract(values: &PrimvarValues) -> Option<&[Self]> {
        match values {
            PrimvarValues::Int(v) => Some(v),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> PrimvarValues {
        PrimvarValues::Int(values)
    }
}

/// A named attribute of the scene mesh with values, an interpolation
/// domain, and an optional index array mapping corners (or positions) to
/// values.
#[derive(Debug, Clone, PartialEq)]
pub struct Primvar {
    name: String,
    interpolation: Interpolation,
    values: PrimvarValues,
    indices: Option<Vec<usize>>,
}

impl Primvar {
    pub fn new(name: &str, interpolation: Interpolation, values: PrimvarValues) -> Self {
        Self {
            name: name.to_owned(),
            interpolation,
            values,
            indices: None,
        }
    }

    pub fn indexed(
        name: &str,
        interpolation: Interpolation,
        values: PrimvarValues,
        indices: Vec<usize>,
    ) -> Self {
        Self {
            name: name.to_owned(),
            interpolation,
            values,
            indices: Some(indices),
        }
    }

    #[inline]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[inline]
    pub fn get_values(&self) -> &PrimvarValues {
        &self.values
    }

    #[inline]
    pub fn get_indices(&self) -> Option<&[usize]> {
        self.indices.as_deref()
    }
}

/// A general polygonal mesh: per-face vertex counts, a flattened
/// face-vertex-index sequence, positions, primvars, and hole faces kept in
/// the face arrays but flagged in a separate index set.
#[derive(Debug, Clone, Default)]
pub struct PolygonMesh {
    name: String,
    face_vertex_counts: Vec<usize>,
    face_vertex_indices: Vec<usize>,
    positions: Vec<Vec3>,
    hole_indices: Vec<usize>,
    primvars: IndexMap<String, Primvar>,
    extent: Option<[Vec3; 2]>,
}

impl PolygonMesh {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn get_name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn get_face_vertex_counts(&self) -> &[usize] {
        &self.face_vertex_counts
    }

    #[inline]
    pub fn get_face_vertex_indices(&self) -> &[usize] {
        &self.face_vertex_indices
    }

    #[inline]
    pub fn get_positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn get_hole_indices(&self) -> &[usize] {
        &self.hole_indices
    }

    #[inline]
    pub fn get_extent(&self) -> Option<[Vec3; 2]> {
        self.extent
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.face_vertex_counts.len()
    }

    /// Total number of face-vertex corners.
    #[inline]
    pub fn num_face_vertices(&self) -> usize {
        self.face_vertex_indices.len()
    }

    pub fn set_topology(&mut self, counts: Vec<usize>, indices: Vec<usize>) {
        self.face_vertex_counts = counts;
        self.face_vertex_indices = indices;
    }

    pub fn set_positions(&mut self, positions: Vec<Vec3>) {
        self.positions = positions;
    }

    pub fn set_hole_indices(&mut self, hole_indices: Vec<usize>) {
        self.hole_indices = hole_indices;
    }

    pub fn set_extent(&mut self, extent: Option<[Vec3; 2]>) {
        self.extent = extent;
    }

    pub fn set_primvar(&mut self, primvar: Primvar) {
        self.primvars.insert(primvar.get_name().to_owned(), primvar);
    }

    pub fn get_primvar(&self, name: &str) -> Option<&Primvar> {
        self.primvars.get(name)
    }

    pub fn get_primvars(&self) -> impl Iterator<Item = &Primvar> {
        self.primvars.values()
    }
}
