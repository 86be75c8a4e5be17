// lib.rs

/// Contains the compressed-mesh data model: attributes, corner table,
/// mesh and builder, and the shared typed indices.
pub mod core;

/// Contains the boundary to the general polygonal scene mesh.
pub mod scene;

/// Translates scene meshes into the compressed triangulated form.
pub mod export;

/// Reconstructs scene meshes from the compressed triangulated form.
pub mod import;

/// Contains the most commonly used traits, types, and objects.
pub mod prelude {
    pub use crate::core::attribute::descriptor::{self, AttributeDescriptor, METADATA_NAME_KEY};
    pub use crate::core::attribute::{
        AttributeKind, AttributeValue, ComponentDataType, PointAttribute,
    };
    pub use crate::core::mesh::{builder::CompressedMeshBuilder, CompressedMesh};
    pub use crate::core::shared::{AttributeValueIdx, ConfigType, CornerIdx, FaceIdx, PointIdx};
    pub use crate::export::{Config as ExportConfig, ExportTranslator};
    pub use crate::import::ImportTranslator;
    pub use crate::scene::{
        Interpolation, PolygonMesh, Primvar, PrimvarValue, PrimvarValues, ValueArray,
    };
}
