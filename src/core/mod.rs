/// Point attributes, their descriptors, and the value capability trait.
pub mod attribute;

/// Flat value storage backing the attributes.
pub mod buffer;

/// Corner adjacency over the triangulated faces.
pub mod corner_table;

/// The compressed mesh, its builder, and attribute metadata.
pub mod mesh;

/// Typed indices shared across the crate.
pub mod shared;
