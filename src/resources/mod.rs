//! Shareable resource types: buffers, geometry, materials, meshes.

pub mod buffer;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod uniforms;

pub use buffer::{BufferRef, RawUniformBuffer, UniformBuffer};
pub use geometry::{
    Attribute, BoundingBox, BoundingSphere, Geometry, GeometryGroup, IndexAttribute,
};
pub use material::{
    Blending, Material, MaterialData, MaterialFeatures, MaterialKind, MaterialSettings, Side,
};
pub use mesh::Mesh;
