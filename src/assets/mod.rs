//! Shared asset storage.
//!
//! Geometries and materials are many-to-one resources: any number of
//! meshes may reference the same handle, and a mutation through one
//! reference is visible to every other on the next frame. Lifetime is
//! "longest holder": assets live until explicitly removed, and removal
//! must be paired with renderer-side invalidation (see
//! [`Renderer::dispose_geometry`](crate::renderer::Renderer::dispose_geometry)).

mod storage;

pub use storage::Assets;

use slotmap::new_key_type;

use crate::resources::{Geometry, Material};

new_key_type! {
    pub struct GeometryHandle;
    pub struct MaterialHandle;
    pub struct TextureHandle;
}

/// Opaque texture resource. Decoding and sampling setup belong to the
/// asset-loading layer; the core only routes handles into material
/// feature flags.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub label: Option<String>,
    pub size: (u32, u32),
}

/// Central asset pools handed to the renderer each frame.
#[derive(Debug, Default)]
pub struct AssetServer {
    pub geometries: Assets<GeometryHandle, Geometry>,
    pub materials: Assets<MaterialHandle, Material>,
    pub textures: Assets<TextureHandle, Texture>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryHandle {
        self.geometries.insert(geometry)
    }

    pub fn add_material(&mut self, material: impl Into<Material>) -> MaterialHandle {
        self.materials.insert(material.into())
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    #[must_use]
    pub fn get_geometry(&self, handle: GeometryHandle) -> Option<&Geometry> {
        self.geometries.get(handle)
    }

    #[must_use]
    pub fn get_geometry_mut(&mut self, handle: GeometryHandle) -> Option<&mut Geometry> {
        self.geometries.get_mut(handle)
    }

    #[must_use]
    pub fn get_material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle)
    }

    #[must_use]
    pub fn get_material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle)
    }
}
