use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::SpriteUniforms;

/// Camera-facing textured quad material.
#[derive(Debug)]
pub struct SpriteMaterial {
    pub(crate) uniforms: UniformBuffer<SpriteUniforms>,
    pub map: Option<TextureHandle>,
}

impl SpriteMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uniforms: UniformBuffer::new(SpriteUniforms::default(), Some("SpriteMaterialUniforms")),
            map: None,
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        if self.map.is_some() {
            MaterialFeatures::USE_MAP
        } else {
            MaterialFeatures::empty()
        }
    }
}

impl Default for SpriteMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl_uniform_accessors!(
    SpriteMaterial,
    [
        (color, Vec3, "Sprite tint."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (rotation, f32, "In-plane rotation in radians."),
    ]
);
