use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::BasicUniforms;

/// Unlit flat-color material.
#[derive(Debug)]
pub struct BasicMaterial {
    pub(crate) uniforms: UniformBuffer<BasicUniforms>,
    pub map: Option<TextureHandle>,
    pub alpha_map: Option<TextureHandle>,
}

impl BasicMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                BasicUniforms {
                    color,
                    ..Default::default()
                },
                Some("BasicMaterialUniforms"),
            ),
            map: None,
            alpha_map: None,
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        if self.map.is_some() {
            features |= MaterialFeatures::USE_MAP;
        }
        if self.alpha_map.is_some() {
            features |= MaterialFeatures::USE_ALPHA_MAP;
        }
        features
    }
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl_uniform_accessors!(
    BasicMaterial,
    [
        (color, Vec3, "Base color."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
    ]
);
