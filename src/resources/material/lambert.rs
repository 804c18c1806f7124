use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::LambertUniforms;

/// Diffuse-only lit material (per-vertex style lighting model).
#[derive(Debug)]
pub struct LambertMaterial {
    pub(crate) uniforms: UniformBuffer<LambertUniforms>,
    pub map: Option<TextureHandle>,
    pub emissive_map: Option<TextureHandle>,
}

impl LambertMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                LambertUniforms {
                    color,
                    ..Default::default()
                },
                Some("LambertMaterialUniforms"),
            ),
            map: None,
            emissive_map: None,
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        if self.map.is_some() {
            features |= MaterialFeatures::USE_MAP;
        }
        if self.emissive_map.is_some() {
            features |= MaterialFeatures::USE_EMISSIVE_MAP;
        }
        features
    }
}

impl Default for LambertMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl_uniform_accessors!(
    LambertMaterial,
    [
        (color, Vec3, "Diffuse color."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (emissive, Vec3, "Emissive color added after lighting."),
    ]
);
