use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::PhongUniforms;

/// Blinn-Phong material with a specular highlight term.
#[derive(Debug)]
pub struct PhongMaterial {
    pub(crate) uniforms: UniformBuffer<PhongUniforms>,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub specular_map: Option<TextureHandle>,
    pub emissive_map: Option<TextureHandle>,
}

impl PhongMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                PhongUniforms {
                    color,
                    ..Default::default()
                },
                Some("PhongMaterialUniforms"),
            ),
            map: None,
            normal_map: None,
            specular_map: None,
            emissive_map: None,
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        if self.map.is_some() {
            features |= MaterialFeatures::USE_MAP;
        }
        if self.normal_map.is_some() {
            features |= MaterialFeatures::USE_NORMAL_MAP;
        }
        if self.specular_map.is_some() {
            features |= MaterialFeatures::USE_SPECULAR_MAP;
        }
        if self.emissive_map.is_some() {
            features |= MaterialFeatures::USE_EMISSIVE_MAP;
        }
        features
    }
}

impl Default for PhongMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl_uniform_accessors!(
    PhongMaterial,
    [
        (color, Vec3, "Diffuse color."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (emissive, Vec3, "Emissive color added after lighting."),
        (specular, Vec3, "Specular highlight color."),
        (shininess, f32, "Specular exponent; higher is tighter."),
    ]
);
