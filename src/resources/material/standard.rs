use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::StandardUniforms;

/// Metallic-roughness PBR material.
///
/// The default workhorse: roughness/metalness workflow with the usual
/// texture channels.
#[derive(Debug)]
pub struct StandardMaterial {
    pub(crate) uniforms: UniformBuffer<StandardUniforms>,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub roughness_map: Option<TextureHandle>,
    pub metalness_map: Option<TextureHandle>,
    pub emissive_map: Option<TextureHandle>,
    pub ao_map: Option<TextureHandle>,
}

impl StandardMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                StandardUniforms {
                    color,
                    ..Default::default()
                },
                Some("StandardMaterialUniforms"),
            ),
            map: None,
            normal_map: None,
            roughness_map: None,
            metalness_map: None,
            emissive_map: None,
            ao_map: None,
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
        if self.roughness_map.is_some() {
            features |= MaterialFeatures::USE_ROUGHNESS_MAP;
        }
        if self.metalness_map.is_some() {
            features |= MaterialFeatures::USE_METALNESS_MAP;
        }
        if self.emissive_map.is_some() {
            features |= MaterialFeatures::USE_EMISSIVE_MAP;
        }
        if self.ao_map.is_some() {
            features |= MaterialFeatures::USE_AO_MAP;
        }
        features
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl_uniform_accessors!(
    StandardMaterial,
    [
        (color, Vec3, "Base color (albedo)."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (emissive, Vec3, "Emissive color added after lighting."),
        (roughness, f32, "Perceptual roughness in [0, 1]."),
        (metalness, f32, "Metalness in [0, 1]."),
        (env_map_intensity, f32, "Environment lighting multiplier."),
    ]
);
