use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::MatcapUniforms;

/// Material lit by a baked sphere capture looked up with the view-space
/// normal. No scene lights involved.
#[derive(Debug)]
pub struct MatcapMaterial {
    pub(crate) uniforms: UniformBuffer<MatcapUniforms>,
    pub matcap: Option<TextureHandle>,
    pub map: Option<TextureHandle>,
}

impl MatcapMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uniforms: UniformBuffer::new(MatcapUniforms::default(), Some("MatcapMaterialUniforms")),
            matcap: None,
            map: None,
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        let mut features = MaterialFeatures::empty();
        if self.matcap.is_some() {
            features |= MaterialFeatures::USE_MATCAP;
        }
        if self.map.is_some() {
            features |= MaterialFeatures::USE_MAP;
        }
        features
    }
}

impl Default for MatcapMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl_uniform_accessors!(
    MatcapMaterial,
    [
        (color, Vec3, "Tint multiplied with the matcap sample."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
    ]
);
