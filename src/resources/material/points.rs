use glam::Vec3;

use crate::assets::TextureHandle;
use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::PointsUniforms;

/// Screen-space point sprites for `PointList` geometry.
///
/// When `size_attenuation` is on, the refresh pass writes the viewport
/// scale factor so `size` is interpreted in logical pixels.
#[derive(Debug)]
pub struct PointsMaterial {
    pub(crate) uniforms: UniformBuffer<PointsUniforms>,
    pub map: Option<TextureHandle>,
}

impl PointsMaterial {
    #[must_use]
    pub fn new(color: Vec3, size: f32) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                PointsUniforms {
                    color,
                    size,
                    ..Default::default()
                },
                Some("PointsMaterialUniforms"),
            ),
            map: None,
        }
    }

    pub fn set_size_attenuation(&mut self, enabled: bool) {
        self.uniforms.write().size_attenuation = u32::from(enabled);
    }

    #[must_use]
    pub fn size_attenuation(&self) -> bool {
        self.uniforms.read().size_attenuation != 0
    }

    /// Viewport-derived scale factor, written by the refresh pass.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.uniforms.read().scale
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

impl Default for PointsMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE, 1.0)
    }
}

impl_uniform_accessors!(
    PointsMaterial,
    [
        (color, Vec3, "Point color."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (size, f32, "Point size in logical pixels."),
    ]
);
