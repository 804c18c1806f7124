use glam::Vec3;

use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::LineUniforms;

/// Solid-color line material for `LineList`/`LineStrip` geometry.
#[derive(Debug)]
pub struct LineMaterial {
    pub(crate) uniforms: UniformBuffer<LineUniforms>,
}

impl LineMaterial {
    #[must_use]
    pub fn new(color: Vec3) -> Self {
        Self {
            uniforms: UniformBuffer::new(
                LineUniforms {
                    color,
                    ..Default::default()
                },
                Some("LineMaterialUniforms"),
            ),
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        MaterialFeatures::empty()
    }
}

impl Default for LineMaterial {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

impl_uniform_accessors!(
    LineMaterial,
    [
        (color, Vec3, "Line color."),
        (opacity, f32, "Uniform opacity in [0, 1]."),
        (linewidth, f32, "Line width hint; most backends draw 1px."),
    ]
);
