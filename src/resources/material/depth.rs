//! Depth-pass material family.
//!
//! These variants exist for external depth and shadow passes. They are
//! the documented exception where a pass may override the state a
//! surface material declares (a shadow pass always writes depth).

use glam::Vec3;

use crate::impl_uniform_accessors;
use crate::resources::buffer::UniformBuffer;
use crate::resources::material::MaterialFeatures;
use crate::resources::uniforms::{DepthUniforms, DistanceUniforms, ShadowUniforms};

/// Encodes fragment depth; used by directional/spot shadow passes.
#[derive(Debug)]
pub struct DepthMaterial {
    pub(crate) uniforms: UniformBuffer<DepthUniforms>,
}

impl DepthMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uniforms: UniformBuffer::new(DepthUniforms::default(), Some("DepthMaterialUniforms")),
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        MaterialFeatures::empty()
    }
}

impl Default for DepthMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl_uniform_accessors!(DepthMaterial, [(opacity, f32, "Uniform opacity in [0, 1].")]);

/// Encodes distance from a reference point; used by point-light shadow
/// cube passes.
#[derive(Debug)]
pub struct DistanceMaterial {
    pub(crate) uniforms: UniformBuffer<DistanceUniforms>,
}

impl DistanceMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uniforms: UniformBuffer::new(
                DistanceUniforms::default(),
                Some("DistanceMaterialUniforms"),
            ),
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        MaterialFeatures::empty()
    }
}

impl Default for DistanceMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl_uniform_accessors!(
    DistanceMaterial,
    [
        (reference_position, Vec3, "World-space reference point."),
        (near_distance, f32, "Distance mapped to 0."),
        (far_distance, f32, "Distance mapped to 1."),
    ]
);

/// Darkens shadow-receiving surfaces without otherwise shading them.
#[derive(Debug)]
pub struct ShadowMaterial {
    pub(crate) uniforms: UniformBuffer<ShadowUniforms>,
}

impl ShadowMaterial {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uniforms: UniformBuffer::new(ShadowUniforms::default(), Some("ShadowMaterialUniforms")),
        }
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        MaterialFeatures::empty()
    }
}

impl Default for ShadowMaterial {
    fn default() -> Self {
        Self::new()
    }
}

impl_uniform_accessors!(
    ShadowMaterial,
    [
        (color, Vec3, "Shadow tint."),
        (opacity, f32, "Shadow strength in [0, 1]."),
    ]
);
