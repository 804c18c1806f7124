//! GPU uniform block layouts.
//!
//! Plain `#[repr(C)]` Pod structs, padded by hand to WGSL alignment
//! rules. Each material variant owns one of these inside a
//! [`UniformBuffer`](crate::resources::buffer::UniformBuffer); the
//! per-frame and per-object blocks are owned by the renderer.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

/// A 3x3 matrix stored as three padded rows, the WGSL `mat3x3<f32>`
/// memory layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Mat3Uniform(pub [Vec4; 3]);

impl Mat3Uniform {
    pub const IDENTITY: Self = Self([Vec4::X, Vec4::Y, Vec4::Z]);

    /// Takes the upper-left 3x3 of a `Mat4` (column-major columns become
    /// the padded rows here, so pass an already-transposed matrix when a
    /// normal matrix is wanted).
    #[must_use]
    pub fn from_mat4(m: Mat4) -> Self {
        Self([
            m.x_axis.truncate().extend(0.0),
            m.y_axis.truncate().extend(0.0),
            m.z_axis.truncate().extend(0.0),
        ])
    }
}

impl Default for Mat3Uniform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-frame block: camera, environment, viewport.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_projection: Mat4,
    pub view_matrix: Mat4,
    pub camera_position: Vec3,
    pub time: f32,
    pub ambient_color: Vec3,
    pub fog_enabled: u32,
    pub fog_color: Vec3,
    pub fog_near: f32,
    pub fog_far: f32,
    pub pixel_ratio: f32,
    pub viewport_size: Vec2,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            time: 0.0,
            ambient_color: Vec3::ZERO,
            fog_enabled: 0,
            fog_color: Vec3::ZERO,
            fog_near: 1.0,
            fog_far: 1000.0,
            pixel_ratio: 1.0,
            viewport_size: Vec2::ONE,
        }
    }
}

/// Per-object block, laid out for dynamic-offset binding.
///
/// Padded to 256 bytes, the conservative
/// `min_uniform_buffer_offset_alignment`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelUniforms {
    pub world_matrix: Mat4,
    pub world_matrix_inverse: Mat4,
    pub normal_matrix: Mat3Uniform,
    pub _pad: [f32; 20],
}

impl Default for ModelUniforms {
    fn default() -> Self {
        Self {
            world_matrix: Mat4::IDENTITY,
            world_matrix_inverse: Mat4::IDENTITY,
            normal_matrix: Mat3Uniform::IDENTITY,
            _pad: [0.0; 20],
        }
    }
}

/// Stride between consecutive [`ModelUniforms`] entries in the shared
/// dynamic buffer.
pub const MODEL_UNIFORM_STRIDE: u32 = std::mem::size_of::<ModelUniforms>() as u32;

/// Morph-target block: the up-to-8 active influences selected each
/// frame, plus the base influence applied to the unmorphed position.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MorphUniforms {
    pub base_influence: f32,
    pub target_count: u32,
    pub _pad: [f32; 2],
    pub influences: [f32; 8],
    pub indices: [u32; 8],
}

impl Default for MorphUniforms {
    fn default() -> Self {
        Self {
            base_influence: 1.0,
            target_count: 0,
            _pad: [0.0; 2],
            influences: [0.0; 8],
            indices: [0; 8],
        }
    }
}

// ---------------------------------------------------------------------------
// Per-material blocks
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BasicUniforms {
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for BasicUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LambertUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub emissive: Vec3,
    pub _pad: f32,
}

impl Default for LambertUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            emissive: Vec3::ZERO,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PhongUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub emissive: Vec3,
    pub shininess: f32,
    pub specular: Vec3,
    pub _pad: f32,
}

impl Default for PhongUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            emissive: Vec3::ZERO,
            shininess: 30.0,
            specular: Vec3::splat(0.07),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StandardUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub emissive: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub env_map_intensity: f32,
    pub _pad: [f32; 2],
}

impl Default for StandardUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 0.0,
            env_map_intensity: 1.0,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MatcapUniforms {
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for MatcapUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DepthUniforms {
    pub opacity: f32,
    pub _pad: [f32; 3],
}

impl Default for DepthUniforms {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            _pad: [0.0; 3],
        }
    }
}

/// Distance material writes view-space distance from a reference point,
/// used by point-light shadow passes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DistanceUniforms {
    pub reference_position: Vec3,
    pub near_distance: f32,
    pub far_distance: f32,
    pub _pad: [f32; 3],
}

impl Default for DistanceUniforms {
    fn default() -> Self {
        Self {
            reference_position: Vec3::ZERO,
            near_distance: 1.0,
            far_distance: 1000.0,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointsUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub size: f32,
    /// Screen-space scale factor, refreshed from the viewport each frame
    /// when size attenuation is on.
    pub scale: f32,
    pub size_attenuation: u32,
    pub _pad: f32,
}

impl Default for PointsUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            size: 1.0,
            scale: 1.0,
            size_attenuation: 1,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub linewidth: f32,
    pub _pad: [f32; 3],
}

impl Default for LineUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            linewidth: 1.0,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    pub color: Vec3,
    pub opacity: f32,
    pub rotation: f32,
    pub _pad: [f32; 3],
}

impl Default for SpriteUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            rotation: 0.0,
            _pad: [0.0; 3],
        }
    }
}

/// Shadow material modulates the shadow receiving surface.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub color: Vec3,
    pub opacity: f32,
}

impl Default for ShadowUniforms {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            opacity: 1.0,
        }
    }
}
