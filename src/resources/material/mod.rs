mod basic;
mod depth;
mod lambert;
mod line;
mod macros;
mod matcap;
mod phong;
mod points;
mod shader;
mod sprite;
mod standard;

pub use basic::BasicMaterial;
pub use depth::{DepthMaterial, DistanceMaterial, ShadowMaterial};
pub use lambert::LambertMaterial;
pub use line::LineMaterial;
pub use matcap::MatcapMaterial;
pub use phong::PhongMaterial;
pub use points::PointsMaterial;
pub use shader::ShaderMaterial;
pub use sprite::SpriteMaterial;
pub use standard::StandardMaterial;

use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use glam::Vec3;
use uuid::Uuid;

use crate::resources::buffer::BufferRef;
use macros::for_each_material;

static NEXT_MATERIAL_ID: AtomicU32 = AtomicU32::new(1);

bitflags! {
    /// Shader-variant flags derived from which optional inputs a
    /// material carries. Part of the program selection key.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MaterialFeatures: u32 {
        const USE_MAP           = 1 << 0;
        const USE_NORMAL_MAP    = 1 << 1;
        const USE_ROUGHNESS_MAP = 1 << 2;
        const USE_METALNESS_MAP = 1 << 3;
        const USE_EMISSIVE_MAP  = 1 << 4;
        const USE_AO_MAP        = 1 << 5;
        const USE_SPECULAR_MAP  = 1 << 6;
        const USE_ALPHA_MAP     = 1 << 7;
        const USE_MATCAP        = 1 << 8;
    }
}

/// Which faces are rasterized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

impl Side {
    /// The faces to cull for this side setting.
    #[must_use]
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Self::Front => Some(wgpu::Face::Back),
            Self::Back => Some(wgpu::Face::Front),
            Self::Double => None,
        }
    }
}

/// Color blend mode for transparent draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Blending {
    #[default]
    Normal,
    Additive,
    Multiply,
}

impl Blending {
    #[must_use]
    pub fn blend_state(self) -> wgpu::BlendState {
        use wgpu::{BlendComponent, BlendFactor, BlendOperation, BlendState};
        match self {
            Self::Normal => BlendState::ALPHA_BLENDING,
            Self::Additive => BlendState {
                color: BlendComponent {
                    src_factor: BlendFactor::SrcAlpha,
                    dst_factor: BlendFactor::One,
                    operation: BlendOperation::Add,
                },
                alpha: BlendComponent {
                    src_factor: BlendFactor::One,
                    dst_factor: BlendFactor::One,
                    operation: BlendOperation::Add,
                },
            },
            Self::Multiply => BlendState {
                color: BlendComponent {
                    src_factor: BlendFactor::Dst,
                    dst_factor: BlendFactor::Zero,
                    operation: BlendOperation::Add,
                },
                alpha: BlendComponent {
                    src_factor: BlendFactor::Zero,
                    dst_factor: BlendFactor::One,
                    operation: BlendOperation::Add,
                },
            },
        }
    }
}

/// Fixed-function pipeline state a material declares.
///
/// The renderer respects these as written: a transparent material that
/// keeps `depth_write` on draws exactly that way (depth passes are the
/// documented exception).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialSettings {
    pub transparent: bool,
    pub blending: Blending,
    pub depth_test: bool,
    pub depth_write: bool,
    pub side: Side,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            transparent: false,
            blending: Blending::Normal,
            depth_test: true,
            depth_write: true,
            side: Side::Front,
        }
    }
}

/// The closed material variant set.
///
/// Dispatch is a `match` per concern, exhaustive-checked by the
/// compiler; [`ShaderMaterial`] is the custom-shader variant, not an
/// open inheritance escape.
#[derive(Debug)]
pub enum MaterialData {
    Basic(BasicMaterial),
    Lambert(LambertMaterial),
    Phong(PhongMaterial),
    Standard(StandardMaterial),
    Matcap(MatcapMaterial),
    Depth(DepthMaterial),
    Distance(DistanceMaterial),
    Points(PointsMaterial),
    Line(LineMaterial),
    Sprite(SpriteMaterial),
    Shadow(ShadowMaterial),
    Shader(ShaderMaterial),
}

/// Fieldless variant tag, used in program selection keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Basic,
    Lambert,
    Phong,
    Standard,
    Matcap,
    Depth,
    Distance,
    Points,
    Line,
    Sprite,
    Shadow,
    Shader,
}

impl MaterialData {
    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        match self {
            Self::Basic(_) => MaterialKind::Basic,
            Self::Lambert(_) => MaterialKind::Lambert,
            Self::Phong(_) => MaterialKind::Phong,
            Self::Standard(_) => MaterialKind::Standard,
            Self::Matcap(_) => MaterialKind::Matcap,
            Self::Depth(_) => MaterialKind::Depth,
            Self::Distance(_) => MaterialKind::Distance,
            Self::Points(_) => MaterialKind::Points,
            Self::Line(_) => MaterialKind::Line,
            Self::Sprite(_) => MaterialKind::Sprite,
            Self::Shadow(_) => MaterialKind::Shadow,
            Self::Shader(_) => MaterialKind::Shader,
        }
    }

    /// Name of the shader template this variant renders with. Custom
    /// materials carry their own.
    #[must_use]
    pub fn shader_name(&self) -> &str {
        match self {
            Self::Basic(_) => "mesh_basic",
            Self::Lambert(_) => "mesh_lambert",
            Self::Phong(_) => "mesh_phong",
            Self::Standard(_) => "mesh_standard",
            Self::Matcap(_) => "mesh_matcap",
            Self::Depth(_) => "mesh_depth",
            Self::Distance(_) => "mesh_distance",
            Self::Points(_) => "points",
            Self::Line(_) => "line",
            Self::Sprite(_) => "sprite",
            Self::Shadow(_) => "shadow",
            Self::Shader(m) => m.shader_name(),
        }
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        for_each_material!(self, m => m.features())
    }

    /// Backing buffer for this variant's uniform block.
    #[must_use]
    pub fn uniform_buffer(&self) -> &BufferRef {
        for_each_material!(self, m => m.uniforms.handle())
    }

    #[must_use]
    pub fn uniform_bytes(&self) -> &[u8] {
        for_each_material!(self, m => m.uniforms.as_bytes())
    }

    /// Version of the uniform content, for upload dirty checks.
    #[must_use]
    pub fn uniform_version(&self) -> u64 {
        for_each_material!(self, m => m.uniforms.version())
    }
}

/// A shareable material: settings + identity around a [`MaterialData`]
/// variant.
///
/// Any settings mutation bumps `version`; renderer caches keyed by
/// `(id, version)` invalidate on the bump. Uniform-value changes are
/// tracked separately through the variant's uniform buffer.
#[derive(Debug)]
pub struct Material {
    pub uuid: Uuid,
    id: u32,
    pub name: Option<Cow<'static, str>>,
    settings: MaterialSettings,
    version: u64,
    pub data: MaterialData,
}

macro_rules! impl_setting_accessors {
    ( $(($field:ident, $ty:ty, $doc:expr)),* $(,)? ) => {
        $(
            paste::paste! {
                #[doc = $doc]
                pub fn [<set_ $field>](&mut self, value: $ty) {
                    if self.settings.$field != value {
                        self.settings.$field = value;
                        self.version = self.version.wrapping_add(1);
                    }
                }
            }

            #[must_use]
            pub fn $field(&self) -> $ty {
                self.settings.$field
            }
        )*
    };
}

impl Material {
    #[must_use]
    pub fn new(data: MaterialData) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            id: NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed),
            name: None,
            settings: MaterialSettings::default(),
            version: 0,
            data,
        }
    }

    // Convenience constructors.
    #[must_use]
    pub fn new_basic(color: Vec3) -> Self {
        BasicMaterial::new(color).into()
    }

    #[must_use]
    pub fn new_lambert(color: Vec3) -> Self {
        LambertMaterial::new(color).into()
    }

    #[must_use]
    pub fn new_phong(color: Vec3) -> Self {
        PhongMaterial::new(color).into()
    }

    #[must_use]
    pub fn new_standard(color: Vec3) -> Self {
        StandardMaterial::new(color).into()
    }

    /// Monotonically increasing identity, used for state-grouping sort
    /// keys and cache keys.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Settings version; bumped on every settings mutation.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn settings(&self) -> &MaterialSettings {
        &self.settings
    }

    impl_setting_accessors!(
        (transparent, bool, "Route this material through the blended, back-to-front pass."),
        (blending, Blending, "Blend equation used when `transparent` is set."),
        (depth_test, bool, "Test fragments against the depth buffer."),
        (depth_write, bool, "Write fragment depth. Conventionally off for transparent surfaces, but always honored as declared."),
        (side, Side, "Which faces are rasterized."),
    );

    // Variant delegation.
    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        self.data.kind()
    }

    #[must_use]
    pub fn shader_name(&self) -> &str {
        self.data.shader_name()
    }

    #[must_use]
    pub fn features(&self) -> MaterialFeatures {
        self.data.features()
    }

    #[must_use]
    pub fn uniform_buffer(&self) -> &BufferRef {
        self.data.uniform_buffer()
    }

    #[must_use]
    pub fn uniform_version(&self) -> u64 {
        self.data.uniform_version()
    }
}

macro_rules! impl_material_from {
    ( $(($variant:ident, $ty:ty)),* $(,)? ) => {
        $(
            impl From<$ty> for Material {
                fn from(data: $ty) -> Self {
                    Material::new(MaterialData::$variant(data))
                }
            }
        )*
    };
}

impl_material_from!(
    (Basic, BasicMaterial),
    (Lambert, LambertMaterial),
    (Phong, PhongMaterial),
    (Standard, StandardMaterial),
    (Matcap, MatcapMaterial),
    (Depth, DepthMaterial),
    (Distance, DistanceMaterial),
    (Points, PointsMaterial),
    (Line, LineMaterial),
    (Sprite, SpriteMaterial),
    (Shadow, ShadowMaterial),
    (Shader, ShaderMaterial),
);
