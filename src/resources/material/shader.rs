use std::borrow::Cow;

use crate::assets::TextureHandle;
use crate::resources::buffer::RawUniformBuffer;
use crate::resources::material::MaterialFeatures;

/// Custom-shader escape hatch.
///
/// The closed variant for user programs: the embedding layer registers a
/// compiled program under `shader_name` and owns the uniform layout; we
/// only track the raw bytes and their version.
#[derive(Debug)]
pub struct ShaderMaterial {
    shader_name: Cow<'static, str>,
    pub(crate) uniforms: RawUniformBuffer,
    pub maps: Vec<TextureHandle>,
}

impl ShaderMaterial {
    #[must_use]
    pub fn new(shader_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            shader_name: shader_name.into(),
            uniforms: RawUniformBuffer::new(&[], Some("ShaderMaterialUniforms")),
            maps: Vec::new(),
        }
    }

    #[must_use]
    pub fn shader_name(&self) -> &str {
        &self.shader_name
    }

    /// Replaces the uniform payload. The caller is responsible for
    /// matching the program's declared layout.
    pub fn set_uniform_bytes(&mut self, bytes: &[u8]) {
        self.uniforms.write_bytes(bytes);
    }

    #[must_use]
    pub(crate) fn features(&self) -> MaterialFeatures {
        if self.maps.is_empty() {
            MaterialFeatures::empty()
        } else {
            MaterialFeatures::USE_MAP
        }
    }
}
