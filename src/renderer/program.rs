//! Compiled-program descriptors.
//!
//! Shader generation and compilation are external: the embedding layer
//! compiles its pipelines and registers one [`ShaderProgram`] per
//! variant here. A program descriptor is exactly what the binding and
//! uniform stages need from a compiled program: the attribute slots it
//! consumes and the uniform bindings it declares.

use std::borrow::Cow;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::resources::material::{MaterialFeatures, MaterialKind};

bitflags! {
    /// Geometry-derived shader variant flags, the counterpart of
    /// [`MaterialFeatures`] in the program selection key.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct GeometryFeatures: u32 {
        const USE_NORMAL        = 1 << 0;
        const USE_UV            = 1 << 1;
        const USE_VERTEX_COLOR  = 1 << 2;
        const USE_SKINNING      = 1 << 3;
        const USE_MORPH_TARGETS = 1 << 4;
        const USE_INSTANCING    = 1 << 5;
    }
}

/// Stable program identity; also the pipeline-grouping sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(pub u32);

/// Selection key: one program per (variant, feature set) combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    pub kind: MaterialKind,
    pub material_features: MaterialFeatures,
    pub geometry_features: GeometryFeatures,
}

/// What a compiled program exposes to this core: attribute slot names
/// mapped to shader locations, and uniform names mapped to binding
/// locations.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub id: ProgramId,
    pub name: Cow<'static, str>,
    attributes: FxHashMap<String, u32>,
    uniforms: FxHashMap<String, u32>,
}

impl ShaderProgram {
    #[must_use]
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    #[must_use]
    pub fn uniform_location(&self, name: &str) -> Option<u32> {
        self.uniforms.get(name).copied()
    }

    /// Active attributes as `(name, shader_location)` pairs.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, u32)> {
        self.attributes.iter().map(|(n, &l)| (n.as_str(), l))
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, u32)> {
        self.uniforms.iter().map(|(n, &l)| (n.as_str(), l))
    }
}

/// Registry of compiled programs, keyed by material variant + features.
#[derive(Debug, Default)]
pub struct ProgramRegistry {
    programs: FxHashMap<ProgramId, ShaderProgram>,
    by_key: FxHashMap<ProgramKey, ProgramId>,
    next_id: u32,
}

impl ProgramRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compiled program for `key`, replacing any previous
    /// registration for that key.
    pub fn register(
        &mut self,
        key: ProgramKey,
        name: impl Into<Cow<'static, str>>,
        attributes: impl IntoIterator<Item = (String, u32)>,
        uniforms: impl IntoIterator<Item = (String, u32)>,
    ) -> ProgramId {
        let id = ProgramId(self.next_id);
        self.next_id += 1;

        self.programs.insert(
            id,
            ShaderProgram {
                id,
                name: name.into(),
                attributes: attributes.into_iter().collect(),
                uniforms: uniforms.into_iter().collect(),
            },
        );
        self.by_key.insert(key, id);
        id
    }

    /// Program lookup for a render record. `None` means the draw is
    /// skipped this frame (a content/setup error, not a frame error).
    #[must_use]
    pub fn select(&self, key: &ProgramKey) -> Option<&ShaderProgram> {
        let id = self.by_key.get(key)?;
        self.programs.get(id)
    }

    #[must_use]
    pub fn get(&self, id: ProgramId) -> Option<&ShaderProgram> {
        self.programs.get(&id)
    }

    /// Drops a program. The caller must also invalidate binding states
    /// built against it.
    pub fn remove(&mut self, id: ProgramId) -> Option<ShaderProgram> {
        self.by_key.retain(|_, v| *v != id);
        self.programs.remove(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
