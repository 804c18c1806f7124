//! Vertex binding-state cache.
//!
//! One [`BindingState`] per (geometry, program, instancing) signature:
//! the resolved vertex-buffer layout the draw stage binds, equivalent
//! to a vertex-array object. States persist across frames and are the
//! only cross-frame cache besides the GPU registries; everything else
//! in the frame pipeline is rebuilt from scratch.
//!
//! A state is valid while its geometry keeps the same structural
//! version (attribute shape and buffer identity). Content-only edits
//! reuse it untouched; shape changes rebuild it in place on the next
//! fetch, so a stale state can never leak into a draw.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use wgpu::{IndexFormat, VertexStepMode};

use crate::assets::GeometryHandle;
use crate::renderer::program::{ProgramId, ShaderProgram};
use crate::resources::buffer::BufferRef;
use crate::resources::geometry::Geometry;

/// Cache key: the full binding signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub geometry: GeometryHandle,
    pub program: ProgramId,
    pub instanced: bool,
}

/// One vertex buffer slot of a resolved layout.
#[derive(Debug, Clone)]
pub struct BufferBinding {
    /// Holding the ref keeps the buffer alive while the state exists;
    /// disposal still must evict the entry (see `remove_geometry`).
    pub buffer: BufferRef,
    pub stride: u64,
    /// `Instance` step is the per-slot divisor: the slot advances once
    /// per instance instead of once per vertex.
    pub step_mode: VertexStepMode,
    pub attributes: Vec<wgpu::VertexAttribute>,
}

/// Resolved, reusable vertex-attribute configuration for one
/// (geometry, program, instancing) triple.
#[derive(Debug, Clone)]
pub struct BindingState {
    /// Identity for state-change tracking during draws.
    pub id: u32,
    /// Vertex buffer slots, bound in order.
    pub buffers: Vec<BufferBinding>,
    /// Shader locations enabled by this state. Anything a previous
    /// state enabled and this one does not is implicitly disabled,
    /// because each state carries its complete layout.
    pub enabled_locations: SmallVec<[u32; 16]>,
    /// Index binding: buffer, element format (fixed at geometry index
    /// upload), element count.
    pub index: Option<(BufferRef, IndexFormat, u32)>,

    structure_version: u64,
}

impl BindingState {
    #[must_use]
    pub fn structure_version(&self) -> u64 {
        self.structure_version
    }
}

/// The process-wide (per rendering context) binding cache.
#[derive(Debug, Default)]
pub struct BindingStateCache {
    states: FxHashMap<BindingKey, BindingState>,
    next_id: u32,
    hits: u64,
    misses: u64,
}

impl BindingStateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached state for `key`, rebuilding it first when the
    /// geometry's structure changed since it was built.
    ///
    /// Attributes the program declares but the geometry does not
    /// provide are skipped with a warning; the slot simply stays
    /// disabled. Reading out of bounds is not a possible outcome.
    pub fn get_or_create(
        &mut self,
        key: BindingKey,
        geometry: &Geometry,
        program: &ShaderProgram,
    ) -> &BindingState {
        let current_version = geometry.structure_version();

        let needs_build = match self.states.get(&key) {
            Some(state) => state.structure_version != current_version,
            None => true,
        };

        if needs_build {
            self.misses += 1;
            // A rebuild is a new state, with a new identity: draw-side
            // trackers comparing ids must not mistake it for the old
            // configuration.
            self.next_id += 1;
            let state = Self::build(self.next_id, key, geometry, program, current_version);
            self.states.insert(key, state);
        } else {
            self.hits += 1;
        }

        &self.states[&key]
    }

    /// Peeks without counting or building.
    #[must_use]
    pub fn get(&self, key: &BindingKey) -> Option<&BindingState> {
        self.states.get(key)
    }

    fn build(
        id: u32,
        key: BindingKey,
        geometry: &Geometry,
        program: &ShaderProgram,
        structure_version: u64,
    ) -> BindingState {
        // Resolve program attributes against geometry channels, in
        // shader-location order for determinism.
        let mut resolved: Vec<(&str, u32)> = program.attributes().collect();
        resolved.sort_by_key(|&(_, location)| location);

        let mut buffers: Vec<BufferBinding> = Vec::new();
        let mut enabled: SmallVec<[u32; 16]> = SmallVec::new();

        for (name, location) in resolved {
            let Some(attr) = geometry.attribute(name) else {
                log::warn!(
                    "Program '{}' wants attribute '{name}' which geometry {} does not provide; slot {location} disabled",
                    program.name,
                    geometry.id(),
                );
                continue;
            };

            if attr.step_mode == VertexStepMode::Instance && !key.instanced {
                // Instance channels are only wired for instanced draws.
                continue;
            }

            enabled.push(location);

            // Interleaved channels share a buffer slot; match on buffer
            // identity and stride.
            let slot = buffers
                .iter()
                .position(|b| b.buffer == attr.buffer && b.stride == attr.stride)
                .unwrap_or_else(|| {
                    buffers.push(BufferBinding {
                        buffer: attr.buffer.clone(),
                        stride: attr.stride,
                        step_mode: attr.step_mode,
                        attributes: Vec::new(),
                    });
                    buffers.len() - 1
                });
            buffers[slot].attributes.push(wgpu::VertexAttribute {
                format: attr.format,
                offset: attr.offset,
                shader_location: location,
            });
        }

        let index = geometry
            .index()
            .map(|index| (index.buffer.clone(), index.format, index.count));

        BindingState {
            id,
            buffers,
            enabled_locations: enabled,
            index,
            structure_version,
        }
    }

    /// Evicts every state built for `geometry`. Must be called when the
    /// geometry is disposed; a surviving entry would keep dead buffers
    /// reachable from the draw stage.
    pub fn remove_geometry(&mut self, geometry: GeometryHandle) {
        self.states.retain(|key, _| key.geometry != geometry);
    }

    /// Evicts every state built against `program`.
    pub fn remove_program(&mut self, program: ProgramId) {
        self.states.retain(|key, _| key.program != program);
    }

    /// Drops all states. Context teardown.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Lifetime hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Takes and resets the counters; called once per frame by the
    /// renderer to fold them into [`RenderInfo`].
    pub fn take_stats(&mut self) -> (u64, u64) {
        let stats = (self.hits, self.misses);
        self.hits = 0;
        self.misses = 0;
        stats
    }
}
