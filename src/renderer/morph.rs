//! Morph-target influence selection.
//!
//! A mesh may declare any number of morph targets, but at most 8 are
//! active in a draw. Each frame the tracker picks the 8 strongest
//! influences (by absolute value), re-sorting only when the influence
//! values actually changed; everything else contributes zero.

use rustc_hash::FxHashMap;

use crate::resources::buffer::UniformBuffer;
use crate::resources::uniforms::MorphUniforms;
use crate::scene::MeshKey;

/// Upper bound on simultaneously active morph targets.
pub const MAX_MORPH_TARGETS: usize = 8;

#[derive(Debug)]
struct MorphSelection {
    /// Influences as last evaluated, for the change check.
    last: Vec<f32>,
    /// Scratch (index, influence) pairs, reused between frames.
    scratch: Vec<(usize, f32)>,
    uniforms: UniformBuffer<MorphUniforms>,
}

/// Per-mesh morph state, persistent across frames.
#[derive(Debug, Default)]
pub struct MorphTracker {
    states: FxHashMap<MeshKey, MorphSelection>,
}

impl MorphTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-evaluates the active set for `mesh` and returns its uniform
    /// block. `relative` selects the base-influence rule: relative
    /// morphs keep a base weight of 1, absolute morphs get
    /// `1 - sum(active influences)`.
    pub fn update(&mut self, mesh: MeshKey, influences: &[f32], relative: bool) -> &UniformBuffer<MorphUniforms> {
        let state = self.states.entry(mesh).or_insert_with(|| MorphSelection {
            last: Vec::new(),
            scratch: Vec::new(),
            uniforms: UniformBuffer::new(MorphUniforms::default(), Some("MorphUniforms")),
        });

        if state.last.as_slice() != influences {
            state.last.clear();
            state.last.extend_from_slice(influences);

            state.scratch.clear();
            state
                .scratch
                .extend(influences.iter().copied().enumerate());

            // Strongest influences first; stable so equal magnitudes
            // keep declaration order.
            state
                .scratch
                .sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

            let mut active: Vec<(usize, f32)> = state
                .scratch
                .iter()
                .take(MAX_MORPH_TARGETS)
                .filter(|&&(_, v)| v != 0.0)
                .copied()
                .collect();

            // Back to target order so attribute slots stay stable
            // while influences fade in and out.
            active.sort_by_key(|&(index, _)| index);

            let sum: f32 = active.iter().map(|&(_, v)| v).sum();

            let mut block = MorphUniforms {
                base_influence: if relative { 1.0 } else { 1.0 - sum },
                target_count: active.len() as u32,
                ..Default::default()
            };
            for (slot, &(index, value)) in active.iter().enumerate() {
                block.indices[slot] = index as u32;
                block.influences[slot] = value;
            }

            *state.uniforms.write() = block;
        }

        &state.uniforms
    }

    /// Cached uniforms without re-evaluation.
    #[must_use]
    pub fn get(&self, mesh: MeshKey) -> Option<&UniformBuffer<MorphUniforms>> {
        self.states.get(&mesh).map(|s| &s.uniforms)
    }

    /// Drops the state for a removed mesh.
    pub fn remove(&mut self, mesh: MeshKey) {
        self.states.remove(&mesh);
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}
