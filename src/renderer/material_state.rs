//! Per-frame material uniform refresh.
//!
//! Material setters write straight into each variant's uniform block,
//! so most of the refresh is a version check. What remains is the
//! derived state a material cannot know by itself (viewport-dependent
//! point scaling) and the once-per-frame guarantee: a material shared
//! by a thousand meshes is refreshed exactly once per frame.
//!
//! Refresh is idempotent: with unchanged inputs the uniform bytes and
//! versions are bit-identical across calls.

use rustc_hash::FxHashMap;

use crate::assets::MaterialHandle;
use crate::resources::material::{Material, MaterialData};

/// Viewport state consumed by screen-space materials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SeenState {
    frame: u64,
    uniform_version: u64,
}

/// Tracks which materials were already refreshed this frame.
#[derive(Debug, Default)]
pub struct MaterialStateTracker {
    seen: FxHashMap<MaterialHandle, SeenState>,
}

impl MaterialStateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes `material` for `frame` unless already done. Returns
    /// true when the uniform content changed since the material was
    /// last seen (an upload will follow).
    pub fn refresh(
        &mut self,
        frame: u64,
        handle: MaterialHandle,
        material: &mut Material,
        viewport: &Viewport,
    ) -> bool {
        if let Some(seen) = self.seen.get(&handle)
            && seen.frame == frame
        {
            // Second mesh sharing this material within the frame; the
            // first refresh already holds.
            return false;
        }

        refresh_derived_uniforms(material, viewport);

        let version = material.uniform_version();
        let changed = match self.seen.insert(
            handle,
            SeenState {
                frame,
                uniform_version: version,
            },
        ) {
            Some(previous) => previous.uniform_version != version,
            None => true,
        };

        changed
    }

    /// Drops tracking for a disposed material.
    pub fn remove(&mut self, handle: MaterialHandle) {
        self.seen.remove(&handle);
    }

    pub fn clear(&mut self) {
        self.seen.clear();
    }
}

/// Writes uniform values that depend on renderer state rather than the
/// material's own fields. Variant dispatch is exhaustive; variants with
/// no derived state fall through untouched.
fn refresh_derived_uniforms(material: &mut Material, viewport: &Viewport) {
    match &mut material.data {
        MaterialData::Points(points) => {
            // Size attenuation works in logical pixels: scale by half
            // the viewport height times the pixel ratio, the classic
            // perspective point-size factor.
            if points.size_attenuation() {
                let scale = viewport.height as f32 * viewport.pixel_ratio * 0.5;
                let current = points.uniforms.read().scale;
                if current != scale {
                    points.uniforms.write().scale = scale;
                }
            }
        }
        MaterialData::Basic(_)
        | MaterialData::Lambert(_)
        | MaterialData::Phong(_)
        | MaterialData::Standard(_)
        | MaterialData::Matcap(_)
        | MaterialData::Depth(_)
        | MaterialData::Distance(_)
        | MaterialData::Line(_)
        | MaterialData::Sprite(_)
        | MaterialData::Shadow(_)
        | MaterialData::Shader(_) => {}
    }
}
