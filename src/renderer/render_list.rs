//! Sortable per-frame draw records.
//!
//! Records are ephemeral: the lists are cleared and repopulated every
//! frame, reusing their allocations. Sorting is stable and total even
//! in the presence of NaN depth, so a frame's draw order is fully
//! deterministic given its inputs.

use std::cmp::Ordering;
use std::ops::Range;

use glam::Mat4;
use wgpu::PrimitiveTopology;

use crate::assets::{GeometryHandle, MaterialHandle};
use crate::renderer::program::ProgramId;
use crate::resources::geometry::GeometryGroup;
use crate::scene::{MeshKey, NodeKey, SkeletonKey};

/// One draw call's worth of state, valid for a single frame.
#[derive(Debug, Clone)]
pub struct RenderRecord {
    /// Owning node's monotonically increasing id; the final tie-break.
    pub id: u32,
    pub node: NodeKey,
    pub mesh: MeshKey,

    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    /// Numeric identities for state-grouping comparisons.
    pub geometry_id: u32,
    pub material_id: u32,
    pub program: ProgramId,

    /// Render-order bucket inherited from the nearest group ancestor.
    pub group_order: i32,
    /// Explicit per-object override; always wins over depth.
    pub render_order: i32,
    /// Signed view-space depth of the object's reference point.
    /// Multi-material groups share their object's z.
    pub z: f32,

    /// Sub-range for multi-material geometry; `None` draws everything.
    pub group: Option<GeometryGroup>,

    pub world_matrix: Mat4,
    pub instance_count: Option<u32>,
    pub skeleton: Option<SkeletonKey>,

    /// Element range of the draw: indices when `indexed`, vertices
    /// otherwise.
    pub draw_range: Range<u32>,
    pub indexed: bool,
    pub topology: PrimitiveTopology,

    /// Byte offset into the shared model-uniform buffer, assigned
    /// during prepare.
    pub dynamic_offset: u32,
}

// NaN depth would poison the comparators, so it is pinned to +infinity:
// such records draw last in the opaque pass. total_cmp keeps the order
// total either way.
#[inline]
fn z_key(z: f32) -> f32 {
    if z.is_nan() { f32::INFINITY } else { z }
}

/// Opaque ordering: group state together first, then draw front-to-back
/// so early depth rejection does the rest.
fn painter_sort(a: &RenderRecord, b: &RenderRecord) -> Ordering {
    a.group_order
        .cmp(&b.group_order)
        .then_with(|| a.render_order.cmp(&b.render_order))
        .then_with(|| a.program.cmp(&b.program))
        .then_with(|| a.material_id.cmp(&b.material_id))
        .then_with(|| a.geometry_id.cmp(&b.geometry_id))
        .then_with(|| z_key(a.z).total_cmp(&z_key(b.z)))
        .then_with(|| a.id.cmp(&b.id))
}

/// Transparent ordering: back-to-front so blending composites
/// correctly; state grouping loses to correctness here.
fn reverse_painter_sort(a: &RenderRecord, b: &RenderRecord) -> Ordering {
    a.group_order
        .cmp(&b.group_order)
        .then_with(|| a.render_order.cmp(&b.render_order))
        .then_with(|| z_key(b.z).total_cmp(&z_key(a.z)))
        .then_with(|| a.id.cmp(&b.id))
}

/// The two per-frame buckets plus their sort.
#[derive(Debug, Default)]
pub struct RenderList {
    pub opaque: Vec<RenderRecord>,
    pub transparent: Vec<RenderRecord>,
}

impl RenderList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            opaque: Vec::with_capacity(512),
            transparent: Vec::with_capacity(128),
        }
    }

    /// Empties both buckets, keeping their capacity for the next frame.
    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }

    pub fn push(&mut self, record: RenderRecord, transparent: bool) {
        if transparent {
            self.transparent.push(record);
        } else {
            self.opaque.push(record);
        }
    }

    /// Sorts both buckets in place. Stable: records with fully equal
    /// keys keep their insertion order.
    pub fn sort(&mut self) {
        self.opaque.sort_by(painter_sort);
        self.transparent.sort_by(reverse_painter_sort);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.transparent.is_empty()
    }
}
