use core::ops::Range;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Affine3A, Vec3};
use rustc_hash::FxHashMap;
use uuid::Uuid;
use wgpu::{BufferUsages, IndexFormat, PrimitiveTopology, VertexFormat, VertexStepMode};

use crate::resources::buffer::BufferRef;

static NEXT_GEOMETRY_ID: AtomicU32 = AtomicU32::new(1);

/// One named vertex channel: a shared byte buffer plus layout metadata.
///
/// Content edits go through the buffer (version-tracked); layout edits
/// replace the whole `Attribute` on the owning [`Geometry`], which is
/// what bumps the geometry's structural versions.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub buffer: BufferRef,
    pub format: VertexFormat,
    pub offset: u64,
    pub stride: u64,
    pub count: u32,
    pub step_mode: VertexStepMode,
}

impl Attribute {
    /// Creates a tightly packed per-vertex attribute.
    #[must_use]
    pub fn new_planar<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            buffer: BufferRef::new(
                data,
                BufferUsages::VERTEX | BufferUsages::COPY_DST,
                Some("GeometryVertexAttr"),
            ),
            format,
            offset: 0,
            stride: std::mem::size_of::<T>() as u64,
            count: data.len() as u32,
            step_mode: VertexStepMode::Vertex,
        }
    }

    /// Creates a per-instance attribute (advances once per instance).
    #[must_use]
    pub fn new_instanced<T: bytemuck::Pod>(data: &[T], format: VertexFormat) -> Self {
        Self {
            step_mode: VertexStepMode::Instance,
            ..Self::new_planar(data, format)
        }
    }

    /// Creates a view into a shared interleaved buffer.
    #[must_use]
    pub fn new_interleaved(
        buffer: BufferRef,
        format: VertexFormat,
        offset: u64,
        count: u32,
        stride: u64,
        step_mode: VertexStepMode,
    ) -> Self {
        Self {
            buffer,
            format,
            offset,
            stride,
            count,
            step_mode,
        }
    }

    /// Replaces the channel content in place. Keeps the buffer identity,
    /// so cached binding state stays valid.
    pub fn update_data<T: bytemuck::Pod>(&mut self, data: &[T]) {
        self.buffer.update(data);
        self.count = data.len() as u32;
    }

    /// Reads element `i` as a `Vec3`; `None` for other formats or
    /// out-of-range reads.
    #[must_use]
    pub fn read_vec3(&self, i: u32) -> Option<Vec3> {
        if self.format != VertexFormat::Float32x3 {
            return None;
        }
        let offset = self.offset as usize + i as usize * self.stride as usize;
        let data = self.buffer.read_data();
        let bytes: &[u8; 12] = data.get(offset..offset + 12)?.try_into().ok()?;
        let vals: &[f32; 3] = bytemuck::cast_ref(bytes);
        Some(Vec3::from_array(*vals))
    }
}

/// Index channel. The element format is picked once, when the indices
/// are first uploaded, and stays fixed for the geometry's lifetime.
#[derive(Debug, Clone)]
pub struct IndexAttribute {
    pub buffer: BufferRef,
    pub format: IndexFormat,
    pub count: u32,
}

/// A sub-range of the geometry drawn with its own material slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryGroup {
    pub start: u32,
    pub count: u32,
    pub material_index: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let transformed = matrix.transform_point3(corner);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self {
            min: new_min,
            max: new_max,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Vertex and index storage for one drawable shape.
///
/// Three version counters drive the caches downstream:
/// - `layout_version`: the attribute *shape* (names, formats, strides,
///   offsets, step modes) changed; pipelines keyed on the layout must
///   rebuild.
/// - `structure_version`: the shape changed **or** a channel was rebound
///   to a different buffer; cached binding state must rebuild.
/// - `data_version`: any content was touched.
#[derive(Debug)]
pub struct Geometry {
    pub uuid: Uuid,
    id: u32,

    layout_version: u64,
    structure_version: u64,
    data_version: u64,

    attributes: FxHashMap<String, Attribute>,
    index: Option<IndexAttribute>,
    groups: Vec<GeometryGroup>,

    /// Per-target displacement channels, keyed by base channel name
    /// ("position", "normal", ...). All targets of a channel share the
    /// base channel's vertex count.
    pub morph_attributes: FxHashMap<String, Vec<Attribute>>,
    pub morph_target_names: Vec<String>,
    /// Relative morphs store displacements; absolute morphs store full
    /// positions and get a `1 - sum(influences)` base weight.
    pub morph_targets_relative: bool,

    pub topology: PrimitiveTopology,
    pub draw_range: Range<u32>,

    pub bounding_box: RefCell<Option<BoundingBox>>,
    pub bounding_sphere: RefCell<Option<BoundingSphere>>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            id: NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed),
            layout_version: 0,
            structure_version: 0,
            data_version: 0,
            attributes: FxHashMap::default(),
            index: None,
            groups: Vec::new(),
            morph_attributes: FxHashMap::default(),
            morph_target_names: Vec::new(),
            morph_targets_relative: false,
            topology: PrimitiveTopology::TriangleList,
            draw_range: 0..u32::MAX,
            bounding_box: RefCell::new(None),
            bounding_sphere: RefCell::new(None),
        }
    }

    /// Monotonically increasing identity, used for deterministic sort
    /// tie-breaks.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn layout_version(&self) -> u64 {
        self.layout_version
    }

    #[inline]
    #[must_use]
    pub fn structure_version(&self) -> u64 {
        self.structure_version
    }

    #[inline]
    #[must_use]
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    #[must_use]
    pub fn attributes(&self) -> &FxHashMap<String, Attribute> {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Mutable channel access for content edits; bumps `data_version`.
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.data_version = self.data_version.wrapping_add(1);
        self.attributes.get_mut(name)
    }

    pub fn set_attribute(&mut self, name: &str, attr: Attribute) {
        let (layout_changed, buffer_changed) = match self.attributes.get(name) {
            Some(old) => (
                old.format != attr.format
                    || old.stride != attr.stride
                    || old.offset != attr.offset
                    || old.step_mode != attr.step_mode,
                old.buffer != attr.buffer,
            ),
            None => (true, true),
        };

        if attr.step_mode == VertexStepMode::Vertex
            && let Some(count) = self.vertex_count()
            && count != attr.count
        {
            log::warn!(
                "Attribute '{name}' has {} elements, geometry expects {count}",
                attr.count
            );
        }

        self.attributes.insert(name.to_string(), attr);

        if layout_changed {
            self.layout_version = self.layout_version.wrapping_add(1);
        }
        if layout_changed || buffer_changed {
            self.structure_version = self.structure_version.wrapping_add(1);
        }
        self.data_version = self.data_version.wrapping_add(1);
        self.invalidate_bounds();
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        let removed = self.attributes.remove(name);
        if removed.is_some() {
            self.layout_version = self.layout_version.wrapping_add(1);
            self.structure_version = self.structure_version.wrapping_add(1);
            self.data_version = self.data_version.wrapping_add(1);
        }
        removed
    }

    /// The shared per-vertex element count, taken from the first
    /// vertex-stepped channel. Instance channels keep their own count.
    #[must_use]
    pub fn vertex_count(&self) -> Option<u32> {
        self.attributes
            .values()
            .find(|a| a.step_mode == VertexStepMode::Vertex)
            .map(|a| a.count)
    }

    // ── Indices ──────────────────────────────────────────────────────

    #[must_use]
    pub fn index(&self) -> Option<&IndexAttribute> {
        self.index.as_ref()
    }

    /// Uploads indices, choosing the narrowest element format able to
    /// address the current vertex count. The format is fixed after the
    /// first upload; if later data no longer fits it is widened with a
    /// warning (a structural change).
    pub fn set_indices(&mut self, indices: &[u32]) {
        let vertex_count = self.vertex_count().unwrap_or(0);
        let fits_u16 = vertex_count <= u32::from(u16::MAX) + 1
            && indices.iter().all(|&i| i <= u32::from(u16::MAX));

        let format = match self.index.as_ref().map(|i| i.format) {
            None => {
                if fits_u16 {
                    IndexFormat::Uint16
                } else {
                    IndexFormat::Uint32
                }
            }
            Some(IndexFormat::Uint16) if !fits_u16 => {
                log::warn!(
                    "Geometry {}: index data exceeds the fixed u16 format, widening to u32",
                    self.id
                );
                IndexFormat::Uint32
            }
            Some(existing) => existing,
        };

        let buffer = match format {
            IndexFormat::Uint16 => {
                let narrowed: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
                BufferRef::new(
                    &narrowed,
                    BufferUsages::INDEX | BufferUsages::COPY_DST,
                    Some("GeometryIndex"),
                )
            }
            IndexFormat::Uint32 => BufferRef::new(
                indices,
                BufferUsages::INDEX | BufferUsages::COPY_DST,
                Some("GeometryIndex"),
            ),
        };

        self.index = Some(IndexAttribute {
            buffer,
            format,
            count: indices.len() as u32,
        });
        self.structure_version = self.structure_version.wrapping_add(1);
        self.data_version = self.data_version.wrapping_add(1);
    }

    pub fn clear_indices(&mut self) {
        if self.index.take().is_some() {
            self.structure_version = self.structure_version.wrapping_add(1);
            self.data_version = self.data_version.wrapping_add(1);
        }
    }

    // ── Groups (multi-material sub-ranges) ───────────────────────────

    #[must_use]
    pub fn groups(&self) -> &[GeometryGroup] {
        &self.groups
    }

    pub fn add_group(&mut self, start: u32, count: u32, material_index: u32) {
        self.groups.push(GeometryGroup {
            start,
            count,
            material_index,
        });
    }

    pub fn clear_groups(&mut self) {
        self.groups.clear();
    }

    /// Element count of one draw: the group range when given, otherwise
    /// the index count or vertex count clamped to `draw_range`.
    #[must_use]
    pub fn draw_count(&self, group: Option<&GeometryGroup>) -> Range<u32> {
        if let Some(group) = group {
            return group.start..group.start + group.count;
        }
        let full = match &self.index {
            Some(index) => index.count,
            None => self.vertex_count().unwrap_or(0),
        };
        let start = self.draw_range.start.min(full);
        let end = self.draw_range.end.min(full);
        start..end
    }

    // ── Morph targets ────────────────────────────────────────────────

    pub fn add_morph_attribute(&mut self, channel: &str, attr: Attribute) {
        self.morph_attributes
            .entry(channel.to_string())
            .or_default()
            .push(attr);
        self.data_version = self.data_version.wrapping_add(1);
    }

    #[must_use]
    pub fn morph_target_count(&self) -> u32 {
        self.morph_attributes
            .get("position")
            .map_or(0, |targets| targets.len() as u32)
    }

    // ── Bounds ───────────────────────────────────────────────────────

    pub fn invalidate_bounds(&self) {
        *self.bounding_box.borrow_mut() = None;
        *self.bounding_sphere.borrow_mut() = None;
    }

    pub fn compute_bounding_box(&self) {
        let Some(position) = self.attribute("position") else {
            return;
        };

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..position.count {
            if let Some(p) = position.read_vec3(i) {
                min = min.min(p);
                max = max.max(p);
            }
        }

        *self.bounding_box.borrow_mut() = Some(BoundingBox { min, max });
    }

    /// Center-of-box sphere over the position channel. An NaN result is
    /// a data-quality error: it is logged and kept (downstream sorting
    /// has an explicit NaN rule), never a panic.
    pub fn compute_bounding_sphere(&self) {
        let Some(position) = self.attribute("position") else {
            return;
        };

        if self.bounding_box.borrow().is_none() {
            self.compute_bounding_box();
        }
        let Some(bbox) = *self.bounding_box.borrow() else {
            return;
        };

        let center = bbox.center();
        let mut max_dist_sq = 0.0f32;
        for i in 0..position.count {
            if let Some(p) = position.read_vec3(i) {
                max_dist_sq = max_dist_sq.max(center.distance_squared(p));
            }
        }
        let radius = max_dist_sq.sqrt();

        if radius.is_nan() || center.is_nan() {
            log::error!(
                "Geometry {}: bounding sphere is NaN, the position channel likely contains NaN",
                self.id
            );
        }

        *self.bounding_sphere.borrow_mut() = Some(BoundingSphere { center, radius });
    }

    /// Lazily computed bounding sphere in local space.
    #[must_use]
    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        if self.bounding_sphere.borrow().is_none() {
            self.compute_bounding_sphere();
        }
        *self.bounding_sphere.borrow()
    }
}
