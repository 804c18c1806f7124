/// Per-frame counters for instrumentation.
///
/// Read-only side outputs; nothing in the pipeline depends on them.
/// Reset at the start of every prepared frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderInfo {
    /// Frames prepared since renderer creation.
    pub frame: u64,

    pub draw_calls: u32,
    pub triangles: u32,
    pub vertices: u32,

    /// Records emitted into each bucket this frame.
    pub opaque_records: u32,
    pub transparent_records: u32,
    /// Records dropped because no program was registered for them.
    pub skipped_records: u32,

    /// Binding-state cache hits and (re)builds this frame.
    pub binding_hits: u32,
    pub binding_misses: u32,

    /// Materials whose uniform block was refreshed this frame.
    pub materials_refreshed: u32,
}

impl RenderInfo {
    /// Clears the per-frame counters, keeping the frame index.
    pub fn reset(&mut self) {
        *self = Self {
            frame: self.frame,
            ..Self::default()
        };
    }
}
