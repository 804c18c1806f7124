//! State-tracking wrapper over `wgpu::RenderPass`.
//!
//! Consecutive draws sorted by pipeline/material/geometry share most of
//! their state; this wrapper drops the redundant rebind calls by
//! comparing resource ids before touching the pass.

use crate::renderer::program::ProgramId;

#[derive(Clone, Copy, PartialEq)]
struct BindGroupState {
    id: u64,
    // Dynamic offset counts are tiny (limit is 4 or 8); a fixed array
    // avoids per-call allocation.
    offsets: [u32; 8],
    offset_count: u8,
}

pub struct TrackedRenderPass<'a> {
    pass: wgpu::RenderPass<'a>,
    current_pipeline: Option<ProgramId>,
    current_bind_groups: [Option<BindGroupState>; 4],
    current_vertex_buffers: [Option<u64>; 8],
    current_index_buffer: Option<u64>,
}

impl<'a> TrackedRenderPass<'a> {
    #[must_use]
    pub fn new(pass: wgpu::RenderPass<'a>) -> Self {
        Self {
            pass,
            current_pipeline: None,
            current_bind_groups: [None; 4],
            current_vertex_buffers: [None; 8],
            current_index_buffer: None,
        }
    }

    pub fn set_pipeline(&mut self, id: ProgramId, pipeline: &'a wgpu::RenderPipeline) {
        if self.current_pipeline != Some(id) {
            self.pass.set_pipeline(pipeline);
            self.current_pipeline = Some(id);
        }
    }

    pub fn set_bind_group(
        &mut self,
        index: u32,
        id: u64,
        bind_group: &'a wgpu::BindGroup,
        offsets: &[u32],
    ) {
        let slot = index as usize;
        let needs_update = match &self.current_bind_groups[slot] {
            Some(state) => {
                state.id != id
                    || state.offset_count as usize != offsets.len()
                    || &state.offsets[..offsets.len()] != offsets
            }
            None => true,
        };

        if needs_update {
            self.pass.set_bind_group(index, bind_group, offsets);

            let mut state = BindGroupState {
                id,
                offsets: [0; 8],
                offset_count: offsets.len() as u8,
            };
            let len = offsets.len().min(8);
            state.offsets[..len].copy_from_slice(&offsets[..len]);
            self.current_bind_groups[slot] = Some(state);
        }
    }

    pub fn set_vertex_buffer(&mut self, slot: u32, id: u64, slice: wgpu::BufferSlice<'a>) {
        let index = slot as usize;
        if self.current_vertex_buffers[index] != Some(id) {
            self.pass.set_vertex_buffer(slot, slice);
            self.current_vertex_buffers[index] = Some(id);
        }
    }

    pub fn set_index_buffer(
        &mut self,
        id: u64,
        slice: wgpu::BufferSlice<'a>,
        format: wgpu::IndexFormat,
    ) {
        if self.current_index_buffer != Some(id) {
            self.pass.set_index_buffer(slice, format);
            self.current_index_buffer = Some(id);
        }
    }

    pub fn draw(&mut self, vertices: std::ops::Range<u32>, instances: std::ops::Range<u32>) {
        self.pass.draw(vertices, instances);
    }

    pub fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        base_vertex: i32,
        instances: std::ops::Range<u32>,
    ) {
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}
