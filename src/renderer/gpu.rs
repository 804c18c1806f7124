//! GPU-side resource registry.
//!
//! Mirrors CPU [`BufferRef`]s into `wgpu::Buffer`s lazily: a buffer is
//! (re)allocated when its size changed and rewritten when its version
//! moved; an untouched buffer costs one version compare per frame.
//! Pipelines and bind groups are created by the embedding layer (it
//! owns shaders and layouts) and registered here by id.
//!
//! This registry is rendering-context state: it does not follow scene
//! or asset lifetimes and must be torn down with [`GpuResources::dispose`]
//! when the context goes away.

use rustc_hash::FxHashMap;

use crate::assets::MaterialHandle;
use crate::renderer::program::ProgramId;
use crate::resources::buffer::BufferRef;
use crate::scene::MeshKey;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    size: u64,
    version: u64,
}

/// A registered bind group with the id used for redundant-bind checks.
pub struct RegisteredBindGroup {
    pub id: u64,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Default)]
pub struct GpuResources {
    buffers: FxHashMap<u64, GpuBuffer>,
    pipelines: FxHashMap<ProgramId, wgpu::RenderPipeline>,

    global_bind_group: Option<RegisteredBindGroup>,
    material_bind_groups: FxHashMap<MaterialHandle, RegisteredBindGroup>,
    object_bind_groups: FxHashMap<MeshKey, RegisteredBindGroup>,

    next_bind_group_id: u64,
}

impl GpuResources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Buffers ──────────────────────────────────────────────────────

    /// Brings the GPU copy of `buffer` up to date. Never uploads when
    /// size and version both match.
    pub fn sync_buffer(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, buffer: &BufferRef) {
        let data = buffer.read_data();
        let size = data.len() as u64;
        let version = buffer.version();

        match self.buffers.get_mut(&buffer.id()) {
            Some(entry) if entry.size == size => {
                if entry.version != version {
                    queue.write_buffer(&entry.buffer, 0, &data);
                    entry.version = version;
                }
            }
            _ => {
                // New buffer, or the size changed: allocate fresh.
                let gpu_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(buffer.label()),
                    size: size.max(4),
                    usage: buffer.usage() | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                if size > 0 {
                    queue.write_buffer(&gpu_buffer, 0, &data);
                }
                self.buffers.insert(
                    buffer.id(),
                    GpuBuffer {
                        buffer: gpu_buffer,
                        size,
                        version,
                    },
                );
            }
        }
    }

    #[must_use]
    pub fn buffer(&self, id: u64) -> Option<&wgpu::Buffer> {
        self.buffers.get(&id).map(|b| &b.buffer)
    }

    pub fn remove_buffer(&mut self, id: u64) {
        self.buffers.remove(&id);
    }

    // ── Pipelines ────────────────────────────────────────────────────

    /// Registers the compiled pipeline for a program id.
    pub fn register_pipeline(&mut self, id: ProgramId, pipeline: wgpu::RenderPipeline) {
        self.pipelines.insert(id, pipeline);
    }

    #[must_use]
    pub fn pipeline(&self, id: ProgramId) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&id)
    }

    pub fn remove_pipeline(&mut self, id: ProgramId) {
        self.pipelines.remove(&id);
    }

    // ── Bind groups ──────────────────────────────────────────────────

    pub fn set_global_bind_group(&mut self, bind_group: wgpu::BindGroup) {
        self.next_bind_group_id += 1;
        self.global_bind_group = Some(RegisteredBindGroup {
            id: self.next_bind_group_id,
            bind_group,
        });
    }

    #[must_use]
    pub fn global_bind_group(&self) -> Option<&RegisteredBindGroup> {
        self.global_bind_group.as_ref()
    }

    pub fn set_material_bind_group(&mut self, handle: MaterialHandle, bind_group: wgpu::BindGroup) {
        self.next_bind_group_id += 1;
        self.material_bind_groups.insert(
            handle,
            RegisteredBindGroup {
                id: self.next_bind_group_id,
                bind_group,
            },
        );
    }

    #[must_use]
    pub fn material_bind_group(&self, handle: MaterialHandle) -> Option<&RegisteredBindGroup> {
        self.material_bind_groups.get(&handle)
    }

    pub fn remove_material_bind_group(&mut self, handle: MaterialHandle) {
        self.material_bind_groups.remove(&handle);
    }

    pub fn set_object_bind_group(&mut self, mesh: MeshKey, bind_group: wgpu::BindGroup) {
        self.next_bind_group_id += 1;
        self.object_bind_groups.insert(
            mesh,
            RegisteredBindGroup {
                id: self.next_bind_group_id,
                bind_group,
            },
        );
    }

    #[must_use]
    pub fn object_bind_group(&self, mesh: MeshKey) -> Option<&RegisteredBindGroup> {
        self.object_bind_groups.get(&mesh)
    }

    pub fn remove_object_bind_group(&mut self, mesh: MeshKey) {
        self.object_bind_groups.remove(&mesh);
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Drops every GPU handle. Call when the rendering context is
    /// destroyed; nothing here is tied to scene-graph lifetimes.
    pub fn dispose(&mut self) {
        self.buffers.clear();
        self.pipelines.clear();
        self.global_bind_group = None;
        self.material_bind_groups.clear();
        self.object_bind_groups.clear();
    }
}
