//! Per-frame orchestration.
//!
//! A frame is two phases:
//! - [`Renderer::prepare_frame`]: all CPU work — transform propagation,
//!   list build + sort, binding-state resolution, uniform refresh,
//!   model-uniform packing. No GPU access, fully testable headless.
//! - [`Renderer::upload`] + [`Renderer::execute`]: version-gated buffer
//!   sync, then the sorted draw submission through a state-tracking
//!   pass.
//!
//! The whole sequence is single-threaded and runs to completion; a
//! skipped frame is simply a frame where none of this is called.

use rustc_hash::FxHashSet;
use wgpu::PrimitiveTopology;

use crate::assets::{AssetServer, GeometryHandle, MaterialHandle};
use crate::errors::{AetherError, Result};
use crate::renderer::binding_states::{BindingKey, BindingStateCache};
use crate::renderer::extracted::build_render_list;
use crate::renderer::gpu::GpuResources;
use crate::renderer::info::RenderInfo;
use crate::renderer::material_state::{MaterialStateTracker, Viewport};
use crate::renderer::morph::MorphTracker;
use crate::renderer::program::{ProgramId, ProgramRegistry};
use crate::renderer::render_list::{RenderList, RenderRecord};
use crate::renderer::tracked_pass::TrackedRenderPass;
use crate::resources::buffer::{BufferRef, UniformBuffer};
use crate::resources::uniforms::{
    FrameUniforms, Mat3Uniform, ModelUniforms, MODEL_UNIFORM_STRIDE,
};
use crate::scene::{NodeKey, Scene};

/// The retained-mode frame renderer.
///
/// Owns every cross-frame cache: the binding-state cache, the program
/// registry, the GPU mirrors, and the per-material/per-mesh trackers.
/// All of it is scoped to one rendering context and torn down together
/// by [`dispose`](Self::dispose).
pub struct Renderer {
    pub programs: ProgramRegistry,
    pub gpu: GpuResources,

    binding_states: BindingStateCache,
    morphs: MorphTracker,
    material_states: MaterialStateTracker,
    info: RenderInfo,

    viewport: Viewport,
    time: f32,

    // Per-frame scratch, cleared and repopulated each frame.
    list: RenderList,
    model_uniforms: Vec<ModelUniforms>,
    pending_buffers: Vec<BufferRef>,
    pending_seen: FxHashSet<u64>,

    frame_uniforms: UniformBuffer<FrameUniforms>,
    model_buffer: BufferRef,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            programs: ProgramRegistry::new(),
            gpu: GpuResources::new(),
            binding_states: BindingStateCache::new(),
            morphs: MorphTracker::new(),
            material_states: MaterialStateTracker::new(),
            info: RenderInfo::default(),
            viewport: Viewport::default(),
            time: 0.0,
            list: RenderList::new(),
            model_uniforms: Vec::with_capacity(512),
            pending_buffers: Vec::with_capacity(256),
            pending_seen: FxHashSet::default(),
            frame_uniforms: UniformBuffer::new(FrameUniforms::default(), Some("FrameUniforms")),
            model_buffer: BufferRef::empty(
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                Some("ModelUniforms"),
            ),
        }
    }

    /// Viewport dimensions and pixel ratio, from the windowing layer.
    pub fn set_viewport(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        self.viewport = Viewport {
            width,
            height,
            pixel_ratio,
        };
    }

    /// Wall-clock seconds fed to the frame uniform block.
    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    #[must_use]
    pub fn info(&self) -> &RenderInfo {
        &self.info
    }

    #[must_use]
    pub fn binding_states(&self) -> &BindingStateCache {
        &self.binding_states
    }

    /// The sorted lists of the last prepared frame.
    #[must_use]
    pub fn render_list(&self) -> &RenderList {
        &self.list
    }

    /// Shared model-uniform buffer; object bind groups reference it
    /// with dynamic offsets.
    #[must_use]
    pub fn model_buffer(&self) -> &BufferRef {
        &self.model_buffer
    }

    #[must_use]
    pub fn frame_uniforms(&self) -> &BufferRef {
        self.frame_uniforms.handle()
    }

    // ── Phase 1: CPU prepare ─────────────────────────────────────────

    /// Runs the CPU side of the frame: scene update, list build, sort,
    /// binding/uniform refresh. Fails only when `camera_node` does not
    /// resolve to a camera; per-record problems degrade to skipped
    /// draws.
    pub fn prepare_frame(
        &mut self,
        scene: &mut Scene,
        camera_node: NodeKey,
        assets: &mut AssetServer,
    ) -> Result<()> {
        self.info.reset();
        self.info.frame += 1;

        // Transform propagation (and skeletons) must finish before any
        // world matrix is read below.
        scene.update();

        let camera = scene
            .camera_of(camera_node)
            .ok_or(AetherError::CameraNotFound(camera_node))?
            .clone();

        // Scene-wide uniform state.
        {
            let env = &scene.environment;
            let mut u = self.frame_uniforms.write();
            u.view_projection = camera.view_projection_matrix();
            u.view_matrix = camera.view_matrix();
            u.camera_position = camera.world_position();
            u.time = self.time;
            u.ambient_color = env.ambient_color;
            u.fog_enabled = u32::from(env.fog.is_some());
            if let Some(fog) = env.fog {
                u.fog_color = fog.color;
                u.fog_near = fog.near;
                u.fog_far = fog.far;
            }
            u.pixel_ratio = self.viewport.pixel_ratio;
            u.viewport_size = glam::Vec2::new(
                self.viewport.width as f32,
                self.viewport.height as f32,
            );
        }

        build_render_list(
            scene,
            &camera,
            assets,
            &self.programs,
            &mut self.list,
            &mut self.info,
        );
        self.list.sort();

        // Per-record resolution. The list is taken out of self so the
        // caches can be borrowed mutably alongside it.
        let mut list = std::mem::take(&mut self.list);
        self.model_uniforms.clear();
        self.pending_buffers.clear();
        self.pending_seen.clear();

        for record in list.opaque.iter_mut().chain(list.transparent.iter_mut()) {
            self.prepare_record(scene, assets, record);
        }

        self.list = list;

        if !self.model_uniforms.is_empty() {
            self.model_buffer.update(&self.model_uniforms);
        }
        let frame_handle = self.frame_uniforms.handle().clone();
        self.queue_upload(&frame_handle);
        let model_handle = self.model_buffer.clone();
        self.queue_upload(&model_handle);

        let (hits, misses) = self.binding_states.take_stats();
        self.info.binding_hits = hits as u32;
        self.info.binding_misses = misses as u32;

        Ok(())
    }

    fn prepare_record(
        &mut self,
        scene: &Scene,
        assets: &mut AssetServer,
        record: &mut RenderRecord,
    ) {
        // Handles were valid at build time; re-resolve defensively, a
        // skipped record is a visual glitch and not a frame failure.
        let Some(geometry) = assets.geometries.get(record.geometry) else {
            log::warn!("Geometry {:?} vanished during prepare", record.geometry);
            return;
        };
        let Some(program) = self.programs.get(record.program) else {
            log::warn!("Program {:?} vanished during prepare", record.program);
            return;
        };

        // Binding state: cache hit unless the geometry changed shape.
        let key = BindingKey {
            geometry: record.geometry,
            program: record.program,
            instanced: record.instance_count.is_some(),
        };
        let state = self.binding_states.get_or_create(key, geometry, program);

        let mut to_upload: Vec<BufferRef> =
            state.buffers.iter().map(|b| b.buffer.clone()).collect();
        if let Some((index_buffer, _, _)) = &state.index {
            to_upload.push(index_buffer.clone());
        }

        // Morph influences: select the strongest 8 for this mesh.
        if geometry.morph_target_count() > 0
            && let Some(mesh) = scene.meshes.get(record.mesh)
            && !mesh.morph_influences.is_empty()
        {
            let relative = geometry.morph_targets_relative;
            let morph = self
                .morphs
                .update(record.mesh, &mesh.morph_influences, relative);
            to_upload.push(morph.handle().clone());
        }

        // Skin matrices were recomputed by scene.update(); just queue
        // the storage buffer.
        if let Some(skeleton_key) = record.skeleton
            && let Some(skeleton) = scene.skeletons.get(skeleton_key)
        {
            to_upload.push(skeleton.buffer().clone());
        }

        // Material uniforms: at most once per material per frame.
        if let Some(material) = assets.materials.get_mut(record.material) {
            if self
                .material_states
                .refresh(self.info.frame, record.material, material, &self.viewport)
            {
                self.info.materials_refreshed += 1;
            }
            to_upload.push(material.uniform_buffer().clone());
        }

        // Model matrices into the shared dynamic buffer.
        let world = record.world_matrix;
        let world_inverse = world.inverse();
        record.dynamic_offset = self.model_uniforms.len() as u32 * MODEL_UNIFORM_STRIDE;
        self.model_uniforms.push(ModelUniforms {
            world_matrix: world,
            world_matrix_inverse: world_inverse,
            normal_matrix: Mat3Uniform::from_mat4(world_inverse.transpose()),
            ..Default::default()
        });

        for buffer in to_upload {
            self.queue_upload(&buffer);
        }
    }

    fn queue_upload(&mut self, buffer: &BufferRef) {
        if self.pending_seen.insert(buffer.id()) {
            self.pending_buffers.push(buffer.clone());
        }
    }

    // ── Phase 2: GPU sync + submission ───────────────────────────────

    /// Syncs every buffer the prepared frame references. Unchanged
    /// buffers cost a version compare; changed ones are rewritten,
    /// resized ones reallocated.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for buffer in &self.pending_buffers {
            self.gpu.sync_buffer(device, queue, buffer);
        }
    }

    /// Issues the sorted draws into `pass`. Records are drawn strictly
    /// in list order; redundant pipeline/bind/buffer changes are
    /// elided by the tracked pass.
    pub fn execute<'a>(&'a mut self, pass: wgpu::RenderPass<'a>) {
        let gpu = &self.gpu;
        let binding_states = &self.binding_states;
        let list = &self.list;
        let info = &mut self.info;

        let mut tracked = TrackedRenderPass::new(pass);

        if let Some(global) = gpu.global_bind_group() {
            tracked.set_bind_group(0, global.id, &global.bind_group, &[]);
        }

        for record in list.opaque.iter().chain(list.transparent.iter()) {
            Self::draw_record(gpu, binding_states, info, &mut tracked, record);
        }
    }

    fn draw_record<'a>(
        gpu: &'a GpuResources,
        binding_states: &'a BindingStateCache,
        info: &mut RenderInfo,
        tracked: &mut TrackedRenderPass<'a>,
        record: &RenderRecord,
    ) {
        let Some(pipeline) = gpu.pipeline(record.program) else {
            log::warn!("No pipeline registered for {:?}; skipping draw", record.program);
            return;
        };
        tracked.set_pipeline(record.program, pipeline);

        if let Some(material) = gpu.material_bind_group(record.material) {
            tracked.set_bind_group(1, material.id, &material.bind_group, &[]);
        }
        if let Some(object) = gpu.object_bind_group(record.mesh) {
            tracked.set_bind_group(2, object.id, &object.bind_group, &[record.dynamic_offset]);
        }

        let key = BindingKey {
            geometry: record.geometry,
            program: record.program,
            instanced: record.instance_count.is_some(),
        };
        let Some(state) = binding_states.get(&key) else {
            return;
        };

        for (slot, binding) in state.buffers.iter().enumerate() {
            let Some(buffer) = gpu.buffer(binding.buffer.id()) else {
                log::warn!("Vertex buffer {} not uploaded; skipping draw", binding.buffer.id());
                return;
            };
            tracked.set_vertex_buffer(slot as u32, binding.buffer.id(), buffer.slice(..));
        }

        let instances = 0..record.instance_count.unwrap_or(1);
        let range = record.draw_range.clone();
        let element_count = range.end.saturating_sub(range.start);

        if record.indexed {
            let Some((index_ref, format, _)) = &state.index else {
                return;
            };
            let Some(index_buffer) = gpu.buffer(index_ref.id()) else {
                log::warn!("Index buffer {} not uploaded; skipping draw", index_ref.id());
                return;
            };
            tracked.set_index_buffer(index_ref.id(), index_buffer.slice(..), *format);
            tracked.draw_indexed(range, 0, instances.clone());
        } else {
            tracked.draw(range, instances.clone());
        }

        info.draw_calls += 1;
        let instance_count = instances.end;
        info.vertices += element_count * instance_count;
        if record.topology == PrimitiveTopology::TriangleList {
            info.triangles += element_count / 3 * instance_count;
        }
    }

    // ── Convenience entry point ──────────────────────────────────────

    /// Full pipeline: prepare, upload, execute.
    pub fn render_frame(
        &mut self,
        scene: &mut Scene,
        camera_node: NodeKey,
        assets: &mut AssetServer,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: wgpu::RenderPass<'_>,
    ) -> Result<()> {
        self.prepare_frame(scene, camera_node, assets)?;
        self.upload(device, queue);
        self.execute(pass);
        Ok(())
    }

    // ── Disposal ─────────────────────────────────────────────────────

    /// Removes a geometry asset and invalidates every cache built on
    /// it. Skipping this on disposal is a correctness bug: the binding
    /// cache must never outlive its referents.
    pub fn dispose_geometry(&mut self, assets: &mut AssetServer, handle: GeometryHandle) {
        let Some(geometry) = assets.geometries.remove(handle) else {
            return;
        };
        self.binding_states.remove_geometry(handle);
        for attr in geometry.attributes().values() {
            self.gpu.remove_buffer(attr.buffer.id());
        }
        if let Some(index) = geometry.index() {
            self.gpu.remove_buffer(index.buffer.id());
        }
    }

    /// Removes a material asset and its renderer-side state.
    pub fn dispose_material(&mut self, assets: &mut AssetServer, handle: MaterialHandle) {
        let Some(material) = assets.materials.remove(handle) else {
            return;
        };
        self.material_states.remove(handle);
        self.gpu.remove_material_bind_group(handle);
        self.gpu.remove_buffer(material.uniform_buffer().id());
    }

    /// Unregisters a program and invalidates binding states and the
    /// pipeline built against it.
    pub fn dispose_program(&mut self, id: ProgramId) {
        self.programs.remove(id);
        self.binding_states.remove_program(id);
        self.gpu.remove_pipeline(id);
    }

    /// Context teardown: drops every cross-frame cache and GPU handle.
    pub fn dispose(&mut self) {
        self.binding_states.clear();
        self.morphs.clear();
        self.material_states.clear();
        self.gpu.dispose();
        self.list.clear();
    }
}
