use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::Pod;
use parking_lot::{RwLock, RwLockReadGuard};

// Global buffer id generator. Ids are process-wide and never reused, so
// renderer-side caches can key on them safely.
static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// CPU-side data buffer shared between resources and the renderer.
///
/// Holds the byte payload, the intended GPU usage, and a version counter
/// bumped on every content change. The GPU layer mirrors these buffers
/// lazily: reallocating when the size changes, rewriting in place when
/// only the version moved.
#[derive(Debug)]
pub struct DataBuffer {
    id: u64,
    label: String,
    version: AtomicU64,
    data: RwLock<Vec<u8>>,
    usage: wgpu::BufferUsages,
}

/// Cheap shared handle to a [`DataBuffer`].
///
/// Equality and hashing go through the buffer id, so a `BufferRef` can be
/// used directly as a cache key.
#[derive(Debug, Clone)]
pub struct BufferRef(Arc<DataBuffer>);

impl PartialEq for BufferRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for BufferRef {}

impl std::hash::Hash for BufferRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl BufferRef {
    #[must_use]
    pub fn new<T: Pod>(data: &[T], usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self::from_bytes(bytemuck::cast_slice(data), usage, label)
    }

    #[must_use]
    pub fn from_bytes(data: &[u8], usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self(Arc::new(DataBuffer {
            id: NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.unwrap_or("Buffer").to_string(),
            version: AtomicU64::new(0),
            data: RwLock::new(data.to_vec()),
            usage,
        }))
    }

    #[must_use]
    pub fn empty(usage: wgpu::BufferUsages, label: Option<&str>) -> Self {
        Self::from_bytes(&[], usage, label)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Lock-free version read; the hot path for dirty checks.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.version.load(Ordering::Relaxed)
    }

    #[inline]
    #[must_use]
    pub fn usage(&self) -> wgpu::BufferUsages {
        self.0.usage
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0.label
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.data.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.data.read().is_empty()
    }

    /// Replaces the whole payload and bumps the version.
    pub fn update<T: Pod>(&self, data: &[T]) {
        self.update_bytes(bytemuck::cast_slice(data));
    }

    pub fn update_bytes(&self, bytes: &[u8]) {
        {
            let mut inner = self.0.data.write();
            inner.clear();
            inner.extend_from_slice(bytes);
        }
        self.0.version.fetch_add(1, Ordering::Relaxed);
    }

    /// Overwrites a region in place. Out-of-range writes are ignored.
    pub fn update_region<T: Pod>(&self, offset_bytes: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let mut inner = self.0.data.write();
        let end = offset_bytes + bytes.len();
        if end <= inner.len() {
            inner[offset_bytes..end].copy_from_slice(bytes);
            drop(inner);
            self.0.version.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[must_use]
    pub fn read_data(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.0.data.read()
    }
}

/// Typed uniform block backed by a [`BufferRef`].
///
/// Reads are free; writes go through a guard that compares bytes on drop
/// and only bumps the buffer version when the value actually changed.
/// This is what makes uniform refresh idempotent: re-writing the same
/// state never schedules an upload.
#[derive(Debug)]
pub struct UniformBuffer<T: Pod> {
    handle: BufferRef,
    data: T,
}

impl<T: Pod> UniformBuffer<T> {
    #[must_use]
    pub fn new(data: T, label: Option<&str>) -> Self {
        let handle = BufferRef::from_bytes(
            bytemuck::bytes_of(&data),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label,
        );
        Self { handle, data }
    }

    #[inline]
    #[must_use]
    pub fn read(&self) -> &T {
        &self.data
    }

    #[must_use]
    pub fn write(&mut self) -> UniformGuard<'_, T> {
        let before = self.data;
        UniformGuard { owner: self, before }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> &BufferRef {
        &self.handle
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.handle.version()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.data)
    }
}

/// Write guard for [`UniformBuffer`]; syncs the backing buffer on drop.
pub struct UniformGuard<'a, T: Pod> {
    owner: &'a mut UniformBuffer<T>,
    before: T,
}

impl<T: Pod> std::ops::Deref for UniformGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.owner.data
    }
}

impl<T: Pod> std::ops::DerefMut for UniformGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.owner.data
    }
}

impl<T: Pod> Drop for UniformGuard<'_, T> {
    fn drop(&mut self) {
        if bytemuck::bytes_of(&self.before) != bytemuck::bytes_of(&self.owner.data) {
            self.owner
                .handle
                .update_bytes(bytemuck::bytes_of(&self.owner.data));
        }
    }
}

/// Untyped uniform block for custom-shader materials.
///
/// The caller owns the layout; we only track bytes and versions.
#[derive(Debug)]
pub struct RawUniformBuffer {
    handle: BufferRef,
    data: Vec<u8>,
}

impl RawUniformBuffer {
    #[must_use]
    pub fn new(data: &[u8], label: Option<&str>) -> Self {
        let handle = BufferRef::from_bytes(
            data,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            label,
        );
        Self {
            handle,
            data: data.to_vec(),
        }
    }

    /// Replaces the payload; no-op when the bytes are identical.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.data.as_slice() != bytes {
            self.data.clear();
            self.data.extend_from_slice(bytes);
            self.handle.update_bytes(bytes);
        }
    }

    #[inline]
    #[must_use]
    pub fn handle(&self) -> &BufferRef {
        &self.handle
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.handle.version()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
