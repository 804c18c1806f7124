use std::sync::atomic::{AtomicU32, Ordering};

use glam::Affine3A;

use crate::scene::transform::Transform;
use crate::scene::{CameraKey, MeshKey, NodeKey};
use crate::scene::skeleton::SkinBinding;

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// A scene node: hierarchy, transform, and component handles.
///
/// Ownership follows the arena model: `children` is the only owning
/// edge (removing a node removes its subtree), `parent` is a non-owning
/// back reference. Heavy components (mesh, camera) live in the scene's
/// component maps and are addressed by key, which keeps nodes small for
/// the per-frame traversals.
#[derive(Debug, Clone)]
pub struct Node {
    id: u32,

    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    /// Hot data touched by every transform pass.
    pub transform: Transform,

    /// Invisible nodes prune their whole subtree from rendering.
    pub visible: bool,

    /// Draw-order hint. On a mesh node it overrides depth ordering for
    /// that draw; on a plain node it becomes the group-order bucket
    /// inherited by the subtree.
    pub render_order: i32,

    pub mesh: Option<MeshKey>,
    pub camera: Option<CameraKey>,
    pub skin: Option<SkinBinding>,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            render_order: 0,
            mesh: None,
            camera: None,
            skin: None,
        }
    }

    /// Monotonically increasing identity; the final sort tie-break.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
