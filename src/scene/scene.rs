use std::sync::atomic::{AtomicU32, Ordering};

use glam::{Vec3, Vec4};
use slotmap::SlotMap;

use crate::errors::{AetherError, Result};
use crate::resources::mesh::Mesh;
use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::skeleton::{BindMode, Skeleton};
use crate::scene::transform_system;
use crate::scene::{CameraKey, MeshKey, NodeKey, SkeletonKey};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Linear fog parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

/// Scene-wide lighting state folded into the per-frame uniform block.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub ambient_color: Vec3,
    pub fog: Option<Fog>,
}

/// The scene graph: a node arena plus component pools.
///
/// Pure data layer. Nodes own their children (removing a node removes
/// the subtree); meshes reference shared geometry/material assets by
/// handle. The renderer reads this structure once per frame and never
/// mutates it beyond the cached world matrices.
pub struct Scene {
    pub id: u32,

    pub nodes: SlotMap<NodeKey, Node>,
    pub root_nodes: Vec<NodeKey>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub cameras: SlotMap<CameraKey, Camera>,
    pub skeletons: SlotMap<SkeletonKey, Skeleton>,

    pub environment: Environment,
    pub background: Option<Vec4>,

    pub active_camera: Option<NodeKey>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            skeletons: SlotMap::with_key(),
            environment: Environment::default(),
            background: Some(Vec4::new(0.0, 0.0, 0.0, 1.0)),
            active_camera: None,
        }
    }

    // ── Node management ──────────────────────────────────────────────

    /// Inserts a detached node as a root.
    pub fn add_node(&mut self, node: Node) -> NodeKey {
        let key = self.nodes.insert(node);
        self.root_nodes.push(key);
        key
    }

    /// Inserts a node as a child of `parent`.
    pub fn add_child(&mut self, node: Node, parent: NodeKey) -> NodeKey {
        let key = self.nodes.insert(node);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(key);
            self.nodes[key].parent = Some(parent);
        } else {
            log::warn!("add_child: parent {parent:?} not found, inserting as root");
            self.root_nodes.push(key);
        }

        key
    }

    /// Reparents `child` under `parent`, detaching it from its current
    /// parent or the root list first.
    ///
    /// Refuses attachments that would make a node its own ancestor.
    pub fn attach(&mut self, child: NodeKey, parent: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(child) {
            return Err(AetherError::NodeNotFound(child));
        }
        if !self.nodes.contains_key(parent) {
            return Err(AetherError::NodeNotFound(parent));
        }
        if child == parent || self.is_ancestor(child, parent) {
            log::warn!("attach: {child:?} -> {parent:?} would create a cycle, refusing");
            return Err(AetherError::CyclicGraph { child, parent });
        }

        self.detach_internal(child);

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.transform.mark_dirty();

        Ok(())
    }

    /// Detaches `child` from its parent, making it a root.
    pub fn detach(&mut self, child: NodeKey) {
        if !self.nodes.contains_key(child) {
            return;
        }
        self.detach_internal(child);
        self.root_nodes.push(child);
        let node = &mut self.nodes[child];
        node.parent = None;
        node.transform.mark_dirty();
    }

    /// True when `ancestor` appears on `node`'s parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.nodes.get(key).and_then(|n| n.parent);
        }
        false
    }

    // Unlinks from the old parent's child list or the root list; does
    // not touch the node's own parent field.
    fn detach_internal(&mut self, child: NodeKey) {
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(parent) = self.nodes.get_mut(p)
                && let Some(i) = parent.children.iter().position(|&k| k == child)
            {
                parent.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&k| k == child) {
            self.root_nodes.remove(i);
        }
    }

    /// Removes a node and its whole subtree, along with the component
    /// entries the removed nodes owned. Shared geometry/material assets
    /// are untouched; they outlive any single holder.
    pub fn remove_node(&mut self, key: NodeKey) {
        let children = match self.nodes.get(key) {
            Some(node) => node.children.clone(),
            None => return,
        };

        for child in children {
            self.remove_node(child);
        }

        self.detach_internal(key);

        if let Some(node) = self.nodes.get(key) {
            if let Some(mesh) = node.mesh {
                self.meshes.remove(mesh);
            }
            if let Some(camera) = node.camera {
                self.cameras.remove(camera);
            }
        }

        self.nodes.remove(key);
    }

    #[must_use]
    pub fn get_node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    // ── Component helpers ────────────────────────────────────────────

    /// Creates a root node carrying `mesh`.
    pub fn add_mesh(&mut self, mesh: Mesh) -> NodeKey {
        let mut node = Node::new();
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_node(node)
    }

    pub fn add_mesh_to_parent(&mut self, mesh: Mesh, parent: NodeKey) -> NodeKey {
        let mut node = Node::new();
        node.mesh = Some(self.meshes.insert(mesh));
        self.add_child(node, parent)
    }

    /// Creates a root node carrying `camera` and makes it the active
    /// camera if none is set.
    pub fn add_camera(&mut self, camera: Camera) -> NodeKey {
        let mut node = Node::new();
        node.camera = Some(self.cameras.insert(camera));
        let key = self.add_node(node);
        if self.active_camera.is_none() {
            self.active_camera = Some(key);
        }
        key
    }

    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> SkeletonKey {
        self.skeletons.insert(skeleton)
    }

    /// Sets the mesh's geometry/material handles through the node.
    pub fn mesh_of(&mut self, node: NodeKey) -> Option<&mut Mesh> {
        let mesh_key = self.nodes.get(node)?.mesh?;
        self.meshes.get_mut(mesh_key)
    }

    #[must_use]
    pub fn camera_of(&self, node: NodeKey) -> Option<&Camera> {
        let camera_key = self.nodes.get(node)?.camera?;
        self.cameras.get(camera_key)
    }

    pub fn camera_of_mut(&mut self, node: NodeKey) -> Option<&mut Camera> {
        let camera_key = self.nodes.get(node)?.camera?;
        self.cameras.get_mut(camera_key)
    }

    // ── Per-frame update ─────────────────────────────────────────────

    /// Runs the CPU-side scene update: transform propagation followed
    /// by skeleton joint matrices. Must complete before list building
    /// reads any world matrix.
    pub fn update(&mut self) {
        self.update_matrix_world();
        self.update_skeletons();
    }

    /// Recomputes every node's world matrix, top-down.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &mut self.cameras, &self.root_nodes);
    }

    /// Recomputes world matrices for one subtree only.
    pub fn update_subtree(&mut self, root: NodeKey) {
        transform_system::update_subtree(&mut self.nodes, &mut self.cameras, root);
    }

    /// Recomputes joint matrices for every skinned node.
    pub fn update_skeletons(&mut self) {
        // Collect (skeleton, root inverse) first; mutating skeletons
        // while iterating nodes would alias the arena borrow.
        let mut tasks = Vec::new();

        for (_, node) in &self.nodes {
            if let Some(binding) = &node.skin {
                let root_inv = match binding.bind_mode {
                    BindMode::Attached => node.transform.world_matrix.inverse(),
                    BindMode::Detached => binding.bind_matrix_inv,
                };
                tasks.push((binding.skeleton, root_inv));
            }
        }

        let nodes = &self.nodes;
        for (skeleton_key, root_inv) in tasks {
            if let Some(skeleton) = self.skeletons.get_mut(skeleton_key) {
                skeleton.compute_joint_matrices(nodes, root_inv);
            }
        }
    }
}
