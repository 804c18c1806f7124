//! World-matrix propagation over the scene graph.
//!
//! Decoupled from `Scene` so it only borrows the node arena and the
//! camera pool, which keeps the per-frame update free of borrow
//! conflicts.
//!
//! Ordering contract: a node's world matrix is written only after its
//! parent's; sibling order is unspecified. Local transforms are never
//! mutated here.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::camera::Camera;
use crate::scene::node::Node;
use crate::scene::{CameraKey, NodeKey};

/// Updates world matrices for every node reachable from `roots`.
///
/// Iterative pre-order traversal with an explicit stack; deep
/// hierarchies cannot overflow the call stack. Cycles cannot be formed
/// through [`Scene::attach`](crate::scene::Scene::attach), but debug
/// builds still carry a visited check so a corrupted graph fails loudly
/// instead of looping forever.
pub fn update_hierarchy(
    nodes: &mut SlotMap<NodeKey, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    roots: &[NodeKey],
) {
    // Stack entries: (node, parent world matrix, parent changed).
    let mut stack: Vec<(NodeKey, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    #[cfg(debug_assertions)]
    let mut visited: rustc_hash::FxHashSet<NodeKey> = rustc_hash::FxHashSet::default();

    while let Some((node_key, parent_world, parent_changed)) = stack.pop() {
        #[cfg(debug_assertions)]
        if !visited.insert(node_key) {
            log::error!("Cycle detected in scene graph at {node_key:?}; aborting traversal");
            continue;
        }

        let Some(node) = nodes.get_mut(node_key) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let overridden = node.transform.world_override.is_some();
        let world_needs_update = local_changed || parent_changed || overridden;

        if world_needs_update {
            let new_world = match node.transform.world_override {
                Some(target) => target,
                None => parent_world * *node.transform.local_matrix(),
            };
            node.transform.set_world_matrix(new_world);

            // A camera rides its node: refresh view/frustum in the same
            // pass so list building never sees a stale camera.
            if let Some(camera_key) = node.camera
                && let Some(camera) = cameras.get_mut(camera_key)
            {
                camera.update_view_projection(&new_world);
            }
        }

        let current_world = node.transform.world_matrix;
        let child_count = node.children.len();

        for i in (0..child_count).rev() {
            if let Some(node) = nodes.get(node_key)
                && let Some(&child) = node.children.get(i)
            {
                stack.push((child, current_world, world_needs_update));
            }
        }
    }
}

/// Updates the subtree rooted at `root`, seeding from the parent's
/// current world matrix. For targeted refreshes between full passes.
pub fn update_subtree(
    nodes: &mut SlotMap<NodeKey, Node>,
    cameras: &mut SlotMap<CameraKey, Camera>,
    root: NodeKey,
) {
    let Some(node) = nodes.get(root) else {
        return;
    };

    let parent_world = node
        .parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix);

    let mut stack: Vec<(NodeKey, Affine3A, bool)> = vec![(root, parent_world, true)];

    while let Some((node_key, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(node_key) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_needs_update =
            local_changed || parent_changed || node.transform.world_override.is_some();

        if world_needs_update {
            let new_world = match node.transform.world_override {
                Some(target) => target,
                None => parent_world * *node.transform.local_matrix(),
            };
            node.transform.set_world_matrix(new_world);

            if let Some(camera_key) = node.camera
                && let Some(camera) = cameras.get_mut(camera_key)
            {
                camera.update_view_projection(&new_world);
            }
        }

        let current_world = node.transform.world_matrix;
        let child_count = node.children.len();
        for i in (0..child_count).rev() {
            if let Some(node) = nodes.get(node_key)
                && let Some(&child) = node.children.get(i)
            {
                stack.push((child, current_world, world_needs_update));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn child_inherits_parent_translation() {
        let mut nodes: SlotMap<NodeKey, Node> = SlotMap::with_key();
        let mut cameras: SlotMap<CameraKey, Camera> = SlotMap::with_key();

        let mut parent = Node::new();
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_key = nodes.insert(parent);

        let mut child = Node::new();
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        child.parent = Some(parent_key);
        let child_key = nodes.insert(child);

        nodes[parent_key].children.push(child_key);

        update_hierarchy(&mut nodes, &mut cameras, &[parent_key]);

        let child_world: Vec3 = nodes[child_key].transform.world_matrix.translation.into();
        assert!((child_world.x - 1.0).abs() < 1e-5);
        assert!((child_world.y - 1.0).abs() < 1e-5);
    }
}
