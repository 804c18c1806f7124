use glam::{Affine3A, Mat4};
use slotmap::SlotMap;
use uuid::Uuid;

use crate::resources::buffer::BufferRef;
use crate::scene::node::Node;
use crate::scene::{NodeKey, SkeletonKey};

/// How a skinned mesh relates to its skeleton root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Bones follow the mesh node; the root inverse is recomputed from
    /// the node's world matrix each frame. The common case.
    Attached,
    /// Bones are independent of the mesh node; the inverse captured at
    /// bind time is used as-is.
    Detached,
}

/// Per-node skinning component linking a mesh node to a skeleton.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
    pub bind_mode: BindMode,
    /// World-inverse snapshot taken at bind time (Detached mode).
    pub bind_matrix_inv: Affine3A,
}

impl SkinBinding {
    #[must_use]
    pub fn attached(skeleton: SkeletonKey) -> Self {
        Self {
            skeleton,
            bind_mode: BindMode::Attached,
            bind_matrix_inv: Affine3A::IDENTITY,
        }
    }
}

/// An ordered bone set with its inverse bind matrices.
///
/// `bones[i]` pairs with `inverse_bind_matrices[i]`; the computed joint
/// matrices are flattened into a storage buffer bound alongside the
/// material uniforms.
#[derive(Debug)]
pub struct Skeleton {
    pub uuid: Uuid,
    pub bones: Vec<NodeKey>,
    inverse_bind_matrices: Vec<Affine3A>,

    joint_matrices: Vec<Mat4>,
    buffer: BufferRef,
}

impl Skeleton {
    #[must_use]
    pub fn new(bones: Vec<NodeKey>, inverse_bind_matrices: Vec<Affine3A>) -> Self {
        let count = bones.len();
        debug_assert_eq!(count, inverse_bind_matrices.len());

        let joint_matrices = vec![Mat4::IDENTITY; count];
        let buffer = BufferRef::new(
            &joint_matrices,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            Some("SkeletonJointMatrices"),
        );

        Self {
            uuid: Uuid::new_v4(),
            bones,
            inverse_bind_matrices,
            joint_matrices,
            buffer,
        }
    }

    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Storage buffer holding the flattened joint matrices.
    #[must_use]
    pub fn buffer(&self) -> &BufferRef {
        &self.buffer
    }

    /// Recomputes `joint[i] = root_inv * bone_world * inverse_bind`.
    ///
    /// Bone world matrices come from the transform pass, so this runs
    /// after world-matrix propagation. Missing bone nodes keep their
    /// previous matrix.
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeKey, Node>,
        root_matrix_inv: Affine3A,
    ) {
        let mut changed = false;

        for (i, &bone_key) in self.bones.iter().enumerate() {
            let Some(bone) = nodes.get(bone_key) else {
                continue;
            };
            let ibm = self.inverse_bind_matrices[i];
            let joint: Mat4 = (root_matrix_inv * bone.transform.world_matrix * ibm).into();

            if self.joint_matrices[i] != joint {
                self.joint_matrices[i] = joint;
                changed = true;
            }
        }

        if changed {
            self.buffer.update(&self.joint_matrices);
        }
    }
}
