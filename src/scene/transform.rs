use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Transform component.
///
/// Wraps a node's position, rotation and scale (TRS) together with the
/// cached local and world matrices and the dirty check that keeps local
/// matrix recomputation lazy.
///
/// Two escape hatches cover the non-TRS cases:
/// - `matrix_auto_update = false` makes the local matrix authoritative;
///   TRS fields are ignored until it is turned back on.
/// - `world_override` replaces the `parent_world * local` composition
///   entirely (attached bones and similar externally driven nodes).
#[derive(Debug, Clone)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// When false, `local_matrix` is taken as-is instead of being
    /// recomposed from TRS.
    pub matrix_auto_update: bool,

    /// Direct world-matrix override, bypassing parent composition.
    pub world_override: Option<Affine3A>,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,

    // Shadow state for the dirty check.
    last_position: Vec3,
    last_rotation: Quat,
    last_scale: Vec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            matrix_auto_update: true,
            world_override: None,

            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,

            last_position: Vec3::ZERO,
            last_rotation: Quat::IDENTITY,
            last_scale: Vec3::ONE,
            force_update: true,
        }
    }

    /// Recomputes the local matrix if the TRS fields changed since the
    /// last call. Returns whether anything changed.
    pub fn update_local_matrix(&mut self) -> bool {
        if !self.matrix_auto_update {
            // Local matrix is authoritative; only an explicit mark_dirty
            // (or apply_local_matrix) counts as a change.
            let changed = self.force_update;
            self.force_update = false;
            return changed;
        }

        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix =
                Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    #[must_use]
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.world_matrix
    }

    /// World matrix as a `Mat4`, the form uploaded to the GPU.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> Mat4 {
        Mat4::from(self.world_matrix)
    }

    /// Written by the transform system after composition; not meant for
    /// application code.
    pub(crate) fn set_world_matrix(&mut self, mat: Affine3A) {
        self.world_matrix = mat;
    }

    /// Sets the local matrix directly and decomposes it back into TRS.
    /// Shear is lost in the decomposition.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        self.local_matrix = mat;

        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;

        self.last_scale = scale;
        self.last_rotation = rotation;
        self.last_position = translation;

        self.mark_dirty();
    }

    /// Orients the transform so -Z points at `target`. `target` and
    /// `up` are in the parent's coordinate space. Degenerate cases
    /// (collinear forward/up) leave the rotation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();

        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.rotation = Quat::from_mat3(&rot_mat);
    }

    /// Forces the next update to recompute, regardless of shadow state.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
