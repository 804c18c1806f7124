use std::borrow::Cow;

use glam::{Affine3A, Mat4, Vec3, Vec4};
use uuid::Uuid;

/// Camera component.
///
/// Projection parameters are public; the view/view-projection matrices
/// and the frustum are caches owned by the transform pass (the camera
/// rides a scene node and is refreshed whenever that node's world
/// matrix changes).
#[derive(Debug, Clone)]
pub struct Camera {
    pub uuid: Uuid,
    pub name: Cow<'static, str>,

    pub projection: Projection,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub ortho_size: f32,

    pub(crate) world_matrix: Affine3A,
    pub(crate) view_matrix: Mat4,
    pub(crate) projection_matrix: Mat4,
    pub(crate) view_projection_matrix: Mat4,
    pub(crate) frustum: Frustum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Perspective,
    Orthographic,
}

impl Camera {
    /// `fov` in degrees.
    #[must_use]
    pub fn new_perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            uuid: Uuid::new_v4(),
            name: Cow::Borrowed("Camera"),
            projection: Projection::Perspective,
            fov: fov.to_radians(),
            aspect,
            near,
            far,
            ortho_size: 10.0,

            world_matrix: Affine3A::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_projection_matrix: Mat4::IDENTITY,
            frustum: Frustum::default(),
        };
        cam.update_projection_matrix();
        cam
    }

    #[must_use]
    pub fn new_orthographic(size: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            projection: Projection::Orthographic,
            ortho_size: size,
            ..Self::new_perspective(50.0, aspect, near, far)
        };
        cam.update_projection_matrix();
        cam
    }

    /// Call after mutating any projection parameter.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = match self.projection {
            Projection::Perspective => {
                Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
            }
            Projection::Orthographic => {
                let w = self.ortho_size * self.aspect;
                let h = self.ortho_size;
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        };

        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    /// Refreshes view, view-projection and frustum from the owning
    /// node's world matrix. Called by the transform pass.
    pub fn update_view_projection(&mut self, world_transform: &Affine3A) {
        self.world_matrix = *world_transform;
        self.view_matrix = Mat4::from(*world_transform).inverse();
        self.view_projection_matrix = self.projection_matrix * self.view_matrix;
        self.frustum = Frustum::from_matrix(self.view_projection_matrix);
    }

    #[inline]
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    #[inline]
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.view_projection_matrix
    }

    #[inline]
    #[must_use]
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.translation.into()
    }

    /// The direction the camera looks down (-Z of its world basis).
    /// View-space depth is signed distance along this vector.
    #[must_use]
    pub fn view_direction(&self) -> Vec3 {
        self.world_matrix.transform_vector3(-Vec3::Z).normalize()
    }
}

/// View frustum as six planes, Gribb-Hartmann extraction from the
/// view-projection matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    #[must_use]
    pub fn from_matrix(m: Mat4) -> Self {
        let rows = [m.row(0), m.row(1), m.row(2), m.row(3)];

        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[2],           // near ([0, 1] clip range)
            rows[3] - rows[2], // far
        ];

        for plane in &mut planes {
            let length = Vec3::new(plane.x, plane.y, plane.z).length();
            if length > 0.0 {
                *plane /= length;
            }
        }

        Self { planes }
    }

    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        for plane in &self.planes {
            let dist = plane.x * center.x + plane.y * center.y + plane.z * center.z + plane.w;
            if dist < -radius {
                return false;
            }
        }
        true
    }
}
