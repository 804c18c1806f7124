use smallvec::SmallVec;

use crate::assets::{GeometryHandle, MaterialHandle};

/// Drawable component attached to a scene node.
///
/// Geometry and materials are shared, reference-counted assets; many
/// meshes may point at the same handles and see each other's edits on
/// the next frame. `materials` maps 1:1 onto the geometry's group
/// `material_index` values; a single entry draws the whole geometry.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub materials: SmallVec<[MaterialHandle; 1]>,

    pub visible: bool,
    /// Skip the draw when the bounding sphere leaves the frustum.
    pub frustum_culled: bool,

    /// `Some(n)` draws `n` instances using the geometry's instance-rate
    /// channels.
    pub instance_count: Option<u32>,

    /// Morph-target weights, indexed like the geometry's target list.
    pub morph_influences: Vec<f32>,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            geometry,
            materials: SmallVec::from_elem(material, 1),
            visible: true,
            frustum_culled: true,
            instance_count: None,
            morph_influences: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_materials(geometry: GeometryHandle, materials: &[MaterialHandle]) -> Self {
        Self {
            materials: SmallVec::from_slice(materials),
            ..Self::new(geometry, materials.first().copied().unwrap_or_default())
        }
    }

    #[must_use]
    pub fn instanced(mut self, count: u32) -> Self {
        self.instance_count = Some(count);
        self
    }
}
