//! Scene graph: nodes, transforms, cameras, skeletons.

pub mod camera;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use camera::{Camera, Frustum};
pub use node::Node;
pub use scene::{Environment, Fog, Scene};
pub use skeleton::{BindMode, Skeleton, SkinBinding};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeKey;
    pub struct MeshKey;
    pub struct CameraKey;
    pub struct SkeletonKey;
}
