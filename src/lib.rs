#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod assets;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use assets::{AssetServer, GeometryHandle, MaterialHandle, TextureHandle};
pub use errors::{AetherError, Result};
pub use renderer::{ProgramId, ProgramKey, ProgramRegistry, RenderInfo, Renderer};
pub use resources::{
    Attribute, Geometry, Material, MaterialKind, Mesh, Side,
};
pub use scene::{Camera, Node, NodeKey, Scene, Transform};
