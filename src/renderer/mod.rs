//! The per-frame render pipeline.
//!
//! Transform propagation feeds [`extracted::build_render_list`], the
//! sorted [`render_list::RenderList`] feeds [`frame::Renderer`], and
//! the cross-frame caches ([`binding_states`], [`gpu`]) keep the GPU
//! state churn down to what actually changed.

pub mod binding_states;
pub mod extracted;
pub mod frame;
pub mod gpu;
pub mod info;
pub mod material_state;
pub mod morph;
pub mod program;
pub mod render_list;
pub mod tracked_pass;

pub use binding_states::{BindingKey, BindingState, BindingStateCache};
pub use extracted::{build_render_list, geometry_features};
pub use frame::Renderer;
pub use gpu::GpuResources;
pub use info::RenderInfo;
pub use material_state::{MaterialStateTracker, Viewport};
pub use morph::{MorphTracker, MAX_MORPH_TARGETS};
pub use program::{GeometryFeatures, ProgramId, ProgramKey, ProgramRegistry, ShaderProgram};
pub use render_list::{RenderList, RenderRecord};
pub use tracked_pass::TrackedRenderPass;
