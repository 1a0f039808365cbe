pub mod bindings;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod schema;
pub mod shader;
pub mod shadow;
pub mod texture;
pub mod vertex_layout;

pub use bindings::{BindingLayouts, BindingPlan, ResourceSlot};
pub use error::RenderError;
pub use mesh::{GpuMesh, ModelBinding};
pub use pipeline::ShadingPipelines;
pub use renderer::{DrawItem, ShadingRenderer};
pub use schema::{CameraUniform, LightUniform, ModelUniform, Uniform, SCHEMA_VERSION};
pub use shadow::ShadowMap;
pub use texture::{AtlasTexture, DepthTarget};
