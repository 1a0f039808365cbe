pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod face;
pub mod features;
pub mod mesh;
pub mod shading;
pub mod transform;
pub mod types;
pub mod vertex;

pub use color::quantize_color;
pub use config::ShadingConfig;
pub use error::ShadeError;
pub use face::{Face, ALL_FACES, FACE_NORMALS};
pub use features::{LightModel, ShaderFeatures, VertexInput};
pub use mesh::{build_chunk_mesh, BlockGrid, ChunkMesh, MAX_DETAIL};
pub use shading::{shade_fragment, FragmentInput, LightingParams};
pub use transform::{light_view_projection, transform_shadow_vertex, transform_vertex, LightSettings};
pub use types::{DecodedVertex, FlatVertex, PackedVertex, VertexFields};
pub use vertex::{decode_vertex, validate_vertex, validate_vertices};
