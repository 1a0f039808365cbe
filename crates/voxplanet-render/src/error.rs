use thiserror::Error;
use voxplanet_core::ShadeError;

use crate::bindings::ResourceSlot;

/// Host-side failures while building or driving the shading pipelines.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("shader '{label}' failed validation: {message}")]
    ShaderCompilationFailed { label: String, message: String },

    #[error(transparent)]
    Shade(#[from] ShadeError),

    #[error("atlas data is {actual} bytes, expected {expected}")]
    AtlasSizeMismatch { expected: usize, actual: usize },

    #[error("no bind group available for {0:?}")]
    MissingBinding(ResourceSlot),
}
