use thiserror::Error;

/// Host-side errors. The per-vertex and per-fragment math never fails; these cover
/// data and configuration that must be rejected before it reaches the GPU.
#[derive(Debug, Error)]
pub enum ShadeError {
    #[error("normal selector {0} is outside 0..6")]
    InvalidNormalSelector(u32),

    #[error("{axis} position {value} is outside the 16-block grid")]
    PositionOutOfRange { axis: char, value: u32 },

    #[error("atlas cell ({column}, {row}) is outside the 16x16 atlas")]
    AtlasCellOutOfRange { column: u32, row: u32 },

    #[error("packed vertex {index} is invalid: {source}")]
    InvalidVertex {
        index: usize,
        #[source]
        source: Box<ShadeError>,
    },

    #[error("mesh detail level {0} is outside 1..=5")]
    InvalidDetail(u32),

    #[error("invalid shader feature set: {0}")]
    InvalidFeatureSet(String),

    #[error("failed to parse shading config RON: {0}")]
    ConfigParse(String),

    #[error("invalid shading config: {0}")]
    InvalidConfig(String),
}
