use serde::{Deserialize, Serialize};

use crate::constants::{AMBIENT_FLOOR_SHADOWED, AMBIENT_FLOOR_UNSHADOWED};
use crate::error::ShadeError;

/// Layout of the vertex buffer a pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexInput {
    /// One `PackedVertex` word per vertex.
    Packed,
    /// `FlatVertex`: float position, normal, uv.
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightModel {
    /// Texture color only.
    Unlit,
    /// Light vector from the fragment toward `LightUniform::position`.
    Point,
    /// Fixed light vector `LightUniform::normal`.
    Directional,
}

/// Optional stages of the shared shading pipeline, resolved when the pipeline is built.
///
/// Every historical shader variant is one of these combinations; see the preset constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderFeatures {
    pub vertex: VertexInput,
    pub lighting: LightModel,
    /// Sample a shadow map produced by the depth pass.
    pub shadows: bool,
    /// Snap the lit color onto the HSL palette.
    pub quantize: bool,
    /// Rotate normals by the model's upper 3x3. Off: normals pass through in local space.
    pub rotate_normals: bool,
}

impl ShaderFeatures {
    /// Screen-space UI quad: flat vertices, texture only.
    pub const fn flat_quad() -> Self {
        Self {
            vertex: VertexInput::Flat,
            lighting: LightModel::Unlit,
            shadows: false,
            quantize: false,
            rotate_normals: false,
        }
    }

    /// Textured blocks without lighting.
    pub const fn unlit_block() -> Self {
        Self {
            vertex: VertexInput::Packed,
            lighting: LightModel::Unlit,
            shadows: false,
            quantize: false,
            rotate_normals: false,
        }
    }

    /// Blocks lit by a directional light, no shadow map.
    pub const fn lit_block() -> Self {
        Self {
            vertex: VertexInput::Packed,
            lighting: LightModel::Directional,
            shadows: false,
            quantize: false,
            rotate_normals: true,
        }
    }

    /// Point-lit, shadow-mapped, palette-quantized blocks.
    pub const fn shadowed_block() -> Self {
        Self {
            vertex: VertexInput::Packed,
            lighting: LightModel::Point,
            shadows: true,
            quantize: true,
            rotate_normals: true,
        }
    }

    /// Planet surface meshes with float vertices.
    pub const fn planet_mesh() -> Self {
        Self {
            vertex: VertexInput::Flat,
            lighting: LightModel::Point,
            shadows: false,
            quantize: true,
            rotate_normals: true,
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lighting != LightModel::Unlit
    }

    /// Illumination floor used when the config does not override it.
    pub fn default_ambient_floor(&self) -> f32 {
        if self.shadows {
            AMBIENT_FLOOR_SHADOWED
        } else {
            AMBIENT_FLOOR_UNSHADOWED
        }
    }

    /// Short label for pipeline and resource names.
    pub fn label(&self) -> String {
        let mut parts = vec![match self.vertex {
            VertexInput::Packed => "block",
            VertexInput::Flat => "flat",
        }];
        parts.push(match self.lighting {
            LightModel::Unlit => "unlit",
            LightModel::Point => "point",
            LightModel::Directional => "directional",
        });
        if self.shadows {
            parts.push("shadowed");
        }
        if self.quantize {
            parts.push("quantized");
        }
        parts.join("-")
    }

    pub fn validate(&self) -> Result<(), ShadeError> {
        if self.shadows && !self.is_lit() {
            return Err(ShadeError::InvalidFeatureSet(
                "shadow mapping requires a light model".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ShaderFeatures {
    fn default() -> Self {
        Self::shadowed_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        for features in [
            ShaderFeatures::flat_quad(),
            ShaderFeatures::unlit_block(),
            ShaderFeatures::lit_block(),
            ShaderFeatures::shadowed_block(),
            ShaderFeatures::planet_mesh(),
        ] {
            assert!(features.validate().is_ok(), "{}", features.label());
        }
    }

    #[test]
    fn test_shadows_need_lighting() {
        let features = ShaderFeatures {
            shadows: true,
            ..ShaderFeatures::unlit_block()
        };
        assert!(matches!(
            features.validate(),
            Err(ShadeError::InvalidFeatureSet(_))
        ));
    }

    #[test]
    fn test_floor_follows_shadows() {
        assert_eq!(ShaderFeatures::shadowed_block().default_ambient_floor(), 0.1);
        assert_eq!(ShaderFeatures::lit_block().default_ambient_floor(), 0.0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            ShaderFeatures::shadowed_block().label(),
            "block-point-shadowed-quantized"
        );
        assert_eq!(ShaderFeatures::flat_quad().label(), "flat-unlit");
    }
}
