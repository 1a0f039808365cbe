use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SHADOW_MAP_SIZE, SHADOW_BIAS};
use crate::error::ShadeError;
use crate::features::ShaderFeatures;
use crate::transform::LightSettings;

/// Host-tunable shading parameters, loadable from RON.
///
/// ```ron
/// (
///     features: (vertex: Packed, lighting: Point, shadows: true, quantize: true, rotate_normals: true),
///     shadow_bias: 0.005,
///     ambient_floor: Some(0.1),
///     shadow_map_size: 2048,
///     light: (position: (0.0, 0.0, 10.0), target: (0.0, 0.0, 0.0), half_extent: 32.0, near: 0.1, far: 100.0),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadingConfig {
    #[serde(default)]
    pub features: ShaderFeatures,
    #[serde(default = "default_shadow_bias")]
    pub shadow_bias: f32,
    /// Overrides the per-variant floor (0.0 unshadowed, 0.1 shadowed).
    #[serde(default)]
    pub ambient_floor: Option<f32>,
    #[serde(default = "default_shadow_map_size")]
    pub shadow_map_size: u32,
    #[serde(default)]
    pub light: LightSettings,
}

fn default_shadow_bias() -> f32 {
    SHADOW_BIAS
}

fn default_shadow_map_size() -> u32 {
    DEFAULT_SHADOW_MAP_SIZE
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self::for_features(ShaderFeatures::default())
    }
}

impl ShadingConfig {
    pub fn for_features(features: ShaderFeatures) -> Self {
        Self {
            features,
            shadow_bias: SHADOW_BIAS,
            ambient_floor: None,
            shadow_map_size: DEFAULT_SHADOW_MAP_SIZE,
            light: LightSettings::default(),
        }
    }

    /// Parse and validate a RON config.
    pub fn from_ron(ron_str: &str) -> Result<Self, ShadeError> {
        let options = ron::Options::default();
        let config: ShadingConfig = options
            .from_str(ron_str)
            .map_err(|e| ShadeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Floor actually used by the lit color pass.
    pub fn effective_ambient_floor(&self) -> f32 {
        self.ambient_floor
            .unwrap_or_else(|| self.features.default_ambient_floor())
    }

    pub fn validate(&self) -> Result<(), ShadeError> {
        self.features.validate()?;

        if !self.shadow_bias.is_finite() || self.shadow_bias < 0.0 {
            return Err(ShadeError::InvalidConfig(format!(
                "shadow_bias must be finite and non-negative, got {}",
                self.shadow_bias
            )));
        }
        if let Some(floor) = self.ambient_floor {
            if !(0.0..=1.0).contains(&floor) {
                return Err(ShadeError::InvalidConfig(format!(
                    "ambient_floor must be in [0, 1], got {floor}"
                )));
            }
        }
        if self.shadow_map_size == 0 || !self.shadow_map_size.is_power_of_two() {
            return Err(ShadeError::InvalidConfig(format!(
                "shadow_map_size must be a non-zero power of two, got {}",
                self.shadow_map_size
            )));
        }
        self.light.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{LightModel, VertexInput};
    use glam::Vec3;

    #[test]
    fn test_default_is_valid() {
        let config = ShadingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_ambient_floor(), 0.1);
        assert_eq!(config.shadow_bias, 0.005);
    }

    #[test]
    fn test_parse_full() {
        let config = ShadingConfig::from_ron(
            r#"(
                features: (vertex: Flat, lighting: Directional, shadows: false, quantize: false, rotate_normals: true),
                shadow_bias: 0.002,
                ambient_floor: Some(0.25),
                shadow_map_size: 1024,
                light: (position: (5.0, 5.0, 5.0), target: (0.0, 0.0, 0.0), half_extent: 16.0, near: 1.0, far: 50.0),
            )"#,
        )
        .unwrap();
        assert_eq!(config.features.vertex, VertexInput::Flat);
        assert_eq!(config.features.lighting, LightModel::Directional);
        assert_eq!(config.shadow_bias, 0.002);
        assert_eq!(config.effective_ambient_floor(), 0.25);
        assert_eq!(config.shadow_map_size, 1024);
        assert_eq!(config.light.position, Vec3::splat(5.0));
    }

    #[test]
    fn test_parse_defaults() {
        let config = ShadingConfig::from_ron("()").unwrap();
        assert_eq!(config, ShadingConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let err = ShadingConfig::from_ron("(shadow_bias: \"high\")").unwrap_err();
        assert!(matches!(err, ShadeError::ConfigParse(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ShadingConfig::default();
        config.shadow_map_size = 1000;
        assert!(matches!(config.validate(), Err(ShadeError::InvalidConfig(_))));

        let mut config = ShadingConfig::default();
        config.ambient_floor = Some(1.5);
        assert!(config.validate().is_err());

        let mut config = ShadingConfig::default();
        config.shadow_bias = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = ShadingConfig::default();
        config.light.near = 10.0;
        config.light.far = 1.0;
        assert!(config.validate().is_err());

        let mut config = ShadingConfig::default();
        config.light.half_extent = f32::NAN;
        assert!(matches!(config.validate(), Err(ShadeError::InvalidConfig(_))));

        let mut config = ShadingConfig::default();
        config.light.target = config.light.position;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_invalid_features() {
        let err = ShadingConfig::from_ron(
            "(features: (vertex: Packed, lighting: Unlit, shadows: true, quantize: false, rotate_normals: false))",
        )
        .unwrap_err();
        assert!(matches!(err, ShadeError::InvalidFeatureSet(_)));
    }
}
