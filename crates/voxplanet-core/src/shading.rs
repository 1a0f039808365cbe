//! Lit color pass. Mirrors `fs_main` in `shaders/block/color.wgsl` together with the
//! lighting, shadow and quantize feature snippets.

use glam::{Vec2, Vec3, Vec4};

use crate::color::quantize_color;
use crate::config::ShadingConfig;
use crate::features::{LightModel, ShaderFeatures};

/// Interpolated inputs of one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    pub world_position: Vec3,
    pub world_normal: Vec3,
    /// Diffuse atlas texel already sampled at the fragment's uv.
    pub base_color: Vec4,
    /// Shadow-pass clip position of the fragment.
    pub shadow_position: Vec4,
}

/// Everything the lit color pass reads from uniforms and the feature set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingParams {
    pub model: LightModel,
    /// Point light position.
    pub light_position: Vec3,
    /// Directional light: direction toward the light.
    pub light_normal: Vec3,
    pub ambient_floor: f32,
    pub shadow_bias: f32,
    pub quantize: bool,
}

impl LightingParams {
    pub fn new(features: &ShaderFeatures, light_position: Vec3, light_normal: Vec3) -> Self {
        Self {
            model: features.lighting,
            light_position,
            light_normal,
            ambient_floor: features.default_ambient_floor(),
            shadow_bias: crate::constants::SHADOW_BIAS,
            quantize: features.quantize,
        }
    }

    /// Parameters the renderer derives from a config: bias and floor overrides applied,
    /// directional light pointing from the target toward the light position.
    pub fn from_config(config: &ShadingConfig) -> Self {
        let light = &config.light;
        Self {
            ambient_floor: config.effective_ambient_floor(),
            shadow_bias: config.shadow_bias,
            ..Self::new(
                &config.features,
                light.position,
                (light.position - light.target).normalize_or_zero(),
            )
        }
    }
}

/// Unit vector from the fragment toward the light, or zero when it is undefined.
pub fn light_vector(params: &LightingParams, world_position: Vec3) -> Vec3 {
    match params.model {
        LightModel::Unlit => Vec3::ZERO,
        LightModel::Point => (params.light_position - world_position).normalize_or_zero(),
        LightModel::Directional => params.light_normal.normalize_or_zero(),
    }
}

/// Project a shadow-pass clip position into shadow map space.
///
/// Returns (u, v, depth): x and y are remapped from [-1, 1] to [0, 1] with v pointing down
/// the texture; depth is the clip-space z / w, already in [0, 1].
pub fn shadow_coords(shadow_position: Vec4) -> Vec3 {
    let ndc = shadow_position.truncate() / shadow_position.w;
    Vec3::new(ndc.x * 0.5 + 0.5, ndc.y * -0.5 + 0.5, ndc.z)
}

/// Binary shadow test. A fragment exactly `bias` behind the stored depth is still lit.
pub fn is_shadowed(current_depth: f32, sampled_depth: f32, bias: f32) -> bool {
    current_depth - bias > sampled_depth
}

/// Diffuse term with the shadow folded in, clamped to the ambient floor.
pub fn illumination(normal: Vec3, light_vector: Vec3, shadow: f32, floor: f32) -> f32 {
    ((1.0 - shadow) * normal.dot(light_vector)).max(floor)
}

/// Shade one fragment.
///
/// `shadow_sample` looks up the stored light depth at a shadow map uv. Pass `None` when no
/// shadow map is bound; the fragment is then treated as fully lit.
pub fn shade_fragment(
    input: &FragmentInput,
    params: &LightingParams,
    shadow_sample: Option<&dyn Fn(Vec2) -> f32>,
) -> Vec4 {
    let illum = match params.model {
        LightModel::Unlit => 1.0,
        _ => {
            let l = light_vector(params, input.world_position);
            let shadow = match shadow_sample {
                Some(sample) => {
                    let coords = shadow_coords(input.shadow_position);
                    let sampled = sample(coords.truncate());
                    if is_shadowed(coords.z, sampled, params.shadow_bias) {
                        1.0
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            };
            illumination(input.world_normal, l, shadow, params.ambient_floor)
        }
    };

    let lit = (input.base_color.truncate() * illum).extend(input.base_color.w);
    if params.quantize {
        quantize_color(lit)
    } else {
        lit
    }
}
