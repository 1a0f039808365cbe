//! WGSL composition. Every variant is the same skeleton plus feature snippets, behind a
//! constants preamble generated from the Rust side.

use voxplanet_core::constants::{
    ATLAS_CELLS, ATLAS_COLUMN_SHIFT, ATLAS_ROW_SHIFT, BLOCK_GRID_SIZE, NIBBLE_MASK, NORMAL_SHIFT,
    POS_X_SHIFT, POS_Y_SHIFT, POS_Z_SHIFT, QUANT_STEPS, WRAP_X_BIT, WRAP_Y_BIT, WRAP_Z_BIT,
};
use voxplanet_core::{LightModel, ShaderFeatures, ShadingConfig, VertexInput};

use crate::bindings::BindingPlan;
use crate::error::RenderError;
use crate::schema::SCHEMA_VERSION;

const SCHEMA_WGSL: &str = include_str!("../../../shaders/common/schema.wgsl");
const DECODE_PACKED_WGSL: &str = include_str!("../../../shaders/common/decode_packed.wgsl");
const DECODE_FLAT_WGSL: &str = include_str!("../../../shaders/common/decode_flat.wgsl");
const QUANTIZE_WGSL: &str = include_str!("../../../shaders/common/quantize.wgsl");
const COLOR_WGSL: &str = include_str!("../../../shaders/block/color.wgsl");
const SHADOW_DEPTH_WGSL: &str = include_str!("../../../shaders/block/shadow_depth.wgsl");

const NORMAL_ROTATE_WGSL: &str = include_str!("../../../shaders/features/normal_rotate.wgsl");
const NORMAL_IDENTITY_WGSL: &str = include_str!("../../../shaders/features/normal_identity.wgsl");
const LIGHT_NONE_WGSL: &str = include_str!("../../../shaders/features/light_none.wgsl");
const LIGHT_POINT_WGSL: &str = include_str!("../../../shaders/features/light_point.wgsl");
const LIGHT_DIRECTIONAL_WGSL: &str =
    include_str!("../../../shaders/features/light_directional.wgsl");
const DIFFUSE_WGSL: &str = include_str!("../../../shaders/features/diffuse.wgsl");
const SHADOW_NONE_WGSL: &str = include_str!("../../../shaders/features/shadow_none.wgsl");
const SHADOW_MAP_WGSL: &str = include_str!("../../../shaders/features/shadow_map.wgsl");
const QUANTIZE_ON_WGSL: &str = include_str!("../../../shaders/features/quantize_on.wgsl");
const QUANTIZE_OFF_WGSL: &str = include_str!("../../../shaders/features/quantize_off.wgsl");

/// Constants shared with `voxplanet_core::constants`, plus the per-config bias and floor.
pub fn constants_preamble(config: &ShadingConfig) -> String {
    let u32_consts = [
        ("SCHEMA_VERSION", SCHEMA_VERSION),
        ("BLOCK_GRID_SIZE", BLOCK_GRID_SIZE),
        ("NIBBLE_MASK", NIBBLE_MASK),
        ("POS_X_SHIFT", POS_X_SHIFT),
        ("POS_Y_SHIFT", POS_Y_SHIFT),
        ("POS_Z_SHIFT", POS_Z_SHIFT),
        ("NORMAL_SHIFT", NORMAL_SHIFT),
        ("ATLAS_COLUMN_SHIFT", ATLAS_COLUMN_SHIFT),
        ("ATLAS_ROW_SHIFT", ATLAS_ROW_SHIFT),
        ("WRAP_X_BIT", WRAP_X_BIT),
        ("WRAP_Y_BIT", WRAP_Y_BIT),
        ("WRAP_Z_BIT", WRAP_Z_BIT),
    ];
    let f32_consts = [
        ("ATLAS_CELLS", ATLAS_CELLS as f32),
        ("QUANT_STEPS", QUANT_STEPS),
        ("SHADOW_BIAS", config.shadow_bias),
        ("AMBIENT_FLOOR", config.effective_ambient_floor()),
    ];

    let mut out = String::new();
    for (name, value) in u32_consts {
        out.push_str(&format!("const {name}: u32 = {value}u;\n"));
    }
    for (name, value) in f32_consts {
        // Debug formatting always keeps a decimal point or exponent, which WGSL needs for f32
        out.push_str(&format!("const {name}: f32 = {value:?};\n"));
    }
    out
}

fn decode_snippet(features: &ShaderFeatures) -> &'static str {
    match features.vertex {
        VertexInput::Packed => DECODE_PACKED_WGSL,
        VertexInput::Flat => DECODE_FLAT_WGSL,
    }
}

/// Color pass source for `config.features`.
pub fn compose_color_shader(config: &ShadingConfig) -> String {
    let features = &config.features;
    let mut parts = vec![
        constants_preamble(config),
        SCHEMA_WGSL.to_string(),
        BindingPlan::for_features(features).wgsl_declarations(),
        decode_snippet(features).to_string(),
    ];

    parts.push(
        if features.rotate_normals {
            NORMAL_ROTATE_WGSL
        } else {
            NORMAL_IDENTITY_WGSL
        }
        .to_string(),
    );
    match features.lighting {
        LightModel::Unlit => parts.push(LIGHT_NONE_WGSL.to_string()),
        LightModel::Point => {
            parts.push(LIGHT_POINT_WGSL.to_string());
            parts.push(DIFFUSE_WGSL.to_string());
        }
        LightModel::Directional => {
            parts.push(LIGHT_DIRECTIONAL_WGSL.to_string());
            parts.push(DIFFUSE_WGSL.to_string());
        }
    }
    parts.push(
        if features.shadows {
            SHADOW_MAP_WGSL
        } else {
            SHADOW_NONE_WGSL
        }
        .to_string(),
    );
    if features.quantize {
        parts.push(QUANTIZE_WGSL.to_string());
        parts.push(QUANTIZE_ON_WGSL.to_string());
    } else {
        parts.push(QUANTIZE_OFF_WGSL.to_string());
    }
    parts.push(COLOR_WGSL.to_string());

    parts.join("\n")
}

/// Depth-only pass source. Decodes exactly like the color pass of the same feature set.
pub fn compose_shadow_shader(config: &ShadingConfig) -> String {
    let features = &config.features;
    [
        constants_preamble(config).as_str(),
        SCHEMA_WGSL,
        BindingPlan::shadow_depth().wgsl_declarations().as_str(),
        decode_snippet(features),
        SHADOW_DEPTH_WGSL,
    ]
    .join("\n")
}

/// Parse and validate composed WGSL with naga before it reaches the device.
pub fn validate_wgsl(label: &str, source: &str) -> Result<naga::Module, RenderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| {
        RenderError::ShaderCompilationFailed {
            label: label.to_string(),
            message: e.emit_to_string(source),
        }
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|e| RenderError::ShaderCompilationFailed {
        label: label.to_string(),
        message: format!("{:?}", e.as_inner()),
    })?;

    Ok(module)
}

/// Validate, then hand the source to wgpu.
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: String,
) -> Result<wgpu::ShaderModule, RenderError> {
    validate_wgsl(label, &source)?;
    log::debug!("shader '{label}': {} bytes of WGSL", source.len());
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}
