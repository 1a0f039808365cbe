use voxplanet_core::{ShaderFeatures, ShadingConfig, VertexInput};

use crate::bindings::{BindingLayouts, BindingPlan};
use crate::error::RenderError;
use crate::shader::{compose_color_shader, compose_shadow_shader, create_shader_module};
use crate::texture::DEPTH_FORMAT;
use crate::vertex_layout::vertex_buffer_layout;

/// Color pipeline for one feature set, plus its depth-only companion when shadows are on.
pub struct ShadingPipelines {
    pub features: ShaderFeatures,
    pub color: wgpu::RenderPipeline,
    pub color_plan: BindingPlan,
    pub shadow: Option<wgpu::RenderPipeline>,
    pub shadow_plan: BindingPlan,
}

fn primitive_state(features: &ShaderFeatures) -> wgpu::PrimitiveState {
    // Chunk meshes are wound counter-clockwise from outside; flat meshes carry no winding guarantee
    let cull_mode = match features.vertex {
        VertexInput::Packed => Some(wgpu::Face::Back),
        VertexInput::Flat => None,
    };
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        ..Default::default()
    }
}

fn depth_state() -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

impl ShadingPipelines {
    pub fn new(
        device: &wgpu::Device,
        layouts: &BindingLayouts,
        color_format: wgpu::TextureFormat,
        config: &ShadingConfig,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let features = config.features;
        let label = features.label();

        let color_plan = BindingPlan::for_features(&features);
        let color_module =
            create_shader_module(device, &format!("{label}-color"), compose_color_shader(config))?;
        let color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}-color-layout")),
            bind_group_layouts: &layouts.for_plan(&color_plan),
            push_constant_ranges: &[],
        });

        let color = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label}-color-pipeline")),
            layout: Some(&color_layout),
            vertex: wgpu::VertexState {
                module: &color_module,
                entry_point: Some("vs_main"),
                buffers: &[vertex_buffer_layout(features.vertex)],
                compilation_options: Default::default(),
            },
            primitive: primitive_state(&features),
            depth_stencil: Some(depth_state()),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &color_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        });

        let shadow_plan = BindingPlan::shadow_depth();
        let shadow = if features.shadows {
            let shadow_module = create_shader_module(
                device,
                &format!("{label}-shadow-depth"),
                compose_shadow_shader(config),
            )?;
            let shadow_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{label}-shadow-layout")),
                bind_group_layouts: &layouts.for_plan(&shadow_plan),
                push_constant_ranges: &[],
            });
            // No fragment stage: the pass only writes depth
            Some(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label}-shadow-pipeline")),
                layout: Some(&shadow_layout),
                vertex: wgpu::VertexState {
                    module: &shadow_module,
                    entry_point: Some("vs_main"),
                    buffers: &[vertex_buffer_layout(features.vertex)],
                    compilation_options: Default::default(),
                },
                primitive: primitive_state(&features),
                depth_stencil: Some(depth_state()),
                multisample: wgpu::MultisampleState::default(),
                fragment: None,
                multiview: None,
                cache: None,
            }))
        } else {
            None
        };

        log::info!(
            "built shading pipelines '{label}': {} color groups, shadow pass {}",
            color_plan.group_count(),
            if shadow.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            features,
            color,
            color_plan,
            shadow,
            shadow_plan,
        })
    }
}
