use glam::{Mat4, Vec3};
use voxplanet_core::{light_view_projection, LightSettings, ShadingConfig};
use wgpu::util::DeviceExt;

use crate::bindings::{BindingLayouts, ResourceSlot};
use crate::error::RenderError;
use crate::mesh::{GpuMesh, ModelBinding};
use crate::pipeline::ShadingPipelines;
use crate::schema::{CameraUniform, LightUniform, Uniform};
use crate::shadow::ShadowMap;
use crate::texture::{AtlasTexture, DepthTarget};

/// One object to draw this frame.
#[derive(Clone, Copy)]
pub struct DrawItem<'a> {
    pub mesh: &'a GpuMesh,
    pub model: &'a ModelBinding,
}

/// Owns the shared uniforms, layouts, pipelines and depth targets of the shading core.
/// All GPU resources are created up front; per-frame work is buffer writes and pass encoding.
pub struct ShadingRenderer {
    config: ShadingConfig,
    layouts: BindingLayouts,
    pipelines: ShadingPipelines,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    light_buffer: wgpu::Buffer,
    light_bind_group: wgpu::BindGroup,
    shadow_map: Option<ShadowMap>,
    depth: DepthTarget,
    view_proj: Mat4,
    shadow_proj: Mat4,
}

fn uniform_bind_group<U: Uniform>(
    device: &wgpu::Device,
    layouts: &BindingLayouts,
    value: &U,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let label = U::SLOT.label();
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-uniform")),
        contents: bytemuck::bytes_of(value),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bg")),
        layout: layouts.get(U::SLOT),
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}

/// Direction toward the light, used by directional lighting.
fn light_direction(light: &LightSettings) -> Vec3 {
    (light.position - light.target).normalize_or_zero()
}

impl ShadingRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: ShadingConfig,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let layouts = BindingLayouts::new(device);
        let pipelines = ShadingPipelines::new(device, &layouts, color_format, &config)?;

        let shadow_proj = if config.features.shadows {
            light_view_projection(&config.light)
        } else {
            Mat4::IDENTITY
        };
        let (camera_buffer, camera_bind_group) = uniform_bind_group(
            device,
            &layouts,
            &CameraUniform::new(Mat4::IDENTITY, shadow_proj),
        );
        let (light_buffer, light_bind_group) = uniform_bind_group(
            device,
            &layouts,
            &LightUniform::new(config.light.position, light_direction(&config.light)),
        );

        let shadow_map = config
            .features
            .shadows
            .then(|| ShadowMap::new(device, &layouts, config.shadow_map_size));
        let depth = DepthTarget::new(device, width, height);

        log::info!(
            "shading renderer ready: {} ({}x{})",
            config.features.label(),
            width,
            height
        );

        Ok(Self {
            config,
            layouts,
            pipelines,
            camera_buffer,
            camera_bind_group,
            light_buffer,
            light_bind_group,
            shadow_map,
            depth,
            view_proj: Mat4::IDENTITY,
            shadow_proj,
        })
    }

    pub fn layouts(&self) -> &BindingLayouts {
        &self.layouts
    }

    pub fn config(&self) -> &ShadingConfig {
        &self.config
    }

    pub fn shadow_map(&self) -> Option<&ShadowMap> {
        self.shadow_map.as_ref()
    }

    /// Upload the camera's view-projection. The shadow projection is kept from the last light update.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, view_proj: Mat4) {
        self.view_proj = view_proj;
        self.write_camera(queue);
    }

    /// Move the light; rebuilds the shadow projection when shadows are on.
    /// Invalid settings are rejected and leave the uploaded state untouched.
    pub fn update_light(
        &mut self,
        queue: &wgpu::Queue,
        light: LightSettings,
    ) -> Result<(), RenderError> {
        light.validate()?;
        self.config.light = light;
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::new(light.position, light_direction(&light))),
        );
        if self.config.features.shadows {
            self.shadow_proj = light_view_projection(&light);
            self.write_camera(queue);
        }
        Ok(())
    }

    fn write_camera(&self, queue: &wgpu::Queue) {
        let uniform = CameraUniform::new(self.view_proj, self.shadow_proj);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&uniform));
    }

    /// Recreate the main depth target for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth = DepthTarget::new(device, width, height);
        log::debug!("resized depth target to {width}x{height}");
    }

    /// Encode the shadow depth pass (when enabled) and then the color pass.
    ///
    /// Both passes go into the same encoder in that order, so the shadow map is fully written
    /// before the color pass samples it.
    pub fn encode_frame(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        atlas: &AtlasTexture,
        draws: &[DrawItem<'_>],
    ) -> Result<(), RenderError> {
        if let (Some(pipeline), Some(shadow_map)) = (&self.pipelines.shadow, &self.shadow_map) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow-depth-pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(pipeline);
            for draw in draws {
                for (group, slot) in self.pipelines.shadow_plan.slots().iter().enumerate() {
                    let bind_group = self.bind_group_for(*slot, draw, atlas)?;
                    pass.set_bind_group(group as u32, bind_group, &[]);
                }
                draw.mesh.draw(&mut pass);
            }
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("color-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.05,
                            g: 0.05,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipelines.color);
            for draw in draws {
                for (group, slot) in self.pipelines.color_plan.slots().iter().enumerate() {
                    let bind_group = self.bind_group_for(*slot, draw, atlas)?;
                    pass.set_bind_group(group as u32, bind_group, &[]);
                }
                draw.mesh.draw(&mut pass);
            }
        }

        log::debug!(
            "encoded frame: {} draws, shadow pass {}",
            draws.len(),
            self.pipelines.shadow.is_some()
        );
        Ok(())
    }

    fn bind_group_for<'a>(
        &'a self,
        slot: ResourceSlot,
        draw: &DrawItem<'a>,
        atlas: &'a AtlasTexture,
    ) -> Result<&'a wgpu::BindGroup, RenderError> {
        match slot {
            ResourceSlot::Camera => Ok(&self.camera_bind_group),
            ResourceSlot::Model => Ok(&draw.model.bind_group),
            ResourceSlot::Lighting => Ok(&self.light_bind_group),
            ResourceSlot::Texture => Ok(atlas.bind_group(draw.mesh.detail)),
            ResourceSlot::Shadow => self
                .shadow_map
                .as_ref()
                .map(|s| &s.bind_group)
                .ok_or(RenderError::MissingBinding(slot)),
        }
    }
}
