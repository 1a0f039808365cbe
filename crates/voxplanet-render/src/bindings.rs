//! Group ordering shared by the pipeline layouts and the composed WGSL.
//!
//! A variant's groups are its slots in plan order: camera, model, lighting (lit variants),
//! diffuse texture, shadow map (shadowed variants). The full shadowed block variant therefore
//! uses groups 0..=4 and the depth pass uses groups 0 and 1.

use voxplanet_core::ShaderFeatures;

use crate::schema::{CameraUniform, LightUniform, ModelUniform, Uniform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSlot {
    Camera,
    Model,
    Lighting,
    Texture,
    Shadow,
}

impl ResourceSlot {
    pub fn label(self) -> &'static str {
        match self {
            ResourceSlot::Camera => "camera",
            ResourceSlot::Model => "model",
            ResourceSlot::Lighting => "lighting",
            ResourceSlot::Texture => "diffuse-atlas",
            ResourceSlot::Shadow => "shadow-map",
        }
    }

    /// WGSL declarations of this slot's resources in `group`.
    fn wgsl(self, group: usize) -> String {
        match self {
            ResourceSlot::Camera => {
                format!("@group({group}) @binding(0) var<uniform> camera: {};\n", CameraUniform::WGSL_NAME)
            }
            ResourceSlot::Model => {
                format!("@group({group}) @binding(0) var<uniform> model: {};\n", ModelUniform::WGSL_NAME)
            }
            ResourceSlot::Lighting => {
                format!("@group({group}) @binding(0) var<uniform> light: {};\n", LightUniform::WGSL_NAME)
            }
            ResourceSlot::Texture => format!(
                "@group({group}) @binding(0) var t_diffuse: texture_2d<f32>;\n\
                 @group({group}) @binding(1) var s_diffuse: sampler;\n"
            ),
            ResourceSlot::Shadow => format!(
                "@group({group}) @binding(0) var t_shadow: texture_depth_2d;\n\
                 @group({group}) @binding(1) var s_shadow: sampler_comparison;\n"
            ),
        }
    }

    fn layout_entries(self) -> Vec<wgpu::BindGroupLayoutEntry> {
        match self {
            ResourceSlot::Camera => vec![uniform_entry(
                wgpu::ShaderStages::VERTEX,
                CameraUniform::size(),
            )],
            ResourceSlot::Model => vec![uniform_entry(
                wgpu::ShaderStages::VERTEX,
                ModelUniform::size(),
            )],
            ResourceSlot::Lighting => vec![uniform_entry(
                wgpu::ShaderStages::FRAGMENT,
                LightUniform::size(),
            )],
            ResourceSlot::Texture => vec![
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            ResourceSlot::Shadow => vec![
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Depth,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                    count: None,
                },
            ],
        }
    }
}

fn uniform_entry(visibility: wgpu::ShaderStages, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

/// Ordered slots of one pipeline. Group index == position in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    slots: Vec<ResourceSlot>,
}

impl BindingPlan {
    pub fn for_features(features: &ShaderFeatures) -> Self {
        let mut slots = vec![ResourceSlot::Camera, ResourceSlot::Model];
        if features.is_lit() {
            slots.push(ResourceSlot::Lighting);
        }
        slots.push(ResourceSlot::Texture);
        if features.shadows {
            slots.push(ResourceSlot::Shadow);
        }
        Self { slots }
    }

    /// Depth-only pass from the light.
    pub fn shadow_depth() -> Self {
        Self {
            slots: vec![ResourceSlot::Camera, ResourceSlot::Model],
        }
    }

    pub fn slots(&self) -> &[ResourceSlot] {
        &self.slots
    }

    pub fn group_count(&self) -> usize {
        self.slots.len()
    }

    pub fn group_of(&self, slot: ResourceSlot) -> Option<u32> {
        self.slots.iter().position(|&s| s == slot).map(|i| i as u32)
    }

    /// `@group/@binding` declarations for every slot, in group order.
    pub fn wgsl_declarations(&self) -> String {
        let mut out = String::new();
        for (group, slot) in self.slots.iter().enumerate() {
            out.push_str(&format!("// {}\n", slot.label()));
            out.push_str(&slot.wgsl(group));
        }
        out
    }
}

/// One bind group layout per slot, created once and shared by every pipeline.
pub struct BindingLayouts {
    camera: wgpu::BindGroupLayout,
    model: wgpu::BindGroupLayout,
    lighting: wgpu::BindGroupLayout,
    texture: wgpu::BindGroupLayout,
    shadow: wgpu::BindGroupLayout,
}

impl BindingLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let create = |slot: ResourceSlot| {
            let label = format!("{}-bgl", slot.label());
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(label.as_str()),
                entries: &slot.layout_entries(),
            })
        };
        Self {
            camera: create(ResourceSlot::Camera),
            model: create(ResourceSlot::Model),
            lighting: create(ResourceSlot::Lighting),
            texture: create(ResourceSlot::Texture),
            shadow: create(ResourceSlot::Shadow),
        }
    }

    pub fn get(&self, slot: ResourceSlot) -> &wgpu::BindGroupLayout {
        match slot {
            ResourceSlot::Camera => &self.camera,
            ResourceSlot::Model => &self.model,
            ResourceSlot::Lighting => &self.lighting,
            ResourceSlot::Texture => &self.texture,
            ResourceSlot::Shadow => &self.shadow,
        }
    }

    /// Layouts in group order, ready for a pipeline layout descriptor.
    pub fn for_plan(&self, plan: &BindingPlan) -> Vec<&wgpu::BindGroupLayout> {
        plan.slots().iter().map(|&slot| self.get(slot)).collect()
    }
}
