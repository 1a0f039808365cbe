//! Host mirror of `shaders/common/schema.wgsl`. One definition per uniform, shared by every pass.

use glam::{Mat4, Vec3};

use crate::bindings::ResourceSlot;

/// Bumped whenever a uniform layout or the group ordering changes. Injected into every
/// composed shader so a mismatched host and shader set can be spotted in captures.
pub const SCHEMA_VERSION: u32 = 1;

/// A uniform struct with a fixed group in the binding plan.
pub trait Uniform: bytemuck::Pod {
    const SLOT: ResourceSlot;
    /// Name of the matching WGSL struct.
    const WGSL_NAME: &'static str;

    fn size() -> u64 {
        std::mem::size_of::<Self>() as u64
    }
}

/// Camera view-projection plus the light's view-projection for shadow lookups (128 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub shadow_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Mat4, shadow_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            shadow_proj: shadow_proj.to_cols_array_2d(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

impl Uniform for CameraUniform {
    const SLOT: ResourceSlot = ResourceSlot::Camera;
    const WGSL_NAME: &'static str = "CameraUniform";
}

/// Per-object model matrix (64 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
        }
    }
}

impl Uniform for ModelUniform {
    const SLOT: ResourceSlot = ResourceSlot::Model;
    const WGSL_NAME: &'static str = "ModelUniform";
}

/// Light position and direction toward the light (32 bytes, w = 1 / w = 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub normal: [f32; 4],
}

impl LightUniform {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            normal: normal.extend(0.0).to_array(),
        }
    }
}

impl Uniform for LightUniform {
    const SLOT: ResourceSlot = ResourceSlot::Lighting;
    const WGSL_NAME: &'static str = "LightUniform";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(CameraUniform::size(), 128);
        assert_eq!(ModelUniform::size(), 64);
        assert_eq!(LightUniform::size(), 32);
    }

    #[test]
    fn test_column_major_layout() {
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let uniform = ModelUniform::new(model);
        // Translation lives in the fourth column, as WGSL reads it
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);

        let bytes = bytemuck::bytes_of(&uniform);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(&floats[12..16], &[1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_camera_field_order() {
        let camera = CameraUniform::new(Mat4::IDENTITY, Mat4::from_scale(Vec3::splat(2.0)));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&camera));
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[16], 2.0);
    }

    #[test]
    fn test_light_w_components() {
        let light = LightUniform::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert_eq!(light.position, [0.0, 5.0, 0.0, 1.0]);
        assert_eq!(light.normal, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_slots() {
        assert_eq!(CameraUniform::SLOT, ResourceSlot::Camera);
        assert_eq!(ModelUniform::SLOT, ResourceSlot::Model);
        assert_eq!(LightUniform::SLOT, ResourceSlot::Lighting);
    }
}
