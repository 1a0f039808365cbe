//! Vertex transform stage. Mirrors `vs_main` in `shaders/block/color.wgsl` and
//! `shaders/block/shadow_depth.wgsl`.
//!
//! Order is fixed: wrap offsets (local) -> model -> normal rotation (upper 3x3) -> projection.

use glam::{Mat3, Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::ShadeError;
use crate::types::DecodedVertex;

/// Output of the color pass vertex stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedVertex {
    pub clip_position: Vec4,
    pub world_position: Vec3,
    /// Rotated normal with w = 1, as carried in the interpolated varying.
    pub world_normal: Vec4,
    pub uv: glam::Vec2,
    /// Clip position under the light's projection. Only meaningful when shadows are on.
    pub shadow_position: Vec4,
}

/// Transform a decoded vertex for the color pass.
///
/// `rotate_normals` selects between rotating the face normal by the model's upper 3x3 and
/// passing it through unchanged. `shadow_proj` is `None` for variants without a shadow map.
pub fn transform_vertex(
    vertex: &DecodedVertex,
    model: Mat4,
    view_proj: Mat4,
    shadow_proj: Option<Mat4>,
    rotate_normals: bool,
) -> TransformedVertex {
    let world = model * vertex.local_position().extend(1.0);
    let normal = if rotate_normals {
        Mat3::from_mat4(model) * vertex.normal
    } else {
        vertex.normal
    };

    TransformedVertex {
        clip_position: view_proj * world,
        world_position: world.truncate(),
        world_normal: normal.extend(1.0),
        uv: vertex.uv,
        shadow_position: match shadow_proj {
            Some(proj) => proj * world,
            None => Vec4::new(0.0, 0.0, 0.0, 1.0),
        },
    }
}

/// Transform a decoded vertex for the shadow depth pass. Same decode, same model matrix,
/// light projection in place of the camera's.
pub fn transform_shadow_vertex(vertex: &DecodedVertex, model: Mat4, shadow_proj: Mat4) -> Vec4 {
    shadow_proj * model * vertex.local_position().extend(1.0)
}

/// Light frustum used to build the shadow projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSettings {
    /// World-space light position. Point lighting uses it directly; the shadow camera sits here.
    pub position: Vec3,
    /// Point the shadow camera looks at.
    pub target: Vec3,
    /// Half the edge length of the orthographic shadow frustum.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            half_extent: 32.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl LightSettings {
    /// Reject settings whose shadow projection would not be finite.
    pub fn validate(&self) -> Result<(), ShadeError> {
        if !self.position.is_finite() || !self.target.is_finite() {
            return Err(ShadeError::InvalidConfig(format!(
                "light position {} and target {} must be finite",
                self.position, self.target
            )));
        }
        if !self.half_extent.is_finite() || self.half_extent <= 0.0 {
            return Err(ShadeError::InvalidConfig(format!(
                "light half_extent must be finite and positive, got {}",
                self.half_extent
            )));
        }
        if !self.near.is_finite() || !self.far.is_finite() || self.near >= self.far {
            return Err(ShadeError::InvalidConfig(format!(
                "light frustum is empty (near {}, far {})",
                self.near, self.far
            )));
        }
        if self.position == self.target {
            return Err(ShadeError::InvalidConfig(
                "light position and target coincide".into(),
            ));
        }
        Ok(())
    }
}

/// Light view-projection for the shadow pass.
///
/// Orthographic, right-handed, depth in [0, 1] (wgpu convention), so depth written by the
/// shadow pass and the fragment's projected z are directly comparable.
pub fn light_view_projection(light: &LightSettings) -> Mat4 {
    let forward = (light.target - light.position).normalize_or_zero();
    // Avoid a degenerate basis when looking straight along the default up axis
    let up = if forward.cross(Vec3::Z).length_squared() < 1e-6 {
        Vec3::Y
    } else {
        Vec3::Z
    };
    let view = Mat4::look_at_rh(light.position, light.target, up);
    let e = light.half_extent;
    let proj = Mat4::orthographic_rh(-e, e, -e, e, light.near, light.far);
    proj * view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PackedVertex;
    use crate::vertex::decode_vertex;
    use glam::Quat;

    #[test]
    fn test_identity_origin_vertex() {
        // Packed 0x0000_0000: origin, +x face, atlas (0, 0)
        let v = decode_vertex(PackedVertex(0x0000_0000));
        let out = transform_vertex(&v, Mat4::IDENTITY, Mat4::IDENTITY, None, true);
        assert_eq!(out.clip_position, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(out.world_normal, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(out.world_position, Vec3::ZERO);
    }

    #[test]
    fn test_wrap_applied_before_model() {
        // x=2, wrap x; model scales by 2 so the wrap offset must be scaled too
        let v = decode_vertex(PackedVertex(2 | (1 << 24)));
        let model = Mat4::from_scale(Vec3::splat(2.0));
        let out = transform_vertex(&v, model, Mat4::IDENTITY, None, true);
        assert_eq!(out.world_position, Vec3::new(36.0, 0.0, 0.0));
    }

    #[test]
    fn test_normal_ignores_translation() {
        let v = decode_vertex(PackedVertex(2 << 12)); // +y
        let model = Mat4::from_translation(Vec3::new(5.0, -3.0, 8.0));
        let out = transform_vertex(&v, model, Mat4::IDENTITY, None, true);
        assert_eq!(out.world_normal, Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(out.world_position, Vec3::new(5.0, -3.0, 8.0));
    }

    #[test]
    fn test_normal_rotation() {
        let v = decode_vertex(PackedVertex(0)); // +x
        let model = Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let rotated = transform_vertex(&v, model, Mat4::IDENTITY, None, true);
        assert!(rotated.world_normal.truncate().abs_diff_eq(Vec3::Y, 1e-6));
        let unrotated = transform_vertex(&v, model, Mat4::IDENTITY, None, false);
        assert_eq!(unrotated.world_normal.truncate(), Vec3::X);
    }

    #[test]
    fn test_shadow_position_matches_depth_pass() {
        let v = decode_vertex(PackedVertex(3 | (4 << 4) | (5 << 8) | (1 << 25)));
        let model = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let shadow_proj = light_view_projection(&LightSettings::default());
        let color = transform_vertex(&v, model, Mat4::IDENTITY, Some(shadow_proj), true);
        let depth = transform_shadow_vertex(&v, model, shadow_proj);
        assert_eq!(color.shadow_position, depth);
    }

    #[test]
    fn test_light_projection_depth_range() {
        let light = LightSettings::default();
        let proj = light_view_projection(&light);
        let near = proj * (light.position + (light.target - light.position).normalize() * light.near).extend(1.0);
        let far = proj * (light.position + (light.target - light.position).normalize() * light.far).extend(1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
        // Target sits on the shadow map center
        let center = proj * light.target.extend(1.0);
        assert!(center.truncate().truncate().abs_diff_eq(glam::Vec2::ZERO, 1e-5));
    }

    #[test]
    fn test_light_settings_validation() {
        assert!(LightSettings::default().validate().is_ok());

        let rejected = [
            LightSettings { half_extent: f32::NAN, ..Default::default() },
            LightSettings { half_extent: 0.0, ..Default::default() },
            LightSettings { near: f32::NAN, ..Default::default() },
            LightSettings { near: 10.0, far: 1.0, ..Default::default() },
            LightSettings { far: f32::INFINITY, ..Default::default() },
            LightSettings { position: Vec3::new(f32::NAN, 0.0, 10.0), ..Default::default() },
            LightSettings { target: Vec3::splat(f32::INFINITY), ..Default::default() },
            LightSettings { position: Vec3::ZERO, target: Vec3::ZERO, ..Default::default() },
        ];
        for light in rejected {
            assert!(
                matches!(light.validate(), Err(ShadeError::InvalidConfig(_))),
                "{light:?} accepted"
            );
        }
    }

    #[test]
    fn test_valid_light_gives_finite_projection() {
        let light = LightSettings {
            position: Vec3::new(3.0, -7.0, 12.0),
            target: Vec3::new(1.0, 1.0, 0.0),
            half_extent: 8.0,
            near: 0.5,
            far: 40.0,
        };
        assert!(light.validate().is_ok());
        assert!(light_view_projection(&light).is_finite());
    }

    #[test]
    fn test_light_projection_from_side() {
        let light = LightSettings {
            position: Vec3::new(20.0, 0.0, 0.0),
            ..Default::default()
        };
        let proj = light_view_projection(&light);
        assert!(proj.is_finite());
    }
}
