use glam::{BVec3, UVec2, UVec3, Vec2, Vec3};

use crate::constants::WRAP_OFFSET;

/// One block-corner vertex packed into a single u32.
///
/// Bit layout:
///   [0:3]    x position (0..15)
///   [4:7]    y position (0..15)
///   [8:11]   z position (0..15)
///   [12:15]  normal selector (0..5 = +x, -x, +y, -y, +z, -z; 6..15 undefined)
///   [16:19]  atlas cell column
///   [20:23]  atlas cell row
///   [24]     x chunk wrap
///   [25]     y chunk wrap
///   [26]     z chunk wrap
///   [27:31]  unused
///
/// The vertex buffer is a tightly packed array of these words (stride 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct PackedVertex(pub u32);

/// Unpacked vertex for non-block meshes (UI quads, planet surfaces).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl FlatVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// Result of decoding a [`PackedVertex`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedVertex {
    /// Block-local grid position, each component in 0..=15. Wrap flags are not applied.
    pub position: Vec3,
    /// Chunk-boundary wrap flags for x, y, z.
    pub wrap: BVec3,
    /// One of the six axis unit vectors, or zero for an undefined selector.
    pub normal: Vec3,
    /// Atlas cell offset in UV space, each component in 0..=15/16.
    pub uv: Vec2,
}

impl DecodedVertex {
    /// Position with wrap offsets applied. This is what the model matrix sees.
    pub fn local_position(&self) -> Vec3 {
        self.position + Vec3::select(self.wrap, Vec3::splat(WRAP_OFFSET), Vec3::ZERO)
    }
}

/// The raw integer fields of a packed vertex, before conversion to floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFields {
    pub position: UVec3,
    pub selector: u32,
    pub atlas_cell: UVec2,
    pub wrap: BVec3,
}
