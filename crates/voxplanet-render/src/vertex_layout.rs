use voxplanet_core::{FlatVertex, PackedVertex, VertexInput};

const PACKED_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Uint32];

const FLAT_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

/// Vertex buffer layout matching the `VertexInput` struct of the decode snippet.
pub fn vertex_buffer_layout(input: VertexInput) -> wgpu::VertexBufferLayout<'static> {
    match input {
        VertexInput::Packed => wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PackedVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &PACKED_ATTRIBUTES,
        },
        VertexInput::Flat => wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FlatVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &FLAT_ATTRIBUTES,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_packed_stride() {
        let layout = vertex_buffer_layout(VertexInput::Packed);
        assert_eq!(layout.array_stride, 4);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Uint32);
    }

    #[test]
    fn test_flat_offsets_match_struct() {
        let layout = vertex_buffer_layout(VertexInput::Flat);
        assert_eq!(layout.array_stride, 32);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(
            offsets,
            vec![
                offset_of!(FlatVertex, position) as u64,
                offset_of!(FlatVertex, normal) as u64,
                offset_of!(FlatVertex, uv) as u64,
            ]
        );
    }
}
