use voxplanet_core::constants::ATLAS_CELLS;
use voxplanet_core::MAX_DETAIL;

use crate::bindings::{BindingLayouts, ResourceSlot};
use crate::error::RenderError;

/// Depth format of both the main depth target and the shadow map.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Halve every atlas cell with a 2x2 box filter and tile the result 2x2 inside the cell.
///
/// Each level keeps the atlas size, so a coarse quad spanning `2^(d-1)` blocks still maps
/// to one cell while showing one texel period per block. Cells narrower than two texels
/// cannot be halved and are returned unchanged.
pub fn subsample_atlas(texels: &[u8], width: u32, height: u32) -> Vec<u8> {
    let mut out = texels.to_vec();
    let cell_w = width / ATLAS_CELLS;
    let cell_h = height / ATLAS_CELLS;
    if cell_w < 2 || cell_h < 2 {
        return out;
    }
    let (half_w, half_h) = (cell_w / 2, cell_h / 2);
    let texel = |x: u32, y: u32| ((y * width + x) * 4) as usize;

    for cy in 0..ATLAS_CELLS {
        for cx in 0..ATLAS_CELLS {
            let (x0, y0) = (cx * cell_w, cy * cell_h);
            for py in 0..half_h {
                for px in 0..half_w {
                    let (sx, sy) = (x0 + 2 * px, y0 + 2 * py);
                    let mut merged = [0u8; 4];
                    for (channel, value) in merged.iter_mut().enumerate() {
                        let sum: u32 = [(sx, sy), (sx + 1, sy), (sx, sy + 1), (sx + 1, sy + 1)]
                            .iter()
                            .map(|&(x, y)| texels[texel(x, y) + channel] as u32)
                            .sum();
                        *value = (sum / 4) as u8;
                    }
                    for (ox, oy) in [(0, 0), (half_w, 0), (0, half_h), (half_w, half_h)] {
                        let i = texel(x0 + px + ox, y0 + py + oy);
                        out[i..i + 4].copy_from_slice(&merged);
                    }
                }
            }
        }
    }
    out
}

/// Full-resolution atlas followed by one subsampled copy per further detail level.
pub fn atlas_detail_levels(texels: &[u8], width: u32, height: u32) -> Vec<Vec<u8>> {
    let mut levels = vec![texels.to_vec()];
    while levels.len() < MAX_DETAIL as usize {
        let next = levels
            .last()
            .map(|prev| subsample_atlas(prev, width, height))
            .unwrap_or_default();
        levels.push(next);
    }
    levels
}

/// One detail level of the atlas.
pub struct AtlasLevel {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
}

/// Diffuse texture atlas (16x16 cells) with one subsampled level per mesh detail level.
pub struct AtlasTexture {
    pub levels: Vec<AtlasLevel>,
    pub sampler: wgpu::Sampler,
}

impl AtlasTexture {
    /// Upload tightly packed RGBA8 (sRGB) texels and build the coarser detail levels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layouts: &BindingLayouts,
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(RenderError::AtlasSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        // Nearest keeps neighboring atlas cells from bleeding into each other
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("diffuse-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let levels = atlas_detail_levels(bytes, width, height)
            .iter()
            .enumerate()
            .map(|(i, texels)| {
                upload_level(device, queue, layouts, &sampler, i as u32 + 1, width, height, texels)
            })
            .collect();

        log::debug!("uploaded {width}x{height} diffuse atlas with {MAX_DETAIL} detail levels");
        Ok(Self { levels, sampler })
    }

    /// Level matching a mesh detail; out-of-range details clamp to the nearest level.
    pub fn level(&self, detail: u32) -> &AtlasLevel {
        let index = (detail.max(1) as usize - 1).min(self.levels.len() - 1);
        &self.levels[index]
    }

    pub fn bind_group(&self, detail: u32) -> &wgpu::BindGroup {
        &self.level(detail).bind_group
    }
}

#[allow(clippy::too_many_arguments)]
fn upload_level(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layouts: &BindingLayouts,
    sampler: &wgpu::Sampler,
    detail: u32,
    width: u32,
    height: u32,
    texels: &[u8],
) -> AtlasLevel {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let label = format!("diffuse-atlas-{detail}");
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label.as_str()),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        texels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group_label = format!("{label}-bg");
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(bind_group_label.as_str()),
        layout: layouts.get(ResourceSlot::Texture),
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    AtlasLevel {
        texture,
        view,
        bind_group,
    }
}

/// Main-pass depth attachment. Recreated on resize.
pub struct DepthTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("main-depth"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
