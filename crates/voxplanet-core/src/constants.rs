//! Single source of truth for constants shared by Rust and WGSL.
//! The render crate injects these into every composed shader preamble.

/// Side length of a chunk's block grid. Packed positions address 0..BLOCK_GRID_SIZE.
pub const BLOCK_GRID_SIZE: u32 = 16;

/// Offset added to a position component whose chunk-boundary wrap flag is set.
pub const WRAP_OFFSET: f32 = BLOCK_GRID_SIZE as f32;

/// Cells per side of the diffuse texture atlas.
pub const ATLAS_CELLS: u32 = 16;

/// Number of face-normal selectors that carry a meaning (±x, ±y, ±z).
pub const FACE_COUNT: u32 = 6;

// Packed vertex bit layout.

/// Mask for a single 4-bit field.
pub const NIBBLE_MASK: u32 = 0xF;
pub const POS_X_SHIFT: u32 = 0;
pub const POS_Y_SHIFT: u32 = 4;
pub const POS_Z_SHIFT: u32 = 8;
pub const NORMAL_SHIFT: u32 = 12;
pub const ATLAS_COLUMN_SHIFT: u32 = 16;
pub const ATLAS_ROW_SHIFT: u32 = 20;
pub const WRAP_X_BIT: u32 = 24;
pub const WRAP_Y_BIT: u32 = 25;
pub const WRAP_Z_BIT: u32 = 26;

/// Bits 27..31 carry nothing. A packed word with any of them set did not come from the mesher.
pub const UNUSED_BITS_MASK: u32 = !((1 << 27) - 1);

// Lighting.

/// Depth bias applied before the shadow comparison to suppress shadow acne.
pub const SHADOW_BIAS: f32 = 0.005;

/// Illumination floor for variants without a shadow map.
pub const AMBIENT_FLOOR_UNSHADOWED: f32 = 0.0;

/// Illumination floor for the shadow-mapped variant. Keeps occluded faces from going black.
pub const AMBIENT_FLOOR_SHADOWED: f32 = 0.1;

/// Default shadow map edge length in texels.
pub const DEFAULT_SHADOW_MAP_SIZE: u32 = 2048;

// Color quantizer.

/// Grid steps per HSL channel. Values snap to k / QUANT_STEPS for k in 0..=QUANT_STEPS (33 levels).
pub const QUANT_STEPS: f32 = 32.0;
