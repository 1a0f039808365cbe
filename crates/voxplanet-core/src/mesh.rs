//! Chunk mesher: turns a 16^3 block grid into packed-vertex quads for every exposed face.

use std::ops::{Index, IndexMut};

use glam::{BVec3, UVec2, UVec3};

use crate::constants::{ATLAS_CELLS, BLOCK_GRID_SIZE};
use crate::error::ShadeError;
use crate::face::{Face, ALL_FACES};
use crate::types::PackedVertex;
use crate::vertex::atlas_cell_for_block;

/// Blocks per chunk (16^3).
pub const BLOCKS_PER_CHUNK: usize = (BLOCK_GRID_SIZE * BLOCK_GRID_SIZE * BLOCK_GRID_SIZE) as usize;

/// Coarsest detail level: one sample per 16 blocks.
pub const MAX_DETAIL: u32 = 5;

/// Block ids of one chunk, x fastest. Id 0 is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGrid {
    blocks: Vec<u16>,
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self {
            blocks: vec![0; BLOCKS_PER_CHUNK],
        }
    }
}

impl BlockGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(block: u16) -> Self {
        Self {
            blocks: vec![block; BLOCKS_PER_CHUNK],
        }
    }

    /// Block at a signed position; anything outside the grid reads as empty.
    pub fn get(&self, x: i32, y: i32, z: i32) -> u16 {
        let size = BLOCK_GRID_SIZE as i32;
        if !(0..size).contains(&x) || !(0..size).contains(&y) || !(0..size).contains(&z) {
            return 0;
        }
        self[(x as u32, y as u32, z as u32)]
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|&b| b == 0)
    }

    fn flat_index(index: (u32, u32, u32)) -> usize {
        let s = BLOCK_GRID_SIZE;
        (index.0 + index.1 * s + index.2 * s * s) as usize
    }
}

impl Index<(u32, u32, u32)> for BlockGrid {
    type Output = u16;

    fn index(&self, index: (u32, u32, u32)) -> &Self::Output {
        &self.blocks[Self::flat_index(index)]
    }
}

impl IndexMut<(u32, u32, u32)> for BlockGrid {
    fn index_mut(&mut self, index: (u32, u32, u32)) -> &mut Self::Output {
        &mut self.blocks[Self::flat_index(index)]
    }
}

/// CPU-side mesh ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<PackedVertex>,
    pub indices: Vec<u32>,
    /// Detail level the mesh was built at; selects the matching atlas level when drawn.
    pub detail: u32,
}

impl ChunkMesh {
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// The two in-plane axes of a face, ordered so that u x v points along the positive axis.
fn plane_axes(face: Face) -> (usize, usize) {
    match face.axis() {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    }
}

/// Encode a corner coordinate in 0..=16. 16 becomes 0 plus a wrap flag.
fn split_wrap(coord: UVec3) -> (UVec3, BVec3) {
    let wrap = coord.cmpeq(UVec3::splat(BLOCK_GRID_SIZE));
    (coord % BLOCK_GRID_SIZE, wrap)
}

/// Build the exposed-face mesh of a chunk.
///
/// `detail` 1 meshes every block; each further level doubles the sampling step, so level `d`
/// treats every `2^(d-1)`-th block as a cube of that edge length.
pub fn build_chunk_mesh(grid: &BlockGrid, detail: u32) -> Result<ChunkMesh, ShadeError> {
    if detail == 0 || detail > MAX_DETAIL {
        return Err(ShadeError::InvalidDetail(detail));
    }
    let step = 1u32 << (detail - 1);
    let mut mesh = ChunkMesh {
        detail,
        ..ChunkMesh::default()
    };

    for z in (0..BLOCK_GRID_SIZE).step_by(step as usize) {
        for y in (0..BLOCK_GRID_SIZE).step_by(step as usize) {
            for x in (0..BLOCK_GRID_SIZE).step_by(step as usize) {
                let block = grid[(x, y, z)];
                if block == 0 {
                    continue;
                }
                let origin = UVec3::new(x, y, z);
                for face in ALL_FACES {
                    let neighbor = origin.as_ivec3() + face.offset() * step as i32;
                    if grid.get(neighbor.x, neighbor.y, neighbor.z) != 0 {
                        continue;
                    }
                    push_quad(&mut mesh, origin, step, face, atlas_cell_for_block(block))?;
                }
            }
        }
    }

    log::debug!(
        "meshed chunk at detail {detail}: {} quads, {} vertices",
        mesh.quad_count(),
        mesh.vertices.len()
    );
    Ok(mesh)
}

fn push_quad(
    mesh: &mut ChunkMesh,
    origin: UVec3,
    step: u32,
    face: Face,
    cell: UVec2,
) -> Result<(), ShadeError> {
    let (u, v) = plane_axes(face);
    let mut plane = origin;
    if face.is_positive() {
        plane[face.axis()] += step;
    }

    let base = mesh.vertices.len() as u32;
    // Corners in (u, v) order: (0,0), (0,1), (1,1), (1,0)
    for (du, dv) in [(0, 0), (0, 1), (1, 1), (1, 0)] {
        let mut corner = plane;
        corner[u] += du * step;
        corner[v] += dv * step;
        let (position, wrap) = split_wrap(corner);
        // The last atlas column/row has no right/bottom neighbor cell to extend into
        let atlas = UVec2::new(
            (cell.x + du).min(ATLAS_CELLS - 1),
            (cell.y + dv).min(ATLAS_CELLS - 1),
        );
        mesh.vertices
            .push(PackedVertex::pack(position, wrap, face, atlas)?);
    }

    // Counter-clockwise seen from outside the block
    let order: [u32; 6] = if face.is_positive() {
        [0, 2, 1, 0, 3, 2]
    } else {
        [0, 1, 2, 0, 2, 3]
    };
    mesh.indices.extend(order.iter().map(|i| base + i));
    Ok(())
}
