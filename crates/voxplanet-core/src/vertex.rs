use glam::{BVec3, UVec2, UVec3, Vec2};

use crate::constants::{
    ATLAS_CELLS, ATLAS_COLUMN_SHIFT, ATLAS_ROW_SHIFT, BLOCK_GRID_SIZE, FACE_COUNT, NIBBLE_MASK,
    NORMAL_SHIFT, POS_X_SHIFT, POS_Y_SHIFT, POS_Z_SHIFT, UNUSED_BITS_MASK, WRAP_X_BIT, WRAP_Y_BIT,
    WRAP_Z_BIT,
};
use crate::error::ShadeError;
use crate::face::{Face, FACE_NORMALS};
use crate::types::{DecodedVertex, PackedVertex, VertexFields};

impl PackedVertex {
    /// Pack a block corner.
    ///
    /// `position` components and `atlas_cell` components must be in 0..16. A corner that lies
    /// on the far chunk boundary (coordinate 16) is expressed as 0 with the matching `wrap` flag.
    pub fn pack(
        position: UVec3,
        wrap: BVec3,
        face: Face,
        atlas_cell: UVec2,
    ) -> Result<PackedVertex, ShadeError> {
        for (axis, value) in ['x', 'y', 'z'].into_iter().zip(position.to_array()) {
            if value >= BLOCK_GRID_SIZE {
                return Err(ShadeError::PositionOutOfRange { axis, value });
            }
        }
        if atlas_cell.x >= ATLAS_CELLS || atlas_cell.y >= ATLAS_CELLS {
            return Err(ShadeError::AtlasCellOutOfRange {
                column: atlas_cell.x,
                row: atlas_cell.y,
            });
        }

        let word = (position.x << POS_X_SHIFT)
            | (position.y << POS_Y_SHIFT)
            | (position.z << POS_Z_SHIFT)
            | (face.selector() << NORMAL_SHIFT)
            | (atlas_cell.x << ATLAS_COLUMN_SHIFT)
            | (atlas_cell.y << ATLAS_ROW_SHIFT)
            | ((wrap.x as u32) << WRAP_X_BIT)
            | ((wrap.y as u32) << WRAP_Y_BIT)
            | ((wrap.z as u32) << WRAP_Z_BIT);
        Ok(PackedVertex(word))
    }

    /// Split the word into its integer fields. Total over all 2^32 inputs.
    pub fn fields(self) -> VertexFields {
        let w = self.0;
        VertexFields {
            position: UVec3::new(
                (w >> POS_X_SHIFT) & NIBBLE_MASK,
                (w >> POS_Y_SHIFT) & NIBBLE_MASK,
                (w >> POS_Z_SHIFT) & NIBBLE_MASK,
            ),
            selector: (w >> NORMAL_SHIFT) & NIBBLE_MASK,
            atlas_cell: UVec2::new(
                (w >> ATLAS_COLUMN_SHIFT) & NIBBLE_MASK,
                (w >> ATLAS_ROW_SHIFT) & NIBBLE_MASK,
            ),
            wrap: BVec3::new(
                (w >> WRAP_X_BIT) & 1 == 1,
                (w >> WRAP_Y_BIT) & 1 == 1,
                (w >> WRAP_Z_BIT) & 1 == 1,
            ),
        }
    }

    /// Decoded face, or `None` for the undefined selectors 6..=15.
    pub fn face(self) -> Option<Face> {
        Face::from_selector(self.fields().selector)
    }
}

/// Decode a packed vertex into position, normal and atlas offset.
///
/// Pure and total: every word decodes, and the same word always decodes to the same value.
/// The normal comes from [`FACE_NORMALS`], so selectors 6..=15 yield a zero normal.
pub fn decode_vertex(vertex: PackedVertex) -> DecodedVertex {
    let fields = vertex.fields();
    DecodedVertex {
        position: fields.position.as_vec3(),
        wrap: fields.wrap,
        normal: FACE_NORMALS[fields.selector as usize],
        uv: fields.atlas_cell.as_vec2() / ATLAS_CELLS as f32,
    }
}

/// Check a single vertex against the mesher's contract.
pub fn validate_vertex(vertex: PackedVertex) -> Result<(), ShadeError> {
    let selector = vertex.fields().selector;
    if selector >= FACE_COUNT {
        return Err(ShadeError::InvalidNormalSelector(selector));
    }
    if vertex.0 & UNUSED_BITS_MASK != 0 {
        log::debug!("packed vertex {:#010x} has unused high bits set", vertex.0);
    }
    Ok(())
}

/// Host-side validation before upload. Reports the first offending vertex.
pub fn validate_vertices(vertices: &[PackedVertex]) -> Result<(), ShadeError> {
    for (index, &vertex) in vertices.iter().enumerate() {
        if let Err(source) = validate_vertex(vertex) {
            log::warn!("rejecting vertex buffer: vertex {index} ({:#010x}): {source}", vertex.0);
            return Err(ShadeError::InvalidVertex {
                index,
                source: Box::new(source),
            });
        }
    }
    Ok(())
}

/// Atlas cell for a block id: low nibble is the column, next nibble the row.
pub fn atlas_cell_for_block(block: u16) -> UVec2 {
    let id = block as u32;
    UVec2::new(id & NIBBLE_MASK, (id >> 4) & NIBBLE_MASK)
}

/// UV offset of an atlas cell, for callers that need it without packing.
pub fn atlas_uv(cell: UVec2) -> Vec2 {
    cell.as_vec2() / ATLAS_CELLS as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::ALL_FACES;
    use glam::Vec3;
    use proptest::prelude::*;

    #[test]
    fn test_zero_word_decodes_to_origin_pos_x() {
        let v = decode_vertex(PackedVertex(0));
        assert_eq!(v.position, Vec3::ZERO);
        assert_eq!(v.normal, Vec3::X);
        assert_eq!(v.uv, Vec2::ZERO);
        assert_eq!(v.wrap, BVec3::FALSE);
    }

    #[test]
    fn test_known_word() {
        // x=3 y=5 z=7, -y face, atlas (2, 9), wrap z
        let word = 3 | (5 << 4) | (7 << 8) | (3 << 12) | (2 << 16) | (9 << 20) | (1 << 26);
        let v = decode_vertex(PackedVertex(word));
        assert_eq!(v.position, Vec3::new(3.0, 5.0, 7.0));
        assert_eq!(v.normal, Vec3::NEG_Y);
        assert_eq!(v.uv, Vec2::new(2.0 / 16.0, 9.0 / 16.0));
        assert_eq!(v.wrap, BVec3::new(false, false, true));
        assert_eq!(v.local_position(), Vec3::new(3.0, 5.0, 23.0));
    }

    #[test]
    fn test_pack_matches_decode() {
        for face in ALL_FACES {
            let packed = PackedVertex::pack(
                UVec3::new(15, 0, 9),
                BVec3::new(true, false, true),
                face,
                UVec2::new(15, 4),
            )
            .unwrap();
            let v = decode_vertex(packed);
            assert_eq!(v.position, Vec3::new(15.0, 0.0, 9.0));
            assert_eq!(v.normal, face.normal());
            assert_eq!(v.uv, Vec2::new(15.0 / 16.0, 4.0 / 16.0));
            assert_eq!(v.local_position(), Vec3::new(31.0, 0.0, 25.0));
            assert_eq!(packed.face(), Some(face));
        }
    }

    #[test]
    fn test_pack_rejects_out_of_range() {
        let err = PackedVertex::pack(UVec3::new(0, 16, 0), BVec3::FALSE, Face::PosX, UVec2::ZERO)
            .unwrap_err();
        assert!(matches!(err, ShadeError::PositionOutOfRange { axis: 'y', value: 16 }));

        let err = PackedVertex::pack(UVec3::ZERO, BVec3::FALSE, Face::PosX, UVec2::new(0, 16))
            .unwrap_err();
        assert!(matches!(err, ShadeError::AtlasCellOutOfRange { column: 0, row: 16 }));
    }

    #[test]
    fn test_undefined_selector_decodes_to_zero_normal() {
        for selector in 6..16u32 {
            let v = decode_vertex(PackedVertex(selector << NORMAL_SHIFT));
            assert_eq!(v.normal, Vec3::ZERO);
            assert_eq!(PackedVertex(selector << NORMAL_SHIFT).face(), None);
        }
    }

    #[test]
    fn test_validate_vertices_reports_index() {
        let good = PackedVertex(2 << NORMAL_SHIFT);
        let bad = PackedVertex(9 << NORMAL_SHIFT);
        assert!(validate_vertices(&[good, good]).is_ok());
        match validate_vertices(&[good, good, bad, good]) {
            Err(ShadeError::InvalidVertex { index, source }) => {
                assert_eq!(index, 2);
                assert!(matches!(*source, ShadeError::InvalidNormalSelector(9)));
            }
            other => panic!("expected InvalidVertex, got {other:?}"),
        }
    }

    #[test]
    fn test_atlas_cell_for_block() {
        assert_eq!(atlas_cell_for_block(0x37), UVec2::new(7, 3));
        assert_eq!(atlas_cell_for_block(0xFF), UVec2::new(15, 15));
        // Bits above the row nibble are ignored
        assert_eq!(atlas_cell_for_block(0x1A2), UVec2::new(2, 10));
        assert_eq!(atlas_uv(UVec2::new(8, 4)), Vec2::new(0.5, 0.25));
    }

    proptest! {
        #[test]
        fn prop_decode_is_total_and_in_range(low in 0u32..(1 << 27), selector in 0u32..6) {
            let word = (low & !(NIBBLE_MASK << NORMAL_SHIFT)) | (selector << NORMAL_SHIFT);
            let v = decode_vertex(PackedVertex(word));
            for c in v.position.to_array() {
                prop_assert!((0.0..=15.0).contains(&c));
                prop_assert_eq!(c.fract(), 0.0);
            }
            prop_assert!(ALL_FACES.iter().any(|f| f.normal() == v.normal));
            for c in v.uv.to_array() {
                prop_assert!((0.0..=15.0 / 16.0).contains(&c));
            }
        }

        #[test]
        fn prop_decode_is_pure(word in any::<u32>()) {
            prop_assert_eq!(decode_vertex(PackedVertex(word)), decode_vertex(PackedVertex(word)));
        }

        #[test]
        fn prop_pack_decode_agree(
            x in 0u32..16, y in 0u32..16, z in 0u32..16,
            face_index in 0usize..6,
            col in 0u32..16, row in 0u32..16,
            wx in any::<bool>(), wy in any::<bool>(), wz in any::<bool>(),
        ) {
            let face = ALL_FACES[face_index];
            let wrap = BVec3::new(wx, wy, wz);
            let packed = PackedVertex::pack(UVec3::new(x, y, z), wrap, face, UVec2::new(col, row)).unwrap();
            let fields = packed.fields();
            prop_assert_eq!(fields.position, UVec3::new(x, y, z));
            prop_assert_eq!(fields.selector, face.selector());
            prop_assert_eq!(fields.atlas_cell, UVec2::new(col, row));
            prop_assert_eq!(fields.wrap, wrap);
            prop_assert!(validate_vertex(packed).is_ok());
        }
    }
}
