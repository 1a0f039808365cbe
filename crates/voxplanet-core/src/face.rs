use glam::{IVec3, Vec3};

/// One of the six axis-aligned block faces. The discriminant is the packed normal selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Face {
    PosX = 0,
    NegX = 1,
    PosY = 2,
    NegY = 3,
    PosZ = 4,
    NegZ = 5,
}

/// All six faces in selector order.
pub const ALL_FACES: [Face; 6] = [
    Face::PosX,
    Face::NegX,
    Face::PosY,
    Face::NegY,
    Face::PosZ,
    Face::NegZ,
];

/// Unit normal for every value a 4-bit selector can take.
///
/// Selectors 6..=15 are never emitted by the mesher. They decode to the zero vector,
/// which lights the fragment at the ambient floor instead of picking an arbitrary axis.
pub const FACE_NORMALS: [Vec3; 16] = [
    Vec3::X,
    Vec3::NEG_X,
    Vec3::Y,
    Vec3::NEG_Y,
    Vec3::Z,
    Vec3::NEG_Z,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
    Vec3::ZERO,
];

impl Face {
    /// Packed normal selector (0..6).
    pub fn selector(self) -> u32 {
        self as u32
    }

    /// Inverse of [`Face::selector`]. Returns `None` for the undefined selectors 6..=15.
    pub fn from_selector(selector: u32) -> Option<Face> {
        ALL_FACES.get(selector as usize).copied()
    }

    /// Outward unit normal.
    pub fn normal(self) -> Vec3 {
        FACE_NORMALS[self as usize]
    }

    /// Grid offset of the neighbor on the other side of this face.
    pub fn offset(self) -> IVec3 {
        self.normal().as_ivec3()
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Axis index (0 = x, 1 = y, 2 = z) this face is perpendicular to.
    pub fn axis(self) -> usize {
        self as usize / 2
    }

    /// True for +x, +y, +z.
    pub fn is_positive(self) -> bool {
        self as u8 % 2 == 0
    }
}
