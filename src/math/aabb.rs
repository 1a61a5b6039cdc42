//! Axis-aligned block boxes

use crate::core::types::IVec3;

/// Axis-aligned box of whole blocks, inclusive on both corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl BlockBox {
    /// Create a box from two corners (ordered per axis)
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create a box from its lowest corner and a size in blocks.
    /// A zero size on any axis yields a single-block slab on that axis.
    pub fn from_corner_size(corner: IVec3, size: IVec3) -> Self {
        let extent = (size - IVec3::ONE).max(IVec3::ZERO);
        Self {
            min: corner,
            max: corner + extent,
        }
    }

    /// Get size in blocks along each axis
    pub fn size(&self) -> IVec3 {
        self.max - self.min + IVec3::ONE
    }
}
