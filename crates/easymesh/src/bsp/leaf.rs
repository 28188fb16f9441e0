//! Leaf records stored in the tree arena.

use crate::Plane3D;

/// Child slot of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LeafSlot {
    Back = 0,
    Front = 1,
    /// Next leaf sharing this leaf's plane.
    Above = 2,
}

/// One splitting plane of the tree.
///
/// Children are indices into the owning tree's leaf list.
#[derive(Debug, Clone)]
pub(super) struct CsgBspLeaf {
    plane: Plane3D,
    children: [Option<usize>; 3],
    /// Input triangles that generated this leaf.
    triangles: Vec<usize>,
}

impl CsgBspLeaf {
    pub(super) fn new(plane: Plane3D, triangle: usize) -> Self {
        Self {
            plane,
            children: [None; 3],
            triangles: vec![triangle],
        }
    }

    #[inline]
    pub(super) fn plane(&self) -> &Plane3D {
        &self.plane
    }

    #[inline]
    pub(super) fn child(&self, slot: LeafSlot) -> Option<usize> {
        self.children[slot as usize]
    }

    #[inline]
    pub(super) fn set_child(&mut self, slot: LeafSlot, leaf: usize) {
        self.children[slot as usize] = Some(leaf);
    }

    #[inline]
    pub(super) fn generated_by(&self, triangle: usize) -> bool {
        self.triangles.contains(&triangle)
    }
}
