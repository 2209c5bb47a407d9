//! Local removability test for directional 3D thinning.
//!
//! A voxel may be deleted in a directional pass when:
//! - it is a border voxel for that direction (the face neighbor is background);
//! - it is not an isolated voxel or a curve end (at least two object neighbors);
//! - in [`ThinningMode::SheetPreserving`], it is not one voxel thick along
//!   any axis (both face neighbors on that axis background);
//! - it is *simple*: exactly one 26-component of object voxels in its
//!   26-neighborhood and exactly one 6-component of background voxels in its
//!   18-neighborhood that touches one of its faces.
//!
//! The last condition is the topological-number characterization of simple
//! points for (26, 6) connectivity: deleting a single voxel that passes it
//! leaves the topology of both object and background unchanged.

use sk_core::{FACE_MASK, N18_MASK, NeighborhoodCode, adjacent6_mask, adjacent26_mask, opposite};

use crate::Direction;

// One face index per axis: z-, y-, x-.
const SHEET_AXES: [usize; 3] = [4, 10, 12];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThinningMode {
    /// Keeps one-voxel-thick sheets; suitable for medial surfaces.
    SheetPreserving,
    /// Erodes toward a one-voxel-wide centerline.
    #[default]
    Full,
}

pub fn is_removable(code: NeighborhoodCode, direction: Direction, mode: ThinningMode) -> bool {
    let face = direction.neighbor();
    if code.contains(face) {
        return false;
    }

    if code.count() <= 1 {
        return false;
    }

    if mode == ThinningMode::SheetPreserving && is_sheet_point(code) {
        return false;
    }

    is_simple(code)
}

/// True when the voxel is one voxel thick along at least one axis.
pub fn is_sheet_point(code: NeighborhoodCode) -> bool {
    SHEET_AXES
        .iter()
        .any(|&f| !code.contains(f) && !code.contains(opposite(f)))
}

pub fn is_simple(code: NeighborhoodCode) -> bool {
    object_components(code) == 1 && background_components(code) == 1
}

/// Number of 26-connected object components among the 26 neighbors.
pub fn object_components(code: NeighborhoodCode) -> u32 {
    let mut remaining = code.bits();
    let mut n = 0;
    while remaining != 0 {
        let comp = grow(remaining, remaining.trailing_zeros() as usize, adjacent26_mask);
        remaining &= !comp;
        n += 1;
    }
    n
}

/// Number of 6-connected background components within the 18-neighborhood
/// that contain at least one face neighbor.
pub fn background_components(code: NeighborhoodCode) -> u32 {
    let background = !code.bits() & N18_MASK;
    let mut seeds = background & FACE_MASK;
    let mut n = 0;
    while seeds != 0 {
        let comp = grow(background, seeds.trailing_zeros() as usize, adjacent6_mask);
        seeds &= !comp;
        n += 1;
    }
    n
}

fn grow(within: u32, seed: usize, adjacency: fn(usize) -> u32) -> u32 {
    let mut comp = 1u32 << seed;
    let mut frontier = comp;
    while frontier != 0 {
        let mut next = 0u32;
        let mut bits = frontier;
        while bits != 0 {
            let i = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            next |= adjacency(i);
        }
        next &= within & !comp;
        comp |= next;
        frontier = next;
    }
    comp
}
