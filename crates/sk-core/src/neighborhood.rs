//! 26-neighborhood enumeration and the per-voxel neighborhood code.
//!
//! Neighbors are numbered `0..26` in lexicographic `(dz, dy, dx)` order over
//! the 3x3x3 block with the center removed. Index `13` in the full 27-block
//! is the center, so the opposite of neighbor `i` is always `25 - i`.

use crate::{Coord3i, VolumeView};

pub const NEIGHBOR_COUNT: usize = 26;

pub const NEIGHBOR_OFFSETS: [Coord3i; NEIGHBOR_COUNT] = build_offsets();

/// The six face neighbors.
pub const FACE_MASK: u32 = build_mask_by_manhattan(1);

/// Face and edge neighbors (the 18-neighborhood).
pub const N18_MASK: u32 = build_mask_by_manhattan(2);

pub const ALL_MASK: u32 = (1 << NEIGHBOR_COUNT) - 1;

const ADJ26: [u32; NEIGHBOR_COUNT] = build_adjacency(false);
const ADJ6: [u32; NEIGHBOR_COUNT] = build_adjacency(true);
const BETWEEN: [u32; NEIGHBOR_COUNT] = build_between();

/// Index of the neighbor at offset `(dx, dy, dz)`, each component in `-1..=1`.
pub const fn neighbor_index(dx: i32, dy: i32, dz: i32) -> Option<usize> {
    if dx < -1 || dx > 1 || dy < -1 || dy > 1 || dz < -1 || dz > 1 {
        return None;
    }
    let k = ((dz + 1) * 9 + (dy + 1) * 3 + (dx + 1)) as usize;
    if k == 13 {
        None
    } else if k > 13 {
        Some(k - 1)
    } else {
        Some(k)
    }
}

#[inline]
pub const fn opposite(i: usize) -> usize {
    NEIGHBOR_COUNT - 1 - i
}

/// Neighbors of `i` (within the 26-neighborhood) that are 26-adjacent to it.
#[inline]
pub const fn adjacent26_mask(i: usize) -> u32 {
    ADJ26[i]
}

/// Neighbors of `i` (within the 26-neighborhood) that share a face with it.
#[inline]
pub const fn adjacent6_mask(i: usize) -> u32 {
    ADJ6[i]
}

/// Neighbors lying strictly between the center and neighbor `i`: every
/// nonzero offset whose components are each `0` or equal to the matching
/// component of `i`. Empty for face neighbors.
#[inline]
pub const fn between_mask(i: usize) -> u32 {
    BETWEEN[i]
}

/// Bit `i` is set iff the voxel at `NEIGHBOR_OFFSETS[i]` is object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NeighborhoodCode(u32);

impl NeighborhoodCode {
    pub const EMPTY: NeighborhoodCode = NeighborhoodCode(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & ALL_MASK)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn contains(self, i: usize) -> bool {
        (self.0 >> i) & 1 != 0
    }

    pub const fn with(self, i: usize) -> Self {
        Self(self.0 | (1 << i))
    }

    pub const fn without(self, i: usize) -> Self {
        Self(self.0 & !(1 << i))
    }

    pub const fn face_count(self) -> u32 {
        (self.0 & FACE_MASK).count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..NEIGHBOR_COUNT).filter(move |&i| self.contains(i))
    }
}

/// Computes the neighborhood code of `p`. Neighbors outside the volume are
/// background; `p` itself is not inspected.
pub fn neighborhood_code(view: &VolumeView<'_, u8>, p: Coord3i) -> NeighborhoodCode {
    let mut bits = 0u32;
    for (i, &d) in NEIGHBOR_OFFSETS.iter().enumerate() {
        if view.is_object(p + d) {
            bits |= 1 << i;
        }
    }
    NeighborhoodCode(bits)
}

const fn build_offsets() -> [Coord3i; NEIGHBOR_COUNT] {
    let mut out = [Coord3i::new(0, 0, 0); NEIGHBOR_COUNT];
    let mut i = 0;
    let mut k = 0;
    while k < 27 {
        if k != 13 {
            out[i] = Coord3i::new(
                (k % 3) as i32 - 1,
                ((k / 3) % 3) as i32 - 1,
                (k / 9) as i32 - 1,
            );
            i += 1;
        }
        k += 1;
    }
    out
}

const fn manhattan(a: Coord3i, b: Coord3i) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()
}

const fn chebyshev(a: Coord3i, b: Coord3i) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let dz = (a.z - b.z).abs();
    let m = if dx > dy { dx } else { dy };
    if m > dz { m } else { dz }
}

const fn build_mask_by_manhattan(max: i32) -> u32 {
    let offsets = build_offsets();
    let origin = Coord3i::new(0, 0, 0);
    let mut mask = 0u32;
    let mut i = 0;
    while i < NEIGHBOR_COUNT {
        if manhattan(offsets[i], origin) <= max {
            mask |= 1 << i;
        }
        i += 1;
    }
    mask
}

const fn build_adjacency(face_only: bool) -> [u32; NEIGHBOR_COUNT] {
    let offsets = build_offsets();
    let mut out = [0u32; NEIGHBOR_COUNT];
    let mut i = 0;
    while i < NEIGHBOR_COUNT {
        let mut j = 0;
        while j < NEIGHBOR_COUNT {
            let adjacent = if face_only {
                manhattan(offsets[i], offsets[j]) == 1
            } else {
                i != j && chebyshev(offsets[i], offsets[j]) == 1
            };
            if adjacent {
                out[i] |= 1 << j;
            }
            j += 1;
        }
        i += 1;
    }
    out
}

const fn sub_component(part: i32, full: i32) -> bool {
    part == 0 || part == full
}

const fn build_between() -> [u32; NEIGHBOR_COUNT] {
    let offsets = build_offsets();
    let mut out = [0u32; NEIGHBOR_COUNT];
    let mut i = 0;
    while i < NEIGHBOR_COUNT {
        let o = offsets[i];
        let mut j = 0;
        while j < NEIGHBOR_COUNT {
            let s = offsets[j];
            if j != i && sub_component(s.x, o.x) && sub_component(s.y, o.y) && sub_component(s.z, o.z)
            {
                out[i] |= 1 << j;
            }
            j += 1;
        }
        i += 1;
    }
    out
}
