use log::{debug, trace};
use sk_core::{Coord3i, Volume, VolumeView, neighborhood_code};

use crate::removable::{ThinningMode, is_removable};

/// Axis-aligned border direction of one thinning subiteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    XNeg,
    XPos,
    YNeg,
    YPos,
    ZNeg,
    ZPos,
}

impl Direction {
    /// Subiteration order of one thinning round. Opposite directions follow
    /// each other so erosion stays centered.
    pub const ALL: [Direction; 6] = [
        Direction::YNeg,
        Direction::YPos,
        Direction::XPos,
        Direction::XNeg,
        Direction::ZPos,
        Direction::ZNeg,
    ];

    pub fn offset(self) -> Coord3i {
        match self {
            Self::XNeg => Coord3i::new(-1, 0, 0),
            Self::XPos => Coord3i::new(1, 0, 0),
            Self::YNeg => Coord3i::new(0, -1, 0),
            Self::YPos => Coord3i::new(0, 1, 0),
            Self::ZNeg => Coord3i::new(0, 0, -1),
            Self::ZPos => Coord3i::new(0, 0, 1),
        }
    }

    /// Index of the face neighbor in [`sk_core::NEIGHBOR_OFFSETS`].
    pub fn neighbor(self) -> usize {
        match self {
            Self::ZNeg => 4,
            Self::YNeg => 10,
            Self::XNeg => 12,
            Self::XPos => 13,
            Self::YPos => 15,
            Self::ZPos => 21,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThinningStats {
    /// Full rounds of six directional passes, including the final empty one.
    pub rounds: usize,
    pub removed: usize,
}

/// Thins a binary volume and returns a new `0`/`1` volume of the same size.
pub fn thin(src: &VolumeView<'_, u8>, mode: ThinningMode) -> Volume<u8> {
    let mut out = src.to_volume();
    thin_in_place(&mut out, mode);
    out
}

/// Thins `vol` until a full round of directional passes removes nothing.
///
/// Values are normalized to `0`/`1` first. An all-background volume is
/// returned unchanged.
pub fn thin_in_place(vol: &mut Volume<u8>, mode: ThinningMode) -> ThinningStats {
    for v in vol.data_mut() {
        *v = u8::from(*v != 0);
    }

    let mut stats = ThinningStats::default();
    loop {
        let mut removed = 0;
        for dir in Direction::ALL {
            removed += thin_direction(vol, dir, mode);
        }

        stats.rounds += 1;
        stats.removed += removed;
        debug!(
            "thinning round {}: removed {removed} voxels ({mode:?})",
            stats.rounds
        );

        if removed == 0 {
            break;
        }
    }

    stats
}

/// One directional subiteration.
///
/// Candidates are collected against the volume as it stands at the start of
/// the pass, then deleted one by one. Each deletion re-checks the criterion
/// against the live volume, since two simple voxels may not be removable
/// together. When two candidates conflict, the one earlier in scan order is
/// deleted and the other kept, so the result depends on scan order.
pub fn thin_direction(vol: &mut Volume<u8>, dir: Direction, mode: ThinningMode) -> usize {
    let candidates = collect_candidates(&vol.as_view(), dir, mode);

    let mut removed = 0;
    for idx in candidates.iter().copied() {
        let view = vol.as_view();
        let code = neighborhood_code(&view, view.coord_of(idx));
        if is_removable(code, dir, mode) {
            vol.data_mut()[idx] = 0;
            removed += 1;
        }
    }

    trace!(
        "{dir:?}: {} candidates, {removed} removed",
        candidates.len()
    );
    removed
}

/// Indices of object voxels removable in `dir` against a frozen snapshot.
pub fn collect_candidates(
    view: &VolumeView<'_, u8>,
    dir: Direction,
    mode: ThinningMode,
) -> Vec<usize> {
    let data = view.data();
    let check = |i: usize| -> bool {
        if data[i] == 0 {
            return false;
        }
        let c = view.coord_of(i);
        if view.is_object(c + dir.offset()) {
            return false;
        }
        is_removable(neighborhood_code(view, c), dir, mode)
    };

    #[cfg(feature = "parallel")]
    let candidates = {
        use rayon::prelude::*;
        (0..data.len())
            .into_par_iter()
            .filter(|&i| check(i))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let candidates = (0..data.len()).filter(|&i| check(i)).collect();

    candidates
}
