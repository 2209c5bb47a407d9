//! Topology-preserving thinning of 3D binary volumes.
//!
//! Voxels are object when `> 0`. Outputs are `0` or `1` in `u8`.
//!
//! Thinning runs in rounds of six directional subiterations
//! ([`Direction::ALL`]). Each subiteration evaluates [`is_removable`] for every
//! border voxel against the volume as it stood at the start of the pass, then
//! commits the deletions in scan order with a re-check against the live
//! volume. Rounds repeat until nothing is removed, so the result is a fixed
//! point: thinning it again returns it unchanged.
//!
//! With the default `parallel` feature the candidate scan of each pass runs on
//! rayon. Passes are always sequential.

mod removable;
mod thin;

pub use removable::{
    ThinningMode, background_components, is_removable, is_sheet_point, is_simple,
    object_components,
};
pub use thin::{
    Direction, ThinningStats, collect_candidates, thin, thin_direction, thin_in_place,
};
