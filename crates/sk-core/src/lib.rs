//! Foundational primitives for voxel skeleton extraction.
//!
//! ## Volume Layout
//! Volumes are dense flat buffers addressed x-fastest, then y, then z:
//! `idx = (z * height + y) * width + x`. Binary volumes use `u8` with any
//! nonzero value meaning object and `0` meaning background.
//!
//! ## Coordinates
//! All geometry is in voxel-index space. [`Coord3i`] is an `i32` triple so
//! neighbor offsets can step outside the volume; such voxels read as
//! background. The default coordinate is the invalid sentinel `(-1, -1, -1)`.
//!
//! ## Neighborhood Codes
//! [`neighborhood_code`] packs the 26-neighborhood of a voxel into a
//! [`NeighborhoodCode`] using the fixed numbering of [`NEIGHBOR_OFFSETS`].

mod components;
mod error;
mod geom;
mod neighborhood;
mod volume;

pub use components::{count_components, label_components};
pub use error::Error;
pub use geom::{Coord3i, arc_length};
pub use neighborhood::{
    ALL_MASK, FACE_MASK, N18_MASK, NEIGHBOR_COUNT, NEIGHBOR_OFFSETS, NeighborhoodCode,
    adjacent6_mask, adjacent26_mask, between_mask, neighbor_index, neighborhood_code, opposite,
};
pub use volume::{Volume, VolumeView};
