//! Centerline extraction on top of thinned skeleton graphs.
//!
//! [`longest_path`] finds the heaviest branch trail through a
//! [`sk_graph::SkeletonGraph`], using search state owned by the call so the
//! graph stays immutable. [`sample_path`] turns the trail into a fixed number
//! of voxels evenly spaced by arc length. [`extract_centerline`] chains
//! thinning, graph building, search and sampling behind one
//! [`CenterlineConfig`].

mod longest;
mod pipeline;
mod sample;

pub use longest::{DEFAULT_SEARCH_BUDGET, Path, PathStep, longest_path, longest_path_bounded};
pub use pipeline::{
    Centerline, CenterlineConfig, extract_centerline, extract_centerline_from_slice,
};
pub use sample::{concat_path_points, sample_path, sample_points};
