//! Umbrella crate for the `voxel-skeleton` workspace.
//!
//! Re-exports the volume primitives, the thinning engine, the skeleton graph
//! builder and the centerline stage, so downstream code can depend on one
//! crate.

pub use sk_centerline::*;
pub use sk_core::*;
pub use sk_graph::*;
pub use sk_thin::*;
