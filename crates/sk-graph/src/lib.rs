//! Branch graph extraction from thinned 3D skeletons.
//!
//! Topology comes from 26-adjacency between object voxels, with one
//! refinement: a diagonal neighbor is linked directly only when no object
//! voxel lies between the two. Staircase chains therefore keep degree 2
//! instead of reading as junctions, while connectivity stays the same as
//! plain 26-connectivity.
//!
//! - Node voxels have degree `!= 2` (ends, junctions, isolated voxels).
//! - Degree-2 voxels are traced as branch points between nodes.
//! - Pure loop components (all degree 2) become one loop branch anchored at
//!   their first voxel in scan order, with a `LoopAnchor` node.
//!
//! Each branch records the branches sharing each of its ends, so the graph
//! can be walked branch-to-branch without going through nodes.

mod build;
mod graph;

pub use build::{UNLABELED, build_graph, build_graph_with_labels, skeleton_degree};
pub use graph::{Branch, BranchEnd, BranchId, Node, NodeId, NodeKind, SkeletonGraph};
