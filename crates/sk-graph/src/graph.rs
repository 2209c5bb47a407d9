use sk_core::Coord3i;

pub type NodeId = usize;
pub type BranchId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    End,
    Junction,
    Isolated,
    LoopAnchor,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub idx: Coord3i,
    pub degree: usize,
    pub incident_branches: Vec<BranchId>,
}

/// Selects one of the two ends of a [`Branch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchEnd {
    First,
    Second,
}

impl BranchEnd {
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// A simple voxel chain between two topological points.
///
/// `points` runs from `end1` to `end2`. A closed loop starts and ends on the
/// same voxel, so its first and last points are equal.
#[derive(Debug, Clone)]
pub struct Branch {
    pub id: BranchId,
    pub points: Vec<Coord3i>,
    pub length: f64,
    pub end1: Coord3i,
    pub end2: Coord3i,
    pub node1: NodeId,
    pub node2: NodeId,
    /// Other branches meeting at `end1`, sorted.
    pub end1_neighbors: Vec<BranchId>,
    /// Other branches meeting at `end2`, sorted.
    pub end2_neighbors: Vec<BranchId>,
    pub is_loop: bool,
}

impl Branch {
    pub fn end(&self, which: BranchEnd) -> Coord3i {
        match which {
            BranchEnd::First => self.end1,
            BranchEnd::Second => self.end2,
        }
    }

    pub fn node(&self, which: BranchEnd) -> NodeId {
        match which {
            BranchEnd::First => self.node1,
            BranchEnd::Second => self.node2,
        }
    }

    pub fn neighbors(&self, which: BranchEnd) -> &[BranchId] {
        match which {
            BranchEnd::First => &self.end1_neighbors,
            BranchEnd::Second => &self.end2_neighbors,
        }
    }

    /// An end is free when no other branch shares it.
    pub fn is_free(&self, which: BranchEnd) -> bool {
        self.neighbors(which).is_empty()
    }

    /// Which end of this branch sits on `node`, preferring the first end.
    pub fn end_at(&self, node: NodeId) -> Option<BranchEnd> {
        if self.node1 == node {
            Some(BranchEnd::First)
        } else if self.node2 == node {
            Some(BranchEnd::Second)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SkeletonGraph {
    pub dims: [usize; 3],
    pub nodes: Vec<Node>,
    pub branches: Vec<Branch>,
}

impl SkeletonGraph {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn num_junctions(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Junction)
            .count()
    }

    pub fn num_ends(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::End)
            .count()
    }

    pub fn iter_junctions(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Junction)
    }

    pub fn iter_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    pub fn branch_points(&self, id: BranchId) -> &[Coord3i] {
        &self.branches[id].points
    }

    /// Branches with at least one free end.
    pub fn iter_leaves(&self) -> impl Iterator<Item = &Branch> {
        self.branches
            .iter()
            .filter(|b| b.is_free(BranchEnd::First) || b.is_free(BranchEnd::Second))
    }

    pub fn total_length(&self) -> f64 {
        self.branches.iter().map(|b| b.length).sum()
    }

    /// Rebuilds `incident_branches` on every node and both end neighbor
    /// lists on every branch from the `node1`/`node2` fields.
    pub fn link_branches(&mut self) {
        for node in &mut self.nodes {
            node.incident_branches.clear();
        }
        for branch in &self.branches {
            self.nodes[branch.node1].incident_branches.push(branch.id);
            if branch.node2 != branch.node1 {
                self.nodes[branch.node2].incident_branches.push(branch.id);
            }
        }

        let nodes = &self.nodes;
        for branch in &mut self.branches {
            let id = branch.id;
            let shared_at = |node: NodeId| {
                let mut shared: Vec<BranchId> = nodes[node]
                    .incident_branches
                    .iter()
                    .copied()
                    .filter(|&b| b != id)
                    .collect();
                shared.sort_unstable();
                shared.dedup();
                shared
            };
            branch.end1_neighbors = shared_at(branch.node1);
            branch.end2_neighbors = shared_at(branch.node2);
        }
    }
}
