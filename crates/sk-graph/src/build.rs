use log::debug;
use sk_core::{
    Coord3i, NEIGHBOR_COUNT, NEIGHBOR_OFFSETS, VolumeView, arc_length, between_mask,
    neighborhood_code, opposite,
};

use crate::graph::{Branch, BranchId, Node, NodeId, NodeKind, SkeletonGraph};

/// Label value for voxels not owned by any branch.
pub const UNLABELED: u32 = 0;

/// Builds the branch graph of a thinned binary volume.
///
/// An all-background volume yields an empty graph.
pub fn build_graph(view: &VolumeView<'_, u8>) -> SkeletonGraph {
    build_graph_with_labels(view).0
}

/// Like [`build_graph`], also returning the per-voxel owner image: `id + 1`
/// of the first branch that claimed the voxel, or [`UNLABELED`].
pub fn build_graph_with_labels(view: &VolumeView<'_, u8>) -> (SkeletonGraph, Vec<u32>) {
    let n = view.data().len();
    let mut graph = SkeletonGraph {
        dims: view.dims(),
        nodes: Vec::new(),
        branches: Vec::new(),
    };

    let mut links = vec![0u32; n];
    let mut any = false;
    for (p, &v) in view.data().iter().enumerate() {
        if v != 0 {
            links[p] = link_mask(view, view.coord_of(p));
            any = true;
        }
    }

    let mut labels = vec![UNLABELED; n];
    if !any {
        return (graph, labels);
    }

    let mut node_at = vec![-1_i64; n];
    for p in 0..n {
        if view.data()[p] == 0 {
            continue;
        }
        let degree = links[p].count_ones() as usize;
        if degree == 2 {
            continue;
        }

        let id = graph.nodes.len();
        node_at[p] = id as i64;
        graph.nodes.push(Node {
            id,
            kind: kind_from_degree(degree),
            idx: view.coord_of(p),
            degree,
            incident_branches: Vec::new(),
        });
    }

    let mut tracer = Tracer {
        view,
        links: &links,
        used_link: vec![0u32; n],
        node_at,
        labels: &mut labels,
    };

    let mut start_node = 0_usize;
    while start_node < graph.nodes.len() {
        let start = node_index(view, &graph.nodes[start_node]);

        if graph.nodes[start_node].degree == 0 {
            let id = graph.branches.len();
            tracer.labels[start] = label_of(id);
            let c = graph.nodes[start_node].idx;
            graph.branches.push(new_branch(id, vec![c], start_node, start_node, false));
            start_node += 1;
            continue;
        }

        for dir in 0..NEIGHBOR_COUNT {
            if !tracer.is_link(start, dir) || tracer.is_link_used(start, dir) {
                continue;
            }

            let id = graph.branches.len();
            if tracer.labels[start] == UNLABELED {
                tracer.labels[start] = label_of(id);
            }
            let chain = tracer.trace(start, dir, id);
            let end_node = match chain.end_node {
                Some(id) => id,
                None => tracer.ensure_terminal_node(chain.end, &mut graph.nodes, NodeKind::End),
            };

            let is_loop = chain.closed && end_node == start_node;
            graph
                .branches
                .push(new_branch(id, chain.points, start_node, end_node, is_loop));
        }

        start_node += 1;
    }

    // Loop components contain no node; seed each from its first voxel.
    for p in 0..n {
        if view.data()[p] == 0 {
            continue;
        }

        for dir in 0..NEIGHBOR_COUNT {
            if !tracer.is_link(p, dir) || tracer.is_link_used(p, dir) {
                continue;
            }

            let anchor = tracer.ensure_terminal_node(p, &mut graph.nodes, NodeKind::LoopAnchor);
            let id = graph.branches.len();
            if tracer.labels[p] == UNLABELED {
                tracer.labels[p] = label_of(id);
            }
            let chain = tracer.trace(p, dir, id);

            let (a, b, is_loop) = if chain.closed {
                (anchor, anchor, true)
            } else {
                let end_node = match chain.end_node {
                    Some(id) => id,
                    None => tracer.ensure_terminal_node(chain.end, &mut graph.nodes, NodeKind::End),
                };
                (anchor, end_node, anchor == end_node)
            };

            graph
                .branches
                .push(new_branch(id, chain.points, a, b, is_loop));
        }
    }

    graph.link_branches();

    debug!(
        "skeleton graph: {} nodes ({} junctions, {} ends), {} branches",
        graph.nodes.len(),
        graph.num_junctions(),
        graph.num_ends(),
        graph.branches.len()
    );

    (graph, labels)
}

/// Number of direct skeleton links of the object voxel at `p`.
///
/// A diagonal neighbor counts only when no object voxel lies between it and
/// `p`; otherwise the path through that voxel already connects them.
pub fn skeleton_degree(view: &VolumeView<'_, u8>, p: Coord3i) -> usize {
    if !view.is_object(p) {
        return 0;
    }
    link_mask(view, p).count_ones() as usize
}

fn link_mask(view: &VolumeView<'_, u8>, p: Coord3i) -> u32 {
    let code = neighborhood_code(view, p).bits();
    let mut mask = 0u32;
    for dir in 0..NEIGHBOR_COUNT {
        if (code >> dir) & 1 != 0 && between_mask(dir) & code == 0 {
            mask |= 1 << dir;
        }
    }
    mask
}

struct Chain {
    points: Vec<Coord3i>,
    end: usize,
    end_node: Option<NodeId>,
    closed: bool,
}

struct Tracer<'a, 'v> {
    view: &'a VolumeView<'v, u8>,
    links: &'a [u32],
    used_link: Vec<u32>,
    node_at: Vec<i64>,
    labels: &'a mut [u32],
}

impl Tracer<'_, '_> {
    fn trace(&mut self, start: usize, start_dir: usize, id: BranchId) -> Chain {
        let label = label_of(id);
        let mut points = vec![self.view.coord_of(start)];

        let mut prev = start;
        let mut dir = start_dir;
        let Some(mut cur) = self.step(start, start_dir) else {
            return Chain {
                points,
                end: start,
                end_node: self.node_id(start),
                closed: false,
            };
        };

        let mut end_node = None;
        let mut closed = false;

        let max_steps = self.links.len().max(1);
        for _ in 0..max_steps {
            self.mark_link_both(prev, dir, cur);
            points.push(self.view.coord_of(cur));

            if cur == start {
                closed = true;
                end_node = self.node_id(cur);
                break;
            }

            if let Some(node) = self.node_id(cur) {
                if self.labels[cur] == UNLABELED {
                    self.labels[cur] = label;
                }
                end_node = Some(node);
                break;
            }

            if self.labels[cur] != UNLABELED && self.labels[cur] != label {
                break;
            }
            self.labels[cur] = label;

            let Some((next_dir, next)) = self.find_next_neighbor(cur, prev) else {
                break;
            };

            prev = cur;
            cur = next;
            dir = next_dir;
        }

        Chain {
            points,
            end: cur,
            end_node,
            closed,
        }
    }

    fn find_next_neighbor(&self, cur: usize, prev: usize) -> Option<(usize, usize)> {
        for dir in 0..NEIGHBOR_COUNT {
            if !self.is_link(cur, dir) || self.is_link_used(cur, dir) {
                continue;
            }
            let Some(nb) = self.step(cur, dir) else {
                continue;
            };
            if nb == prev {
                continue;
            }
            return Some((dir, nb));
        }
        None
    }

    fn ensure_terminal_node(
        &mut self,
        p: usize,
        nodes: &mut Vec<Node>,
        fallback_kind: NodeKind,
    ) -> NodeId {
        if let Some(id) = self.node_id(p) {
            return id;
        }

        let degree = self.links[p].count_ones() as usize;
        let kind = match degree {
            0 => NodeKind::Isolated,
            1 => NodeKind::End,
            2 => fallback_kind,
            _ => NodeKind::Junction,
        };

        let id = nodes.len();
        self.node_at[p] = id as i64;
        nodes.push(Node {
            id,
            kind,
            idx: self.view.coord_of(p),
            degree,
            incident_branches: Vec::new(),
        });
        id
    }

    #[inline]
    fn node_id(&self, p: usize) -> Option<NodeId> {
        usize::try_from(self.node_at[p]).ok()
    }

    #[inline]
    fn step(&self, p: usize, dir: usize) -> Option<usize> {
        self.view
            .index_of(self.view.coord_of(p) + NEIGHBOR_OFFSETS[dir])
    }

    #[inline]
    fn is_link(&self, p: usize, dir: usize) -> bool {
        (self.links[p] >> dir) & 1 != 0
    }

    #[inline]
    fn is_link_used(&self, p: usize, dir: usize) -> bool {
        (self.used_link[p] >> dir) & 1 != 0
    }

    #[inline]
    fn mark_link_both(&mut self, a: usize, dir_ab: usize, b: usize) {
        self.used_link[a] |= 1 << dir_ab;
        self.used_link[b] |= 1 << opposite(dir_ab);
    }
}

fn new_branch(
    id: BranchId,
    points: Vec<Coord3i>,
    node1: NodeId,
    node2: NodeId,
    is_loop: bool,
) -> Branch {
    let end1 = points[0];
    let end2 = points[points.len() - 1];
    Branch {
        id,
        length: arc_length(&points),
        points,
        end1,
        end2,
        node1,
        node2,
        end1_neighbors: Vec::new(),
        end2_neighbors: Vec::new(),
        is_loop,
    }
}

fn kind_from_degree(d: usize) -> NodeKind {
    match d {
        0 => NodeKind::Isolated,
        1 => NodeKind::End,
        _ => NodeKind::Junction,
    }
}

#[inline]
fn label_of(id: BranchId) -> u32 {
    id as u32 + 1
}

#[inline]
fn node_index(view: &VolumeView<'_, u8>, node: &Node) -> usize {
    view.index_of(node.idx).unwrap_or_default()
}
