use log::debug;
use sk_graph::{BranchEnd, BranchId, NodeId, SkeletonGraph};

/// One branch of a path, walked from `end1` to `end2` unless `reversed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub branch: BranchId,
    pub reversed: bool,
}

impl PathStep {
    /// The end the walk enters this branch through.
    pub fn entry(self) -> BranchEnd {
        if self.reversed {
            BranchEnd::Second
        } else {
            BranchEnd::First
        }
    }

    pub fn exit(self) -> BranchEnd {
        self.entry().other()
    }
}

/// Ordered branch sequence where consecutive branches share a node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub steps: Vec<PathStep>,
    pub length: f64,
}

impl Path {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn branch_ids(&self) -> Vec<BranchId> {
        self.steps.iter().map(|s| s.branch).collect()
    }
}

/// Branch visits the exhaustive trail search may spend in [`longest_path`].
pub const DEFAULT_SEARCH_BUDGET: usize = 200_000;

/// Finds the branch sequence with the greatest summed length.
///
/// Equivalent to [`longest_path_bounded`] with [`DEFAULT_SEARCH_BUDGET`].
pub fn longest_path(graph: &SkeletonGraph) -> Path {
    longest_path_bounded(graph, DEFAULT_SEARCH_BUDGET)
}

/// Finds the branch sequence with the greatest summed length, spending at
/// most `budget` branch visits on exhaustive search.
///
/// Two candidates are computed and the longer one wins:
///
/// - the longest path over a maximum spanning forest of the node graph, with
///   self-loop branches spliced in where the path touches their node. This is
///   `O(B log B)` in the branch count and exact on trees.
/// - a depth-first enumeration of branch trails (no branch used twice),
///   entered from every free branch end, and from every branch in both
///   orientations for components without a free end. It stops after
///   `budget` visits, so its result is exact only when it finishes.
///
/// The result is never shorter than the longest single branch. On cyclic
/// graphs where the enumeration runs out of budget the answer is the best
/// trail found, not necessarily the longest one. Ties keep the trail
/// search result, first found in branch-id order. An empty graph yields an
/// empty path.
pub fn longest_path_bounded(graph: &SkeletonGraph, budget: usize) -> Path {
    if graph.is_empty() {
        return Path::default();
    }

    let forest = spanning_forest_path(graph);

    let mut search = Search::new(graph, budget);
    for (branch, entry) in seeds(graph) {
        if !search.run(branch, entry) {
            break;
        }
    }

    let exhausted = search.exhausted;
    let mut best = match search.best {
        Some(found) if found.length >= forest.length => found,
        _ => forest,
    };

    let longest_branch = graph
        .branches
        .iter()
        .max_by(|a, b| a.length.total_cmp(&b.length).then(b.id.cmp(&a.id)));
    if let Some(b) = longest_branch {
        if b.length > best.length {
            best = Path {
                steps: vec![PathStep {
                    branch: b.id,
                    reversed: false,
                }],
                length: b.length,
            };
        }
    }
    debug!(
        "longest path: {} branches, length {:.2}{}",
        best.len(),
        best.length,
        if exhausted {
            " (search budget exhausted)"
        } else {
            ""
        }
    );
    best
}

/// Longest path through a maximum spanning forest, longest branches first.
fn spanning_forest_path(graph: &SkeletonGraph) -> Path {
    let n = graph.nodes.len();
    let mut adjacency: Vec<Vec<(BranchId, NodeId)>> = vec![Vec::new(); n];
    let mut loops_at: Vec<Vec<BranchId>> = vec![Vec::new(); n];
    let mut order = Vec::new();

    for b in &graph.branches {
        if b.node1 == b.node2 {
            loops_at[b.node1].push(b.id);
        } else {
            order.push(b.id);
        }
    }
    order.sort_by(|&a, &b| {
        graph.branches[b]
            .length
            .total_cmp(&graph.branches[a].length)
            .then(a.cmp(&b))
    });

    let mut forest = DisjointSets::new(n);
    for id in order {
        let b = &graph.branches[id];
        if forest.union(b.node1, b.node2) {
            adjacency[b.node1].push((id, b.node2));
            adjacency[b.node2].push((id, b.node1));
        }
    }
    for list in &mut adjacency {
        list.sort_unstable();
    }

    let mut walk = TreeWalk::new(n);
    let mut seen = vec![false; n];
    let mut best: Option<Path> = None;
    for root in 0..n {
        if seen[root] {
            continue;
        }
        let far = walk.farthest(graph, &adjacency, root);
        for &v in &walk.touched {
            seen[v] = true;
        }
        let end = walk.farthest(graph, &adjacency, far);
        let path = walk.path_to(graph, end, &loops_at);

        if best.as_ref().is_none_or(|b| path.length > b.length) {
            best = Some(path);
        }
    }
    best.unwrap_or_default()
}

struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets of `a` and `b`; false when they were already one.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[rb] = ra;
        true
    }
}

/// Reusable buffers for distance walks over the spanning forest. Only the
/// nodes touched by the previous walk are reset.
struct TreeWalk {
    dist: Vec<f64>,
    parent: Vec<Option<(BranchId, NodeId)>>,
    visited: Vec<bool>,
    touched: Vec<NodeId>,
    stack: Vec<NodeId>,
}

impl TreeWalk {
    fn new(n: usize) -> Self {
        Self {
            dist: vec![0.0; n],
            parent: vec![None; n],
            visited: vec![false; n],
            touched: Vec::new(),
            stack: Vec::new(),
        }
    }

    /// Walks the tree containing `start` and returns its node farthest from
    /// `start` by summed branch length.
    fn farthest(
        &mut self,
        graph: &SkeletonGraph,
        adjacency: &[Vec<(BranchId, NodeId)>],
        start: NodeId,
    ) -> NodeId {
        for &v in &self.touched {
            self.dist[v] = 0.0;
            self.parent[v] = None;
            self.visited[v] = false;
        }
        self.touched.clear();

        self.visited[start] = true;
        self.touched.push(start);
        self.stack.push(start);

        let mut far = start;
        while let Some(v) = self.stack.pop() {
            if self.dist[v] > self.dist[far] {
                far = v;
            }
            for &(b, w) in &adjacency[v] {
                if self.visited[w] {
                    continue;
                }
                self.visited[w] = true;
                self.touched.push(w);
                self.dist[w] = self.dist[v] + graph.branches[b].length;
                self.parent[w] = Some((b, v));
                self.stack.push(w);
            }
        }
        far
    }

    /// Path from the last walk's start to `end`, with self-loops spliced in
    /// at every node it passes.
    fn path_to(&self, graph: &SkeletonGraph, end: NodeId, loops_at: &[Vec<BranchId>]) -> Path {
        let mut hops = Vec::new();
        let mut v = end;
        while let Some((b, prev)) = self.parent[v] {
            hops.push((b, prev));
            v = prev;
        }

        let mut path = Path::default();
        splice_loops(&mut path, graph, &loops_at[v]);
        for &(b, prev) in hops.iter().rev() {
            let branch = &graph.branches[b];
            let step = PathStep {
                branch: b,
                reversed: branch.node1 != prev,
            };
            path.steps.push(step);
            path.length += branch.length;
            splice_loops(&mut path, graph, &loops_at[branch.node(step.exit())]);
        }
        path
    }
}

fn splice_loops(path: &mut Path, graph: &SkeletonGraph, loops: &[BranchId]) {
    for &id in loops {
        path.steps.push(PathStep {
            branch: id,
            reversed: false,
        });
        path.length += graph.branches[id].length;
    }
}

/// Start positions: free ends first, then every orientation of every branch
/// in components that have no free end.
fn seeds(graph: &SkeletonGraph) -> Vec<(BranchId, BranchEnd)> {
    let component = branch_components(graph);
    let mut has_free = vec![false; graph.branches.len()];
    let mut out = Vec::new();

    for b in &graph.branches {
        for which in [BranchEnd::First, BranchEnd::Second] {
            if b.is_free(which) {
                out.push((b.id, which));
                has_free[component[b.id]] = true;
            }
        }
    }

    for b in &graph.branches {
        if !has_free[component[b.id]] {
            out.push((b.id, BranchEnd::First));
            out.push((b.id, BranchEnd::Second));
        }
    }
    out
}

/// Component representative per branch, following end neighbor lists.
fn branch_components(graph: &SkeletonGraph) -> Vec<usize> {
    const NONE: usize = usize::MAX;
    let mut comp = vec![NONE; graph.branches.len()];
    let mut stack = Vec::new();

    for root in 0..graph.branches.len() {
        if comp[root] != NONE {
            continue;
        }
        comp[root] = root;
        stack.push(root);
        while let Some(b) = stack.pop() {
            let branch = &graph.branches[b];
            for &n in branch.end1_neighbors.iter().chain(&branch.end2_neighbors) {
                if comp[n] == NONE {
                    comp[n] = root;
                    stack.push(n);
                }
            }
        }
    }
    comp
}

struct Frame<'g> {
    exit_node: NodeId,
    neighbors: &'g [BranchId],
    next: usize,
}

/// Depth-first enumeration of branch trails. All state lives here, the
/// graph itself is never mutated.
struct Search<'g> {
    graph: &'g SkeletonGraph,
    on_path: Vec<bool>,
    steps: Vec<PathStep>,
    cumulative: Vec<f64>,
    frames: Vec<Frame<'g>>,
    best: Option<Path>,
    remaining: usize,
    exhausted: bool,
}

impl<'g> Search<'g> {
    fn new(graph: &'g SkeletonGraph, budget: usize) -> Self {
        Self {
            graph,
            on_path: vec![false; graph.branches.len()],
            steps: Vec::new(),
            cumulative: Vec::new(),
            frames: Vec::new(),
            best: None,
            remaining: budget,
            exhausted: false,
        }
    }

    /// Enumerates every trail starting at `start`. Returns false once the
    /// visit budget runs out.
    fn run(&mut self, start: BranchId, entry: BranchEnd) -> bool {
        if !self.enter(start, entry) {
            return false;
        }

        loop {
            let Some(frame) = self.frames.last_mut() else {
                break;
            };

            let candidate = if frame.next < frame.neighbors.len() {
                let n = frame.neighbors[frame.next];
                frame.next += 1;
                Some((n, frame.exit_node))
            } else {
                None
            };

            match candidate {
                Some((n, node)) => {
                    if self.on_path[n] {
                        continue;
                    }
                    let Some(enter) = self.graph.branches[n].end_at(node) else {
                        continue;
                    };
                    if !self.enter(n, enter) {
                        while !self.frames.is_empty() {
                            self.leave();
                        }
                        return false;
                    }
                }
                None => self.leave(),
            }
        }
        true
    }

    fn enter(&mut self, id: BranchId, entry: BranchEnd) -> bool {
        if self.remaining == 0 {
            self.exhausted = true;
            return false;
        }
        self.remaining -= 1;

        let graph = self.graph;
        let branch = &graph.branches[id];
        let length = self.cumulative.last().copied().unwrap_or(0.0) + branch.length;

        self.on_path[id] = true;
        self.steps.push(PathStep {
            branch: id,
            reversed: entry == BranchEnd::Second,
        });
        self.cumulative.push(length);

        let improves = self.best.as_ref().is_none_or(|b| length > b.length);
        if improves {
            self.best = Some(Path {
                steps: self.steps.clone(),
                length,
            });
        }

        let exit = entry.other();
        self.frames.push(Frame {
            exit_node: branch.node(exit),
            neighbors: branch.neighbors(exit),
            next: 0,
        });
        true
    }

    fn leave(&mut self) {
        self.frames.pop();
        self.cumulative.pop();
        if let Some(step) = self.steps.pop() {
            self.on_path[step.branch] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use sk_core::{Coord3i, Volume};
    use sk_graph::{Branch, BranchEnd, Node, NodeKind, SkeletonGraph, build_graph};
    use sk_thin::{ThinningMode, thin};

    use super::{Path, longest_path, longest_path_bounded, spanning_forest_path};

    /// Builds a graph from `(node1, node2, length)` triples. Node `i` sits at
    /// `(i, 0, 0)`; branch geometry is just its two end voxels.
    fn graph_from_edges(edges: &[(usize, usize, f64)]) -> SkeletonGraph {
        let n_nodes = edges.iter().map(|e| e.0.max(e.1)).max().map_or(0, |m| m + 1);
        let at = |n: usize| Coord3i::new(n as i32, 0, 0);

        let mut graph = SkeletonGraph {
            dims: [n_nodes.max(1), 1, 1],
            nodes: (0..n_nodes)
                .map(|id| Node {
                    id,
                    kind: NodeKind::End,
                    idx: at(id),
                    degree: 0,
                    incident_branches: Vec::new(),
                })
                .collect(),
            branches: edges
                .iter()
                .enumerate()
                .map(|(id, &(a, b, length))| Branch {
                    id,
                    points: vec![at(a), at(b)],
                    length,
                    end1: at(a),
                    end2: at(b),
                    node1: a,
                    node2: b,
                    end1_neighbors: Vec::new(),
                    end2_neighbors: Vec::new(),
                    is_loop: a == b,
                })
                .collect(),
        };
        graph.link_branches();
        graph
    }

    /// Exhaustive trail enumeration from every branch in both orientations.
    fn brute_force_longest(graph: &SkeletonGraph) -> f64 {
        fn extend(graph: &SkeletonGraph, used: &mut Vec<bool>, node: usize, acc: f64) -> f64 {
            let mut best = acc;
            for b in &graph.branches {
                if used[b.id] {
                    continue;
                }
                let next = if b.node1 == node {
                    b.node2
                } else if b.node2 == node {
                    b.node1
                } else {
                    continue;
                };
                used[b.id] = true;
                best = best.max(extend(graph, used, next, acc + b.length));
                used[b.id] = false;
            }
            best
        }

        let mut used = vec![false; graph.branches.len()];
        let mut best = 0.0f64;
        for b in &graph.branches {
            used[b.id] = true;
            best = best.max(extend(graph, &mut used, b.node2, b.length));
            best = best.max(extend(graph, &mut used, b.node1, b.length));
            used[b.id] = false;
        }
        best
    }

    /// Consecutive steps must leave and enter through the same node.
    fn assert_connected(graph: &SkeletonGraph, path: &Path) {
        for pair in path.steps.windows(2) {
            let prev = &graph.branches[pair[0].branch];
            let next = &graph.branches[pair[1].branch];
            assert_eq!(prev.node(pair[0].exit()), next.node(pair[1].entry()));
        }
        let mut ids = path.branch_ids();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), path.len(), "branch reused");
    }

    fn random_tree(seed: u64, branches: usize) -> SkeletonGraph {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            state >> 33
        };
        let edges: Vec<(usize, usize, f64)> = (0..branches)
            .map(|i| {
                let parent = (next() as usize) % (i + 1);
                let length = 1.0 + (next() % 9) as f64;
                (parent, i + 1, length)
            })
            .collect();
        graph_from_edges(&edges)
    }

    #[test]
    fn empty_graph_gives_empty_path() {
        let path = longest_path(&SkeletonGraph::default());
        assert!(path.is_empty());
        assert_eq!(path.length, 0.0);
    }

    #[test]
    fn single_branch_is_walked_forward() {
        let graph = graph_from_edges(&[(0, 1, 9.0)]);
        let path = longest_path(&graph);
        assert_eq!(path.branch_ids(), vec![0]);
        assert!(!path.steps[0].reversed);
        assert_eq!(path.length, 9.0);
    }

    #[test]
    fn star_picks_the_two_longest_arms() {
        // Arms of length 4, 1, 3, 2 around hub node 0.
        let graph = graph_from_edges(&[(0, 1, 4.0), (0, 2, 1.0), (0, 3, 3.0), (0, 4, 2.0)]);
        let path = longest_path(&graph);

        let mut ids = path.branch_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(path.length, 7.0);
        assert_connected(&graph, &path);
    }

    #[test]
    fn pure_loop_terminates() {
        let graph = graph_from_edges(&[(0, 0, 12.0)]);
        let path = longest_path(&graph);
        assert_eq!(path.branch_ids(), vec![0]);
        assert_eq!(path.length, 12.0);
    }

    #[test]
    fn lollipop_walks_the_loop_once() {
        // Stick 0-1, then two parallel branches between 1 and 2.
        let graph = graph_from_edges(&[(0, 1, 2.0), (1, 2, 5.0), (2, 1, 3.0)]);
        let path = longest_path(&graph);
        assert_eq!(path.length, 10.0);
        assert_eq!(path.len(), 3);
        assert_eq!(path.steps[0].branch, 0);
        assert_connected(&graph, &path);
    }

    #[test]
    fn theta_graph_without_free_ends() {
        let graph = graph_from_edges(&[(0, 1, 2.0), (0, 1, 3.0), (0, 1, 4.0)]);
        let path = longest_path(&graph);
        assert_eq!(path.length, 9.0);
        assert_connected(&graph, &path);
    }

    #[test]
    fn separate_components_report_the_longer() {
        let graph = graph_from_edges(&[(0, 1, 2.0), (2, 3, 6.0), (3, 4, 1.0)]);
        let path = longest_path(&graph);
        assert_eq!(path.length, 7.0);
        let mut ids = path.branch_ids();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn matches_brute_force_on_random_trees() {
        for seed in 1..=40u64 {
            let n = 1 + (seed as usize % 10);
            let graph = random_tree(seed, n);
            let path = longest_path(&graph);
            let expected = brute_force_longest(&graph);

            assert!(
                (path.length - expected).abs() < 1e-9,
                "seed {seed}: got {}, brute force {expected}",
                path.length
            );
            assert_connected(&graph, &path);
            for b in &graph.branches {
                assert!(path.length >= b.length);
            }
        }
    }

    #[test]
    fn plus_shaped_skeleton() {
        // Hub (5,5); arms left 5, right 2, up 4, down 3 voxels.
        let mut coords = vec![Coord3i::new(5, 5, 0)];
        coords.extend((0..5).map(|x| Coord3i::new(x, 5, 0)));
        coords.extend((6..8).map(|x| Coord3i::new(x, 5, 0)));
        coords.extend((1..5).map(|y| Coord3i::new(5, y, 0)));
        coords.extend((6..9).map(|y| Coord3i::new(5, y, 0)));
        let vol = Volume::mask_from_coords([11, 11, 1], &coords).expect("inside volume");

        let graph = build_graph(&vol.as_view());
        let path = longest_path(&graph);

        assert_eq!(path.len(), 2);
        assert!((path.length - 9.0).abs() < 1e-9);

        let first = &graph.branches[path.steps[0].branch];
        let last = &graph.branches[path.steps[1].branch];
        let start = first.end(path.steps[0].entry());
        let end = last.end(path.steps[1].exit());
        let mut tips = [start, end];
        tips.sort_by_key(|c| (c.x, c.y));
        assert_eq!(tips, [Coord3i::new(0, 5, 0), Coord3i::new(5, 1, 0)]);
        assert!(first.is_free(path.steps[0].entry()));
        assert!(last.is_free(BranchEnd::First) || last.is_free(BranchEnd::Second));
    }

    fn noise_volume(dims: [usize; 3], seed: u64) -> Volume<u8> {
        let mut state = seed;
        let data = (0..dims[0] * dims[1] * dims[2])
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                u8::from((state >> 33) % 100 < 50)
            })
            .collect();
        Volume::from_vec(dims, data).expect("valid volume")
    }

    fn assert_covers_every_branch(graph: &SkeletonGraph, path: &Path) {
        for b in &graph.branches {
            assert!(
                path.length + 1e-9 >= b.length,
                "branch {} ({}) longer than path ({})",
                b.id,
                b.length,
                path.length
            );
        }
    }

    fn grid_graph(side: usize) -> SkeletonGraph {
        let mut edges = Vec::new();
        for r in 0..side {
            for c in 0..side {
                let id = r * side + c;
                let length = 1.0 + ((r * 7 + c * 3) % 4) as f64;
                if c + 1 < side {
                    edges.push((id, id + 1, length));
                }
                if r + 1 < side {
                    edges.push((id, id + side, length));
                }
            }
        }
        graph_from_edges(&edges)
    }

    #[test]
    fn spanning_forest_is_exact_on_trees() {
        for seed in 1..=40u64 {
            let graph = random_tree(seed, 1 + (seed as usize % 10));
            let path = spanning_forest_path(&graph);
            let expected = brute_force_longest(&graph);

            assert!(
                (path.length - expected).abs() < 1e-9,
                "seed {seed}: got {}, brute force {expected}",
                path.length
            );
            assert_connected(&graph, &path);
        }
    }

    #[test]
    fn self_loops_are_spliced_into_the_forest_path() {
        let graph = graph_from_edges(&[(0, 1, 2.0), (1, 1, 5.0), (1, 2, 3.0)]);

        let path = spanning_forest_path(&graph);
        assert_eq!(path.len(), 3);
        assert_eq!(path.length, 10.0);
        assert_connected(&graph, &path);

        assert_eq!(longest_path_bounded(&graph, 0).length, 10.0);
    }

    #[test]
    fn zero_budget_falls_back_to_the_forest_path() {
        let graph = grid_graph(6);

        let quick = longest_path_bounded(&graph, 0);
        assert!(!quick.is_empty());
        assert_connected(&graph, &quick);
        assert_covers_every_branch(&graph, &quick);

        let more = longest_path_bounded(&graph, 5_000);
        assert_connected(&graph, &more);
        assert!(more.length >= quick.length);
    }

    #[test]
    fn long_loop_off_the_main_path_is_not_missed() {
        // Main line 0-1-2-3 of length 9, a junction at 1 carries a loop of 20
        // through node 4.
        let graph = graph_from_edges(&[
            (0, 1, 3.0),
            (1, 2, 3.0),
            (2, 3, 3.0),
            (1, 4, 10.0),
            (4, 1, 10.0),
        ]);
        let path = longest_path_bounded(&graph, 0);
        assert_covers_every_branch(&graph, &path);
        assert_connected(&graph, &path);
    }

    #[test]
    fn thinned_noise_paths_terminate() {
        for seed in 1..=3u64 {
            let vol = noise_volume([12, 11, 10], seed);
            for mode in [ThinningMode::Full, ThinningMode::SheetPreserving] {
                let thinned = thin(&vol.as_view(), mode);
                let graph = build_graph(&thinned.as_view());
                let path = longest_path(&graph);

                assert_eq!(path.is_empty(), graph.branches.is_empty(), "seed {seed} {mode:?}");
                assert_connected(&graph, &path);
                assert_covers_every_branch(&graph, &path);
            }
        }
    }

    #[test]
    fn sheet_slab_path_terminates() {
        let mut vol = Volume::new_fill([12, 12, 5], 0u8).expect("valid volume");
        for z in 1..4 {
            for y in 1..11 {
                for x in 1..11 {
                    *vol.get_mut(x, y, z).expect("in bounds") = 1;
                }
            }
        }
        let thinned = thin(&vol.as_view(), ThinningMode::SheetPreserving);
        let graph = build_graph(&thinned.as_view());
        let path = longest_path(&graph);

        assert!(!path.is_empty());
        assert_connected(&graph, &path);
        assert_covers_every_branch(&graph, &path);
    }
}
