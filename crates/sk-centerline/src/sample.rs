use sk_core::{Coord3i, Error};
use sk_graph::SkeletonGraph;

use crate::longest::Path;

/// Concatenates the voxels of every branch on `path` in walking order.
///
/// Consecutive branches share their junction voxel; it appears once.
pub fn concat_path_points(graph: &SkeletonGraph, path: &Path) -> Vec<Coord3i> {
    let mut out: Vec<Coord3i> = Vec::new();
    for step in &path.steps {
        let pts = graph.branch_points(step.branch);
        let ordered: Vec<Coord3i> = if step.reversed {
            pts.iter().rev().copied().collect()
        } else {
            pts.to_vec()
        };

        let skip = usize::from(out.last().is_some_and(|l| ordered.first() == Some(l)));
        out.extend_from_slice(&ordered[skip.min(ordered.len())..]);
    }
    out
}

/// Resamples `path` to `count` voxels evenly spaced by arc length.
///
/// `count == 0` is rejected with [`Error::DegenerateRequest`]; an empty path
/// gives an empty list.
pub fn sample_path(
    graph: &SkeletonGraph,
    path: &Path,
    count: usize,
) -> Result<Vec<Coord3i>, Error> {
    if count == 0 {
        return Err(Error::DegenerateRequest { point_count: count });
    }
    Ok(sample_points(&concat_path_points(graph, path), count))
}

/// Picks `count` voxels from an ordered polyline.
///
/// Sample `k` targets arc length `total * k / (count - 1)` and takes the
/// existing voxel nearest to it, the earlier one on ties. The first and last
/// samples are always the polyline ends. A polyline of zero length (or
/// `count == 1`) yields only its first voxel.
pub fn sample_points(points: &[Coord3i], count: usize) -> Vec<Coord3i> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let mut cumulative = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    cumulative.push(acc);
    for pair in points.windows(2) {
        acc += pair[0].distance(pair[1]);
        cumulative.push(acc);
    }
    let total = acc;

    if count <= 1 || total <= 0.0 {
        return vec![first];
    }

    let last = points.len() - 1;
    let mut out = Vec::with_capacity(count);
    let mut i = 0usize;
    for k in 0..count {
        let target = if k + 1 == count {
            total
        } else {
            total * k as f64 / (count - 1) as f64
        };

        while i < last && cumulative[i + 1] <= target {
            i += 1;
        }

        let pick = if i < last && cumulative[i + 1] - target < target - cumulative[i] {
            i + 1
        } else {
            i
        };
        out.push(points[pick]);
    }
    out
}

#[cfg(test)]
mod tests {
    use sk_core::{Coord3i, Error, Volume};
    use sk_graph::build_graph;

    use super::{concat_path_points, sample_path, sample_points};
    use crate::longest::{Path, PathStep, longest_path};

    fn line(n: i32) -> Vec<Coord3i> {
        (0..n).map(|x| Coord3i::new(x, 0, 0)).collect()
    }

    #[test]
    fn three_samples_on_a_ten_voxel_line() {
        let pts = sample_points(&line(10), 3);
        assert_eq!(
            pts,
            vec![
                Coord3i::new(0, 0, 0),
                Coord3i::new(4, 0, 0),
                Coord3i::new(9, 0, 0)
            ]
        );
    }

    #[test]
    fn samples_cover_both_ends_in_order() {
        let pts = line(50);
        for count in [2usize, 5, 17, 50, 80] {
            let out = sample_points(&pts, count);
            assert_eq!(out.len(), count);
            assert_eq!(out.first(), pts.first());
            assert_eq!(out.last(), pts.last());
            assert!(out.windows(2).all(|w| w[0].x <= w[1].x));
        }
    }

    #[test]
    fn zero_length_path_gives_one_point() {
        let pts = vec![Coord3i::new(3, 2, 1)];
        assert_eq!(sample_points(&pts, 10), pts);
    }

    #[test]
    fn single_sample_is_the_first_voxel() {
        assert_eq!(sample_points(&line(10), 1), vec![Coord3i::new(0, 0, 0)]);
    }

    #[test]
    fn empty_input_gives_nothing() {
        assert!(sample_points(&[], 5).is_empty());

        let graph = build_graph(&Volume::new_fill([4, 4, 4], 0u8).expect("valid").as_view());
        let path = longest_path(&graph);
        assert_eq!(sample_path(&graph, &path, 5), Ok(Vec::new()));
    }

    #[test]
    fn zero_count_is_rejected() {
        let graph = build_graph(&Volume::from_vec([4, 1, 1], vec![1u8; 4]).expect("valid").as_view());
        let path = longest_path(&graph);
        assert_eq!(
            sample_path(&graph, &path, 0),
            Err(Error::DegenerateRequest { point_count: 0 })
        );
    }

    #[test]
    fn junction_voxel_is_not_repeated() {
        // An L: arm along x and arm along y meeting at the origin, plus a
        // third short arm so the corner is a junction.
        let mut coords: Vec<Coord3i> = (0..6).map(|x| Coord3i::new(x, 0, 1)).collect();
        coords.extend((1..5).map(|y| Coord3i::new(0, y, 1)));
        coords.extend([Coord3i::new(0, 0, 0), Coord3i::new(0, 0, 2)]);
        coords.push(Coord3i::new(0, 0, 3));
        let vol = Volume::mask_from_coords([6, 5, 4], &coords).expect("inside volume");

        let graph = build_graph(&vol.as_view());
        let path = longest_path(&graph);
        let pts = concat_path_points(&graph, &path);

        assert!(pts.windows(2).all(|w| w[0].chebyshev(w[1]) == 1));
        let mut unique = pts.clone();
        unique.sort_by_key(|c| c.to_array());
        unique.dedup();
        assert_eq!(unique.len(), pts.len());
    }

    #[test]
    fn reversed_step_walks_backwards() {
        let graph = build_graph(&Volume::from_vec([5, 1, 1], vec![1u8; 5]).expect("valid").as_view());
        let path = Path {
            steps: vec![PathStep {
                branch: 0,
                reversed: true,
            }],
            length: 4.0,
        };
        let pts = concat_path_points(&graph, &path);
        assert_eq!(pts.first(), Some(&Coord3i::new(4, 0, 0)));
        assert_eq!(pts.last(), Some(&Coord3i::new(0, 0, 0)));
    }
}
