use std::io::{self, Write};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use sk_core::{Coord3i, Error, Volume, VolumeView};
use sk_graph::{SkeletonGraph, build_graph};
use sk_thin::{ThinningMode, ThinningStats, thin_in_place};

use crate::longest::{Path, longest_path};
use crate::sample::sample_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterlineConfig {
    pub mode: ThinningMode,
    /// Number of arc-length samples along the longest path.
    pub point_count: usize,
    /// When set, the output mask holds only the sampled centerline voxels;
    /// otherwise it is the full thinned skeleton.
    pub prune_branches: bool,
}

impl Default for CenterlineConfig {
    fn default() -> Self {
        Self {
            mode: ThinningMode::Full,
            point_count: 100,
            prune_branches: true,
        }
    }
}

impl CenterlineConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.point_count == 0 {
            return Err(Error::DegenerateRequest {
                point_count: self.point_count,
            });
        }
        Ok(())
    }
}

/// Everything produced along the way from input mask to centerline.
#[derive(Debug, Clone)]
pub struct Centerline {
    pub thinned: Volume<u8>,
    pub stats: ThinningStats,
    pub graph: SkeletonGraph,
    pub path: Path,
    pub points: Vec<Coord3i>,
    /// Output mask: sampled points or the full skeleton, per
    /// [`CenterlineConfig::prune_branches`].
    pub mask: Volume<u8>,
}

impl Centerline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Writes one `index x y z` line per sampled point.
    pub fn write_point_list<W: Write>(&self, mut out: W) -> io::Result<()> {
        for (i, p) in self.points.iter().enumerate() {
            writeln!(out, "{i} {} {} {}", p.x, p.y, p.z)?;
        }
        out.flush()
    }
}

/// Runs thinning, graph construction, longest-path search and resampling.
pub fn extract_centerline(
    src: &VolumeView<'_, u8>,
    cfg: &CenterlineConfig,
) -> Result<Centerline, Error> {
    cfg.validate()?;
    let dims = src.dims();

    let mut thinned = src.to_volume();
    let stats = thin_in_place(&mut thinned, cfg.mode);
    info!(
        "thinned {dims:?} volume in {} rounds: {} removed, {} kept",
        stats.rounds,
        stats.removed,
        thinned.as_view().count_nonzero()
    );

    let graph = build_graph(&thinned.as_view());
    info!(
        "skeleton graph: {} branches, {} junctions, {} ends",
        graph.branches.len(),
        graph.num_junctions(),
        graph.num_ends()
    );

    let path = longest_path(&graph);
    let points = sample_path(&graph, &path, cfg.point_count)?;
    debug!(
        "sampled {} points over length {:.2}",
        points.len(),
        path.length
    );

    let mask = if cfg.prune_branches {
        Volume::mask_from_coords(dims, &points)?
    } else {
        thinned.clone()
    };

    Ok(Centerline {
        thinned,
        stats,
        graph,
        path,
        points,
        mask,
    })
}

/// [`extract_centerline`] over a flat x-fastest buffer.
pub fn extract_centerline_from_slice(
    dims: [usize; 3],
    data: &[u8],
    cfg: &CenterlineConfig,
) -> Result<Centerline, Error> {
    let view = VolumeView::from_slice(dims, data)?;
    extract_centerline(&view, cfg)
}
