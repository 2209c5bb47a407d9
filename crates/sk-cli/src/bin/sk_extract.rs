use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use serde::{Deserialize, Serialize};
use voxel_skeleton::{
    Centerline, CenterlineConfig, NodeKind, ThinningMode, Volume, VolumeView, extract_centerline,
};

#[derive(Parser, Debug)]
#[command(name = "sk_extract")]
#[command(about = "Extract the centerline of a 3D binary volume")]
struct Cli {
    /// Raw u8 volume, x-fastest.
    #[arg(long, required_unless_present = "synthetic")]
    input: Option<PathBuf>,
    /// Volume size of `--input`.
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    dims: Option<Vec<usize>>,
    /// Generate a test volume instead of reading one.
    #[arg(long, value_enum, conflicts_with = "input")]
    synthetic: Option<Synthetic>,
    /// Centerline settings as JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    #[arg(long)]
    num_points: Option<usize>,
    /// Write the full thinned skeleton instead of the sampled points.
    #[arg(long)]
    dont_prune: bool,
    /// Raw u8 output mask.
    #[arg(long)]
    output: Option<PathBuf>,
    /// `index x y z` point list; printed to stdout when omitted.
    #[arg(long)]
    points: Option<PathBuf>,
    /// JSON run summary.
    #[arg(long)]
    meta: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    Full,
    Sheet,
}

impl From<ModeArg> for ThinningMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Full => ThinningMode::Full,
            ModeArg::Sheet => ThinningMode::SheetPreserving,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Synthetic {
    Tube,
    Ring,
    Cross,
}

#[derive(Debug, Clone, Serialize)]
struct Meta<'a> {
    dims: [usize; 3],
    source: String,
    config: &'a CenterlineConfig,
    input_voxels: usize,
    thinning_rounds: usize,
    removed_voxels: usize,
    skeleton_voxels: usize,
    skeleton_length: f64,
    branch_count: usize,
    junctions: usize,
    ends: usize,
    loops: usize,
    path_branches: Vec<usize>,
    path_length: f64,
    points: Vec<[i32; 3]>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = resolve_config(&cli)?;
    let (volume, source) = load_volume(&cli)?;
    let view = volume.as_view();
    info!(
        "{source}: {:?}, {} object voxels",
        view.dims(),
        view.count_nonzero()
    );

    let centerline = extract_centerline(&view, &cfg).context("extracting centerline")?;

    match &cli.points {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            centerline
                .write_point_list(BufWriter::new(file))
                .with_context(|| format!("writing points {}", path.display()))?;
        }
        None => centerline
            .write_point_list(io::stdout().lock())
            .context("writing points to stdout")?,
    }

    if let Some(path) = &cli.output {
        fs::write(path, centerline.mask.data())
            .with_context(|| format!("writing mask {}", path.display()))?;
    }

    if let Some(path) = &cli.meta {
        write_json(path, &meta(&view, source, &cfg, &centerline))?;
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<CenterlineConfig> {
    let mut cfg = match &cli.config {
        Some(path) => read_json(path)?,
        None => CenterlineConfig::default(),
    };
    if let Some(mode) = cli.mode {
        cfg.mode = mode.into();
    }
    if let Some(n) = cli.num_points {
        cfg.point_count = n;
    }
    if cli.dont_prune {
        cfg.prune_branches = false;
    }
    cfg.validate().context("invalid centerline settings")?;
    Ok(cfg)
}

fn load_volume(cli: &Cli) -> Result<(Volume<u8>, String)> {
    if let Some(kind) = cli.synthetic {
        return Ok((synthetic_volume(kind)?, format!("synthetic {kind:?}")));
    }

    let Some(path) = &cli.input else {
        bail!("either --input or --synthetic is required");
    };
    let Some(dims) = cli.dims.as_deref() else {
        bail!("--dims X Y Z is required with --input");
    };
    let dims: [usize; 3] = dims
        .try_into()
        .context("--dims takes exactly three values")?;

    ensure_file_exists(path, "input")?;
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let volume = Volume::from_vec(dims, data)
        .with_context(|| format!("constructing {dims:?} volume from {}", path.display()))?;
    Ok((volume, path.display().to_string()))
}

type Shape = fn(i32, i32, i32) -> bool;

fn synthetic_volume(kind: Synthetic) -> Result<Volume<u8>> {
    let (dims, inside): ([usize; 3], Shape) = match kind {
        Synthetic::Tube => ([16, 16, 64], in_tube as Shape),
        Synthetic::Ring => ([40, 40, 12], in_ring as Shape),
        Synthetic::Cross => ([48, 48, 48], in_cross as Shape),
    };

    let [w, h, _] = dims;
    let data = (0..dims.iter().product::<usize>())
        .map(|i| {
            let (x, y, z) = (i % w, (i / w) % h, i / (w * h));
            u8::from(inside(x as i32, y as i32, z as i32))
        })
        .collect();
    Ok(Volume::from_vec(dims, data)?)
}

/// Radius-4 cylinder along z.
fn in_tube(x: i32, y: i32, z: i32) -> bool {
    let (dx, dy) = (x - 8, y - 8);
    dx * dx + dy * dy <= 16 && (4..60).contains(&z)
}

/// Torus around z = 6, major radius 14, minor radius 3.
fn in_ring(x: i32, y: i32, z: i32) -> bool {
    let (dx, dy, dz) = (f64::from(x - 20), f64::from(y - 20), f64::from(z - 6));
    let r = (dx * dx + dy * dy).sqrt() - 14.0;
    r * r + dz * dz <= 9.0
}

/// Three orthogonal 5x5 rods of different lengths through (24, 24, 24).
fn in_cross(x: i32, y: i32, z: i32) -> bool {
    let near = |a: i32, b: i32| (a - 24).abs() <= 2 && (b - 24).abs() <= 2;
    (near(y, z) && (2..46).contains(&x))
        || (near(x, z) && (10..40).contains(&y))
        || (near(x, y) && (16..34).contains(&z))
}

fn meta<'a>(
    input: &VolumeView<'_, u8>,
    source: String,
    cfg: &'a CenterlineConfig,
    c: &Centerline,
) -> Meta<'a> {
    Meta {
        dims: input.dims(),
        source,
        config: cfg,
        input_voxels: input.count_nonzero(),
        thinning_rounds: c.stats.rounds,
        removed_voxels: c.stats.removed,
        skeleton_voxels: c.thinned.as_view().count_nonzero(),
        skeleton_length: c.graph.total_length(),
        branch_count: c.graph.branches.len(),
        junctions: c.graph.num_junctions(),
        ends: c.graph.num_ends(),
        loops: c
            .graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::LoopAnchor)
            .count(),
        path_branches: c.path.branch_ids(),
        path_length: c.path.length,
        points: c.points.iter().map(|p| p.to_array()).collect(),
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
