use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sk_core::Volume;
use sk_graph::build_graph;

/// One-voxel-wide lattice: lines along x every 8 voxels in y and z, joined
/// by lines along y every 16 voxels in x.
fn synthetic_lattice(dims: [usize; 3]) -> Volume<u8> {
    let mut vol = Volume::new_fill(dims, 0u8).expect("valid volume");

    for z in (4..dims[2].saturating_sub(4)).step_by(8) {
        for y in (4..dims[1].saturating_sub(4)).step_by(8) {
            for x in 4..dims[0].saturating_sub(4) {
                *vol.get_mut(x, y, z).expect("in bounds") = 1;
            }
        }
        for x in (8..dims[0].saturating_sub(8)).step_by(16) {
            for y in 4..dims[1].saturating_sub(4) {
                *vol.get_mut(x, y, z).expect("in bounds") = 1;
            }
        }
    }

    vol
}

fn bench_build_graph(c: &mut Criterion) {
    let vol = synthetic_lattice([256, 128, 64]);

    c.bench_function("sk_graph_build_lattice_256x128x64", |b| {
        b.iter(|| {
            let g = build_graph(black_box(&vol.as_view()));
            black_box((g.nodes.len(), g.branches.len()));
        });
    });
}

criterion_group!(benches, bench_build_graph);
criterion_main!(benches);
