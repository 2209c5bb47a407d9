use crate::{Coord3i, NEIGHBOR_OFFSETS, VolumeView};

/// Counts 26-connected object components.
pub fn count_components(view: &VolumeView<'_, u8>) -> usize {
    label_components(view).1
}

/// Labels 26-connected object components.
///
/// Returns a per-voxel label (`0` for background, `1..=count` for objects)
/// together with the component count.
pub fn label_components(view: &VolumeView<'_, u8>) -> (Vec<u32>, usize) {
    let data = view.data();
    let mut labels = vec![0u32; data.len()];
    let mut stack: Vec<usize> = Vec::new();
    let mut count = 0usize;

    for i in 0..data.len() {
        if data[i] == 0 || labels[i] != 0 {
            continue;
        }

        count += 1;
        let label = count as u32;
        labels[i] = label;
        stack.clear();
        stack.push(i);

        while let Some(p) = stack.pop() {
            let c: Coord3i = view.coord_of(p);
            for &d in &NEIGHBOR_OFFSETS {
                let Some(nb) = view.index_of(c + d) else {
                    continue;
                };
                if data[nb] != 0 && labels[nb] == 0 {
                    labels[nb] = label;
                    stack.push(nb);
                }
            }
        }
    }

    (labels, count)
}
