//! Flow directions and rainfall-weighted accumulation on the filled
//! surface.

use crate::grid::{Grid, NEIGHBORS_8};
use crate::world::FLOW_SINK;

/// Steepest-descent flow direction for every cell.
///
/// Land cells point at their lowest strictly-lower Moore neighbor on the
/// filled surface; ties resolve to the first such neighbor in
/// [`NEIGHBORS_8`] order. A land cell with no strictly lower neighbor
/// (possible on filled flats) falls back to its priority-flood drain
/// parent, which is strictly lower by construction. Ocean cells are
/// sinks.
pub fn flow_directions(
    grid: &Grid,
    hydro_elevation: &[f32],
    ocean_mask: &[bool],
    parents: &[u32],
) -> Vec<u32> {
    let n = grid.len();
    let mut dirs = vec![FLOW_SINK; n];

    for idx in 0..n {
        if ocean_mask[idx] {
            continue;
        }
        let (x, y) = grid.coords(idx);
        let here = hydro_elevation[idx];

        let mut best = FLOW_SINK;
        let mut best_h = here;
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some((nx, ny)) = grid.neighbor(x, y, dx, dy) else {
                continue;
            };
            let nidx = grid.index(nx, ny);
            let h = hydro_elevation[nidx];
            if h < best_h {
                best_h = h;
                best = nidx as u32;
            }
        }

        dirs[idx] = if best != FLOW_SINK { best } else { parents[idx] };
    }

    dirs
}

/// Accumulates rainfall down the drainage network.
///
/// Cells are processed from highest to lowest on the filled surface
/// (ties by index), so every upstream contribution is complete before a
/// cell routes its total downstream. Each cell's accumulation therefore
/// equals its own rainfall plus everything draining through it.
pub fn flow_accumulation(
    grid: &Grid,
    hydro_elevation: &[f32],
    flow_dirs: &[u32],
    rainfall: &[f32],
) -> Vec<f32> {
    let n = grid.len();
    assert_eq!(hydro_elevation.len(), n);
    assert_eq!(flow_dirs.len(), n);
    assert_eq!(rainfall.len(), n);

    let mut order: Vec<u32> = (0..n as u32).collect();
    order.sort_by(|&a, &b| {
        let ha = hydro_elevation[a as usize];
        let hb = hydro_elevation[b as usize];
        hb.partial_cmp(&ha)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    let mut accum = rainfall.to_vec();
    for &i in &order {
        let down = flow_dirs[i as usize];
        if down != FLOW_SINK {
            accum[down as usize] += accum[i as usize];
        }
    }

    accum
}
