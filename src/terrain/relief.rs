//! Detail noise and smoothing around the erosion pass.

use rayon::prelude::*;

use crate::grid::Grid;

/// Adds small-amplitude fractal detail to the tectonic base elevation,
/// breaking up the symmetry of the distance-decay ranges.
///
/// Returns a new field; the base is left untouched.
pub fn add_detail_noise(base: &[f32], noise_plane: &[f32], amplitude_m: f32) -> Vec<f32> {
    assert_eq!(base.len(), noise_plane.len());
    base.par_iter()
        .zip(noise_plane.par_iter())
        .map(|(&b, &n)| b + n * amplitude_m)
        .collect()
}

/// Gaussian-style diffusion: each round blends every cell toward the mean
/// of its cardinal neighbors. A couple of rounds removes single-cell
/// spikes left by droplet erosion without flattening ridgelines.
pub fn smooth(grid: &Grid, heights: &mut Vec<f32>, rounds: u32, blend: f32) {
    let blend = blend.clamp(0.0, 1.0);
    let mut next = heights.clone();

    for _ in 0..rounds {
        let cur: &[f32] = heights;
        next.par_iter_mut().enumerate().for_each(|(idx, out)| {
            let (x, y) = grid.coords(idx);
            let mut sum = 0.0;
            let mut count = 0.0;
            for (nx, ny) in grid.neighbors_4(x, y) {
                sum += cur[grid.index(nx, ny)];
                count += 1.0;
            }
            *out = cur[idx] * (1.0 - blend) + (sum / count) * blend;
        });
        std::mem::swap(heights, &mut next);
    }
}
