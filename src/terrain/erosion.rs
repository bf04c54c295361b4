//! Droplet-based hydraulic erosion.
//!
//! Each droplet starts at a random cell, rolls downhill with a little
//! inertia, picks up sediment while under capacity and deposits when over
//! it. Capacity is proportional to slope times velocity, so fast water on
//! steep ground carves valleys and slow water on flats builds fans.
//! Droplets that leave the grid are discarded along with their load.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::grid::Grid;
use crate::world::{CancelToken, CANCEL_POLL_INTERVAL};

/// Parameters for droplet hydraulic erosion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErosionConfig {
    /// Droplets simulated per grid cell.
    pub droplets_per_cell: f32,
    /// Maximum steps in a droplet's lifetime.
    pub max_steps: u32,
    /// Direction inertia, 0 = pure steepest descent.
    pub inertia: f32,
    /// Sediment capacity factor (Kc).
    pub sediment_capacity: f32,
    /// Erosion rate (Ks).
    pub erosion_rate: f32,
    /// Deposition rate (Kd).
    pub deposition_rate: f32,
    /// Water evaporated per step (0-1).
    pub evaporation: f32,
    /// Gravity term feeding slope into droplet speed.
    pub gravity: f32,
    /// Slope floor so flats retain a little carrying capacity.
    pub min_slope: f32,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            droplets_per_cell: 0.125,
            max_steps: 64,
            inertia: 0.05,
            sediment_capacity: 4.0,
            erosion_rate: 0.3,
            deposition_rate: 0.3,
            evaporation: 0.02,
            gravity: 4.0,
            min_slope: 1e-4,
        }
    }
}

/// Bilinear height and gradient at a fractional position.
///
/// `pos` must satisfy `0 <= x < width-1` and `0 <= y < height-1`.
fn sample(grid: &Grid, heights: &[f32], x: f32, y: f32) -> (f32, f32, f32) {
    let cx = x.floor() as u32;
    let cy = y.floor() as u32;
    let u = x - cx as f32;
    let v = y - cy as f32;

    let nw = heights[grid.index(cx, cy)];
    let ne = heights[grid.index(cx + 1, cy)];
    let sw = heights[grid.index(cx, cy + 1)];
    let se = heights[grid.index(cx + 1, cy + 1)];

    let height = nw * (1.0 - u) * (1.0 - v) + ne * u * (1.0 - v) + sw * (1.0 - u) * v + se * u * v;
    let grad_x = (ne - nw) * (1.0 - v) + (se - sw) * v;
    let grad_y = (sw - nw) * (1.0 - u) + (se - ne) * u;
    (height, grad_x, grad_y)
}

/// Adds `amount` (may be negative) to the four cells under a position,
/// split by bilinear weights.
fn deposit(grid: &Grid, heights: &mut [f32], x: f32, y: f32, amount: f32) {
    let cx = x.floor() as u32;
    let cy = y.floor() as u32;
    let u = x - cx as f32;
    let v = y - cy as f32;

    heights[grid.index(cx, cy)] += amount * (1.0 - u) * (1.0 - v);
    heights[grid.index(cx + 1, cy)] += amount * u * (1.0 - v);
    heights[grid.index(cx, cy + 1)] += amount * (1.0 - u) * v;
    heights[grid.index(cx + 1, cy + 1)] += amount * u * v;
}

/// Runs droplet erosion on a copy of the field and returns the eroded
/// heights. Droplets run sequentially off a single seeded stream, so the
/// result is independent of thread count.
pub fn erode(
    grid: &Grid,
    heights: &[f32],
    config: &ErosionConfig,
    rng: &mut ChaCha8Rng,
    cancel: &CancelToken,
) -> Result<Vec<f32>, WorldGenError> {
    assert_eq!(heights.len(), grid.len());
    if grid.width < 2 || grid.height < 2 {
        return Ok(heights.to_vec());
    }

    // Work in normalized units so erosion amounts are relative to total
    // relief, not absolute meters.
    let min = heights.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = heights.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let range = (max - min).max(1e-6);
    let mut h: Vec<f32> = heights.iter().map(|&v| (v - min) / range).collect();

    let droplets = (grid.len() as f32 * config.droplets_per_cell) as u64;
    let max_x = grid.width as f32 - 1.001;
    let max_y = grid.height as f32 - 1.001;

    for drop in 0..droplets {
        if drop as usize % CANCEL_POLL_INTERVAL == 0 {
            cancel.check()?;
        }

        let mut x = rng.random::<f32>() * max_x;
        let mut y = rng.random::<f32>() * max_y;
        let mut dir_x = 0.0f32;
        let mut dir_y = 0.0f32;
        let mut speed = 1.0f32;
        let mut water = 1.0f32;
        let mut sediment = 0.0f32;

        for _ in 0..config.max_steps {
            let (height, grad_x, grad_y) = sample(grid, &h, x, y);

            dir_x = dir_x * config.inertia - grad_x * (1.0 - config.inertia);
            dir_y = dir_y * config.inertia - grad_y * (1.0 - config.inertia);
            let len = (dir_x * dir_x + dir_y * dir_y).sqrt();
            if len < 1e-8 {
                // Stalled on a flat: drop the load and finish.
                deposit(grid, &mut h, x, y, sediment);
                break;
            }
            dir_x /= len;
            dir_y /= len;

            let old_x = x;
            let old_y = y;
            x += dir_x;
            y += dir_y;

            if x < 0.0 || y < 0.0 || x >= max_x || y >= max_y {
                // Off-grid droplets are discarded, load and all.
                break;
            }

            let (new_height, _, _) = sample(grid, &h, x, y);
            let dh = new_height - height;

            let capacity =
                (-dh).max(config.min_slope) * speed * water * config.sediment_capacity;

            if sediment > capacity || dh > 0.0 {
                // Over capacity (or climbing): deposit, but never more
                // than would fill the height difference when climbing.
                let amount = if dh > 0.0 {
                    sediment.min(dh)
                } else {
                    (sediment - capacity) * config.deposition_rate
                };
                sediment -= amount;
                deposit(grid, &mut h, old_x, old_y, amount);
            } else {
                // Under capacity: erode, but never below the next cell.
                let amount = ((capacity - sediment) * config.erosion_rate).min(-dh);
                sediment += amount;
                deposit(grid, &mut h, old_x, old_y, -amount);
            }

            speed = (speed * speed + (-dh).max(0.0) * config.gravity).sqrt();
            water *= 1.0 - config.evaporation;
        }
    }

    Ok(h.into_iter().map(|v| v * range + min).collect())
}
