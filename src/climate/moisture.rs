//! Orographic precipitation along wind streamlines.
//!
//! For each latitude band, streamlines step cell-by-cell along the band's
//! wind vector carrying a moisture scalar: oceans feed it, windward
//! slopes condense it out, and whatever survives leaks away inland. Rain
//! shadows fall out of the bookkeeping: by the time a streamline clears
//! a range its moisture is spent.
//!
//! Stepping rule (used everywhere, load-bearing for determinism): the
//! zonal axis is always dominant, so each step advances one cell in x
//! and accumulates `w.y / |w.x|` in a fractional y that is rounded to
//! the nearest row (halves toward +y). Streamlines are seeded from every
//! band row on the upwind vertical edge and every column on the upwind
//! horizontal band edge, which together visit every cell in the band.

use super::wind::WindBand;
use super::ClimateConfig;
use crate::error::{alloc_field, WorldGenError};
use crate::grid::Grid;
use crate::world::CancelToken;

struct BandPass<'a> {
    grid: &'a Grid,
    elevation: &'a [f32],
    ocean_mask: &'a [bool],
    temperature: &'a [f32],
    sea_level: f32,
    cfg: &'a ClimateConfig,
    rain_intensity: f32,
}

impl BandPass<'_> {
    /// Walks one streamline, accumulating precipitation into `rain`.
    fn trace(&self, band: &WindBand, start_x: u32, start_y: u32, rain: &mut [f32]) {
        let w = band.vector;
        let sx: i64 = if w.x > 0.0 { 1 } else { -1 };
        let slope = w.y / w.x.abs();

        let mut x = start_x as i64;
        let mut yf = start_y as f32;

        // Seed moisture: ocean edges launch wet air near its open-water
        // equilibrium, land edges launch dry.
        let start_idx = self.grid.index(start_x, start_y);
        let mut moisture = if self.ocean_mask[start_idx] {
            let evap = self.cfg.evap_rate(self.temperature[start_idx]) * self.rain_intensity;
            self.cfg.edge_moisture_factor * evap / self.cfg.ocean_rain_fraction
        } else {
            0.0
        };
        let mut prev_eff = self.effective_elevation(start_idx);

        loop {
            let y = (yf + 0.5).floor() as i64;
            if x < 0 || x >= self.grid.width as i64 {
                break;
            }
            if y < band.rows.start as i64 || y >= band.rows.end as i64 {
                break;
            }

            let idx = self.grid.index(x as u32, y as u32);
            let temp = self.temperature[idx];

            if self.ocean_mask[idx] {
                moisture += self.cfg.evap_rate(temp) * self.rain_intensity;
                let p = self.cfg.ocean_rain_fraction * moisture;
                rain[idx] += p;
                moisture -= p;
                prev_eff = self.sea_level;
            } else {
                let eff = self.effective_elevation(idx);
                let lift = (eff - prev_eff).max(0.0);
                let cap = (self.cfg.base_rain_rate
                    + self.cfg.orographic_gain_per_m * self.rain_intensity * lift)
                    * self.cfg.condensation_factor(temp);
                let p = moisture.min(cap);
                rain[idx] += p;
                moisture = (moisture - p) * self.cfg.leak_factor;
                prev_eff = eff;
            }

            x += sx;
            yf += slope;
        }
    }

    /// Surface the airflow sees: open water sits at sea level.
    #[inline]
    fn effective_elevation(&self, idx: usize) -> f32 {
        if self.ocean_mask[idx] {
            self.sea_level
        } else {
            self.elevation[idx].max(self.sea_level)
        }
    }
}

/// Computes the rainfall field from band winds, ocean moisture sources,
/// and orographic lift.
pub fn rainfall_field(
    grid: &Grid,
    elevation: &[f32],
    ocean_mask: &[bool],
    temperature: &[f32],
    sea_level: f32,
    bands: &[WindBand],
    cfg: &ClimateConfig,
    rain_intensity: f32,
    cancel: &CancelToken,
) -> Result<Vec<f32>, WorldGenError> {
    assert_eq!(elevation.len(), grid.len());
    assert_eq!(ocean_mask.len(), grid.len());
    assert_eq!(temperature.len(), grid.len());

    let mut rain = alloc_field(grid.len(), 0.0f32, "rainfall")?;

    let pass = BandPass {
        grid,
        elevation,
        ocean_mask,
        temperature,
        sea_level,
        cfg,
        rain_intensity,
    };

    for band in bands {
        let w = band.vector;
        debug_assert!(w.y.abs() < w.x.abs(), "zonal axis must dominate");

        let upwind_x = if w.x > 0.0 { 0 } else { grid.width - 1 };

        // One streamline per band row from the upwind vertical edge.
        for y in band.rows.clone() {
            cancel.check()?;
            pass.trace(band, upwind_x, y, &mut rain);
        }

        // Streamlines entering through the band's upwind horizontal edge.
        if w.y != 0.0 {
            let entry_y = if w.y > 0.0 {
                band.rows.start
            } else {
                band.rows.end - 1
            };
            for x in 0..grid.width {
                if x == upwind_x {
                    continue; // corner already seeded by its row
                }
                if x % 256 == 0 {
                    cancel.check()?;
                }
                pass.trace(band, x, entry_y, &mut rain);
            }
        }
    }

    Ok(rain)
}
