//! Temperature model: latitude gradient plus altitude lapse.

use rayon::prelude::*;

use super::ClimateConfig;
use crate::grid::Grid;

/// Computes per-cell temperature (°C).
///
/// `T = T_eq − k_lat · lat² − k_elev · max(0, elev − sea_level)`, with
/// ocean cells using a latitude-damped sea-surface temperature and no
/// altitude term.
pub fn temperature_field(
    grid: &Grid,
    elevation: &[f32],
    ocean_mask: &[bool],
    sea_level: f32,
    cfg: &ClimateConfig,
) -> Vec<f32> {
    (0..grid.len())
        .into_par_iter()
        .map(|idx| {
            let (_, y) = grid.coords(idx);
            let lat = grid.latitude(y);
            let lat_drop = cfg.lat_gradient_c * lat * lat;

            if ocean_mask[idx] {
                cfg.equator_temp_c - lat_drop * cfg.sst_lat_damping
            } else {
                let above_sea_km = (elevation[idx] - sea_level).max(0.0) / 1000.0;
                cfg.equator_temp_c - lat_drop - cfg.lapse_rate_c_per_km * above_sea_km
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_world(grid: &Grid, elev: f32) -> (Vec<f32>, Vec<bool>) {
        (vec![elev; grid.len()], vec![false; grid.len()])
    }

    #[test]
    fn equator_is_warmer_than_poles() {
        let grid = Grid::new(4, 101);
        let (elevation, ocean) = flat_world(&grid, 100.0);
        let cfg = ClimateConfig::default();
        let temp = temperature_field(&grid, &elevation, &ocean, 0.0, &cfg);

        let equator = temp[grid.index(0, 50)];
        let pole_top = temp[grid.index(0, 0)];
        let pole_bottom = temp[grid.index(0, 100)];
        assert!(equator > pole_top + 20.0);
        assert!(equator > pole_bottom + 20.0);
        assert!((pole_top - pole_bottom).abs() < 1e-3, "poles are symmetric");
    }

    #[test]
    fn altitude_cools_by_the_lapse_rate() {
        let grid = Grid::new(2, 9);
        let cfg = ClimateConfig::default();
        let ocean = vec![false; grid.len()];

        let low = temperature_field(&grid, &vec![0.0; grid.len()], &ocean, 0.0, &cfg);
        let high = temperature_field(&grid, &vec![2000.0; grid.len()], &ocean, 0.0, &cfg);

        let drop = low[grid.index(0, 4)] - high[grid.index(0, 4)];
        assert!((drop - 2.0 * cfg.lapse_rate_c_per_km).abs() < 1e-3);
    }

    #[test]
    fn depth_below_sea_level_does_not_warm_land() {
        let grid = Grid::new(2, 9);
        let cfg = ClimateConfig::default();
        let ocean = vec![false; grid.len()];
        let basin = temperature_field(&grid, &vec![-500.0; grid.len()], &ocean, 0.0, &cfg);
        let coast = temperature_field(&grid, &vec![0.0; grid.len()], &ocean, 0.0, &cfg);
        assert!((basin[4] - coast[4]).abs() < 1e-6);
    }

    #[test]
    fn polar_ocean_is_milder_than_polar_land() {
        let grid = Grid::new(2, 33);
        let cfg = ClimateConfig::default();
        let elevation = vec![0.0; grid.len()];

        let land = temperature_field(&grid, &elevation, &vec![false; grid.len()], 0.0, &cfg);
        let sea = temperature_field(&grid, &elevation, &vec![true; grid.len()], 0.0, &cfg);

        assert!(sea[grid.index(0, 0)] > land[grid.index(0, 0)]);
        // At the equator there is nothing to damp.
        assert!((sea[grid.index(0, 16)] - land[grid.index(0, 16)]).abs() < 1e-3);
    }
}
