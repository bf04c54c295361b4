//! Sea level selection and the edge-connected ocean mask.

use std::collections::VecDeque;

use crate::error::WorldGenError;
use crate::grid::Grid;

/// Picks the sea level so the fraction of cells strictly below it matches
/// the requested water fraction.
///
/// Works on a sorted copy of the elevation distribution; the level is the
/// elevation at the target quantile, so exactly the cells below that
/// sample count as water (up to duplicates, which real-valued terrain
/// does not produce).
pub fn find_sea_level(elevation: &[f32], water_frac: f32) -> f32 {
    let mut sorted = elevation.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let idx = ((sorted.len() as f32 * water_frac) as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Verifies the achieved water fraction is within the contract tolerance
/// of ±0.5% of all cells.
pub fn verify_water_fraction(
    elevation: &[f32],
    sea_level: f32,
    water_frac: f32,
) -> Result<(), WorldGenError> {
    let below = elevation.iter().filter(|&&h| h < sea_level).count() as f32;
    let target = elevation.len() as f32 * water_frac;
    let tolerance = (elevation.len() as f32 * 0.005).ceil();

    if (below - target).abs() > tolerance {
        return Err(WorldGenError::Invariant(format!(
            "sea level {sea_level} puts {below} cells below water, target {target} ± {tolerance}"
        )));
    }
    Ok(())
}

/// Ocean mask: below-sea cells reachable from the grid edge by a
/// 4-connected flood through below-sea cells.
///
/// Below-sea cells not reachable from an edge are interior depressions;
/// they stay land here and become lakes during hydrology.
pub fn flood_ocean_mask(grid: &Grid, elevation: &[f32], sea_level: f32) -> Vec<bool> {
    let mut ocean = vec![false; grid.len()];
    let mut queue = VecDeque::new();

    for idx in grid.border_indices() {
        if elevation[idx] < sea_level && !ocean[idx] {
            ocean[idx] = true;
            queue.push_back(idx);
        }
    }

    while let Some(idx) = queue.pop_front() {
        let (x, y) = grid.coords(idx);
        for (nx, ny) in grid.neighbors_4(x, y) {
            let nidx = grid.index(nx, ny);
            if !ocean[nidx] && elevation[nidx] < sea_level {
                ocean[nidx] = true;
                queue.push_back(nidx);
            }
        }
    }

    ocean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_hits_requested_fraction() {
        // A linear ramp of unique elevations.
        let elevation: Vec<f32> = (0..1000).map(|i| i as f32 * 3.7 - 500.0).collect();
        for frac in [0.2, 0.5, 0.9] {
            let sea = find_sea_level(&elevation, frac);
            assert!(verify_water_fraction(&elevation, sea, frac).is_ok());
        }
    }

    #[test]
    fn test_water_fraction_violation_is_reported() {
        let elevation: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        // A sea level far from the 60% quantile.
        let err = verify_water_fraction(&elevation, 100.0, 0.6);
        assert!(matches!(err, Err(WorldGenError::Invariant(_))));
    }

    #[test]
    fn test_interior_depression_is_not_ocean() {
        let grid = Grid::new(7, 7);
        // Everything high, except a sunken cell in the middle and a
        // below-sea notch on the border.
        let mut elevation = vec![100.0f32; grid.len()];
        elevation[grid.index(3, 3)] = -50.0;
        elevation[grid.index(0, 2)] = -50.0;

        let ocean = flood_ocean_mask(&grid, &elevation, 0.0);

        assert!(ocean[grid.index(0, 2)], "border notch floods from the edge");
        assert!(
            !ocean[grid.index(3, 3)],
            "landlocked depression must stay land (future lake)"
        );
    }

    #[test]
    fn test_ocean_mask_is_edge_connected() {
        let grid = Grid::new(16, 16);
        let elevation: Vec<f32> = (0..grid.len())
            .map(|idx| {
                let (x, _) = grid.coords(idx);
                x as f32 - 8.0
            })
            .collect();
        let ocean = flood_ocean_mask(&grid, &elevation, 0.0);

        // Every ocean cell must reach the border through ocean cells;
        // with this ramp the whole left half is one edge-connected sheet.
        for idx in 0..grid.len() {
            let (x, _) = grid.coords(idx);
            assert_eq!(ocean[idx], (x as f32) < 8.0);
        }
    }
}
