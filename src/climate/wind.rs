//! Prevailing winds from simplified Hadley / Ferrel / Polar circulation.
//!
//! Latitude splits into six bands symmetric about the equator: trades
//! blow toward the equator and west in the tropics, westerlies eastward
//! in the temperate belt, polar easterlies back westward near the poles.
//! The meridional component is always smaller than the zonal one, which
//! the precipitation streamlines rely on.

use std::ops::Range;

use glam::Vec2;

use super::ClimateConfig;
use crate::grid::Grid;

/// A run of grid rows sharing one prevailing wind vector.
#[derive(Debug, Clone, PartialEq)]
pub struct WindBand {
    pub rows: Range<u32>,
    pub vector: Vec2,
}

/// Band wind vector for a row's latitude.
///
/// Coordinates follow the grid: +x east (right), +y toward the bottom
/// edge. Negative latitudes are the top hemisphere, so "equatorward"
/// there is +y.
fn band_vector(lat: f32) -> Vec2 {
    let abs = lat.abs();
    // Equatorward unit step for this hemisphere.
    let toward_equator = if lat <= 0.0 { 1.0 } else { -1.0 };

    if abs < 1.0 / 3.0 {
        Vec2::new(-0.85, 0.35 * toward_equator)
    } else if abs < 2.0 / 3.0 {
        Vec2::new(0.9, -0.25 * toward_equator)
    } else {
        Vec2::new(-0.9, 0.15 * toward_equator)
    }
}

/// Groups grid rows into contiguous constant-wind bands.
///
/// Small grids may produce fewer than six bands; every row belongs to
/// exactly one.
pub fn wind_bands(grid: &Grid) -> Vec<WindBand> {
    let mut bands: Vec<WindBand> = Vec::new();

    for y in 0..grid.height {
        let vector = band_vector(grid.latitude(y));
        match bands.last_mut() {
            Some(band) if band.vector == vector => band.rows.end = y + 1,
            _ => bands.push(WindBand {
                rows: y..y + 1,
                vector,
            }),
        }
    }

    bands
}

/// Per-cell prevailing wind: the band vector, blended across a few rows
/// at band boundaries so the field has no hard seams.
pub fn wind_field(grid: &Grid, cfg: &ClimateConfig) -> Vec<Vec2> {
    let mut rows: Vec<Vec2> = (0..grid.height)
        .map(|y| band_vector(grid.latitude(y)))
        .collect();

    // Box blur over rows, repeated to approximate a smooth transition.
    for _ in 0..cfg.band_blend_rows {
        let prev = rows.clone();
        for y in 0..grid.height as usize {
            let above = prev[y.saturating_sub(1)];
            let below = prev[(y + 1).min(grid.height as usize - 1)];
            rows[y] = (above + prev[y] * 2.0 + below) / 4.0;
        }
    }

    let mut field = Vec::with_capacity(grid.len());
    for y in 0..grid.height {
        for _ in 0..grid.width {
            field.push(rows[y as usize]);
        }
    }
    field
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_every_row_once() {
        let grid = Grid::new(4, 120);
        let bands = wind_bands(&grid);
        let mut next = 0;
        for band in &bands {
            assert_eq!(band.rows.start, next);
            next = band.rows.end;
        }
        assert_eq!(next, 120);
        assert_eq!(bands.len(), 6);
    }

    #[test]
    fn trades_blow_west_and_equatorward() {
        let grid = Grid::new(4, 121);
        // Just above the equator row, top hemisphere.
        let w = band_vector(grid.latitude(50));
        assert!(w.x < 0.0, "trades are easterlies (blowing westward)");
        assert!(w.y > 0.0, "top-hemisphere trades converge on the equator");

        let w_south = band_vector(grid.latitude(70));
        assert!(w_south.y < 0.0, "bottom-hemisphere trades mirror");
    }

    #[test]
    fn temperate_westerlies_blow_east() {
        let grid = Grid::new(4, 121);
        let w = band_vector(grid.latitude(30)); // |lat| ~ 0.5
        assert!(w.x > 0.0);
    }

    #[test]
    fn meridional_component_never_dominates() {
        let grid = Grid::new(4, 240);
        for y in 0..240 {
            let w = band_vector(grid.latitude(y));
            assert!(
                w.y.abs() < w.x.abs(),
                "row {y}: wind {w:?} would break DDA streamline coverage"
            );
        }
    }

    #[test]
    fn smoothed_field_matches_bands_away_from_edges() {
        let grid = Grid::new(8, 120);
        let cfg = ClimateConfig::default();
        let field = wind_field(&grid, &cfg);

        // Mid-band rows keep the pure band vector.
        let mid_tropical = field[grid.index(4, 55)];
        assert!((mid_tropical - band_vector(grid.latitude(55))).length() < 1e-4);

        // Boundary rows are blends, not jumps.
        let bands = wind_bands(&grid);
        let edge = bands[1].rows.start;
        let blended = field[grid.index(0, edge)];
        assert!(blended.x > band_vector(grid.latitude(edge)).x - 1.0);
    }
}
