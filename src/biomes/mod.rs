//! Biome classification from climate and hydrology fields.
//!
//! A Whittaker-style lookup over (temperature, rainfall) with elevation
//! overrides, followed by coastal refinement (beaches) and a
//! majority-vote smoothing pass that removes single-cell speckle.

mod config;

pub use config::BiomeConfig;

use rayon::prelude::*;

use crate::grid::Grid;

/// Biome classification ID. `as_u8()` is stable and used for storage and
/// the IR dump; 0 is reserved and never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BiomeId {
    DeepOcean = 1,
    ShallowOcean = 2,
    Beach = 3,
    Desert = 4,
    Savanna = 5,
    TropicalForest = 6,
    Shrubland = 7,
    Grassland = 8,
    TemperateForest = 9,
    Tundra = 10,
    Taiga = 11,
    BorealForest = 12,
    Ice = 13,
    Snow = 14,
    Alpine = 15,
}

impl BiomeId {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(BiomeId::DeepOcean),
            2 => Some(BiomeId::ShallowOcean),
            3 => Some(BiomeId::Beach),
            4 => Some(BiomeId::Desert),
            5 => Some(BiomeId::Savanna),
            6 => Some(BiomeId::TropicalForest),
            7 => Some(BiomeId::Shrubland),
            8 => Some(BiomeId::Grassland),
            9 => Some(BiomeId::TemperateForest),
            10 => Some(BiomeId::Tundra),
            11 => Some(BiomeId::Taiga),
            12 => Some(BiomeId::BorealForest),
            13 => Some(BiomeId::Ice),
            14 => Some(BiomeId::Snow),
            15 => Some(BiomeId::Alpine),
            _ => None,
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, BiomeId::DeepOcean | BiomeId::ShallowOcean)
    }

    /// RGB palette color for rendering.
    pub fn color(self) -> [u8; 3] {
        match self {
            BiomeId::DeepOcean => [12, 44, 96],
            BiomeId::ShallowOcean => [24, 86, 150],
            BiomeId::Beach => [222, 205, 152],
            BiomeId::Desert => [228, 210, 145],
            BiomeId::Savanna => [198, 192, 92],
            BiomeId::TropicalForest => [18, 132, 52],
            BiomeId::Shrubland => [155, 160, 100],
            BiomeId::Grassland => [120, 185, 95],
            BiomeId::TemperateForest => [40, 130, 70],
            BiomeId::Tundra => [170, 190, 170],
            BiomeId::Taiga => [95, 130, 100],
            BiomeId::BorealForest => [25, 85, 45],
            BiomeId::Ice => [224, 238, 250],
            BiomeId::Snow => [240, 248, 255],
            BiomeId::Alpine => [140, 140, 140],
        }
    }
}

/// Whittaker-style classification of a single land cell.
pub fn classify_land(
    temp_c: f32,
    rainfall: f32,
    rise_m: f32,
    cfg: &BiomeConfig,
) -> BiomeId {
    // Elevation overrides come first: high ground is rock and snow
    // regardless of the climate lookup.
    if rise_m >= cfg.snow_rise_m {
        return BiomeId::Snow;
    }
    if rise_m >= cfg.alpine_rise_m {
        return BiomeId::Alpine;
    }

    if temp_c < cfg.frozen_temp_c {
        return if rainfall >= cfg.rain_high {
            BiomeId::Snow
        } else {
            BiomeId::Ice
        };
    }

    if temp_c >= cfg.hot_temp_c {
        if rainfall >= cfg.rain_high {
            BiomeId::TropicalForest
        } else if rainfall >= cfg.rain_low {
            BiomeId::Savanna
        } else {
            BiomeId::Desert
        }
    } else if temp_c >= cfg.temperate_temp_c {
        if rainfall >= cfg.rain_high {
            BiomeId::TemperateForest
        } else if rainfall >= cfg.rain_low {
            BiomeId::Grassland
        } else {
            BiomeId::Shrubland
        }
    } else {
        if rainfall >= cfg.rain_high {
            BiomeId::BorealForest
        } else if rainfall >= cfg.rain_low {
            BiomeId::Taiga
        } else {
            BiomeId::Tundra
        }
    }
}

/// Classifies every cell, refines coasts, and smooths speckle.
pub fn compute_biomes(
    grid: &Grid,
    elevation: &[f32],
    sea_level: f32,
    ocean_mask: &[bool],
    temperature: &[f32],
    rainfall: &[f32],
    river_mask: &[bool],
    cfg: &BiomeConfig,
) -> Vec<u8> {
    let n = grid.len();
    assert_eq!(elevation.len(), n);
    assert_eq!(temperature.len(), n);
    assert_eq!(rainfall.len(), n);

    let mut biomes: Vec<u8> = (0..n)
        .into_par_iter()
        .map(|idx| {
            if ocean_mask[idx] {
                let depth = sea_level - elevation[idx];
                if depth > cfg.shallow_depth_m {
                    BiomeId::DeepOcean.as_u8()
                } else {
                    BiomeId::ShallowOcean.as_u8()
                }
            } else {
                let rise = elevation[idx] - sea_level;
                classify_land(temperature[idx], rainfall[idx], rise.max(0.0), cfg).as_u8()
            }
        })
        .collect();

    apply_beaches(grid, &mut biomes, elevation, sea_level, ocean_mask, temperature, cfg);

    for _ in 0..cfg.smoothing_passes {
        biomes = smooth_majority(grid, &biomes, ocean_mask, river_mask);
    }

    biomes
}

/// Warm, low-lying land touching the ocean becomes beach.
fn apply_beaches(
    grid: &Grid,
    biomes: &mut [u8],
    elevation: &[f32],
    sea_level: f32,
    ocean_mask: &[bool],
    temperature: &[f32],
    cfg: &BiomeConfig,
) {
    for idx in 0..grid.len() {
        if ocean_mask[idx] {
            continue;
        }
        if elevation[idx] - sea_level > cfg.beach_rise_m {
            continue;
        }
        if temperature[idx] < cfg.beach_min_temp_c {
            continue;
        }
        let (x, y) = grid.coords(idx);
        let coastal = grid
            .neighbors_4(x, y)
            .any(|(nx, ny)| ocean_mask[grid.index(nx, ny)]);
        if coastal {
            biomes[idx] = BiomeId::Beach.as_u8();
        }
    }
}

/// One majority-vote pass: a land cell surrounded mostly by a single
/// other land biome adopts it. Ocean and river cells are left alone so
/// coastlines and valleys stay crisp.
fn smooth_majority(
    grid: &Grid,
    biomes: &[u8],
    ocean_mask: &[bool],
    river_mask: &[bool],
) -> Vec<u8> {
    (0..grid.len())
        .into_par_iter()
        .map(|idx| {
            let current = biomes[idx];
            if ocean_mask[idx] || river_mask[idx] {
                return current;
            }

            let (x, y) = grid.coords(idx);
            let mut counts: [u8; 16] = [0; 16];
            let mut neighbors = 0u8;
            for (nx, ny) in grid.neighbors_8(x, y) {
                let nidx = grid.index(nx, ny);
                if ocean_mask[nidx] {
                    continue;
                }
                counts[biomes[nidx] as usize] += 1;
                neighbors += 1;
            }

            // First maximum wins so the pass stays deterministic.
            let mut best = current;
            let mut best_count = 0u8;
            for (b, &c) in counts.iter().enumerate() {
                if c > best_count {
                    best_count = c;
                    best = b as u8;
                }
            }

            if best != current && neighbors >= 6 && best_count * 2 > neighbors {
                best
            } else {
                current
            }
        })
        .collect()
}
