//! Tectonic plate data structures and seed placement.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Type of crustal material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateKind {
    /// Continental crust: thick, light, rides high.
    Continental,
    /// Oceanic crust: thin, dense, forms basins.
    Oceanic,
}

/// A tectonic plate on the world grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plate {
    /// Unique identifier, also the index into the plate table.
    pub id: u16,
    /// Seed cell the plate region grew from.
    pub seed: (u32, u32),
    /// Crust kind.
    pub kind: PlateKind,
    /// Motion vector, unit-ish magnitude.
    pub velocity: Vec2,
    /// Plate age in Ma; older oceanic plates subduct under younger ones.
    pub age: f32,
}

/// Samples `count` plate seed cells by Poisson-disk-like rejection.
///
/// Minimum spacing is half the mean inter-seed distance; after a bounded
/// number of rejections the spacing requirement is dropped so pathological
/// parameter combinations still terminate.
pub fn sample_plate_seeds(grid: &Grid, count: u32, rng: &mut ChaCha8Rng) -> Vec<(u32, u32)> {
    let min_dist = (grid.len() as f32 / count as f32).sqrt() * 0.5;
    let min_dist_sq = min_dist * min_dist;

    let mut seeds: Vec<(u32, u32)> = Vec::with_capacity(count as usize);
    let max_attempts = count as usize * 64;
    let mut attempts = 0;

    while seeds.len() < count as usize {
        let x = rng.random_range(0..grid.width);
        let y = rng.random_range(0..grid.height);
        attempts += 1;

        let too_close = attempts < max_attempts
            && seeds.iter().any(|&(sx, sy)| {
                let dx = sx as f32 - x as f32;
                let dy = sy as f32 - y as f32;
                dx * dx + dy * dy < min_dist_sq
            });
        if too_close {
            continue;
        }
        if seeds.contains(&(x, y)) {
            continue;
        }
        seeds.push((x, y));
    }

    seeds
}

/// Builds the plate table: one motion vector and crust kind per seed.
///
/// The continental share is derived from the requested water fraction, so
/// a wet world gets mostly oceanic plates.
pub fn build_plates(
    seeds: &[(u32, u32)],
    water_frac: f32,
    velocity_randomness: f32,
    rng: &mut ChaCha8Rng,
) -> Vec<Plate> {
    let count = seeds.len();
    let continental = ((count as f32 * (1.0 - water_frac)).round() as usize).clamp(1, count - 1);

    seeds
        .iter()
        .enumerate()
        .map(|(id, &seed)| {
            let angle = rng.random::<f32>() * std::f32::consts::TAU;
            let speed = 1.0 + (rng.random::<f32>() * 2.0 - 1.0) * velocity_randomness;
            let kind = if id < continental {
                PlateKind::Continental
            } else {
                PlateKind::Oceanic
            };
            // Oceanic plates are generally younger than continental.
            let age = match kind {
                PlateKind::Continental => 500.0 + rng.random::<f32>() * 3000.0,
                PlateKind::Oceanic => 10.0 + rng.random::<f32>() * 190.0,
            };
            Plate {
                id: id as u16,
                seed,
                kind,
                velocity: Vec2::from_angle(angle) * speed,
                age,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{stage_rng, StageTag};

    #[test]
    fn test_seed_count_and_bounds() {
        let grid = Grid::new(128, 96);
        let mut rng = stage_rng(7, StageTag::PlateSeeds);
        let seeds = sample_plate_seeds(&grid, 12, &mut rng);
        assert_eq!(seeds.len(), 12);
        for &(x, y) in &seeds {
            assert!(x < 128 && y < 96);
        }
    }

    #[test]
    fn test_seeds_are_spread_out() {
        let grid = Grid::new(256, 256);
        let mut rng = stage_rng(42, StageTag::PlateSeeds);
        let seeds = sample_plate_seeds(&grid, 8, &mut rng);
        let min_dist = (grid.len() as f32 / 8.0).sqrt() * 0.5;

        for (i, &(ax, ay)) in seeds.iter().enumerate() {
            for &(bx, by) in &seeds[i + 1..] {
                let dx = ax as f32 - bx as f32;
                let dy = ay as f32 - by as f32;
                assert!(
                    (dx * dx + dy * dy).sqrt() >= min_dist,
                    "seeds {:?} and {:?} are clustered",
                    (ax, ay),
                    (bx, by)
                );
            }
        }
    }

    #[test]
    fn test_seed_sampling_is_reproducible() {
        let grid = Grid::new(64, 64);
        let a = sample_plate_seeds(&grid, 6, &mut stage_rng(9, StageTag::PlateSeeds));
        let b = sample_plate_seeds(&grid, 6, &mut stage_rng(9, StageTag::PlateSeeds));
        assert_eq!(a, b);
    }

    #[test]
    fn test_continental_share_tracks_water_fraction() {
        let grid = Grid::new(128, 128);
        let seeds = sample_plate_seeds(&grid, 10, &mut stage_rng(1, StageTag::PlateSeeds));

        let wet = build_plates(&seeds, 0.9, 0.3, &mut stage_rng(1, StageTag::PlateMotion));
        let dry = build_plates(&seeds, 0.2, 0.3, &mut stage_rng(1, StageTag::PlateMotion));

        let continental = |plates: &[Plate]| {
            plates
                .iter()
                .filter(|p| p.kind == PlateKind::Continental)
                .count()
        };
        assert!(continental(&dry) > continental(&wet));
        // Never all-oceanic or all-continental.
        assert!(continental(&wet) >= 1);
        assert!(continental(&dry) <= 9);
    }

    #[test]
    fn test_plate_velocities_are_unit_ish() {
        let grid = Grid::new(64, 64);
        let seeds = sample_plate_seeds(&grid, 8, &mut stage_rng(3, StageTag::PlateSeeds));
        let plates = build_plates(&seeds, 0.6, 0.3, &mut stage_rng(3, StageTag::PlateMotion));
        for plate in &plates {
            let speed = plate.velocity.length();
            assert!((0.5..=1.5).contains(&speed), "speed {speed} out of range");
        }
    }
}
