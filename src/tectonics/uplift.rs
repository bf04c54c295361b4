//! Tectonic uplift: boundary regimes deposited into a base elevation field.
//!
//! Real mountain ranges are lines, not blobs: each classified boundary
//! regime contributes through a distance transform from its boundary
//! cells, decaying with a characteristic length so ranges, trenches, and
//! rifts come out linear. One-sided regimes (volcanic arcs, trenches)
//! are gated to the plate they belong to, which is what puts the trench
//! offshore of the diving plate and the range on the overriding one. A
//! per-plate isostatic bias underneath produces coherent continental
//! plateaus and ocean floors.

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::boundary::{BoundaryClass, BoundarySite};
use super::config::TectonicConfig;
use super::plate::{Plate, PlateKind};
use crate::error::{alloc_field, WorldGenError};
use crate::grid::{Grid, NEIGHBORS_8};

/// Gate value for contributions that apply on both sides of a boundary.
const BOTH_SIDES: u16 = u16::MAX;

/// A boundary cell feeding one regime's distance transform: cell index,
/// driving strength, and the plate the contribution is restricted to.
type RegimeSeed = (usize, f32, u16);

/// Distance (in cells) and strength of the nearest boundary site of one
/// regime. `u16::MAX` distance marks cells beyond the transform radius.
struct RegimeField {
    dist: Vec<u16>,
    strength: Vec<f32>,
    gate: Vec<u16>,
}

impl RegimeField {
    fn empty(len: usize) -> Self {
        Self {
            dist: vec![u16::MAX; len],
            strength: vec![0.0; len],
            gate: vec![BOTH_SIDES; len],
        }
    }

    /// Normalized distance and strength at a cell, or `None` when the
    /// cell is out of range or on the wrong side of a one-sided regime.
    #[inline]
    fn decay(&self, idx: usize, length: f32, plate: u16) -> Option<(f32, f32)> {
        let d = self.dist[idx];
        if d == u16::MAX {
            return None;
        }
        if self.gate[idx] != BOTH_SIDES && self.gate[idx] != plate {
            return None;
        }
        Some((d as f32 / length, self.strength[idx]))
    }
}

/// Multi-source BFS over the Moore neighborhood: Chebyshev distance to
/// the nearest seed, carrying that seed's strength and gate. Seeds are
/// visited in the order given, so equal-distance fronts resolve
/// deterministically.
fn strength_transform(grid: &Grid, seeds: &[RegimeSeed], max_radius: u16) -> RegimeField {
    let mut field = RegimeField::empty(grid.len());
    let mut queue = VecDeque::new();

    for &(idx, strength, gate) in seeds {
        if field.dist[idx] == 0 {
            // Same cell seeded twice; keep the stronger contribution.
            if strength > field.strength[idx] {
                field.strength[idx] = strength;
                field.gate[idx] = gate;
            }
            continue;
        }
        field.dist[idx] = 0;
        field.strength[idx] = strength;
        field.gate[idx] = gate;
        queue.push_back(idx);
    }

    while let Some(idx) = queue.pop_front() {
        let d = field.dist[idx];
        if d >= max_radius {
            continue;
        }
        let (x, y) = grid.coords(idx);
        let strength = field.strength[idx];
        let gate = field.gate[idx];
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some((nx, ny)) = grid.neighbor(x, y, dx, dy) else {
                continue;
            };
            let nidx = grid.index(nx, ny);
            if field.dist[nidx] != u16::MAX {
                continue;
            }
            field.dist[nidx] = d + 1;
            field.strength[nidx] = strength;
            field.gate[nidx] = gate;
            queue.push_back(nidx);
        }
    }

    field
}

/// Per-regime seed lists extracted from the classified boundary sites.
struct RegimeSeeds {
    collision: Vec<RegimeSeed>,
    arc: Vec<RegimeSeed>,
    trench: Vec<RegimeSeed>,
    island_arc: Vec<RegimeSeed>,
    island_trench: Vec<RegimeSeed>,
    rift: Vec<RegimeSeed>,
    transform: Vec<RegimeSeed>,
}

/// Splits boundary sites into per-regime seeds.
///
/// Subduction and island arcs are one-sided: cells on the subducting
/// plate feed the trench field gated to that plate, cells on the
/// overriding side feed the arc field gated to theirs.
fn collect_regime_seeds(plate_ids: &[u16], sites: &[BoundarySite]) -> RegimeSeeds {
    let mut seeds = RegimeSeeds {
        collision: Vec::new(),
        arc: Vec::new(),
        trench: Vec::new(),
        island_arc: Vec::new(),
        island_trench: Vec::new(),
        rift: Vec::new(),
        transform: Vec::new(),
    };

    for site in sites {
        let pair = [site.cell_a, site.cell_b];
        match site.class {
            BoundaryClass::Collision => {
                for &c in &pair {
                    seeds.collision.push((c, site.strength, BOTH_SIDES));
                }
            }
            BoundaryClass::Subduction | BoundaryClass::IslandArc => {
                let Some(sub) = site.subducting else { continue };
                let (arc_list, trench_list) = if site.class == BoundaryClass::Subduction {
                    (&mut seeds.arc, &mut seeds.trench)
                } else {
                    (&mut seeds.island_arc, &mut seeds.island_trench)
                };
                for &c in &pair {
                    let plate = plate_ids[c];
                    if plate == sub {
                        trench_list.push((c, site.strength, plate));
                    } else {
                        arc_list.push((c, site.strength, plate));
                    }
                }
            }
            BoundaryClass::Rift => {
                for &c in &pair {
                    seeds.rift.push((c, site.strength, BOTH_SIDES));
                }
            }
            BoundaryClass::Transform => {
                for &c in &pair {
                    seeds.transform.push((c, site.strength, BOTH_SIDES));
                }
            }
        }
    }

    seeds
}

/// Computes the pre-noise base elevation from plate geometry and motion.
///
/// `relief_noise` is a [-1, 1] plane modulating range crests and breaking
/// island arcs into chains; `scale` stretches the characteristic decay
/// length (`sqrt(W·H)/20` cells at scale 1).
pub fn compute_base_elevation(
    grid: &Grid,
    plate_ids: &[u16],
    plates: &[Plate],
    sites: &[BoundarySite],
    relief_noise: &[f32],
    config: &TectonicConfig,
    scale: f32,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<f32>, WorldGenError> {
    let n = grid.len();
    assert_eq!(plate_ids.len(), n);
    assert_eq!(relief_noise.len(), n);

    let range_len = ((grid.width as f32 * grid.height as f32).sqrt() / 20.0 * scale).max(1.0);
    let max_radius = (range_len * 6.0).min(u16::MAX as f32 - 1.0) as u16;

    let seeds = collect_regime_seeds(plate_ids, sites);
    let collision = strength_transform(grid, &seeds.collision, max_radius);
    let arc = strength_transform(grid, &seeds.arc, max_radius);
    let trench = strength_transform(grid, &seeds.trench, max_radius);
    let island_arc = strength_transform(grid, &seeds.island_arc, max_radius);
    let island_trench = strength_transform(grid, &seeds.island_trench, max_radius);
    let rift = strength_transform(grid, &seeds.rift, max_radius);
    let transform = strength_transform(grid, &seeds.transform, max_radius);

    // Per-plate isostatic bias with jitter so shelves differ plate to plate.
    let plate_bias: Vec<f32> = plates
        .iter()
        .map(|p| {
            let base = match p.kind {
                PlateKind::Continental => config.continental_bias_m,
                PlateKind::Oceanic => config.oceanic_bias_m,
            };
            base + (rng.random::<f32>() * 2.0 - 1.0) * config.bias_jitter_m
        })
        .collect();

    let mut bias = alloc_field(n, 0.0f32, "base_elevation")?;
    for (idx, b) in bias.iter_mut().enumerate() {
        *b = plate_bias[plate_ids[idx] as usize];
    }
    diffuse_bias(grid, &mut bias, config.bias_smoothing_rounds);

    let l_collision = range_len;
    let l_arc = range_len * 0.6;
    let l_trench = range_len * 0.5;
    let l_island = range_len * 0.4;
    let l_rift = range_len * 0.3;
    let l_shear = range_len * 0.2;

    let base: Vec<f32> = (0..n)
        .into_par_iter()
        .map(|idx| {
            let plate = plate_ids[idx];
            let noise = relief_noise[idx];
            // Crest modulation keeps ranges from being uniform walls.
            let crest = 0.7 + 0.3 * (noise + 1.0) * 0.5;

            let mut h = bias[idx];

            if let Some((t, s)) = collision.decay(idx, l_collision, plate) {
                h += config.collision_uplift_m * s * (-t).exp() * crest;
            }
            if let Some((t, s)) = arc.decay(idx, l_arc, plate) {
                h += config.arc_uplift_m * s * (-t).exp() * crest;
            }
            if let Some((t, s)) = trench.decay(idx, l_trench, plate) {
                h -= config.trench_depth_m * s * (-t * t).exp();
            }
            if let Some((t, s)) = island_arc.decay(idx, l_island, plate) {
                // Gate by noise so the arc surfaces as a chain of islands.
                let chain = ((noise + 0.55) * 1.3).clamp(0.0, 1.0);
                h += config.island_arc_uplift_m * s * (-t).exp() * chain;
            }
            if let Some((t, s)) = island_trench.decay(idx, l_trench, plate) {
                h -= config.trench_depth_m * 0.7 * s * (-t * t).exp();
            }
            if let Some((t, s)) = rift.decay(idx, l_rift, plate) {
                // Low trough at the axis, mild shoulders two lengths out.
                let shoulder_t = t - 2.0;
                h -= config.rift_depth_m * s * (-t * t).exp();
                h += config.rift_shoulder_m * s * (-shoulder_t * shoulder_t).exp();
            }
            if let Some((t, s)) = transform.decay(idx, l_shear, plate) {
                h += config.transform_shear_m * s * noise * (-t).exp();
            }

            h
        })
        .collect();

    Ok(base)
}

/// In-place 4-neighbor diffusion of the plate bias field so continental
/// shelves slope across plate boundaries instead of stepping.
fn diffuse_bias(grid: &Grid, bias: &mut [f32], rounds: u32) {
    let mut next = bias.to_vec();
    for _ in 0..rounds {
        let cur: &[f32] = bias;
        next.par_iter_mut().enumerate().for_each(|(idx, out)| {
            let (x, y) = grid.coords(idx);
            let mut sum = 0.0;
            let mut count = 0.0;
            for (nx, ny) in grid.neighbors_4(x, y) {
                sum += cur[grid.index(nx, ny)];
                count += 1.0;
            }
            *out = 0.5 * cur[idx] + 0.5 * sum / count;
        });
        bias.copy_from_slice(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{stage_rng, StageTag};
    use crate::tectonics::boundary::detect_boundaries;
    use glam::Vec2;

    fn two_plate_world(
        kind_a: PlateKind,
        kind_b: PlateKind,
        vel_a: Vec2,
        vel_b: Vec2,
    ) -> (Grid, Vec<u16>, Vec<Plate>) {
        let grid = Grid::new(128, 64);
        let mut plate_ids = vec![0u16; grid.len()];
        for y in 0..grid.height {
            for x in grid.width / 2..grid.width {
                plate_ids[grid.index(x, y)] = 1;
            }
        }
        let plates = vec![
            Plate {
                id: 0,
                seed: (16, 32),
                kind: kind_a,
                velocity: vel_a,
                age: if kind_a == PlateKind::Continental { 2000.0 } else { 150.0 },
            },
            Plate {
                id: 1,
                seed: (112, 32),
                kind: kind_b,
                velocity: vel_b,
                age: if kind_b == PlateKind::Continental { 2000.0 } else { 50.0 },
            },
        ];
        (grid, plate_ids, plates)
    }

    fn base_for(
        kind_a: PlateKind,
        kind_b: PlateKind,
        vel_a: Vec2,
        vel_b: Vec2,
    ) -> (Grid, Vec<u16>, Vec<f32>) {
        let (grid, plate_ids, plates) = two_plate_world(kind_a, kind_b, vel_a, vel_b);
        let sites = detect_boundaries(&grid, &plate_ids, &plates, 0.1);
        let noise = vec![0.0f32; grid.len()];
        let config = TectonicConfig::default();
        let mut rng = stage_rng(11, StageTag::PlateBias);
        let base = compute_base_elevation(
            &grid, &plate_ids, &plates, &sites, &noise, &config, 1.0, &mut rng,
        )
        .unwrap();
        (grid, plate_ids, base)
    }

    #[test]
    fn test_collision_raises_a_range_at_the_boundary() {
        let (grid, _, base) =
            base_for(PlateKind::Continental, PlateKind::Continental, Vec2::X, -Vec2::X);
        let mid = grid.index(grid.width / 2, grid.height / 2);
        let far = grid.index(4, grid.height / 2);
        assert!(
            base[mid] > base[far] + 1000.0,
            "boundary ({}) should rise far above the plate interior ({})",
            base[mid],
            base[far]
        );
    }

    #[test]
    fn test_subduction_digs_trench_on_oceanic_side_only() {
        // Oceanic plate (left) converging into continental plate (right).
        let (grid, plate_ids, base) =
            base_for(PlateKind::Oceanic, PlateKind::Continental, Vec2::X, -Vec2::X);

        let y = grid.height / 2;
        let trench_side = grid.index(grid.width / 2 - 2, y);
        let ocean_far = grid.index(4, y);
        assert_eq!(plate_ids[trench_side], 0);
        assert!(
            base[trench_side] < base[ocean_far] - 500.0,
            "trench ({}) should dig below the abyssal floor ({})",
            base[trench_side],
            base[ocean_far]
        );

        // Overriding continental side carries a coastal range.
        let arc_side = grid.index(grid.width / 2 + 2, y);
        let land_far = grid.index(grid.width - 5, y);
        assert!(
            base[arc_side] > base[land_far] + 300.0,
            "arc ({}) should rise above the plate interior ({})",
            base[arc_side],
            base[land_far]
        );
    }

    #[test]
    fn test_rift_sinks_below_its_shoulders() {
        let (grid, _, base) =
            base_for(PlateKind::Oceanic, PlateKind::Oceanic, -Vec2::X, Vec2::X);
        let y = grid.height / 2;
        let axis = grid.index(grid.width / 2, y);
        let shoulder = grid.index(grid.width / 2 + 16, y);
        assert!(
            base[axis] < base[shoulder],
            "rift axis ({}) should lie below its shoulder ({})",
            base[axis],
            base[shoulder]
        );
    }

    #[test]
    fn test_transform_stays_nearly_flat() {
        let (grid, _, base) =
            base_for(PlateKind::Continental, PlateKind::Continental, Vec2::Y, -Vec2::Y);
        let y = grid.height / 2;
        let at_boundary = base[grid.index(grid.width / 2 - 1, y)];
        let interior = base[grid.index(8, y)];
        assert!(
            (at_boundary - interior).abs() < 600.0,
            "transform boundary should not build ranges (delta {})",
            (at_boundary - interior).abs()
        );
    }

    #[test]
    fn test_continents_ride_above_ocean_floor() {
        let (grid, plate_ids, base) =
            base_for(PlateKind::Continental, PlateKind::Oceanic, Vec2::ZERO, Vec2::ZERO);
        let y = grid.height / 2;
        let continent = grid.index(8, y);
        let ocean = grid.index(grid.width - 8, y);
        assert_eq!(plate_ids[continent], 0);
        assert!(base[continent] > -600.0);
        assert!(base[ocean] < -2000.0);
        assert!(base[continent] > base[ocean] + 2000.0);
    }

    #[test]
    fn test_island_arc_rises_only_on_the_overriding_side() {
        // Two oceanic plates; plate 0 is older so it subducts.
        let (grid, plate_ids, base) =
            base_for(PlateKind::Oceanic, PlateKind::Oceanic, Vec2::X, -Vec2::X);
        let y = grid.height / 2;
        let subducting_side = grid.index(grid.width / 2 - 2, y);
        let overriding_side = grid.index(grid.width / 2 + 2, y);
        assert_eq!(plate_ids[subducting_side], 0);
        assert!(
            base[overriding_side] > base[subducting_side] + 500.0,
            "arc side ({}) should stand above the trench side ({})",
            base[overriding_side],
            base[subducting_side]
        );
    }
}
