//! Contiguous plate partition with undulating boundaries.
//!
//! Raw Voronoi over a perturbed distance metric can strand cells away
//! from their plate body, breaking the 4-connectivity contract. Instead
//! the partition grows every plate simultaneously with a multi-source
//! Dijkstra over a noise-modulated step cost: boundaries undulate where
//! the cost field does, and regions stay contiguous by construction.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::{Grid, NEIGHBORS_4};

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    cost: f32,
    plate: u16,
    idx: u32,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.plate == other.plate && self.idx == other.idx
    }
}

impl Eq for HeapItem {}

// Min-heap by (cost, plate, idx) via reversed ordering, so equal-cost
// fronts settle lowest seed index first.
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.plate.cmp(&self.plate))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Assigns every cell to a plate by growing regions from the seeds.
///
/// `step_cost` is a strictly positive per-cell cost (1 plus scaled noise);
/// the cost to claim a cell is the sum of step costs along the growth
/// path, so plates reach further through low-cost terrain and boundaries
/// wander. Ties are broken by lowest seed index, then cell index.
pub fn assign_plates(grid: &Grid, seeds: &[(u32, u32)], step_cost: &[f32]) -> Vec<u16> {
    assert_eq!(step_cost.len(), grid.len());
    assert!(!seeds.is_empty());
    debug_assert!(step_cost.iter().all(|&c| c > 0.0));

    let n = grid.len();
    let mut best_cost = vec![f32::INFINITY; n];
    let mut owner = vec![u16::MAX; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::with_capacity(n / 4);

    for (plate, &(x, y)) in seeds.iter().enumerate() {
        let idx = grid.index(x, y);
        let plate = plate as u16;
        if best_cost[idx] == 0.0 {
            continue; // duplicate seed cell: lowest index keeps it
        }
        best_cost[idx] = 0.0;
        owner[idx] = plate;
        heap.push(HeapItem {
            cost: 0.0,
            plate,
            idx: idx as u32,
        });
    }

    while let Some(HeapItem { cost, plate, idx }) = heap.pop() {
        let idx = idx as usize;
        if settled[idx] {
            continue;
        }
        settled[idx] = true;
        owner[idx] = plate;

        let (x, y) = grid.coords(idx);
        for &(dx, dy) in &NEIGHBORS_4 {
            let Some((nx, ny)) = grid.neighbor(x, y, dx, dy) else {
                continue;
            };
            let nidx = grid.index(nx, ny);
            if settled[nidx] {
                continue;
            }
            let new_cost = cost + step_cost[nidx];
            let improves = new_cost < best_cost[nidx]
                || (new_cost == best_cost[nidx] && plate < owner[nidx]);
            if improves {
                best_cost[nidx] = new_cost;
                owner[nidx] = plate;
                heap.push(HeapItem {
                    cost: new_cost,
                    plate,
                    idx: nidx as u32,
                });
            }
        }
    }

    debug_assert!(owner.iter().all(|&p| p != u16::MAX));
    owner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{generate_noise_plane, FractalNoiseConfig};

    fn noisy_cost(grid: &Grid, seed: i32, amplitude: f32) -> Vec<f32> {
        let plane = generate_noise_plane(
            grid.width,
            grid.height,
            &FractalNoiseConfig::single_octave(seed, 0.05),
        );
        plane
            .iter()
            .map(|&v| 1.0 + amplitude * 0.5 * (v + 1.0))
            .collect()
    }

    fn assert_contiguous(grid: &Grid, owner: &[u16], seeds: &[(u32, u32)]) {
        // Flood from each seed through same-plate cells; every cell must
        // be reached by its own plate's flood.
        let mut reached = vec![false; grid.len()];
        for (plate, &(sx, sy)) in seeds.iter().enumerate() {
            let plate = plate as u16;
            let start = grid.index(sx, sy);
            if owner[start] != plate {
                continue;
            }
            let mut stack = vec![start];
            reached[start] = true;
            while let Some(idx) = stack.pop() {
                let (x, y) = grid.coords(idx);
                for (nx, ny) in grid.neighbors_4(x, y) {
                    let nidx = grid.index(nx, ny);
                    if !reached[nidx] && owner[nidx] == plate {
                        reached[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
        assert!(
            reached.iter().all(|&r| r),
            "partition produced a disconnected plate region"
        );
    }

    #[test]
    fn test_every_cell_assigned() {
        let grid = Grid::new(48, 32);
        let seeds = vec![(5, 5), (40, 10), (20, 28)];
        let cost = noisy_cost(&grid, 11, 2.0);
        let owner = assign_plates(&grid, &seeds, &cost);
        assert!(owner.iter().all(|&p| (p as usize) < seeds.len()));
    }

    #[test]
    fn test_regions_are_4_connected() {
        let grid = Grid::new(64, 64);
        let seeds = vec![(8, 8), (50, 12), (30, 50), (12, 40)];
        let cost = noisy_cost(&grid, 23, 3.0);
        let owner = assign_plates(&grid, &seeds, &cost);
        assert_contiguous(&grid, &owner, &seeds);
    }

    #[test]
    fn test_seed_cells_keep_their_plate() {
        let grid = Grid::new(32, 32);
        let seeds = vec![(3, 3), (28, 28), (3, 28)];
        let cost = noisy_cost(&grid, 5, 2.0);
        let owner = assign_plates(&grid, &seeds, &cost);
        for (plate, &(x, y)) in seeds.iter().enumerate() {
            assert_eq!(owner[grid.index(x, y)], plate as u16);
        }
    }

    #[test]
    fn test_partition_is_deterministic() {
        let grid = Grid::new(40, 40);
        let seeds = vec![(4, 4), (35, 6), (18, 34)];
        let cost = noisy_cost(&grid, 77, 2.5);
        let a = assign_plates(&grid, &seeds, &cost);
        let b = assign_plates(&grid, &seeds, &cost);
        assert_eq!(a, b);
    }

    #[test]
    fn test_uniform_cost_ties_go_to_lowest_seed() {
        let grid = Grid::new(9, 1);
        // Two seeds equidistant from the middle cell.
        let seeds = vec![(2, 0), (6, 0)];
        let cost = vec![1.0; grid.len()];
        let owner = assign_plates(&grid, &seeds, &cost);
        assert_eq!(owner[grid.index(4, 0)], 0, "tie must go to lowest seed index");
    }
}
