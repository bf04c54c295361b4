//! Priority-Flood depression filling (Barnes et al. 2014).
//!
//! Seeds a min-heap with every ocean cell and every grid-edge cell, then
//! repeatedly pops the lowest frontier cell and raises unvisited
//! neighbors to at least `popped + ε`. The result is a surface on which
//! every land cell has a strictly descending path to an outlet; cells
//! that had to be raised are filled basins and become lakes.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{alloc_field, WorldGenError};
use crate::grid::{Grid, NEIGHBORS_8};
use crate::world::{CancelToken, CANCEL_POLL_INTERVAL, FLOW_SINK};

#[derive(Clone, Copy, Debug)]
struct HeapItem {
    height: f32,
    idx: u32,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height && self.idx == other.idx
    }
}

impl Eq for HeapItem {}

// Min-heap by height via reversed ordering; equal heights pop in index
// order for determinism.
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .height
            .partial_cmp(&self.height)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Results of depression filling.
#[derive(Debug, Clone)]
pub struct FloodOutputs {
    /// Pit-free surface shadowing the elevation field.
    pub hydro_elevation: Vec<f32>,
    /// The neighbor each cell was drained through, or `FLOW_SINK` for
    /// seeds. Always strictly lower on the filled surface.
    pub parents: Vec<u32>,
    /// Cells raised above their true elevation: filled basins.
    pub lake_mask: Vec<bool>,
}

/// Fills depressions so every land cell drains to the ocean or off the
/// grid edge. `epsilon` enforces strict descent across filled flats.
pub fn priority_flood_fill(
    grid: &Grid,
    elevation: &[f32],
    ocean_mask: &[bool],
    epsilon: f32,
    cancel: &CancelToken,
) -> Result<FloodOutputs, WorldGenError> {
    let n = grid.len();
    assert_eq!(elevation.len(), n);
    assert_eq!(ocean_mask.len(), n);
    assert!(epsilon > 0.0);

    let mut filled = alloc_field(n, 0.0f32, "hydro_elevation")?;
    filled.copy_from_slice(elevation);
    let mut parents = alloc_field(n, FLOW_SINK, "flow_parents")?;
    let mut lake = alloc_field(n, false, "lake_mask")?;
    let mut visited = alloc_field(n, false, "flood_visited")?;

    let mut heap = BinaryHeap::<HeapItem>::new();

    // Outlets: the open ocean and the grid rim (edges are sinks).
    for idx in 0..n {
        if ocean_mask[idx] || {
            let (x, y) = grid.coords(idx);
            grid.is_border(x, y)
        } {
            visited[idx] = true;
            heap.push(HeapItem {
                height: filled[idx],
                idx: idx as u32,
            });
        }
    }

    let mut processed: usize = 0;
    while let Some(HeapItem { height, idx }) = heap.pop() {
        processed += 1;
        if processed % CANCEL_POLL_INTERVAL == 0 {
            cancel.check()?;
        }

        let (x, y) = grid.coords(idx as usize);
        for &(dx, dy) in &NEIGHBORS_8 {
            let Some((nx, ny)) = grid.neighbor(x, y, dx, dy) else {
                continue;
            };
            let nidx = grid.index(nx, ny);
            if visited[nidx] {
                continue;
            }
            visited[nidx] = true;
            parents[nidx] = idx;

            let raised = height + epsilon;
            if filled[nidx] < raised {
                filled[nidx] = raised;
                lake[nidx] = true;
            }
            heap.push(HeapItem {
                height: filled[nidx],
                idx: nidx as u32,
            });
        }
    }

    Ok(FloodOutputs {
        hydro_elevation: filled,
        parents,
        lake_mask: lake,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_a_simple_depression_to_its_rim() {
        let grid = Grid::new(9, 9);
        let mut elevation = vec![10.0f32; grid.len()];
        // Bowl: rim at 20, pit at 1, inside otherwise-high terrain.
        for (x, y) in [(3, 4), (5, 4), (4, 3), (4, 5)] {
            elevation[grid.index(x, y)] = 20.0;
        }
        elevation[grid.index(4, 4)] = 1.0;
        let ocean = vec![false; grid.len()];

        let out =
            priority_flood_fill(&grid, &elevation, &ocean, 1e-3, &CancelToken::new()).unwrap();

        let pit = grid.index(4, 4);
        assert!(
            out.hydro_elevation[pit] > 10.0,
            "pit must fill above the surrounding terrain, got {}",
            out.hydro_elevation[pit]
        );
        assert!(out.lake_mask[pit], "a raised cell is a lake");
    }

    #[test]
    fn ocean_and_edges_are_untouched_outlets() {
        let grid = Grid::new(8, 8);
        let elevation: Vec<f32> = (0..grid.len()).map(|i| i as f32).collect();
        let ocean: Vec<bool> = (0..grid.len()).map(|i| i < 8).collect();

        let out =
            priority_flood_fill(&grid, &elevation, &ocean, 1e-3, &CancelToken::new()).unwrap();

        for idx in 0..grid.len() {
            let (x, y) = grid.coords(idx);
            if ocean[idx] || grid.is_border(x, y) {
                assert_eq!(out.hydro_elevation[idx], elevation[idx]);
                assert_eq!(out.parents[idx], FLOW_SINK);
                assert!(!out.lake_mask[idx]);
            }
        }
    }

    #[test]
    fn parents_are_strictly_lower_on_the_filled_surface() {
        let grid = Grid::new(16, 16);
        // Lumpy deterministic terrain with an interior basin.
        let mut elevation: Vec<f32> = (0..grid.len())
            .map(|i| ((i * 31 % 17) as f32) * 5.0 + 50.0)
            .collect();
        elevation[grid.index(8, 8)] = -30.0;
        elevation[grid.index(8, 9)] = -25.0;
        let ocean = vec![false; grid.len()];

        let out =
            priority_flood_fill(&grid, &elevation, &ocean, 1e-3, &CancelToken::new()).unwrap();

        for idx in 0..grid.len() {
            let parent = out.parents[idx];
            if parent != FLOW_SINK {
                assert!(
                    out.hydro_elevation[parent as usize] < out.hydro_elevation[idx],
                    "cell {idx} drains through a non-descending parent"
                );
            }
        }
    }

    #[test]
    fn cancellation_is_observed() {
        let grid = Grid::new(128, 128);
        let elevation = vec![5.0f32; grid.len()];
        let ocean = vec![false; grid.len()];
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = priority_flood_fill(&grid, &elevation, &ocean, 1e-3, &cancel);
        assert!(matches!(result, Err(WorldGenError::Cancelled)));
    }
}
