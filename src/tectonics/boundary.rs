//! Plate boundary detection and classification.

use glam::Vec2;

use super::plate::{Plate, PlateKind};
use crate::grid::Grid;

/// Tectonic regime at a boundary between two adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryClass {
    /// Continental-continental convergence: high mountain range.
    Collision,
    /// Oceanic-continental convergence: coastal range plus offshore trench.
    Subduction,
    /// Oceanic-oceanic convergence: island arc line.
    IslandArc,
    /// Divergence: rift trough with mild shoulders.
    Rift,
    /// Shear-dominated motion: negligible vertical contribution.
    Transform,
}

/// One boundary cell pair with its classification.
#[derive(Debug, Clone, Copy)]
pub struct BoundarySite {
    /// Cell on the first plate's side.
    pub cell_a: usize,
    /// Adjacent cell on the second plate's side.
    pub cell_b: usize,
    pub class: BoundaryClass,
    /// Magnitude of the driving relative motion (closing, opening, or
    /// shear rate depending on class).
    pub strength: f32,
    /// For convergent classes, the plate that dives under.
    pub subducting: Option<u16>,
}

/// Classifies the boundary between two plates at a cell pair.
///
/// `normal` is the unit vector from the cell on plate `a` toward the cell
/// on plate `b`. A closing rate below `-tau` (the plates approaching)
/// is convergent, above `+tau` divergent, otherwise transform.
pub fn classify_pair(a: &Plate, b: &Plate, normal: Vec2, tau: f32) -> (BoundaryClass, f32) {
    let relative = b.velocity - a.velocity;
    let closing = relative.dot(normal);

    if closing < -tau {
        let class = match (a.kind, b.kind) {
            (PlateKind::Continental, PlateKind::Continental) => BoundaryClass::Collision,
            (PlateKind::Oceanic, PlateKind::Oceanic) => BoundaryClass::IslandArc,
            _ => BoundaryClass::Subduction,
        };
        (class, -closing)
    } else if closing > tau {
        (BoundaryClass::Rift, closing)
    } else {
        let shear = (relative - normal * closing).length();
        (BoundaryClass::Transform, shear)
    }
}

/// Picks the subducting plate for a convergent pair.
///
/// Oceanic crust subducts under continental; between two oceanic plates
/// the older (denser) one subducts. Continental collision has no
/// subducting slab.
fn subducting_plate(a: &Plate, b: &Plate) -> Option<u16> {
    match (a.kind, b.kind) {
        (PlateKind::Oceanic, PlateKind::Continental) => Some(a.id),
        (PlateKind::Continental, PlateKind::Oceanic) => Some(b.id),
        (PlateKind::Oceanic, PlateKind::Oceanic) => {
            if a.age >= b.age {
                Some(a.id)
            } else {
                Some(b.id)
            }
        }
        (PlateKind::Continental, PlateKind::Continental) => None,
    }
}

/// Scans the grid for plate-id discontinuities and classifies each
/// boundary cell pair.
///
/// Each unordered pair of adjacent cells is visited once (east and south
/// neighbors), so sites are emitted in deterministic scan order.
pub fn detect_boundaries(
    grid: &Grid,
    plate_ids: &[u16],
    plates: &[Plate],
    tau: f32,
) -> Vec<BoundarySite> {
    let mut sites = Vec::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            let idx = grid.index(x, y);
            let pid = plate_ids[idx];

            for (dx, dy, normal) in [(1, 0, Vec2::X), (0, 1, Vec2::Y)] {
                let Some((nx, ny)) = grid.neighbor(x, y, dx, dy) else {
                    continue;
                };
                let nidx = grid.index(nx, ny);
                let npid = plate_ids[nidx];
                if npid == pid {
                    continue;
                }

                let a = &plates[pid as usize];
                let b = &plates[npid as usize];
                let (class, strength) = classify_pair(a, b, normal, tau);
                let subducting = match class {
                    BoundaryClass::Subduction | BoundaryClass::IslandArc => subducting_plate(a, b),
                    _ => None,
                };
                sites.push(BoundarySite {
                    cell_a: idx,
                    cell_b: nidx,
                    class,
                    strength,
                    subducting,
                });
            }
        }
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate(id: u16, kind: PlateKind, velocity: Vec2) -> Plate {
        Plate {
            id,
            seed: (0, 0),
            kind,
            velocity,
            age: match kind {
                PlateKind::Continental => 1000.0,
                PlateKind::Oceanic => 100.0,
            },
        }
    }

    #[test]
    fn test_head_on_continents_collide() {
        let a = plate(0, PlateKind::Continental, Vec2::X);
        let b = plate(1, PlateKind::Continental, -Vec2::X);
        let (class, strength) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::Collision);
        assert!((strength - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_convergence_is_subduction() {
        let a = plate(0, PlateKind::Oceanic, Vec2::X);
        let b = plate(1, PlateKind::Continental, Vec2::ZERO);
        let (class, _) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::Subduction);
    }

    #[test]
    fn test_oceanic_convergence_is_island_arc_and_older_subducts() {
        let mut a = plate(0, PlateKind::Oceanic, Vec2::X);
        let b = plate(1, PlateKind::Oceanic, Vec2::ZERO);
        a.age = 180.0;
        let (class, _) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::IslandArc);
        assert_eq!(subducting_plate(&a, &b), Some(0));
    }

    #[test]
    fn test_separation_is_rift() {
        let a = plate(0, PlateKind::Oceanic, -Vec2::X);
        let b = plate(1, PlateKind::Oceanic, Vec2::X);
        let (class, strength) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::Rift);
        assert!((strength - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_sliding_is_transform() {
        let a = plate(0, PlateKind::Continental, Vec2::Y);
        let b = plate(1, PlateKind::Continental, -Vec2::Y);
        let (class, strength) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::Transform);
        assert!((strength - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_below_threshold_motion_is_transform() {
        let a = plate(0, PlateKind::Continental, Vec2::new(0.05, 0.0));
        let b = plate(1, PlateKind::Continental, Vec2::ZERO);
        let (class, _) = classify_pair(&a, &b, Vec2::X, 0.1);
        assert_eq!(class, BoundaryClass::Transform);
    }

    #[test]
    fn test_detect_boundaries_on_split_grid() {
        let grid = Grid::new(8, 4);
        // Left half plate 0, right half plate 1.
        let mut plate_ids = vec![0u16; grid.len()];
        for y in 0..4 {
            for x in 4..8 {
                plate_ids[grid.index(x, y)] = 1;
            }
        }
        let plates = vec![
            plate(0, PlateKind::Continental, Vec2::X),
            plate(1, PlateKind::Continental, -Vec2::X),
        ];
        let sites = detect_boundaries(&grid, &plate_ids, &plates, 0.1);
        // One vertical boundary: one site per row.
        assert_eq!(sites.len(), 4);
        assert!(sites
            .iter()
            .all(|s| s.class == BoundaryClass::Collision && s.subducting.is_none()));
    }
}
