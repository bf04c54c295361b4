//! Post-stage invariant verification.
//!
//! Cheap checks (finiteness, sign, mask consistency) run after every
//! stage in all builds; expensive structural checks (contiguity, flow
//! reachability, conservation) run only in debug builds.

use crate::error::WorldGenError;
use crate::world::{World, FLOW_SINK};

use super::stage::StageId;

/// Verifies the invariants owned by the stage that just ran.
pub fn post_stage(world: &World, id: StageId) -> Result<(), WorldGenError> {
    match id {
        StageId::Plates => check_plates(world),
        StageId::Uplift => {
            check_finite(World::require(&world.base_elevation, "base_elevation")?, "base_elevation")
        }
        StageId::Relief => check_finite(World::require(&world.elevation, "elevation")?, "elevation"),
        StageId::Sea => check_sea(world),
        StageId::Temperature => {
            check_finite(World::require(&world.temperature, "temperature")?, "temperature")
        }
        StageId::Winds => Ok(()),
        StageId::Precipitation => check_rainfall(world),
        StageId::Hydrology => check_hydrology(world),
        StageId::Biomes => check_biomes(world),
    }
}

fn check_finite(field: &[f32], name: &str) -> Result<(), WorldGenError> {
    if let Some(idx) = field.iter().position(|v| !v.is_finite()) {
        return Err(WorldGenError::Invariant(format!(
            "field '{name}' is not finite at cell {idx}"
        )));
    }
    Ok(())
}

fn check_plates(world: &World) -> Result<(), WorldGenError> {
    let plates = World::require(&world.plates, "plates")?;
    let plate_ids = World::require(&world.plate_ids, "plate_ids")?;

    if plate_ids.len() != world.grid.len() {
        return Err(WorldGenError::Invariant(
            "plate_ids does not cover the grid".to_string(),
        ));
    }
    if let Some(idx) = plate_ids.iter().position(|&p| p as usize >= plates.len()) {
        return Err(WorldGenError::Invariant(format!(
            "cell {idx} assigned to nonexistent plate"
        )));
    }

    // Contiguity is structural; verify only in debug builds.
    #[cfg(debug_assertions)]
    {
        let grid = &world.grid;
        let mut reached = vec![false; grid.len()];
        let mut stack = Vec::new();
        for plate in plates {
            let start = grid.index(plate.seed.0, plate.seed.1);
            if plate_ids[start] != plate.id {
                continue;
            }
            reached[start] = true;
            stack.push(start);
            while let Some(idx) = stack.pop() {
                let (x, y) = grid.coords(idx);
                for (nx, ny) in grid.neighbors_4(x, y) {
                    let nidx = grid.index(nx, ny);
                    if !reached[nidx] && plate_ids[nidx] == plate_ids[idx] {
                        reached[nidx] = true;
                        stack.push(nidx);
                    }
                }
            }
        }
        if let Some(idx) = reached.iter().position(|&r| !r) {
            return Err(WorldGenError::Invariant(format!(
                "plate region containing cell {idx} is not 4-connected to its seed"
            )));
        }
    }

    Ok(())
}

fn check_sea(world: &World) -> Result<(), WorldGenError> {
    let elevation = World::require(&world.elevation, "elevation")?;
    let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
    let sea_level = *World::require(&world.sea_level, "sea_level")?;

    // Mask consistency: ocean implies below sea level.
    if let Some(idx) = (0..elevation.len()).find(|&i| ocean[i] && elevation[i] >= sea_level) {
        return Err(WorldGenError::Invariant(format!(
            "ocean cell {idx} sits at or above sea level"
        )));
    }

    // Edge connectivity is guaranteed by the flood construction; re-derive
    // it in debug builds to catch regressions.
    #[cfg(debug_assertions)]
    {
        let reflood = crate::terrain::flood_ocean_mask(&world.grid, elevation, sea_level);
        if &reflood != ocean {
            return Err(WorldGenError::Invariant(
                "ocean mask is not the edge-connected flood of below-sea cells".to_string(),
            ));
        }
    }

    Ok(())
}

fn check_rainfall(world: &World) -> Result<(), WorldGenError> {
    let rainfall = World::require(&world.rainfall, "rainfall")?;
    let ocean = World::require(&world.ocean_mask, "ocean_mask")?;

    check_finite(rainfall, "rainfall")?;
    if let Some(idx) = rainfall.iter().position(|&r| r < 0.0) {
        return Err(WorldGenError::Invariant(format!(
            "negative rainfall at cell {idx}"
        )));
    }
    if let Some(idx) = (0..rainfall.len()).find(|&i| ocean[i] && rainfall[i] <= 0.0) {
        return Err(WorldGenError::Invariant(format!(
            "ocean cell {idx} received no rainfall"
        )));
    }
    Ok(())
}

fn check_hydrology(world: &World) -> Result<(), WorldGenError> {
    let hydro = World::require(&world.hydro_elevation, "hydro_elevation")?;
    let dirs = World::require(&world.flow_dirs, "flow_dirs")?;
    let accum = World::require(&world.flow_accum, "flow_accum")?;
    let rainfall = World::require(&world.rainfall, "rainfall")?;
    let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
    let rivers = World::require(&world.river_mask, "river_mask")?;
    let threshold = *World::require(&world.river_threshold, "river_threshold")?;

    check_finite(hydro, "hydro_elevation")?;
    check_finite(accum, "flow_accum")?;

    if !crate::hydrology::rivers_are_consistent(rivers, accum, ocean, threshold) {
        return Err(WorldGenError::Invariant(
            "river mask contains an ocean cell or sub-threshold flow".to_string(),
        ));
    }

    for idx in 0..dirs.len() {
        // Accumulation includes at least the local rainfall.
        if accum[idx] < rainfall[idx] - 1e-4 {
            return Err(WorldGenError::Invariant(format!(
                "flow accumulation below local rainfall at cell {idx}"
            )));
        }
        // Land cells descend strictly; ocean cells are sinks.
        let down = dirs[idx];
        if ocean[idx] {
            if down != FLOW_SINK {
                return Err(WorldGenError::Invariant(format!(
                    "ocean cell {idx} routes flow"
                )));
            }
        } else if down != FLOW_SINK && hydro[down as usize] >= hydro[idx] {
            return Err(WorldGenError::Invariant(format!(
                "cell {idx} does not flow strictly downhill"
            )));
        }
    }

    #[cfg(debug_assertions)]
    {
        // Conservation: land rainfall equals flow entering sinks.
        let mut land_rain = 0.0f64;
        let mut sink_inflow = 0.0f64;
        for idx in 0..dirs.len() {
            if ocean[idx] {
                continue;
            }
            land_rain += rainfall[idx] as f64;
            let down = dirs[idx];
            if down == FLOW_SINK || ocean[down as usize] {
                sink_inflow += accum[idx] as f64;
            }
        }
        let budget = land_rain.max(1.0);
        if (land_rain - sink_inflow).abs() > budget * 1e-3 {
            return Err(WorldGenError::Invariant(format!(
                "drainage is not conservative: land rain {land_rain}, sink inflow {sink_inflow}"
            )));
        }

        // Every land cell reaches a sink within W+H steps.
        let max_steps = (world.grid.width + world.grid.height) as usize;
        for start in 0..dirs.len() {
            if ocean[start] {
                continue;
            }
            let mut cur = start as u32;
            let mut steps = 0;
            while dirs[cur as usize] != FLOW_SINK {
                cur = dirs[cur as usize];
                steps += 1;
                if steps > max_steps {
                    return Err(WorldGenError::Invariant(format!(
                        "flow path from cell {start} exceeds {max_steps} steps"
                    )));
                }
            }
        }
    }

    Ok(())
}

fn check_biomes(world: &World) -> Result<(), WorldGenError> {
    let biomes = World::require(&world.biomes, "biomes")?;
    let ocean = World::require(&world.ocean_mask, "ocean_mask")?;

    for (idx, &b) in biomes.iter().enumerate() {
        let Some(id) = crate::biomes::BiomeId::from_u8(b) else {
            return Err(WorldGenError::Invariant(format!(
                "cell {idx} carries unset or invalid biome {b}"
            )));
        };
        if id.is_water() != ocean[idx] {
            return Err(WorldGenError::Invariant(format!(
                "cell {idx} biome/ocean mismatch"
            )));
        }
    }
    Ok(())
}
