//! World data structure: one dense field per stage output.
//!
//! `World` starts empty and each pipeline stage appends the field(s) it
//! owns. No stage mutates a field produced by an earlier stage; hydrology
//! writes its pit-filled surface as `hydro_elevation` rather than
//! touching `elevation`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::grid::Grid;
use crate::tectonics::Plate;

/// Flow direction sentinel: cell drains into an ocean/lake sink.
pub const FLOW_SINK: u32 = u32::MAX;

/// Cadence (in cells) at which long inner loops poll the cancel flag.
pub const CANCEL_POLL_INTERVAL: usize = 4096;

/// Simulation parameters, as accepted on the command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldParams {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Master random seed.
    pub seed: u64,
    /// Target fraction of cells below sea level, [0.05, 0.95].
    pub water_frac: f32,
    /// Number of tectonic plates.
    pub plates: u32,
    /// Global length scale for noise features and range widths.
    pub scale: f32,
    /// Multiplier on ocean evaporation and orographic gain.
    pub rain_intensity: f32,
    /// Percentile of land flow accumulation that marks a river.
    pub river_percentile: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            seed: 42,
            water_frac: 0.6,
            plates: 12,
            scale: 1.0,
            rain_intensity: 1.0,
            river_percentile: 0.98,
        }
    }
}

impl WorldParams {
    /// Validates parameter ranges. Runs before any simulation.
    pub fn validate(&self) -> Result<(), WorldGenError> {
        if self.width < 8 || self.width > 16384 {
            return Err(WorldGenError::Config(format!(
                "width must be in [8, 16384], got {}",
                self.width
            )));
        }
        if self.height < 8 || self.height > 16384 {
            return Err(WorldGenError::Config(format!(
                "height must be in [8, 16384], got {}",
                self.height
            )));
        }
        if !(0.05..=0.95).contains(&self.water_frac) {
            return Err(WorldGenError::Config(format!(
                "water fraction must be in [0.05, 0.95], got {}",
                self.water_frac
            )));
        }
        if self.plates < 2 || self.plates > 64 {
            return Err(WorldGenError::Config(format!(
                "plate count must be in [2, 64], got {}",
                self.plates
            )));
        }
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(WorldGenError::Config(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.rain_intensity > 0.0 && self.rain_intensity.is_finite()) {
            return Err(WorldGenError::Config(format!(
                "rain intensity must be positive, got {}",
                self.rain_intensity
            )));
        }
        if !(0.0 < self.river_percentile && self.river_percentile < 1.0) {
            return Err(WorldGenError::Config(format!(
                "river percentile must be in (0, 1), got {}",
                self.river_percentile
            )));
        }
        Ok(())
    }
}

/// Cooperative cancellation flag, polled at stage boundaries and inside
/// long per-cell loops.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; observed at the next poll point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Errors with `Cancelled` if the flag is set.
    pub fn check(&self) -> Result<(), WorldGenError> {
        if self.is_cancelled() {
            Err(WorldGenError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The generated world: grid dimensions plus per-stage field outputs.
///
/// Fields are `None` until their owning stage runs.
#[derive(Debug, Clone)]
pub struct World {
    pub grid: Grid,
    pub params: WorldParams,

    /// Plate table (populated by plate synthesis).
    pub plates: Option<Vec<Plate>>,
    /// Per-cell plate index (populated by plate synthesis).
    pub plate_ids: Option<Vec<u16>>,
    /// Pre-noise elevation in meters (populated by tectonic uplift).
    pub base_elevation: Option<Vec<f32>>,
    /// Post-noise/erosion elevation in meters (populated by relief stage).
    pub elevation: Option<Vec<f32>>,
    /// Sea level in meters (populated by the sea stage).
    pub sea_level: Option<f32>,
    /// Edge-connected below-sea mask (populated by the sea stage).
    pub ocean_mask: Option<Vec<bool>>,
    /// Temperature in °C (populated by the temperature stage).
    pub temperature: Option<Vec<f32>>,
    /// Prevailing wind vector per cell (populated by the wind stage).
    pub winds: Option<Vec<Vec2>>,
    /// Rainfall, non-negative (populated by the precipitation stage).
    pub rainfall: Option<Vec<f32>>,
    /// Depression-filled surface shadowing `elevation` (hydrology).
    pub hydro_elevation: Option<Vec<f32>>,
    /// Downstream cell index per cell, or `FLOW_SINK` (hydrology).
    pub flow_dirs: Option<Vec<u32>>,
    /// Rainfall-weighted upstream accumulation (hydrology).
    pub flow_accum: Option<Vec<f32>>,
    /// River cells (hydrology).
    pub river_mask: Option<Vec<bool>>,
    /// Filled-basin lake cells (hydrology).
    pub lake_mask: Option<Vec<bool>>,
    /// Flow-accumulation threshold that marked rivers (hydrology).
    pub river_threshold: Option<f32>,
    /// Biome id per cell (populated by the biome stage).
    pub biomes: Option<Vec<u8>>,
}

impl World {
    /// Creates an empty world after validating parameters.
    pub fn new(params: WorldParams) -> Result<Self, WorldGenError> {
        params.validate()?;
        Ok(Self {
            grid: Grid::new(params.width, params.height),
            params,
            plates: None,
            plate_ids: None,
            base_elevation: None,
            elevation: None,
            sea_level: None,
            ocean_mask: None,
            temperature: None,
            winds: None,
            rainfall: None,
            hydro_elevation: None,
            flow_dirs: None,
            flow_accum: None,
            river_mask: None,
            lake_mask: None,
            river_threshold: None,
            biomes: None,
        })
    }

    /// Land mask helper: cell is land iff not ocean.
    pub fn is_land(&self, idx: usize) -> bool {
        self.ocean_mask.as_ref().map(|m| !m[idx]).unwrap_or(true)
    }

    /// Fetches a required field, erroring if the owning stage has not run.
    pub fn require<'a, T>(
        field: &'a Option<T>,
        name: &'static str,
    ) -> Result<&'a T, WorldGenError> {
        field.as_ref().ok_or_else(|| {
            WorldGenError::Invariant(format!("field '{name}' requested before its stage ran"))
        })
    }
}
