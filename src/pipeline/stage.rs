//! Generation stage trait and pipeline orchestration.
//!
//! Stages run strictly in order; each reads fields produced by its
//! predecessors and appends the field(s) it owns. The pipeline checks
//! declared dependencies, polls the cancel flag at stage boundaries, and
//! verifies stage invariants before moving on.

use crate::biomes::{compute_biomes, BiomeConfig};
use crate::climate::{rainfall_field, temperature_field, wind_bands, wind_field, ClimateConfig};
use crate::error::WorldGenError;
use crate::hydrology::{
    flow_accumulation, flow_directions, priority_flood_fill, river_mask, river_threshold,
};
use crate::noise::{generate_noise_plane, FractalNoiseConfig};
use crate::rng::{stage_noise_seed, stage_rng, StageTag};
use crate::tectonics::{
    assign_plates, build_plates, compute_base_elevation, detect_boundaries, sample_plate_seeds,
    TectonicConfig,
};
use crate::terrain::{
    add_detail_noise, erode, find_sea_level, flood_ocean_mask, smooth, verify_water_fraction,
    ErosionConfig,
};
use crate::world::{CancelToken, World};

use super::checks;

/// Unique identifier for generation stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    /// Plate synthesis: seeds, partition, motion vectors.
    Plates,
    /// Tectonic uplift into base elevation.
    Uplift,
    /// Detail noise, droplet erosion, smoothing.
    Relief,
    /// Sea level and ocean mask.
    Sea,
    /// Temperature field.
    Temperature,
    /// Prevailing wind field.
    Winds,
    /// Orographic precipitation.
    Precipitation,
    /// Depression filling, flow routing, rivers, lakes.
    Hydrology,
    /// Biome classification.
    Biomes,
}

impl StageId {
    /// Returns the name of the stage.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Plates => "plates",
            StageId::Uplift => "uplift",
            StageId::Relief => "relief",
            StageId::Sea => "sea",
            StageId::Temperature => "temperature",
            StageId::Winds => "winds",
            StageId::Precipitation => "precipitation",
            StageId::Hydrology => "hydrology",
            StageId::Biomes => "biomes",
        }
    }
}

/// Trait for implementing generation stages.
///
/// Each stage appends its output field(s) to the world, building upon
/// previous stages. The trait-based design keeps the stage order and
/// field ownership explicit.
pub trait GenerationStage: Send + Sync {
    /// Returns the unique identifier for this stage.
    fn id(&self) -> StageId;

    /// Returns a human-readable name for the stage.
    fn name(&self) -> &str;

    /// Returns the stage IDs that must have executed before this stage.
    fn dependencies(&self) -> &[StageId] {
        &[]
    }

    /// Executes the generation stage, appending fields to the world.
    fn execute(&self, world: &mut World, cancel: &CancelToken) -> Result<(), WorldGenError>;
}

/// Orchestrates generation stages into a complete pipeline.
pub struct Pipeline {
    stages: Vec<Box<dyn GenerationStage>>,
    cancel: CancelToken,
}

impl Pipeline {
    /// Creates a new empty pipeline observing the given cancel token.
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            stages: Vec::new(),
            cancel,
        }
    }

    /// Adds a stage to the pipeline.
    pub fn add_stage<S: GenerationStage + 'static>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Returns the number of stages in the pipeline.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Executes all stages in order on the given world.
    pub fn run(&self, world: &mut World) -> Result<(), WorldGenError> {
        self.run_with_callbacks(world, |_, _, _| {}, |_, _, _| {})
    }

    /// Executes all stages with start/completion callbacks for progress
    /// reporting.
    pub fn run_with_callbacks<F1, F2>(
        &self,
        world: &mut World,
        mut on_stage_start: F1,
        mut on_stage_complete: F2,
    ) -> Result<(), WorldGenError>
    where
        F1: FnMut(&str, usize, usize),
        F2: FnMut(&str, usize, usize),
    {
        let total = self.stages.len();
        let mut completed: Vec<StageId> = Vec::new();

        for (i, stage) in self.stages.iter().enumerate() {
            self.cancel.check()?;

            for dep in stage.dependencies() {
                if !completed.contains(dep) {
                    return Err(WorldGenError::Invariant(format!(
                        "stage '{}' requires '{}' to run first",
                        stage.name(),
                        dep.name()
                    )));
                }
            }

            on_stage_start(stage.name(), i, total);
            stage.execute(world, &self.cancel)?;
            checks::post_stage(world, stage.id())?;
            completed.push(stage.id());
            on_stage_complete(stage.name(), i, total);
        }

        Ok(())
    }
}

/// Runs the standard nine-stage pipeline over fresh parameters.
///
/// This is the single synchronous entry point: it blocks until the world
/// is complete or the first failure, and a cancelled run discards all
/// partial fields with the world it was building.
pub fn generate(
    params: crate::world::WorldParams,
    cancel: &CancelToken,
) -> Result<World, WorldGenError> {
    generate_with_progress(params, cancel, |_, _, _| {}, |_, _, _| {})
}

/// [`generate`] with progress callbacks for console reporting.
pub fn generate_with_progress<F1, F2>(
    params: crate::world::WorldParams,
    cancel: &CancelToken,
    on_stage_start: F1,
    on_stage_complete: F2,
) -> Result<World, WorldGenError>
where
    F1: FnMut(&str, usize, usize),
    F2: FnMut(&str, usize, usize),
{
    let mut world = World::new(params)?;

    let tectonic = TectonicConfig::default();
    let climate = ClimateConfig::default();

    let mut pipeline = Pipeline::new(cancel.clone());
    pipeline.add_stage(PlateStage::new(tectonic.clone()));
    pipeline.add_stage(UpliftStage::new(tectonic));
    pipeline.add_stage(ReliefStage::default());
    pipeline.add_stage(SeaStage);
    pipeline.add_stage(TemperatureStage::new(climate.clone()));
    pipeline.add_stage(WindStage::new(climate.clone()));
    pipeline.add_stage(PrecipitationStage::new(climate));
    pipeline.add_stage(HydrologyStage::default());
    pipeline.add_stage(BiomeStage::new(BiomeConfig::default()));

    pipeline.run_with_callbacks(&mut world, on_stage_start, on_stage_complete)?;
    Ok(world)
}

/// Plate synthesis stage.
pub struct PlateStage {
    pub config: TectonicConfig,
}

impl PlateStage {
    pub fn new(config: TectonicConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for PlateStage {
    fn id(&self) -> StageId {
        StageId::Plates
    }

    fn name(&self) -> &str {
        "Plate Synthesis"
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        let grid = world.grid;
        let params = &world.params;

        let mut seed_rng = stage_rng(params.seed, StageTag::PlateSeeds);
        let seeds = sample_plate_seeds(&grid, params.plates, &mut seed_rng);

        let mut motion_rng = stage_rng(params.seed, StageTag::PlateMotion);
        let plates = build_plates(
            &seeds,
            params.water_frac,
            self.config.velocity_randomness,
            &mut motion_rng,
        );

        // Noise-modulated growth cost gives boundaries their undulation.
        let noise = generate_noise_plane(
            grid.width,
            grid.height,
            &FractalNoiseConfig {
                octaves: 3,
                frequency: self.config.boundary_noise_frequency / params.scale,
                lacunarity: 2.0,
                persistence: 0.5,
                seed: stage_noise_seed(params.seed, StageTag::PartitionNoise),
            },
        );
        let step_cost: Vec<f32> = noise
            .iter()
            .map(|&v| 1.0 + self.config.boundary_noise_amplitude * 0.5 * (v + 1.0))
            .collect();

        let plate_ids = assign_plates(&grid, &seeds, &step_cost);

        world.plates = Some(plates);
        world.plate_ids = Some(plate_ids);
        Ok(())
    }
}

/// Tectonic uplift stage.
pub struct UpliftStage {
    pub config: TectonicConfig,
}

impl UpliftStage {
    pub fn new(config: TectonicConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for UpliftStage {
    fn id(&self) -> StageId {
        StageId::Uplift
    }

    fn name(&self) -> &str {
        "Tectonic Uplift"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Plates]
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        let grid = world.grid;
        let params = &world.params;

        let base = {
            let plates = World::require(&world.plates, "plates")?;
            let plate_ids = World::require(&world.plate_ids, "plate_ids")?;

            let sites =
                detect_boundaries(&grid, plate_ids, plates, self.config.convergence_threshold);

            let relief_noise = generate_noise_plane(
                grid.width,
                grid.height,
                &FractalNoiseConfig {
                    octaves: 4,
                    frequency: 0.015 / params.scale,
                    lacunarity: 2.0,
                    persistence: 0.5,
                    seed: stage_noise_seed(params.seed, StageTag::ShearNoise),
                },
            );

            let mut bias_rng = stage_rng(params.seed, StageTag::PlateBias);
            compute_base_elevation(
                &grid,
                plate_ids,
                plates,
                &sites,
                &relief_noise,
                &self.config,
                params.scale,
                &mut bias_rng,
            )?
        };

        world.base_elevation = Some(base);
        Ok(())
    }
}

/// Detail noise, droplet erosion, and smoothing.
pub struct ReliefStage {
    /// Amplitude of the fractal detail noise (m).
    pub detail_amplitude_m: f32,
    pub erosion: ErosionConfig,
    /// Diffusion rounds after erosion.
    pub smoothing_rounds: u32,
    /// Diffusion blend per round.
    pub smoothing_blend: f32,
}

impl Default for ReliefStage {
    fn default() -> Self {
        Self {
            detail_amplitude_m: 180.0,
            erosion: ErosionConfig::default(),
            smoothing_rounds: 2,
            smoothing_blend: 0.35,
        }
    }
}

impl GenerationStage for ReliefStage {
    fn id(&self) -> StageId {
        StageId::Relief
    }

    fn name(&self) -> &str {
        "Relief & Erosion"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Uplift]
    }

    fn execute(&self, world: &mut World, cancel: &CancelToken) -> Result<(), WorldGenError> {
        let grid = world.grid;
        let params = &world.params;

        let mut elevation = {
            let base = World::require(&world.base_elevation, "base_elevation")?;
            let detail = generate_noise_plane(
                grid.width,
                grid.height,
                &FractalNoiseConfig {
                    octaves: 6,
                    frequency: 0.02 / params.scale,
                    lacunarity: 2.0,
                    persistence: 0.5,
                    seed: stage_noise_seed(params.seed, StageTag::DetailNoise),
                },
            );
            let noisy = add_detail_noise(base, &detail, self.detail_amplitude_m);

            let mut erosion_rng = stage_rng(params.seed, StageTag::Erosion);
            erode(&grid, &noisy, &self.erosion, &mut erosion_rng, cancel)?
        };

        smooth(&grid, &mut elevation, self.smoothing_rounds, self.smoothing_blend);

        world.elevation = Some(elevation);
        Ok(())
    }
}

/// Sea level selection and ocean mask.
pub struct SeaStage;

impl GenerationStage for SeaStage {
    fn id(&self) -> StageId {
        StageId::Sea
    }

    fn name(&self) -> &str {
        "Sea Level"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Relief]
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        let (sea_level, ocean) = {
            let elevation = World::require(&world.elevation, "elevation")?;
            let sea_level = find_sea_level(elevation, world.params.water_frac);
            verify_water_fraction(elevation, sea_level, world.params.water_frac)?;
            let ocean = flood_ocean_mask(&world.grid, elevation, sea_level);
            (sea_level, ocean)
        };

        world.sea_level = Some(sea_level);
        world.ocean_mask = Some(ocean);
        Ok(())
    }
}

/// Temperature stage.
pub struct TemperatureStage {
    pub config: ClimateConfig,
}

impl TemperatureStage {
    pub fn new(config: ClimateConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for TemperatureStage {
    fn id(&self) -> StageId {
        StageId::Temperature
    }

    fn name(&self) -> &str {
        "Temperature"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Sea]
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        let temperature = {
            let elevation = World::require(&world.elevation, "elevation")?;
            let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
            let sea_level = *World::require(&world.sea_level, "sea_level")?;
            temperature_field(&world.grid, elevation, ocean, sea_level, &self.config)
        };

        world.temperature = Some(temperature);
        Ok(())
    }
}

/// Prevailing wind stage.
pub struct WindStage {
    pub config: ClimateConfig,
}

impl WindStage {
    pub fn new(config: ClimateConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for WindStage {
    fn id(&self) -> StageId {
        StageId::Winds
    }

    fn name(&self) -> &str {
        "Prevailing Winds"
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        world.winds = Some(wind_field(&world.grid, &self.config));
        Ok(())
    }
}

/// Orographic precipitation stage.
pub struct PrecipitationStage {
    pub config: ClimateConfig,
}

impl PrecipitationStage {
    pub fn new(config: ClimateConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for PrecipitationStage {
    fn id(&self) -> StageId {
        StageId::Precipitation
    }

    fn name(&self) -> &str {
        "Orographic Precipitation"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Temperature, StageId::Winds]
    }

    fn execute(&self, world: &mut World, cancel: &CancelToken) -> Result<(), WorldGenError> {
        let rainfall = {
            let elevation = World::require(&world.elevation, "elevation")?;
            let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
            let temperature = World::require(&world.temperature, "temperature")?;
            let sea_level = *World::require(&world.sea_level, "sea_level")?;
            let bands = wind_bands(&world.grid);
            rainfall_field(
                &world.grid,
                elevation,
                ocean,
                temperature,
                sea_level,
                &bands,
                &self.config,
                world.params.rain_intensity,
                cancel,
            )?
        };

        world.rainfall = Some(rainfall);
        Ok(())
    }
}

/// Hydrology stage: fill, route, accumulate, extract rivers.
pub struct HydrologyStage {
    /// Strict-descent increment for the priority flood (m).
    pub epsilon: f32,
}

impl Default for HydrologyStage {
    fn default() -> Self {
        Self { epsilon: 1e-3 }
    }
}

impl GenerationStage for HydrologyStage {
    fn id(&self) -> StageId {
        StageId::Hydrology
    }

    fn name(&self) -> &str {
        "Hydrology"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Sea, StageId::Precipitation]
    }

    fn execute(&self, world: &mut World, cancel: &CancelToken) -> Result<(), WorldGenError> {
        let grid = world.grid;

        let (flood, dirs, accum, threshold, rivers) = {
            let elevation = World::require(&world.elevation, "elevation")?;
            let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
            let rainfall = World::require(&world.rainfall, "rainfall")?;

            let flood = priority_flood_fill(&grid, elevation, ocean, self.epsilon, cancel)?;
            let dirs = flow_directions(&grid, &flood.hydro_elevation, ocean, &flood.parents);
            let accum = flow_accumulation(&grid, &flood.hydro_elevation, &dirs, rainfall);
            let threshold = river_threshold(&accum, ocean, world.params.river_percentile);
            let rivers = river_mask(&accum, ocean, threshold);
            (flood, dirs, accum, threshold, rivers)
        };

        world.hydro_elevation = Some(flood.hydro_elevation);
        world.lake_mask = Some(flood.lake_mask);
        world.flow_dirs = Some(dirs);
        world.flow_accum = Some(accum);
        world.river_threshold = Some(threshold);
        world.river_mask = Some(rivers);
        Ok(())
    }
}

/// Biome classification stage.
pub struct BiomeStage {
    pub config: BiomeConfig,
}

impl BiomeStage {
    pub fn new(config: BiomeConfig) -> Self {
        Self { config }
    }
}

impl GenerationStage for BiomeStage {
    fn id(&self) -> StageId {
        StageId::Biomes
    }

    fn name(&self) -> &str {
        "Biome Assignment"
    }

    fn dependencies(&self) -> &[StageId] {
        &[StageId::Temperature, StageId::Precipitation, StageId::Hydrology]
    }

    fn execute(&self, world: &mut World, _cancel: &CancelToken) -> Result<(), WorldGenError> {
        let biomes = {
            let elevation = World::require(&world.elevation, "elevation")?;
            let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
            let temperature = World::require(&world.temperature, "temperature")?;
            let rainfall = World::require(&world.rainfall, "rainfall")?;
            let rivers = World::require(&world.river_mask, "river_mask")?;
            let sea_level = *World::require(&world.sea_level, "sea_level")?;
            compute_biomes(
                &world.grid,
                elevation,
                sea_level,
                ocean,
                temperature,
                rainfall,
                rivers,
                &self.config,
            )
        };

        world.biomes = Some(biomes);
        Ok(())
    }
}
