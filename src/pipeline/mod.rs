//! Pipeline module for orchestrating world generation stages.
//!
//! Provides a trait-based architecture for modular generation stages
//! that can be composed into a complete generation pipeline, plus the
//! post-stage invariant checks.

mod checks;
mod stage;

pub use stage::{
    generate, generate_with_progress, BiomeStage, GenerationStage, HydrologyStage, Pipeline,
    PlateStage, PrecipitationStage, ReliefStage, SeaStage, StageId, TemperatureStage, UpliftStage,
    WindStage,
};
