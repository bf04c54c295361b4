//! Procedural fictional-world generator.
//!
//! Simulates the geophysical processes that shape real terrain on a flat
//! rectangular grid: plate tectonics, hydraulic erosion, atmospheric
//! circulation with rain shadows, drainage networks, and biome
//! assignment. It renders a color PNG and writes a structured IR dump.

pub mod biomes;
pub mod climate;
pub mod error;
pub mod export;
pub mod grid;
pub mod hydrology;
pub mod noise;
pub mod pipeline;
pub mod rng;
pub mod tectonics;
pub mod terrain;
pub mod world;

pub use error::WorldGenError;
pub use grid::Grid;
pub use pipeline::{generate, generate_with_progress, GenerationStage, Pipeline, StageId};
pub use world::{CancelToken, World, WorldParams};
