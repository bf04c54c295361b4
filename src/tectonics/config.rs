//! Configuration for tectonic simulation.

use serde::{Deserialize, Serialize};

/// Configuration parameters for plate synthesis and uplift.
///
/// Elevations are meters; velocities are unit-ish (plate speeds near 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TectonicConfig {
    /// Convergence threshold separating convergent/divergent from
    /// transform motion (projected relative velocity).
    pub convergence_threshold: f32,

    /// Random variation in plate speeds around 1.0 (0.0-1.0).
    pub velocity_randomness: f32,

    /// Amplitude of the partition cost noise; higher values make plate
    /// boundaries undulate more.
    pub boundary_noise_amplitude: f32,
    /// Frequency of the partition cost noise (per cell).
    pub boundary_noise_frequency: f32,

    /// Peak uplift of a continental collision range (m, per unit closing rate).
    pub collision_uplift_m: f32,
    /// Peak uplift of a subduction volcanic arc (m, per unit closing rate).
    pub arc_uplift_m: f32,
    /// Peak depth of an offshore trench (m, positive number, per unit rate).
    pub trench_depth_m: f32,
    /// Peak uplift of an oceanic island arc (m, per unit rate).
    pub island_arc_uplift_m: f32,
    /// Depth of a rift trough (m, positive number, per unit opening rate).
    pub rift_depth_m: f32,
    /// Height of the mild shoulders flanking a rift (m).
    pub rift_shoulder_m: f32,
    /// Amplitude of shear noise along transform boundaries (m).
    pub transform_shear_m: f32,

    /// Mean plateau offset of continental plates (m).
    pub continental_bias_m: f32,
    /// Mean floor offset of oceanic plates (m, negative).
    pub oceanic_bias_m: f32,
    /// Per-plate random variation applied to the bias (m).
    pub bias_jitter_m: f32,

    /// Rounds of 4-neighbor diffusion applied to the per-plate bias so
    /// continental shelves slope instead of stepping.
    pub bias_smoothing_rounds: u32,
}

impl Default for TectonicConfig {
    fn default() -> Self {
        Self {
            convergence_threshold: 0.1,
            velocity_randomness: 0.3,

            boundary_noise_amplitude: 2.5,
            boundary_noise_frequency: 0.04,

            collision_uplift_m: 3200.0,
            arc_uplift_m: 2100.0,
            trench_depth_m: 2600.0,
            island_arc_uplift_m: 3400.0,
            rift_depth_m: 1400.0,
            rift_shoulder_m: 350.0,
            transform_shear_m: 160.0,

            continental_bias_m: 400.0,
            oceanic_bias_m: -3600.0,
            bias_jitter_m: 250.0,

            bias_smoothing_rounds: 10,
        }
    }
}
