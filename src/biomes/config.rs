//! Biome classification thresholds.

use serde::{Deserialize, Serialize};

/// Configuration for biome classification.
///
/// Temperatures are °C; rainfall thresholds are in the climate stage's
/// relative rainfall units; elevations are meters above sea level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeConfig {
    /// Hot climates start here.
    pub hot_temp_c: f32,
    /// Temperate climates start here.
    pub temperate_temp_c: f32,
    /// Below this the world is frozen.
    pub frozen_temp_c: f32,

    /// Low/medium rainfall boundary.
    pub rain_low: f32,
    /// Medium/high rainfall boundary.
    pub rain_high: f32,

    /// Alpine override above this rise over sea level.
    pub alpine_rise_m: f32,
    /// Permanent snow above this rise.
    pub snow_rise_m: f32,

    /// Ocean deeper than this below sea level renders as deep water.
    pub shallow_depth_m: f32,

    /// Beaches: warm coastal land no higher than this above sea level.
    pub beach_rise_m: f32,
    /// Beaches need at least this temperature.
    pub beach_min_temp_c: f32,

    /// Majority-vote smoothing passes applied to remove speckle.
    pub smoothing_passes: u32,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            hot_temp_c: 18.0,
            temperate_temp_c: 5.0,
            frozen_temp_c: -10.0,

            rain_low: 0.8,
            rain_high: 2.2,

            alpine_rise_m: 2500.0,
            snow_rise_m: 3800.0,

            shallow_depth_m: 300.0,

            beach_rise_m: 30.0,
            beach_min_temp_c: 5.0,

            smoothing_passes: 1,
        }
    }
}
