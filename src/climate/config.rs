//! Climate configuration parameters.

use serde::{Deserialize, Serialize};

/// Configuration for the climate stages.
///
/// Units:
/// - temperatures: °C
/// - elevation: meters
/// - rainfall and moisture: relative units, exported consistently
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    // Temperature model
    /// Sea-level temperature at the equator row.
    pub equator_temp_c: f32,
    /// Temperature drop from equator to pole (applied to latitude²).
    pub lat_gradient_c: f32,
    /// Cooling per kilometer of land above sea level.
    pub lapse_rate_c_per_km: f32,
    /// Damping of the latitude gradient over open ocean (SST is milder
    /// than land at the same latitude).
    pub sst_lat_damping: f32,

    // Wind model
    /// Rows over which wind vectors blend at latitude-band edges.
    pub band_blend_rows: u32,

    // Moisture model
    /// Moisture picked up per ocean cell at a reference 30 °C sea surface.
    pub ocean_evap_base: f32,
    /// Fraction of carried moisture shed as convective rain over ocean.
    pub ocean_rain_fraction: f32,
    /// Baseline precipitation per land cell (before orographic lift).
    pub base_rain_rate: f32,
    /// Extra precipitation per meter of windward rise.
    pub orographic_gain_per_m: f32,
    /// Moisture retained per land cell after precipitation; values below
    /// one give exponential drying inland.
    pub leak_factor: f32,
    /// Starting moisture factor for streamlines entering from an ocean
    /// edge, relative to equilibrium over open water.
    pub edge_moisture_factor: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        // Tuned for believable worlds rather than strict physical realism.
        Self {
            equator_temp_c: 28.0,
            lat_gradient_c: 45.0,
            lapse_rate_c_per_km: 6.5,
            sst_lat_damping: 0.85,

            band_blend_rows: 3,

            ocean_evap_base: 4.0,
            ocean_rain_fraction: 0.08,
            base_rain_rate: 0.6,
            orographic_gain_per_m: 0.004,
            leak_factor: 0.985,
            edge_moisture_factor: 0.6,
        }
    }
}

impl ClimateConfig {
    /// Ocean evaporation per cell at the given sea-surface temperature.
    ///
    /// Warm water evaporates more; even polar seas contribute a trickle.
    pub fn evap_rate(&self, sst_c: f32) -> f32 {
        self.ocean_evap_base * (0.25 + sst_c / 30.0).clamp(0.05, 2.0)
    }

    /// Condensation multiplier: cold air holds less moisture, so cool
    /// cells rain out a little harder.
    pub fn condensation_factor(&self, temp_c: f32) -> f32 {
        1.0 + (10.0 - temp_c).max(0.0) * 0.01
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warm_ocean_evaporates_more() {
        let cfg = ClimateConfig::default();
        assert!(cfg.evap_rate(28.0) > cfg.evap_rate(5.0));
        assert!(cfg.evap_rate(-30.0) > 0.0, "polar seas still evaporate a little");
    }

    #[test]
    fn cold_air_condenses_harder() {
        let cfg = ClimateConfig::default();
        assert!(cfg.condensation_factor(-10.0) > cfg.condensation_factor(20.0));
        assert!((cfg.condensation_factor(25.0) - 1.0).abs() < 1e-6);
    }
}
