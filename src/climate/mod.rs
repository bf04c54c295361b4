//! Climate simulation: temperature, prevailing winds, and orographic
//! precipitation with rain shadows.

mod config;
mod moisture;
mod temperature;
mod wind;

pub use config::ClimateConfig;
pub use moisture::rainfall_field;
pub use temperature::temperature_field;
pub use wind::{wind_bands, wind_field, WindBand};
