//! Terrain shaping after tectonics: detail noise, hydraulic erosion,
//! smoothing, and the sea level / ocean mask stage.

mod erosion;
mod relief;
mod sea;

pub use erosion::{erode, ErosionConfig};
pub use relief::{add_detail_noise, smooth};
pub use sea::{find_sea_level, flood_ocean_mask, verify_water_fraction};
