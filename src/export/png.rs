//! Color PNG rendering: biome palette, hillshade, river overlay.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageBuffer, ImageEncoder, Rgb, RgbImage};

use crate::biomes::BiomeId;
use crate::error::WorldGenError;
use crate::world::World;

const RIVER_COLOR: [u8; 3] = [30, 90, 190];
const LAKE_COLOR: [u8; 3] = [40, 110, 180];

/// Hillshade light direction (from the northwest) and strength.
const SHADE_STRENGTH: f32 = 0.0016;
const SHADE_MIN: f32 = 0.62;
const SHADE_MAX: f32 = 1.35;

/// Renders the finished world into an RGB image, one pixel per cell.
///
/// Land pixels take the biome palette color shaded by the elevation
/// gradient; ocean darkens with depth; rivers and lakes overlay in blue.
/// Purely a function of the world, so identical worlds render identical
/// images.
pub fn render_to_image(world: &World) -> Result<RgbImage, WorldGenError> {
    let grid = &world.grid;
    let elevation = World::require(&world.elevation, "elevation")?;
    let ocean = World::require(&world.ocean_mask, "ocean_mask")?;
    let biomes = World::require(&world.biomes, "biomes")?;
    let rivers = World::require(&world.river_mask, "river_mask")?;
    let lakes = World::require(&world.lake_mask, "lake_mask")?;
    let sea_level = *World::require(&world.sea_level, "sea_level")?;

    let mut img: RgbImage = ImageBuffer::new(grid.width, grid.height);

    for y in 0..grid.height {
        for x in 0..grid.width {
            let idx = grid.index(x, y);

            let color = if rivers[idx] {
                RIVER_COLOR
            } else if lakes[idx] {
                LAKE_COLOR
            } else {
                let biome = BiomeId::from_u8(biomes[idx]).ok_or_else(|| {
                    WorldGenError::Invariant(format!("cell {idx} carries invalid biome id"))
                })?;
                let base = biome.color();
                if ocean[idx] {
                    depth_shade(base, sea_level - elevation[idx])
                } else {
                    hillshade(grid, elevation, x, y, base)
                }
            };

            img.put_pixel(x, y, Rgb(color));
        }
    }

    Ok(img)
}

/// Lambert-style shading from the elevation gradient; slopes facing the
/// northwest light brighten, opposite slopes darken.
fn hillshade(
    grid: &crate::grid::Grid,
    elevation: &[f32],
    x: u32,
    y: u32,
    base: [u8; 3],
) -> [u8; 3] {
    let sample = |sx: i64, sy: i64| -> f32 {
        let cx = sx.clamp(0, grid.width as i64 - 1) as u32;
        let cy = sy.clamp(0, grid.height as i64 - 1) as u32;
        elevation[grid.index(cx, cy)]
    };

    let gx = (sample(x as i64 + 1, y as i64) - sample(x as i64 - 1, y as i64)) * 0.5;
    let gy = (sample(x as i64, y as i64 + 1) - sample(x as i64, y as i64 - 1)) * 0.5;

    // Light from the northwest: slopes rising toward it face the light.
    let shade = (1.0 + (-gx - gy) * SHADE_STRENGTH).clamp(SHADE_MIN, SHADE_MAX);
    scale_color(base, shade)
}

/// Ocean color darkens toward the abyss.
fn depth_shade(base: [u8; 3], depth: f32) -> [u8; 3] {
    let t = (depth / 4000.0).clamp(0.0, 1.0);
    scale_color(base, 1.0 - 0.45 * t)
}

fn scale_color(color: [u8; 3], factor: f32) -> [u8; 3] {
    [
        (color[0] as f32 * factor).clamp(0.0, 255.0) as u8,
        (color[1] as f32 * factor).clamp(0.0, 255.0) as u8,
        (color[2] as f32 * factor).clamp(0.0, 255.0) as u8,
    ]
}

/// Encodes the rendered world to an 8-bit RGB PNG at `path`.
///
/// A partially written file is removed if encoding fails.
pub fn write_png(world: &World, path: &Path) -> Result<(), WorldGenError> {
    let img = render_to_image(world)?;

    let io_err = |source: std::io::Error| WorldGenError::Io {
        path: path.to_path_buf(),
        source,
    };

    let result = (|| -> Result<(), WorldGenError> {
        let file = File::create(path).map_err(io_err)?;
        let writer = BufWriter::new(file);
        let encoder =
            PngEncoder::new_with_quality(writer, CompressionType::Default, FilterType::Adaptive);
        encoder
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| WorldGenError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generate;
    use crate::world::{CancelToken, WorldParams};

    fn tiny_world() -> World {
        let params = WorldParams {
            width: 48,
            height: 40,
            seed: 5,
            plates: 5,
            ..Default::default()
        };
        generate(params, &CancelToken::new()).unwrap()
    }

    #[test]
    fn image_matches_grid_dimensions() {
        let world = tiny_world();
        let img = render_to_image(&world).unwrap();
        assert_eq!(img.width(), 48);
        assert_eq!(img.height(), 40);
    }

    #[test]
    fn rendering_is_deterministic() {
        let world = tiny_world();
        let a = render_to_image(&world).unwrap();
        let b = render_to_image(&world).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn river_cells_render_blue() {
        let world = tiny_world();
        let img = render_to_image(&world).unwrap();
        let rivers = world.river_mask.as_ref().unwrap();
        for (idx, &river) in rivers.iter().enumerate() {
            if river {
                let (x, y) = world.grid.coords(idx);
                assert_eq!(img.get_pixel(x, y).0, RIVER_COLOR);
            }
        }
    }

    #[test]
    fn deep_ocean_is_darker_than_shallow() {
        let shallow = depth_shade([24, 86, 150], 50.0);
        let deep = depth_shade([24, 86, 150], 3900.0);
        assert!(deep[2] < shallow[2]);
    }
}
