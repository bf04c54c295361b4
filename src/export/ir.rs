//! Structured IR dump: every per-cell field plus the plate table.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::tectonics::PlateKind;
use crate::world::{World, WorldParams};

/// Format version written into every dump.
pub const IR_VERSION: u32 = 1;

/// One plate table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrPlate {
    pub id: u16,
    pub vel_x: f32,
    pub vel_y: f32,
    pub kind: PlateKind,
}

/// Per-cell arrays, row-major from the top-left cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrCells {
    pub elevation: Vec<f32>,
    pub temperature: Vec<f32>,
    pub rainfall: Vec<f32>,
    pub plate_id: Vec<u16>,
    pub biome: Vec<u8>,
    pub flow_accum: Vec<f32>,
    /// 0/1 per cell.
    pub river: Vec<u8>,
}

/// The intermediate-representation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrDocument {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub params: WorldParams,
    pub plates: Vec<IrPlate>,
    pub sea_level: f32,
    pub cells: IrCells,
}

/// Three-decimal rounding so the dump is byte-stable across runs.
fn fixed(v: f32) -> f32 {
    (v * 1000.0).round() / 1000.0
}

/// Assembles the IR document from a finished world.
pub fn build_ir_document(world: &World) -> Result<IrDocument, WorldGenError> {
    let plates = World::require(&world.plates, "plates")?;
    let plate_ids = World::require(&world.plate_ids, "plate_ids")?;
    let elevation = World::require(&world.elevation, "elevation")?;
    let temperature = World::require(&world.temperature, "temperature")?;
    let rainfall = World::require(&world.rainfall, "rainfall")?;
    let flow_accum = World::require(&world.flow_accum, "flow_accum")?;
    let river_mask = World::require(&world.river_mask, "river_mask")?;
    let biomes = World::require(&world.biomes, "biomes")?;
    let sea_level = *World::require(&world.sea_level, "sea_level")?;

    Ok(IrDocument {
        version: IR_VERSION,
        width: world.grid.width,
        height: world.grid.height,
        params: world.params.clone(),
        plates: plates
            .iter()
            .map(|p| IrPlate {
                id: p.id,
                vel_x: fixed(p.velocity.x),
                vel_y: fixed(p.velocity.y),
                kind: p.kind,
            })
            .collect(),
        sea_level: fixed(sea_level),
        cells: IrCells {
            elevation: elevation.iter().map(|&v| fixed(v)).collect(),
            temperature: temperature.iter().map(|&v| fixed(v)).collect(),
            rainfall: rainfall.iter().map(|&v| fixed(v)).collect(),
            plate_id: plate_ids.clone(),
            biome: biomes.clone(),
            flow_accum: flow_accum.iter().map(|&v| fixed(v)).collect(),
            river: river_mask.iter().map(|&r| u8::from(r)).collect(),
        },
    })
}

/// Writes the IR document as JSON. A partial file is removed on failure.
pub fn write_ir(world: &World, path: &Path) -> Result<(), WorldGenError> {
    let doc = build_ir_document(world)?;

    let io_err = |source: std::io::Error| WorldGenError::Io {
        path: path.to_path_buf(),
        source,
    };

    let result = (|| -> Result<(), WorldGenError> {
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &doc).map_err(|e| WorldGenError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e),
        })?;
        writer.flush().map_err(io_err)
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
            width: 40,
            height: 32,
            seed: 3,
            plates: 4,
            ..Default::default()
        };
        generate(params, &CancelToken::new()).unwrap()
    }

    #[test]
    fn document_has_full_length_arrays() {
        let world = tiny_world();
        let doc = build_ir_document(&world).unwrap();
        let n = 40 * 32;
        assert_eq!(doc.version, IR_VERSION);
        assert_eq!(doc.cells.elevation.len(), n);
        assert_eq!(doc.cells.temperature.len(), n);
        assert_eq!(doc.cells.rainfall.len(), n);
        assert_eq!(doc.cells.plate_id.len(), n);
        assert_eq!(doc.cells.biome.len(), n);
        assert_eq!(doc.cells.flow_accum.len(), n);
        assert_eq!(doc.cells.river.len(), n);
        assert_eq!(doc.plates.len(), 4);
    }

    #[test]
    fn serialization_is_byte_stable() {
        let world = tiny_world();
        let a = serde_json::to_string(&build_ir_document(&world).unwrap()).unwrap();
        let b = serde_json::to_string(&build_ir_document(&world).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn document_round_trips_through_json() {
        let world = tiny_world();
        let doc = build_ir_document(&world).unwrap();
        let text = serde_json::to_string(&doc).unwrap();
        let back: IrDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back.width, doc.width);
        assert_eq!(back.cells.biome, doc.cells.biome);
        assert_eq!(back.sea_level, doc.sea_level);
    }

    #[test]
    fn river_bits_are_zero_or_one() {
        let world = tiny_world();
        let doc = build_ir_document(&world).unwrap();
        assert!(doc.cells.river.iter().all(|&b| b <= 1));
    }
}
