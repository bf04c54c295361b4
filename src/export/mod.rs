//! Export module: color PNG rendering and the structured IR dump.

mod ir;
mod png;

pub use ir::{build_ir_document, write_ir, IrDocument};
pub use png::{render_to_image, write_png};
