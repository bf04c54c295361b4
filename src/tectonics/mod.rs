//! Tectonic plate simulation.
//!
//! This module implements the first two pipeline stages:
//! - plate synthesis: Poisson-disk seed placement and a contiguous,
//!   noise-undulated partition of the grid into plates with motion vectors
//! - tectonic uplift: boundary classification (convergent / divergent /
//!   transform) and distance-decay deposition into a base elevation field

mod config;
mod partition;
mod plate;
pub mod boundary;
pub mod uplift;

pub use boundary::{classify_pair, detect_boundaries, BoundaryClass, BoundarySite};
pub use config::TectonicConfig;
pub use partition::assign_plates;
pub use plate::{build_plates, sample_plate_seeds, Plate, PlateKind};
pub use uplift::compute_base_elevation;
