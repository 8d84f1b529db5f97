//! Topology-preserving directional thinning of cubical complexes
//!
//! This crate reduces a solid voxel object, represented as a cubical complex
//! from `voxthin-core`, to a curve/surface skeleton while preserving its
//! homotopy type. Collapse proceeds in rounds of six directional passes over
//! an incrementally maintained border frontier, optionally guarded by a
//! constraint complex and by distance/opening maps that pin medial-axis
//! edges. A parallel mode fans each pass out over an explicit rayon pool and
//! produces bit-identical results to the sequential mode.

pub mod direction;
pub mod free_pair;
pub mod frontier;
pub mod process;

pub use direction::*;
pub use free_pair::{rule, PairRule};
pub use frontier::*;
pub use process::*;
