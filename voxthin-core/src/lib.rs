//! Core data structures for voxthin
//!
//! This crate provides the storage substrate for topology-preserving voxel
//! thinning: a bounds-checked dense 3D grid and a cubical complex that tracks
//! which topological elements (cube interiors, faces, edges) are present at
//! each cell.

pub mod complex;
pub mod error;
pub mod grid;

pub use complex::*;
pub use error::*;
pub use grid::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::Vector3;

/// Signed cell coordinates
pub type Vec3i = Vector3<i32>;
/// Unsigned grid dimensions
pub type Vec3u = Vector3<u32>;
