//! mesh-slice library
//!
//! Splits a textured OBJ mesh into a grid of cube fragments, repacks the
//! texture per tile of that grid, and records which cubes hold geometry.

pub mod geometry;
pub mod grid;
pub mod image_tile;
pub mod manifest;
pub mod options;
pub mod slice;
pub mod texture;

// Re-export the types most callers need
pub use geometry::{Extent, Face, Mesh, TextureVertex, Vertex};
pub use grid::{CubeCoord, GridSize, TileCoord, TileGridSize, TileMapper};
pub use manifest::{CubeManifest, ManifestRecord};
pub use options::{ConfigError, SliceOptions};
pub use slice::{slice_obj, CubeSlicer, SliceReport};
