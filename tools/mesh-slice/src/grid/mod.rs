//! Cube grid and texture tile grid

pub mod partition;
pub mod tiles;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use partition::{FaceAssignment, FaceLookup, FirstVertex, PartitionError};
pub use tiles::TileMapper;

/// Cell of the cube grid, 0-based
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeCoord {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Fragment file stem, `{x}_{y}_{z}`
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.x, self.y, self.z)
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Cell of the texture tile grid, 0-based
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Atlas file stem, `{x}_{y}`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.x, self.y)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cube counts along each axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridSize {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Same count on every axis, the largest of the three
    pub fn cubical(self) -> Self {
        let side = self.x.max(self.y).max(self.z);
        Self::new(side, side, side)
    }

    pub fn as_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_empty(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    pub fn cube_count(self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    pub fn contains(self, cube: CubeCoord) -> bool {
        cube.x < self.x && cube.y < self.y && cube.z < self.z
    }

    /// Flat index, `x` slowest and `z` fastest
    pub fn linear_index(self, cube: CubeCoord) -> usize {
        debug_assert!(self.contains(cube));
        (cube.x as usize * self.y as usize + cube.y as usize) * self.z as usize + cube.z as usize
    }

    /// All cubes in `linear_index` order
    pub fn cubes(self) -> impl Iterator<Item = CubeCoord> {
        (0..self.x).flat_map(move |x| {
            (0..self.y).flat_map(move |y| (0..self.z).map(move |z| CubeCoord::new(x, y, z)))
        })
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// Texture tile counts along X and Y.
///
/// Serialized as `{"X": .., "Y": ..}` in the manifest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct TileGridSize {
    pub x: u32,
    pub y: u32,
}

impl TileGridSize {
    pub const ONE: Self = Self::new(1, 1);

    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn tile_count(self) -> usize {
        self.x as usize * self.y as usize
    }

    /// All tiles, `x` outer and `y` inner
    pub fn tiles(self) -> impl Iterator<Item = TileCoord> {
        (0..self.x).flat_map(move |x| (0..self.y).map(move |y| TileCoord::new(x, y)))
    }
}

impl fmt::Display for TileGridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_index_matches_iteration_order() {
        let grid = GridSize::new(3, 2, 4);
        for (i, cube) in grid.cubes().enumerate() {
            assert_eq!(grid.linear_index(cube), i);
        }
        assert_eq!(grid.cubes().count(), grid.cube_count());
    }

    #[test]
    fn test_cubical_grid() {
        assert_eq!(GridSize::new(2, 5, 3).cubical(), GridSize::new(5, 5, 5));
    }

    #[test]
    fn test_tile_order_is_x_outer() {
        let tiles: Vec<_> = TileGridSize::new(2, 2).tiles().collect();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(0, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 0),
                TileCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_tile_grid_serialized_keys() {
        let json = serde_json::to_string(&TileGridSize::new(2, 3)).unwrap();
        assert_eq!(json, r#"{"X":2,"Y":3}"#);
    }
}
