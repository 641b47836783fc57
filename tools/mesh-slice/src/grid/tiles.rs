//! Texture tile to cube range mapping
//!
//! A texture tile covers a block of cube columns in X and Y and the whole
//! grid in Z: one atlas serves everything stacked above its footprint.

use super::{CubeCoord, GridSize, TileCoord, TileGridSize};
use crate::options::ConfigError;

#[derive(Clone, Copy, Debug)]
pub struct TileMapper {
    grid: GridSize,
    tiles: TileGridSize,
    x_ratio: u32,
    y_ratio: u32,
}

impl TileMapper {
    pub fn new(grid: GridSize, tiles: TileGridSize) -> Result<Self, ConfigError> {
        if grid.is_empty() {
            return Err(ConfigError::EmptyGrid(grid));
        }
        if tiles.x == 0 || tiles.y == 0 {
            return Err(ConfigError::EmptyTileGrid(tiles));
        }
        if tiles.x > grid.x || tiles.y > grid.y {
            return Err(ConfigError::TileGridTooLarge { tiles, grid });
        }

        Ok(Self {
            grid,
            tiles,
            x_ratio: grid.x / tiles.x,
            y_ratio: grid.y / tiles.y,
        })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn tile_grid(&self) -> TileGridSize {
        self.tiles
    }

    /// Cubes owned by `tile`, `x` outer and `z` inner
    pub fn cubes_for_tile(&self, tile: TileCoord) -> impl Iterator<Item = CubeCoord> {
        let xs = tile.x * self.x_ratio..(tile.x + 1) * self.x_ratio;
        let ys = tile.y * self.y_ratio..(tile.y + 1) * self.y_ratio;
        let depth = self.grid.z;

        xs.flat_map(move |x| {
            ys.clone()
                .flat_map(move |y| (0..depth).map(move |z| CubeCoord::new(x, y, z)))
        })
    }

    /// Tile whose range holds cube column (x, y).
    ///
    /// Columns past the last full tile map to a tile index beyond the grid.
    pub fn tile_for_cube(&self, x: u32, y: u32) -> TileCoord {
        TileCoord::new(x / self.x_ratio, y / self.y_ratio)
    }

    /// Cubes that no tile owns because the tile grid does not divide the cube grid
    pub fn uncovered_cubes(&self) -> usize {
        let covered = (self.tiles.x * self.x_ratio) as usize
            * (self.tiles.y * self.y_ratio) as usize
            * self.grid.z as usize;
        self.grid.cube_count() - covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_division_covers_every_cube_once() {
        let grid = GridSize::new(4, 6, 3);
        let mapper = TileMapper::new(grid, TileGridSize::new(2, 3)).unwrap();

        let mut owners = vec![0; grid.cube_count()];
        for tile in mapper.tile_grid().tiles() {
            for cube in mapper.cubes_for_tile(tile) {
                owners[grid.linear_index(cube)] += 1;
                assert_eq!(mapper.tile_for_cube(cube.x, cube.y), tile);
            }
        }

        assert!(owners.iter().all(|&n| n == 1));
        assert_eq!(mapper.uncovered_cubes(), 0);
    }

    #[test]
    fn test_tile_spans_full_depth() {
        let mapper = TileMapper::new(GridSize::new(2, 2, 5), TileGridSize::new(2, 2)).unwrap();
        let cubes: Vec<_> = mapper.cubes_for_tile(TileCoord::new(1, 0)).collect();

        assert_eq!(cubes.len(), 5);
        assert!(cubes.iter().all(|c| c.x == 1 && c.y == 0));
        assert_eq!(cubes.last(), Some(&CubeCoord::new(1, 0, 4)));
    }

    #[test]
    fn test_trailing_cubes_are_uncovered() {
        // 5 / 2 = 2 columns per tile, column 4 belongs to no tile
        let grid = GridSize::new(5, 2, 1);
        let mapper = TileMapper::new(grid, TileGridSize::new(2, 1)).unwrap();

        let covered: Vec<_> = mapper
            .tile_grid()
            .tiles()
            .flat_map(|t| mapper.cubes_for_tile(t))
            .collect();

        assert_eq!(covered.len(), 8);
        assert!(covered.iter().all(|c| c.x < 4));
        assert_eq!(mapper.uncovered_cubes(), 2);
        assert_eq!(mapper.tile_for_cube(4, 0), TileCoord::new(2, 0));
    }

    #[test]
    fn test_invalid_tile_grids() {
        let grid = GridSize::new(2, 2, 2);
        assert!(matches!(
            TileMapper::new(grid, TileGridSize::new(3, 1)),
            Err(ConfigError::TileGridTooLarge { .. })
        ));
        assert!(matches!(
            TileMapper::new(grid, TileGridSize::new(0, 1)),
            Err(ConfigError::EmptyTileGrid(_))
        ));
    }
}
