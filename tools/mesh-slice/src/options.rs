//! Slicing configuration

use std::path::PathBuf;

use crate::grid::{GridSize, TileGridSize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cube grid {0} has an empty axis")]
    EmptyGrid(GridSize),

    #[error("texture tile grid {0} has an empty axis")]
    EmptyTileGrid(TileGridSize),

    #[error("texture tile grid {tiles} is larger than the cube grid {grid}")]
    TileGridTooLarge { tiles: TileGridSize, grid: GridSize },

    #[error("texture scale must be a positive number, got {0}")]
    InvalidTextureScale(f32),
}

/// Options for one slicing run
#[derive(Clone, Debug)]
pub struct SliceOptions {
    /// Requested cube counts per axis
    pub grid: GridSize,
    /// Texture tile counts along X and Y
    pub tiles: TileGridSize,
    /// Use the same cube count on every axis and a cubical extent
    pub force_cubical: bool,
    /// Source texture to repack per tile
    pub texture: Option<PathBuf>,
    /// Uniform scale applied to each written atlas
    pub texture_scale: f32,
    /// Write a material file next to each atlas
    pub write_mtl: bool,
    /// Process tiles one at a time, in order
    pub sequential: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            grid: GridSize::new(2, 2, 2),
            tiles: TileGridSize::ONE,
            force_cubical: false,
            texture: None,
            texture_scale: 1.0,
            write_mtl: false,
            sequential: false,
        }
    }
}

impl SliceOptions {
    /// Cube grid after applying `force_cubical`
    pub fn effective_grid(&self) -> GridSize {
        if self.force_cubical {
            self.grid.cubical()
        } else {
            self.grid
        }
    }

    pub fn requires_texture_processing(&self) -> bool {
        self.texture.is_some()
    }

    /// Tile grid used for the run. Without a texture a single tile covers the grid.
    pub fn effective_tiles(&self) -> TileGridSize {
        if self.requires_texture_processing() {
            self.tiles
        } else {
            TileGridSize::ONE
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.effective_grid();
        if grid.is_empty() {
            return Err(ConfigError::EmptyGrid(grid));
        }
        let tiles = self.effective_tiles();
        if tiles.x == 0 || tiles.y == 0 {
            return Err(ConfigError::EmptyTileGrid(tiles));
        }
        if tiles.x > grid.x || tiles.y > grid.y {
            return Err(ConfigError::TileGridTooLarge { tiles, grid });
        }
        if !(self.texture_scale.is_finite() && self.texture_scale > 0.0) {
            return Err(ConfigError::InvalidTextureScale(self.texture_scale));
        }
        Ok(())
    }
}
