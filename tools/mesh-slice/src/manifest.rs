//! Slice manifest (`metadata.json`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::geometry::Extent;
use crate::grid::{CubeCoord, GridSize, TileGridSize};

/// Manifest under construction.
///
/// Tiles own disjoint cube ranges, so workers mark cells concurrently
/// through `&self`.
#[derive(Debug)]
pub struct CubeManifest {
    grid: GridSize,
    world_bounds: Extent,
    virtual_bounds: Extent,
    vertex_count: usize,
    texture_set_size: TileGridSize,
    exists: Vec<AtomicBool>,
}

impl CubeManifest {
    pub fn new(
        grid: GridSize,
        world_bounds: Extent,
        virtual_bounds: Extent,
        vertex_count: usize,
        texture_set_size: TileGridSize,
    ) -> Self {
        Self {
            grid,
            world_bounds,
            virtual_bounds,
            vertex_count,
            texture_set_size,
            exists: (0..grid.cube_count()).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Record whether a cube received geometry
    pub fn mark(&self, cube: CubeCoord, exists: bool) {
        self.exists[self.grid.linear_index(cube)].store(exists, Ordering::Relaxed);
    }

    pub fn exists(&self, cube: CubeCoord) -> bool {
        self.exists[self.grid.linear_index(cube)].load(Ordering::Relaxed)
    }

    pub fn occupied_count(&self) -> usize {
        self.exists
            .iter()
            .filter(|cell| cell.load(Ordering::Relaxed))
            .count()
    }

    /// Snapshot as the serialized record
    pub fn to_record(&self) -> ManifestRecord {
        let cube_exists = (0..self.grid.x)
            .map(|x| {
                (0..self.grid.y)
                    .map(|y| {
                        (0..self.grid.z)
                            .map(|z| self.exists(CubeCoord::new(x, y, z)))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        ManifestRecord {
            world_bounds: self.world_bounds,
            virtual_world_bounds: self.virtual_bounds,
            vertex_count: self.vertex_count,
            texture_set_size: self.texture_set_size,
            cube_exists,
        }
    }

    /// Serialize to `path`, replacing any previous manifest
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_record())
            .context("Failed to serialize manifest")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write manifest: {:?}", path))?;

        tracing::info!(
            "Wrote manifest {:?} ({} of {} cubes occupied)",
            path,
            self.occupied_count(),
            self.grid.cube_count()
        );
        Ok(())
    }
}

/// Serialized manifest
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestRecord {
    pub world_bounds: Extent,
    pub virtual_world_bounds: Extent,
    pub vertex_count: usize,
    pub texture_set_size: TileGridSize,
    /// Indexed `[x][y][z]`
    pub cube_exists: Vec<Vec<Vec<bool>>>,
}

impl ManifestRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {:?}", path))?;
        serde_json::from_str(&json).with_context(|| format!("Failed to parse manifest: {:?}", path))
    }
}
