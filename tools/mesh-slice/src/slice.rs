//! Slicing orchestration
//!
//! Tiles are independent: each one gathers the faces of its cube range,
//! optionally repacks their texture, and writes one fragment per cube. The
//! manifest is written once every tile has finished.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::geometry::writer::write_fragment_file;
use crate::geometry::{Face, Mesh};
use crate::grid::{TileCoord, TileMapper};
use crate::manifest::CubeManifest;
use crate::options::SliceOptions;
use crate::texture::{
    self, markup, AtlasSettings, PackError, TextureSource, TileTexture, UvRemap,
};

/// Atlas and material directory inside the output directory
pub const TEXTURE_SUBDIRECTORY: &str = "texture";

/// Manifest file name inside the output directory
pub const METADATA_FILE: &str = "metadata.json";

/// Summary of a slicing run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SliceReport {
    pub tiles: usize,
    pub fragments: usize,
    pub atlases: usize,
    /// Tiles whose islands did not fit in an atlas
    pub failed_tiles: Vec<TileCoord>,
}

/// What one tile produced
#[derive(Default)]
struct TileOutcome {
    fragments: usize,
    atlas: bool,
    failed: Option<TileCoord>,
}

/// Kind of debug overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupKind {
    /// Every UV polygon over the whole texture
    Uv,
    /// Pruned island rectangles, one image per tile
    Rects,
}

/// Slices one loaded mesh into an output directory
pub struct CubeSlicer<'a> {
    mesh: &'a Mesh,
    options: &'a SliceOptions,
    mapper: TileMapper,
    texture: Option<TextureSource>,
    output: PathBuf,
}

impl<'a> CubeSlicer<'a> {
    pub fn new(
        mesh: &'a Mesh,
        options: &'a SliceOptions,
        texture: Option<TextureSource>,
        output: &Path,
    ) -> Result<Self> {
        options.validate()?;
        let mapper = TileMapper::new(mesh.grid(), options.effective_tiles())?;

        let uncovered = mapper.uncovered_cubes();
        if uncovered > 0 {
            tracing::warn!(
                "Tile grid {} does not divide cube grid {}: {} cubes belong to no tile and are skipped",
                mapper.tile_grid(),
                mapper.grid(),
                uncovered
            );
        }

        Ok(Self {
            mesh,
            options,
            mapper,
            texture,
            output: output.to_path_buf(),
        })
    }

    fn texture_dir(&self) -> PathBuf {
        self.output.join(TEXTURE_SUBDIRECTORY)
    }

    /// Faces of every cube the tile owns
    fn tile_faces(&self, tile: TileCoord) -> Vec<&'a Face> {
        let mesh = self.mesh;
        self.mapper
            .cubes_for_tile(tile)
            .flat_map(|cube| mesh.faces_in_cube(cube))
            .collect()
    }

    /// Write every fragment and atlas, then the manifest
    pub fn run(&self) -> Result<SliceReport> {
        std::fs::create_dir_all(&self.output)
            .with_context(|| format!("Failed to create output directory: {:?}", self.output))?;
        if self.texture.is_some() {
            let dir = self.texture_dir();
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create texture directory: {:?}", dir))?;
        }

        let manifest = CubeManifest::new(
            self.mesh.grid(),
            self.mesh.bounds(),
            self.mesh.virtual_bounds(),
            self.mesh.vertices().len(),
            self.mapper.tile_grid(),
        );

        let tiles: Vec<TileCoord> = self.mapper.tile_grid().tiles().collect();
        tracing::info!(
            "Slicing into {} cubes across {} texture tiles",
            self.mesh.grid(),
            tiles.len()
        );

        let outcomes: Vec<TileOutcome> = if self.options.sequential {
            let mut outcomes = Vec::with_capacity(tiles.len());
            for &tile in &tiles {
                let span = tracing::info_span!("tile", x = tile.x, y = tile.y);
                let _enter = span.enter();
                outcomes.push(
                    self.process_tile(tile, &manifest)
                        .with_context(|| format!("Failed to process tile {}", tile))?,
                );
            }
            outcomes
        } else {
            tiles
                .par_iter()
                .map(|&tile| {
                    self.process_tile(tile, &manifest)
                        .with_context(|| format!("Failed to process tile {}", tile))
                })
                .collect::<Result<Vec<_>>>()?
        };

        manifest.write(&self.output.join(METADATA_FILE))?;

        let report = SliceReport {
            tiles: tiles.len(),
            fragments: outcomes.iter().map(|o| o.fragments).sum(),
            atlases: outcomes.iter().filter(|o| o.atlas).count(),
            failed_tiles: outcomes.iter().filter_map(|o| o.failed).collect(),
        };

        tracing::info!(
            "Wrote {} fragments and {} atlases to {:?}",
            report.fragments,
            report.atlases,
            self.output
        );
        Ok(report)
    }

    fn process_tile(&self, tile: TileCoord, manifest: &CubeManifest) -> Result<TileOutcome> {
        let faces = self.tile_faces(tile);
        tracing::debug!("Tile {}: {} faces", tile, faces.len());

        let tile_texture = match &self.texture {
            Some(source) if !faces.is_empty() => texture::generate_tile_texture(
                source,
                self.mesh.texture_vertices(),
                &faces,
                tile,
                &self.texture_dir(),
                AtlasSettings {
                    scale: self.options.texture_scale,
                    write_material: self.options.write_mtl,
                },
            )?,
            _ => TileTexture::Empty,
        };

        let mut outcome = TileOutcome::default();
        let (remap, material): (Option<&UvRemap>, Option<String>) = match &tile_texture {
            TileTexture::Packed {
                remap, material, ..
            } => {
                outcome.atlas = true;
                let library = material
                    .as_ref()
                    .map(|name| format!("{}/{}", TEXTURE_SUBDIRECTORY, name));
                (Some(remap), library)
            }
            TileTexture::Failed(err) => {
                report_pack_failure(tile, err);
                outcome.failed = Some(tile);
                (None, None)
            }
            TileTexture::Empty => (None, None),
        };

        for cube in self.mapper.cubes_for_tile(tile) {
            let cube_faces: Vec<&Face> = self.mesh.faces_in_cube(cube).collect();
            if cube_faces.is_empty() {
                manifest.mark(cube, false);
                continue;
            }

            let path = self.output.join(format!("{}.obj", cube.file_stem()));
            let stats =
                write_fragment_file(&path, self.mesh, &cube_faces, remap, material.as_deref())?;
            manifest.mark(cube, stats.vertex_count > 0);
            outcome.fragments += 1;
        }

        Ok(outcome)
    }

    /// Draw every UV polygon of the mesh over the texture
    pub fn write_uv_markup(&self, path: &Path) -> Result<()> {
        let Some(source) = &self.texture else {
            bail!("UV markup needs a texture");
        };

        let mut image = source.image().clone();
        markup::draw_uv_faces(
            &mut image,
            self.mesh.texture_vertices(),
            self.mesh.faces().iter().filter(|f| f.is_textured()),
        );
        image
            .save(path)
            .with_context(|| format!("Failed to write markup: {:?}", path))?;

        tracing::info!("Wrote UV markup {:?}", path);
        Ok(())
    }

    /// Draw each tile's island rectangles over the texture, one image per
    /// tile with faces. Returns the paths written.
    pub fn write_rect_markup(&self) -> Result<Vec<PathBuf>> {
        let Some(source) = &self.texture else {
            bail!("Rectangle markup needs a texture");
        };

        let dir = self.texture_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create texture directory: {:?}", dir))?;

        let mut written = Vec::new();
        for tile in self.mapper.tile_grid().tiles() {
            let faces = self.tile_faces(tile);
            if faces.is_empty() {
                continue;
            }

            let rects = texture::island_pixel_rects(
                self.mesh.texture_vertices(),
                &faces,
                source.dimensions(),
            );
            let mut image = source.image().clone();
            markup::draw_rects(&mut image, &rects);

            let path = dir.join(format!("rects_{}.jpg", tile.file_stem()));
            image
                .save(&path)
                .with_context(|| format!("Failed to write markup: {:?}", path))?;
            written.push(path);
        }

        tracing::info!("Wrote {} rectangle markup images", written.len());
        Ok(written)
    }
}

fn report_pack_failure(tile: TileCoord, err: &PackError) {
    tracing::error!(
        "Tile {}: {}; fragments keep their original UVs and no material",
        tile,
        err
    );
}

fn load_inputs(input: &Path, options: &SliceOptions) -> Result<(Mesh, Option<TextureSource>)> {
    options.validate()?;

    let mesh = Mesh::load(input, options.effective_grid(), options.force_cubical)?;
    let texture = options
        .texture
        .as_deref()
        .map(TextureSource::open)
        .transpose()?;

    Ok((mesh, texture))
}

/// Slice an OBJ file into `output`
pub fn slice_obj(input: &Path, output: &Path, options: &SliceOptions) -> Result<SliceReport> {
    tracing::info!("Slicing {:?}", input);

    let (mesh, texture) = load_inputs(input, options)?;
    CubeSlicer::new(&mesh, options, texture, output)?.run()
}

/// Write a debug overlay for an OBJ file instead of slicing it
pub fn markup_obj(
    input: &Path,
    output: &Path,
    options: &SliceOptions,
    kind: MarkupKind,
) -> Result<Vec<PathBuf>> {
    let Some(texture_path) = options.texture.as_deref() else {
        bail!("Markup needs --texture");
    };

    let (mesh, texture) = load_inputs(input, options)?;
    let slicer = CubeSlicer::new(&mesh, options, texture, output)?;

    match kind {
        MarkupKind::Uv => {
            std::fs::create_dir_all(output)
                .with_context(|| format!("Failed to create output directory: {:?}", output))?;
            let stem = texture_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("texture");
            let path = output.join(format!("{}_debug.jpg", stem));
            slicer.write_uv_markup(&path)?;
            Ok(vec![path])
        }
        MarkupKind::Rects => slicer.write_rect_markup(),
    }
}
