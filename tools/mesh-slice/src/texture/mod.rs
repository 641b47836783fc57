//! Per-tile texture repacking
//!
//! A tile's faces are grouped into UV islands, each island's bounding
//! rectangle is cut out of the source texture and packed into a new atlas,
//! and the tile's UVs are remapped to match.

pub mod atlas;
pub mod islands;
pub mod markup;
pub mod packing;
pub mod rects;
pub mod transform;

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

use crate::geometry::{Face, TextureVertex};
use crate::grid::TileCoord;

// Re-export public API
pub use packing::{pack, PackError, PackedAtlas, Rect, MAX_ATLAS_SIZE};
pub use rects::{PixelRect, UvRect, PIXEL_PADDING};
pub use transform::{generate_transforms, UvRemap, UvTransform};

/// Decoded source texture, shared read-only by every tile
pub struct TextureSource {
    image: RgbImage,
}

impl TextureSource {
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .with_context(|| format!("Failed to load texture: {:?}", path))?
            .to_rgb8();

        tracing::info!(
            "Loaded texture {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );
        Ok(Self { image })
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// A tile's islands and the pruned rectangles they are cut from
#[derive(Clone, Debug)]
pub struct IslandLayout<'a> {
    pub islands: Vec<Vec<&'a Face>>,
    /// Index into `rects` of the rectangle holding each island
    pub owners: Vec<Option<usize>>,
    /// Padded pixel rectangles left after pruning
    pub rects: Vec<PixelRect>,
}

/// Group the tile's faces into islands and prune their rectangles
pub fn island_layout<'a>(
    uvs: &[TextureVertex],
    faces: &[&'a Face],
    source_size: (u32, u32),
) -> IslandLayout<'a> {
    let (islands, uv_rects): (Vec<Vec<&'a Face>>, Vec<UvRect>) = islands::find_islands(faces)
        .into_iter()
        .filter_map(|island| rects::island_rect(uvs, &island).map(|rect| (island, rect)))
        .unzip();
    let kept = rects::prune_contained(&uv_rects);
    let owners = rects::containing_rects(&uv_rects, &kept);

    let pruned = uv_rects.len() - kept.len();
    if pruned > 0 {
        tracing::warn!(
            "{} of {} island rectangles lie inside another and share its atlas region",
            pruned,
            uv_rects.len()
        );
    }
    tracing::debug!("{} islands, {} rectangles kept", islands.len(), kept.len());

    let pixel_rects = kept
        .iter()
        .map(|r| rects::to_pixel_rect(r, source_size.0, source_size.1, PIXEL_PADDING))
        .collect();

    IslandLayout {
        islands,
        owners,
        rects: pixel_rects,
    }
}

/// Padded pixel rectangles of the tile's islands after pruning
pub fn island_pixel_rects(
    uvs: &[TextureVertex],
    faces: &[&Face],
    source_size: (u32, u32),
) -> Vec<PixelRect> {
    island_layout(uvs, faces, source_size).rects
}

/// Where each island goes in a tile's atlas
#[derive(Clone, Debug)]
pub struct AtlasPlan<'a> {
    pub islands: Vec<Vec<&'a Face>>,
    pub owners: Vec<Option<usize>>,
    pub sources: Vec<PixelRect>,
    pub packed: PackedAtlas,
    pub transforms: Vec<UvTransform>,
}

impl AtlasPlan<'_> {
    /// Remap the faces' UVs into this atlas
    pub fn remap(&self, uvs: &[TextureVertex], faces: &[&Face]) -> (UvRemap, usize) {
        UvRemap::build(&self.transforms, uvs, &self.islands, &self.owners, faces)
    }
}

/// Pack the tile's islands. `None` when no face is textured.
pub fn plan_atlas<'a>(
    uvs: &[TextureVertex],
    faces: &[&'a Face],
    source_size: (u32, u32),
) -> Result<Option<AtlasPlan<'a>>, PackError> {
    let IslandLayout {
        islands,
        owners,
        rects: sources,
    } = island_layout(uvs, faces, source_size);
    if sources.is_empty() {
        return Ok(None);
    }

    let sizes: Vec<(u32, u32)> = sources.iter().map(|r| (r.width, r.height)).collect();
    let packed = pack(&sizes)?;
    let transforms = generate_transforms(&sources, source_size, &packed.placements, packed.size);

    Ok(Some(AtlasPlan {
        islands,
        owners,
        sources,
        packed,
        transforms,
    }))
}

/// Outcome of repacking one tile
#[derive(Debug)]
pub enum TileTexture {
    /// No textured faces; nothing written
    Empty,
    /// Atlas written; fragments should use `remap`
    Packed {
        remap: UvRemap,
        atlas: PathBuf,
        /// Material file name inside the texture directory
        material: Option<String>,
    },
    /// Islands did not fit; fragments keep their original UVs
    Failed(PackError),
}

/// Settings for writing a tile atlas
#[derive(Clone, Copy, Debug)]
pub struct AtlasSettings {
    pub scale: f32,
    pub write_material: bool,
}

/// Repack `faces` of one tile into `texture_dir/{tx}_{ty}.jpg`
pub fn generate_tile_texture(
    source: &TextureSource,
    uvs: &[TextureVertex],
    faces: &[&Face],
    tile: TileCoord,
    texture_dir: &Path,
    settings: AtlasSettings,
) -> Result<TileTexture> {
    let plan = match plan_atlas(uvs, faces, source.dimensions()) {
        Ok(Some(plan)) => plan,
        Ok(None) => return Ok(TileTexture::Empty),
        Err(err) => return Ok(TileTexture::Failed(err)),
    };

    let canvas = atlas::compose_atlas(
        source.image(),
        &plan.sources,
        &plan.packed.placements,
        plan.packed.size,
    );
    let canvas = atlas::scale_atlas(canvas, settings.scale);

    let file_name = format!("{}.jpg", tile.file_stem());
    let atlas_path = texture_dir.join(&file_name);
    atlas::write_atlas(&atlas_path, &canvas)?;

    let material = if settings.write_material {
        let name = format!("{}.mtl", tile.file_stem());
        atlas::write_material(&texture_dir.join(&name), &file_name)?;
        Some(name)
    } else {
        None
    };

    let (remap, unmatched) = plan.remap(uvs, faces);
    if unmatched > 0 {
        tracing::warn!(
            "Tile {}: {} UVs outside every island rectangle keep their original coordinates",
            tile,
            unmatched
        );
    }

    tracing::debug!(
        "Tile {}: packed {} rectangles into {}x{}",
        tile,
        plan.sources.len(),
        canvas.width(),
        canvas.height()
    );

    Ok(TileTexture::Packed {
        remap,
        atlas: atlas_path,
        material,
    })
}
