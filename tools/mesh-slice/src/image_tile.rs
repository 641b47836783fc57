//! Flat image tiling
//!
//! Cuts a standalone image into a uniform grid of crops. Trailing pixels
//! that do not fill a whole tile are dropped.

use anyhow::{bail, Context, Result};
use image::imageops;
use image::RgbImage;
use std::path::Path;

/// Crop `image` into `columns` x `rows` tiles, `x` outer and `y` inner
pub fn split_image(image: &RgbImage, columns: u32, rows: u32) -> Result<Vec<(u32, u32, RgbImage)>> {
    if columns == 0 || rows == 0 {
        bail!("Tile grid {}x{} has an empty axis", columns, rows);
    }

    let tile_width = image.width() / columns;
    let tile_height = image.height() / rows;
    if tile_width == 0 || tile_height == 0 {
        bail!(
            "Image {}x{} is too small for a {}x{} tile grid",
            image.width(),
            image.height(),
            columns,
            rows
        );
    }

    let mut tiles = Vec::with_capacity((columns * rows) as usize);
    for x in 0..columns {
        for y in 0..rows {
            let tile =
                imageops::crop_imm(image, x * tile_width, y * tile_height, tile_width, tile_height)
                    .to_image();
            tiles.push((x, y, tile));
        }
    }
    Ok(tiles)
}

/// Write `{x}_{y}.jpg` crops of `input` into `output`, returning the count
pub fn generate_tiles(input: &Path, columns: u32, rows: u32, output: &Path) -> Result<usize> {
    let image = image::open(input)
        .with_context(|| format!("Failed to load image: {:?}", input))?
        .to_rgb8();

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {:?}", output))?;

    let tiles = split_image(&image, columns, rows)?;
    for (x, y, tile) in &tiles {
        let path = output.join(format!("{}_{}.jpg", x, y));
        tile.save(&path)
            .with_context(|| format!("Failed to write tile: {:?}", path))?;
    }

    tracing::info!(
        "Split {:?} ({}x{}) into {} tiles",
        input,
        image.width(),
        image.height(),
        tiles.len()
    );
    Ok(tiles.len())
}
