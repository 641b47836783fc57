//! Atlas composition and output

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use std::path::Path;

use super::packing::Rect;
use super::rects::PixelRect;

/// Material name used by every tile material and fragment
pub const MATERIAL_NAME: &str = "material_0";

/// Copy each source rectangle into its placement on a blank `size` canvas.
///
/// Source rectangles may reach past the image edge (padding); only the part
/// inside the image is copied, at the matching offset within the placement.
pub fn compose_atlas(
    source: &RgbImage,
    sources: &[PixelRect],
    placements: &[Rect],
    size: (u32, u32),
) -> RgbImage {
    let mut canvas = RgbImage::new(size.0, size.1);
    let (width, height) = (source.width() as i32, source.height() as i32);

    for (rect, dest) in sources.iter().zip(placements) {
        let left = rect.left().clamp(0, width);
        let top = rect.top().clamp(0, height);
        let right = rect.right().clamp(0, width);
        let bottom = rect.bottom().clamp(0, height);
        if right <= left || bottom <= top {
            continue;
        }

        let piece = imageops::crop_imm(
            source,
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
        .to_image();

        let x = dest.x as i64 + (left - rect.left()) as i64;
        let y = dest.y as i64 + (top - rect.top()) as i64;
        imageops::replace(&mut canvas, &piece, x, y);
    }

    canvas
}

/// Uniformly rescale an atlas, returning it unchanged at scale 1
pub fn scale_atlas(atlas: RgbImage, scale: f32) -> RgbImage {
    if scale == 1.0 {
        return atlas;
    }

    let width = ((atlas.width() as f32 * scale).round() as u32).max(1);
    let height = ((atlas.height() as f32 * scale).round() as u32).max(1);
    tracing::debug!(
        "Scaling atlas {}x{} -> {}x{}",
        atlas.width(),
        atlas.height(),
        width,
        height
    );
    imageops::resize(&atlas, width, height, FilterType::CatmullRom)
}

/// Encode an atlas; the format follows the file extension
pub fn write_atlas(path: &Path, atlas: &RgbImage) -> Result<()> {
    atlas
        .save(path)
        .with_context(|| format!("Failed to write atlas: {:?}", path))
}

/// MTL text for a tile material whose diffuse map is `texture_file`
pub fn material_library(texture_file: &str) -> String {
    format!(
        "# Generated by mesh-slice\n\
         newmtl {MATERIAL_NAME}\n\
         Ka 0.200000 0.200000 0.200000\n\
         Kd 0.000000 0.000000 0.000000\n\
         Ks 1.000000 1.000000 1.000000\n\
         Tr 0.000000\n\
         illum 2\n\
         Ns 0.000000\n\
         map_Kd {texture_file}\n"
    )
}

pub fn write_material(path: &Path, texture_file: &str) -> Result<()> {
    std::fs::write(path, material_library(texture_file))
        .with_context(|| format!("Failed to write material: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn test_compose_copies_pixels() {
        let source = gradient(32, 32);
        let sources = [PixelRect {
            x: 4,
            y: 8,
            width: 6,
            height: 5,
        }];
        let placements = [Rect::new(10, 1, 6, 5)];

        let atlas = compose_atlas(&source, &sources, &placements, (16, 8));

        assert_eq!(atlas.dimensions(), (16, 8));
        assert_eq!(atlas.get_pixel(10, 1), &Rgb([4, 8, 7]));
        assert_eq!(atlas.get_pixel(15, 5), &Rgb([9, 12, 7]));
        assert_eq!(atlas.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_compose_clips_padding_outside_source() {
        let source = gradient(8, 8);
        let sources = [PixelRect {
            x: -3,
            y: -3,
            width: 7,
            height: 7,
        }];
        let placements = [Rect::new(0, 0, 7, 7)];

        let atlas = compose_atlas(&source, &sources, &placements, (8, 8));

        // Source pixel (0, 0) lands 3px into the placement
        assert_eq!(atlas.get_pixel(3, 3), &Rgb([0, 0, 7]));
        assert_eq!(atlas.get_pixel(6, 6), &Rgb([3, 3, 7]));
        assert_eq!(atlas.get_pixel(1, 1), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_scale_atlas() {
        let atlas = gradient(64, 32);
        assert_eq!(scale_atlas(atlas.clone(), 1.0).dimensions(), (64, 32));
        assert_eq!(scale_atlas(atlas.clone(), 0.5).dimensions(), (32, 16));
        assert_eq!(scale_atlas(atlas, 0.001).dimensions(), (1, 1));
    }

    #[test]
    fn test_material_library() {
        let mtl = material_library("1_0.jpg");

        assert!(mtl.starts_with("# Generated by mesh-slice\nnewmtl material_0\n"));
        assert!(mtl.contains("illum 2\n"));
        assert!(mtl.ends_with("map_Kd 1_0.jpg\n"));
    }
}
