//! Test asset generation
//!
//! Generates small meshes and textures for integration testing.
//! Uses the image crate for rasters and plain text for OBJ.

use std::fs;
use std::io::Write;
use std::path::Path;

/// Generate a 64x64 RGB gradient PNG
pub fn generate_texture_png(path: &Path) -> std::io::Result<()> {
    let width = 64u32;
    let height = 64u32;
    let mut pixels = vec![0u8; (width * height * 3) as usize];

    for y in 0..height {
        for x in 0..width {
            let idx = ((y * width + x) * 3) as usize;
            pixels[idx] = (x * 4) as u8; // R
            pixels[idx + 1] = (y * 4) as u8; // G
            pixels[idx + 2] = 128; // B
        }
    }

    image::save_buffer(path, &pixels, width, height, image::ColorType::Rgb8)
        .map_err(std::io::Error::other)
}

/// Generate a flat 2x2 footprint with one textured triangle per cell.
///
/// Bounds are (0,0,0)-(2,2,0); each triangle's first vertex sits in a
/// different cell of a 2x2x1 grid and its UVs in a different quadrant.
pub fn generate_grid_obj(path: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;

    writeln!(file, "# Four triangles on a 2x2 grid")?;
    writeln!(file, "mtllib scan.mtl")?;
    writeln!(file)?;

    let origins = [(0.0, 0.0), (1.5, 0.0), (0.0, 1.5), (1.5, 1.5)];
    for (x, y) in origins {
        writeln!(file, "v {} {} 0", x, y)?;
        writeln!(file, "v {} {} 0", x + 0.5, y)?;
        writeln!(file, "v {} {} 0", x, y + 0.5)?;
    }
    writeln!(file)?;

    let quadrants = [(0.1, 0.1), (0.6, 0.1), (0.1, 0.6), (0.6, 0.6)];
    for (u, v) in quadrants {
        writeln!(file, "vt {} {}", u, v)?;
        writeln!(file, "vt {} {}", u + 0.2, v)?;
        writeln!(file, "vt {} {}", u, v + 0.2)?;
    }
    writeln!(file)?;

    writeln!(file, "usemtl scan")?;
    for i in 0..4 {
        let a = i * 3 + 1;
        writeln!(file, "f {}/{} {}/{} {}/{}", a, a, a + 1, a + 1, a + 2, a + 2)?;
    }

    Ok(())
}

/// Generate one textured triangle whose UVs span 400 texture widths, too
/// wide for any atlas
pub fn generate_wide_uv_obj(path: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;

    writeln!(file, "# UVs far outside the unit square")?;
    writeln!(file, "v 0 0 0")?;
    writeln!(file, "v 1 0 0")?;
    writeln!(file, "v 0 1 0")?;
    writeln!(file, "vt 0 0")?;
    writeln!(file, "vt 400 0")?;
    writeln!(file, "vt 0 1")?;
    writeln!(file, "f 1/1 2/2 3/3")?;

    Ok(())
}

/// Generate an untextured mesh whose bounds are already a 2x2x2 cube,
/// with one triangle per cell of a 2x2x2 grid
pub fn generate_cubical_obj(path: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;

    writeln!(file, "# Cubical bounds")?;
    writeln!(file, "v 0 0 0")?;
    writeln!(file, "v 2 2 2")?;

    for x in 0..2 {
        for y in 0..2 {
            for z in 0..2 {
                let (x, y, z) = (x as f64 + 0.25, y as f64 + 0.25, z as f64 + 0.25);
                writeln!(file, "v {} {} {}", x, y, z)?;
                writeln!(file, "v {} {} {}", x + 0.5, y, z)?;
                writeln!(file, "v {} {} {}", x, y + 0.5, z)?;
            }
        }
    }

    for i in 0..8 {
        let a = i * 3 + 3;
        writeln!(file, "f {} {} {}", a, a + 1, a + 2)?;
    }

    Ok(())
}
