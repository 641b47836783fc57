//! mesh-slice - cube grid slicer for textured OBJ meshes
//!
//! Splits OBJ meshes into `{x}_{y}_{z}.obj` fragments with per-tile repacked
//! texture atlases and a `metadata.json` manifest. Images are cut into a
//! flat grid of tiles instead.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;

// Use modules from library
use mesh_slice::slice::{markup_obj, MarkupKind};
use mesh_slice::{image_tile, slice_obj, GridSize, SliceOptions, TileGridSize};

#[derive(Parser)]
#[command(name = "mesh-slice")]
#[command(about = "Slice textured OBJ meshes into a cube grid")]
#[command(version)]
struct Cli {
    /// Input OBJ meshes or JPG/PNG images
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Cubes along X (image tiles along X)
    #[arg(short = 'x', long = "x-size", default_value_t = 2)]
    x_size: u32,

    /// Cubes along Y (image tiles along Y)
    #[arg(short = 'y', long = "y-size", default_value_t = 2)]
    y_size: u32,

    /// Cubes along Z
    #[arg(short = 'z', long = "z-size", default_value_t = 2)]
    z_size: u32,

    /// Texture tiles along X
    #[arg(long, default_value_t = 1)]
    texture_x: u32,

    /// Texture tiles along Y
    #[arg(long, default_value_t = 1)]
    texture_y: u32,

    /// Use the longest grid side on every axis
    #[arg(long)]
    force_cubical: bool,

    /// Source texture to repack per tile
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Scale applied to each written atlas
    #[arg(long, default_value_t = 1.0)]
    texture_scale: f32,

    /// Write a .mtl next to each atlas and reference it from fragments
    #[arg(long)]
    write_mtl: bool,

    /// Process tiles sequentially
    #[arg(long)]
    debug: bool,

    /// Write a debug overlay instead of slicing
    #[arg(long, value_enum)]
    markup: Option<Markup>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Markup {
    /// Outline UV triangles over the texture
    Uv,
    /// Outline each tile's island rectangles
    Rects,
}

impl From<Markup> for MarkupKind {
    fn from(markup: Markup) -> Self {
        match markup {
            Markup::Uv => MarkupKind::Uv,
            Markup::Rects => MarkupKind::Rects,
        }
    }
}

/// What an input file is, by extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputKind {
    Image,
    Mesh,
    Unsupported,
}

impl InputKind {
    fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "jpg" | "jpeg" | "png" => Self::Image,
            "obj" => Self::Mesh,
            _ => Self::Unsupported,
        }
    }
}

impl Cli {
    fn slice_options(&self) -> SliceOptions {
        SliceOptions {
            grid: GridSize::new(self.x_size, self.y_size, self.z_size),
            tiles: TileGridSize::new(self.texture_x, self.texture_y),
            force_cubical: self.force_cubical,
            texture: self.texture.clone(),
            texture_scale: self.texture_scale,
            write_mtl: self.write_mtl,
            sequential: self.debug,
        }
    }

    /// Each mesh gets its own subdirectory when there are several inputs
    fn mesh_output(&self, input: &Path) -> PathBuf {
        if self.inputs.len() == 1 {
            return self.output.clone();
        }
        match input.file_stem() {
            Some(stem) => self.output.join(stem),
            None => self.output.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let options = cli.slice_options();
    if options.force_cubical {
        tracing::info!("Forcing cubical grid {}", options.effective_grid());
    }

    let started = Instant::now();
    let mut failed_tiles = 0;

    for input in &cli.inputs {
        match InputKind::detect(input) {
            InputKind::Image => {
                tracing::info!("Generating image tiles from {:?}", input);
                image_tile::generate_tiles(input, cli.x_size, cli.y_size, &cli.output)?;
            }
            InputKind::Mesh => {
                let output = cli.mesh_output(input);
                if let Some(markup) = cli.markup {
                    let written = markup_obj(input, &output, &options, markup.into())?;
                    tracing::info!("Wrote {} markup images", written.len());
                } else {
                    let report = slice_obj(input, &output, &options)?;
                    for tile in &report.failed_tiles {
                        tracing::error!("Tile {} of {:?} kept its original texture coordinates", tile, input);
                    }
                    failed_tiles += report.failed_tiles.len();
                }
            }
            InputKind::Unsupported => {
                tracing::warn!(
                    "Skipping {:?}: only .obj, .jpg and .png inputs are supported",
                    input
                );
            }
        }
    }

    tracing::info!("Elapsed {:.2?}", started.elapsed());

    if failed_tiles > 0 {
        bail!("{} texture tiles could not be packed", failed_tiles);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::detect(Path::new("scan.OBJ")), InputKind::Mesh);
        assert_eq!(InputKind::detect(Path::new("atlas.jpeg")), InputKind::Image);
        assert_eq!(InputKind::detect(Path::new("atlas.png")), InputKind::Image);
        assert_eq!(InputKind::detect(Path::new("notes.txt")), InputKind::Unsupported);
        assert_eq!(InputKind::detect(Path::new("README")), InputKind::Unsupported);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["mesh-slice", "scan.obj"]);
        let options = cli.slice_options();

        assert_eq!(options.grid, GridSize::new(2, 2, 2));
        assert_eq!(options.tiles, TileGridSize::ONE);
        assert!(!options.sequential);
        assert_eq!(cli.mesh_output(Path::new("scan.obj")), PathBuf::from("."));
    }

    #[test]
    fn test_several_meshes_get_subdirectories() {
        let cli = Cli::parse_from(["mesh-slice", "a.obj", "b.obj", "-o", "out", "-x", "4"]);

        assert_eq!(cli.mesh_output(Path::new("dir/b.obj")), PathBuf::from("out/b"));
        assert_eq!(cli.slice_options().grid, GridSize::new(4, 2, 2));
    }
}
