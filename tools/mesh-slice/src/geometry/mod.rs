//! Mesh model (OBJ in, OBJ fragments out)

mod extent;
pub mod obj;
mod types;
pub mod writer;

use anyhow::{Context, Result};
use std::path::Path;

use crate::grid::partition::{FaceLookup, FirstVertex, PartitionError};
use crate::grid::{CubeCoord, GridSize};

// Re-export public API
pub use extent::Extent;
pub use obj::{parse_obj, read_obj_file, ObjData, ObjError};
pub use types::{Face, TextureVertex, Vertex};

/// A loaded mesh plus its cube lookup.
///
/// Everything here is read-only once built, so a `&Mesh` can be handed to
/// any number of worker threads.
#[derive(Debug)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    texture_vertices: Vec<TextureVertex>,
    faces: Vec<Face>,
    bounds: Extent,
    cubical_bounds: Option<Extent>,
    lookup: FaceLookup,
}

impl Mesh {
    /// Load an OBJ file and partition it into `grid`
    pub fn load(path: &Path, grid: GridSize, force_cubical: bool) -> Result<Self> {
        let data = read_obj_file(path)?;
        let mesh = Self::from_obj(data, grid, force_cubical)
            .with_context(|| format!("Failed to partition OBJ: {:?}", path))?;
        Ok(mesh)
    }

    /// Build a mesh from parsed OBJ data.
    ///
    /// With `force_cubical` the faces are partitioned over the cubical
    /// enlargement of the natural bounds.
    pub fn from_obj(data: ObjData, grid: GridSize, force_cubical: bool) -> Result<Self, PartitionError> {
        let ObjData {
            vertices,
            texture_vertices,
            faces,
        } = data;

        let bounds = Extent::from_vertices(&vertices).ok_or(PartitionError::NoVertices)?;
        let cubical_bounds = force_cubical.then(|| bounds.cubical());
        let extent = cubical_bounds.unwrap_or(bounds);

        let lookup = FaceLookup::build(&faces, &vertices, extent, grid, &FirstVertex)?;

        tracing::info!(
            "Loaded {} vertices, {} texture vertices and {} faces",
            vertices.len(),
            texture_vertices.len(),
            faces.len()
        );
        let size = bounds.size();
        tracing::info!("Size: X {} Y {} Z {}", size[0], size[1], size[2]);
        tracing::info!(
            "Partitioned {} faces into {} occupied cubes of {}",
            lookup.face_count(),
            lookup.occupied_cubes(),
            grid
        );

        Ok(Self {
            vertices,
            texture_vertices,
            faces,
            bounds,
            cubical_bounds,
            lookup,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn texture_vertices(&self) -> &[TextureVertex] {
        &self.texture_vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Vertex by 1-based OBJ index
    pub fn vertex(&self, index: u32) -> Vertex {
        self.vertices[index as usize - 1]
    }

    /// Texture vertex by 1-based OBJ index
    pub fn texture_vertex(&self, index: u32) -> TextureVertex {
        self.texture_vertices[index as usize - 1]
    }

    /// Natural bounds of all vertices
    pub fn bounds(&self) -> Extent {
        self.bounds
    }

    /// Bounds the cube grid was laid over
    pub fn virtual_bounds(&self) -> Extent {
        self.cubical_bounds.unwrap_or(self.bounds)
    }

    pub fn grid(&self) -> GridSize {
        self.lookup.grid()
    }

    /// Faces assigned to one cube
    pub fn faces_in_cube(&self, cube: CubeCoord) -> impl Iterator<Item = &Face> + '_ {
        self.lookup
            .faces(cube)
            .iter()
            .map(move |&i| &self.faces[i as usize])
    }
}
