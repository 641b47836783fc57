//! Face-to-cube assignment
//!
//! Each face lands in exactly one cube. The cube is picked from a single
//! reference point, so faces crossing a cube boundary are kept whole in one
//! cube rather than clipped or duplicated.

use super::{CubeCoord, GridSize};
use crate::geometry::{Extent, Face, Vertex};

#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("cube grid {0} has an empty axis")]
    EmptyGrid(GridSize),

    #[error("mesh has no vertices")]
    NoVertices,

    #[error("face {face} has a non-finite reference point {point:?}")]
    NonFinite { face: usize, point: [f64; 3] },
}

/// Chooses the point that decides which cube a face belongs to
pub trait FaceAssignment: Sync {
    fn reference_point(&self, face: &Face, vertices: &[Vertex]) -> Vertex;
}

/// Use the first vertex of the face
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstVertex;

impl FaceAssignment for FirstVertex {
    fn reference_point(&self, face: &Face, vertices: &[Vertex]) -> Vertex {
        vertices[face.reference_vertex() as usize - 1]
    }
}

/// Index of the interval holding `value` when `[min, min + size]` is split in `count`.
///
/// Values outside the range clamp to the first or last interval; the upper
/// bound itself belongs to the last interval.
fn axis_index(value: f64, min: f64, size: f64, count: u32) -> u32 {
    if size <= 0.0 {
        return 0;
    }
    let t = ((value - min) / size * count as f64).floor();
    t.clamp(0.0, (count - 1) as f64) as u32
}

/// Locate the cube containing `point`, `None` for non-finite points
pub fn locate(point: Vertex, extent: &Extent, grid: GridSize) -> Option<CubeCoord> {
    if !point.is_finite() {
        return None;
    }
    let min = extent.min();
    let size = extent.size();
    let p = point.to_array();
    let counts = grid.as_array();

    let mut cell = [0u32; 3];
    for axis in 0..3 {
        cell[axis] = axis_index(p[axis], min[axis], size[axis], counts[axis]);
    }
    Some(CubeCoord::new(cell[0], cell[1], cell[2]))
}

/// Faces grouped by cube, built once per mesh
#[derive(Debug)]
pub struct FaceLookup {
    grid: GridSize,
    cells: Vec<Vec<u32>>,
}

impl FaceLookup {
    /// Assign every face to one cube of `grid` laid over `extent`
    pub fn build(
        faces: &[Face],
        vertices: &[Vertex],
        extent: Extent,
        grid: GridSize,
        policy: &dyn FaceAssignment,
    ) -> Result<Self, PartitionError> {
        if grid.is_empty() {
            return Err(PartitionError::EmptyGrid(grid));
        }

        let mut cells = vec![Vec::new(); grid.cube_count()];

        for (i, face) in faces.iter().enumerate() {
            let point = policy.reference_point(face, vertices);
            let cube = locate(point, &extent, grid).ok_or(PartitionError::NonFinite {
                face: i,
                point: point.to_array(),
            })?;
            cells[grid.linear_index(cube)].push(i as u32);
        }

        Ok(Self { grid, cells })
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// Indices (0-based, into the mesh face list) of the faces in `cube`
    pub fn faces(&self, cube: CubeCoord) -> &[u32] {
        &self.cells[self.grid.linear_index(cube)]
    }

    /// Number of faces held across all cubes
    pub fn face_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Number of cubes with at least one face
    pub fn occupied_cubes(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}
