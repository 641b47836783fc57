//! Types for the loaded mesh

use hashbrown::HashSet;

/// Position in mesh space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Texture coordinate, origin at the bottom-left of the image
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureVertex {
    pub u: f64,
    pub v: f64,
}

impl TextureVertex {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// Polygon referencing vertices and texture vertices by 1-based OBJ index.
///
/// Faces never change after load. Output passes that need renumbered or
/// remapped indices compute them on the side, so a face shared by several
/// passes always reads the same indices.
#[derive(Clone, Debug)]
pub struct Face {
    vertices: Box<[u32]>,
    uvs: Box<[u32]>,
    uv_set: HashSet<u32>,
}

impl Face {
    /// Create a face. `uvs` is either empty (untextured) or as long as `vertices`.
    pub fn new(vertices: Vec<u32>, uvs: Vec<u32>) -> Self {
        debug_assert!(uvs.is_empty() || uvs.len() == vertices.len());
        let uv_set = uvs.iter().copied().collect();
        Self {
            vertices: vertices.into_boxed_slice(),
            uvs: uvs.into_boxed_slice(),
            uv_set,
        }
    }

    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    pub fn uvs(&self) -> &[u32] {
        &self.uvs
    }

    pub fn is_textured(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Vertex index used as the face's position in the cube grid
    pub fn reference_vertex(&self) -> u32 {
        self.vertices[0]
    }

    /// True if both faces reference at least one common texture vertex
    pub fn shares_uv(&self, other: &Face) -> bool {
        other.uvs.iter().any(|uv| self.uv_set.contains(uv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_uv() {
        let a = Face::new(vec![1, 2, 3], vec![1, 2, 3]);
        let b = Face::new(vec![4, 5, 6], vec![3, 4, 5]);
        let c = Face::new(vec![7, 8, 9], vec![6, 7, 8]);

        assert!(a.shares_uv(&b));
        assert!(b.shares_uv(&a));
        assert!(!a.shares_uv(&c));
    }

    #[test]
    fn test_untextured_face() {
        let face = Face::new(vec![1, 2, 3], vec![]);
        assert!(!face.is_textured());
        assert!(!face.shares_uv(&face));
        assert_eq!(face.vertices().len(), 3);
        assert_eq!(face.reference_vertex(), 1);
    }
}
