//! OBJ fragment writing
//!
//! A fragment is a standalone OBJ holding a subset of the mesh's faces. Only
//! the vertices and texture vertices those faces reference are emitted, in
//! first-use order, and face indices are renumbered to match.

use anyhow::{Context, Result};
use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::types::Face;
use super::Mesh;
use crate::texture::atlas::MATERIAL_NAME;
use crate::texture::transform::UvRemap;

/// Counts of what a fragment contains
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentStats {
    pub vertex_count: usize,
    pub texture_vertex_count: usize,
    pub face_count: usize,
}

/// Maps original 1-based indices to fragment-local 1-based indices
#[derive(Default)]
struct Renumbering {
    local: HashMap<u32, u32>,
    order: Vec<u32>,
}

impl Renumbering {
    fn index(&mut self, original: u32) -> u32 {
        let order = &mut self.order;
        *self.local.entry(original).or_insert_with(|| {
            order.push(original);
            order.len() as u32
        })
    }
}

/// Write `faces` as a standalone OBJ.
///
/// Texture coordinates found in `uv_remap` replace the mesh's originals.
/// `material_library` adds `mtllib`/`usemtl` records pointing at a tile material.
pub fn write_fragment<W: Write>(
    w: &mut W,
    mesh: &Mesh,
    faces: &[&Face],
    uv_remap: Option<&UvRemap>,
    material_library: Option<&str>,
) -> std::io::Result<FragmentStats> {
    let mut vertices = Renumbering::default();
    let mut uvs = Renumbering::default();

    let local_faces: Vec<(Vec<u32>, Vec<u32>)> = faces
        .iter()
        .map(|face| {
            let v: Vec<u32> = face.vertices().iter().map(|&i| vertices.index(i)).collect();
            let t: Vec<u32> = face.uvs().iter().map(|&i| uvs.index(i)).collect();
            (v, t)
        })
        .collect();

    if let Some(library) = material_library {
        writeln!(w, "mtllib {}", library)?;
        writeln!(w, "usemtl {}", MATERIAL_NAME)?;
    }

    for &index in &vertices.order {
        let v = mesh.vertex(index);
        writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
    }

    for &index in &uvs.order {
        let uv = uv_remap
            .and_then(|remap| remap.get(index))
            .unwrap_or_else(|| mesh.texture_vertex(index));
        writeln!(w, "vt {} {}", uv.u, uv.v)?;
    }

    for (v, t) in &local_faces {
        write!(w, "f")?;
        if t.is_empty() {
            for vi in v {
                write!(w, " {}", vi)?;
            }
        } else {
            for (vi, ti) in v.iter().zip(t) {
                write!(w, " {}/{}", vi, ti)?;
            }
        }
        writeln!(w)?;
    }

    Ok(FragmentStats {
        vertex_count: vertices.order.len(),
        texture_vertex_count: uvs.order.len(),
        face_count: local_faces.len(),
    })
}

/// Write a fragment to `path`
pub fn write_fragment_file(
    path: &Path,
    mesh: &Mesh,
    faces: &[&Face],
    uv_remap: Option<&UvRemap>,
    material_library: Option<&str>,
) -> Result<FragmentStats> {
    let file =
        File::create(path).with_context(|| format!("Failed to create fragment: {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let stats = write_fragment(&mut writer, mesh, faces, uv_remap, material_library)
        .with_context(|| format!("Failed to write fragment: {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write fragment: {:?}", path))?;

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::obj::parse_obj;
    use crate::geometry::TextureVertex;
    use crate::grid::GridSize;

    fn two_triangle_mesh() -> Mesh {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 5 5 5
v 6 5 5
v 6 6 5
vt 0 0
vt 1 0
vt 1 1
vt 0.5 0.5
f 4/4 5/2 6/3
f 1/1 2/2 3/3
";
        let data = parse_obj(obj.as_bytes()).unwrap();
        Mesh::from_obj(data, GridSize::new(1, 1, 1), false).unwrap()
    }

    #[test]
    fn test_renumbers_in_first_use_order() {
        let mesh = two_triangle_mesh();
        let faces = [&mesh.faces()[0]];

        let mut out = Vec::new();
        let stats = write_fragment(&mut out, &mesh, &faces, None, None).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            stats,
            FragmentStats {
                vertex_count: 3,
                texture_vertex_count: 3,
                face_count: 1,
            }
        );
        assert_eq!(
            text,
            "v 5 5 5\nv 6 5 5\nv 6 6 5\nvt 0.5 0.5\nvt 1 0\nvt 1 1\nf 1/1 2/2 3/3\n"
        );
    }

    #[test]
    fn test_faces_stay_untouched_between_writes() {
        let mesh = two_triangle_mesh();
        let first = [&mesh.faces()[0]];
        let both: Vec<&Face> = mesh.faces().iter().collect();

        write_fragment(&mut Vec::new(), &mesh, &first, None, None).unwrap();

        let mut out = Vec::new();
        write_fragment(&mut out, &mesh, &both, None, None).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.ends_with("f 1/1 2/2 3/3\nf 4/4 5/2 6/3\n"));
        assert_eq!(mesh.faces()[0].vertices(), &[4, 5, 6]);
    }

    #[test]
    fn test_remap_and_material() {
        let mesh = two_triangle_mesh();
        let faces = [&mesh.faces()[1]];
        let remap = UvRemap::from_coords([(2, TextureVertex::new(0.25, 0.75))]);

        let mut out = Vec::new();
        write_fragment(&mut out, &mesh, &faces, Some(&remap), Some("texture/0_0.mtl")).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("mtllib texture/0_0.mtl\nusemtl material_0\n"));
        assert!(text.contains("vt 0 0\nvt 0.25 0.75\nvt 1 1\n"));
    }
}
