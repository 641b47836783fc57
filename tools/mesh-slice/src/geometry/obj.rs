//! OBJ mesh reading
//!
//! Only the records the slicer needs are read: `v`, `vt` and `f`. Normals,
//! groups, materials and smoothing records are skipped.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::types::{Face, TextureVertex, Vertex};

/// Malformed OBJ input. Every variant names the offending line.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("failed to read OBJ data")]
    Io(#[from] std::io::Error),

    #[error("line {line}: `{keyword}` record needs {expected} values")]
    MissingValue {
        line: usize,
        keyword: &'static str,
        expected: usize,
    },

    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: non-finite coordinate `{token}`")]
    NonFinite { line: usize, token: String },

    #[error("line {line}: face has {count} corners, at least 3 are required")]
    FaceTooShort { line: usize, count: usize },

    #[error("line {line}: invalid face index `{token}`")]
    InvalidIndex { line: usize, token: String },

    #[error("line {line}: {kind} index {index} out of range (1..={count})")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: i64,
        count: usize,
    },

    #[error("line {line}: face mixes corners with and without texture coordinates")]
    MixedTexturing { line: usize },

    #[error("OBJ data contains no faces")]
    NoFaces,
}

/// Raw mesh data read from an OBJ file
#[derive(Debug, Default)]
pub struct ObjData {
    pub vertices: Vec<Vertex>,
    pub texture_vertices: Vec<TextureVertex>,
    pub faces: Vec<Face>,
}

/// Read an OBJ file from disk
pub fn read_obj_file(path: &Path) -> Result<ObjData> {
    let file = File::open(path).with_context(|| format!("Failed to open OBJ: {:?}", path))?;
    let data = parse_obj(BufReader::new(file))
        .with_context(|| format!("Failed to parse OBJ: {:?}", path))?;
    Ok(data)
}

/// Parse OBJ text. Fails on the first malformed record.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<ObjData, ObjError> {
    let mut data = ObjData::default();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "v" => {
                let [x, y, z] = parse_coords::<3>(&parts[1..], line_no, "v")?;
                data.vertices.push(Vertex::new(x, y, z));
            }
            "vt" => {
                let [u, v] = parse_coords::<2>(&parts[1..], line_no, "vt")?;
                data.texture_vertices.push(TextureVertex::new(u, v));
            }
            "f" => {
                let face = parse_face(
                    &parts[1..],
                    line_no,
                    data.vertices.len(),
                    data.texture_vertices.len(),
                )?;
                data.faces.push(face);
            }
            _ => {}
        }
    }

    if data.faces.is_empty() {
        return Err(ObjError::NoFaces);
    }

    Ok(data)
}

/// Parse the first `N` values of a coordinate record; extra values (`w`) are ignored
fn parse_coords<const N: usize>(
    values: &[&str],
    line: usize,
    keyword: &'static str,
) -> Result<[f64; N], ObjError> {
    if values.len() < N {
        return Err(ObjError::MissingValue {
            line,
            keyword,
            expected: N,
        });
    }

    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(values) {
        let value: f64 = token.parse().map_err(|_| ObjError::InvalidNumber {
            line,
            token: token.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ObjError::NonFinite {
                line,
                token: token.to_string(),
            });
        }
        *slot = value;
    }

    Ok(out)
}

/// Parse face corners: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_face(
    corners: &[&str],
    line: usize,
    vertex_count: usize,
    uv_count: usize,
) -> Result<Face, ObjError> {
    if corners.len() < 3 {
        return Err(ObjError::FaceTooShort {
            line,
            count: corners.len(),
        });
    }

    let mut vertices = Vec::with_capacity(corners.len());
    let mut uvs = Vec::with_capacity(corners.len());

    for corner in corners {
        let mut parts = corner.split('/');
        let vi = parts.next().unwrap_or_default();
        vertices.push(resolve_index(vi, line, "vertex", vertex_count)?);

        match parts.next().filter(|s| !s.is_empty()) {
            Some(ti) => uvs.push(resolve_index(ti, line, "texture vertex", uv_count)?),
            None if !uvs.is_empty() => return Err(ObjError::MixedTexturing { line }),
            None => {}
        }

        if !uvs.is_empty() && uvs.len() != vertices.len() {
            return Err(ObjError::MixedTexturing { line });
        }
    }

    Ok(Face::new(vertices, uvs))
}

/// Resolve a 1-based or negative (relative) OBJ index to a 1-based index
fn resolve_index(
    token: &str,
    line: usize,
    kind: &'static str,
    count: usize,
) -> Result<u32, ObjError> {
    let raw: i64 = token.parse().map_err(|_| ObjError::InvalidIndex {
        line,
        token: token.to_string(),
    })?;

    let resolved = if raw < 0 { count as i64 + raw + 1 } else { raw };

    if resolved < 1 || resolved > count as i64 {
        return Err(ObjError::IndexOutOfRange {
            line,
            kind,
            index: raw,
            count,
        });
    }

    Ok(resolved as u32)
}
