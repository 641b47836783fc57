//! Axis-aligned bounds of a mesh

use serde::{Deserialize, Serialize};

use super::types::Vertex;

/// Axis-aligned bounding box.
///
/// Serialized with PascalCase keys (`XMax`, `XMin`, ...) as consumed by
/// viewers reading `metadata.json`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Extent {
    pub x_max: f64,
    pub x_min: f64,
    pub y_max: f64,
    pub y_min: f64,
    pub z_max: f64,
    pub z_min: f64,
}

impl Extent {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self {
            x_max: max[0],
            x_min: min[0],
            y_max: max[1],
            y_min: min[1],
            z_max: max[2],
            z_min: min[2],
        }
    }

    /// Tight bounds over all vertices, `None` for an empty slice
    pub fn from_vertices(vertices: &[Vertex]) -> Option<Self> {
        let first = vertices.first()?;
        let mut min = first.to_array();
        let mut max = min;

        for v in &vertices[1..] {
            for (axis, value) in v.to_array().into_iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }

        Some(Self::new(min, max))
    }

    pub fn min(&self) -> [f64; 3] {
        [self.x_min, self.y_min, self.z_min]
    }

    pub fn max(&self) -> [f64; 3] {
        [self.x_max, self.y_max, self.z_max]
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.x_max - self.x_min,
            self.y_max - self.y_min,
            self.z_max - self.z_min,
        ]
    }

    /// Smallest cube sharing this extent's center that contains it.
    ///
    /// Every axis is widened symmetrically to the longest side, so an extent
    /// that is already cubical comes back unchanged.
    pub fn cubical(&self) -> Self {
        let size = self.size();
        let side = size[0].max(size[1]).max(size[2]);
        let min = self.min();

        let mut new_min = [0.0; 3];
        let mut new_max = [0.0; 3];
        for axis in 0..3 {
            let pad = (side - size[axis]) / 2.0;
            new_min[axis] = min[axis] - pad;
            new_max[axis] = min[axis] + size[axis] + pad;
        }

        Self::new(new_min, new_max)
    }
}
