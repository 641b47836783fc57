//! UV transforms from the source texture to a repacked atlas

use hashbrown::{HashMap, HashSet};

use super::packing::Rect;
use super::rects::PixelRect;
use crate::geometry::{Face, TextureVertex};

/// Maps UVs inside one source rectangle onto its packed destination.
///
/// Edges are normalized UV positions in the source texture (v grows upward).
/// Offsets and scales relate the source image to the atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvTransform {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl UvTransform {
    /// Transform for `source` in a `source_size` image placed at `dest` in an
    /// `atlas_size` image
    pub fn derive(
        source: &PixelRect,
        source_size: (u32, u32),
        dest: &Rect,
        atlas_size: (u32, u32),
    ) -> Self {
        let (w, h) = (source_size.0 as f64, source_size.1 as f64);
        let (aw, ah) = (atlas_size.0 as f64, atlas_size.1 as f64);

        Self {
            left: source.left() as f64 / w,
            right: source.right() as f64 / w,
            top: 1.0 - source.top() as f64 / h,
            bottom: 1.0 - source.bottom() as f64 / h,
            offset_x: source.left() as f64 / w - dest.x as f64 / aw,
            offset_y: source.top() as f64 / h - dest.y as f64 / ah,
            scale_x: w / aw,
            scale_y: h / ah,
        }
    }

    /// Inclusive on every edge
    pub fn contains(&self, uv: TextureVertex) -> bool {
        uv.u >= self.left && uv.u <= self.right && uv.v >= self.bottom && uv.v <= self.top
    }

    pub fn apply(&self, uv: TextureVertex) -> TextureVertex {
        TextureVertex::new(
            (uv.u - self.left) * self.scale_x + (self.left - self.offset_x),
            1.0 - (self.top - uv.v) * self.scale_y - ((1.0 - self.top) - self.offset_y),
        )
    }
}

/// Transforms for packed rectangles, one per source/destination pair
pub fn generate_transforms(
    sources: &[PixelRect],
    source_size: (u32, u32),
    placements: &[Rect],
    atlas_size: (u32, u32),
) -> Vec<UvTransform> {
    sources
        .iter()
        .zip(placements)
        .map(|(source, dest)| UvTransform::derive(source, source_size, dest, atlas_size))
        .collect()
}

/// Replacement texture coordinates keyed by original 1-based UV index
#[derive(Clone, Debug, Default)]
pub struct UvRemap {
    coords: HashMap<u32, TextureVertex>,
}

impl UvRemap {
    /// Remap every UV the faces reference.
    ///
    /// UVs of an island go through the transform at the island's `owners`
    /// entry, so padded rectangles that overlap a neighbour never pull its
    /// vertices across. Any other referenced UV falls back to the first
    /// transform containing it.
    ///
    /// Returns the remap and the number of UVs left unmapped; those keep their
    /// original coordinates.
    pub fn build(
        transforms: &[UvTransform],
        uvs: &[TextureVertex],
        islands: &[Vec<&Face>],
        owners: &[Option<usize>],
        faces: &[&Face],
    ) -> (Self, usize) {
        let referenced: HashSet<u32> = faces.iter().flat_map(|f| f.uvs().iter().copied()).collect();
        let mut coords = HashMap::with_capacity(referenced.len());

        for (island, &owner) in islands.iter().zip(owners) {
            let Some(transform) = owner.and_then(|i| transforms.get(i)) else {
                continue;
            };
            for &index in island.iter().flat_map(|f| f.uvs()) {
                coords
                    .entry(index)
                    .or_insert_with(|| transform.apply(uvs[index as usize - 1]));
            }
        }

        let mut unmatched = 0;
        for index in referenced {
            if coords.contains_key(&index) {
                continue;
            }
            let uv = uvs[index as usize - 1];
            match transforms.iter().find(|t| t.contains(uv)) {
                Some(t) => {
                    coords.insert(index, t.apply(uv));
                }
                None => unmatched += 1,
            }
        }

        (Self { coords }, unmatched)
    }

    pub fn from_coords(coords: impl IntoIterator<Item = (u32, TextureVertex)>) -> Self {
        Self {
            coords: coords.into_iter().collect(),
        }
    }

    pub fn get(&self, index: u32) -> Option<TextureVertex> {
        self.coords.get(&index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: TextureVertex, u: f64, v: f64) -> bool {
        (a.u - u).abs() < 1e-9 && (a.v - v).abs() < 1e-9
    }

    fn sample() -> UvTransform {
        let source = PixelRect {
            x: 10,
            y: 20,
            width: 30,
            height: 40,
        };
        UvTransform::derive(&source, (100, 200), &Rect::new(0, 0, 30, 40), (64, 64))
    }

    #[test]
    fn test_derive() {
        let t = sample();

        assert!((t.left - 0.1).abs() < 1e-12);
        assert!((t.right - 0.4).abs() < 1e-12);
        assert!((t.top - 0.9).abs() < 1e-12);
        assert!((t.bottom - 0.7).abs() < 1e-12);
        assert!((t.scale_x - 100.0 / 64.0).abs() < 1e-12);
        assert!((t.scale_y - 200.0 / 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_corners_land_on_destination_corners() {
        let t = sample();

        // Top-left of the source rect maps to the atlas origin
        assert!(close(t.apply(TextureVertex::new(0.1, 0.9)), 0.0, 1.0));
        // Bottom-right maps to (30, 40) px in a 64x64 atlas
        assert!(close(
            t.apply(TextureVertex::new(0.4, 0.7)),
            30.0 / 64.0,
            1.0 - 40.0 / 64.0
        ));
    }

    #[test]
    fn test_offset_destination() {
        let source = PixelRect {
            x: 50,
            y: 0,
            width: 50,
            height: 50,
        };
        let dest = Rect::new(64, 128, 50, 50);
        let t = UvTransform::derive(&source, (100, 100), &dest, (256, 256));

        // Source pixel (75, 25) lands at atlas pixel (89, 153)
        let moved = t.apply(TextureVertex::new(0.75, 0.75));
        assert!(close(moved, 89.0 / 256.0, 1.0 - 153.0 / 256.0));
    }

    #[test]
    fn test_remap_follows_island_owner() {
        let uvs = vec![
            TextureVertex::new(0.2, 0.8),
            TextureVertex::new(0.3, 0.75),
            TextureVertex::new(0.25, 0.85),
            TextureVertex::new(0.35, 0.72),
            TextureVertex::new(0.9, 0.1),
            TextureVertex::new(0.95, 0.1),
        ];
        let owned = Face::new(vec![1, 2, 3], vec![1, 2, 3]);
        let stray = Face::new(vec![4, 5, 6], vec![4, 5, 6]);

        // Both transforms contain every UV of `owned`
        let first = sample();
        let mut second = sample();
        second.offset_x = 0.0;

        let (remap, unmatched) = UvRemap::build(
            &[first, second],
            &uvs,
            &[vec![&owned]],
            &[Some(1)],
            &[&owned, &stray],
        );

        for i in 0..3 {
            assert_eq!(remap.get(i as u32 + 1), Some(second.apply(uvs[i])));
        }
        // No island: first containing transform
        assert_eq!(remap.get(4), Some(first.apply(uvs[3])));
        assert_eq!(remap.get(5), None);
        assert_eq!(remap.get(6), None);
        assert_eq!(unmatched, 2);
    }

    #[test]
    fn test_remap_island_without_owner_falls_back() {
        let uvs = vec![
            TextureVertex::new(0.2, 0.8),
            TextureVertex::new(0.3, 0.75),
            TextureVertex::new(0.25, 0.85),
        ];
        let face = Face::new(vec![1, 2, 3], vec![1, 2, 3]);
        let t = sample();

        let (remap, unmatched) = UvRemap::build(&[t], &uvs, &[vec![&face]], &[None], &[&face]);

        assert_eq!(unmatched, 0);
        assert_eq!(remap.get(2), Some(t.apply(uvs[1])));
    }

    #[test]
    fn test_generate_transforms_pairs_in_order() {
        let sources = [
            PixelRect {
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
            PixelRect {
                x: 40,
                y: 40,
                width: 10,
                height: 10,
            },
        ];
        let placements = [Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)];

        let transforms = generate_transforms(&sources, (100, 100), &placements, (32, 16));

        assert_eq!(transforms.len(), 2);
        assert!((transforms[1].left - 0.4).abs() < 1e-12);
        assert!(close(
            transforms[1].apply(TextureVertex::new(0.4, 0.6)),
            10.0 / 32.0,
            1.0
        ));
    }
}
