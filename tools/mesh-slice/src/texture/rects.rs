//! Island bounding rectangles in UV and pixel space

use hashbrown::HashSet;

use crate::geometry::{Face, TextureVertex};

/// Pixels added on every side of an island before packing
pub const PIXEL_PADDING: i32 = 3;

/// Axis-aligned rectangle in UV space (v grows upward)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvRect {
    pub min_u: f64,
    pub min_v: f64,
    pub max_u: f64,
    pub max_v: f64,
}

impl UvRect {
    pub fn width(&self) -> f64 {
        self.max_u - self.min_u
    }

    pub fn height(&self) -> f64 {
        self.max_v - self.min_v
    }

    /// Inclusive containment
    pub fn contains(&self, other: &UvRect) -> bool {
        self.min_u <= other.min_u
            && self.min_v <= other.min_v
            && self.max_u >= other.max_u
            && self.max_v >= other.max_v
    }
}

/// Rectangle in image pixels (y grows downward). May extend past the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }
}

/// Bounding rectangle of every distinct texture vertex an island references
pub fn island_rect(uvs: &[TextureVertex], island: &[&Face]) -> Option<UvRect> {
    let indices: HashSet<u32> = island.iter().flat_map(|f| f.uvs().iter().copied()).collect();

    indices
        .into_iter()
        .map(|i| uvs[i as usize - 1])
        .fold(None, |rect: Option<UvRect>, uv| {
            Some(match rect {
                None => UvRect {
                    min_u: uv.u,
                    min_v: uv.v,
                    max_u: uv.u,
                    max_v: uv.v,
                },
                Some(r) => UvRect {
                    min_u: r.min_u.min(uv.u),
                    min_v: r.min_v.min(uv.v),
                    max_u: r.max_u.max(uv.u),
                    max_v: r.max_v.max(uv.v),
                },
            })
        })
}

/// Drop rectangles that another rectangle fully contains.
///
/// When several rectangles are equal, the first one is kept. Input order is
/// preserved.
pub fn prune_contained(rects: &[UvRect]) -> Vec<UvRect> {
    rects
        .iter()
        .enumerate()
        .filter(|&(i, rect)| {
            !rects.iter().enumerate().any(|(j, other)| {
                j != i && other.contains(rect) && (other != rect || j < i)
            })
        })
        .map(|(_, rect)| *rect)
        .collect()
}

/// For each rectangle, the index of the first `kept` rectangle containing it.
///
/// With `kept` from [`prune_contained`], every input rectangle has an owner and
/// kept rectangles own themselves.
pub fn containing_rects(rects: &[UvRect], kept: &[UvRect]) -> Vec<Option<usize>> {
    rects
        .iter()
        .map(|rect| kept.iter().position(|k| k.contains(rect)))
        .collect()
}

/// Convert a UV rectangle to pixels of a `width` x `height` image, grown by `padding`
pub fn to_pixel_rect(rect: &UvRect, width: u32, height: u32, padding: i32) -> PixelRect {
    let (w, h) = (width as f64, height as f64);
    PixelRect {
        x: (rect.min_u * w) as i32 - padding,
        y: ((1.0 - rect.max_v) * h) as i32 - padding,
        width: ((rect.width() * w) as i32 + padding * 2).max(1) as u32,
        height: ((rect.height() * h) as i32 + padding * 2).max(1) as u32,
    }
}
