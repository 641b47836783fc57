//! Rectangle bin packing (MaxRects, best area fit)
//!
//! The canvas starts at the power of two nearest the total rectangle area
//! and grows until every rectangle fits or the maximum size is exceeded.

/// Largest canvas dimension the packer will try
pub const MAX_ATLAS_SIZE: u32 = 16384;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PackError {
    #[error("rectangle {index} ({width}x{height}) is larger than the {max}px atlas limit")]
    RectTooLarge {
        index: usize,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("{count} rectangles do not fit in a {max}x{max} atlas")]
    ExceedsMaximum { count: usize, max: u32 },
}

/// Placed rectangle in canvas pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// MaxRects bin with a fixed canvas
struct MaxRectsBin {
    free: Vec<Rect>,
}

impl MaxRectsBin {
    fn new(width: u32, height: u32) -> Self {
        Self {
            free: vec![Rect::new(0, 0, width, height)],
        }
    }

    /// Place a `width` x `height` rectangle, `None` if no free space fits it
    fn insert(&mut self, width: u32, height: u32) -> Option<Rect> {
        let placed = self.best_area_fit(width, height)?;

        let mut i = 0;
        while i < self.free.len() {
            if self.free[i].intersects(&placed) {
                let free = self.free.swap_remove(i);
                split_free_rect(&free, &placed, &mut self.free);
            } else {
                i += 1;
            }
        }
        self.prune_free_list();

        Some(placed)
    }

    /// Free rectangle leaving the least area unused, ties broken by the shorter leftover side
    fn best_area_fit(&self, width: u32, height: u32) -> Option<Rect> {
        let needed = width as u64 * height as u64;

        self.free
            .iter()
            .filter(|f| f.width >= width && f.height >= height)
            .min_by_key(|f| {
                let area_fit = f.area() - needed;
                let short_side = (f.width - width).min(f.height - height);
                (area_fit, short_side)
            })
            .map(|f| Rect::new(f.x, f.y, width, height))
    }

    fn prune_free_list(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let mut removed = false;
            let mut j = i + 1;
            while j < self.free.len() {
                if self.free[j].contains(&self.free[i]) {
                    self.free.swap_remove(i);
                    removed = true;
                    break;
                }
                if self.free[i].contains(&self.free[j]) {
                    self.free.swap_remove(j);
                } else {
                    j += 1;
                }
            }
            if !removed {
                i += 1;
            }
        }
    }
}

/// Push the parts of `free` not covered by `placed`
fn split_free_rect(free: &Rect, placed: &Rect, out: &mut Vec<Rect>) {
    if placed.x > free.x {
        out.push(Rect::new(free.x, free.y, placed.x - free.x, free.height));
    }
    if placed.right() < free.right() {
        out.push(Rect::new(
            placed.right(),
            free.y,
            free.right() - placed.right(),
            free.height,
        ));
    }
    if placed.y > free.y {
        out.push(Rect::new(free.x, free.y, free.width, placed.y - free.y));
    }
    if placed.bottom() < free.bottom() {
        out.push(Rect::new(
            free.x,
            placed.bottom(),
            free.width,
            free.bottom() - placed.bottom(),
        ));
    }
}

/// Result of a successful pack
#[derive(Clone, Debug, PartialEq)]
pub struct PackedAtlas {
    /// One placement per input size, same order
    pub placements: Vec<Rect>,
    /// Canvas the placements were found in
    pub canvas: (u32, u32),
    /// Tight bounds of the placements rounded up to powers of two
    pub size: (u32, u32),
}

/// Try every rectangle in input order on one canvas
fn pack_into(sizes: &[(u32, u32)], width: u32, height: u32) -> Option<Vec<Rect>> {
    let mut bin = MaxRectsBin::new(width, height);
    sizes.iter().map(|&(w, h)| bin.insert(w, h)).collect()
}

/// Pack rectangles of the given sizes, growing the canvas as needed
pub fn pack(sizes: &[(u32, u32)]) -> Result<PackedAtlas, PackError> {
    if let Some((index, &(width, height))) = sizes
        .iter()
        .enumerate()
        .find(|&(_, &(w, h))| w > MAX_ATLAS_SIZE || h > MAX_ATLAS_SIZE)
    {
        return Err(PackError::RectTooLarge {
            index,
            width,
            height,
            max: MAX_ATLAS_SIZE,
        });
    }

    let total_area: u64 = sizes.iter().map(|&(w, h)| w as u64 * h as u64).sum();
    let start = ((total_area as f64).sqrt().ceil() as u32)
        .max(1)
        .next_power_of_two()
        .min(MAX_ATLAS_SIZE);
    let (mut width, mut height) = (start, start);

    loop {
        tracing::debug!("Bin packing {} rectangles into {}x{}", sizes.len(), width, height);

        if let Some(placements) = pack_into(sizes, width, height) {
            let max_right = placements.iter().map(Rect::right).max().unwrap_or(1);
            let max_bottom = placements.iter().map(Rect::bottom).max().unwrap_or(1);

            return Ok(PackedAtlas {
                placements,
                canvas: (width, height),
                size: (
                    max_right.max(1).next_power_of_two(),
                    max_bottom.max(1).next_power_of_two(),
                ),
            });
        }

        match width.cmp(&height) {
            std::cmp::Ordering::Less => width *= 2,
            std::cmp::Ordering::Greater => height *= 2,
            std::cmp::Ordering::Equal => {
                width *= 2;
                height *= 2;
            }
        }

        if width > MAX_ATLAS_SIZE || height > MAX_ATLAS_SIZE {
            return Err(PackError::ExceedsMaximum {
                count: sizes.len(),
                max: MAX_ATLAS_SIZE,
            });
        }
    }
}
