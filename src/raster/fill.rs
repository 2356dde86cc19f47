use fxhash::FxHashMap;
use log::warn;

use super::bitmap::{
    Bitmap, TILED, true_color_alpha, true_color_get_alpha, true_color_get_blue,
    true_color_get_green, true_color_get_red,
};
use super::mask::BitmapMask;

/// A horizontal run of same-colored pixels on row `y`, spanning columns
/// `xl..=xr`, still to be expanded into row `y + dy`.
#[derive(Debug, Clone, Copy)]
struct FillSegment {
    y: i32,
    xl: i32,
    xr: i32,
    dy: i32,
}

/// Bounded LIFO of pending fill segments. Pushes past the capacity, or whose
/// target row falls outside the fill region, are silently dropped: on
/// pathological shapes the fill degrades to a partial fill instead of
/// growing without bound.
struct SegmentStack {
    segments: Vec<FillSegment>,
    capacity: usize,
    y_min: i32,
    y_max: i32,
}

impl SegmentStack {
    fn new(capacity: usize, y_min: i32, y_max: i32) -> SegmentStack {
        SegmentStack {
            segments: Vec::new(),
            capacity,
            y_min,
            y_max,
        }
    }

    fn push(&mut self, y: i32, xl: i32, xr: i32, dy: i32) {
        if self.segments.len() < self.capacity && y + dy >= self.y_min && y + dy <= self.y_max {
            self.segments.push(FillSegment { y, xl, xr, dy });
        }
    }

    fn pop(&mut self) -> Option<FillSegment> {
        self.segments.pop()
    }
}

/// Checked segment-stack capacity: (width * height) / 4 segments. `None`
/// when the byte size of the stack would overflow.
fn stack_capacity(width: u32, height: u32) -> Option<usize> {
    let area = (width as usize).checked_mul(height as usize)?;
    area.checked_mul(size_of::<FillSegment>())?;
    Some(area / 4)
}

impl Bitmap {
    /// Flood fills the 4-connected region of uniform color around (x, y)
    /// with `color`. Filling a region that already has the target color is a
    /// no-op, as is a seed outside the surface or clip rectangle or, on
    /// indexed surfaces, a color index beyond the palette's high-water mark.
    /// Passing [`TILED`] fills from the surface's tile instead. The fill is
    /// confined to the clip rectangle.
    ///
    /// The segment stack is capped at (width * height) / 4 entries; on
    /// pathological inputs the fill may be left incomplete rather than
    /// exceeding the cap. Alpha blending is suspended for the duration of
    /// the call and restored on every exit path.
    pub fn fill(&mut self, x: i32, y: i32, color: i32) {
        if !self.is_truecolor() && color != TILED && color > self.palette.colors_total() as i32 - 1
        {
            return;
        }
        if color < 0 && color != TILED {
            return;
        }

        let restore = self.alpha_blending;
        self.alpha_blending = false;
        if color == TILED {
            self.fill_tiled_inner(x, y);
        } else {
            self.fill_solid(x, y, color);
        }
        self.alpha_blending = restore;
    }

    /// Flood fills from the surface's tile, sampling it with wraparound
    /// addressing. No-op without a tile or with a zero-sized one.
    pub fn fill_tiled(&mut self, x: i32, y: i32) {
        let restore = self.alpha_blending;
        self.alpha_blending = false;
        self.fill_tiled_inner(x, y);
        self.alpha_blending = restore;
    }

    /// Fills the region around (x, y) bounded by `border`-colored pixels
    /// with `color`, leaving the border pixels untouched. Negative
    /// (non-solid) border markers are rejected. Works from an explicit seed
    /// queue, so recursion depth does not scale with image height.
    pub fn fill_to_border(&mut self, x: i32, y: i32, border: i32, color: i32) {
        if border < 0 {
            return;
        }
        let restore = self.alpha_blending;
        self.alpha_blending = false;
        self.border_fill(x, y, border, color);
        self.alpha_blending = restore;
    }

    fn fill_solid(&mut self, x: i32, y: i32, nc: i32) {
        let clip = self.clip;
        if x < clip.left || x > clip.right || y < clip.top || y > clip.bottom {
            return;
        }
        let oc = self.get_pixel(x, y);
        if oc == nc {
            return;
        }

        // Tiny surfaces skip the segment machinery: overwrite matching
        // pixels row by row from the seed, stopping at the first mismatch.
        if (self.width() as i32) < 4 {
            let mut iy = y;
            'rows: while iy <= clip.bottom {
                let mut ix = x;
                while ix <= clip.right {
                    if self.get_pixel(ix, iy) != oc {
                        break 'rows;
                    }
                    self.set_pixel(ix, iy, nc);
                    ix += 1;
                }
                iy += 1;
            }
            return;
        }

        let Some(capacity) = stack_capacity(self.width(), self.height()) else {
            warn!(
                "fill aborted: segment stack for {}x{} surface overflows",
                self.width(),
                self.height()
            );
            return;
        };
        let mut stack = SegmentStack::new(capacity, clip.top, clip.bottom);

        stack.push(y, x, x, 1);
        // Seed segment, popped first.
        stack.push(y + 1, x, x, -1);
        while let Some(seg) = stack.pop() {
            let dy = seg.dy;
            let y = seg.y + dy;
            let (x1, x2) = (seg.xl, seg.xr);

            let mut x = x1;
            while x >= clip.left && self.get_pixel(x, y) == oc {
                self.set_pixel(x, y, nc);
                x -= 1;
            }
            let mut skip = x >= x1;
            let mut l = x + 1;
            if !skip {
                // Leak on left?
                if l < x1 {
                    stack.push(y, l, x1 - 1, -dy);
                }
                x = x1 + 1;
            }
            loop {
                if !skip {
                    while x <= clip.right && self.get_pixel(x, y) == oc {
                        self.set_pixel(x, y, nc);
                        x += 1;
                    }
                    stack.push(y, l, x - 1, dy);
                    // Leak on right?
                    if x > x2 + 1 {
                        stack.push(y, x2 + 1, x - 1, -dy);
                    }
                }
                skip = false;
                x += 1;
                while x <= x2 && self.get_pixel(x, y) != oc {
                    x += 1;
                }
                l = x;
                if x > x2 {
                    break;
                }
            }
        }
    }

    fn fill_tiled_inner(&mut self, x: i32, y: i32) {
        let Some(tile) = self.tile.take() else {
            return;
        };
        self.tiled_fill_with(&tile, x, y);
        self.tile = Some(tile);
    }

    fn tiled_fill_with(&mut self, tile: &Bitmap, x: i32, y: i32) {
        if tile.width() == 0 || tile.height() == 0 {
            return;
        }
        let clip = self.clip;
        if x < clip.left || x > clip.right || y < clip.top || y > clip.bottom {
            return;
        }
        let Some(capacity) = stack_capacity(self.width(), self.height()) else {
            warn!(
                "tiled fill aborted: segment stack for {}x{} surface overflows",
                self.width(),
                self.height()
            );
            return;
        };

        // The tile can reproduce the color being replaced, so a color test
        // alone cannot tell filled pixels apart; every write is recorded in
        // the visited mask and each pixel is written at most once.
        let mut visited = BitmapMask::new(self.width(), self.height(), false);
        let mut translated: FxHashMap<i32, i32> = FxHashMap::default();
        let mut stack = SegmentStack::new(capacity, clip.top, clip.bottom);
        let oc = self.get_pixel(x, y);

        stack.push(y, x, x, 1);
        // Seed segment, popped first.
        stack.push(y + 1, x, x, -1);
        while let Some(seg) = stack.pop() {
            let dy = seg.dy;
            let y = seg.y + dy;
            let (x1, x2) = (seg.xl, seg.xr);

            let mut x = x1;
            while x >= clip.left && !visited.get_bit(x, y) && self.get_pixel(x, y) == oc {
                let nc = self.tile_color_at(tile, &mut translated, x, y);
                visited.set_bit(x, y, true);
                self.set_pixel(x, y, nc);
                x -= 1;
            }
            let mut skip = x >= x1;
            let mut l = x + 1;
            if !skip {
                if l < x1 {
                    stack.push(y, l, x1 - 1, -dy);
                }
                x = x1 + 1;
            }
            loop {
                if !skip {
                    while x <= clip.right && !visited.get_bit(x, y) && self.get_pixel(x, y) == oc {
                        let nc = self.tile_color_at(tile, &mut translated, x, y);
                        visited.set_bit(x, y, true);
                        self.set_pixel(x, y, nc);
                        x += 1;
                    }
                    stack.push(y, l, x - 1, dy);
                    if x > x2 + 1 {
                        stack.push(y, x2 + 1, x - 1, -dy);
                    }
                }
                skip = false;
                x += 1;
                while x <= x2 && (visited.get_bit(x, y) || self.get_pixel(x, y) != oc) {
                    x += 1;
                }
                l = x;
                if x > x2 {
                    break;
                }
            }
        }
    }

    /// The replacement color for (x, y): the tile pixel at the wrapped
    /// coordinate, translated into this surface's representation. The tile's
    /// transparent color maps to this surface's transparent color when one
    /// is set; translations are memoized per distinct tile pixel value.
    fn tile_color_at(
        &mut self,
        tile: &Bitmap,
        translated: &mut FxHashMap<i32, i32>,
        x: i32,
        y: i32,
    ) -> i32 {
        let srcx = x % tile.width() as i32;
        let srcy = y % tile.height() as i32;
        let p = tile.get_pixel(srcx, srcy);

        if tile.transparent() == Some(p) {
            if let Some(t) = self.transparent {
                return t;
            }
        }
        if let Some(&c) = translated.get(&p) {
            return c;
        }

        let c = if self.is_truecolor() {
            if tile.is_truecolor() {
                p
            } else {
                let (r, g, b, a) = tile.palette.channels(p as u8);
                true_color_alpha(r, g, b, a as i32)
            }
        } else if tile.is_truecolor() {
            self.palette.resolve_alpha(
                true_color_get_red(p),
                true_color_get_green(p),
                true_color_get_blue(p),
                true_color_get_alpha(p) as u8,
            ) as i32
        } else {
            let (r, g, b, a) = tile.palette.channels(p as u8);
            self.palette.resolve_alpha(r, g, b, a) as i32
        };
        translated.insert(p, c);
        c
    }

    fn border_fill(&mut self, x: i32, y: i32, border: i32, color: i32) {
        let clip = self.clip;
        if x < clip.left || x > clip.right || y < clip.top || y > clip.bottom {
            return;
        }

        let mut seeds: Vec<(i32, i32)> = vec![(x, y)];
        while let Some((x, y)) = seeds.pop() {
            // Seek left, painting as we go. A seed sitting on the border
            // paints nothing and is abandoned.
            let mut left_limit = -1;
            let mut i = x;
            while i >= clip.left && self.get_pixel(i, y) != border {
                self.set_pixel(i, y, color);
                left_limit = i;
                i -= 1;
            }
            if left_limit == -1 {
                continue;
            }

            // Seek right.
            let mut right_limit = x;
            let mut i = x + 1;
            while i <= clip.right && self.get_pixel(i, y) != border {
                self.set_pixel(i, y, color);
                right_limit = i;
                i += 1;
            }

            // One seed per transition from border-or-filled to unfilled in
            // the rows above and below the painted span.
            for ny in [y - 1, y + 1] {
                if ny < clip.top || ny > clip.bottom {
                    continue;
                }
                let mut last_border = true;
                for i in left_limit..=right_limit {
                    let c = self.get_pixel(i, ny);
                    if last_border {
                        if c != border && c != color {
                            seeds.push((i, ny));
                            last_border = false;
                        }
                    } else if c == border || c == color {
                        last_border = true;
                    }
                }
            }
        }
    }
}
