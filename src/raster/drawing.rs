use super::bitmap::{
    ALPHA_MAX, ALPHA_OPAQUE, ALPHA_TRANSPARENT, Bitmap, ClipRect, MAX_COLORS, PixelData,
    true_color_alpha, true_color_get_alpha, true_color_get_blue, true_color_get_green,
    true_color_get_red,
};

/// Weighted blend of a packed source color over a packed destination color.
/// Alpha is on [0, 127] with 0 opaque.
pub(crate) fn alpha_blend(dst: i32, src: i32) -> i32 {
    let src_alpha = true_color_get_alpha(src);
    if src_alpha == ALPHA_OPAQUE {
        return src;
    }
    let dst_alpha = true_color_get_alpha(dst);
    if src_alpha == ALPHA_TRANSPARENT {
        return dst;
    }
    if dst_alpha == ALPHA_TRANSPARENT {
        return src;
    }

    let alpha = src_alpha * dst_alpha / ALPHA_MAX;
    let src_weight = ALPHA_TRANSPARENT - src_alpha;
    let dst_weight = (ALPHA_TRANSPARENT - dst_alpha) * src_alpha / ALPHA_MAX;
    let tot_weight = src_weight + dst_weight;

    let red = (true_color_get_red(src) as i32 * src_weight
        + true_color_get_red(dst) as i32 * dst_weight)
        / tot_weight;
    let green = (true_color_get_green(src) as i32 * src_weight
        + true_color_get_green(dst) as i32 * dst_weight)
        / tot_weight;
    let blue = (true_color_get_blue(src) as i32 * src_weight
        + true_color_get_blue(dst) as i32 * dst_weight)
        / tot_weight;

    true_color_alpha(red as u8, green as u8, blue as u8, alpha)
}

impl Bitmap {
    /// True when (x, y) lies inside the clip rectangle. The clip starts out
    /// covering the whole surface.
    pub fn bounds_safe(&self, x: i32, y: i32) -> bool {
        x >= self.clip.left && x <= self.clip.right && y >= self.clip.top && y <= self.clip.bottom
    }

    /// The pixel value at (x, y): a palette index or a packed ARGB value.
    /// Reads outside the clip rectangle return 0.
    pub fn get_pixel(&self, x: i32, y: i32) -> i32 {
        if !self.bounds_safe(x, y) {
            return 0;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        match &self.pixels {
            PixelData::Indexed(data) => data[idx] as i32,
            PixelData::Direct(data) => data[idx],
        }
    }

    /// The pixel at (x, y) as a packed ARGB value regardless of surface
    /// mode; palette indices are translated through the palette.
    pub fn get_truecolor_pixel(&self, x: i32, y: i32) -> i32 {
        let p = self.get_pixel(x, y);
        if self.is_truecolor() {
            return p;
        }
        let (r, g, b, a) = self.palette.channels(p as u8);
        true_color_alpha(r, g, b, a as i32)
    }

    /// Writes a pixel. Writes outside the clip rectangle, negative color
    /// values, and palette-mode colors outside [0, 256) are dropped. On
    /// truecolor surfaces the write blends when alpha blending is enabled
    /// and overwrites otherwise.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: i32) {
        if color < 0 || !self.bounds_safe(x, y) {
            return;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        let blending = self.alpha_blending;
        match &mut self.pixels {
            PixelData::Indexed(data) => {
                if color < MAX_COLORS as i32 {
                    data[idx] = color as u8;
                }
            }
            PixelData::Direct(data) => {
                data[idx] = if blending {
                    alpha_blend(data[idx], color)
                } else {
                    color
                };
            }
        }
    }

    /// Restricts reads and writes to the given inclusive rectangle. Corners
    /// are clamped to the surface bounds.
    pub fn set_clip(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let w = self.width() as i32;
        let h = self.height() as i32;
        if w == 0 || h == 0 {
            return;
        }
        self.clip = ClipRect {
            left: x1.clamp(0, w - 1),
            top: y1.clamp(0, h - 1),
            right: x2.clamp(0, w - 1),
            bottom: y2.clamp(0, h - 1),
        };
    }

    pub fn clip(&self) -> ClipRect {
        self.clip
    }

    /// Bresenham line between two points, inclusive of both endpoints.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: i32) {
        let dx = (x2 - x1).abs();
        let sx = if x1 < x2 { 1 } else { -1 };
        let dy = -(y2 - y1).abs();
        let sy = if y1 < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x1, y1);
        loop {
            self.set_pixel(x, y, color);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Rectangle outline with inclusive corners.
    pub fn rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: i32) {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        for x in x1..=x2 {
            self.set_pixel(x, y1, color);
            self.set_pixel(x, y2, color);
        }
        for y in y1..=y2 {
            self.set_pixel(x1, y, color);
            self.set_pixel(x2, y, color);
        }
    }

    /// Solid rectangle with inclusive corners.
    pub fn filled_rectangle(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: i32) {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        let (y1, y2) = if y1 > y2 { (y2, y1) } else { (y1, y2) };
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(self.width() as i32 - 1);
        let y2 = y2.min(self.height() as i32 - 1);
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.set_pixel(x, y, color);
            }
        }
    }
}
