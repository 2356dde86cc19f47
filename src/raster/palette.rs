use fxhash::FxHashMap;
use itertools::iproduct;
use thiserror::Error;

use super::bitmap::{
    ALPHA_OPAQUE, ALPHA_TRANSPARENT, Bitmap, MAX_COLORS, PixelData, true_color, true_color_alpha,
};
use super::hwb::hwb_diff;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteError {
    /// Every slot of the palette is in use.
    #[error("palette is full (256 colors allocated)")]
    Full,
}

/// One palette slot. An open slot has been deallocated and is reused by the
/// next allocation; its channel values are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// On [0, 127]: 0 opaque, 127 fully transparent.
    pub alpha: u8,
    pub(crate) open: bool,
}

impl ColorEntry {
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// A bounded palette of up to 256 RGBA entries. The entry count is a
/// high-water mark: deallocated slots stay in place, marked open, and are
/// reused before the table grows. Duplicate entries are permitted.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<ColorEntry>,
}

impl ColorTable {
    pub fn new() -> ColorTable {
        ColorTable {
            entries: Vec::new(),
        }
    }

    /// High-water mark of used slots, open slots included.
    pub fn colors_total(&self) -> usize {
        self.entries.len()
    }

    /// The entry at `index`, or `None` for open or never-allocated slots.
    pub fn get(&self, index: u8) -> Option<ColorEntry> {
        self.entries
            .get(index as usize)
            .copied()
            .filter(|e| !e.open)
    }

    /// Channel values at `index`, zeros for slots outside the high-water
    /// mark. Stale values of open slots are returned as-is.
    pub(crate) fn channels(&self, index: u8) -> (u8, u8, u8, u8) {
        self.entries
            .get(index as usize)
            .map_or((0, 0, 0, 0), |e| (e.red, e.green, e.blue, e.alpha))
    }

    pub(crate) fn set_alpha(&mut self, index: u8, alpha: u8) {
        if let Some(e) = self.entries.get_mut(index as usize) {
            e.alpha = alpha;
        }
    }

    /// Allocates a palette slot: the lowest open slot if any, otherwise a
    /// new one, otherwise `Err(Full)`.
    pub fn allocate(&mut self, r: u8, g: u8, b: u8, a: u8) -> Result<u8, PaletteError> {
        let slot = match self.entries.iter().position(|e| e.open) {
            Some(i) => i,
            None => {
                if self.entries.len() >= MAX_COLORS {
                    return Err(PaletteError::Full);
                }
                self.entries.push(ColorEntry {
                    red: 0,
                    green: 0,
                    blue: 0,
                    alpha: 0,
                    open: true,
                });
                self.entries.len() - 1
            }
        };
        self.entries[slot] = ColorEntry {
            red: r,
            green: g,
            blue: b,
            alpha: a,
            open: false,
        };
        Ok(slot as u8)
    }

    /// Marks a slot open. Slots outside the high-water mark are ignored.
    pub fn deallocate(&mut self, index: u8) {
        if let Some(e) = self.entries.get_mut(index as usize) {
            e.open = true;
        }
    }

    /// First non-open entry equal to the RGBA tuple bit for bit.
    pub fn exact_match(&self, r: u8, g: u8, b: u8, a: u8) -> Option<u8> {
        self.entries
            .iter()
            .position(|e| !e.open && e.red == r && e.green == g && e.blue == b && e.alpha == a)
            .map(|i| i as u8)
    }

    /// Entry with the smallest squared RGB distance to the query. Ties go to
    /// the lowest index; `None` on a palette with no usable entries.
    pub fn closest_match(&self, r: u8, g: u8, b: u8) -> Option<u8> {
        let mut best: Option<(u8, i64)> = None;
        for (i, e) in self.entries.iter().enumerate() {
            if e.open {
                continue;
            }
            let rd = e.red as i64 - r as i64;
            let gd = e.green as i64 - g as i64;
            let bd = e.blue as i64 - b as i64;
            let dist = rd * rd + gd * gd + bd * bd;
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i as u8, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Like [`closest_match`](ColorTable::closest_match) with the alpha
    /// delta included in the distance.
    pub fn closest_match_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Option<u8> {
        let mut best: Option<(u8, i64)> = None;
        for (i, e) in self.entries.iter().enumerate() {
            if e.open {
                continue;
            }
            let rd = e.red as i64 - r as i64;
            let gd = e.green as i64 - g as i64;
            let bd = e.blue as i64 - b as i64;
            let ad = e.alpha as i64 - a as i64;
            let dist = rd * rd + gd * gd + bd * bd + ad * ad;
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i as u8, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Closest entry under the HWB perceptual distance instead of the plain
    /// channel distance. Same contract as
    /// [`closest_match`](ColorTable::closest_match).
    pub fn closest_match_hwb(&self, r: u8, g: u8, b: u8) -> Option<u8> {
        let mut best: Option<(u8, f32)> = None;
        for (i, e) in self.entries.iter().enumerate() {
            if e.open {
                continue;
            }
            let dist = hwb_diff(e.red, e.green, e.blue, r, g, b);
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i as u8, dist));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn resolve(&mut self, r: u8, g: u8, b: u8) -> u8 {
        self.resolve_alpha(r, g, b, ALPHA_OPAQUE as u8)
    }

    /// Exact match if present, else allocation into an open or new slot,
    /// else (palette full) the closest RGBA match. A full palette always has
    /// usable entries, so this cannot fail.
    pub fn resolve_alpha(&mut self, r: u8, g: u8, b: u8, a: u8) -> u8 {
        let mut open_slot: Option<usize> = None;
        let mut closest: Option<(u8, i64)> = None;
        for (i, e) in self.entries.iter().enumerate() {
            if e.open {
                open_slot = Some(i);
                continue;
            }
            if e.red == r && e.green == g && e.blue == b && e.alpha == a {
                return i as u8;
            }
            let rd = e.red as i64 - r as i64;
            let gd = e.green as i64 - g as i64;
            let bd = e.blue as i64 - b as i64;
            let ad = e.alpha as i64 - a as i64;
            let dist = rd * rd + gd * gd + bd * bd + ad * ad;
            if closest.map_or(true, |(_, d)| dist < d) {
                closest = Some((i as u8, dist));
            }
        }
        let slot = match open_slot {
            Some(i) => i,
            None => {
                if self.entries.len() >= MAX_COLORS {
                    return closest.map_or(0, |(i, _)| i);
                }
                self.entries.push(ColorEntry {
                    red: 0,
                    green: 0,
                    blue: 0,
                    alpha: 0,
                    open: true,
                });
                self.entries.len() - 1
            }
        };
        self.entries[slot] = ColorEntry {
            red: r,
            green: g,
            blue: b,
            alpha: a,
            open: false,
        };
        slot as u8
    }
}

impl Bitmap {
    pub fn color_allocate(&mut self, r: u8, g: u8, b: u8) -> Result<i32, PaletteError> {
        self.color_allocate_alpha(r, g, b, ALPHA_OPAQUE as u8)
    }

    /// Allocates a color. On truecolor surfaces this is the packed ARGB
    /// value and cannot fail; on indexed surfaces it is a palette index and
    /// fails once all 256 slots are in use.
    pub fn color_allocate_alpha(&mut self, r: u8, g: u8, b: u8, a: u8) -> Result<i32, PaletteError> {
        if self.is_truecolor() {
            return Ok(true_color_alpha(r, g, b, a as i32));
        }
        self.palette.allocate(r, g, b, a).map(i32::from)
    }

    pub fn color_exact(&self, r: u8, g: u8, b: u8) -> Option<i32> {
        self.color_exact_alpha(r, g, b, ALPHA_OPAQUE as u8)
    }

    pub fn color_exact_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Option<i32> {
        if self.is_truecolor() {
            return Some(true_color_alpha(r, g, b, a as i32));
        }
        self.palette.exact_match(r, g, b, a).map(i32::from)
    }

    pub fn color_closest(&self, r: u8, g: u8, b: u8) -> Option<i32> {
        if self.is_truecolor() {
            return Some(true_color(r, g, b));
        }
        self.palette.closest_match(r, g, b).map(i32::from)
    }

    pub fn color_closest_alpha(&self, r: u8, g: u8, b: u8, a: u8) -> Option<i32> {
        if self.is_truecolor() {
            return Some(true_color_alpha(r, g, b, a as i32));
        }
        self.palette.closest_match_alpha(r, g, b, a).map(i32::from)
    }

    pub fn color_closest_hwb(&self, r: u8, g: u8, b: u8) -> Option<i32> {
        if self.is_truecolor() {
            return Some(true_color(r, g, b));
        }
        self.palette.closest_match_hwb(r, g, b).map(i32::from)
    }

    pub fn color_resolve(&mut self, r: u8, g: u8, b: u8) -> i32 {
        self.color_resolve_alpha(r, g, b, ALPHA_OPAQUE as u8)
    }

    pub fn color_resolve_alpha(&mut self, r: u8, g: u8, b: u8, a: u8) -> i32 {
        if self.is_truecolor() {
            return true_color_alpha(r, g, b, a as i32);
        }
        self.palette.resolve_alpha(r, g, b, a) as i32
    }

    /// Marks a palette slot open. No-op on truecolor surfaces and for
    /// indices outside `[0, 256)`.
    pub fn color_deallocate(&mut self, color: i32) {
        if self.is_truecolor() || color < 0 || color >= MAX_COLORS as i32 {
            return;
        }
        self.palette.deallocate(color as u8);
    }

    /// Designates `color` as the fully transparent color, or clears the
    /// designation. On indexed surfaces the previous transparent entry's
    /// alpha is restored to opaque and the new entry's set to transparent;
    /// out-of-range indices are ignored.
    pub fn set_transparent(&mut self, color: Option<i32>) {
        if !self.is_truecolor() {
            if let Some(c) = color {
                if c < 0 || c >= MAX_COLORS as i32 {
                    return;
                }
            }
            if let Some(prev) = self.transparent {
                if (0..MAX_COLORS as i32).contains(&prev) {
                    self.palette.set_alpha(prev as u8, ALPHA_OPAQUE as u8);
                }
            }
            if let Some(c) = color {
                self.palette.set_alpha(c as u8, ALPHA_TRANSPARENT as u8);
            }
        }
        self.transparent = color;
    }

    /// Replaces this surface's palette with `other`'s, remapping every pixel
    /// to the closest alpha-aware match in the incoming palette first. Both
    /// surfaces must be indexed; anything else is a no-op.
    pub fn copy_palette_from(&mut self, other: &Bitmap) {
        if self.is_truecolor() || other.is_truecolor() {
            return;
        }
        if other.palette.colors_total() == 0 {
            return;
        }
        let (w, h) = (self.width() as usize, self.height() as usize);
        let mut xlate: FxHashMap<u8, u8> = FxHashMap::default();
        let PixelData::Indexed(data) = &mut self.pixels else {
            return;
        };
        for (y, x) in iproduct!(0..h, 0..w) {
            let p = data[y * w + x];
            let mapped = match xlate.get(&p) {
                Some(&t) => t,
                None => {
                    let (r, g, b, a) = self.palette.channels(p);
                    let t = other.palette.closest_match_alpha(r, g, b, a).unwrap_or(0);
                    xlate.insert(p, t);
                    t
                }
            };
            data[y * w + x] = mapped;
        }
        self.palette = other.palette.clone();
    }
}
