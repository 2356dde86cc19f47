//! Scanline flood fill and palette color resolution for 2D raster surfaces.
//!
//! A [`Bitmap`] is either palette-indexed (up to 256 colors) or truecolor
//! (packed ARGB). The crate provides the color-table management and matching
//! operations (exact, closest, closest-HWB, resolve-or-allocate) and a
//! scanline seed fill engine with solid, border-bounded and tiled variants.

pub mod raster;

pub use raster::bitmap::{
    ALPHA_MAX, ALPHA_OPAQUE, ALPHA_TRANSPARENT, Bitmap, ClipRect, MAX_COLORS, TILED, true_color,
    true_color_alpha, true_color_get_alpha, true_color_get_blue, true_color_get_green,
    true_color_get_red,
};
pub use raster::hwb::{Hwb, hwb_diff};
pub use raster::mask::BitmapMask;
pub use raster::palette::{ColorEntry, ColorTable, PaletteError};
