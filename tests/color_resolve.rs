use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use scanfill::{
    Bitmap, ColorTable, PaletteError, hwb_diff, true_color, true_color_alpha,
    true_color_get_alpha, true_color_get_blue, true_color_get_green, true_color_get_red,
};

#[test]
fn test_allocate_then_exact_match() {
    let mut table = ColorTable::new();
    let idx = table.allocate(10, 20, 30, 0).unwrap();
    assert_eq!(table.exact_match(10, 20, 30, 0), Some(idx));
}

#[test]
fn test_exact_match_requires_alpha() {
    let mut table = ColorTable::new();
    table.allocate(10, 20, 30, 0).unwrap();
    assert_eq!(table.exact_match(10, 20, 30, 50), None);
    assert_eq!(table.exact_match(11, 20, 30, 0), None);
}

#[test]
fn test_deallocate_reuses_lowest_open_slot() {
    let mut table = ColorTable::new();
    table.allocate(1, 1, 1, 0).unwrap();
    table.allocate(2, 2, 2, 0).unwrap();
    table.allocate(3, 3, 3, 0).unwrap();

    table.deallocate(1);
    assert_eq!(table.exact_match(2, 2, 2, 0), None);

    let idx = table.allocate(9, 9, 9, 0).unwrap();
    assert_eq!(idx, 1);
    assert_eq!(table.colors_total(), 3);
}

#[test]
fn test_deallocate_out_of_range_ignored() {
    let mut table = ColorTable::new();
    table.allocate(1, 2, 3, 0).unwrap();
    table.deallocate(200);
    assert_eq!(table.colors_total(), 1);
    assert_eq!(table.exact_match(1, 2, 3, 0), Some(0));
}

#[test]
fn test_closest_single_entry_always_wins() {
    let mut table = ColorTable::new();
    table.allocate(100, 100, 100, 0).unwrap();
    assert_eq!(table.closest_match(0, 0, 0), Some(0));
    assert_eq!(table.closest_match(255, 255, 255), Some(0));
    assert_eq!(table.closest_match_hwb(0, 0, 0), Some(0));
    assert_eq!(table.closest_match_hwb(255, 0, 255), Some(0));
}

#[test]
fn test_closest_empty_palette_is_none() {
    let table = ColorTable::new();
    assert_eq!(table.closest_match(1, 2, 3), None);
    assert_eq!(table.closest_match_hwb(1, 2, 3), None);
}

#[test]
fn test_closest_tie_resolves_to_first_entry() {
    let mut table = ColorTable::new();
    table.allocate(50, 50, 50, 0).unwrap();
    table.allocate(50, 50, 50, 0).unwrap();
    assert_eq!(table.closest_match(60, 60, 60), Some(0));
}

#[test]
fn test_closest_skips_open_slots() {
    let mut table = ColorTable::new();
    table.allocate(0, 0, 0, 0).unwrap();
    table.allocate(200, 200, 200, 0).unwrap();
    table.deallocate(0);
    assert_eq!(table.closest_match(0, 0, 0), Some(1));
}

#[test]
fn test_palette_full_after_256_colors() {
    let mut table = ColorTable::new();
    for i in 0..=255u8 {
        assert!(table.allocate(i, 0, 0, 0).is_ok());
    }
    assert_eq!(table.allocate(0, 1, 2, 0), Err(PaletteError::Full));
    assert_eq!(table.colors_total(), 256);
}

#[test]
fn test_resolve_allocates_then_finds_exact() {
    let mut table = ColorTable::new();
    assert_eq!(table.resolve(5, 6, 7), 0);
    assert_eq!(table.colors_total(), 1);
    assert_eq!(table.resolve(5, 6, 7), 0);
    assert_eq!(table.resolve(8, 9, 10), 1);
    assert_eq!(table.colors_total(), 2);
}

#[test]
fn test_resolve_on_full_palette_degrades_to_closest() {
    let mut table = ColorTable::new();
    table.allocate(0, 0, 0, 0).unwrap();
    for _ in 1..256 {
        table.allocate(255, 255, 255, 0).unwrap();
    }
    assert_eq!(table.resolve(10, 10, 10), 0);
    assert_eq!(table.colors_total(), 256);
}

#[test]
fn test_closest_hwb_prefers_matching_hue() {
    let mut table = ColorTable::new();
    table.allocate(255, 0, 0, 0).unwrap(); // red
    table.allocate(0, 0, 255, 0).unwrap(); // blue
    assert_eq!(table.closest_match_hwb(255, 128, 0), Some(0), "orange is nearer red");
    assert_eq!(table.closest_match_hwb(0, 128, 255), Some(1), "azure is nearer blue");
}

#[test]
fn test_hwb_diff_zero_for_identical_colors() {
    assert_eq!(hwb_diff(0, 0, 0, 0, 0, 0), 0.0);
    assert_eq!(hwb_diff(255, 128, 7, 255, 128, 7), 0.0);
}

#[test]
fn test_hwb_diff_symmetric() {
    let mut rng = SmallRng::seed_from_u64(0x5ca_f111);
    for _ in 0..500 {
        let (r1, g1, b1) = (rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>());
        let (r2, g2, b2) = (rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>());
        let d1 = hwb_diff(r1, g1, b1, r2, g2, b2);
        let d2 = hwb_diff(r2, g2, b2, r1, g1, b1);
        assert_eq!(d1, d2, "asymmetric for ({r1},{g1},{b1}) vs ({r2},{g2},{b2})");
        assert!(d1 >= 0.0);
    }
}

#[test]
fn test_truecolor_surface_packs_directly() {
    let mut bmp = Bitmap::new_truecolor(1, 1);
    let c = bmp.color_allocate_alpha(10, 20, 30, 40).unwrap();
    assert_eq!(c, true_color_alpha(10, 20, 30, 40));
    assert_eq!(true_color_get_red(c), 10);
    assert_eq!(true_color_get_green(c), 20);
    assert_eq!(true_color_get_blue(c), 30);
    assert_eq!(true_color_get_alpha(c), 40);

    assert_eq!(bmp.color_exact_alpha(10, 20, 30, 40), Some(c));
    assert_eq!(bmp.color_closest(10, 20, 30), Some(true_color(10, 20, 30)));
    // Palette bookkeeping does not apply to truecolor surfaces.
    bmp.color_deallocate(c);
    assert_eq!(bmp.palette.colors_total(), 0);
}

#[test]
fn test_set_transparent_toggles_entry_alpha() {
    let mut bmp = Bitmap::new_palette(1, 1);
    bmp.color_allocate(0, 0, 0).unwrap();
    bmp.color_allocate(255, 255, 255).unwrap();

    bmp.set_transparent(Some(1));
    assert_eq!(bmp.transparent(), Some(1));
    assert_eq!(bmp.palette.get(1).unwrap().alpha, 127);

    bmp.set_transparent(Some(0));
    assert_eq!(bmp.transparent(), Some(0));
    assert_eq!(bmp.palette.get(0).unwrap().alpha, 127);
    assert_eq!(bmp.palette.get(1).unwrap().alpha, 0);

    bmp.set_transparent(None);
    assert_eq!(bmp.transparent(), None);
    assert_eq!(bmp.palette.get(0).unwrap().alpha, 0);
}

#[test]
fn test_set_transparent_out_of_range_ignored() {
    let mut bmp = Bitmap::new_palette(1, 1);
    bmp.color_allocate(0, 0, 0).unwrap();
    bmp.set_transparent(Some(300));
    assert_eq!(bmp.transparent(), None);
}

#[test]
fn test_copy_palette_remaps_pixels() {
    let mut dst = Bitmap::new_palette(2, 1);
    dst.color_allocate(0, 0, 0).unwrap(); // 0: black
    dst.color_allocate(255, 255, 255).unwrap(); // 1: white
    dst.set_pixel(1, 0, 1);

    let mut src = Bitmap::new_palette(1, 1);
    src.color_allocate(255, 255, 255).unwrap(); // 0: white
    src.color_allocate(0, 0, 0).unwrap(); // 1: black

    dst.copy_palette_from(&src);

    // Pixels now index the incoming palette's nearest entries.
    assert_eq!(dst.get_pixel(0, 0), 1);
    assert_eq!(dst.get_pixel(1, 0), 0);
    let white = dst.palette.get(0).unwrap();
    assert_eq!((white.red, white.green, white.blue), (255, 255, 255));
    let black = dst.palette.get(1).unwrap();
    assert_eq!((black.red, black.green, black.blue), (0, 0, 0));
}

#[test]
fn test_copy_palette_truecolor_noop() {
    let mut dst = Bitmap::new_truecolor(2, 2);
    let mut src = Bitmap::new_palette(1, 1);
    src.color_allocate(1, 2, 3).unwrap();
    dst.copy_palette_from(&src);
    assert_eq!(dst.palette.colors_total(), 0);
}
