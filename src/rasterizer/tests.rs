// src/rasterizer/tests.rs

use super::*;
use crate::color::NamedColor;
use proptest::prelude::*;
use std::collections::HashSet;
use test_log::test;

// --- Helpers ---

fn black(width: u32, height: u32) -> FrameBuffer {
    FrameBuffer::new(width, height, Color::BLACK).unwrap()
}

/// Coordinates of every pixel that is no longer black.
fn lit(fb: &FrameBuffer) -> HashSet<(i32, i32)> {
    let mut out = HashSet::new();
    for y in 0..fb.height() as i32 {
        for x in 0..fb.width() as i32 {
            if fb.get(x, y) != Some(Color::BLACK) {
                out.insert((x, y));
            }
        }
    }
    out
}

fn red() -> Color {
    NamedColor::Red.to_color()
}

// --- fill_rect ---

#[test]
fn fill_rect_covers_exact_region() {
    let mut fb = black(10, 10);
    let drawn = fill_rect(&mut fb, Rect::new(2, 3, 4, 2), red());
    assert_eq!(drawn, 8);
    let expected: HashSet<_> = (3..5)
        .flat_map(|y| (2..6).map(move |x| (x, y)))
        .collect();
    assert_eq!(lit(&fb), expected);
    assert!(expected.iter().all(|&(x, y)| fb.get(x, y) == Some(red())));
}

#[test]
fn fill_rect_clips_at_the_edges() {
    let mut fb = black(10, 10);
    assert_eq!(fill_rect(&mut fb, Rect::new(8, 8, 5, 5), red()), 4);
    assert_eq!(lit(&fb).len(), 4);
}

#[test]
fn fill_rect_off_grid_draws_nothing() {
    let mut fb = black(10, 10);
    assert_eq!(fill_rect(&mut fb, Rect::new(10, 0, 5, 5), red()), 0);
    assert_eq!(fill_rect(&mut fb, Rect::new(u16::MAX, u16::MAX, u16::MAX, u16::MAX), red()), 0);
    assert!(lit(&fb).is_empty());
}

#[test]
fn fill_rect_degenerate_draws_nothing() {
    let mut fb = black(10, 10);
    assert_eq!(fill_rect(&mut fb, Rect::new(2, 2, 0, 5), red()), 0);
    assert_eq!(fill_rect(&mut fb, Rect::point(4, 4), red()), 0);
    assert!(lit(&fb).is_empty());
}

#[test]
fn opaque_fill_is_idempotent() {
    let rect = Rect::new(1, 1, 6, 3);
    let mut once = black(8, 8);
    fill_rect(&mut once, rect, NamedColor::Green.into());
    let mut twice = once.clone();
    fill_rect(&mut twice, rect, NamedColor::Green.into());
    assert_eq!(once, twice);
}

#[test]
fn translucent_fill_blends() {
    let mut fb = FrameBuffer::new(2, 2, Color::opaque(0, 255, 0)).unwrap();
    fill_rect(&mut fb, Rect::new(0, 0, 2, 2), Color::new(255, 0, 0, 128));
    assert!(fb.pixels().iter().all(|&c| c == Color::new(128, 127, 0, 255)));
}

// --- draw_line ---

#[test]
fn horizontal_and_vertical_lines() {
    let h: Vec<_> = line_points(Rect::point(0, 0), Rect::point(3, 0)).collect();
    assert_eq!(h, vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
    let v: Vec<_> = line_points(Rect::point(2, 0), Rect::point(2, 3)).collect();
    assert_eq!(v, vec![(2, 0), (2, 1), (2, 2), (2, 3)]);
}

#[test]
fn diagonal_ties_step_both_axes() {
    let d: Vec<_> = line_points(Rect::point(0, 0), Rect::point(3, 3)).collect();
    assert_eq!(d, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
}

#[test]
fn shallow_line_path() {
    let pts: Vec<_> = line_points(Rect::point(0, 0), Rect::point(2, 1)).collect();
    assert_eq!(pts, vec![(0, 0), (1, 1), (2, 1)]);
}

#[test]
fn reversed_arguments_give_the_same_path() {
    let forward: Vec<_> = line_points(Rect::point(0, 0), Rect::point(2, 1)).collect();
    let backward: Vec<_> = line_points(Rect::point(2, 1), Rect::point(0, 0)).collect();
    assert_eq!(forward, backward);
}

#[test]
fn single_point_line() {
    let mut fb = black(4, 4);
    assert_eq!(draw_line(&mut fb, Rect::point(1, 2), Rect::point(1, 2), red()), 1);
    assert_eq!(lit(&fb), HashSet::from([(1, 2)]));
}

#[test]
fn line_is_clipped_to_the_grid() {
    let mut fb = black(10, 10);
    let drawn = draw_line(&mut fb, Rect::point(5, 5), Rect::point(20, 5), red());
    assert_eq!(drawn, 5);
    let expected: HashSet<_> = (5..10).map(|x| (x, 5)).collect();
    assert_eq!(lit(&fb), expected);
}

#[test]
fn long_line_is_eight_connected() {
    let pts: Vec<_> = line_points(Rect::point(350, 80), Rect::point(200, 400)).collect();
    assert_eq!(pts.first(), Some(&(350, 80)));
    assert_eq!(pts.last(), Some(&(200, 400)));
    assert_eq!(pts.len(), 321);
    for pair in pts.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
        assert_ne!(a, b);
    }
}

proptest! {
    #[test]
    fn prop_line_endpoints_are_drawn(x0 in 0u16..48, y0 in 0u16..48, x1 in 0u16..48, y1 in 0u16..48) {
        let mut fb = black(48, 48);
        draw_line(&mut fb, Rect::point(x0, y0), Rect::point(x1, y1), red());
        prop_assert_eq!(fb.get(i32::from(x0), i32::from(y0)), Some(red()));
        prop_assert_eq!(fb.get(i32::from(x1), i32::from(y1)), Some(red()));
    }

    #[test]
    fn prop_line_pixel_set_is_order_independent(x0 in 0u16..48, y0 in 0u16..48, x1 in 0u16..48, y1 in 0u16..48) {
        let mut a = black(48, 48);
        let mut b = black(48, 48);
        draw_line(&mut a, Rect::point(x0, y0), Rect::point(x1, y1), red());
        draw_line(&mut b, Rect::point(x1, y1), Rect::point(x0, y0), red());
        prop_assert_eq!(lit(&a), lit(&b));
    }
}

// --- blit_sprite ---

#[test]
fn sprite_lands_row_major() {
    let mut fb = black(5, 5);
    let sprite = [
        NamedColor::Red.to_color(),
        NamedColor::Green.to_color(),
        NamedColor::Blue.to_color(),
        NamedColor::White.to_color(),
    ];
    let drawn = blit_sprite(&mut fb, Rect::new(1, 2, 2, 2), &sprite).unwrap();
    assert_eq!(drawn, 4);
    assert_eq!(fb.get(1, 2), Some(sprite[0]));
    assert_eq!(fb.get(2, 2), Some(sprite[1]));
    assert_eq!(fb.get(1, 3), Some(sprite[2]));
    assert_eq!(fb.get(2, 3), Some(sprite[3]));
    assert_eq!(lit(&fb).len(), 4);
}

#[test]
fn sprite_is_clipped_per_pixel() {
    let mut fb = black(4, 4);
    let sprite = vec![red(); 9];
    let drawn = blit_sprite(&mut fb, Rect::new(3, 3, 3, 3), &sprite).unwrap();
    assert_eq!(drawn, 1);
    assert_eq!(lit(&fb), HashSet::from([(3, 3)]));
}

#[test]
fn sprite_size_mismatch_draws_nothing() {
    let mut fb = black(4, 4);
    let err = blit_sprite(&mut fb, Rect::new(0, 0, 2, 2), &[red(); 3]).unwrap_err();
    assert!(matches!(
        err,
        DrawError::SpriteSizeMismatch { expected: 4, actual: 3 }
    ));
    assert!(lit(&fb).is_empty());
}

#[test]
fn sprite_alpha_is_blended() {
    let mut fb = FrameBuffer::new(2, 1, Color::opaque(0, 255, 0)).unwrap();
    let sprite = [Color::new(255, 0, 0, 128), Color::TRANSPARENT];
    blit_sprite(&mut fb, Rect::new(0, 0, 2, 1), &sprite).unwrap();
    assert_eq!(fb.get(0, 0), Some(Color::new(128, 127, 0, 255)));
    assert_eq!(fb.get(1, 0), Some(Color::opaque(0, 255, 0)));
}

#[test]
fn empty_sprite_is_accepted() {
    let mut fb = black(2, 2);
    assert_eq!(blit_sprite(&mut fb, Rect::new(1, 1, 0, 3), &[]).unwrap(), 0);
}
