//! 5x7 bitmap glyphs for the scene labels, rasterized to rects.

use super::math::Rect;

const ROWS: usize = 7;
const COLS: u32 = 5;
/// Font size to pixel scale: a cell plus spacing is nine units tall.
const EM_UNITS: f32 = 9.0;

// Rows top to bottom, bit 4 is the leftmost column.
const GLYPHS: &[(char, [u8; ROWS])] = &[
    (' ', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('a', [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111]),
    ('c', [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('d', [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111]),
    ('e', [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110]),
    ('g', [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110]),
    ('i', [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('l', [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('n', [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001]),
    ('o', [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('r', [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000]),
    ('s', [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110]),
    ('t', [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110]),
    ('u', [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101]),
    ('x', [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001]),
    ('y', [0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b10001, 0b01110]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    ('%', [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011]),
    ('₀', [0b00000, 0b00000, 0b00000, 0b01110, 0b01010, 0b01010, 0b01110]),
    ('δ', [0b01110, 0b01000, 0b00100, 0b01110, 0b10001, 0b10001, 0b01110]),
];

// Drawn for anything missing from the table.
const MISSING: [u8; ROWS] = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

pub fn glyph(c: char) -> Option<&'static [u8; ROWS]> {
    GLYPHS.iter().find(|(g, _)| *g == c).map(|(_, rows)| rows)
}

pub fn pixel_size(font_size: f32) -> f32 {
    font_size / EM_UNITS
}

/// Horizontal advance of `text` at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let px = pixel_size(font_size);
    let n = text.chars().count() as f32;
    if n == 0.0 {
        0.0
    } else {
        n * (COLS as f32 + 1.0) * px - px
    }
}

/// Pixel rects for `text` with its baseline-left at `(x, y)`, the SVG text convention.
/// Bold text doubles each pixel a fraction to the right.
pub fn rasterize(text: &str, x: f32, y: f32, font_size: f32, bold: bool) -> Vec<Rect> {
    let px = pixel_size(font_size);
    let top = y - ROWS as f32 * px;
    let advance = (COLS as f32 + 1.0) * px;
    let extra = if bold { px * 0.4 } else { 0.0 };

    let mut rects = Vec::new();
    for (i, c) in text.chars().enumerate() {
        let rows = glyph(c).unwrap_or(&MISSING);
        let left = x + i as f32 * advance;
        for (row, &bits) in rows.iter().enumerate() {
            // Merge horizontal runs so a glyph row is at most a few rects.
            let mut col = 0;
            while col < COLS {
                if bits & (1u8 << (COLS - 1 - col)) == 0 {
                    col += 1;
                    continue;
                }
                let run_start = col;
                while col < COLS && bits & (1u8 << (COLS - 1 - col)) != 0 {
                    col += 1;
                }
                rects.push(Rect::new(
                    left + run_start as f32 * px,
                    top + row as f32 * px,
                    (col - run_start) as f32 * px + extra,
                    px,
                ));
            }
        }
    }
    rects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{BOUNDARY_LABEL, END_LABEL, SOURCE_LABEL, START_LABEL, TARGET_LABEL};

    #[test]
    fn every_label_character_has_a_glyph() {
        let labels = [BOUNDARY_LABEL, SOURCE_LABEL, TARGET_LABEL, START_LABEL, END_LABEL, "Progress: 100%"];
        for label in labels {
            for c in label.chars() {
                assert!(glyph(c).is_some(), "no glyph for {c:?} in {label:?}");
            }
        }
        for d in '0'..='9' {
            assert!(glyph(d).is_some());
        }
    }

    #[test]
    fn glyph_rows_fit_five_columns() {
        for (c, rows) in GLYPHS {
            assert!(rows.iter().all(|r| *r < 32), "{c:?} is wider than five columns");
        }
    }

    #[test]
    fn runs_are_merged() {
        // '-' is one full-width run on the middle row.
        let rects = rasterize("-", 0.0, 63.0, 81.0, false);
        assert_eq!(rects.len(), 1);
        let r = rects[0];
        assert_eq!(r.width, 45.0);
        assert_eq!(r.height, 9.0);
        assert_eq!(r.y, 27.0);
    }

    #[test]
    fn text_sits_on_its_baseline() {
        let rects = rasterize("l", 10.0, 100.0, 18.0, true);
        let bottom = rects.iter().map(|r| r.y + r.height).fold(f32::MIN, f32::max);
        assert!((bottom - 100.0).abs() < 1e-3);
        assert!(rects.iter().all(|r| r.x >= 10.0));
    }

    #[test]
    fn width_grows_with_length() {
        assert_eq!(text_width("", 18.0), 0.0);
        assert!(text_width("Class Ci", 18.0) > text_width("Ci", 18.0));
        assert!((text_width("a", 9.0) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn spaces_draw_nothing() {
        assert!(rasterize("   ", 0.0, 0.0, 14.0, false).is_empty());
    }
}
