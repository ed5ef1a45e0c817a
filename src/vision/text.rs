//! Caption rendering with a built-in 5x7 bitmap font.

use image::{Rgb, RgbImage};

const GLYPH_WIDTH: i64 = 5;
const GLYPH_HEIGHT: i64 = 7;
const ADVANCE: i64 = GLYPH_WIDTH + 1;
/// Font cells per unit of scale, so scale 1.0 is roughly 21px tall.
const CELLS_PER_SCALE: f64 = 3.0;

fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        ' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '#' => [0x0A, 0x0A, 0x1F, 0x0A, 0x1F, 0x0A, 0x0A],
        '*' => [0x00, 0x04, 0x15, 0x0E, 0x15, 0x04, 0x00],
        // anything else renders as '?'
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, size: i64, color: Rgb<u8>) {
    let x_start = x.max(0);
    let y_start = y.max(0);
    let x_end = (x + size).min(image.width() as i64);
    let y_end = (y + size).min(image.height() as i64);

    for py in y_start..y_end {
        for px in x_start..x_end {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn cell_size(scale: f64) -> i64 {
    ((scale * CELLS_PER_SCALE).round() as i64).max(1)
}

/// Draws `text` with its baseline-left corner at `(x, y)`.
///
/// `thickness` widens every stroke by `(thickness - 1) / 2` pixels on each side.
/// Anything falling off the image is clipped.
pub fn draw_text(
    image: &mut RgbImage,
    text: &str,
    x: i64,
    y: i64,
    scale: f64,
    thickness: i32,
    color: Rgb<u8>,
) {
    let cell = cell_size(scale);
    let pad = ((thickness.max(1) - 1) / 2) as i64;
    let top = y - GLYPH_HEIGHT * cell;

    for (index, c) in text.chars().enumerate() {
        let left = x + index as i64 * ADVANCE * cell;
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                fill_rect(
                    image,
                    left + col * cell - pad,
                    top + row as i64 * cell - pad,
                    cell + 2 * pad,
                    color,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    #[test]
    fn test_text_sits_above_baseline() {
        let mut image = RgbImage::new(40, 30);
        draw_text(&mut image, "I", 2, 25, 1.0, 1, WHITE);

        // top bar of 'I' starts at glyph column 1, 3px cells, 21px tall
        assert_eq!(image.get_pixel(2 + 3, 25 - 21), &WHITE);
        assert_eq!(image.get_pixel(2, 25 - 21), &Rgb([0, 0, 0]));
        assert!((25..30).all(|y| (0..40).all(|x| image.get_pixel(x, y) != &WHITE)));
    }

    #[test]
    fn test_lowercase_matches_uppercase() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('~'), glyph('?'));
    }

    #[test]
    fn test_cell_size_never_zero() {
        assert_eq!(cell_size(1.0), 3);
        assert_eq!(cell_size(0.1), 1);
    }

    #[test]
    fn test_text_is_clipped_at_edges() {
        let mut image = RgbImage::new(4, 4);
        draw_text(&mut image, "HELLO", -10, 3, 2.0, 3, WHITE);
        draw_text(&mut image, "X", 100, 100, 1.0, 1, WHITE);
    }

    #[test]
    fn test_thickness_grows_strokes() {
        let mut thin = RgbImage::new(30, 30);
        let mut thick = RgbImage::new(30, 30);
        draw_text(&mut thin, "-", 5, 20, 1.0, 1, WHITE);
        draw_text(&mut thick, "-", 5, 20, 1.0, 5, WHITE);

        let lit = |img: &RgbImage| img.pixels().filter(|p| **p == WHITE).count();
        assert!(lit(&thick) > lit(&thin));
    }
}
