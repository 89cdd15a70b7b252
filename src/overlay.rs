//! Tiny 3×5 bitmap font for the status line drawn over the canvas.

use crate::raster::{Color, RasterBuffer};

pub const GLYPH_W: u32 = 3;
pub const GLYPH_H: u32 = 5;

/// Five 3-bit rows, top row in the high bits. Unknown characters are blank.
fn glyph(ch: char) -> u16 {
    match ch.to_ascii_lowercase() {
        '0' => 0b111_101_101_101_111,
        '1' => 0b010_110_010_010_111,
        '2' => 0b111_001_111_100_111,
        '3' => 0b111_001_111_001_111,
        '4' => 0b101_101_111_001_001,
        '5' => 0b111_100_111_001_111,
        '6' => 0b111_100_111_101_111,
        '7' => 0b111_001_001_001_001,
        '8' => 0b111_101_111_101_111,
        '9' => 0b111_101_111_001_111,
        'a' => 0b111_101_111_101_101,
        'b' => 0b110_101_110_101_110,
        'c' => 0b111_100_100_100_111,
        'd' => 0b110_101_101_101_110,
        'e' => 0b111_100_111_100_111,
        'f' => 0b111_100_111_100_100,
        'g' => 0b111_100_101_101_111,
        'h' => 0b101_101_111_101_101,
        'i' => 0b111_010_010_010_111,
        'j' => 0b001_001_001_101_111,
        'k' => 0b101_101_110_101_101,
        'l' => 0b100_100_100_100_111,
        'm' => 0b101_111_111_101_101,
        'n' => 0b110_101_101_101_101,
        'o' => 0b111_101_101_101_111,
        'p' => 0b111_101_111_100_100,
        'q' => 0b111_101_101_111_001,
        'r' => 0b110_101_110_101_101,
        's' => 0b111_100_111_001_111,
        't' => 0b111_010_010_010_010,
        'u' => 0b101_101_101_101_111,
        'v' => 0b101_101_101_101_010,
        'w' => 0b101_101_111_111_101,
        'x' => 0b101_101_010_101_101,
        'y' => 0b101_101_111_010_010,
        'z' => 0b111_001_010_100_111,
        '.' => 0b000_000_000_000_010,
        ',' => 0b000_000_000_010_100,
        ':' => 0b000_010_000_010_000,
        '-' => 0b000_000_111_000_000,
        '+' => 0b000_010_111_010_000,
        '=' => 0b000_111_000_111_000,
        '/' => 0b001_001_010_100_100,
        '%' => 0b101_001_010_100_101,
        '(' => 0b010_100_100_100_010,
        ')' => 0b010_001_001_001_010,
        _ => 0,
    }
}

/// Draws `ch` with its top-left at `(x, y)`, each font pixel `scale` px wide.
pub fn draw_char(buffer: &mut RasterBuffer, x: u32, y: u32, ch: char, color: Color, scale: u32) {
    let bits = glyph(ch);
    for row in 0..GLYPH_H {
        for col in 0..GLYPH_W {
            let shift = (GLYPH_H - 1 - row) * GLYPH_W + (GLYPH_W - 1 - col);
            if bits & (1 << shift) == 0 {
                continue;
            }
            for sy in 0..scale {
                for sx in 0..scale {
                    buffer.set_pixel(x + col * scale + sx, y + row * scale + sy, color);
                }
            }
        }
    }
}

/// Pixel width of `text` at `scale`, one blank column between glyphs.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * (GLYPH_W + 1) * scale
}

/// Draws a single line of text, clipped at the right edge of the buffer.
pub fn draw_text(buffer: &mut RasterBuffer, x: u32, y: u32, text: &str, color: Color, scale: u32) {
    let advance = (GLYPH_W + 1) * scale;
    let mut cx = x;
    for ch in text.chars() {
        if cx + GLYPH_W * scale > buffer.width() {
            break;
        }
        draw_char(buffer, cx, y, ch, color, scale);
        cx += advance;
    }
}

/// Status text on a dark strip so it stays readable over bright fractals.
pub fn draw_status(buffer: &mut RasterBuffer, lines: &[String], color: Color, scale: u32) {
    let pad = 2 * scale;
    let line_h = (GLYPH_H + 2) * scale;
    let width = lines.iter().map(|l| text_width(l, scale)).max().unwrap_or(0) + 2 * pad;
    let height = lines.len() as u32 * line_h + 2 * pad;
    let shade = Color::rgb(0, 0, 0);
    for y in 0..height.min(buffer.height()) {
        for x in 0..width.min(buffer.width()) {
            let under = Color(buffer.pixel(x, y));
            buffer.set_pixel(x, y, under.mix(shade, 0.6));
        }
    }
    for (i, line) in lines.iter().enumerate() {
        draw_text(buffer, pad, pad + i as u32 * line_h, line, color, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_rows_read_top_down() {
        let mut buf = RasterBuffer::new(8, 8, Color::BLACK).unwrap();
        draw_char(&mut buf, 0, 0, '7', Color::WHITE, 1);
        // top row full, then only the right column
        assert_eq!(buf.pixel(0, 0), Color::WHITE.0);
        assert_eq!(buf.pixel(2, 0), Color::WHITE.0);
        assert_eq!(buf.pixel(0, 1), 0);
        assert_eq!(buf.pixel(2, 4), Color::WHITE.0);
    }

    #[test]
    fn scale_enlarges_pixels() {
        let mut buf = RasterBuffer::new(16, 16, Color::BLACK).unwrap();
        draw_char(&mut buf, 0, 0, '.', Color::WHITE, 2);
        assert_eq!(buf.pixel(2, 8), Color::WHITE.0);
        assert_eq!(buf.pixel(3, 9), Color::WHITE.0);
        assert_eq!(buf.pixel(1, 8), 0);
    }

    #[test]
    fn text_is_clipped_not_wrapped() {
        let mut buf = RasterBuffer::new(10, 6, Color::BLACK).unwrap();
        draw_text(&mut buf, 0, 0, "888888", Color::WHITE, 1);
        assert_eq!(text_width("888", 1), 12);
        // only two glyphs fit
        assert_eq!(buf.pixel(4, 0), Color::WHITE.0);
        assert_eq!(buf.pixel(8, 0), 0);
    }
}
