//! Software drawing into a softbuffer frame (`0x00RRGGBB` per pixel).

use image::RgbaImage;

use siv::layout::Size;

/// Straight-alpha colour for overlays and text.
pub type Rgba = (u8, u8, u8, u8);

pub const BG_COLOR: u32 = rgb(31, 31, 31);
pub const CHECKER_SIZE: u32 = 10;
pub const CHECKER_DARK: u32 = rgb(128, 128, 128);
pub const CHECKER_LIGHT: u32 = rgb(192, 192, 192);

/// Horizontal advance of one glyph at scale 1 (5 columns plus spacing).
pub const GLYPH_ADVANCE: u32 = 6;
pub const GLYPH_HEIGHT: u32 = 7;

// 5x7 bitmap font for ASCII 32..127, one byte per column, LSB = top row.
static FONT_5X7: [[u8; 5]; 96] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], [0x00, 0x00, 0x5F, 0x00, 0x00], [0x00, 0x07, 0x00, 0x07, 0x00], [0x14, 0x7F, 0x14, 0x7F, 0x14], // SP ! " #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], [0x23, 0x13, 0x08, 0x64, 0x62], [0x36, 0x49, 0x55, 0x22, 0x50], [0x00, 0x05, 0x03, 0x00, 0x00], // $ % & '
    [0x00, 0x1C, 0x22, 0x41, 0x00], [0x00, 0x41, 0x22, 0x1C, 0x00], [0x14, 0x08, 0x3E, 0x08, 0x14], [0x08, 0x08, 0x3E, 0x08, 0x08], // ( ) * +
    [0x00, 0x50, 0x30, 0x00, 0x00], [0x08, 0x08, 0x08, 0x08, 0x08], [0x00, 0x60, 0x60, 0x00, 0x00], [0x20, 0x10, 0x08, 0x04, 0x02], // , - . /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], [0x00, 0x42, 0x7F, 0x40, 0x00], [0x42, 0x61, 0x51, 0x49, 0x46], [0x21, 0x41, 0x45, 0x4B, 0x31], // 0 1 2 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], [0x27, 0x45, 0x45, 0x45, 0x39], [0x3C, 0x4A, 0x49, 0x49, 0x30], [0x01, 0x71, 0x09, 0x05, 0x03], // 4 5 6 7
    [0x36, 0x49, 0x49, 0x49, 0x36], [0x06, 0x49, 0x49, 0x29, 0x1E], [0x00, 0x36, 0x36, 0x00, 0x00], [0x00, 0x56, 0x36, 0x00, 0x00], // 8 9 : ;
    [0x08, 0x14, 0x22, 0x41, 0x00], [0x14, 0x14, 0x14, 0x14, 0x14], [0x00, 0x41, 0x22, 0x14, 0x08], [0x02, 0x01, 0x51, 0x09, 0x06], // < = > ?
    [0x3E, 0x41, 0x5D, 0x55, 0x1E], [0x7E, 0x11, 0x11, 0x11, 0x7E], [0x7F, 0x49, 0x49, 0x49, 0x36], [0x3E, 0x41, 0x41, 0x41, 0x22], // @ A B C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], [0x7F, 0x49, 0x49, 0x49, 0x41], [0x7F, 0x09, 0x09, 0x09, 0x01], [0x3E, 0x41, 0x49, 0x49, 0x7A], // D E F G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], [0x00, 0x41, 0x7F, 0x41, 0x00], [0x20, 0x40, 0x41, 0x3F, 0x01], [0x7F, 0x08, 0x14, 0x22, 0x41], // H I J K
    [0x7F, 0x40, 0x40, 0x40, 0x40], [0x7F, 0x02, 0x0C, 0x02, 0x7F], [0x7F, 0x04, 0x08, 0x10, 0x7F], [0x3E, 0x41, 0x41, 0x41, 0x3E], // L M N O
    [0x7F, 0x09, 0x09, 0x09, 0x06], [0x3E, 0x41, 0x51, 0x21, 0x5E], [0x7F, 0x09, 0x19, 0x29, 0x46], [0x46, 0x49, 0x49, 0x49, 0x31], // P Q R S
    [0x01, 0x01, 0x7F, 0x01, 0x01], [0x3F, 0x40, 0x40, 0x40, 0x3F], [0x1F, 0x20, 0x40, 0x20, 0x1F], [0x3F, 0x40, 0x38, 0x40, 0x3F], // T U V W
    [0x63, 0x14, 0x08, 0x14, 0x63], [0x07, 0x08, 0x70, 0x08, 0x07], [0x61, 0x51, 0x49, 0x45, 0x43], [0x00, 0x7F, 0x41, 0x41, 0x00], // X Y Z [
    [0x02, 0x04, 0x08, 0x10, 0x20], [0x00, 0x41, 0x41, 0x7F, 0x00], [0x04, 0x02, 0x01, 0x02, 0x04], [0x40, 0x40, 0x40, 0x40, 0x40], // \ ] ^ _
    [0x00, 0x01, 0x02, 0x04, 0x00], [0x20, 0x54, 0x54, 0x54, 0x78], [0x7F, 0x48, 0x44, 0x44, 0x38], [0x38, 0x44, 0x44, 0x44, 0x20], // ` a b c
    [0x38, 0x44, 0x44, 0x48, 0x7F], [0x38, 0x54, 0x54, 0x54, 0x18], [0x08, 0x7E, 0x09, 0x01, 0x02], [0x0C, 0x52, 0x52, 0x52, 0x3E], // d e f g
    [0x7F, 0x08, 0x04, 0x04, 0x78], [0x00, 0x44, 0x7D, 0x40, 0x00], [0x20, 0x40, 0x44, 0x3D, 0x00], [0x7F, 0x10, 0x28, 0x44, 0x00], // h i j k
    [0x00, 0x41, 0x7F, 0x40, 0x00], [0x7C, 0x04, 0x18, 0x04, 0x78], [0x7C, 0x08, 0x04, 0x04, 0x78], [0x38, 0x44, 0x44, 0x44, 0x38], // l m n o
    [0x7C, 0x14, 0x14, 0x14, 0x08], [0x08, 0x14, 0x14, 0x18, 0x7C], [0x7C, 0x08, 0x04, 0x04, 0x08], [0x48, 0x54, 0x54, 0x54, 0x20], // p q r s
    [0x04, 0x3F, 0x44, 0x40, 0x20], [0x3C, 0x40, 0x40, 0x20, 0x7C], [0x1C, 0x20, 0x40, 0x20, 0x1C], [0x3C, 0x40, 0x30, 0x40, 0x3C], // t u v w
    [0x44, 0x28, 0x10, 0x28, 0x44], [0x0C, 0x50, 0x50, 0x50, 0x3C], [0x44, 0x64, 0x54, 0x4C, 0x44], [0x00, 0x08, 0x36, 0x41, 0x00], // x y z {
    [0x00, 0x00, 0x7F, 0x00, 0x00], [0x00, 0x41, 0x36, 0x08, 0x00], [0x10, 0x08, 0x08, 0x10, 0x08], [0x00, 0x00, 0x00, 0x00, 0x00], // | } ~ DEL
];

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) << 16 | (g as u32) << 8 | b as u32
}

fn unpack_rgb(v: u32) -> (u8, u8, u8) {
    ((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

fn blend(dst: u32, (r, g, b, a): Rgba) -> u32 {
    match a {
        255 => rgb(r, g, b),
        0 => dst,
        _ => {
            let a = a as u32;
            let inv = 255 - a;
            let (dr, dg, db) = unpack_rgb(dst);
            let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * inv) / 255) as u8;
            rgb(mix(r, dr), mix(g, dg), mix(b, db))
        }
    }
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_ADVANCE * scale
}

/// A frame buffer together with its dimensions. All drawing is clipped.
pub struct Canvas<'a> {
    buf: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// Rows that do not fit in `buf` are treated as off-screen.
    pub fn new(buf: &'a mut [u32], width: u32, height: u32) -> Self {
        let rows = if width == 0 { 0 } else { (buf.len() / width as usize) as u32 };
        Self {
            buf,
            width,
            height: height.min(rows),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.buf[y as usize * self.width as usize + x as usize])
    }

    /// Intersection of a rectangle with the canvas, as half-open ranges.
    fn clip(&self, x: i64, y: i64, w: u32, h: u32) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let x0 = x.clamp(0, self.width as i64) as u32;
        let y0 = y.clamp(0, self.height as i64) as u32;
        let x1 = (x + w as i64).clamp(0, self.width as i64) as u32;
        let y1 = (y + h as i64).clamp(0, self.height as i64) as u32;
        (x0..x1.max(x0), y0..y1.max(y0))
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Rgba) {
        let (cols, rows) = self.clip(x as i64, y as i64, w, h);
        for row in rows {
            let line = row as usize * self.width as usize;
            for col in cols.clone() {
                let off = line + col as usize;
                self.buf[off] = blend(self.buf[off], color);
            }
        }
    }

    /// Alternating squares anchored at `(x, y)`, so the pattern moves with
    /// the content when it scrolls.
    pub fn checkerboard(&mut self, x: i32, y: i32, size: Size) {
        let (cols, rows) = self.clip(x as i64, y as i64, size.width, size.height);
        for row in rows {
            let cy = (row as i64 - y as i64) as u32 / CHECKER_SIZE;
            let line = row as usize * self.width as usize;
            for col in cols.clone() {
                let cx = (col as i64 - x as i64) as u32 / CHECKER_SIZE;
                self.buf[line + col as usize] = if (cx + cy) % 2 == 0 {
                    CHECKER_LIGHT
                } else {
                    CHECKER_DARK
                };
            }
        }
    }

    /// Draw `src` stretched to `size` with its top-left at `origin`,
    /// nearest-neighbour, blending translucent pixels over what is there.
    pub fn blit(&mut self, src: &RgbaImage, origin: (i32, i32), size: Size) {
        let (src_w, src_h) = src.dimensions();
        if src_w == 0 || src_h == 0 || size.is_empty() {
            return;
        }
        let (x, y) = (origin.0 as i64, origin.1 as i64);
        let (cols, rows) = self.clip(x, y, size.width, size.height);
        let sx_of = |col: u32| ((col as i64 - x) as u64 * src_w as u64 / size.width as u64) as u32;
        for row in rows {
            let sy = ((row as i64 - y) as u64 * src_h as u64 / size.height as u64) as u32;
            let line = row as usize * self.width as usize;
            for col in cols.clone() {
                let p = src.get_pixel(sx_of(col).min(src_w - 1), sy.min(src_h - 1)).0;
                let off = line + col as usize;
                self.buf[off] = blend(self.buf[off], (p[0], p[1], p[2], p[3]));
            }
        }
    }

    fn draw_char(&mut self, ch: char, px: i32, py: i32, scale: u32, color: Rgba) {
        let idx = (ch as u32).wrapping_sub(32) as usize;
        let Some(glyph) = FONT_5X7.get(idx) else {
            return;
        };
        for (col, &bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits & (1 << row) != 0 {
                    self.fill_rect(
                        px + (col as u32 * scale) as i32,
                        py + (row * scale) as i32,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }

    /// Returns the x position after the last character.
    pub fn draw_text(&mut self, text: &str, px: i32, py: i32, scale: u32, color: Rgba) -> i32 {
        let mut x = px;
        for ch in text.chars() {
            self.draw_char(ch, x, py, scale, color);
            x += (GLYPH_ADVANCE * scale) as i32;
        }
        x
    }
}
