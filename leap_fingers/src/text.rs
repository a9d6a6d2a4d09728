//! Text layout into a [`Texture`].
//!
//! Glyphs come from a built-in 3×5 bitmap face scaled by an integer factor,
//! so any requested font name resolves to the same face at the nearest
//! whole-pixel size.

use thiserror::Error;

use crate::render::{Color, ColorA, Texture};

const GLYPH_W:   usize = 3;
const GLYPH_H:   usize = 5;
/// Horizontal gap between glyphs, in unscaled font pixels.
const TRACKING:  usize = 1;
/// Vertical gap between lines, in unscaled font pixels.
const LEADING:   usize = 2;
/// Border around the laid-out text, in unscaled font pixels.
const PADDING:   usize = 2;
/// Largest accepted font size, in pixels.
pub const MAX_FONT_SIZE: f32 = 512.0;

#[derive(Debug, Error, PartialEq)]
pub enum FontError {
    #[error("font size {0} is outside (0, 512]")]
    InvalidSize(f32),
}

// ════════════════════════════════════════════════════════════════════════════
// Font
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    name:  String,
    size:  f32,
    scale: usize,
}

impl Font {
    /// Resolve `name` at `size` pixels tall.
    pub fn new(name: &str, size: f32) -> Result<Self, FontError> {
        if !size.is_finite() || size <= 0.0 || size > MAX_FONT_SIZE {
            return Err(FontError::InvalidSize(size));
        }
        let scale = ((size / GLYPH_H as f32).round() as usize).max(1);
        log::debug!("font \"{}\" {}px → bitmap face ×{}", name, size, scale);
        Ok(Font { name: name.to_string(), size, scale })
    }

    pub fn name(&self)  -> &str  { &self.name }
    pub fn size(&self)  -> f32   { self.size }
    pub fn scale(&self) -> usize { self.scale }

    fn advance(&self)     -> usize { (GLYPH_W + TRACKING) * self.scale }
    fn line_height(&self) -> usize { (GLYPH_H + LEADING) * self.scale }
    fn padding(&self)     -> usize { PADDING * self.scale }

    fn line_width(&self, line: &str) -> usize {
        let n = line.chars().count();
        if n == 0 { 0 } else { n * self.advance() - TRACKING * self.scale }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TextBox
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Builder that lays out multi-line text and renders it to a texture.
#[derive(Clone, Debug)]
pub struct TextBox {
    alignment:  Alignment,
    font:       Option<Font>,
    text:       String,
    color:      ColorA,
    background: ColorA,
}

impl Default for TextBox {
    fn default() -> Self {
        TextBox {
            alignment:  Alignment::Left,
            font:       None,
            text:       String::new(),
            color:      ColorA::new(1.0, 1.0, 1.0, 1.0),
            background: ColorA::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl TextBox {
    pub fn new() -> Self { TextBox::default() }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn font(mut self, font: &Font) -> Self {
        self.font = Some(font.clone());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color.into();
        self
    }

    pub fn background_color(mut self, color: ColorA) -> Self {
        self.background = color;
        self
    }

    /// Lay out and rasterize. Without a font, a 5px face is used.
    pub fn render(&self) -> Texture {
        let font = match &self.font {
            Some(f) => f.clone(),
            None    => Font { name: String::new(), size: GLYPH_H as f32, scale: 1 },
        };
        let lines: Vec<&str> = self.text.lines().collect();
        let pad     = font.padding();
        let content = lines.iter().map(|l| font.line_width(l)).max().unwrap_or(0);
        let width   = content + 2 * pad;
        let height  = lines.len() * font.line_height() + 2 * pad;

        let mut tex = Texture::filled(width, height, self.background.to_argb());
        let fg = self.color.to_argb();

        for (row, line) in lines.iter().enumerate() {
            let slack = content - font.line_width(line);
            let x = pad + match self.alignment {
                Alignment::Left   => 0,
                Alignment::Center => slack / 2,
                Alignment::Right  => slack,
            };
            let y = pad + row * font.line_height();
            draw_line(&mut tex, line, x, y, font.scale, fg);
        }
        tex
    }
}

fn draw_line(tex: &mut Texture, text: &str, x: usize, y: usize, scale: usize, color: u32) {
    let mut cx = x;
    for ch in text.chars() {
        for (row, &bits) in char_glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 { continue; }
                for sy in 0..scale {
                    for sx in 0..scale {
                        tex.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                    }
                }
            }
        }
        cx += (GLYPH_W + TRACKING) * scale;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: u32 = 0xFFFFFFFF;

    fn font20() -> Font { Font::new("YuGothic", 20.0).unwrap() }

    #[test]
    fn font_rejects_bad_sizes() {
        assert_eq!(Font::new("x", 0.0), Err(FontError::InvalidSize(0.0)));
        assert!(Font::new("x", -3.0).is_err());
        assert!(Font::new("x", f32::NAN).is_err());
        assert!(Font::new("x", f32::INFINITY).is_err());
    }

    #[test]
    fn font_rejects_sizes_too_large_to_lay_out() {
        assert_eq!(Font::new("x", 1e30), Err(FontError::InvalidSize(1e30)));
        assert!(Font::new("x", MAX_FONT_SIZE + 1.0).is_err());
        let f = Font::new("x", MAX_FONT_SIZE).unwrap();
        let tex = TextBox::new().font(&f).text("Finger Count : 0\n").render();
        assert!(tex.width() > 0 && tex.height() > 0);
    }

    #[test]
    fn font_scale_from_size() {
        assert_eq!(font20().scale(), 4);
        assert_eq!(Font::new("x", 1.0).unwrap().scale(), 1);
    }

    #[test]
    fn texture_fits_longest_line() {
        let f = font20();
        let tex = TextBox::new().font(&f).text("ab\nabcd\n").render();
        // 4 glyphs: 4*16 - 4 = 60, plus 8px padding each side.
        assert_eq!(tex.width(), 60 + 16);
        // Trailing newline adds no line: 2 * 28 + 16.
        assert_eq!(tex.height(), 2 * 28 + 16);
    }

    #[test]
    fn background_fills_empty_area() {
        let bg = ColorA::new(0.0, 0.0, 0.0, 0.5);
        let tex = TextBox::new()
            .font(&font20())
            .text("1")
            .background_color(bg)
            .render();
        assert_eq!(tex.pixel(0, 0), Some(bg.to_argb()));
    }

    #[test]
    fn left_alignment_starts_at_padding() {
        let tex = TextBox::new()
            .alignment(Alignment::Left)
            .font(&font20())
            .text("1\n111")
            .color(Color::new(1.0, 1.0, 1.0))
            .render();
        // '1' top row is 0b010: lit column is the middle one.
        assert_eq!(tex.pixel(8 + 4, 8), Some(WHITE));
        assert_ne!(tex.pixel(8, 8), Some(WHITE));
    }

    #[test]
    fn right_alignment_pushes_short_lines() {
        let tex = TextBox::new()
            .alignment(Alignment::Right)
            .font(&font20())
            .text("1\n111")
            .color(Color::new(1.0, 1.0, 1.0))
            .render();
        // Short line shifted right by two advances (32px).
        assert_ne!(tex.pixel(8 + 4, 8), Some(WHITE));
        assert_eq!(tex.pixel(8 + 32 + 4, 8), Some(WHITE));
    }

    #[test]
    fn empty_text_is_padding_only() {
        let tex = TextBox::new().font(&font20()).render();
        assert_eq!((tex.width(), tex.height()), (16, 16));
    }
}
