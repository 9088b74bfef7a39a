//! Colors and the visualizer palette.

use serde::{Deserialize, Serialize};

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend `self` over `base` with `alpha` in 0..=255.
    pub fn blend_over(&self, base: Color, alpha: u8) -> Color {
        let a = alpha as u16;
        let mix = |top: u8, bottom: u8| -> u8 {
            ((top as u16 * a + bottom as u16 * (255 - a) + 127) / 255) as u8
        };
        Color::new(
            mix(self.r, base.r),
            mix(self.g, base.g),
            mix(self.b, base.b),
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(255, 255, 255)
    }
}

/// HSV (all components 0.0..=1.0, hue wraps) to 8-bit RGB, rounding each channel.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Color {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    if s <= 0.0 {
        let g = to_byte(v);
        return Color::new(g, g, g);
    }
    let h = h.rem_euclid(1.0) * 6.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Color::new(to_byte(r), to_byte(g), to_byte(b))
}

/// Every color the scene draws with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub background: Color,
    pub grid_line: Color,
    pub divider_line: Color,

    // Note bars
    pub white_note_fill: Color,
    pub white_note_border: Color,
    pub black_note_fill: Color,
    pub black_note_border: Color,

    // Piano keys
    pub white_key: Color,
    pub white_key_held: Color,
    pub black_key: Color,
    pub black_key_held: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            background: Color::BLACK,
            grid_line: Color::new(50, 50, 50),
            divider_line: Color::new(50, 50, 50),

            white_note_fill: Color::new(0, 150, 255),
            white_note_border: Color::new(0, 75, 255),
            black_note_fill: Color::new(0, 100, 255),
            black_note_border: Color::new(0, 50, 150),

            white_key: Color::new(200, 200, 200),
            white_key_held: Color::new(100, 100, 100),
            black_key: Color::BLACK,
            black_key_held: Color::new(50, 50, 50),
        }
    }

    /// Fill and border colors for a note bar.
    pub fn note_colors(&self, black: bool) -> (Color, Color) {
        if black {
            (self.black_note_fill, self.black_note_border)
        } else {
            (self.white_note_fill, self.white_note_border)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_primary_hues() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Color::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), Color::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(0.5, 1.0, 1.0), Color::new(0, 255, 255));
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), Color::new(0, 0, 255));
    }

    #[test]
    fn hsv_hue_wraps() {
        assert_eq!(hsv_to_rgb(1.0, 1.0, 1.0), hsv_to_rgb(0.0, 1.0, 1.0));
    }

    #[test]
    fn hsv_zero_saturation_is_gray() {
        assert_eq!(hsv_to_rgb(0.3, 0.0, 0.5), Color::new(128, 128, 128));
    }

    #[test]
    fn blend_extremes() {
        let top = Color::new(200, 100, 0);
        let base = Color::new(0, 0, 255);
        assert_eq!(top.blend_over(base, 255), top);
        assert_eq!(top.blend_over(base, 0), base);
    }

    #[test]
    fn black_notes_are_darker() {
        let palette = Palette::default();
        let (black_fill, _) = palette.note_colors(true);
        let (white_fill, _) = palette.note_colors(false);
        assert!(black_fill.g < white_fill.g);
    }
}
