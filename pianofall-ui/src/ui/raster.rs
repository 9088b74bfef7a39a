//! Software rasterizer for scene draw lists.
//!
//! The terminal shows two pixels per cell (upper half block with fg/bg),
//! and each pixel covers `SCENE_UNITS_PER_PIXEL` scene units on both axes.
//! Fills use pixel-center inclusion; strokes and lines are at least one
//! pixel wide so thin scene lines stay visible.

use pianofall_types::{Color, DrawCommand, Point, Rect};

/// Scene units covered by one pixel edge.
pub const SCENE_UNITS_PER_PIXEL: f32 = 8.0;

/// Scene size that fills a terminal of `cols` x `rows` cells.
pub fn scene_size(cols: u16, rows: u16) -> (f32, f32) {
    (
        cols as f32 * SCENE_UNITS_PER_PIXEL,
        rows as f32 * 2.0 * SCENE_UNITS_PER_PIXEL,
    )
}

pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    #[cfg(test)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize (contents are reset) if the dimensions changed.
    pub fn ensure_size(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels = vec![Color::BLACK; width * height];
        }
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Paint the draw list in order, later commands on top.
    pub fn draw(&mut self, cmds: &[DrawCommand]) {
        for cmd in cmds {
            match *cmd {
                DrawCommand::FilledRect { rect, color } => self.fill_rect(rect, color),
                DrawCommand::StrokedRect {
                    rect,
                    color,
                    thickness,
                } => self.stroke_rect(rect, color, thickness),
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    thickness,
                } => self.line(from, to, color, thickness),
                DrawCommand::FilledCircle {
                    center,
                    radius,
                    color,
                    alpha,
                } => self.circle(center, radius, color, alpha),
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let (x0, x1) = pixel_span(rect.x, rect.right());
        let (y0, y1) = pixel_span(rect.y, rect.bottom());
        self.fill_pixels(x0, y0, x1, y1, color);
    }

    /// Border drawn inside the rect.
    fn stroke_rect(&mut self, rect: Rect, color: Color, thickness: f32) {
        let (x0, x1) = pixel_span(rect.x, rect.right());
        let (y0, y1) = pixel_span(rect.y, rect.bottom());
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let band = stroke_pixels(thickness);
        self.fill_pixels(x0, y0, x1, (y0 + band).min(y1), color);
        self.fill_pixels(x0, (y1 - band).max(y0), x1, y1, color);
        self.fill_pixels(x0, y0, (x0 + band).min(x1), y1, color);
        self.fill_pixels((x1 - band).max(x0), y0, x1, y1, color);
    }

    fn line(&mut self, from: Point, to: Point, color: Color, thickness: f32) {
        let band = stroke_pixels(thickness);
        let (fx, fy) = (from.x / SCENE_UNITS_PER_PIXEL, from.y / SCENE_UNITS_PER_PIXEL);
        let (tx, ty) = (to.x / SCENE_UNITS_PER_PIXEL, to.y / SCENE_UNITS_PER_PIXEL);

        let (w, h) = (self.width as f32, self.height as f32);
        let pad = band as f32;
        if fx.max(tx) < -pad || fx.min(tx) > w + pad || fy.max(ty) < -pad || fy.min(ty) > h + pad {
            return;
        }

        // DDA over the clipped extent
        let steps = (tx - fx).abs().max((ty - fy).abs()).min(w + h).ceil().max(1.0) as i64;
        let half = band / 2;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let px = (fx + (tx - fx) * t).floor() as i64 - half;
            let py = (fy + (ty - fy) * t).floor() as i64 - half;
            self.fill_pixels(px, py, px + band, py + band, color);
        }
    }

    fn circle(&mut self, center: Point, radius: f32, color: Color, alpha: u8) {
        let cx = center.x / SCENE_UNITS_PER_PIXEL;
        let cy = center.y / SCENE_UNITS_PER_PIXEL;
        let r = radius / SCENE_UNITS_PER_PIXEL;

        let x0 = (cx - r).floor() as i64;
        let x1 = (cx + r).ceil() as i64;
        let y0 = (cy - r).floor() as i64;
        let y1 = (cy + r).ceil() as i64;
        let mut painted = false;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend_pixel(x, y, color, alpha);
                    painted = true;
                }
            }
        }
        // Smaller than a pixel: still show a dot
        if !painted {
            self.blend_pixel(cx.floor() as i64, cy.floor() as i64, color, alpha);
        }
    }

    fn fill_pixels(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let x0 = x0.clamp(0, self.width as i64) as usize;
        let x1 = x1.clamp(0, self.width as i64) as usize;
        let y0 = y0.clamp(0, self.height as i64) as usize;
        let y1 = y1.clamp(0, self.height as i64) as usize;
        for y in y0..y1 {
            let row = y * self.width;
            self.pixels[row + x0..row + x1.max(x0)].fill(color);
        }
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.pixels[idx] = color.blend_over(self.pixels[idx], alpha);
    }
}

/// Pixels whose centers fall in `[start, end)` scene units.
fn pixel_span(start: f32, end: f32) -> (i64, i64) {
    let a = (start / SCENE_UNITS_PER_PIXEL - 0.5).ceil();
    let b = (end / SCENE_UNITS_PER_PIXEL - 0.5).ceil();
    (a as i64, b as i64)
}

fn stroke_pixels(thickness: f32) -> i64 {
    ((thickness / SCENE_UNITS_PER_PIXEL).round() as i64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(255, 0, 0);

    fn lit(fb: &Framebuffer, color: Color) -> usize {
        let mut n = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.get(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn scene_size_matches_cells() {
        assert_eq!(scene_size(80, 24), (640.0, 384.0));
    }

    #[test]
    fn filled_rect_uses_pixel_centers() {
        let mut fb = Framebuffer::new(10, 10);
        // x 8..32 covers pixel centers 12, 20, 28
        fb.draw(&[DrawCommand::FilledRect {
            rect: Rect::new(8.0, 0.0, 24.0, 16.0),
            color: RED,
        }]);
        assert_eq!(lit(&fb, RED), 3 * 2);
        assert_eq!(fb.get(0, 0), Some(Color::BLACK));
        assert_eq!(fb.get(1, 0), Some(RED));
        assert_eq!(fb.get(3, 1), Some(RED));
        assert_eq!(fb.get(4, 0), Some(Color::BLACK));
    }

    #[test]
    fn offscreen_shapes_are_clipped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw(&[
            DrawCommand::FilledRect {
                rect: Rect::new(-100.0, -100.0, 1000.0, 1000.0),
                color: RED,
            },
            DrawCommand::Line {
                from: Point::new(-5000.0, 0.0),
                to: Point::new(-5000.0, 30.0),
                color: Color::BLACK,
                thickness: 2.0,
            },
        ]);
        assert_eq!(lit(&fb, RED), 16);
    }

    #[test]
    fn stroked_rect_keeps_interior() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw(&[DrawCommand::StrokedRect {
            rect: Rect::new(0.0, 0.0, 40.0, 40.0),
            color: RED,
            thickness: 4.0,
        }]);
        // 5x5 block, one-pixel border
        assert_eq!(lit(&fb, RED), 25 - 9);
        assert_eq!(fb.get(2, 2), Some(Color::BLACK));
        assert_eq!(fb.get(0, 4), Some(RED));
    }

    #[test]
    fn thin_line_is_visible() {
        let mut fb = Framebuffer::new(10, 4);
        fb.draw(&[DrawCommand::Line {
            from: Point::new(0.0, 12.0),
            to: Point::new(80.0, 12.0),
            color: RED,
            thickness: 1.0,
        }]);
        for x in 0..10 {
            assert_eq!(fb.get(x, 1), Some(RED));
        }
        assert_eq!(lit(&fb, RED), 10);
    }

    #[test]
    fn tiny_circle_blends_center_pixel() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw(&[DrawCommand::FilledCircle {
            center: Point::new(12.0, 12.0),
            radius: 2.0,
            color: Color::new(255, 255, 255),
            alpha: 255,
        }]);
        assert_eq!(fb.get(1, 1), Some(Color::new(255, 255, 255)));
        assert_eq!(lit(&fb, Color::BLACK), 15);
    }

    #[test]
    fn circle_alpha_blends_over_background() {
        let mut fb = Framebuffer::new(4, 4);
        fb.clear(Color::new(0, 0, 200));
        fb.draw(&[DrawCommand::FilledCircle {
            center: Point::new(16.0, 16.0),
            radius: 4.0,
            color: Color::new(200, 0, 0),
            alpha: 0,
        }]);
        assert_eq!(lit(&fb, Color::new(0, 0, 200)), 16);
    }

    #[test]
    fn ensure_size_resets_only_on_change() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(RED);
        fb.ensure_size(2, 2);
        assert_eq!(fb.get(1, 1), Some(RED));
        fb.ensure_size(3, 1);
        assert_eq!((fb.width(), fb.height()), (3, 1));
        assert_eq!(fb.get(2, 0), Some(Color::BLACK));
        assert_eq!(fb.get(0, 1), None);
    }
}
