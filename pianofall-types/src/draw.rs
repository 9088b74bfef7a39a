//! Declarative draw primitives handed to a renderer.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::{Point, Rect};

/// One primitive in a frame's draw list. Lists are ordered back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Line {
        from: Point,
        to: Point,
        color: Color,
        thickness: f32,
    },
    FilledRect {
        rect: Rect,
        color: Color,
    },
    StrokedRect {
        rect: Rect,
        color: Color,
        thickness: f32,
    },
    /// Circle blended over what is beneath it; `alpha` 255 is opaque.
    FilledCircle {
        center: Point,
        radius: f32,
        color: Color,
        alpha: u8,
    },
}
