//! Aspect-ratio clamping for the octave cell.

use crate::error::{check_dimensions, SceneError, SceneResult};

/// Shrinks one side of a width/height pair so that `width / height` falls
/// within `[min_aspect, max_aspect]`. Never grows either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectClamper {
    min_aspect: f32,
    max_aspect: f32,
}

impl AspectClamper {
    pub fn new(min_aspect: f32, max_aspect: f32) -> SceneResult<Self> {
        let valid = min_aspect.is_finite() && max_aspect.is_finite() && min_aspect > 0.0;
        if !valid || min_aspect >= max_aspect {
            return Err(SceneError::InvalidAspectRange {
                min: min_aspect,
                max: max_aspect,
            });
        }
        Ok(Self {
            min_aspect,
            max_aspect,
        })
    }

    pub fn clamp(&self, width: f32, height: f32) -> SceneResult<(f32, f32)> {
        check_dimensions(width, height)?;
        let aspect = width / height;
        if aspect < self.min_aspect {
            return Ok((width, width / self.min_aspect));
        }
        if aspect > self.max_aspect {
            return Ok((height * self.max_aspect, height));
        }
        Ok((width, height))
    }
}
