use std::fmt;

use pianofall_types::Pitch;

/// Result type for scene operations.
pub type SceneResult<T = ()> = Result<T, SceneError>;

/// Rejected input or configuration.
///
/// A release without a matching press is not represented here: it is a
/// silent no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Width or height is zero, negative or not finite.
    InvalidDimension { width: f32, height: f32 },
    /// Key event for a pitch outside the configured window.
    MalformedEvent { pitch: Pitch },
    /// Aspect bounds must satisfy `0 < min < max`.
    InvalidAspectRange { min: f32, max: f32 },
    /// Keyboard window must start at a MIDI pitch and span at most 128 keys.
    InvalidKeyRange { first_note: Pitch, note_count: u32 },
    /// Scroll speed must be finite and positive.
    InvalidTimeScale { time_scale: f32 },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { width, height } => {
                write!(f, "invalid dimension {}x{}", width, height)
            }
            Self::MalformedEvent { pitch } => {
                write!(f, "pitch {} is outside the visible keyboard", pitch)
            }
            Self::InvalidAspectRange { min, max } => {
                write!(f, "invalid aspect range [{}, {}]", min, max)
            }
            Self::InvalidKeyRange {
                first_note,
                note_count,
            } => write!(
                f,
                "invalid keyboard window: {} keys from pitch {}",
                note_count, first_note
            ),
            Self::InvalidTimeScale { time_scale } => {
                write!(f, "invalid time scale {}", time_scale)
            }
        }
    }
}

impl std::error::Error for SceneError {}

impl From<SceneError> for std::io::Error {
    fn from(e: SceneError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    }
}

/// Both sides strictly positive and finite.
pub(crate) fn check_dimensions(width: f32, height: f32) -> SceneResult {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    if valid(width) && valid(height) {
        Ok(())
    } else {
        Err(SceneError::InvalidDimension { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(check_dimensions(100.0, 50.0).is_ok());
        assert!(check_dimensions(0.0, 50.0).is_err());
        assert!(check_dimensions(100.0, -1.0).is_err());
        assert!(check_dimensions(f32::NAN, 10.0).is_err());
        assert!(check_dimensions(10.0, f32::INFINITY).is_err());
    }

    #[test]
    fn display_mentions_values() {
        let e = SceneError::InvalidDimension {
            width: 0.0,
            height: 600.0,
        };
        assert_eq!(e.to_string(), "invalid dimension 0x600");
        let e = SceneError::MalformedEvent { pitch: 120 };
        assert!(e.to_string().contains("120"));
        let e = SceneError::InvalidTimeScale { time_scale: -2.0 };
        assert_eq!(e.to_string(), "invalid time scale -2");
    }
}
