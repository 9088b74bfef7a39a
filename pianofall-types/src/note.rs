use serde::{Deserialize, Serialize};

/// Key identifier, a MIDI note number in practice.
///
/// Signed so that octave arithmetic below the first configured note
/// (divider and keyboard drawing reach past both ends) stays well defined.
pub type Pitch = i32;

/// Pitch classes of the black keys within an octave (C = 0).
pub const BLACK_KEY_CLASSES: [i32; 5] = [1, 3, 6, 8, 10];

/// Pitch classes of the white keys within an octave, left to right.
pub const WHITE_KEY_CLASSES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Pitch class 0..12, also for negative pitches.
pub fn pitch_class(pitch: Pitch) -> i32 {
    pitch.rem_euclid(12)
}

/// Whether the key for this pitch is a black key.
pub fn is_black(pitch: Pitch) -> bool {
    BLACK_KEY_CLASSES.contains(&pitch_class(pitch))
}

/// A completed note: the key was held from `start` to `end` (scene seconds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteInterval {
    pub pitch: Pitch,
    pub start: f64,
    pub end: f64,
}

impl NoteInterval {
    pub fn new(pitch: Pitch, start: f64, end: f64) -> Self {
        Self { pitch, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_key_pattern_repeats_every_octave() {
        let pattern: Vec<bool> = (0..12).map(is_black).collect();
        assert_eq!(
            pattern,
            vec![false, true, false, true, false, false, true, false, true, false, true, false]
        );
        for pitch in 0..12 {
            assert_eq!(is_black(pitch), is_black(pitch + 48));
            assert_eq!(is_black(pitch), is_black(pitch - 24));
        }
    }

    #[test]
    fn pitch_class_handles_negative_pitches() {
        assert_eq!(pitch_class(-1), 11);
        assert_eq!(pitch_class(-12), 0);
        assert_eq!(pitch_class(61), 1);
    }

    #[test]
    fn white_and_black_classes_partition_octave() {
        let mut all: Vec<i32> = WHITE_KEY_CLASSES
            .iter()
            .chain(BLACK_KEY_CLASSES.iter())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..12).collect::<Vec<_>>());
    }
}
