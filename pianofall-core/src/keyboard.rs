//! Piano key geometry.
//!
//! Keys have non-uniform widths: black keys take a fixed share of the
//! octave, white keys split the rest. Positions are laid out outward from
//! the middle pitch, which sits at the horizontal center of the screen.
//! Adjacent keys are spaced by the mean of their widths, so the layout of
//! one octave repeats exactly `octave_width` further along.

use pianofall_types::{is_black, Pitch};

use crate::aspect::AspectClamper;
use crate::error::{check_dimensions, SceneError, SceneResult};

/// Width of a black key, in twelfths of an octave.
pub const BLACK_KEY_UNITS: f32 = 0.7;

/// Width of a white key, in twelfths of an octave.
pub const WHITE_KEY_UNITS: f32 = (12.0 - BLACK_KEY_UNITS * 5.0) / 7.0;

/// Highest MIDI pitch; the window must start within 0..=MAX_PITCH.
pub const MAX_PITCH: Pitch = 127;

/// Share of the screen height given to the piano before aspect clamping.
pub const PIANO_HEIGHT_RATIO: f32 = 0.1;

/// Key centers for a contiguous pitch range, built for one layout generation.
#[derive(Debug, Clone)]
struct PositionTable {
    generation: u64,
    lowest: Pitch,
    xs: Vec<f32>,
}

impl PositionTable {
    fn get(&self, pitch: Pitch) -> Option<f32> {
        let idx = usize::try_from(pitch - self.lowest).ok()?;
        self.xs.get(idx).copied()
    }

    fn highest(&self) -> Pitch {
        self.lowest + self.xs.len() as Pitch - 1
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    first_note: Pitch,
    note_count: u32,
    clamper: AspectClamper,
    screen_width: f32,
    screen_height: f32,
    octave_width: f32,
    piano_height: f32,
    generation: u64,
    table: PositionTable,
}

impl KeyboardLayout {
    pub fn new(
        first_note: Pitch,
        note_count: u32,
        clamper: AspectClamper,
        width: f32,
        height: f32,
    ) -> SceneResult<Self> {
        if !(0..=MAX_PITCH).contains(&first_note) || note_count > (MAX_PITCH + 1) as u32 {
            return Err(SceneError::InvalidKeyRange {
                first_note,
                note_count,
            });
        }
        let mut layout = Self {
            first_note,
            note_count: note_count.max(1),
            clamper,
            screen_width: 0.0,
            screen_height: 0.0,
            octave_width: 0.0,
            piano_height: 0.0,
            generation: 0,
            table: PositionTable {
                generation: 0,
                lowest: first_note,
                xs: Vec::new(),
            },
        };
        layout.resize(width, height)?;
        Ok(layout)
    }

    /// Re-derive octave width and piano height for a new screen size.
    /// On error the previous layout stays in effect.
    pub fn resize(&mut self, width: f32, height: f32) -> SceneResult {
        check_dimensions(width, height)?;
        let octaves = self.note_count as f32 / 12.0;
        let (octave_width, piano_height) = self
            .clamper
            .clamp(width / octaves, height * PIANO_HEIGHT_RATIO)?;

        self.screen_width = width;
        self.screen_height = height;
        self.octave_width = octave_width;
        self.piano_height = piano_height;
        self.generation += 1;
        self.rebuild_table();
        log::debug!(
            target: "layout",
            "resized to {}x{} (octave {:.1}px, piano {:.1}px, generation {})",
            width,
            height,
            octave_width,
            piano_height,
            self.generation
        );
        Ok(())
    }

    /// Sweep outward from the middle pitch. The table spans at least 13
    /// pitches so every pitch class appears in it with room to fold.
    fn rebuild_table(&mut self) {
        let lowest = self.first_note;
        let span = self.note_count.max(12) as Pitch;
        let highest = lowest + span;
        let middle = self.middle_note();

        let mut xs = vec![0.0f32; (span + 1) as usize];
        let mid_idx = (middle - lowest) as usize;
        xs[mid_idx] = self.screen_width / 2.0;
        for pitch in (lowest..middle).rev() {
            let idx = (pitch - lowest) as usize;
            xs[idx] = xs[idx + 1] - (self.width(pitch + 1) + self.width(pitch)) / 2.0;
        }
        for pitch in middle + 1..=highest {
            let idx = (pitch - lowest) as usize;
            xs[idx] = xs[idx - 1] + (self.width(pitch - 1) + self.width(pitch)) / 2.0;
        }

        self.table = PositionTable {
            generation: self.generation,
            lowest,
            xs,
        };
    }

    /// Horizontal center of a key.
    pub fn x(&self, pitch: Pitch) -> f32 {
        debug_assert_eq!(self.table.generation, self.generation);
        if let Some(x) = self.table.get(pitch) {
            return x;
        }
        let lowest = self.table.lowest;
        let highest = self.table.highest();
        if pitch < lowest {
            let octaves = (lowest - pitch + 11) / 12;
            let folded = pitch + octaves * 12;
            self.table.get(folded).unwrap_or_default() - octaves as f32 * self.octave_width
        } else {
            let octaves = (pitch - highest + 11) / 12;
            let folded = pitch - octaves * 12;
            self.table.get(folded).unwrap_or_default() + octaves as f32 * self.octave_width
        }
    }

    pub fn width(&self, pitch: Pitch) -> f32 {
        let units = if is_black(pitch) {
            BLACK_KEY_UNITS
        } else {
            WHITE_KEY_UNITS
        };
        units * self.octave_width / 12.0
    }

    /// Left edge of a key.
    pub fn left(&self, pitch: Pitch) -> f32 {
        self.x(pitch) - self.width(pitch) / 2.0
    }

    pub fn middle_note(&self) -> Pitch {
        self.first_note + (self.note_count / 2) as Pitch
    }

    pub fn first_note(&self) -> Pitch {
        self.first_note
    }

    pub fn note_count(&self) -> u32 {
        self.note_count
    }

    /// Whether the pitch belongs to the configured keyboard window.
    pub fn contains(&self, pitch: Pitch) -> bool {
        pitch >= self.first_note && pitch < self.first_note + self.note_count as Pitch
    }

    pub fn octave_width(&self) -> f32 {
        self.octave_width
    }

    pub fn piano_height(&self) -> f32 {
        self.piano_height
    }

    /// Height of the scrolling area above the piano.
    pub fn history_height(&self) -> f32 {
        self.screen_height - self.piano_height
    }

    pub fn screen_width(&self) -> f32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> f32 {
        self.screen_height
    }

    /// Bumped on every accepted resize.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
