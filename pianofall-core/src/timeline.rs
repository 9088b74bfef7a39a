//! Held keys and the history of completed notes.

use std::collections::{BTreeMap, VecDeque};

use pianofall_types::{NoteInterval, Pitch};

/// Each pitch is either released or pressed since some time. Releasing a
/// pressed pitch turns it into a [`NoteInterval`] appended to the history.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    history: VecDeque<NoteInterval>,
    // Ordered by pitch so drawing and emission are deterministic.
    pressed: BTreeMap<Pitch, f64>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start holding `pitch` at time `now`. Pressing a held pitch restarts
    /// it; the earlier start time is returned.
    pub fn press(&mut self, pitch: Pitch, now: f64) -> Option<f64> {
        self.pressed.insert(pitch, now)
    }

    /// Stop holding `pitch`. A release without a press does nothing.
    pub fn release(&mut self, pitch: Pitch, now: f64) -> Option<NoteInterval> {
        let Some(start) = self.pressed.remove(&pitch) else {
            log::trace!(target: "timeline", "release of {} without press", pitch);
            return None;
        };
        let note = NoteInterval::new(pitch, start, now);
        self.history.push_back(note);
        Some(note)
    }

    /// Drop the leading run of intervals matching `is_gone`, stopping at the
    /// first one that does not. Returns how many were dropped.
    pub fn cull_front(&mut self, mut is_gone: impl FnMut(&NoteInterval) -> bool) -> usize {
        let keep_from = self
            .history
            .iter()
            .position(|note| !is_gone(note))
            .unwrap_or(self.history.len());
        self.history.drain(..keep_from);
        keep_from
    }

    /// Completed notes, oldest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &NoteInterval> + '_ {
        self.history.iter()
    }

    /// Held pitches with their press times, lowest pitch first.
    pub fn held(&self) -> impl Iterator<Item = (Pitch, f64)> + '_ {
        self.pressed.iter().map(|(&p, &t)| (p, t))
    }

    pub fn held_pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.pressed.keys().copied()
    }

    pub fn is_pressed(&self, pitch: Pitch) -> bool {
        self.pressed.contains_key(&pitch)
    }

    pub fn pressed_at(&self, pitch: Pitch) -> Option<f64> {
        self.pressed.get(&pitch).copied()
    }

    pub fn held_count(&self) -> usize {
        self.pressed.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget everything, held keys included.
    pub fn clear(&mut self) {
        self.history.clear();
        self.pressed.clear();
    }
}
