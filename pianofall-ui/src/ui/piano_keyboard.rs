use std::collections::HashMap;
use std::time::{Duration, Instant};

use pianofall_types::Pitch;

const MIN_OCTAVE: i8 = -1;
const MAX_OCTAVE: i8 = 9;

/// Computer keyboard as a piano, laid out from C on the home row.
///
/// Terminals do not report key releases, so a held key is detected by its
/// auto-repeat and released once it has been quiet for `release_timeout`.
///
/// - `key_to_pitch(char)` maps a character to a MIDI pitch in the current octave
/// - `key_pressed(char, pitch, timestamp)` returns the pitch on a new press, None on repeat
/// - `check_releases(timestamp)` returns the keys that timed out
/// - `release_all()` releases every held key
pub struct PianoKeyboard {
    octave: i8,
    // char -> (pitch at press time, last event time)
    active_keys: HashMap<char, (Pitch, Instant)>,
    release_timeout: Duration,
}

impl PianoKeyboard {
    pub fn new(release_timeout: Duration) -> Self {
        Self {
            octave: 4,
            active_keys: HashMap::new(),
            release_timeout,
        }
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Decrease octave. Returns true if changed.
    pub fn octave_down(&mut self) -> bool {
        if self.octave > MIN_OCTAVE {
            self.octave -= 1;
            true
        } else {
            false
        }
    }

    /// Increase octave. Returns true if changed.
    pub fn octave_up(&mut self) -> bool {
        if self.octave < MAX_OCTAVE {
            self.octave += 1;
            true
        } else {
            false
        }
    }

    /// Convert a keyboard character to a MIDI pitch using the current octave.
    /// Pitches above 127 map to None.
    pub fn key_to_pitch(&self, key: char) -> Option<Pitch> {
        let offset = Self::key_to_offset(key)?;
        let pitch = (self.octave as Pitch + 1) * 12 + offset;
        (0..=127).contains(&pitch).then_some(pitch)
    }

    // ── Sustain tracking ──────────────────────────────────────────

    /// Returns Some(pitch) on a new press, None on auto-repeat.
    pub fn key_pressed(&mut self, c: char, pitch: Pitch, now: Instant) -> Option<Pitch> {
        if let Some((_, last)) = self.active_keys.get_mut(&c) {
            // Held: keep the original pitch even if the octave moved
            *last = now;
            return None;
        }
        self.active_keys.insert(c, (pitch, now));
        Some(pitch)
    }

    /// Keys quiet for longer than the release timeout, as (char, pitch).
    pub fn check_releases(&mut self, now: Instant) -> Vec<(char, Pitch)> {
        let mut to_release = Vec::new();
        let timeout = self.release_timeout;
        self.active_keys.retain(|&c, (pitch, last_time)| {
            if now.saturating_duration_since(*last_time) > timeout {
                to_release.push((c, *pitch));
                false
            } else {
                true
            }
        });
        to_release
    }

    /// Release all active keys, returns their pitches
    pub fn release_all(&mut self) -> Vec<Pitch> {
        self.active_keys.drain().map(|(_, (p, _))| p).collect()
    }

    fn key_to_offset(key: char) -> Option<Pitch> {
        match key {
            'a' => Some(0),  // C
            's' => Some(2),  // D
            'd' => Some(4),  // E
            'f' => Some(5),  // F
            'g' => Some(7),  // G
            'h' => Some(9),  // A
            'j' => Some(11), // B
            'w' => Some(1),  // C#
            'e' => Some(3),  // D#
            't' => Some(6),  // F#
            'y' => Some(8),  // G#
            'u' => Some(10), // A#
            'k' => Some(12), // C (octave up)
            'l' => Some(14), // D
            ';' => Some(16), // E
            'o' => Some(13), // C#
            'p' => Some(15), // D#
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyboard() -> PianoKeyboard {
        PianoKeyboard::new(Duration::from_millis(150))
    }

    #[test]
    fn home_row_starts_at_middle_c() {
        let kb = keyboard();
        assert_eq!(kb.octave(), 4);
        assert_eq!(kb.key_to_pitch('a'), Some(60));
        assert_eq!(kb.key_to_pitch('w'), Some(61));
        assert_eq!(kb.key_to_pitch('j'), Some(71));
        assert_eq!(kb.key_to_pitch('k'), Some(72));
        assert_eq!(kb.key_to_pitch(';'), Some(76));
        assert_eq!(kb.key_to_pitch('z'), None);
        assert_eq!(kb.key_to_pitch('A'), None);
    }

    #[test]
    fn octave_shift_moves_pitches() {
        let mut kb = keyboard();
        assert!(kb.octave_down());
        assert_eq!(kb.key_to_pitch('a'), Some(48));
        assert!(kb.octave_up());
        assert!(kb.octave_up());
        assert_eq!(kb.key_to_pitch('a'), Some(72));
    }

    #[test]
    fn octave_clamps() {
        let mut kb = keyboard();
        for _ in 0..20 {
            kb.octave_up();
        }
        assert_eq!(kb.octave(), 9);
        assert!(!kb.octave_up());
        // 120 + 7 = 127 is the top
        assert_eq!(kb.key_to_pitch('g'), Some(127));
        assert_eq!(kb.key_to_pitch('h'), None);

        for _ in 0..20 {
            kb.octave_down();
        }
        assert_eq!(kb.octave(), -1);
        assert!(!kb.octave_down());
        assert_eq!(kb.key_to_pitch('a'), Some(0));
    }

    #[test]
    fn repeat_is_not_a_new_press() {
        let mut kb = keyboard();
        let t0 = Instant::now();
        assert_eq!(kb.key_pressed('a', 60, t0), Some(60));
        assert_eq!(kb.key_pressed('a', 60, t0 + Duration::from_millis(30)), None);
        assert_eq!(kb.release_all(), vec![60]);
    }

    #[test]
    fn quiet_keys_release_after_timeout() {
        let mut kb = keyboard();
        let t0 = Instant::now();
        kb.key_pressed('a', 60, t0);
        kb.key_pressed('s', 62, t0 + Duration::from_millis(100));

        assert!(kb.check_releases(t0 + Duration::from_millis(150)).is_empty());

        let released = kb.check_releases(t0 + Duration::from_millis(200));
        assert_eq!(released, vec![('a', 60)]);

        let released = kb.check_releases(t0 + Duration::from_millis(300));
        assert_eq!(released, vec![('s', 62)]);
        assert!(kb.release_all().is_empty());
    }

    #[test]
    fn repeat_keeps_key_alive() {
        let mut kb = keyboard();
        let t0 = Instant::now();
        kb.key_pressed('a', 60, t0);
        for i in 1..10 {
            kb.key_pressed('a', 60, t0 + Duration::from_millis(100 * i));
            assert!(kb
                .check_releases(t0 + Duration::from_millis(100 * i + 50))
                .is_empty());
        }
    }

    #[test]
    fn release_reports_pitch_from_press_time() {
        let mut kb = keyboard();
        let t0 = Instant::now();
        let pitch = kb.key_to_pitch('a').unwrap();
        kb.key_pressed('a', pitch, t0);
        kb.octave_up();
        let later = kb.key_to_pitch('a').unwrap();
        assert_eq!(kb.key_pressed('a', later, t0 + Duration::from_millis(10)), None);
        let released = kb.check_releases(t0 + Duration::from_secs(1));
        assert_eq!(released, vec![('a', 60)]);
    }

    #[test]
    fn release_all_clears() {
        let mut kb = keyboard();
        let t0 = Instant::now();
        kb.key_pressed('a', 60, t0);
        kb.key_pressed('d', 64, t0);
        let mut pitches = kb.release_all();
        pitches.sort();
        assert_eq!(pitches, vec![60, 64]);
        assert!(kb.release_all().is_empty());
    }
}
