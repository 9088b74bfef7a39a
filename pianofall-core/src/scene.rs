//! The visualizer scene: owns the clock, the keyboard layout, the note
//! timeline and the particle system, and turns them into a draw list.
//!
//! A host drives it once per frame:
//!
//! ```rust,ignore
//! let transition = scene.update(dt, &events);
//! renderer.render(&scene.draw());
//! if transition == Transition::Exit { break; }
//! ```

use std::time::Duration;

use pianofall_types::{
    is_black, DrawCommand, InputEvent, NoteInterval, Palette, Pitch, Point, Rect,
    WHITE_KEY_CLASSES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::aspect::AspectClamper;
use crate::error::{SceneError, SceneResult};
use crate::keyboard::KeyboardLayout;
use crate::particles::{EmissionSource, ParticleSystem, DEFAULT_MAX_PARTICLES};
use crate::timeline::Timeline;

/// Time grid lines per second of history.
const GRID_DIVIDER: f64 = 2.0;
const DIVIDER_THICKNESS: f32 = 2.0;
const NOTE_BORDER_THICKNESS: f32 = 4.0;
/// Offsets within an octave that get a divider line (C and F).
const DIVIDER_OFFSETS: [Pitch; 2] = [0, 5];
/// (slot among the 7 white keys, pitch class) for each black key.
const BLACK_KEY_SLOTS: [(f32, i32); 5] = [(1.0, 1), (2.0, 3), (4.0, 6), (5.0, 8), (6.0, 10)];
/// Black key width in white-key widths.
const BLACK_KEY_WIDTH: f32 = 0.5;
/// Black key length as a share of the piano height.
const BLACK_KEY_LENGTH: f32 = 0.7;
/// Octaves drawn on either side of the keyboard, at most.
const MAX_OCTAVE_SPAN: i32 = 128;
/// Upper bound on time grid lines per frame.
const MAX_GRID_LINES: i64 = 1024;

/// What the host should do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Exit,
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub first_note: Pitch,
    pub note_count: u32,
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Scroll speed in pixels per second.
    pub time_scale: f32,
    pub max_particles: usize,
    pub seed: Option<u64>,
    pub palette: Palette,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            first_note: 36,
            note_count: 49,
            min_aspect: 1.2,
            max_aspect: 1.6,
            time_scale: 200.0,
            max_particles: DEFAULT_MAX_PARTICLES,
            seed: None,
            palette: Palette::default(),
        }
    }
}

pub struct Scene {
    time_scale: f32,
    palette: Palette,
    clock: Duration,
    layout: KeyboardLayout,
    timeline: Timeline,
    particles: ParticleSystem,
    rng: StdRng,
}

impl Scene {
    pub fn new(config: SceneConfig, width: f32, height: f32) -> SceneResult<Self> {
        if !(config.time_scale.is_finite() && config.time_scale > 0.0) {
            return Err(SceneError::InvalidTimeScale {
                time_scale: config.time_scale,
            });
        }
        let clamper = AspectClamper::new(config.min_aspect, config.max_aspect)?;
        let layout = KeyboardLayout::new(config.first_note, config.note_count, clamper, width, height)?;
        let rng = match config.seed {
            // Jitter and particle streams must differ for the same seed
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        log::info!(
            target: "scene",
            "scene {}x{}, notes {}..{}",
            width,
            height,
            config.first_note,
            config.first_note + config.note_count as Pitch
        );
        Ok(Self {
            time_scale: config.time_scale,
            palette: config.palette,
            clock: Duration::ZERO,
            layout,
            timeline: Timeline::new(),
            particles: ParticleSystem::new(config.max_particles, config.seed),
            rng,
        })
    }

    /// Scene time in seconds.
    pub fn now(&self) -> f64 {
        self.clock.as_secs_f64()
    }

    /// Vertical screen position of scene time `t`: "now" sits on top of the
    /// piano and older times scroll upward.
    pub fn screen_y(&self, t: f64) -> f32 {
        time_to_y(self.layout.history_height(), self.now(), self.time_scale, t)
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn key_pressed(&mut self, pitch: Pitch) -> SceneResult {
        self.check_pitch(pitch)?;
        let now = self.now();
        self.timeline.press(pitch, now);
        Ok(())
    }

    pub fn key_released(&mut self, pitch: Pitch) -> SceneResult<Option<NoteInterval>> {
        self.check_pitch(pitch)?;
        let now = self.now();
        Ok(self.timeline.release(pitch, now))
    }

    pub fn resize(&mut self, width: f32, height: f32) -> SceneResult {
        self.layout.resize(width, height)
    }

    /// Apply one input event immediately.
    pub fn apply_event(&mut self, event: InputEvent) -> SceneResult<Transition> {
        match event {
            InputEvent::KeyPressed(pitch) => self.key_pressed(pitch)?,
            InputEvent::KeyReleased(pitch) => {
                self.key_released(pitch)?;
            }
            InputEvent::Resize { width, height } => self.resize(width, height)?,
            InputEvent::Quit => return Ok(Transition::Exit),
        }
        Ok(Transition::Stay)
    }

    /// Advance one frame. Events are applied in order after the clock and
    /// particles move; rejected events are logged and dropped.
    pub fn update(&mut self, dt: Duration, events: &[InputEvent]) -> Transition {
        self.clock += dt;
        self.particles.update(dt);

        let mut transition = Transition::Stay;
        for event in events {
            match self.apply_event(*event) {
                Ok(Transition::Exit) => transition = Transition::Exit,
                Ok(Transition::Stay) => {}
                Err(e) => log::warn!(target: "scene", "dropping {:?}: {}", event, e),
            }
        }

        self.refresh_sources();
        let culled = self.cull();
        if culled > 0 {
            log::trace!(target: "scene", "culled {} notes", culled);
        }
        transition
    }

    /// Drop all notes, held keys and particles. The clock keeps running.
    pub fn clear(&mut self) {
        self.timeline.clear();
        self.particles.clear();
    }

    fn check_pitch(&self, pitch: Pitch) -> SceneResult {
        if self.layout.contains(pitch) {
            Ok(())
        } else {
            Err(SceneError::MalformedEvent { pitch })
        }
    }

    fn refresh_sources(&mut self) {
        let y = self.layout.history_height();
        let layout = &self.layout;
        let rng = &mut self.rng;
        let sources = self
            .timeline
            .held_pitches()
            .map(|pitch| EmissionSource {
                x: layout.x(pitch) + rng.gen_range(-0.5f32..=0.5) * layout.width(pitch),
                y,
            })
            .collect();
        self.particles.set_sources(sources);
    }

    /// Oldest-first removal of notes that ended above the top edge. Assumes
    /// history is ordered by end time, which holds for a monotonic clock.
    fn cull(&mut self) -> usize {
        let history_height = self.layout.history_height();
        let now = self.now();
        let time_scale = self.time_scale;
        self.timeline
            .cull_front(|note| time_to_y(history_height, now, time_scale, note.end) < 0.0)
    }

    /// Build the frame's draw list, back to front.
    pub fn draw(&self) -> Vec<DrawCommand> {
        let mut out = Vec::new();
        let (left, right) = self.octave_span();

        self.draw_time_grid(&mut out);
        self.draw_dividers(&mut out, left, right);

        for note in self.timeline.history() {
            self.draw_note(&mut out, note.pitch, note.start, note.end);
        }
        let now = self.now();
        for (pitch, start) in self.timeline.held() {
            self.draw_note(&mut out, pitch, start, now);
        }

        for octave in -left..right {
            self.draw_octave(&mut out, octave);
        }

        out.extend(self.particles.draw());
        out
    }

    /// Octaves to draw left and right of the first note so the keyboard
    /// pattern fills the screen.
    fn octave_span(&self) -> (i32, i32) {
        let first = self.layout.first_note();
        let octave_width = self.layout.octave_width();
        let count = self.layout.note_count() as Pitch;
        let span = |x: f32| ((x / octave_width).ceil() as i32).clamp(0, MAX_OCTAVE_SPAN);
        (
            span(self.layout.x(first)),
            span(self.layout.x(first + count)),
        )
    }

    fn draw_time_grid(&self, out: &mut Vec<DrawCommand>) {
        let history_height = self.layout.history_height();
        let step = self.time_scale as f64 / GRID_DIVIDER;
        let lines = (history_height as i64 / step.floor().max(1.0) as i64 + 1).min(MAX_GRID_LINES);
        let phase = (self.now() * GRID_DIVIDER).rem_euclid(1.0);
        for t in 0..lines {
            let y = history_height - ((t as f64 + phase) * step) as f32;
            out.push(DrawCommand::Line {
                from: Point::new(0.0, y),
                to: Point::new(self.layout.screen_width(), y),
                color: self.palette.grid_line,
                thickness: 1.0,
            });
        }
    }

    fn draw_dividers(&self, out: &mut Vec<DrawCommand>, left: i32, right: i32) {
        let first = self.layout.first_note();
        let history_height = self.layout.history_height();
        for octave in -left..right {
            for offset in DIVIDER_OFFSETS {
                let x = self.layout.left(first + offset + 12 * octave);
                out.push(DrawCommand::Line {
                    from: Point::new(x, 0.0),
                    to: Point::new(x, history_height),
                    color: self.palette.divider_line,
                    thickness: DIVIDER_THICKNESS,
                });
            }
        }
    }

    fn draw_note(&self, out: &mut Vec<DrawCommand>, pitch: Pitch, start: f64, end: f64) {
        let width = self.layout.width(pitch);
        let rect = Rect::new(
            self.layout.left(pitch),
            self.screen_y(start),
            width,
            ((end - start) * self.time_scale as f64) as f32,
        );
        let (fill, border) = self.palette.note_colors(is_black(pitch));
        out.push(DrawCommand::FilledRect { rect, color: fill });
        out.push(DrawCommand::StrokedRect {
            rect,
            color: border,
            thickness: NOTE_BORDER_THICKNESS,
        });
    }

    /// One octave of piano keys, whites first so blacks overlap them. The
    /// keys use an even 7-white division, not the note-bar widths.
    fn draw_octave(&self, out: &mut Vec<DrawCommand>, octave: i32) {
        let first = self.layout.first_note();
        let octave_width = self.layout.octave_width();
        let piano_height = self.layout.piano_height();
        let y = self.layout.history_height();
        let x0 = self.layout.left(first) + octave as f32 * octave_width;
        let base = first + 12 * octave;
        let white_width = octave_width / 7.0;

        for (slot, class) in WHITE_KEY_CLASSES.iter().enumerate() {
            let color = if self.timeline.is_pressed(base + class) {
                self.palette.white_key_held
            } else {
                self.palette.white_key
            };
            out.push(DrawCommand::FilledRect {
                rect: Rect::new(
                    x0 + slot as f32 * white_width,
                    y,
                    (white_width - 1.0).max(0.0),
                    piano_height,
                ),
                color,
            });
        }
        for (slot, class) in BLACK_KEY_SLOTS {
            let color = if self.timeline.is_pressed(base + class) {
                self.palette.black_key_held
            } else {
                self.palette.black_key
            };
            out.push(DrawCommand::FilledRect {
                rect: Rect::new(
                    x0 + (slot - BLACK_KEY_WIDTH / 2.0) * white_width,
                    y,
                    BLACK_KEY_WIDTH * white_width,
                    piano_height * BLACK_KEY_LENGTH,
                ),
                color,
            });
        }
    }
}

/// Scene time to screen y. Shared by drawing and culling.
fn time_to_y(history_height: f32, now: f64, time_scale: f32, t: f64) -> f32 {
    history_height - ((now - t) * time_scale as f64) as f32
}
