use std::path::{Path, PathBuf};
use std::time::Duration;

use pianofall_types::Palette;
use serde::Deserialize;

use crate::keyboard::MAX_PITCH;
use crate::particles::DEFAULT_MAX_PARTICLES;
use crate::scene::SceneConfig;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    particles: ParticlesConfig,
    #[serde(default)]
    runtime: RuntimeConfig,
}

#[derive(Deserialize, Default)]
struct LayoutConfig {
    first_note: Option<i32>,
    note_count: Option<u32>,
    min_aspect: Option<f32>,
    max_aspect: Option<f32>,
    time_scale: Option<f32>,
}

#[derive(Deserialize, Default)]
struct ParticlesConfig {
    max_particles: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Default)]
struct RuntimeConfig {
    target_fps: Option<u32>,
    midi_port: Option<String>,
    key_release_ms: Option<u64>,
}

pub struct Config {
    layout: LayoutConfig,
    particles: ParticlesConfig,
    runtime: RuntimeConfig,
}

impl Config {
    /// Embedded defaults, overridden by the user's config file if present.
    pub fn load() -> Self {
        Self::load_from(user_config_path().as_deref())
    }

    /// Embedded defaults, overridden by `user` if it exists and parses.
    pub fn load_from(user: Option<&Path>) -> Self {
        let mut base: ConfigFile =
            toml::from_str(DEFAULT_CONFIG).expect("Failed to parse embedded config.toml");

        if let Some(path) = user {
            if path.exists() {
                match std::fs::read_to_string(path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_layout(&mut base.layout, user.layout);
                            merge_particles(&mut base.particles, user.particles);
                            merge_runtime(&mut base.runtime, user.runtime);
                        }
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }

        Config {
            layout: base.layout,
            particles: base.particles,
            runtime: base.runtime,
        }
    }

    /// Scene settings, with out-of-range values replaced by defaults.
    pub fn scene(&self) -> SceneConfig {
        let fallback = SceneConfig::default();

        let (min_aspect, max_aspect) = match (self.layout.min_aspect, self.layout.max_aspect) {
            (Some(min), Some(max)) if min > 0.0 && min < max && max.is_finite() => (min, max),
            (None, None) => (fallback.min_aspect, fallback.max_aspect),
            (min, max) => {
                log::warn!(target: "config", "invalid aspect range {:?}..{:?}, using defaults", min, max);
                (fallback.min_aspect, fallback.max_aspect)
            }
        };

        let time_scale = match self.layout.time_scale {
            Some(ts) if ts.is_finite() && ts >= 1.0 => ts,
            Some(ts) => {
                log::warn!(target: "config", "invalid time_scale {}, using default", ts);
                fallback.time_scale
            }
            None => fallback.time_scale,
        };

        let first_note = match self.layout.first_note {
            Some(note) if (0..=MAX_PITCH).contains(&note) => note,
            Some(note) => {
                log::warn!(target: "config", "first_note {} is not a MIDI pitch, using default", note);
                fallback.first_note
            }
            None => fallback.first_note,
        };

        SceneConfig {
            first_note,
            note_count: self
                .layout
                .note_count
                .unwrap_or(fallback.note_count)
                .clamp(1, (MAX_PITCH + 1) as u32),
            min_aspect,
            max_aspect,
            time_scale,
            max_particles: self.particles.max_particles.unwrap_or(DEFAULT_MAX_PARTICLES),
            seed: self.particles.seed,
            palette: Palette::default(),
        }
    }

    /// Frames per second the host aims for (clamped to 1..=1000).
    pub fn target_fps(&self) -> u32 {
        self.runtime.target_fps.unwrap_or(144).clamp(1, 1000)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps() as f64)
    }

    /// Name fragment of the MIDI input to open at startup.
    pub fn midi_port(&self) -> Option<&str> {
        self.runtime.midi_port.as_deref()
    }

    /// Inactivity after which a computer-keyboard note is released.
    pub fn key_release_timeout(&self) -> Duration {
        Duration::from_millis(self.runtime.key_release_ms.unwrap_or(150).clamp(20, 5_000))
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pianofall").join("config.toml"))
}

fn merge_layout(base: &mut LayoutConfig, user: LayoutConfig) {
    if user.first_note.is_some() {
        base.first_note = user.first_note;
    }
    if user.note_count.is_some() {
        base.note_count = user.note_count;
    }
    if user.min_aspect.is_some() {
        base.min_aspect = user.min_aspect;
    }
    if user.max_aspect.is_some() {
        base.max_aspect = user.max_aspect;
    }
    if user.time_scale.is_some() {
        base.time_scale = user.time_scale;
    }
}

fn merge_particles(base: &mut ParticlesConfig, user: ParticlesConfig) {
    if user.max_particles.is_some() {
        base.max_particles = user.max_particles;
    }
    if user.seed.is_some() {
        base.seed = user.seed;
    }
}

fn merge_runtime(base: &mut RuntimeConfig, user: RuntimeConfig) {
    if user.target_fps.is_some() {
        base.target_fps = user.target_fps;
    }
    if user.midi_port.is_some() {
        base.midi_port = user.midi_port;
    }
    if user.key_release_ms.is_some() {
        base.key_release_ms = user.key_release_ms;
    }
}
