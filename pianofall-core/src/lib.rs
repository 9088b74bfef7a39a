//! # pianofall-core
//!
//! Engine for a falling-notes piano visualizer: note timeline, key
//! geometry, particle effects and the per-frame draw list. Independent of
//! any windowing or terminal library.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pianofall_core::config::Config;
//! use pianofall_core::scene::{Scene, Transition};
//! use pianofall_types::InputEvent;
//!
//! let config = Config::load();
//! let mut scene = Scene::new(config.scene(), 1000.0, 600.0)?;
//!
//! // once per frame
//! let events = vec![InputEvent::KeyPressed(60)];
//! if scene.update(dt, &events) == Transition::Exit {
//!     return Ok(());
//! }
//! let commands = scene.draw();
//! ```
//!
//! ## Module Overview
//!
//! - [`scene`]: `Scene`, the composition root: `update()` and `draw()`
//! - [`timeline`]: held keys and completed note history
//! - [`keyboard`]: per-pitch key position and width
//! - [`aspect`]: aspect-ratio clamping for the octave cell
//! - [`particles`]: emitter and integrator for the key sparks
//! - [`config`]: TOML configuration (embedded defaults + user override)
//! - [`midi`]: note-on/off parsing and MIDI input ports
//! - [`error`]: `SceneError`

pub mod aspect;
pub mod config;
pub mod error;
pub mod keyboard;
pub mod midi;
pub mod particles;
pub mod scene;
pub mod timeline;

pub use error::{SceneError, SceneResult};
pub use scene::{Scene, SceneConfig, Transition};
