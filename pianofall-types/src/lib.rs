//! # pianofall-types
//!
//! Shared type definitions for the pianofall visualizer.
//! Plain data only: pitches and note intervals, screen geometry, colors,
//! the input events a scene consumes and the draw commands it produces.
//! The engine lives in `pianofall-core`; the terminal host in `pianofall-ui`.

pub mod color;
pub mod draw;
pub mod event;
pub mod geometry;
pub mod note;

pub use color::{hsv_to_rgb, Color, Palette};
pub use draw::DrawCommand;
pub use event::InputEvent;
pub use geometry::{Point, Rect};
pub use note::{is_black, pitch_class, NoteInterval, Pitch, BLACK_KEY_CLASSES, WHITE_KEY_CLASSES};
