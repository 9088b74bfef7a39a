pub mod input;
pub mod piano_keyboard;
pub mod ratatui_impl;
pub mod raster;

pub use input::{AppEvent, InputSource, KeyCode, KeyInput, Modifiers};
pub use piano_keyboard::PianoKeyboard;
pub use ratatui_impl::RatatuiBackend;
pub use raster::scene_size;
