use serde::{Deserialize, Serialize};

use crate::note::Pitch;

/// Input delivered to a scene once per frame, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyPressed(Pitch),
    KeyReleased(Pitch),
    /// New drawable area in scene pixels.
    Resize { width: f32, height: f32 },
    /// Ask the host to leave the visualizer.
    Quit,
}

impl InputEvent {
    /// Pitch carried by a key event.
    pub fn pitch(&self) -> Option<Pitch> {
        match self {
            InputEvent::KeyPressed(p) | InputEvent::KeyReleased(p) => Some(*p),
            InputEvent::Resize { .. } | InputEvent::Quit => None,
        }
    }
}
