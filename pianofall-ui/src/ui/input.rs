use std::time::{Duration, Instant};

/// Top-level terminal event: keyboard or resize
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    Key(KeyInput),
    /// New terminal size in columns and rows
    Resize(u16, u16),
}

/// Key codes the visualizer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Escape,
    Other,
}

/// Modifier key state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
}

/// A key press from the terminal
#[derive(Debug, Clone, Copy)]
pub struct KeyInput {
    pub key: KeyCode,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl PartialEq for KeyInput {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.modifiers == other.modifiers
    }
}

impl Eq for KeyInput {}

impl KeyInput {
    pub fn new(key: KeyCode, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            timestamp: Instant::now(),
        }
    }

    /// Plain character without ctrl or alt, if any.
    pub fn plain_char(&self) -> Option<char> {
        match self.key {
            KeyCode::Char(c) if !self.modifiers.ctrl && !self.modifiers.alt => Some(c),
            _ => None,
        }
    }
}

/// Trait for reading input events
pub trait InputSource {
    /// Poll for an input event with a timeout
    /// Returns None if no event is available within the timeout
    fn poll_event(&mut self, timeout: Duration) -> Option<AppEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_char_ignores_modified_keys() {
        let a = KeyInput::new(KeyCode::Char('a'), Modifiers::default());
        assert_eq!(a.plain_char(), Some('a'));

        let ctrl_c = KeyInput::new(
            KeyCode::Char('c'),
            Modifiers {
                ctrl: true,
                alt: false,
            },
        );
        assert_eq!(ctrl_c.plain_char(), None);

        let esc = KeyInput::new(KeyCode::Escape, Modifiers::default());
        assert_eq!(esc.plain_char(), None);
    }

    #[test]
    fn equality_ignores_timestamp() {
        let a = KeyInput::new(KeyCode::Char('x'), Modifiers::default());
        let mut b = KeyInput::new(KeyCode::Char('x'), Modifiers::default());
        b.timestamp += Duration::from_millis(30);
        assert_eq!(a, b);
        assert_ne!(a, KeyInput::new(KeyCode::Char('y'), Modifiers::default()));
    }
}
