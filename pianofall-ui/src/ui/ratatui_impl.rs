use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, Event, KeyCode as CrosstermKeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use pianofall_types::{Color, DrawCommand};
use ratatui::{
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect as RatatuiRect,
    style::Color as RatatuiColor,
    widgets::Widget,
    Terminal,
};

use super::raster::Framebuffer;
use super::{AppEvent, InputSource, KeyCode, KeyInput, Modifiers};

const UPPER_HALF_BLOCK: &str = "\u{2580}";

/// Ratatui-based terminal backend
pub struct RatatuiBackend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    framebuffer: Framebuffer,
    keyboard_enhancement_enabled: bool,
}

impl RatatuiBackend {
    /// Create a new ratatui backend (does not start terminal mode)
    pub fn new() -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            framebuffer: Framebuffer::new(0, 0),
            keyboard_enhancement_enabled: false,
        })
    }

    /// Enter raw mode and alternate screen
    pub fn start(&mut self) -> io::Result<()> {
        enable_raw_mode()?;

        // Check terminal support BEFORE entering alternate screen
        let supports_enhancement = matches!(supports_keyboard_enhancement(), Ok(true));

        execute!(io::stdout(), EnterAlternateScreen)?;

        // Kitty protocol: repeats are reported as such instead of as presses
        if supports_enhancement
            && execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )
            .is_ok()
        {
            self.keyboard_enhancement_enabled = true;
        }
        log::debug!(target: "ui", "keyboard enhancement: {}", self.keyboard_enhancement_enabled);

        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        Ok(())
    }

    /// Leave raw mode and alternate screen
    pub fn stop(&mut self) -> io::Result<()> {
        // Pop keyboard enhancement flags BEFORE leaving alternate screen
        if self.keyboard_enhancement_enabled {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
            self.keyboard_enhancement_enabled = false;
        }

        self.terminal.show_cursor()?;
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    /// Terminal size in (columns, rows)
    pub fn size(&self) -> io::Result<(u16, u16)> {
        let size = self.terminal.size()?;
        Ok((size.width, size.height))
    }

    /// Rasterize a draw list at the current terminal size and show it.
    pub fn render(&mut self, cmds: &[DrawCommand], background: Color) -> io::Result<()> {
        let (cols, rows) = self.size()?;
        self.framebuffer
            .ensure_size(cols as usize, rows as usize * 2);
        self.framebuffer.clear(background);
        self.framebuffer.draw(cmds);

        let area = RatatuiRect::new(0, 0, cols, rows);
        let mut buffer = Buffer::empty(area);
        blit(&self.framebuffer, &mut buffer);

        self.terminal.draw(|f| {
            let area = f.area();
            f.render_widget(BufferWidget(buffer), area);
        })?;
        Ok(())
    }
}

/// Two framebuffer rows per cell: the upper pixel as foreground of a half
/// block, the lower one as background.
fn blit(fb: &Framebuffer, buffer: &mut Buffer) {
    let area = buffer.area;
    for y in 0..area.height {
        for x in 0..area.width {
            let (col, row) = (x as usize, y as usize * 2);
            let top = fb.get(col, row).unwrap_or(Color::BLACK);
            let bottom = fb.get(col, row + 1).unwrap_or(Color::BLACK);
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(to_ratatui(top))
                    .set_bg(to_ratatui(bottom));
            }
        }
    }
}

fn to_ratatui(color: Color) -> RatatuiColor {
    RatatuiColor::Rgb(color.r, color.g, color.b)
}

impl InputSource for RatatuiBackend {
    fn poll_event(&mut self, timeout: Duration) -> Option<AppEvent> {
        let mut t = timeout;
        loop {
            if !event::poll(t).ok()? {
                return None;
            }
            match event::read().ok()? {
                Event::Key(key_event) => {
                    // Skip Release events: held keys are tracked by timeout
                    if key_event.kind == KeyEventKind::Release {
                        t = Duration::ZERO;
                        continue;
                    }
                    return Some(AppEvent::Key(convert_key_event(key_event)));
                }
                Event::Resize(w, h) => {
                    return Some(AppEvent::Resize(w, h));
                }
                _ => {
                    // Discarded event (mouse, focus, paste): drain with zero timeout
                    t = Duration::ZERO;
                }
            }
        }
    }
}

fn convert_key_event(event: KeyEvent) -> KeyInput {
    let key = match event.code {
        CrosstermKeyCode::Char(c) => KeyCode::Char(c),
        CrosstermKeyCode::Esc => KeyCode::Escape,
        _ => KeyCode::Other,
    };

    let modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
    };

    KeyInput::new(key, modifiers)
}

/// Widget that renders a pre-built buffer
struct BufferWidget(Buffer);

impl Widget for BufferWidget {
    fn render(self, area: RatatuiRect, buf: &mut Buffer) {
        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                if x < self.0.area.width && y < self.0.area.height {
                    if let (Some(src), Some(dst)) = (self.0.cell((x, y)), buf.cell_mut((x, y))) {
                        *dst = src.clone();
                    }
                }
            }
        }
    }
}
