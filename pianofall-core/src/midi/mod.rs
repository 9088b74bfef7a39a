//! MIDI input: raw note-on/note-off messages to scene events.
//!
//! midir delivers messages on its own thread. They are parsed there and
//! buffered in a channel until the host drains them at a frame boundary.

use midir::{MidiInput, MidiInputConnection};
use pianofall_types::InputEvent;
use std::sync::mpsc::{self, Receiver};

const NOTE_OFF: u8 = 0x8;
const NOTE_ON: u8 = 0x9;

/// Information about an available MIDI port
#[derive(Debug, Clone)]
pub struct MidiPortInfo {
    pub index: usize,
    pub name: String,
}

/// MIDI input manager
pub struct MidiInputManager {
    midi_in: Option<MidiInput>,
    connection: Option<MidiInputConnection<()>>,
    event_receiver: Option<Receiver<InputEvent>>,
    connected_port_name: Option<String>,
    available_ports: Vec<MidiPortInfo>,
}

impl MidiInputManager {
    pub fn new() -> Self {
        let midi_in = MidiInput::new("pianofall").ok();
        if midi_in.is_none() {
            log::warn!(target: "midi", "MIDI input unavailable");
        }
        Self {
            midi_in,
            connection: None,
            event_receiver: None,
            connected_port_name: None,
            available_ports: Vec::new(),
        }
    }

    /// Refresh the list of available MIDI input ports
    pub fn refresh_ports(&mut self) {
        self.available_ports.clear();

        if let Some(ref midi_in) = self.midi_in {
            let ports = midi_in.ports();
            for (index, port) in ports.iter().enumerate() {
                if let Ok(name) = midi_in.port_name(port) {
                    self.available_ports.push(MidiPortInfo { index, name });
                }
            }
        }
    }

    /// Get list of available MIDI input ports
    pub fn list_ports(&self) -> &[MidiPortInfo] {
        &self.available_ports
    }

    /// Get the name of the connected port
    pub fn connected_port_name(&self) -> Option<&str> {
        self.connected_port_name.as_deref()
    }

    /// Connect to a MIDI input port by index
    pub fn connect(&mut self, port_index: usize) -> Result<(), String> {
        self.disconnect();

        // connect() consumes the MidiInput, so open a fresh one for it
        let midi_in = MidiInput::new("pianofall").map_err(|e| e.to_string())?;
        let ports = midi_in.ports();

        let port = ports
            .get(port_index)
            .ok_or_else(|| format!("Invalid port index: {}", port_index))?;
        let port_name = midi_in
            .port_name(port)
            .unwrap_or_else(|_| "Unknown".to_string());

        let (tx, rx) = mpsc::channel();
        self.event_receiver = Some(rx);

        let connection = midi_in
            .connect(
                port,
                "pianofall-input",
                move |_timestamp, message, _| {
                    if let Some(event) = parse_note_message(message) {
                        let _ = tx.send(event);
                    }
                },
                (),
            )
            .map_err(|e| e.to_string())?;

        self.connection = Some(connection);
        self.connected_port_name = Some(port_name);

        // Recreate MidiInput for future port listing
        self.midi_in = MidiInput::new("pianofall").ok();

        Ok(())
    }

    /// Connect to the first port whose name contains `fragment` (case-insensitive).
    pub fn connect_by_name(&mut self, fragment: &str) -> Result<(), String> {
        self.refresh_ports();
        let needle = fragment.to_lowercase();
        let index = self
            .available_ports
            .iter()
            .find(|p| p.name.to_lowercase().contains(&needle))
            .map(|p| p.index)
            .ok_or_else(|| format!("No MIDI input matching {:?}", fragment))?;
        self.connect(index)
    }

    /// Disconnect from the current MIDI input port
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::info!(target: "midi", "disconnected");
        }
        self.event_receiver = None;
        self.connected_port_name = None;
    }

    /// Drain everything received since the last call (non-blocking).
    pub fn poll_events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        if let Some(ref rx) = self.event_receiver {
            while let Ok(event) = rx.try_recv() {
                events.push(event);
            }
        }
        events
    }
}

impl Default for MidiInputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MidiInputManager {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Parse a raw 3-byte note message. Anything that is not exactly three
/// bytes with a note-on or note-off status is ignored. Note-on with
/// velocity 0 counts as note-off.
pub fn parse_note_message(data: &[u8]) -> Option<InputEvent> {
    let &[status, note, velocity] = data else {
        return None;
    };
    let pitch = note as i32;
    match status >> 4 {
        NOTE_ON if velocity > 0 => Some(InputEvent::KeyPressed(pitch)),
        NOTE_ON | NOTE_OFF => Some(InputEvent::KeyReleased(pitch)),
        _ => None,
    }
}
