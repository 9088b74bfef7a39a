mod ui;

use std::fs::File;
use std::io;
use std::time::Instant;

use pianofall_core::config::Config;
use pianofall_core::midi::MidiInputManager;
use pianofall_core::{Scene, Transition};
use pianofall_types::InputEvent;
use ui::{scene_size, AppEvent, InputSource, KeyCode, KeyInput, PianoKeyboard, RatatuiBackend};

fn init_logging(verbose: bool) {
    use simplelog::*;

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("pianofall")
        .join("pianofall.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Logging is best effort: the terminal is taken over, so stderr is no fallback
    let log_file = match File::create(&log_path).or_else(|_| File::create("/tmp/pianofall.log")) {
        Ok(file) => file,
        Err(_) => return,
    };

    if WriteLogger::init(log_level, Config::default(), log_file).is_err() {
        return;
    }

    log::info!("pianofall starting (log level: {:?})", log_level);
}

struct Args {
    verbose: bool,
    list_ports: bool,
    port: Option<usize>,
}

fn parse_args(args: &[String]) -> io::Result<Args> {
    let port = match args.iter().position(|a| a == "--port") {
        Some(i) => {
            let value = args.get(i + 1).ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "--port needs a port index")
            })?;
            let index = value.parse().map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid port index: {}", value),
                )
            })?;
            Some(index)
        }
        None => None,
    };
    Ok(Args {
        verbose: args.iter().any(|a| a == "--verbose" || a == "-v"),
        list_ports: args.iter().any(|a| a == "--list-ports"),
        port,
    })
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;
    init_logging(args.verbose);

    let config = Config::load();
    let mut midi_input = MidiInputManager::new();
    midi_input.refresh_ports();

    if args.list_ports {
        for port in midi_input.list_ports() {
            println!("{}: {}", port.index, port.name);
        }
        return Ok(());
    }

    connect_midi(&mut midi_input, &config, args.port);

    let mut backend = RatatuiBackend::new()?;
    backend.start()?;

    let result = run(&mut backend, &config, &midi_input);

    backend.stop()?;
    if let Err(ref e) = result {
        log::error!("exiting: {}", e);
    }
    result
}

/// `--port` wins over the configured name; otherwise the first port, if any.
fn connect_midi(midi_input: &mut MidiInputManager, config: &Config, port: Option<usize>) {
    let result = match (port, config.midi_port()) {
        (Some(index), _) => midi_input.connect(index),
        (None, Some(name)) => midi_input.connect_by_name(name),
        (None, None) if !midi_input.list_ports().is_empty() => midi_input.connect(0),
        (None, None) => {
            log::info!(target: "midi", "no MIDI input ports, computer keyboard only");
            return;
        }
    };
    match result {
        Ok(()) => log::info!(
            target: "midi",
            "listening on {}",
            midi_input.connected_port_name().unwrap_or("unknown port")
        ),
        Err(e) => log::warn!(target: "midi", "MIDI connect failed: {}", e),
    }
}

fn run(backend: &mut RatatuiBackend, config: &Config, midi_input: &MidiInputManager) -> io::Result<()> {
    let (cols, rows) = backend.size()?;
    let (width, height) = scene_size(cols, rows);
    let mut scene = Scene::new(config.scene(), width, height)?;
    let mut piano = PianoKeyboard::new(config.key_release_timeout());
    let frame_interval = config.frame_interval();

    let mut last_frame = Instant::now();
    let mut events: Vec<InputEvent> = Vec::new();

    loop {
        // Wait for input until the next frame is due
        let deadline = last_frame + frame_interval;
        while let Some(app_event) =
            backend.poll_event(deadline.saturating_duration_since(Instant::now()))
        {
            match app_event {
                AppEvent::Resize(cols, rows) => {
                    let (width, height) = scene_size(cols, rows);
                    events.push(InputEvent::Resize { width, height });
                }
                AppEvent::Key(key) => handle_key(key, &mut piano, &mut scene, &mut events),
            }
        }

        // MIDI first so a note pressed and released within one frame stays ordered
        let mut batch = midi_input.poll_events();
        batch.append(&mut events);
        for (_, pitch) in piano.check_releases(Instant::now()) {
            batch.push(InputEvent::KeyReleased(pitch));
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame);
        last_frame = now;

        if scene.update(dt, &batch) == Transition::Exit {
            log::info!("quit requested");
            return Ok(());
        }

        backend.render(&scene.draw(), scene.palette().background)?;
    }
}

fn handle_key(key: KeyInput, piano: &mut PianoKeyboard, scene: &mut Scene, events: &mut Vec<InputEvent>) {
    if key.key == KeyCode::Escape || (key.key == KeyCode::Char('c') && key.modifiers.ctrl) {
        events.push(InputEvent::Quit);
        return;
    }
    let Some(c) = key.plain_char() else {
        return;
    };
    match c {
        ' ' => {
            piano.release_all();
            events.retain(|e| e.pitch().is_none());
            scene.clear();
        }
        'z' => {
            piano.octave_down();
            log::debug!(target: "ui", "octave {}", piano.octave());
        }
        'x' => {
            piano.octave_up();
            log::debug!(target: "ui", "octave {}", piano.octave());
        }
        c => {
            if let Some(pitch) = piano.key_to_pitch(c) {
                if let Some(pitch) = piano.key_pressed(c, pitch, key.timestamp) {
                    events.push(InputEvent::KeyPressed(pitch));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_flags() {
        let parsed = parse_args(&args(&["pianofall", "-v", "--port", "2"])).unwrap();
        assert!(parsed.verbose);
        assert!(!parsed.list_ports);
        assert_eq!(parsed.port, Some(2));

        let parsed = parse_args(&args(&["pianofall", "--list-ports"])).unwrap();
        assert!(parsed.list_ports);
        assert_eq!(parsed.port, None);
    }

    #[test]
    fn parse_rejects_bad_port() {
        assert!(parse_args(&args(&["pianofall", "--port"])).is_err());
        assert!(parse_args(&args(&["pianofall", "--port", "two"])).is_err());
    }
}
