use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, Receiver};

use lyric_sync_core::pipeline::import_songs_use_case::{ImportReport, ImportSongsUseCase};
use lyric_sync_core::session::domain::app_state::{AppState, SessionError};
use lyric_sync_core::session::domain::song::Song;
use lyric_sync_core::sync::domain::clock::{Clock, SystemClock};
use lyric_sync_core::sync::domain::playback_sync::clock_label;
use lyric_sync_core::sync::infrastructure::sync_worker::{self, SyncMessage, SyncParams};

use crate::player;
use crate::render::TerminalRenderer;
use crate::settings::Settings;

pub const HELP: &str = "\
Commands:
  list                     show the playlist
  import <file>...         transcribe mp3/wav files into the playlist
  select <number|name>     choose a song
  play                     start playback of the selected song
  export <number|name> <path>
                           write a song's timed lyrics to a file
  help                     show this message
  quit                     leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Import(Vec<PathBuf>),
    Select(String),
    Play,
    Export { song: String, path: PathBuf },
    Help,
    Quit,
    Nothing,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(Command::Nothing);
        };
        let args: Vec<&str> = words.collect();

        match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("list" | "ls", []) => Ok(Command::List),
            ("import", []) => Err("import needs at least one file".to_string()),
            ("import", files) => Ok(Command::Import(files.iter().map(PathBuf::from).collect())),
            ("select", []) => Err("select needs a song number or name".to_string()),
            ("select", name) => Ok(Command::Select(name.join(" "))),
            ("play", []) => Ok(Command::Play),
            ("export", [song, path]) => Ok(Command::Export {
                song: song.to_string(),
                path: PathBuf::from(path),
            }),
            ("export", _) => Err("usage: export <number|name> <path>".to_string()),
            ("help" | "?", _) => Ok(Command::Help),
            ("quit" | "exit" | "q", []) => Ok(Command::Quit),
            (other, _) => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Resolve a 1-based playlist number or a song name to an index.
fn song_index(state: &AppState, key: &str) -> Result<usize, SessionError> {
    match key.parse::<usize>() {
        Ok(0) => Err(SessionError::IndexOutOfRange {
            index: 0,
            len: state.playlist().len(),
        }),
        Ok(n) => Ok(n - 1),
        Err(_) => state
            .playlist()
            .position(key)
            .ok_or_else(|| SessionError::UnknownSong(key.to_string())),
    }
}

/// Lines typed on stdin, read on a background thread so playback can
/// watch for them. The channel closes on EOF.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Builds the importer on first use, since that may download a model.
pub type ImporterFactory =
    Box<dyn Fn(&Settings) -> Result<ImportSongsUseCase, Box<dyn std::error::Error>>>;

pub struct InteractiveSession {
    state: AppState,
    settings: Settings,
    renderer: TerminalRenderer,
    input: Receiver<String>,
    clock: Arc<dyn Clock>,
    make_importer: ImporterFactory,
    importer: Option<ImportSongsUseCase>,
}

impl InteractiveSession {
    pub fn new(
        state: AppState,
        settings: Settings,
        input: Receiver<String>,
        make_importer: ImporterFactory,
    ) -> Self {
        let renderer = TerminalRenderer::from_env(settings.context_lines);
        Self {
            state,
            settings,
            renderer,
            input,
            clock: Arc::new(SystemClock),
            make_importer,
            importer: None,
        }
    }

    pub fn run(&mut self, initial: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
        if !initial.is_empty() {
            self.import(initial)?;
        }
        println!("{HELP}");
        self.print_playlist();

        loop {
            print!("> ");
            io::stdout().flush()?;
            let Ok(line) = self.input.recv() else {
                break;
            };
            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => {
                    if let Err(e) = self.handle(command) {
                        eprintln!("Error: {e}");
                    }
                }
                Err(msg) => eprintln!("{msg}"),
            }
        }
        Ok(())
    }

    fn handle(&mut self, command: Command) -> Result<(), Box<dyn std::error::Error>> {
        match command {
            Command::List => self.print_playlist(),
            Command::Import(paths) => self.import(paths)?,
            Command::Select(key) => {
                let song = match key.parse::<usize>() {
                    Ok(_) => {
                        let index = song_index(&self.state, &key)?;
                        self.state.select(index)?
                    }
                    Err(_) => {
                        if !self.state.playlist().contains(&key) {
                            return Err(format!(
                                "no song named '{key}' (playlist: {})",
                                self.state.playlist().names().join(", ")
                            )
                            .into());
                        }
                        self.state.select_by_name(&key)?
                    }
                };
                println!(
                    "Selected {} ({}). Type 'play' to start.",
                    song.name(),
                    clock_label(song.duration_seconds())
                );
            }
            Command::Play => play_selected(
                &mut self.state,
                &self.settings,
                &self.renderer,
                &self.input,
                self.clock.clone(),
            )?,
            Command::Export { song, path } => {
                let index = song_index(&self.state, &song)?;
                let len = self.state.playlist().len();
                let song = self
                    .state
                    .playlist()
                    .get(index)
                    .ok_or(SessionError::IndexOutOfRange { index, len })?;
                fs::write(&path, song.lyrics_text())?;
                println!("Wrote lyrics for {} to {}", song.name(), path.display());
            }
            Command::Help => println!("{HELP}"),
            Command::Quit | Command::Nothing => {}
        }
        Ok(())
    }

    fn import(&mut self, paths: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
        if self.importer.is_none() {
            self.importer = Some((self.make_importer)(&self.settings)?);
        }
        let Some(importer) = self.importer.as_mut() else {
            return Ok(());
        };
        let report = importer.execute(&paths, &mut self.state);
        print_report(&report);
        Ok(())
    }

    fn print_playlist(&self) {
        if self.state.playlist().is_empty() {
            println!("Playlist is empty. Use 'import <file>' to add songs.");
            return;
        }
        let selected = self.state.selected_song().map(Song::name);
        println!("Your playlist:");
        for (i, song) in self.state.playlist().iter().enumerate() {
            let marker = if Some(song.name()) == selected { '*' } else { ' ' };
            println!(
                "{marker} {}. {} ({})",
                i + 1,
                song.name(),
                clock_label(song.duration_seconds())
            );
        }
    }
}

pub fn print_report(report: &ImportReport) {
    for name in &report.imported {
        println!("Processed {name}!");
    }
    for name in &report.duplicates {
        println!("{name} is already in the playlist");
    }
    for failure in &report.failures {
        eprintln!("Error processing {}: {}", failure.name, failure.error);
    }
}

/// Start the selected song and render frames until the user presses Enter
/// or, with `stop_at_end`, the track ends. Once stdin closes there is no
/// stop key, so playback always ends with the track. Leaves the state back
/// in `Selected`.
pub fn play_selected(
    state: &mut AppState,
    settings: &Settings,
    renderer: &TerminalRenderer,
    input: &Receiver<String>,
    clock: Arc<dyn Clock>,
) -> Result<(), Box<dyn std::error::Error>> {
    let playback = state.start(clock.now())?;
    let song = state.selected_song().ok_or(SessionError::NothingSelected)?;
    let title = song.name().to_string();

    if settings.open_audio {
        player::open_audio(song.audio_path());
    }

    let (frames, handle) = sync_worker::spawn(
        SyncParams {
            track: song.track().clone(),
            state: playback,
            interval: Duration::from_millis(settings.poll_interval_ms),
            mode: settings.highlight_mode,
            stop_at_end: settings.stop_at_end,
        },
        clock,
    );

    let mut stdout = io::stdout();
    let mut keys = input.clone();
    let mut stop_key = true;
    loop {
        let mut keys_closed = false;
        select! {
            recv(frames) -> msg => match msg {
                Ok(SyncMessage::Frame(frame)) => {
                    write!(stdout, "{}", renderer.render(&title, &frame))?;
                    stdout.flush()?;
                    if !stop_key && frame.is_complete() {
                        println!("Finished {title}.");
                        break;
                    }
                }
                Ok(SyncMessage::Error(e)) => {
                    log::error!("Sync stopped: {e}");
                    break;
                }
                Ok(SyncMessage::Finished) => {
                    println!("Finished {title}.");
                    break;
                }
                Ok(SyncMessage::Cancelled) | Err(_) => break,
            },
            recv(keys) -> key => match key {
                Ok(_) => {
                    println!("Stopped {title}.");
                    break;
                }
                Err(_) => keys_closed = true,
            },
        }
        if keys_closed {
            log::debug!("Input closed, playing {title} to the end");
            keys = crossbeam_channel::never();
            stop_key = false;
        }
    }

    handle.stop();
    state.reset();
    Ok(())
}
