//! Console host for the Readily reader.
//!
//! Usage:
//!   readily [--wpm N] [--pause X] [--chunk N] [--state PATH] [FILE]
//!
//! Type commands on stdin (`toggle`, `faster`, `seek 50`, `find some words`,
//! `mode`, `open book.epub`, `quit`, ...). The reading session is saved to
//! `$READILY_STATE` (default `./readily.state`).

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use log::{info, warn};
use readily_core::{
    app::{ReaderApp, ReaderConfig, TickResult},
    playback::TickScheduler,
    settings::SessionStore,
};

use console::ConsoleInput;
use loading::LoadingCoordinator;
use session_store::FileSessionStore;
use settings_sync::SessionSyncState;

#[path = "main/console.rs"]
mod console;
#[path = "main/loading.rs"]
mod loading;
#[path = "main/session_store.rs"]
mod session_store;
#[path = "main/settings_sync.rs"]
mod settings_sync;

const DEFAULT_STATE_FILE: &str = "readily.state";
const STATE_ENV_VAR: &str = "READILY_STATE";
const ORP_ANCHOR_COLUMN: usize = 12;
const SESSION_SAVE_DEBOUNCE_MS: u64 = 1_500;
const LOOP_INTERVAL_MS: u64 = 1;

struct HostConfig {
    reader: ReaderConfig,
    state_path: PathBuf,
    open_path: Option<PathBuf>,
}

impl HostConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut reader = ReaderConfig::default();
        let mut state_path = std::env::var_os(STATE_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE));
        let mut open_path = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--wpm" => {
                    i += 1;
                    if let Some(value) = args.get(i).and_then(|v| v.parse().ok()) {
                        reader.words_per_minute = value;
                    }
                }
                "--pause" => {
                    i += 1;
                    if let Some(value) = args.get(i).and_then(|v| v.parse().ok()) {
                        reader.sentence_pause_multiplier = value;
                    }
                }
                "--chunk" => {
                    i += 1;
                    if let Some(value) = args.get(i).and_then(|v| v.parse().ok()) {
                        reader.chunk_size = value;
                    }
                }
                "--state" => {
                    i += 1;
                    if let Some(value) = args.get(i) {
                        state_path = PathBuf::from(value);
                    }
                }
                other if !other.starts_with("--") => {
                    open_path = Some(PathBuf::from(other));
                }
                other => warn!("args: unknown flag {}", other),
            }
            i += 1;
        }

        Self {
            reader: reader.normalized(),
            state_path,
            open_path,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let host = HostConfig::from_args();
    let mut app = ReaderApp::new(TickScheduler::new(), ConsoleInput::spawn(), host.reader);

    let mut store = FileSessionStore::new(&host.state_path);
    match store.load() {
        Ok(Some(session)) => app.restore(session),
        Ok(None) => info!("session-store: no saved session"),
        Err(err) => warn!("session-store: ignoring saved session err={}", err),
    }

    let mut session_sync = SessionSyncState::new(app.session_fingerprint());
    let mut loader = LoadingCoordinator::new();
    if let Some(path) = host.open_path.as_deref() {
        loader.start(&mut app, path);
    }

    let config = app.config();
    info!(
        "Reader started: wpm={} pause_x={} chunk={} state={}",
        config.words_per_minute,
        config.sentence_pause_multiplier,
        config.chunk_size,
        store.path().display()
    );

    let loop_start = Instant::now();
    loop {
        let now_ms = loop_start.elapsed().as_millis() as u64;

        let delivered = loader.deliver(&mut app);
        if let Some(path) = app.take_import_request() {
            loader.start(&mut app, &PathBuf::from(path));
        }

        let app_requests_render = app.tick(now_ms) == TickResult::RenderRequested;
        if app_requests_render || delivered {
            app.with_screen(|screen| println!("{}", console::render(screen)));
        }

        session_sync.track_current(app.session_fingerprint(), now_ms);
        session_sync.flush_if_due(Some(&mut store), now_ms, || app.persisted_session());

        if app.quit_requested() {
            session_sync.flush(Some(&mut store), now_ms, || app.persisted_session());
            if session_sync.has_pending() {
                warn!("session-store: last changes were not saved");
            }
            if loader.in_flight() > 0 {
                info!("loader: abandoning {} pending imports", loader.in_flight());
            }
            info!("Reader stopped at index={}", app.current_index());
            break;
        }

        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
