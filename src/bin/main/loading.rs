use std::{
    fs,
    path::Path,
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use log::{debug, info, warn};
use readily_core::{
    ReaderError,
    app::{ImportOutcome, ImportTicket, ReaderApp},
    content::{self, Fragment},
    input::InputProvider,
    playback::Scheduler,
};

/// Extraction result travelling back from a worker thread.
pub(super) struct LoadedDocument {
    ticket: ImportTicket,
    result: Result<Vec<Fragment>, ReaderError>,
}

/// Runs document extraction off the UI loop; the app decides which result
/// still applies through its import tickets.
pub(super) struct LoadingCoordinator {
    tx: Sender<LoadedDocument>,
    rx: Receiver<LoadedDocument>,
    in_flight: usize,
}

impl LoadingCoordinator {
    pub(super) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub(super) fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Issues a ticket and starts a worker for `path`. Unsupported files are
    /// rejected by the app before any bytes are read.
    pub(super) fn start<S, IN>(&mut self, app: &mut ReaderApp<S, IN>, path: &Path)
    where
        S: Scheduler,
        IN: InputProvider,
    {
        let file_name = path.to_string_lossy().into_owned();
        let Ok(ticket) = app.begin_import(&file_name, None) else {
            return;
        };

        let min_chars = app.min_extracted_chars();
        let path = path.to_path_buf();
        let tx = self.tx.clone();
        self.in_flight += 1;

        thread::spawn(move || {
            let result = fs::read(&path)
                .map_err(|err| ReaderError::ExtractionFailure(err.to_string()))
                .and_then(|bytes| content::extract_with_threshold(&bytes, ticket.kind(), min_chars));
            if tx.send(LoadedDocument { ticket, result }).is_err() {
                debug!("loader: ui loop gone, dropping generation={}", ticket.generation());
            }
        });
    }

    /// Hands finished extractions to the app. Returns whether any arrived.
    pub(super) fn deliver<S, IN>(&mut self, app: &mut ReaderApp<S, IN>) -> bool
    where
        S: Scheduler,
        IN: InputProvider,
    {
        let mut delivered = false;
        loop {
            match self.rx.try_recv() {
                Ok(LoadedDocument { ticket, result }) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    delivered = true;
                    match app.complete_import(ticket, result) {
                        Ok(ImportOutcome::Loaded { words }) => {
                            info!("loader: ready words={}", words);
                        }
                        Ok(ImportOutcome::Superseded) => {
                            debug!("loader: superseded generation={}", ticket.generation());
                        }
                        Err(err) => warn!("loader: import failed err={}", err),
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        delivered
    }
}
