use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use readily_core::settings::{
    PersistedSession, RecordError, SessionStore, decode_session_record, encode_session_record,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(super) enum SessionFileError {
    #[error("state file i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("state file is unreadable: {0}")]
    Record(#[from] RecordError),
}

/// Session record kept in one file, replaced atomically on save.
#[derive(Debug, Clone)]
pub(super) struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub(super) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl SessionStore for FileSessionStore {
    type Error = SessionFileError;

    fn load(&mut self) -> Result<Option<PersistedSession>, Self::Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let session = decode_session_record(&bytes)?;
        info!(
            "session-store: loaded path={} bytes={}",
            self.path.display(),
            bytes.len()
        );
        Ok(Some(session))
    }

    fn save(&mut self, session: &PersistedSession) -> Result<(), Self::Error> {
        let staging = self.staging_path();
        fs::write(&staging, encode_session_record(session))?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
