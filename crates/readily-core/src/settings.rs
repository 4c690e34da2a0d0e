//! Persisted reading session abstraction and its binary record codec.

use thiserror::Error;

use crate::render::ViewMode;

const SESSION_MAGIC: u32 = 0x3253_4452; // "RDS2"
const SESSION_VERSION: u8 = 1;
const SESSION_HEADER_LEN: usize = 20;
const SESSION_CHECKSUM_LEN: usize = 4;
/// Upper bound on the stored text so a corrupt length cannot trigger a huge
/// allocation.
pub const MAX_SESSION_TEXT_BYTES: usize = 64 * 1024 * 1024;

/// Everything needed to resume reading after restart.
#[derive(Clone, Debug, PartialEq)]
pub struct PersistedSession {
    /// Tokens joined by single spaces.
    pub source_text: String,
    pub word_index: usize,
    pub words_per_minute: u16,
    pub sentence_pause_multiplier: f32,
    pub view_mode: ViewMode,
}

/// Cheap identity of the current session, compared on every loop pass to
/// decide whether a save is needed. `text_generation` changes whenever the
/// loaded text does, so the text itself is never compared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionFingerprint {
    pub text_generation: u64,
    pub word_index: usize,
    pub words_per_minute: u16,
    pub sentence_pause_multiplier: f32,
    pub view_mode: ViewMode,
}

/// Abstract session persistence backend.
pub trait SessionStore {
    type Error;

    fn load(&mut self) -> Result<Option<PersistedSession>, Self::Error>;
    fn save(&mut self, session: &PersistedSession) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum RecordError {
    #[error("record is truncated")]
    Truncated,
    #[error("record magic does not match")]
    BadMagic,
    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),
    #[error("record checksum mismatch")]
    Corrupted,
    #[error("record field `{0}` is invalid")]
    InvalidField(&'static str),
}

/// Layout (little endian):
/// `magic:u32 version:u8 mode:u8 wpm:u16 pause:f32 index:u32 text_len:u32 text checksum:u32`.
pub fn encode_session_record(session: &PersistedSession) -> Vec<u8> {
    let text = session.source_text.as_bytes();
    let word_index = u32::try_from(session.word_index).unwrap_or(u32::MAX);

    let mut buf = Vec::with_capacity(SESSION_HEADER_LEN + text.len() + SESSION_CHECKSUM_LEN);
    buf.extend_from_slice(&SESSION_MAGIC.to_le_bytes());
    buf.push(SESSION_VERSION);
    buf.push(match session.view_mode {
        ViewMode::Rsvp => 0,
        ViewMode::Scroll => 1,
    });
    buf.extend_from_slice(&session.words_per_minute.to_le_bytes());
    buf.extend_from_slice(&session.sentence_pause_multiplier.to_le_bytes());
    buf.extend_from_slice(&word_index.to_le_bytes());
    buf.extend_from_slice(&(text.len() as u32).to_le_bytes());
    buf.extend_from_slice(text);

    let checksum = checksum32(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    buf
}

pub fn decode_session_record(buf: &[u8]) -> Result<PersistedSession, RecordError> {
    if buf.len() < SESSION_HEADER_LEN + SESSION_CHECKSUM_LEN {
        return Err(RecordError::Truncated);
    }

    if read_u32(buf, 0) != SESSION_MAGIC {
        return Err(RecordError::BadMagic);
    }
    if buf[4] != SESSION_VERSION {
        return Err(RecordError::UnsupportedVersion(buf[4]));
    }

    let text_len = read_u32(buf, 16) as usize;
    if text_len > MAX_SESSION_TEXT_BYTES {
        return Err(RecordError::InvalidField("text_len"));
    }
    let body_len = SESSION_HEADER_LEN + text_len;
    if buf.len() != body_len + SESSION_CHECKSUM_LEN {
        return Err(RecordError::Truncated);
    }

    let expected_checksum = read_u32(buf, body_len);
    if checksum32(&buf[..body_len]) != expected_checksum {
        return Err(RecordError::Corrupted);
    }

    let view_mode = match buf[5] {
        0 => ViewMode::Rsvp,
        1 => ViewMode::Scroll,
        _ => return Err(RecordError::InvalidField("view_mode")),
    };
    let words_per_minute = u16::from_le_bytes([buf[6], buf[7]]);
    let sentence_pause_multiplier = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    let word_index = read_u32(buf, 12) as usize;
    let source_text = core::str::from_utf8(&buf[SESSION_HEADER_LEN..body_len])
        .map_err(|_| RecordError::InvalidField("source_text"))?
        .to_owned();

    Ok(PersistedSession {
        source_text,
        word_index,
        words_per_minute,
        sentence_pause_multiplier,
        view_mode,
    })
}

/// In-memory store holding the encoded record; useful for tests and for
/// runs without a state file.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionStore {
    record: Option<Vec<u8>>,
    saves: usize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: Vec<u8>) -> Self {
        Self {
            record: Some(record),
            saves: 0,
        }
    }

    pub fn record(&self) -> Option<&[u8]> {
        self.record.as_deref()
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SessionStore for MemorySessionStore {
    type Error = RecordError;

    fn load(&mut self) -> Result<Option<PersistedSession>, Self::Error> {
        self.record
            .as_deref()
            .map(decode_session_record)
            .transpose()
    }

    fn save(&mut self, session: &PersistedSession) -> Result<(), Self::Error> {
        self.record = Some(encode_session_record(session));
        self.saves += 1;
        Ok(())
    }
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn checksum32(bytes: &[u8]) -> u32 {
    let mut hash = 0x811C9DC5u32;
    for b in bytes {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}
