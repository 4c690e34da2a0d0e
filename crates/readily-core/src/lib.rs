//! Core of the Readily RSVP reader: document extraction, tokenization,
//! fixation-point placement, timed playback and navigation.

pub mod app;
pub mod content;
pub mod error;
pub mod input;
pub mod navigation;
pub mod pivot;
pub mod playback;
pub mod render;
pub mod settings;
pub mod tokens;

pub use error::ReaderError;
