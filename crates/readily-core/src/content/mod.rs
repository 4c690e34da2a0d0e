//! Document extraction: raw PDF/EPUB bytes to ordered text fragments.

mod archive;
mod html_entities;
mod markup;
mod pdf;

pub use archive::{ArchiveError, ZipArchive};
pub use markup::{normalize_whitespace, strip_markup};
pub use pdf::LopdfDecoder;

use core::fmt::Display;

use log::{debug, info, warn};

use crate::error::ReaderError;

/// Documents with fewer extracted characters than this are judged unreadable.
pub const MIN_EXTRACTED_CHARS: usize = 100;

const PDF_MIME: &str = "application/pdf";
const MARKUP_EXTENSIONS: [&str; 3] = [".xhtml", ".html", ".htm"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    Pdf,
    Epub,
}

impl DocumentKind {
    /// Classifies a user-selected file by MIME type and file name.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Result<Self, ReaderError> {
        if mime.is_some_and(|mime| mime.eq_ignore_ascii_case(PDF_MIME))
            || ends_with_ignore_ascii_case(file_name, ".pdf")
        {
            return Ok(Self::Pdf);
        }
        if ends_with_ignore_ascii_case(file_name, ".epub") {
            return Ok(Self::Epub);
        }

        Err(ReaderError::UnsupportedFormat(match mime {
            Some(mime) => format!("{file_name} ({mime})"),
            None => file_name.to_owned(),
        }))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
        }
    }
}

/// One page (PDF) or one content document (EPUB) worth of text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fragment {
    pub text: String,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Page enumeration contract of a PDF container decoder.
pub trait PdfDecoder {
    type Error: Display;

    fn page_count(&self) -> usize;

    /// Text runs of a zero-based page, in content-stream order.
    fn page_text_runs(&self, page: usize) -> Result<Vec<String>, Self::Error>;
}

/// Name-based access contract of an archive decoder.
pub trait ArchiveDecoder {
    type Error: Display;

    /// Entry names in archive listing order.
    fn entry_names(&self) -> Vec<String>;

    fn read_text(&self, name: &str) -> Result<String, Self::Error>;
}

/// Decodes `bytes` with the bundled decoders and extracts its fragments.
pub fn extract(bytes: &[u8], kind: DocumentKind) -> Result<Vec<Fragment>, ReaderError> {
    extract_with_threshold(bytes, kind, MIN_EXTRACTED_CHARS)
}

pub fn extract_with_threshold(
    bytes: &[u8],
    kind: DocumentKind,
    min_chars: usize,
) -> Result<Vec<Fragment>, ReaderError> {
    info!("extract: start kind={} bytes={}", kind.label(), bytes.len());

    let fragments = match kind {
        DocumentKind::Pdf => {
            let decoder = LopdfDecoder::open(bytes).map_err(ReaderError::ExtractionFailure)?;
            pdf_fragments(&decoder)?
        }
        DocumentKind::Epub => {
            let archive = ZipArchive::parse(bytes)
                .map_err(|err| ReaderError::ExtractionFailure(err.to_string()))?;
            epub_fragments(&archive)?
        }
    };

    ensure_readable(fragments, min_chars)
}

/// One fragment per page, text runs joined with single spaces.
pub fn pdf_fragments<D: PdfDecoder>(decoder: &D) -> Result<Vec<Fragment>, ReaderError> {
    let page_count = decoder.page_count();
    let mut fragments = Vec::with_capacity(page_count);

    for page in 0..page_count {
        let runs = decoder
            .page_text_runs(page)
            .map_err(|err| ReaderError::ExtractionFailure(err.to_string()))?;
        fragments.push(Fragment::new(normalize_whitespace(&runs.join(" "))));
    }

    debug!("extract: pdf pages={}", fragments.len());
    Ok(fragments)
}

/// One fragment per markup entry, in archive listing order.
pub fn epub_fragments<A: ArchiveDecoder>(archive: &A) -> Result<Vec<Fragment>, ReaderError> {
    let mut fragments = Vec::new();

    for name in archive
        .entry_names()
        .into_iter()
        .filter(|name| is_markup_entry(name))
    {
        let raw = archive
            .read_text(&name)
            .map_err(|err| ReaderError::ExtractionFailure(err.to_string()))?;
        let text = strip_markup(&raw);
        debug!("extract: epub entry={:?} chars={}", name, text.len());
        fragments.push(Fragment::new(text));
    }

    debug!("extract: epub markup entries={}", fragments.len());
    Ok(fragments)
}

/// Rejects fragment sets whose total character count is below `min_chars`.
pub fn ensure_readable(
    fragments: Vec<Fragment>,
    min_chars: usize,
) -> Result<Vec<Fragment>, ReaderError> {
    let chars: usize = fragments.iter().map(Fragment::char_count).sum();
    if chars < min_chars {
        warn!(
            "extract: unreadable document chars={} threshold={}",
            chars, min_chars
        );
        return Err(ReaderError::EmptyDocument {
            chars,
            threshold: min_chars,
        });
    }

    info!(
        "extract: done fragments={} chars={}",
        fragments.len(),
        chars
    );
    Ok(fragments)
}

pub fn is_markup_entry(name: &str) -> bool {
    MARKUP_EXTENSIONS
        .iter()
        .any(|extension| ends_with_ignore_ascii_case(name, extension))
}

fn ends_with_ignore_ascii_case(text: &str, suffix: &str) -> bool {
    text.len() >= suffix.len()
        && text.as_bytes()[text.len() - suffix.len()..].eq_ignore_ascii_case(suffix.as_bytes())
}

#[cfg(test)]
mod tests;
