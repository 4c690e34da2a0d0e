//! `lopdf`-backed implementation of [`PdfDecoder`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{debug, warn};
use lopdf::Document;

use super::PdfDecoder;

/// Decoded PDF with its pages in document order.
pub struct LopdfDecoder {
    document: Document,
    page_numbers: Vec<u32>,
}

impl LopdfDecoder {
    pub fn open(bytes: &[u8]) -> Result<Self, String> {
        // Malformed fonts and streams can make the decoder panic instead of erroring.
        let document = match catch_unwind(AssertUnwindSafe(|| Document::load_mem(bytes))) {
            Ok(Ok(document)) => document,
            Ok(Err(err)) => return Err(format!("malformed pdf: {err}")),
            Err(_) => return Err("pdf decoder panicked".to_owned()),
        };

        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
        debug!("pdf: opened pages={}", page_numbers.len());

        Ok(Self {
            document,
            page_numbers,
        })
    }
}

impl PdfDecoder for LopdfDecoder {
    type Error = String;

    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text_runs(&self, page: usize) -> Result<Vec<String>, Self::Error> {
        let Some(&page_number) = self.page_numbers.get(page) else {
            return Err(format!("page {page} out of range"));
        };

        let text = match catch_unwind(AssertUnwindSafe(|| {
            self.document.extract_text(&[page_number])
        })) {
            Ok(Ok(text)) => text,
            Ok(Err(err)) => {
                warn!("pdf: page {} text extraction failed: {}", page_number, err);
                return Err(format!("page {page_number}: {err}"));
            }
            Err(_) => return Err(format!("page {page_number}: decoder panicked")),
        };

        Ok(text
            .lines()
            .map(str::trim)
            .filter(|run| !run.is_empty())
            .map(str::to_owned)
            .collect())
    }
}
