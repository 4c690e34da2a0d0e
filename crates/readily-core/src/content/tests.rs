use super::*;
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};
use miniz_oxide::deflate::compress_to_vec;

/// Builds a ZIP file in memory; `deflate` selects method 8 over method 0.
fn build_zip(entries: &[(&str, &str, bool)]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data, deflate) in entries {
        let data = data.as_bytes();
        let (method, payload) = if *deflate {
            (8u16, compress_to_vec(data, 6))
        } else {
            (0u16, data.to_vec())
        };
        let offset = out.len() as u32;

        out.extend_from_slice(&[0x50, 0x4B, 0x03, 0x04]);
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&[0u8; 8]); // time, date, crc
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&payload);

        central.extend_from_slice(&[0x50, 0x4B, 0x01, 0x02]);
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&[0u8; 8]);
        central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0u8; 12]); // extra, comment, disk, attrs
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let cdir_offset = out.len() as u32;
    let cdir_len = central.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&[0x50, 0x4B, 0x05, 0x06]);
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&cdir_len.to_le_bytes());
    out.extend_from_slice(&cdir_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

struct FakePdf {
    pages: Vec<Vec<&'static str>>,
    broken_page: Option<usize>,
}

impl PdfDecoder for FakePdf {
    type Error = &'static str;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text_runs(&self, page: usize) -> Result<Vec<String>, Self::Error> {
        if self.broken_page == Some(page) {
            return Err("bad content stream");
        }
        Ok(self.pages[page].iter().map(|run| run.to_string()).collect())
    }
}

const LONG_CHAPTER: &str = "<html><head><title>Skip me</title><style>p { color: red; }</style></head>\
<body><p>It was the best of times, it was the worst of times,</p>\
<script type=\"text/javascript\">var hidden = 1;</script>\
<p>it was the age of wisdom, it was the age of foolishness.</p></body></html>";

#[test]
fn detects_kind_from_mime_and_extension() {
    assert_eq!(
        DocumentKind::detect("book.bin", Some("application/pdf")),
        Ok(DocumentKind::Pdf)
    );
    assert_eq!(DocumentKind::detect("Paper.PDF", None), Ok(DocumentKind::Pdf));
    assert_eq!(
        DocumentKind::detect("novel.epub", Some("application/epub+zip")),
        Ok(DocumentKind::Epub)
    );
    assert!(matches!(
        DocumentKind::detect("notes.txt", Some("text/plain")),
        Err(ReaderError::UnsupportedFormat(_))
    ));
}

#[test]
fn markup_strips_script_style_and_tags() {
    let text = strip_markup(LONG_CHAPTER);
    assert_eq!(
        text,
        "Skip me It was the best of times, it was the worst of times, \
it was the age of wisdom, it was the age of foolishness."
    );
    assert!(!text.contains("hidden"));
    assert!(!text.contains("color"));
}

#[test]
fn markup_decodes_entities_and_collapses_whitespace() {
    let text = strip_markup("<p>Fish&nbsp;&amp;\n\n  chips&#8217;s &#x41;</p>\t<br/>");
    assert_eq!(text, "Fish & chips\u{2019}s A");
}

#[test]
fn markup_keeps_unknown_entities_and_stray_brackets() {
    assert_eq!(strip_markup("a &bogus; b < c"), "a &bogus; b < c");
    assert_eq!(strip_markup("<!-- note --> x <> y"), "x <> y");
}

#[test]
fn markup_case_insensitive_script_blocks() {
    assert_eq!(
        strip_markup("before<SCRIPT>alert('x')</Script>after"),
        "before after"
    );
}

#[test]
fn zip_lists_entries_in_archive_order() {
    let bytes = build_zip(&[
        ("mimetype", "application/epub+zip", false),
        ("OEBPS/b.xhtml", "<p>second</p>", true),
        ("OEBPS/a.xhtml", "<p>first</p>", false),
    ]);
    let archive = ZipArchive::parse(&bytes).unwrap();

    assert_eq!(
        archive.names().collect::<Vec<_>>(),
        ["mimetype", "OEBPS/b.xhtml", "OEBPS/a.xhtml"]
    );
    assert_eq!(archive.read("OEBPS/b.xhtml").unwrap(), b"<p>second</p>");
    assert_eq!(archive.read("OEBPS/a.xhtml").unwrap(), b"<p>first</p>");
}

#[test]
fn zip_rejects_garbage_and_missing_entries() {
    assert_eq!(
        ZipArchive::parse(b"definitely not a zip file at all").unwrap_err(),
        ArchiveError::NotZip
    );

    let bytes = build_zip(&[("a.html", "x", false)]);
    let archive = ZipArchive::parse(&bytes).unwrap();
    assert!(matches!(
        archive.read("b.html"),
        Err(ArchiveError::MissingEntry(_))
    ));
}

#[test]
fn epub_extraction_reads_markup_entries_only() {
    let bytes = build_zip(&[
        ("mimetype", "application/epub+zip", false),
        ("META-INF/container.xml", "<container>not text</container>", false),
        ("OEBPS/style.css", "body { margin: 0 }", false),
        ("OEBPS/ch1.xhtml", LONG_CHAPTER, true),
        ("OEBPS/ch2.HTM", "<p>The end.</p>", false),
    ]);

    let fragments = extract(&bytes, DocumentKind::Epub).unwrap();
    assert_eq!(fragments.len(), 2);
    assert!(fragments[0].text.starts_with("Skip me It was the best"));
    assert_eq!(fragments[1].text, "The end.");
}

#[test]
fn corrupt_epub_is_an_extraction_failure() {
    let mut bytes = build_zip(&[("ch.xhtml", LONG_CHAPTER, false)]);
    // Break the local header signature of the only entry.
    bytes[0] = 0;
    assert!(matches!(
        extract(&bytes, DocumentKind::Epub),
        Err(ReaderError::ExtractionFailure(_))
    ));

    assert!(matches!(
        extract(b"PK but not really", DocumentKind::Epub),
        Err(ReaderError::ExtractionFailure(_))
    ));
}

#[test]
fn malformed_pdf_is_rejected() {
    assert!(matches!(
        extract(b"%PDF-1.7 garbage", DocumentKind::Pdf),
        Err(ReaderError::ExtractionFailure(_) | ReaderError::EmptyDocument { .. })
    ));
}

const PAGE_ONE: &str = "Hello world from page one of a small generated document.";
const PAGE_TWO: &str = "Second page carries enough words to clear the readability threshold.";

/// Builds a PDF with one Type1 text line per page.
fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn lopdf_reads_pages_in_order() {
    let bytes = build_pdf(&[PAGE_ONE, PAGE_TWO]);

    let decoder = LopdfDecoder::open(&bytes).unwrap();
    assert_eq!(decoder.page_count(), 2);

    let fragments = extract(&bytes, DocumentKind::Pdf).unwrap();
    assert_eq!(fragments.len(), 2);
    assert_eq!(fragments[0].text, PAGE_ONE);
    assert_eq!(fragments[1].text, PAGE_TWO);
}

#[test]
fn short_generated_pdf_is_rejected_as_empty() {
    let bytes = build_pdf(&["Tiny.", "Page."]);
    assert!(matches!(
        extract(&bytes, DocumentKind::Pdf),
        Err(ReaderError::EmptyDocument { .. })
    ));
}

#[test]
fn pdf_pages_join_runs_with_single_spaces() {
    let pdf = FakePdf {
        pages: vec![vec!["Hello", "world."], vec![], vec!["Page", "three"]],
        broken_page: None,
    };

    let fragments = pdf_fragments(&pdf).unwrap();
    assert_eq!(
        fragments,
        vec![
            Fragment::new("Hello world."),
            Fragment::new(""),
            Fragment::new("Page three"),
        ]
    );
}

#[test]
fn pdf_page_failure_is_reported() {
    let pdf = FakePdf {
        pages: vec![vec!["ok"], vec!["never"]],
        broken_page: Some(1),
    };

    assert_eq!(
        pdf_fragments(&pdf),
        Err(ReaderError::ExtractionFailure("bad content stream".to_owned()))
    );
}

#[test]
fn readability_threshold_applies_to_total_characters() {
    let short = vec![Fragment::new("x".repeat(50))];
    assert_eq!(
        ensure_readable(short, MIN_EXTRACTED_CHARS),
        Err(ReaderError::EmptyDocument {
            chars: 50,
            threshold: MIN_EXTRACTED_CHARS
        })
    );

    let long = vec![Fragment::new("y".repeat(75)), Fragment::new("z".repeat(75))];
    assert_eq!(ensure_readable(long, MIN_EXTRACTED_CHARS).unwrap().len(), 2);
}

#[test]
fn short_epub_is_rejected_as_empty() {
    let bytes = build_zip(&[("only.xhtml", "<p>Too short to read.</p>", false)]);
    assert!(matches!(
        extract(&bytes, DocumentKind::Epub),
        Err(ReaderError::EmptyDocument { .. })
    ));
}
