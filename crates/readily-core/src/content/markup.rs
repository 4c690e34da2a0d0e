//! Markup-to-text flattening for EPUB content documents.

use super::html_entities::decode_html_entity;

const HTML_ENTITY_MAX_BYTES: usize = 16;
const RAW_TEXT_TAGS: [&[u8]; 2] = [b"script", b"style"];

/// Flattens one (X)HTML document into a single line of readable text.
///
/// `<script>` and `<style>` blocks disappear together with their content,
/// every other tag, comment and declaration is replaced by a space, entity
/// references are decoded, whitespace runs collapse to one space and the
/// result is trimmed.
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() / 2);
    let mut last_was_space = true;
    let mut cursor = 0usize;

    while cursor < raw.len() {
        let rest = &raw[cursor..];

        if rest.starts_with('<') {
            if let Some(next) = skip_raw_text_block(raw.as_bytes(), cursor) {
                push_normalized_char(&mut out, ' ', &mut last_was_space);
                cursor = next;
                continue;
            }

            if rest.starts_with("<!--")
                && let Some(end) = rest.find("-->")
            {
                push_normalized_char(&mut out, ' ', &mut last_was_space);
                cursor += end + 3;
                continue;
            }

            // `<>` and a `<` without a closing `>` are literal text.
            if let Some(tag_len) = rest[1..].find('>')
                && tag_len > 0
            {
                push_normalized_char(&mut out, ' ', &mut last_was_space);
                cursor += tag_len + 2;
                continue;
            }
        }

        if rest.starts_with('&')
            && let Some((decoded, consumed)) = parse_entity(rest)
        {
            push_normalized_char(&mut out, decoded, &mut last_was_space);
            cursor += consumed;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        push_normalized_char(&mut out, ch, &mut last_was_space);
        cursor += ch.len_utf8();
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Collapses whitespace runs to single spaces and trims, without touching
/// markup. Used for text that never was markup (PDF runs, plain text).
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true;
    for ch in text.chars() {
        push_normalized_char(&mut out, ch, &mut last_was_space);
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn push_normalized_char(out: &mut String, ch: char, last_was_space: &mut bool) {
    if ch.is_whitespace() {
        if !*last_was_space {
            out.push(' ');
            *last_was_space = true;
        }
        return;
    }

    if ch.is_control() || ch == '\u{00AD}' {
        return;
    }

    out.push(ch);
    *last_was_space = false;
}

/// Returns the byte position just past the closing tag when `start` opens a
/// script or style block that is closed later in the document.
fn skip_raw_text_block(bytes: &[u8], start: usize) -> Option<usize> {
    let name_start = start + 1;
    let tag = RAW_TEXT_TAGS.iter().find(|tag| {
        bytes
            .get(name_start..name_start + tag.len())
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
            && bytes
                .get(name_start + tag.len())
                .is_some_and(|b| b.is_ascii_whitespace() || matches!(b, b'>' | b'/'))
    })?;

    let open_end = start + bytes[start..].iter().position(|b| *b == b'>')?;
    if bytes[open_end - 1] == b'/' {
        // `<script src="..."/>` has no body.
        return None;
    }

    let mut closing = [0u8; 8];
    closing[..2].copy_from_slice(b"</");
    closing[2..2 + tag.len()].copy_from_slice(tag);
    let closing = &closing[..2 + tag.len()];

    let close_start = find_ascii_case_insensitive(bytes, closing, open_end + 1)?;
    let close_end = close_start + bytes[close_start..].iter().position(|b| *b == b'>')?;
    Some(close_end + 1)
}

/// Parses `&name;` at the start of `text`, returning the decoded char and
/// the number of bytes consumed.
fn parse_entity(text: &str) -> Option<(char, usize)> {
    let body_end = text[1..]
        .char_indices()
        .take(HTML_ENTITY_MAX_BYTES)
        .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '#'))
        .filter(|(_, ch)| *ch == ';')
        .map(|(idx, _)| idx + 1)?;

    let decoded = decode_html_entity(&text[1..body_end])?;
    Some((decoded, body_end + 1))
}

fn find_ascii_case_insensitive(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let max_start = haystack.len() - needle.len();
    if from > max_start {
        return None;
    }

    (from..=max_start).find(|&idx| haystack[idx..idx + needle.len()].eq_ignore_ascii_case(needle))
}
