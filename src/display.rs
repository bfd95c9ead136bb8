//! Display formatting: rewrite stored TEI markup into HTML for the reader.
//!
//! This is a best-effort forward transform, not a serializer. Tags outside
//! the fixed rewrite table pass through untouched and nothing here fails.
//!
//! `<hi>` has a single closing tag for both emphasis forms. Each `</hi>` is
//! closed as whichever of `<hi rend="italic">` / `<hi rend="bold">` opened
//! most recently before it in the input. There is no tag stack, so nested
//! or overlapping spans of different kinds close with the wrong wrapper.

use std::sync::LazyLock;

use memchr::{memchr, memmem};
use regex::Regex;

/// Opening paragraph tag for display output.
pub const PARAGRAPH_OPEN: &str = r#"<p class="mb-4">"#;

/// Output for empty input.
pub const EMPTY_PLACEHOLDER: &str = r#"<p class="text-gray-500 italic">No content available</p>"#;

const ITALIC_OPEN: &str = r#"<hi rend="italic">"#;
const BOLD_OPEN: &str = r#"<hi rend="bold">"#;
const EMPHASIS_CLOSE: &str = "</hi>";

const QUOTE_OPEN: &str = r#"<blockquote class="border-l-4 border-gray-300 pl-4 italic">"#;
const POEM_OPEN: &str = r#"<div class="poem my-4">"#;
const VERSE_OPEN: &str = r#"<div class="verse">"#;
const PAGE_BREAK: &str = r#"<div class="page-break border-t border-gray-200 my-6 pt-4"></div>"#;
const LINE_BREAK: &str = "<br>";

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\s*\n").expect("blank-line pattern is valid")
});

/// Convert stored markup (or plain prose) into display HTML.
pub fn format_for_display(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }

    if memchr(b'<', trimmed.as_bytes()).is_none() {
        return format_prose(trimmed);
    }

    rewrite_markup(raw)
}

/// Wrap each blank-line separated block of prose in a paragraph.
fn format_prose(text: &str) -> String {
    let paragraphs: Vec<String> = BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| format!("{PARAGRAPH_OPEN}{}</p>", escape_text(block)))
        .collect();

    if paragraphs.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        paragraphs.join("\n")
    }
}

/// Escape bare `&` so prose renders literally (`<` cannot occur here).
/// Ampersands that already start an entity reference are kept.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, segment) in text.split('&').enumerate() {
        if index > 0 {
            out.push_str(if starts_with_reference(segment) { "&" } else { "&amp;" });
        }
        out.push_str(segment);
    }
    out
}

/// `amp;`, `#233;` or `#xE9;` at the start of `rest`.
fn starts_with_reference(rest: &str) -> bool {
    let Some(end) = memchr(b';', rest.as_bytes()) else {
        return false;
    };
    let name = &rest[..end];
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit())
    } else if let Some(digits) = name.strip_prefix('#') {
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    } else {
        name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name.bytes().all(|b| b.is_ascii_alphanumeric())
    }
}

/// Apply the tag rewrite table in one left-to-right scan.
fn rewrite_markup(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len() + raw.len() / 4);
    let mut pos = 0;

    while let Some(offset) = memchr(b'<', &bytes[pos..]) {
        let start = pos + offset;
        out.push_str(&raw[pos..start]);

        let Some(len) = memchr(b'>', &bytes[start..]) else {
            // Unterminated tag: emit the rest verbatim
            pos = start;
            break;
        };
        let end = start + len + 1;
        let tag = &raw[start..end];

        match rewrite_tag(raw, start, tag) {
            Some(replacement) => out.push_str(replacement),
            None => out.push_str(tag),
        }
        pos = end;
    }

    out.push_str(&raw[pos..]);
    out
}

/// Replacement for a single tag found at `start`, if the table covers it.
fn rewrite_tag(raw: &str, start: usize, tag: &str) -> Option<&'static str> {
    let replacement = match tag {
        "<p>" => PARAGRAPH_OPEN,
        ITALIC_OPEN => "<em>",
        BOLD_OPEN => "<strong>",
        EMPHASIS_CLOSE => return close_emphasis(&raw[..start]),
        "<quote>" => QUOTE_OPEN,
        "</quote>" => "</blockquote>",
        "<lg>" => POEM_OPEN,
        "</lg>" => "</div>",
        "<l>" => VERSE_OPEN,
        "</l>" => "</div>",
        _ if is_empty_marker(tag, "pb") => PAGE_BREAK,
        _ if is_empty_marker(tag, "lb") => LINE_BREAK,
        _ => return None,
    };
    Some(replacement)
}

/// Pick the closing wrapper for a `</hi>` by scanning back from it.
///
/// With no emphasis opening before it, the tag is left alone.
fn close_emphasis(before: &str) -> Option<&'static str> {
    let haystack = before.as_bytes();
    let italic = memmem::rfind(haystack, ITALIC_OPEN.as_bytes());
    let bold = memmem::rfind(haystack, BOLD_OPEN.as_bytes());

    match (italic, bold) {
        (Some(i), Some(b)) if i > b => Some("</em>"),
        (Some(_), Some(_)) => Some("</strong>"),
        (Some(_), None) => Some("</em>"),
        (None, Some(_)) => Some("</strong>"),
        (None, None) => None,
    }
}

/// `<pb>`, `<pb/>`, `<pb n="3"/>` and friends, but not `<pbx>`.
fn is_empty_marker(tag: &str, name: &str) -> bool {
    let Some(rest) = tag.strip_prefix('<').and_then(|t| t.strip_prefix(name)) else {
        return false;
    };
    rest.starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace())
}
