#![forbid(unsafe_code)]

//! Hyperlink detection for raw output text.
//!
//! Any `http://` or `https://` run up to the next whitespace becomes a link
//! span; the surrounding text keeps the base style. Presenters decide how a
//! link looks on the wire (OSC 8 in a terminal, an anchor in HTML).

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::frame::{Span, Style};

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("URL pattern is valid"));

/// Byte ranges of every URL in `text`, in order.
#[must_use]
pub fn find_urls(text: &str) -> Vec<Range<usize>> {
    URL_PATTERN.find_iter(text).map(|m| m.range()).collect()
}

/// Split `text` into plain spans and link spans.
#[must_use]
pub fn linkify(text: &str, base: Style, link: Style) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    for range in find_urls(text) {
        if range.start > last {
            spans.push(Span::styled(&text[last..range.start], base));
        }
        spans.push(Span::link(&text[range.clone()], link));
        last = range.end;
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(&text[last..], base));
    }
    spans
}
