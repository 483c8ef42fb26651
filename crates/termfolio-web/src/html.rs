#![forbid(unsafe_code)]

//! HTML rendering of a [`Frame`].
//!
//! One `<div class="terminal-line">` per row, inline styles per span. Link
//! spans become anchors that open in a new tab without handing the opener to
//! the target page.

use std::fmt::Write as _;

use termfolio_render::{Frame, Span, Style};

/// Render `frame` as a self-contained HTML fragment.
#[must_use]
pub fn frame_to_html(frame: &Frame) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"terminal\"");
    if let Some(bg) = frame.background() {
        let _ = write!(out, " style=\"background-color:{}\"", bg.to_hex());
    }
    out.push('>');
    for line in frame.lines() {
        out.push_str("<div class=\"terminal-line\">");
        for span in &line.spans {
            push_span(&mut out, span);
        }
        out.push_str("</div>");
    }
    out.push_str("</div>");
    out
}

fn push_span(out: &mut String, span: &Span) {
    let css = style_css(span.style);
    match span.link.as_deref().filter(|url| is_web_url(url)) {
        Some(url) => {
            out.push_str("<a href=\"");
            escape_into(out, url);
            out.push_str("\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"terminal-link\"");
            if !css.is_empty() {
                let _ = write!(out, " style=\"{css}\"");
            }
            out.push('>');
            escape_into(out, &span.text);
            out.push_str("</a>");
        }
        None => {
            if css.is_empty() {
                out.push_str("<span>");
            } else {
                let _ = write!(out, "<span style=\"{css}\">");
            }
            escape_into(out, &span.text);
            out.push_str("</span>");
        }
    }
}

fn style_css(style: Style) -> String {
    let mut parts = Vec::new();
    if let Some(fg) = style.fg {
        parts.push(format!("color:{}", fg.to_hex()));
    }
    if let Some(bg) = style.bg {
        parts.push(format!("background-color:{}", bg.to_hex()));
    }
    if style.bold {
        parts.push("font-weight:bold".to_owned());
    }
    if style.underline {
        parts.push("text-decoration:underline".to_owned());
    }
    parts.join(";")
}

fn is_web_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Escape text for both element content and quoted attribute values.
pub fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}
