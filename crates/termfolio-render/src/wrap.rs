#![forbid(unsafe_code)]

//! Grapheme-aware hard wrapping of styled lines.
//!
//! Terminal output is wrapped like `white-space: pre-wrap` without word
//! breaking: a row is filled cell by cell and a grapheme that does not fit
//! moves to the next row. Styles and link targets follow their text.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::frame::{Line, Span};

/// Split `line` into rows no wider than `width` cells.
///
/// An empty line yields one empty row. A `width` of zero disables wrapping.
/// A single grapheme wider than `width` still gets a row of its own.
#[must_use]
pub fn wrap_line(line: &Line, width: u16) -> Vec<Line> {
    let width = usize::from(width);
    if width == 0 || line.width() <= width {
        return vec![line.clone()];
    }

    let mut rows = Vec::new();
    let mut current = Line::new();
    let mut used = 0usize;

    for span in &line.spans {
        let mut chunk = String::new();
        for grapheme in span.text.graphemes(true) {
            let w = grapheme.width();
            if used + w > width && used > 0 {
                flush_chunk(&mut current, span, &mut chunk);
                rows.push(std::mem::take(&mut current));
                used = 0;
            }
            chunk.push_str(grapheme);
            used += w;
        }
        flush_chunk(&mut current, span, &mut chunk);
    }

    if !current.spans.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

/// Wrap every line and concatenate the rows.
#[must_use]
pub fn wrap_lines<'a>(lines: impl IntoIterator<Item = &'a Line>, width: u16) -> Vec<Line> {
    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn flush_chunk(row: &mut Line, template: &Span, chunk: &mut String) {
    if chunk.is_empty() {
        return;
    }
    row.push(Span {
        text: std::mem::take(chunk),
        style: template.style,
        link: template.link.clone(),
    });
}
