//! Span-preserving edits of descriptor XML.
//!
//! Fixers remove whole elements by byte range so every other byte of the
//! file (formatting, comments, ordering) survives untouched.

use std::ops::Range;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use strata_core::errors::ParseError;

/// One element occurrence in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSpan {
    /// Byte range from `<` of the start tag to `>` of the end tag.
    pub range: Range<usize>,
    /// Concatenated, trimmed text content.
    pub text: String,
}

/// Every element at exactly `element_path` (root first), in document order.
pub fn find_elements(raw: &str, file: &Path, element_path: &[&str]) -> Result<Vec<ElementSpan>, ParseError> {
    let malformed = |message: String| ParseError::Malformed {
        path: file.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(raw);
    let mut stack: Vec<String> = Vec::new();
    let mut open: Option<(usize, String)> = None;
    let mut found = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if open.is_none() && at_path(&stack, element_path) {
                    open = Some((before, String::new()));
                }
            }
            Ok(Event::Empty(e)) => {
                stack.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if open.is_none() && at_path(&stack, element_path) {
                    found.push(ElementSpan {
                        range: before..reader.buffer_position() as usize,
                        text: String::new(),
                    });
                }
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                if let Some((_, text)) = open.as_mut() {
                    let value = t
                        .unescape()
                        .map_err(|e| malformed(format!("bad text content: {e}")))?;
                    text.push_str(&value);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some((_, text)) = open.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(_)) => {
                if at_path(&stack, element_path) {
                    if let Some((start, text)) = open.take() {
                        found.push(ElementSpan {
                            range: start..reader.buffer_position() as usize,
                            text: text.trim().to_string(),
                        });
                    }
                }
                stack.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(malformed(format!("at byte {}: {e}", reader.error_position())));
            }
        }
    }
    Ok(found)
}

fn at_path(stack: &[String], expected: &[&str]) -> bool {
    stack.len() == expected.len() && stack.iter().zip(expected).all(|(a, b)| a == b)
}

/// Remove `spans` from `raw`. A span alone on its line(s) takes the whole
/// line with it, so no blank line is left behind.
pub fn remove_spans(raw: &str, spans: &[Range<usize>]) -> String {
    let mut ranges: Vec<Range<usize>> = spans.iter().map(|r| widen_to_lines(raw, r.clone())).collect();
    ranges.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(raw.len());
    let mut cursor = 0;
    for range in ranges {
        if range.start < cursor {
            cursor = cursor.max(range.end);
            continue;
        }
        out.push_str(&raw[cursor..range.start]);
        cursor = range.end;
    }
    out.push_str(&raw[cursor..]);
    out
}

fn widen_to_lines(raw: &str, range: Range<usize>) -> Range<usize> {
    let line_start = raw[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let lead_blank = raw[line_start..range.start].chars().all(|c| c == ' ' || c == '\t');

    let rest = &raw[range.end..];
    let line_end = rest.find('\n').map_or(raw.len(), |i| range.end + i + 1);
    let trail_blank = raw[range.end..line_end].trim().is_empty();

    if lead_blank && trail_blank {
        line_start..line_end
    } else {
        range
    }
}
