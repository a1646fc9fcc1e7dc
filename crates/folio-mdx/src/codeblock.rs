//! Code block fence metadata parsing.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Highest line number accepted in a highlight range.
pub const MAX_HIGHLIGHT_LINE: u32 = 10_000;

static LINE_RANGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("line range pattern is valid"));

static FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename=(?:"([^"]*)"|'([^']*)')"#).expect("filename pattern is valid")
});

/// A code block pulled out of a document, ready to be highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeBlockRequest {
    /// Language identifier from the fence (may be empty)
    pub language: String,

    /// Literal code content
    pub source_text: String,

    /// Everything after the language identifier on the fence line
    pub raw_metadata: String,
}

/// Structured result of parsing fence metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedMetadata {
    /// Lines to emphasize, 1-indexed, ascending and deduplicated
    pub highlight_lines: BTreeSet<u32>,

    /// Optional filename shown above the block
    pub filename: Option<String>,
}

impl ParsedMetadata {
    /// Check whether a 1-indexed line is highlighted.
    pub fn is_highlighted(&self, line: u32) -> bool {
        self.highlight_lines.contains(&line)
    }
}

/// Split a fence info string into the language identifier and the metadata.
///
/// `ts {1-3} filename="a.ts"` becomes `("ts", "{1-3} filename=\"a.ts\"")`.
pub fn split_info(info: &str) -> (&str, &str) {
    let info = info.trim();
    match info.find(char::is_whitespace) {
        Some(pos) => (&info[..pos], info[pos..].trim_start()),
        None => (info, ""),
    }
}

/// Parse fence metadata into highlighted lines and a filename.
///
/// Never fails: invalid range entries are logged and skipped.
///
/// Supports formats like:
/// - `{1-3,5}`
/// - `filename="app.ts"` or `filename='app.ts'`
/// - `{2} filename="app.ts"` (either order)
pub fn parse_metadata(raw: &str) -> ParsedMetadata {
    ParsedMetadata {
        highlight_lines: parse_line_ranges(raw),
        filename: extract_filename(raw),
    }
}

/// Parse the first `{...}` expression of `raw` into a set of line numbers.
///
/// Only the first bracket expression is considered.
pub fn parse_line_ranges(raw: &str) -> BTreeSet<u32> {
    let mut lines = BTreeSet::new();

    let Some(captures) = LINE_RANGES.captures(raw) else {
        return lines;
    };

    for entry in captures[1].split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match parse_range_entry(entry) {
            Ok((start, end)) => lines.extend(start..=end),
            Err(reason) => {
                tracing::warn!("Skipping line range entry '{}': {}", entry, reason);
            }
        }
    }

    lines
}

fn parse_range_entry(entry: &str) -> Result<(u32, u32), String> {
    let (start, end) = match entry.split_once('-') {
        Some((start, end)) => (parse_line(start)?, parse_line(end)?),
        None => {
            let line = parse_line(entry)?;
            (line, line)
        }
    };

    if start > end {
        return Err(format!("range start {} is after end {}", start, end));
    }

    Ok((start, end))
}

fn parse_line(token: &str) -> Result<u32, String> {
    let token = token.trim();
    let line: u32 = token
        .parse()
        .map_err(|_| format!("'{}' is not a line number", token))?;

    if !(1..=MAX_HIGHLIGHT_LINE).contains(&line) {
        return Err(format!(
            "line {} is outside 1..={}",
            line, MAX_HIGHLIGHT_LINE
        ));
    }

    Ok(line)
}

/// Extract filename from fence metadata if present.
///
/// Supports formats like:
/// - `filename="Button.tsx"`
/// - `filename='Button.tsx'`
pub fn extract_filename(raw: &str) -> Option<String> {
    let captures = FILENAME.captures(raw)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str().to_string())
}
