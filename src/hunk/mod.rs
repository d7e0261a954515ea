//! Structured hunks from a single file's unified diff
//!
//! [`parse_hunks`] splits a `diff --git` block on its `@@` headers, checks
//! every body against the line counts its header declares, and pairs each
//! hunk with the matching lines of the post-image file.

use crate::error::PatchError;
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::LazyLock;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$").unwrap()
});

const HUNK_MARKER: &str = "@@ ";

/// One contiguous changed region of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeHunk {
    /// 1-based first line of the hunk in the pre-image, 0 when it adds
    /// to an empty file
    pub old_start_line: usize,
    /// Pre-image lines covered: context plus removed
    pub old_line_count: usize,
    /// 1-based first line of the hunk in the post-image
    pub new_start_line: usize,
    /// Post-image lines covered: context plus added
    pub new_line_count: usize,
    /// The `@@ ... @@` line without its line terminator
    pub header_text: String,
    /// Text git printed after the closing `@@`, usually the enclosing function
    pub section_heading: Option<String>,
    /// Context, `+`, `-` and `\` lines with their original line endings
    pub body_text: String,
    /// Post-image lines `[new_start_line, new_start_line + new_line_count)`
    pub new_file_slice: String,
}

/// A body line with its prefix removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkLine<'a> {
    Context(&'a str),
    Added(&'a str),
    Removed(&'a str),
    /// `\ No newline at end of file`
    NoNewline,
}

impl CodeHunk {
    /// Post-image line numbers covered by this hunk (1-based, end-exclusive)
    pub fn new_line_range(&self) -> Range<usize> {
        self.new_start_line..self.new_start_line.saturating_add(self.new_line_count)
    }

    /// Pre-image line numbers covered by this hunk (1-based, end-exclusive)
    pub fn old_line_range(&self) -> Range<usize> {
        self.old_start_line..self.old_start_line.saturating_add(self.old_line_count)
    }

    /// Body lines in order, classified by their prefix
    pub fn lines(&self) -> impl Iterator<Item = HunkLine<'_>> {
        self.body_text.split_inclusive('\n').filter_map(classify)
    }

    /// Text of the `+` lines, line endings kept
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.lines().filter_map(|line| match line {
            HunkLine::Added(text) => Some(text),
            _ => None,
        })
    }

    /// Text of the `-` lines, line endings kept
    pub fn removed_lines(&self) -> impl Iterator<Item = &str> {
        self.lines().filter_map(|line| match line {
            HunkLine::Removed(text) => Some(text),
            _ => None,
        })
    }

    /// Render the hunk back into unified-diff form
    pub fn to_patch_text(&self) -> String {
        format!("{}\n{}", self.header_text, self.body_text)
    }
}

fn classify(line: &str) -> Option<HunkLine<'_>> {
    match line.as_bytes().first()? {
        b' ' => Some(HunkLine::Context(&line[1..])),
        b'+' => Some(HunkLine::Added(&line[1..])),
        b'-' => Some(HunkLine::Removed(&line[1..])),
        b'\\' => Some(HunkLine::NoNewline),
        // some tools strip the space from empty context lines
        b'\n' | b'\r' => Some(HunkLine::Context(line)),
        _ => None,
    }
}

/// Parse one file's `patch_text` against its post-image `content`
///
/// Fails the whole file on a malformed header, a body whose line counts
/// disagree with its header, or a hunk that reaches past the end of
/// `content`. Binary patches yield no hunks.
pub fn parse_hunks(
    path: &str,
    patch_text: &str,
    content: &str,
) -> Result<Vec<CodeHunk>, PatchError> {
    let mut lines = patch_text.split_inclusive('\n').peekable();

    while let Some(line) = lines.next_if(|line| !line.starts_with(HUNK_MARKER)) {
        if is_binary_marker(line) {
            return Ok(Vec::new());
        }
    }

    let post_image: Vec<&str> = content.split_inclusive('\n').collect();
    let mut hunks = Vec::new();

    while let Some(header_line) = lines.next() {
        let header = strip_line_ending(header_line);
        let (old_start, old_count, new_start, new_count, heading) = parse_header(path, header)?;

        let mut body_text = String::new();
        let mut old_seen = 0;
        let mut new_seen = 0;
        while let Some(line) = lines.next_if(|line| !line.starts_with(HUNK_MARKER)) {
            match classify(line) {
                Some(HunkLine::Context(_)) => {
                    old_seen += 1;
                    new_seen += 1;
                }
                Some(HunkLine::Added(_)) => new_seen += 1,
                Some(HunkLine::Removed(_)) => old_seen += 1,
                Some(HunkLine::NoNewline) => {}
                None => {
                    return Err(PatchError::UnexpectedLine {
                        path: path.to_string(),
                        line: strip_line_ending(line).to_string(),
                    });
                }
            }
            body_text.push_str(line);
        }

        check_count(path, header, "old", old_count, old_seen)?;
        check_count(path, header, "new", new_count, new_seen)?;

        let new_file_slice = slice_post_image(path, header, &post_image, new_start, new_count)?;

        hunks.push(CodeHunk {
            old_start_line: old_start,
            old_line_count: old_count,
            new_start_line: new_start,
            new_line_count: new_count,
            header_text: header.to_string(),
            section_heading: heading,
            body_text,
            new_file_slice,
        });
    }

    Ok(hunks)
}

type HeaderFields = (usize, usize, usize, usize, Option<String>);

fn parse_header(path: &str, header: &str) -> Result<HeaderFields, PatchError> {
    let invalid = || PatchError::InvalidHeader {
        path: path.to_string(),
        header: header.to_string(),
    };

    let caps = HUNK_HEADER.captures(header).ok_or_else(invalid)?;
    let number = |idx: usize| -> Result<usize, PatchError> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().map_err(|_| invalid()),
            None => Ok(1),
        }
    };

    let heading = caps
        .get(5)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok((number(1)?, number(2)?, number(3)?, number(4)?, heading))
}

fn check_count(
    path: &str,
    header: &str,
    side: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), PatchError> {
    if expected == actual {
        return Ok(());
    }
    Err(PatchError::CountMismatch {
        path: path.to_string(),
        header: header.to_string(),
        side,
        expected,
        actual,
    })
}

fn slice_post_image(
    path: &str,
    header: &str,
    post_image: &[&str],
    new_start: usize,
    new_count: usize,
) -> Result<String, PatchError> {
    if new_count == 0 {
        return Ok(String::new());
    }

    // a non-empty hunk cannot start at line 0
    let start = new_start.checked_sub(1).ok_or_else(|| PatchError::InvalidHeader {
        path: path.to_string(),
        header: header.to_string(),
    })?;
    let out_of_bounds = |end: usize| PatchError::SliceOutOfBounds {
        path: path.to_string(),
        header: header.to_string(),
        end,
        available: post_image.len(),
    };
    let end = start.checked_add(new_count).ok_or_else(|| out_of_bounds(usize::MAX))?;

    post_image
        .get(start..end)
        .map(|lines| lines.concat())
        .ok_or_else(|| out_of_bounds(end))
}

fn is_binary_marker(line: &str) -> bool {
    let line = strip_line_ending(line);
    (line.starts_with("Binary files ") && line.ends_with(" differ")) || line == "GIT binary patch"
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
mod tests;
