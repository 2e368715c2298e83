//! Comment stripping for a single line.

/// The prefix that starts both full-line and inline comments.
pub const COMMENT: &str = "//";

/// A line after comment handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// The line starts with `//` and is skipped entirely.
    Comment,
    /// The remaining text, with any inline comment removed and trailing
    /// whitespace trimmed. May be empty.
    Text(&'a str),
}

impl<'a> Line<'a> {
    /// Returns `true` for lines that carry nothing to execute.
    pub fn is_blank(&self) -> bool {
        match self {
            Line::Comment => true,
            Line::Text(text) => text.trim().is_empty(),
        }
    }
}

/// Strips comments from one raw line.
///
/// `//` is not quote-aware: an argument that contains `//` is cut at that point.
pub fn preprocess(line: &str) -> Line<'_> {
    if line.starts_with(COMMENT) {
        return Line::Comment;
    }
    let code = match line.find(COMMENT) {
        Some(index) => &line[..index],
        None => line,
    };
    Line::Text(code.trim_end())
}
