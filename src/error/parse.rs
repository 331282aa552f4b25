//! Errors raised while turning source text into a Story Model.

use std::fmt;

use crate::error::utils::{write_line_content, MetaData};

#[derive(Clone, Debug)]
/// Error from parsing a story from source text.
///
/// Per the grammar's best-effort failure model, a line that simply fails to
/// match a known production is not an error: it is dropped and parsing
/// continues. `ParseError` is only raised for the small set of faults that
/// would otherwise silently corrupt later lines: an unterminated block
/// comment, an unterminated inline expression, or a structurally broken
/// choice/list/assignment that the parser cannot safely skip past.
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub meta_data: MetaData,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, meta_data: MetaData) -> Self {
        ParseError { kind, meta_data }
    }
}

#[derive(Clone, Debug)]
pub enum ParseErrorKind {
    /// Attempted to construct a story from an empty file/string.
    Empty,
    /// A `/* ... */` block comment was opened but never closed.
    UnterminatedComment,
    /// A `{ ... }` inline expression was opened but never closed.
    UnterminatedExpression { content: String },
    /// A choice line mixed `*` and `+` markers.
    StickyAndNonSticky { line: String },
    /// A choice's `[ ... ]` bracket split was unmatched or duplicated.
    UnmatchedBrackets { line: String },
    /// A choice with no text and no divert and a bracket separator.
    BlankChoice { line: String },
    /// `LIST`, `VAR` or `CONST` declaration had no `=` assignment.
    MalformedDeclaration { line: String },
    /// A knot or stitch header had no name.
    MissingHeaderName { line: String },
    /// A divert target referenced no address at all (bare `->`).
    EmptyDivert,
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParseErrorKind::*;

        write!(f, "Parse error at {}: ", self.meta_data)?;

        match &self.kind {
            Empty => write!(f, "story source was empty"),
            UnterminatedComment => write!(f, "block comment was never closed with '*/'"),
            UnterminatedExpression { content } => {
                write!(f, "inline expression was never closed with '}}'")?;
                write_line_content(f, content)
            }
            StickyAndNonSticky { line } => {
                write!(f, "choice line used both '*' and '+' markers")?;
                write_line_content(f, line)
            }
            UnmatchedBrackets { line } => {
                write!(f, "choice line had unmatched or multiple '[' ']' brackets")?;
                write_line_content(f, line)
            }
            BlankChoice { line } => {
                write!(f, "fallback choice used a bracket separator on empty text")?;
                write_line_content(f, line)
            }
            MalformedDeclaration { line } => {
                write!(f, "declaration is missing its '=' assignment")?;
                write_line_content(f, line)
            }
            MissingHeaderName { line } => {
                write!(f, "knot or stitch header has no name")?;
                write_line_content(f, line)
            }
            EmptyDivert => write!(f, "divert marker '->' had no target address"),
        }
    }
}
