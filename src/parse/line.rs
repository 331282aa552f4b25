//! Lexical classification of a single line of source text.
//!
//! Collapsed into one dispatch function since the grammar is small enough
//! that a single `classify` pass is clearer than a module per construct.

use crate::consts::{
    ASSIGN_MARKER, CHOICE_MARKER, CONST_KEYWORD, INCLUDE_KEYWORD, LABEL_MARKER_CLOSE,
    LABEL_MARKER_OPEN, LIST_KEYWORD, STICKY_CHOICE_MARKER, TAG_MARKER, TEMP_KEYWORD,
    TODO_COMMENT_MARKER, VAR_KEYWORD,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::error::utils::MetaData;

#[derive(Debug, Clone)]
pub enum LineKind {
    Blank,
    Todo(String),
    Include(String),
    Const { name: String, expression: String },
    Var { name: String, expression: String },
    List { name: String, rhs: String },
    KnotHeader(String),
    StitchHeader(String),
    Assign {
        temp: bool,
        var: String,
        expression: String,
    },
    Choice {
        level: usize,
        sticky: bool,
        condition: Option<String>,
        /// Menu caption; `None` marks a fallback choice (bare divert, no
        /// caption at all).
        caption: Option<String>,
        /// Text narrated once the choice is selected.
        text: Option<String>,
        divert: Option<String>,
        tags: Vec<String>,
    },
    Content {
        gather_level: usize,
        label: Option<String>,
        text: Option<String>,
        divert: Option<String>,
        tags: Vec<String>,
    },
}

/// Classify one (already comment-stripped) line of source.
pub fn classify(raw: &str, line_index: usize) -> Result<LineKind, ParseError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Ok(LineKind::Blank);
    }

    let meta = MetaData::from(line_index);

    if let Some(rest) = strip_keyword(trimmed, TODO_COMMENT_MARKER) {
        return Ok(LineKind::Todo(rest.trim().to_string()));
    }

    if let Some(rest) = strip_keyword(trimmed, INCLUDE_KEYWORD) {
        return Ok(LineKind::Include(rest.trim().to_string()));
    }

    if let Some(rest) = strip_keyword(trimmed, CONST_KEYWORD) {
        let (name, expression) = split_declaration(rest, &meta)?;
        return Ok(LineKind::Const { name, expression });
    }

    if let Some(rest) = strip_keyword(trimmed, VAR_KEYWORD) {
        let (name, expression) = split_declaration(rest, &meta)?;
        return Ok(LineKind::Var { name, expression });
    }

    if let Some(rest) = strip_keyword(trimmed, LIST_KEYWORD) {
        let (name, rhs) = split_declaration(rest, &meta)?;
        return Ok(LineKind::List { name, rhs });
    }

    if let Some(name) = parse_header(trimmed, '=', 2) {
        if name.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::MissingHeaderName {
                    line: raw.to_string(),
                },
                meta,
            ));
        }
        return Ok(LineKind::KnotHeader(name));
    }

    if let Some(name) = parse_header(trimmed, '=', 1) {
        if name.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::MissingHeaderName {
                    line: raw.to_string(),
                },
                meta,
            ));
        }
        return Ok(LineKind::StitchHeader(name));
    }

    if let Some(rest) = trimmed.strip_prefix(ASSIGN_MARKER) {
        let rest = rest.trim();
        let (temp, rest) = match strip_keyword(rest, TEMP_KEYWORD) {
            Some(after) => (true, after.trim()),
            None => (false, rest),
        };
        let (var, expression) = desugar_assignment(rest, &meta)?;
        return Ok(LineKind::Assign {
            temp,
            var,
            expression,
        });
    }

    if let Some((level, sticky, mixed)) = count_markers(trimmed, CHOICE_MARKER, STICKY_CHOICE_MARKER) {
        if mixed {
            return Err(ParseError::new(
                ParseErrorKind::StickyAndNonSticky {
                    line: raw.to_string(),
                },
                meta,
            ));
        }

        let rest = skip_markers(trimmed, level);
        let (rest, tags) = split_tags(rest);
        let (condition, rest) = take_leading_brace(rest);
        let (rest, divert) = split_divert(rest, &meta)?;

        let caption_source = rest.trim();
        let (caption, text) = if caption_source.is_empty() {
            (None, None)
        } else {
            let (title, narrated) = split_choice_text(rest, raw, &meta)?;
            let title = if title.is_empty() { None } else { Some(title) };
            let narrated = if narrated.is_empty() {
                None
            } else {
                Some(narrated)
            };
            (title, narrated)
        };

        return Ok(LineKind::Choice {
            level,
            sticky,
            condition,
            caption,
            text,
            divert,
            tags,
        });
    }

    let (gather_level, rest) = count_gather(trimmed);
    let (rest, tags) = split_tags(rest);
    let (rest, label) = take_leading_label(rest);
    let (rest, divert) = split_divert(rest, &meta)?;
    let text = {
        let t = rest.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    };

    Ok(LineKind::Content {
        gather_level,
        label,
        text,
        divert,
        tags,
    })
}

fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

fn split_declaration(rest: &str, meta: &MetaData) -> Result<(String, String), ParseError> {
    let pos = rest.find('=').ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MalformedDeclaration {
                line: rest.to_string(),
            },
            meta.clone(),
        )
    })?;

    let name = rest[..pos].trim().to_string();
    let expression = rest[pos + 1..].trim().to_string();

    Ok((name, expression))
}

/// `=name=`/`==name==`/`== name` style headers. `min_equals` distinguishes a
/// knot header (>= 2 leading `=`) from a stitch header (exactly 1).
fn parse_header(line: &str, marker: char, min_equals: usize) -> Option<String> {
    let leading = line.chars().take_while(|c| *c == marker).count();

    if min_equals == 1 && leading != 1 {
        return None;
    }
    if min_equals == 2 && leading < 2 {
        return None;
    }

    let rest = &line[leading..];
    let trailing = rest.chars().rev().take_while(|c| *c == marker).count();
    let end = rest.len() - trailing;

    Some(rest[..end].trim().to_string())
}

/// Desugars `x++`/`x--`/`x += e`/`x -= e` into `(name, "name OP e")` form,
/// otherwise splits `name = expr`.
fn desugar_assignment(rest: &str, meta: &MetaData) -> Result<(String, String), ParseError> {
    if let Some(pos) = rest.find("++") {
        let name = rest[..pos].trim().to_string();
        return Ok((name.clone(), format!("{} + 1", name)));
    }
    if let Some(pos) = rest.find("--") {
        let name = rest[..pos].trim().to_string();
        return Ok((name.clone(), format!("{} - 1", name)));
    }
    if let Some(pos) = rest.find("+=") {
        let name = rest[..pos].trim().to_string();
        let expr = rest[pos + 2..].trim();
        return Ok((name.clone(), format!("{} + ({})", name, expr)));
    }
    if let Some(pos) = rest.find("-=") {
        let name = rest[..pos].trim().to_string();
        let expr = rest[pos + 2..].trim();
        return Ok((name.clone(), format!("{} - ({})", name, expr)));
    }

    let pos = rest.find('=').ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MalformedDeclaration {
                line: rest.to_string(),
            },
            meta.clone(),
        )
    })?;

    Ok((
        rest[..pos].trim().to_string(),
        rest[pos + 1..].trim().to_string(),
    ))
}

/// Count leading repeats of `marker`/`alt_marker` (each run separated only by
/// whitespace, e.g. `"* *"` is level 2). Returns `(level, is_alt, mixed)`.
fn count_markers(line: &str, marker: char, alt_marker: char) -> Option<(usize, bool, bool)> {
    let mut chars = line.chars().peekable();
    let mut level = 0;
    let mut saw_marker = false;
    let mut saw_alt = false;

    loop {
        match chars.peek() {
            Some(&c) if c == marker => {
                saw_marker = true;
                level += 1;
                chars.next();
            }
            Some(&c) if c == alt_marker => {
                saw_alt = true;
                level += 1;
                chars.next();
            }
            _ => break,
        }

        while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
            chars.next();
        }
    }

    if level == 0 {
        return None;
    }

    Some((level, saw_alt && !saw_marker, saw_marker && saw_alt))
}

fn skip_markers(line: &str, level: usize) -> &str {
    let mut rest = line;
    for _ in 0..level {
        rest = rest.trim_start();
        rest = &rest[1..];
    }
    rest.trim_start()
}

/// Leading `-`/`- -`/... gather depth. A leading `-` immediately followed by
/// `>` is the divert marker, not a gather, so it stops the count.
fn count_gather(line: &str) -> (usize, &str) {
    let mut rest = line;
    let mut level = 0;

    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix('-') {
            if after.starts_with('>') {
                break;
            }
            level += 1;
            rest = after;
        } else {
            rest = trimmed;
            break;
        }
    }

    (level, rest)
}

/// Splits trailing `# tag # tag` markers off a line.
fn split_tags(line: &str) -> (&str, Vec<String>) {
    match line.find(TAG_MARKER) {
        None => (line, Vec::new()),
        Some(pos) => {
            let (content, tag_part) = line.split_at(pos);
            let tags = tag_part[1..]
                .split(TAG_MARKER)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            (content, tags)
        }
    }
}

/// Splits off a `-> target` divert, erroring on a bare `->` with no target.
fn split_divert<'a>(line: &'a str, meta: &MetaData) -> Result<(&'a str, Option<String>), ParseError> {
    match line.find("->") {
        None => Ok((line, None)),
        Some(pos) => {
            let (content, divert_part) = line.split_at(pos);
            let target = divert_part[2..].trim();

            if target.is_empty() {
                return Err(ParseError::new(ParseErrorKind::EmptyDivert, meta.clone()));
            }

            Ok((content, Some(target.to_string())))
        }
    }
}

/// Extracts a leading `(label)` from a content line.
fn take_leading_label(line: &str) -> (&str, Option<String>) {
    let trimmed = line.trim_start();

    if trimmed.starts_with(LABEL_MARKER_OPEN) {
        if let Some(end) = trimmed.find(LABEL_MARKER_CLOSE) {
            let label = trimmed[1..end].trim().to_string();
            return (&trimmed[end + 1..], Some(label));
        }
    }

    (line, None)
}

/// Extracts a leading `{condition}` from a choice line (only when the braced
/// content holds a plain boolean expression, not an alts/condition shape).
fn take_leading_brace(line: &str) -> (Option<String>, &str) {
    let trimmed = line.trim_start();

    if let Some(rest) = trimmed.strip_prefix('{') {
        if let Some(end) = rest.find('}') {
            let inner = &rest[..end];
            if !contains_lone_pipe(inner) {
                return (Some(inner.trim().to_string()), &rest[end + 1..]);
            }
        }
    }

    (None, line)
}

/// Whether `text` has a `|` that is not part of a `||` logical-or pair
/// (which would mean `text` is an alts/condition shape, not a plain
/// boolean expression).
fn contains_lone_pipe(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'|' {
            if bytes.get(i + 1) == Some(&b'|') {
                i += 2;
                continue;
            }
            return true;
        }
        i += 1;
    }
    false
}

/// Splits `prefix [middle] suffix` choice captions.
/// Returns `(menu_title, narrated_text)`.
fn split_choice_text<'a>(
    line: &'a str,
    raw: &str,
    meta: &MetaData,
) -> Result<(String, String), ParseError> {
    let trimmed = line.trim();

    match (trimmed.find('['), trimmed.find(']')) {
        (Some(open), Some(close)) if open < close => {
            let prefix = &trimmed[..open];
            let middle = &trimmed[open + 1..close];
            let suffix = &trimmed[close + 1..];

            if trimmed[close + 1..].contains(']') || trimmed[..open].contains('[') {
                return Err(ParseError::new(
                    ParseErrorKind::UnmatchedBrackets {
                        line: raw.to_string(),
                    },
                    meta.clone(),
                ));
            }

            Ok((
                format!("{}{}", prefix, middle).trim().to_string(),
                format!("{}{}", prefix, suffix).trim().to_string(),
            ))
        }
        (None, None) => Ok((trimmed.to_string(), trimmed.to_string())),
        _ => Err(ParseError::new(
            ParseErrorKind::UnmatchedBrackets {
                line: raw.to_string(),
            },
            meta.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_choice_condition_containing_logical_or_is_extracted_whole() {
        assert!(matches!(
            classify("* {x || y} Good -> G", 0).unwrap(),
            LineKind::Choice { condition: Some(cond), .. } if cond == "x || y"
        ));
    }

    #[test]
    fn classifies_knot_and_stitch_headers() {
        assert!(matches!(
            classify("== dream ==", 0).unwrap(),
            LineKind::KnotHeader(name) if name == "dream"
        ));
        assert!(matches!(
            classify("= wake", 0).unwrap(),
            LineKind::StitchHeader(name) if name == "wake"
        ));
    }

    #[test]
    fn counts_nested_choice_markers() {
        match classify("* *     He then offers condolences.", 0).unwrap() {
            LineKind::Choice { level, sticky, .. } => {
                assert_eq!(level, 2);
                assert!(!sticky);
            }
            other => panic!("expected choice, got {:?}", other),
        }
    }

    #[test]
    fn mixed_choice_markers_error() {
        assert!(classify("* +   mixed", 0).is_err());
    }

    #[test]
    fn gather_dash_is_distinguished_from_divert_arrow() {
        match classify("- -> END", 0).unwrap() {
            LineKind::Content {
                gather_level,
                divert,
                ..
            } => {
                assert_eq!(gather_level, 1);
                assert_eq!(divert.as_deref(), Some("END"));
            }
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn plain_divert_line_has_gather_level_zero() {
        match classify("-> END", 0).unwrap() {
            LineKind::Content {
                gather_level,
                divert,
                ..
            } => {
                assert_eq!(gather_level, 0);
                assert_eq!(divert.as_deref(), Some("END"));
            }
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn assignment_desugars_increment() {
        match classify("~ x++", 0).unwrap() {
            LineKind::Assign { var, expression, .. } => {
                assert_eq!(var, "x");
                assert_eq!(expression, "x + 1");
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn assignment_desugars_plus_equals() {
        match classify("~ score += 2", 0).unwrap() {
            LineKind::Assign { var, expression, .. } => {
                assert_eq!(var, "score");
                assert_eq!(expression, "score + (2)");
            }
            other => panic!("expected assign, got {:?}", other),
        }
    }

    #[test]
    fn tags_split_on_multiple_markers() {
        let (content, tags) = split_tags("Hello # one # two");
        assert_eq!(content.trim(), "Hello");
        assert_eq!(tags, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn list_declaration_is_classified() {
        match classify("LIST colors = red, (green), blue", 0).unwrap() {
            LineKind::List { name, rhs } => {
                assert_eq!(name, "colors");
                assert_eq!(rhs, "red, (green), blue");
            }
            other => panic!("expected list, got {:?}", other),
        }
    }
}
