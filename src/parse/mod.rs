//! Turns story source text into a [`StoryModel`].
//!
//! Comments are stripped in one pass, then [`line::classify`] lexes each
//! remaining line, and this module folds the resulting stream into knots,
//! stitches and the nested block tree.
//!
//! Nesting lives directly in the tree (`ChoiceBlock.node`): a `chain` of
//! indices tracks which `Vec<Block>` is currently open, truncated and
//! re-extended as choices and conditions nest and unwind.

mod line;

pub use line::LineKind;

use std::collections::HashMap;

use crate::consts::{
    CYCLE_SEQUENCE_KEYWORD, CYCLE_SEQUENCE_MARKER, ELSE_KEYWORD, ONCE_SEQUENCE_KEYWORD,
    ONCE_SEQUENCE_MARKER, ROOT_KNOT_NAME, ROOT_STITCH_NAME, SHUFFLE_SEQUENCE_KEYWORD,
    SHUFFLE_SEQUENCE_MARKER, STOPPING_SEQUENCE_KEYWORD,
};
use crate::error::utils::MetaData;
use crate::error::{ParseError, ParseErrorKind};
use crate::log::{Logger, Warning};
use crate::model::{
    AltItem, AltsBlock, AltsMode, AssignBlock, Block, ChoiceBlock, ConditionBlock, ConditionKind,
    Knot, ListDecl, Paragraph, StoryModel, VariableDecl, Version,
};

/// Parse a complete story script into its compiled [`StoryModel`], along
/// with any `TODO:` comments and warnings raised along the way.
pub fn parse_story(source: &str) -> Result<(StoryModel, Logger), ParseError> {
    if source.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, MetaData::from(0usize)));
    }

    let stripped = strip_comments(source)?;

    let mut builder = Builder::new();

    for (line_index, raw) in stripped.lines().enumerate() {
        let kind = line::classify(raw, line_index)?;
        builder.apply(kind, raw, line_index)?;
    }

    Ok((builder.model, builder.logger))
}

/// Removes `// line` and `/* block */` comments while preserving line
/// breaks, so the line index handed to [`line::classify`] still matches the
/// original source.
fn strip_comments(source: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut line_index = 0usize;
    let mut in_block_comment = false;

    while let Some(c) = chars.next() {
        if in_block_comment {
            if c == '\n' {
                out.push('\n');
                line_index += 1;
            } else if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            }
            continue;
        }

        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            in_block_comment = true;
            continue;
        }

        if c == '/' && chars.peek() == Some(&'/') {
            while let Some(&next) = chars.peek() {
                if next == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }

        if c == '\n' {
            line_index += 1;
        }
        out.push(c);
    }

    if in_block_comment {
        return Err(ParseError::new(
            ParseErrorKind::UnterminatedComment,
            MetaData::from(line_index),
        ));
    }

    Ok(out)
}

/// Accumulates a [`StoryModel`] while walking the classified line stream.
struct Builder {
    model: StoryModel,
    logger: Logger,
    current_knot: String,
    current_stitch: String,
    /// Indices of currently open [`ChoiceBlock`]s, from the top-level
    /// stitch down to the innermost one still accepting content.
    chain: Vec<usize>,
    alt_counter: u32,
}

impl Builder {
    fn new() -> Self {
        let mut knots = HashMap::new();
        knots.insert(ROOT_KNOT_NAME.to_string(), Knot::new());

        let model = StoryModel {
            knots,
            includes: Vec::new(),
            constants: HashMap::new(),
            variables: HashMap::new(),
            lists: HashMap::new(),
            list_order: Vec::new(),
            version: Version::current(0),
        };

        Builder {
            model,
            logger: Logger::default(),
            current_knot: ROOT_KNOT_NAME.to_string(),
            current_stitch: ROOT_STITCH_NAME.to_string(),
            chain: Vec::new(),
            alt_counter: 0,
        }
    }

    fn apply(&mut self, kind: LineKind, raw: &str, line_index: usize) -> Result<(), ParseError> {
        let meta = MetaData::from(line_index);

        match kind {
            LineKind::Blank => Ok(()),
            LineKind::Todo(comment) => {
                self.logger.add_todo(&comment, &meta);
                Ok(())
            }
            LineKind::Include(name) => {
                self.model.includes.push(name);
                Ok(())
            }
            LineKind::Const { name, expression } => {
                if name == "tree" {
                    if let Ok(tree) = expression.trim().parse::<u32>() {
                        self.model.version = Version::current(tree);
                    }
                }
                self.model
                    .constants
                    .insert(name, VariableDecl::constant(expression));
                Ok(())
            }
            LineKind::Var { name, expression } => {
                self.model.variables.insert(name, VariableDecl::var(expression));
                Ok(())
            }
            LineKind::List { name, rhs } => {
                let (items, initially_on) = parse_list_rhs(&rhs);
                let seed = VariableDecl::var(format!("({})", initially_on.join(", ")));

                self.model.list_order.push(name.clone());
                self.model.lists.insert(name.clone(), ListDecl { items, initially_on });
                self.model.variables.insert(name, seed);
                Ok(())
            }
            LineKind::KnotHeader(name) => {
                self.model.knots.entry(name.clone()).or_insert_with(Knot::new);
                self.current_knot = name;
                self.current_stitch = ROOT_STITCH_NAME.to_string();
                self.chain.clear();
                Ok(())
            }
            LineKind::StitchHeader(name) => {
                let knot = self
                    .model
                    .knots
                    .entry(self.current_knot.clone())
                    .or_insert_with(Knot::new);
                knot.stitch_mut(&name);
                self.current_stitch = name;
                self.chain.clear();
                Ok(())
            }
            LineKind::Assign { temp, var, expression } => {
                let container = self.open_container();
                container.push(Block::Assign(AssignBlock {
                    var,
                    value: expression,
                    temp,
                }));
                Ok(())
            }
            LineKind::Choice {
                level,
                sticky,
                condition,
                caption,
                text,
                divert,
                tags,
            } => {
                check_braces_balanced(caption.as_deref(), raw, &meta)?;
                check_braces_balanced(text.as_deref(), raw, &meta)?;

                let depth = level.max(1);
                self.chain.truncate(depth - 1);

                let block = ChoiceBlock {
                    choice: caption,
                    text,
                    divert,
                    sticky,
                    condition,
                    node: Vec::new(),
                };
                let _ = tags;

                let container = self.container_at(depth - 1);
                container.push(Block::Choice(block));
                let index = container.len() - 1;
                self.chain.push(index);
                Ok(())
            }
            LineKind::Content {
                gather_level,
                label,
                text,
                divert,
                tags,
            } => {
                check_braces_balanced(text.as_deref(), raw, &meta)?;

                if gather_level > 0 {
                    self.chain.truncate(gather_level.saturating_sub(1));
                }

                let block = match &text {
                    Some(t) if label.is_none() && divert.is_none() && tags.is_empty() => {
                        match brace_block(t, &meta, &mut self.logger, &mut self.alt_counter)? {
                            Some(block) => block,
                            None => Block::Paragraph(Paragraph {
                                text: Some(t.clone()),
                                label,
                                divert,
                                tags,
                            }),
                        }
                    }
                    _ => Block::Paragraph(Paragraph { text, label, divert, tags }),
                };

                let target_depth = if gather_level > 0 { gather_level - 1 } else { self.chain.len() };
                let container = self.container_at(target_depth);
                container.push(block);
                Ok(())
            }
        }
    }

    /// The `Vec<Block>` currently accepting new siblings: the innermost
    /// open choice's `node`, or the stitch's top level if none is open.
    fn open_container(&mut self) -> &mut Vec<Block> {
        let depth = self.chain.len();
        self.container_at(depth)
    }

    /// The `Vec<Block>` reached by descending `depth` levels of the open
    /// chain (0 = the stitch's own top-level content).
    fn container_at(&mut self, depth: usize) -> &mut Vec<Block> {
        let knot = self
            .model
            .knots
            .entry(self.current_knot.clone())
            .or_insert_with(Knot::new);
        let mut container = knot.stitch_mut(&self.current_stitch);

        for &index in self.chain[..depth].iter() {
            container = match container.get_mut(index) {
                Some(Block::Choice(choice)) => &mut choice.node,
                _ => panic!(
                    "parser chain index {} out of sync with its own insertions",
                    index
                ),
            };
        }

        container
    }
}

/// Parses a `LIST name = item, (item), item` right-hand side into its item
/// order and initially-active members.
fn parse_list_rhs(rhs: &str) -> (Vec<String>, Vec<String>) {
    let mut items = Vec::new();
    let mut initially_on = Vec::new();

    for part in rhs.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(inner) = trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            let name = inner.trim().to_string();
            initially_on.push(name.clone());
            items.push(name);
        } else {
            items.push(trimmed.to_string());
        }
    }

    (items, initially_on)
}

fn check_braces_balanced(text: Option<&str>, raw: &str, meta: &MetaData) -> Result<(), ParseError> {
    let text = match text {
        Some(t) => t,
        None => return Ok(()),
    };

    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(ParseError::new(
            ParseErrorKind::UnterminatedExpression { content: raw.to_string() },
            meta.clone(),
        ));
    }

    Ok(())
}

/// Promotes a content line whose entire text is one balanced `{ ... }` to a
/// [`Block::Condition`] or [`Block::Alts`]. Only a line with no
/// label/divert/tags alongside the brace is eligible; anything else keeps
/// its literal text and is expanded weakly at read time by
/// [`crate::eval::expand_inline`].
fn brace_block(
    text: &str,
    meta: &MetaData,
    logger: &mut Logger,
    alt_counter: &mut u32,
) -> Result<Option<Block>, ParseError> {
    let trimmed = text.trim();
    let inner = match whole_line_brace(trimmed) {
        Some(inner) => inner,
        None => return Ok(None),
    };

    let (mode, body) = strip_alt_marker(inner);

    if mode.is_none() {
        let segments = split_top_level(body, '|');
        if segments.iter().any(|s| find_top_level_colon(s).is_some()) {
            return Ok(Some(Block::Condition(parse_condition(&segments))));
        }

        // No sequence keyword, no `|` alternatives, no `:` condition: this
        // is a bare `{expr}` value line, not sequencing sugar. Leave it as
        // literal (still brace-wrapped) paragraph text so it is evaluated
        // and rendered by `expand_inline` like any other inline expression,
        // rather than frozen as a one-entry `stopping` sequence that would
        // never actually evaluate its contents.
        if segments.len() == 1 {
            return Ok(None);
        }
    }

    let mut mode = mode.unwrap_or(AltsMode::Stopping);
    if mode == AltsMode::Shuffle && !cfg!(feature = "random") {
        logger.add_warning(Warning::ShuffleSequenceNoRandom, meta);
        mode = AltsMode::Cycle;
    }

    let segments = split_top_level(body, '|');
    let alts = segments.iter().map(|s| parse_alt_item(s)).collect();

    *alt_counter += 1;
    let label = format!("__alt{}", alt_counter);

    Ok(Some(Block::Alts(AltsBlock { alts, mode, label })))
}

/// Returns the content between the outermost pair of braces if `text` is
/// wrapped in exactly one balanced `{ ... }`, with nothing outside it.
fn whole_line_brace(text: &str) -> Option<&str> {
    if !text.starts_with('{') || !text.ends_with('}') {
        return None;
    }

    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 && i != text.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }

    Some(&text[1..text.len() - 1])
}

fn strip_alt_marker(inner: &str) -> (Option<AltsMode>, &str) {
    let trimmed = inner.trim_start();

    if let Some(rest) = trimmed.strip_prefix(CYCLE_SEQUENCE_MARKER) {
        return (Some(AltsMode::Cycle), rest);
    }
    if let Some(rest) = trimmed.strip_prefix(ONCE_SEQUENCE_MARKER) {
        return (Some(AltsMode::Once), rest);
    }
    if let Some(rest) = trimmed.strip_prefix(SHUFFLE_SEQUENCE_MARKER) {
        return (Some(AltsMode::Shuffle), rest);
    }

    for (keyword, mode) in [
        (STOPPING_SEQUENCE_KEYWORD, AltsMode::Stopping),
        (CYCLE_SEQUENCE_KEYWORD, AltsMode::Cycle),
        (ONCE_SEQUENCE_KEYWORD, AltsMode::Once),
        (SHUFFLE_SEQUENCE_KEYWORD, AltsMode::Shuffle),
    ] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if let Some(rest) = rest.trim_start().strip_prefix(':') {
                return (Some(mode), rest);
            }
        }
    }

    (None, inner)
}

/// Splits `text` on top-level occurrences of `sep`, respecting nested
/// `{}`/`()` so a condition's own braces or a list's parenthesized items
/// are never mistaken for a separator. Two consecutive `sep` characters
/// (e.g. `||`) are a single literal operator, not two splits, so a
/// logical-or inside a hoisted `{...}` block survives intact.
fn split_top_level(text: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut idx = 0;
    while idx < chars.len() {
        let (i, c) = chars[idx];
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                if chars.get(idx + 1).map(|&(_, next)| next) == Some(sep) {
                    idx += 2;
                    continue;
                }
                parts.push(text[start..i].to_string());
                start = i + c.len_utf8();
            }
            _ => {}
        }
        idx += 1;
    }
    parts.push(text[start..].to_string());

    parts
}

fn find_top_level_colon(text: &str) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth -= 1,
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_condition(segments: &[String]) -> ConditionBlock {
    let mut arms = Vec::new();
    let mut failure = Vec::new();

    for segment in segments {
        let pos = match find_top_level_colon(segment) {
            Some(pos) => pos,
            None => continue,
        };

        let head = segment[..pos].trim();
        let body_text = segment[pos + 1..].trim().to_string();
        let body = text_body(body_text);

        if head == ELSE_KEYWORD {
            failure = body;
        } else {
            arms.push((head.to_string(), body));
        }
    }

    if arms.len() == 1 {
        let (condition, success) = arms.into_iter().next().unwrap();
        ConditionBlock {
            kind: ConditionKind::IfElse { condition, success },
            failure,
        }
    } else {
        ConditionBlock {
            kind: ConditionKind::Switch { arms },
            failure,
        }
    }
}

fn text_body(text: String) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }

    vec![Block::Paragraph(Paragraph {
        text: Some(text),
        label: None,
        divert: None,
        tags: Vec::new(),
    })]
}

fn parse_alt_item(segment: &str) -> AltItem {
    let trimmed = segment.trim();

    match trimmed.find("->") {
        Some(pos) => {
            let text_part = trimmed[..pos].trim();
            let target = trimmed[pos + 2..].trim();

            AltItem::Blocks(vec![Block::Paragraph(Paragraph {
                text: if text_part.is_empty() {
                    None
                } else {
                    Some(text_part.to_string())
                },
                label: None,
                divert: if target.is_empty() {
                    None
                } else {
                    Some(target.to_string())
                },
                tags: Vec::new(),
            })])
        }
        None => AltItem::Text(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_simple_knot_with_a_paragraph() {
        let (model, _log) = parse_story("Hello, world.").unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        assert_eq!(stitch.len(), 1);
        assert!(matches!(&stitch[0], Block::Paragraph(p) if p.text.as_deref() == Some("Hello, world.")));
    }

    #[test]
    fn nests_choice_body_content_inside_its_node() {
        let source = "\
* Good -> G
  Some text.
- Gathered.
";
        let (model, _log) = parse_story(source).unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];

        assert_eq!(stitch.len(), 2);
        match &stitch[0] {
            Block::Choice(choice) => {
                assert_eq!(choice.node.len(), 1);
                assert!(matches!(&choice.node[0], Block::Paragraph(p) if p.text.as_deref() == Some("Some text.")));
            }
            other => panic!("expected choice, got {:?}", other),
        }
        assert!(matches!(&stitch[1], Block::Paragraph(p) if p.text.as_deref() == Some("Gathered.")));
    }

    #[test]
    fn sibling_choices_do_not_nest_into_each_other() {
        let source = "\
* Good -> G
* Bad -> B
";
        let (model, _log) = parse_story(source).unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        assert_eq!(stitch.len(), 2);
    }

    #[test]
    fn knot_and_stitch_headers_create_scopes() {
        let source = "\
=== forest ===
= clearing
A clearing.
";
        let (model, _log) = parse_story(source).unwrap();
        let knot = &model.knots["forest"];
        let stitch = &knot.stitches["clearing"];
        assert_eq!(stitch.len(), 1);
    }

    #[test]
    fn list_declaration_seeds_a_variable_and_a_decl() {
        let (model, _log) = parse_story("LIST colors = red, (green), blue\n-> END").unwrap();
        assert_eq!(model.list_order, vec!["colors".to_string()]);
        let decl = &model.lists["colors"];
        assert_eq!(decl.items, vec!["red", "green", "blue"]);
        assert_eq!(decl.initially_on, vec!["green"]);
        assert_eq!(model.variables["colors"].expression, "(green)");
    }

    #[test]
    fn const_tree_sets_the_version() {
        let (model, _log) = parse_story("CONST tree = 3\n-> END").unwrap();
        assert_eq!(model.version.tree, 3);
    }

    #[test]
    fn stopping_alts_block_is_recognized() {
        let (model, _log) = parse_story("{stopping: a|b|c}").unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        match &stitch[0] {
            Block::Alts(alts) => {
                assert_eq!(alts.mode, AltsMode::Stopping);
                assert_eq!(alts.alts.len(), 3);
            }
            other => panic!("expected alts, got {:?}", other),
        }
    }

    #[test]
    fn condition_switch_with_else_is_recognized() {
        let (model, _log) = parse_story("{x == 1: one | x == 2: two | else: many}").unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        match &stitch[0] {
            Block::Condition(cond) => {
                match &cond.kind {
                    ConditionKind::Switch { arms } => assert_eq!(arms.len(), 2),
                    other => panic!("expected switch, got {:?}", other),
                }
                assert_eq!(cond.failure.len(), 1);
            }
            other => panic!("expected condition, got {:?}", other),
        }
    }

    #[test]
    fn condition_switch_keeps_a_logical_or_condition_intact() {
        let (model, _log) = parse_story("{x || y: yes | else: no}").unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        match &stitch[0] {
            Block::Condition(cond) => match &cond.kind {
                ConditionKind::IfElse { condition, .. } => assert_eq!(condition, "x || y"),
                other => panic!("expected if/else, got {:?}", other),
            },
            other => panic!("expected condition, got {:?}", other),
        }
    }

    #[test]
    fn a_bare_logical_or_expression_is_left_as_inline_text_not_alts() {
        let (model, _log) = parse_story("{x || y}").unwrap();
        let stitch = &model.knots[ROOT_KNOT_NAME].stitches[ROOT_STITCH_NAME];
        assert!(matches!(&stitch[0], Block::Paragraph(p) if p.text.as_deref() == Some("{x || y}")));
    }

    #[test]
    fn block_comments_are_stripped_without_shifting_line_numbers() {
        let source = "/* a\nmulti\nline\ncomment */\nHello.";
        let stripped = strip_comments(source).unwrap();
        assert_eq!(stripped.lines().count(), 5);
        assert_eq!(stripped.lines().last().unwrap(), "Hello.");
    }

    #[test]
    fn unterminated_block_comment_is_an_error() {
        let err = parse_story("/* never closed").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedComment));
    }

    #[test]
    fn unterminated_inline_expression_is_an_error() {
        let err = parse_story("Hello {x").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnterminatedExpression { .. }));
    }
}
