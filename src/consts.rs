//! Lexical marker constants used by the parser and interpreter.

// Level control markers
pub const CHOICE_MARKER: char = '*';
pub const STICKY_CHOICE_MARKER: char = '+';
pub const GATHER_MARKER: char = '-';

// Text markers
pub const DIVERT_MARKER: &str = "->";
pub const GLUE_MARKER: &str = "<>";
pub const TAG_MARKER: char = '#';
pub const LABEL_MARKER_OPEN: char = '(';
pub const LABEL_MARKER_CLOSE: char = ')';

// Choice bracket split, e.g. `Hello, [world]there`
pub const CHOICE_BRACKET_OPEN: char = '[';
pub const CHOICE_BRACKET_CLOSE: char = ']';

// Declarations
pub const INCLUDE_KEYWORD: &str = "INCLUDE";
pub const CONST_KEYWORD: &str = "CONST";
pub const VAR_KEYWORD: &str = "VAR";
pub const LIST_KEYWORD: &str = "LIST";

// Assignment
pub const ASSIGN_MARKER: char = '~';
pub const TEMP_KEYWORD: &str = "temp";

// Comments
pub const LINE_COMMENT_MARKER: &str = "//";
pub const BLOCK_COMMENT_OPEN: &str = "/*";
pub const BLOCK_COMMENT_CLOSE: &str = "*/";
pub const TODO_COMMENT_MARKER: &str = "TODO:";

// Special diverts
pub const END_KNOT: &str = "END";
pub const DONE_KNOT: &str = "DONE";

// Root names
pub const ROOT_KNOT_NAME: &str = "_";
pub const ROOT_STITCH_NAME: &str = "_";

// Alternative sequence prefixes, e.g. `{&a|b|c}`
pub const CYCLE_SEQUENCE_MARKER: char = '&';
pub const ONCE_SEQUENCE_MARKER: char = '!';
pub const SHUFFLE_SEQUENCE_MARKER: char = '~';

// Alternative sequence keyword prefixes, e.g. `{stopping: a|b|c}`
pub const STOPPING_SEQUENCE_KEYWORD: &str = "stopping";
pub const CYCLE_SEQUENCE_KEYWORD: &str = "cycle";
pub const ONCE_SEQUENCE_KEYWORD: &str = "once";
pub const SHUFFLE_SEQUENCE_KEYWORD: &str = "shuffle";

// Condition switch default-arm keyword, e.g. `{x == 1: one | else: many}`
pub const ELSE_KEYWORD: &str = "else";

// Sequence/choice separator inside a brace block, e.g. `{a|b|c}`
pub const ALT_SEPARATOR: char = '|';

// Inline brace expressions
pub const EXPRESSION_OPEN: char = '{';
pub const EXPRESSION_CLOSE: char = '}';

// List algebra
pub const LIST_ITEM_ON_OPEN: char = '(';
pub const LIST_ITEM_ON_CLOSE: char = ')';
