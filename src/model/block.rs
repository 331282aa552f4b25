//! Tagged block variants making up the content of a stitch.
//!
//! Content could be discriminated by field presence on a single struct
//! (`item.choice`, `item.condition`, `item.alts`, `item.var`), but this
//! crate uses explicit tagged variants instead, which lets the interpreter's
//! `read_items` dispatch with an exhaustive `match` rather than a chain of
//! `is_some()` checks.

#[derive(Clone, Debug)]
/// One narrative unit in a stitch.
pub enum Block {
    Paragraph(Paragraph),
    Choice(ChoiceBlock),
    Condition(ConditionBlock),
    Alts(AltsBlock),
    Assign(AssignBlock),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// A line of narrative text, optionally labelled, diverting or tagged.
pub struct Paragraph {
    /// Literal text, possibly containing `{expr}` templates left for
    /// evaluation at emit time. `None` for a bare label/divert/tag line.
    pub text: Option<String>,
    /// `(name)` label attached to this line.
    pub label: Option<String>,
    /// `-> target` divert following this line's text.
    pub divert: Option<String>,
    /// `# tag` markers attached to this line.
    pub tags: Vec<String>,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, str::is_empty) && self.tags.is_empty()
    }
}

#[derive(Clone, Debug)]
/// A `*`/`+` choice line and the content read once it is selected.
pub struct ChoiceBlock {
    /// The menu caption shown before selection. `None` marks a fallback
    /// choice: it is never shown in the menu, only
    /// taken automatically when no other choice was registered.
    pub choice: Option<String>,
    /// Text narrated once the choice is selected (the `[..]`-split suffix,
    /// or the whole caption again if there was no split).
    pub text: Option<String>,
    /// Divert to follow once the choice's own `node` has been read.
    pub divert: Option<String>,
    /// `+` (sticky, always reappears) vs `*` (one-shot, appears once).
    pub sticky: bool,
    /// `{condition}` gating whether this choice is ever registered.
    pub condition: Option<String>,
    /// Blocks read once this choice has been selected.
    pub node: Vec<Block>,
}

#[derive(Clone, Debug)]
/// An `if`/`else` or `switch` conditional block.
pub struct ConditionBlock {
    pub kind: ConditionKind,
    /// Branch taken when no condition (or switch arm) evaluates true. Empty
    /// when the source had no `else`.
    pub failure: Vec<Block>,
}

#[derive(Clone, Debug)]
pub enum ConditionKind {
    /// A single string condition: `success` runs if it is true.
    IfElse {
        condition: String,
        success: Vec<Block>,
    },
    /// A sequence of string conditions: the first one that evaluates true
    /// has its matching arm run.
    Switch { arms: Vec<(String, Vec<Block>)> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Sequencing strategy for an [`AltsBlock`].
pub enum AltsMode {
    /// Advance once per visit, then hold on the last alternative.
    Stopping,
    /// Advance once per visit, wrapping back to the first alternative.
    Cycle,
    /// Advance once per visit, then produce nothing once exhausted.
    Once,
    /// Deterministically reshuffle the alternatives every full pass, then
    /// cycle through the shuffled order.
    Shuffle,
}

#[derive(Clone, Debug)]
/// One alternative in an [`AltsBlock`]: either plain text or a nested run of
/// blocks (so an alternative can itself contain a divert or a label).
pub enum AltItem {
    Text(String),
    Blocks(Vec<Block>),
}

#[derive(Clone, Debug)]
/// Varying text: `{a|b|c}` and its sequencing variants `{&..}`, `{!..}`,
/// `{~..}`.
pub struct AltsBlock {
    pub alts: Vec<AltItem>,
    pub mode: AltsMode,
    /// Label used to key this alternative's visit count and shuffle seed;
    /// synthesized by the parser from the enclosing address and the
    /// alternative's ordinal position when the author did not supply one.
    pub label: String,
}

#[derive(Clone, Debug)]
/// `~ [temp] name = expr` variable assignment.
pub struct AssignBlock {
    pub var: String,
    /// Source text of the right-hand side expression, desugared (`x++` etc)
    /// but otherwise unevaluated until runtime.
    pub value: String,
    pub temp: bool,
}
