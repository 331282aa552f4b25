//! The immutable Story Model produced by the parser (see [`crate::parse`]).
//!
//! A [`StoryModel`] is a compiled, read-only representation of a story: a
//! set of named [`Knot`]s, each holding named stitches, each an ordered list
//! of [`Block`]s, plus the tables of `INCLUDE`, `CONST`, `VAR` and `LIST`
//! declarations gathered while parsing. Nothing in this module mutates once
//! parsing has finished; all mutable play-through state lives in
//! [`crate::runtime`].

mod block;
mod declaration;

pub use block::{
    AltItem, AltsBlock, AltsMode, AssignBlock, Block, ChoiceBlock, ConditionBlock, ConditionKind,
    Paragraph,
};
pub use declaration::{ListDecl, VariableDecl, Version};

use std::collections::HashMap;

use crate::consts::ROOT_STITCH_NAME;

/// Ordered content belonging to one knot or stitch.
pub type Stitch = Vec<Block>;

#[derive(Clone, Debug, Default)]
/// A named section of a story, holding one or more stitches.
pub struct Knot {
    /// Stitches belonging to this knot, keyed by name. The implicit stitch
    /// a knot starts with is stored under [`ROOT_STITCH_NAME`].
    pub stitches: HashMap<String, Stitch>,
    /// Name of the stitch entered when the knot itself is diverted to.
    pub default_stitch: String,
}

impl Knot {
    /// A knot with just the implicit root stitch, empty of content.
    pub fn new() -> Self {
        let mut stitches = HashMap::new();
        stitches.insert(ROOT_STITCH_NAME.to_string(), Vec::new());

        Knot {
            stitches,
            default_stitch: ROOT_STITCH_NAME.to_string(),
        }
    }

    pub fn stitch_mut(&mut self, name: &str) -> &mut Stitch {
        self.stitches
            .entry(name.to_string())
            .or_insert_with(Vec::new)
    }
}

#[derive(Clone, Debug, Default)]
/// The complete, immutable compiled form of a story, as produced by
/// [`crate::parse::parse_story`].
pub struct StoryModel {
    /// Knots, keyed by name. The implicit top-level knot is stored under
    /// [`crate::consts::ROOT_KNOT_NAME`].
    pub knots: HashMap<String, Knot>,
    /// `INCLUDE` file names, recorded but never opened by this crate: file
    /// resolution is a host concern.
    pub includes: Vec<String>,
    /// `CONST` declarations: write-once values.
    pub constants: HashMap<String, VariableDecl>,
    /// `VAR` declarations: the initial value of each persistent variable.
    pub variables: HashMap<String, VariableDecl>,
    /// `LIST` declarations.
    pub lists: HashMap<String, ListDecl>,
    /// Order in which `LIST` names were declared. `LIST_ALL`, raw ordinals
    /// and ambiguous single-name resolution all depend on declaration order,
    /// which a `HashMap` alone cannot preserve.
    pub list_order: Vec<String>,
    /// Engine/tree version, gates state migration on load.
    pub version: Version,
}

impl StoryModel {
    pub fn knot(&self, name: &str) -> Option<&Knot> {
        self.knots.get(name)
    }

    /// Search every declared list for an item of this name, resolving an
    /// ambiguous single-name reference. Returns the owning list's name.
    pub fn find_list_owning_item(&self, item: &str) -> Option<&str> {
        self.list_order
            .iter()
            .find(|name| {
                self.lists
                    .get(name.as_str())
                    .map_or(false, |decl| decl.items.iter().any(|i| i == item))
            })
            .map(|s| s.as_str())
    }
}
