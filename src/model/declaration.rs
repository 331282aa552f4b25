//! Top-level declarations: `CONST`/`VAR` bindings, `LIST` enumerations, and
//! the version record used to gate state migration.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// `{engine, tree}` version pair used to gate state migration.
///
/// `tree` is read from a `CONST tree = N` declaration; if the story never
/// declares one it defaults to `0`. `engine` is this crate's own state
/// format revision, bumped whenever the persisted snapshot shape changes.
pub struct Version {
    pub engine: u32,
    pub tree: u32,
}

impl Version {
    pub const CURRENT_ENGINE: u32 = 1;

    pub fn current(tree: u32) -> Self {
        Version {
            engine: Self::CURRENT_ENGINE,
            tree,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A `CONST` or `VAR` declaration: the declaring expression plus whether
/// reassignment is forbidden.
pub struct VariableDecl {
    /// Source text of the initializing expression, evaluated once at story
    /// construction to seed [`crate::runtime::State`].
    pub expression: String,
    pub is_const: bool,
}

impl VariableDecl {
    pub fn var(expression: impl Into<String>) -> Self {
        VariableDecl {
            expression: expression.into(),
            is_const: false,
        }
    }

    pub fn constant(expression: impl Into<String>) -> Self {
        VariableDecl {
            expression: expression.into(),
            is_const: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A `LIST` declaration: the items it enumerates, in declaration order, and
/// which of them start out active.
pub struct ListDecl {
    /// Item names in declaration order. An item's 1-based position here is
    /// its *raw ordinal*.
    pub items: Vec<String>,
    /// Items marked `(on)` in the declaration: initially active members of
    /// the corresponding list-as-set variable.
    pub initially_on: Vec<String>,
}

impl ListDecl {
    /// Raw ordinal (1-based) of `item` within this list's declaration, if it
    /// is a member of this list at all.
    pub fn ordinal(&self, item: &str) -> Option<u32> {
        self.items
            .iter()
            .position(|candidate| candidate == item)
            .map(|index| (index + 1) as u32)
    }

    /// The item declared at a given 1-based raw ordinal (`LIST_VALUE`,
    /// `name(N)` function-call form).
    pub fn item_at(&self, ordinal: u32) -> Option<&str> {
        if ordinal == 0 {
            return None;
        }

        self.items.get(ordinal as usize - 1).map(|s| s.as_str())
    }
}
