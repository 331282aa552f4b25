//! Output units produced while reading a story.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::runtime::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A line of narrated text, ready to display.
pub struct Line {
    pub text: String,
    pub tags: Vec<String>,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tags.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A menu entry presented to the player, with enough information to resume
/// reading at the chosen branch.
pub struct PresentedChoice {
    pub text: String,
    pub tags: Vec<String>,
    /// Where reading resumes if this choice is selected.
    pub path: Path,
}
