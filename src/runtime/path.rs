//! Location of a block within a Story Model.

use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::consts::{ROOT_KNOT_NAME, ROOT_STITCH_NAME};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A fully resolved location: which knot, which stitch, optionally which
/// label, and the descent `chain` needed to resume inside nested choice or
/// condition blocks.
pub struct Path {
    pub knot: String,
    pub stitch: String,
    /// Label within the stitch, if the path points at one rather than the
    /// stitch's start.
    pub label: Option<String>,
    /// Indices describing a descent into nested block lists (a choice's
    /// `node`, a condition's branch) needed to resume reading at `label`'s
    /// exact position rather than the top of the stitch.
    pub chain: Vec<usize>,
}

impl Path {
    /// The implicit root location: `_._`.
    pub fn root() -> Self {
        Path {
            knot: ROOT_KNOT_NAME.to_string(),
            stitch: ROOT_STITCH_NAME.to_string(),
            label: None,
            chain: Vec::new(),
        }
    }

    pub fn new(knot: impl Into<String>, stitch: impl Into<String>) -> Self {
        Path {
            knot: knot.into(),
            stitch: stitch.into(),
            label: None,
            chain: Vec::new(),
        }
    }

    /// Key used to index visit counters and shuffle seeds: `knot.stitch`,
    /// extended with `.label` when present.
    pub fn visit_key(&self) -> String {
        match &self.label {
            Some(label) => format!("{}.{}.{}", self.knot, self.stitch, label),
            None => format!("{}.{}", self.knot, self.stitch),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.knot, self.stitch)?;
        if let Some(label) = &self.label {
            write!(f, ".{}", label)?;
        }
        Ok(())
    }
}
