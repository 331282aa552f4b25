//! Utilities for printing and locating errors.

use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Information about the origin of an item in the source text.
///
/// Attached to parsed items and errors so that a caller can point back to the
/// offending line without the crate having to carry the whole source string
/// around at runtime.
pub struct MetaData {
    /// Which line in the original story the item originated from.
    pub line_index: u32,
}

impl From<usize> for MetaData {
    fn from(line_index: usize) -> Self {
        MetaData {
            line_index: line_index as u32,
        }
    }
}

impl MetaData {
    /// Zero-indexed line number this item originated from.
    pub fn line(&self) -> u32 {
        self.line_index
    }
}

impl fmt::Display for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}", self.line_index + 1)
    }
}

pub fn write_line_content<W: fmt::Write>(buffer: &mut W, line: &str) -> fmt::Result {
    write!(buffer, " (line was: '{}')", line)
}
