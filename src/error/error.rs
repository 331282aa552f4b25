//! Errors from running a story.

use std::{error::Error, fmt};

use crate::runtime::Path;

#[derive(Clone, Debug)]
/// Errors raised while driving a [`Session`][crate::session::Session].
///
/// Parse-time faults live in [`ParseError`][crate::error::ParseError]
/// instead; this enum only concerns faults that can occur once a story has
/// already been successfully compiled.
///
/// `Internal` wraps faults that indicate a bug in this crate rather than a
/// mistake in the story or a misuse of the API: corrupted resume chains,
/// addresses that slipped past validation, and the like. If you see one,
/// it is worth a bug report.
pub enum StoryError {
    /// Bug in the crate itself.
    Internal(InternalError),
    /// A divert, `move_to`, or address lookup could not be resolved.
    Address(AddressError),
    /// `choose` was called with a selection outside of `[1, num_choices]`.
    OutOfRange(OutOfRangeError),
    /// The expression sandbox failed to evaluate a rewritten expression.
    Evaluation(EvaluationError),
    /// Loaded state predates the registered migrator, or no migrator was
    /// registered for an out-of-date snapshot.
    Migration(MigrationError),
    /// Tried to assign to a name declared with `CONST`.
    AssignedToConst { name: String },
    /// Tried to `choose` before a choice was presented.
    MadeChoiceWithoutChoice,
    /// Tried to `resume`/`cont` a session that has not been `start`ed.
    ResumeBeforeStart,
    /// Tried to `start` a session that is already in progress.
    StartOnStoryInProgress,
    /// Reached a branching choice with nothing visible and no fallback.
    OutOfChoices { path: Path },
    /// Read mode asked for content but none was left before an end divert.
    OutOfContent,
    /// Referenced a name that is not declared anywhere in the story.
    InvalidVariable { name: String },
}

impl Error for StoryError {}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use StoryError::*;

        match self {
            Internal(err) => write!(f, "internal error: {}", err),
            Address(err) => write!(f, "{}", err),
            OutOfRange(err) => write!(f, "{}", err),
            Evaluation(err) => write!(f, "{}", err),
            Migration(err) => write!(f, "{}", err),
            AssignedToConst { name } => {
                write!(f, "cannot assign to '{}': it was declared with CONST", name)
            }
            MadeChoiceWithoutChoice => write!(
                f,
                "called `choose` but no choice is currently active: call `resume` and \
                 assert that a choice menu was returned before calling this again"
            ),
            ResumeBeforeStart => write!(f, "tried to resume a session that has not been started"),
            StartOnStoryInProgress => {
                write!(f, "called `start` on a session that is already in progress")
            }
            OutOfChoices { path } => write!(
                f,
                "reached a branching choice at {} with no choices to present and no \
                 fallback to take",
                path
            ),
            OutOfContent => write!(f, "story ran out of content before an end divert"),
            InvalidVariable { name } => {
                write!(f, "no variable or constant named '{}' exists", name)
            }
        }
    }
}

impl From<AddressError> for StoryError {
    fn from(err: AddressError) -> Self {
        StoryError::Address(err)
    }
}

impl From<OutOfRangeError> for StoryError {
    fn from(err: OutOfRangeError) -> Self {
        StoryError::OutOfRange(err)
    }
}

impl From<EvaluationError> for StoryError {
    fn from(err: EvaluationError) -> Self {
        StoryError::Evaluation(err)
    }
}

impl From<MigrationError> for StoryError {
    fn from(err: MigrationError) -> Self {
        StoryError::Migration(err)
    }
}

impl From<InternalError> for StoryError {
    fn from(err: InternalError) -> Self {
        StoryError::Internal(err)
    }
}

#[derive(Clone, Debug)]
/// A divert target could not be located as a knot, stitch, or label.
pub struct AddressError {
    pub raw_address: String,
    pub context: Option<Path>,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.context {
            Some(path) => write!(
                f,
                "could not resolve address '{}' from {} (not a knot, stitch, or label \
                 in scope)",
                self.raw_address, path
            ),
            None => write!(
                f,
                "could not resolve address '{}' (not a knot, stitch, or label)",
                self.raw_address
            ),
        }
    }
}

#[derive(Clone, Debug)]
/// `choose` was given a selection index outside of the presented menu.
pub struct OutOfRangeError {
    pub selection: usize,
    pub num_choices: usize,
}

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "invalid choice selection {}: {} choices were presented (valid range is [1, {}])",
            self.selection, self.num_choices, self.num_choices
        )
    }
}

#[derive(Clone, Debug)]
/// The sandbox could not evaluate a rewritten expression.
pub struct EvaluationError {
    pub expression: String,
    pub reason: String,
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "could not evaluate expression '{}': {}",
            self.expression, self.reason
        )
    }
}

#[derive(Clone, Debug)]
/// Loaded state predates the registered migrator.
pub struct MigrationError {
    pub story_version: u32,
    pub state_version: u32,
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "loaded state has version {} but the story is at version {} and no migrator \
             was registered to bridge the gap",
            self.state_version, self.story_version
        )
    }
}

#[derive(Clone, Debug)]
/// Faults caused by a bug in this crate rather than a story or caller
/// mistake.
pub enum InternalError {
    /// The saved resume chain does not describe a valid descent into the
    /// current block tree.
    CorruptChain { path: Path },
    /// Used an address that was never validated against the Story Model.
    UnvalidatedAddress { raw: String },
    /// Selected a choice index that does not exist in the internally
    /// tracked set of presented choices.
    IncorrectChoiceIndex { selection: usize, available: usize },
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InternalError::*;

        match self {
            CorruptChain { path } => write!(
                f,
                "resume chain at {} does not describe a valid descent into the block tree",
                path
            ),
            UnvalidatedAddress { raw } => {
                write!(f, "used unvalidated address '{}'", raw)
            }
            IncorrectChoiceIndex {
                selection,
                available,
            } => write!(
                f,
                "internally tracked choice index {} does not exist among {} available",
                selection, available
            ),
        }
    }
}
