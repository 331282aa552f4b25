//! The public façade: a thin layer over [`crate::runtime`] that owns a
//! compiled [`StoryModel`] together with its mutable [`State`], host
//! functions and observers, and exposes the handful of verbs a host harness
//! drives a story with: `start`/`resume` (aliased `cont`)/`choose`/
//! `choices`, with `continue` renamed because it is a reserved word.

use std::fmt;

use crate::error::{MigrationError, ParseError, StoryError};
use crate::eval::Value;
use crate::model::StoryModel;
use crate::parse::parse_story;
use crate::runtime::{choose as runtime_choose, start as runtime_start};
use crate::runtime::{HostFunctions, Line, Observers, State};
use crate::log::Logger;

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single menu entry, ready to display; the resume address backing it is
/// kept private to [`State`].
pub struct Choice {
    pub text: String,
    pub tags: Vec<String>,
}

#[derive(Default)]
/// Construction-time configuration for a [`Session`].
///
/// `migrator` is only consulted by [`Session::load`], when resuming from a
/// persisted [`State`] whose `version` predates the story's own.
pub struct StoryOptions {
    /// Explicit seed for the alternative-shuffle RNG (`SEED_RANDOM`).
    /// Leaving this `None` draws one from system entropy.
    pub seed: Option<u64>,
    /// Upgrades a persisted [`State`] from an older `tree` version to the
    /// one this story declares. Consulted only by [`Session::load`].
    pub migrator: Option<Box<dyn FnOnce(State) -> Result<State, MigrationError>>>,
}

impl StoryOptions {
    pub fn with_seed(seed: u64) -> Self {
        StoryOptions {
            seed: Some(seed),
            migrator: None,
        }
    }
}

/// A compiled story, its play-through state, and the host bindings attached
/// to it.
pub struct Session {
    model: StoryModel,
    state: State,
    functions: HostFunctions,
    observers: Observers,
    log: Logger,
}

impl Session {
    /// Compile `source` and seed a fresh session, using default options.
    pub fn from_string(source: &str) -> Result<Self, ParseError> {
        Self::with_options(source, StoryOptions::default())
    }

    /// Compile `source` and seed a fresh session with explicit options.
    pub fn with_options(source: &str, options: StoryOptions) -> Result<Self, ParseError> {
        let (model, log) = parse_story(source)?;
        let state = State::from_model_with_seed(&model, options.seed);

        Ok(Session {
            model,
            state,
            functions: HostFunctions::new(),
            observers: Observers::new(),
            log,
        })
    }

    /// Compile `source` and resume from a previously saved [`State`],
    /// running `options.migrator` first if the snapshot predates the
    /// story's own version.
    pub fn load(source: &str, mut state: State, options: StoryOptions) -> Result<Self, LoadError> {
        let (model, log) = parse_story(source)?;

        if state.version.tree > model.version.tree {
            return Err(LoadError::Story(StoryError::Migration(MigrationError {
                story_version: model.version.tree,
                state_version: state.version.tree,
            })));
        }

        if state.version.tree < model.version.tree {
            state = match options.migrator {
                Some(migrator) => migrator(state).map_err(StoryError::from)?,
                None => {
                    return Err(LoadError::Story(StoryError::Migration(MigrationError {
                        story_version: model.version.tree,
                        state_version: state.version.tree,
                    })))
                }
            };
        }

        Ok(Session {
            model,
            state,
            functions: HostFunctions::new(),
            observers: Observers::new(),
            log,
        })
    }

    /// Begin the session: read from the implicit root knot/stitch.
    pub fn start(&mut self) -> Result<(), StoryError> {
        runtime_start(&self.model, &mut self.state, &mut self.functions, &mut self.observers)
    }

    /// Whether pending paragraphs are waiting to be taken with
    /// [`Session::resume`].
    pub fn can_continue(&self) -> bool {
        self.state.can_continue()
    }

    /// Dequeue up to `n` pending paragraphs (or all of them if `n` is
    /// `None`), append them to the session's output log, and return them.
    /// Returns an empty vector, not an error, if [`Session::can_continue`]
    /// is false; errors only if the session has not been [`Session::start`]ed.
    pub fn resume(&mut self, n: Option<usize>) -> Result<Vec<Line>, StoryError> {
        if !self.state.in_progress {
            return Err(StoryError::ResumeBeforeStart);
        }

        if !self.state.can_continue() {
            return Ok(Vec::new());
        }

        let take = match n {
            Some(n) if n > 0 => n,
            _ => self.state.paragraphs.len(),
        };

        let mut taken = Vec::with_capacity(take.min(self.state.paragraphs.len()));
        for _ in 0..take {
            match self.state.paragraphs.pop_front() {
                Some(line) => {
                    self.state.output.push(line.clone());
                    taken.push(line);
                }
                None => break,
            }
        }

        Ok(taken)
    }

    /// Alias for [`Session::resume`], named after `continueMaximally`'s verb
    /// (`continue` is a Rust keyword).
    pub fn cont(&mut self, n: Option<usize>) -> Result<Vec<Line>, StoryError> {
        self.resume(n)
    }

    /// Whether a choice menu is ready: no pending paragraphs, and at least
    /// one choice was presented.
    pub fn can_choose(&self) -> bool {
        self.state.can_choose()
    }

    /// The currently presented menu, or `None` while
    /// [`Session::can_continue`] is still true.
    pub fn choices(&self) -> Option<Vec<Choice>> {
        if self.state.can_continue() {
            return None;
        }

        Some(
            self.state
                .choices
                .iter()
                .map(|choice| Choice {
                    text: choice.text.clone(),
                    tags: choice.tags.clone(),
                })
                .collect(),
        )
    }

    /// Select a presented choice (1-indexed) and continue reading from its
    /// branch.
    pub fn choose(&mut self, selection: usize) -> Result<(), StoryError> {
        runtime_choose(
            &self.model,
            &mut self.state,
            &mut self.functions,
            &mut self.observers,
            selection,
        )
    }

    /// Whether the story has reached `-> END` or `-> DONE`.
    pub fn is_over(&self) -> bool {
        self.state.is_over
    }

    /// Register a callback invoked whenever an assignment actually changes
    /// `name`'s value.
    pub fn observe<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&Value) + 'static,
    {
        self.observers.insert(name.into(), Box::new(callback));
    }

    /// Bind a host function callable from inline expressions as `name(...)`.
    pub fn bind_function<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: FnMut(&[Value]) -> Result<Value, String> + 'static,
    {
        self.functions.insert(name.into(), Box::new(func));
    }

    /// Current value of a declared variable or constant.
    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.state
            .variables
            .get(name)
            .or_else(|| self.state.constants.get(name))
            .cloned()
    }

    /// Overwrite a declared, non-constant variable's value directly (not
    /// through an in-story `~` assignment; observers are not notified).
    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), StoryError> {
        if self.state.constants.contains_key(name) {
            return Err(StoryError::AssignedToConst {
                name: name.to_string(),
            });
        }
        if !self.state.variables.contains_key(name) {
            return Err(StoryError::InvalidVariable {
                name: name.to_string(),
            });
        }

        self.state.variables.insert(name.to_string(), value);
        Ok(())
    }

    /// Number of times the location named by a dotted `knot[.stitch[.label]]`
    /// address has been entered so far.
    pub fn get_num_visited(&self, path: &str) -> u32 {
        self.state.visits.count_for_path(path)
    }

    /// Lines narrated so far, oldest first.
    pub fn output(&self) -> &[Line] {
        &self.state.output
    }

    /// `TODO:` comments and non-fatal warnings collected while parsing.
    pub fn log(&self) -> &Logger {
        &self.log
    }

    /// Snapshot the mutable play-through state for persistence.
    /// Pass the result back through [`Session::load`] to resume later.
    pub fn save_state(&self) -> State {
        self.state.clone()
    }
}

#[derive(Debug)]
/// Either half of what can go wrong in [`Session::load`]: the source no
/// longer compiles, or the saved state could not be brought forward to it.
pub enum LoadError {
    Parse(ParseError),
    Story(StoryError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadError::Parse(err) => write!(f, "{}", err),
            LoadError::Story(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

impl From<StoryError> for LoadError {
    fn from(err: StoryError) -> Self {
        LoadError::Story(err)
    }
}
