//! A runtime for the *Ink* family of interactive branching-narrative scripts.
//!
//! Ink is a creation of [Inkle](https://www.inklestudios.com/). For more
//! information about the language, [see their website](https://www.inklestudios.com/ink/).
//!
//! A [`Session`] compiles story source text into an immutable [`StoryModel`],
//! then drives it paragraph by paragraph and choice by choice, delegating
//! inline expressions to a small sandboxed evaluator backed by a typed-enum
//! list algebra ([`ListValue`]).

pub mod error;
mod eval;
mod list;
mod log;
mod model;
mod parse;
mod runtime;
mod session;

pub(crate) mod consts;

pub use eval::Value;
pub use list::ListValue;
pub use log::{LogMessage, Logger, MessageKind, Warning};
pub use model::StoryModel;
pub use parse::parse_story;
pub use runtime::{Line, State};
pub use session::{Choice, LoadError, Session, StoryOptions};
