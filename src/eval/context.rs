//! The data an expression needs from the running story in order to resolve
//! identifiers, function calls and visit counts.
//!
//! [`crate::runtime::State`] is the production implementation; tests use
//! small stand-ins so the evaluator can be exercised without a full story.

use std::collections::HashMap;

use crate::eval::Value;
use crate::model::ListDecl;

pub trait EvalContext {
    fn get_temp(&self, name: &str) -> Option<Value>;
    fn get_variable(&self, name: &str) -> Option<Value>;
    fn get_constant(&self, name: &str) -> Option<Value>;

    fn list_decls(&self) -> &HashMap<String, ListDecl>;
    fn list_order(&self) -> &[String];

    /// Number of times the knot/stitch/label addressed by this dotted path
    /// string has been visited, or `None` if it does not name a location.
    fn visit_count(&self, path: &str) -> Option<u32>;

    /// Dispatch a user-bound function (registered through
    /// [`crate::session::Session::bind_function`]). `None` if no function of
    /// this name was ever bound.
    fn call_function(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, String>>;

    /// Draw a deterministic pseudo-random index in `[0, bound)`, used by
    /// `LIST_RANDOM` and shuffled alternatives.
    fn random_index(&mut self, bound: u32) -> u32;
}
