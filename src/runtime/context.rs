//! Binds host functions on top of [`State`]'s own [`EvalContext`]
//! implementation.
//!
//! Host closures registered through `bind_function` cannot be serialized, so
//! they are kept on the session rather than inside the (de)serializable
//! `State`. This thin wrapper borrows both for the duration of one
//! evaluation.

use std::collections::HashMap;

use crate::eval::{EvalContext, Value};
use crate::model::ListDecl;
use crate::runtime::state::State;

/// A host function bound through `Story::bind_function`.
pub type HostFn = Box<dyn FnMut(&[Value]) -> Result<Value, String>>;
pub type HostFunctions = HashMap<String, HostFn>;

/// An observer registered through `Story::observe`, notified with a
/// variable's new value whenever an assignment actually changes it.
pub type ObserverFn = Box<dyn FnMut(&Value)>;
pub type Observers = HashMap<String, ObserverFn>;

pub struct RuntimeContext<'a> {
    pub state: &'a mut State,
    pub functions: &'a mut HostFunctions,
    pub observers: &'a mut Observers,
}

impl<'a> EvalContext for RuntimeContext<'a> {
    fn get_temp(&self, name: &str) -> Option<Value> {
        self.state.get_temp(name)
    }

    fn get_variable(&self, name: &str) -> Option<Value> {
        self.state.get_variable(name)
    }

    fn get_constant(&self, name: &str) -> Option<Value> {
        self.state.get_constant(name)
    }

    fn list_decls(&self) -> &HashMap<String, ListDecl> {
        self.state.list_decls()
    }

    fn list_order(&self) -> &[String] {
        self.state.list_order()
    }

    fn visit_count(&self, path: &str) -> Option<u32> {
        self.state.visit_count(path)
    }

    fn call_function(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, String>> {
        self.functions.get_mut(name).map(|f| f(args))
    }

    fn random_index(&mut self, bound: u32) -> u32 {
        self.state.random_index(bound)
    }
}
