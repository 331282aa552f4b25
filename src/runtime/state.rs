//! Mutable play-through state: everything a save/load round trip needs to
//! resume a session exactly where it left off.

use std::collections::{HashMap, VecDeque};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::eval::Value;
use crate::model::{ListDecl, StoryModel, Version};
use crate::runtime::line::{Line, PresentedChoice};
use crate::runtime::path::Path;
use crate::runtime::rng::StoryRng;
use crate::runtime::visits::VisitCounts;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// The 3-state read-mode machine, plus the transient `Quit` signal.
pub enum ReadMode {
    Text,
    Choices,
    Gathers,
    Quit,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Everything that can change while a story is being read.
pub struct State {
    pub temp: HashMap<String, Value>,
    pub variables: HashMap<String, Value>,
    pub constants: HashMap<String, Value>,
    pub list_decls: HashMap<String, ListDecl>,
    pub list_order: Vec<String>,
    pub visits: VisitCounts,
    pub current_path: Path,
    pub rng: StoryRng,
    pub version: Version,
    pub paragraphs: VecDeque<Line>,
    pub choices: Vec<PresentedChoice>,
    pub output: Vec<Line>,
    pub mode: ReadMode,
    pub is_over: bool,
    pub in_progress: bool,
    /// Monotonic counter mixed into the RNG seed key for each
    /// `random_index` draw, so repeated calls within the same visit do not
    /// all return the same value.
    pub random_calls: u64,
    /// Whether the most recently pushed line ended in a `<>` glue marker,
    /// so the next pushed line is merged into it instead of starting a new
    /// paragraph.
    pub glue_open: bool,
    /// First fallback choice (`choice == 0`) encountered since the choice
    /// set currently being built was opened; taken only if, at `quit` time,
    /// no other choice was registered.
    pub pending_fallback: Option<Path>,
    /// How many times each choice (keyed by its resume chain) has actually
    /// been entered, so a non-sticky choice can tell it has already been
    /// taken once.
    pub choice_entries: HashMap<String, u32>,
}

impl State {
    /// Seed a fresh `State` from a compiled `StoryModel`. `CONST`/`VAR`
    /// initializers are evaluated with a throwaway context that can only see
    /// already-seeded constants/variables, in declaration-map iteration
    /// order; stories that need a defined evaluation order between
    /// declarations should not rely on one declaration referencing another's
    /// expression.
    pub fn from_model(model: &StoryModel) -> Self {
        Self::from_model_with_seed(model, None)
    }

    /// Like [`State::from_model`], but seeds the RNG explicitly
    /// (`StoryOptions::seed`) instead of drawing one from the system
    /// entropy source, so shuffled alternatives are reproducible in tests.
    pub fn from_model_with_seed(model: &StoryModel, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StoryRng::with_seed(seed),
            None => StoryRng::default(),
        };

        let mut state = State {
            temp: HashMap::new(),
            variables: HashMap::new(),
            constants: HashMap::new(),
            list_decls: model.lists.clone(),
            list_order: model.list_order.clone(),
            visits: VisitCounts::new(),
            current_path: Path::root(),
            rng,
            version: model.version,
            paragraphs: VecDeque::new(),
            choices: Vec::new(),
            output: Vec::new(),
            mode: ReadMode::Text,
            is_over: false,
            in_progress: false,
            random_calls: 0,
            glue_open: false,
            pending_fallback: None,
            choice_entries: HashMap::new(),
        };

        for (name, decl) in &model.constants {
            if let Ok(expr) = crate::eval::parse_expression(&decl.expression) {
                if let Ok(value) = crate::eval::eval(&expr, &mut state) {
                    state.constants.insert(name.clone(), value);
                }
            }
        }

        for (name, decl) in &model.variables {
            if let Ok(expr) = crate::eval::parse_expression(&decl.expression) {
                if let Ok(value) = crate::eval::eval(&expr, &mut state) {
                    state.variables.insert(name.clone(), value);
                }
            }
        }

        state
    }

    pub fn can_continue(&self) -> bool {
        !self.paragraphs.is_empty()
    }

    pub fn can_choose(&self) -> bool {
        !self.can_continue() && !self.choices.is_empty()
    }
}

impl crate::eval::EvalContext for State {
    fn get_temp(&self, name: &str) -> Option<Value> {
        self.temp.get(name).cloned()
    }

    fn get_variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn get_constant(&self, name: &str) -> Option<Value> {
        self.constants.get(name).cloned()
    }

    fn list_decls(&self) -> &HashMap<String, ListDecl> {
        &self.list_decls
    }

    fn list_order(&self) -> &[String] {
        &self.list_order
    }

    fn visit_count(&self, path: &str) -> Option<u32> {
        Some(self.visits.count_for_path(path))
    }

    fn call_function(&mut self, _name: &str, _args: &[Value]) -> Option<Result<Value, String>> {
        None
    }

    fn random_index(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        let key = format!("__random__:{}", self.random_calls);
        self.random_calls += 1;
        let order = self.rng.shuffle_order(&key, bound as usize);
        order[0] as u32
    }
}
