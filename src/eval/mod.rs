//! The sandboxed expression language.
//!
//! Expressions are parsed once into the explicit AST in [`ast`] and then
//! walked directly by [`eval`]; no expression is ever re-synthesized as
//! source text and handed to a general-purpose interpreter.

mod ast;
mod builtin;
mod context;
mod parser;
mod value;

pub use ast::{Expression, Operand, Operator};
pub use context::EvalContext;
pub use parser::parse_expression;
pub use value::Value;

use std::collections::HashMap;

use crate::consts::{EXPRESSION_CLOSE, EXPRESSION_OPEN};
use crate::error::EvaluationError;
use crate::list::ListValue;
use crate::model::ListDecl;

/// Evaluate a parsed [`Expression`] against the running story.
pub fn eval(expr: &Expression, ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    let mut value = eval_operand(&expr.head, ctx)?;

    for (op, operand) in &expr.tail {
        let rhs = eval_operand(operand, ctx)?;
        value = apply(*op, &value, &rhs, ctx)?;
    }

    Ok(value)
}

fn eval_operand(operand: &Operand, ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    match operand {
        Operand::Nested(expr) => eval(expr, ctx),
        Operand::Literal(value) => Ok(value.clone()),
        Operand::Identifier(name) => Ok(resolve_identifier(name, ctx)),
        Operand::Call(name, args) => eval_call(name, args, ctx),
        Operand::List(items) => {
            let mut result = ListValue::empty();
            for item in items {
                match eval(item, ctx)? {
                    Value::List(list) => result = result.union(&list),
                    Value::Str(name) => {
                        if let Some(owner) = find_owning_list(&name, ctx) {
                            result = result.union(&ListValue::single(owner, name));
                        }
                    }
                    other => {
                        return Err(EvaluationError {
                            expression: String::new(),
                            reason: format!("cannot use {:?} as a list item", other),
                        })
                    }
                }
            }
            Ok(Value::List(result))
        }
        Operand::Pattern { lhs, rhs, negate } => {
            let lhs_value = eval(lhs, ctx)?;
            let rhs_value = eval(rhs, ctx)?;
            let matched = lhs_value.matches(&rhs_value)?;
            Ok(Value::Bool(matched != *negate))
        }
        Operand::Not(inner) => {
            let value = eval(inner, ctx)?;
            Ok(Value::Bool(!value.truthy()))
        }
    }
}

/// Lookup order: `temp → variables → constants →
/// list-value-with-that-name → visit-count-for-path-string`. An identifier
/// that resolves to nothing at all evaluates to `Undefined` rather than
/// raising an error, so that e.g. an unset temp read before its first
/// assignment renders as empty text instead of failing the paragraph.
fn resolve_identifier(name: &str, ctx: &mut dyn EvalContext) -> Value {
    if let Some(value) = ctx.get_temp(name) {
        return value;
    }
    if let Some(value) = ctx.get_variable(name) {
        return value;
    }
    if let Some(value) = ctx.get_constant(name) {
        return value;
    }
    if let Some(owner) = find_owning_list(name, ctx) {
        return Value::List(ListValue::single(owner, name));
    }
    if let Some(count) = ctx.visit_count(name) {
        return Value::Int(count as i32);
    }

    Value::Undefined
}

fn find_owning_list(name: &str, ctx: &dyn EvalContext) -> Option<String> {
    if ctx.list_decls().contains_key(name) {
        return None;
    }

    ctx.list_order()
        .iter()
        .find(|list| {
            ctx.list_decls()
                .get(list.as_str())
                .map_or(false, |decl| decl.items.iter().any(|item| item == name))
        })
        .cloned()
}

fn eval_call(
    name: &str,
    args: &[Expression],
    ctx: &mut dyn EvalContext,
) -> Result<Value, EvaluationError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval(arg, ctx)?);
    }

    if let Some(result) = builtin::call(name, &values, ctx) {
        return result;
    }

    if let Some(result) = ctx.call_function(name, &values) {
        return result.map_err(|reason| EvaluationError {
            expression: name.to_string(),
            reason,
        });
    }

    // `name(N)`: the Nth item (1-based raw ordinal) of a declared LIST.
    if let [Value::Int(ordinal)] = values.as_slice() {
        if let Some(decl) = ctx.list_decls().get(name) {
            return match decl.item_at(*ordinal as u32) {
                Some(item) => Ok(Value::List(ListValue::single(name, item))),
                None => Ok(Value::List(ListValue::empty())),
            };
        }
    }

    Err(EvaluationError {
        expression: name.to_string(),
        reason: format!("no function or list named '{}'", name),
    })
}

fn apply(
    op: Operator,
    lhs: &Value,
    rhs: &Value,
    ctx: &mut dyn EvalContext,
) -> Result<Value, EvaluationError> {
    let decls = ctx.list_decls().clone();

    match op {
        Operator::Add => lhs.add(rhs),
        Operator::Subtract => lhs.subtract(rhs),
        Operator::Multiply => lhs.multiply(rhs),
        Operator::Divide => lhs.divide(rhs),
        Operator::Modulo => lhs.modulo(rhs),
        Operator::Intersect => lhs.intersect(rhs),
        Operator::Equal => Ok(Value::Bool(lhs.equal_to(rhs, &decls))),
        Operator::NotEqual => Ok(Value::Bool(!lhs.equal_to(rhs, &decls))),
        Operator::Greater => lhs.greater_than(rhs, &decls).map(Value::Bool),
        Operator::Less => lhs.less_than(rhs, &decls).map(Value::Bool),
        Operator::GreaterOrEqual => lhs.greater_than_or_equal(rhs, &decls).map(Value::Bool),
        Operator::LessOrEqual => lhs.less_than_or_equal(rhs, &decls).map(Value::Bool),
        Operator::And => Ok(Value::Bool(lhs.truthy() && rhs.truthy())),
        Operator::Or => Ok(Value::Bool(lhs.truthy() || rhs.truthy())),
        Operator::Has => lhs.has(rhs).map(Value::Bool),
        Operator::HasNot => lhs.has(rhs).map(|has| Value::Bool(!has)),
    }
}

/// Expand every `{expr}` template in `text` against the current state.
/// `{{}}` stands for a literal `{`/`}` pair rather than a template.
pub fn expand_inline(text: &str, ctx: &mut dyn EvalContext) -> Result<String, EvaluationError> {
    let decls = ctx.list_decls().clone();
    let order = ctx.list_order().to_vec();
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == EXPRESSION_OPEN {
            if chars.get(i + 1) == Some(&EXPRESSION_CLOSE) {
                out.push(EXPRESSION_OPEN);
                out.push(EXPRESSION_CLOSE);
                i += 2;
                continue;
            }

            let start = i + 1;
            let mut depth = 1;
            let mut j = start;
            while j < chars.len() && depth > 0 {
                match chars[j] {
                    EXPRESSION_OPEN => depth += 1,
                    EXPRESSION_CLOSE => depth -= 1,
                    _ => (),
                }
                if depth > 0 {
                    j += 1;
                }
            }

            if depth != 0 {
                return Err(EvaluationError {
                    expression: chars[start..].iter().collect(),
                    reason: "unterminated inline expression".to_string(),
                });
            }

            let source: String = chars[start..j].iter().collect();
            let expr = parse_expression(&source)?;
            let value = eval(&expr, ctx)?;
            out.push_str(&value.render(&decls, &order));

            i = j + 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct StubContext {
        temp: HashMap<String, Value>,
        variables: HashMap<String, Value>,
        constants: HashMap<String, Value>,
        lists: HashMap<String, ListDecl>,
        order: Vec<String>,
        visits: HashMap<String, u32>,
        draws: RefCell<Vec<u32>>,
    }

    impl StubContext {
        fn new() -> Self {
            StubContext {
                temp: HashMap::new(),
                variables: HashMap::new(),
                constants: HashMap::new(),
                lists: HashMap::new(),
                order: Vec::new(),
                visits: HashMap::new(),
                draws: RefCell::new(Vec::new()),
            }
        }
    }

    impl EvalContext for StubContext {
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
            &self.lists
        }
        fn list_order(&self) -> &[String] {
            &self.order
        }
        fn visit_count(&self, path: &str) -> Option<u32> {
            self.visits.get(path).copied()
        }
        fn call_function(&mut self, name: &str, args: &[Value]) -> Option<Result<Value, String>> {
            if name == "double" {
                if let [Value::Int(n)] = args {
                    return Some(Ok(Value::Int(n * 2)));
                }
            }
            None
        }
        fn random_index(&mut self, bound: u32) -> u32 {
            self.draws.borrow_mut().push(bound);
            0
        }
    }

    fn eval_str(source: &str, ctx: &mut StubContext) -> Value {
        let expr = parse_expression(source).unwrap();
        eval(&expr, ctx).unwrap()
    }

    #[test]
    fn arithmetic_respects_precedence() {
        let mut ctx = StubContext::new();
        assert_eq!(eval_str("1 + 2 * 3", &mut ctx), Value::Int(7));
    }

    #[test]
    fn identifiers_resolve_temp_before_variables() {
        let mut ctx = StubContext::new();
        ctx.variables.insert("x".into(), Value::Int(1));
        ctx.temp.insert("x".into(), Value::Int(99));
        assert_eq!(eval_str("x", &mut ctx), Value::Int(99));
    }

    #[test]
    fn unset_identifier_is_undefined_not_an_error() {
        let mut ctx = StubContext::new();
        assert_eq!(eval_str("ghost", &mut ctx), Value::Undefined);
    }

    #[test]
    fn visit_count_is_last_resort_lookup() {
        let mut ctx = StubContext::new();
        ctx.visits.insert("hall.entry".into(), 3);
        assert_eq!(eval_str("hall.entry", &mut ctx), Value::Int(3));
    }

    #[test]
    fn user_function_is_dispatched() {
        let mut ctx = StubContext::new();
        assert_eq!(eval_str("double(21)", &mut ctx), Value::Int(42));
    }

    #[test]
    fn not_negates_truthiness() {
        let mut ctx = StubContext::new();
        assert_eq!(eval_str("not true", &mut ctx), Value::Bool(false));
        assert_eq!(eval_str("not false", &mut ctx), Value::Bool(true));
        assert_eq!(eval_str("not 0", &mut ctx), Value::Bool(true));
        assert_eq!(eval_str("not (1 == 2)", &mut ctx), Value::Bool(true));
    }

    #[test]
    fn parenthesised_items_become_a_list_value() {
        let mut ctx = StubContext::new();
        ctx.lists.insert(
            "colors".into(),
            ListDecl {
                items: vec!["red".into(), "green".into()],
                initially_on: vec![],
            },
        );
        ctx.order.push("colors".into());

        match eval_str("(red, green)", &mut ctx) {
            Value::List(list) => assert_eq!(list.count(), 2),
            other => panic!("expected a list value, got {:?}", other),
        }
    }

    #[test]
    fn inline_expansion_replaces_braces_with_rendered_value() {
        let mut ctx = StubContext::new();
        ctx.variables.insert("name".into(), Value::Str("Gesicht".into()));
        let text = expand_inline("Hello, {name}!", &mut ctx).unwrap();
        assert_eq!(text, "Hello, Gesicht!");
    }

    #[test]
    fn double_braces_escape_to_a_literal_brace() {
        let mut ctx = StubContext::new();
        let text = expand_inline("literal {{}} brace", &mut ctx).unwrap();
        assert_eq!(text, "literal {} brace");
    }

    #[test]
    fn unterminated_expression_is_an_error() {
        let mut ctx = StubContext::new();
        assert!(expand_inline("oops {1 + 2", &mut ctx).is_err());
    }

    #[test]
    fn pattern_match_is_substring_for_strings_and_subset_for_lists() {
        let mut ctx = StubContext::new();
        ctx.variables.insert("greeting".into(), Value::Str("hello world".into()));
        assert_eq!(eval_str("greeting ? \"world\"", &mut ctx), Value::Bool(true));
        assert_eq!(eval_str("greeting !? \"world\"", &mut ctx), Value::Bool(false));
    }
}
