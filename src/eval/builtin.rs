//! `LIST_*` host functions.

use crate::error::EvaluationError;
use crate::eval::{EvalContext, Value};
use crate::list::ListValue;

/// Dispatch a builtin by name. `None` means `name` is not a builtin at all,
/// so the caller should fall through to list-by-ordinal or a user function.
pub fn call(
    name: &str,
    args: &[Value],
    ctx: &mut dyn EvalContext,
) -> Option<Result<Value, EvaluationError>> {
    let result = match name {
        "LIST_COUNT" => one_list(args).map(|list| Value::Int(list.count() as i32)),
        "LIST_MIN" => one_list(args).map(|list| Value::List(list.min_item(ctx.list_decls()))),
        "LIST_MAX" => one_list(args).map(|list| Value::List(list.max_item(ctx.list_decls()))),
        "LIST_VALUE" => one_list(args).and_then(|list| {
            list.single_value(ctx.list_decls())
                .map(|ordinal| Value::Int(ordinal as i32))
                .ok_or_else(|| wrong_args(name, "a single-item list"))
        }),
        "LIST_ALL" => one_list(args).and_then(|list| all_of(list, ctx)),
        "LIST_INVERT" => one_list(args).and_then(|list| invert_of(list, ctx)),
        "LIST_RANDOM" => one_list(args).and_then(|list| random_of(list, ctx)),
        "LIST_RANGE" => range(args, ctx),
        _ => return None,
    };

    Some(result)
}

fn one_list(args: &[Value]) -> Result<&ListValue, EvaluationError> {
    match args {
        [Value::List(list)] => Ok(list),
        _ => Err(wrong_args("LIST function", "a single list argument")),
    }
}

fn owning_list_names(list: &ListValue, _ctx: &dyn EvalContext) -> Vec<String> {
    list.list_names().map(str::to_string).collect()
}

fn all_of(list: &ListValue, ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    let names = owning_list_names(list, ctx);
    let decls = ctx.list_decls();

    let mut result = ListValue::empty();
    for name in names {
        if let Some(decl) = decls.get(&name) {
            result = result.union(&ListValue::all(name, decl));
        }
    }

    Ok(Value::List(result))
}

fn invert_of(list: &ListValue, ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    let names = owning_list_names(list, ctx);
    let decls = ctx.list_decls();

    let mut result = ListValue::empty();
    for name in names {
        if let Some(decl) = decls.get(&name) {
            result = result.union(&list.invert(&name, decl));
        }
    }

    Ok(Value::List(result))
}

fn random_of(list: &ListValue, ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    let names = owning_list_names(list, ctx);
    let name = names
        .into_iter()
        .next()
        .ok_or_else(|| wrong_args("LIST_RANDOM", "a list belonging to a declared LIST"))?;

    let decl = ctx
        .list_decls()
        .get(&name)
        .cloned()
        .ok_or_else(|| wrong_args("LIST_RANDOM", "a declared LIST"))?;

    if decl.items.is_empty() {
        return Ok(Value::List(ListValue::empty()));
    }

    let index = ctx.random_index(decl.items.len() as u32) as usize;
    let item = decl.items[index].clone();

    Ok(Value::List(ListValue::single(name, item)))
}

fn range(args: &[Value], ctx: &mut dyn EvalContext) -> Result<Value, EvaluationError> {
    let (list, min, max) = match args {
        [Value::List(list), Value::Int(min), Value::Int(max)] => (list, *min as u32, *max as u32),
        _ => return Err(wrong_args("LIST_RANGE", "(list, min, max)")),
    };

    let names = owning_list_names(list, ctx);
    let decls = ctx.list_decls();

    let mut result = ListValue::empty();
    for name in names {
        if let Some(decl) = decls.get(&name) {
            result = result.union(&ListValue::range(&name, decl, min, max));
        }
    }

    Ok(Value::List(result))
}

fn wrong_args(function: &str, expected: &str) -> EvaluationError {
    EvaluationError {
        expression: String::new(),
        reason: format!("{} expects {}", function, expected),
    }
}
