//! The dynamically-typed value a rewritten expression evaluates to.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::list::ListValue;
use crate::model::ListDecl;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Result of evaluating an expression.
///
/// Addresses are resolved to their target during parsing rather than
/// carried as a runtime value, so there is no `Address`/`Divert` variant
/// here.
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
    List(ListValue),
    /// No value: an unset temporary, or the result of a function call with
    /// no return expression.
    Undefined,
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => !list.is_empty(),
            Value::Undefined => false,
        }
    }

    /// Render this value as it appears when embedded in narrative text:
    /// booleans as `0`/`1`, `undefined` as an empty string.
    pub fn render(&self, decls: &HashMap<String, ListDecl>, order: &[String]) -> String {
        match self {
            Value::Bool(b) => (*b as u8).to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::List(list) => list.render(decls, order),
            Value::Undefined => String::new(),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, EvaluationError> {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => Ok(Int(a + b)),
            (Int(a), Float(b)) => Ok(Float(*a as f32 + b)),
            (Float(a), Int(b)) => Ok(Float(a + *b as f32)),
            (Float(a), Float(b)) => Ok(Float(a + b)),
            (Str(a), Str(b)) => Ok(Str(format!("{}{}", a, b))),
            (List(a), List(b)) => Ok(List(a.union(b))),
            _ => Err(invalid_operation(self, other, "+")),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, EvaluationError> {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => Ok(Int(a - b)),
            (Int(a), Float(b)) => Ok(Float(*a as f32 - b)),
            (Float(a), Int(b)) => Ok(Float(a - *b as f32)),
            (Float(a), Float(b)) => Ok(Float(a - b)),
            (List(a), List(b)) => Ok(List(a.difference(b))),
            _ => Err(invalid_operation(self, other, "-")),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, EvaluationError> {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => Ok(Int(a * b)),
            (Int(a), Float(b)) => Ok(Float(*a as f32 * b)),
            (Float(a), Int(b)) => Ok(Float(a * *b as f32)),
            (Float(a), Float(b)) => Ok(Float(a * b)),
            _ => Err(invalid_operation(self, other, "*")),
        }
    }

    pub fn divide(&self, other: &Value) -> Result<Value, EvaluationError> {
        use Value::*;

        match (self, other) {
            (_, Int(0)) => Err(divided_by_zero(self, "/")),
            (_, Float(b)) if *b == 0.0 => Err(divided_by_zero(self, "/")),
            (Int(a), Int(b)) => Ok(Int(a / b)),
            (Int(a), Float(b)) => Ok(Float(*a as f32 / b)),
            (Float(a), Int(b)) => Ok(Float(a / *b as f32)),
            (Float(a), Float(b)) => Ok(Float(a / b)),
            _ => Err(invalid_operation(self, other, "/")),
        }
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, EvaluationError> {
        use Value::*;

        match (self, other) {
            (_, Int(0)) => Err(divided_by_zero(self, "%")),
            (_, Float(b)) if *b == 0.0 => Err(divided_by_zero(self, "%")),
            (Int(a), Int(b)) => Ok(Int(a % b)),
            (Int(a), Float(b)) => Ok(Float(*a as f32 % b)),
            (Float(a), Int(b)) => Ok(Float(a % *b as f32)),
            (Float(a), Float(b)) => Ok(Float(a % b)),
            _ => Err(invalid_operation(self, other, "%")),
        }
    }

    pub fn intersect(&self, other: &Value) -> Result<Value, EvaluationError> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Ok(Value::List(a.intersect(b))),
            _ => Err(invalid_operation(self, other, "^")),
        }
    }

    pub fn equal_to(&self, other: &Value, decls: &HashMap<String, ListDecl>) -> bool {
        use Value::*;

        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Int(a), Float(b)) => (*a as f32) == *b,
            (Float(a), Int(b)) => *a == (*b as f32),
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (List(a), List(b)) => a.value_equal(b),
            (Undefined, Undefined) => true,
            _ => {
                let _ = decls;
                false
            }
        }
    }

    pub fn greater_than(
        &self,
        other: &Value,
        decls: &HashMap<String, ListDecl>,
    ) -> Result<bool, EvaluationError> {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => Ok(a > b),
            (Int(a), Float(b)) => Ok((*a as f32) > *b),
            (Float(a), Int(b)) => Ok(*a > (*b as f32)),
            (Float(a), Float(b)) => Ok(a > b),
            (List(a), List(b)) => Ok(a.greater_than(b, decls)),
            _ => Err(invalid_operation(self, other, ">")),
        }
    }

    pub fn less_than(
        &self,
        other: &Value,
        decls: &HashMap<String, ListDecl>,
    ) -> Result<bool, EvaluationError> {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => Ok(a < b),
            (Int(a), Float(b)) => Ok((*a as f32) < *b),
            (Float(a), Int(b)) => Ok(*a < (*b as f32)),
            (Float(a), Float(b)) => Ok(a < b),
            (List(a), List(b)) => Ok(a.less_than(b, decls)),
            _ => Err(invalid_operation(self, other, "<")),
        }
    }

    pub fn greater_than_or_equal(
        &self,
        other: &Value,
        decls: &HashMap<String, ListDecl>,
    ) -> Result<bool, EvaluationError> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return Ok(a.greater_than_or_equal(b, decls));
        }

        Ok(self.equal_to(other, decls) || self.greater_than(other, decls)?)
    }

    pub fn less_than_or_equal(
        &self,
        other: &Value,
        decls: &HashMap<String, ListDecl>,
    ) -> Result<bool, EvaluationError> {
        if let (Value::List(a), Value::List(b)) = (self, other) {
            return Ok(a.less_than_or_equal(b, decls));
        }

        Ok(self.equal_to(other, decls) || self.less_than(other, decls)?)
    }

    /// `has`/`hasnt`: set containment for lists, substring containment for
    /// strings.
    pub fn has(&self, other: &Value) -> Result<bool, EvaluationError> {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Ok(a.contains(b)),
            (Value::Str(a), Value::Str(b)) => Ok(a.contains(b.as_str())),
            _ => Err(invalid_operation(self, other, "has")),
        }
    }

    /// `lhs ? rhs` / `lhs !? rhs`: identical to `has` for a List left-hand
    /// side, substring containment otherwise.
    pub fn matches(&self, other: &Value) -> Result<bool, EvaluationError> {
        self.has(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(list) => write!(f, "{}", list),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

fn invalid_operation(lhs: &Value, rhs: &Value, operator: &str) -> EvaluationError {
    EvaluationError {
        expression: String::new(),
        reason: format!(
            "cannot apply '{}' to {:?} and {:?}",
            operator, lhs, rhs
        ),
    }
}

fn divided_by_zero(lhs: &Value, operator: &str) -> EvaluationError {
    EvaluationError {
        expression: String::new(),
        reason: format!("division by zero applying '{}' to {:?}", operator, lhs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_and_floats_promote_on_mixed_arithmetic() {
        assert_eq!(Value::Int(1).add(&Value::Float(0.5)).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert!(Value::Int(1).divide(&Value::Int(0)).is_err());
    }

    #[test]
    fn strings_concatenate_with_add() {
        assert_eq!(
            Value::Str("a".into()).add(&Value::Str("b".into())).unwrap(),
            Value::Str("ab".into())
        );
    }

    #[test]
    fn undefined_is_falsy_and_renders_empty() {
        let decls = HashMap::new();
        assert!(!Value::Undefined.truthy());
        assert_eq!(Value::Undefined.render(&decls, &[]), "");
    }

    #[test]
    fn bool_renders_as_zero_or_one() {
        let decls = HashMap::new();
        assert_eq!(Value::Bool(true).render(&decls, &[]), "1");
        assert_eq!(Value::Bool(false).render(&decls, &[]), "0");
    }
}
