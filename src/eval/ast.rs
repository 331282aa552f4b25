//! The explicit expression AST.
//!
//! Built and evaluated directly; an expression's source text is translated
//! into this tree once by [`crate::eval::parse_expression`] and never
//! re-synthesized as a string for evaluation.

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::eval::Value;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// A head operand followed by zero or more `(operator, operand)` pairs of
/// the same precedence.
pub struct Expression {
    pub head: Operand,
    pub tail: Vec<(Operator, Operand)>,
}

impl Expression {
    pub fn single(operand: Operand) -> Self {
        Expression {
            head: operand,
            tail: Vec::new(),
        }
    }

    /// Collapse into a bare operand when there is no tail, otherwise nest.
    pub fn into_operand(self) -> Operand {
        if self.tail.is_empty() {
            self.head
        } else {
            Operand::Nested(Box::new(self))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
pub enum Operand {
    /// A parenthesised sub-expression, grouped ahead of its enclosing
    /// expression's precedence level.
    Nested(Box<Expression>),
    /// A value already known at parse time: a number, string, or boolean
    /// literal, or the `nil` keyword.
    Literal(Value),
    /// A bare name, resolved at evaluation time through the temp/variable/
    /// constant/list-value/visit-count lookup order.
    Identifier(String),
    /// `name(args)`: a builtin, user-bound, or list-item-by-ordinal call.
    Call(String, Vec<Expression>),
    /// `(a, b, c)`: a parenthesised item list, built into a List value.
    List(Vec<Expression>),
    /// `lhs ? rhs` / `lhs !? rhs`: list pattern containment.
    Pattern {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
        negate: bool,
    },
    /// `not expr`: logical negation of its operand's truthiness.
    Not(Box<Expression>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Intersect,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    And,
    Or,
    Has,
    HasNot,
}
