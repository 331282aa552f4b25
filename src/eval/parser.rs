//! Translates expression source text into the [`Expression`] AST.
//!
//! A thin recursive-descent parser over one precedence level per grammar
//! rule: each level folds same-precedence operators into one `Expression`'s
//! tail and defers to [`Expression::into_operand`] to decide whether the
//! next level up sees it nested or flattened.

use crate::error::EvaluationError;
use crate::eval::ast::{Expression, Operand, Operator};
use crate::eval::Value;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Str(String),
    Symbol(&'static str),
    LParen,
    RParen,
    Comma,
}

fn tokenize(source: &str) -> Result<Vec<Token>, EvaluationError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '"' => {
                let mut s = String::new();
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    s.push(chars[i]);
                    i += 1;
                }
                if i >= chars.len() {
                    return Err(syntax_error(source, "unterminated string literal"));
                }
                i += 1;
                tokens.push(Token::Str(s));
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                tokens.push(Token::Number(chars[start..i].iter().collect()));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
                {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                let two: String = chars[i..(i + 2).min(chars.len())].iter().collect();
                let symbol = match two.as_str() {
                    "||" => Some("||"),
                    "&&" => Some("&&"),
                    "==" => Some("=="),
                    "!=" => Some("!="),
                    ">=" => Some(">="),
                    "<=" => Some("<="),
                    "!?" => Some("!?"),
                    _ => None,
                };

                if let Some(symbol) = symbol {
                    tokens.push(Token::Symbol(symbol));
                    i += 2;
                    continue;
                }

                let symbol = match c {
                    '+' => "+",
                    '-' => "-",
                    '*' => "*",
                    '/' => "/",
                    '%' => "%",
                    '^' => "^",
                    '>' => ">",
                    '<' => "<",
                    '?' => "?",
                    '=' => "=",
                    _ => return Err(syntax_error(source, &format!("unexpected character '{}'", c))),
                };

                tokens.push(Token::Symbol(symbol));
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn syntax_error(expression: &str, reason: &str) -> EvaluationError {
    EvaluationError {
        expression: expression.to_string(),
        reason: reason.to_string(),
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if let Some(Token::Symbol(s)) = self.peek() {
            if *s == symbol {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if let Some(Token::Ident(s)) = self.peek() {
            if s.eq_ignore_ascii_case(word) {
                self.pos += 1;
                return true;
            }
        }
        false
    }

    fn err(&self, reason: &str) -> EvaluationError {
        syntax_error(self.source, reason)
    }

    fn parse_pattern(&mut self) -> Result<Expression, EvaluationError> {
        let lhs = self.parse_or()?;

        if self.eat_symbol("?") {
            let rhs = self.parse_or()?;
            return Ok(Expression::single(Operand::Pattern {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                negate: false,
            }));
        }

        if self.eat_symbol("!?") {
            let rhs = self.parse_or()?;
            return Ok(Expression::single(Operand::Pattern {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                negate: true,
            }));
        }

        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_and()?;

        loop {
            if self.eat_symbol("||") || self.eat_ident("or") {
                let rhs = self.parse_and()?;
                expr.tail.push((Operator::Or, rhs.into_operand()));
            } else {
                break;
            }
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_and(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_equality()?;

        loop {
            if self.eat_symbol("&&") || self.eat_ident("and") {
                let rhs = self.parse_equality()?;
                expr.tail.push((Operator::And, rhs.into_operand()));
            } else {
                break;
            }
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_equality(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_relational()?;

        loop {
            let op = if self.eat_symbol("==") {
                Operator::Equal
            } else if self.eat_symbol("!=") {
                Operator::NotEqual
            } else {
                break;
            };

            let rhs = self.parse_relational()?;
            expr.tail.push((op, rhs.into_operand()));
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_relational(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_has()?;

        loop {
            let op = if self.eat_symbol(">=") {
                Operator::GreaterOrEqual
            } else if self.eat_symbol("<=") {
                Operator::LessOrEqual
            } else if self.eat_symbol(">") {
                Operator::Greater
            } else if self.eat_symbol("<") {
                Operator::Less
            } else {
                break;
            };

            let rhs = self.parse_has()?;
            expr.tail.push((op, rhs.into_operand()));
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_has(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_additive()?;

        loop {
            let op = if self.eat_ident("has") {
                Operator::Has
            } else if self.eat_ident("hasnt") {
                Operator::HasNot
            } else {
                break;
            };

            let rhs = self.parse_additive()?;
            expr.tail.push((op, rhs.into_operand()));
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_additive(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_multiplicative()?;

        loop {
            let op = if self.eat_symbol("+") {
                Operator::Add
            } else if self.eat_symbol("-") {
                Operator::Subtract
            } else {
                break;
            };

            let rhs = self.parse_multiplicative()?;
            expr.tail.push((op, rhs.into_operand()));
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, EvaluationError> {
        let mut expr = self.parse_unary()?;

        loop {
            let op = if self.eat_symbol("*") {
                Operator::Multiply
            } else if self.eat_symbol("/") {
                Operator::Divide
            } else if self.eat_symbol("%") {
                Operator::Modulo
            } else if self.eat_symbol("^") {
                Operator::Intersect
            } else {
                break;
            };

            let rhs = self.parse_unary()?;
            expr.tail.push((op, rhs.into_operand()));
        }

        Ok(Expression::single(expr.into_operand()))
    }

    fn parse_unary(&mut self) -> Result<Expression, EvaluationError> {
        if self.eat_symbol("-") {
            let operand = self.parse_unary()?.into_operand();
            return Ok(Expression::single(Operand::Nested(Box::new(Expression {
                head: Operand::Literal(Value::Int(0)),
                tail: vec![(Operator::Subtract, operand)],
            }))));
        }

        if self.eat_ident("not") {
            let inner = self.parse_unary()?;
            return Ok(Expression::single(Operand::Not(Box::new(inner))));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, EvaluationError> {
        match self.advance() {
            Some(Token::Number(text)) => {
                let value = if text.contains('.') {
                    Value::Float(text.parse().map_err(|_| self.err("invalid number literal"))?)
                } else {
                    Value::Int(text.parse().map_err(|_| self.err("invalid number literal"))?)
                };
                Ok(Expression::single(Operand::Literal(value)))
            }
            Some(Token::Str(text)) => Ok(Expression::single(Operand::Literal(Value::Str(text)))),
            Some(Token::Ident(name)) => {
                if name.eq_ignore_ascii_case("true") {
                    return Ok(Expression::single(Operand::Literal(Value::Bool(true))));
                }
                if name.eq_ignore_ascii_case("false") {
                    return Ok(Expression::single(Operand::Literal(Value::Bool(false))));
                }
                if name.eq_ignore_ascii_case("nil") {
                    return Ok(Expression::single(Operand::Literal(Value::Undefined)));
                }

                if matches!(self.peek(), Some(Token::LParen)) {
                    self.pos += 1;
                    let args = self.parse_argument_list()?;
                    return Ok(Expression::single(Operand::Call(name, args)));
                }

                Ok(Expression::single(Operand::Identifier(name)))
            }
            Some(Token::LParen) => {
                let items = self.parse_argument_list()?;
                if items.len() == 1 {
                    Ok(Expression::single(items.into_iter().next().unwrap().into_operand()))
                } else {
                    Ok(Expression::single(Operand::List(items)))
                }
            }
            other => Err(self.err(&format!("unexpected token {:?}", other))),
        }
    }

    /// Parses a comma-separated argument list up to and including the
    /// closing `)` (the opening `(` has already been consumed).
    fn parse_argument_list(&mut self) -> Result<Vec<Expression>, EvaluationError> {
        let mut items = Vec::new();

        if matches!(self.peek(), Some(Token::RParen)) {
            self.pos += 1;
            return Ok(items);
        }

        loop {
            items.push(self.parse_pattern()?);

            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
                continue;
            }

            break;
        }

        if self.advance() != Some(Token::RParen) {
            return Err(self.err("unmatched '(' in expression"));
        }

        Ok(items)
    }
}

/// Parse author-facing expression source into an [`Expression`] AST.
pub fn parse_expression(source: &str) -> Result<Expression, EvaluationError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };

    let expr = parser.parse_pattern()?;

    if parser.pos != parser.tokens.len() {
        return Err(parser.err("trailing tokens after expression"));
    }

    Ok(expr)
}
