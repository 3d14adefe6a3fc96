//! `$filter` expression tree: parser, type checker and evaluator.
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or_expr    := and_expr ( "or" and_expr )*
//! and_expr   := unary ( "and" unary )*
//! unary      := "not" unary | comparison
//! comparison := "(" or_expr ")"
//!             | function "(" operand "," operand ")"
//!             | operand ( cmp_op operand )?
//! operand    := field | literal
//! ```

use std::fmt;

use super::error::QueryError;
use super::field::{FieldDef, FieldKind, Queryable, lookup};
use super::lexer::{Token, TokenKind, tokenize};
use super::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "gt" => Self::Gt,
            "ge" => Self::Ge,
            "lt" => Self::Lt,
            "le" => Self::Le,
            _ => return None,
        })
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        })
    }
}

/// Boolean string functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Contains,
    StartsWith,
    EndsWith,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "contains" => Self::Contains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            _ => return None,
        })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
        })
    }
}

/// A leaf of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Field(String),
    Literal(Value),
}

/// A boolean filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Call {
        function: Function,
        args: Box<(Operand, Operand)>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Literal(bool),
}

impl Expr {
    /// Parse a `$filter` expression without checking field names.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Syntax`] for malformed input.
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens,
            cursor: 0,
            depth: 0,
            terms: 0,
        };
        if parser.peek().kind == TokenKind::Eof {
            return Err(QueryError::syntax(0, "empty filter expression"));
        }
        let expr = parser.or_expr()?;
        let trailing = parser.peek();
        if trailing.kind != TokenKind::Eof {
            return Err(QueryError::syntax(trailing.position, "unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Check field references and operand types against an entity's registry.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownField`] or [`QueryError::TypeMismatch`].
    pub fn check(&self, entity: &'static str, fields: &[FieldDef]) -> Result<(), QueryError> {
        match self {
            Self::Compare { left, op, right } => {
                let lhs = operand_type(left, entity, fields)?;
                let rhs = operand_type(right, entity, fields)?;
                check_comparison(lhs, *op, rhs)
            }
            Self::Call { function, args } => {
                for arg in [&args.0, &args.1] {
                    let ty = operand_type(arg, entity, fields)?;
                    if ty != Type::String {
                        return Err(QueryError::TypeMismatch(format!(
                            "{function} expects string arguments, found {ty}"
                        )));
                    }
                }
                Ok(())
            }
            Self::And(a, b) | Self::Or(a, b) => {
                a.check(entity, fields)?;
                b.check(entity, fields)
            }
            Self::Not(inner) => inner.check(entity, fields),
            Self::Literal(_) => Ok(()),
        }
    }

    /// Evaluate the expression against one entity.
    #[must_use]
    pub fn evaluate<T: Queryable>(&self, entity: &T) -> bool {
        match self {
            Self::Compare { left, op, right } => {
                let lhs = resolve(left, entity);
                let rhs = resolve(right, entity);
                match op {
                    CompareOp::Eq => lhs.equals(&rhs),
                    CompareOp::Ne => !lhs.equals(&rhs),
                    CompareOp::Gt => lhs.compare(&rhs).is_some_and(std::cmp::Ordering::is_gt),
                    CompareOp::Ge => lhs.compare(&rhs).is_some_and(std::cmp::Ordering::is_ge),
                    CompareOp::Lt => lhs.compare(&rhs).is_some_and(std::cmp::Ordering::is_lt),
                    CompareOp::Le => lhs.compare(&rhs).is_some_and(std::cmp::Ordering::is_le),
                }
            }
            Self::Call { function, args } => {
                let (Value::String(haystack), Value::String(needle)) =
                    (resolve(&args.0, entity), resolve(&args.1, entity))
                else {
                    return false;
                };
                match function {
                    Function::Contains => haystack.contains(&needle),
                    Function::StartsWith => haystack.starts_with(&needle),
                    Function::EndsWith => haystack.ends_with(&needle),
                }
            }
            Self::And(a, b) => a.evaluate(entity) && b.evaluate(entity),
            Self::Or(a, b) => a.evaluate(entity) || b.evaluate(entity),
            Self::Not(inner) => !inner.evaluate(entity),
            Self::Literal(value) => *value,
        }
    }
}

fn resolve<T: Queryable>(operand: &Operand, entity: &T) -> Value {
    match operand {
        Operand::Field(name) => entity.field_value(name).unwrap_or(Value::Null),
        Operand::Literal(value) => value.clone(),
    }
}

/// Static type of an operand, used by [`Expr::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Type {
    Null,
    Bool,
    Numeric,
    String,
    DateTime,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Numeric => "number",
            Self::String => "string",
            Self::DateTime => "date-time",
        })
    }
}

fn operand_type(
    operand: &Operand,
    entity: &'static str,
    fields: &[FieldDef],
) -> Result<Type, QueryError> {
    match operand {
        Operand::Field(name) => {
            let def = lookup(fields, name).ok_or_else(|| QueryError::UnknownField {
                entity,
                field: name.clone(),
            })?;
            Ok(match def.kind {
                FieldKind::Int | FieldKind::Float => Type::Numeric,
                FieldKind::String => Type::String,
                FieldKind::DateTime => Type::DateTime,
            })
        }
        Operand::Literal(value) => Ok(match value {
            Value::Null => Type::Null,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) | Value::Float(_) => Type::Numeric,
            Value::String(_) => Type::String,
            Value::DateTime(_) => Type::DateTime,
        }),
    }
}

fn check_comparison(lhs: Type, op: CompareOp, rhs: Type) -> Result<(), QueryError> {
    if lhs == Type::Null || rhs == Type::Null {
        if op.is_equality() {
            return Ok(());
        }
        return Err(QueryError::TypeMismatch(format!(
            "null can only be compared with eq or ne, found {op}"
        )));
    }
    if lhs != rhs {
        return Err(QueryError::TypeMismatch(format!(
            "cannot compare {lhs} with {rhs}"
        )));
    }
    if lhs == Type::Bool && !op.is_equality() {
        return Err(QueryError::TypeMismatch(format!(
            "booleans can only be compared with eq or ne, found {op}"
        )));
    }
    Ok(())
}

/// Deepest accepted nesting of `not` and parentheses.
const MAX_DEPTH: usize = 64;

/// Most `and`/`or` operators accepted in one expression.
const MAX_TERMS: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `tokenize` always ends with `Eof`, and the cursor never passes it.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        let index = (self.cursor + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(&self.peek().kind, TokenKind::Ident(word) if word == keyword) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), QueryError> {
        let token = self.advance();
        if &token.kind == kind {
            Ok(())
        } else {
            Err(QueryError::syntax(token.position, format!("expected {what}")))
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        if self.depth >= MAX_DEPTH {
            return Err(QueryError::syntax(
                self.peek().position,
                "expression nested too deeply",
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn count_term(&mut self) -> Result<(), QueryError> {
        self.terms += 1;
        if self.terms > MAX_TERMS {
            return Err(QueryError::syntax(
                self.peek().position,
                "expression has too many terms",
            ));
        }
        Ok(())
    }

    fn or_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            self.count_term()?;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.unary()?;
        while self.eat_keyword("and") {
            self.count_term()?;
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, QueryError> {
        if self.eat_keyword("not") {
            let inner = self.nested(Self::unary)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, QueryError> {
        if self.peek().kind == TokenKind::LParen {
            self.advance();
            let inner = self.nested(Self::or_expr)?;
            self.expect(&TokenKind::RParen, "')'")?;
            return Ok(inner);
        }

        if let TokenKind::Ident(name) = &self.peek().kind {
            if *self.peek_at(1) == TokenKind::LParen {
                let position = self.peek().position;
                let function = Function::from_name(name).ok_or_else(|| {
                    QueryError::syntax(position, format!("unknown function '{name}'"))
                })?;
                return self.call(function);
            }
        }

        let start = self.peek().position;
        let left = self.operand()?;
        let op_token = self.peek().clone();
        if let TokenKind::Ident(word) = &op_token.kind {
            if let Some(op) = CompareOp::from_keyword(word) {
                self.advance();
                let right = self.operand()?;
                return Ok(Expr::Compare { left, op, right });
            }
        }

        match left {
            Operand::Literal(Value::Bool(value)) => Ok(Expr::Literal(value)),
            _ => Err(QueryError::syntax(
                start,
                "expected a boolean expression or comparison",
            )),
        }
    }

    fn call(&mut self, function: Function) -> Result<Expr, QueryError> {
        self.advance();
        self.expect(&TokenKind::LParen, "'('")?;
        let first = self.operand()?;
        self.expect(&TokenKind::Comma, "','")?;
        let second = self.operand()?;
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(Expr::Call {
            function,
            args: Box::new((first, second)),
        })
    }

    fn operand(&mut self) -> Result<Operand, QueryError> {
        let token = self.advance();
        Ok(match token.kind {
            TokenKind::Ident(word) => match word.as_str() {
                "true" => Operand::Literal(Value::Bool(true)),
                "false" => Operand::Literal(Value::Bool(false)),
                "null" => Operand::Literal(Value::Null),
                "and" | "or" | "not" | "eq" | "ne" | "gt" | "ge" | "lt" | "le" => {
                    return Err(QueryError::syntax(
                        token.position,
                        format!("unexpected keyword '{word}'"),
                    ));
                }
                _ => Operand::Field(word),
            },
            TokenKind::Str(text) => Operand::Literal(Value::String(text)),
            TokenKind::Int(value) => Operand::Literal(Value::Int(value)),
            TokenKind::Float(value) => Operand::Literal(Value::Float(value)),
            TokenKind::DateTime(value) => Operand::Literal(Value::DateTime(value)),
            TokenKind::Eof => {
                return Err(QueryError::syntax(
                    token.position,
                    "unexpected end of expression",
                ));
            }
            TokenKind::LParen | TokenKind::RParen | TokenKind::Comma => {
                return Err(QueryError::syntax(token.position, "expected a field or literal"));
            }
        })
    }
}
