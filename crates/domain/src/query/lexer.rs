//! Tokenizer for `$filter` expressions.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::time::{Timestamp, parse_timestamp};

use super::error::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    DateTime(Timestamp),
    LParen,
    RParen,
    Comma,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub position: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let mut lexer = Lexer {
        input,
        chars: input.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Token, QueryError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some(&(position, c)) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: self.input.len(),
            });
        };

        let kind = match c {
            '(' => {
                self.chars.next();
                TokenKind::LParen
            }
            ')' => {
                self.chars.next();
                TokenKind::RParen
            }
            ',' => {
                self.chars.next();
                TokenKind::Comma
            }
            '\'' => self.string(position)?,
            c if c.is_ascii_digit() || (c == '-' && self.next_is_digit(position)) => {
                self.number_or_date(position)?
            }
            c if c.is_alphabetic() || c == '_' => {
                let end = self.take_while(|c| c.is_alphanumeric() || c == '_');
                TokenKind::Ident(self.input[position..end].to_string())
            }
            other => {
                return Err(QueryError::syntax(
                    position,
                    format!("unexpected character '{other}'"),
                ));
            }
        };

        Ok(Token { kind, position })
    }

    fn next_is_digit(&self, position: usize) -> bool {
        self.input[position + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
    }

    /// Consume characters matching `pred`, returning the end byte offset.
    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while self.chars.next_if(|&(_, c)| pred(c)).is_some() {}
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i)
    }

    fn string(&mut self, start: usize) -> Result<TokenKind, QueryError> {
        self.chars.next();
        let mut text = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\'')) => {
                    // `''` is an escaped quote
                    if self.chars.next_if(|&(_, c)| c == '\'').is_some() {
                        text.push('\'');
                    } else {
                        return Ok(TokenKind::Str(text));
                    }
                }
                Some((_, c)) => text.push(c),
                None => return Err(QueryError::syntax(start, "unterminated string literal")),
            }
        }
    }

    fn number_or_date(&mut self, start: usize) -> Result<TokenKind, QueryError> {
        self.chars.next();
        let end = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '-' | '+'));
        let text = &self.input[start..end];

        if text.contains(['T', ':']) || is_date(text) {
            return parse_timestamp(text)
                .map(TokenKind::DateTime)
                .ok_or_else(|| QueryError::syntax(start, format!("invalid date-time '{text}'")));
        }
        if let Ok(value) = text.parse::<i64>() {
            return Ok(TokenKind::Int(value));
        }
        let numeric = text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'));
        match text.parse::<f64>() {
            Ok(value) if numeric && value.is_finite() => Ok(TokenKind::Float(value)),
            _ => Err(QueryError::syntax(start, format!("invalid number '{text}'"))),
        }
    }
}

fn is_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'
}
