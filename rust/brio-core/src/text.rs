//! Literal text syntax: canonical escapes and the literal parser.
//!
//! Scalars format through `Display` on `Value`; this module owns the
//! escape pair (`normalize`/`denormalize`) and the parser for the exposed
//! literal forms: scalars, `[ v1, v2 ]` arrays and `{ name: value }`
//! records.

use crate::array::ArrayValue;
use crate::record::RecordValue;
use crate::value::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid literal at byte {offset}: {message}")]
pub struct LiteralError {
    pub offset: usize,
    pub message: String,
}

/// Escapes a string for embedding in quoted literal text. Control
/// characters outside the named escapes become `\uXXXX`.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`normalize`]. Unknown escapes keep the escaped character.
pub fn denormalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The quoted, escaped form used inside container renderings.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", normalize(s))
}

/// Parses one literal: a scalar, an array `[ ... ]`, or a record
/// `{ name: value, ... }`.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser {
        input: text.as_bytes(),
        pos: 0,
    };
    parser.skip_ws();
    let value = parser.parse_value()?;
    parser.skip_ws();
    if parser.pos != parser.input.len() {
        return Err(parser.error("trailing input after literal"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: u8) -> Result<(), LiteralError> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected as char)))
        }
    }

    fn parse_value(&mut self) -> Result<Value, LiteralError> {
        match self.peek() {
            Some(b'[') => self.parse_array(),
            Some(b'{') => self.parse_record(),
            Some(b'"') => Ok(Value::from(self.parse_string()?)),
            Some(c) if c == b'-' || c == b'+' || c.is_ascii_digit() => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                let word = self.parse_identifier();
                match word.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::from(true)),
                    "false" => Ok(Value::from(false)),
                    "undefined" => Ok(Value::undefined()),
                    "nan" => Ok(Value::from(f64::NAN)),
                    "inf" | "infinity" => Ok(Value::from(f64::INFINITY)),
                    _ => Err(self.error(format!("unexpected word '{word}'"))),
                }
            }
            _ => Err(self.error("expected a literal")),
        }
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.eat(b'[')?;
        let mut arr = ArrayValue::new();
        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::from(arr));
        }
        loop {
            self.skip_ws();
            arr.push_as_is(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::from(arr));
                }
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn parse_record(&mut self) -> Result<Value, LiteralError> {
        self.eat(b'{')?;
        let mut rec = RecordValue::new();
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::from(rec));
        }
        loop {
            self.skip_ws();
            let name = match self.peek() {
                Some(b'"') => self.parse_string()?,
                Some(c) if c.is_ascii_alphabetic() || c == b'_' => self.parse_identifier(),
                _ => return Err(self.error("expected a field name")),
            };
            self.skip_ws();
            self.eat(b':')?;
            self.skip_ws();
            rec.set(&name, self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::from(rec));
                }
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        self.eat(b'"')?;
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some(b'"') => break,
                Some(b'\\') => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
        let raw = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("string is not valid UTF-8"))?;
        self.pos += 1;
        Ok(denormalize(raw))
    }

    fn parse_number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        let negative = self.peek() == Some(b'-');
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        // A signed word is a non-finite double spelling, nothing else.
        if matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            let word = self.parse_identifier();
            return match word.to_ascii_lowercase().as_str() {
                "inf" | "infinity" if negative => Ok(Value::from(f64::NEG_INFINITY)),
                "inf" | "infinity" => Ok(Value::from(f64::INFINITY)),
                "nan" => Ok(Value::from(f64::NAN)),
                _ => Err(self.error(format!("unexpected word '{word}'"))),
            };
        }
        let mut fractional = false;
        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => self.pos += 1,
                b'.' | b'e' | b'E' => {
                    fractional = true;
                    self.pos += 1;
                }
                b'-' | b'+' if fractional => self.pos += 1,
                _ => break,
            }
        }
        let raw = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("number is not valid UTF-8"))?;
        if !fractional {
            if let Ok(n) = raw.parse::<i64>() {
                return Ok(Value::from(n));
            }
        }
        raw.parse::<f64>()
            .map(Value::from)
            .map_err(|_| self.error(format!("bad number '{raw}'")))
    }
}
