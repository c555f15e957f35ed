//! Argument lists and arity/type validation for built-in operations.

use brio_core::{RuntimeError, Value, ValueKind};
use std::fmt;

/// One allowed kind at an argument position. The meta-kinds widen the
/// check: `AnyNumber` admits the numeric ladder, `AnyArray` admits tables
/// as well as arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Exact(ValueKind),
    AnyNumber,
    AnyArray,
}

impl ArgKind {
    pub fn admits(self, kind: ValueKind) -> bool {
        match self {
            ArgKind::Exact(k) => k == kind,
            ArgKind::AnyNumber => matches!(
                kind,
                ValueKind::Integer | ValueKind::Double | ValueKind::Decimal
            ),
            ArgKind::AnyArray => matches!(kind, ValueKind::Array | ValueKind::Table),
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Exact(k) => write!(f, "{}", k),
            ArgKind::AnyNumber => write!(f, "a number"),
            ArgKind::AnyArray => write!(f, "an array"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArgumentList {
    values: Vec<Value>,
}

impl ArgumentList {
    pub fn new() -> Self {
        ArgumentList::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        ArgumentList { values }
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Zero-based access; error positions report one-based.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Checks arity against `[min, max]` and, when `kinds` is non-empty,
    /// each argument's kind against the allowed set for its position.
    /// Positions past the end of `kinds` reuse its last entry, which is how
    /// variadic tails are expressed.
    pub fn validate(
        &self,
        min: usize,
        max: usize,
        kinds: &[&[ArgKind]],
    ) -> Result<(), RuntimeError> {
        if self.values.len() < min {
            return Err(RuntimeError::TooFewArguments {
                min,
                got: self.values.len(),
            });
        }
        if self.values.len() > max {
            return Err(RuntimeError::TooManyArguments {
                max,
                got: self.values.len(),
            });
        }
        if kinds.is_empty() {
            return Ok(());
        }
        for (i, value) in self.values.iter().enumerate() {
            let allowed = kinds.get(i).copied().unwrap_or(kinds[kinds.len() - 1]);
            if !allowed.iter().any(|k| k.admits(value.kind())) {
                let expected = allowed
                    .iter()
                    .map(|k| k.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ");
                return Err(RuntimeError::ArgumentTypeError {
                    position: i + 1,
                    got: value.kind(),
                    expected,
                });
            }
        }
        Ok(())
    }
}
