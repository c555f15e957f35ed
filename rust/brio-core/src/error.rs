//! Error taxonomy for the value runtime.
//!
//! Every failing operation raises one of these kinds. Each kind carries its
//! substitution parameters and maps to a stable numeric code via
//! [`RuntimeError::code`]; the embedding host renders localized text from an
//! external message catalog keyed by that code.

use crate::value::ValueKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no conversion from {from} to {to}")]
    InvalidConversion { from: ValueKind, to: ValueKind },

    #[error("too few arguments: expected at least {min}, got {got}")]
    TooFewArguments { min: usize, got: usize },

    #[error("too many arguments: expected at most {max}, got {got}")]
    TooManyArguments { max: usize, got: usize },

    #[error("argument {position} has kind {got}, expected {expected}")]
    ArgumentTypeError {
        position: usize,
        got: ValueKind,
        expected: String,
    },

    #[error("no such column: {0}")]
    NoSuchColumn(String),

    #[error("no such member: {0}")]
    NoSuchMember(String),

    #[error("field name is ambiguous after normalization: {0}")]
    AmbiguousField(String),

    #[error("no such method: {0}")]
    NoSuchMethod(String),

    #[error("native call failed: {signature}")]
    NativeCallFailed {
        signature: String,
        #[source]
        cause: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("operand of kind {0} cannot cross the native bridge")]
    InvalidOperandForNativeCall(ValueKind),

    #[error("invalid operation on object value: {0}")]
    InvalidObjectOperation(String),
}

impl RuntimeError {
    /// Stable catalog code for this error kind.
    pub fn code(&self) -> u16 {
        match self {
            RuntimeError::InvalidConversion { .. } => 101,
            RuntimeError::TooFewArguments { .. } => 110,
            RuntimeError::TooManyArguments { .. } => 111,
            RuntimeError::ArgumentTypeError { .. } => 112,
            RuntimeError::NoSuchColumn(_) => 120,
            RuntimeError::NoSuchMember(_) => 121,
            RuntimeError::AmbiguousField(_) => 130,
            RuntimeError::NoSuchMethod(_) => 131,
            RuntimeError::NativeCallFailed { .. } => 132,
            RuntimeError::InvalidOperandForNativeCall(_) => 133,
            RuntimeError::InvalidObjectOperation(_) => 134,
        }
    }
}
