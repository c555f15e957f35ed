//! Core value substrate for the Brio scripting runtime: tagged values,
//! coercion and comparison rules, composite containers, and the error
//! taxonomy shared by every layer above.

pub mod array;
pub mod decimal;
pub mod error;
pub mod record;
pub mod table;
pub mod text;
pub mod value;

pub use array::ArrayValue;
pub use decimal::{Decimal, ParseDecimalError};
pub use error::RuntimeError;
pub use record::{ObjectAttributes, RecordValue, HIDDEN_PREFIX};
pub use table::{Column, TableValue};
pub use text::{denormalize, normalize, parse_literal, quote, LiteralError};
pub use value::{
    NativeHandle, NativeInstance, Value, ValueData, ValueKind, CMP_UNORDERED, COPY_DEPTH_LIMIT,
};
