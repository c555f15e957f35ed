//! Tagged value cells for the Brio runtime.
//!
//! A [`Value`] is one payload (the closed [`ValueData`] enum), an optional
//! binding-site name used only for diagnostics, and a read-only flag. Every
//! container mutator funnels through one guarded entry point so the
//! read-only check lives in a single place.

use crate::array::ArrayValue;
use crate::decimal::Decimal;
use crate::error::RuntimeError;
use crate::record::{ObjectAttributes, RecordValue};
use crate::table::TableValue;
use crate::text;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;
use strum::{Display, EnumString};

/// Result of [`Value::compare`] when the operands have no common ordering
/// (for example two records of unequal shape). Distinct from -1/0/1.
pub const CMP_UNORDERED: i32 = 2;

/// Recursion bound for [`Value::deep_copy`]. Exceeding it means the value
/// graph is cyclic or absurdly nested; the copy contract does not support
/// either, so the copy aborts instead of silently truncating.
pub const COPY_DEPTH_LIMIT: usize = 128;

/// The kind tag of a value.
///
/// `FormattedString` is a transient coercion target only: no stored value
/// ever carries it, and coercing to it yields a plain `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ValueKind {
    Undefined,
    #[strum(serialize = "Boolean", serialize = "Bool")]
    Boolean,
    #[strum(serialize = "Integer", serialize = "Int")]
    Integer,
    Double,
    Decimal,
    #[strum(serialize = "String", serialize = "Str")]
    String,
    FormattedString,
    Array,
    Record,
    Table,
    NativeObject,
}

impl ValueKind {
    /// Rank within the numeric coercion ladder, `None` for non-numeric kinds.
    pub(crate) fn numeric_rank(self) -> Option<u8> {
        match self {
            ValueKind::Boolean => Some(0),
            ValueKind::Integer => Some(1),
            ValueKind::Double => Some(2),
            ValueKind::Decimal => Some(3),
            _ => None,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            ValueKind::Array | ValueKind::Record | ValueKind::Table | ValueKind::NativeObject
        )
    }
}

/// A host instance presented to scripts as a pseudo-record.
///
/// Implemented by the native-object bridge; the core only needs the seam.
/// Handles are reference-shared: cloning a `Value` wrapping one of these
/// never duplicates the underlying host instance.
pub trait NativeInstance: fmt::Debug {
    fn class_name(&self) -> &str;
    /// Process-unique id allocated when the wrapper was constructed.
    fn instance_id(&self) -> u64;
    fn attributes(&self) -> ObjectAttributes;
    fn get_member(&self, name: &str) -> Result<Value, RuntimeError>;
    /// Returns `Ok(false)` when the field is unknown or not settable.
    fn set_member(&self, name: &str, value: Value) -> Result<bool, RuntimeError>;
    fn member_names(&self) -> Vec<String>;
    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError>;
}

pub type NativeHandle = Rc<dyn NativeInstance>;

#[derive(Debug, Clone)]
pub enum ValueData {
    Undefined,
    Bool(bool),
    Int(i64),
    Double(f64),
    Decimal(Decimal),
    Str(String),
    Array(ArrayValue),
    Record(RecordValue),
    Table(TableValue),
    Native(NativeHandle),
}

impl ValueData {
    pub fn kind(&self) -> ValueKind {
        match self {
            ValueData::Undefined => ValueKind::Undefined,
            ValueData::Bool(_) => ValueKind::Boolean,
            ValueData::Int(_) => ValueKind::Integer,
            ValueData::Double(_) => ValueKind::Double,
            ValueData::Decimal(_) => ValueKind::Decimal,
            ValueData::Str(_) => ValueKind::String,
            ValueData::Array(_) => ValueKind::Array,
            ValueData::Record(_) => ValueKind::Record,
            ValueData::Table(_) => ValueKind::Table,
            ValueData::Native(_) => ValueKind::NativeObject,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Value {
    data: ValueData,
    name: Option<String>,
    read_only: bool,
}

impl Value {
    pub fn new(data: ValueData) -> Self {
        Value {
            data,
            name: None,
            read_only: false,
        }
    }

    pub fn undefined() -> Self {
        Value::new(ValueData::Undefined)
    }

    pub fn native(handle: NativeHandle) -> Self {
        Value::new(ValueData::Native(handle))
    }

    /// The zero-equivalent of a kind, used by tabular projection for absent
    /// fields. Kinds without a meaningful zero fall back to `Undefined`.
    pub fn zero_of(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Undefined | ValueKind::NativeObject => Value::undefined(),
            ValueKind::Boolean => Value::from(false),
            ValueKind::Integer => Value::from(0i64),
            ValueKind::Double => Value::from(0.0f64),
            ValueKind::Decimal => Value::from(Decimal::zero()),
            ValueKind::String | ValueKind::FormattedString => Value::from(""),
            ValueKind::Array => Value::from(ArrayValue::new()),
            ValueKind::Record => Value::from(RecordValue::new()),
            ValueKind::Table => Value::from(TableValue::empty()),
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    pub fn data(&self) -> &ValueData {
        &self.data
    }

    pub fn into_data(self) -> ValueData {
        self.data
    }

    /// Binding-site label, diagnostics only.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// The single guarded-mutation entry point. Every mutator below goes
    /// through here; `None` means the value is read-only and the mutation
    /// must be a no-op.
    fn data_mut(&mut self) -> Option<&mut ValueData> {
        if self.read_only {
            None
        } else {
            Some(&mut self.data)
        }
    }

    // ---- best-effort read accessors (never mutate, never raise) ----

    /// Truthiness. Strings use the truthword rule; composites are true.
    pub fn get_bool(&self) -> bool {
        match &self.data {
            ValueData::Undefined => false,
            ValueData::Bool(b) => *b,
            ValueData::Int(n) => *n != 0,
            ValueData::Double(f) => *f != 0.0,
            ValueData::Decimal(d) => !d.is_zero(),
            ValueData::Str(s) => string_truth(s),
            _ => true,
        }
    }

    pub fn get_int(&self) -> i64 {
        match &self.data {
            ValueData::Bool(b) => *b as i64,
            ValueData::Int(n) => *n,
            ValueData::Double(f) if f.is_finite() => *f as i64,
            ValueData::Decimal(d) => d.to_i64().unwrap_or(0),
            ValueData::Str(s) => parse_int_lossy(s).unwrap_or(0),
            _ => 0,
        }
    }

    /// Unparsable strings read as NaN; composites read as 0.
    pub fn get_double(&self) -> f64 {
        match &self.data {
            ValueData::Bool(b) => *b as i64 as f64,
            ValueData::Int(n) => *n as f64,
            ValueData::Double(f) => *f,
            ValueData::Decimal(d) => d.to_f64(),
            ValueData::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
            _ => 0.0,
        }
    }

    pub fn get_decimal(&self) -> Decimal {
        match &self.data {
            ValueData::Bool(b) => Decimal::from_i64(*b as i64),
            ValueData::Int(n) => Decimal::from_i64(*n),
            ValueData::Double(f) => Decimal::from_f64(*f).unwrap_or_else(Decimal::zero),
            ValueData::Decimal(d) => d.clone(),
            ValueData::Str(s) => s.trim().parse().unwrap_or_else(|_| Decimal::zero()),
            _ => Decimal::zero(),
        }
    }

    /// Canonical print form; same text as `Display`.
    pub fn get_string(&self) -> String {
        self.to_string()
    }

    /// Scalars wrap as a one-element array; tables read as their rows.
    pub fn get_array(&self) -> ArrayValue {
        match &self.data {
            ValueData::Array(arr) => arr.clone(),
            ValueData::Table(t) => t.rows_as_records(),
            _ => {
                let mut arr = ArrayValue::new();
                arr.push_as_is(self.clone());
                arr
            }
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match &self.data {
            ValueData::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// `None` when the value is read-only or not an array.
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayValue> {
        match self.data_mut()? {
            ValueData::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match &self.data {
            ValueData::Record(rec) => Some(rec),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordValue> {
        match self.data_mut()? {
            ValueData::Record(rec) => Some(rec),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableValue> {
        match &self.data {
            ValueData::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableValue> {
        match self.data_mut()? {
            ValueData::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_native(&self) -> Option<&NativeHandle> {
        match &self.data {
            ValueData::Native(h) => Some(h),
            _ => None,
        }
    }

    // ---- coercion ----

    /// Converts the payload in place. Combinations with no rule fail with
    /// `InvalidConversion` and leave the value untouched.
    pub fn coerce(&mut self, target: ValueKind) -> Result<(), RuntimeError> {
        if self.kind() == target {
            return Ok(());
        }
        let fail = || RuntimeError::InvalidConversion {
            from: self.kind(),
            to: target,
        };
        let converted = match target {
            ValueKind::Undefined => return Err(fail()),
            ValueKind::Boolean => match &self.data {
                ValueData::Undefined => ValueData::Bool(false),
                ValueData::Int(n) => ValueData::Bool(*n != 0),
                ValueData::Double(f) => ValueData::Bool(*f != 0.0),
                ValueData::Decimal(d) => ValueData::Bool(!d.is_zero()),
                ValueData::Str(s) => ValueData::Bool(string_truth(s)),
                _ => return Err(fail()),
            },
            ValueKind::Integer => match &self.data {
                ValueData::Undefined => ValueData::Int(0),
                ValueData::Bool(b) => ValueData::Int(*b as i64),
                ValueData::Double(f) => ValueData::Int(double_to_int(*f).ok_or_else(fail)?),
                ValueData::Decimal(d) => ValueData::Int(d.to_i64().ok_or_else(fail)?),
                ValueData::Str(s) => ValueData::Int(parse_int_lossy(s).ok_or_else(fail)?),
                _ => return Err(fail()),
            },
            ValueKind::Double => match &self.data {
                ValueData::Undefined => ValueData::Double(0.0),
                ValueData::Bool(b) => ValueData::Double(*b as i64 as f64),
                ValueData::Int(n) => ValueData::Double(*n as f64),
                ValueData::Decimal(d) => ValueData::Double(d.to_f64()),
                // Unparsable text degrades to NaN rather than failing.
                ValueData::Str(s) => ValueData::Double(s.trim().parse().unwrap_or(f64::NAN)),
                _ => return Err(fail()),
            },
            ValueKind::Decimal => match &self.data {
                ValueData::Undefined => ValueData::Decimal(Decimal::zero()),
                ValueData::Bool(b) => ValueData::Decimal(Decimal::from_i64(*b as i64)),
                ValueData::Int(n) => ValueData::Decimal(Decimal::from_i64(*n)),
                ValueData::Double(f) => ValueData::Decimal(Decimal::from_f64(*f).ok_or_else(fail)?),
                ValueData::Str(s) => {
                    ValueData::Decimal(s.trim().parse().map_err(|_| fail())?)
                }
                _ => return Err(fail()),
            },
            // Every kind has a canonical print form.
            ValueKind::String | ValueKind::FormattedString => ValueData::Str(self.to_string()),
            ValueKind::Array => match &self.data {
                ValueData::Table(t) => ValueData::Array(t.rows_as_records()),
                ValueData::Record(_) | ValueData::Native(_) => return Err(fail()),
                _ => {
                    let mut arr = ArrayValue::new();
                    arr.push_as_is(Value::new(self.data.clone()));
                    ValueData::Array(arr)
                }
            },
            ValueKind::Record => match &self.data {
                // A wrapper materializes into an ordinary record.
                ValueData::Native(h) => {
                    let mut rec = RecordValue::new();
                    for member in h.member_names() {
                        rec.set(&member, h.get_member(&member)?);
                    }
                    rec.set_attrs(Some(h.attributes()));
                    ValueData::Record(rec)
                }
                _ => return Err(fail()),
            },
            ValueKind::Table | ValueKind::NativeObject => return Err(fail()),
        };
        self.data = converted;
        Ok(())
    }

    // ---- equality and ordering ----

    /// Strict equality: same tag and same value, recursive for composites,
    /// no coercion.
    pub fn matches(&self, other: &Value) -> bool {
        match (&self.data, &other.data) {
            (ValueData::Undefined, ValueData::Undefined) => true,
            (ValueData::Bool(a), ValueData::Bool(b)) => a == b,
            (ValueData::Int(a), ValueData::Int(b)) => a == b,
            (ValueData::Double(a), ValueData::Double(b)) => a == b,
            (ValueData::Decimal(a), ValueData::Decimal(b)) => a == b,
            (ValueData::Str(a), ValueData::Str(b)) => a == b,
            (ValueData::Array(a), ValueData::Array(b)) => a.matches(b),
            (ValueData::Record(a), ValueData::Record(b)) => a.matches(b),
            (ValueData::Table(a), ValueData::Table(b)) => a.matches(b),
            (ValueData::Native(a), ValueData::Native(b)) => {
                a.instance_id() == b.instance_id()
            }
            _ => false,
        }
    }

    /// Orders two values under their best common kind: the numeric ladder
    /// when both sides are numeric, string form when both are scalar, and
    /// structural comparison for same-kind composites. Incomparable pairs
    /// yield [`CMP_UNORDERED`].
    pub fn compare(&self, other: &Value) -> i32 {
        let (ka, kb) = (self.kind(), other.kind());
        if let (Some(ra), Some(rb)) = (ka.numeric_rank(), kb.numeric_rank()) {
            return match ra.max(rb) {
                0 | 1 => ord_to_i32(self.get_int().cmp(&other.get_int())),
                2 => match self.get_double().partial_cmp(&other.get_double()) {
                    Some(ord) => ord_to_i32(ord),
                    None => CMP_UNORDERED,
                },
                _ => ord_to_i32(self.get_decimal().cmp(&other.get_decimal())),
            };
        }
        if !ka.is_composite() && !kb.is_composite() {
            return ord_to_i32(self.get_string().cmp(&other.get_string()));
        }
        match (&self.data, &other.data) {
            (ValueData::Array(a), ValueData::Array(b)) => a.compare(b),
            (ValueData::Record(a), ValueData::Record(b)) => a.compare(b),
            (ValueData::Table(a), ValueData::Table(b)) => a.compare(b),
            (ValueData::Native(a), ValueData::Native(b)) => {
                if a.instance_id() == b.instance_id() {
                    0
                } else {
                    CMP_UNORDERED
                }
            }
            _ => CMP_UNORDERED,
        }
    }

    // ---- copying ----

    /// Recursive copy. Arrays and records copy element by element; table
    /// column metadata and wrapped native instances stay shared, as
    /// documented. The copy is writable regardless of the source flag.
    ///
    /// # Panics
    ///
    /// Panics when recursion exceeds [`COPY_DEPTH_LIMIT`]; that indicates a
    /// value graph the copy contract does not support.
    pub fn deep_copy(&self) -> Value {
        self.copy_at_depth(0)
    }

    pub(crate) fn copy_at_depth(&self, depth: usize) -> Value {
        if depth > COPY_DEPTH_LIMIT {
            panic!("value copy exceeded recursion depth {COPY_DEPTH_LIMIT}");
        }
        let data = match &self.data {
            ValueData::Array(arr) => ValueData::Array(arr.copy_at_depth(depth + 1)),
            ValueData::Record(rec) => ValueData::Record(rec.copy_at_depth(depth + 1)),
            ValueData::Table(t) => ValueData::Table(t.copy_at_depth(depth + 1)),
            other => other.clone(),
        };
        Value {
            data,
            name: self.name.clone(),
            read_only: false,
        }
    }

    // ---- container mutators (all guarded) ----

    /// Appends to an array (flattening one level) or a record-typed row to a
    /// table. Returns `Ok(false)` when the value is read-only.
    pub fn push_element(&mut self, value: Value) -> Result<bool, RuntimeError> {
        let kind = self.kind();
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match data {
            ValueData::Array(arr) => {
                arr.push(value);
                Ok(true)
            }
            ValueData::Table(t) => match value.into_data() {
                ValueData::Record(rec) => {
                    t.push_record(&rec)?;
                    Ok(true)
                }
                other => Err(RuntimeError::InvalidObjectOperation(format!(
                    "cannot append a {} row to a table",
                    other.kind()
                ))),
            },
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "cannot append to a {kind} value"
            ))),
        }
    }

    /// Appends without flattening array arguments.
    pub fn push_element_as_is(&mut self, value: Value) -> Result<bool, RuntimeError> {
        let kind = self.kind();
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match data {
            ValueData::Array(arr) => {
                arr.push_as_is(value);
                Ok(true)
            }
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "cannot append to a {kind} value"
            ))),
        }
    }

    /// Writes the 1-based array slot, zero-padding any gap.
    pub fn set_element(&mut self, index: usize, value: Value) -> Result<bool, RuntimeError> {
        let kind = self.kind();
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match data {
            ValueData::Array(arr) => Ok(arr.set(index, value)),
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "cannot index into a {kind} value"
            ))),
        }
    }

    /// Reads a named member of a record or native wrapper.
    pub fn member(&self, name: &str) -> Result<Value, RuntimeError> {
        match &self.data {
            ValueData::Record(rec) => rec
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::NoSuchMember(RecordValue::normalize_key(name))),
            ValueData::Native(h) => h.get_member(name),
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "{} values have no members",
                self.kind()
            ))),
        }
    }

    pub fn set_member(&mut self, name: &str, value: Value) -> Result<bool, RuntimeError> {
        let kind = self.kind();
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match data {
            ValueData::Record(rec) => {
                rec.set(name, value);
                Ok(true)
            }
            ValueData::Native(h) => h.set_member(name, value),
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "{kind} values have no members"
            ))),
        }
    }

    /// Removes a record field. Removing from a native wrapper is refused:
    /// its shape is fixed by the host type.
    pub fn remove_member(&mut self, name: &str) -> Result<bool, RuntimeError> {
        let kind = self.kind();
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match data {
            ValueData::Record(rec) => Ok(rec.remove(name).is_some()),
            ValueData::Native(_) => Err(RuntimeError::InvalidObjectOperation(
                "cannot remove a field from a native object wrapper".into(),
            )),
            _ => Err(RuntimeError::InvalidObjectOperation(format!(
                "{kind} values have no members"
            ))),
        }
    }

    /// Merges another record's fields into this record. Either side being a
    /// native wrapper refuses the operation.
    pub fn merge_members(&mut self, other: &Value) -> Result<bool, RuntimeError> {
        if matches!(self.data, ValueData::Native(_)) || matches!(other.data, ValueData::Native(_))
        {
            return Err(RuntimeError::InvalidObjectOperation(
                "cannot add records when one side is a native object wrapper".into(),
            ));
        }
        let Some(data) = self.data_mut() else {
            return Ok(false);
        };
        match (data, &other.data) {
            (ValueData::Record(dst), ValueData::Record(src)) => {
                for name in src.member_names(true) {
                    if let Some(v) = src.get(&name) {
                        dst.set(&name, v.clone());
                    }
                }
                Ok(true)
            }
            (dst, _) => Err(RuntimeError::InvalidObjectOperation(format!(
                "cannot add {} and {}",
                dst.kind(),
                other.kind()
            ))),
        }
    }

    /// Element count: array length, record size, table row count; scalars
    /// count as one, `Undefined` as zero.
    pub fn element_count(&self) -> usize {
        match &self.data {
            ValueData::Undefined => 0,
            ValueData::Array(arr) => arr.len(),
            ValueData::Record(rec) => rec.size(),
            ValueData::Table(t) => t.row_count(),
            _ => 1,
        }
    }

    /// Print form used inside container renderings: strings are quoted and
    /// escaped, `Undefined` spells itself out, so container text round-trips
    /// through the literal parser.
    pub(crate) fn display_quoted(&self) -> String {
        match &self.data {
            ValueData::Undefined => "undefined".to_string(),
            ValueData::Str(s) => text::quote(s),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ValueData::Undefined => Ok(()),
            ValueData::Bool(b) => write!(f, "{}", b),
            // `{}` on f64 already renders whole values without ".0".
            ValueData::Int(n) => write!(f, "{}", n),
            ValueData::Double(x) => write!(f, "{}", x),
            ValueData::Decimal(d) => write!(f, "{}", d),
            ValueData::Str(s) => write!(f, "{}", s),
            ValueData::Array(arr) => write!(f, "{}", arr),
            ValueData::Record(rec) => write!(f, "{}", rec),
            ValueData::Table(t) => write!(f, "{}", t),
            ValueData::Native(h) => write!(f, "<native:{}#{}>", h.class_name(), h.instance_id()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::new(ValueData::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::new(ValueData::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::new(ValueData::Int(n as i64))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::new(ValueData::Double(f))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::new(ValueData::Decimal(d))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new(ValueData::Str(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::new(ValueData::Str(s))
    }
}

impl From<ArrayValue> for Value {
    fn from(arr: ArrayValue) -> Self {
        Value::new(ValueData::Array(arr))
    }
}

impl From<RecordValue> for Value {
    fn from(rec: RecordValue) -> Self {
        Value::new(ValueData::Record(rec))
    }
}

impl From<TableValue> for Value {
    fn from(t: TableValue) -> Self {
        Value::new(ValueData::Table(t))
    }
}

fn string_truth(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "t" | "y"
    )
}

fn double_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_int_lossy(s: &str) -> Option<i64> {
    let text = s.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    text.parse::<f64>().ok().and_then(double_to_int)
}

fn ord_to_i32(ord: Ordering) -> i32 {
    match ord {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::undefined().kind(), ValueKind::Undefined);
        assert_eq!(Value::from(true).kind(), ValueKind::Boolean);
        assert_eq!(Value::from(1i64).kind(), ValueKind::Integer);
        assert_eq!(Value::from(1.5).kind(), ValueKind::Double);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
    }

    #[test]
    fn test_string_truthwords() {
        for word in ["true", "YES", "t", "Y", " yes "] {
            assert!(Value::from(word).get_bool(), "{word}");
        }
        for word in ["false", "no", "1", "truthy", ""] {
            assert!(!Value::from(word).get_bool(), "{word}");
        }
    }

    #[test]
    fn test_coerce_string_to_int() {
        let mut v = Value::from("42");
        v.coerce(ValueKind::Integer).unwrap();
        assert!(v.matches(&Value::from(42i64)));

        let mut v = Value::from("2.9");
        v.coerce(ValueKind::Integer).unwrap();
        assert!(v.matches(&Value::from(2i64)));

        let mut v = Value::from("forty-two");
        assert!(v.coerce(ValueKind::Integer).is_err());
    }

    #[test]
    fn test_coerce_unparsable_string_to_double_is_nan() {
        let mut v = Value::from("pears");
        v.coerce(ValueKind::Double).unwrap();
        assert!(v.get_double().is_nan());
    }

    #[test]
    fn test_coerce_scalar_to_array_wraps() {
        let mut v = Value::from(7i64);
        v.coerce(ValueKind::Array).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert!(arr.get(1).unwrap().matches(&Value::from(7i64)));
    }

    #[test]
    fn test_coerce_record_to_boolean_fails() {
        let mut v = Value::from(RecordValue::new());
        let err = v.coerce(ValueKind::Boolean).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidConversion { .. }));
        assert_eq!(v.kind(), ValueKind::Record);
    }

    #[test]
    fn test_coerce_idempotent() {
        for (value, kind) in [
            (Value::from("3.5"), ValueKind::Double),
            (Value::from(3i64), ValueKind::Decimal),
            (Value::from(0i64), ValueKind::Boolean),
            (Value::from(2.0), ValueKind::String),
            (Value::from(9i64), ValueKind::Array),
            (Value::from("x"), ValueKind::FormattedString),
        ] {
            let mut once = value;
            once.coerce(kind).unwrap();
            let mut twice = once.clone();
            twice.coerce(kind).unwrap();
            assert!(once.matches(&twice), "{kind} not idempotent");
        }
    }

    #[test]
    fn test_formatted_string_degrades_to_string() {
        let mut v = Value::from(2.0);
        v.coerce(ValueKind::FormattedString).unwrap();
        assert_eq!(v.kind(), ValueKind::String);
        assert_eq!(v.get_string(), "2");
    }

    #[test]
    fn test_double_display_drops_trailing_zero() {
        assert_eq!(Value::from(3.0).to_string(), "3");
        assert_eq!(Value::from(3.25).to_string(), "3.25");
    }

    #[test]
    fn test_matches_is_strict() {
        assert!(Value::from(1i64).matches(&Value::from(1i64)));
        // No coercion: same number under different tags does not match.
        assert!(!Value::from(1i64).matches(&Value::from(1.0)));
        assert!(!Value::from("1").matches(&Value::from(1i64)));
    }

    #[test]
    fn test_compare_numeric_ladder() {
        assert_eq!(Value::from(2i64).compare(&Value::from(10i64)), -1);
        // Int vs Double compares under Double.
        assert_eq!(Value::from(2i64).compare(&Value::from(2.0)), 0);
        assert_eq!(Value::from(true).compare(&Value::from(0i64)), 1);
        let d: Decimal = "2.50".parse().unwrap();
        assert_eq!(Value::from(2.5).compare(&Value::from(d)), 0);
    }

    #[test]
    fn test_compare_string_fallback() {
        assert_eq!(Value::from("apple").compare(&Value::from("pear")), -1);
        // Number vs string compares under String.
        assert_eq!(Value::from(20i64).compare(&Value::from("20")), 0);
    }

    #[test]
    fn test_compare_unordered_sentinel() {
        let rec = Value::from(RecordValue::new());
        let arr = Value::from(ArrayValue::new());
        assert_eq!(rec.compare(&arr), CMP_UNORDERED);
        assert_eq!(Value::from(f64::NAN).compare(&Value::from(1.0)), CMP_UNORDERED);
    }

    #[test]
    fn test_read_only_blocks_mutators() {
        let mut arr = ArrayValue::new();
        arr.push_as_is(Value::from(1i64));
        let mut v = Value::from(arr);
        v.set_read_only(true);
        assert_eq!(v.push_element(Value::from(2i64)).unwrap(), false);
        assert_eq!(v.set_element(1, Value::from(9i64)).unwrap(), false);
        assert_eq!(v.element_count(), 1);
        assert!(v.as_array().unwrap().get(1).unwrap().matches(&Value::from(1i64)));
    }

    #[test]
    fn test_deep_copy_is_writable() {
        let mut v = Value::from(ArrayValue::new());
        v.set_read_only(true);
        let mut copy = v.deep_copy();
        assert!(!copy.read_only());
        assert_eq!(copy.push_element(Value::from(1i64)).unwrap(), true);
    }

    #[test]
    #[should_panic(expected = "recursion depth")]
    fn test_deep_copy_depth_guard() {
        let mut v = Value::from(1i64);
        for _ in 0..(COPY_DEPTH_LIMIT + 2) {
            let mut arr = ArrayValue::new();
            arr.push_as_is(v);
            v = Value::from(arr);
        }
        let _ = v.deep_copy();
    }

    #[test]
    fn test_remove_member_from_record() {
        let mut rec = RecordValue::new();
        rec.set("name", Value::from("x"));
        let mut v = Value::from(rec);
        assert_eq!(v.remove_member("NAME").unwrap(), true);
        assert_eq!(v.remove_member("NAME").unwrap(), false);
    }

    #[test]
    fn test_zero_of() {
        assert!(Value::zero_of(ValueKind::Integer).matches(&Value::from(0i64)));
        assert!(Value::zero_of(ValueKind::String).matches(&Value::from("")));
        assert_eq!(Value::zero_of(ValueKind::Decimal).get_decimal(), Decimal::zero());
    }

    #[test]
    fn test_kind_parses_column_spelling() {
        use std::str::FromStr;
        assert_eq!(ValueKind::from_str("int").unwrap(), ValueKind::Integer);
        assert_eq!(ValueKind::from_str("STRING").unwrap(), ValueKind::String);
        assert_eq!(ValueKind::from_str("decimal").unwrap(), ValueKind::Decimal);
    }
}
