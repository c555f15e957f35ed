//! Value conversion across the bridge and method resolution.

use super::class::{MethodDef, NativeClass};
use super::object::BridgedObject;
use brio_core::{
    ArrayValue, NativeHandle, NativeInstance, RecordValue, RuntimeError, Value, ValueData,
    ValueKind,
};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Failure raised inside a host method body. The bridge wraps it as the
/// cause of a `NativeCallFailed`.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HostCallError(pub String);

impl From<&str> for HostCallError {
    fn from(msg: &str) -> Self {
        HostCallError(msg.to_string())
    }
}

impl From<String> for HostCallError {
    fn from(msg: String) -> Self {
        HostCallError(msg)
    }
}

/// The parameter/argument type vocabulary of exposed methods.
///
/// `Object(None)` is the most general object type; `Object(Some(class))`
/// constrains to one exposed class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    Unit,
    Bool,
    Int,
    Double,
    Str,
    List,
    Json,
    Object(Option<String>),
}

impl HostType {
    pub fn object_of(class: &str) -> HostType {
        HostType::Object(Some(RecordValue::normalize_key(class)))
    }

    pub fn any_object() -> HostType {
        HostType::Object(None)
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Unit => write!(f, "Unit"),
            HostType::Bool => write!(f, "Bool"),
            HostType::Int => write!(f, "Int"),
            HostType::Double => write!(f, "Double"),
            HostType::Str => write!(f, "Str"),
            HostType::List => write!(f, "List"),
            HostType::Json => write!(f, "Json"),
            HostType::Object(None) => write!(f, "Object"),
            HostType::Object(Some(class)) => write!(f, "Object({})", class),
        }
    }
}

/// A value on the host side of the bridge.
#[derive(Debug, Clone)]
pub enum HostValue {
    Unit,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    List(Vec<HostValue>),
    /// Opaque structured data; JSON objects convert to records on the way
    /// back when every member converts.
    Json(serde_json::Value),
    Object(NativeHandle),
}

impl HostValue {
    pub fn host_type(&self) -> HostType {
        match self {
            HostValue::Unit => HostType::Unit,
            HostValue::Bool(_) => HostType::Bool,
            HostValue::Int(_) => HostType::Int,
            HostValue::Double(_) => HostType::Double,
            HostValue::Str(_) => HostType::Str,
            HostValue::List(_) => HostType::List,
            HostValue::Json(_) => HostType::Json,
            HostValue::Object(h) => {
                HostType::Object(Some(RecordValue::normalize_key(h.class_name())))
            }
        }
    }
}

/// Converts a script value to its nearest host equivalent. Bridged objects
/// pass their wrapped instance; tables have no host equivalent.
pub fn value_to_host(value: &Value) -> Result<HostValue, RuntimeError> {
    match value.data() {
        ValueData::Undefined => Ok(HostValue::Unit),
        ValueData::Bool(b) => Ok(HostValue::Bool(*b)),
        ValueData::Int(n) => Ok(HostValue::Int(*n)),
        ValueData::Double(f) => Ok(HostValue::Double(*f)),
        ValueData::Decimal(d) => Ok(HostValue::Double(d.to_f64())),
        ValueData::Str(s) => Ok(HostValue::Str(s.clone())),
        ValueData::Array(arr) => Ok(HostValue::List(
            arr.iter().map(value_to_host).collect::<Result<_, _>>()?,
        )),
        ValueData::Record(rec) => Ok(HostValue::Json(record_to_json(rec)?)),
        ValueData::Table(_) => Err(RuntimeError::InvalidOperandForNativeCall(ValueKind::Table)),
        ValueData::Native(h) => Ok(HostValue::Object(Rc::clone(h))),
    }
}

fn record_to_json(rec: &RecordValue) -> Result<serde_json::Value, RuntimeError> {
    let mut map = serde_json::Map::new();
    for (name, value) in rec.iter() {
        map.insert(name.to_string(), value_to_json(value)?);
    }
    Ok(serde_json::Value::Object(map))
}

fn value_to_json(value: &Value) -> Result<serde_json::Value, RuntimeError> {
    let unsupported = || RuntimeError::InvalidOperandForNativeCall(value.kind());
    match value.data() {
        ValueData::Undefined => Ok(serde_json::Value::Null),
        ValueData::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        ValueData::Int(n) => Ok(serde_json::Value::from(*n)),
        ValueData::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(unsupported),
        ValueData::Decimal(d) => serde_json::Number::from_f64(d.to_f64())
            .map(serde_json::Value::Number)
            .ok_or_else(unsupported),
        ValueData::Str(s) => Ok(serde_json::Value::String(s.clone())),
        ValueData::Array(arr) => Ok(serde_json::Value::Array(
            arr.iter().map(value_to_json).collect::<Result<_, _>>()?,
        )),
        ValueData::Record(rec) => record_to_json(rec),
        ValueData::Table(_) | ValueData::Native(_) => Err(unsupported()),
    }
}

/// Converts a host value back to a script value. Lists recurse; JSON
/// scalars unwrap directly; JSON objects become records.
pub fn host_to_value(host: HostValue) -> Value {
    match host {
        HostValue::Unit => Value::undefined(),
        HostValue::Bool(b) => Value::from(b),
        HostValue::Int(n) => Value::from(n),
        HostValue::Double(f) => Value::from(f),
        HostValue::Str(s) => Value::from(s),
        HostValue::List(items) => {
            let mut arr = ArrayValue::new();
            for item in items {
                arr.push_as_is(host_to_value(item));
            }
            Value::from(arr)
        }
        HostValue::Json(json) => json_to_value(json),
        HostValue::Object(h) => Value::native(h),
    }
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::undefined(),
        serde_json::Value::Bool(b) => Value::from(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from(s),
        serde_json::Value::Array(items) => {
            let mut arr = ArrayValue::new();
            for item in items {
                arr.push_as_is(json_to_value(item));
            }
            Value::from(arr)
        }
        serde_json::Value::Object(map) => {
            let mut rec = RecordValue::new();
            for (name, item) in map {
                rec.set(&name, json_to_value(item));
            }
            Value::from(rec)
        }
    }
}

pub(crate) fn format_signature(class: &str, method: &str, arg_types: &[HostType]) -> String {
    let params = arg_types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}.{}({})", class, method, params)
}

/// Two-pass resolution: exact parameter types first, then a second pass
/// with every object-typed parameter loosened to the most general object
/// type. Within a pass the first match in registration order wins.
pub(crate) fn resolve<'c>(
    class: &'c NativeClass,
    name: &'c str,
    arg_types: &[HostType],
) -> Option<&'c MethodDef> {
    for loosen in [false, true] {
        let found = class.methods_named(name).find(|m| {
            m.params.len() == arg_types.len()
                && m.params
                    .iter()
                    .zip(arg_types)
                    .all(|(p, a)| param_accepts(p, a, loosen))
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Applies the widenings `param_accepts` allowed, so a method body sees
/// arguments of exactly its declared parameter types.
fn adapt_args(params: &[HostType], args: Vec<HostValue>) -> Vec<HostValue> {
    params
        .iter()
        .zip(args)
        .map(|(param, arg)| match (param, arg) {
            (HostType::Double, HostValue::Int(n)) => HostValue::Double(n as f64),
            (_, arg) => arg,
        })
        .collect()
}

fn param_accepts(param: &HostType, arg: &HostType, loosen_objects: bool) -> bool {
    match (param, arg) {
        // Numeric widening is always assignable.
        (HostType::Double, HostType::Int) => true,
        (HostType::Object(None), HostType::Object(_)) => true,
        (HostType::Object(Some(_)), HostType::Object(_)) if loosen_objects => true,
        (HostType::Object(Some(class)), HostType::Object(Some(arg_class))) => class == arg_class,
        (p, a) => p == a,
    }
}

/// Runs one late-bound call against a bridged object.
pub(crate) fn dispatch_method(
    obj: &BridgedObject,
    name: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    let method_name = RecordValue::normalize_key(name);
    let host_args: Vec<HostValue> = args
        .iter()
        .map(value_to_host)
        .collect::<Result<_, _>>()?;
    let arg_types: Vec<HostType> = host_args.iter().map(HostValue::host_type).collect();
    let signature = format_signature(obj.class_name(), &method_name, &arg_types);

    let method = resolve(obj.class(), &method_name, &arg_types)
        .ok_or_else(|| RuntimeError::NoSuchMethod(signature.clone()))?;
    let host_args = adapt_args(&method.params, host_args);

    let mut instance = obj.instance_mut();
    let result = method.call(instance.as_mut(), &host_args).map_err(|cause| {
        RuntimeError::NativeCallFailed {
            signature,
            cause: Box::new(cause),
        }
    })?;
    drop(instance);
    Ok(host_to_value(result))
}
