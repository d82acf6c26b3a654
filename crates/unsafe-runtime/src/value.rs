//! Host boundary values and argument access
//!
//! The managed runtime owns its own value representation. This module describes the
//! small subset the bridge needs: integers (addresses, sizes, handles), doubles,
//! strings, booleans and opaque object references, plus the positional argument
//! context a native entry point reads from and writes its return value into.

use crate::address::NativeAddress;
use std::fmt;
use thiserror::Error;

/// Opaque reference to a managed object, only meaningful to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef(pub u64);

/// A value crossing the host boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Object(ObjectRef),
}

impl Value {
    /// Host-facing type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(o) => write!(f, "<object {}>", o.0),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NativeAddress> for Value {
    fn from(address: NativeAddress) -> Self {
        Value::Int(address.to_host())
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

/// Positional argument context supplied by the host for one native call
///
/// Getters return `None` when the argument is missing or has a different type.
pub trait NativeArguments {
    fn arg_count(&self) -> usize;

    fn integer(&self, index: usize) -> Option<i64>;

    fn double(&self, index: usize) -> Option<f64>;

    fn string(&self, index: usize) -> Option<String>;

    fn boolean(&self, index: usize) -> Option<bool>;

    fn object(&self, index: usize) -> Option<ObjectRef>;

    /// Type name of the argument at `index`, for error messages
    fn type_name(&self, index: usize) -> &'static str;

    /// Set the single return value of the call
    fn set_return(&mut self, value: Value);
}

/// Argument context backed by a vector of [`Value`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    args: Vec<Value>,
    ret: Value,
}

impl CallArgs {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            ret: Value::Null,
        }
    }

    /// Return value set by the entry point, `Value::Null` if none
    pub fn return_value(&self) -> &Value {
        &self.ret
    }

    pub fn into_return_value(self) -> Value {
        self.ret
    }
}

impl NativeArguments for CallArgs {
    fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn integer(&self, index: usize) -> Option<i64> {
        self.args.get(index).and_then(Value::as_int)
    }

    fn double(&self, index: usize) -> Option<f64> {
        // Integers widen; the host hands literal `1` to a double parameter
        match self.args.get(index)? {
            Value::Double(d) => Some(*d),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    fn string(&self, index: usize) -> Option<String> {
        match self.args.get(index)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn boolean(&self, index: usize) -> Option<bool> {
        self.args.get(index).and_then(Value::as_bool)
    }

    fn object(&self, index: usize) -> Option<ObjectRef> {
        match self.args.get(index)? {
            Value::Object(o) => Some(*o),
            _ => None,
        }
    }

    fn type_name(&self, index: usize) -> &'static str {
        self.args.get(index).map_or("nothing", Value::type_name)
    }

    fn set_return(&mut self, value: Value) {
        self.ret = value;
    }
}

/// Argument mistakes raised as the host's `ArgumentError`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    #[error("{function}: missing argument {index}")]
    Missing { function: &'static str, index: usize },

    #[error("{function}: argument {index} must be {expected}, got {actual}")]
    WrongType {
        function: &'static str,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{function}: argument {index} must not be negative, got {value}")]
    Negative {
        function: &'static str,
        index: usize,
        value: i64,
    },

    #[error("{function}: argument {index} is out of range: {reason}")]
    OutOfRange {
        function: &'static str,
        index: usize,
        reason: String,
    },
}
