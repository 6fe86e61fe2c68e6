//! Runtime values for the interpreter

use super::error::{InterpResult, RuntimeError};
use crate::ast::NodeId;
use std::fmt;

/// Reference to a function literal: its body scope and its parameter list.
///
/// Copying a `FunctionRef` copies the two node references, never the nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionRef {
    pub body: NodeId,
    pub params: NodeId,
}

/// Runtime value
#[derive(Debug, Clone, Copy, Default)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Function reference
    Function(FunctionRef),
    /// No value produced
    #[default]
    Undefined,
}

impl Value {
    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Function(_) => "function",
            Value::Undefined => "undefined",
        }
    }

    fn mismatch(&self, expected: &str) -> RuntimeError {
        match self {
            Value::Undefined => RuntimeError::undefined_value(expected),
            _ => RuntimeError::incorrect_type(expected, self.type_name()),
        }
    }

    /// Coerce to an integer; floats truncate toward zero
    pub fn as_int(&self) -> InterpResult<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(x) => Ok(*x as i64),
            _ => Err(self.mismatch("int")),
        }
    }

    /// Coerce to a float; integers widen
    pub fn as_float(&self) -> InterpResult<f64> {
        match self {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(x) => Ok(*x),
            _ => Err(self.mismatch("float")),
        }
    }

    pub fn as_function(&self) -> InterpResult<FunctionRef> {
        match self {
            Value::Function(func) => Ok(*func),
            _ => Err(self.mismatch("function")),
        }
    }

    /// Truthiness goes through the integer coercion: 0 is false
    pub fn is_truthy(&self) -> InterpResult<bool> {
        self.as_int().map(|n| n != 0)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<FunctionRef> for Value {
    fn from(func: FunctionRef) -> Self {
        Value::Function(func)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Function(_) => write!(f, "<function>"),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Undefined, Value::Undefined) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interp::ErrorKind;

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(42)), "42");
        assert_eq!(format!("{}", Value::Float(2.5)), "2.5");
        assert_eq!(format!("{}", Value::Float(2.0)), "2");
        assert_eq!(format!("{}", Value::Undefined), "undefined");
    }

    #[test]
    fn test_default_is_undefined() {
        assert_eq!(Value::default(), Value::Undefined);
    }

    #[test]
    fn test_int_coercions() {
        assert_eq!(Value::Int(7).as_int().unwrap(), 7);
        assert_eq!(Value::Int(7).as_float().unwrap(), 7.0);
    }

    #[test]
    fn test_float_truncates_to_int() {
        assert_eq!(Value::Float(2.9).as_int().unwrap(), 2);
        assert_eq!(Value::Float(-2.9).as_int().unwrap(), -2);
    }

    #[test]
    fn test_undefined_coercion_fails() {
        let err = Value::Undefined.as_int().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedValue);
        let err = Value::Undefined.as_function().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedValue);
    }

    #[test]
    fn test_number_as_function_fails() {
        let err = Value::Int(1).as_function().unwrap_err();
        assert_eq!(err.kind, ErrorKind::IncorrectType);
        assert!(err.message.contains("function"));
        assert!(err.message.contains("int"));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Int(1).is_truthy().unwrap());
        assert!(!Value::Int(0).is_truthy().unwrap());
        assert!(!Value::Float(0.5).is_truthy().unwrap());
        assert!(Value::Float(-1.5).is_truthy().unwrap());
        assert!(Value::Undefined.is_truthy().is_err());
    }

    #[test]
    fn test_copy_is_independent() {
        let a = Value::Int(1);
        let mut b = a;
        if let Value::Int(n) = &mut b {
            *n += 1;
        }
        assert_eq!(a, Value::Int(1));
        assert_eq!(b, Value::Int(2));
    }
}
