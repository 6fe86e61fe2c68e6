//! Operator table
//!
//! Two `Int` operands stay in the integer domain; any other numeric mix is
//! promoted to float. Comparison and logical operators yield 0 or 1 in the
//! domain the operation ran in.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::ast::{BinOp, UnOp};

/// Evaluate binary operation
pub fn binary(op: BinOp, lhs: Value, rhs: Value) -> InterpResult<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_binary(op, a, b).map(Value::Int),
        _ => {
            let a = lhs.as_float()?;
            let b = rhs.as_float()?;
            Ok(Value::Float(float_binary(op, a, b)))
        }
    }
}

fn int_binary(op: BinOp, a: i64, b: i64) -> InterpResult<i64> {
    let n = match op {
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::division_by_zero());
            }
            a.wrapping_div(b)
        }
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Lt => i64::from(a < b),
        BinOp::Gt => i64::from(a > b),
        BinOp::Le => i64::from(a <= b),
        BinOp::Ge => i64::from(a >= b),
        BinOp::Eq => i64::from(a == b),
        BinOp::Ne => i64::from(a != b),
        BinOp::And => i64::from(a != 0 && b != 0),
        BinOp::Or => i64::from(a != 0 || b != 0),
    };
    Ok(n)
}

fn float_binary(op: BinOp, a: f64, b: f64) -> f64 {
    let flag = |cond: bool| if cond { 1.0 } else { 0.0 };
    match op {
        BinOp::Mul => a * b,
        BinOp::Div => a / b,
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Lt => flag(a < b),
        BinOp::Gt => flag(a > b),
        BinOp::Le => flag(a <= b),
        BinOp::Ge => flag(a >= b),
        BinOp::Eq => flag(a == b),
        BinOp::Ne => flag(a != b),
        BinOp::And => flag(truthy(a) && truthy(b)),
        BinOp::Or => flag(truthy(a) || truthy(b)),
    }
}

// Same rule as `Value::is_truthy`: truncate, then compare with zero.
fn truthy(x: f64) -> bool {
    x as i64 != 0
}

/// Evaluate unary operation
pub fn unary(op: UnOp, val: Value) -> InterpResult<Value> {
    match (op, val) {
        (UnOp::Plus, Value::Int(_) | Value::Float(_)) => Ok(val),
        (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
        (UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnOp::Not, Value::Int(n)) => Ok(Value::Int(i64::from(n == 0))),
        (UnOp::Not, Value::Float(x)) => Ok(Value::Float(if truthy(x) { 0.0 } else { 1.0 })),
        // Function or undefined: let the coercion report the mismatch
        _ => val.as_float().map(Value::Float),
    }
}
