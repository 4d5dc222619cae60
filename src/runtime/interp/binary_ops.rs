use std::cmp::Ordering;

use crate::{
    runtime::{FluxRuntime, error::RuntimeError, value::Value},
    syntax::ast::{InfixOp, PrefixOp},
};

impl FluxRuntime {
    pub(super) fn prefix(&mut self, op: PrefixOp, operand: Value) -> Result<Value, RuntimeError> {
        match (op, operand) {
            (PrefixOp::Neg, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
            (PrefixOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
            (PrefixOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
            (op, operand) => {
                let symbol = match op {
                    PrefixOp::Neg => "-",
                    PrefixOp::Not => "!",
                };
                Err(RuntimeError::Method(format!(
                    "no method matching {}(::{})",
                    symbol,
                    self.type_label(operand)
                )))
            }
        }
    }

    pub(super) fn infix(&mut self, op: InfixOp, left: Value, right: Value) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(int_op(op, a, b)),
            (Value::Int(a), Value::Float(b)) => Ok(float_op(op, a as f64, b)),
            (Value::Float(a), Value::Int(b)) => Ok(float_op(op, a, b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(float_op(op, a, b)),
            _ => {
                if let (Some(a), Some(b)) = (self.string_ref(left), self.string_ref(right)) {
                    if let Some(ordering) = compare(op, a.cmp(b)) {
                        return Ok(Value::Bool(ordering));
                    }
                    if op == InfixOp::Mul {
                        let joined = format!("{}{}", a, b);
                        return Ok(self.alloc_string(joined));
                    }
                }
                match op {
                    InfixOp::Eq => Ok(Value::Bool(left == right)),
                    InfixOp::NotEq => Ok(Value::Bool(left != right)),
                    _ => Err(RuntimeError::Method(format!(
                        "no method matching {}(::{}, ::{})",
                        op,
                        self.type_label(left),
                        self.type_label(right)
                    ))),
                }
            }
        }
    }
}

fn compare(op: InfixOp, ordering: Ordering) -> Option<bool> {
    match op {
        InfixOp::Eq => Some(ordering == Ordering::Equal),
        InfixOp::NotEq => Some(ordering != Ordering::Equal),
        InfixOp::Lt => Some(ordering == Ordering::Less),
        InfixOp::Gt => Some(ordering == Ordering::Greater),
        InfixOp::Lte => Some(ordering != Ordering::Greater),
        InfixOp::Gte => Some(ordering != Ordering::Less),
        InfixOp::Add | InfixOp::Sub | InfixOp::Mul | InfixOp::Div => None,
    }
}

fn int_op(op: InfixOp, a: i64, b: i64) -> Value {
    match op {
        InfixOp::Add => Value::Int(a.wrapping_add(b)),
        InfixOp::Sub => Value::Int(a.wrapping_sub(b)),
        InfixOp::Mul => Value::Int(a.wrapping_mul(b)),
        // `/` always produces a float; `div` is integer division.
        InfixOp::Div => Value::Float(a as f64 / b as f64),
        _ => Value::Bool(compare(op, a.cmp(&b)).unwrap_or(false)),
    }
}

fn float_op(op: InfixOp, a: f64, b: f64) -> Value {
    match op {
        InfixOp::Add => Value::Float(a + b),
        InfixOp::Sub => Value::Float(a - b),
        InfixOp::Mul => Value::Float(a * b),
        InfixOp::Div => Value::Float(a / b),
        _ => Value::Bool(
            a.partial_cmp(&b)
                .and_then(|ordering| compare(op, ordering))
                .unwrap_or(op == InfixOp::NotEq),
        ),
    }
}
