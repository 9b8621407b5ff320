//! Constant values.
//!
//! Untyped literals carry a [`ConstValue`] until a target type lowers
//! them. Integer constants are held as `i128`, wide enough to range-check
//! against every basic type; floats as `f64`; rune constants are integer
//! values restricted to the Unicode scalar range.
//!
//! Folding is fallible: overflow and division by zero surface as
//! [`EvalError`] and are turned into diagnostics where the offending
//! expression is checked.

use crate::types::BasicKind;
use kilnc_ast::{BinOp, UnaryOp};
use kilnc_util::Symbol;
use thiserror::Error;

/// A compile-time value.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    /// Recovered-error sentinel; propagates silently.
    Invalid,
    Bool(bool),
    Integer(i128),
    Float(f64),
    Str(Symbol),
    Nil,
}

/// Failure during constant folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Arithmetic overflow in constant expression")]
    Overflow,
    #[error("Division by zero in constant expression")]
    DivisionByZero,
    #[error("Invalid operands in constant expression")]
    InvalidOperands,
}

impl ConstValue {
    /// Whether this value fits the range and class of `kind` without an
    /// explicit conversion.
    pub fn is_expressible_as(&self, kind: BasicKind) -> bool {
        match self {
            ConstValue::Invalid => true,
            ConstValue::Bool(_) => kind.is_boolean(),
            ConstValue::Integer(v) => match kind {
                BasicKind::I8 => i8::try_from(*v).is_ok(),
                BasicKind::I16 => i16::try_from(*v).is_ok(),
                BasicKind::I32 => i32::try_from(*v).is_ok(),
                BasicKind::I64 | BasicKind::Int => i64::try_from(*v).is_ok(),
                BasicKind::U8 => u8::try_from(*v).is_ok(),
                BasicKind::U16 => u16::try_from(*v).is_ok(),
                BasicKind::U32 => u32::try_from(*v).is_ok(),
                BasicKind::U64 | BasicKind::Uint => u64::try_from(*v).is_ok(),
                BasicKind::Rune | BasicKind::UntypedRune => u32::try_from(*v)
                    .ok()
                    .and_then(char::from_u32)
                    .is_some(),
                BasicKind::F32 | BasicKind::F64 | BasicKind::UntypedFloat => true,
                BasicKind::UntypedInteger => true,
                _ => false,
            },
            ConstValue::Float(f) => match kind {
                BasicKind::F32 => f.is_finite() && f.abs() <= f32::MAX as f64,
                BasicKind::F64 | BasicKind::UntypedFloat => true,
                kind if kind.is_integer() => {
                    f.fract() == 0.0 && *f >= i128::MIN as f64 && *f <= u64::MAX as f64
                }
                _ => false,
            },
            ConstValue::Str(_) => matches!(kind, BasicKind::Str | BasicKind::UntypedString),
            ConstValue::Nil => matches!(kind, BasicKind::Rawptr | BasicKind::UntypedNil),
        }
    }

    /// Normalize the representation for a target kind (integer constants
    /// flowing into float slots become floats). The value must already be
    /// expressible in `kind`.
    pub fn coerced_to(&self, kind: BasicKind) -> ConstValue {
        match (self, kind) {
            (ConstValue::Integer(v), k) if k.is_float() => ConstValue::Float(*v as f64),
            _ => self.clone(),
        }
    }

    /// Fold a binary operation over two constants.
    pub fn binary_op(op: BinOp, lhs: &ConstValue, rhs: &ConstValue) -> Result<ConstValue, EvalError> {
        use ConstValue::*;

        if matches!(lhs, Invalid) || matches!(rhs, Invalid) {
            return Ok(Invalid);
        }

        if op.is_logical() {
            return match (lhs, rhs) {
                (Bool(a), Bool(b)) => Ok(Bool(match op {
                    BinOp::And => *a && *b,
                    _ => *a || *b,
                })),
                _ => Err(EvalError::InvalidOperands),
            };
        }

        if op.is_comparison() {
            return Self::fold_comparison(op, lhs, rhs);
        }

        match (lhs, rhs) {
            (Integer(a), Integer(b)) => Self::fold_integer(op, *a, *b),
            (Float(a), Float(b)) => Self::fold_float(op, *a, *b),
            (Integer(a), Float(b)) => Self::fold_float(op, *a as f64, *b),
            (Float(a), Integer(b)) => Self::fold_float(op, *a, *b as f64),
            _ => Err(EvalError::InvalidOperands),
        }
    }

    /// Fold a unary operation over a constant.
    pub fn unary_op(op: UnaryOp, value: &ConstValue) -> Result<ConstValue, EvalError> {
        use ConstValue::*;
        match (op, value) {
            (_, Invalid) => Ok(Invalid),
            (UnaryOp::Plus, Integer(_) | Float(_)) => Ok(value.clone()),
            (UnaryOp::Minus, Integer(v)) => v.checked_neg().map(Integer).ok_or(EvalError::Overflow),
            (UnaryOp::Minus, Float(v)) => Ok(Float(-v)),
            (UnaryOp::Not, Bool(b)) => Ok(Bool(!b)),
            _ => Err(EvalError::InvalidOperands),
        }
    }

    fn fold_integer(op: BinOp, a: i128, b: i128) -> Result<ConstValue, EvalError> {
        let result = match op {
            BinOp::Add => a.checked_add(b),
            BinOp::Sub => a.checked_sub(b),
            BinOp::Mul => a.checked_mul(b),
            BinOp::Div => {
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.checked_div(b)
            }
            BinOp::Mod => {
                if b == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                a.checked_rem(b)
            }
            _ => return Err(EvalError::InvalidOperands),
        };
        result.map(ConstValue::Integer).ok_or(EvalError::Overflow)
    }

    fn fold_float(op: BinOp, a: f64, b: f64) -> Result<ConstValue, EvalError> {
        let result = match op {
            BinOp::Add => a + b,
            BinOp::Sub => a - b,
            BinOp::Mul => a * b,
            BinOp::Div => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                a / b
            }
            BinOp::Mod => {
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                a % b
            }
            _ => return Err(EvalError::InvalidOperands),
        };
        Ok(ConstValue::Float(result))
    }

    fn fold_comparison(op: BinOp, lhs: &ConstValue, rhs: &ConstValue) -> Result<ConstValue, EvalError> {
        use ConstValue::*;
        use std::cmp::Ordering;

        let ordering = match (lhs, rhs) {
            (Integer(a), Integer(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Integer(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Integer(b)) => a.partial_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.as_str().partial_cmp(&b.as_str()),
            (Bool(a), Bool(b)) => match op {
                BinOp::Eq => return Ok(Bool(a == b)),
                BinOp::NotEq => return Ok(Bool(a != b)),
                _ => return Err(EvalError::InvalidOperands),
            },
            _ => return Err(EvalError::InvalidOperands),
        };
        let Some(ordering) = ordering else {
            // NaN comparisons: only equality has a defined constant answer.
            return match op {
                BinOp::Eq => Ok(Bool(false)),
                BinOp::NotEq => Ok(Bool(true)),
                _ => Err(EvalError::InvalidOperands),
            };
        };
        let truth = match op {
            BinOp::Eq => ordering == Ordering::Equal,
            BinOp::NotEq => ordering != Ordering::Equal,
            BinOp::Lt => ordering == Ordering::Less,
            BinOp::LtEq => ordering != Ordering::Greater,
            BinOp::Gt => ordering == Ordering::Greater,
            BinOp::GtEq => ordering != Ordering::Less,
            _ => return Err(EvalError::InvalidOperands),
        };
        Ok(Bool(truth))
    }
}
