use std::cmp::Ordering;
use std::fmt;

use crate::error::{EvalError, Result};

// ============================================================================
// Numeric Type System
// ============================================================================

/// Host-native number: integers stay integers until mixed with a float.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

// ============================================================================
// Display Implementation
// ============================================================================

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            // Finite floats print exactly as the codec encodes them
            Number::Float(x) => match serde_json::Number::from_f64(*x) {
                Some(n) => write!(f, "{n}"),
                None if x.is_nan() => write!(f, "NaN"),
                None if *x > 0.0 => write!(f, "Infinity"),
                None => write!(f, "-Infinity"),
            },
        }
    }
}

// ============================================================================
// Equality and Comparison
// ============================================================================

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        use Number::*;

        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Int(a), Float(b)) => cmp_int_float(*a, *b) == Some(Ordering::Equal),
            (Float(a), Int(b)) => cmp_int_float(*b, *a) == Some(Ordering::Equal),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Number::*;

        match (self, other) {
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => cmp_int_float(*a, *b),
            (Float(a), Int(b)) => cmp_int_float(*b, *a).map(Ordering::reverse),
        }
    }
}

/// Exact comparison; casting the integer to `f64` would round above 2^53
fn cmp_int_float(a: i64, b: f64) -> Option<Ordering> {
    // 2^63: every float at or past it is beyond the i64 range
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    if b.is_nan() {
        return None;
    }
    if b >= BOUND {
        return Some(Ordering::Less);
    }
    if b < -BOUND {
        return Some(Ordering::Greater);
    }

    // In range, the integral part converts exactly
    let whole = b.trunc();
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(b - whole)),
        unequal => Some(unequal),
    }
}

// ============================================================================
// Arithmetic
// ============================================================================

impl Number {
    pub fn to_float(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub fn add(self, other: Number) -> Result<Number> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("+", a, b)),
            (a, b) => Ok(Number::Float(a.to_float() + b.to_float())),
        }
    }

    pub fn sub(self, other: Number) -> Result<Number> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("-", a, b)),
            (a, b) => Ok(Number::Float(a.to_float() - b.to_float())),
        }
    }

    pub fn mul(self, other: Number) -> Result<Number> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map(Number::Int)
                .ok_or_else(|| overflow("*", a, b)),
            (a, b) => Ok(Number::Float(a.to_float() * b.to_float())),
        }
    }

    /// Integer division floors toward negative infinity; float division is IEEE.
    pub fn div(self, other: Number) -> Result<Number> {
        match (self, other) {
            (Number::Int(_), Number::Int(0)) => Err(EvalError::arithmetic("divided by 0")),
            (Number::Int(a), Number::Int(b)) => floor_div(a, b)
                .map(Number::Int)
                .ok_or_else(|| overflow("/", a, b)),
            (a, b) => Ok(Number::Float(a.to_float() / b.to_float())),
        }
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn overflow(op: &str, a: i64, b: i64) -> EvalError {
    EvalError::arithmetic(format!("integer overflow in {a} {op} {b}"))
}
