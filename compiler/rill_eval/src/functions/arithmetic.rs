//! Operators.

use std::cmp::Ordering;

use rill_core::Mlrval;

/// Result forced by null-ish operands, if any: error beats absent beats
/// empty.
pub fn null_disposition(a: &Mlrval, b: &Mlrval) -> Option<Mlrval> {
    if a.is_error() || b.is_error() {
        Some(Mlrval::Error)
    } else if a.is_absent() || b.is_absent() {
        Some(Mlrval::Absent)
    } else if a.is_empty() || b.is_empty() {
        Some(Mlrval::Empty)
    } else {
        None
    }
}

enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn operands(a: &Mlrval, b: &Mlrval) -> Option<Operands> {
    match (a, b) {
        (Mlrval::Int(x), Mlrval::Int(y)) => Some(Operands::Ints(*x, *y)),
        _ => Some(Operands::Floats(a.as_f64()?, b.as_f64()?)),
    }
}

/// Int arithmetic with float fallback on overflow.
fn arith(
    a: &Mlrval,
    b: &Mlrval,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Mlrval {
    if let Some(disposed) = null_disposition(a, b) {
        return disposed;
    }
    match operands(a, b) {
        Some(Operands::Ints(x, y)) => {
            int_op(x, y).map_or_else(|| Mlrval::Float(float_op(x as f64, y as f64)), Mlrval::Int)
        }
        Some(Operands::Floats(x, y)) => Mlrval::Float(float_op(x, y)),
        None => Mlrval::Error,
    }
}

pub fn plus(a: &Mlrval, b: &Mlrval) -> Mlrval {
    arith(a, b, i64::checked_add, |x, y| x + y)
}

pub fn minus(a: &Mlrval, b: &Mlrval) -> Mlrval {
    arith(a, b, i64::checked_sub, |x, y| x - y)
}

pub fn times(a: &Mlrval, b: &Mlrval) -> Mlrval {
    arith(a, b, i64::checked_mul, |x, y| x * y)
}

pub fn divide(a: &Mlrval, b: &Mlrval) -> Mlrval {
    arith(
        a,
        b,
        |x, y| {
            if y != 0 && x.checked_rem(y) == Some(0) {
                x.checked_div(y)
            } else {
                None
            }
        },
        |x, y| x / y,
    )
}

pub fn int_divide(a: &Mlrval, b: &Mlrval) -> Mlrval {
    if let Some(disposed) = null_disposition(a, b) {
        return disposed;
    }
    match operands(a, b) {
        Some(Operands::Ints(_, 0)) | None => Mlrval::Error,
        Some(Operands::Ints(x, y)) => match (x.checked_div(y), x.checked_rem(y)) {
            (Some(q), Some(r)) if r != 0 && ((r < 0) != (y < 0)) => Mlrval::Int(q - 1),
            (Some(q), Some(_)) => Mlrval::Int(q),
            _ => Mlrval::Float((x as f64 / y as f64).floor()),
        },
        Some(Operands::Floats(x, y)) => Mlrval::Float((x / y).floor()),
    }
}

pub fn modulus(a: &Mlrval, b: &Mlrval) -> Mlrval {
    if let Some(disposed) = null_disposition(a, b) {
        return disposed;
    }
    match operands(a, b) {
        Some(Operands::Ints(_, 0)) | None => Mlrval::Error,
        Some(Operands::Ints(x, y)) => {
            let r = x.checked_rem(y).unwrap_or(0);
            Mlrval::Int(if r != 0 && ((r < 0) != (y < 0)) { r + y } else { r })
        }
        Some(Operands::Floats(x, y)) => Mlrval::Float(x - y * (x / y).floor()),
    }
}

pub fn power(a: &Mlrval, b: &Mlrval) -> Mlrval {
    arith(
        a,
        b,
        |x, y| u32::try_from(y).ok().and_then(|e| x.checked_pow(e)),
        f64::powf,
    )
}

/// Concatenation. An absent side is ignored.
pub fn dot(a: &Mlrval, b: &Mlrval) -> Mlrval {
    match (a, b) {
        (Mlrval::Error, _) | (_, Mlrval::Error) => Mlrval::Error,
        (Mlrval::Absent, other) | (other, Mlrval::Absent) => other.clone(),
        _ => Mlrval::from_string(format!("{a}{b}")),
    }
}

pub fn unary_plus(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(_) | Mlrval::Float(_) | Mlrval::Absent | Mlrval::Empty => a.clone(),
        _ => Mlrval::Error,
    }
}

pub fn negate(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(x) => x
            .checked_neg()
            .map_or(Mlrval::Float(-(*x as f64)), Mlrval::Int),
        Mlrval::Float(x) => Mlrval::Float(-x),
        Mlrval::Absent | Mlrval::Empty => a.clone(),
        _ => Mlrval::Error,
    }
}

pub fn bit_and(x: i64, y: i64) -> Mlrval {
    Mlrval::Int(x & y)
}

pub fn bit_or(x: i64, y: i64) -> Mlrval {
    Mlrval::Int(x | y)
}

pub fn bit_xor(x: i64, y: i64) -> Mlrval {
    Mlrval::Int(x ^ y)
}

pub fn shift_left(x: i64, y: i64) -> Mlrval {
    u32::try_from(y).map_or(Mlrval::Error, |s| Mlrval::Int(x.wrapping_shl(s)))
}

pub fn shift_right(x: i64, y: i64) -> Mlrval {
    u32::try_from(y).map_or(Mlrval::Error, |s| Mlrval::Int(x.wrapping_shr(s)))
}

pub fn bit_not(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(x) => Mlrval::Int(!x),
        Mlrval::Absent | Mlrval::Empty => a.clone(),
        _ => Mlrval::Error,
    }
}

pub fn logical_not(b: bool) -> bool {
    !b
}

pub fn absent_coalesce(a: &Mlrval, b: &Mlrval) -> Mlrval {
    (if a.is_absent() { b } else { a }).clone()
}

pub fn absent_error_coalesce(a: &Mlrval, b: &Mlrval) -> Mlrval {
    (if a.is_absent() || a.is_error() { b } else { a }).clone()
}

/// Numbers compare numerically; anything else compares by text.
fn ordering(a: &Mlrval, b: &Mlrval) -> Option<Ordering> {
    match (a, b) {
        (Mlrval::Int(x), Mlrval::Int(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => Some(a.to_string().cmp(&b.to_string())),
        },
    }
}

fn compare(a: &Mlrval, b: &Mlrval, accept: fn(Ordering) -> bool) -> Mlrval {
    match (a, b) {
        (Mlrval::Error, _) | (_, Mlrval::Error) => Mlrval::Error,
        (Mlrval::Absent, _) | (_, Mlrval::Absent) => Mlrval::Absent,
        _ => ordering(a, b).map_or(Mlrval::Error, |o| Mlrval::Boolean(accept(o))),
    }
}

pub fn equals(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_eq)
}

pub fn not_equals(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_ne)
}

pub fn less_than(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_lt)
}

pub fn less_equal(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_le)
}

pub fn greater_than(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_gt)
}

pub fn greater_equal(a: &Mlrval, b: &Mlrval) -> Mlrval {
    compare(a, b, Ordering::is_ge)
}
