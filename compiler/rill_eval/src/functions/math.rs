use rill_core::Mlrval;

use super::arithmetic::null_disposition;

/// Applies `f` to floats; ints pass through unchanged.
fn integral(a: &Mlrval, f: fn(f64) -> f64) -> Mlrval {
    match a {
        Mlrval::Int(_) | Mlrval::Absent | Mlrval::Empty | Mlrval::Error => a.clone(),
        Mlrval::Float(x) => Mlrval::Float(f(*x)),
        _ => Mlrval::Error,
    }
}

pub fn abs(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(x) => x.checked_abs().map_or(Mlrval::Float((*x as f64).abs()), Mlrval::Int),
        _ => integral(a, f64::abs),
    }
}

pub fn ceiling(a: &Mlrval) -> Mlrval {
    integral(a, f64::ceil)
}

pub fn floor(a: &Mlrval) -> Mlrval {
    integral(a, f64::floor)
}

pub fn round(a: &Mlrval) -> Mlrval {
    integral(a, f64::round)
}

pub fn sgn(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(x) => Mlrval::Int(x.signum()),
        Mlrval::Float(x) if *x == 0.0 => Mlrval::Float(0.0),
        Mlrval::Float(x) => Mlrval::Float(x.signum()),
        Mlrval::Absent | Mlrval::Empty | Mlrval::Error => a.clone(),
        _ => Mlrval::Error,
    }
}

pub fn roundm(a: &Mlrval, m: &Mlrval) -> Mlrval {
    if let Some(disposed) = null_disposition(a, m) {
        return disposed;
    }
    match (a, m) {
        (Mlrval::Int(x), Mlrval::Int(y)) if *y != 0 => {
            let q = (*x as f64 / *y as f64).round();
            #[allow(clippy::cast_possible_truncation)]
            Mlrval::Int((q as i64).saturating_mul(*y))
        }
        _ => match (a.as_f64(), m.as_f64()) {
            (Some(x), Some(y)) => Mlrval::Float((x / y).round() * y),
            _ => Mlrval::Error,
        },
    }
}

pub fn atan2(y: &Mlrval, x: &Mlrval) -> Mlrval {
    if let Some(disposed) = null_disposition(y, x) {
        return disposed;
    }
    match (y.as_f64(), x.as_f64()) {
        (Some(y), Some(x)) => Mlrval::Float(y.atan2(x)),
        _ => Mlrval::Error,
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

/// Numbers order before strings and booleans; absent and empty are
/// skipped unless nothing else is present.
fn extreme(args: &[Mlrval], which: Extreme) -> Mlrval {
    if args.iter().any(Mlrval::is_error) {
        return Mlrval::Error;
    }
    let mut best: Option<&Mlrval> = None;
    for arg in args.iter().filter(|a| !a.is_null()) {
        best = Some(match best {
            None => arg,
            Some(current) => {
                let replace = match (current.is_numeric(), arg.is_numeric()) {
                    (true, true) => {
                        let less = match (current, arg) {
                            (Mlrval::Int(c), Mlrval::Int(x)) => x < c,
                            _ => arg.as_f64() < current.as_f64(),
                        };
                        let greater = match (current, arg) {
                            (Mlrval::Int(c), Mlrval::Int(x)) => x > c,
                            _ => arg.as_f64() > current.as_f64(),
                        };
                        if which == Extreme::Min { less } else { greater }
                    }
                    (true, false) => which == Extreme::Max,
                    (false, true) => which == Extreme::Min,
                    (false, false) => {
                        let ordering = arg.to_string().cmp(&current.to_string());
                        if which == Extreme::Min {
                            ordering.is_lt()
                        } else {
                            ordering.is_gt()
                        }
                    }
                };
                if replace {
                    arg
                } else {
                    current
                }
            }
        });
    }
    match best {
        Some(value) => value.clone(),
        None if args.iter().any(Mlrval::is_empty) => Mlrval::Empty,
        None => Mlrval::Absent,
    }
}

pub fn min(args: &[Mlrval]) -> Mlrval {
    extreme(args, Extreme::Min)
}

pub fn max(args: &[Mlrval]) -> Mlrval {
    extreme(args, Extreme::Max)
}
