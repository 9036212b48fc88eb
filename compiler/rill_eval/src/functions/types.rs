use std::time::{SystemTime, UNIX_EPOCH};

use rill_core::{Mlrval, TypeInference};

pub fn type_of(a: &Mlrval) -> Mlrval {
    Mlrval::String(a.type_name().to_owned())
}

pub fn is_absent(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(a.is_absent())
}

pub fn is_present(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(!a.is_absent())
}

pub fn is_empty(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(a.is_empty())
}

pub fn is_not_empty(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(!a.is_null())
}

pub fn is_string(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(a.is_string_or_empty())
}

pub fn is_numeric(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(a.is_numeric())
}

pub fn is_int(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(matches!(a, Mlrval::Int(_)))
}

pub fn is_float(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(matches!(a, Mlrval::Float(_)))
}

pub fn is_boolean(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(matches!(a, Mlrval::Boolean(_)))
}

pub fn is_error(a: &Mlrval) -> Mlrval {
    Mlrval::Boolean(a.is_error())
}

pub fn to_boolean(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(i) => Mlrval::Boolean(*i != 0),
        Mlrval::Float(f) => Mlrval::Boolean(*f != 0.0),
        Mlrval::Absent | Mlrval::Empty => a.clone(),
        _ => a.as_bool().map_or(Mlrval::Error, Mlrval::Boolean),
    }
}

pub fn to_int(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Int(_) | Mlrval::Absent | Mlrval::Empty | Mlrval::Error => a.clone(),
        #[allow(clippy::cast_possible_truncation)]
        Mlrval::Float(f) => Mlrval::Int(*f as i64),
        Mlrval::Boolean(b) => Mlrval::Int(i64::from(*b)),
        Mlrval::String(s) => match Mlrval::parse_number(s) {
            Some(number) => to_int(&number),
            None => Mlrval::Error,
        },
    }
}

pub fn to_float(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Float(_) | Mlrval::Absent | Mlrval::Empty | Mlrval::Error => a.clone(),
        Mlrval::Int(i) => Mlrval::Float(*i as f64),
        Mlrval::Boolean(b) => Mlrval::Float(if *b { 1.0 } else { 0.0 }),
        Mlrval::String(s) => match Mlrval::infer(s, TypeInference::StringFloatInt) {
            Mlrval::Int(i) => Mlrval::Float(i as f64),
            Mlrval::Float(f) => Mlrval::Float(f),
            _ => Mlrval::Error,
        },
    }
}

pub fn to_string(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Absent | Mlrval::Error => a.clone(),
        _ => Mlrval::from_string(a.to_string()),
    }
}

fn since_epoch() -> Option<f64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs_f64())
}

pub fn systime() -> Mlrval {
    since_epoch().map_or(Mlrval::Error, Mlrval::Float)
}

pub fn systimeint() -> Mlrval {
    #[allow(clippy::cast_possible_truncation)]
    since_epoch().map_or(Mlrval::Error, |secs| Mlrval::Int(secs as i64))
}
