//! Scalar values.
//!
//! A field read from a record starts life as text and is typed by
//! inference; values computed by the DSL carry their type directly.

use std::fmt;

/// How field text is typed when read from a record.
///
/// Chosen once per engine instance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TypeInference {
    /// Every non-empty field is a string.
    StringOnly,
    /// Float-looking text becomes a float; everything else, integer-looking
    /// text included, stays a string.
    StringFloat,
    /// Integer-looking text becomes an int, float-looking text a float.
    #[default]
    StringFloatInt,
}

/// A scalar value.
#[derive(Clone, Debug, PartialEq)]
pub enum Mlrval {
    /// Read of something that does not exist. Assigning it is a no-op.
    Absent,
    /// Present but empty text.
    Empty,
    /// Result of an invalid operation; printed as `(error)`.
    Error,
    String(String),
    Int(i64),
    Float(f64),
    Boolean(bool),
}

impl Mlrval {
    /// Text as a string value, with `""` mapped to [`Mlrval::Empty`].
    pub fn from_string(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Mlrval::Empty
        } else {
            Mlrval::String(text)
        }
    }

    /// Types field text according to `mode`.
    pub fn infer(text: &str, mode: TypeInference) -> Self {
        if text.is_empty() {
            return Mlrval::Empty;
        }
        match mode {
            TypeInference::StringOnly => {}
            TypeInference::StringFloat => {
                if parse_int(text).is_none() {
                    if let Some(f) = parse_float(text) {
                        return Mlrval::Float(f);
                    }
                }
            }
            TypeInference::StringFloatInt => {
                if let Some(number) = Self::parse_number(text) {
                    return number;
                }
            }
        }
        Mlrval::String(text.to_owned())
    }

    /// Int if the text is a decimal or `0x` hex integer, else float if it
    /// is float-shaped, else `None`.
    pub fn parse_number(text: &str) -> Option<Self> {
        parse_int(text)
            .map(Mlrval::Int)
            .or_else(|| parse_float(text).map(Mlrval::Float))
    }

    /// Type name as reported by `typeof` and in type-gate errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Mlrval::Absent => "absent",
            Mlrval::Empty => "empty",
            Mlrval::Error => "error",
            Mlrval::String(_) => "string",
            Mlrval::Int(_) => "int",
            Mlrval::Float(_) => "float",
            Mlrval::Boolean(_) => "boolean",
        }
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Mlrval::Absent)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Mlrval::Empty)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Mlrval::Error)
    }

    /// Absent or empty.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Mlrval::Absent | Mlrval::Empty)
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Mlrval::Int(_) | Mlrval::Float(_))
    }

    /// String or empty.
    #[inline]
    pub fn is_string_or_empty(&self) -> bool {
        matches!(self, Mlrval::String(_) | Mlrval::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Mlrval::Int(i) => Some(*i as f64),
            Mlrval::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Mlrval::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Booleans, plus the texts `true`/`false` as they arrive from data.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Mlrval::Boolean(b) => Some(*b),
            Mlrval::String(s) if s == "true" => Some(true),
            Mlrval::String(s) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// Text of a string value without allocating.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Mlrval::String(s) => Some(s),
            Mlrval::Empty => Some(""),
            _ => None,
        }
    }

    /// The map-key form of this value. Absent, empty and error values
    /// cannot be keys.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Mlrval::Absent | Mlrval::Empty | Mlrval::Error => None,
            other => Some(other.to_string()),
        }
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        // Full 64-bit hex patterns wrap to negatives.
        #[allow(clippy::cast_possible_wrap)]
        let value = u64::from_str_radix(hex, 16).ok()? as i64;
        return Some(if negative { value.wrapping_neg() } else { value });
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_float(text: &str) -> Option<f64> {
    // Rejects "inf", "NaN" and friends, which `f64::from_str` accepts.
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Shortest text that reads back as the same float.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        (if value > 0.0 { "+Inf" } else { "-Inf" }).to_owned()
    } else {
        value.to_string()
    }
}

impl fmt::Display for Mlrval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mlrval::Absent | Mlrval::Empty => Ok(()),
            Mlrval::Error => f.write_str("(error)"),
            Mlrval::String(s) => f.write_str(s),
            Mlrval::Int(i) => write!(f, "{i}"),
            Mlrval::Float(x) => f.write_str(&format_float(*x)),
            Mlrval::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Mlrval {
    fn from(value: i64) -> Self {
        Mlrval::Int(value)
    }
}

impl From<f64> for Mlrval {
    fn from(value: f64) -> Self {
        Mlrval::Float(value)
    }
}

impl From<bool> for Mlrval {
    fn from(value: bool) -> Self {
        Mlrval::Boolean(value)
    }
}

impl From<&str> for Mlrval {
    fn from(value: &str) -> Self {
        Mlrval::from_string(value)
    }
}

impl From<String> for Mlrval {
    fn from(value: String) -> Self {
        Mlrval::from_string(value)
    }
}
