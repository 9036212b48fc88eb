//! Built-in function library.
//!
//! Every built-in, operators included, is a [`FunctionDescriptor`]: a name
//! plus a plain function pointer of one fixed signature. The compiler picks
//! a descriptor by name and argument count and never looks inside the body.
//!
//! Typed signatures (`FloatUnary`, `StringUnary`, ...) share the null
//! handling of [`FunctionBody::call`]: absent in gives absent out, error in
//! gives error out, and a value of the wrong type gives error.

use std::fmt;

use regex::Regex;
use rill_core::Mlrval;

use crate::errors::{wrong_arity, CompileError, CompileResult};

mod arithmetic;
mod math;
mod pattern;
mod strings;
mod types;

pub use arithmetic::null_disposition;
pub use pattern::{compile_regex, regex_captures, substitute_captures};

/// How many arguments a function takes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// A built-in's implementation, by signature.
#[derive(Copy, Clone)]
pub enum FunctionBody {
    Zary(fn() -> Mlrval),
    /// Any value in, any value out; does its own null handling.
    Unary(fn(&Mlrval) -> Mlrval),
    Binary(fn(&Mlrval, &Mlrval) -> Mlrval),
    Ternary(fn(&Mlrval, &Mlrval, &Mlrval) -> Mlrval),
    Variadic(fn(&[Mlrval]) -> Mlrval),
    /// Number in, float out.
    FloatUnary(fn(f64) -> f64),
    /// Two ints in.
    IntBinary(fn(i64, i64) -> Mlrval),
    /// Text in, text out.
    StringUnary(fn(&str) -> String),
    BooleanUnary(fn(bool) -> bool),
    /// Subject string and a regex.
    RegexBinary(fn(&str, &Regex) -> Mlrval),
    /// Subject string, a regex, and a third argument.
    RegexTernary(fn(&str, &Regex, &Mlrval) -> Mlrval),
}

impl FunctionBody {
    pub fn arity(self) -> Arity {
        match self {
            FunctionBody::Zary(_) => Arity::Exactly(0),
            FunctionBody::Unary(_)
            | FunctionBody::FloatUnary(_)
            | FunctionBody::StringUnary(_)
            | FunctionBody::BooleanUnary(_) => Arity::Exactly(1),
            FunctionBody::Binary(_) | FunctionBody::IntBinary(_) | FunctionBody::RegexBinary(_) => {
                Arity::Exactly(2)
            }
            FunctionBody::Ternary(_) | FunctionBody::RegexTernary(_) => Arity::Exactly(3),
            FunctionBody::Variadic(_) => Arity::AtLeast(0),
        }
    }

    /// Whether the second argument is a regex rather than a value.
    pub fn takes_regex(self) -> bool {
        matches!(self, FunctionBody::RegexBinary(_) | FunctionBody::RegexTernary(_))
    }

    /// Applies a non-regex body to already-evaluated arguments.
    ///
    /// The argument count has been checked at compile time.
    pub fn call(self, args: &[Mlrval]) -> Mlrval {
        match (self, args) {
            (FunctionBody::Zary(f), []) => f(),
            (FunctionBody::Unary(f), [a]) => f(a),
            (FunctionBody::Binary(f), [a, b]) => f(a, b),
            (FunctionBody::Ternary(f), [a, b, c]) => f(a, b, c),
            (FunctionBody::Variadic(f), args) => f(args),
            (FunctionBody::FloatUnary(f), [a]) => match a {
                Mlrval::Absent | Mlrval::Empty | Mlrval::Error => a.clone(),
                _ => a.as_f64().map_or(Mlrval::Error, |x| Mlrval::Float(f(x))),
            },
            (FunctionBody::IntBinary(f), [a, b]) => {
                if let Some(disposed) = null_disposition(a, b) {
                    return disposed;
                }
                match (a, b) {
                    (Mlrval::Int(x), Mlrval::Int(y)) => f(*x, *y),
                    _ => Mlrval::Error,
                }
            }
            (FunctionBody::StringUnary(f), [a]) => match a {
                Mlrval::Absent | Mlrval::Error => a.clone(),
                _ => Mlrval::from_string(f(&a.to_string())),
            },
            (FunctionBody::BooleanUnary(f), [a]) => match a {
                Mlrval::Absent | Mlrval::Error => a.clone(),
                _ => a.as_bool().map_or(Mlrval::Error, |b| Mlrval::Boolean(f(b))),
            },
            _ => rill_core::internal_coding_error("built-in called with mismatched signature"),
        }
    }

    /// Applies a regex body. `input` and `third` are the evaluated
    /// non-regex arguments.
    pub fn call_with_regex(self, input: &Mlrval, regex: &Regex, third: Option<&Mlrval>) -> Mlrval {
        if input.is_absent() || input.is_error() {
            return input.clone();
        }
        let subject = input.to_string();
        match (self, third) {
            (FunctionBody::RegexBinary(f), None) => f(&subject, regex),
            (FunctionBody::RegexTernary(f), Some(third)) => match third {
                Mlrval::Absent | Mlrval::Error => third.clone(),
                _ => f(&subject, regex, third),
            },
            _ => rill_core::internal_coding_error("regex built-in called with mismatched signature"),
        }
    }
}

/// One built-in function.
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub body: FunctionBody,
    pub help: &'static str,
}

impl fmt::Debug for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDescriptor")
            .field("name", &self.name)
            .field("arity", &self.body.arity())
            .finish_non_exhaustive()
    }
}

macro_rules! builtin {
    ($name:literal, $kind:ident($f:path), $help:literal) => {
        FunctionDescriptor {
            name: $name,
            body: FunctionBody::$kind($f),
            help: $help,
        }
    };
}

/// The full built-in table. Operators share names across arities (`-` is
/// both negation and subtraction).
pub static BUILTINS: &[FunctionDescriptor] = &[
    // Arithmetic operators
    builtin!("+", Binary(arithmetic::plus), "Addition. Int overflow gives float."),
    builtin!("+", Unary(arithmetic::unary_plus), "Unary plus."),
    builtin!("-", Binary(arithmetic::minus), "Subtraction."),
    builtin!("-", Unary(arithmetic::negate), "Unary minus."),
    builtin!("*", Binary(arithmetic::times), "Multiplication."),
    builtin!("/", Binary(arithmetic::divide), "Division. Int when exact, else float."),
    builtin!("//", Binary(arithmetic::int_divide), "Floor division."),
    builtin!("%", Binary(arithmetic::modulus), "Remainder, with the sign of the divisor."),
    builtin!("**", Binary(arithmetic::power), "Exponentiation."),
    builtin!(".", Binary(arithmetic::dot), "String concatenation."),
    builtin!("&", IntBinary(arithmetic::bit_and), "Bitwise AND."),
    builtin!("|", IntBinary(arithmetic::bit_or), "Bitwise OR."),
    builtin!("^", IntBinary(arithmetic::bit_xor), "Bitwise XOR."),
    builtin!("<<", IntBinary(arithmetic::shift_left), "Left shift."),
    builtin!(">>", IntBinary(arithmetic::shift_right), "Arithmetic right shift."),
    builtin!("~", Unary(arithmetic::bit_not), "Bitwise NOT."),
    builtin!("!", BooleanUnary(arithmetic::logical_not), "Logical NOT."),
    builtin!("??", Binary(arithmetic::absent_coalesce), "First operand unless absent."),
    builtin!("???", Binary(arithmetic::absent_error_coalesce), "First operand unless absent or error."),
    // Comparison operators
    builtin!("==", Binary(arithmetic::equals), "Equality."),
    builtin!("!=", Binary(arithmetic::not_equals), "Inequality."),
    builtin!("<", Binary(arithmetic::less_than), "Less than."),
    builtin!("<=", Binary(arithmetic::less_equal), "Less than or equal."),
    builtin!(">", Binary(arithmetic::greater_than), "Greater than."),
    builtin!(">=", Binary(arithmetic::greater_equal), "Greater than or equal."),
    // Math
    builtin!("abs", Unary(math::abs), "Absolute value."),
    builtin!("ceiling", Unary(math::ceiling), "Round up to an integer value."),
    builtin!("floor", Unary(math::floor), "Round down to an integer value."),
    builtin!("round", Unary(math::round), "Round to nearest integer value."),
    builtin!("roundm", Binary(math::roundm), "Round to nearest multiple of m."),
    builtin!("sgn", Unary(math::sgn), "+1, 0 or -1 by sign."),
    builtin!("min", Variadic(math::min), "Minimum; numbers sort before strings."),
    builtin!("max", Variadic(math::max), "Maximum; strings sort after numbers."),
    builtin!("exp", FloatUnary(f64::exp), "e to the x."),
    builtin!("expm1", FloatUnary(f64::exp_m1), "e to the x, minus 1."),
    builtin!("log", FloatUnary(f64::ln), "Natural logarithm."),
    builtin!("log10", FloatUnary(f64::log10), "Base-10 logarithm."),
    builtin!("log1p", FloatUnary(f64::ln_1p), "Natural logarithm of 1 + x."),
    builtin!("sqrt", FloatUnary(f64::sqrt), "Square root."),
    builtin!("cbrt", FloatUnary(f64::cbrt), "Cube root."),
    builtin!("sin", FloatUnary(f64::sin), "Sine."),
    builtin!("cos", FloatUnary(f64::cos), "Cosine."),
    builtin!("tan", FloatUnary(f64::tan), "Tangent."),
    builtin!("asin", FloatUnary(f64::asin), "Inverse sine."),
    builtin!("acos", FloatUnary(f64::acos), "Inverse cosine."),
    builtin!("atan", FloatUnary(f64::atan), "Inverse tangent."),
    builtin!("atan2", Binary(math::atan2), "Two-argument inverse tangent."),
    // Strings
    builtin!("strlen", Unary(strings::strlen), "String length in characters."),
    builtin!("toupper", StringUnary(strings::toupper), "Upper-case."),
    builtin!("tolower", StringUnary(strings::tolower), "Lower-case."),
    builtin!("capitalize", StringUnary(strings::capitalize), "Upper-case the first character."),
    builtin!("lstrip", StringUnary(strings::lstrip), "Strip leading whitespace."),
    builtin!("rstrip", StringUnary(strings::rstrip), "Strip trailing whitespace."),
    builtin!("strip", StringUnary(strings::strip), "Strip leading and trailing whitespace."),
    builtin!("clean_whitespace", StringUnary(strings::clean_whitespace), "Strip, and collapse inner whitespace runs."),
    builtin!("truncate", Binary(strings::truncate), "First n characters."),
    builtin!("substr", Ternary(strings::substr), "Characters m through n inclusive, 0-up."),
    builtin!("fmtnum", Binary(strings::fmtnum), "printf-style numeric formatting."),
    builtin!("hexfmt", Unary(strings::hexfmt), "Int as 0x-prefixed hex."),
    // Regexes
    builtin!("sub", RegexTernary(pattern::sub), "Replace the first match; \\1 refers to captures."),
    builtin!("gsub", RegexTernary(pattern::gsub), "Replace every match."),
    builtin!("regextract", RegexBinary(pattern::regextract), "First match, or error."),
    builtin!("regextract_or_else", RegexTernary(pattern::regextract_or_else), "First match, or the third argument."),
    // Types
    builtin!("typeof", Unary(types::type_of), "Type name of the value."),
    builtin!("is_absent", Unary(types::is_absent), "True for absent."),
    builtin!("is_present", Unary(types::is_present), "False for absent."),
    builtin!("is_empty", Unary(types::is_empty), "True for empty."),
    builtin!("is_not_empty", Unary(types::is_not_empty), "True for present, non-empty values."),
    builtin!("is_string", Unary(types::is_string), "True for string or empty."),
    builtin!("is_numeric", Unary(types::is_numeric), "True for int or float."),
    builtin!("is_int", Unary(types::is_int), "True for int."),
    builtin!("is_float", Unary(types::is_float), "True for float."),
    builtin!("is_boolean", Unary(types::is_boolean), "True for boolean."),
    builtin!("is_error", Unary(types::is_error), "True for error."),
    builtin!("boolean", Unary(types::to_boolean), "Convert to boolean."),
    builtin!("int", Unary(types::to_int), "Convert to int, truncating floats."),
    builtin!("float", Unary(types::to_float), "Convert to float."),
    builtin!("string", Unary(types::to_string), "Convert to string."),
    // System
    builtin!("systime", Zary(types::systime), "Seconds since the epoch, as a float."),
    builtin!("systimeint", Zary(types::systimeint), "Seconds since the epoch, as an int."),
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|f| f.name == name)
}

/// The built-in named `name` that accepts `arg_count` arguments.
pub fn lookup(name: &str, arg_count: usize) -> CompileResult<&'static FunctionDescriptor> {
    let mut arities = Vec::new();
    for descriptor in BUILTINS.iter().filter(|f| f.name == name) {
        let arity = descriptor.body.arity();
        if arity.accepts(arg_count) {
            return Ok(descriptor);
        }
        arities.push(arity.to_string());
    }
    if arities.is_empty() {
        Err(CompileError::UnknownFunction {
            name: name.to_owned(),
        })
    } else {
        Err(wrong_arity(name, arities.join(" or "), arg_count))
    }
}
