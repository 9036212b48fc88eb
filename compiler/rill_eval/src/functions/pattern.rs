//! Regex built-ins and capture handling.

use regex::{Regex, RegexBuilder};
use rill_core::Mlrval;

use crate::errors::{CompileError, CompileResult};

/// Captures `\0` (whole match) through `\9`.
pub const CAPTURE_COUNT: usize = 10;

pub fn compile_regex(pattern: &str, case_insensitive: bool) -> CompileResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|err| CompileError::InvalidRegex {
            pattern: pattern.to_owned(),
            message: err.to_string(),
        })
}

/// `\0`..`\9` for the first match of `regex` in `subject`; groups that did
/// not participate are empty strings.
pub fn regex_captures(regex: &Regex, subject: &str) -> Option<Vec<String>> {
    let captures = regex.captures(subject)?;
    Some(
        (0..CAPTURE_COUNT)
            .map(|i| captures.get(i).map_or_else(String::new, |m| m.as_str().to_owned()))
            .collect(),
    )
}

/// Replaces each `\N` in `text` with capture `N`.
pub fn substitute_captures(text: &str, captures: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                chars.next();
                if let Some(capture) = captures.get(digit as usize) {
                    out.push_str(capture);
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Rewrites `\N` back-references into the regex crate's `${N}` form and
/// escapes literal `$`.
fn replacement_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' if chars.peek().is_some_and(char::is_ascii_digit) => {
                out.push_str("${");
                if let Some(digit) = chars.next() {
                    out.push(digit);
                }
                out.push('}');
            }
            c => out.push(c),
        }
    }
    out
}

pub fn sub(subject: &str, regex: &Regex, replacement: &Mlrval) -> Mlrval {
    let template = replacement_template(&replacement.to_string());
    Mlrval::from_string(regex.replacen(subject, 1, template.as_str()).into_owned())
}

pub fn gsub(subject: &str, regex: &Regex, replacement: &Mlrval) -> Mlrval {
    let template = replacement_template(&replacement.to_string());
    Mlrval::from_string(regex.replace_all(subject, template.as_str()).into_owned())
}

pub fn regextract(subject: &str, regex: &Regex) -> Mlrval {
    regex
        .find(subject)
        .map_or(Mlrval::Error, |m| Mlrval::from_string(m.as_str()))
}

pub fn regextract_or_else(subject: &str, regex: &Regex, otherwise: &Mlrval) -> Mlrval {
    regex
        .find(subject)
        .map_or_else(|| otherwise.clone(), |m| Mlrval::from_string(m.as_str()))
}
