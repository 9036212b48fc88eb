use rill_core::{format_float, Mlrval};

pub fn strlen(a: &Mlrval) -> Mlrval {
    match a {
        Mlrval::Absent | Mlrval::Error => a.clone(),
        _ => Mlrval::Int(i64::try_from(a.to_string().chars().count()).unwrap_or(i64::MAX)),
    }
}

pub fn toupper(s: &str) -> String {
    s.to_uppercase()
}

pub fn tolower(s: &str) -> String {
    s.to_lowercase()
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn lstrip(s: &str) -> String {
    s.trim_start().to_owned()
}

pub fn rstrip(s: &str) -> String {
    s.trim_end().to_owned()
}

pub fn strip(s: &str) -> String {
    s.trim().to_owned()
}

pub fn clean_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate(s: &Mlrval, n: &Mlrval) -> Mlrval {
    match (s, n) {
        (Mlrval::Absent | Mlrval::Error, _) => s.clone(),
        (_, Mlrval::Int(n)) => match usize::try_from(*n) {
            Ok(n) => Mlrval::from_string(s.to_string().chars().take(n).collect::<String>()),
            Err(_) => Mlrval::Error,
        },
        _ => Mlrval::Error,
    }
}

/// Characters `m` through `n` inclusive, counting from 0.
pub fn substr(s: &Mlrval, m: &Mlrval, n: &Mlrval) -> Mlrval {
    if s.is_absent() || s.is_error() {
        return s.clone();
    }
    let (Some(m), Some(n)) = (m.as_i64(), n.as_i64()) else {
        return Mlrval::Error;
    };
    let chars: Vec<char> = s.to_string().chars().collect();
    match (usize::try_from(m), usize::try_from(n)) {
        (Ok(m), Ok(n)) if m <= n && n < chars.len() => {
            Mlrval::from_string(chars[m..=n].iter().collect::<String>())
        }
        _ => Mlrval::Error,
    }
}

pub fn hexfmt(a: &Mlrval) -> Mlrval {
    match a {
        #[allow(clippy::cast_sign_loss)]
        Mlrval::Int(i) => Mlrval::String(format!("0x{:x}", *i as u64)),
        _ => a.clone(),
    }
}

pub fn fmtnum(value: &Mlrval, format: &Mlrval) -> Mlrval {
    if value.is_absent() || value.is_error() {
        return value.clone();
    }
    if !value.is_numeric() {
        return Mlrval::Error;
    }
    format
        .as_str()
        .and_then(NumberFormat::parse)
        .map_or(Mlrval::Error, |spec| Mlrval::from_string(spec.render(value)))
}

/// Largest width or precision `fmtnum` accepts.
const MAX_FORMAT_WIDTH: usize = 1024;

/// One printf-style conversion with literal text around it.
#[derive(Debug, PartialEq, Eq)]
struct NumberFormat<'a> {
    prefix: &'a str,
    suffix: &'a str,
    left_align: bool,
    zero_pad: bool,
    plus_sign: bool,
    width: usize,
    precision: Option<usize>,
    conversion: u8,
}

impl<'a> NumberFormat<'a> {
    fn parse(format: &'a str) -> Option<Self> {
        let percent = format.find('%')?;
        let bytes = format.as_bytes();
        let mut i = percent + 1;
        let mut spec = NumberFormat {
            prefix: &format[..percent],
            suffix: "",
            left_align: false,
            zero_pad: false,
            plus_sign: false,
            width: 0,
            precision: None,
            conversion: b'f',
        };
        while let Some(&flag) = bytes.get(i) {
            match flag {
                b'-' => spec.left_align = true,
                b'0' => spec.zero_pad = true,
                b'+' => spec.plus_sign = true,
                b' ' => {}
                _ => break,
            }
            i += 1;
        }
        // Missing digits read as zero; anything past the cap rejects the format.
        let digits = |i: &mut usize| {
            let start = *i;
            while bytes.get(*i).is_some_and(u8::is_ascii_digit) {
                *i += 1;
            }
            if start == *i {
                return Some(0);
            }
            format[start..*i]
                .parse::<usize>()
                .ok()
                .filter(|&n| n <= MAX_FORMAT_WIDTH)
        };
        spec.width = digits(&mut i)?;
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            spec.precision = Some(digits(&mut i)?);
        }
        while matches!(bytes.get(i), Some(b'l' | b'h')) {
            i += 1;
        }
        spec.conversion = *bytes.get(i)?;
        if !b"dixXofeEgs".contains(&spec.conversion) {
            return None;
        }
        spec.suffix = &format[i + 1..];
        Some(spec)
    }

    fn render(&self, value: &Mlrval) -> String {
        #[allow(clippy::cast_possible_truncation)]
        let as_int = match value {
            Mlrval::Int(i) => *i,
            other => other.as_f64().unwrap_or(0.0) as i64,
        };
        let as_float = value.as_f64().unwrap_or(0.0);
        let precision = self.precision.unwrap_or(6);
        #[allow(clippy::cast_sign_loss)]
        let mut body = match self.conversion {
            b'd' | b'i' => as_int.to_string(),
            b'x' => format!("{:x}", as_int as u64),
            b'X' => format!("{:X}", as_int as u64),
            b'o' => format!("{:o}", as_int as u64),
            b'e' => exponential(as_float, precision),
            b'E' => exponential(as_float, precision).to_uppercase(),
            b'g' => format_float(as_float),
            b's' => value.to_string(),
            _ => format!("{as_float:.precision$}"),
        };
        let signed = matches!(self.conversion, b'd' | b'i' | b'f' | b'e' | b'E' | b'g');
        if self.plus_sign && signed && !body.starts_with('-') {
            body.insert(0, '+');
        }
        let length = body.chars().count();
        if length < self.width {
            let pad = self.width - length;
            if self.left_align {
                body.push_str(&" ".repeat(pad));
            } else if self.zero_pad && self.conversion != b's' {
                let sign_len = usize::from(body.starts_with(['-', '+']));
                body.insert_str(sign_len, &"0".repeat(pad));
            } else {
                body.insert_str(0, &" ".repeat(pad));
            }
        }
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

/// `1.500000e+03` style, as C prints it.
fn exponential(x: f64, precision: usize) -> String {
    let rust = format!("{x:.precision$e}");
    match rust.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => rust,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn fmt(value: Mlrval, format: &str) -> String {
        fmtnum(&value, &Mlrval::from(format)).to_string()
    }

    #[test]
    fn printf_conversions() {
        assert_eq!(fmt(Mlrval::Float(3.14159), "%.3f"), "3.142");
        assert_eq!(fmt(Mlrval::Float(3.14159), "%.2lf"), "3.14");
        assert_eq!(fmt(Mlrval::Int(17), "%08.3lf"), "0017.000");
        assert_eq!(fmt(Mlrval::Int(-5), "%05d"), "-0005");
        assert_eq!(fmt(Mlrval::Int(42), "%-5d|"), "42   |");
        assert_eq!(fmt(Mlrval::Int(255), "%x"), "ff");
        assert_eq!(fmt(Mlrval::Int(255), "0x%08llx"), "0x000000ff");
        assert_eq!(fmt(Mlrval::Float(1500.0), "%.2e"), "1.50e+03");
        assert_eq!(fmt(Mlrval::Float(2.7), "%d"), "2");
        assert_eq!(fmt(Mlrval::Int(3), "%+d"), "+3");
        assert_eq!(fmt(Mlrval::Int(3), "[%5d]"), "[    3]");
    }

    #[test]
    fn fmtnum_rejects_bad_input() {
        assert!(fmtnum(&Mlrval::from("abc"), &Mlrval::from("%d")).is_error());
        assert!(fmtnum(&Mlrval::Int(1), &Mlrval::from("no percent")).is_error());
        assert!(fmtnum(&Mlrval::Int(1), &Mlrval::from("%q")).is_error());
        assert!(fmtnum(&Mlrval::Absent, &Mlrval::from("%d")).is_absent());
    }

    #[test]
    fn fmtnum_caps_width_and_precision() {
        assert!(fmtnum(&Mlrval::Int(1), &Mlrval::from("%9999999999d")).is_error());
        assert!(fmtnum(&Mlrval::Int(1), &Mlrval::from("%099999999999999999999999d")).is_error());
        assert!(fmtnum(&Mlrval::Float(1.0), &Mlrval::from("%.9999999lf")).is_error());
        let widest = format!("%0{MAX_FORMAT_WIDTH}d");
        assert_eq!(fmt(Mlrval::Int(7), &widest).len(), MAX_FORMAT_WIDTH);
    }

    #[test]
    fn substr_is_inclusive() {
        let s = Mlrval::from("hello");
        assert_eq!(substr(&s, &Mlrval::Int(1), &Mlrval::Int(3)), Mlrval::from("ell"));
        assert!(substr(&s, &Mlrval::Int(3), &Mlrval::Int(9)).is_error());
        assert_eq!(substr(&Mlrval::Int(12345), &Mlrval::Int(0), &Mlrval::Int(1)), Mlrval::from("12"));
    }

    #[test]
    fn whitespace_helpers() {
        assert_eq!(clean_whitespace("  a   b \t c "), "a b c");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(strlen(&Mlrval::from("añb")), Mlrval::Int(3));
    }
}
