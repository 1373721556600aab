//! Numeric token decoding
//!
//! MESA writes its tables through Fortran formatted output. Depending on the
//! compiler, doubles may carry a `D` exponent marker (`1.5D+02`) or, when the
//! exponent needs three digits, lose the marker entirely (`1.234-156`).

use crate::types::Value;
use std::borrow::Cow;

/// Decode one whitespace-free token.
///
/// Integers are tried first, then floats after exponent normalization. A
/// token matching neither grammar is returned unchanged as [`Value::Text`].
/// Integers are bounded by `i64`; larger integer literals decode as floats.
///
/// ```
/// use mesa_core::{decode_token, Value};
///
/// assert_eq!(decode_token("123"), Value::Int(123));
/// assert_eq!(decode_token("1.5D+02"), Value::Float(150.0));
/// assert_eq!(decode_token("abc"), Value::Text("abc".into()));
/// assert_eq!(decode_token("99999999999999999999"), Value::Float(1e20));
/// ```
pub fn decode_token(token: &str) -> Value {
    if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }

    match normalize_exponent(token).parse::<f64>() {
        Ok(f) => Value::Float(f),
        Err(_) => Value::Text(token.to_string()),
    }
}

/// Decode every whitespace-separated token of a line
pub fn decode_line(line: &str) -> Vec<Value> {
    line.split_whitespace().map(decode_token).collect()
}

/// Rewrite Fortran exponent forms into ones `f64::from_str` accepts.
///
/// `D` becomes `E`, and an `E` is inserted between a digit and a directly
/// following sign.
fn normalize_exponent(token: &str) -> Cow<'_, str> {
    let needs_rewrite = token.contains('D')
        || token
            .as_bytes()
            .windows(2)
            .any(|w| w[0].is_ascii_digit() && (w[1] == b'+' || w[1] == b'-'));
    if !needs_rewrite {
        return Cow::Borrowed(token);
    }

    let mut out = String::with_capacity(token.len() + 2);
    let mut prev_digit = false;
    for c in token.chars() {
        match c {
            'D' => out.push('E'),
            '+' | '-' if prev_digit => {
                out.push('E');
                out.push(c);
            }
            _ => out.push(c),
        }
        prev_digit = c.is_ascii_digit();
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(decode_token("123"), Value::Int(123));
        assert_eq!(decode_token("-3"), Value::Int(-3));
        assert_eq!(decode_token("+7"), Value::Int(7));
        assert_eq!(decode_token("0"), Value::Int(0));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        assert_eq!(
            decode_token("99999999999999999999"),
            Value::Float(99999999999999999999.0)
        );
    }

    #[test]
    fn test_fortran_d_exponent() {
        assert_eq!(decode_token("1.5D+02"), Value::Float(150.0));
        assert_eq!(decode_token("-2.5D-01"), Value::Float(-0.25));
        assert_eq!(decode_token("1D3"), Value::Float(1000.0));
    }

    #[test]
    fn test_missing_exponent_marker() {
        assert_eq!(decode_token("1.234-56"), Value::Float(1.234e-56));
        assert_eq!(decode_token("9.87+123"), Value::Float(9.87e123));
        assert_eq!(decode_token("-1.5-100"), Value::Float(-1.5e-100));
    }

    #[test]
    fn test_standard_floats() {
        assert_eq!(decode_token("1.5E+02"), Value::Float(150.0));
        assert_eq!(decode_token("0.5"), Value::Float(0.5));
        assert_eq!(decode_token("-4.25e-3"), Value::Float(-4.25e-3));
    }

    #[test]
    fn test_text_keeps_original_token() {
        assert_eq!(decode_token("abc"), Value::Text("abc".into()));
        assert_eq!(decode_token("\"r22.11.1\""), Value::Text("\"r22.11.1\"".into()));
        // Normalization would produce "2023E-06E-04"; the original survives
        assert_eq!(decode_token("2023-06-04"), Value::Text("2023-06-04".into()));
    }

    #[test]
    fn test_normalize_exponent() {
        assert_eq!(normalize_exponent("1.0"), "1.0");
        assert_eq!(normalize_exponent("1.0D+05"), "1.0E+05");
        assert_eq!(normalize_exponent("1.0-05"), "1.0E-05");
        assert_eq!(normalize_exponent("1.0E-05"), "1.0E-05");
        assert!(matches!(normalize_exponent("-1.0"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_decode_line() {
        let values = decode_line("  1   2.5D0  x ");
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Float(2.5), Value::Text("x".into())]
        );
    }
}
