//! Compact JSON text output with configurable real precision.
//!
//! `serde_json` always prints reals in shortest round-trip form; the
//! serializer needs `%.{p}g`-style output instead, so value trees are written
//! here and only string escaping is delegated to `serde_json`.

use serde_json::Value;

/// Renders `value` as compact JSON text, printing reals with `precision`
/// significant digits (`0` for the shortest round-trip form).
pub fn to_string(value: &Value, precision: u32) -> String {
    let mut out = String::new();
    write_value(&mut out, value, precision);
    out
}

fn write_value(out: &mut String, value: &Value, precision: u32) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => match n.as_f64() {
            Some(real) if n.is_f64() => out.push_str(&format_real(real, precision)),
            _ => out.push_str(&n.to_string()),
        },
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item, precision);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_str(out, key);
                out.push(':');
                write_value(out, item, precision);
            }
            out.push('}');
        }
    }
}

fn write_str(out: &mut String, s: &str) {
    let plain = s
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b) && b != b'"' && b != b'\\');
    if !plain {
        // serializing a str cannot fail
        out.push_str(&serde_json::to_string(s).unwrap_or_default());
        return;
    }
    out.push('"');
    out.push_str(s);
    out.push('"');
}

/// Formats a finite real like C's `%.{precision}g`, then makes sure the text
/// still reads as a real: `.0` is appended to integral output and the
/// exponent loses its `+` sign and leading zeros (`1e20`, `1.5e-7`).
///
/// `precision == 0` uses the shortest representation that parses back to the
/// same `f64`.
pub fn format_real(value: f64, precision: u32) -> String {
    if precision == 0 {
        return format!("{value:?}");
    }
    let digits = precision as usize;
    let scientific = format!("{:.*e}", digits - 1, value);
    let exponent: i32 = scientific
        .rsplit_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let (mantissa, _) = scientific.split_once('e').unwrap_or((scientific.as_str(), ""));
        return format!("{}e{}", trim_fraction(mantissa), exponent);
    }

    let decimals = (precision as i32 - 1 - exponent) as usize;
    let fixed = format!("{:.*}", decimals, value);
    let mut text = trim_fraction(&fixed).to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn trim_fraction(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.')
}
