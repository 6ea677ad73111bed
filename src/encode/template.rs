use serde_json::{Map, Value};

use crate::foundation::core::fmt_float;
use crate::foundation::error::{ReviewError, ReviewResult};

/// Format `{key}` placeholders in `template` from `data`.
///
/// Supports nested lookups (`{project[name]}` or `{project.name}`), `{{`/`}}` escapes and a
/// small format spec: `{frame:04d}`, `{fps:.3f}`, `{name:>8}`. A missing key or unsupported
/// spec is an error; callers decide whether to keep the literal.
pub fn format_template(template: &str, data: &Map<String, Value>) -> ReviewResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some('{') | None => {
                            return Err(ReviewError::validation(format!(
                                "unterminated placeholder in '{template}'"
                            )));
                        }
                        Some(ch) => field.push(ch),
                    }
                }
                out.push_str(&render_field(&field, data, template)?);
            }
            '}' => {
                return Err(ReviewError::validation(format!(
                    "single '}}' in '{template}'"
                )));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn render_field(field: &str, data: &Map<String, Value>, template: &str) -> ReviewResult<String> {
    let (path, spec) = match field.split_once(':') {
        Some((path, spec)) => (path, spec),
        None => (field, ""),
    };
    let value = lookup(path, data).ok_or_else(|| {
        ReviewError::validation(format!("key '{path}' not found for '{template}'"))
    })?;
    apply_spec(value, spec).ok_or_else(|| {
        ReviewError::validation(format!(
            "format spec '{spec}' does not apply to '{path}' in '{template}'"
        ))
    })
}

fn lookup<'a>(path: &str, data: &'a Map<String, Value>) -> Option<&'a Value> {
    let mut keys = path
        .split(['.', '[', ']'])
        .filter(|k| !k.is_empty());
    let mut current = data.get(keys.next()?)?;
    for key in keys {
        current = match current {
            Value::Object(map) => map.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(fmt_float).unwrap_or_else(|| n.to_string()),
        },
        other => other.to_string(),
    }
}

fn apply_spec(value: &Value, spec: &str) -> Option<String> {
    if spec.is_empty() {
        return Some(plain(value));
    }

    let mut rest = spec;
    let mut align = None;
    if let Some(first) = rest.chars().next()
        && matches!(first, '<' | '>')
    {
        align = Some(first);
        rest = &rest[1..];
    }
    let zero = rest.starts_with('0');
    let width_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let width: usize = if width_len == 0 {
        0
    } else {
        rest[..width_len].parse().ok()?
    };
    rest = &rest[width_len..];

    let mut precision = None;
    if let Some(after_dot) = rest.strip_prefix('.') {
        let digits = after_dot.bytes().take_while(u8::is_ascii_digit).count();
        precision = Some(after_dot[..digits].parse::<usize>().ok()?);
        rest = &after_dot[digits..];
    }

    let body = match rest {
        "d" => value.as_i64()?.to_string(),
        "f" => format!("{:.*}", precision.unwrap_or(6), value.as_f64()?),
        "s" | "" => match precision {
            Some(p) if matches!(value, Value::Number(_)) => {
                format!("{:.*}", p, value.as_f64()?)
            }
            _ => plain(value),
        },
        _ => return None,
    };

    let numeric = matches!(value, Value::Number(_));
    let padded = match (align, zero && numeric) {
        (None, true) => {
            let (sign, digits) = match body.strip_prefix('-') {
                Some(d) => ("-", d),
                None => ("", body.as_str()),
            };
            let pad = width.saturating_sub(body.len());
            format!("{sign}{}{digits}", "0".repeat(pad))
        }
        (Some('<'), _) => format!("{body:<width$}"),
        (Some('>'), _) => format!("{body:>width$}"),
        _ if numeric => format!("{body:>width$}"),
        _ => format!("{body:<width$}"),
    };
    Some(padded)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/template.rs"]
mod tests;
