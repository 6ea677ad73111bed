use crate::foundation::error::{ReviewError, ReviewResult};
use crate::overscan::value::{OverscanValue, Sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    None,
    Pixel,
    Percent,
    PercentToOutput(Sign),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item {
    sign: Option<Sign>,
    digits: u64,
    unit: Unit,
}

/// Parse an overscan expression into `(width, height)` axis values.
///
/// One token applies to both axes, two tokens are width then height. An empty (or
/// whitespace-only) string is the identity on both axes.
pub fn parse_overscan(input: &str) -> ReviewResult<(OverscanValue, OverscanValue)> {
    let lowered = input.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Ok((OverscanValue::IDENTITY, OverscanValue::IDENTITY));
    }

    let err = || ReviewError::OverscanParse {
        input: input.to_string(),
    };

    let bytes = lowered.as_bytes();
    let mut items = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let (item, next) = parse_item(bytes, i).ok_or_else(err)?;
        items.push(item);
        i = next;
    }

    let values = items.into_iter().map(to_value).collect::<Vec<_>>();
    match values.as_slice() {
        [both] => Ok((*both, *both)),
        [w, h] => Ok((*w, *h)),
        _ => Err(err()),
    }
}

fn parse_item(bytes: &[u8], mut i: usize) -> Option<(Item, usize)> {
    let sign = match bytes[i] {
        b'+' => Some(Sign::Plus),
        b'-' => Some(Sign::Minus),
        _ => None,
    };
    if sign.is_some() {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
    }

    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == digits_start {
        return None;
    }
    let digits: u64 = std::str::from_utf8(&bytes[digits_start..i])
        .ok()?
        .parse()
        .ok()?;

    // Units may be separated from the number by spaces.
    let mut j = i;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    let rest = &bytes[j..];
    let unit = if rest.starts_with(b"px") {
        i = j + 2;
        Unit::Pixel
    } else if rest.starts_with(b"%") {
        i = j + 1;
        match bytes.get(i) {
            Some(b'+') => {
                i += 1;
                Unit::PercentToOutput(Sign::Plus)
            }
            Some(b'-') => {
                i += 1;
                Unit::PercentToOutput(Sign::Minus)
            }
            _ => Unit::Percent,
        }
    } else {
        Unit::None
    };

    if i < bytes.len() && !bytes[i].is_ascii_whitespace() {
        return None;
    }
    Some((Item { sign, digits, unit }, i))
}

fn to_value(item: Item) -> OverscanValue {
    let signed = |v: u64| -> f64 {
        match item.sign {
            Some(Sign::Minus) => -(v as f64),
            _ => v as f64,
        }
    };
    match (item.sign, item.unit) {
        (None, Unit::None | Unit::Pixel) => {
            OverscanValue::PixelExplicit(u32::try_from(item.digits).unwrap_or(u32::MAX))
        }
        // An unsigned `%+`/`%-` carries no relation to the input; read it as a plain percent.
        (None, Unit::Percent | Unit::PercentToOutput(_)) => {
            OverscanValue::PercentExplicit(item.digits as f64)
        }
        (Some(_), Unit::None | Unit::Pixel) => {
            let magnitude = i64::try_from(item.digits).unwrap_or(i64::MAX);
            let delta = if item.sign == Some(Sign::Minus) {
                -magnitude
            } else {
                magnitude
            };
            OverscanValue::PixelRelative(delta)
        }
        (Some(_), Unit::Percent) => OverscanValue::PercentRelative(signed(item.digits)),
        (Some(_), Unit::PercentToOutput(source_sign)) => OverscanValue::PercentRelativeToOutput {
            percent: signed(item.digits),
            source_sign,
        },
    }
}
