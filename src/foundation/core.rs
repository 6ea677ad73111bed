use crate::foundation::error::{ReviewError, ReviewResult};

/// Straight RGB color with an alpha in `0.0..=1.0`, stored in settings as `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "(u8, u8, u8, f64)", into = "(u8, u8, u8, f64)")]
pub struct RgbaColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha, `0.0..=1.0`.
    pub a: f64,
}

impl RgbaColor {
    /// Color from components.
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// `RRGGBB` without a leading `#`.
    pub fn hex_rgb(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for RgbaColor {
    fn default() -> Self {
        Self::new(0, 0, 0, 0.0)
    }
}

impl From<(u8, u8, u8, f64)> for RgbaColor {
    fn from((r, g, b, a): (u8, u8, u8, f64)) -> Self {
        Self { r, g, b, a }
    }
}

impl From<RgbaColor> for (u8, u8, u8, f64) {
    fn from(c: RgbaColor) -> Self {
        (c.r, c.g, c.b, c.a)
    }
}

/// Opaque RGB color. Accepts `[r, g, b]` or the legacy `[r, g, b, a]` form (alpha ignored).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RgbColor {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl RgbColor {
    /// Color from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB`, the form ffmpeg accepts as a filter color.
    pub fn hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<Vec<f64>> for RgbColor {
    type Error = ReviewError;

    fn try_from(values: Vec<f64>) -> ReviewResult<Self> {
        if values.len() != 3 && values.len() != 4 {
            return Err(ReviewError::validation(format!(
                "color must have 3 or 4 components, got {}",
                values.len()
            )));
        }
        let channel = |v: f64| -> ReviewResult<u8> {
            if !(0.0..=255.0).contains(&v) {
                return Err(ReviewError::validation(format!(
                    "color component {v} is out of 0..=255"
                )));
            }
            Ok(v.round() as u8)
        };
        Ok(Self {
            r: channel(values[0])?,
            g: channel(values[1])?,
            b: channel(values[2])?,
        })
    }
}

impl From<RgbColor> for Vec<f64> {
    fn from(c: RgbColor) -> Self {
        vec![f64::from(c.r), f64::from(c.g), f64::from(c.b)]
    }
}

/// Render a float the way settings authors expect to read it back: shortest round-trip form,
/// always with a fractional part (`25.0`, `0.04`, `2.35`).
pub fn fmt_float(v: f64) -> String {
    let s = format!("{v}");
    if v.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

/// Render `v` with at most `digits` significant digits, trailing zeros trimmed.
pub fn fmt_significant(v: f64, digits: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return fmt_float(v);
    }
    let magnitude = v.abs().log10().floor() as i64;
    let decimals = (digits as i64 - 1 - magnitude).max(0) as usize;
    let s = format!("{v:.decimals$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// Quote a single argument for a shell command line. Arguments without whitespace or quotes
/// are returned unchanged.
pub fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"') {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\\\""))
}

/// Lower-case extension without the leading dot.
pub fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

/// Extension of `path` (lower-case, no dot) or an empty string.
pub fn path_ext(path: &std::path::Path) -> String {
    path.extension()
        .map(|e| normalize_ext(&e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
