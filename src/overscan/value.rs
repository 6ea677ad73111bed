use std::fmt;

/// Which side a percent-relative-to-output value was written with (`%+` or `%-`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// `%+`
    Plus,
    /// `%-`
    Minus,
}

impl Sign {
    /// The sign as written.
    pub fn as_char(self) -> char {
        match self {
            Self::Plus => '+',
            Self::Minus => '-',
        }
    }
}

/// One parsed axis of an overscan expression.
///
/// | Text     | Variant                     | Input 2200 |
/// |----------|-----------------------------|------------|
/// | `300px`  | `PixelExplicit(300)`        | 300        |
/// | `10%`    | `PercentExplicit(10)`       | 220        |
/// | `+300px` | `PixelRelative(300)`        | 2500       |
/// | `-10%`   | `PercentRelative(-10)`      | 1980       |
/// | `-10%+`  | `PercentRelativeToOutput`   | 2000       |
///
/// Zero is a no-op for every variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverscanValue {
    /// Absolute size in pixels.
    PixelExplicit(u32),
    /// Percent of the input size.
    PercentExplicit(f64),
    /// Pixels added to the input size.
    PixelRelative(i64),
    /// Percent added to the input size.
    PercentRelative(f64),
    /// The input is larger than the wanted output by `percent` percent of the output.
    PercentRelativeToOutput {
        /// Percent of the output size.
        percent: f64,
        /// Sign written before the number.
        source_sign: Sign,
    },
}

impl OverscanValue {
    /// No-op value.
    pub const IDENTITY: Self = Self::PixelRelative(0);

    /// New size for an axis of `input` pixels.
    ///
    /// `None` when the result is undefined (division by zero) or smaller than one pixel.
    pub fn size_for(self, input: u32) -> Option<u32> {
        let input_f = f64::from(input);
        let out: i64 = match self {
            Self::PixelExplicit(0) => return Some(input),
            Self::PixelExplicit(n) => return Some(n),
            Self::PercentExplicit(p) if p == 0.0 => return Some(input),
            Self::PercentExplicit(p) => (input_f * p / 100.0).round() as i64,
            Self::PixelRelative(delta) => i64::from(input) + delta,
            Self::PercentRelative(p) if p == 0.0 => return Some(input),
            Self::PercentRelative(p) => i64::from(input) + (input_f / 100.0 * p).trunc() as i64,
            Self::PercentRelativeToOutput { percent, .. } if percent == 0.0 => return Some(input),
            Self::PercentRelativeToOutput { percent, .. } => {
                let denominator = 100.0 - percent;
                if denominator == 0.0 {
                    return None;
                }
                (input_f * 100.0 / denominator).trunc() as i64
            }
        };
        u32::try_from(out).ok().filter(|v| *v >= 1)
    }
}

impl fmt::Display for OverscanValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PixelExplicit(n) => write!(f, "{n}px"),
            Self::PercentExplicit(p) => write!(f, "{}%", p.abs()),
            Self::PixelRelative(d) => {
                let sign = if d < 0 { '-' } else { '+' };
                write!(f, "{sign}{}px", d.unsigned_abs())
            }
            Self::PercentRelative(p) => {
                let sign = if p < 0.0 { '-' } else { '+' };
                write!(f, "{sign}{}%", p.abs())
            }
            Self::PercentRelativeToOutput {
                percent,
                source_sign,
            } => {
                let sign = if percent < 0.0 { '-' } else { '+' };
                write!(f, "{sign}{}%{}", percent.abs(), source_sign.as_char())
            }
        }
    }
}
