use crate::foundation::error::{ReviewError, ReviewResult};
use crate::overscan::parse::parse_overscan;
use crate::overscan::value::OverscanValue;

/// An overscan expression applied to a concrete input resolution.
///
/// For an input of 2000x1000:
///
/// | Expression      | Output    |
/// |-----------------|-----------|
/// | `""`            | 2000x1000 |
/// | `"+100px +120"` | 2100x1120 |
/// | `"-10% -200px"` | 1800x800  |
/// | `"100px 120px"` | 100x120   |
///
/// Unsigned values are absolute sizes, not offsets from the input.
#[derive(Clone, Debug)]
pub struct OverscanCrop {
    input_width: u32,
    input_height: u32,
    width_value: OverscanValue,
    height_value: OverscanValue,
    width: u32,
    height: u32,
    color: String,
    expression: String,
}

impl OverscanCrop {
    /// Parse `expression` and resolve it against `input_width` x `input_height`.
    ///
    /// `color` is the ffmpeg color used for padded areas.
    pub fn new(
        input_width: u32,
        input_height: u32,
        expression: &str,
        color: impl Into<String>,
    ) -> ReviewResult<Self> {
        let (width_value, height_value) = parse_overscan(expression)?;
        let width = width_value.size_for(input_width).ok_or_else(|| {
            ReviewError::degenerate(format!(
                "overscan '{expression}' gives no valid width for input width {input_width}"
            ))
        })?;
        let height = height_value.size_for(input_height).ok_or_else(|| {
            ReviewError::degenerate(format!(
                "overscan '{expression}' gives no valid height for input height {input_height}"
            ))
        })?;
        Ok(Self {
            input_width,
            input_height,
            width_value,
            height_value,
            width,
            height,
            color: color.into(),
            expression: expression.to_string(),
        })
    }

    /// Resolved width before even trimming.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Resolved height before even trimming.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Parsed width and height values.
    pub fn values(&self) -> (OverscanValue, OverscanValue) {
        (self.width_value, self.height_value)
    }

    /// The expression as written.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    fn is_identity(&self) -> bool {
        self.width == self.input_width && self.height == self.input_height
    }

    /// Size of the frame after [`Self::video_filters`] ran: the resolved size trimmed down to
    /// even numbers, or the untouched input size when nothing changes.
    pub fn filtered_size(&self) -> (u32, u32) {
        if self.is_identity() {
            return (self.input_width, self.input_height);
        }
        (even_floor(self.width), even_floor(self.height))
    }

    /// `crop`/`pad` filters producing [`Self::filtered_size`]. Empty when nothing changes.
    pub fn video_filters(&self) -> ReviewResult<Vec<String>> {
        if self.is_identity() {
            return Ok(Vec::new());
        }
        let (width, height) = self.filtered_size();
        if width == 0 || height == 0 {
            return Err(ReviewError::degenerate(format!(
                "overscan '{}' shrinks the image below two pixels",
                self.expression
            )));
        }

        let (iw, ih) = (self.input_width, self.input_height);
        let color = &self.color;
        let filters = if width <= iw && height <= ih {
            vec![format!("crop={width}:{height}")]
        } else if width >= iw && height >= ih {
            vec![format!("pad={width}:{height}:(iw-ow)/2:(ih-oh)/2:{color}")]
        } else if width > iw {
            vec![
                format!("crop=iw:{height}"),
                format!("pad={width}:ih:(iw-ow)/2:(ih-oh)/2:{color}"),
            ]
        } else {
            vec![
                format!("crop={width}:ih"),
                format!("pad=iw:{height}:(iw-ow)/2:(ih-oh)/2:{color}"),
            ]
        };
        Ok(filters)
    }
}

fn even_floor(v: u32) -> u32 {
    v - (v % 2)
}
