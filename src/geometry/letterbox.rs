use crate::config::model::LetterBox;
use crate::foundation::core::{RgbaColor, fmt_float};

/// `drawbox` filters masking a `width` x `height` frame down to the letter box ratio.
///
/// Wider frames get pillar boxes on the sides, taller ones letter boxes top and bottom. Nothing
/// is drawn when the frame ratio already matches at three decimals.
pub fn letterbox_filters(letter_box: &LetterBox, width: u32, height: u32) -> Vec<String> {
    let ratio = letter_box.ratio;
    let output_ratio = f64::from(width) / f64::from(height);
    tracing::debug!(output_ratio, ratio, "letter box ratios");

    if format!("{output_ratio:.3}") == format!("{ratio:.3}") {
        return Vec::new();
    }
    let pillar = output_ratio > ratio;

    let w = width;
    let h = height;
    let r = fmt_float(ratio);
    let t = letter_box.line_thickness;
    let fill = color(letter_box.fill_color);
    let line = color(letter_box.line_color);
    let draw_fill = letter_box.fill_color.a > 0.0;
    let draw_lines = letter_box.line_color.a > 0.0 && t > 0;

    let mut out = Vec::new();
    if pillar {
        let side = format!("round(({w}-({h}*{r}))/2)");
        if draw_fill {
            out.push(format!("drawbox=0:0:{side}:{h}:t=fill:c={fill}"));
            out.push(format!("drawbox={w}-{side}:0:{side}:{h}:t=fill:c={fill}"));
        }
        if draw_lines {
            out.push(format!("drawbox={side}:0:{t}:{h}:t=fill:c={line}"));
            out.push(format!("drawbox={w}-{side}:0:{t}:{h}:t=fill:c={line}"));
        }
    } else {
        let bar = format!("round(({h}-({w}/{r}))/2)");
        if draw_fill {
            out.push(format!("drawbox=0:0:{w}:{bar}:t=fill:c={fill}"));
            out.push(format!("drawbox=0:{h}-{bar}:{w}:{bar}:t=fill:c={fill}"));
        }
        if draw_lines {
            out.push(format!("drawbox=0:{bar}-{t}:{w}:{t}:t=fill:c={line}"));
            out.push(format!("drawbox=0:{h}-{bar}:{w}:{t}:t=fill:c={line}"));
        }
    }
    out
}

fn color(c: RgbaColor) -> String {
    format!("{}@{}", c.hex_rgb(), fmt_float(c.a))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/letterbox.rs"]
mod tests;
