use crate::config::model::OutputDefinition;
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::geometry::letterbox::letterbox_filters;
use crate::overscan::crop::OverscanCrop;
use crate::timing::context::RenderContext;

/// Video filters reshaping the input plus the resolution they produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Filters in application order.
    pub filters: Vec<String>,
    /// Output width, always even.
    pub width: u32,
    /// Output height, always even.
    pub height: u32,
}

/// Build the rescaling filter chain for an input of `source_width` x `source_height`.
///
/// Stages run in order, each updating the working input size: pixel aspect, overscan, odd
/// size padding, then scale and pad to the target resolution and the optional letter box.
/// `reformatted` marks inputs already reformatted upstream; they keep square pixels and their
/// own resolution unless the definition sets one.
pub fn rescaling_filters(
    source_width: u32,
    source_height: u32,
    ctx: &RenderContext,
    output_def: &OutputDefinition,
    reformatted: bool,
) -> ReviewResult<Geometry> {
    let mut filters = Vec::new();
    let mut input_width = source_width;
    let mut input_height = source_height;

    let pixel_aspect = if reformatted { 1.0 } else { ctx.pixel_aspect };
    let overscan_color = output_def
        .overscan_color
        .map(|c| c.hex())
        .unwrap_or_else(|| "black".to_string());

    if output_def.scale_pixel_aspect && pixel_aspect != 1.0 {
        input_width = (f64::from(input_width) * pixel_aspect).trunc() as u32;
        if input_width == 0 {
            return Err(ReviewError::degenerate(format!(
                "pixel aspect {pixel_aspect} collapses width {source_width}"
            )));
        }
        filters.push(format!("scale={input_width}x{input_height}:flags=lanczos"));
    }

    let overscan = OverscanCrop::new(
        input_width,
        input_height,
        &output_def.overscan_crop,
        overscan_color.clone(),
    )?;
    let overscan_filters = overscan.video_filters()?;
    if !overscan_filters.is_empty() {
        filters.extend(overscan_filters);
        (input_width, input_height) = overscan.filtered_size();
    }

    let width_is_odd = input_width % 2 != 0;
    let height_is_odd = input_height % 2 != 0;
    if width_is_odd || height_is_odd {
        filters.push("pad=width=ceil(iw/2)*2:height=ceil(ih/2)*2".to_string());
        if width_is_odd {
            tracing::info!(
                from = input_width,
                to = input_width + 1,
                "converting input width from odd to even"
            );
            input_width += 1;
        }
        if height_is_odd {
            tracing::info!(
                from = input_height,
                to = input_height + 1,
                "converting input height from odd to even"
            );
            input_height += 1;
        }
    }

    let instance_resolution = match (ctx.resolution_width, ctx.resolution_height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
        _ => None,
    };
    let (mut output_width, mut output_height) = if output_def.width > 0 && output_def.height > 0 {
        (output_def.width, output_def.height)
    } else if reformatted {
        (source_width, source_height)
    } else if let Some(resolution) = instance_resolution {
        resolution
    } else {
        tracing::debug!("using resolution from input");
        (input_width, input_height)
    };

    if output_width % 2 != 0 {
        tracing::warn!(
            from = output_width,
            to = output_width + 1,
            "converting output width from odd to even"
        );
        output_width += 1;
    }
    if output_height % 2 != 0 {
        tracing::warn!(
            from = output_height,
            to = output_height + 1,
            "converting output height from odd to even"
        );
        output_height += 1;
    }
    tracing::debug!(output_width, output_height, "output resolution");

    let letter_box = &output_def.letter_box;
    if output_width == input_width && output_height == input_height && !letter_box.enabled {
        tracing::debug!("output resolution matches input, skipping reformat");
        return Ok(Geometry {
            filters,
            width: input_width,
            height: input_height,
        });
    }

    if output_width != input_width || output_height != input_height {
        filters.push(format!(
            "scale={output_width}x{output_height}:flags=lanczos:force_original_aspect_ratio=decrease"
        ));
        filters.push(format!(
            "pad={output_width}:{output_height}:(ow-iw)/2:(oh-ih)/2:{overscan_color}"
        ));
        filters.push("setsar=1".to_string());
    }

    if letter_box.enabled {
        filters.extend(letterbox_filters(letter_box, output_width, output_height));
    }

    Ok(Geometry {
        filters,
        width: output_width,
        height: output_height,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/normalize.rs"]
mod tests;
