use std::path::Path;

use regex::Regex;

use crate::config::model::{OutputDefinition, OutputProfile, SingleFrameFilter};
use crate::config::tags::Tag;
use crate::foundation::core::path_ext;
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::publish::model::Representation;

/// Input extensions review extraction can read.
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &[
    "exr", "jpg", "jpeg", "png", "dpx", "tga", "tiff", "tif", "mov", "mp4",
];

/// Extensions treated as still images when deciding single-frame inputs.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "ani", "anim", "apng", "art", "bmp", "bpg", "bsave", "cal", "cin", "cpc", "cpt", "dds",
    "dng", "dpx", "ecw", "exr", "fits", "flic", "flif", "fpx", "gif", "hdri", "hevc", "icer",
    "icns", "ico", "cur", "ics", "ilbm", "jbig", "jbig2", "jng", "jpeg", "jpeg-ls", "jpeg-hdr",
    "2000", "jpg", "kra", "logluv", "mng", "miff", "nrrd", "ora", "pam", "pbm", "pgm", "ppm",
    "pnm", "pcx", "pgf", "pictor", "png", "psd", "psb", "psp", "qtvr", "ras", "rgbe", "sgi",
    "sxr", "tga", "tif", "tiff", "ufo", "ufp", "wbmp", "webp", "xr", "xt", "xbm", "xcf", "xpm",
    "xwd",
];

/// First profile whose host and product type filters accept the values.
pub fn select_profile<'a>(
    profiles: &'a [OutputProfile],
    host_name: &str,
    product_type: &str,
) -> Option<&'a OutputProfile> {
    let accepts = |filter: &[String], value: &str| filter.is_empty() || filter.iter().any(|f| f == value);
    profiles
        .iter()
        .find(|p| accepts(&p.hosts, host_name) && accepts(&p.product_types, product_type))
}

/// Output definitions of `profile` whose family and product name filters match.
///
/// A later definition with an already used name replaces the earlier one in place.
pub fn filter_output_defs<'a>(
    profile: &'a OutputProfile,
    product_name: Option<&str>,
    families: &[String],
) -> ReviewResult<Vec<&'a OutputDefinition>> {
    let mut out: Vec<&'a OutputDefinition> = Vec::new();
    for output_def in &profile.outputs {
        if let Some(filter) = &output_def.filter {
            if !families_match(families, &filter.families) {
                continue;
            }
            let patterns: Vec<&String> =
                filter.product_names.iter().filter(|p| !p.is_empty()).collect();
            if let Some(product_name) = product_name
                && !patterns.is_empty()
            {
                let mut matched = false;
                for pattern in patterns {
                    let re = Regex::new(pattern).map_err(|e| {
                        ReviewError::validation(format!(
                            "invalid product name filter '{pattern}': {e}"
                        ))
                    })?;
                    if re.is_match(product_name) {
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    continue;
                }
            }
        }

        match out.iter().position(|d| d.name == output_def.name) {
            Some(idx) => out[idx] = output_def,
            None => out.push(output_def),
        }
    }
    Ok(out)
}

/// `true` when the filter is empty or shares a family with the instance (case-insensitive).
pub fn families_match(families: &[String], filter: &[String]) -> bool {
    let filter: Vec<String> = filter
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.to_lowercase())
        .collect();
    filter.is_empty()
        || families
            .iter()
            .any(|family| filter.contains(&family.to_lowercase()))
}

/// Why `repre` is not a review source, or `None` when it is.
pub fn review_skip_reason(repre: &Representation) -> Option<String> {
    if !repre.has_tag(&Tag::Review) {
        return Some("no \"review\" tag".to_string());
    }
    if repre.has_tag(&Tag::Thumbnail) {
        return Some("tagged \"thumbnail\"".to_string());
    }
    if repre.has_tag(&Tag::Passing) {
        return Some("tagged \"passing\"".to_string());
    }
    let ext = repre.normalized_ext();
    if !SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str()) {
        return Some(format!("unsupported extension \"{ext}\""));
    }
    None
}

/// Definitions whose custom tag filter is empty or shares a tag with `custom_tags`.
pub fn filter_by_custom_tags<'a>(
    defs: &[&'a OutputDefinition],
    custom_tags: &[String],
) -> Vec<&'a OutputDefinition> {
    let repre_tags: Vec<String> = custom_tags.iter().map(|t| t.to_lowercase()).collect();
    defs.iter()
        .copied()
        .filter(|def| {
            let filter = def
                .filter
                .as_ref()
                .map(|f| f.custom_tags.as_slice())
                .unwrap_or_default();
            filter.is_empty()
                || filter
                    .iter()
                    .any(|tag| repre_tags.contains(&tag.to_lowercase()))
        })
        .collect()
}

/// `true` when the input is exactly one still image.
///
/// Only the file count matters: a sequence representation holding one frame counts as a
/// single image too.
pub fn is_single_frame_image<P: AsRef<Path>>(input_paths: &[P]) -> bool {
    match input_paths {
        [only] => IMAGE_EXTENSIONS.contains(&path_ext(only.as_ref()).as_str()),
        _ => false,
    }
}

/// Drop definitions restricted to the other kind of input.
pub fn single_frame_filter<'a, P: AsRef<Path>>(
    input_paths: &[P],
    defs: &[&'a OutputDefinition],
) -> Vec<&'a OutputDefinition> {
    let single = is_single_frame_image(input_paths);
    defs.iter()
        .copied()
        .filter(|def| {
            match def.filter.as_ref().and_then(|f| f.single_frame_filter) {
                Some(SingleFrameFilter::SingleFrame) => single,
                Some(SingleFrameFilter::MultiFrame) => !single,
                None => true,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/config/resolve.rs"]
mod tests;
