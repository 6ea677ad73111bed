use super::*;
use crate::config::model::LetterBox;
use crate::foundation::core::RgbColor;

fn ctx(pixel_aspect: f64, resolution: Option<(u32, u32)>) -> RenderContext {
    RenderContext {
        frame_start: 1001,
        frame_end: 1010,
        handle_start: 0,
        handle_end: 0,
        frame_start_handle: 1001,
        frame_end_handle: 1010,
        output_frame_start: 1001,
        output_frame_end: 1010,
        fps: 25.0,
        pixel_aspect,
        resolution_width: resolution.map(|r| r.0),
        resolution_height: resolution.map(|r| r.1),
        input_is_sequence: false,
        first_sequence_frame: None,
        input_allow_bg: false,
        with_audio: false,
        without_handles: false,
        handles_are_set: false,
    }
}

fn def() -> OutputDefinition {
    OutputDefinition {
        name: "h264".into(),
        ..OutputDefinition::default()
    }
}

#[test]
fn matching_resolution_emits_no_filters_but_keeps_resolution() {
    let geo = rescaling_filters(1920, 1080, &ctx(1.0, None), &def(), false).unwrap();
    assert!(geo.filters.is_empty());
    assert_eq!((geo.width, geo.height), (1920, 1080));

    let geo =
        rescaling_filters(1920, 1080, &ctx(1.0, Some((1920, 1080))), &def(), false).unwrap();
    assert!(geo.filters.is_empty());
}

#[test]
fn definition_resolution_scales_and_pads() {
    let mut d = def();
    d.width = 1920;
    d.height = 1080;
    let geo = rescaling_filters(2048, 1152, &ctx(1.0, Some((1000, 500))), &d, false).unwrap();
    assert_eq!(
        geo.filters,
        vec![
            "scale=1920x1080:flags=lanczos:force_original_aspect_ratio=decrease",
            "pad=1920:1080:(ow-iw)/2:(oh-ih)/2:black",
            "setsar=1",
        ]
    );
    assert_eq!((geo.width, geo.height), (1920, 1080));
}

#[test]
fn instance_resolution_used_when_definition_unset() {
    let mut d = def();
    d.overscan_color = Some(RgbColor::new(255, 0, 0));
    let geo = rescaling_filters(2048, 1152, &ctx(1.0, Some((1280, 720))), &d, false).unwrap();
    assert_eq!(geo.filters[1], "pad=1280:720:(ow-iw)/2:(oh-ih)/2:#FF0000");
    assert_eq!((geo.width, geo.height), (1280, 720));
}

#[test]
fn pixel_aspect_widens_input() {
    let geo = rescaling_filters(1000, 1000, &ctx(2.0, None), &def(), false).unwrap();
    assert_eq!(geo.filters, vec!["scale=2000x1000:flags=lanczos"]);
    assert_eq!((geo.width, geo.height), (2000, 1000));

    let mut d = def();
    d.scale_pixel_aspect = false;
    let geo = rescaling_filters(1000, 1000, &ctx(2.0, None), &d, false).unwrap();
    assert!(geo.filters.is_empty());
}

#[test]
fn reformatted_input_ignores_pixel_aspect_and_instance_resolution() {
    let geo = rescaling_filters(1000, 1000, &ctx(2.0, Some((1920, 1080))), &def(), true).unwrap();
    assert!(geo.filters.is_empty());
    assert_eq!((geo.width, geo.height), (1000, 1000));
}

#[test]
fn overscan_updates_working_size() {
    let mut d = def();
    d.overscan_crop = "-10%".into();
    let geo = rescaling_filters(2000, 1000, &ctx(1.0, None), &d, false).unwrap();
    assert_eq!(geo.filters, vec!["crop=1800:900"]);
    assert_eq!((geo.width, geo.height), (1800, 900));
}

#[test]
fn odd_input_is_padded_to_even() {
    let geo = rescaling_filters(1921, 1081, &ctx(1.0, None), &def(), false).unwrap();
    assert_eq!(geo.filters, vec!["pad=width=ceil(iw/2)*2:height=ceil(ih/2)*2"]);
    assert_eq!((geo.width, geo.height), (1922, 1082));
}

#[test]
fn odd_target_is_rounded_up() {
    let mut d = def();
    d.width = 1279;
    d.height = 719;
    let geo = rescaling_filters(1920, 1080, &ctx(1.0, None), &d, false).unwrap();
    assert_eq!((geo.width, geo.height), (1280, 720));
}

#[test]
fn resolution_is_always_even() {
    let sizes = [(1921, 1081), (2048, 858), (999, 555), (640, 480)];
    let targets = [(0, 0), (1279, 719), (1920, 1080)];
    let overscans = ["", "-7px", "+3%", "-10%+"];
    for (w, h) in sizes {
        for (tw, th) in targets {
            for expr in overscans {
                let mut d = def();
                d.width = tw;
                d.height = th;
                d.overscan_crop = expr.into();
                let geo = rescaling_filters(w, h, &ctx(1.0, None), &d, false).unwrap();
                assert_eq!(geo.width % 2, 0, "{w}x{h} {tw}x{th} {expr}");
                assert_eq!(geo.height % 2, 0, "{w}x{h} {tw}x{th} {expr}");
            }
        }
    }
}

#[test]
fn letter_box_forces_processing_at_same_size() {
    let mut d = def();
    d.letter_box = LetterBox {
        enabled: true,
        ratio: 2.35,
        ..LetterBox::default()
    };
    let geo = rescaling_filters(1920, 1080, &ctx(1.0, None), &d, false).unwrap();
    assert_eq!(geo.filters.len(), 2);
    assert!(geo.filters.iter().all(|f| f.starts_with("drawbox=")));
}

#[test]
fn degenerate_overscan_is_an_error() {
    let mut d = def();
    d.overscan_crop = "-100%".into();
    let err = rescaling_filters(1920, 1080, &ctx(1.0, None), &d, false).unwrap_err();
    assert!(matches!(err, ReviewError::DegenerateGeometry(_)));
}
