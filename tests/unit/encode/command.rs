use std::path::{Path, PathBuf};

use super::*;
use crate::config::tags::Tags;
use crate::foundation::core::RgbaColor;
use crate::publish::model::RepresentationFiles;

fn instance() -> Instance {
    serde_json::from_str(
        r#"{
            "productType": "render",
            "frameStart": 1001,
            "frameEnd": 1010,
            "handleStart": 2,
            "handleEnd": 2,
            "fps": 25.0
        }"#,
    )
    .unwrap()
}

fn ctx(sequence: bool, without_handles: bool) -> RenderContext {
    let (start, end) = if without_handles {
        (1001, 1010)
    } else {
        (999, 1012)
    };
    RenderContext {
        frame_start: 1001,
        frame_end: 1010,
        handle_start: 2,
        handle_end: 2,
        frame_start_handle: 999,
        frame_end_handle: 1012,
        output_frame_start: start,
        output_frame_end: end,
        fps: 25.0,
        pixel_aspect: 1.0,
        resolution_width: None,
        resolution_height: None,
        input_is_sequence: sequence,
        first_sequence_frame: sequence.then_some(start),
        input_allow_bg: sequence,
        with_audio: false,
        without_handles,
        handles_are_set: true,
    }
}

fn paths(input: &str, output: &str, image: bool, sequence: bool) -> IoPaths {
    IoPaths {
        input_path: PathBuf::from(input),
        input_single_file: PathBuf::from(input),
        output_path: PathBuf::from(output),
        output_dir: Path::new(output).parent().unwrap().to_path_buf(),
        output_ext: "mov".into(),
        output_ext_is_image: image,
        output_is_sequence: sequence,
        output_files: RepresentationFiles::Single(output.into()),
        sequence_file: None,
    }
}

fn def(output: &[&str]) -> OutputDefinition {
    let mut def = OutputDefinition {
        name: "h264".into(),
        ..OutputDefinition::default()
    };
    def.ffmpeg_args.output = output.iter().map(|s| s.to_string()).collect();
    def
}

fn fill_data() -> Map<String, Value> {
    serde_json::json!({ "timecode": "00:00:39:24", "output": "h264" })
        .as_object()
        .cloned()
        .unwrap()
}

fn request<'a>(
    output_def: &'a OutputDefinition,
    instance: &'a Instance,
    ctx: &'a RenderContext,
    paths: &'a IoPaths,
    fill_data: &'a Map<String, Value>,
    geometry: &'a [String],
) -> CommandRequest<'a> {
    CommandRequest {
        output_def,
        instance,
        ctx,
        paths,
        fill_data,
        layer_name: None,
        geometry_filters: geometry,
        bake_lut: false,
        encoder: "ffmpeg",
    }
}

#[test]
fn sequence_to_video_without_handles() {
    let mut d = def(&["-c:v libx264 -crf 18", "-vf eq=gamma=1.1", "-timecode {timecode}"]);
    d.ffmpeg_args.input = vec!["-apply_trc gamma22".into(), "  ".into()];
    let inst = instance();
    let c = ctx(true, true);
    let p = paths("/src/a.%04d.exr", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let geometry = vec!["scale=1920x1080:flags=lanczos".to_string()];

    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &geometry));
    assert_eq!(
        cmd.command_line(),
        "ffmpeg -apply_trc gamma22 -start_number 1001 -framerate 25.0 -to 0.4000000000 \
         -i /src/a.%04d.exr -filter:v \"scale=1920x1080:flags=lanczos,eq=gamma=1.1\" \
         -c:v libx264 -crf 18 -timecode 00:00:39:24 -t 0.4 -y /dst/a_h264.mov"
    );
    assert!(!cmd.args().iter().any(|a| a.starts_with("-vf")));
}

#[test]
fn output_path_is_the_last_token() {
    let d = def(&["-c:v libx264", "-y"]);
    let inst = instance();
    let c = ctx(false, false);
    let p = paths("/src/a.mov", "/dst/my plate_h264.mov", false, false);
    let fill = fill_data();
    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &[]));
    let args = cmd.args();
    assert_eq!(args.last().map(String::as_str), Some("\"/dst/my plate_h264.mov\""));
    assert_eq!(args[args.len() - 2], "-y");
}

#[test]
fn video_input_without_handles_seeks_past_head_handles() {
    let d = def(&[]);
    let inst = instance();
    let c = ctx(false, true);
    let p = paths("/src/my plate.mov", "/dst/my plate_h264.mov", false, false);
    let fill = fill_data();
    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &[]));
    assert_eq!(
        cmd.command_line(),
        "ffmpeg -ss 0.0800000000 -i \"/src/my plate.mov\" -t 0.4 -y \"/dst/my plate_h264.mov\""
    );
}

#[test]
fn sequence_output_numbers_frames() {
    let d = def(&[]);
    let inst = instance();
    let c = ctx(true, false);
    let p = paths("/src/a.%04d.exr", "/dst/a_png/a_png.%04d.png", true, true);
    let fill = fill_data();
    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &[]));
    assert_eq!(
        cmd.command_line(),
        "ffmpeg -start_number 999 -framerate 25.0 -i /src/a.%04d.exr \
         -start_number 999 -frames:v 14 -y /dst/a_png/a_png.%04d.png"
    );
}

#[test]
fn audio_inputs_follow_video_input() {
    let d = def(&[]);
    let mut inst = instance();
    inst.frame_start_ftrack = Some(1011);
    inst.audio.push(crate::publish::model::AudioSource {
        filename: "/audio/a.wav".into(),
        offset: 1001.0,
    });
    let mut c = ctx(false, false);
    c.with_audio = true;
    c.handles_are_set = false;
    let p = paths("/src/a.mov", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &[]));
    assert_eq!(
        cmd.command_line(),
        "ffmpeg -i /src/a.mov -ss 0.4 -to 0.9600000000 -vn -i /audio/a.wav -y /dst/a_h264.mov"
    );
}

#[test]
fn image_output_skips_audio() {
    let d = def(&[]);
    let mut inst = instance();
    inst.audio.push(crate::publish::model::AudioSource {
        filename: "/audio/a.wav".into(),
        offset: 0.0,
    });
    let mut c = ctx(false, false);
    c.with_audio = true;
    c.handles_are_set = false;
    let p = paths("/src/a.mov", "/dst/a_thumb.jpg", true, false);
    let fill = fill_data();
    let cmd = build_command(&request(&d, &inst, &c, &p, &fill, &[]));
    assert!(!cmd.command_line().contains("a.wav"));
}

#[test]
fn lut_bake_adds_filters_and_drops_gamma() {
    let mut d = def(&[]);
    d.ffmpeg_args.input = vec!["-gamma 2.2".into(), "-probesize 5M".into()];
    let mut inst = instance();
    inst.lut_path = Some("C:\\luts\\show.cube".into());
    let c = ctx(false, false);
    let p = paths("/src/a.mov", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let mut req = request(&d, &inst, &c, &p, &fill, &[]);
    req.bake_lut = true;
    let line = build_command(&req).command_line();
    assert!(line.contains("-filter:v \"lut3d=file='C\\:/luts/show.cube',colormatrix=bt601:bt709\""));
    assert!(!line.contains("-gamma"));
    assert!(line.contains("-probesize 5M"));
}

#[test]
fn background_color_is_prepended() {
    let mut d = def(&[]);
    d.bg_color = Some(RgbaColor::new(16, 32, 255, 0.5));
    d.ffmpeg_args.video_filters = vec!["eq=contrast=1.1".into()];
    let inst = instance();
    let c = ctx(true, false);
    let p = paths("/src/a.%04d.exr", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let line = build_command(&request(&d, &inst, &c, &p, &fill, &[])).command_line();
    assert!(line.contains(
        "-filter:v \"split=2[bg][fg],[bg]drawbox=c=#1020FF@0.5:replace=1:t=fill[bg],\
         [bg][fg]overlay=format=auto,eq=contrast=1.1\""
    ));

    let mut c = ctx(false, false);
    c.input_allow_bg = false;
    let line = build_command(&request(&d, &inst, &c, &p, &fill, &[])).command_line();
    assert!(!line.contains("drawbox"));
}

#[test]
fn unformattable_output_argument_is_kept_verbatim() {
    let d = def(&["-metadata comment={missing}"]);
    let inst = instance();
    let c = ctx(false, false);
    let p = paths("/src/a.mov", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let line = build_command(&request(&d, &inst, &c, &p, &fill, &[])).command_line();
    assert!(line.contains("-metadata comment={missing}"));
}

#[test]
fn layer_name_is_passed_to_input() {
    let d = def(&[]);
    let inst = instance();
    let c = ctx(false, false);
    let p = paths("/src/a.exr", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let mut req = request(&d, &inst, &c, &p, &fill, &[]);
    req.layer_name = Some("beauty");
    assert!(
        build_command(&req)
            .command_line()
            .starts_with("ffmpeg -layer beauty -i /src/a.exr")
    );
}

#[test]
fn command_is_deterministic() {
    let d = def(&["-c:v prores_ks -profile:v 3", "-af volume=0.5", "-pix_fmt yuv422p10le"]);
    let inst = instance();
    let c = ctx(true, true);
    let p = paths("/src/a.%04d.exr", "/dst/a_h264.mov", false, false);
    let fill = fill_data();
    let geometry = vec!["setsar=1".to_string()];
    let first = build_command(&request(&d, &inst, &c, &p, &fill, &geometry));
    for _ in 0..10 {
        assert_eq!(
            build_command(&request(&d, &inst, &c, &p, &fill, &geometry)),
            first
        );
    }
}

#[test]
fn split_keeps_first_occurrence() {
    assert_eq!(
        split_ffmpeg_args(&["-c:v libx264 -crf 18", "-crf 18", "-y", ""]),
        vec!["-c:v libx264", "-crf 18", "-y"]
    );
}

#[test]
fn filters_move_out_of_output_args() {
    let mut video = vec!["scale=100x100".to_string()];
    let mut audio = Vec::new();
    let rest = relocate_filters(
        vec![
            "-vf myfilter".into(),
            "-filter:a \"volume=2\"".into(),
            "-vf".into(),
            "other".into(),
            "-an".into(),
            "-vframes 10".into(),
        ],
        &mut video,
        &mut audio,
    );
    assert_eq!(rest, vec!["-an", "-vframes 10"]);
    assert_eq!(video, vec!["scale=100x100", "myfilter", "other"]);
    assert_eq!(audio, vec!["volume=2"]);
}

#[test]
fn assembled_command_has_single_filter_segment() {
    let cmd = assemble(
        "ffmpeg",
        vec!["-i".into(), "in.mov".into()],
        vec!["a".into()],
        Vec::new(),
        vec!["-vf b".into(), "-filter:v c".into(), "-y".into(), "out.mov".into()],
    );
    assert_eq!(cmd.to_string(), "ffmpeg -i in.mov -filter:v \"a,b,c\" -y out.mov");
}
