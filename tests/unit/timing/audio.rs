use super::*;

fn source(name: &str, offset: f64) -> AudioSource {
    AudioSource {
        filename: name.into(),
        offset,
    }
}

#[test]
fn positive_offset_seeks_into_audio() {
    let args = audio_args(&[source("a.wav", 1001.0)], Some(1011), 25.0, 0.4);
    assert_eq!(
        args.input,
        vec!["-ss 0.4", "-to 0.8000000000", "-vn", "-i a.wav"]
    );
    assert!(args.output.is_empty());
}

#[test]
fn negative_offset_delays_audio() {
    let args = audio_args(&[source("a.wav", 1021.0)], Some(1011), 25.0, 0.4);
    assert_eq!(
        args.input,
        vec!["-itsoffset 0.4", "-to 0.0000000000", "-vn", "-i a.wav"]
    );
}

#[test]
fn missing_frame_start_means_no_offset() {
    let args = audio_args(&[source("my audio.wav", 50.0)], None, 25.0, 2.0);
    assert_eq!(
        args.input,
        vec!["-to 2.0000000000", "-vn", "-i \"my audio.wav\""]
    );
}

#[test]
fn multiple_sources_are_merged() {
    let args = audio_args(
        &[source("a.wav", 0.0), source("b.wav", 0.0)],
        None,
        25.0,
        1.0,
    );
    assert_eq!(args.output, vec!["-filter_complex amerge", "-ac 2"]);
    assert_eq!(args.input.len(), 6);
}

#[test]
fn no_sources_no_arguments() {
    assert_eq!(audio_args(&[], Some(1), 25.0, 1.0), AudioArgs::default());
}
