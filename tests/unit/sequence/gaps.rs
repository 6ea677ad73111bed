use super::*;

fn write_frames(dir: &Path, frames: &[i64]) -> Vec<String> {
    frames
        .iter()
        .map(|f| {
            let name = format!("a.{f:04}.exr");
            std::fs::write(dir.join(&name), format!("frame {f}")).unwrap();
            name
        })
        .collect()
}

#[test]
fn copies_previous_frame_into_hole() {
    let tmp = tempfile::tempdir().unwrap();
    let frames: Vec<i64> = (1..=10).filter(|f| *f != 5).collect();
    let files = write_frames(tmp.path(), &frames);

    let filled = fill_sequence_gaps(&files, tmp.path(), 1, 10).unwrap();
    assert_eq!(filled.paths(), &[tmp.path().join("a.0005.exr")]);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("a.0005.exr")).unwrap(),
        "frame 4"
    );
}

#[test]
fn guard_removes_filled_frames_on_drop() {
    let tmp = tempfile::tempdir().unwrap();
    let files = write_frames(tmp.path(), &[1, 2, 4]);
    {
        let filled = fill_sequence_gaps(&files, tmp.path(), 1, 4).unwrap();
        assert_eq!(filled.len(), 1);
        assert!(tmp.path().join("a.0003.exr").exists());
    }
    assert!(!tmp.path().join("a.0003.exr").exists());
    assert!(tmp.path().join("a.0004.exr").exists());
}

#[test]
fn repeated_runs_fill_the_same_set() {
    let tmp = tempfile::tempdir().unwrap();
    let files = write_frames(tmp.path(), &[1, 3, 6]);
    let first: Vec<PathBuf> = fill_sequence_gaps(&files, tmp.path(), 1, 6)
        .unwrap()
        .paths()
        .to_vec();
    let second: Vec<PathBuf> = fill_sequence_gaps(&files, tmp.path(), 1, 6)
        .unwrap()
        .paths()
        .to_vec();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn existing_file_at_hole_is_not_overwritten() {
    let tmp = tempfile::tempdir().unwrap();
    let files = write_frames(tmp.path(), &[1, 3]);
    std::fs::write(tmp.path().join("a.0002.exr"), "artist file").unwrap();

    let filled = fill_sequence_gaps(&files, tmp.path(), 1, 3).unwrap();
    assert!(filled.is_empty());
    drop(filled);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("a.0002.exr")).unwrap(),
        "artist file"
    );
}

#[test]
fn leading_hole_uses_first_existing_frame() {
    let tmp = tempfile::tempdir().unwrap();
    let files = write_frames(tmp.path(), &[3, 4]);
    let filled = fill_sequence_gaps(&files, tmp.path(), 1, 4).unwrap();
    assert_eq!(filled.len(), 2);
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("a.0001.exr")).unwrap(),
        "frame 3"
    );
}

#[test]
fn multiple_collections_is_known_publish_error() {
    let tmp = tempfile::tempdir().unwrap();
    let files = ["a.0001.exr", "b.0001.exr"];
    let err = fill_sequence_gaps(&files, tmp.path(), 1, 2).unwrap_err();
    assert!(err.is_known_publish());
    assert!(err.to_string().contains("multiple collections found"));
}

#[test]
fn missing_source_is_known_publish_error() {
    let tmp = tempfile::tempdir().unwrap();
    let files = ["a.0001.exr", "a.0003.exr"];
    let err = fill_sequence_gaps(&files, tmp.path(), 1, 3).unwrap_err();
    assert!(err.is_known_publish());
}

#[test]
fn holes_below_a_fixed_width_run_keep_its_width() {
    let tmp = tempfile::tempdir().unwrap();
    let files = write_frames(tmp.path(), &[1000, 1001]);
    let filled = fill_sequence_gaps(&files, tmp.path(), 998, 1001).unwrap();
    assert_eq!(
        filled.paths(),
        &[tmp.path().join("a.0998.exr"), tmp.path().join("a.0999.exr")]
    );
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("a.0999.exr")).unwrap(),
        "frame 1000"
    );
}
