use super::*;

#[test]
fn scratch_lives_under_root_and_is_removed_on_drop() {
    let root = tempfile::tempdir().unwrap();
    let nested = root.path().join("review").join("tmp");

    let scratch = ConversionScratch::create(&nested).unwrap();
    let path = scratch.path().to_path_buf();
    assert!(path.starts_with(&nested));
    assert!(path.is_dir());

    std::fs::write(path.join("a.1001.exr"), b"converted").unwrap();
    drop(scratch);
    assert!(!path.exists());
    assert!(nested.is_dir());
}

#[test]
fn each_scratch_is_distinct() {
    let root = tempfile::tempdir().unwrap();
    let a = ConversionScratch::create(root.path()).unwrap();
    let b = ConversionScratch::create(root.path()).unwrap();
    assert_ne!(a.path(), b.path());
}
