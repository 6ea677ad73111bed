use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReviewError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReviewError::known_publish("x")
            .to_string()
            .contains("known publish error:")
    );
    assert!(
        ReviewError::degenerate("x")
            .to_string()
            .contains("degenerate geometry:")
    );
    assert!(ReviewError::encode("x").to_string().contains("encode error:"));
    assert!(
        ReviewError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn overscan_parse_names_offending_input() {
    let err = ReviewError::OverscanParse {
        input: "12abc".to_string(),
    };
    assert_eq!(err.to_string(), "invalid string for rescaling \"12abc\"");
}

#[test]
fn probe_error_mentions_path() {
    let err = ReviewError::probe("/tmp/a.exr", "no streams");
    let msg = err.to_string();
    assert!(msg.contains("/tmp/a.exr"));
    assert!(msg.contains("no streams"));
}

#[test]
fn known_publish_is_flagged() {
    assert!(ReviewError::known_publish("boom").is_known_publish());
    assert!(!ReviewError::validation("boom").is_known_publish());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReviewError::from(base);
    assert!(err.to_string().contains("boom"));
}
