use super::*;

use crate::config::model::OutputFilter;

fn def(name: &str, filter: Option<OutputFilter>) -> OutputDefinition {
    OutputDefinition {
        name: name.to_string(),
        filter,
        ..OutputDefinition::default()
    }
}

fn profile(outputs: Vec<OutputDefinition>) -> OutputProfile {
    OutputProfile {
        hosts: Vec::new(),
        product_types: Vec::new(),
        outputs,
    }
}

fn repre(json: &str) -> Representation {
    serde_json::from_str(json).unwrap()
}

fn names(defs: &[&OutputDefinition]) -> Vec<String> {
    defs.iter().map(|d| d.name.clone()).collect()
}

#[test]
fn first_matching_profile_wins() {
    let profiles = vec![
        OutputProfile {
            hosts: vec!["nuke".to_string()],
            product_types: vec!["render".to_string()],
            outputs: vec![def("nuke_only", None)],
        },
        OutputProfile {
            hosts: Vec::new(),
            product_types: vec!["render".to_string()],
            outputs: vec![def("any_host", None)],
        },
        profile(vec![def("catch_all", None)]),
    ];

    let p = select_profile(&profiles, "maya", "render").unwrap();
    assert_eq!(p.outputs[0].name, "any_host");
    let p = select_profile(&profiles, "nuke", "render").unwrap();
    assert_eq!(p.outputs[0].name, "nuke_only");
    let p = select_profile(&profiles, "maya", "plate").unwrap();
    assert_eq!(p.outputs[0].name, "catch_all");
}

#[test]
fn no_profile_when_nothing_matches() {
    let profiles = vec![OutputProfile {
        hosts: vec!["nuke".to_string()],
        product_types: Vec::new(),
        outputs: Vec::new(),
    }];
    assert!(select_profile(&profiles, "Nuke", "render").is_none());
    assert!(select_profile(&[], "nuke", "render").is_none());
}

#[test]
fn family_filter_is_case_insensitive_and_ignores_empty_entries() {
    let p = profile(vec![
        def(
            "render_only",
            Some(OutputFilter {
                families: vec!["".to_string(), "RENDER".to_string()],
                ..OutputFilter::default()
            }),
        ),
        def(
            "plate_only",
            Some(OutputFilter {
                families: vec!["plate".to_string()],
                ..OutputFilter::default()
            }),
        ),
        def(
            "blank_filter",
            Some(OutputFilter {
                families: vec!["".to_string()],
                ..OutputFilter::default()
            }),
        ),
    ]);
    let families = vec!["render".to_string(), "review".to_string()];
    let defs = filter_output_defs(&p, Some("renderMain"), &families).unwrap();
    assert_eq!(names(&defs), vec!["render_only", "blank_filter"]);
}

#[test]
fn product_name_regex_is_searched() {
    let p = profile(vec![
        def(
            "main",
            Some(OutputFilter {
                product_names: vec!["Main$".to_string()],
                ..OutputFilter::default()
            }),
        ),
        def(
            "other",
            Some(OutputFilter {
                product_names: vec!["^plate".to_string(), "".to_string()],
                ..OutputFilter::default()
            }),
        ),
    ]);
    let defs = filter_output_defs(&p, Some("renderMain"), &[]).unwrap();
    assert_eq!(names(&defs), vec!["main"]);

    // Without a product name the regex filter does not apply.
    let defs = filter_output_defs(&p, None, &[]).unwrap();
    assert_eq!(names(&defs), vec!["main", "other"]);
}

#[test]
fn duplicate_names_replace_in_place() {
    let mut later = def("h264", None);
    later.ext = Some("mp4".to_string());
    let p = profile(vec![def("h264", None), def("png", None), later]);
    let defs = filter_output_defs(&p, None, &[]).unwrap();
    assert_eq!(names(&defs), vec!["h264", "png"]);
    assert_eq!(defs[0].ext.as_deref(), Some("mp4"));
}

#[test]
fn invalid_product_regex_is_a_validation_error() {
    let p = profile(vec![def(
        "bad",
        Some(OutputFilter {
            product_names: vec!["(unclosed".to_string()],
            ..OutputFilter::default()
        }),
    )]);
    let err = filter_output_defs(&p, Some("renderMain"), &[]).unwrap_err();
    assert!(matches!(err, ReviewError::Validation(_)));
}

#[test]
fn review_candidates_need_review_tag_and_supported_ext() {
    let ok = repre(
        r#"{"ext": "exr", "files": ["a.1001.exr"], "stagingDir": "/s", "tags": ["review"]}"#,
    );
    assert!(review_skip_reason(&ok).is_none());

    let untagged = repre(r#"{"ext": "exr", "files": "a.exr", "stagingDir": "/s"}"#);
    assert!(review_skip_reason(&untagged).is_some());

    let thumb = repre(
        r#"{"ext": "jpg", "files": "a.jpg", "stagingDir": "/s", "tags": ["review", "thumbnail"]}"#,
    );
    assert!(review_skip_reason(&thumb).unwrap().contains("thumbnail"));

    let passing = repre(
        r#"{"ext": "mov", "files": "a.mov", "stagingDir": "/s", "tags": ["review", "passing"]}"#,
    );
    assert!(review_skip_reason(&passing).unwrap().contains("passing"));

    let unsupported = repre(
        r#"{"ext": ".avi", "files": "a.avi", "stagingDir": "/s", "tags": ["review"]}"#,
    );
    assert!(review_skip_reason(&unsupported).unwrap().contains("avi"));

    let dotted = repre(r#"{"ext": ".MOV", "files": "a.mov", "stagingDir": "/s", "tags": ["review"]}"#);
    assert!(review_skip_reason(&dotted).is_none());
}

#[test]
fn custom_tag_filter_keeps_unfiltered_definitions() {
    let tagged = def(
        "client",
        Some(OutputFilter {
            custom_tags: vec!["Client".to_string()],
            ..OutputFilter::default()
        }),
    );
    let plain = def("plain", None);
    let defs = vec![&tagged, &plain];

    assert_eq!(names(&filter_by_custom_tags(&defs, &[])), vec!["plain"]);
    assert_eq!(
        names(&filter_by_custom_tags(&defs, &["client".to_string()])),
        vec!["client", "plain"]
    );
}

#[test]
fn single_image_detection() {
    assert!(is_single_frame_image(&["/s/still.png"]));
    assert!(is_single_frame_image(&["/s/STILL.EXR"]));
    assert!(!is_single_frame_image(&["/s/a.1001.exr", "/s/a.1002.exr"]));
    assert!(!is_single_frame_image(&["/s/clip.mov"]));
    assert!(!is_single_frame_image::<&str>(&[]));
}

#[test]
fn single_frame_filter_routes_definitions() {
    let single = def(
        "single",
        Some(OutputFilter {
            single_frame_filter: Some(SingleFrameFilter::SingleFrame),
            ..OutputFilter::default()
        }),
    );
    let multi = def(
        "multi",
        Some(OutputFilter {
            single_frame_filter: Some(SingleFrameFilter::MultiFrame),
            ..OutputFilter::default()
        }),
    );
    let any = def("any", None);
    let defs = vec![&single, &multi, &any];

    assert_eq!(
        names(&single_frame_filter(&["/s/still.png"], &defs)),
        vec!["single", "any"]
    );
    assert_eq!(
        names(&single_frame_filter(&["/s/clip.mov"], &defs)),
        vec!["multi", "any"]
    );
}

#[test]
fn one_frame_sequence_counts_as_single_image() {
    let repre = repre(
        r#"{"name": "exr", "ext": "exr", "files": ["a.1001.exr"], "stagingDir": "/s"}"#,
    );
    assert!(repre.files.is_sequence());
    let paths = repre.files.paths_in(&repre.staging_dir);
    assert!(is_single_frame_image(&paths));
}
