use super::*;

#[test]
fn defaults_match_session_timings() {
    let cfg = EaselConfig::default();
    assert_eq!(cfg.reveal.duration_ms, 300);
    assert_eq!(cfg.reveal.completion_grace_ms, 300);
    assert_eq!(cfg.reveal.complete_threshold, 95.0);
    assert_eq!(cfg.staging.fit_ratio, 0.8);
    assert_eq!(cfg.autosave.debounce_ms, 2500);
    assert_eq!(cfg.frame.label, "Drawing Area");
    assert_eq!(cfg.prompt.auto_generate_ms, 20_000);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = EaselConfig::from_json_str(r#"{ "autosave": { "debounce_ms": 1000 } }"#).unwrap();
    assert_eq!(cfg.autosave.debounce_ms, 1000);
    assert_eq!(cfg.reveal, RevealConfig::default());
    assert_eq!(cfg.service.api_base_url, "http://localhost:8080");
}

#[test]
fn validate_rejects_out_of_range_values() {
    let bad_ratio = r#"{ "staging": { "fit_ratio": 1.5 } }"#;
    assert!(matches!(
        EaselConfig::from_json_str(bad_ratio),
        Err(EaselError::Validation(_))
    ));

    let bad_threshold = r#"{ "reveal": { "complete_threshold": 120.0 } }"#;
    assert!(EaselConfig::from_json_str(bad_threshold).is_err());

    let empty_label = r#"{ "frame": { "label": "  " } }"#;
    assert!(EaselConfig::from_json_str(empty_label).is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        EaselConfig::from_json_str("{"),
        Err(EaselError::Serde(_))
    ));
}
