//! Tests for session configuration.

use deltaforge_core::{HardSoftScore, SimpleScore};

use super::*;

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "reproducible"
        constraint_match_enabled = true

        [constraint_weights]
        "Room conflict" = "1hard/0soft"
        "scheduling/Preference" = "0hard/3soft"
    "#;

    let config = SessionConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert!(config.constraint_match_enabled);
    assert_eq!(config.constraint_weights.len(), 2);

    let weights = config.parsed_weights::<HardSoftScore>().unwrap();
    assert_eq!(weights["scheduling/Preference"], HardSoftScore::of(0, 3));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: fast_assert
        constraint_weights:
          Overlap: "5"
    "#;

    let config = SessionConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FastAssert);
    assert!(!config.constraint_match_enabled);
    let weights = config.parsed_weights::<SimpleScore>().unwrap();
    assert_eq!(weights["Overlap"], SimpleScore::of(5));
}

#[test]
fn test_defaults() {
    let config = SessionConfig::from_toml_str("").unwrap();
    assert_eq!(config, SessionConfig::default());
    assert_eq!(config.environment_mode, EnvironmentMode::NonReproducible);
    assert!(!config.environment_mode.is_asserted());
}

#[test]
fn test_builder() {
    let config = SessionConfig::new()
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_constraint_match_enabled(true)
        .with_constraint_weight("Overlap", "2hard/0soft");

    assert!(config.environment_mode.is_asserted());
    assert!(config.environment_mode.is_fully_asserted());
    assert!(config.constraint_match_enabled);
    assert_eq!(config.constraint_weights["Overlap"], "2hard/0soft");
}

#[test]
fn test_invalid_weight_names_constraint() {
    let config = SessionConfig::new().with_constraint_weight("Overlap", "lots");
    let err = config.parsed_weights::<HardSoftScore>().unwrap_err();
    assert!(err.to_string().contains("Overlap"));
}

#[test]
fn test_unknown_environment_mode_is_rejected() {
    let result = SessionConfig::from_toml_str(r#"environment_mode = "paranoid""#);
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn test_missing_file() {
    let result = SessionConfig::load("/definitely/not/here/session.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
