//! Tests for generation configuration.

use super::*;

#[test]
fn test_defaults() {
    let config = GenerationConfig::default();
    assert_eq!(config.max_cards_in_combo, 10);
    assert_eq!(config.recursion_limit, 20);
    assert_eq!(config.solve_timeout(), Duration::from_secs(5));
    assert_eq!(config.thread_count, ThreadCount::Auto);
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        max_cards_in_combo = 6
        recursion_limit = 12
        solve_timeout_millis = 750
        thread_count = "none"
    "#;

    let config = GenerationConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.max_cards_in_combo, 6);
    assert_eq!(config.recursion_limit, 12);
    assert_eq!(config.solve_timeout_millis, 750);
    assert_eq!(config.thread_count, ThreadCount::None);
}

#[test]
fn test_toml_partial_uses_defaults() {
    let config = GenerationConfig::from_toml_str("recursion_limit = 5").unwrap();
    assert_eq!(config.recursion_limit, 5);
    assert_eq!(config.max_cards_in_combo, DEFAULT_MAX_CARDS_IN_COMBO);
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        max_cards_in_combo: 4
        solve_timeout_millis: 1200
        thread_count: none
    "#;

    let config = GenerationConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.max_cards_in_combo, 4);
    assert_eq!(config.solve_timeout_millis, 1200);
    assert_eq!(config.thread_count, ThreadCount::None);
}

#[test]
fn test_validation_rejects_zero_bounds() {
    assert!(matches!(
        GenerationConfig::from_toml_str("max_cards_in_combo = 0"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(matches!(
        GenerationConfig::from_toml_str("solve_timeout_millis = 0"),
        Err(ConfigError::Invalid(_))
    ));
    assert!(GenerationConfig::new()
        .with_thread_count(ThreadCount::Count(0))
        .validate()
        .is_err());
}

#[test]
fn test_missing_file() {
    let result = GenerationConfig::load("/nonexistent/spellbook.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_builder_and_toml_output() {
    let config = GenerationConfig::new()
        .with_max_cards(7)
        .with_recursion_limit(9)
        .with_timeout_millis(100)
        .with_thread_count(ThreadCount::Count(2));

    let rendered = config.to_toml_string().unwrap();
    let parsed = GenerationConfig::from_toml_str(&rendered).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_thread_count_resolve() {
    assert_eq!(ThreadCount::None.resolve(10), 1);
    assert_eq!(ThreadCount::Count(8).resolve(3), 3);
    assert_eq!(ThreadCount::Count(2).resolve(0), 1);
    assert!(ThreadCount::Auto.resolve(100) >= 1);
}
