//! Tests for config defaults, JSON loading and validation

use ballpit_core::diagnostics::format_config_error;
use ballpit_core::{run_headless, ConfigError, SimulationConfig, MAX_COUNT};

fn assert_invalid(config: SimulationConfig, expected_field: &str) {
    match config.validate() {
        Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
        other => panic!("expected invalid `{}`, got {:?}", expected_field, other),
    }
}

#[test]
fn test_defaults_are_valid() {
    let config = SimulationConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.count, 70);
    assert_eq!(config.friction, 0.9975);
    assert_eq!(config.max_velocity, 0.15);
    assert!(!config.control_sphere0);
    assert!(config.follow_cursor);
}

#[test]
fn test_partial_json_uses_camel_case_and_defaults() {
    let config = SimulationConfig::from_json_str(
        r#"{ "count": 12, "gravity": 0.7, "wallBounce": 0.5, "maxX": 3.0, "controlSphere0": true }"#,
    )
    .unwrap();

    assert_eq!(config.count, 12);
    assert_eq!(config.gravity, 0.7);
    assert_eq!(config.wall_bounce, 0.5);
    assert_eq!(config.max_x, 3.0);
    assert!(config.control_sphere0);
    assert_eq!(config.max_y, SimulationConfig::default().max_y);
}

#[test]
fn test_zero_count_is_accepted() {
    let config = SimulationConfig::default().with_count(0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let base = SimulationConfig::default;

    assert_invalid(SimulationConfig { friction: 0.0, ..base() }, "friction");
    assert_invalid(SimulationConfig { friction: 1.5, ..base() }, "friction");
    assert_invalid(SimulationConfig { wall_bounce: -0.1, ..base() }, "wallBounce");
    assert_invalid(SimulationConfig { max_velocity: -1.0, ..base() }, "maxVelocity");
    assert_invalid(SimulationConfig { max_z: -2.0, ..base() }, "maxZ");
    assert_invalid(SimulationConfig { min_size: 0.0, ..base() }, "minSize");
    assert_invalid(SimulationConfig { max_size: 0.2, ..base() }, "maxSize");
    assert_invalid(SimulationConfig { size0: 0.0, ..base() }, "size0");
}

#[test]
fn test_non_finite_values_are_rejected() {
    assert_invalid(
        SimulationConfig {
            gravity: f32::NAN,
            ..SimulationConfig::default()
        },
        "gravity",
    );
    assert_invalid(
        SimulationConfig {
            max_x: f32::INFINITY,
            ..SimulationConfig::default()
        },
        "maxX",
    );
}

#[test]
fn test_friction_of_one_is_allowed() {
    let config = SimulationConfig {
        friction: 1.0,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_json_values_fail_to_load() {
    let result = SimulationConfig::from_json_str(r#"{ "friction": 2.0 }"#);
    assert!(matches!(result, Err(ConfigError::Invalid { field: "friction", .. })));

    let result = SimulationConfig::from_json_str(r#"{ "count": -3 }"#);
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

#[test]
fn test_save_then_load() {
    let path = std::env::temp_dir().join(format!("ballpit-config-{}.json", std::process::id()));
    let config = SimulationConfig {
        count: 33,
        gravity: 0.25,
        colors: vec![0x112233, 0x445566],
        ..SimulationConfig::default()
    };

    config.save(&path).unwrap();
    let loaded = SimulationConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_is_io_error() {
    let result = SimulationConfig::load("/definitely/not/here/ballpit.json");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_json_error_quotes_line() {
    let source = "{\n  \"count\": 10,\n  \"gravity\": oops\n}";
    let error = SimulationConfig::from_json_str(source).unwrap_err();

    let msg = format_config_error(&error, source);
    assert!(msg.starts_with("Config error:"));
    assert!(msg.contains("at line 3"), "{}", msg);
    assert!(msg.contains("\"gravity\": oops"), "{}", msg);
}

#[test]
fn test_validation_error_message_names_field() {
    let error = SimulationConfig {
        wall_bounce: 3.0,
        ..SimulationConfig::default()
    }
    .validate()
    .unwrap_err();

    assert!(error.to_string().contains("wallBounce"));
    assert!(!format_config_error(&error, "").contains("at line"));
}

#[test]
fn test_extents_too_wide_to_sample_are_rejected() {
    assert_invalid(SimulationConfig { max_x: 3.0e38, ..SimulationConfig::default() }, "maxX");
    assert_invalid(SimulationConfig { max_z: f32::MAX, ..SimulationConfig::default() }, "maxZ");

    let config = SimulationConfig { max_y: 3.0e38, ..SimulationConfig::default() };
    assert!(matches!(
        run_headless(&config, 1, 0.016, 0),
        Err(ConfigError::Invalid { field: "maxY", .. })
    ));

    let config = SimulationConfig { max_x: 1.0e37, ..SimulationConfig::default() };
    assert!(config.validate().is_ok());
}

#[test]
fn test_count_is_capped() {
    assert!(SimulationConfig::default().with_count(MAX_COUNT).validate().is_ok());
    assert_invalid(SimulationConfig::default().with_count(MAX_COUNT + 1), "count");

    let result = SimulationConfig::from_json_str(r#"{ "count": 18446744073709551615 }"#);
    assert!(matches!(result, Err(ConfigError::Invalid { field: "count", .. })));
}
