//! Tests for calibration configuration.

use super::*;

#[test]
fn test_defaults_match_calibration_script() {
    let config = CalibrationConfig::default();
    assert_eq!(config.start_index, 0);
    assert!(config.return_to_start);
    assert_eq!(config.artifacts_per_solve, 2);
    assert_eq!(config.tour, TourConfig::NearestNeighbor);
    assert_eq!(
        config.planner.optimizers,
        vec!["EnforceTransitionSemantic", "SimpleTimeParameterization"]
    );
    assert_eq!(
        config.segment.initial,
        TimeParameterizationConfig::new(0.1, 0.5, 2)
    );
    assert_eq!(
        config.segment.refine,
        TimeParameterizationConfig::new(0.01, 0.02, 2)
    );
    assert_eq!(config.transitions.free_loop, "Loop | f");
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        start_index = 3
        return_to_start = false
        artifacts_per_solve = 1

        [tour]
        type = "two_opt"

        [planner]
        optimizers = ["SimpleTimeParameterization"]

        [planner.time_parameterization]
        max_acceleration = 0.2
        safety = 0.3
        order = 3

        [transitions]
        starting_motion = "start"

        [data]
        pregrasps = "27_opt_pregrasps"
        contacts = "27_opt_contacts"
        handles = "27_opt_handles"
    "#;

    let config = CalibrationConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.start_index, 3);
    assert!(!config.return_to_start);
    assert_eq!(config.artifacts_per_solve, 1);
    assert_eq!(config.tour, TourConfig::TwoOpt { max_passes: None });
    assert_eq!(config.planner.optimizers.len(), 1);
    assert_eq!(config.planner.time_parameterization.order, 3);
    assert_eq!(config.planner.max_iter_path_planning, 500);
    assert_eq!(config.transitions.starting_motion, "start");
    assert_eq!(config.transitions.free_loop, "Loop | f");
    assert_eq!(config.data.handles, PathBuf::from("27_opt_handles"));
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        start_index: 1
        tour:
          type: nearest_neighbor
        segment:
          pre_parameterized_pieces: 0
        generation:
          max_attempts: 50
    "#;

    let config = CalibrationConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.start_index, 1);
    assert_eq!(config.tour, TourConfig::NearestNeighbor);
    assert_eq!(config.segment.pre_parameterized_pieces, 0);
    assert_eq!(config.segment.optimizers.len(), 2);
    assert_eq!(config.generation.max_attempts, 50);
}

#[test]
fn test_builder() {
    let config = CalibrationConfig::new()
        .with_start_index(2)
        .with_artifacts_per_solve(0)
        .with_return_to_start(false)
        .with_tour(TourConfig::TwoOpt {
            max_passes: Some(4),
        });

    assert_eq!(config.start_index, 2);
    assert_eq!(config.artifacts_per_solve, 0);
    assert!(!config.return_to_start);
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_round_trip() {
    let config = CalibrationConfig::new().with_tour(TourConfig::TwoOpt {
        max_passes: Some(8),
    });
    let text = config.to_toml_string().unwrap();
    let parsed = CalibrationConfig::from_toml_str(&text).unwrap();
    assert_eq!(parsed.tour, config.tour);
    assert_eq!(parsed.segment, config.segment);
}

#[test]
fn test_validate_rejects_safety_out_of_range() {
    let mut config = CalibrationConfig::default();
    config.segment.initial.safety = 1.5;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("segment.initial.safety"));
}

#[test]
fn test_validate_rejects_zero_safety() {
    let mut config = CalibrationConfig::default();
    config.planner.time_parameterization.safety = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_looser_refine_profile() {
    let mut config = CalibrationConfig::default();
    config.segment.refine.max_acceleration = 1.0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("segment.refine"));
}

#[test]
fn test_validate_rejects_empty_optimizers() {
    let mut config = CalibrationConfig::default();
    config.segment.optimizers.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_attempts() {
    let mut config = CalibrationConfig::default();
    config.generation.max_attempts = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_missing_file() {
    let result = CalibrationConfig::load("/nonexistent/calibration.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
