//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;

use orrery::config::AppConfig;
use orrery_core::ShapeKind;
use orrery_stage::WritePolicy;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn test_default_file_matches_builtin_defaults() {
    let config = AppConfig::load().unwrap();
    let builtin = AppConfig::default();
    assert_eq!(config.timeline.end, builtin.timeline.end);
    assert_eq!(config.output.scene_name, builtin.output.scene_name);
    assert_eq!(config.palette, builtin.palette);
    assert_eq!(config.assets.shapes, builtin.assets.shapes);
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("ORRERY_TIMELINE__END", "24");
    std::env::set_var("ORRERY_OUTPUT__SCENE_NAME", "FromEnv");
    let config = AppConfig::load();
    std::env::remove_var("ORRERY_TIMELINE__END");
    std::env::remove_var("ORRERY_OUTPUT__SCENE_NAME");

    let config = config.unwrap();
    assert_eq!(config.timeline.end, 24);
    assert_eq!(config.output.scene_name, "FromEnv");
}

#[test]
#[serial]
fn test_env_write_policy_and_seed() {
    std::env::set_var("ORRERY_ASSETS__WRITE_POLICY", "overwrite");
    std::env::set_var("ORRERY_ORBIT__SEED", "42");
    let config = AppConfig::load();
    std::env::remove_var("ORRERY_ASSETS__WRITE_POLICY");
    std::env::remove_var("ORRERY_ORBIT__SEED");

    let config = config.unwrap();
    assert_eq!(config.assets.write_policy, WritePolicy::Overwrite);
    assert_eq!(config.orbit.seed, Some(42));
}

#[test]
#[serial]
fn test_user_config_overrides_default() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("default.toml"),
        "[timeline]\nend = 100\n\n[assets]\nshapes = [\"Sphere\", \"Cube\"]\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("user.toml"),
        r#"
[timeline]
end = 48

[assets]
shapes = ["Cube"]

[[palette]]
name = "Red"
rgb = [1.0, 0.0, 0.0]

[[palette]]
name = "Blue"
rgb = [0.0, 0.0, 1.0]
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(dir.path()).unwrap();
    assert_eq!(config.timeline.end, 48);
    assert_eq!(config.timeline.start, 0);
    assert_eq!(config.assets.shapes, vec![ShapeKind::Cube]);
    let names: Vec<&str> = config.palette.names().collect();
    assert_eq!(names, vec!["Red", "Blue"]);
}

#[test]
#[serial]
fn test_invalid_config_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("default.toml"), "[timeline]\nstart = 10\nend = 5\n").unwrap();
    assert!(AppConfig::load_from(dir.path()).is_err());

    fs::write(dir.path().join("default.toml"), "[assets]\nshapes = [\"Cone\"]\n").unwrap();
    assert!(AppConfig::load_from(dir.path()).is_err());
}

#[test]
#[serial]
fn test_missing_config_dir_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::load_from(dir.path().join("absent")).unwrap();
    assert_eq!(config.timeline.end, 720);
    assert_eq!(config.scene.write_policy, WritePolicy::Overwrite);
}
