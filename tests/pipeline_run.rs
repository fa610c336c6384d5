//! Integration tests for full pipeline runs

use std::fs;
use std::path::Path;

use orrery::config::AppConfig;
use orrery::pipeline::{self, PipelineError};
use orrery_core::ComposeError;
use orrery_stage::{tokens, Color3, ExportOutcome, PrimPath, Resolver, Stage, Value};
use tempfile::TempDir;

fn config_in(dir: &Path, descriptors: &str) -> AppConfig {
    let descriptor_path = dir.join("orbit.json");
    fs::write(&descriptor_path, descriptors).unwrap();

    let mut config = AppConfig::default();
    config.output.dir = dir.join("out");
    config.scene.descriptors = descriptor_path;
    config.orbit.seed = Some(11);
    config
}

#[test]
fn test_run_from_descriptor_file() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        dir.path(),
        r#"[
            {"shape": "Sphere", "color": "Yellow", "scale": [3, 3, 3]},
            {"shape": "Cube", "color": "Red", "scale": [0.5, 0.5, 0.5], "orbit": [14]}
        ]"#,
    );

    let report = pipeline::run(&config).unwrap();
    assert_eq!(report.instance_count, 2);
    assert_eq!(report.scene_outcome, ExportOutcome::Written);

    let out = dir.path().join("out");
    assert!(out.join("MySphere.ron").is_file());
    assert!(out.join("MyCube.ron").is_file());

    let scene = Stage::open(out.join("MyScene.ron")).unwrap();
    let cube = PrimPath::new("/MyScene/shape1").unwrap();
    let orbit = scene.attribute(&cube, "xformOp:translate:orbit").unwrap();
    assert_eq!(orbit.time_samples.len(), 720);
    for value in orbit.time_samples.values() {
        let p = value.as_vec3().unwrap();
        assert!((p.length() - 14.0).abs() < 1e-9);
    }

    let mut resolver = Resolver::new();
    let color = resolver
        .resolve_attribute(
            &scene,
            &out,
            &PrimPath::new("/MyScene/shape1/MeshData").unwrap(),
            tokens::DISPLAY_COLOR,
            0.0,
        )
        .unwrap();
    assert_eq!(color, Some(Value::Color3Array(vec![Color3::new(1.0, 0.0, 0.0)])));
}

#[test]
fn test_same_seed_same_scene() {
    let descriptors = r#"[
        {"shape": "Sphere", "color": "Grey", "scale": [0.3, 0.3, 0.3], "orbit": [5]},
        {"shape": "Sphere", "color": "Blue", "scale": [0.6, 0.6, 0.6], "orbit": [11]}
    ]"#;

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let a = pipeline::run(&config_in(first.path(), descriptors)).unwrap();
    let b = pipeline::run(&config_in(second.path(), descriptors)).unwrap();

    assert_eq!(
        fs::read_to_string(a.scene_path).unwrap(),
        fs::read_to_string(b.scene_path).unwrap()
    );
}

#[test]
fn test_unknown_color_fails_run() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), r#"[{"shape": "Sphere", "color": "Magenta"}]"#);

    match pipeline::run(&config) {
        Err(PipelineError::Compose(ComposeError::UnknownVariant { variant, asset })) => {
            assert_eq!(variant, "Magenta");
            assert_eq!(asset, "MySphere");
        }
        other => panic!("Expected UnknownVariant, got {:?}", other.map(|r| r.instance_count)),
    }
    assert!(!dir.path().join("out").join("MyScene.ron").exists());
}

#[test]
fn test_unsupported_shape_fails_run() {
    let dir = TempDir::new().unwrap();
    let config = config_in(dir.path(), r#"[{"shape": "Torus", "color": "Red"}]"#);
    assert!(matches!(
        pipeline::run(&config),
        Err(PipelineError::Compose(ComposeError::UnsupportedShapeKind(_)))
    ));
}
