use std::path::PathBuf;

use ps_project::*;

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("ps_project_tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn yaml_roundtrip() {
    let path = temp_path("roundtrip.yaml");
    let scenario = Scenario::reference();
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();
    assert_eq!(loaded, scenario);
}

#[test]
fn json_roundtrip() {
    let path = temp_path("roundtrip.json");
    let mut scenario = Scenario::reference();
    scenario.solver = SolverDef::Rk4 { substeps: 2 };
    save_json(&path, &scenario).unwrap();
    let loaded = load(&path).unwrap();
    assert_eq!(loaded, scenario);
}

#[test]
fn minimal_v1_file_gets_defaults_and_upgrades() {
    let yaml = r#"
version: 1
name: minimal
"#;
    let scenario = parse_yaml(yaml).unwrap();
    assert_eq!(scenario.version, LATEST_VERSION);
    assert_eq!(scenario.plant, PlantDef::default());
    assert_eq!(scenario.gains, GainsDef::default());
    assert_eq!(scenario.solver, SolverDef::Exact);
    assert_eq!(scenario.initial_output, 0.0);
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let yaml = r#"
version: 2
name: broken
plant:
  gain: 1.0
  time_constant_s: -1.0
  dead_time_s: 0.0
"#;
    assert!(matches!(
        parse_yaml(yaml),
        Err(ProjectError::Validation(_))
    ));
}

#[test]
fn bundled_scenarios_load() {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // go to crates
    dir.pop(); // go to repo root
    dir.push("scenarios");

    for name in ["thruster_step.yaml", "aggressive_gains.yaml"] {
        let path = dir.join(name);
        let scenario = load(&path).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(!scenario.name.is_empty());
    }

    let reference = load(&dir.join("thruster_step.yaml")).unwrap();
    assert_eq!(reference, Scenario::reference());
}
