use std::path::PathBuf;

use ps_app::{
    GainOverrides, RunOptions, RunProgressEvent, RunRequest, RunStage, ensure_run,
    ensure_run_with_progress, get_run_summary, list_runs, load_run, save_scenario, to_csv,
};
use ps_project::Scenario;

fn scenario_in_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ps_app_{}_{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let mut scenario = Scenario::reference();
    scenario.grid.end_s = 6.0;
    scenario.grid.step_s = 0.002;
    let path = dir.join("scenario.yaml");
    save_scenario(&path, &scenario).unwrap();
    path
}

fn request(path: &PathBuf, use_cache: bool) -> RunRequest<'_> {
    RunRequest {
        scenario_path: path,
        overrides: GainOverrides::default(),
        options: RunOptions {
            use_cache,
            solver_version: "test".to_string(),
        },
    }
}

#[test]
fn second_run_is_served_from_cache() {
    let path = scenario_in_temp_dir("cache");

    let first = ensure_run(&request(&path, true)).unwrap();
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.points, 3000);
    assert_eq!(first.timing.steps, 2999);

    let second = ensure_run(&request(&path, true)).unwrap();
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(second.metrics, first.metrics);

    let rerun = ensure_run(&request(&path, false)).unwrap();
    assert!(!rerun.loaded_from_cache);
    assert_eq!(rerun.run_id, first.run_id);
}

#[test]
fn gain_overrides_produce_a_distinct_run() {
    let path = scenario_in_temp_dir("overrides");

    let base = ensure_run(&request(&path, true)).unwrap();
    let mut req = request(&path, true);
    req.overrides = GainOverrides {
        p: Some(2.0),
        i: None,
        d: None,
    };
    let tuned = ensure_run(&req).unwrap();

    assert_ne!(base.run_id, tuned.run_id);
    assert_eq!(tuned.manifest.gains.p, 2.0);
    assert_eq!(tuned.manifest.gains.i, base.manifest.gains.i);

    let runs = list_runs(&path).unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().any(|r| r.run_id == base.run_id));
    assert!(runs.iter().any(|r| r.run_id == tuned.run_id));
}

#[test]
fn stored_run_round_trips_through_queries() {
    let path = scenario_in_temp_dir("queries");
    let response = ensure_run(&request(&path, true)).unwrap();

    let (manifest, records) = load_run(&path, &response.run_id).unwrap();
    assert_eq!(manifest, response.manifest);
    assert_eq!(records.len(), manifest.points);

    let summary = get_run_summary(&records).unwrap();
    assert_eq!(summary.time_range.0, 0.0);
    assert_eq!(summary.final_desired, 5.0);
    assert!((summary.final_stabilised - 5.0).abs() < 0.05);

    let uncontrolled_moves = records.iter().any(|r| r.actual != 0.0);
    assert!(!uncontrolled_moves);

    let csv = to_csv(&records);
    assert_eq!(csv.lines().count(), records.len() + 1);

    assert!(load_run(&path, "missing").is_err());
}

#[test]
fn progress_events_cover_each_stage() {
    let path = scenario_in_temp_dir("progress");
    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut record = |e: RunProgressEvent| events.push(e);
    let cb: &mut dyn FnMut(RunProgressEvent) = &mut record;

    let response = ensure_run_with_progress(&request(&path, false), Some(cb)).unwrap();
    assert!(!response.loaded_from_cache);

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingScenario));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
    assert!(stages.contains(&RunStage::Simulating));
    assert!(stages.contains(&RunStage::SavingResults));
    assert!(events.iter().any(|e| e.simulation.is_some()));
    assert!(
        events
            .windows(2)
            .all(|w| w[1].elapsed_wall_s >= w[0].elapsed_wall_s)
    );
}

#[test]
fn missing_scenario_file_is_reported() {
    let path = std::env::temp_dir().join("ps_app_does_not_exist.yaml");
    let err = ensure_run(&request(&path, true)).unwrap_err();
    assert!(matches!(err, ps_app::AppError::ScenarioFileRead { .. }));
}

#[test]
fn in_memory_run_matches_stored_samples() {
    let path = scenario_in_temp_dir("in_memory");
    let response = ensure_run(&request(&path, true)).unwrap();
    let (_manifest, records) = load_run(&path, &response.run_id).unwrap();

    let scenario = ps_app::load_scenario(&path).unwrap();
    let record = ps_app::run_scenario(&scenario).unwrap();

    assert_eq!(record.len(), records.len());
    for (sample, stored) in record.stabilised.iter().zip(&records) {
        assert_eq!(*sample, stored.stabilised);
    }
}

#[test]
fn oversized_grid_is_a_validation_error() {
    let dir = std::env::temp_dir().join(format!("ps_app_oversized_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("long.yaml");
    std::fs::write(
        &path,
        "version: 2\nname: long\ngrid:\n  start_s: 0.0\n  end_s: 10000000.0\n  step_s: 0.001\n",
    )
    .unwrap();

    let err = ensure_run(&request(&path, true)).unwrap_err();
    assert!(matches!(err, ps_app::AppError::Validation(_)), "{err}");
}
