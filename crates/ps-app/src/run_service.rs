//! Run execution and caching service.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ps_core::timing::{PhaseTimes, Timer};
use ps_project::Scenario;
use ps_results::{RunManifest, RunStore, TimeseriesRecord};
use ps_sim::{SimProgress, SimRecord, StepMetrics};
use tracing::{debug, info};

use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage, SimulationProgress};
use crate::query;
use crate::scenario_service::{self, GainOverrides};

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to execute a run.
#[derive(Debug, Clone)]
pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub overrides: GainOverrides,
    pub options: RunOptions,
}

/// Wall-clock timing for a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub phases: PhaseTimes,
    pub total_time_s: f64,
    pub steps: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub timing: RunTimingSummary,
    pub metrics: Option<StepMetrics>,
}

/// Forwards progress events to an optional frontend callback, stamping each
/// with the wall time since the run started.
struct ProgressReporter<'a> {
    cb: Option<&'a mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
}

impl ProgressReporter<'_> {
    fn stage(&mut self, stage: RunStage, message: &str) {
        self.emit(stage, Some(message.to_string()), None);
    }

    fn simulation(&mut self, progress: &SimProgress) {
        self.emit(
            RunStage::Simulating,
            None,
            Some(SimulationProgress::from(progress)),
        );
    }

    fn emit(
        &mut self,
        stage: RunStage,
        message: Option<String>,
        simulation: Option<SimulationProgress>,
    ) {
        if let Some(cb) = self.cb.as_deref_mut() {
            cb(RunProgressEvent {
                stage,
                elapsed_wall_s: self.started.elapsed().as_secs_f64(),
                message,
                simulation,
            });
        }
    }
}

/// Execute or load a run based on request.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut progress = ProgressReporter {
        cb: progress_cb,
        started,
    };
    let mut timing = RunTimingSummary::default();

    progress.stage(RunStage::LoadingScenario, "Loading scenario");

    let load_timer = Timer::start("load");
    let scenario = scenario_service::load_scenario(request.scenario_path)?;
    let scenario = if request.overrides.is_empty() {
        scenario
    } else {
        request.overrides.apply(&scenario)?
    };
    timing.phases.load_s = load_timer.stop();

    progress.stage(RunStage::CheckingCache, "Checking run cache");

    let run_id = ps_results::compute_run_id(&scenario, &request.options.solver_version)?;
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        progress.stage(RunStage::LoadingCachedResult, "Loading cached run");

        let cache_timer = Timer::start("cache_load");
        let manifest = store.load_manifest(&run_id)?;
        let records = store.load_timeseries(&run_id)?;
        timing.phases.cache_load_s = cache_timer.stop();
        timing.steps = manifest.points.saturating_sub(1);
        timing.total_time_s = started.elapsed().as_secs_f64();

        debug!(run_id = %run_id, points = manifest.points, "loaded cached run");

        progress.stage(RunStage::Completed, "Loaded cached run");

        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            timing,
            metrics: query::step_metrics(&records),
        });
    }

    progress.stage(RunStage::Simulating, "Simulating");

    let solve_timer = Timer::start("solve");
    let record = {
        let mut sim_cb = |p: SimProgress| progress.simulation(&p);
        let cb: &mut dyn FnMut(SimProgress) = &mut sim_cb;
        simulate_scenario(&scenario, Some(cb))?
    };
    timing.phases.solve_s = solve_timer.stop();
    timing.steps = record.len().saturating_sub(1);

    progress.stage(RunStage::SavingResults, "Saving results");

    let save_timer = Timer::start("save");
    let records = to_records(&record);
    let manifest = RunManifest {
        run_id: run_id.clone(),
        scenario_name: scenario.name.clone(),
        timestamp: RunManifest::now_timestamp(),
        solver_version: request.options.solver_version.clone(),
        gains: scenario.gains,
        points: records.len(),
    };
    store.save_run(&manifest, &records)?;
    timing.phases.save_s = save_timer.stop();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_id = %run_id,
        scenario = %scenario.name,
        points = manifest.points,
        solve_s = timing.phases.solve_s,
        "run completed"
    );

    progress.stage(RunStage::Completed, "Run completed");

    let metrics = ps_sim::analyze_step(&record, ps_sim::response::DEFAULT_SETTLING_BAND);

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        timing,
        metrics,
    })
}

/// Simulate a scenario in memory without touching the run store.
pub fn run_scenario(scenario: &Scenario) -> AppResult<SimRecord> {
    simulate_scenario(scenario, None)
}

fn simulate_scenario(
    scenario: &Scenario,
    progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> AppResult<SimRecord> {
    let runtime = scenario_service::compile_scenario(scenario)?;
    let record = ps_sim::simulate_with_progress(
        &runtime.plant,
        runtime.gains,
        &runtime.grid,
        &runtime.desired,
        &runtime.options,
        progress_cb,
    )?;
    Ok(record)
}

fn to_records(record: &SimRecord) -> Vec<TimeseriesRecord> {
    (0..record.len())
        .map(|i| TimeseriesRecord {
            time_s: record.t[i],
            desired: record.desired[i],
            actual: record.actual[i],
            stabilised: record.stabilised[i],
            control: record.control[i],
        })
        .collect()
}

fn store_for(scenario_path: &Path) -> AppResult<RunStore> {
    Ok(RunStore::for_scenario(scenario_path)?)
}

/// Stored runs for the scenario at `scenario_path`, oldest first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let store = store_for(scenario_path)?;
    Ok(store.list_runs(&scenario.name)?)
}

/// Load a stored run's manifest and samples.
pub fn load_run(
    scenario_path: &Path,
    run_id: &str,
) -> AppResult<(RunManifest, Vec<TimeseriesRecord>)> {
    let store = store_for(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let records = store.load_timeseries(run_id)?;
    Ok((manifest, records))
}

/// Directory where runs for `scenario_path` are stored.
pub fn run_store_dir(scenario_path: &Path) -> AppResult<PathBuf> {
    Ok(store_for(scenario_path)?.root_dir().to_path_buf())
}
