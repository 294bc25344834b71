//! Progress events emitted while a run executes.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingScenario,
    CheckingCache,
    LoadingCachedResult,
    Simulating,
    SavingResults,
    Completed,
}

impl RunStage {
    pub fn label(&self) -> &'static str {
        match self {
            RunStage::LoadingScenario => "loading scenario",
            RunStage::CheckingCache => "checking cache",
            RunStage::LoadingCachedResult => "loading cached result",
            RunStage::Simulating => "simulating",
            RunStage::SavingResults => "saving results",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationProgress {
    pub sim_time_s: f64,
    pub t_end_s: f64,
    pub fraction_complete: f64,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub simulation: Option<SimulationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            simulation: None,
        }
    }
}

impl From<&ps_sim::SimProgress> for SimulationProgress {
    fn from(p: &ps_sim::SimProgress) -> Self {
        Self {
            sim_time_s: p.sim_time_s,
            t_end_s: p.t_end_s,
            fraction_complete: p.fraction_complete(),
            step: p.step,
        }
    }
}
