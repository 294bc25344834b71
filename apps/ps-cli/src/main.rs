use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use ps_app::{
    AppError, AppResult, GainOverrides, RunOptions, RunProgressEvent, RunRequest, RunStage, query,
    run_service, scenario_service,
};
use ps_project::Scenario;

#[derive(Parser)]
#[command(name = "pidsim")]
#[command(about = "pidsim - PID-controlled first-order plant simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and values
    Validate {
        /// Path to the scenario file (YAML or JSON)
        scenario_path: PathBuf,
    },
    /// Write the reference thruster step scenario
    Init {
        /// Where to write the scenario
        scenario_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run a closed-loop simulation
    Run {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Proportional gain override
        #[arg(long)]
        p: Option<f64>,
        /// Integral gain override
        #[arg(long)]
        i: Option<f64>,
        /// Derivative gain override
        #[arg(long)]
        d: Option<f64>,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export time series data from a run as CSV
    ExportSeries {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Export only this series (desired, actual, stabilised, control)
        #[arg(long)]
        series: Option<String>,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Init {
            scenario_path,
            force,
        } => cmd_init(&scenario_path, force),
        Commands::Run {
            scenario_path,
            p,
            i,
            d,
            no_cache,
        } => cmd_run(&scenario_path, GainOverrides { p, i, d }, !no_cache),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            series,
            output,
        } => cmd_export_series(&scenario_path, &run_id, series.as_deref(), output.as_deref()),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = scenario_service::load_scenario(scenario_path)?;
    let runtime = scenario_service::compile_scenario(&scenario)?;
    println!("✓ Scenario '{}' is valid", scenario.name);
    println!(
        "  Grid: {} points, {:.3} - {:.3} s",
        runtime.grid.len(),
        runtime.grid.start(),
        runtime.grid.end()
    );
    println!(
        "  Gains: P={} I={} D={}",
        runtime.gains.kp, runtime.gains.ki, runtime.gains.kd
    );
    Ok(())
}

fn cmd_init(scenario_path: &Path, force: bool) -> AppResult<()> {
    if scenario_path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            scenario_path.display()
        )));
    }
    scenario_service::save_scenario(scenario_path, &Scenario::reference())?;
    info!(path = %scenario_path.display(), "wrote reference scenario");
    println!("✓ Wrote reference scenario to {}", scenario_path.display());
    Ok(())
}

fn cmd_run(scenario_path: &Path, overrides: GainOverrides, use_cache: bool) -> AppResult<()> {
    println!("Running scenario: {}", scenario_path.display());

    let request = RunRequest {
        scenario_path,
        overrides,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let mut on_event = |event: RunProgressEvent| {
        let fraction = event
            .simulation
            .as_ref()
            .map(|s| s.fraction_complete)
            .unwrap_or(-1.0);
        let emit_now = (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
            || event.stage == RunStage::Completed
            || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event);
            if fraction >= 0.0 {
                last_fraction = fraction;
            }
            last_emit = Instant::now();
        }
    };
    let response = run_service::ensure_run_with_progress(&request, Some(&mut on_event))?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response.timing);
    println!(
        "  Gains: P={} I={} D={}",
        response.manifest.gains.p, response.manifest.gains.i, response.manifest.gains.d
    );

    match &response.metrics {
        Some(m) => {
            println!("\nStep response:");
            println!("  Final value:    {:.6}", m.final_value);
            println!("  Final setpoint: {:.6}", m.final_target);
            println!("  Steady error:   {:.3e}", m.steady_state_error);
            println!("  Peak:           {:.6}", m.peak_value);
            match m.overshoot_pct {
                Some(pct) => println!("  Overshoot:      {:.2}%", pct),
                None => println!("  Overshoot:      n/a"),
            }
            match m.settling_time_s {
                Some(ts) => println!("  Settling (2%):  {:.3} s", ts),
                None => println!("  Settling (2%):  not settled"),
            }
            if m.diverged {
                println!("  ⚠ Output diverged to a non-finite value");
            }
        }
        None => println!("\nNo samples recorded"),
    }

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    if let (RunStage::Simulating, Some(s)) = (event.stage, &event.simulation) {
        let width = 28usize;
        let filled = ((s.fraction_complete * width as f64).round() as usize).min(width);
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(width.saturating_sub(filled))
        );
        print!(
            "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}  elapsed={:.1}s",
            bar,
            s.fraction_complete * 100.0,
            s.sim_time_s,
            s.t_end_s,
            s.step,
            event.elapsed_wall_s
        );
    } else {
        let spinner = ['|', '/', '-', '\\'];
        let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
        let mut line = format!(
            "\r{} {}  elapsed={:.2}s",
            spinner[spin_idx],
            event.stage.label(),
            event.elapsed_wall_s
        );
        if let Some(msg) = &event.message {
            line.push_str(&format!("  {}", msg));
        }
        print!("{}", line);
    }
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &ps_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let phases = &timing.phases;

    println!("\nTiming summary:");
    println!(
        "  Load:    {:.3}s ({:.1}%)",
        phases.load_s,
        100.0 * phases.load_s / total
    );
    if phases.cache_load_s > 0.0 {
        println!("  Cache load: {:.3}s", phases.cache_load_s);
    } else {
        println!(
            "  Solve:   {:.3}s ({:.1}%)",
            phases.solve_s,
            100.0 * phases.solve_s / total
        );
        println!(
            "  Save:    {:.3}s ({:.1}%)",
            phases.save_s,
            100.0 * phases.save_s / total
        );
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
    println!("  Steps:   {}", timing.steps);
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!(
            "Cached runs in {}:",
            run_service::run_store_dir(scenario_path)?.display()
        );
        for manifest in runs {
            println!(
                "  {}  P={} I={} D={}  ({} points, {})",
                manifest.run_id,
                manifest.gains.p,
                manifest.gains.i,
                manifest.gains.d,
                manifest.points,
                manifest.timestamp
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, records) = run_service::load_run(scenario_path, run_id)?;
    let summary = query::get_run_summary(&records)?;

    println!("\nRun Summary:");
    println!("  Scenario: {}", manifest.scenario_name);
    println!("  Solver version: {}", manifest.solver_version);
    println!(
        "  Gains: P={} I={} D={}",
        manifest.gains.p, manifest.gains.i, manifest.gains.d
    );
    println!("  Time points: {}", summary.record_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Final setpoint: {}", summary.final_desired);
    println!("  Final output:   {}", summary.final_stabilised);

    if let Some(m) = query::step_metrics(&records) {
        if let Some(pct) = m.overshoot_pct {
            println!("  Overshoot: {:.2}%", pct);
        }
        match m.settling_time_s {
            Some(ts) => println!("  Settling (2%): {:.3} s", ts),
            None => println!("  Settling (2%): not settled"),
        }
    }

    Ok(())
}

fn cmd_export_series(
    scenario_path: &Path,
    run_id: &str,
    series: Option<&str>,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, records) = run_service::load_run(scenario_path, run_id)?;
    debug!(run_id, points = records.len(), series = ?series, "exporting run");

    let csv = match series {
        Some(name) => {
            let data = query::extract_series(&records, name)?;
            let mut csv = String::from("time_s,value\n");
            for (t, val) in &data {
                csv.push_str(&format!("{},{}\n", t, val));
            }
            csv
        }
        None => ps_app::to_csv(&records),
    };

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            records.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_gain_overrides() {
        let cli = Cli::try_parse_from([
            "pidsim", "run", "scenario.yaml", "--p", "2.0", "--d", "0", "--no-cache",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                p, i, d, no_cache, ..
            } => {
                assert_eq!(GainOverrides { p, i, d }, GainOverrides {
                    p: Some(2.0),
                    i: None,
                    d: Some(0.0),
                });
                assert!(no_cache);
            }
            _ => panic!("expected run command"),
        }
    }
}
