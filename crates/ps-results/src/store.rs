//! On-disk run store.
//!
//! Layout, one directory per run:
//!
//! ```text
//! <root>/<run_id>/manifest.json
//! <root>/<run_id>/timeseries.jsonl
//! ```

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::types::{RunManifest, TimeseriesRecord};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const TIMESERIES_FILE: &str = "timeseries.jsonl";

#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store kept next to a scenario file, under `.pidsim/runs`.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let scenario_dir = match scenario_path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Path::new("."),
            Some(dir) => dir,
            None => {
                return Err(ResultsError::InvalidPath {
                    message: format!("{} has no parent directory", scenario_path.display()),
                });
            }
        };
        Self::new(scenario_dir.join(".pidsim").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_file(&self, run_id: &str, file: &str) -> PathBuf {
        self.root_dir.join(run_id).join(file)
    }

    fn not_found(run_id: &str) -> ResultsError {
        ResultsError::RunNotFound {
            run_id: run_id.to_string(),
        }
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_file(run_id, MANIFEST_FILE).is_file()
    }

    /// Write samples, then the manifest. A run directory without a manifest
    /// is an interrupted save and is never reported as cached.
    pub fn save_run(&self, manifest: &RunManifest, records: &[TimeseriesRecord]) -> ResultsResult<()> {
        fs::create_dir_all(self.root_dir.join(&manifest.run_id))?;

        let mut out = BufWriter::new(File::create(
            self.run_file(&manifest.run_id, TIMESERIES_FILE),
        )?);
        for record in records {
            serde_json::to_writer(&mut out, record)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(self.run_file(&manifest.run_id, MANIFEST_FILE), manifest_json)?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.run_file(run_id, MANIFEST_FILE);
        if !path.is_file() {
            return Err(Self::not_found(run_id));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TimeseriesRecord>> {
        let path = self.run_file(run_id, TIMESERIES_FILE);
        if !path.is_file() {
            return Err(Self::not_found(run_id));
        }

        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Manifests of stored runs for `scenario_name`, oldest first.
    /// Unreadable run directories are skipped.
    pub fn list_runs(&self, scenario_name: &str) -> ResultsResult<Vec<RunManifest>> {
        if !self.root_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().into_owned();
            match self.load_manifest(&run_id) {
                Ok(manifest) if manifest.scenario_name == scenario_name => runs.push(manifest),
                _ => {}
            }
        }

        runs.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.root_dir.join(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
