//! Result persistence and before/after comparison.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::assessment::types::{AssessmentResult, ResultComparison};
use crate::assessment::AssessmentError;

/// Default results directory, relative to the working directory.
pub const DEFAULT_RESULTS_DIR: &str = ".code-grader/results";

/// Score change (in points) below which a metric counts as unchanged.
const CHANGE_THRESHOLD: f64 = 1.0;

/// Generate a timestamped filename for a result, with microsecond precision.
pub fn default_result_filename() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f");
    format!("result_{}.json", timestamp)
}

/// Saved results under one directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    dir: PathBuf,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

impl ResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a result. With no `path`, writes a timestamped file in the store directory.
    pub fn save(
        &self,
        result: &AssessmentResult,
        path: Option<&Path>,
    ) -> Result<PathBuf, AssessmentError> {
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => self.fresh_path(),
        };

        if let Some(parent) = save_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(result)?;
        fs::write(&save_path, json)?;
        debug!("saved result to {}", save_path.display());
        Ok(save_path)
    }

    /// A timestamped path in the store directory that no file occupies yet.
    fn fresh_path(&self) -> PathBuf {
        let name = default_result_filename();
        let mut path = self.dir.join(&name);
        let stem = name.trim_end_matches(".json");
        let mut suffix = 1;
        // `_N` sorts after the bare name, keeping list order chronological.
        while path.exists() {
            path = self.dir.join(format!("{}_{}.json", stem, suffix));
            suffix += 1;
        }
        path
    }

    /// Saved result files, oldest first.
    pub fn list(&self) -> Result<Vec<PathBuf>, AssessmentError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                results.push(path);
            }
        }

        // Filenames carry the timestamp.
        results.sort();
        Ok(results)
    }

    pub fn latest(&self) -> Result<Option<PathBuf>, AssessmentError> {
        Ok(self.list()?.pop())
    }
}

/// Load a saved result.
pub fn load_result(path: &Path) -> Result<AssessmentResult, AssessmentError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Delete a saved result. Missing files are ignored.
pub fn delete_result(path: &Path) -> Result<(), AssessmentError> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Compare two results metric by metric.
///
/// Only metrics present in both rubrics get a delta.
pub fn compare_results(before: AssessmentResult, after: AssessmentResult) -> ResultComparison {
    let score_delta = after.normalized_score - before.normalized_score;

    let mut metric_deltas = BTreeMap::new();
    for after_metric in &after.rubric.metrics {
        if let Some(before_metric) = before.rubric.metric(after_metric.id) {
            metric_deltas.insert(
                after_metric.id.to_string(),
                after_metric.score - before_metric.score,
            );
        }
    }

    let improvements = metric_deltas
        .iter()
        .filter(|(_, delta)| **delta >= CHANGE_THRESHOLD)
        .map(|(id, delta)| format!("{}: +{:.1}", id, delta))
        .collect();

    let regressions = metric_deltas
        .iter()
        .filter(|(_, delta)| **delta <= -CHANGE_THRESHOLD)
        .map(|(id, delta)| format!("{}: {:.1}", id, delta))
        .collect();

    ResultComparison {
        before,
        after,
        score_delta,
        metric_deltas,
        improvements,
        regressions,
    }
}
